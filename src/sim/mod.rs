//! Deterministic simulation module
//!
//! All combat logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod bestiary;
pub mod collision;
pub mod director;
pub mod enemy;
pub mod events;
pub mod formation;
pub mod movement;
pub mod player;
pub mod projectile;
pub mod reward;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod waves;

pub use bestiary::{EnemyDescriptor, EnemyKind, FirePattern, Tier};
pub use collision::{CollisionReport, Rect};
pub use director::{Phase, WaveDirector, WaveState};
pub use enemy::{Enemy, EnemyRegistry};
pub use events::GameEvent;
pub use formation::{FormationSpec, Layout, PatternId, SpawnEntry};
pub use movement::{GroupMotion, Motion};
pub use player::{Character, Player, PotionKind, Powerup, Special};
pub use projectile::{Beam, BeamLife, Faction, Projectile, ProjectileManager, Shot};
pub use reward::{RewardTable, roll_rewards};
pub use snapshot::Snapshot;
pub use state::{Controls, GameState};
pub use tick::tick;
pub use waves::{ROUND_COUNT, formation_for, is_boss_wave, waves_in_round};
