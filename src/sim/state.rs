//! Game state and inbound commands
//!
//! Everything a run needs lives in one [`GameState`]: a single seeded RNG,
//! the simulation clock, the entity pools and the wave director.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::director::{Phase, WaveDirector};
use super::enemy::{EnemyRegistry, FlybySettings};
use super::events::GameEvent;
use super::player::{Character, Player, Powerup};
use super::projectile::ProjectileManager;
use crate::tuning::Tuning;

/// Held inputs and one-shot requests from the host's input layer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub firing: bool,
    /// Aim point in screen space
    pub aim: Option<Vec2>,
    /// Consumed by the next live tick
    pub special_requested: bool,
}

/// Complete run state (deterministic for a given seed and command sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    /// Simulation clock (seconds); advances only in live phases
    pub clock: f32,
    pub score: u64,
    pub player: Player,
    pub enemies: EnemyRegistry,
    pub projectiles: ProjectileManager,
    /// Falling potions (sorted by id)
    pub powerups: Vec<Powerup>,
    pub director: WaveDirector,
    pub controls: Controls,
    /// Events queued since the last drain
    pub events: Vec<GameEvent>,
    /// Rolled once when the run ends
    pub rewards: Option<Vec<String>>,
    next_powerup_id: u32,
}

impl GameState {
    /// Create a run waiting for character selection
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let projectiles = ProjectileManager::new(tuning.projectile_cap, tuning.offscreen_margin);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            clock: 0.0,
            score: 0,
            player: Player::new(Character::Alchemist),
            enemies: EnemyRegistry::new(),
            projectiles,
            powerups: Vec::new(),
            director: WaveDirector::new(),
            controls: Controls::default(),
            events: Vec::new(),
            rewards: None,
            next_powerup_id: 1,
        }
    }

    pub fn phase(&self) -> Phase {
        self.director.phase
    }

    pub fn round(&self) -> u32 {
        self.director.wave.round
    }

    pub fn wave(&self) -> u32 {
        self.director.wave.wave
    }

    pub fn flyby_settings(&self) -> FlybySettings {
        FlybySettings {
            interval_min: self.tuning.flyby_interval_min_secs,
            interval_max: self.tuning.flyby_interval_max_secs,
            speed: self.tuning.flyby_speed,
        }
    }

    pub fn next_powerup_id(&mut self) -> u32 {
        let id = self.next_powerup_id;
        self.next_powerup_id += 1;
        id
    }

    /// Pick a pilot and start round 1. Ignored outside character select.
    pub fn select_character(&mut self, character: Character) -> bool {
        if self.director.phase != Phase::CharacterSelect {
            log::warn!("Ignoring character selection during {:?}", self.director.phase);
            return false;
        }
        log::info!("Run {} started as {}", self.seed, character.as_str());
        self.player = Player::new(character);
        let settings = self.flyby_settings();
        self.enemies.reset_flyby_timer(&settings, &mut self.rng);
        self.director.announce("Round 1", self.clock, self.tuning.round_announce_secs);
        self.spawn_wave();
        true
    }

    pub fn move_left(&mut self, held: bool) {
        self.controls.left = held;
    }

    pub fn move_right(&mut self, held: bool) {
        self.controls.right = held;
    }

    pub fn set_aim_point(&mut self, x: f32, y: f32) {
        self.controls.aim = (x.is_finite() && y.is_finite()).then(|| Vec2::new(x, y));
    }

    pub fn clear_aim_point(&mut self) {
        self.controls.aim = None;
    }

    pub fn set_firing(&mut self, firing: bool) {
        self.controls.firing = firing;
    }

    pub fn trigger_special(&mut self) {
        if self.director.phase.is_live() {
            self.controls.special_requested = true;
        }
    }

    pub fn pause(&mut self) -> bool {
        let paused = self.director.pause();
        if paused {
            log::info!("Paused at {:.2}s", self.clock);
        }
        paused
    }

    pub fn resume(&mut self) -> bool {
        let resumed = self.director.resume();
        if resumed {
            log::info!("Resumed at {:.2}s", self.clock);
        }
        resumed
    }

    /// Take every event queued since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure entity vectors are sorted by id for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.normalize_order();
        self.projectiles.normalize_order();
        self.powerups.sort_by_key(|p| p.id);
    }
}
