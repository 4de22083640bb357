//! Enemy type descriptors
//!
//! Behavior is resolved once per type from a fixed table and copied onto
//! the entity at spawn, so nothing dispatches on a type name per tick.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::movement::Standalone;

/// Baseline potion drop chance for common enemies
pub const BASE_POTION_CHANCE: f32 = 0.05;
/// Potion drop chance for bosses
pub const BOSS_POTION_CHANCE: f32 = 0.5;

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    // Early tier
    Imp,
    Wisp,
    Bat,
    // Mid/late tier
    Gargoyle,
    Specter,
    Harpy,
    Golem,
    Salamander,
    // Mid-bosses
    Wyvern,
    Lich,
    // Bosses (one per round)
    Treant,
    StormDrake,
    ArchAlchemist,
    // Background flybys
    Phoenix,
    Sprite,
}

impl EnemyKind {
    /// Fallback when a formation cannot be resolved
    pub const DEFAULT: EnemyKind = EnemyKind::Imp;

    pub const ALL: [EnemyKind; 15] = [
        EnemyKind::Imp,
        EnemyKind::Wisp,
        EnemyKind::Bat,
        EnemyKind::Gargoyle,
        EnemyKind::Specter,
        EnemyKind::Harpy,
        EnemyKind::Golem,
        EnemyKind::Salamander,
        EnemyKind::Wyvern,
        EnemyKind::Lich,
        EnemyKind::Treant,
        EnemyKind::StormDrake,
        EnemyKind::ArchAlchemist,
        EnemyKind::Phoenix,
        EnemyKind::Sprite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Imp => "imp",
            EnemyKind::Wisp => "wisp",
            EnemyKind::Bat => "bat",
            EnemyKind::Gargoyle => "gargoyle",
            EnemyKind::Specter => "specter",
            EnemyKind::Harpy => "harpy",
            EnemyKind::Golem => "golem",
            EnemyKind::Salamander => "salamander",
            EnemyKind::Wyvern => "wyvern",
            EnemyKind::Lich => "lich",
            EnemyKind::Treant => "treant",
            EnemyKind::StormDrake => "storm_drake",
            EnemyKind::ArchAlchemist => "arch_alchemist",
            EnemyKind::Phoenix => "phoenix",
            EnemyKind::Sprite => "sprite",
        }
    }

    /// Behavior table for this type
    pub fn descriptor(self) -> EnemyDescriptor {
        use EnemyKind::*;
        use FirePattern::*;

        let small = Vec2::new(32.0, 32.0);
        let medium = Vec2::new(44.0, 40.0);
        let large = Vec2::new(96.0, 80.0);

        let d = EnemyDescriptor::regular;
        match self {
            Imp => d(1, 2.6, 60.0, 100, BASE_POTION_CHANCE, Straight, small, Standalone::Drift),
            Wisp => d(1, 3.0, 70.0, 120, BASE_POTION_CHANCE, Targeted, small, Standalone::Zigzag),
            Bat => d(1, 2.4, 110.0, 120, BASE_POTION_CHANCE, AngledPair, small, Standalone::Dive),
            Gargoyle => d(3, 2.8, 50.0, 250, 0.10, NarrowSpread, medium, Standalone::Drift),
            Specter => d(2, 2.5, 80.0, 200, 0.12, RandomChoice, medium, Standalone::Zigzag),
            Harpy => d(2, 3.2, 100.0, 220, 0.10, VBurst, medium, Standalone::Dive),
            Golem => d(4, 3.6, 40.0, 300, 0.15, WideFan, medium, Standalone::Drift),
            Salamander => d(3, 2.2, 90.0, 300, 0.20, Targeted, medium, Standalone::Dive),

            Wyvern => EnemyDescriptor {
                tier: Tier::MidBoss,
                ..d(30, 1.6, 70.0, 1500, 0.20, WideFan, Vec2::new(72.0, 60.0), Standalone::Strafe)
            },
            Lich => EnemyDescriptor {
                tier: Tier::MidBoss,
                ..d(40, 1.5, 60.0, 2000, 0.20, CircleBurst, Vec2::new(72.0, 64.0), Standalone::Strafe)
            },

            Treant => EnemyDescriptor {
                tier: Tier::Boss,
                ..d(60, 1.8, 40.0, 5000, BOSS_POTION_CHANCE, CircleBurst, large, Standalone::Strafe)
            },
            StormDrake => EnemyDescriptor {
                tier: Tier::Boss,
                ..d(90, 1.4, 55.0, 8000, BOSS_POTION_CHANCE, VBurst, large, Standalone::Strafe)
            },
            ArchAlchemist => EnemyDescriptor {
                tier: Tier::Boss,
                shot_damage: 2,
                ..d(140, 1.2, 50.0, 15000, BOSS_POTION_CHANCE, CircleBurst, large, Standalone::Strafe)
            },

            Phoenix => EnemyDescriptor {
                tier: Tier::Flyby,
                ..d(2, 4.0, 60.0, 400, 0.25, Straight, medium, Standalone::Strafe)
            },
            Sprite => EnemyDescriptor {
                tier: Tier::Flyby,
                ttl: Some(6.0),
                ..d(1, 0.0, 60.0, 500, 0.50, Silent, small, Standalone::Strafe)
            },
        }
    }
}

/// Strength tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Regular,
    MidBoss,
    Boss,
    /// Background crosser, never counts toward wave completion
    Flyby,
}

/// Enemy firing patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirePattern {
    /// Never fires
    Silent,
    /// One shot straight down
    Straight,
    /// One shot at the player
    Targeted,
    /// Two shots angled either side of straight down
    AngledPair,
    /// Five shots across a wide cone
    WideFan,
    /// Three shots in a tight cone
    NarrowSpread,
    /// Re-rolled among the simple patterns on every volley
    RandomChoice,
    /// Ring of shots in every direction
    CircleBurst,
    /// Two staggered diagonal lines
    VBurst,
}

impl FirePattern {
    /// Patterns `RandomChoice` picks from
    pub const RANDOM_POOL: [FirePattern; 4] = [
        FirePattern::Straight,
        FirePattern::Targeted,
        FirePattern::AngledPair,
        FirePattern::NarrowSpread,
    ];

    /// Resolve `RandomChoice` into a concrete pattern
    pub fn resolve<R: Rng>(self, rng: &mut R) -> FirePattern {
        match self {
            FirePattern::RandomChoice => {
                Self::RANDOM_POOL[rng.random_range(0..Self::RANDOM_POOL.len())]
            }
            other => other,
        }
    }
}

/// Per-type behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyDescriptor {
    pub health: u32,
    /// Seconds between volleys (0 = never fires)
    pub shot_cooldown: f32,
    /// Pixels/s for standalone movement and flyby crossing
    pub speed: f32,
    pub points: u64,
    pub potion_chance: f32,
    pub fire: FirePattern,
    pub tier: Tier,
    /// Hitbox (width, height)
    pub size: Vec2,
    pub shot_damage: u32,
    /// Movement once out of formation
    pub standalone: Standalone,
    /// Self-removal deadline for fleeing types (seconds)
    pub ttl: Option<f32>,
}

impl EnemyDescriptor {
    #[allow(clippy::too_many_arguments)]
    fn regular(
        health: u32,
        shot_cooldown: f32,
        speed: f32,
        points: u64,
        potion_chance: f32,
        fire: FirePattern,
        size: Vec2,
        standalone: Standalone,
    ) -> Self {
        Self {
            health,
            shot_cooldown,
            speed,
            points,
            potion_chance,
            fire,
            tier: Tier::Regular,
            size,
            shot_damage: 1,
            standalone,
            ttl: None,
        }
    }

    pub fn is_boss(&self) -> bool {
        self.tier == Tier::Boss
    }

    pub fn is_mid_boss(&self) -> bool {
        self.tier == Tier::MidBoss
    }

    pub fn is_flyby(&self) -> bool {
        self.tier == Tier::Flyby
    }
}

/// Phase-aware pattern pair for one mid-boss phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhasePatterns {
    pub primary: FirePattern,
    pub secondary: FirePattern,
    /// Chance of picking `primary` on each volley
    pub primary_weight: f64,
}

/// Mid-boss pattern table; phase 0 above half health, phase 1 below
pub fn mid_boss_patterns(kind: EnemyKind, phase: usize) -> Option<PhasePatterns> {
    use FirePattern::*;
    let table: [PhasePatterns; 2] = match kind {
        EnemyKind::Wyvern => [
            PhasePatterns {
                primary: WideFan,
                secondary: Targeted,
                primary_weight: 0.6,
            },
            PhasePatterns {
                primary: VBurst,
                secondary: WideFan,
                primary_weight: 0.5,
            },
        ],
        EnemyKind::Lich => [
            PhasePatterns {
                primary: NarrowSpread,
                secondary: CircleBurst,
                primary_weight: 0.7,
            },
            PhasePatterns {
                primary: CircleBurst,
                secondary: Targeted,
                primary_weight: 0.55,
            },
        ],
        _ => return None,
    };
    Some(table[phase.min(1)])
}

/// Mid-boss phase from remaining health
pub fn mid_boss_phase(health: u32, max_health: u32) -> usize {
    if health * 2 > max_health { 0 } else { 1 }
}

/// Pick the next mid-boss volley with a weighted coin flip
pub fn choose_mid_boss_pattern<R: Rng>(
    kind: EnemyKind,
    health: u32,
    max_health: u32,
    rng: &mut R,
) -> Option<FirePattern> {
    let patterns = mid_boss_patterns(kind, mid_boss_phase(health, max_health))?;
    Some(if rng.random_bool(patterns.primary_weight) {
        patterns.primary
    } else {
        patterns.secondary
    })
}
