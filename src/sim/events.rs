//! Outbound gameplay events
//!
//! Queued during a tick and drained by the host for audio and particles.
//! Nothing in the simulation waits on them.

use glam::Vec2;
use serde::Serialize;

use super::bestiary::EnemyKind;
use super::player::{PotionKind, Special};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    EnemyHit {
        id: u32,
        pos: Vec2,
    },
    EnemyDefeated {
        id: u32,
        kind: EnemyKind,
        pos: Vec2,
        points: u64,
        boss: bool,
    },
    PlayerHit {
        health: u32,
        shield: f32,
    },
    ShieldBroken,
    PowerupCollected {
        kind: PotionKind,
    },
    SpecialUsed {
        special: Special,
    },
    WaveStarted {
        round: u32,
        wave: u32,
    },
    WaveCleared {
        round: u32,
        wave: u32,
        bonus: u64,
    },
    RoundCleared {
        round: u32,
    },
    Victory {
        score: u64,
    },
    GameOver {
        score: u64,
    },
}

impl GameEvent {
    /// Abstract event name used by the audio/particle layer
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::EnemyHit { .. } => "enemyHit",
            GameEvent::EnemyDefeated { .. } => "enemyDefeated",
            GameEvent::PlayerHit { .. } => "playerHit",
            GameEvent::ShieldBroken => "shieldBroken",
            GameEvent::PowerupCollected { .. } => "powerupCollected",
            GameEvent::SpecialUsed { .. } => "specialUsed",
            GameEvent::WaveStarted { .. } => "waveStarted",
            GameEvent::WaveCleared { .. } => "waveCleared",
            GameEvent::RoundCleared { .. } => "roundCleared",
            GameEvent::Victory { .. } => "victory",
            GameEvent::GameOver { .. } => "gameOver",
        }
    }
}
