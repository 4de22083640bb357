//! Read-only per-frame view for the renderer
//!
//! Plain serde structs so the web facade can hand the whole thing to JS as
//! JSON. Player `y` is the animated sprite height; `collision_y` is the
//! fixed line used by every hit test.

use serde::Serialize;

use super::bestiary::EnemyKind;
use super::director::Phase;
use super::player::{Character, PotionKind};
use super::projectile::{Faction, Projectile};
use super::state::GameState;
use crate::dir_to_angle;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub state: Phase,
    pub round: u32,
    pub wave: u32,
    pub score: u64,
    pub clock: f32,
    pub announcement: Option<String>,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: ProjectilesView,
    pub powerups: Vec<PowerupView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub character: Character,
    pub x: f32,
    pub y: f32,
    pub collision_y: f32,
    pub health: u32,
    pub max_health: u32,
    pub shield: f32,
    pub max_shield: f32,
    pub power: u32,
    pub special_ready: bool,
    pub special_cooldown: f32,
    pub invulnerable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyView {
    pub id: u32,
    pub kind: EnemyKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub health: u32,
    pub max_health: u32,
    pub boss: bool,
    pub mid_boss: bool,
    pub flyby: bool,
    pub hit_flash: bool,
    pub alpha: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Sprite rotation in degrees
    pub rotation: f32,
    pub homing: bool,
    pub piercing: bool,
}

impl From<&Projectile> for ShotView {
    fn from(p: &Projectile) -> Self {
        let rotation = match p.spin {
            Some(spin) => spin.angle,
            None => dir_to_angle(p.vel),
        };
        Self {
            id: p.id,
            x: p.pos.x,
            y: p.pos.y,
            width: p.size.x,
            height: p.size.y,
            rotation,
            homing: p.homing,
            piercing: p.piercing,
        }
    }
}

/// Beam as an axis-aligned rectangle (center and size)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeamView {
    pub id: u32,
    pub owner: Faction,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectilesView {
    pub player: Vec<ShotView>,
    pub enemy: Vec<ShotView>,
    pub beams: Vec<BeamView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerupView {
    pub id: u32,
    pub kind: PotionKind,
    pub x: f32,
    pub y: f32,
    /// Blinks out over the last two seconds
    pub alpha: f32,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let player = &state.player;
        let projectiles = &state.projectiles;
        Self {
            state: state.phase(),
            round: state.round(),
            wave: state.wave(),
            score: state.score,
            clock: state.clock,
            announcement: state.director.announcement.as_ref().map(|a| a.text.clone()),
            player: PlayerView {
                character: player.character,
                x: player.x,
                y: player.visual_y(),
                collision_y: player.hitbox_center().y,
                health: player.health,
                max_health: player.max_health,
                shield: player.shield,
                max_shield: player.max_shield,
                power: player.power,
                special_ready: player.special_ready(),
                special_cooldown: player.special_cooldown,
                invulnerable: player.is_invulnerable(state.clock, state.tuning.invulnerability_secs),
            },
            enemies: state
                .enemies
                .enemies
                .iter()
                .filter(|e| e.is_alive())
                .map(|e| EnemyView {
                    id: e.id,
                    kind: e.kind,
                    x: e.pos.x,
                    y: e.pos.y,
                    width: e.desc.size.x,
                    height: e.desc.size.y,
                    health: e.health,
                    max_health: e.max_health,
                    boss: e.boss,
                    mid_boss: e.is_mid_boss(),
                    flyby: e.is_flyby(),
                    hit_flash: e.hit_flash > 0.0,
                    alpha: e.alpha(),
                })
                .collect(),
            projectiles: ProjectilesView {
                player: projectiles.player.iter().map(ShotView::from).collect(),
                enemy: projectiles.enemy.iter().map(ShotView::from).collect(),
                beams: projectiles
                    .beams
                    .iter()
                    .map(|b| {
                        let r = b.rect();
                        BeamView {
                            id: b.id,
                            owner: b.owner,
                            x: r.center.x,
                            y: r.center.y,
                            width: r.half.x * 2.0,
                            height: r.half.y * 2.0,
                        }
                    })
                    .collect(),
            },
            powerups: state
                .powerups
                .iter()
                .map(|p| PowerupView {
                    id: p.id,
                    kind: p.kind,
                    x: p.pos.x,
                    y: p.pos.y,
                    alpha: (p.ttl / 2.0).clamp(0.0, 1.0),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::tuning::Tuning;

    #[test]
    fn test_snapshot_separates_visual_and_collision_y() {
        let mut state = GameState::new(1, Tuning::default());
        state.select_character(Character::Knight);
        state.player.bob_time = 0.5;
        let snap = Snapshot::capture(&state);
        assert_eq!(snap.state, Phase::Spawning);
        assert_eq!(snap.player.collision_y, PLAYER_COLLISION_Y);
        assert_ne!(snap.player.y, snap.player.collision_y);
        assert_eq!(snap.announcement.as_deref(), Some("Round 1"));
    }

    #[test]
    fn test_snapshot_json_uses_camel_case() {
        let mut state = GameState::new(1, Tuning::default());
        state.select_character(Character::Alchemist);
        let json = Snapshot::capture(&state).to_json().unwrap();
        assert!(json.contains("\"state\":\"spawning\""));
        assert!(json.contains("\"collisionY\""));
        assert!(json.contains("\"specialReady\":true"));
    }
}
