//! Player ship, characters and potion pickups
//!
//! The ship only moves horizontally. Its hitbox always sits on the fixed
//! collision line [`PLAYER_COLLISION_Y`]; the bobbing sprite height from
//! [`Player::visual_y`] is for rendering only.

use std::str::FromStr;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::projectile::{BeamLife, Faction, ProjectileManager, Shot};
use crate::consts::*;
use crate::{dir_or, dir_to_angle};

pub const MAX_POWER: u32 = 5;
/// Seconds between volleys while fire is held
pub const FIRE_INTERVAL: f32 = 0.18;
pub const PLAYER_SHOT_SPEED: f32 = 520.0;
/// Shield regen waits this long after the last hit
pub const SHIELD_REGEN_DELAY: f32 = 1.5;
/// Potions fall at this speed (pixels/s)
pub const POTION_FALL_SPEED: f32 = 80.0;
/// Potions are collected within this distance of the hitbox center
pub const PICKUP_RADIUS: f32 = 30.0;

/// Selectable pilots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Character {
    /// Layered health; shield potions grant a one-hit ward
    Alchemist,
    /// Big regenerating shield, each hit costs a third of it
    Knight,
    /// Smaller shield, flat cost per hit
    Ranger,
}

impl Character {
    pub fn as_str(&self) -> &'static str {
        match self {
            Character::Alchemist => "alchemist",
            Character::Knight => "knight",
            Character::Ranger => "ranger",
        }
    }

    pub fn profile(self) -> CharacterProfile {
        match self {
            Character::Alchemist => CharacterProfile {
                max_health: 5,
                max_shield: 30.0,
                shield_regen: 0.0,
                shield_cost: ShieldCost::Flat(30.0),
                starts_shielded: false,
                special: Special::HomingVolley,
            },
            Character::Knight => CharacterProfile {
                max_health: 3,
                max_shield: 100.0,
                shield_regen: 10.0,
                shield_cost: ShieldCost::Fraction(0.34),
                starts_shielded: true,
                special: Special::HeldBeam,
            },
            Character::Ranger => CharacterProfile {
                max_health: 4,
                max_shield: 60.0,
                shield_regen: 6.0,
                shield_cost: ShieldCost::Flat(20.0),
                starts_shielded: true,
                special: Special::TimedBeam,
            },
        }
    }
}

impl FromStr for Character {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alchemist" => Ok(Character::Alchemist),
            "knight" => Ok(Character::Knight),
            "ranger" => Ok(Character::Ranger),
            other => Err(format!("unknown character `{other}`")),
        }
    }
}

/// Shield drained by one point of incoming damage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShieldCost {
    /// Fraction of max shield
    Fraction(f32),
    /// Fixed shield points
    Flat(f32),
}

/// Special attack styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Special {
    /// Fan of homing flasks
    HomingVolley,
    /// Beam held for as long as fire is held
    HeldBeam,
    /// Wide beam with a fixed duration
    TimedBeam,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterProfile {
    pub max_health: u32,
    pub max_shield: f32,
    /// Shield points per second
    pub shield_regen: f32,
    pub shield_cost: ShieldCost,
    pub starts_shielded: bool,
    pub special: Special,
}

/// Result of routing a hit through the player's absorption policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    /// Inside the invulnerability window; nothing changed
    Ignored,
    /// Shield absorbed the hit
    Shielded { broke: bool },
    /// Health took the hit
    Wounded { health: u32 },
}

/// The player ship
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub character: Character,
    pub x: f32,
    pub vx: f32,
    pub health: u32,
    pub max_health: u32,
    pub shield: f32,
    pub max_shield: f32,
    pub shield_regen: f32,
    pub shield_cost: ShieldCost,
    pub power: u32,
    /// Time until the next volley may fire
    pub fire_timer: f32,
    /// Time until the special is ready again
    pub special_cooldown: f32,
    /// Simulation clock of the last hit that landed
    pub last_damage_at: Option<f32>,
    /// Drives the sprite bob
    pub bob_time: f32,
}

impl Player {
    pub fn new(character: Character) -> Self {
        let profile = character.profile();
        Self {
            character,
            x: SCREEN_WIDTH / 2.0,
            vx: 0.0,
            health: profile.max_health,
            max_health: profile.max_health,
            shield: if profile.starts_shielded {
                profile.max_shield
            } else {
                0.0
            },
            max_shield: profile.max_shield,
            shield_regen: profile.shield_regen,
            shield_cost: profile.shield_cost,
            power: 1,
            fire_timer: 0.0,
            special_cooldown: 0.0,
            last_damage_at: None,
            bob_time: 0.0,
        }
    }

    /// Collision point. Y is the fixed collision line, never the animated sprite Y.
    pub fn hitbox_center(&self) -> Vec2 {
        Vec2::new(self.x, PLAYER_COLLISION_Y)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.hitbox_center(), Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT))
    }

    /// Sprite Y including the bob; rendering only
    pub fn visual_y(&self) -> f32 {
        PLAYER_RENDER_Y + (self.bob_time * PLAYER_BOB_SPEED).sin() * PLAYER_BOB_AMPLITUDE
    }

    /// Where shots leave the ship
    pub fn muzzle(&self) -> Vec2 {
        self.hitbox_center() - Vec2::new(0.0, PLAYER_HEIGHT / 2.0)
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    pub fn special_ready(&self) -> bool {
        self.special_cooldown <= 0.0
    }

    /// Horizontal movement from held direction keys
    pub fn update_movement(&mut self, left: bool, right: bool, dt: f32) {
        let dir = match (left, right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        self.vx = dir * PLAYER_SPEED;
        self.x = (self.x + self.vx * dt).clamp(PLAYER_EDGE_MARGIN, SCREEN_WIDTH - PLAYER_EDGE_MARGIN);
        self.bob_time += dt;
    }

    /// Count down weapon timers and regenerate shield
    pub fn update_timers(&mut self, now: f32, dt: f32) {
        self.fire_timer = (self.fire_timer - dt).max(0.0);
        self.special_cooldown = (self.special_cooldown - dt).max(0.0);

        let recovering = self
            .last_damage_at
            .is_some_and(|t| now - t < SHIELD_REGEN_DELAY);
        if self.shield_regen > 0.0 && !recovering {
            self.shield = (self.shield + self.shield_regen * dt).min(self.max_shield);
        }
    }

    pub fn is_invulnerable(&self, now: f32, window: f32) -> bool {
        self.last_damage_at.is_some_and(|t| now - t < window)
    }

    /// Route incoming damage: invulnerability window, then shield, then health
    pub fn take_hit(&mut self, damage: u32, now: f32, window: f32) -> HitOutcome {
        if damage == 0 || self.is_dead() || self.is_invulnerable(now, window) {
            return HitOutcome::Ignored;
        }
        self.last_damage_at = Some(now);

        if self.shield > 0.0 {
            let per_point = match self.shield_cost {
                ShieldCost::Fraction(f) => self.max_shield * f,
                ShieldCost::Flat(points) => points,
            };
            self.shield = (self.shield - per_point * damage as f32).max(0.0);
            return HitOutcome::Shielded {
                broke: self.shield <= 0.0,
            };
        }

        self.health = self.health.saturating_sub(damage);
        HitOutcome::Wounded {
            health: self.health,
        }
    }

    /// Apply a collected potion
    pub fn apply_potion(&mut self, kind: PotionKind) {
        match kind {
            PotionKind::Health => {
                self.health = (self.health + 1).min(self.max_health);
            }
            PotionKind::Shield => {
                if self.shield_regen > 0.0 {
                    self.shield = (self.shield + self.max_shield * 0.5).min(self.max_shield);
                } else {
                    // Layered characters get a full ward
                    self.shield = self.max_shield;
                }
            }
            PotionKind::Power => {
                self.power = (self.power + 1).min(MAX_POWER);
            }
            PotionKind::Elixir => {
                self.special_cooldown = 0.0;
            }
        }
    }

    /// Fire one volley if the weapon is ready. Returns true when shots were fired.
    pub fn try_fire(&mut self, aim: Option<Vec2>, projectiles: &mut ProjectileManager) -> bool {
        if self.fire_timer > 0.0 {
            return false;
        }
        self.fire_timer = FIRE_INTERVAL;

        let origin = self.muzzle();
        let base = aim_angle(origin, aim);
        let mut shot = Shot::default().sized(6.0, 16.0);
        if self.character == Character::Ranger && self.power >= 3 {
            shot = shot.piercing();
        }
        let heavy = shot.damage(2);

        let fire = |pm: &mut ProjectileManager, offset_x: f32, angle: f32, shot: Shot| {
            pm.fire_at_angle(
                Faction::Player,
                origin + Vec2::new(offset_x, 0.0),
                angle,
                PLAYER_SHOT_SPEED,
                shot,
            );
        };

        match self.power {
            0 | 1 => fire(projectiles, 0.0, base, shot),
            2 => {
                fire(projectiles, -8.0, base, shot);
                fire(projectiles, 8.0, base, shot);
            }
            3 => {
                for spread in [-10.0, 0.0, 10.0] {
                    fire(projectiles, 0.0, base + spread, shot);
                }
            }
            4 => {
                fire(projectiles, 0.0, base - 10.0, shot);
                fire(projectiles, 0.0, base, heavy);
                fire(projectiles, 0.0, base + 10.0, shot);
            }
            _ => {
                for spread in [-20.0, -10.0, 10.0, 20.0] {
                    fire(projectiles, 0.0, base + spread, shot);
                }
                fire(projectiles, 0.0, base, heavy);
            }
        }
        true
    }

    /// Trigger the character's special attack if it is ready
    pub fn try_special(
        &mut self,
        aim: Option<Vec2>,
        cooldown: f32,
        projectiles: &mut ProjectileManager,
    ) -> Option<Special> {
        if !self.special_ready() {
            return None;
        }
        let special = self.character.profile().special;
        let origin = self.muzzle();
        match special {
            Special::HomingVolley => {
                let base = aim_angle(origin, aim);
                let flask = Shot::default().damage(2).sized(12.0, 12.0).homing().spinning(540.0);
                for i in 0..10 {
                    let spread = -60.0 + i as f32 * (120.0 / 9.0);
                    projectiles.fire_at_angle(Faction::Player, origin, base + spread, 300.0, flask);
                }
            }
            Special::HeldBeam => {
                projectiles.fire_beam(Faction::Player, origin, 48.0, origin.y, 1, BeamLife::Continuous);
            }
            Special::TimedBeam => {
                projectiles.fire_beam(Faction::Player, origin, 90.0, origin.y, 1, BeamLife::Timed(1.2));
            }
        }
        self.special_cooldown = cooldown;
        Some(special)
    }
}

/// Volley direction in degrees: toward the aim point, kept in the upper half-plane
fn aim_angle(origin: Vec2, aim: Option<Vec2>) -> f32 {
    let Some(target) = aim else {
        return -90.0;
    };
    let mut dir = dir_or(target - origin, Vec2::NEG_Y);
    if dir.y > -0.1 {
        dir.y = -0.1;
        dir = dir.normalize();
    }
    dir_to_angle(dir)
}

/// Potion effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PotionKind {
    Health,
    Shield,
    Power,
    /// Refreshes the special attack
    Elixir,
}

impl PotionKind {
    /// Weighted pick of a dropped potion
    pub fn roll<R: Rng>(rng: &mut R) -> PotionKind {
        match rng.random_range(0..100) {
            0..35 => PotionKind::Health,
            35..60 => PotionKind::Shield,
            60..90 => PotionKind::Power,
            _ => PotionKind::Elixir,
        }
    }
}

/// A falling potion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Powerup {
    pub id: u32,
    pub kind: PotionKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds left before it fades
    pub ttl: f32,
}

impl Powerup {
    pub fn new(id: u32, kind: PotionKind, pos: Vec2, ttl: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::new(0.0, POTION_FALL_SPEED),
            ttl,
        }
    }

    /// Pickup radius check against the player's hitbox center
    pub fn touches(&self, player: &Player) -> bool {
        self.pos.distance(player.hitbox_center()) <= PICKUP_RADIUS
    }
}

/// Move potions and drop expired or fallen ones
pub fn update_powerups(powerups: &mut Vec<Powerup>, dt: f32) {
    for p in powerups.iter_mut() {
        p.pos += p.vel * dt;
        p.ttl -= dt;
    }
    powerups.retain(|p| p.ttl > 0.0 && p.pos.y <= SCREEN_HEIGHT + 40.0);
}
