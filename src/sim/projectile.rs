//! Projectile manager
//!
//! Owns player- and enemy-owned projectiles plus beams. Entity vectors stay
//! sorted by id (ids are allocated monotonically), so the oldest shot is
//! always at the front.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::{angle_to_dir, dir_or};

/// How quickly homing shots bend toward their target (1/s)
pub const HOMING_TURN_RATE: f32 = 6.0;
/// Homing shots may speed up to this multiple of their launch speed
pub const HOMING_SPEED_CAP: f32 = 1.3;
/// Beam damage is applied in pulses this far apart (seconds)
pub const BEAM_PULSE_INTERVAL: f32 = 0.1;

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    /// Direction used when an aim vector degenerates: up-screen for the
    /// player, down-screen for enemies
    pub fn default_direction(self) -> Vec2 {
        match self {
            Faction::Player => Vec2::NEG_Y,
            Faction::Enemy => Vec2::Y,
        }
    }
}

/// Per-shot properties
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub damage: u32,
    pub size: Vec2,
    pub piercing: bool,
    pub homing: bool,
    /// Visual spin in degrees/s (0 = none)
    pub spin: f32,
}

impl Default for Shot {
    fn default() -> Self {
        Self {
            damage: 1,
            size: Vec2::new(8.0, 14.0),
            piercing: false,
            homing: false,
            spin: 0.0,
        }
    }
}

impl Shot {
    pub fn damage(mut self, damage: u32) -> Self {
        self.damage = damage;
        self
    }

    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.size = Vec2::new(width, height);
        self
    }

    pub fn piercing(mut self) -> Self {
        self.piercing = true;
        self
    }

    pub fn homing(mut self) -> Self {
        self.homing = true;
        self
    }

    pub fn spinning(mut self, degrees_per_sec: f32) -> Self {
        self.spin = degrees_per_sec;
        self
    }
}

/// Visual rotation state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spin {
    pub angle: f32,
    pub speed: f32,
}

/// A moving projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub owner: Faction,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: u32,
    pub size: Vec2,
    pub piercing: bool,
    pub homing: bool,
    /// Speed clamp for homing re-aim
    pub max_speed: f32,
    pub spin: Option<Spin>,
    /// Enemies a piercing shot has already damaged
    #[serde(skip)]
    pub hit_ids: Vec<u32>,
    /// Consumed by a hit; removed at the end of the collision pass
    #[serde(skip)]
    pub spent: bool,
}

impl Projectile {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }
}

/// Beam lifetime
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeamLife {
    /// Expires after this many seconds
    Timed(f32),
    /// Lives until the owner releases fire
    Continuous,
}

/// A rectangular damage volume extending up-screen (player) or down-screen
/// (enemy) from its origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    pub id: u32,
    pub owner: Faction,
    /// Emitter point (center of the beam's base)
    pub origin: Vec2,
    pub width: f32,
    pub height: f32,
    /// Damage per pulse
    pub damage: u32,
    pub life: BeamLife,
    pub age: f32,
    /// Time until the next damage pulse
    pub pulse_timer: f32,
}

impl Beam {
    /// Axis-aligned volume covered by the beam
    pub fn rect(&self) -> Rect {
        let dir = self.owner.default_direction();
        let center = self.origin + dir * (self.height / 2.0);
        Rect::new(center, Vec2::new(self.width, self.height))
    }

    /// Enemy x within the beam's width and y within its active vertical span
    pub fn covers(&self, pos: Vec2, size: Vec2) -> bool {
        let r = self.rect();
        (pos.x - r.center.x).abs() <= (r.half.x + size.x / 2.0)
            && (pos.y - r.center.y).abs() <= (r.half.y + size.y / 2.0)
    }

    pub fn is_expired(&self) -> bool {
        match self.life {
            BeamLife::Timed(duration) => self.age >= duration,
            BeamLife::Continuous => false,
        }
    }

    /// Advance the pulse clock; returns how many damage pulses fire this tick
    pub fn take_pulses(&mut self, dt: f32) -> u32 {
        self.pulse_timer -= dt;
        let mut pulses = 0;
        while self.pulse_timer <= 0.0 {
            pulses += 1;
            self.pulse_timer += BEAM_PULSE_INTERVAL;
        }
        pulses
    }
}

/// All live projectiles and beams
#[derive(Debug, Clone)]
pub struct ProjectileManager {
    pub player: Vec<Projectile>,
    pub enemy: Vec<Projectile>,
    pub beams: Vec<Beam>,
    next_id: u32,
    cap: usize,
    margin: f32,
}

impl ProjectileManager {
    pub fn new(cap: usize, margin: f32) -> Self {
        Self {
            player: Vec::new(),
            enemy: Vec::new(),
            beams: Vec::new(),
            next_id: 1,
            cap: cap.max(1),
            margin,
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Live non-beam projectiles across both pools
    pub fn len(&self) -> usize {
        self.player.len() + self.enemy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.beams.is_empty()
    }

    pub fn pool(&self, owner: Faction) -> &[Projectile] {
        match owner {
            Faction::Player => &self.player,
            Faction::Enemy => &self.enemy,
        }
    }

    /// Fire along an angle in degrees (90° = down-screen)
    pub fn fire_at_angle(&mut self, owner: Faction, origin: Vec2, angle_degrees: f32, speed: f32, shot: Shot) -> u32 {
        self.spawn(owner, origin, angle_to_dir(angle_degrees) * speed, shot)
    }

    /// Fire toward a point. A target on top of the origin fires along the
    /// owner's default direction.
    pub fn fire_at_point(&mut self, owner: Faction, origin: Vec2, target: Vec2, speed: f32, shot: Shot) -> u32 {
        let dir = dir_or(target - origin, owner.default_direction());
        self.spawn(owner, origin, dir * speed, shot)
    }

    /// Fire along an explicit velocity
    pub fn fire_with_velocity(&mut self, owner: Faction, origin: Vec2, vel: Vec2, shot: Shot) -> u32 {
        self.spawn(owner, origin, vel, shot)
    }

    /// Open a beam
    pub fn fire_beam(
        &mut self,
        owner: Faction,
        origin: Vec2,
        width: f32,
        height: f32,
        damage: u32,
        life: BeamLife,
    ) -> u32 {
        let id = self.next_id();
        self.beams.push(Beam {
            id,
            owner,
            origin,
            width,
            height,
            damage,
            life,
            age: 0.0,
            pulse_timer: 0.0,
        });
        id
    }

    fn spawn(&mut self, owner: Faction, origin: Vec2, vel: Vec2, shot: Shot) -> u32 {
        self.make_room();
        let id = self.next_id();
        let projectile = Projectile {
            id,
            owner,
            pos: origin,
            vel,
            damage: shot.damage,
            size: shot.size,
            piercing: shot.piercing,
            homing: shot.homing,
            max_speed: vel.length() * HOMING_SPEED_CAP,
            spin: (shot.spin != 0.0).then_some(Spin {
                angle: 0.0,
                speed: shot.spin,
            }),
            hit_ids: Vec::new(),
            spent: false,
        };
        match owner {
            Faction::Player => self.player.push(projectile),
            Faction::Enemy => self.enemy.push(projectile),
        }
        id
    }

    /// Recycle the oldest shots once the soft cap is reached
    fn make_room(&mut self) {
        while self.len() >= self.cap {
            let oldest_player = self.player.first().map(|p| p.id);
            let oldest_enemy = self.enemy.first().map(|p| p.id);
            match (oldest_player, oldest_enemy) {
                (Some(a), Some(b)) if a < b => {
                    self.player.remove(0);
                }
                (Some(_), None) => {
                    self.player.remove(0);
                }
                (_, Some(_)) => {
                    self.enemy.remove(0);
                }
                (None, None) => break,
            }
        }
    }

    /// Advance motion, homing re-aim, spin and expiry.
    ///
    /// `enemy_targets` are live enemy positions for player homing shots;
    /// `player_target` is the player's hitbox for enemy homing shots.
    pub fn update(&mut self, dt: f32, enemy_targets: &[Vec2], player_target: Vec2) {
        for p in &mut self.player {
            if p.homing {
                if let Some(target) = nearest(p.pos, enemy_targets) {
                    steer(p, target, dt);
                }
            }
            integrate(p, dt);
        }
        for p in &mut self.enemy {
            if p.homing {
                steer(p, player_target, dt);
            }
            integrate(p, dt);
        }

        let margin = self.margin;
        self.player.retain(|p| !p.spent && in_bounds(p.pos, margin));
        self.enemy.retain(|p| !p.spent && in_bounds(p.pos, margin));

        for beam in &mut self.beams {
            beam.age += dt;
        }
        self.beams.retain(|b| !b.is_expired());
    }

    /// Keep an owner's beams attached to its emitter
    pub fn move_beams(&mut self, owner: Faction, origin: Vec2) {
        for beam in self.beams.iter_mut().filter(|b| b.owner == owner) {
            beam.origin = origin;
        }
    }

    /// Close every continuous beam of `owner` (fire button released)
    pub fn end_continuous_beams(&mut self, owner: Faction) {
        self.beams
            .retain(|b| !(b.owner == owner && b.life == BeamLife::Continuous));
    }

    pub fn has_continuous_beam(&self, owner: Faction) -> bool {
        self.beams
            .iter()
            .any(|b| b.owner == owner && b.life == BeamLife::Continuous)
    }

    /// Drop shots consumed during collision resolution
    pub fn remove_spent(&mut self) {
        self.player.retain(|p| !p.spent);
        self.enemy.retain(|p| !p.spent);
    }

    pub fn clear(&mut self) {
        self.player.clear();
        self.enemy.clear();
        self.beams.clear();
    }

    /// Ensure deterministic ordering
    pub fn normalize_order(&mut self) {
        self.player.sort_by_key(|p| p.id);
        self.enemy.sort_by_key(|p| p.id);
        self.beams.sort_by_key(|b| b.id);
    }
}

fn nearest(from: Vec2, targets: &[Vec2]) -> Option<Vec2> {
    targets.iter().copied().min_by(|a, b| {
        a.distance_squared(from)
            .partial_cmp(&b.distance_squared(from))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

/// Nudge velocity toward the target direction, clamped to the shot's max speed
fn steer(p: &mut Projectile, target: Vec2, dt: f32) {
    let speed = p.vel.length().max(1.0);
    let desired = dir_or(target - p.pos, p.owner.default_direction()) * speed;
    let blend = (HOMING_TURN_RATE * dt).min(1.0);
    p.vel += (desired - p.vel) * blend;
    p.vel = p.vel.clamp_length_max(p.max_speed.max(1.0));
}

fn integrate(p: &mut Projectile, dt: f32) {
    p.pos += p.vel * dt;
    if let Some(spin) = &mut p.spin {
        spin.angle = (spin.angle + spin.speed * dt).rem_euclid(360.0);
    }
}

fn in_bounds(pos: Vec2, margin: f32) -> bool {
    pos.x >= -margin && pos.x <= SCREEN_WIDTH + margin && pos.y >= -margin && pos.y <= SCREEN_HEIGHT + margin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn manager() -> ProjectileManager {
        ProjectileManager::new(500, 100.0)
    }

    #[test]
    fn test_fire_at_angle_moves_down_screen() {
        let mut pm = manager();
        pm.fire_at_angle(Faction::Enemy, Vec2::new(100.0, 100.0), 90.0, 200.0, Shot::default());
        pm.update(0.5, &[], Vec2::ZERO);
        let p = &pm.enemy[0];
        assert!((p.pos.x - 100.0).abs() < 1e-3);
        assert!((p.pos.y - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_fire_at_point_zero_length_uses_default_direction() {
        let mut pm = manager();
        let origin = Vec2::new(300.0, 300.0);
        pm.fire_at_point(Faction::Enemy, origin, origin, 100.0, Shot::default());
        pm.fire_at_point(Faction::Player, origin, origin, 100.0, Shot::default());
        assert_eq!(pm.enemy[0].vel, Vec2::new(0.0, 100.0));
        assert_eq!(pm.player[0].vel, Vec2::new(0.0, -100.0));
    }

    #[test]
    fn test_fire_at_point_normalizes() {
        let mut pm = manager();
        pm.fire_at_point(Faction::Enemy, Vec2::ZERO, Vec2::new(30.0, 40.0), 10.0, Shot::default());
        assert!((pm.enemy[0].vel - Vec2::new(6.0, 8.0)).length() < 1e-4);
    }

    #[test]
    fn test_offscreen_projectiles_expire() {
        let mut pm = manager();
        pm.fire_at_angle(Faction::Player, Vec2::new(400.0, 10.0), -90.0, 1000.0, Shot::default());
        pm.fire_at_angle(Faction::Player, Vec2::new(400.0, 300.0), -90.0, 10.0, Shot::default());
        // Still inside the generous margin after a short hop
        pm.update(0.05, &[], Vec2::ZERO);
        assert_eq!(pm.player.len(), 2);
        pm.update(0.2, &[], Vec2::ZERO);
        assert_eq!(pm.player.len(), 1);
    }

    #[test]
    fn test_soft_cap_recycles_oldest() {
        let mut pm = ProjectileManager::new(3, 100.0);
        let first = pm.fire_at_angle(Faction::Enemy, Vec2::ZERO, 90.0, 1.0, Shot::default());
        pm.fire_at_angle(Faction::Player, Vec2::ZERO, -90.0, 1.0, Shot::default());
        pm.fire_at_angle(Faction::Enemy, Vec2::ZERO, 90.0, 1.0, Shot::default());
        pm.fire_at_angle(Faction::Player, Vec2::ZERO, -90.0, 1.0, Shot::default());
        assert_eq!(pm.len(), 3);
        assert!(pm.enemy.iter().all(|p| p.id != first));
    }

    #[test]
    fn test_homing_turns_toward_nearest_enemy() {
        let mut pm = manager();
        pm.fire_at_angle(
            Faction::Player,
            Vec2::new(400.0, 500.0),
            -90.0,
            300.0,
            Shot::default().homing(),
        );
        let far = Vec2::new(700.0, 100.0);
        let near = Vec2::new(100.0, 400.0);
        for _ in 0..30 {
            pm.update(SIM_DT, &[far, near], Vec2::ZERO);
        }
        let p = &pm.player[0];
        assert!(p.vel.x < 0.0, "should bend left toward the nearer enemy");
        assert!(p.vel.length() <= 300.0 * HOMING_SPEED_CAP + 1e-3);
    }

    #[test]
    fn test_beam_lifetimes() {
        let mut pm = manager();
        pm.fire_beam(Faction::Player, Vec2::new(400.0, 530.0), 40.0, 530.0, 1, BeamLife::Timed(1.0));
        pm.fire_beam(Faction::Player, Vec2::new(400.0, 530.0), 40.0, 530.0, 1, BeamLife::Continuous);
        pm.update(1.2, &[], Vec2::ZERO);
        assert_eq!(pm.beams.len(), 1);
        assert!(pm.has_continuous_beam(Faction::Player));
        pm.end_continuous_beams(Faction::Player);
        assert!(pm.beams.is_empty());
    }

    #[test]
    fn test_beam_covers_span_above_player() {
        let beam = Beam {
            id: 1,
            owner: Faction::Player,
            origin: Vec2::new(400.0, 530.0),
            width: 40.0,
            height: 300.0,
            damage: 1,
            life: BeamLife::Continuous,
            age: 0.0,
            pulse_timer: 0.0,
        };
        let size = Vec2::new(10.0, 10.0);
        assert!(beam.covers(Vec2::new(410.0, 300.0), size));
        assert!(!beam.covers(Vec2::new(450.0, 300.0), size));
        // Above the beam's reach
        assert!(!beam.covers(Vec2::new(400.0, 100.0), size));
        // Below the emitter
        assert!(!beam.covers(Vec2::new(400.0, 560.0), size));
    }

    #[test]
    fn test_beam_pulses() {
        let mut pm = manager();
        pm.fire_beam(Faction::Player, Vec2::ZERO, 10.0, 10.0, 1, BeamLife::Continuous);
        let beam = &mut pm.beams[0];
        assert_eq!(beam.take_pulses(SIM_DT), 1);
        assert_eq!(beam.take_pulses(0.05), 0);
        assert_eq!(beam.take_pulses(0.25), 3);
    }
}
