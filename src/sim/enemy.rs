//! Enemy registry
//!
//! Owns every live enemy, keyed and ordered by id. Each tick it moves
//! in-formation enemies along `base + group offset + motion + jitter`,
//! moves standalone and flyby enemies by velocity, fires volleys through the
//! [`ProjectileManager`] and runs the independent flyby spawner.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::bestiary::{EnemyDescriptor, EnemyKind, FirePattern, choose_mid_boss_pattern};
use super::collision::Rect;
use super::formation::SpawnEntry;
use super::movement::{Motion, jitter, standalone_velocity};
use super::player::PotionKind;
use super::projectile::{Faction, ProjectileManager, Shot};
use crate::consts::*;

/// Enemy shot speed (pixels/s)
pub const ENEMY_SHOT_SPEED: f32 = 200.0;
pub const BOSS_SHOT_SPEED: f32 = 240.0;
/// How long a hit enemy flashes
pub const HIT_FLASH_SECS: f32 = 0.12;
/// Fleeing enemies fade over their last second
pub const FADE_SECS: f32 = 1.0;

/// A live enemy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    #[serde(skip)]
    pub desc: EnemyDescriptor,
    pub pos: Vec2,
    /// Formation anchor
    pub base: Vec2,
    pub health: u32,
    pub max_health: u32,
    /// Time until the next volley
    pub shot_timer: f32,
    /// Simulation clock of the last volley
    pub last_shot_at: Option<f32>,
    pub motion: Option<Motion>,
    pub in_formation: bool,
    /// Seconds alive
    pub age: f32,
    /// Seconds since breaking formation
    pub standalone_age: f32,
    /// Flyby velocity
    pub vel: Vec2,
    /// Seconds until a fleeing type removes itself
    pub ttl: Option<f32>,
    pub boss: bool,
    pub hit_flash: f32,
}

impl Enemy {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_flyby(&self) -> bool {
        self.desc.is_flyby()
    }

    pub fn is_mid_boss(&self) -> bool {
        self.desc.is_mid_boss()
    }

    /// Still easing in from above the screen
    pub fn is_entering(&self) -> bool {
        self.in_formation && self.age < ENEMY_ENTRY_DURATION
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.desc.size)
    }

    /// Render alpha; fleeing types fade out near the end of their ttl
    pub fn alpha(&self) -> f32 {
        match self.ttl {
            Some(ttl) => (ttl / FADE_SECS).clamp(0.0, 1.0),
            None => 1.0,
        }
    }

    /// Apply damage. Returns true if this hit defeated the enemy.
    pub fn take_damage(&mut self, damage: u32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = self.health.saturating_sub(damage);
        self.hit_flash = HIT_FLASH_SECS;
        self.health == 0
    }

    /// Leave the formation and switch to the type's standalone movement
    pub fn break_formation(&mut self) {
        self.in_formation = false;
        self.motion = None;
        self.standalone_age = 0.0;
    }
}

/// A defeated enemy, ready for scoring and loot
#[derive(Debug, Clone, PartialEq)]
pub struct Defeat {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub points: u64,
    pub boss: bool,
    pub potion: Option<PotionKind>,
}

/// Per-tick inputs shared by all enemies
#[derive(Debug, Clone, Copy)]
pub struct EnemyContext {
    pub dt: f32,
    /// Simulation clock
    pub now: f32,
    /// Shared formation offset of the current wave
    pub formation_offset: Vec2,
    /// Player collision point, for targeted shots and dives
    pub player: Vec2,
}

/// Flyby spawner settings
#[derive(Debug, Clone, Copy)]
pub struct FlybySettings {
    pub interval_min: f32,
    pub interval_max: f32,
    pub speed: f32,
}

#[derive(Debug, Clone)]
pub struct EnemyRegistry {
    pub enemies: Vec<Enemy>,
    next_id: u32,
    /// Time until the next flyby
    flyby_timer: f32,
}

impl Default for EnemyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EnemyRegistry {
    pub fn new() -> Self {
        Self {
            enemies: Vec::new(),
            next_id: 1,
            flyby_timer: 0.0,
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    fn create(&mut self, kind: EnemyKind, pos: Vec2, rng: &mut impl Rng) -> Enemy {
        let desc = kind.descriptor();
        // First volley comes somewhere in the first cooldown
        let shot_timer = if desc.shot_cooldown > 0.0 {
            desc.shot_cooldown * rng.random_range(0.5..1.0)
        } else {
            0.0
        };
        Enemy {
            id: self.next_id(),
            kind,
            desc,
            pos,
            base: pos,
            health: desc.health,
            max_health: desc.health,
            shot_timer,
            last_shot_at: None,
            motion: None,
            in_formation: false,
            age: 0.0,
            standalone_age: 0.0,
            vel: Vec2::ZERO,
            ttl: desc.ttl,
            boss: desc.is_boss(),
            hit_flash: 0.0,
        }
    }

    /// Create an enemy from a formation entry. It starts above the screen and
    /// eases down to its slot.
    pub fn spawn(&mut self, entry: &SpawnEntry, formation_offset: Vec2, rng: &mut impl Rng) -> u32 {
        let mut enemy = self.create(entry.kind, entry.initial_position(), rng);
        enemy.base = entry.position;
        enemy.motion = entry.motion.clone();
        enemy.in_formation = true;
        enemy.boss |= entry.boss;
        enemy.pos = entry_position(enemy.base + formation_offset, 0.0);
        let id = enemy.id;
        log::debug!("Spawned {} #{} at {:?}", entry.kind.as_str(), id, entry.position);
        self.enemies.push(enemy);
        id
    }

    /// Spawn a flyby crossing from one side at a random height
    pub fn spawn_flyby(&mut self, speed: f32, rng: &mut impl Rng) -> u32 {
        let kind = if rng.random_bool(0.5) {
            EnemyKind::Phoenix
        } else {
            EnemyKind::Sprite
        };
        let from_left = rng.random_bool(0.5);
        let y = rng.random_range(40.0..200.0);
        let half = kind.descriptor().size.x / 2.0;
        let (x, dir) = if from_left {
            (-half, 1.0)
        } else {
            (SCREEN_WIDTH + half, -1.0)
        };
        let mut enemy = self.create(kind, Vec2::new(x, y), rng);
        enemy.vel = Vec2::new(dir * speed, 0.0);
        let id = enemy.id;
        log::debug!("Flyby {} #{} entering from the {}", kind.as_str(), id, if from_left { "left" } else { "right" });
        self.enemies.push(enemy);
        id
    }

    /// Flyby sub-spawner, independent of wave bookkeeping
    pub fn update_flybys(&mut self, dt: f32, settings: &FlybySettings, rng: &mut impl Rng) {
        self.flyby_timer -= dt;
        if self.flyby_timer <= 0.0 {
            self.spawn_flyby(settings.speed, rng);
            self.flyby_timer = roll_interval(settings, rng);
        }
    }

    /// Restart the flyby countdown
    pub fn reset_flyby_timer(&mut self, settings: &FlybySettings, rng: &mut impl Rng) {
        self.flyby_timer = roll_interval(settings, rng);
    }

    /// Move every enemy and fire volleys that are due
    pub fn update(&mut self, ctx: &EnemyContext, projectiles: &mut ProjectileManager, rng: &mut impl Rng) {
        let dt = ctx.dt;
        for enemy in &mut self.enemies {
            if !enemy.is_alive() {
                continue;
            }
            enemy.age += dt;
            enemy.hit_flash = (enemy.hit_flash - dt).max(0.0);
            if let Some(ttl) = enemy.ttl.as_mut() {
                *ttl -= dt;
            }

            if enemy.is_flyby() {
                enemy.pos += enemy.vel * dt;
            } else if enemy.in_formation {
                let mut offset = ctx.formation_offset + jitter(enemy.id, enemy.age);
                if let Some(motion) = enemy.motion.as_mut() {
                    motion.advance(dt);
                    offset += motion.offset(enemy.age);
                }
                let slot = enemy.base + offset;
                enemy.pos = entry_position(slot, enemy.age / ENEMY_ENTRY_DURATION);
            } else {
                enemy.standalone_age += dt;
                let vel = standalone_velocity(
                    enemy.desc.standalone,
                    enemy.pos,
                    ctx.player.x,
                    enemy.desc.speed,
                    enemy.standalone_age,
                );
                enemy.pos += vel * dt;
            }

            if enemy.desc.shot_cooldown <= 0.0 || enemy.is_entering() || !on_screen(enemy.pos) {
                continue;
            }
            enemy.shot_timer -= dt;
            if enemy.shot_timer <= 0.0 {
                let pattern = if enemy.is_mid_boss() {
                    choose_mid_boss_pattern(enemy.kind, enemy.health, enemy.max_health, rng)
                        .unwrap_or(enemy.desc.fire)
                } else {
                    enemy.desc.fire
                };
                fire_pattern(pattern.resolve(rng), enemy, ctx.player, projectiles);
                enemy.last_shot_at = Some(ctx.now);
                enemy.shot_timer = enemy.desc.shot_cooldown * rng.random_range(0.8..1.2);
            }
        }

        // Flybys leave through the sides; fleeing types expire; stragglers fall off the bottom
        self.enemies.retain(|e| {
            if !e.is_alive() {
                return true;
            }
            if e.ttl.is_some_and(|t| t <= 0.0) {
                return false;
            }
            if e.is_flyby() {
                let half = e.desc.size.x / 2.0;
                let leaving = (e.vel.x > 0.0 && e.pos.x > SCREEN_WIDTH + half)
                    || (e.vel.x < 0.0 && e.pos.x < -half);
                return !leaving;
            }
            e.in_formation || e.pos.y < SCREEN_HEIGHT + e.desc.size.y
        });
    }

    /// Remove defeated enemies, rolling their potion drops
    pub fn collect_defeated(&mut self, rng: &mut impl Rng) -> Vec<Defeat> {
        let mut defeated = Vec::new();
        self.enemies.retain(|e| {
            if e.is_alive() {
                return true;
            }
            let potion = if rng.random_bool(f64::from(e.desc.potion_chance).clamp(0.0, 1.0)) {
                Some(PotionKind::roll(rng))
            } else {
                None
            };
            defeated.push(Defeat {
                id: e.id,
                kind: e.kind,
                pos: e.pos,
                points: e.desc.points,
                boss: e.boss,
                potion,
            });
            false
        });
        defeated
    }

    /// Boss-tagged enemies still alive
    pub fn bosses_alive(&self) -> usize {
        self.enemies.iter().filter(|e| e.boss && e.is_alive()).count()
    }

    /// Living enemies that count toward wave completion
    pub fn non_flyby_alive(&self) -> usize {
        self.enemies
            .iter()
            .filter(|e| !e.is_flyby() && e.is_alive())
            .count()
    }

    /// Drop wave enemies without awarding anything. Flybys stay.
    pub fn dismiss_wave_enemies(&mut self) -> usize {
        let before = self.enemies.len();
        self.enemies.retain(|e| e.is_flyby());
        before - self.enemies.len()
    }

    /// Positions of living enemies, for homing shots
    pub fn targets(&self) -> Vec<Vec2> {
        self.enemies
            .iter()
            .filter(|e| e.is_alive())
            .map(|e| e.pos)
            .collect()
    }

    pub fn clear(&mut self) {
        self.enemies.clear();
    }

    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
    }
}

fn roll_interval(settings: &FlybySettings, rng: &mut impl Rng) -> f32 {
    if settings.interval_max > settings.interval_min {
        rng.random_range(settings.interval_min..settings.interval_max)
    } else {
        settings.interval_min
    }
}

/// Ease from above the screen down to `slot`; `progress` runs 0..1
fn entry_position(slot: Vec2, progress: f32) -> Vec2 {
    let p = progress.clamp(0.0, 1.0);
    let ease = 1.0 - (1.0 - p) * (1.0 - p);
    let start = Vec2::new(slot.x, -ENEMY_ENTRY_HEIGHT);
    start.lerp(slot, ease)
}

fn on_screen(pos: Vec2) -> bool {
    (0.0..=SCREEN_WIDTH).contains(&pos.x) && (0.0..=SCREEN_HEIGHT).contains(&pos.y)
}

/// Emit one volley. Angles are in degrees, 90° is straight down-screen.
fn fire_pattern(pattern: FirePattern, enemy: &Enemy, player: Vec2, projectiles: &mut ProjectileManager) {
    let origin = enemy.pos + Vec2::new(0.0, enemy.desc.size.y / 2.0);
    let speed = if enemy.boss {
        BOSS_SHOT_SPEED
    } else {
        ENEMY_SHOT_SPEED
    };
    let shot = Shot::default().damage(enemy.desc.shot_damage).sized(10.0, 10.0);
    if pattern == FirePattern::Targeted {
        projectiles.fire_at_point(Faction::Enemy, origin, player, speed, shot);
        return;
    }
    let mut fire = |angle: f32, speed: f32| {
        projectiles.fire_at_angle(Faction::Enemy, origin, angle, speed, shot);
    };

    match pattern {
        FirePattern::Silent => {}
        FirePattern::Straight => fire(90.0, speed),
        FirePattern::AngledPair => {
            fire(75.0, speed);
            fire(105.0, speed);
        }
        FirePattern::WideFan => {
            for i in 0..5 {
                fire(50.0 + i as f32 * 20.0, speed);
            }
        }
        FirePattern::NarrowSpread => {
            for angle in [80.0, 90.0, 100.0] {
                fire(angle, speed);
            }
        }
        FirePattern::CircleBurst => {
            for i in 0..12 {
                fire(i as f32 * 30.0, speed * 0.8);
            }
        }
        FirePattern::VBurst => {
            for k in 0..3 {
                let s = speed * (1.0 - 0.15 * k as f32);
                fire(60.0, s);
                fire(120.0, s);
            }
        }
        // Targeted fired above; RandomChoice is resolved before firing
        FirePattern::Targeted | FirePattern::RandomChoice => fire(90.0, speed),
    }
}
