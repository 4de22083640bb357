//! Collision detection and response
//!
//! Axis-aligned rectangle and radius tests between the populations of one
//! tick, run after everything has moved. Whenever the player takes part in a
//! test, its position is the fixed collision line, never the bobbing sprite.

use glam::Vec2;

use super::enemy::Enemy;
use super::player::{HitOutcome, Player, PotionKind, Powerup};
use super::projectile::{Faction, ProjectileManager};

/// Axis-aligned rectangle stored as center and half extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub center: Vec2,
    pub half: Vec2,
}

impl Rect {
    /// Rectangle of `size` (width, height) centered on `center`
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size * 0.5,
        }
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        let d = (self.center - other.center).abs();
        d.x <= self.half.x + other.half.x && d.y <= self.half.y + other.half.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let d = (point - self.center).abs();
        d.x <= self.half.x && d.y <= self.half.y
    }
}

/// Circle-circle overlap
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) <= (ra + rb) * (ra + rb)
}

/// One enemy damaged during a pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyHit {
    pub enemy_id: u32,
    pub pos: Vec2,
    pub damage: u32,
    pub defeated: bool,
}

/// Everything that happened during one resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    pub enemy_hits: Vec<EnemyHit>,
    /// Hits that reached the player's absorption policy (ignored ones excluded)
    pub player_hits: Vec<HitOutcome>,
    pub pickups: Vec<PotionKind>,
}

/// Player damage rules for this pass
#[derive(Debug, Clone, Copy)]
pub struct DamageWindow {
    /// Simulation clock
    pub now: f32,
    /// Hits within this many seconds of the last one are ignored
    pub invulnerability: f32,
}

/// Run every collision pass in order: shots and beams into enemies, enemy
/// fire into the player, then potion pickups. Consumed shots are removed.
pub fn resolve(
    enemies: &mut [Enemy],
    projectiles: &mut ProjectileManager,
    player: &mut Player,
    powerups: &mut Vec<Powerup>,
    window: DamageWindow,
    dt: f32,
) -> CollisionReport {
    let mut report = CollisionReport::default();
    player_shots_vs_enemies(projectiles, enemies, &mut report);
    beams_vs_targets(projectiles, enemies, player, window, dt, &mut report);
    enemy_shots_vs_player(projectiles, player, window, &mut report);
    powerups_vs_player(powerups, player, &mut report);
    projectiles.remove_spent();
    report
}

/// A non-piercing shot damages at most one enemy; a piercing shot damages
/// every enemy it overlaps, each at most once over its lifetime.
pub fn player_shots_vs_enemies(projectiles: &mut ProjectileManager, enemies: &mut [Enemy], report: &mut CollisionReport) {
    for shot in projectiles.player.iter_mut().filter(|s| !s.spent) {
        let shot_rect = shot.rect();
        for enemy in enemies.iter_mut() {
            if !enemy.is_alive() || shot.hit_ids.contains(&enemy.id) {
                continue;
            }
            if !shot_rect.overlaps(&enemy.rect()) {
                continue;
            }
            let defeated = enemy.take_damage(shot.damage);
            report.enemy_hits.push(EnemyHit {
                enemy_id: enemy.id,
                pos: enemy.pos,
                damage: shot.damage,
                defeated,
            });
            if shot.piercing {
                shot.hit_ids.push(enemy.id);
            } else {
                shot.spent = true;
                break;
            }
        }
    }
}

/// Beams damage everything inside their span once per pulse
pub fn beams_vs_targets(
    projectiles: &mut ProjectileManager,
    enemies: &mut [Enemy],
    player: &mut Player,
    window: DamageWindow,
    dt: f32,
    report: &mut CollisionReport,
) {
    for beam in projectiles.beams.iter_mut() {
        let pulses = beam.take_pulses(dt);
        if pulses == 0 {
            continue;
        }
        let damage = beam.damage * pulses;
        match beam.owner {
            Faction::Player => {
                for enemy in enemies.iter_mut().filter(|e| e.is_alive()) {
                    if beam.covers(enemy.pos, enemy.desc.size) {
                        let defeated = enemy.take_damage(damage);
                        report.enemy_hits.push(EnemyHit {
                            enemy_id: enemy.id,
                            pos: enemy.pos,
                            damage,
                            defeated,
                        });
                    }
                }
            }
            Faction::Enemy => {
                let rect = player.rect();
                if beam.covers(rect.center, rect.half * 2.0) {
                    record_player_hit(player, damage, window, report);
                }
            }
        }
    }
}

/// Enemy shots are consumed on contact even during invulnerability
pub fn enemy_shots_vs_player(
    projectiles: &mut ProjectileManager,
    player: &mut Player,
    window: DamageWindow,
    report: &mut CollisionReport,
) {
    if player.is_dead() {
        return;
    }
    let player_rect = player.rect();
    for shot in projectiles.enemy.iter_mut().filter(|s| !s.spent) {
        if shot.rect().overlaps(&player_rect) {
            shot.spent = true;
            record_player_hit(player, shot.damage, window, report);
        }
    }
}

fn record_player_hit(player: &mut Player, damage: u32, window: DamageWindow, report: &mut CollisionReport) {
    let outcome = player.take_hit(damage, window.now, window.invulnerability);
    if outcome != HitOutcome::Ignored {
        report.player_hits.push(outcome);
    }
}

/// Collect every potion within pickup radius of the collision point
pub fn powerups_vs_player(powerups: &mut Vec<Powerup>, player: &mut Player, report: &mut CollisionReport) {
    powerups.retain(|p| {
        if p.touches(player) {
            player.apply_potion(p.kind);
            report.pickups.push(p.kind);
            false
        } else {
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::bestiary::EnemyKind;
    use crate::sim::enemy::EnemyRegistry;
    use crate::sim::formation::SpawnEntry;
    use crate::sim::player::Character;
    use crate::sim::projectile::{BeamLife, Shot};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const WINDOW: DamageWindow = DamageWindow {
        now: 0.0,
        invulnerability: 0.6,
    };

    /// Registry with settled (non-entering) enemies at the given points
    fn enemies_at(kind: EnemyKind, points: &[Vec2]) -> Vec<Enemy> {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut reg = EnemyRegistry::new();
        for &p in points {
            let entry = SpawnEntry {
                kind,
                position: p,
                motion: None,
                delay: 0.0,
                boss: false,
            };
            let id = reg.spawn(&entry, Vec2::ZERO, &mut rng);
            if let Some(e) = reg.get_mut(id) {
                e.pos = p;
                e.age = 1.0;
            }
        }
        reg.enemies
    }

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        assert!(a.overlaps(&Rect::new(Vec2::new(9.0, 0.0), Vec2::new(10.0, 10.0))));
        assert!(!a.overlaps(&Rect::new(Vec2::new(11.0, 0.0), Vec2::new(10.0, 10.0))));
        assert!(a.contains(Vec2::new(5.0, -5.0)));
        assert!(!a.contains(Vec2::new(5.1, 0.0)));
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(8.0, 0.0), 3.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(8.1, 0.0), 3.0));
    }

    #[test]
    fn test_non_piercing_hits_one_enemy() {
        let p = Vec2::new(400.0, 200.0);
        let mut enemies = enemies_at(EnemyKind::Gargoyle, &[p, p]);
        let mut pm = ProjectileManager::new(500, 100.0);
        pm.fire_at_angle(Faction::Player, p, -90.0, 500.0, Shot::default());
        let mut report = CollisionReport::default();
        player_shots_vs_enemies(&mut pm, &mut enemies, &mut report);
        assert_eq!(report.enemy_hits.len(), 1);
        assert_eq!(enemies[0].health, 2);
        assert_eq!(enemies[1].health, 3);
        pm.remove_spent();
        assert!(pm.player.is_empty());
    }

    #[test]
    fn test_piercing_hits_all_overlapping_once() {
        let p = Vec2::new(400.0, 200.0);
        let mut enemies = enemies_at(EnemyKind::Gargoyle, &[p, p, Vec2::new(700.0, 200.0)]);
        let mut pm = ProjectileManager::new(500, 100.0);
        pm.fire_at_angle(Faction::Player, p, -90.0, 500.0, Shot::default().piercing());

        let mut report = CollisionReport::default();
        player_shots_vs_enemies(&mut pm, &mut enemies, &mut report);
        assert_eq!(report.enemy_hits.len(), 2);
        assert_eq!(enemies[2].health, 3);

        // Still overlapping next pass, but never re-hits the same enemy
        let mut report = CollisionReport::default();
        player_shots_vs_enemies(&mut pm, &mut enemies, &mut report);
        assert!(report.enemy_hits.is_empty());
        assert_eq!(pm.player.len(), 1);
    }

    #[test]
    fn test_player_hit_uses_collision_line() {
        let mut player = Player::new(Character::Alchemist);
        let mut pm = ProjectileManager::new(500, 100.0);
        // Where the bobbing sprite is drawn, but well above the collision line
        let sprite_y = PLAYER_RENDER_Y - PLAYER_BOB_AMPLITUDE - PLAYER_HEIGHT / 2.0 - 10.0;
        pm.fire_with_velocity(Faction::Enemy, Vec2::new(player.x, sprite_y), Vec2::ZERO, Shot::default());
        let mut report = CollisionReport::default();
        enemy_shots_vs_player(&mut pm, &mut player, WINDOW, &mut report);
        assert!(report.player_hits.is_empty());

        pm.fire_with_velocity(Faction::Enemy, Vec2::new(player.x, PLAYER_COLLISION_Y), Vec2::ZERO, Shot::default());
        enemy_shots_vs_player(&mut pm, &mut player, WINDOW, &mut report);
        assert_eq!(report.player_hits, vec![HitOutcome::Wounded { health: 4 }]);
    }

    #[test]
    fn test_second_hit_inside_window_is_absorbed_by_nothing() {
        let mut player = Player::new(Character::Knight);
        let mut pm = ProjectileManager::new(500, 100.0);
        let at = player.hitbox_center();
        pm.fire_with_velocity(Faction::Enemy, at, Vec2::ZERO, Shot::default());
        pm.fire_with_velocity(Faction::Enemy, at, Vec2::ZERO, Shot::default());
        let mut report = CollisionReport::default();
        enemy_shots_vs_player(&mut pm, &mut player, WINDOW, &mut report);
        assert_eq!(report.player_hits.len(), 1);
        assert!((player.shield - 66.0).abs() < 1e-3);
        pm.remove_spent();
        assert!(pm.enemy.is_empty());
    }

    #[test]
    fn test_beam_pulses_damage_enemies_in_span() {
        let mut player = Player::new(Character::Knight);
        let origin = player.muzzle();
        let mut enemies = enemies_at(
            EnemyKind::Golem,
            &[Vec2::new(origin.x, 200.0), Vec2::new(origin.x + 200.0, 200.0)],
        );
        let mut pm = ProjectileManager::new(500, 100.0);
        pm.fire_beam(Faction::Player, origin, 48.0, origin.y, 1, BeamLife::Continuous);

        let mut report = CollisionReport::default();
        beams_vs_targets(&mut pm, &mut enemies, &mut player, WINDOW, 1.0 / 120.0, &mut report);
        assert_eq!(report.enemy_hits.len(), 1);
        assert_eq!(enemies[0].health, 3);
        assert_eq!(enemies[1].health, 4);

        // No pulse until the interval elapses
        let mut report = CollisionReport::default();
        beams_vs_targets(&mut pm, &mut enemies, &mut player, WINDOW, 1.0 / 120.0, &mut report);
        assert!(report.enemy_hits.is_empty());
    }

    #[test]
    fn test_pickups() {
        let mut player = Player::new(Character::Ranger);
        let near = player.hitbox_center() + Vec2::new(10.0, -10.0);
        let far = player.hitbox_center() + Vec2::new(200.0, 0.0);
        let mut powerups = vec![
            Powerup::new(1, PotionKind::Power, near, 8.0),
            Powerup::new(2, PotionKind::Health, far, 8.0),
        ];
        let mut report = CollisionReport::default();
        powerups_vs_player(&mut powerups, &mut player, &mut report);
        assert_eq!(report.pickups, vec![PotionKind::Power]);
        assert_eq!(player.power, 2);
        assert_eq!(powerups.len(), 1);
        assert_eq!(powerups[0].id, 2);
    }
}
