//! Fixed timestep simulation tick
//!
//! Update order within a tick is Director -> Player -> Enemies ->
//! Projectiles -> Collisions -> Powerups. Collisions read the positions
//! produced earlier in the same tick.

use super::collision::{self, DamageWindow};
use super::enemy::EnemyContext;
use super::events::GameEvent;
use super::player::{HitOutcome, Powerup, Special, update_powerups};
use super::projectile::Faction;
use super::state::GameState;

/// Advance the game state by `dt` seconds. Does nothing outside live phases,
/// so every timer stays frozen while paused.
pub fn tick(state: &mut GameState, dt: f32) {
    if !state.director.phase.is_live() {
        state.controls.special_requested = false;
        return;
    }
    state.clock += dt;

    state.update_director();
    if state.director.phase.is_terminal() {
        state.normalize_order();
        return;
    }

    update_player(state, dt);
    update_enemies(state, dt);

    let targets = state.enemies.targets();
    let player_target = state.player.hitbox_center();
    state.projectiles.update(dt, &targets, player_target);

    resolve_collisions(state, dt);
    update_powerups(&mut state.powerups, dt);

    if state.player.is_dead() {
        state.finish_run(false);
    }
    state.normalize_order();
}

fn update_player(state: &mut GameState, dt: f32) {
    let controls = state.controls;
    let player = &mut state.player;
    player.update_movement(controls.left, controls.right, dt);
    player.update_timers(state.clock, dt);

    if controls.special_requested {
        state.controls.special_requested = false;
        // The held beam needs the fire button down to exist at all
        let needs_fire = player.character.profile().special == Special::HeldBeam;
        if !needs_fire || controls.firing {
            let cooldown = state.tuning.special_cooldown_secs;
            if let Some(special) = player.try_special(controls.aim, cooldown, &mut state.projectiles) {
                log::debug!("Special {:?} used", special);
                state.events.push(GameEvent::SpecialUsed { special });
            }
        }
    }

    if controls.firing {
        player.try_fire(controls.aim, &mut state.projectiles);
    } else {
        state.projectiles.end_continuous_beams(Faction::Player);
    }
    state.projectiles.move_beams(Faction::Player, player.muzzle());
}

fn update_enemies(state: &mut GameState, dt: f32) {
    let ctx = EnemyContext {
        dt,
        now: state.clock,
        formation_offset: state.director.wave.formation_offset,
        player: state.player.hitbox_center(),
    };
    state.enemies.update(&ctx, &mut state.projectiles, &mut state.rng);
    let settings = state.flyby_settings();
    state.enemies.update_flybys(dt, &settings, &mut state.rng);
}

fn resolve_collisions(state: &mut GameState, dt: f32) {
    let window = DamageWindow {
        now: state.clock,
        invulnerability: state.tuning.invulnerability_secs,
    };
    let report = collision::resolve(
        &mut state.enemies.enemies,
        &mut state.projectiles,
        &mut state.player,
        &mut state.powerups,
        window,
        dt,
    );

    for hit in &report.enemy_hits {
        state.events.push(GameEvent::EnemyHit {
            id: hit.enemy_id,
            pos: hit.pos,
        });
    }
    for outcome in &report.player_hits {
        state.events.push(GameEvent::PlayerHit {
            health: state.player.health,
            shield: state.player.shield,
        });
        if let HitOutcome::Shielded { broke: true } = outcome {
            state.events.push(GameEvent::ShieldBroken);
        }
    }
    for &kind in &report.pickups {
        state.events.push(GameEvent::PowerupCollected { kind });
    }

    for defeat in state.enemies.collect_defeated(&mut state.rng) {
        state.score = state.score.saturating_add(defeat.points);
        state.events.push(GameEvent::EnemyDefeated {
            id: defeat.id,
            kind: defeat.kind,
            pos: defeat.pos,
            points: defeat.points,
            boss: defeat.boss,
        });
        if let Some(kind) = defeat.potion {
            let id = state.next_powerup_id();
            log::debug!("{:?} potion dropped by #{}", kind, defeat.id);
            let ttl = state.tuning.potion_lifetime_secs;
            state.powerups.push(Powerup::new(id, kind, defeat.pos, ttl));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::director::Phase;
    use crate::sim::player::Character;
    use crate::sim::projectile::Shot;
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn started(character: Character) -> GameState {
        let mut state = GameState::new(3, Tuning::default());
        state.select_character(character);
        state
    }

    fn run(state: &mut GameState, secs: f32) {
        for _ in 0..(secs / SIM_DT).round() as u32 {
            tick(state, SIM_DT);
        }
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut state = started(Character::Knight);
        run(&mut state, 1.0);
        state.pause();
        let clock = state.clock;
        let positions: Vec<Vec2> = state.enemies.enemies.iter().map(|e| e.pos).collect();
        let timers: Vec<f32> = state.enemies.enemies.iter().map(|e| e.shot_timer).collect();
        run(&mut state, 5.0);
        assert_eq!(state.clock, clock);
        assert_eq!(positions, state.enemies.enemies.iter().map(|e| e.pos).collect::<Vec<_>>());
        assert_eq!(timers, state.enemies.enemies.iter().map(|e| e.shot_timer).collect::<Vec<_>>());

        state.resume();
        run(&mut state, SIM_DT);
        assert!(state.clock > clock);
    }

    #[test]
    fn test_firing_scores_kills() {
        let mut state = started(Character::Ranger);
        state.set_firing(true);
        run(&mut state, 8.0);
        assert!(state.score > 0);
        assert!(
            state
                .take_events()
                .iter()
                .any(|e| matches!(e, GameEvent::EnemyDefeated { .. }))
        );
    }

    #[test]
    fn test_enemy_shot_hits_player_and_emits_event() {
        let mut state = started(Character::Alchemist);
        let at = state.player.hitbox_center();
        state
            .projectiles
            .fire_with_velocity(Faction::Enemy, at, Vec2::ZERO, Shot::default());
        tick(&mut state, SIM_DT);
        assert_eq!(state.player.health, 4);
        assert!(state.events.iter().any(|e| matches!(e, GameEvent::PlayerHit { health: 4, .. })));
    }

    #[test]
    fn test_death_ends_run_with_rewards() {
        let mut state = started(Character::Alchemist);
        state.score = 250;
        state.player.health = 1;
        let at = state.player.hitbox_center();
        state
            .projectiles
            .fire_with_velocity(Faction::Enemy, at, Vec2::ZERO, Shot::default());
        tick(&mut state, SIM_DT);
        assert_eq!(state.phase(), Phase::GameOver);
        assert_eq!(state.rewards.as_ref().map(Vec::len), Some(2));

        // Terminal: further ticks are no-ops
        let clock = state.clock;
        tick(&mut state, SIM_DT);
        assert_eq!(state.clock, clock);
    }

    #[test]
    fn test_held_beam_closes_on_release() {
        let mut state = started(Character::Knight);
        state.trigger_special();
        tick(&mut state, SIM_DT);
        // Not firing: request dropped, cooldown untouched
        assert!(state.player.special_ready());
        assert!(!state.projectiles.has_continuous_beam(Faction::Player));

        state.set_firing(true);
        state.trigger_special();
        tick(&mut state, SIM_DT);
        assert!(state.projectiles.has_continuous_beam(Faction::Player));
        assert!(!state.player.special_ready());

        state.set_firing(false);
        tick(&mut state, SIM_DT);
        assert!(!state.projectiles.has_continuous_beam(Faction::Player));
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = started(Character::Ranger);
        let mut b = started(Character::Ranger);
        for s in [&mut a, &mut b] {
            s.set_firing(true);
            s.move_left(true);
        }
        run(&mut a, 6.0);
        run(&mut b, 6.0);
        assert_eq!(a.score, b.score);
        assert_eq!(a.enemies.enemies, b.enemies.enemies);
        assert_eq!(a.projectiles.enemy, b.projectiles.enemy);
    }
}
