//! Whole-run scenarios driven through the public API

use std::cell::RefCell;
use std::rc::Rc;

use alchemy_raid::consts::*;
use alchemy_raid::sim::{GameEvent, Phase};
use alchemy_raid::{Game, Tuning};

/// Drive a run, defeating every enemy the moment it appears and keeping
/// the player topped up, until the run ends or `limit` seconds pass.
fn run_with_scripted_kills(game: &mut Game, limit: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    while !game.phase().is_terminal() && game.state().clock < limit {
        {
            let state = game.state_mut();
            for enemy in &mut state.enemies.enemies {
                enemy.health = 0;
            }
            state.player.health = state.player.max_health;
        }
        game.advance(SIM_DT);
        events.extend(game.drain_events());
    }
    events
}

#[test]
fn scripted_run_reaches_victory() {
    let delivered = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&delivered);
    let mut game = Game::new(2024, Tuning::default());
    game.on_run_complete(move |rewards| sink.borrow_mut().push(rewards.to_vec()));
    assert!(game.select_character("ranger"));

    let events = run_with_scripted_kills(&mut game, 600.0);
    assert_eq!(game.phase(), Phase::Victory);

    let waves_started = events
        .iter()
        .filter(|e| matches!(e, GameEvent::WaveStarted { .. }))
        .count();
    assert_eq!(waves_started, 5 + 7 + 8);
    let rounds_cleared: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::RoundCleared { round } => Some(*round),
            _ => None,
        })
        .collect();
    assert_eq!(rounds_cleared, vec![1, 2]);

    let kill_points: u64 = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::EnemyDefeated { points, .. } => Some(*points),
            _ => None,
        })
        .sum();
    let Some(GameEvent::Victory { score }) = events.iter().find(|e| matches!(e, GameEvent::Victory { .. })) else {
        panic!("no victory event");
    };
    assert_eq!(*score, game.state().score);
    assert!(*score >= kill_points * 6);

    let calls = delivered.borrow();
    assert_eq!(calls.len(), 1);
    let table = &game.state().tuning.rewards;
    assert!(calls[0].len() >= table.reward_count(*score));

    // Frames after the end change nothing and never re-deliver
    let clock = game.state().clock;
    game.advance(0.1);
    assert_eq!(game.state().clock, clock);
    assert_eq!(delivered.borrow().len(), 1);
}

#[test]
fn pause_freezes_waves_and_announcements() {
    let mut game = Game::new(5, Tuning::default());
    game.select_character("knight");
    game.advance(0.05);
    assert!(game.state().director.announcement.is_some());

    assert!(game.pause());
    assert_eq!(game.phase(), Phase::Paused);
    let before = game.snapshot();
    for _ in 0..600 {
        game.advance(0.1);
    }
    assert_eq!(game.snapshot(), before);
    // Round banner is still up after a minute of wall time
    assert!(game.state().director.announcement.is_some());

    assert!(game.resume());
    assert_ne!(game.phase(), Phase::Paused);
    game.advance(0.05);
    assert!(game.state().clock > before.clock);
}

#[test]
fn defeat_delivers_score_based_rewards() {
    let delivered = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&delivered);
    let mut game = Game::new(77, Tuning::default());
    game.on_run_complete(move |rewards| *sink.borrow_mut() = Some(rewards.to_vec()));
    game.select_character("alchemist");

    // Stand still without firing until the formation wears the alchemist down
    while !game.phase().is_terminal() && game.state().clock < 600.0 {
        game.advance(1.0 / 60.0);
    }
    if game.phase() != Phase::GameOver {
        // Survived by luck; force the ending through damage instead
        game.state_mut().player.health = 0;
        game.advance(SIM_DT);
    }

    assert_eq!(game.phase(), Phase::GameOver);
    let events = game.drain_events();
    assert!(events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })));
    let score = game.state().score;
    let rewards = delivered.borrow().clone().expect("rewards delivered");
    assert_eq!(rewards.len(), ((score / 100) as usize).min(100) + rare_count(&rewards));
}

fn rare_count(rewards: &[String]) -> usize {
    let table = Tuning::default().rewards;
    rewards.iter().filter(|r| **r == table.rare_item).count()
}
