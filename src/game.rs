//! Frame driver
//!
//! Turns variable host frames into fixed simulation ticks, forwards commands
//! and hands the end-of-run rewards to the host exactly once.

use crate::consts::*;
use crate::sim::{Character, GameEvent, GameState, Phase, Snapshot, tick};
use crate::tuning::Tuning;

/// Receives the reward identifiers when a run ends
pub type RunCompleteCallback = Box<dyn FnMut(&[String])>;

/// Game instance holding all state
pub struct Game {
    state: GameState,
    accumulator: f32,
    on_run_complete: Option<RunCompleteCallback>,
    rewards_delivered: bool,
}

impl Game {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            state: GameState::new(seed, tuning),
            accumulator: 0.0,
            on_run_complete: None,
            rewards_delivered: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Register the host hook that receives rewards when the run ends
    pub fn on_run_complete(&mut self, callback: impl FnMut(&[String]) + 'static) {
        self.on_run_complete = Some(Box::new(callback));
    }

    /// Run simulation ticks for one host frame. Returns the substeps taken.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Drop backlog instead of replaying it next frame
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        self.deliver_rewards();
        substeps
    }

    fn deliver_rewards(&mut self) {
        if self.rewards_delivered {
            return;
        }
        let Some(rewards) = self.state.rewards.as_ref() else {
            return;
        };
        self.rewards_delivered = true;
        match self.on_run_complete.as_mut() {
            Some(callback) => callback(rewards),
            None => log::warn!("Run ended with {} rewards but no completion hook", rewards.len()),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.take_events()
    }

    /// Start the run as the named character (`alchemist`, `knight`, `ranger`)
    pub fn select_character(&mut self, name: &str) -> bool {
        match name.parse::<Character>() {
            Ok(character) => self.state.select_character(character),
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    pub fn move_left(&mut self, held: bool) {
        self.state.move_left(held);
    }

    pub fn move_right(&mut self, held: bool) {
        self.state.move_right(held);
    }

    pub fn set_aim_point(&mut self, x: f32, y: f32) {
        self.state.set_aim_point(x, y);
    }

    pub fn clear_aim_point(&mut self) {
        self.state.clear_aim_point();
    }

    pub fn set_firing(&mut self, firing: bool) {
        self.state.set_firing(firing);
    }

    pub fn trigger_special(&mut self) {
        self.state.trigger_special();
    }

    pub fn pause(&mut self) -> bool {
        self.state.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.state.resume()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_advance_clamps_long_frames() {
        let mut game = Game::new(1, Tuning::default());
        assert!(game.select_character("knight"));
        // 0.1s cap at 120 Hz is 12 ticks, but only 8 run per frame
        assert_eq!(game.advance(5.0), MAX_SUBSTEPS);
        assert!(game.state().clock <= MAX_SUBSTEPS as f32 * SIM_DT + 1e-4);

        let clock = game.state().clock;
        game.advance(f32::NAN);
        game.advance(-1.0);
        assert!(game.state().clock - clock <= SIM_DT + 1e-4);
    }

    #[test]
    fn test_unknown_character_is_rejected() {
        let mut game = Game::new(1, Tuning::default());
        assert!(!game.select_character("wizard"));
        assert_eq!(game.phase(), Phase::CharacterSelect);
        assert!(game.select_character(" Ranger "));
    }

    #[test]
    fn test_rewards_delivered_once() {
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        let mut game = Game::new(9, Tuning::default());
        game.on_run_complete(move |rewards| sink.borrow_mut().push(rewards.to_vec()));
        game.select_character("alchemist");
        game.state_mut().score = 300;
        game.state_mut().player.health = 0;

        game.advance(SIM_DT);
        game.advance(SIM_DT);
        assert_eq!(game.phase(), Phase::GameOver);
        let calls = received.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 3);
    }
}
