//! Wave director
//!
//! Round/wave state machine:
//!
//! ```text
//! CharacterSelect -> Spawning -> Active -> WaveClear -> Spawning ...
//!                                       -> RoundClear -> Spawning ...
//!                                       -> Victory
//! ```
//!
//! `Paused` and `GameOver` are reachable from every live phase. Deferred
//! work (staggered enemy spawns, the next wave after an announcement) sits in
//! a queue keyed by simulation-clock due time, so it freezes with the clock
//! while paused and is dropped when the run ends.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::formation::{FormationSpec, SpawnEntry, generate};
use super::movement::GroupMotion;
use super::projectile::Faction;
use super::reward::roll_rewards;
use super::state::GameState;
use super::waves::{formation_for, is_boss_wave, is_final_wave, waves_in_round};
use crate::tuning::TimeoutSurvivors;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Waiting for the host to pick a character
    CharacterSelect,
    /// Wave requested; its first batch of enemies is still arriving
    Spawning,
    /// Wave in progress; completion is checked every tick
    Active,
    /// "Next wave" announcement between waves
    WaveClear,
    /// Longer pause between rounds
    RoundClear,
    Paused,
    GameOver,
    Victory,
}

impl Phase {
    /// Phases in which the simulation clock runs
    pub fn is_live(self) -> bool {
        matches!(
            self,
            Phase::Spawning | Phase::Active | Phase::WaveClear | Phase::RoundClear
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::GameOver | Phase::Victory)
    }
}

/// Progress through the current wave
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveState {
    /// 1-based round
    pub round: u32,
    /// 1-based wave within the round
    pub wave: u32,
    /// Simulation clock when the wave was requested
    pub started_at: f32,
    /// First batch still arriving
    pub spawning: bool,
    /// Wave enemies alive or still queued
    pub enemies_remaining: usize,
    pub boss_wave: bool,
    /// Set once the wave's completion has been handled
    pub completed: bool,
    pub group_motion: GroupMotion,
    /// Shared offset applied to every in-formation enemy this wave
    pub formation_offset: Vec2,
}

impl Default for WaveState {
    fn default() -> Self {
        Self {
            round: 1,
            wave: 1,
            started_at: 0.0,
            spawning: false,
            enemies_remaining: 0,
            boss_wave: false,
            completed: false,
            group_motion: GroupMotion::Hold,
            formation_offset: Vec2::ZERO,
        }
    }
}

/// Banner text shown until `expires_at` on the simulation clock
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Announcement {
    pub text: String,
    pub expires_at: f32,
}

/// Work scheduled for later in the run
#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    /// Place one formation entry. `first_batch` entries gate `Spawning -> Active`.
    Spawn { entry: SpawnEntry, first_batch: bool },
    /// Request the wave the counters currently point at
    StartWave,
}

#[derive(Debug, Clone, PartialEq)]
struct Timer {
    due: f32,
    action: Deferred,
}

/// Non-boss waves end on timeout or when no counted enemy is left; boss waves
/// end only when every boss is down. Whichever condition holds first wins.
pub fn wave_complete(
    boss_wave: bool,
    elapsed: f32,
    timeout: f32,
    bosses_remaining: usize,
    non_flyby_remaining: usize,
) -> bool {
    if boss_wave {
        bosses_remaining == 0
    } else {
        elapsed >= timeout || non_flyby_remaining == 0
    }
}

#[derive(Debug, Clone)]
pub struct WaveDirector {
    pub phase: Phase,
    /// Phase to return to on resume
    paused_from: Option<Phase>,
    pub wave: WaveState,
    pub announcement: Option<Announcement>,
    /// Kept sorted by due time; equal due times keep insertion order
    timers: Vec<Timer>,
    first_batch_remaining: usize,
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveDirector {
    pub fn new() -> Self {
        Self {
            phase: Phase::CharacterSelect,
            paused_from: None,
            wave: WaveState::default(),
            announcement: None,
            timers: Vec::new(),
            first_batch_remaining: 0,
        }
    }

    pub fn schedule(&mut self, due: f32, action: Deferred) {
        let at = self.timers.partition_point(|t| t.due <= due);
        self.timers.insert(at, Timer { due, action });
    }

    /// Remove and return every action due at `now`, in due order
    pub fn take_due(&mut self, now: f32) -> Vec<Deferred> {
        let split = self.timers.partition_point(|t| t.due <= now);
        self.timers.drain(..split).map(|t| t.action).collect()
    }

    pub fn pending_spawns(&self) -> usize {
        self.timers
            .iter()
            .filter(|t| matches!(t.action, Deferred::Spawn { .. }))
            .count()
    }

    pub fn pending_bosses(&self) -> usize {
        self.timers
            .iter()
            .filter(|t| matches!(&t.action, Deferred::Spawn { entry, .. } if entry.boss))
            .count()
    }

    pub fn has_pending(&self) -> bool {
        !self.timers.is_empty()
    }

    /// Drop queued spawns of the current wave
    pub fn cancel_spawns(&mut self) {
        self.timers
            .retain(|t| !matches!(t.action, Deferred::Spawn { .. }));
        self.first_batch_remaining = 0;
    }

    /// Drop every deferred action
    pub fn clear_timers(&mut self) {
        self.timers.clear();
        self.first_batch_remaining = 0;
    }

    pub fn announce(&mut self, text: impl Into<String>, now: f32, secs: f32) {
        self.announcement = Some(Announcement {
            text: text.into(),
            expires_at: now + secs,
        });
    }

    /// Freeze a live phase. Returns false if there was nothing to pause.
    pub fn pause(&mut self) -> bool {
        if !self.phase.is_live() {
            return false;
        }
        self.paused_from = Some(self.phase);
        self.phase = Phase::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != Phase::Paused {
            return false;
        }
        self.phase = self.paused_from.take().unwrap_or(Phase::Active);
        true
    }
}

impl GameState {
    /// Request the formation for the current round/wave and queue its
    /// enemies, staggered by the spawn interval.
    pub fn spawn_wave(&mut self) {
        let (round, wave) = (self.director.wave.round, self.director.wave.wave);
        let spec = formation_for(round, wave).unwrap_or_else(|| {
            log::warn!("No formation for round {round} wave {wave}; using a default line");
            FormationSpec::fallback()
        });
        let entries = generate(&spec, &mut self.rng);
        let now = self.clock;
        let stagger = self.tuning.spawn_stagger_secs;

        self.director.cancel_spawns();
        let mut first_batch = 0;
        for (i, entry) in entries.into_iter().enumerate() {
            let due = now + entry.delay + i as f32 * stagger;
            let is_first = entry.delay <= 0.0;
            if is_first {
                first_batch += 1;
            }
            self.director.schedule(
                due,
                Deferred::Spawn {
                    entry,
                    first_batch: is_first,
                },
            );
        }
        self.director.first_batch_remaining = first_batch;

        let boss_wave = is_boss_wave(round, wave);
        self.director.wave = WaveState {
            round,
            wave,
            started_at: now,
            spawning: first_batch > 0,
            enemies_remaining: self.enemies.non_flyby_alive() + self.director.pending_spawns(),
            boss_wave,
            completed: false,
            group_motion: spec.group_motion,
            formation_offset: spec.group_motion.offset(0.0),
        };
        self.director.phase = if first_batch > 0 {
            Phase::Spawning
        } else {
            Phase::Active
        };

        log::info!(
            "Spawning round {} wave {} ({} enemies{})",
            round,
            wave,
            spec.expected_len(),
            if boss_wave { ", boss" } else { "" }
        );
        self.events.push(GameEvent::WaveStarted { round, wave });
    }

    /// Director step: fire due timers, move the shared formation offset and
    /// check wave completion.
    pub(crate) fn update_director(&mut self) {
        let now = self.clock;
        if self
            .director
            .announcement
            .as_ref()
            .is_some_and(|a| now >= a.expires_at)
        {
            self.director.announcement = None;
        }

        for action in self.director.take_due(now) {
            match action {
                Deferred::Spawn { entry, first_batch } => {
                    let offset = self.director.wave.formation_offset;
                    self.enemies.spawn(&entry, offset, &mut self.rng);
                    if first_batch {
                        self.director.first_batch_remaining =
                            self.director.first_batch_remaining.saturating_sub(1);
                        if self.director.first_batch_remaining == 0 {
                            self.director.wave.spawning = false;
                            if self.director.phase == Phase::Spawning {
                                self.director.phase = Phase::Active;
                            }
                        }
                    }
                }
                Deferred::StartWave => self.spawn_wave(),
            }
        }

        let elapsed = now - self.director.wave.started_at;
        let pending = self.director.pending_spawns();
        let wave = &mut self.director.wave;
        wave.formation_offset = wave.group_motion.offset(elapsed);
        wave.enemies_remaining = self.enemies.non_flyby_alive() + pending;

        if self.director.phase != Phase::Active || self.director.wave.completed {
            return;
        }
        let bosses = self.enemies.bosses_alive() + self.director.pending_bosses();
        let wave = &self.director.wave;
        if wave_complete(
            wave.boss_wave,
            elapsed,
            self.tuning.wave_timeout_secs,
            bosses,
            wave.enemies_remaining,
        ) {
            self.complete_wave(elapsed);
        }
    }

    /// Handle a wave clear exactly once: bonus, survivors, then the next
    /// wave, the next round or victory.
    fn complete_wave(&mut self, elapsed: f32) {
        if self.director.wave.completed {
            return;
        }
        self.director.wave.completed = true;
        let round = self.director.wave.round;
        let wave = self.director.wave.wave;
        let now = self.clock;

        let timed_out = !self.director.wave.boss_wave
            && self.director.wave.enemies_remaining > 0
            && elapsed >= self.tuning.wave_timeout_secs;
        self.director.cancel_spawns();
        if self.director.wave.boss_wave {
            let dismissed = self.enemies.dismiss_wave_enemies();
            log::debug!("Boss down; dismissed {dismissed} minions");
        } else if timed_out {
            match self.tuning.timeout_survivors {
                TimeoutSurvivors::CarryOver => {
                    log::info!(
                        "Wave {} timed out; {} enemies carry over",
                        wave,
                        self.enemies.non_flyby_alive()
                    );
                }
                TimeoutSurvivors::Clear => {
                    let dismissed = self.enemies.dismiss_wave_enemies();
                    log::info!("Wave {wave} timed out; cleared {dismissed} survivors");
                }
            }
        }

        let bonus = self.tuning.wave_clear_bonus * u64::from(wave) * u64::from(round);
        self.score = self.score.saturating_add(bonus);
        self.events.push(GameEvent::WaveCleared { round, wave, bonus });
        log::info!("Round {round} wave {wave} cleared (+{bonus})");

        if is_final_wave(round, wave) {
            self.finish_run(true);
            return;
        }

        let waves = waves_in_round(round).unwrap_or(wave);
        if wave < waves {
            self.director.wave.wave = wave + 1;
            self.director.phase = Phase::WaveClear;
            let secs = self.tuning.wave_announce_secs;
            self.director.announce(format!("Wave {}", wave + 1), now, secs);
            self.director.schedule(now + secs, Deferred::StartWave);
        } else {
            self.events.push(GameEvent::RoundCleared { round });
            self.director.wave.round = round + 1;
            self.director.wave.wave = 1;
            self.director.phase = Phase::RoundClear;
            let secs = self.tuning.round_announce_secs;
            self.director.announce(format!("Round {}", round + 1), now, secs);
            self.director.schedule(now + secs, Deferred::StartWave);
        }
    }

    /// Enter `Victory` or `GameOver` and roll rewards. Runs at most once.
    pub(crate) fn finish_run(&mut self, victory: bool) {
        if self.director.phase.is_terminal() {
            return;
        }
        self.director.clear_timers();
        self.director.announcement = None;
        self.projectiles.end_continuous_beams(Faction::Player);

        if victory {
            self.score = self.score.saturating_mul(self.tuning.victory_multiplier);
            self.director.phase = Phase::Victory;
            self.events.push(GameEvent::Victory { score: self.score });
            log::info!("Victory! Final score {}", self.score);
        } else {
            self.director.phase = Phase::GameOver;
            self.events.push(GameEvent::GameOver { score: self.score });
            log::info!(
                "Game over at round {} wave {} with score {}",
                self.director.wave.round,
                self.director.wave.wave,
                self.score
            );
        }

        let rewards = roll_rewards(self.score, victory, &self.tuning.rewards, &mut self.rng);
        self.rewards = Some(rewards);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::player::Character;
    use crate::tuning::Tuning;

    fn started() -> GameState {
        let mut state = GameState::new(42, Tuning::default());
        state.select_character(Character::Knight);
        state
    }

    fn kill_all(state: &mut GameState) {
        for e in state.enemies.enemies.iter_mut().filter(|e| !e.is_flyby()) {
            e.health = 0;
        }
        state.enemies.collect_defeated(&mut state.rng);
    }

    /// Advance the clock and run only the director step
    fn run_director(state: &mut GameState, secs: f32) {
        let steps = (secs * 120.0).round() as u32;
        for _ in 0..steps {
            state.clock += 1.0 / 120.0;
            state.update_director();
        }
    }

    #[test]
    fn test_completion_rule() {
        assert!(wave_complete(false, 30.0, 30.0, 0, 5));
        assert!(wave_complete(false, 2.0, 30.0, 0, 0));
        assert!(!wave_complete(false, 29.9, 30.0, 0, 1));
        assert!(!wave_complete(true, 100.0, 30.0, 1, 0));
        assert!(wave_complete(true, 1.0, 30.0, 0, 12));
    }

    #[test]
    fn test_timers_fire_in_due_order() {
        let mut d = WaveDirector::new();
        d.schedule(2.0, Deferred::StartWave);
        let entry = SpawnEntry {
            kind: crate::sim::bestiary::EnemyKind::Imp,
            position: Vec2::ZERO,
            motion: None,
            delay: 0.0,
            boss: false,
        };
        d.schedule(
            1.0,
            Deferred::Spawn {
                entry,
                first_batch: true,
            },
        );
        assert!(d.take_due(0.5).is_empty());
        let due = d.take_due(1.0);
        assert!(matches!(due.as_slice(), [Deferred::Spawn { .. }]));
        assert_eq!(d.take_due(5.0), vec![Deferred::StartWave]);
        assert!(!d.has_pending());
    }

    #[test]
    fn test_character_select_spawns_first_wave() {
        let mut state = started();
        assert_eq!(state.director.phase, Phase::Spawning);
        assert_eq!(state.director.pending_spawns(), 8);
        assert!(state.director.announcement.is_some());

        run_director(&mut state, 1.5);
        assert_eq!(state.director.phase, Phase::Active);
        assert_eq!(state.enemies.non_flyby_alive(), 8);
        assert!(!state.director.has_pending());
    }

    #[test]
    fn test_wave_clear_awards_bonus_once_and_advances() {
        let mut state = started();
        run_director(&mut state, 1.5);
        kill_all(&mut state);
        run_director(&mut state, 1.0 / 120.0);
        assert_eq!(state.director.phase, Phase::WaveClear);
        assert_eq!(state.score, 100);
        assert_eq!(state.director.wave.wave, 2);

        // Idempotent: more ticks during the announcement change nothing
        run_director(&mut state, 0.5);
        assert_eq!(state.score, 100);

        run_director(&mut state, 1.6);
        assert!(matches!(state.director.phase, Phase::Spawning | Phase::Active));
        let cleared = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::WaveCleared { .. }))
            .count();
        assert_eq!(cleared, 1);
    }

    #[test]
    fn test_timeout_carries_survivors_over() {
        let mut state = started();
        run_director(&mut state, 30.1);
        assert_eq!(state.director.phase, Phase::WaveClear);
        assert_eq!(state.enemies.non_flyby_alive(), 8);
    }

    #[test]
    fn test_timeout_can_clear_survivors() {
        let tuning = Tuning {
            timeout_survivors: TimeoutSurvivors::Clear,
            ..Tuning::default()
        };
        let mut state = GameState::new(42, tuning);
        state.select_character(Character::Ranger);
        run_director(&mut state, 30.1);
        assert_eq!(state.director.phase, Phase::WaveClear);
        assert_eq!(state.enemies.non_flyby_alive(), 0);
    }

    #[test]
    fn test_boss_wave_waits_for_boss() {
        let mut state = started();
        state.director.wave.wave = 5;
        state.spawn_wave();
        run_director(&mut state, 40.0);
        assert_eq!(state.director.phase, Phase::Active);

        // Minions alone do not end a boss wave
        for e in state.enemies.enemies.iter_mut().filter(|e| !e.boss) {
            e.health = 0;
        }
        state.enemies.collect_defeated(&mut state.rng);
        run_director(&mut state, 1.0 / 120.0);
        assert_eq!(state.director.phase, Phase::Active);

        kill_all(&mut state);
        run_director(&mut state, 1.0 / 120.0);
        assert_eq!(state.director.phase, Phase::RoundClear);
        assert_eq!(state.director.wave.round, 2);
        assert_eq!(state.director.wave.wave, 1);
        assert_eq!(state.score, 500);
    }

    #[test]
    fn test_final_wave_victory_multiplies_score() {
        let tuning = Tuning {
            wave_clear_bonus: 0,
            ..Tuning::default()
        };
        let mut state = GameState::new(42, tuning);
        state.select_character(Character::Alchemist);
        state.director.wave.round = 3;
        state.director.wave.wave = 8;
        state.spawn_wave();
        run_director(&mut state, 1.0);
        state.score = 500;
        kill_all(&mut state);
        run_director(&mut state, 1.0 / 120.0);
        assert_eq!(state.director.phase, Phase::Victory);
        assert_eq!(state.score, 3000);
        assert!(state.rewards.is_some());
        assert!(!state.director.has_pending());
    }

    #[test]
    fn test_unknown_wave_falls_back_to_line() {
        let mut state = started();
        state.director.wave.round = 9;
        state.director.wave.wave = 1;
        state.spawn_wave();
        assert_eq!(state.director.pending_spawns(), 8);
        assert!(!state.director.wave.boss_wave);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut d = WaveDirector::new();
        assert!(!d.pause());
        d.phase = Phase::WaveClear;
        assert!(d.pause());
        assert_eq!(d.phase, Phase::Paused);
        assert!(d.resume());
        assert_eq!(d.phase, Phase::WaveClear);
        assert!(!d.resume());
    }

    #[test]
    fn test_game_over_drops_deferred_spawns() {
        let mut state = started();
        assert!(state.director.has_pending());
        state.finish_run(false);
        assert_eq!(state.director.phase, Phase::GameOver);
        assert!(!state.director.has_pending());
        let rewards = state.rewards.clone();
        state.finish_run(true);
        assert_eq!(state.director.phase, Phase::GameOver);
        assert_eq!(state.rewards, rewards);
    }
}
