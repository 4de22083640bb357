//! Data-driven game balance
//!
//! Every timing and balance constant the combat core reads lives here so a
//! host can override it from JSON without rebuilding.

use serde::{Deserialize, Serialize};

use crate::sim::reward::RewardTable;

/// Errors while loading a tuning document
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("Failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid tuning value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// What happens to enemies still alive when a regular wave times out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutSurvivors {
    /// Survivors stay on the field and count toward the next wave
    #[default]
    CarryOver,
    /// Survivors are removed without awarding points
    Clear,
}

/// Balance and timing knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// A regular wave is cleared after this long even with survivors
    pub wave_timeout_secs: f32,
    /// "Next wave" announcement pause before the following spawn
    pub wave_announce_secs: f32,
    /// Longer pause between rounds
    pub round_announce_secs: f32,
    /// Delay between consecutive enemy spawns within one formation
    pub spawn_stagger_secs: f32,
    /// Hits within this window after a hit are ignored
    pub invulnerability_secs: f32,
    /// Soft cap on concurrent non-beam projectiles
    pub projectile_cap: usize,
    /// Projectiles this far outside the screen are dropped
    pub offscreen_margin: f32,
    pub flyby_interval_min_secs: f32,
    pub flyby_interval_max_secs: f32,
    /// Horizontal speed of flyby enemies (pixels/s)
    pub flyby_speed: f32,
    pub victory_multiplier: u64,
    /// Wave clear bonus is `wave_clear_bonus * wave * round`
    pub wave_clear_bonus: u64,
    pub timeout_survivors: TimeoutSurvivors,
    pub special_cooldown_secs: f32,
    pub potion_lifetime_secs: f32,
    pub rewards: RewardTable,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            wave_timeout_secs: 30.0,
            wave_announce_secs: 2.0,
            round_announce_secs: 3.5,
            spawn_stagger_secs: 0.12,
            invulnerability_secs: 0.6,
            projectile_cap: 500,
            offscreen_margin: 100.0,
            flyby_interval_min_secs: 10.0,
            flyby_interval_max_secs: 18.0,
            flyby_speed: 60.0,
            victory_multiplier: 6,
            wave_clear_bonus: 100,
            timeout_survivors: TimeoutSurvivors::CarryOver,
            special_cooldown_secs: 10.0,
            potion_lifetime_secs: 8.0,
            rewards: RewardTable::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let timers = [
            ("wave_timeout_secs", self.wave_timeout_secs),
            ("wave_announce_secs", self.wave_announce_secs),
            ("round_announce_secs", self.round_announce_secs),
            ("invulnerability_secs", self.invulnerability_secs),
            ("flyby_interval_min_secs", self.flyby_interval_min_secs),
            ("special_cooldown_secs", self.special_cooldown_secs),
            ("potion_lifetime_secs", self.potion_lifetime_secs),
        ];
        for (field, value) in timers {
            if !(value > 0.0) {
                return Err(TuningError::Invalid {
                    field,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }
        if self.spawn_stagger_secs < 0.0 {
            return Err(TuningError::Invalid {
                field: "spawn_stagger_secs",
                reason: "must not be negative".into(),
            });
        }
        if self.flyby_interval_max_secs < self.flyby_interval_min_secs {
            return Err(TuningError::Invalid {
                field: "flyby_interval_max_secs",
                reason: "must be at least flyby_interval_min_secs".into(),
            });
        }
        if self.projectile_cap == 0 {
            return Err(TuningError::Invalid {
                field: "projectile_cap",
                reason: "must be at least 1".into(),
            });
        }
        let chances = [
            ("rewards.rare_chance", self.rewards.rare_chance),
            ("rewards.legendary_chance", self.rewards.legendary_chance),
        ];
        for (field, p) in chances {
            if !(0.0..=1.0).contains(&p) {
                return Err(TuningError::Invalid {
                    field,
                    reason: format!("probability out of range: {p}"),
                });
            }
        }
        if self.rewards.items.is_empty() {
            return Err(TuningError::Invalid {
                field: "rewards.items",
                reason: "zone item list is empty".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.wave_timeout_secs, 30.0);
        assert_eq!(tuning.victory_multiplier, 6);
        assert_eq!(tuning.projectile_cap, 500);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "wave_timeout_secs": 12.5, "timeout_survivors": "clear" }"#)
            .expect("valid tuning");
        assert_eq!(tuning.wave_timeout_secs, 12.5);
        assert_eq!(tuning.timeout_survivors, TimeoutSurvivors::Clear);
        assert_eq!(tuning.invulnerability_secs, 0.6);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Tuning::from_json(r#"{ "projectile_cap": 0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "projectile_cap", .. }));

        let err = Tuning::from_json(r#"{ "wave_timeout_secs": -1.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "wave_timeout_secs", .. }));

        let err = Tuning::from_json("not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }
}
