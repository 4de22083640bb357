//! End-of-run reward roll
//!
//! Rolled once when a run reaches `Victory` or `GameOver`. The result is an
//! ordered list of item ids for the host's inventory.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Zone loot table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardTable {
    pub zone: String,
    /// Common items, drawn uniformly
    pub items: Vec<String>,
    /// Score per common reward
    pub points_per_reward: u64,
    pub max_rewards: usize,
    pub rare_item: String,
    /// Rare rolls happen only at or above this score
    pub rare_threshold: u64,
    pub rare_trials: u32,
    pub rare_chance: f64,
    /// Victory-only unique item
    pub legendary_item: String,
    pub legendary_chance: f64,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            zone: "storm_peaks".into(),
            items: [
                "ember_moss",
                "storm_feather",
                "glimmer_dust",
                "wisp_essence",
                "gargoyle_chip",
                "salamander_scale",
                "moonwater",
                "bat_wing",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            points_per_reward: 100,
            max_rewards: 100,
            rare_item: "drake_heart".into(),
            rare_threshold: 2000,
            rare_trials: 3,
            rare_chance: 0.25,
            legendary_item: "philosophers_ember".into(),
            legendary_chance: 0.25,
        }
    }
}

impl RewardTable {
    /// `min(score / points_per_reward, max_rewards)`
    pub fn reward_count(&self, score: u64) -> usize {
        let per = self.points_per_reward.max(1);
        usize::try_from(score / per)
            .unwrap_or(usize::MAX)
            .min(self.max_rewards)
    }
}

/// Roll the run's rewards: common draws, then rare trials, then the legendary roll
pub fn roll_rewards<R: Rng>(score: u64, victory: bool, table: &RewardTable, rng: &mut R) -> Vec<String> {
    let count = if table.items.is_empty() {
        0
    } else {
        table.reward_count(score)
    };
    let mut rewards: Vec<String> = (0..count)
        .map(|_| table.items[rng.random_range(0..table.items.len())].clone())
        .collect();

    if score >= table.rare_threshold {
        for _ in 0..table.rare_trials {
            if rng.random_bool(table.rare_chance) {
                rewards.push(table.rare_item.clone());
            }
        }
    }

    if victory && rng.random_bool(table.legendary_chance) {
        rewards.push(table.legendary_item.clone());
    }

    log::info!(
        "Rolled {} rewards for zone {} (score {}, victory {})",
        rewards.len(),
        table.zone,
        score,
        victory
    );
    rewards
}
