//! Read model for rendering a participant's dashboard.

use crate::catalog::{RewardDefinition, WellnessTask};
use crate::core::{next_unlock, UserState};
use crate::engine::Engine;
use serde::{Deserialize, Serialize};

/// One reward as shown in the avatar picker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardTile {
    pub reward: RewardDefinition,
    pub unlocked: bool,
    pub selected: bool,
}

/// The next reward on the ladder and how far away it is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NextUnlock {
    pub reward: RewardDefinition,
    pub points_needed: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskTile {
    pub task: WellnessTask,
    pub completions: u32,
}

/// Everything a dashboard page needs, detached from the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub name: String,
    pub points: u64,
    pub total_wellness_minutes: u64,
    pub study_session_count: u32,
    pub most_used_app_label: String,
    pub current_reward: RewardDefinition,
    pub rewards: Vec<RewardTile>,
    pub next_unlock: Option<NextUnlock>,
    pub tasks: Vec<TaskTile>,
}

impl Dashboard {
    pub fn build(engine: &Engine, state: &UserState) -> Self {
        let catalog = engine.catalog();

        // A selection missing from the catalog shows the first reward
        let current_reward = catalog
            .lookup(state.selected_reward_id())
            .unwrap_or_else(|| catalog.first())
            .clone();

        let rewards = catalog
            .rewards()
            .iter()
            .map(|reward| RewardTile {
                unlocked: state.is_unlocked(reward.id),
                selected: reward.id == state.selected_reward_id(),
                reward: reward.clone(),
            })
            .collect();

        let next_unlock = next_unlock(state.points(), catalog).map(|(reward, points_needed)| {
            NextUnlock {
                reward: reward.clone(),
                points_needed,
            }
        });

        let tasks = engine
            .tasks()
            .tasks()
            .iter()
            .map(|task| TaskTile {
                completions: state.completions_of(task.id),
                task: task.clone(),
            })
            .collect();

        Self {
            name: state.name().to_string(),
            points: state.points(),
            total_wellness_minutes: state.total_wellness_minutes(),
            study_session_count: state.study_session_count(),
            most_used_app_label: state.most_used_app_label().to_string(),
            current_reward,
            rewards,
            next_unlock,
            tasks,
        }
    }

    /// Rewards currently available to select.
    pub fn unlocked_count(&self) -> usize {
        self.rewards.iter().filter(|tile| tile.unlocked).count()
    }
}
