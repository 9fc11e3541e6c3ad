//! The per-session user record.

use super::unlock::derive_unlocked;
use crate::catalog::{RewardCatalog, RewardId, TaskId};
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Everything the engine knows about one participant.
///
/// The record is flat and serializable so it can travel as a session
/// payload. Fields are read through accessors; only the engine writes them,
/// and it re-checks the invariants after every write:
///
/// - the unlocked set equals `derive_unlocked(points)`
/// - the selected reward is in the unlocked set
/// - points never go negative (enforced by `u64` and saturating subtraction)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub(crate) name: String,
    pub(crate) age: u32,
    pub(crate) screen_time_hours_per_day: f64,
    pub(crate) points: u64,
    pub(crate) selected_reward_id: RewardId,
    pub(crate) unlocked_reward_ids: BTreeSet<RewardId>,
    pub(crate) most_used_app_label: String,
    pub(crate) task_completion_counts: BTreeMap<TaskId, u32>,
    pub(crate) study_session_count: u32,
    /// Older payloads predate this field
    #[serde(default)]
    pub(crate) total_wellness_minutes: u64,
}

impl UserState {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn screen_time_hours_per_day(&self) -> f64 {
        self.screen_time_hours_per_day
    }

    pub fn points(&self) -> u64 {
        self.points
    }

    pub fn selected_reward_id(&self) -> RewardId {
        self.selected_reward_id
    }

    pub fn unlocked_reward_ids(&self) -> &BTreeSet<RewardId> {
        &self.unlocked_reward_ids
    }

    pub fn is_unlocked(&self, id: RewardId) -> bool {
        self.unlocked_reward_ids.contains(&id)
    }

    pub fn most_used_app_label(&self) -> &str {
        &self.most_used_app_label
    }

    pub fn task_completion_counts(&self) -> &BTreeMap<TaskId, u32> {
        &self.task_completion_counts
    }

    /// Completions recorded for one task; zero if never completed.
    pub fn completions_of(&self, task_id: TaskId) -> u32 {
        self.task_completion_counts
            .get(&task_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn study_session_count(&self) -> u32 {
        self.study_session_count
    }

    pub fn total_wellness_minutes(&self) -> u64 {
        self.total_wellness_minutes
    }

    /// Verify the record against the catalog it was built with.
    ///
    /// Returns the first violation found.
    pub fn check_invariants(&self, catalog: &RewardCatalog) -> Result<(), EngineError> {
        let expected = derive_unlocked(self.points, catalog);
        if self.unlocked_reward_ids != expected {
            return Err(EngineError::InvariantViolated(format!(
                "unlocked rewards {:?} do not match {:?} derived from {} points",
                self.unlocked_reward_ids, expected, self.points
            )));
        }

        if !self.unlocked_reward_ids.contains(&self.selected_reward_id) {
            return Err(EngineError::InvariantViolated(format!(
                "selected reward {} is not unlocked",
                self.selected_reward_id
            )));
        }

        Ok(())
    }

    /// Replace the unlocked set with the one derived from the current points.
    pub(crate) fn rederive(&mut self, catalog: &RewardCatalog) {
        self.unlocked_reward_ids = derive_unlocked(self.points, catalog);
    }
}
