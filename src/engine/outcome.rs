//! Results of applying an event.

use crate::catalog::{RewardId, TaskId};
use crate::core::UserState;
use serde::{Deserialize, Serialize};

/// Result of a task completion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub state: UserState,
    /// Task credited, after applying the default
    pub task_id: TaskId,
    /// Whole minutes credited
    pub minutes: u64,
    pub points_earned: u64,
    pub total_wellness_minutes: u64,
    /// Set when the previous selection was relocked and replaced
    pub reselected: Option<RewardId>,
}

/// Result of any other point-changing event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointsOutcome {
    pub state: UserState,
    pub points: u64,
    /// Set when the previous selection was relocked and replaced
    pub reselected: Option<RewardId>,
}

/// Result of an app-usage report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppUsageOutcome {
    pub state: UserState,
    pub points: u64,
    /// Whether the label earned the self-report bonus
    pub bonus: bool,
    pub reselected: Option<RewardId>,
}
