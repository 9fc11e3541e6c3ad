//! The state engine: pure event application over `UserState`.
//!
//! Every operation borrows the current state and returns a new one. The
//! input is never modified, so a failed operation leaves nothing to undo.
//! After each point change the unlocked set is re-derived from scratch; if
//! that relocks the selected reward, the engine reselects the most valuable
//! reward still unlocked and reports it in the outcome.
//!
//! # Example
//!
//! ```rust
//! use wellquest::engine::Engine;
//! use wellquest::validation::{Registration, TaskCompletion};
//!
//! let engine = Engine::reference();
//! let state = engine
//!     .create(&Registration {
//!         name: "Ada".to_string(),
//!         age: 30,
//!         screen_time_hours_per_day: 3.0,
//!         reward_id: 1,
//!     })
//!     .unwrap();
//!
//! let outcome = engine
//!     .complete_task(&state, &TaskCompletion::new(Some(1), 30.0))
//!     .unwrap();
//! assert_eq!(outcome.points_earned, 60);
//! assert!(outcome.state.is_unlocked(4));
//!
//! let state = engine.select_reward(&outcome.state, 4).unwrap();
//! assert_eq!(state.selected_reward_id(), 4);
//! ```

mod config;
mod outcome;

pub use config::{ConfigError, EngineConfig};
pub use outcome::{AppUsageOutcome, PointsOutcome, TaskOutcome};

use crate::catalog::{RewardCatalog, RewardId, TaskCatalog};
use crate::core::{best_unlocked, derive_unlocked, UserState};
use crate::error::EngineError;
use crate::validation::registration::check_screen_time;
use crate::validation::{Registration, RegistrationForm, TaskCompletion};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Applies events to user state under an immutable catalog and rule set.
#[derive(Clone, Debug)]
pub struct Engine {
    catalog: RewardCatalog,
    tasks: TaskCatalog,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine, checking that the configuration fits the catalogs.
    pub fn new(
        catalog: RewardCatalog,
        tasks: TaskCatalog,
        config: EngineConfig,
    ) -> Result<Self, ConfigError> {
        if tasks.lookup(config.default_task_id).is_none() {
            return Err(ConfigError::UnknownDefaultTask {
                id: config.default_task_id,
            });
        }
        Ok(Self {
            catalog,
            tasks,
            config,
        })
    }

    /// Engine over the reference catalogs and scoring.
    pub fn reference() -> Self {
        Self {
            catalog: RewardCatalog::reference(),
            tasks: TaskCatalog::reference(),
            config: EngineConfig::default(),
        }
    }

    pub fn catalog(&self) -> &RewardCatalog {
        &self.catalog
    }

    pub fn tasks(&self) -> &TaskCatalog {
        &self.tasks
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create the state for a new participant.
    ///
    /// The initial reward must be one of the always-unlocked rewards.
    pub fn create(&self, registration: &Registration) -> Result<UserState, EngineError> {
        let screen_time = check_screen_time(registration.screen_time_hours_per_day)?;
        let reward_id = registration.reward_id;
        let reward = self
            .catalog
            .lookup(reward_id)
            .ok_or(EngineError::UnknownReward { id: reward_id })?;
        if !reward.is_always_unlocked() {
            return Err(EngineError::RewardLocked { id: reward_id });
        }

        let state = UserState {
            name: registration.name.clone(),
            age: registration.age,
            screen_time_hours_per_day: screen_time,
            points: 0,
            selected_reward_id: reward_id,
            unlocked_reward_ids: derive_unlocked(0, &self.catalog),
            most_used_app_label: String::new(),
            task_completion_counts: BTreeMap::new(),
            study_session_count: 0,
            total_wellness_minutes: 0,
        };
        state.check_invariants(&self.catalog)?;

        info!(name = %state.name, reward_id, "participant registered");
        Ok(state)
    }

    /// Validate a raw registration form and create the state from it.
    pub fn register(&self, form: RegistrationForm) -> Result<UserState, EngineError> {
        let registration = form.into_registration()?;
        self.create(&registration)
    }

    /// Credit a completed task: points per whole minute, minutes, and a completion.
    pub fn complete_task(
        &self,
        state: &UserState,
        completion: &TaskCompletion,
    ) -> Result<TaskOutcome, EngineError> {
        let duration = completion.duration_minutes;
        if !duration.is_finite() || duration < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "duration must be a non-negative number of minutes, got {duration}"
            )));
        }

        // Any id is counted; the task catalog only drives display
        let task_id = completion.task_id.unwrap_or(self.config.default_task_id);

        // Float-to-int `as` saturates, and the value is already non-negative
        let minutes = duration.floor() as u64;
        let points_earned = minutes.saturating_mul(self.config.points_per_minute);

        let mut next = state.clone();
        next.points = next.points.saturating_add(points_earned);
        next.total_wellness_minutes = next.total_wellness_minutes.saturating_add(minutes);
        let count = next.task_completion_counts.entry(task_id).or_insert(0);
        *count = count.saturating_add(1);

        let (next, reselected) = self.settle(next)?;
        debug!(task_id, minutes, points_earned, points = next.points, "task completed");

        Ok(TaskOutcome {
            total_wellness_minutes: next.total_wellness_minutes,
            state: next,
            task_id,
            minutes,
            points_earned,
            reselected,
        })
    }

    /// Credit the flat bonus for starting a study session.
    pub fn start_study(&self, state: &UserState) -> Result<PointsOutcome, EngineError> {
        let mut next = state.clone();
        next.points = next.points.saturating_add(self.config.study_start_bonus);
        next.study_session_count = next.study_session_count.saturating_add(1);

        let outcome = self.points_outcome(next)?;
        debug!(
            sessions = outcome.state.study_session_count,
            points = outcome.points,
            "study session started"
        );
        Ok(outcome)
    }

    /// Debit the early-stop penalty. Points floor at zero.
    pub fn stop_study(&self, state: &UserState) -> Result<PointsOutcome, EngineError> {
        let mut next = state.clone();
        next.points = next.points.saturating_sub(self.config.study_stop_penalty);

        let outcome = self.points_outcome(next)?;
        debug!(points = outcome.points, "study session stopped early");
        Ok(outcome)
    }

    /// Record the most used app; naming this app earns the self-report bonus.
    pub fn report_app_usage(
        &self,
        state: &UserState,
        app_label: &str,
    ) -> Result<AppUsageOutcome, EngineError> {
        let mut next = state.clone();
        next.most_used_app_label = app_label.to_string();

        let bonus = self.config.is_self_report(app_label);
        if bonus {
            next.points = next.points.saturating_add(self.config.self_report_bonus);
        }

        let (next, reselected) = self.settle(next)?;
        debug!(app = app_label, bonus, points = next.points, "app usage reported");
        Ok(AppUsageOutcome {
            points: next.points,
            state: next,
            bonus,
            reselected,
        })
    }

    /// Switch the displayed reward. Only unlocked rewards can be selected.
    pub fn select_reward(
        &self,
        state: &UserState,
        reward_id: RewardId,
    ) -> Result<UserState, EngineError> {
        if self.catalog.lookup(reward_id).is_none() {
            return Err(EngineError::UnknownReward { id: reward_id });
        }
        if !state.is_unlocked(reward_id) {
            return Err(EngineError::RewardLocked { id: reward_id });
        }

        let mut next = state.clone();
        next.selected_reward_id = reward_id;
        next.check_invariants(&self.catalog)?;

        debug!(reward_id, "reward selected");
        Ok(next)
    }

    /// Bring a state read back from storage in line with this engine's catalog.
    ///
    /// Re-derives the unlocked set and repairs a selection that is no longer
    /// unlocked or no longer exists.
    pub fn restore(&self, state: UserState) -> Result<PointsOutcome, EngineError> {
        self.points_outcome(state)
    }

    fn points_outcome(&self, next: UserState) -> Result<PointsOutcome, EngineError> {
        let (state, reselected) = self.settle(next)?;
        Ok(PointsOutcome {
            points: state.points,
            state,
            reselected,
        })
    }

    /// Re-derive unlocks, repair the selection if it was relocked, and verify.
    fn settle(&self, mut state: UserState) -> Result<(UserState, Option<RewardId>), EngineError> {
        state.rederive(&self.catalog);

        let mut reselected = None;
        if !state.is_unlocked(state.selected_reward_id) {
            let fallback = best_unlocked(&state.unlocked_reward_ids, &self.catalog).ok_or_else(
                || EngineError::InvariantViolated("no reward is unlocked".to_string()),
            )?;
            warn!(
                previous = state.selected_reward_id,
                fallback,
                points = state.points,
                "selected reward relocked, reselecting"
            );
            state.selected_reward_id = fallback;
            reselected = Some(fallback);
        }

        state.check_invariants(&self.catalog)?;
        Ok((state, reselected))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(reward_id: RewardId) -> Registration {
        Registration {
            name: "Test User".to_string(),
            age: 25,
            screen_time_hours_per_day: 2.5,
            reward_id,
        }
    }

    fn fresh() -> (Engine, UserState) {
        let engine = Engine::reference();
        let state = engine.create(&registration(1)).unwrap();
        (engine, state)
    }

    fn with_points(engine: &Engine, points: u64) -> UserState {
        let mut state = engine.create(&registration(1)).unwrap();
        state.points = points;
        engine.restore(state).unwrap().state
    }

    #[test]
    fn create_starts_with_free_rewards() {
        let (engine, state) = fresh();
        assert_eq!(state.points(), 0);
        assert_eq!(state.selected_reward_id(), 1);
        assert_eq!(
            state.unlocked_reward_ids().iter().copied().collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(state.check_invariants(engine.catalog()).is_ok());
    }

    #[test]
    fn create_rejects_locked_initial_reward() {
        let engine = Engine::reference();
        assert_eq!(
            engine.create(&registration(4)),
            Err(EngineError::RewardLocked { id: 4 })
        );
        assert_eq!(
            engine.create(&registration(99)),
            Err(EngineError::UnknownReward { id: 99 })
        );
    }

    #[test]
    fn create_rejects_unrepresentable_screen_time() {
        let engine = Engine::reference();
        for hours in [f64::NAN, f64::INFINITY, -0.5] {
            let result = engine.create(&Registration {
                screen_time_hours_per_day: hours,
                ..registration(1)
            });
            assert!(matches!(
                result,
                Err(EngineError::TypeCoercion {
                    field: "screen_time",
                    ..
                })
            ));
        }
    }

    #[test]
    fn register_validates_form() {
        let engine = Engine::reference();
        let form = RegistrationForm {
            name: Some("Test User".to_string()),
            age: Some("25".to_string()),
            screen_time: Some("2.5".to_string()),
            reward_id: Some("2".to_string()),
        };
        assert_eq!(engine.register(form).unwrap().selected_reward_id(), 2);

        assert!(matches!(
            engine.register(RegistrationForm::default()),
            Err(EngineError::Registration { .. })
        ));
    }

    #[test]
    fn task_completion_credits_two_points_per_minute() {
        let (engine, state) = fresh();
        let outcome = engine
            .complete_task(&state, &TaskCompletion::new(Some(1), 30.0))
            .unwrap();

        assert_eq!(outcome.points_earned, 60);
        assert_eq!(outcome.state.points(), 60);
        assert_eq!(outcome.total_wellness_minutes, 30);
        assert_eq!(outcome.state.completions_of(1), 1);
        assert_eq!(outcome.reselected, None);
    }

    #[test]
    fn task_completion_leaves_input_untouched() {
        let (engine, state) = fresh();
        let before = state.clone();
        engine
            .complete_task(&state, &TaskCompletion::new(Some(2), 10.0))
            .unwrap();
        assert_eq!(state, before);
    }

    #[test]
    fn fractional_minutes_are_floored() {
        let (engine, state) = fresh();
        let outcome = engine
            .complete_task(&state, &TaskCompletion::new(Some(1), 12.9))
            .unwrap();
        assert_eq!(outcome.points_earned, 24);
        assert_eq!(outcome.total_wellness_minutes, 12);
    }

    #[test]
    fn missing_task_id_uses_default() {
        let (engine, state) = fresh();
        let outcome = engine
            .complete_task(&state, &TaskCompletion::new(None, 5.0))
            .unwrap();
        assert_eq!(outcome.task_id, 1);
        assert_eq!(outcome.minutes, 5);
        assert_eq!(outcome.state.completions_of(1), 1);
    }

    #[test]
    fn invalid_durations_are_rejected() {
        let (engine, state) = fresh();
        for duration in [-1.0, f64::NAN, f64::INFINITY] {
            let result = engine.complete_task(&state, &TaskCompletion::new(Some(1), duration));
            assert!(matches!(result, Err(EngineError::InvalidInput(_))));
        }
    }

    #[test]
    fn uncatalogued_task_is_still_counted() {
        let (engine, state) = fresh();
        let outcome = engine
            .complete_task(&state, &TaskCompletion::new(Some(6), 10.0))
            .unwrap();
        assert_eq!(outcome.task_id, 6);
        assert_eq!(outcome.points_earned, 20);
        assert_eq!(outcome.state.completions_of(6), 1);
        assert!(engine.tasks().lookup(6).is_none());
    }

    #[test]
    fn unlock_opens_at_fifty_points() {
        let (engine, state) = fresh();
        let half = TaskCompletion::new(Some(1), 25.0);

        let first = engine.complete_task(&state, &half).unwrap().state;
        assert_eq!(first.points(), 50);
        assert!(first.is_unlocked(4));

        let short = TaskCompletion::new(Some(1), 12.0);
        let below = engine.complete_task(&state, &short).unwrap().state;
        assert_eq!(below.points(), 24);
        assert!(!below.is_unlocked(4));
        assert_eq!(
            engine.select_reward(&below, 4),
            Err(EngineError::RewardLocked { id: 4 })
        );
    }

    #[test]
    fn two_twenty_five_minute_tasks_in_a_row() {
        let (engine, state) = fresh();
        let task = TaskCompletion::new(None, 25.0);

        let first = engine.complete_task(&state, &task).unwrap().state;
        assert_eq!(first.points(), 50);
        assert!(first.is_unlocked(4));
        let first = engine.select_reward(&first, 4).unwrap();

        let second = engine.complete_task(&first, &task).unwrap().state;
        assert_eq!(second.points(), 100);
        assert!(second.is_unlocked(4));
        assert!(second.is_unlocked(5));
        assert_eq!(second.selected_reward_id(), 4);
        assert_eq!(engine.select_reward(&second, 5).unwrap().selected_reward_id(), 5);
    }

    #[test]
    fn study_start_credits_and_counts() {
        let (engine, state) = fresh();
        let outcome = engine.start_study(&state).unwrap();
        assert_eq!(outcome.points, 10);
        assert_eq!(outcome.state.study_session_count(), 1);
    }

    #[test]
    fn study_stop_floors_at_zero() {
        let engine = Engine::reference();
        let state = with_points(&engine, 3);
        let outcome = engine.stop_study(&state).unwrap();
        assert_eq!(outcome.points, 0);

        let state = with_points(&engine, 12);
        assert_eq!(engine.stop_study(&state).unwrap().points, 7);
    }

    #[test]
    fn self_report_bonus_is_case_insensitive() {
        let (engine, state) = fresh();

        let outcome = engine.report_app_usage(&state, "This App").unwrap();
        assert_eq!(outcome.points, 20);
        assert!(outcome.bonus);
        assert_eq!(outcome.state.most_used_app_label(), "This App");

        let outcome = engine.report_app_usage(&state, "Instagram").unwrap();
        assert_eq!(outcome.points, 0);
        assert!(!outcome.bonus);
        assert_eq!(outcome.state.most_used_app_label(), "Instagram");
    }

    #[test]
    fn padded_self_report_earns_nothing() {
        let (engine, state) = fresh();
        let outcome = engine.report_app_usage(&state, " this app").unwrap();
        assert_eq!(outcome.points, 0);
        assert!(!outcome.bonus);
        assert_eq!(outcome.state.most_used_app_label(), " this app");

        let outcome = engine.report_app_usage(&state, "  this app ").unwrap();
        assert_eq!(outcome.points, 0);
    }

    #[test]
    fn select_unknown_reward_fails() {
        let (engine, state) = fresh();
        assert_eq!(
            engine.select_reward(&state, 11),
            Err(EngineError::UnknownReward { id: 11 })
        );
    }

    #[test]
    fn relocked_selection_falls_back() {
        let engine = Engine::reference();
        let state = with_points(&engine, 52);
        let state = engine.select_reward(&state, 4).unwrap();

        let outcome = engine.stop_study(&state).unwrap();
        assert_eq!(outcome.points, 47);
        assert!(!outcome.state.is_unlocked(4));
        assert_eq!(outcome.reselected, Some(3));
        assert_eq!(outcome.state.selected_reward_id(), 3);
    }

    #[test]
    fn selection_survives_when_still_unlocked() {
        let engine = Engine::reference();
        let state = with_points(&engine, 120);
        let state = engine.select_reward(&state, 4).unwrap();

        let outcome = engine.stop_study(&state).unwrap();
        assert_eq!(outcome.reselected, None);
        assert_eq!(outcome.state.selected_reward_id(), 4);
    }

    #[test]
    fn restore_repairs_stale_unlocks() {
        let engine = Engine::reference();
        let (_, mut state) = fresh();
        state.points = 200;

        let outcome = engine.restore(state).unwrap();
        assert_eq!(outcome.state.unlocked_reward_ids().len(), 7);
        assert_eq!(outcome.reselected, None);
    }

    #[test]
    fn new_rejects_unknown_default_task() {
        let config = EngineConfig {
            default_task_id: 9,
            ..EngineConfig::default()
        };
        let result = Engine::new(RewardCatalog::reference(), TaskCatalog::reference(), config);
        assert!(matches!(
            result,
            Err(ConfigError::UnknownDefaultTask { id: 9 })
        ));
    }
}
