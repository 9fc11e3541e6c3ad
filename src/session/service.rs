//! Request facade over the engine and a session store.
//!
//! Each method maps to one request of the wellness app. A missing or
//! unknown session id yields `EngineError::SessionRequired`, which the HTTP
//! layer turns into its "not logged in" response.

use super::store::{InMemorySessionStore, SessionStore};
use super::{SessionError, SessionId, SessionSnapshot};
use crate::core::UserState;
use crate::dashboard::Dashboard;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::ledger::{Activity, LedgerEntry, PointLedger, DEFAULT_LEDGER_RETENTION};
use crate::validation::{
    app_label_from_json, reward_id_from_json, RegistrationForm, TaskCompletion,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors surfaced to the request layer.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ServiceError {
    /// Whether the caller should be sent back to registration.
    pub fn is_session_required(&self) -> bool {
        matches!(self, Self::Engine(EngineError::SessionRequired))
    }
}

/// Response to a task completion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    pub points: u64,
    pub points_earned: u64,
    pub total_wellness_minutes: u64,
}

/// Response to study and app-usage events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointsReport {
    pub points: u64,
}

/// Serves requests for many independent sessions.
pub struct SessionService<S: SessionStore = InMemorySessionStore> {
    engine: Arc<Engine>,
    store: S,
    ledger_retention: usize,
}

impl SessionService<InMemorySessionStore> {
    /// Service over the reference engine and an in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(Engine::reference()), InMemorySessionStore::new())
    }
}

impl<S: SessionStore> SessionService<S> {
    pub fn new(engine: Arc<Engine>, store: S) -> Self {
        Self {
            engine,
            store,
            ledger_retention: DEFAULT_LEDGER_RETENTION,
        }
    }

    /// Keep at most `retention` ledger entries in sessions opened from now on.
    pub fn with_ledger_retention(mut self, retention: usize) -> Self {
        self.ledger_retention = retention;
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Validate the form, create the participant, and open a session.
    pub fn register(&self, form: RegistrationForm) -> Result<(SessionId, UserState), ServiceError> {
        let state = self.engine.register(form)?;
        let ledger = PointLedger::with_retention(self.ledger_retention)
            .record(LedgerEntry::new(Activity::Registered, 0, 0));
        let snapshot = SessionSnapshot::new(state.clone(), ledger);
        let id = snapshot.id;

        self.store.insert(snapshot)?;
        info!(session_id = %id, "session opened");
        Ok((id, state))
    }

    /// Handle `{"task_id"?, "duration"}`.
    pub fn complete_task(
        &self,
        session: Option<SessionId>,
        payload: &Value,
    ) -> Result<TaskReport, ServiceError> {
        self.apply(session, |engine, state| {
            let completion = TaskCompletion::from_json(payload)?;
            let outcome = engine.complete_task(state, &completion)?;
            let activity = Activity::TaskCompleted {
                task_id: outcome.task_id,
                minutes: outcome.minutes,
            };
            let report = TaskReport {
                points: outcome.state.points(),
                points_earned: outcome.points_earned,
                total_wellness_minutes: outcome.total_wellness_minutes,
            };
            Ok((outcome.state, report, activity))
        })
    }

    pub fn start_study(&self, session: Option<SessionId>) -> Result<PointsReport, ServiceError> {
        self.apply(session, |engine, state| {
            let outcome = engine.start_study(state)?;
            let report = PointsReport {
                points: outcome.points,
            };
            Ok((outcome.state, report, Activity::StudyStarted))
        })
    }

    pub fn stop_study(&self, session: Option<SessionId>) -> Result<PointsReport, ServiceError> {
        self.apply(session, |engine, state| {
            let outcome = engine.stop_study(state)?;
            let report = PointsReport {
                points: outcome.points,
            };
            Ok((outcome.state, report, Activity::StudyStopped))
        })
    }

    /// Handle `{"app_name"}`.
    pub fn report_app_usage(
        &self,
        session: Option<SessionId>,
        payload: &Value,
    ) -> Result<PointsReport, ServiceError> {
        self.apply(session, |engine, state| {
            let label = app_label_from_json(payload)?;
            let outcome = engine.report_app_usage(state, &label)?;
            let report = PointsReport {
                points: outcome.points,
            };
            let activity = Activity::AppUsageReported {
                bonus: outcome.bonus,
            };
            Ok((outcome.state, report, activity))
        })
    }

    /// Handle `{"avatar_id"}`.
    pub fn select_reward(
        &self,
        session: Option<SessionId>,
        payload: &Value,
    ) -> Result<(), ServiceError> {
        self.apply(session, |engine, state| {
            let reward_id = reward_id_from_json(payload)?;
            let next = engine.select_reward(state, reward_id)?;
            Ok((next, (), Activity::RewardSelected { reward_id }))
        })
    }

    /// Current state of a session, brought in line with the catalog.
    pub fn state(&self, session: Option<SessionId>) -> Result<UserState, ServiceError> {
        let snapshot = self.snapshot(session)?;
        Ok(self.engine.restore(snapshot.state)?.state)
    }

    pub fn ledger(&self, session: Option<SessionId>) -> Result<PointLedger, ServiceError> {
        Ok(self.snapshot(session)?.ledger)
    }

    pub fn dashboard(&self, session: Option<SessionId>) -> Result<Dashboard, ServiceError> {
        let state = self.state(session)?;
        Ok(Dashboard::build(&self.engine, &state))
    }

    /// Close a session. Returns whether it was open.
    pub fn end_session(&self, session: SessionId) -> Result<bool, ServiceError> {
        let existed = self.store.remove(session)?;
        info!(session_id = %session, existed, "session closed");
        Ok(existed)
    }

    fn snapshot(&self, session: Option<SessionId>) -> Result<SessionSnapshot, ServiceError> {
        let id = session.ok_or(EngineError::SessionRequired)?;
        self.store
            .load(id)?
            .ok_or(ServiceError::Engine(EngineError::SessionRequired))
    }

    /// Run one event against a session under the store's update lock.
    fn apply<R, F>(&self, session: Option<SessionId>, event: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&Engine, &UserState) -> Result<(UserState, R, Activity), EngineError>,
    {
        let id = session.ok_or(EngineError::SessionRequired)?;
        let engine: &Engine = &self.engine;

        let result = self.store.update(id, |snapshot| {
            let current = engine.restore(snapshot.state.clone())?.state;
            let before = current.points();
            let (next, report, activity) = event(engine, &current)?;

            debug!(
                session_id = %id,
                activity = activity.name(),
                before,
                after = next.points(),
                "event applied"
            );
            let entry = LedgerEntry::new(activity, before, next.points());
            Ok::<_, ServiceError>((snapshot.advance(next, entry), report))
        })?;

        result.ok_or(ServiceError::Engine(EngineError::SessionRequired))
    }
}
