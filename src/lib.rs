//! Wellquest: a pure points-and-rewards engine for wellness sessions.
//!
//! Wellquest follows the "pure core, imperative shell" philosophy. The core
//! engine is a set of pure functions from one user record to the next; the
//! session layer around it stores snapshots and serializes updates.
//!
//! # Core Concepts
//!
//! - **Catalog**: immutable reward ladder and task list, injected into the engine
//! - **UserState**: the flat record a session carries
//! - **Engine**: applies events (tasks, study sessions, app-usage reports,
//!   reward selection) and re-derives unlocked rewards from points
//! - **Session**: versioned snapshots, a store, and a request facade
//!
//! # Example
//!
//! ```rust
//! use wellquest::session::SessionService;
//! use wellquest::validation::RegistrationForm;
//! use serde_json::json;
//!
//! let service = SessionService::in_memory();
//! let (session, state) = service
//!     .register(RegistrationForm {
//!         name: Some("Ada".to_string()),
//!         age: Some("30".to_string()),
//!         screen_time: Some("3.5".to_string()),
//!         reward_id: Some("1".to_string()),
//!     })
//!     .unwrap();
//! assert_eq!(state.points(), 0);
//!
//! let report = service
//!     .complete_task(Some(session), &json!({"task_id": 2, "duration": 25}))
//!     .unwrap();
//! assert_eq!(report.points, 50);
//!
//! service
//!     .select_reward(Some(session), &json!({"avatar_id": 4}))
//!     .unwrap();
//! assert_eq!(service.state(Some(session)).unwrap().selected_reward_id(), 4);
//! ```

pub mod catalog;
pub mod core;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod session;
pub mod validation;

// Re-export commonly used types
pub use catalog::{RewardCatalog, RewardDefinition, TaskCatalog};
pub use crate::core::{derive_unlocked, UserState};
pub use engine::{Engine, EngineConfig};
pub use error::EngineError;
pub use session::{SessionService, SessionSnapshot};
