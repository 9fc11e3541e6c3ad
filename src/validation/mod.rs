//! Validation of loosely typed request input.
//!
//! Request layers hand over form strings and JSON values. This module turns
//! them into the typed inputs the engine accepts, or into `EngineError`s that
//! name the offending field.
//!
//! Registration forms use `stillwater::Validation` so that every problem is
//! reported in one pass instead of one per round trip:
//!
//! ```rust
//! use wellquest::validation::RegistrationForm;
//!
//! let form = RegistrationForm {
//!     name: None,
//!     age: Some("ten".to_string()),
//!     screen_time: Some("2.5".to_string()),
//!     reward_id: Some("1".to_string()),
//! };
//!
//! assert!(form.validate().is_failure());
//! ```

pub mod payload;
pub mod registration;

pub use payload::{app_label_from_json, reward_id_from_json, TaskCompletion};
pub use registration::{Registration, RegistrationForm};
