//! Errors returned by engine operations and input validation.
//!
//! Every variant is local and caller-correctable. Operations are
//! all-or-nothing, so an error never leaves a half-applied state behind.

use crate::catalog::RewardId;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("Missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("Field '{field}' has value '{value}' which is not a valid {expected}")]
    TypeCoercion {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No active session; register first")]
    SessionRequired,

    #[error("Reward {id} is not unlocked")]
    RewardLocked { id: RewardId },

    #[error("Reward {id} does not exist")]
    UnknownReward { id: RewardId },

    #[error("Registration rejected with {} problem(s)", .errors.len())]
    Registration { errors: Vec<EngineError> },

    #[error("State invariant violated: {0}")]
    InvariantViolated(String),
}
