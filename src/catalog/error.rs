//! Errors raised while assembling reward and task catalogs.

use thiserror::Error;

/// Errors that can occur when building a catalog.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Catalog has no rewards. Add at least one reward")]
    Empty,

    #[error("Catalog has no always-unlocked reward. At least one reward needs threshold 0")]
    NoAlwaysUnlocked,

    #[error("Reward id {id} appears more than once")]
    DuplicateReward { id: u32 },

    #[error("Task id {id} appears more than once")]
    DuplicateTask { id: u32 },

    #[error("Unlock step must be greater than zero")]
    ZeroUnlockStep,
}
