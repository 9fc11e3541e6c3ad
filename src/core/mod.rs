//! Core user-state types and derivation rules.
//!
//! This module contains the pure core of the engine:
//! - The `UserState` record carried by a session
//! - Derivation of the unlocked-reward set from points
//!
//! Nothing here performs I/O or keeps hidden state.

mod unlock;
mod user;

pub use unlock::{best_unlocked, derive_unlocked, next_unlock};
pub use user::UserState;
