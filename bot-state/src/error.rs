//! State error types.
//!
//! Used by storage implementations and by [`crate::BotState`]; converts into
//! [`cafebot_core::CafebotError::State`] at the turn boundary.

use cafebot_core::CafebotError;
use thiserror::Error;

/// Errors that can occur when reading or writing bot state.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Activity has no {0}; cannot build storage key")]
    MissingKeyPart(&'static str),
}

impl From<sqlx::Error> for StateError {
    fn from(e: sqlx::Error) -> Self {
        StateError::Database(e.to_string())
    }
}

impl From<StateError> for CafebotError {
    fn from(e: StateError) -> Self {
        CafebotError::State(e.to_string())
    }
}
