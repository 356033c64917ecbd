//! Error types for caller contract violations.
//!
//! Rule violations are not errors: illegal moves are simply left out of the
//! legal set, and walking off the end of a path is an `Option::None`.

use thiserror::Error;

/// Errors raised for malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("invalid move: {0}")]
    InvalidMove(String),

    #[error("invalid dice roll: {0}")]
    InvalidDice(String),

    #[error("invalid team: {0}")]
    InvalidTeam(String),

    #[error("piece count must be 1 or 2 (got {0})")]
    InvalidPieceCount(usize),

    #[error("think budget must not be negative (got {0} ms)")]
    NegativeBudget(i64),

    #[error("invalid setup: {0}")]
    InvalidSetup(String),

    #[error("invalid difficulty level: {0} (expected 1..=10)")]
    InvalidDifficulty(u8),

    #[error("failed to start think worker: {0}")]
    WorkerSpawn(String),
}

pub type Result<T> = std::result::Result<T, Error>;
