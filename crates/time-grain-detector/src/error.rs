//! Error types for grain detection.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrainError {
    /// An input could not be turned into an instant. Carries the input verbatim.
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, GrainError>;
