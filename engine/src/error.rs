//! Errors raised by caller-supplied collaborators.
//!
//! The engine never surfaces these to its own callers; a failed collaborator
//! call is logged and treated as "no data".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("collaborator failed: {0}")]
    Failed(String),

    #[error("collaborator timed out")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, CollaboratorError>;
