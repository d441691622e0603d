//! Persistence layer for lectern
//!
//! Provides:
//! - Course documents and the membership relation
//! - Lectures with atomic per-course numbering and the one-way ended flag
//! - Doubt threads with append-only answers
//! - Audit log (append-only)
//!
//! Every mutating primitive is a single conditional statement
//! (match-then-modify); the affected-row count is the outcome signal, so two
//! racing callers can never both observe success on the same transition.

mod audit;
mod sqlite;
mod traits;

pub use audit::*;
pub use sqlite::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
