//! Core engine for lectern
//!
//! The engine ties the pieces together:
//! - Role resolution and the access gate ([`require`])
//! - The enrollment workflow (pending, enrolled, assistant)
//! - Lecture lifecycle (derived phase, early termination, join listings)
//! - Doubt threads (questions and append-only answers)
//!
//! Every operation takes the acting user and the current instant explicitly;
//! the engine itself never reads the clock, which keeps the whole state
//! machine deterministic under test.

mod access;
mod engine;

pub use access::require;
pub use engine::CoreEngine;

use lectern_store::StoreError;
use lectern_util::LecternError;

pub(crate) fn store_err(e: StoreError) -> LecternError {
    LecternError::store(e.to_string())
}
