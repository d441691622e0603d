//! Shared utilities for lectern
//!
//! This crate provides:
//! - ID types (CourseCode, UserId, LectureId, QuestionId)
//! - Time utilities (wall-clock source, duration helpers)
//! - Error types
//! - Default paths for data and log directories

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
