//! Shared domain types for lectern
//!
//! This crate defines:
//! - Roles and the action catalogue for authorization
//! - The Course, Lecture and Question documents
//! - Lecture phase derivation (pure function of lecture and now)
//! - View types with structured reason codes for listings

mod course;
mod lecture;
mod question;
mod role;
mod views;

pub use course::*;
pub use lecture::*;
pub use question::*;
pub use role::*;
pub use views::*;
