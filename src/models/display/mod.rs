//! Display model implementations for table and JSON output
//!
//! Display models transform API response types into CLI-friendly formats
//! with appropriate column names and serialization.

mod chat;
mod common;
mod document;
mod task;

pub use chat::{MessageDisplay, UserDisplay};
pub use common::{format_datetime, format_size};
pub use document::DocumentDisplay;
pub use task::{ChecklistDisplay, FileDisplay, StatDisplay, TaskDisplay};
