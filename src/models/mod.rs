//! Display models for CLI output
//!
//! Conversions from API and view-model types into table rows and JSON
//! shapes suited for the terminal.

pub mod display;

pub use display::{
    ChecklistDisplay, DocumentDisplay, FileDisplay, MessageDisplay, StatDisplay, TaskDisplay,
    UserDisplay,
};
