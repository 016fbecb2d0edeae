//! Presentation-ready derivations of cached state
//!
//! Everything here is a pure function of already-fetched data. Nothing
//! fails: missing fields fall back to empty values.

pub mod chat;
pub mod documents;
pub mod state;
pub mod tasks;

pub use chat::{ChatLine, Side, conversation, filter_users};
pub use documents::sorted_documents;
pub use state::ViewState;
pub use tasks::{StatusTab, TaskListView, progress_percent, task_detail_view, task_list_view};
