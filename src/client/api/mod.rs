//! API trait definitions split by resource
//!
//! The dashboard API surface is organized into focused sub-traits:
//! - [`TaskApi`] - Tasks, checklists, submissions, dashboard and report export
//! - [`MessageApi`] - Chat users and one-to-one conversations
//! - [`DocumentApi`] - Document editor persistence
//!
//! The [`DashboardApi`](super::DashboardApi) super-trait combines all three.

mod documents;
mod messages;
mod tasks;

pub use documents::DocumentApi;
pub use messages::MessageApi;
pub use tasks::TaskApi;
