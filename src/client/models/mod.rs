//! Dashboard API data models
//!
//! Domain types returned by the dashboard REST API, organized by resource,
//! plus the envelopes the API wraps them in.

mod document;
mod envelope;
mod message;
mod task;
mod user;

pub use document::{Document, DocumentDraft};
pub use envelope::{EntityEnvelope, ListEnvelope};
pub use message::{Message, SendMessageRequest};
#[cfg(test)]
pub use task::DashboardStatistics;
pub use task::{
    ChecklistItem, DashboardSummary, Download, FileAsset, StatusSummary, Task, TaskList,
    TaskStatus, UploadFile,
};
pub use user::User;
