//! Task models

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserRef;
use crate::error::ValidationError;

/// Task workflow status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "Pending", alias = "pending")]
    Pending,
    #[serde(rename = "In Progress", alias = "in-progress", alias = "inProgress")]
    InProgress,
    #[serde(rename = "Completed", alias = "completed", alias = "done")]
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// Value used in the `status` query parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in-progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            _ => Err(ValidationError::Invalid {
                field: "status",
                reason: format!("unknown status '{}'", s),
            }),
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    #[serde(rename = "Low", alias = "low")]
    Low,
    #[default]
    #[serde(rename = "Medium", alias = "medium")]
    Medium,
    #[serde(rename = "High", alias = "high")]
    High,
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        };
        f.write_str(s)
    }
}

/// One checklist entry; addressed by its position in the list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    #[serde(alias = "title")]
    pub text: String,

    #[serde(default)]
    pub completed: bool,
}

/// Attachment or user-submitted file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAsset {
    #[serde(alias = "fileName", alias = "originalName")]
    pub name: String,

    /// Size in bytes
    #[serde(default)]
    pub size: u64,

    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,

    /// Base64 payload, present when the server inlines file content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl FileAsset {
    /// Decode the inline payload, if any.
    ///
    /// Accepts data URLs (`data:<mime>;base64,<payload>`) as well as bare base64.
    pub fn decode_payload(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        let data = self.data.as_deref()?;
        let encoded = match data.split_once(";base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => data,
        };
        Some(general_purpose::STANDARD.decode(encoded.trim()))
    }
}

/// Task resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub assigned_to: Vec<UserRef>,

    #[serde(default, alias = "checklist")]
    pub todo_checklist: Vec<ChecklistItem>,

    #[serde(default)]
    pub attachments: Vec<FileAsset>,

    #[serde(default, alias = "userSubmissions")]
    pub submissions: Vec<FileAsset>,

    /// Server-computed count of completed checklist items
    #[serde(default)]
    pub completed_todo_count: Option<usize>,

    /// Server-reported progress percentage
    #[serde(default)]
    pub progress: Option<u32>,
}

impl Task {
    /// Completed checklist items, preferring the server's count
    pub fn completed_count(&self) -> usize {
        self.completed_todo_count.unwrap_or_else(|| {
            self.todo_checklist
                .iter()
                .filter(|item| item.completed)
                .count()
        })
    }

    /// Ensure a checklist index exists before sending a toggle
    pub fn check_index(&self, index: usize) -> Result<(), ValidationError> {
        if index < self.todo_checklist.len() {
            Ok(())
        } else {
            Err(ValidationError::ChecklistIndex {
                index,
                len: self.todo_checklist.len(),
            })
        }
    }
}

/// Per-status totals returned with every task list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    #[serde(default)]
    pub all: u64,

    #[serde(default, alias = "pendingTask")]
    pub pending_tasks: u64,

    #[serde(default, alias = "inProgressTask")]
    pub in_progress_tasks: u64,

    #[serde(default, alias = "completedTask")]
    pub completed_tasks: u64,
}

impl StatusSummary {
    /// Count for a status, or the overall total for `None`
    pub fn count(&self, status: Option<TaskStatus>) -> u64 {
        match status {
            None => self.all,
            Some(TaskStatus::Pending) => self.pending_tasks,
            Some(TaskStatus::InProgress) => self.in_progress_tasks,
            Some(TaskStatus::Completed) => self.completed_tasks,
        }
    }
}

/// Response of `GET /api/tasks`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    #[serde(default, alias = "tasks")]
    pub items: Vec<Task>,

    #[serde(default)]
    pub status_summary: StatusSummary,
}

/// Aggregate statistics for the dashboard landing view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatistics {
    #[serde(default)]
    pub total_tasks: u64,
    #[serde(default)]
    pub pending_tasks: u64,
    #[serde(default)]
    pub in_progress_tasks: u64,
    #[serde(default)]
    pub completed_tasks: u64,
    #[serde(default)]
    pub overdue_tasks: u64,
}

/// Response of `GET /api/tasks/dashboard-data`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(default)]
    pub statistics: DashboardStatistics,

    #[serde(default)]
    pub recent_tasks: Vec<Task>,
}

/// A local file queued for a multipart upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = guess_mime_type(&name).to_string();
        Ok(Self {
            name,
            mime_type,
            bytes,
        })
    }

    /// Reject content types the multipart encoder would refuse
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_media_type(&self.mime_type) {
            return Ok(());
        }
        Err(ValidationError::Invalid {
            field: "mime_type",
            reason: format!(
                "{} has an invalid content type '{}'",
                self.name, self.mime_type
            ),
        })
    }
}

/// `type/subtype` with optional `; name=value` parameters
fn is_media_type(value: &str) -> bool {
    let is_token = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c))
    };
    let mut parts = value.split(';');
    let essence = parts.next().unwrap_or_default().trim();
    let Some((kind, subtype)) = essence.split_once('/') else {
        return false;
    };
    is_token(kind)
        && is_token(subtype)
        && parts.all(|param| {
            param
                .trim()
                .split_once('=')
                .is_some_and(|(name, value)| is_token(name) && !value.is_empty())
        })
}

/// Minimal extension → MIME mapping for submission uploads
pub fn guess_mime_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "txt" | "md" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "zip" => "application/zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

/// A downloaded binary resource
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub filename: String,
    pub bytes: Vec<u8>,
}
