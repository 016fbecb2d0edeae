//! Task display models

use serde::Serialize;
use tabled::Tabled;

use super::common::{format_datetime, format_size, truncate_string};
use crate::client::models::{FileAsset, Task};
use crate::view::tasks::ChecklistRow;
use crate::view::progress_percent;

/// Task row for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct TaskDisplay {
    #[tabled(rename = "TASK ID")]
    pub id: String,

    #[tabled(rename = "TITLE")]
    pub title: String,

    #[tabled(rename = "STATUS")]
    pub status: String,

    #[tabled(rename = "PRIORITY")]
    pub priority: String,

    /// Completed checklist items over total, with percentage
    #[tabled(rename = "PROGRESS")]
    pub progress: String,

    #[tabled(rename = "DUE")]
    pub due: String,
}

impl From<&Task> for TaskDisplay {
    fn from(task: &Task) -> Self {
        let total = task.todo_checklist.len();
        let progress = if total == 0 {
            "--".to_string()
        } else {
            format!(
                "{}/{} ({}%)",
                task.completed_count().min(total),
                total,
                progress_percent(task)
            )
        };
        Self {
            id: task.id.clone(),
            title: truncate_string(&task.title, 40),
            status: task.status.to_string(),
            priority: task.priority.to_string(),
            progress,
            due: format_datetime(task.due_date),
        }
    }
}

/// Checklist entry of a task detail
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ChecklistDisplay {
    #[tabled(rename = "#")]
    pub index: usize,

    #[tabled(rename = "DONE")]
    pub done: String,

    #[tabled(rename = "ITEM")]
    pub text: String,
}

impl From<&ChecklistRow> for ChecklistDisplay {
    fn from(row: &ChecklistRow) -> Self {
        Self {
            index: row.index,
            done: if row.completed { "[x]" } else { "[ ]" }.to_string(),
            text: row.text.clone(),
        }
    }
}

/// Attachment or submission
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct FileDisplay {
    #[tabled(rename = "FILE")]
    pub name: String,

    #[tabled(rename = "SIZE")]
    pub size: String,

    #[tabled(rename = "UPLOADED")]
    pub uploaded: String,
}

impl From<&FileAsset> for FileDisplay {
    fn from(file: &FileAsset) -> Self {
        // Inline uploads come back without a size
        let size = match file.decode_payload() {
            Some(Ok(bytes)) if file.size == 0 => bytes.len() as u64,
            _ => file.size,
        };
        Self {
            name: file.name.clone(),
            size: format_size(size),
            uploaded: format_datetime(file.uploaded_at),
        }
    }
}

/// One dashboard statistic
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct StatDisplay {
    #[tabled(rename = "METRIC")]
    pub metric: String,

    #[tabled(rename = "COUNT")]
    pub count: u64,
}

impl StatDisplay {
    pub fn new(metric: &str, count: u64) -> Self {
        Self {
            metric: metric.to_string(),
            count,
        }
    }
}
