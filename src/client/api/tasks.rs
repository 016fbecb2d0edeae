//! Task API trait

use async_trait::async_trait;

use crate::client::models::{DashboardSummary, Download, Task, TaskList, TaskStatus, UploadFile};
use crate::error::ApiResult;

/// Task operations for the dashboard API
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// List tasks, optionally narrowed to one status.
    ///
    /// The response always carries the status summary for all tabs.
    async fn list_tasks(&self, status: Option<TaskStatus>) -> ApiResult<TaskList>;

    /// Get a single task with its checklist, attachments and submissions.
    async fn get_task(&self, task_id: &str) -> ApiResult<Task>;

    /// Aggregate statistics for the dashboard landing view.
    async fn dashboard_summary(&self) -> ApiResult<DashboardSummary>;

    /// Set the completion flag of one checklist item.
    ///
    /// Returns the full updated task.
    async fn toggle_checklist_item(
        &self,
        task_id: &str,
        index: usize,
        completed: bool,
    ) -> ApiResult<Task>;

    /// Upload files as the user's submission for a task, in one multipart request.
    ///
    /// Returns the full updated task with its new submission list.
    async fn upload_submissions(&self, task_id: &str, files: &[UploadFile]) -> ApiResult<Task>;

    /// Download the task report spreadsheet.
    async fn export_tasks(&self) -> ApiResult<Download>;
}
