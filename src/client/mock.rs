//! Mock dashboard API client for testing
//!
//! Provides an in-memory implementation of the API traits that behaves like
//! the server: mutations change the stored state and return the updated entity.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::api::{DocumentApi, MessageApi, TaskApi};
use super::models::{
    DashboardStatistics, DashboardSummary, Document, DocumentDraft, Download, FileAsset, Message,
    StatusSummary, Task, TaskList, TaskStatus, UploadFile, User,
};
use crate::error::{ApiError, ApiResult};

/// Mock API client for testing.
///
/// Configure state via builder methods, then use in tests.
///
/// # Example
/// ```ignore
/// let mock = MockDashboardClient::new().with_tasks(vec![task("T1", TaskStatus::Pending)]);
/// let list = mock.list_tasks(None).await?;
/// assert_eq!(list.items.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MockDashboardClient {
    tasks: Arc<Mutex<Vec<Task>>>,
    users: Arc<Mutex<Vec<User>>>,
    /// Conversations keyed by counterpart user ID
    conversations: Arc<Mutex<HashMap<String, Vec<Message>>>>,
    documents: Arc<Mutex<Vec<Document>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Simulated network latency for every call
    latency: Option<Duration>,
    call_count: Arc<Mutex<CallCounts>>,
    captured_requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub list_tasks: usize,
    pub get_task: usize,
    pub dashboard_summary: usize,
    pub toggle_checklist_item: usize,
    pub upload_submissions: usize,
    pub export_tasks: usize,
    pub list_chat_users: usize,
    pub list_messages: usize,
    pub send_message: usize,
    pub list_documents: usize,
    pub create_document: usize,
    pub update_document: usize,
}

impl CallCounts {
    /// Total number of calls of any kind
    pub fn total(&self) -> usize {
        self.list_tasks
            + self.get_task
            + self.dashboard_summary
            + self.toggle_checklist_item
            + self.upload_submissions
            + self.export_tasks
            + self.list_chat_users
            + self.list_messages
            + self.send_message
            + self.list_documents
            + self.create_document
            + self.update_document
    }
}

/// A request as the server would have seen it
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRequest {
    pub method: &'static str,
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub file_names: Vec<String>,
}

impl MockDashboardClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(self, tasks: Vec<Task>) -> Self {
        *self.tasks.try_lock().expect("unshared during setup") = tasks;
        self
    }

    pub fn with_users(self, users: Vec<User>) -> Self {
        *self.users.try_lock().expect("unshared during setup") = users;
        self
    }

    pub fn with_conversation(self, user_id: &str, messages: Vec<Message>) -> Self {
        self.conversations
            .try_lock()
            .expect("unshared during setup")
            .insert(user_id.to_string(), messages);
        self
    }

    pub fn with_documents(self, documents: Vec<Document>) -> Self {
        *self.documents.try_lock().expect("unshared during setup") = documents;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail the next call with `error`
    pub async fn fail_next(&self, error: ApiError) {
        *self.error.lock().await = Some(error);
    }

    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    pub async fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.captured_requests.lock().await.clone()
    }

    /// Replace a stored task, as if another user had edited it
    pub async fn replace_task(&self, task: Task) {
        let mut tasks = self.tasks.lock().await;
        if let Some(slot) = tasks.iter_mut().find(|t| t.id == task.id) {
            *slot = task;
        } else {
            tasks.push(task);
        }
    }

    async fn enter(&self, bump: impl FnOnce(&mut CallCounts)) -> ApiResult<()> {
        bump(&mut *self.call_count.lock().await);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.error.lock().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn capture(&self, method: &'static str, path: String, body: Option<serde_json::Value>) {
        self.captured_requests.lock().await.push(CapturedRequest {
            method,
            path,
            body,
            file_names: Vec::new(),
        });
    }

    fn not_found(what: &str, id: &str) -> ApiError {
        ApiError::request(404, format!("{} {} not found", what, id))
    }
}

fn summarize(tasks: &[Task]) -> StatusSummary {
    let count = |status| tasks.iter().filter(|t| t.status == status).count() as u64;
    StatusSummary {
        all: tasks.len() as u64,
        pending_tasks: count(TaskStatus::Pending),
        in_progress_tasks: count(TaskStatus::InProgress),
        completed_tasks: count(TaskStatus::Completed),
    }
}

#[async_trait]
impl TaskApi for MockDashboardClient {
    async fn list_tasks(&self, status: Option<TaskStatus>) -> ApiResult<TaskList> {
        self.enter(|c| c.list_tasks += 1).await?;
        let path = match status {
            Some(s) => format!("/api/tasks?status={}", s.as_param()),
            None => "/api/tasks".to_string(),
        };
        self.capture("GET", path, None).await;

        let tasks = self.tasks.lock().await;
        Ok(TaskList {
            items: tasks
                .iter()
                .filter(|t| status.is_none_or(|s| t.status == s))
                .cloned()
                .collect(),
            status_summary: summarize(&tasks),
        })
    }

    async fn get_task(&self, task_id: &str) -> ApiResult<Task> {
        self.enter(|c| c.get_task += 1).await?;
        self.capture("GET", format!("/api/tasks/{}", task_id), None)
            .await;
        self.tasks
            .lock()
            .await
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
            .ok_or_else(|| Self::not_found("Task", task_id))
    }

    async fn dashboard_summary(&self) -> ApiResult<DashboardSummary> {
        self.enter(|c| c.dashboard_summary += 1).await?;
        self.capture("GET", "/api/tasks/dashboard-data".to_string(), None)
            .await;
        let tasks = self.tasks.lock().await;
        let summary = summarize(&tasks);
        let now = Utc::now();
        Ok(DashboardSummary {
            statistics: DashboardStatistics {
                total_tasks: summary.all,
                pending_tasks: summary.pending_tasks,
                in_progress_tasks: summary.in_progress_tasks,
                completed_tasks: summary.completed_tasks,
                overdue_tasks: tasks
                    .iter()
                    .filter(|t| t.status != TaskStatus::Completed)
                    .filter(|t| t.due_date.is_some_and(|d| d < now))
                    .count() as u64,
            },
            recent_tasks: tasks.iter().take(10).cloned().collect(),
        })
    }

    async fn toggle_checklist_item(
        &self,
        task_id: &str,
        index: usize,
        completed: bool,
    ) -> ApiResult<Task> {
        self.enter(|c| c.toggle_checklist_item += 1).await?;
        self.capture(
            "PATCH",
            format!("/api/tasks/{}/checklist/{}", task_id, index),
            Some(serde_json::json!({ "completed": completed })),
        )
        .await;

        let mut tasks = self.tasks.lock().await;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| Self::not_found("Task", task_id))?;
        let item = task
            .todo_checklist
            .get_mut(index)
            .ok_or_else(|| ApiError::request(400, "Invalid checklist index"))?;
        item.completed = completed;

        let done = task.todo_checklist.iter().filter(|i| i.completed).count();
        let total = task.todo_checklist.len();
        task.completed_todo_count = Some(done);
        task.progress = Some((done * 100 / total.max(1)) as u32);
        task.status = if done == 0 {
            TaskStatus::Pending
        } else if done == total {
            TaskStatus::Completed
        } else {
            TaskStatus::InProgress
        };
        Ok(task.clone())
    }

    async fn upload_submissions(&self, task_id: &str, files: &[UploadFile]) -> ApiResult<Task> {
        self.enter(|c| c.upload_submissions += 1).await?;
        self.captured_requests.lock().await.push(CapturedRequest {
            method: "POST",
            path: format!("/api/tasks/{}/submissions", task_id),
            body: None,
            file_names: files.iter().map(|f| f.name.clone()).collect(),
        });

        let mut tasks = self.tasks.lock().await;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| Self::not_found("Task", task_id))?;
        let now = Utc::now();
        task.submissions.extend(files.iter().map(|f| FileAsset {
            name: f.name.clone(),
            size: f.bytes.len() as u64,
            mime_type: Some(f.mime_type.clone()),
            uploaded_at: Some(now),
            data: None,
            url: None,
        }));
        Ok(task.clone())
    }

    async fn export_tasks(&self) -> ApiResult<Download> {
        self.enter(|c| c.export_tasks += 1).await?;
        self.capture("GET", "/api/reportsTask/export/tasks".to_string(), None)
            .await;
        Ok(Download {
            filename: "task_details.xlsx".to_string(),
            bytes: vec![0x50, 0x4b, 0x03, 0x04],
        })
    }
}

#[async_trait]
impl MessageApi for MockDashboardClient {
    async fn list_chat_users(&self) -> ApiResult<Vec<User>> {
        self.enter(|c| c.list_chat_users += 1).await?;
        self.capture("GET", "/api/messages/users".to_string(), None)
            .await;
        Ok(self.users.lock().await.clone())
    }

    async fn list_messages(&self, user_id: &str) -> ApiResult<Vec<Message>> {
        self.enter(|c| c.list_messages += 1).await?;
        self.capture("GET", format!("/api/messages/{}", user_id), None)
            .await;
        Ok(self
            .conversations
            .lock()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn send_message(&self, user_id: &str, body: &str) -> ApiResult<Message> {
        self.enter(|c| c.send_message += 1).await?;
        self.capture(
            "POST",
            format!("/api/messages/send/{}", user_id),
            Some(serde_json::json!({ "message": body })),
        )
        .await;

        let mut conversations = self.conversations.lock().await;
        let thread = conversations.entry(user_id.to_string()).or_default();
        let message = Message {
            id: format!("m{}", thread.len() + 1),
            sender_id: "me".to_string(),
            recipient_id: user_id.to_string(),
            body: body.to_string(),
            created_at: Some(Utc::now()),
        };
        thread.push(message.clone());
        Ok(message)
    }
}

#[async_trait]
impl DocumentApi for MockDashboardClient {
    async fn list_documents(&self) -> ApiResult<Vec<Document>> {
        self.enter(|c| c.list_documents += 1).await?;
        self.capture("GET", "/api/documents".to_string(), None)
            .await;
        Ok(self.documents.lock().await.clone())
    }

    async fn create_document(&self, draft: &DocumentDraft) -> ApiResult<Document> {
        self.enter(|c| c.create_document += 1).await?;
        self.capture(
            "POST",
            "/api/documents".to_string(),
            serde_json::to_value(draft).ok(),
        )
        .await;

        let mut documents = self.documents.lock().await;
        let now = Utc::now();
        let doc = Document {
            id: format!("d{}", documents.len() + 1),
            title: draft.title.clone(),
            content: draft.content.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        documents.push(doc.clone());
        Ok(doc)
    }

    async fn update_document(
        &self,
        document_id: &str,
        draft: &DocumentDraft,
    ) -> ApiResult<Document> {
        self.enter(|c| c.update_document += 1).await?;
        self.capture(
            "PUT",
            format!("/api/documents/{}", document_id),
            serde_json::to_value(draft).ok(),
        )
        .await;

        let mut documents = self.documents.lock().await;
        let doc = documents
            .iter_mut()
            .find(|d| d.id == document_id)
            .ok_or_else(|| Self::not_found("Document", document_id))?;
        doc.title = draft.title.clone();
        doc.content = draft.content.clone();
        doc.updated_at = Some(Utc::now());
        Ok(doc.clone())
    }
}

/// Test fixtures shared across modules
pub mod fixtures {
    use crate::client::models::{ChecklistItem, Document, Message, Task, TaskStatus, User};

    pub fn task(id: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {}", id),
            description: String::new(),
            status,
            priority: Default::default(),
            due_date: None,
            created_at: None,
            assigned_to: Vec::new(),
            todo_checklist: Vec::new(),
            attachments: Vec::new(),
            submissions: Vec::new(),
            completed_todo_count: None,
            progress: None,
        }
    }

    pub fn task_with_checklist(id: &str, done: &[bool]) -> Task {
        let mut t = task(id, TaskStatus::Pending);
        t.todo_checklist = done
            .iter()
            .enumerate()
            .map(|(i, completed)| ChecklistItem {
                text: format!("step {}", i + 1),
                completed: *completed,
            })
            .collect();
        t.completed_todo_count = Some(done.iter().filter(|d| **d).count());
        t
    }

    pub fn user(id: &str, name: &str) -> User {
        User {
            id: id.to_string(),
            name: name.to_string(),
            email: None,
            avatar: None,
        }
    }

    pub fn message(id: &str, from: &str, to: &str, body: &str, minute: u32) -> Message {
        Message {
            id: id.to_string(),
            sender_id: from.to_string(),
            recipient_id: to.to_string(),
            body: body.to_string(),
            created_at: chrono::DateTime::parse_from_rfc3339(&format!(
                "2025-01-01T10:{:02}:00Z",
                minute
            ))
            .ok()
            .map(|d| d.with_timezone(&chrono::Utc)),
        }
    }

    pub fn document(id: &str, title: &str) -> Document {
        Document {
            id: id.to_string(),
            title: title.to_string(),
            content: String::new(),
            created_at: None,
            updated_at: None,
        }
    }
}
