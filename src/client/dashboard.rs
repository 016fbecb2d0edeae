//! Dashboard API client implementation

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::api::{DocumentApi, MessageApi, TaskApi};
use super::models::{
    DashboardSummary, Document, DocumentDraft, Download, EntityEnvelope, ListEnvelope, Message,
    SendMessageRequest, Task, TaskList, TaskStatus, UploadFile, User,
};
use super::rate_limit::{EndpointCategory, RateLimiterSet};
use crate::config::Config;
use crate::error::{ApiError, ApiResult, Result};

/// Name of the session cookie when the stored session is a bare value
const SESSION_COOKIE: &str = "token";

/// Request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Multipart field name for submission uploads
const SUBMISSION_FIELD: &str = "files";

/// Request payload
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<UploadFile>),
}

/// HTTP client for the dashboard REST API
pub struct DashboardClient {
    http: HttpClient,
    base_url: String,
    session: Option<String>,
    rate_limiters: Arc<RateLimiterSet>,
}

impl DashboardClient {
    /// Create a client for `base_url` (scheme + host, no trailing slash).
    pub fn new(base_url: impl Into<String>, session: Option<String>) -> ApiResult<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            rate_limiters: Arc::new(RateLimiterSet::new()),
        })
    }

    /// Create a client from the loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let host = config.require_api_host()?;
        Ok(Self::new(host, config.session.clone())?)
    }

    /// Send a request and parse the JSON response body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: RequestBody,
    ) -> ApiResult<T> {
        let response = self.send(method, path, query, body).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("Failed to read response: {}", e)))?;

        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    /// Send a request and return the raw response once its status is 2xx.
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: RequestBody,
    ) -> ApiResult<reqwest::Response> {
        let category = EndpointCategory::from_path(path);
        self.rate_limiters.wait_for(category).await;

        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut builder = self.http.request(method, &url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(ref session) = self.session {
            builder = builder.header(reqwest::header::COOKIE, cookie_header(session));
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(files) => builder.multipart(multipart_form(files)?),
        };

        let response = builder.send().await.map_err(ApiError::from)?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            self.rate_limiters.activate(category).await;
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ApiError::rate_limited(Duration::from_secs(retry_after)));
        }

        let text = response.text().await.unwrap_or_default();
        Err(ApiError::request(
            status.as_u16(),
            server_message(status, &text),
        ))
    }
}

/// Cookie header value for a stored session
fn cookie_header(session: &str) -> String {
    if session.contains('=') {
        session.to_string()
    } else {
        format!("{}={}", SESSION_COOKIE, session)
    }
}

/// Extract the user-facing message from an error response body
fn server_message(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(alias = "error")]
        message: String,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.message;
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && !trimmed.starts_with('<') {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

fn multipart_form(files: Vec<UploadFile>) -> ApiResult<Form> {
    let mut form = Form::new();
    for file in files {
        let part = Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str(&file.mime_type)
            .map_err(|e| ApiError::Transport(format!("Invalid MIME type: {}", e)))?;
        form = form.part(SUBMISSION_FIELD, part);
    }
    Ok(form)
}

/// Client-side name for the exported task report
pub fn export_filename(date: NaiveDate) -> String {
    format!("task_details_{}.xlsx", date.format("%Y-%m-%d"))
}

#[async_trait]
impl TaskApi for DashboardClient {
    async fn list_tasks(&self, status: Option<TaskStatus>) -> ApiResult<TaskList> {
        let query: Vec<(&str, &str)> = status
            .map(|s| vec![("status", s.as_param())])
            .unwrap_or_default();
        self.request(Method::GET, "/api/tasks", &query, RequestBody::Empty)
            .await
    }

    async fn get_task(&self, task_id: &str) -> ApiResult<Task> {
        let path = format!("/api/tasks/{}", task_id);
        let envelope: EntityEnvelope<Task> =
            self.request(Method::GET, &path, &[], RequestBody::Empty).await?;
        Ok(envelope.into_entity())
    }

    async fn dashboard_summary(&self) -> ApiResult<DashboardSummary> {
        self.request(
            Method::GET,
            "/api/tasks/dashboard-data",
            &[],
            RequestBody::Empty,
        )
        .await
    }

    async fn toggle_checklist_item(
        &self,
        task_id: &str,
        index: usize,
        completed: bool,
    ) -> ApiResult<Task> {
        let path = format!("/api/tasks/{}/checklist/{}", task_id, index);
        let body = RequestBody::Json(serde_json::json!({ "completed": completed }));
        let envelope: EntityEnvelope<Task> =
            self.request(Method::PATCH, &path, &[], body).await?;
        Ok(envelope.into_entity())
    }

    async fn upload_submissions(&self, task_id: &str, files: &[UploadFile]) -> ApiResult<Task> {
        let path = format!("/api/tasks/{}/submissions", task_id);
        let body = RequestBody::Multipart(files.to_vec());
        let envelope: EntityEnvelope<Task> = self.request(Method::POST, &path, &[], body).await?;
        Ok(envelope.into_entity())
    }

    async fn export_tasks(&self) -> ApiResult<Download> {
        let response = self
            .send(
                Method::GET,
                "/api/reportsTask/export/tasks",
                &[],
                RequestBody::Empty,
            )
            .await?;
        let bytes = response.bytes().await.map_err(ApiError::from)?;
        Ok(Download {
            filename: export_filename(Local::now().date_naive()),
            bytes: bytes.to_vec(),
        })
    }
}

#[async_trait]
impl MessageApi for DashboardClient {
    async fn list_chat_users(&self) -> ApiResult<Vec<User>> {
        let users: ListEnvelope<User> = self
            .request(Method::GET, "/api/messages/users", &[], RequestBody::Empty)
            .await?;
        Ok(users.into_items())
    }

    async fn list_messages(&self, user_id: &str) -> ApiResult<Vec<Message>> {
        let path = format!("/api/messages/{}", user_id);
        let messages: ListEnvelope<Message> = self
            .request(Method::GET, &path, &[], RequestBody::Empty)
            .await?;
        Ok(messages.into_items())
    }

    async fn send_message(&self, user_id: &str, body: &str) -> ApiResult<Message> {
        let path = format!("/api/messages/send/{}", user_id);
        let payload = serde_json::to_value(SendMessageRequest {
            message: body.to_string(),
        })
        .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        let envelope: EntityEnvelope<Message> = self
            .request(Method::POST, &path, &[], RequestBody::Json(payload))
            .await?;
        Ok(envelope.into_entity())
    }
}

#[async_trait]
impl DocumentApi for DashboardClient {
    async fn list_documents(&self) -> ApiResult<Vec<Document>> {
        let docs: ListEnvelope<Document> = self
            .request(Method::GET, "/api/documents", &[], RequestBody::Empty)
            .await?;
        Ok(docs.into_items())
    }

    async fn create_document(&self, draft: &DocumentDraft) -> ApiResult<Document> {
        let payload =
            serde_json::to_value(draft).map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        let envelope: EntityEnvelope<Document> = self
            .request(
                Method::POST,
                "/api/documents",
                &[],
                RequestBody::Json(payload),
            )
            .await?;
        Ok(envelope.into_entity())
    }

    async fn update_document(
        &self,
        document_id: &str,
        draft: &DocumentDraft,
    ) -> ApiResult<Document> {
        let path = format!("/api/documents/{}", document_id);
        let payload =
            serde_json::to_value(draft).map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        let envelope: EntityEnvelope<Document> = self
            .request(Method::PUT, &path, &[], RequestBody::Json(payload))
            .await?;
        Ok(envelope.into_entity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> DashboardClient {
        DashboardClient::new(server.url(), Some("sess-1".to_string())).unwrap()
    }

    #[test]
    fn test_client_creation_trims_slash() {
        let client = DashboardClient::new("http://localhost:8000/", None).unwrap();
        assert_eq!(client.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_cookie_header() {
        assert_eq!(cookie_header("abc"), "token=abc");
        assert_eq!(cookie_header("connect.sid=xyz"), "connect.sid=xyz");
    }

    #[test]
    fn test_server_message_prefers_json_message() {
        let msg = server_message(StatusCode::BAD_REQUEST, r#"{"message": "Task not found"}"#);
        assert_eq!(msg, "Task not found");

        let msg = server_message(StatusCode::BAD_REQUEST, r#"{"error": "Bad index"}"#);
        assert_eq!(msg, "Bad index");
    }

    #[test]
    fn test_server_message_fallbacks() {
        assert_eq!(
            server_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        assert_eq!(
            server_message(StatusCode::NOT_FOUND, "<html>nope</html>"),
            "Not Found"
        );
        assert_eq!(
            server_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "Internal Server Error"
        );
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(export_filename(date), "task_details_2025-03-09.xlsx");
    }

    #[tokio::test]
    async fn test_list_tasks_sends_status_filter_and_cookie() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/tasks")
            .match_query(Matcher::UrlEncoded("status".into(), "Pending".into()))
            .match_header("cookie", "token=sess-1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"items": [{"_id": "T1", "title": "A", "status": "Pending"}],
                    "statusSummary": {"all": 5, "pendingTask": 2}}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let list = client.list_tasks(Some(TaskStatus::Pending)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.status_summary.count(Some(TaskStatus::Pending)), 2);
    }

    #[tokio::test]
    async fn test_toggle_checklist_item_request_shape() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/api/tasks/T1/checklist/1")
            .match_body(Matcher::Json(serde_json::json!({"completed": true})))
            .with_status(200)
            .with_body(
                r#"{"message": "ok", "task": {"_id": "T1", "title": "A",
                    "todoChecklist": [{"text": "a", "completed": true},
                                      {"text": "b", "completed": true}],
                    "completedTodoCount": 2}}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let task = client.toggle_checklist_item("T1", 1, true).await.unwrap();

        mock.assert_async().await;
        assert_eq!(task.completed_count(), 2);
    }

    #[tokio::test]
    async fn test_upload_submissions_sends_single_multipart_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/tasks/T1/submissions")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("filename=\"a.txt\"".to_string()),
                Matcher::Regex("filename=\"b.pdf\"".to_string()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"task": {"_id": "T1", "title": "A",
                    "submissions": [{"name": "a.txt", "size": 1}, {"name": "b.pdf", "size": 2}]}}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let files = vec![
            UploadFile::new("a.txt", "text/plain", b"a".to_vec()),
            UploadFile::new("b.pdf", "application/pdf", b"bb".to_vec()),
        ];
        let task = client.upload_submissions("T1", &files).await.unwrap();

        mock.assert_async().await;
        assert_eq!(task.submissions.len(), 2);
    }

    #[tokio::test]
    async fn test_send_message_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/messages/send/u2")
            .match_body(Matcher::Json(serde_json::json!({"message": "hello"})))
            .with_status(201)
            .with_body(r#"{"_id": "m1", "senderId": "u1", "receiverId": "u2", "message": "hello"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let msg = client.send_message("u2", "hello").await.unwrap();

        mock.assert_async().await;
        assert_eq!(msg.id, "m1");
    }

    #[tokio::test]
    async fn test_non_2xx_becomes_request_error_with_server_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/messages/u9")
            .with_status(404)
            .with_body(r#"{"message": "User not found"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.list_messages("u9").await.unwrap_err();

        assert_eq!(err, ApiError::request(404, "User not found"));
    }

    #[tokio::test]
    async fn test_too_many_requests_activates_limiter() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/documents")
            .with_status(429)
            .with_header("retry-after", "7")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.list_documents().await.unwrap_err();

        assert_eq!(err.status(), Some(429));
        assert!(
            client
                .rate_limiters
                .is_active(EndpointCategory::Documents)
                .await
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/messages/users")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.list_chat_users().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        // Nothing listens on port 9 of the loopback interface
        let client = DashboardClient::new("http://127.0.0.1:9", None).unwrap();
        let err = client.list_documents().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[tokio::test]
    async fn test_export_tasks_returns_bytes() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/reportsTask/export/tasks")
            .with_status(200)
            .with_header(
                "content-type",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            )
            .with_body(vec![0x50, 0x4b, 0x03, 0x04])
            .create_async()
            .await;

        let client = client_for(&server);
        let download = client.export_tasks().await.unwrap();
        assert_eq!(download.bytes, vec![0x50, 0x4b, 0x03, 0x04]);
        assert!(download.filename.ends_with(".xlsx"));
    }

    #[tokio::test]
    async fn test_chat_users_envelope() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/messages/users")
            .with_status(200)
            .with_body(r#"{"users": [{"_id": "u1", "name": "Ada"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let users = client.list_chat_users().await.unwrap();
        assert_eq!(users[0].name, "Ada");
    }
}
