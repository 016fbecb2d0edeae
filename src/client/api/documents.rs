//! Document API trait

use async_trait::async_trait;

use crate::client::models::{Document, DocumentDraft};
use crate::error::ApiResult;

/// Document editor persistence
#[async_trait]
pub trait DocumentApi: Send + Sync {
    async fn list_documents(&self) -> ApiResult<Vec<Document>>;

    async fn create_document(&self, draft: &DocumentDraft) -> ApiResult<Document>;

    /// Replace title and content of an existing document.
    async fn update_document(&self, document_id: &str, draft: &DocumentDraft)
    -> ApiResult<Document>;
}
