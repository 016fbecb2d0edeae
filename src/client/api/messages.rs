//! Chat API trait

use async_trait::async_trait;

use crate::client::models::{Message, User};
use crate::error::ApiResult;

/// Chat operations for the dashboard API
#[async_trait]
pub trait MessageApi: Send + Sync {
    /// Users the current user can chat with
    async fn list_chat_users(&self) -> ApiResult<Vec<User>>;

    /// Conversation with one counterpart
    async fn list_messages(&self, user_id: &str) -> ApiResult<Vec<Message>>;

    /// Send a message to a counterpart, returning the stored message
    async fn send_message(&self, user_id: &str, body: &str) -> ApiResult<Message>;
}
