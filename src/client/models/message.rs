//! Chat message models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One-to-one chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    #[serde(alias = "sender")]
    pub sender_id: String,

    #[serde(alias = "receiverId", alias = "recipient")]
    pub recipient_id: String,

    /// Message text
    #[serde(rename = "message", alias = "body", alias = "text")]
    pub body: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for `POST /api/messages/send/:userId`
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wire_names() {
        let msg: Message = serde_json::from_str(
            r#"{"_id": "m1", "senderId": "u1", "receiverId": "u2",
                "message": "hi", "createdAt": "2025-01-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(msg.sender_id, "u1");
        assert_eq!(msg.recipient_id, "u2");
        assert_eq!(msg.body, "hi");
        assert!(msg.created_at.is_some());
    }

    #[test]
    fn test_send_request_shape() {
        let body = serde_json::to_value(SendMessageRequest {
            message: "hello".into(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"message": "hello"}));
    }
}
