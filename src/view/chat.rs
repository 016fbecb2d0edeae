//! Chat user list and conversation derivations

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::client::models::{Message, User};

/// Users matching the search text by name or email, excluding the current user
pub fn filter_users<'a>(users: &'a [User], search: &str, me: Option<&str>) -> Vec<&'a User> {
    let needle = search.trim().to_lowercase();
    users
        .iter()
        .filter(|u| me != Some(u.id.as_str()))
        .filter(|u| {
            needle.is_empty()
                || u.name.to_lowercase().contains(&needle)
                || u
                    .email
                    .as_deref()
                    .is_some_and(|e| e.to_lowercase().contains(&needle))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Mine,
    Theirs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatLine {
    pub id: String,
    pub side: Side,
    pub body: String,
    pub at: Option<DateTime<Utc>>,
}

/// Messages in send order, each tagged by who sent it
pub fn conversation(messages: &[Message], me: &str) -> Vec<ChatLine> {
    let mut lines: Vec<ChatLine> = messages
        .iter()
        .map(|m| ChatLine {
            id: m.id.clone(),
            side: if m.sender_id == me {
                Side::Mine
            } else {
                Side::Theirs
            },
            body: m.body.clone(),
            at: m.created_at,
        })
        .collect();
    lines.sort_by_key(|l| l.at);
    lines
}
