//! User models for chat and task assignment

use serde::{Deserialize, Serialize};

/// Dashboard user as shown in chat and on task assignments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Email address (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Avatar image reference (optional)
    #[serde(
        default,
        rename = "profileImageUrl",
        alias = "avatar",
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar: Option<String>,
}

impl User {
    /// Name for display, falling back to the email or the ID
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else {
            self.email.as_deref().unwrap_or(&self.id)
        }
    }
}

/// Reference to a user from another resource.
///
/// Task responses embed either populated user records or bare IDs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Full(User),
    Id(String),
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            UserRef::Full(user) => &user.id,
            UserRef::Id(id) => id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            UserRef::Full(user) => user.display_name(),
            UserRef::Id(id) => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_from_mongo_style_json() {
        let user: User = serde_json::from_str(
            r#"{"_id": "u1", "name": "Ada", "profileImageUrl": "https://img/ada.png"}"#,
        )
        .unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.display_name(), "Ada");
        assert_eq!(user.avatar.as_deref(), Some("https://img/ada.png"));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let user: User = serde_json::from_str(r#"{"id": "u2", "email": "b@x.io"}"#).unwrap();
        assert_eq!(user.display_name(), "b@x.io");

        let user: User = serde_json::from_str(r#"{"id": "u3"}"#).unwrap();
        assert_eq!(user.display_name(), "u3");
    }

    #[test]
    fn test_user_ref_accepts_ids_and_records() {
        let refs: Vec<UserRef> =
            serde_json::from_str(r#"["u1", {"_id": "u2", "name": "Grace"}]"#).unwrap();
        assert_eq!(refs[0].id(), "u1");
        assert_eq!(refs[1].id(), "u2");
        assert_eq!(refs[1].display_name(), "Grace");
    }
}
