//! Resource keys and invalidation patterns

use std::collections::BTreeMap;
use std::fmt;

use crate::client::models::TaskStatus;

/// Resource names used in cache keys
pub mod resource {
    pub const TASKS: &str = "tasks";
    pub const TASK: &str = "task";
    pub const DASHBOARD: &str = "dashboard";
    pub const CHAT_USERS: &str = "chat-users";
    pub const MESSAGES: &str = "messages";
    pub const DOCUMENTS: &str = "documents";
}

/// Identifies one cached entry.
///
/// Parameters are kept sorted so that keys built in any order compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    resource: &'static str,
    params: BTreeMap<String, String>,
}

impl ResourceKey {
    pub fn new(resource: &'static str) -> Self {
        Self {
            resource,
            params: BTreeMap::new(),
        }
    }

    /// Add a discriminating parameter
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// Task list, optionally narrowed to one status tab
    pub fn tasks(status: Option<TaskStatus>) -> Self {
        let key = Self::new(resource::TASKS);
        match status {
            Some(s) => key.with("status", s.as_param()),
            None => key,
        }
    }

    pub fn task(task_id: &str) -> Self {
        Self::new(resource::TASK).with("id", task_id)
    }

    pub fn dashboard() -> Self {
        Self::new(resource::DASHBOARD)
    }

    pub fn chat_users() -> Self {
        Self::new(resource::CHAT_USERS)
    }

    /// Conversation with one counterpart
    pub fn messages(user_id: &str) -> Self {
        Self::new(resource::MESSAGES).with("user", user_id)
    }

    pub fn documents() -> Self {
        Self::new(resource::DOCUMENTS)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource)?;
        for (i, (k, v)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, k, v)?;
        }
        Ok(())
    }
}

/// Selects a set of keys: same resource, parameters include the pattern's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPattern {
    resource: &'static str,
    params: BTreeMap<String, String>,
}

impl KeyPattern {
    /// Every key of a resource
    pub fn resource(resource: &'static str) -> Self {
        Self {
            resource,
            params: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn matches(&self, key: &ResourceKey) -> bool {
        self.resource == key.resource
            && self
                .params
                .iter()
                .all(|(k, v)| key.params.get(k) == Some(v))
    }
}

impl From<&ResourceKey> for KeyPattern {
    fn from(key: &ResourceKey) -> Self {
        Self {
            resource: key.resource,
            params: key.params.clone(),
        }
    }
}

impl From<ResourceKey> for KeyPattern {
    fn from(key: ResourceKey) -> Self {
        Self {
            resource: key.resource,
            params: key.params,
        }
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource)?;
        if self.params.is_empty() {
            return f.write_str("?*");
        }
        for (i, (k, v)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, k, v)?;
        }
        Ok(())
    }
}
