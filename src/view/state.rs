//! Loading and error flags for rendering a query

use serde::Serialize;

use crate::cache::QueryStatus;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    /// Nothing to show yet
    pub loading: bool,
    /// Stale data shown while a refetch runs
    pub refetching: bool,
    pub error: Option<String>,
    /// Settled with nothing to list
    pub empty: bool,
}

impl ViewState {
    /// Derive flags from a query status. `is_empty` judges the data, if any.
    pub fn from_status(
        status: &QueryStatus,
        is_empty: impl FnOnce(&serde_json::Value) -> bool,
    ) -> Self {
        let data_empty = status.data().is_none_or(is_empty);
        Self {
            loading: matches!(status, QueryStatus::Loading),
            refetching: matches!(status, QueryStatus::Refetching(_)),
            error: status.error().map(str::to_string),
            empty: status.is_settled() && data_empty,
        }
    }

    /// Flags for list-shaped data: bare arrays or objects with an `items` array
    pub fn for_list(status: &QueryStatus) -> Self {
        Self::from_status(status, |value| match value {
            serde_json::Value::Array(items) => items.is_empty(),
            serde_json::Value::Object(map) => map
                .get("items")
                .and_then(|v| v.as_array())
                .is_none_or(|items| items.is_empty()),
            serde_json::Value::Null => true,
            _ => false,
        })
    }
}
