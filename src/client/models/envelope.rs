//! Response envelopes
//!
//! List endpoints answer with either a bare array or an object keyed by the
//! resource name; mutation endpoints return the updated entity either bare or
//! under `task`/`data`.

use serde::{Deserialize, Serialize};

/// List response in any of the shapes the API uses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(
            alias = "users",
            alias = "messages",
            alias = "documents",
            alias = "tasks",
            alias = "data"
        )]
        items: Vec<T>,
    },
}

impl<T> ListEnvelope<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(items) => items,
            ListEnvelope::Wrapped { items } => items,
        }
    }
}

/// Mutation response carrying the full updated entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityEnvelope<T> {
    Wrapped {
        #[serde(rename = "task", alias = "data", alias = "document")]
        entity: T,
    },
    Bare(T),
}

impl<T> EntityEnvelope<T> {
    pub fn into_entity(self) -> T {
        match self {
            EntityEnvelope::Wrapped { entity } => entity,
            EntityEnvelope::Bare(entity) => entity,
        }
    }
}
