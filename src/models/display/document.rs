//! Document display model

use serde::Serialize;
use tabled::Tabled;

use super::common::{format_datetime, truncate_string};
use crate::client::models::Document;

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct DocumentDisplay {
    #[tabled(rename = "DOC ID")]
    pub id: String,

    #[tabled(rename = "TITLE")]
    pub title: String,

    /// First line of the content
    #[tabled(rename = "PREVIEW")]
    pub preview: String,

    #[tabled(rename = "UPDATED")]
    pub updated: String,
}

impl From<&Document> for DocumentDisplay {
    fn from(doc: &Document) -> Self {
        let first_line = doc.content.lines().next().unwrap_or_default();
        Self {
            id: doc.id.clone(),
            title: doc.title.clone(),
            preview: truncate_string(first_line, 40),
            updated: format_datetime(doc.updated_at.or(doc.created_at)),
        }
    }
}
