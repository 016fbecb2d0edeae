//! Document list ordering

use crate::client::models::Document;

/// Most recently updated first; falls back to creation time
pub fn sorted_documents(documents: &[Document]) -> Vec<Document> {
    let mut sorted = documents.to_vec();
    sorted.sort_by(|a, b| {
        let a_at = a.updated_at.or(a.created_at);
        let b_at = b.updated_at.or(b.created_at);
        b_at.cmp(&a_at)
    });
    sorted
}
