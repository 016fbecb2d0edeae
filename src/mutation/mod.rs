//! Write operations against the dashboard API
//!
//! Every mutation waits for the server to confirm before touching the cache.
//! A confirmed response replaces the parent entity's entry wholesale and then
//! invalidates the dependent queries, so that observers refetch the server's
//! view. A failure leaves the cache exactly as it was.

pub mod autosave;

use std::sync::Arc;

use log::{debug, warn};

use crate::cache::{KeyPattern, QueryCache, ResourceKey, resource};
use crate::client::DashboardApi;
use crate::client::models::{Document, DocumentDraft, Message, Task, UploadFile};
use crate::error::{ApiResult, Result, ValidationError};
use crate::notify::{Notification, Notifier};

pub use autosave::Autosaver;

/// A user action that changes server state
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    SendMessage {
        to: String,
        body: String,
    },
    ToggleChecklistItem {
        task_id: String,
        index: usize,
        completed: bool,
    },
    UploadSubmissions {
        task_id: String,
        files: Vec<UploadFile>,
    },
    CreateDocument(DocumentDraft),
    UpdateDocument {
        id: String,
        draft: DocumentDraft,
    },
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::SendMessage { .. } => "send-message",
            Mutation::ToggleChecklistItem { .. } => "toggle-checklist-item",
            Mutation::UploadSubmissions { .. } => "upload-submissions",
            Mutation::CreateDocument(_) => "create-document",
            Mutation::UpdateDocument { .. } => "update-document",
        }
    }

    /// Queries that no longer reflect the server once this action succeeds
    pub fn invalidations(&self) -> Vec<KeyPattern> {
        match self {
            Mutation::SendMessage { to, .. } => vec![
                KeyPattern::resource(resource::MESSAGES).with("user", to.as_str()),
                KeyPattern::resource(resource::CHAT_USERS),
            ],
            Mutation::ToggleChecklistItem { .. } | Mutation::UploadSubmissions { .. } => vec![
                KeyPattern::resource(resource::TASKS),
                KeyPattern::resource(resource::DASHBOARD),
            ],
            Mutation::CreateDocument(_) | Mutation::UpdateDocument { .. } => {
                vec![KeyPattern::resource(resource::DOCUMENTS)]
            }
        }
    }

    pub fn success_message(&self) -> String {
        match self {
            Mutation::SendMessage { .. } => "Message sent".to_string(),
            Mutation::ToggleChecklistItem { .. } => "Checklist updated".to_string(),
            Mutation::UploadSubmissions { files, .. } => {
                let noun = if files.len() == 1 { "file" } else { "files" };
                format!(
                    "{} {} uploaded and sent to admin successfully!",
                    files.len(),
                    noun
                )
            }
            Mutation::CreateDocument(_) => "Document created".to_string(),
            Mutation::UpdateDocument { .. } => "Document saved".to_string(),
        }
    }
}

/// Confirmed server response of a mutation
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Message(Message),
    Task(Task),
    Document(Document),
}

/// Runs mutations and keeps the cache consistent with their results.
pub struct MutationCoordinator<C: DashboardApi> {
    client: Arc<C>,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

impl<C: DashboardApi> MutationCoordinator<C> {
    pub fn new(client: Arc<C>, cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            cache,
            notifier,
        }
    }

    #[cfg(test)]
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Validate, send, and reconcile one action.
    ///
    /// Validation failures are returned without a request or a notification.
    pub async fn mutate(&self, mutation: Mutation) -> Result<MutationOutcome> {
        if let Err(err) = self.validate(&mutation) {
            debug!("Rejected {} locally: {}", mutation.name(), err);
            return Err(err.into());
        }

        match self.perform(&mutation).await {
            Ok(outcome) => {
                self.reconcile(&mutation, &outcome);
                self.notifier
                    .notify(Notification::success(mutation.success_message()));
                Ok(outcome)
            }
            Err(err) => {
                debug!("{} failed: {}", mutation.name(), err);
                self.notifier.notify(Notification::error(err.user_message()));
                Err(err.into())
            }
        }
    }

    fn validate(&self, mutation: &Mutation) -> std::result::Result<(), ValidationError> {
        match mutation {
            Mutation::SendMessage { to, body } => {
                if to.trim().is_empty() {
                    return Err(ValidationError::Invalid {
                        field: "recipient",
                        reason: "no conversation selected".to_string(),
                    });
                }
                if body.trim().is_empty() {
                    return Err(ValidationError::EmptyMessage);
                }
                Ok(())
            }
            Mutation::ToggleChecklistItem { task_id, index, .. } => {
                // Only checked when the task is cached; the server rejects the rest
                match self.cache.peek_as::<Task>(&ResourceKey::task(task_id)) {
                    Some(task) => task.check_index(*index),
                    None => Ok(()),
                }
            }
            Mutation::UploadSubmissions { files, .. } => {
                if files.is_empty() {
                    return Err(ValidationError::NoFiles);
                }
                files.iter().try_for_each(UploadFile::validate)
            }
            Mutation::CreateDocument(draft) | Mutation::UpdateDocument { draft, .. } => {
                draft.validate()
            }
        }
    }

    async fn perform(&self, mutation: &Mutation) -> ApiResult<MutationOutcome> {
        let outcome = match mutation {
            Mutation::SendMessage { to, body } => {
                MutationOutcome::Message(self.client.send_message(to, body).await?)
            }
            Mutation::ToggleChecklistItem {
                task_id,
                index,
                completed,
            } => MutationOutcome::Task(
                self.client
                    .toggle_checklist_item(task_id, *index, *completed)
                    .await?,
            ),
            Mutation::UploadSubmissions { task_id, files } => {
                MutationOutcome::Task(self.client.upload_submissions(task_id, files).await?)
            }
            Mutation::CreateDocument(draft) => {
                MutationOutcome::Document(self.client.create_document(draft).await?)
            }
            Mutation::UpdateDocument { id, draft } => {
                MutationOutcome::Document(self.client.update_document(id, draft).await?)
            }
        };
        Ok(outcome)
    }

    fn reconcile(&self, mutation: &Mutation, outcome: &MutationOutcome) {
        if let MutationOutcome::Task(task) = outcome {
            let key = ResourceKey::task(&task.id);
            if let Err(err) = self.cache.set_as(&key, task) {
                warn!("Could not store confirmed {}: {}", key, err);
                self.cache.invalidate(&KeyPattern::from(key));
            }
        }
        for pattern in mutation.invalidations() {
            self.cache.invalidate(&pattern);
        }
    }
}
