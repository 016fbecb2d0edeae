//! Debounced document saving

use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Duration;

use super::{Mutation, MutationCoordinator, MutationOutcome};
use crate::client::DashboardApi;
use crate::client::models::DocumentDraft;
use crate::error::{Error, Result};

type SaveTask = JoinHandle<Option<Result<MutationOutcome>>>;

/// The debounce timer of the most recent edit
struct Timer {
    /// Stops the timer while it is still waiting; ignored once a save started
    cancel: oneshot::Sender<()>,
    task: SaveTask,
}

/// Saves a document after edits pause for `delay`.
///
/// Each scheduled edit restarts the window, and only the latest draft is
/// sent. A save that already started always runs to completion, and saves
/// never overlap, so the server sees drafts in edit order. Drafts that fail
/// validation are dropped by the coordinator without a request or a
/// notification.
pub struct Autosaver<C: DashboardApi + 'static> {
    coordinator: Arc<MutationCoordinator<C>>,
    document_id: String,
    delay: Duration,
    latest: Arc<Mutex<Option<DocumentDraft>>>,
    /// Held for the duration of each save
    saving: Arc<tokio::sync::Mutex<()>>,
    timer: Option<Timer>,
}

impl<C: DashboardApi + 'static> Autosaver<C> {
    pub fn new(
        coordinator: Arc<MutationCoordinator<C>>,
        document_id: impl Into<String>,
        delay: Duration,
    ) -> Self {
        Self {
            coordinator,
            document_id: document_id.into(),
            delay,
            latest: Arc::new(Mutex::new(None)),
            saving: Arc::new(tokio::sync::Mutex::new(())),
            timer: None,
        }
    }

    /// Record an edit and restart the debounce window
    pub fn schedule(&mut self, draft: DocumentDraft) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(draft);
        if let Some(timer) = self.timer.take() {
            // An earlier save in progress keeps running
            let _ = timer.cancel.send(());
        }

        let (cancel, cancelled) = oneshot::channel();
        let task = self.spawn_timer(cancelled);
        self.timer = Some(Timer { cancel, task });
    }

    fn spawn_timer(&self, cancelled: oneshot::Receiver<()>) -> SaveTask {
        let coordinator = Arc::clone(&self.coordinator);
        let latest = Arc::clone(&self.latest);
        let saving = Arc::clone(&self.saving);
        let id = self.document_id.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                Ok(()) = cancelled => return None,
            }
            let _saving = saving.lock().await;
            let draft = take(&latest)?;
            let result = save(&coordinator, id, draft).await;
            if let Err(err) = &result {
                debug!("Autosave skipped: {}", err);
            }
            Some(result)
        })
    }

    /// True while an edit is waiting for its window to close
    pub fn is_pending(&self) -> bool {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Save the pending edit now, or wait for the save already under way.
    ///
    /// Returns `None` when there was nothing to save.
    pub async fn flush(&mut self) -> Result<Option<MutationOutcome>> {
        let started = match self.timer.take() {
            Some(timer) => {
                let _ = timer.cancel.send(());
                timer
                    .task
                    .await
                    .map_err(|err| Error::Other(format!("Autosave task failed: {}", err)))?
            }
            None => None,
        };

        let _saving = self.saving.lock().await;
        match take(&self.latest) {
            Some(draft) => save(&self.coordinator, self.document_id.clone(), draft)
                .await
                .map(Some),
            None => started.transpose(),
        }
    }
}

fn take(latest: &Mutex<Option<DocumentDraft>>) -> Option<DocumentDraft> {
    latest.lock().unwrap_or_else(PoisonError::into_inner).take()
}

async fn save<C: DashboardApi>(
    coordinator: &MutationCoordinator<C>,
    id: String,
    draft: DocumentDraft,
) -> Result<MutationOutcome> {
    debug!("Autosaving document {}", id);
    coordinator
        .mutate(Mutation::UpdateDocument { id, draft })
        .await
}
