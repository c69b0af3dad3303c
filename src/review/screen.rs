//! Async driver for the history review screen.
//!
//! Holds the [`ReviewState`] for the lifetime of one screen visit. The
//! state lock is never held while a collaborator call is in flight, so
//! overlapping requests resolve through the state's tickets.

use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

use super::state::ReviewState;
use crate::collaborator::Collaborator;
use crate::error::ReviewResult;
use crate::records::DocumentSide;

/// One visit to the history screen.
pub struct ReviewScreen<C: Collaborator> {
    collaborator: Arc<C>,
    state: Mutex<ReviewState>,
    shutdown: watch::Sender<bool>,
}

impl<C: Collaborator> ReviewScreen<C> {
    /// Create a screen with fresh state and nothing loaded.
    pub fn new(collaborator: Arc<C>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            collaborator,
            state: Mutex::new(ReviewState::new()),
            shutdown,
        }
    }

    /// Create a screen and load the history.
    pub async fn enter(collaborator: Arc<C>) -> Self {
        let screen = Self::new(collaborator);
        screen.refresh().await;
        screen
    }

    /// Leave the screen: pending fetches are abandoned and their results
    /// never applied.
    pub fn leave(&self) {
        info!("Leaving review screen");
        self.shutdown.send_replace(true);
    }

    pub fn is_active(&self) -> bool {
        !*self.shutdown.borrow()
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> ReviewState {
        self.state.lock().await.clone()
    }

    /// Read the state without cloning it.
    pub async fn with_state<R>(&self, f: impl FnOnce(&ReviewState) -> R) -> R {
        f(&*self.state.lock().await)
    }

    /// Reload the full history; the list is replaced only on success.
    pub async fn refresh(&self) {
        let ticket = self.state.lock().await.begin_history_load();

        if let Some(result) = self.until_left(self.collaborator.fetch_history()).await {
            self.state.lock().await.complete_history_load(ticket, result);
        }
    }

    pub async fn toggle_session(&self, session_id: &str) -> ReviewResult<bool> {
        self.state.lock().await.toggle_session(session_id)
    }

    pub async fn open_detail(&self, file_name: &str) -> ReviewResult<()> {
        self.state.lock().await.open_detail(file_name)
    }

    pub async fn close_frontmost(&self) {
        self.state.lock().await.close_frontmost();
    }

    pub async fn dismiss_notification(&self, id: u64) -> bool {
        self.state.lock().await.dismiss_notification(id)
    }

    /// Open the content modal for one side of a comparison.
    ///
    /// Failures of the fetch itself land in the content modal's error
    /// state; only invalid transitions are returned as errors.
    pub async fn open_document(&self, record_id: &str, side: DocumentSide) -> ReviewResult<()> {
        let ticket = match self
            .state
            .lock()
            .await
            .begin_document_fetch(record_id, side)?
        {
            Some(ticket) => ticket,
            None => return Ok(()),
        };

        let fetch = self.collaborator.fetch_document(record_id, side);
        if let Some(result) = self.until_left(fetch).await {
            self.state.lock().await.complete_document_fetch(ticket, result);
        }
        Ok(())
    }

    pub async fn request_delete(&self, session_id: &str) -> ReviewResult<()> {
        self.state.lock().await.request_delete(session_id)
    }

    pub async fn cancel_delete(&self) {
        self.state.lock().await.cancel_delete();
    }

    /// Confirm the pending deletion, delete remotely, then refresh.
    pub async fn confirm_delete(&self) -> ReviewResult<()> {
        let session_id = self.state.lock().await.confirm_delete()?;

        let result = match self
            .until_left(self.collaborator.delete_session(&session_id))
            .await
        {
            Some(result) => result,
            None => return Ok(()),
        };

        let deleted = self.state.lock().await.complete_delete(&session_id, result);
        if deleted {
            self.refresh().await;
        }
        Ok(())
    }

    /// Run `fut` unless the screen is left first.
    async fn until_left<F: std::future::Future>(&self, fut: F) -> Option<F::Output> {
        let mut shutdown = self.shutdown.subscribe();
        let left = async move {
            loop {
                if *shutdown.borrow_and_update() {
                    break;
                }
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        };

        tokio::select! {
            output = fut => {
                if self.is_active() {
                    Some(output)
                } else {
                    debug!("Dropping result that arrived after leaving");
                    None
                }
            }
            _ = left => {
                debug!("Abandoned pending request on leave");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::{DocumentContent, MockCollaborator};
    use crate::error::CollaboratorError;
    use crate::records::{Session, SimilarityRecord};
    use crate::review::{ContentModal, DeleteFlow, HistoryStatus};

    const SESSION: &str = "2024-03-01T08:00:00Z";

    fn history() -> Vec<Session> {
        vec![Session::new(
            SESSION,
            vec![
                SimilarityRecord::new("7", "A", "B", 10.0).unwrap(),
                SimilarityRecord::new("8", "A", "C", 20.0).unwrap(),
                SimilarityRecord::new("9", "B", "C", 30.0).unwrap(),
            ],
        )]
    }

    #[tokio::test]
    async fn test_enter_loads_history() {
        let mut mock = MockCollaborator::new();
        mock.expect_fetch_history().times(1).returning(|| Ok(history()));

        let screen = ReviewScreen::enter(Arc::new(mock)).await;
        let state = screen.state().await;
        assert_eq!(state.history(), &HistoryStatus::Ready);
        assert_eq!(state.sessions().len(), 1);
    }

    #[tokio::test]
    async fn test_enter_history_failure_notifies() {
        let mut mock = MockCollaborator::new();
        mock.expect_fetch_history().returning(|| {
            Err(CollaboratorError::NetworkUnavailable {
                message: "offline".to_string(),
                retries: 2,
            })
        });

        let screen = ReviewScreen::enter(Arc::new(mock)).await;
        let state = screen.state().await;
        assert!(matches!(state.history(), HistoryStatus::Error(_)));
        assert_eq!(state.notifications()[0].message, "Gagal memuat riwayat");
    }

    #[tokio::test]
    async fn test_rejected_delete_keeps_session() {
        let mut mock = MockCollaborator::new();
        mock.expect_fetch_history().times(1).returning(|| Ok(history()));
        mock.expect_delete_session().times(1).returning(|_| {
            Err(CollaboratorError::RemoteRejected {
                status: 500,
                message: "internal".to_string(),
            })
        });

        let screen = ReviewScreen::enter(Arc::new(mock)).await;
        screen.request_delete(SESSION).await.unwrap();
        screen.confirm_delete().await.unwrap();

        let state = screen.state().await;
        assert_eq!(state.sessions().len(), 1);
        assert_eq!(state.delete_flow(), &DeleteFlow::Idle);
        assert!(state.delete_error().is_some());
    }

    #[tokio::test]
    async fn test_successful_delete_refreshes() {
        let mut mock = MockCollaborator::new();
        let mut calls = 0;
        mock.expect_fetch_history().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(history())
            } else {
                Ok(vec![])
            }
        });
        mock.expect_delete_session()
            .withf(|id| id.to_string() == SESSION)
            .times(1)
            .returning(|_| Ok(()));

        let screen = ReviewScreen::enter(Arc::new(mock)).await;
        screen.request_delete(SESSION).await.unwrap();
        screen.confirm_delete().await.unwrap();

        let state = screen.state().await;
        assert!(state.sessions().is_empty());
        assert_eq!(state.history(), &HistoryStatus::Ready);
    }

    #[tokio::test]
    async fn test_delete_of_missing_session_refreshes() {
        let mut mock = MockCollaborator::new();
        let mut calls = 0;
        mock.expect_fetch_history().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(history())
            } else {
                Ok(vec![])
            }
        });
        mock.expect_delete_session().times(1).returning(|_| {
            Err(CollaboratorError::NotFound {
                resource: format!("/delete-session/{}", SESSION),
            })
        });

        let screen = ReviewScreen::enter(Arc::new(mock)).await;
        screen.request_delete(SESSION).await.unwrap();
        screen.confirm_delete().await.unwrap();

        let state = screen.state().await;
        assert!(state.sessions().is_empty());
        assert!(state.delete_error().is_none());
        assert_eq!(state.delete_flow(), &DeleteFlow::Idle);
        assert_eq!(state.history(), &HistoryStatus::Ready);
    }

    #[tokio::test]
    async fn test_open_document() {
        let mut mock = MockCollaborator::new();
        mock.expect_fetch_history().returning(|| Ok(history()));
        mock.expect_fetch_document()
            .withf(|id, side| id.to_string() == "8" && *side == DocumentSide::Doc2)
            .times(1)
            .returning(|_, _| {
                Ok(DocumentContent {
                    name: "C".to_string(),
                    text: "body".to_string(),
                })
            });

        let screen = ReviewScreen::enter(Arc::new(mock)).await;
        screen.toggle_session(SESSION).await.unwrap();
        screen.open_detail("A").await.unwrap();
        screen.open_document("8", DocumentSide::Doc2).await.unwrap();

        let state = screen.state().await;
        assert!(matches!(state.content(), ContentModal::Open { content, .. } if content.name == "C"));
    }

    #[tokio::test]
    async fn test_open_document_without_detail_is_rejected() {
        let mut mock = MockCollaborator::new();
        mock.expect_fetch_history().returning(|| Ok(history()));
        mock.expect_fetch_document().never();

        let screen = ReviewScreen::enter(Arc::new(mock)).await;
        assert!(screen.open_document("7", DocumentSide::Doc1).await.is_err());
    }
}
