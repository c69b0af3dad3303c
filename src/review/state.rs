//! Explicit state of the history review screen.
//!
//! # Axes
//!
//! - **Session**: collapsed, or exactly one session expanded
//! - **Detail modal**: closed, or open on one document's comparisons
//! - **Content modal**: closed, loading, open, or error for one side of
//!   one comparison; nested on top of the detail modal
//! - **Delete flow**: idle, confirming, or deleting one session
//!
//! Every mutation goes through a method here; async callers obtain a
//! ticket before suspending and hand it back with the result, and stale
//! tickets are ignored.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::index::SessionIndex;
use crate::analysis::DocumentSummary;
use crate::collaborator::DocumentContent;
use crate::error::{CollaboratorError, CollaboratorResult, ReviewError, ReviewResult};
use crate::records::{DocumentSide, Session};

/// Loading state of the session list.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryStatus {
    /// Nothing requested yet.
    Idle,
    Loading,
    Ready,
    Error(String),
}

/// Comparison-detail modal.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailModal {
    Closed,
    /// Comparisons are already sorted by similarity descending.
    Open(DocumentSummary),
}

/// Identifies one side of one comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentKey {
    pub record_id: String,
    pub side: DocumentSide,
}

impl ContentKey {
    pub fn new(record_id: impl Into<String>, side: DocumentSide) -> Self {
        Self {
            record_id: record_id.into(),
            side,
        }
    }
}

/// Document-content modal.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentModal {
    Closed,
    Loading(ContentKey),
    Open {
        key: ContentKey,
        content: DocumentContent,
    },
    Error {
        key: ContentKey,
        message: String,
    },
}

/// Session deletion flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteFlow {
    Idle,
    Confirming(String),
    Deleting(String),
}

/// Which modal a background press dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissed {
    Content,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A visible, dismissible message.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

/// Handed out when a fetch starts; only the newest ticket is honored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket<K> {
    pub key: K,
    generation: u64,
}

pub type ContentTicket = FetchTicket<ContentKey>;
pub type HistoryTicket = FetchTicket<()>;

/// Whole-screen review state, built fresh on screen entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewState {
    index: SessionIndex,
    history: HistoryStatus,
    detail: DetailModal,
    content: ContentModal,
    delete: DeleteFlow,
    delete_error: Option<String>,
    content_generation: u64,
    history_generation: u64,
    notifications: Vec<Notification>,
    next_notification_id: u64,
}

impl Default for ReviewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewState {
    pub fn new() -> Self {
        Self {
            index: SessionIndex::default(),
            history: HistoryStatus::Idle,
            detail: DetailModal::Closed,
            content: ContentModal::Closed,
            delete: DeleteFlow::Idle,
            delete_error: None,
            content_generation: 0,
            history_generation: 0,
            notifications: Vec::new(),
            next_notification_id: 1,
        }
    }

    pub fn index(&self) -> &SessionIndex {
        &self.index
    }

    pub fn sessions(&self) -> &[Session] {
        self.index.list_sessions()
    }

    pub fn history(&self) -> &HistoryStatus {
        &self.history
    }

    pub fn detail(&self) -> &DetailModal {
        &self.detail
    }

    pub fn content(&self) -> &ContentModal {
        &self.content
    }

    pub fn delete_flow(&self) -> &DeleteFlow {
        &self.delete
    }

    pub fn delete_error(&self) -> Option<&str> {
        self.delete_error.as_deref()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    // ---- history ----

    pub fn begin_history_load(&mut self) -> HistoryTicket {
        self.history_generation += 1;
        self.history = HistoryStatus::Loading;
        FetchTicket {
            key: (),
            generation: self.history_generation,
        }
    }

    /// Apply a history fetch result. The list is replaced whole or not at all.
    pub fn complete_history_load(
        &mut self,
        ticket: HistoryTicket,
        result: CollaboratorResult<Vec<Session>>,
    ) -> bool {
        if ticket.generation != self.history_generation {
            debug!("Discarding stale history response");
            return false;
        }

        match result {
            Ok(sessions) => {
                info!(sessions = sessions.len(), "History loaded");
                self.index.replace_all(sessions);
                self.history = HistoryStatus::Ready;
                self.reconcile_modals();
            }
            Err(e) => {
                warn!(error = %e, "History load failed");
                self.history = HistoryStatus::Error(e.to_string());
                self.notify(NotificationKind::Error, "Error", "Gagal memuat riwayat");
            }
        }
        true
    }

    // ---- session axis ----

    /// Expand or collapse a session. Any open modal belongs to the
    /// previously expanded session and is closed.
    pub fn toggle_session(&mut self, session_id: &str) -> ReviewResult<bool> {
        let expanded = self.index.toggle_expansion(session_id)?;
        self.close_detail();
        Ok(expanded)
    }

    // ---- detail modal ----

    pub fn open_detail(&mut self, file_name: &str) -> ReviewResult<()> {
        let expanded = self
            .index
            .expanded()
            .ok_or_else(|| ReviewError::InvalidTransition {
                message: "no session is expanded".to_string(),
            })?;
        let summary = expanded
            .summaries
            .iter()
            .find(|s| s.file_name == file_name)
            .ok_or_else(|| ReviewError::UnknownDocument {
                file_name: file_name.to_string(),
            })?;

        self.detail = DetailModal::Open(summary.for_detail_view());
        Ok(())
    }

    /// Background press: dismiss only the frontmost modal.
    pub fn close_frontmost(&mut self) -> Option<Dismissed> {
        if self.content != ContentModal::Closed {
            self.close_content();
            Some(Dismissed::Content)
        } else if self.detail != DetailModal::Closed {
            self.detail = DetailModal::Closed;
            Some(Dismissed::Detail)
        } else {
            None
        }
    }

    fn close_detail(&mut self) {
        self.close_content();
        self.detail = DetailModal::Closed;
    }

    fn close_content(&mut self) {
        // invalidates any in-flight fetch
        self.content_generation += 1;
        self.content = ContentModal::Closed;
    }

    /// Close modals whose data no longer exists after a history change.
    fn reconcile_modals(&mut self) {
        let still_valid = match (&self.detail, self.index.expanded()) {
            (DetailModal::Closed, _) => true,
            (DetailModal::Open(summary), Some(expanded)) => expanded
                .summaries
                .iter()
                .any(|s| s.file_name == summary.file_name),
            (DetailModal::Open(_), None) => false,
        };
        if !still_valid {
            self.close_detail();
        }
    }

    // ---- content modal ----

    /// Start fetching one side of a comparison shown in the detail modal.
    ///
    /// Returns `None` when the same key is already loading, so a repeated
    /// tap does not start a second request. A different key supersedes any
    /// pending fetch.
    pub fn begin_document_fetch(
        &mut self,
        record_id: &str,
        side: DocumentSide,
    ) -> ReviewResult<Option<ContentTicket>> {
        let summary = match &self.detail {
            DetailModal::Open(summary) => summary,
            DetailModal::Closed => {
                return Err(ReviewError::InvalidTransition {
                    message: "comparison detail is not open".to_string(),
                })
            }
        };
        if !summary.comparisons.iter().any(|c| c.record_id == record_id) {
            return Err(ReviewError::InvalidTransition {
                message: format!("record {} is not part of the open detail", record_id),
            });
        }

        let key = ContentKey::new(record_id, side);
        if self.content == ContentModal::Loading(key.clone()) {
            debug!(record_id = %record_id, side = %side, "Fetch already in flight");
            return Ok(None);
        }

        self.content_generation += 1;
        self.content = ContentModal::Loading(key.clone());
        Ok(Some(FetchTicket {
            key,
            generation: self.content_generation,
        }))
    }

    /// Apply a document fetch result; stale results are dropped.
    pub fn complete_document_fetch(
        &mut self,
        ticket: ContentTicket,
        result: CollaboratorResult<DocumentContent>,
    ) -> bool {
        if ticket.generation != self.content_generation {
            debug!(
                record_id = %ticket.key.record_id,
                side = %ticket.key.side,
                "Discarding superseded document response"
            );
            return false;
        }

        match result {
            Ok(content) => {
                self.content = ContentModal::Open {
                    key: ticket.key,
                    content,
                };
            }
            Err(e) => {
                warn!(
                    record_id = %ticket.key.record_id,
                    side = %ticket.key.side,
                    error = %e,
                    "Document fetch failed"
                );
                self.content = ContentModal::Error {
                    key: ticket.key,
                    message: e.to_string(),
                };
                self.notify(NotificationKind::Error, "Error", "Gagal memuat dokumen");
            }
        }
        true
    }

    // ---- delete flow ----

    /// Ask for confirmation before deleting a session.
    pub fn request_delete(&mut self, session_id: &str) -> ReviewResult<()> {
        if let DeleteFlow::Deleting(current) = &self.delete {
            return Err(ReviewError::InvalidTransition {
                message: format!("session {} is being deleted", current),
            });
        }
        if self.index.get(session_id).is_none() {
            return Err(ReviewError::UnknownSession {
                session_id: session_id.to_string(),
            });
        }

        self.delete_error = None;
        self.delete = DeleteFlow::Confirming(session_id.to_string());
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        if matches!(self.delete, DeleteFlow::Confirming(_)) {
            self.delete = DeleteFlow::Idle;
        }
    }

    /// Confirm the pending prompt; returns the session to delete remotely.
    pub fn confirm_delete(&mut self) -> ReviewResult<String> {
        match std::mem::replace(&mut self.delete, DeleteFlow::Idle) {
            DeleteFlow::Confirming(session_id) => {
                self.delete = DeleteFlow::Deleting(session_id.clone());
                Ok(session_id)
            }
            other => {
                self.delete = other;
                Err(ReviewError::InvalidTransition {
                    message: "no deletion awaiting confirmation".to_string(),
                })
            }
        }
    }

    /// Apply the remote delete result.
    ///
    /// Success removes the session locally; failure leaves every session
    /// in place and records the error. Returns whether the deletion counted
    /// as done, in which case the history should be reloaded.
    pub fn complete_delete(&mut self, session_id: &str, result: CollaboratorResult<()>) -> bool {
        if self.delete != DeleteFlow::Deleting(session_id.to_string()) {
            debug!(session_id = %session_id, "Ignoring delete result with no matching flow");
            return false;
        }
        self.delete = DeleteFlow::Idle;

        match result {
            Ok(()) | Err(CollaboratorError::NotFound { .. }) => {
                // already gone remotely counts as deleted
                if self.index.remove_session(session_id).is_ok() {
                    self.reconcile_modals();
                }
                self.notify(NotificationKind::Success, "Sukses", "Sesi berhasil dihapus");
                true
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Delete failed");
                self.delete_error = Some(e.to_string());
                self.notify(NotificationKind::Error, "Error", "Gagal menghapus sesi");
                false
            }
        }
    }

    // ---- notifications ----

    fn notify(&mut self, kind: NotificationKind, title: &str, message: &str) {
        let id = self.next_notification_id;
        self.next_notification_id += 1;
        self.notifications.push(Notification {
            id,
            kind,
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    pub fn dismiss_notification(&mut self, id: u64) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        before != self.notifications.len()
    }
}
