//! Remote similarity service ("collaborator") access.
//!
//! The review engine only depends on the [`Collaborator`] trait; the
//! reqwest-backed [`CollaboratorClient`] is the production implementation.

mod client;
mod types;


pub use client::CollaboratorClient;
pub use types::*;

use async_trait::async_trait;

use crate::error::CollaboratorResult;
use crate::records::{DocumentSide, Session};

/// Operations the history review screen needs from the remote service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Collaborator: Send + Sync {
    /// Fetch every stored checking session.
    async fn fetch_history(&self) -> CollaboratorResult<Vec<Session>>;

    /// Fetch the extracted text of one side of a comparison.
    async fn fetch_document(
        &self,
        record_id: &str,
        side: DocumentSide,
    ) -> CollaboratorResult<DocumentContent>;

    /// Delete a session on the server.
    async fn delete_session(&self, session_id: &str) -> CollaboratorResult<()>;
}
