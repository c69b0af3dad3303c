//! # Plagiarism Review
//!
//! Client and review engine for a remote document-similarity ("plagiarism")
//! checking service. The service extracts text and scores every pair of
//! submitted documents; this crate turns its flat pairwise results into a
//! navigable, per-document risk view.
//!
//! ## Features
//!
//! - **Aggregation**: per-document average similarity and ranked comparisons
//! - **Risk Classification**: SAFE / REVIEW / PLAGIARIZED tiers with labels and colors
//! - **Session History**: newest-first index with single-session expansion
//! - **Review State Machine**: nested detail/content modals, delete flow,
//!   last-request-wins document fetches and cancellation on leave
//! - **Submission**: text extraction and comparison requests for new checks
//!
//! ## Architecture
//!
//! ```text
//! Collaborator (HTTP) → Records → Analysis → Session Index → Review State → Presenter
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use plagiarism_review::{Config, CollaboratorClient, ReviewScreen};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = CollaboratorClient::new(&config.collaborator, config.request.clone())?;
//!     let screen = ReviewScreen::enter(Arc::new(client)).await;
//!     screen.toggle_session("2024-02-05T14:30:00Z").await?;
//!     screen.leave();
//!     Ok(())
//! }
//! ```

/// Pure aggregation and risk classification.
pub mod analysis;
/// Command-line interface.
pub mod cli;
/// Remote similarity service client and wire types.
pub mod collaborator;
/// Configuration management.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Plain-text rendering of review data.
pub mod present;
/// Validated session and similarity record types.
pub mod records;
/// Session index, review state machine and screen driver.
pub mod review;
/// Submission flow for new checks.
pub mod submit;

pub use collaborator::{Collaborator, CollaboratorClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use review::{ReviewScreen, ReviewState};
