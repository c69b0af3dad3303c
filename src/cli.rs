//! Command-line commands.
//!
//! Each command enters a fresh review screen against the collaborator,
//! drives it through the same transitions a user would, and renders the
//! result.

use chrono::{Local, Offset};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crate::collaborator::{Collaborator, CollaboratorClient};
use crate::config::Config;
use crate::error::{ReviewError, ReviewResult};
use crate::present;
use crate::records::DocumentSide;
use crate::review::{NotificationKind, ReviewScreen, ReviewState};
use crate::submit::Submission;

/// Review plagiarism check results.
#[derive(Parser, Debug)]
#[command(name = "plagiarism-review", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List past checking sessions, newest first
    History,

    /// Expand a session and list its documents by risk
    Show {
        /// Session id as shown by `history`
        session_id: String,
    },

    /// Show every comparison for one document of a session
    Detail {
        session_id: String,
        file_name: String,
    },

    /// Print the extracted text of one side of a comparison
    Document {
        record_id: String,
        /// doc1 or doc2
        side: DocumentSide,
    },

    /// Delete a session
    Delete {
        session_id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Check two or more PDF files against each other
    Check {
        #[arg(required = true, num_args = 2..)]
        files: Vec<PathBuf>,
    },
}

/// Result of CLI command execution.
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }
}

/// Execute a CLI command.
pub async fn execute_command(
    command: Commands,
    client: Arc<CollaboratorClient>,
    config: &Config,
) -> CliResult {
    match command {
        Commands::Check { files } => execute_check(&client, config, files).await,
        Commands::Delete { session_id, yes } => {
            let confirm = move || yes || prompt_confirmation();
            execute_delete(client, &session_id, confirm).await
        }
        other => execute_review(other, client).await,
    }
}

fn local_offset() -> chrono::FixedOffset {
    Local::now().offset().fix()
}

/// Commands that only read from the review screen.
pub async fn execute_review<C: Collaborator>(command: Commands, collaborator: Arc<C>) -> CliResult {
    let screen = ReviewScreen::enter(collaborator).await;
    let offset = local_offset();

    let outcome = match command {
        Commands::History => Ok(()),
        Commands::Show { session_id } => screen.toggle_session(&session_id).await.map(|_| ()),
        Commands::Detail {
            session_id,
            file_name,
        } => match screen.toggle_session(&session_id).await {
            Ok(_) => screen.open_detail(&file_name).await,
            Err(e) => Err(e),
        },
        Commands::Document { record_id, side } => open_record(&screen, &record_id, side).await,
        Commands::Delete { .. } | Commands::Check { .. } => Ok(()),
    };

    let state = screen.state().await;
    screen.leave();

    if let Err(e) = outcome {
        return finish(&state, Err(e.to_string()));
    }

    let body = present::render_modals(&state)
        .unwrap_or_else(|| present::render_history(&state, offset));
    finish(&state, Ok(body))
}

/// Walk the screen to the content modal for `record_id`.
async fn open_record<C: Collaborator>(
    screen: &ReviewScreen<C>,
    record_id: &str,
    side: DocumentSide,
) -> ReviewResult<()> {
    let located = screen
        .with_state(|state| {
            state.sessions().iter().find_map(|session| {
                session
                    .records
                    .iter()
                    .find(|r| r.id == record_id)
                    .map(|r| (session.session_id.clone(), r.doc1_name.clone()))
            })
        })
        .await;

    let (session_id, owner) = located.ok_or_else(|| ReviewError::InvalidTransition {
        message: format!("record {} is not in any session", record_id),
    })?;

    screen.toggle_session(&session_id).await?;
    screen.open_detail(&owner).await?;
    screen.open_document(record_id, side).await
}

/// Delete flow: confirmation, remote delete, refresh.
pub async fn execute_delete<C: Collaborator>(
    collaborator: Arc<C>,
    session_id: &str,
    confirm: impl FnOnce() -> bool,
) -> CliResult {
    let screen = ReviewScreen::enter(collaborator).await;

    if let Err(e) = screen.request_delete(session_id).await {
        let state = screen.state().await;
        return finish(&state, Err(e.to_string()));
    }

    if !confirm() {
        screen.cancel_delete().await;
        screen.leave();
        return CliResult::success("Batal");
    }

    let outcome = screen.confirm_delete().await;
    let state = screen.state().await;
    screen.leave();

    match outcome {
        Ok(()) => finish(&state, Ok(present::render_history(&state, local_offset()))),
        Err(e) => finish(&state, Err(e.to_string())),
    }
}

/// Append notifications; any error notification fails the command.
fn finish(state: &ReviewState, outcome: Result<String, String>) -> CliResult {
    let mut failed = outcome.is_err();
    let mut message = match outcome {
        Ok(body) => body,
        Err(e) => format!("Error: {}", e),
    };

    for notification in state.notifications() {
        if notification.kind == NotificationKind::Error {
            failed = true;
        }
        message.push('\n');
        message.push_str(&present::render_notification(notification));
    }

    if failed {
        CliResult::error(message)
    } else {
        CliResult::success(message)
    }
}

fn prompt_confirmation() -> bool {
    print!("Apakah Anda yakin ingin menghapus sesi ini? [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "ya" | "yes")
}

/// Submission flow and single-check result view.
async fn execute_check(
    client: &CollaboratorClient,
    config: &Config,
    files: Vec<PathBuf>,
) -> CliResult {
    let mut submission = Submission::new();
    let report = submission.add_all(&files);

    let mut warnings = String::new();
    if !report.duplicates.is_empty() {
        warnings.push_str("Beberapa file sudah dipilih sebelumnya.\n");
    }

    match submission.submit(client, &config.submission).await {
        Ok(records) => CliResult::success(format!(
            "{}{}",
            warnings,
            present::render_check_results(&records)
        )),
        Err(e) => CliResult::error(format!(
            "{}Terjadi kesalahan saat memproses file: {}",
            warnings, e
        )),
    }
}
