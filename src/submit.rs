//! Submission flow: pick files, extract their text remotely, and request a
//! pairwise comparison.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::collaborator::{CollaboratorClient, DocumentInput};
use crate::config::SubmissionConfig;
use crate::error::{AppResult, ReviewError, ReviewResult};
use crate::records::SimilarityRecord;

/// Minimum number of documents a check needs.
pub const MIN_DOCUMENTS: usize = 2;

/// A file chosen for checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    pub path: PathBuf,
}

impl PickedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Unnamed".to_string());
        Self { name, path }
    }
}

/// Outcome of adding a batch of files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    pub added: usize,
    pub duplicates: Vec<PathBuf>,
}

/// Files selected for one check, unique by path.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    files: Vec<PickedFile>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[PickedFile] {
        &self.files
    }

    /// Add a file; returns `false` if the path was already picked.
    pub fn add(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if self.files.iter().any(|f| f.path == path) {
            return false;
        }
        self.files.push(PickedFile::new(path));
        true
    }

    pub fn add_all<I, P>(&mut self, paths: I) -> AddReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut report = AddReport::default();
        for path in paths {
            if self.add(path.as_ref()) {
                report.added += 1;
            } else {
                report.duplicates.push(path.as_ref().to_path_buf());
            }
        }
        report
    }

    pub fn remove(&mut self, position: usize) -> Option<PickedFile> {
        (position < self.files.len()).then(|| self.files.remove(position))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn validate(&self) -> ReviewResult<()> {
        if self.files.len() < MIN_DOCUMENTS {
            return Err(ReviewError::Validation {
                field: "files".to_string(),
                reason: format!("at least {} files are required", MIN_DOCUMENTS),
            });
        }
        Ok(())
    }

    /// Extract every file's text and submit the set for comparison.
    pub async fn submit(
        &self,
        client: &CollaboratorClient,
        config: &SubmissionConfig,
    ) -> AppResult<Vec<SimilarityRecord>> {
        self.validate()?;

        let mut documents = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let bytes = tokio::fs::read(&file.path).await?;
            let text = client.extract_text(&file.name, bytes).await?;
            if text.trim().is_empty() {
                warn!(file = %file.name, "No text extracted");
                return Err(ReviewError::Validation {
                    field: "files".to_string(),
                    reason: format!("no text could be extracted from {}", file.name),
                }
                .into());
            }
            documents.push(DocumentInput::new(&file.name, text));
        }

        let records = client.check_plagiarism(documents, config).await?;
        info!(results = records.len(), "Check completed");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_rejected() {
        let mut submission = Submission::new();
        let report = submission.add_all(["/tmp/a.pdf", "/tmp/b.pdf", "/tmp/a.pdf"]);
        assert_eq!(report.added, 2);
        assert_eq!(report.duplicates, vec![PathBuf::from("/tmp/a.pdf")]);
        assert_eq!(submission.files()[1].name, "b.pdf");
    }

    #[test]
    fn test_minimum_files() {
        let mut submission = Submission::new();
        submission.add("/tmp/a.pdf");
        assert!(matches!(
            submission.validate(),
            Err(ReviewError::Validation { .. })
        ));
        submission.add("/tmp/b.pdf");
        assert!(submission.validate().is_ok());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut submission = Submission::new();
        submission.add_all(["/tmp/a.pdf", "/tmp/b.pdf"]);
        assert_eq!(submission.remove(0).unwrap().name, "a.pdf");
        assert!(submission.remove(5).is_none());
        submission.clear();
        assert!(submission.files().is_empty());
    }
}
