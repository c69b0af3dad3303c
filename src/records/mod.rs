//! Session and similarity record types.
//!
//! Records arrive from the collaborator as wire payloads and are validated
//! into these types once. After that they are immutable and owned by the
//! [`Session`] they belong to.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::collaborator::{RecordPayload, SessionPayload};
use crate::error::{ReviewError, ReviewResult};

/// One pairwise comparison result between two named documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityRecord {
    /// Opaque identifier used to fetch either side's content.
    pub id: String,
    /// Display name of the first document.
    pub doc1_name: String,
    /// Display name of the second document.
    pub doc2_name: String,
    /// Similarity percentage in `[0, 100]`.
    pub similarity: f64,
}

impl SimilarityRecord {
    /// Build a validated record.
    pub fn new(
        id: impl Into<String>,
        doc1_name: impl Into<String>,
        doc2_name: impl Into<String>,
        similarity: f64,
    ) -> ReviewResult<Self> {
        let doc1_name = doc1_name.into();
        let doc2_name = doc2_name.into();

        if doc1_name.trim().is_empty() {
            return Err(ReviewError::Validation {
                field: "doc1_name".to_string(),
                reason: "document name cannot be empty".to_string(),
            });
        }
        if doc2_name.trim().is_empty() {
            return Err(ReviewError::Validation {
                field: "doc2_name".to_string(),
                reason: "document name cannot be empty".to_string(),
            });
        }
        if !similarity.is_finite() || !(0.0..=100.0).contains(&similarity) {
            return Err(ReviewError::InvalidSimilarity { value: similarity });
        }

        Ok(Self {
            id: id.into(),
            doc1_name,
            doc2_name,
            similarity,
        })
    }

    /// Whether `name` appears on either side of this comparison.
    pub fn involves(&self, name: &str) -> bool {
        self.doc1_name == name || self.doc2_name == name
    }

    /// The name on the other side from `name`.
    ///
    /// For a self-comparison both sides are the same name.
    pub fn counterpart(&self, name: &str) -> &str {
        if self.doc1_name == name {
            &self.doc2_name
        } else {
            &self.doc1_name
        }
    }

    /// Validate a stored record. Stored records are fetched by id later,
    /// so the id must be present.
    fn from_payload(payload: RecordPayload, position: usize) -> ReviewResult<Self> {
        let id = payload.id.ok_or_else(|| ReviewError::Validation {
            field: "id".to_string(),
            reason: format!("record {} has no id", position),
        })?;
        Self::new(
            id.to_string(),
            payload.doc1_name,
            payload.doc2_name,
            payload.similarity,
        )
    }
}

/// Which side of a comparison a document sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSide {
    Doc1,
    Doc2,
}

impl DocumentSide {
    /// Path segment used by the collaborator.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentSide::Doc1 => "doc1",
            DocumentSide::Doc2 => "doc2",
        }
    }
}

impl std::fmt::Display for DocumentSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DocumentSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "doc1" => Ok(DocumentSide::Doc1),
            "doc2" => Ok(DocumentSide::Doc2),
            _ => Err(format!("Unknown document side: {} (expected doc1 or doc2)", s)),
        }
    }
}

/// One completed checking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Identifier, also the session's timestamp.
    pub session_id: String,
    /// Pairwise results in the order received.
    pub records: Vec<SimilarityRecord>,
}

impl Session {
    /// Create a session from already-validated records.
    pub fn new(session_id: impl Into<String>, records: Vec<SimilarityRecord>) -> Self {
        Self {
            session_id: session_id.into(),
            records,
        }
    }

    /// Validate a wire payload into a session.
    pub fn from_payload(payload: SessionPayload) -> ReviewResult<Self> {
        let records = payload
            .results
            .into_iter()
            .enumerate()
            .map(|(position, record)| SimilarityRecord::from_payload(record, position))
            .collect::<ReviewResult<Vec<_>>>()?;

        let mut seen = HashSet::new();
        if let Some(duplicate) = records.iter().find(|r| !seen.insert(r.id.as_str())) {
            return Err(ReviewError::Validation {
                field: "id".to_string(),
                reason: format!(
                    "record id {} appears more than once in session {}",
                    duplicate.id, payload.session_id
                ),
            });
        }

        Ok(Self::new(payload.session_id, records))
    }

    /// Distinct document names in first-appearance order.
    pub fn document_names(&self) -> Vec<String> {
        document_names(&self.records)
    }

    /// The session id interpreted as a point in time, if it parses.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_session_timestamp(&self.session_id)
    }
}

/// Distinct document names across `records`, in first-appearance order.
pub fn document_names(records: &[SimilarityRecord]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for record in records {
        for name in [&record.doc1_name, &record.doc2_name] {
            if !names.iter().any(|n| n == name) {
                names.push(name.clone());
            }
        }
    }
    names
}

/// Parse a session id as RFC 3339, falling back to a naive UTC timestamp.
pub fn parse_session_timestamp(session_id: &str) -> Option<DateTime<Utc>> {
    let raw = session_id.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}
