use serde::{Deserialize, Serialize};

/// Response body of `GET /history`
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<SessionPayload>,
}

/// One session as delivered by the collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPayload {
    pub session_id: String,
    #[serde(default)]
    pub results: Vec<RecordPayload>,
}

/// One pairwise result as delivered by the collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordIdPayload>,
    pub doc1_name: String,
    pub doc2_name: String,
    pub similarity: f64,
}

/// Record ids arrive as numbers from the service but are treated as opaque
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordIdPayload {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for RecordIdPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordIdPayload::Number(n) => write!(f, "{}", n),
            RecordIdPayload::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Response body of `GET /history-doc/{id}/{side}`
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentResponse {
    pub dokumen: DocumentContent,
}

/// Extracted text of one side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentContent {
    pub name: String,
    pub text: String,
}

/// A document submitted for checking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInput {
    pub name: String,
    pub text: String,
}

impl DocumentInput {
    /// Create a new document input
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Request body of `POST /plagiarism`
#[derive(Debug, Clone, Serialize)]
pub struct PlagiarismRequest {
    pub documents: Vec<DocumentInput>,
    pub k: u32,
    pub window_size: u32,
}

impl PlagiarismRequest {
    /// Create a new request with the comparator parameters
    pub fn new(documents: Vec<DocumentInput>, k: u32, window_size: u32) -> Self {
        Self {
            documents,
            k,
            window_size,
        }
    }
}

/// Response body of `POST /plagiarism`
#[derive(Debug, Clone, Deserialize)]
pub struct PlagiarismResponse {
    pub similarities: Vec<SubmittedRecordPayload>,
}

/// A freshly computed pairwise result.
///
/// The comparator may name the documents directly or refer to them by
/// their index in the submitted list.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedRecordPayload {
    #[serde(default)]
    pub id: Option<RecordIdPayload>,
    #[serde(default)]
    pub doc1_name: Option<String>,
    #[serde(default)]
    pub doc2_name: Option<String>,
    #[serde(default)]
    pub doc1_index: Option<usize>,
    #[serde(default)]
    pub doc2_index: Option<usize>,
    pub similarity: f64,
}

impl SubmittedRecordPayload {
    /// Resolve document names against the submitted list.
    ///
    /// Returns `None` when neither a name nor a valid index is present.
    pub fn resolve(self, submitted: &[String]) -> Option<RecordPayload> {
        let lookup = |name: Option<String>, index: Option<usize>| {
            name.or_else(|| index.and_then(|i| submitted.get(i).cloned()))
        };

        Some(RecordPayload {
            id: self.id,
            doc1_name: lookup(self.doc1_name, self.doc1_index)?,
            doc2_name: lookup(self.doc2_name, self.doc2_index)?,
            similarity: self.similarity,
        })
    }
}

/// Response body of `POST /extract-text`
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractTextResponse {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
