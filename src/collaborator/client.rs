use async_trait::async_trait;
use reqwest::{multipart, Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::types::{
    DocumentContent, DocumentInput, DocumentResponse, ExtractTextResponse, HistoryResponse,
    PlagiarismRequest, PlagiarismResponse,
};
use super::Collaborator;
use crate::config::{CollaboratorConfig, RequestConfig, SubmissionConfig};
use crate::error::{AppError, AppResult, CollaboratorError, CollaboratorResult};
use crate::records::{DocumentSide, Session, SimilarityRecord};

/// Client for the remote similarity service
#[derive(Clone)]
pub struct CollaboratorClient {
    client: Client,
    base: Url,
    request_config: RequestConfig,
}

impl CollaboratorClient {
    /// Create a new client
    pub fn new(config: &CollaboratorConfig, request_config: RequestConfig) -> AppResult<Self> {
        let trimmed = config.base_url.trim().trim_end_matches('/');
        let base = Url::parse(trimmed).map_err(|e| AppError::Config {
            message: format!("Invalid collaborator base URL '{}': {}", trimmed, e),
        })?;
        if base.cannot_be_a_base() {
            return Err(AppError::Config {
                message: format!("Collaborator base URL '{}' cannot carry paths", trimmed),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(CollaboratorError::Http)?;

        Ok(Self {
            client,
            base,
            request_config,
        })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Build an endpoint URL; each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET a JSON body, retrying transient failures
    async fn get_json<T: DeserializeOwned>(&self, url: Url, operation: &str) -> CollaboratorResult<T> {
        let mut retries = 0;

        loop {
            if retries > 0 {
                let delay = backoff_delay(self.request_config.retry_delay_ms, retries);
                warn!(
                    operation,
                    retry = retries,
                    delay_ms = delay.as_millis(),
                    "Retrying collaborator request"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();

            match self.execute_get(&url).await {
                Ok(body) => {
                    info!(
                        operation,
                        latency_ms = start.elapsed().as_millis(),
                        "Collaborator request succeeded"
                    );
                    return Ok(body);
                }
                Err(e) => {
                    error!(
                        operation,
                        error = %e,
                        latency_ms = start.elapsed().as_millis(),
                        retry = retries,
                        "Collaborator request failed"
                    );
                    if !e.is_retryable() || retries >= self.request_config.max_retries {
                        return Err(into_unavailable(e, retries));
                    }
                    retries += 1;
                }
            }
        }
    }

    /// Execute a single GET (internal)
    async fn execute_get<T: DeserializeOwned>(&self, url: &Url) -> CollaboratorResult<T> {
        debug!(url = %url, "Calling collaborator");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        decode_json(check_status(response, url).await?).await
    }

    fn map_send_error(&self, e: reqwest::Error) -> CollaboratorError {
        if e.is_timeout() {
            CollaboratorError::Timeout {
                timeout_ms: self.request_config.timeout_ms,
            }
        } else {
            CollaboratorError::Http(e)
        }
    }

    /// Upload a PDF and return the text the service extracted from it
    pub async fn extract_text(&self, file_name: &str, bytes: Vec<u8>) -> CollaboratorResult<String> {
        let url = self.endpoint(&["extract-text"]);
        info!(file = %file_name, size = bytes.len(), "Extracting text");

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(CollaboratorError::Http)?;
        let form = multipart::Form::new().part("pdf", part);

        let response = self
            .client
            .post(url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| into_unavailable(self.map_send_error(e), 0))?;

        let body: ExtractTextResponse = decode_json(check_status(response, &url).await?).await?;
        if let Some(message) = body.error {
            return Err(CollaboratorError::RemoteRejected {
                status: 200,
                message,
            });
        }
        body.text.ok_or_else(|| CollaboratorError::MalformedResponse {
            message: "extract-text response has neither `text` nor `error`".to_string(),
        })
    }

    /// Submit documents for pairwise comparison
    pub async fn check_plagiarism(
        &self,
        documents: Vec<DocumentInput>,
        submission: &SubmissionConfig,
    ) -> CollaboratorResult<Vec<SimilarityRecord>> {
        let url = self.endpoint(&["plagiarism"]);
        let names: Vec<String> = documents.iter().map(|d| d.name.clone()).collect();
        let request = PlagiarismRequest::new(documents, submission.k, submission.window_size);

        info!(
            documents = names.len(),
            k = submission.k,
            window_size = submission.window_size,
            "Submitting documents for comparison"
        );
        let start = Instant::now();

        let response = self
            .client
            .post(url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| into_unavailable(self.map_send_error(e), 0))?;

        let body: PlagiarismResponse = decode_json(check_status(response, &url).await?).await?;

        let records = body
            .similarities
            .into_iter()
            .enumerate()
            .map(|(position, raw)| {
                let payload =
                    raw.resolve(&names)
                        .ok_or_else(|| CollaboratorError::MalformedResponse {
                            message: format!("result {} does not identify its documents", position),
                        })?;
                let id = payload
                    .id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| position.to_string());
                SimilarityRecord::new(id, payload.doc1_name, payload.doc2_name, payload.similarity)
                    .map_err(|e| CollaboratorError::MalformedResponse {
                        message: e.to_string(),
                    })
            })
            .collect::<CollaboratorResult<Vec<_>>>()?;

        info!(
            results = records.len(),
            latency_ms = start.elapsed().as_millis(),
            "Comparison completed"
        );
        Ok(records)
    }
}

#[async_trait]
impl Collaborator for CollaboratorClient {
    async fn fetch_history(&self) -> CollaboratorResult<Vec<Session>> {
        let url = self.endpoint(&["history"]);
        let body: HistoryResponse = self.get_json(url, "fetch_history").await?;

        body.history
            .into_iter()
            .map(|payload| {
                Session::from_payload(payload).map_err(|e| CollaboratorError::MalformedResponse {
                    message: e.to_string(),
                })
            })
            .collect()
    }

    async fn fetch_document(
        &self,
        record_id: &str,
        side: DocumentSide,
    ) -> CollaboratorResult<DocumentContent> {
        let url = self.endpoint(&["history-doc", record_id, side.as_str()]);
        let body: DocumentResponse = self.get_json(url, "fetch_document").await?;
        Ok(body.dokumen)
    }

    async fn delete_session(&self, session_id: &str) -> CollaboratorResult<()> {
        let url = self.endpoint(&["delete-session", session_id]);
        info!(session_id = %session_id, "Deleting session");

        let response = self
            .client
            .delete(url.clone())
            .send()
            .await
            .map_err(|e| into_unavailable(self.map_send_error(e), 0))?;

        check_status(response, &url).await?;
        info!(session_id = %session_id, "Session deleted");
        Ok(())
    }
}

/// Upper bound on the wait between two attempts
const MAX_BACKOFF_MS: u64 = 30_000;

/// Exponential backoff before retry number `retry` (1-based), capped
fn backoff_delay(base_ms: u64, retry: u32) -> Duration {
    let factor = 2_u64
        .checked_pow(retry.saturating_sub(1))
        .unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor).min(MAX_BACKOFF_MS))
}

/// Turn a non-2xx response into the matching error
async fn check_status(response: Response, url: &Url) -> CollaboratorResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(CollaboratorError::NotFound {
            resource: url.path().to_string(),
        });
    }
    Err(CollaboratorError::RemoteRejected {
        status: status.as_u16(),
        message: error_body,
    })
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> CollaboratorResult<T> {
    let bytes = response.bytes().await.map_err(CollaboratorError::Http)?;
    serde_json::from_slice(&bytes).map_err(|e| CollaboratorError::MalformedResponse {
        message: format!("Failed to parse response: {}", e),
    })
}

/// Transport failures surface as `NetworkUnavailable`; everything else is kept
fn into_unavailable(err: CollaboratorError, retries: u32) -> CollaboratorError {
    match err {
        CollaboratorError::Http(e) => CollaboratorError::NetworkUnavailable {
            message: e.to_string(),
            retries,
        },
        other => other,
    }
}
