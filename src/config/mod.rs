use std::env;

use crate::error::AppError;

/// Default address of the remote similarity service
pub const DEFAULT_BASE_URL: &str = "https://winnowing.up.railway.app";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub collaborator: CollaboratorConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    pub submission: SubmissionConfig,
}

/// Remote similarity service configuration
#[derive(Debug, Clone)]
pub struct CollaboratorConfig {
    pub base_url: String,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
///
/// Retries only ever apply to idempotent reads.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

/// Parameters forwarded to the comparator on submission
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionConfig {
    pub k: u32,
    pub window_size: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url =
            env::var("COLLABORATOR_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        if base_url.trim().is_empty() {
            return Err(AppError::Config {
                message: "COLLABORATOR_BASE_URL cannot be empty".to_string(),
            });
        }
        let collaborator = CollaboratorConfig { base_url };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let defaults = RequestConfig::default();
        let request = RequestConfig {
            timeout_ms: parse_var("REQUEST_TIMEOUT_MS").unwrap_or(defaults.timeout_ms),
            max_retries: parse_var("MAX_RETRIES").unwrap_or(defaults.max_retries),
            retry_delay_ms: parse_var("RETRY_DELAY_MS").unwrap_or(defaults.retry_delay_ms),
        };

        let defaults = SubmissionConfig::default();
        let submission = SubmissionConfig {
            k: parse_var("SUBMISSION_K").unwrap_or(defaults.k),
            window_size: parse_var("SUBMISSION_WINDOW_SIZE").unwrap_or(defaults.window_size),
        };

        Ok(Config {
            collaborator,
            logging,
            request,
            submission,
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            max_retries: 2,
            retry_delay_ms: 500,
        }
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self { k: 5, window_size: 4 }
    }
}
