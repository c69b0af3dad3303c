//! Config environment variable tests
//!
//! These tests verify that Config::from_env() correctly reads and applies
//! environment variable overrides. Config::from_env() also loads a .env
//! file via dotenvy when one exists, so tests only assert on variables they
//! set themselves.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use plagiarism_review::config::{Config, LogFormat, DEFAULT_BASE_URL};
use plagiarism_review::AppError;
use serial_test::serial;
use std::env;

#[test]
#[serial]
fn test_config_defaults() {
    env::remove_var("COLLABORATOR_BASE_URL");
    env::remove_var("SUBMISSION_K");
    env::remove_var("SUBMISSION_WINDOW_SIZE");

    let config = Config::from_env().unwrap();
    assert_eq!(config.collaborator.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.submission.k, 5);
    assert_eq!(config.submission.window_size, 4);
}

#[test]
#[serial]
fn test_config_from_env_custom_base_url() {
    env::set_var("COLLABORATOR_BASE_URL", "http://localhost:5000");

    let config = Config::from_env().unwrap();
    assert_eq!(config.collaborator.base_url, "http://localhost:5000");

    env::remove_var("COLLABORATOR_BASE_URL");
}

#[test]
#[serial]
fn test_config_empty_base_url_is_error() {
    env::set_var("COLLABORATOR_BASE_URL", "   ");

    let result = Config::from_env();
    assert!(matches!(result, Err(AppError::Config { .. })));

    env::remove_var("COLLABORATOR_BASE_URL");
}

#[test]
#[serial]
fn test_config_from_env_json_log_format() {
    env::set_var("LOG_FORMAT", "JSON");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);

    env::set_var("LOG_FORMAT", "pretty");
    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Pretty);

    env::remove_var("LOG_FORMAT");
}

#[test]
#[serial]
fn test_config_from_env_custom_request() {
    env::set_var("REQUEST_TIMEOUT_MS", "60000");
    env::set_var("MAX_RETRIES", "5");
    env::set_var("RETRY_DELAY_MS", "2000");

    let config = Config::from_env().unwrap();
    assert_eq!(config.request.timeout_ms, 60000);
    assert_eq!(config.request.max_retries, 5);
    assert_eq!(config.request.retry_delay_ms, 2000);

    env::remove_var("REQUEST_TIMEOUT_MS");
    env::remove_var("MAX_RETRIES");
    env::remove_var("RETRY_DELAY_MS");
}

#[test]
#[serial]
fn test_config_from_env_custom_submission() {
    env::set_var("SUBMISSION_K", "7");
    env::set_var("SUBMISSION_WINDOW_SIZE", "6");

    let config = Config::from_env().unwrap();
    assert_eq!(config.submission.k, 7);
    assert_eq!(config.submission.window_size, 6);

    env::remove_var("SUBMISSION_K");
    env::remove_var("SUBMISSION_WINDOW_SIZE");
}

#[test]
#[serial]
fn test_config_invalid_number_uses_default() {
    env::set_var("MAX_RETRIES", "not-a-number");
    env::set_var("SUBMISSION_K", "-3");

    let config = Config::from_env().unwrap();
    assert_eq!(config.request.max_retries, 2);
    assert_eq!(config.submission.k, 5);

    env::remove_var("MAX_RETRIES");
    env::remove_var("SUBMISSION_K");
}
