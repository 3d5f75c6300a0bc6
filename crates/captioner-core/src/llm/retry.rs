//! Retry utilities for transient caption service failures.
//!
//! Provides classification of retryable errors and exponential backoff.

use crate::error::PipelineError;
use std::time::Duration;

/// Determine whether a pipeline error is worth retrying.
///
/// Retryable errors: timeouts, rate limits (429), server errors (5xx),
/// connection failures. Non-retryable: auth failures, bad requests, empty
/// captions, local file errors.
pub fn is_retryable(error: &PipelineError) -> bool {
    match error {
        PipelineError::Timeout { .. } | PipelineError::Connection { .. } => true,
        PipelineError::Service {
            status_code: Some(code),
            ..
        } => *code == 429 || (500..=599).contains(code),
        _ => false,
    }
}

/// Calculate exponential backoff duration for a given attempt.
///
/// Uses `base_delay * 2^attempt` with a cap at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(30_000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn service(status_code: Option<u16>, message: &str) -> PipelineError {
        PipelineError::Service {
            message: message.to_string(),
            status_code,
        }
    }

    #[test]
    fn test_timeout_is_retryable() {
        let err = PipelineError::Timeout {
            path: PathBuf::from("cat.jpg"),
            timeout_ms: 60000,
        };
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_rate_limit_and_server_errors_are_retryable() {
        assert!(is_retryable(&service(Some(429), "rate limit exceeded")));
        assert!(is_retryable(&service(Some(500), "internal error")));
        assert!(is_retryable(&service(Some(503), "unavailable")));
    }

    #[test]
    fn test_client_errors_not_retryable() {
        assert!(!is_retryable(&service(Some(401), "unauthorized")));
        assert!(!is_retryable(&service(Some(400), "bad request")));
    }

    #[test]
    fn test_empty_caption_not_retryable() {
        let err = PipelineError::EmptyCaption {
            path: PathBuf::from("cat.jpg"),
        };
        assert!(!is_retryable(&err));
    }

    #[test]
    fn test_read_error_not_retryable() {
        let err = PipelineError::Read {
            path: PathBuf::from("cat.jpg"),
            message: "permission denied".to_string(),
        };
        assert!(!is_retryable(&err));
    }

    #[test]
    fn test_connection_error_retryable() {
        let err = PipelineError::Connection {
            message: "error sending request for url (http://127.0.0.1:9/)".to_string(),
        };
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_malformed_response_not_retryable() {
        // Wording alone never makes an error retryable.
        assert!(!is_retryable(&service(None, "Failed to parse caption response")));
        assert!(!is_retryable(&service(None, "connect timed out")));
    }

    #[test]
    fn test_backoff_exponential() {
        assert_eq!(backoff_duration(0, 1000), Duration::from_millis(1000));
        assert_eq!(backoff_duration(1, 1000), Duration::from_millis(2000));
        assert_eq!(backoff_duration(3, 1000), Duration::from_millis(8000));
    }

    #[test]
    fn test_backoff_capped_at_30s() {
        assert_eq!(backoff_duration(10, 1000), Duration::from_millis(30_000));
    }
}
