//! Per-request failure causes

use std::error::Error as _;
use std::time::Duration;

use thiserror::Error;
use vllm_bench_core::{ErrorKind, RequestOutcome};

/// Longest body excerpt kept in an HTTP error message, in characters
const BODY_EXCERPT_CHARS: usize = 200;

/// Why a single completion call failed
///
/// Never escapes the executor: [`VendorError::into_outcome`] turns it into a
/// failed [`RequestOutcome`].
#[derive(Debug, Error)]
pub enum VendorError {
    /// Connection could not be established or broke while reading
    #[error("connection error: {0}")]
    Connection(String),

    /// The per-request time budget elapsed
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// Non-success status code
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code
        status: u16,
        /// Body excerpt
        body: String,
    },

    /// An error object arrived inside an otherwise successful stream
    #[error("server error in stream: {0}")]
    Server(String),

    /// Stream ended without an end marker or finish reason
    #[error("stream ended before completion")]
    StreamInterrupted,

    /// Body or stream could not be parsed
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl VendorError {
    /// Build an HTTP error, keeping only an excerpt of the body
    pub fn http(status: u16, body: &str) -> Self {
        let body = body.trim();
        let excerpt = if body.chars().count() > BODY_EXCERPT_CHARS {
            let cut: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
            format!("{cut}...")
        } else {
            body.to_string()
        };
        VendorError::Http {
            status,
            body: excerpt,
        }
    }

    /// Classify an error from sending the request
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_decode() {
            VendorError::Malformed(error_chain(&err))
        } else {
            VendorError::Connection(error_chain(&err))
        }
    }

    /// Classify an error while reading the response body
    ///
    /// The headers already arrived, so anything failing here is the connection.
    pub fn from_body(err: reqwest::Error) -> Self {
        VendorError::Connection(error_chain(&err))
    }

    /// Failure classification
    pub fn kind(&self) -> ErrorKind {
        match self {
            VendorError::Connection(_) | VendorError::StreamInterrupted => {
                ErrorKind::ConnectionError
            }
            VendorError::Timeout(_) => ErrorKind::Timeout,
            VendorError::Http { .. } | VendorError::Server(_) => ErrorKind::HttpError,
            VendorError::Malformed(_) => ErrorKind::MalformedResponse,
        }
    }

    /// Convert into a failed outcome observed after `elapsed`
    pub fn into_outcome(self, elapsed: Duration) -> RequestOutcome {
        RequestOutcome::failure(self.kind(), self.to_string(), elapsed)
    }
}

/// Render an error followed by its source chain
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            VendorError::Connection("refused".into()).kind(),
            ErrorKind::ConnectionError
        );
        assert_eq!(
            VendorError::StreamInterrupted.kind(),
            ErrorKind::ConnectionError
        );
        assert_eq!(
            VendorError::Timeout(Duration::from_secs(1)).kind(),
            ErrorKind::Timeout
        );
        assert_eq!(VendorError::http(503, "busy").kind(), ErrorKind::HttpError);
        assert_eq!(
            VendorError::Server("overloaded".into()).kind(),
            ErrorKind::HttpError
        );
        assert_eq!(
            VendorError::Malformed("bad json".into()).kind(),
            ErrorKind::MalformedResponse
        );
    }

    #[test]
    fn test_http_body_excerpt() {
        let long = "x".repeat(500);
        let err = VendorError::http(500, &long);
        match &err {
            VendorError::Http { status, body } => {
                assert_eq!(*status, 500);
                assert_eq!(body.len(), BODY_EXCERPT_CHARS + 3);
                assert!(body.ends_with("..."));
            }
            _ => panic!("Expected Http variant"),
        }
        assert!(err.to_string().starts_with("HTTP 500: "));
    }

    #[test]
    fn test_http_short_body_kept() {
        let err = VendorError::http(404, "  model not found \n");
        assert_eq!(err.to_string(), "HTTP 404: model not found");
    }

    #[test]
    fn test_into_outcome() {
        let outcome = VendorError::Timeout(Duration::from_millis(250))
            .into_outcome(Duration::from_millis(251));
        let failure = outcome.failure_info().expect("Expected failure");
        assert_eq!(failure.kind, ErrorKind::Timeout);
        assert_eq!(failure.elapsed, Duration::from_millis(251));
        assert!(failure.message.contains("250ms"));
    }
}
