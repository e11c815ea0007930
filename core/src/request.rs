//! Request specification types

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::RunConfig;

/// Position of a request within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub usize);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for RequestId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Immutable description of one completion request
///
/// Built once per request index before dispatch and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// Position in the run; outcome `i` belongs to spec `i`
    pub id: RequestId,

    /// Server base URL
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Prompt text
    pub prompt: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Whether to request incremental delivery
    pub stream: bool,

    /// Time budget for the whole exchange
    pub timeout: Duration,
}

impl RequestSpec {
    /// Materialise the spec for request `index` from the run configuration
    pub fn from_config(index: usize, config: &RunConfig, prompt: impl Into<String>) -> Self {
        Self {
            id: RequestId(index),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            prompt: prompt.into(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            stream: config.stream,
            timeout: config.request_timeout,
        }
    }

    /// Index of this spec within its run
    pub fn index(&self) -> usize {
        self.id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_from_config() {
        let config = RunConfig::new("http://h:1", "m")
            .with_max_tokens(32)
            .with_stream(false)
            .with_request_timeout(Duration::from_secs(5));
        let spec = RequestSpec::from_config(3, &config, "hello");

        assert_eq!(spec.index(), 3);
        assert_eq!(spec.base_url, "http://h:1");
        assert_eq!(spec.model, "m");
        assert_eq!(spec.prompt, "hello");
        assert_eq!(spec.max_tokens, 32);
        assert!(!spec.stream);
        assert_eq!(spec.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_request_id_from_usize() {
        let id: RequestId = 42usize.into();
        assert_eq!(id.0, 42);
        assert_eq!(id.to_string(), "42");
    }
}
