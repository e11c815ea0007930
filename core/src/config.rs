//! Run configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Size class of the prompts sent during a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptSize {
    /// Short factual questions
    #[default]
    Small,
    /// Paragraph-length explanations
    Medium,
    /// Long-form essays and tutorials
    Large,
}

impl PromptSize {
    /// Stable lowercase identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptSize::Small => "small",
            PromptSize::Medium => "medium",
            PromptSize::Large => "large",
        }
    }
}

impl std::fmt::Display for PromptSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PromptSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "small" => Ok(PromptSize::Small),
            "medium" => Ok(PromptSize::Medium),
            "large" => Ok(PromptSize::Large),
            other => Err(ConfigError::InvalidPromptSize(other.to_string())),
        }
    }
}

/// Run configuration
///
/// Passed to the orchestrator once at run start. Everything a run needs to
/// know about the target and the load shape lives here; there is no global
/// settings object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Server base URL (e.g. `http://localhost:8000`)
    pub base_url: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Total number of requests (N)
    pub num_requests: usize,

    /// Maximum simultaneously active requests (P)
    pub parallelism: usize,

    /// Maximum tokens to generate per request
    pub max_tokens: u32,

    /// Prompt size class requested from the sampler
    pub prompt_size: PromptSize,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Whether responses are streamed
    pub stream: bool,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            model: "default".to_string(),
            num_requests: 8,
            parallelism: 4,
            max_tokens: 64,
            prompt_size: PromptSize::Small,
            temperature: Some(0.7),
            stream: true,
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl RunConfig {
    /// Create a config targeting the given server and model
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set the total request count
    pub fn with_num_requests(mut self, n: usize) -> Self {
        self.num_requests = n;
        self
    }

    /// Set the parallelism
    pub fn with_parallelism(mut self, p: usize) -> Self {
        self.parallelism = p;
        self
    }

    /// Set the max tokens per request
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the prompt size class
    pub fn with_prompt_size(mut self, size: PromptSize) -> Self {
        self.prompt_size = size;
        self
    }

    /// Set or clear the sampling temperature
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Enable or disable streaming
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Parallelism actually used: never more than the request count
    pub fn effective_parallelism(&self) -> usize {
        self.parallelism.min(self.num_requests).max(1)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallelism == 0 {
            return Err(ConfigError::InvalidParallelism(self.parallelism));
        }

        if self.num_requests == 0 {
            return Err(ConfigError::InvalidRequestCount(self.num_requests));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens(self.max_tokens));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(self.request_timeout));
        }

        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }

        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::InvalidTemperature(t));
            }
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Parallelism below 1
    #[error("invalid parallelism {0}: must be at least 1")]
    InvalidParallelism(usize),

    /// Request count below 1
    #[error("invalid request count {0}: must be at least 1")]
    InvalidRequestCount(usize),

    /// Max tokens below 1
    #[error("invalid max tokens {0}: must be at least 1")]
    InvalidMaxTokens(u32),

    /// Zero timeout
    #[error("invalid request timeout {0:?}: must be non-zero")]
    InvalidTimeout(Duration),

    /// Base URL is not an http(s) URL
    #[error("invalid base URL {0:?}: expected http:// or https://")]
    InvalidBaseUrl(String),

    /// Model identifier is blank
    #[error("model identifier must not be empty")]
    EmptyModel,

    /// Temperature outside the accepted range
    #[error("invalid temperature {0}: expected 0.0..=2.0")]
    InvalidTemperature(f32),

    /// Unknown prompt size class
    #[error("unknown prompt size {0:?}: expected small, medium or large")]
    InvalidPromptSize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.num_requests, 8);
        assert_eq!(config.parallelism, 4);
        assert_eq!(config.max_tokens, 64);
        assert!(config.stream);
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder_pattern() {
        let config = RunConfig::new("http://remote:8000", "my-model")
            .with_num_requests(20)
            .with_parallelism(8)
            .with_max_tokens(512)
            .with_prompt_size(PromptSize::Large)
            .with_temperature(None)
            .with_stream(false)
            .with_request_timeout(Duration::from_secs(30));

        assert_eq!(config.model, "my-model");
        assert_eq!(config.num_requests, 20);
        assert_eq!(config.parallelism, 8);
        assert_eq!(config.prompt_size, PromptSize::Large);
        assert!(config.temperature.is_none());
        assert!(!config.stream);
    }

    #[test]
    fn test_config_validation_zero_parallelism() {
        let config = RunConfig::default().with_parallelism(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidParallelism(0)));
    }

    #[test]
    fn test_config_validation_zero_requests() {
        let config = RunConfig::default().with_num_requests(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidRequestCount(0)));
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let config = RunConfig::default().with_request_timeout(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeout(_))
        ));
    }

    #[test]
    fn test_config_validation_bad_url() {
        let config = RunConfig::new("localhost:8000", "m");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_config_validation_temperature_range() {
        let config = RunConfig::default().with_temperature(Some(3.5));
        assert_eq!(config.validate(), Err(ConfigError::InvalidTemperature(3.5)));
    }

    #[test]
    fn test_effective_parallelism_clamped_to_request_count() {
        let config = RunConfig::default()
            .with_num_requests(3)
            .with_parallelism(16);
        assert_eq!(config.effective_parallelism(), 3);
    }

    #[test]
    fn test_prompt_size_parse() {
        assert_eq!("Medium".parse::<PromptSize>(), Ok(PromptSize::Medium));
        assert!("huge".parse::<PromptSize>().is_err());
        assert_eq!(PromptSize::Large.to_string(), "large");
    }

    #[test]
    fn test_config_serialization() {
        let config = RunConfig::default().with_parallelism(5);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"prompt_size\":\"small\""));

        let deserialized: RunConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, config);
    }
}
