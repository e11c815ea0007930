//! OpenAI-compatible chat-completions executor

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::StreamExt;
use vllm_bench_core::{CompletionMetrics, RequestExecutor, RequestOutcome, RequestSpec};

use crate::client::HttpClientPool;
use crate::error::VendorError;
use crate::streaming::{SSEParser, StreamAccumulator};
use crate::wire::{ChatCompletionResponse, ChatMessage, ChatRequest, StreamOptions};

/// Executes one chat completion per spec against `<base>/v1/chat/completions`
///
/// The whole exchange, from send until the last byte, is bounded by the spec's
/// timeout. Every failure is returned as a failed outcome.
#[derive(Debug, Clone)]
pub struct OpenAIExecutor {
    pool: HttpClientPool,
    api_key: Option<String>,
}

impl OpenAIExecutor {
    /// Create an executor sharing `pool`, optionally authenticating with a bearer key
    pub fn new(pool: HttpClientPool, api_key: Option<String>) -> Self {
        Self {
            pool,
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// Chat-completions URL for a base URL, with or without a trailing `/v1`
    pub fn endpoint(base_url: &str) -> String {
        let base = base_url.trim().trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{base}/chat/completions")
        } else {
            format!("{base}/v1/chat/completions")
        }
    }

    fn request_body(spec: &RequestSpec) -> ChatRequest<'_> {
        ChatRequest {
            model: &spec.model,
            messages: [ChatMessage {
                role: "user",
                content: &spec.prompt,
            }],
            max_tokens: spec.max_tokens,
            temperature: spec.temperature,
            stream: spec.stream,
            stream_options: spec.stream.then_some(StreamOptions {
                include_usage: true,
            }),
        }
    }

    /// Send the request and read the full response
    async fn exchange(
        &self,
        spec: &RequestSpec,
        start: Instant,
    ) -> Result<CompletionMetrics, VendorError> {
        let mut request = self
            .pool
            .client()
            .post(Self::endpoint(&spec.base_url))
            .json(&Self::request_body(spec));

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(VendorError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VendorError::http(status.as_u16(), &body));
        }

        if spec.stream {
            Self::read_stream(response, start).await
        } else {
            Self::read_body(response, start).await
        }
    }

    /// Consume a streamed response until `[DONE]` or end of body
    async fn read_stream(
        response: reqwest::Response,
        start: Instant,
    ) -> Result<CompletionMetrics, VendorError> {
        let mut stream = response.bytes_stream();
        let mut parser = SSEParser::new();
        let mut acc = StreamAccumulator::new();

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(VendorError::from_body)?;
            for event in parser.feed(&bytes)? {
                acc.observe(event, start.elapsed())?;
            }
            if acc.is_done() {
                break;
            }
        }

        if !acc.is_done() {
            if let Some(event) = parser.finish() {
                acc.observe(event, start.elapsed())?;
            }
        }

        acc.into_metrics(start.elapsed())
    }

    /// Read and decode a complete JSON body
    async fn read_body(
        response: reqwest::Response,
        start: Instant,
    ) -> Result<CompletionMetrics, VendorError> {
        let bytes = response.bytes().await.map_err(VendorError::from_body)?;
        let wall_time = start.elapsed();

        decode_completion(&bytes, wall_time)
    }
}

/// Metrics of a non-streamed completion body received after `wall_time`
fn decode_completion(bytes: &[u8], wall_time: Duration) -> Result<CompletionMetrics, VendorError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(VendorError::Malformed("empty response body".to_string()));
    }

    let body: ChatCompletionResponse = serde_json::from_slice(bytes)
        .map_err(|e| VendorError::Malformed(format!("invalid completion body: {e}")))?;

    if body.choices.is_empty() {
        return Err(VendorError::Malformed(
            "completion body has no choices".to_string(),
        ));
    }

    // Servers that omit usage are recorded as zero generated tokens
    let usage = body.usage.unwrap_or_default();

    Ok(CompletionMetrics::new(
        usage.completion_tokens.unwrap_or(0),
        usage.prompt_tokens,
        wall_time,
        None,
    ))
}

#[async_trait]
impl RequestExecutor for OpenAIExecutor {
    fn name(&self) -> &str {
        "openai"
    }

    async fn execute(&self, spec: &RequestSpec) -> RequestOutcome {
        let start = Instant::now();

        match tokio::time::timeout(spec.timeout, self.exchange(spec, start)).await {
            Ok(Ok(metrics)) => RequestOutcome::Success(metrics),
            Ok(Err(e)) => e.into_outcome(start.elapsed()),
            Err(_) => VendorError::Timeout(spec.timeout).into_outcome(start.elapsed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vllm_bench_core::RunConfig;

    #[test]
    fn test_endpoint() {
        assert_eq!(
            OpenAIExecutor::endpoint("http://localhost:8000"),
            "http://localhost:8000/v1/chat/completions"
        );
        assert_eq!(
            OpenAIExecutor::endpoint("http://localhost:8000/"),
            "http://localhost:8000/v1/chat/completions"
        );
        assert_eq!(
            OpenAIExecutor::endpoint("https://api.example.com/v1"),
            "https://api.example.com/v1/chat/completions"
        );
        assert_eq!(
            OpenAIExecutor::endpoint("https://api.example.com/v1/"),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_streaming_request_body() {
        let config = RunConfig::new("http://localhost:8000", "llama")
            .with_max_tokens(16)
            .with_temperature(Some(0.5));
        let spec = RequestSpec::from_config(0, &config, "Hi there");

        let json = serde_json::to_value(OpenAIExecutor::request_body(&spec)).unwrap();

        assert_eq!(json["model"], "llama");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Hi there");
        assert_eq!(json["max_tokens"], 16);
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["stream"], true);
        assert_eq!(json["stream_options"]["include_usage"], true);
    }

    #[test]
    fn test_non_streaming_request_body() {
        let config = RunConfig::new("http://localhost:8000", "llama")
            .with_stream(false)
            .with_temperature(None);
        let spec = RequestSpec::from_config(0, &config, "Hi");

        let json = serde_json::to_value(OpenAIExecutor::request_body(&spec)).unwrap();

        assert_eq!(json["stream"], false);
        assert!(json.get("stream_options").is_none());
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_api_key_blank_is_ignored() {
        let pool = HttpClientPool::new(&Default::default()).unwrap();
        let executor = OpenAIExecutor::new(pool, Some(String::new()));
        assert!(executor.api_key.is_none());
    }

    #[test]
    fn test_decode_completion() {
        let body = br#"{
            "id": "cmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 9, "completion_tokens": 10, "total_tokens": 19}
        }"#;

        let metrics = decode_completion(body, Duration::from_millis(500)).unwrap();

        assert_eq!(metrics.total_tokens, 10);
        assert_eq!(metrics.prompt_tokens, Some(9));
        assert_eq!(metrics.time_to_first_token, None);
        assert!((metrics.tokens_per_second - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_decode_completion_without_usage() {
        let body = br#"{"choices": [{"text": "hi", "finish_reason": "stop"}]}"#;

        let metrics = decode_completion(body, Duration::from_millis(250)).unwrap();

        assert_eq!(metrics.total_tokens, 0);
        assert_eq!(metrics.prompt_tokens, None);
        assert_eq!(metrics.tokens_per_second, 0.0);
    }

    #[test]
    fn test_decode_completion_failures() {
        let wall = Duration::from_millis(10);

        for body in [
            &b""[..],
            b"   ",
            b"<html>502</html>",
            br#"{"choices": []}"#,
        ] {
            let err = decode_completion(body, wall).unwrap_err();
            assert!(matches!(err, VendorError::Malformed(_)), "body {body:?}");
        }
    }
}
