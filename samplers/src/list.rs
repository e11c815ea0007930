//! Samplers over caller-supplied prompts

use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;
use vllm_bench_core::{PromptSize, Sampler, SamplerError};

/// Random choice from a fixed list of prompts, regardless of size class
#[derive(Debug, Clone)]
pub struct PromptListSampler {
    prompts: Vec<String>,
}

impl PromptListSampler {
    /// Load prompts from a file, one per non-blank line
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or holds no prompts.
    pub fn from_file(path: &Path) -> Result<Self, SamplerError> {
        let content = fs::read_to_string(path)?;

        let prompts: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        tracing::debug!(path = %path.display(), count = prompts.len(), "Loaded prompt file");

        Self::from_prompts(prompts).map_err(|_| {
            SamplerError::InvalidConfig(format!("no prompts found in {}", path.display()))
        })
    }

    /// Use the given prompts
    ///
    /// # Errors
    ///
    /// Fails if `prompts` is empty.
    pub fn from_prompts(prompts: Vec<String>) -> Result<Self, SamplerError> {
        if prompts.is_empty() {
            return Err(SamplerError::InvalidConfig(
                "prompt list is empty".to_string(),
            ));
        }
        Ok(Self { prompts })
    }

    /// Get the number of prompts
    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    /// Check if the sampler has no prompts
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

impl Sampler for PromptListSampler {
    fn name(&self) -> &str {
        "file"
    }

    fn sample(&self, _size: PromptSize) -> Result<String, SamplerError> {
        let mut rng = rand::thread_rng();
        self.prompts
            .choose(&mut rng)
            .cloned()
            .ok_or(SamplerError::Exhausted)
    }
}

/// Sends the same prompt with every request
#[derive(Debug, Clone)]
pub struct FixedPromptSampler {
    prompt: String,
}

impl FixedPromptSampler {
    /// Create a sampler with a single prompt
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl Sampler for FixedPromptSampler {
    fn name(&self) -> &str {
        "fixed"
    }

    fn sample(&self, _size: PromptSize) -> Result<String, SamplerError> {
        Ok(self.prompt.clone())
    }
}
