//! Sampler over the built-in prompt pools

use rand::seq::SliceRandom;
use vllm_bench_core::{PromptSize, Sampler, SamplerError};

use crate::prompts;

/// Picks a random prompt from the pool matching the requested size class
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinPromptSampler;

impl BuiltinPromptSampler {
    /// Create a new built-in sampler
    pub fn new() -> Self {
        Self
    }

    /// The pool used for a size class
    pub fn pool(size: PromptSize) -> &'static [&'static str] {
        match size {
            PromptSize::Small => prompts::SMALL,
            PromptSize::Medium => prompts::MEDIUM,
            PromptSize::Large => prompts::LARGE,
        }
    }
}

impl Sampler for BuiltinPromptSampler {
    fn name(&self) -> &str {
        "builtin"
    }

    fn sample(&self, size: PromptSize) -> Result<String, SamplerError> {
        let mut rng = rand::thread_rng();
        Self::pool(size)
            .choose(&mut rng)
            .map(|p| p.to_string())
            .ok_or(SamplerError::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pool_is_populated() {
        for size in [PromptSize::Small, PromptSize::Medium, PromptSize::Large] {
            let pool = BuiltinPromptSampler::pool(size);
            assert!(!pool.is_empty());
            assert!(pool.iter().all(|p| !p.trim().is_empty()));
        }
    }

    #[test]
    fn test_sample_comes_from_matching_pool() {
        let sampler = BuiltinPromptSampler::new();

        for size in [PromptSize::Small, PromptSize::Medium, PromptSize::Large] {
            for _ in 0..20 {
                let prompt = sampler.sample(size).unwrap();
                assert!(BuiltinPromptSampler::pool(size).contains(&prompt.as_str()));
            }
        }
    }

    #[test]
    fn test_large_prompts_are_longer_on_average() {
        let mean = |pool: &[&str]| {
            pool.iter().map(|p| p.len()).sum::<usize>() as f64 / pool.len() as f64
        };

        assert!(mean(prompts::SMALL) < mean(prompts::MEDIUM));
        assert!(mean(prompts::MEDIUM) < mean(prompts::LARGE));
    }
}
