//! System memory figures

use serde::{Deserialize, Serialize};

/// Memory used on the host while a run was in flight, in GB
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemorySummary {
    /// Installed memory
    pub total_gb: f64,
    /// First sample
    pub start_gb: f64,
    /// Highest sample
    pub peak_gb: f64,
    /// Mean of all samples
    pub avg_gb: f64,
    /// Last sample
    pub end_gb: f64,
    /// Number of samples taken
    pub samples: usize,
}

impl MemorySummary {
    /// Summarise used-memory samples; `None` when nothing was sampled
    pub fn from_samples(total_gb: f64, samples: &[f64]) -> Option<Self> {
        let (&start_gb, &end_gb) = (samples.first()?, samples.last()?);
        let peak_gb = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg_gb = samples.iter().sum::<f64>() / samples.len() as f64;

        Some(Self {
            total_gb,
            start_gb,
            peak_gb,
            avg_gb,
            end_gb,
            samples: samples.len(),
        })
    }
}
