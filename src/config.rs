//! Configuration types for nano-runner.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Runner configuration.
///
/// Read once when the [`ModelRunner`](crate::runner::ModelRunner) is
/// constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Sliding-window size for attention context (None = unlimited).
    ///
    /// Decode-phase context lengths are clipped to this value.
    pub sliding_window: Option<usize>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            sliding_window: None,
        }
    }
}

impl RunnerConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

/// Sampling strategy for a request.
///
/// Closed set of strategies the sampler distinguishes; the index resolver
/// partitions selected positions into one ordered bucket per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplingType {
    /// Deterministic argmax decoding.
    Greedy,
    /// Stochastic sampling from the output distribution.
    Random,
    /// Stochastic sampling with a request-pinned random generator.
    RandomSeed,
    /// Beam-search style decoding.
    Beam,
}

impl SamplingType {
    /// Number of strategy variants.
    pub const COUNT: usize = 4;

    /// All variants, in bucket-table order.
    pub const ALL: [SamplingType; Self::COUNT] = [
        SamplingType::Greedy,
        SamplingType::Random,
        SamplingType::RandomSeed,
        SamplingType::Beam,
    ];

    /// Bucket-table slot for this strategy.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Per-request sampling configuration.
///
/// The runner itself never samples; it only reads the derived
/// [`sampling_type`](Self::sampling_type), the seed, and the prompt-logprobs
/// request when resolving sampling indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Temperature for sampling (0.0 = greedy).
    pub temperature: f32,
    /// Top-k sampling (0 = disabled).
    pub top_k: usize,
    /// Top-p (nucleus) sampling (1.0 = disabled).
    pub top_p: f32,
    /// Fixed random seed for reproducible sampling.
    pub seed: Option<u64>,
    /// Number of top log-probabilities to report per prompt position.
    pub prompt_logprobs: Option<usize>,
    /// Use beam-search decoding.
    pub use_beam_search: bool,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_k: 0,
            top_p: 1.0,
            seed: None,
            prompt_logprobs: None,
            use_beam_search: false,
        }
    }
}

impl SamplingParams {
    /// Create sampling params with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the fixed random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Request log-probabilities over the full prompt.
    pub fn prompt_logprobs(mut self, num_logprobs: usize) -> Self {
        self.prompt_logprobs = Some(num_logprobs);
        self
    }

    /// Enable beam-search decoding.
    pub fn beam_search(mut self) -> Self {
        self.use_beam_search = true;
        self
    }

    /// Sampling strategy derived from the parameters.
    pub fn sampling_type(&self) -> SamplingType {
        if self.use_beam_search {
            SamplingType::Beam
        } else if self.temperature == 0.0 {
            SamplingType::Greedy
        } else if self.seed.is_some() {
            SamplingType::RandomSeed
        } else {
            SamplingType::Random
        }
    }
}
