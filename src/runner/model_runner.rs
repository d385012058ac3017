//! Batch orchestration and the model-backend seam.
//!
//! The [`ModelRunner`] is the step driver: it takes the scheduler's batch,
//! assembles the phase-appropriate input tensors, resolves sampling indices,
//! and hands both to the opaque [`Model`] backend: first the forward pass,
//! then sampling. The sampler's output is returned unchanged.

use candle_core::{Device, Tensor};

use crate::config::RunnerConfig;
use crate::core::group::ScheduledBatch;
use crate::core::sequence::SequenceId;
use crate::error::Result;
use crate::runner::decode::build_decode_inputs;
use crate::runner::prefill::build_prefill_inputs;
use crate::runner::sampling::{resolve_sampling, SamplingMetadata};

/// Assembled input tensors for one forward pass.
#[derive(Debug)]
pub struct ModelInputs {
    /// Token IDs, u32 `[rows, cols]`.
    ///
    /// Rows are requests for prefill, sequences for decode; cols is the
    /// batch max subquery length for prefill, 1 for decode.
    pub tokens: Tensor,
    /// Position IDs, i64 `[rows, cols]`.
    pub positions: Tensor,
    /// Storage-block index per row, u32 `[rows]`.
    pub block_ids: Tensor,
    /// Attention context length per row, u32 `[rows]`; decode only.
    pub context_lens: Option<Tensor>,
}

/// One sampled token for one sequence.
#[derive(Debug, Clone)]
pub struct SequenceOutput {
    /// Sequence the token belongs to.
    pub seq_id: SequenceId,
    /// Sampled token ID.
    pub output_token: u32,
    /// Log-probability of the sampled token.
    pub logprob: f32,
}

/// Sampler output for one request.
#[derive(Debug, Clone)]
pub struct SequenceGroupOutput {
    /// One sample per sequence of the request.
    pub samples: Vec<SequenceOutput>,
}

/// Output of the sampling stage, one entry per request in batch order.
#[derive(Debug, Clone)]
pub struct SamplerOutput {
    /// Per-request outputs.
    pub outputs: Vec<SequenceGroupOutput>,
}

/// Opaque model-execution backend.
///
/// The forward pass maps input tensors to hidden states; sampling maps
/// hidden states plus [`SamplingMetadata`] to output tokens. How either is
/// computed is the backend's concern.
pub trait Model {
    /// Run the fused forward pass.
    fn forward(&self, inputs: &ModelInputs) -> Result<Tensor>;

    /// Sample next tokens from hidden states.
    fn sample(&self, hidden_states: &Tensor, metadata: &SamplingMetadata) -> Result<SamplerOutput>;
}

/// Step driver between the scheduler and a model backend.
pub struct ModelRunner<M: Model> {
    /// The model backend.
    model: M,
    /// Sliding-window size, read once at construction.
    sliding_window: Option<usize>,
    /// Device input tensors are materialized on.
    device: Device,
}

impl<M: Model> ModelRunner<M> {
    /// Create a runner for `model`, materializing inputs on `device`.
    pub fn new(model: M, config: &RunnerConfig, device: Device) -> Self {
        Self {
            model,
            sliding_window: config.sliding_window,
            device,
        }
    }

    /// Get the model backend.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Assemble input tensors and sampling metadata for a scheduled batch.
    ///
    /// # Panics
    ///
    /// Panics on an empty batch or a scheduler-contract violation (see the
    /// batch builders).
    pub fn prepare_inputs(
        &self,
        batch: &ScheduledBatch,
    ) -> Result<(ModelInputs, SamplingMetadata)> {
        assert!(!batch.is_empty(), "empty scheduled batch");
        log::debug!(
            "preparing {} batch of {} requests",
            if batch.is_prefill() { "prefill" } else { "decode" },
            batch.num_groups()
        );

        let (inputs, prompt_lens, subquery_lens) = match batch {
            ScheduledBatch::Prefill(groups) => {
                let prefill = build_prefill_inputs(groups, &self.device)?;
                let inputs = ModelInputs {
                    tokens: prefill.tokens,
                    positions: prefill.positions,
                    block_ids: prefill.block_ids,
                    context_lens: None,
                };
                (inputs, prefill.prompt_lens, prefill.subquery_lens)
            }
            ScheduledBatch::Decode(groups) => {
                let decode = build_decode_inputs(groups, self.sliding_window, &self.device)?;
                let inputs = ModelInputs {
                    tokens: decode.tokens,
                    positions: decode.positions,
                    block_ids: decode.block_ids,
                    context_lens: Some(decode.context_lens),
                };
                (inputs, Vec::new(), Vec::new())
            }
        };

        let metadata = resolve_sampling(batch, &prompt_lens, &subquery_lens, &self.device)?;
        Ok((inputs, metadata))
    }

    /// Run one scheduling step: forward pass, then sampling.
    ///
    /// Returns the backend's sampler output unchanged.
    pub fn execute_step(&self, batch: &ScheduledBatch) -> Result<SamplerOutput> {
        let (inputs, sampling_metadata) = self.prepare_inputs(batch)?;

        let hidden_states = self.model.forward(&inputs)?;
        self.model.sample(&hidden_states, &sampling_metadata)
    }
}
