//! Sampling-index resolution.
//!
//! After the forward pass the model's output is a flattened buffer of rows:
//! `max_subquery_len` rows per request for prefill (the padded row block),
//! one row per sequence for decode. The sampler needs to know which of those
//! rows to read (`selected_token_indices`) and which sampling strategy to
//! apply to each position that actually produces a next token
//! (`categorized_sample_indices`). This module computes both by a single
//! in-order walk over the batch.
//!
//! Two cursors move through two different index spaces:
//!
//! - `selected_offset` walks the flattened output rows, advancing by the full
//!   padded block width per prefill request even when only the last position
//!   matters, so later requests start at a fixed stride.
//! - `categorized_offset` walks the compacted space of selected positions and
//!   assigns strategy-bucket membership. Prompt-logprob positions are counted
//!   but never bucketed: they are read for reporting, not sampled.

use candle_core::{Device, Tensor};

use crate::config::{SamplingParams, SamplingType};
use crate::core::group::{Generator, ScheduledBatch};
use crate::core::sequence::SequenceId;
use crate::error::Result;
use crate::runner::pad::tensor_1d;

/// Selected positions partitioned by sampling strategy.
///
/// A fixed-size table with one ordered index container per
/// [`SamplingType`]; buckets are disjoint and together cover exactly the
/// positions that need a next-token decision.
#[derive(Debug)]
pub struct CategorizedIndices {
    buckets: [Tensor; SamplingType::COUNT],
}

impl CategorizedIndices {
    fn from_lists(lists: [Vec<u32>; SamplingType::COUNT], device: &Device) -> Result<Self> {
        let [greedy, random, random_seed, beam] = lists;
        Ok(Self {
            buckets: [
                tensor_1d(greedy, device)?,
                tensor_1d(random, device)?,
                tensor_1d(random_seed, device)?,
                tensor_1d(beam, device)?,
            ],
        })
    }

    /// Get the index tensor for one strategy, u32 `[bucket_len]`.
    pub fn bucket(&self, sampling_type: SamplingType) -> &Tensor {
        &self.buckets[sampling_type.index()]
    }
}

/// Everything the sampler needs to turn hidden states into output tokens.
#[derive(Debug)]
pub struct SamplingMetadata {
    /// Sequence-id list and sampling params per request, in batch order.
    pub seq_groups: Vec<(Vec<SequenceId>, SamplingParams)>,
    /// Full prompt length per request (empty for decode batches).
    pub prompt_lens: Vec<usize>,
    /// Flattened output rows to read, i64 `[num_selected]`, in batch order.
    pub selected_token_indices: Tensor,
    /// Positions needing a sampling decision, partitioned by strategy.
    pub categorized_sample_indices: CategorizedIndices,
    /// Generator handles for seeded requests, in batch order.
    ///
    /// One entry per seeded request (not per sequence), matching the order
    /// of the seeded bucket.
    pub generators: Vec<Generator>,
}

/// Resolve selected and categorized sampling indices for a batch.
///
/// `prompt_lens` and `subquery_lens` come from the prefill builder and must
/// be empty for decode batches. Walks requests in batch order; the resulting
/// index lists are materialized on `device`.
///
/// Prefill requests occupy `max_subquery_len` flattened rows each, so the
/// selected index of request `i` is `i * max_subquery_len + subquery_len - 1`
/// (the flattening convention of a row-major padded output). With prompt
/// logprobs requested, every earlier prompt position is selected as well but
/// enters no strategy bucket.
///
/// # Panics
///
/// Panics if a prefill request has more than one sequence, or if the length
/// lists do not match the batch.
pub fn resolve_sampling(
    batch: &ScheduledBatch,
    prompt_lens: &[usize],
    subquery_lens: &[usize],
    device: &Device,
) -> Result<SamplingMetadata> {
    let mut seq_groups: Vec<(Vec<SequenceId>, SamplingParams)> =
        Vec::with_capacity(batch.num_groups());
    let mut selected_token_indices: Vec<i64> = Vec::new();
    let mut categorized: [Vec<u32>; SamplingType::COUNT] = Default::default();
    let mut generators: Vec<Generator> = Vec::new();

    let mut selected_offset: usize = 0;
    let mut categorized_offset: usize = 0;

    // Each decode row occupies exactly one flattened output row.
    let max_subquery_len = if batch.is_prefill() {
        assert_eq!(subquery_lens.len(), batch.num_groups(), "length list mismatch");
        *subquery_lens
            .iter()
            .max()
            .expect("subquery lengths empty for prefill batch")
    } else {
        1
    };

    for (i, group) in batch.groups().iter().enumerate() {
        let seq_ids = group.seq_ids();
        let params = group.sampling_params();
        let sampling_type = params.sampling_type();

        if batch.is_prefill() {
            assert_eq!(seq_ids.len(), 1, "prefill request with multiple sequences");
            let subquery_len = subquery_lens[i];
            assert!(subquery_len > 0, "empty subquery for prefill request");

            // Prompt positions before the last are read for logprob
            // reporting only; they never enter a bucket.
            if params.prompt_logprobs.is_some() {
                categorized_offset += subquery_len - 1;
            }
            categorized[sampling_type.index()].push(categorized_offset as u32);
            categorized_offset += 1;

            if params.prompt_logprobs.is_some() {
                selected_token_indices.extend(
                    (selected_offset..selected_offset + subquery_len - 1).map(|idx| idx as i64),
                );
            }
            selected_token_indices.push((selected_offset + subquery_len - 1) as i64);
            selected_offset += max_subquery_len;
        } else {
            let num_seqs = seq_ids.len();
            selected_token_indices
                .extend((selected_offset..selected_offset + num_seqs).map(|idx| idx as i64));
            selected_offset += num_seqs;

            categorized[sampling_type.index()]
                .extend((categorized_offset..categorized_offset + num_seqs).map(|idx| idx as u32));
            categorized_offset += num_seqs;
        }

        if let Some(seed) = params.seed {
            generators.push(group.state().generator(seed));
        }

        seq_groups.push((seq_ids, params.clone()));
    }

    Ok(SamplingMetadata {
        seq_groups,
        prompt_lens: prompt_lens.to_vec(),
        selected_token_indices: tensor_1d(selected_token_indices, device)?,
        categorized_sample_indices: CategorizedIndices::from_lists(categorized, device)?,
        generators,
    })
}
