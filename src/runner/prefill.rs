//! Prefill batch assembly.
//!
//! Every request in a prefill batch is processing its full initial prompt:
//! one row per request, padded to the longest prompt in the batch.

use candle_core::{Device, Tensor};

use crate::core::group::SequenceGroup;
use crate::error::Result;
use crate::runner::pad::{make_tensor_with_pad, tensor_1d};

/// Input tensors for a prefill forward pass.
#[derive(Debug)]
pub struct PrefillInputs {
    /// Token IDs, u32 `[num_requests, max_subquery_len]`.
    pub tokens: Tensor,
    /// Position IDs, i64 `[num_requests, max_subquery_len]`.
    pub positions: Tensor,
    /// Storage-block index per request, u32 `[num_requests]`.
    pub block_ids: Tensor,
    /// Full prompt length per request.
    pub prompt_lens: Vec<usize>,
    /// Prompt positions processed this step per request.
    ///
    /// Equals the prompt length: no prefix is already computed at this layer.
    pub subquery_lens: Vec<usize>,
}

/// Build the input tensors for a batch of prompt-phase requests.
///
/// Rows are padded to the batch-wide maximum subquery length, not a global
/// maximum.
///
/// # Panics
///
/// Panics if the batch is empty, or if any request violates the scheduler
/// contract of exactly one sequence and exactly one storage block.
pub fn build_prefill_inputs(groups: &[SequenceGroup], device: &Device) -> Result<PrefillInputs> {
    assert!(!groups.is_empty(), "empty prefill batch");

    let mut input_tokens: Vec<Vec<u32>> = Vec::with_capacity(groups.len());
    let mut input_positions: Vec<Vec<i64>> = Vec::with_capacity(groups.len());
    let mut input_block_ids: Vec<u32> = Vec::with_capacity(groups.len());
    let mut prompt_lens: Vec<usize> = Vec::with_capacity(groups.len());
    let mut subquery_lens: Vec<usize> = Vec::with_capacity(groups.len());

    for group in groups {
        let seq_ids = group.seq_ids();
        assert_eq!(
            seq_ids.len(),
            1,
            "prefill request {} has {} sequences",
            group.request_id(),
            seq_ids.len()
        );
        let seq_id = seq_ids[0];

        let seq_data = group
            .get_seq(seq_id)
            .expect("sequence listed but missing from request");
        let prompt_tokens = seq_data.token_ids();
        let prompt_len = prompt_tokens.len();
        prompt_lens.push(prompt_len);
        subquery_lens.push(prompt_len);

        input_positions.push((0..prompt_len as i64).collect());
        input_tokens.push(prompt_tokens);

        let block_table = group
            .block_table(seq_id)
            .expect("no storage block assigned to scheduled sequence");
        assert_eq!(
            block_table.len(),
            1,
            "prefill request {} holds {} storage blocks",
            group.request_id(),
            block_table.len()
        );
        input_block_ids.push(block_table[0]);
    }

    let max_subquery_len = *subquery_lens
        .iter()
        .max()
        .expect("subquery lengths empty for non-empty batch");
    assert!(max_subquery_len > 0, "prefill batch with empty prompts");
    log::trace!(
        "prefill batch: {} requests, max_subquery_len {}",
        groups.len(),
        max_subquery_len
    );

    Ok(PrefillInputs {
        tokens: make_tensor_with_pad(&input_tokens, max_subquery_len, 0u32, device)?,
        positions: make_tensor_with_pad(&input_positions, max_subquery_len, 0i64, device)?,
        block_ids: tensor_1d(input_block_ids, device)?,
        prompt_lens,
        subquery_lens,
    })
}
