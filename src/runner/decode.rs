//! Decode batch assembly.
//!
//! A decode batch produces one new token per already-started sequence: one
//! row per sequence (not per request), single column holding the last
//! generated token.

use candle_core::{Device, Tensor};

use crate::core::group::SequenceGroup;
use crate::error::Result;
use crate::runner::pad::{make_tensor_with_pad, tensor_1d};

/// Input tensors for a decode forward pass.
#[derive(Debug)]
pub struct DecodeInputs {
    /// Token IDs, u32 `[num_seqs, 1]`.
    pub tokens: Tensor,
    /// Position IDs, i64 `[num_seqs, 1]`.
    pub positions: Tensor,
    /// Storage-block index per sequence, u32 `[num_seqs]`.
    pub block_ids: Tensor,
    /// Attention context length per sequence, u32 `[num_seqs]`.
    pub context_lens: Tensor,
}

/// Build the input tensors for a batch of decode-phase requests.
///
/// A request may carry several concurrently-decoded sequences (parallel
/// sampling, beam variants); each contributes its own row. Context lengths
/// are clipped to `sliding_window` when one is configured.
///
/// # Panics
///
/// Panics if the batch is empty, if a scheduled sequence holds no tokens, or
/// if a sequence violates the single-storage-block scheduler contract.
pub fn build_decode_inputs(
    groups: &[SequenceGroup],
    sliding_window: Option<usize>,
    device: &Device,
) -> Result<DecodeInputs> {
    assert!(!groups.is_empty(), "empty decode batch");

    let mut input_tokens: Vec<Vec<u32>> = Vec::new();
    let mut input_positions: Vec<Vec<i64>> = Vec::new();
    let mut input_block_ids: Vec<u32> = Vec::new();
    let mut context_lens: Vec<u32> = Vec::new();

    for group in groups {
        for seq_id in group.seq_ids() {
            let seq_data = group
                .get_seq(seq_id)
                .expect("sequence listed but missing from request");
            let generation_token = seq_data
                .last_token_id()
                .expect("decode-phase sequence holds no tokens");
            input_tokens.push(vec![generation_token]);

            let seq_len = seq_data.len();
            input_positions.push(vec![seq_len as i64 - 1]);

            let context_len = match sliding_window {
                Some(window) => seq_len.min(window),
                None => seq_len,
            };
            context_lens.push(context_len as u32);

            let block_table = group
                .block_table(seq_id)
                .expect("no storage block assigned to scheduled sequence");
            assert_eq!(
                block_table.len(),
                1,
                "decode sequence {} holds {} storage blocks",
                seq_id,
                block_table.len()
            );
            input_block_ids.push(block_table[0]);
        }
    }

    Ok(DecodeInputs {
        tokens: make_tensor_with_pad(&input_tokens, 1, 0u32, device)?,
        positions: make_tensor_with_pad(&input_positions, 1, 0i64, device)?,
        block_ids: tensor_1d(input_block_ids, device)?,
        context_lens: tensor_1d(context_lens, device)?,
    })
}
