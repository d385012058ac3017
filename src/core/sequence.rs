//! Per-sequence token state.
//!
//! A [`SequenceData`] tracks the tokens of one generation stream: the prompt
//! it started from and everything generated since. The scheduler owns this
//! state and advances it between steps; the runner only reads it.

/// Unique identifier for a sequence.
pub type SequenceId = u64;

/// Token state of a single sequence.
///
/// # Example
///
/// ```
/// use nano_runner::core::sequence::SequenceData;
///
/// let mut seq = SequenceData::new(vec![1, 2, 3, 4]);
/// assert_eq!(seq.prompt_len(), 4);
/// assert_eq!(seq.len(), 4);
///
/// seq.append_token(5);
/// assert_eq!(seq.len(), 5);
/// assert_eq!(seq.last_token_id(), Some(5));
/// ```
#[derive(Debug, Clone)]
pub struct SequenceData {
    /// Prompt token IDs.
    prompt_token_ids: Vec<u32>,
    /// Generated output token IDs.
    output_token_ids: Vec<u32>,
}

impl SequenceData {
    /// Create sequence state from prompt tokens.
    pub fn new(prompt_token_ids: Vec<u32>) -> Self {
        Self {
            prompt_token_ids,
            output_token_ids: Vec::new(),
        }
    }

    /// Get the prompt token IDs.
    pub fn prompt_token_ids(&self) -> &[u32] {
        &self.prompt_token_ids
    }

    /// Get the output token IDs.
    pub fn output_token_ids(&self) -> &[u32] {
        &self.output_token_ids
    }

    /// Get all token IDs (prompt + output).
    pub fn token_ids(&self) -> Vec<u32> {
        let mut tokens = self.prompt_token_ids.clone();
        tokens.extend(&self.output_token_ids);
        tokens
    }

    /// Get the last token ID.
    pub fn last_token_id(&self) -> Option<u32> {
        self.output_token_ids
            .last()
            .copied()
            .or_else(|| self.prompt_token_ids.last().copied())
    }

    /// Get the prompt length.
    pub fn prompt_len(&self) -> usize {
        self.prompt_token_ids.len()
    }

    /// Get the output length.
    pub fn output_len(&self) -> usize {
        self.output_token_ids.len()
    }

    /// Get the total length (prompt + output).
    pub fn len(&self) -> usize {
        self.prompt_len() + self.output_len()
    }

    /// Check whether the sequence holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a generated token.
    pub fn append_token(&mut self, token_id: u32) {
        self.output_token_ids.push(token_id);
    }
}
