//! Request-level state.
//!
//! A [`SequenceGroup`] is the runner's view of one in-flight request: the
//! sequences it is generating (one for a plain request, several for parallel
//! sampling or beam variants), its sampling parameters, and the storage-block
//! assignment the scheduler made for each sequence.
//!
//! Groups are snapshots built fresh each scheduling step. The one piece of
//! state that outlives a step is [`GroupState`]: it is shared between
//! snapshots via `Arc`, so the seeded random generator created on first use
//! is the same handle on every subsequent step.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::SamplingParams;
use crate::core::sequence::{SequenceData, SequenceId};

/// Shared random-generator handle for a seeded request.
pub type Generator = Arc<Mutex<StdRng>>;

/// Cross-step state attached to a request.
///
/// The generator is created at most once per request; later calls return the
/// same handle regardless of the seed argument.
#[derive(Debug, Default)]
pub struct GroupState {
    generator: OnceLock<Generator>,
}

impl GroupState {
    /// Get the request's generator, creating it from `seed` on first use.
    pub fn generator(&self, seed: u64) -> Generator {
        Arc::clone(
            self.generator
                .get_or_init(|| Arc::new(Mutex::new(StdRng::seed_from_u64(seed)))),
        )
    }
}

/// One in-flight request, as scheduled for the current step.
///
/// Sequences iterate in ascending sequence-id order, which is the order they
/// were added to the request upstream.
#[derive(Debug, Clone)]
pub struct SequenceGroup {
    /// Unique request identifier.
    request_id: u64,
    /// Token state per sequence.
    seq_data: BTreeMap<SequenceId, SequenceData>,
    /// Sampling configuration for the whole request.
    sampling_params: SamplingParams,
    /// Storage-block indices per sequence.
    block_tables: BTreeMap<SequenceId, Vec<u32>>,
    /// State shared across scheduling steps.
    state: Arc<GroupState>,
}

impl SequenceGroup {
    /// Create a request snapshot.
    pub fn new(
        request_id: u64,
        seq_data: BTreeMap<SequenceId, SequenceData>,
        sampling_params: SamplingParams,
        block_tables: BTreeMap<SequenceId, Vec<u32>>,
    ) -> Self {
        Self {
            request_id,
            seq_data,
            sampling_params,
            block_tables,
            state: Arc::new(GroupState::default()),
        }
    }

    /// Get the request ID.
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Get the sequence IDs, in iteration order.
    pub fn seq_ids(&self) -> Vec<SequenceId> {
        self.seq_data.keys().copied().collect()
    }

    /// Number of sequences in the request.
    pub fn num_seqs(&self) -> usize {
        self.seq_data.len()
    }

    /// Get the per-sequence token state.
    pub fn seq_data(&self) -> &BTreeMap<SequenceId, SequenceData> {
        &self.seq_data
    }

    /// Get one sequence's token state.
    pub fn get_seq(&self, seq_id: SequenceId) -> Option<&SequenceData> {
        self.seq_data.get(&seq_id)
    }

    /// Get the sampling parameters.
    pub fn sampling_params(&self) -> &SamplingParams {
        &self.sampling_params
    }

    /// Get one sequence's storage-block indices.
    pub fn block_table(&self, seq_id: SequenceId) -> Option<&[u32]> {
        self.block_tables.get(&seq_id).map(Vec::as_slice)
    }

    /// Get the cross-step request state.
    pub fn state(&self) -> &GroupState {
        &self.state
    }

    /// Append a generated token to one sequence.
    pub fn append_token(&mut self, seq_id: SequenceId, token_id: u32) {
        if let Some(seq) = self.seq_data.get_mut(&seq_id) {
            seq.append_token(token_id);
        }
    }
}

/// A scheduled batch of requests, tagged with its phase.
///
/// The scheduler guarantees a batch is never mixed: every request is either
/// in prompt/prefill phase or in decode phase. Constructing the variant here
/// makes that guarantee explicit instead of re-inferring it from the first
/// request.
#[derive(Debug, Clone)]
pub enum ScheduledBatch {
    /// All requests are processing their full initial prompt.
    Prefill(Vec<SequenceGroup>),
    /// All requests are generating one token per sequence.
    Decode(Vec<SequenceGroup>),
}

impl ScheduledBatch {
    /// Get the scheduled requests, in batch order.
    pub fn groups(&self) -> &[SequenceGroup] {
        match self {
            ScheduledBatch::Prefill(groups) | ScheduledBatch::Decode(groups) => groups,
        }
    }

    /// Check whether this is a prefill batch.
    pub fn is_prefill(&self) -> bool {
        matches!(self, ScheduledBatch::Prefill(_))
    }

    /// Number of requests in the batch.
    pub fn num_groups(&self) -> usize {
        self.groups().len()
    }

    /// Check whether the batch holds no requests.
    pub fn is_empty(&self) -> bool {
        self.groups().is_empty()
    }
}
