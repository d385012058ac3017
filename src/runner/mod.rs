//! Batch assembly and step orchestration.
//!
//! This module contains:
//! - Padded tensor assembly helpers
//! - Prefill and decode batch builders
//! - The sampling-index resolver
//! - ModelRunner, the step driver between scheduler and backend

pub mod decode;
pub mod model_runner;
pub mod pad;
pub mod prefill;
pub mod sampling;

pub use decode::{build_decode_inputs, DecodeInputs};
pub use model_runner::{
    Model, ModelInputs, ModelRunner, SamplerOutput, SequenceGroupOutput, SequenceOutput,
};
pub use pad::{make_tensor_with_pad, pad_to_max};
pub use prefill::{build_prefill_inputs, PrefillInputs};
pub use sampling::{resolve_sampling, CategorizedIndices, SamplingMetadata};
