//! nano-runner: batch assembly and sampling-index resolution for LLM serving.
//!
//! This crate sits between a request scheduler and a model-execution backend:
//! - Prefill/decode batch builders turn variable-length per-request state
//!   into dense, padded token/position/block-index tensors
//! - The sampling-index resolver computes which flattened output rows each
//!   request samples from, partitioned by sampling strategy
//! - ModelRunner orchestrates one step: assemble, forward, sample

pub mod config;
pub mod error;

pub mod core;
pub mod runner;

pub use crate::core::{
    Generator, GroupState, ScheduledBatch, SequenceData, SequenceGroup, SequenceId,
};
pub use config::{RunnerConfig, SamplingParams, SamplingType};
pub use error::{Error, Result};
pub use runner::{
    Model, ModelInputs, ModelRunner, SamplerOutput, SamplingMetadata, SequenceGroupOutput,
    SequenceOutput,
};
