//! Core request and sequence state.
//!
//! This module contains:
//! - SequenceData for per-sequence token state
//! - SequenceGroup for request-level state and block assignment
//! - ScheduledBatch, the phase-tagged batch handed over by the scheduler

pub mod group;
pub mod sequence;

pub use group::{Generator, GroupState, ScheduledBatch, SequenceGroup};
pub use sequence::{SequenceData, SequenceId};
