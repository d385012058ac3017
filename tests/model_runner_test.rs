//! Integration tests for the ModelRunner orchestrator.

use std::collections::BTreeMap;
use std::sync::Mutex;

use candle_core::{DType, Device, Tensor};
use nano_runner::core::group::{ScheduledBatch, SequenceGroup};
use nano_runner::core::sequence::{SequenceData, SequenceId};
use nano_runner::runner::model_runner::{
    Model, ModelInputs, ModelRunner, SamplerOutput, SequenceGroupOutput, SequenceOutput,
};
use nano_runner::runner::sampling::SamplingMetadata;
use nano_runner::{Result, RunnerConfig, SamplingParams};

/// Shapes observed by the dummy backend during a forward pass.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ObservedForward {
    token_dims: Vec<usize>,
    position_dims: Vec<usize>,
    block_dims: Vec<usize>,
    has_context_lens: bool,
}

/// Backend stub that records what it was called with and emits a fixed token.
struct DummyModel {
    observed: Mutex<Option<ObservedForward>>,
    output_token: u32,
}

impl DummyModel {
    fn new(output_token: u32) -> Self {
        Self {
            observed: Mutex::new(None),
            output_token,
        }
    }
}

impl Model for DummyModel {
    fn forward(&self, inputs: &ModelInputs) -> Result<Tensor> {
        *self.observed.lock().unwrap() = Some(ObservedForward {
            token_dims: inputs.tokens.dims().to_vec(),
            position_dims: inputs.positions.dims().to_vec(),
            block_dims: inputs.block_ids.dims().to_vec(),
            has_context_lens: inputs.context_lens.is_some(),
        });
        let rows = inputs.tokens.dims()[0];
        let cols = inputs.tokens.dims()[1];
        Ok(Tensor::zeros((rows * cols, 8), DType::F32, inputs.tokens.device())?)
    }

    fn sample(&self, _hidden_states: &Tensor, metadata: &SamplingMetadata) -> Result<SamplerOutput> {
        let outputs = metadata
            .seq_groups
            .iter()
            .map(|(seq_ids, _params)| SequenceGroupOutput {
                samples: seq_ids
                    .iter()
                    .map(|&seq_id| SequenceOutput {
                        seq_id,
                        output_token: self.output_token,
                        logprob: 0.0,
                    })
                    .collect(),
            })
            .collect();
        Ok(SamplerOutput { outputs })
    }
}

fn prompt_group(request_id: u64, seq_id: u64, prompt: Vec<u32>) -> SequenceGroup {
    let mut seq_data = BTreeMap::new();
    seq_data.insert(seq_id, SequenceData::new(prompt));
    let mut block_tables = BTreeMap::new();
    block_tables.insert(seq_id, vec![request_id as u32]);
    SequenceGroup::new(request_id, seq_data, SamplingParams::new(), block_tables)
}

fn decode_group(request_id: u64, seq_ids: &[SequenceId]) -> SequenceGroup {
    let mut seq_data = BTreeMap::new();
    let mut block_tables = BTreeMap::new();
    for &seq_id in seq_ids {
        let mut seq = SequenceData::new(vec![1, 2, 3]);
        seq.append_token(10);
        seq_data.insert(seq_id, seq);
        block_tables.insert(seq_id, vec![seq_id as u32]);
    }
    SequenceGroup::new(request_id, seq_data, SamplingParams::new(), block_tables)
}

fn test_runner(output_token: u32) -> ModelRunner<DummyModel> {
    ModelRunner::new(
        DummyModel::new(output_token),
        &RunnerConfig::default(),
        Device::Cpu,
    )
}

#[test]
fn test_prefill_step_shapes() {
    let runner = test_runner(42);
    let batch = ScheduledBatch::Prefill(vec![
        prompt_group(0, 0, vec![1, 2, 3]),
        prompt_group(1, 1, vec![4, 5, 6, 7, 8]),
    ]);

    let output = runner.execute_step(&batch).unwrap();

    let observed = runner.model().observed.lock().unwrap().clone().unwrap();
    assert_eq!(
        observed,
        ObservedForward {
            token_dims: vec![2, 5],
            position_dims: vec![2, 5],
            block_dims: vec![2],
            has_context_lens: false,
        }
    );
    assert_eq!(output.outputs.len(), 2);
}

#[test]
fn test_decode_step_shapes() {
    let runner = test_runner(42);
    // 2 + 1 sequences: three rows of width one, with context lengths.
    let batch = ScheduledBatch::Decode(vec![decode_group(0, &[0, 1]), decode_group(1, &[2])]);

    let output = runner.execute_step(&batch).unwrap();

    let observed = runner.model().observed.lock().unwrap().clone().unwrap();
    assert_eq!(
        observed,
        ObservedForward {
            token_dims: vec![3, 1],
            position_dims: vec![3, 1],
            block_dims: vec![3],
            has_context_lens: true,
        }
    );
    assert_eq!(output.outputs.len(), 2);
    assert_eq!(output.outputs[0].samples.len(), 2);
    assert_eq!(output.outputs[1].samples.len(), 1);
}

#[test]
fn test_sampler_output_returned_unchanged() {
    let runner = test_runner(777);
    let batch = ScheduledBatch::Decode(vec![decode_group(0, &[3])]);

    let output = runner.execute_step(&batch).unwrap();

    assert_eq!(output.outputs[0].samples[0].seq_id, 3);
    assert_eq!(output.outputs[0].samples[0].output_token, 777);
}

#[test]
fn test_prepare_inputs_prefill_lengths() {
    let runner = test_runner(0);
    let batch = ScheduledBatch::Prefill(vec![
        prompt_group(0, 0, vec![1, 2]),
        prompt_group(1, 1, vec![3, 4, 5]),
    ]);

    let (inputs, metadata) = runner.prepare_inputs(&batch).unwrap();

    assert!(inputs.context_lens.is_none());
    assert_eq!(metadata.prompt_lens, vec![2, 3]);
    assert_eq!(
        metadata.selected_token_indices.to_vec1::<i64>().unwrap(),
        vec![1, 5]
    );
}

#[test]
fn test_prepare_inputs_decode_has_no_prompt_lens() {
    let runner = test_runner(0);
    let batch = ScheduledBatch::Decode(vec![decode_group(0, &[0])]);

    let (inputs, metadata) = runner.prepare_inputs(&batch).unwrap();

    assert!(inputs.context_lens.is_some());
    assert!(metadata.prompt_lens.is_empty());
}

#[test]
fn test_sliding_window_from_config() {
    let config = RunnerConfig {
        sliding_window: Some(2),
    };
    let runner = ModelRunner::new(DummyModel::new(0), &config, Device::Cpu);
    let batch = ScheduledBatch::Decode(vec![decode_group(0, &[0])]);

    let (inputs, _metadata) = runner.prepare_inputs(&batch).unwrap();

    // Sequence length 4 clipped to the window of 2.
    assert_eq!(
        inputs.context_lens.unwrap().to_vec1::<u32>().unwrap(),
        vec![2]
    );
}

#[test]
#[should_panic(expected = "empty scheduled batch")]
fn test_empty_batch_panics() {
    let runner = test_runner(0);
    let _ = runner.prepare_inputs(&ScheduledBatch::Prefill(vec![]));
}
