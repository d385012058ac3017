//! Padded tensor assembly.
//!
//! Batches hold variable-length token rows; the fused forward pass wants a
//! dense rectangle. These helpers pad ragged integer rows to a uniform width
//! and materialize them on the compute device.

use candle_core::{Device, Tensor, WithDType};

use crate::error::Result;

/// Pad `row` with `pad` up to `max_len`.
///
/// # Panics
///
/// Panics if the row is longer than `max_len`; the caller computes the batch
/// maximum, so a longer row is a programmer error.
pub fn pad_to_max<T: WithDType>(row: &[T], max_len: usize, pad: T) -> Vec<T> {
    assert!(
        row.len() <= max_len,
        "row of length {} exceeds padded width {}",
        row.len(),
        max_len
    );
    let mut padded = row.to_vec();
    padded.resize(max_len, pad);
    padded
}

/// Pad every row to `max_len` and build a dense `[rows, max_len]` tensor.
pub fn make_tensor_with_pad<T: WithDType>(
    rows: &[Vec<T>],
    max_len: usize,
    pad: T,
    device: &Device,
) -> Result<Tensor> {
    let mut flat = Vec::with_capacity(rows.len() * max_len);
    for row in rows {
        flat.extend(pad_to_max(row, max_len, pad));
    }
    Ok(Tensor::from_vec(flat, (rows.len(), max_len), device)?)
}

/// Materialize a flat integer list as a 1-D on-device tensor.
///
/// The host→device copy is issued non-blocking where the device supports it;
/// the accelerator runtime orders it before any consuming kernel.
pub fn tensor_1d<T: WithDType>(values: Vec<T>, device: &Device) -> Result<Tensor> {
    let len = values.len();
    Ok(Tensor::from_vec(values, len, device)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_to_max() {
        assert_eq!(pad_to_max(&[1u32, 2, 3], 5, 0), vec![1, 2, 3, 0, 0]);
        assert_eq!(pad_to_max(&[1u32, 2, 3], 3, 0), vec![1, 2, 3]);
        assert_eq!(pad_to_max::<u32>(&[], 2, 9), vec![9, 9]);
    }

    #[test]
    #[should_panic(expected = "exceeds padded width")]
    fn test_pad_to_max_row_too_long() {
        pad_to_max(&[1u32, 2, 3], 2, 0);
    }

    #[test]
    fn test_make_tensor_with_pad() {
        let device = Device::Cpu;
        let rows = vec![vec![1u32, 2], vec![3, 4, 5], vec![6]];
        let tensor = make_tensor_with_pad(&rows, 3, 0, &device).unwrap();

        assert_eq!(tensor.dims(), &[3, 3]);
        assert_eq!(
            tensor.to_vec2::<u32>().unwrap(),
            vec![vec![1, 2, 0], vec![3, 4, 5], vec![6, 0, 0]]
        );
    }

    #[test]
    fn test_tensor_1d() {
        let device = Device::Cpu;
        let tensor = tensor_1d(vec![5i64, 6, 7], &device).unwrap();

        assert_eq!(tensor.dims(), &[3]);
        assert_eq!(tensor.to_vec1::<i64>().unwrap(), vec![5, 6, 7]);
    }

    #[test]
    fn test_tensor_1d_empty() {
        let device = Device::Cpu;
        let tensor = tensor_1d(Vec::<u32>::new(), &device).unwrap();

        assert_eq!(tensor.dims(), &[0]);
    }
}
