//! Backend selection
//!
//! Inference and training both run on the pure-Rust ndarray backend so the
//! server needs no GPU toolchain.

use burn::backend::{Autodiff, NdArray};
use burn::tensor::backend::Backend;

/// Backend used for inference
pub type CpuBackend = NdArray;

/// Autodiff backend used for training
pub type TrainingBackend = Autodiff<CpuBackend>;

/// Device of the CPU backend
pub type CpuDevice = <CpuBackend as Backend>::Device;

pub fn default_device() -> CpuDevice {
    Default::default()
}
