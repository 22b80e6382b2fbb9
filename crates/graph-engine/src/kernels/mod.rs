// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Op kernels and the global kernel registry.
//!
//! Each kernel implements one [`OpCode`] in two phases:
//!
//! - [`Kernel::check`] runs at session-build time against tensor metadata.
//!   It enforces dtype rules and shape compatibility so a session that
//!   builds can only fail at run time for numeric reasons. Shape checks
//!   involving a dynamic dimension are deferred to allocation.
//! - [`Kernel::run`] executes on allocated buffers. Kernels never allocate;
//!   outputs are written into the session-owned buffer in place.
//!
//! The registry is a process-wide table built once on first use.

mod cast;
mod elementwise;
mod fully_connected;
mod softmax;

pub use cast::CastKernel;
pub use elementwise::{AddKernel, LogisticKernel, MulKernel, ReluKernel, TanhKernel};
pub use fully_connected::FullyConnectedKernel;
pub use softmax::SoftmaxKernel;

use crate::{EngineError, TensorData};
use model_format::{OpCode, TensorDef};
use std::sync::OnceLock;
use tensor_core::{DType, Shape};

/// One op implementation.
pub trait Kernel: Send + Sync {
    /// The opcode this kernel implements.
    fn opcode(&self) -> OpCode;

    /// Validates operand dtypes and shapes at session-build time.
    fn check(&self, inputs: &[&TensorDef], output: &TensorDef) -> Result<(), EngineError>;

    /// Executes the op on allocated buffers.
    ///
    /// `out_shape` is the output tensor's shape; kernels that need row
    /// structure (softmax) read it, element-wise kernels ignore it.
    fn run(
        &self,
        inputs: &[&TensorData],
        output: &mut TensorData,
        out_shape: &Shape,
    ) -> Result<(), EngineError>;
}

static KERNELS: OnceLock<Vec<Box<dyn Kernel>>> = OnceLock::new();

fn registry() -> &'static [Box<dyn Kernel>] {
    KERNELS.get_or_init(|| {
        vec![
            Box::new(FullyConnectedKernel),
            Box::new(AddKernel),
            Box::new(MulKernel),
            Box::new(ReluKernel),
            Box::new(TanhKernel),
            Box::new(LogisticKernel),
            Box::new(SoftmaxKernel),
            Box::new(CastKernel),
        ]
    })
}

/// Returns the kernel registered for an opcode, if any.
pub fn kernel_for(opcode: OpCode) -> Option<&'static dyn Kernel> {
    registry()
        .iter()
        .find(|k| k.opcode() == opcode)
        .map(|k| k.as_ref())
}

// ── Shared operand helpers ─────────────────────────────────────────

pub(crate) fn require_f32(op: &'static str, def: &TensorDef) -> Result<(), EngineError> {
    if def.dtype != DType::F32 {
        return Err(EngineError::UnsupportedDType {
            op,
            dtype: def.dtype,
        });
    }
    Ok(())
}

/// Checks two shapes for equality, deferring when either is dynamic.
pub(crate) fn require_same_shape(
    op: &'static str,
    lhs: &TensorDef,
    rhs: &TensorDef,
) -> Result<(), EngineError> {
    if lhs.shape.has_dynamic_dim() || rhs.shape.has_dynamic_dim() {
        return Ok(());
    }
    if lhs.shape != rhs.shape {
        return Err(EngineError::ShapeMismatch {
            op,
            lhs: lhs.shape.clone(),
            rhs: rhs.shape.clone(),
        });
    }
    Ok(())
}

pub(crate) fn as_f32_input<'a>(
    op: &'static str,
    t: &'a TensorData,
) -> Result<&'a [f32], EngineError> {
    t.as_f32().ok_or(EngineError::UnsupportedDType {
        op,
        dtype: t.dtype(),
    })
}

pub(crate) fn as_f32_output<'a>(
    op: &'static str,
    t: &'a mut TensorData,
) -> Result<&'a mut [f32], EngineError> {
    let dtype = t.dtype();
    t.as_f32_mut()
        .ok_or(EngineError::UnsupportedDType { op, dtype })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_opcode() {
        for code in 1..=8u8 {
            let opcode = OpCode::from_code(code).unwrap();
            let kernel = kernel_for(opcode)
                .unwrap_or_else(|| panic!("no kernel for {opcode}"));
            assert_eq!(kernel.opcode(), opcode);
        }
    }

    #[test]
    fn test_registry_is_stable_across_lookups() {
        let a = kernel_for(OpCode::Relu).unwrap();
        let b = kernel_for(OpCode::Relu).unwrap();
        assert!(std::ptr::eq(a, b));
    }
}
