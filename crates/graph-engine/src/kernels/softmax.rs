// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Softmax along the last axis.

use super::{as_f32_input, as_f32_output, require_f32, require_same_shape, Kernel};
use crate::{EngineError, TensorData};
use model_format::{OpCode, TensorDef};
use tensor_core::Shape;

const OP: &str = "softmax";

/// Softmax over the last dimension, one row at a time.
///
/// Each row is shifted by its maximum before exponentiation so large logits
/// do not overflow. A rank-0 input produces `1.0`.
pub struct SoftmaxKernel;

impl Kernel for SoftmaxKernel {
    fn opcode(&self) -> OpCode {
        OpCode::Softmax
    }

    fn check(&self, inputs: &[&TensorDef], output: &TensorDef) -> Result<(), EngineError> {
        require_f32(OP, inputs[0])?;
        require_f32(OP, output)?;
        require_same_shape(OP, inputs[0], output)
    }

    fn run(
        &self,
        inputs: &[&TensorData],
        output: &mut TensorData,
        out_shape: &Shape,
    ) -> Result<(), EngineError> {
        let src = as_f32_input(OP, inputs[0])?;
        let dst = as_f32_output(OP, output)?;

        // A scalar has a single certain outcome.
        if out_shape.rank() == 0 {
            if let Some(first) = dst.first_mut() {
                *first = 1.0;
            }
            return Ok(());
        }

        let last_dim = out_shape.dims()[out_shape.rank() - 1];
        if last_dim == 0 {
            return Ok(());
        }

        let num_rows = src.len() / last_dim;
        for row in 0..num_rows {
            let offset = row * last_dim;
            let src_row = &src[offset..offset + last_dim];
            let dst_row = &mut dst[offset..offset + last_dim];

            // Shift by the row maximum for numerical stability.
            let max = src_row.iter().copied().fold(f32::NEG_INFINITY, f32::max);

            let mut sum = 0.0;
            for (d, &s) in dst_row.iter_mut().zip(src_row) {
                let e = (s - max).exp();
                *d = e;
                sum += e;
            }

            if sum > 0.0 {
                let inv_sum = 1.0 / sum;
                for d in dst_row.iter_mut() {
                    *d *= inv_sum;
                }
            }
        }
        Ok(())
    }
}
