// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fully connected (dense) projection kernel.

use super::{as_f32_input, as_f32_output, require_f32, Kernel};
use crate::{EngineError, TensorData};
use model_format::{OpCode, TensorDef};
use tensor_core::Shape;

const OP: &str = "fully_connected";

/// Computes `y = x · Wᵀ + b`.
///
/// Operands, in order: activation `x` with shape `[.., in]`, weights `W`
/// stored row-major `[out, in]`, and bias `b` with shape `[out]`. The
/// output is `x`'s leading dimensions followed by `out`. All operands are
/// `float32`.
pub struct FullyConnectedKernel;

impl Kernel for FullyConnectedKernel {
    fn opcode(&self) -> OpCode {
        OpCode::FullyConnected
    }

    fn check(&self, inputs: &[&TensorDef], output: &TensorDef) -> Result<(), EngineError> {
        let (x, w, b) = (inputs[0], inputs[1], inputs[2]);
        for def in [x, w, b, output] {
            require_f32(OP, def)?;
        }

        let w_dims = w.shape.dims();
        if w_dims.len() != 2 {
            return Err(EngineError::BadOperand {
                op: OP,
                detail: format!("weights must be rank 2, got shape {}", w.shape),
            });
        }
        if x.shape.rank() == 0 {
            return Err(EngineError::BadOperand {
                op: OP,
                detail: "activation must have at least one dimension".into(),
            });
        }
        let (out_dim, in_dim) = (w_dims[0], w_dims[1]);

        // Shape compatibility is deferred wherever a dynamic dimension is
        // involved; allocation refuses unresolved shapes before run.
        if !w.shape.has_dynamic_dim() {
            if !b.shape.has_dynamic_dim() && b.shape != Shape::vector(out_dim) {
                return Err(EngineError::ShapeMismatch {
                    op: OP,
                    lhs: Shape::vector(out_dim),
                    rhs: b.shape.clone(),
                });
            }
            let x_dims = x.shape.dims();
            if !x.shape.has_dynamic_dim() && x_dims[x_dims.len() - 1] != in_dim {
                return Err(EngineError::ShapeMismatch {
                    op: OP,
                    lhs: x.shape.clone(),
                    rhs: w.shape.clone(),
                });
            }
            if !x.shape.has_dynamic_dim() && !output.shape.has_dynamic_dim() {
                let mut expected = x_dims[..x_dims.len() - 1].to_vec();
                expected.push(out_dim);
                let expected = Shape::new(expected);
                if output.shape != expected {
                    return Err(EngineError::ShapeMismatch {
                        op: OP,
                        lhs: expected,
                        rhs: output.shape.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn run(
        &self,
        inputs: &[&TensorData],
        output: &mut TensorData,
        _out_shape: &Shape,
    ) -> Result<(), EngineError> {
        let x = as_f32_input(OP, inputs[0])?;
        let w = as_f32_input(OP, inputs[1])?;
        let b = as_f32_input(OP, inputs[2])?;
        let y = as_f32_output(OP, output)?;

        let out_dim = b.len();
        if out_dim == 0 {
            return Ok(());
        }
        let in_dim = w.len() / out_dim;
        let batch = y.len() / out_dim;

        // Weights are [out, in], so each output element is a contiguous
        // dot product over one weight row.
        for row in 0..batch {
            let x_row = &x[row * in_dim..][..in_dim];
            let y_row = &mut y[row * out_dim..][..out_dim];
            for (o, y_val) in y_row.iter_mut().enumerate() {
                let w_row = &w[o * in_dim..][..in_dim];
                let mut acc = b[o];
                for (&xv, &wv) in x_row.iter().zip(w_row) {
                    acc += xv * wv;
                }
                *y_val = acc;
            }
        }
        Ok(())
    }
}
