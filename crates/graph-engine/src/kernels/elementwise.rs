// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Element-wise kernels: add, mul, relu, tanh, logistic.
//!
//! All five operate on `float32` buffers of identical shape and touch each
//! element exactly once.

use super::{as_f32_input, as_f32_output, require_f32, require_same_shape, Kernel};
use crate::{EngineError, TensorData};
use model_format::{OpCode, TensorDef};
use tensor_core::Shape;

fn binary_check(
    op: &'static str,
    inputs: &[&TensorDef],
    output: &TensorDef,
) -> Result<(), EngineError> {
    let (a, b) = (inputs[0], inputs[1]);
    for def in [a, b, output] {
        require_f32(op, def)?;
    }
    require_same_shape(op, a, b)?;
    require_same_shape(op, a, output)
}

fn unary_check(
    op: &'static str,
    inputs: &[&TensorDef],
    output: &TensorDef,
) -> Result<(), EngineError> {
    require_f32(op, inputs[0])?;
    require_f32(op, output)?;
    require_same_shape(op, inputs[0], output)
}

fn binary_run(
    op: &'static str,
    inputs: &[&TensorData],
    output: &mut TensorData,
    f: impl Fn(f32, f32) -> f32,
) -> Result<(), EngineError> {
    let a = as_f32_input(op, inputs[0])?;
    let b = as_f32_input(op, inputs[1])?;
    let y = as_f32_output(op, output)?;
    for ((y, &a), &b) in y.iter_mut().zip(a).zip(b) {
        *y = f(a, b);
    }
    Ok(())
}

fn unary_run(
    op: &'static str,
    inputs: &[&TensorData],
    output: &mut TensorData,
    f: impl Fn(f32) -> f32,
) -> Result<(), EngineError> {
    let a = as_f32_input(op, inputs[0])?;
    let y = as_f32_output(op, output)?;
    for (y, &a) in y.iter_mut().zip(a) {
        *y = f(a);
    }
    Ok(())
}

/// Element-wise addition.
pub struct AddKernel;

impl Kernel for AddKernel {
    fn opcode(&self) -> OpCode {
        OpCode::Add
    }

    fn check(&self, inputs: &[&TensorDef], output: &TensorDef) -> Result<(), EngineError> {
        binary_check("add", inputs, output)
    }

    fn run(
        &self,
        inputs: &[&TensorData],
        output: &mut TensorData,
        _out_shape: &Shape,
    ) -> Result<(), EngineError> {
        binary_run("add", inputs, output, |a, b| a + b)
    }
}

/// Element-wise multiplication.
pub struct MulKernel;

impl Kernel for MulKernel {
    fn opcode(&self) -> OpCode {
        OpCode::Mul
    }

    fn check(&self, inputs: &[&TensorDef], output: &TensorDef) -> Result<(), EngineError> {
        binary_check("mul", inputs, output)
    }

    fn run(
        &self,
        inputs: &[&TensorData],
        output: &mut TensorData,
        _out_shape: &Shape,
    ) -> Result<(), EngineError> {
        binary_run("mul", inputs, output, |a, b| a * b)
    }
}

/// Rectified linear unit: `max(x, 0)`.
pub struct ReluKernel;

impl Kernel for ReluKernel {
    fn opcode(&self) -> OpCode {
        OpCode::Relu
    }

    fn check(&self, inputs: &[&TensorDef], output: &TensorDef) -> Result<(), EngineError> {
        unary_check("relu", inputs, output)
    }

    fn run(
        &self,
        inputs: &[&TensorData],
        output: &mut TensorData,
        _out_shape: &Shape,
    ) -> Result<(), EngineError> {
        unary_run("relu", inputs, output, |a| a.max(0.0))
    }
}

/// Hyperbolic tangent.
pub struct TanhKernel;

impl Kernel for TanhKernel {
    fn opcode(&self) -> OpCode {
        OpCode::Tanh
    }

    fn check(&self, inputs: &[&TensorDef], output: &TensorDef) -> Result<(), EngineError> {
        unary_check("tanh", inputs, output)
    }

    fn run(
        &self,
        inputs: &[&TensorData],
        output: &mut TensorData,
        _out_shape: &Shape,
    ) -> Result<(), EngineError> {
        unary_run("tanh", inputs, output, f32::tanh)
    }
}

/// Logistic sigmoid: `1 / (1 + e^-x)`.
pub struct LogisticKernel;

impl Kernel for LogisticKernel {
    fn opcode(&self) -> OpCode {
        OpCode::Logistic
    }

    fn check(&self, inputs: &[&TensorDef], output: &TensorDef) -> Result<(), EngineError> {
        unary_check("logistic", inputs, output)
    }

    fn run(
        &self,
        inputs: &[&TensorData],
        output: &mut TensorData,
        _out_shape: &Shape,
    ) -> Result<(), EngineError> {
        unary_run("logistic", inputs, output, |a| 1.0 / (1.0 + (-a).exp()))
    }
}
