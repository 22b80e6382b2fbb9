// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Element-wise dtype conversion.
//!
//! Conversions follow the saturating `as`-cast rules: float to integer
//! clamps to the target range (NaN becomes zero), integer to integer keeps
//! the low bits, and anything nonzero casts to `true`.

use super::{require_same_shape, Kernel};
use crate::{EngineError, TensorData};
use model_format::{OpCode, TensorDef};
use tensor_core::Shape;

/// Converts a tensor to the output's dtype, element by element.
pub struct CastKernel;

fn convert<S: Copy, D>(src: &[S], dst: &mut [D], f: impl Fn(S) -> D) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = f(s);
    }
}

impl Kernel for CastKernel {
    fn opcode(&self) -> OpCode {
        OpCode::Cast
    }

    fn check(&self, inputs: &[&TensorDef], output: &TensorDef) -> Result<(), EngineError> {
        // Any dtype pair is valid, including the identity cast.
        require_same_shape("cast", inputs[0], output)
    }

    fn run(
        &self,
        inputs: &[&TensorData],
        output: &mut TensorData,
        _out_shape: &Shape,
    ) -> Result<(), EngineError> {
        use TensorData::*;
        match (inputs[0], output) {
            (F32(s), F32(d)) => convert(s, d, |v| v),
            (F32(s), I32(d)) => convert(s, d, |v| v as i32),
            (F32(s), I64(d)) => convert(s, d, |v| v as i64),
            (F32(s), U8(d)) => convert(s, d, |v| v as u8),
            (F32(s), I8(d)) => convert(s, d, |v| v as i8),
            (F32(s), Bool(d)) => convert(s, d, |v| u8::from(v != 0.0)),

            (I32(s), F32(d)) => convert(s, d, |v| v as f32),
            (I32(s), I32(d)) => convert(s, d, |v| v),
            (I32(s), I64(d)) => convert(s, d, |v| v as i64),
            (I32(s), U8(d)) => convert(s, d, |v| v as u8),
            (I32(s), I8(d)) => convert(s, d, |v| v as i8),
            (I32(s), Bool(d)) => convert(s, d, |v| u8::from(v != 0)),

            (I64(s), F32(d)) => convert(s, d, |v| v as f32),
            (I64(s), I32(d)) => convert(s, d, |v| v as i32),
            (I64(s), I64(d)) => convert(s, d, |v| v),
            (I64(s), U8(d)) => convert(s, d, |v| v as u8),
            (I64(s), I8(d)) => convert(s, d, |v| v as i8),
            (I64(s), Bool(d)) => convert(s, d, |v| u8::from(v != 0)),

            (U8(s), F32(d)) => convert(s, d, |v| v as f32),
            (U8(s), I32(d)) => convert(s, d, |v| v as i32),
            (U8(s), I64(d)) => convert(s, d, |v| v as i64),
            (U8(s), U8(d)) => convert(s, d, |v| v),
            (U8(s), I8(d)) => convert(s, d, |v| v as i8),
            (U8(s), Bool(d)) => convert(s, d, |v| u8::from(v != 0)),

            (I8(s), F32(d)) => convert(s, d, |v| v as f32),
            (I8(s), I32(d)) => convert(s, d, |v| v as i32),
            (I8(s), I64(d)) => convert(s, d, |v| v as i64),
            (I8(s), U8(d)) => convert(s, d, |v| v as u8),
            (I8(s), I8(d)) => convert(s, d, |v| v),
            (I8(s), Bool(d)) => convert(s, d, |v| u8::from(v != 0)),

            (Bool(s), F32(d)) => convert(s, d, |v| f32::from(v != 0)),
            (Bool(s), I32(d)) => convert(s, d, |v| i32::from(v != 0)),
            (Bool(s), I64(d)) => convert(s, d, |v| i64::from(v != 0)),
            (Bool(s), U8(d)) => convert(s, d, |v| u8::from(v != 0)),
            (Bool(s), I8(d)) => convert(s, d, |v| i8::from(v != 0)),
            (Bool(s), Bool(d)) => convert(s, d, |v| u8::from(v != 0)),
        }
        Ok(())
    }
}
