// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for model compilation and session execution.

use crate::MemoryLimit;
use model_format::FormatError;
use tensor_core::{DType, Shape};

/// Errors that can occur while compiling a model or running a session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The model file could not be read or mapped.
    #[error("model read failed: {detail}")]
    Read { detail: String },

    /// The model bytes are not a valid TGRF graph.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The graph uses an op no registered kernel implements.
    #[error("op {index} uses unsupported opcode '{opcode}'")]
    Unsupported { index: usize, opcode: String },

    /// A kernel rejected an operand dtype.
    #[error("{op} does not support {dtype}")]
    UnsupportedDType { op: &'static str, dtype: DType },

    /// A kernel rejected incompatible operand shapes.
    #[error("{op}: incompatible shapes {lhs} and {rhs}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// A kernel rejected an operand's structure (wrong rank, bad layout).
    #[error("{op}: {detail}")]
    BadOperand { op: &'static str, detail: String },

    /// A tensor still has a dynamic dimension at allocation time.
    #[error("tensor '{name}' has unresolved shape {shape}")]
    UnresolvedShape { name: String, shape: Shape },

    /// Buffer sizing arithmetic overflowed.
    #[error("allocation size overflow: {detail}")]
    SizeOverflow { detail: String },

    /// The buffers would exceed the configured memory limit.
    #[error("buffers need {required} bytes, exceeding the limit of {limit}")]
    LimitExceeded {
        required: usize,
        limit: MemoryLimit,
    },

    /// A memory limit string could not be parsed.
    #[error("invalid memory limit: {0}")]
    InvalidLimit(String),

    /// An op produced a non-finite float value.
    #[error("numeric fault in op {index} ({op}): {detail}")]
    NumericFault {
        index: usize,
        op: &'static str,
        detail: String,
    },

    /// Session buffers have not been allocated.
    #[error("session buffers are not allocated")]
    NotAllocated,
}
