// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The binding's error taxonomy.
//!
//! Every failure an embedding host can cause maps to its own variant, so a
//! host language binding can surface each as a distinct exception type.
//! Engine-originated failures keep their [`EngineError`] as `source()`.

use crate::lifecycle::Stage;
use crate::tensor::Side;
use graph_engine::EngineError;
use tensor_core::{DType, Shape, Value};

/// Errors surfaced by [`Model`](crate::Model), [`Interpreter`](crate::Interpreter)
/// and the tensor views.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The model source could not be read or parsed (bad magic, truncated
    /// bytes, unsupported version, invalid graph).
    #[error("model load failed: {detail}")]
    ModelLoad { detail: String },

    /// The engine cannot execute this graph (unsupported op, dtype, or
    /// operand shapes).
    #[error("interpreter build failed: {source}")]
    InterpreterBuild { source: EngineError },

    /// Tensor buffers could not be sized or committed; the interpreter
    /// stays in `Built`.
    #[error("tensor allocation failed: {source}")]
    Allocation { source: EngineError },

    /// An operation ran ahead of the lifecycle ladder.
    #[error("{op}() requires allocated tensors (stage is {stage}); call allocate_tensors() first")]
    Lifecycle { op: &'static str, stage: Stage },

    /// A tensor index beyond the model's input or output count.
    #[error("{io} tensor index {index} out of range ({count} tensors)")]
    IndexOutOfRange {
        io: Side,
        index: usize,
        count: usize,
    },

    /// A value sequence whose length does not match the tensor's element
    /// count. The tensor buffer is untouched.
    #[error("shape {shape} takes {expected} values, got {got}")]
    ShapeMismatch {
        shape: Shape,
        expected: usize,
        got: usize,
    },

    /// A host value that cannot be represented in the tensor's dtype. The
    /// tensor buffer is untouched.
    #[error("value {value} is not representable as {dtype}")]
    DTypeConversion { value: Value, dtype: DType },

    /// The engine failed mid-execution. Buffers stay allocated; rewrite
    /// the inputs and retry.
    #[error("invocation failed: {source}")]
    Invocation { source: EngineError },

    /// A backend returned data inconsistent with its own metadata. Not
    /// reachable through the bundled engine.
    #[error("backend contract violation: {detail}")]
    Backend { detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_lifecycle_message_names_the_remedy() {
        let err = Error::Lifecycle {
            op: "invoke",
            stage: Stage::Built,
        };
        let text = err.to_string();
        assert!(text.contains("invoke()"));
        assert!(text.contains("allocate_tensors()"));
        assert!(text.contains("built"));
    }

    #[test]
    fn test_index_message_carries_direction() {
        let err = Error::IndexOutOfRange {
            io: Side::Output,
            index: 3,
            count: 1,
        };
        assert_eq!(
            err.to_string(),
            "output tensor index 3 out of range (1 tensors)"
        );
    }

    #[test]
    fn test_shape_mismatch_message() {
        let err = Error::ShapeMismatch {
            shape: Shape::new(vec![7]),
            expected: 7,
            got: 3,
        };
        assert_eq!(err.to_string(), "shape [7] takes 7 values, got 3");
    }

    #[test]
    fn test_conversion_message() {
        let err = Error::DTypeConversion {
            value: Value::Float(1.5),
            dtype: DType::I32,
        };
        assert!(err.to_string().contains("int32"));
    }

    #[test]
    fn test_engine_source_is_chained() {
        let err = Error::Invocation {
            source: EngineError::NotAllocated,
        };
        assert!(err.source().is_some());
    }
}
