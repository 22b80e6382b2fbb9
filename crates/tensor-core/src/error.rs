// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for value marshalling.

use crate::{DType, Value};

/// Errors that can occur while converting between host values and a typed
/// tensor buffer.
///
/// Marshalling is atomic: when any variant is returned, the destination
/// buffer is guaranteed untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarshalError {
    /// The number of host values does not match the buffer's element count.
    #[error("value count mismatch: buffer holds {expected} elements, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    /// A host value has no exact representation in the target dtype
    /// (wrong class, fractional where an integer is required, or out of
    /// the type's range).
    #[error("cannot represent {value} ({kind}) as {dtype}", kind = .value.kind())]
    NotRepresentable { value: Value, dtype: DType },
}
