// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-tensor metadata.

use crate::{DType, Shape};

/// Static metadata describing one tensor: its name, element type, and shape.
///
/// `TensorInfo` carries no data. It is fixed when a model is parsed and
/// never changes afterwards; buffer sizes are derived from it at allocation
/// time.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TensorInfo {
    /// Tensor name as recorded in the model (may be empty).
    pub name: String,
    /// Element data type.
    pub dtype: DType,
    /// Dimensions.
    pub shape: Shape,
}

impl TensorInfo {
    /// Creates metadata from parts.
    pub fn new(name: impl Into<String>, dtype: DType, shape: Shape) -> Self {
        Self {
            name: name.into(),
            dtype,
            shape,
        }
    }

    /// Number of elements the tensor holds.
    pub fn element_count(&self) -> usize {
        self.shape.num_elements()
    }

    /// Buffer size in bytes.
    pub fn byte_len(&self) -> usize {
        self.shape.size_bytes(self.dtype)
    }

    /// Concise one-line description for logs and CLI tables.
    pub fn summary(&self) -> String {
        format!(
            "{} {} {} ({} B)",
            if self.name.is_empty() { "<unnamed>" } else { &self.name },
            self.dtype,
            self.shape,
            self.byte_len(),
        )
    }
}
