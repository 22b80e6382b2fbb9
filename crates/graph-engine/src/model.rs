// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Compiled models: a validated graph plus the bytes it points into.
//!
//! [`CompiledModel`] pairs a [`GraphDef`] with the raw model bytes so that
//! constant tensor payloads can be sliced straight out of the file. Loading
//! from disk uses `memmap2`, so a multi-megabyte weight segment costs no
//! copy and no heap until a session allocates buffers.

use crate::EngineError;
use model_format::{Checked, DataRegion, GraphDef};
use std::path::Path;
use tensor_core::TensorInfo;

/// Backing storage for model bytes.
enum ModelData {
    /// Bytes held in memory, e.g. built by a tool or received over a socket.
    Owned(Vec<u8>),
    /// Memory-mapped file contents.
    Mapped(memmap2::Mmap),
}

impl ModelData {
    fn bytes(&self) -> &[u8] {
        match self {
            Self::Owned(v) => v,
            Self::Mapped(m) => m,
        }
    }
}

/// A parsed, validated model ready for session creation.
///
/// The graph structure lives on the heap; constant tensor data stays in the
/// original bytes (owned or memory-mapped) and is only copied into working
/// buffers when a session allocates.
///
/// `CompiledModel` is cheap to share behind an `Arc`; it is immutable after
/// construction.
pub struct CompiledModel {
    graph: GraphDef<Checked>,
    data: ModelData,
}

impl CompiledModel {
    /// Loads and validates a model file via mmap.
    ///
    /// # Errors
    /// Returns [`EngineError::Read`] if the file cannot be opened or
    /// mapped, and [`EngineError::Format`] if the bytes are not a valid
    /// model.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| EngineError::Read {
            detail: format!("cannot open '{}': {e}", path.display()),
        })?;
        // SAFETY: the map is read-only and lives as long as `self`; callers
        // must not truncate the file while the model is in use.
        let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| EngineError::Read {
            detail: format!("mmap of '{}' failed: {e}", path.display()),
        })?;
        let graph = model_format::read_graph(&mmap)?;
        tracing::info!("loaded '{}': {}", path.display(), graph.summary());
        Ok(Self {
            graph,
            data: ModelData::Mapped(mmap),
        })
    }

    /// Parses and validates a model from in-memory bytes.
    ///
    /// The buffer is kept alive inside the model so constant regions remain
    /// addressable.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, EngineError> {
        let graph = model_format::read_graph(&bytes)?;
        tracing::debug!("loaded from memory: {}", graph.summary());
        Ok(Self {
            graph,
            data: ModelData::Owned(bytes),
        })
    }

    /// The validated graph.
    pub fn graph(&self) -> &GraphDef<Checked> {
        &self.graph
    }

    /// The model description string; may be empty.
    pub fn description(&self) -> &str {
        &self.graph.description
    }

    /// Metadata for the graph inputs, in binding order.
    pub fn input_infos(&self) -> Vec<TensorInfo> {
        self.graph.input_infos()
    }

    /// Metadata for the graph outputs, in binding order.
    pub fn output_infos(&self) -> Vec<TensorInfo> {
        self.graph.output_infos()
    }

    /// The raw data segment holding all constant payloads.
    pub fn data_segment(&self) -> &[u8] {
        // Validation pinned the segment inside the byte buffer.
        &self.data.bytes()[self.graph.data_offset..][..self.graph.data_len]
    }

    /// The bytes of one constant region within the data segment.
    pub fn const_bytes(&self, region: DataRegion) -> &[u8] {
        &self.data_segment()[region.offset..][..region.len]
    }

    /// One-line summary for logs and tooling.
    pub fn summary(&self) -> String {
        self.graph.summary()
    }
}

impl std::fmt::Debug for CompiledModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledModel")
            .field("graph", &self.graph.summary())
            .field("bytes", &self.data.bytes().len())
            .finish()
    }
}
