// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The seam between the binding and an inference engine.
//!
//! The binding never interprets graph bytes itself; everything it needs
//! from an engine fits in three object-safe traits:
//!
//! - [`Backend`] — turns a model source (file or bytes) into a model.
//! - [`BackendModel`] — static metadata plus session construction.
//! - [`BackendSession`] — allocation, execution, and per-slot buffer
//!   access for one interpreter.
//!
//! [`EngineBackend`] adapts the bundled `graph-engine` crate to these
//! traits and is what [`Model::from_file`](crate::Model::from_file) uses.
//! Tests substitute their own implementations to inject failures.

use crate::interpreter::InterpreterOptions;
use crate::Error;
use graph_engine::{CompiledModel, Session};
use std::path::Path;
use std::sync::Arc;
use tensor_core::TensorInfo;

/// Loads models from their serialized form.
pub trait Backend: Send + Sync {
    /// A short identifier for logs.
    fn name(&self) -> &'static str;

    /// Loads a model from a file on disk.
    fn load_file(&self, path: &Path) -> Result<Arc<dyn BackendModel>, Error>;

    /// Loads a model from an in-memory byte buffer.
    fn load_bytes(&self, bytes: Vec<u8>) -> Result<Arc<dyn BackendModel>, Error>;
}

/// An immutable loaded model, shareable across interpreters and threads.
pub trait BackendModel: Send + Sync {
    /// Human-readable model description; may be empty.
    fn description(&self) -> String;

    /// Input tensor metadata, in binding order.
    fn input_specs(&self) -> Vec<TensorInfo>;

    /// Output tensor metadata, in binding order.
    fn output_specs(&self) -> Vec<TensorInfo>;

    /// Builds an execution session; fails if the engine cannot run this
    /// graph.
    fn new_session(&self, options: &InterpreterOptions)
        -> Result<Box<dyn BackendSession>, Error>;
}

/// One execution context with its own tensor buffers.
///
/// Buffer accessors return `None` before [`allocate`](BackendSession::allocate)
/// succeeds or for indices beyond the slot count; the binding turns those
/// into lifecycle and range errors before they reach a caller.
pub trait BackendSession: Send {
    /// Commits tensor buffers; must be all-or-nothing and idempotent.
    fn allocate(&mut self) -> Result<(), Error>;

    /// Runs the graph once, synchronously.
    fn invoke(&mut self) -> Result<(), Error>;

    /// Number of input slots; valid before allocation.
    fn input_count(&self) -> usize;

    /// Number of output slots; valid before allocation.
    fn output_count(&self) -> usize;

    /// Metadata for input slot `index`.
    fn input_info(&self, index: usize) -> Option<TensorInfo>;

    /// Metadata for output slot `index`.
    fn output_info(&self, index: usize) -> Option<TensorInfo>;

    /// Read access to the buffer behind input slot `index`.
    fn input_bytes(&self, index: usize) -> Option<&[u8]>;

    /// Read access to the buffer behind output slot `index`.
    fn output_bytes(&self, index: usize) -> Option<&[u8]>;

    /// Write access to the buffer behind input slot `index`.
    fn input_bytes_mut(&mut self, index: usize) -> Option<&mut [u8]>;

    /// Write access to the buffer behind output slot `index`.
    fn output_bytes_mut(&mut self, index: usize) -> Option<&mut [u8]>;
}

impl std::fmt::Debug for dyn BackendModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendModel")
            .field("description", &self.description())
            .finish()
    }
}

// ── Bundled engine adapter ─────────────────────────────────────────

/// The default backend: the in-process `graph-engine` TGRF executor.
pub struct EngineBackend;

impl Backend for EngineBackend {
    fn name(&self) -> &'static str {
        "graph-engine"
    }

    fn load_file(&self, path: &Path) -> Result<Arc<dyn BackendModel>, Error> {
        let model = CompiledModel::from_file(path).map_err(|e| Error::ModelLoad {
            detail: e.to_string(),
        })?;
        Ok(Arc::new(EngineModel {
            model: Arc::new(model),
        }))
    }

    fn load_bytes(&self, bytes: Vec<u8>) -> Result<Arc<dyn BackendModel>, Error> {
        let model = CompiledModel::from_bytes(bytes).map_err(|e| Error::ModelLoad {
            detail: e.to_string(),
        })?;
        Ok(Arc::new(EngineModel {
            model: Arc::new(model),
        }))
    }
}

struct EngineModel {
    model: Arc<CompiledModel>,
}

impl BackendModel for EngineModel {
    fn description(&self) -> String {
        self.model.description().to_string()
    }

    fn input_specs(&self) -> Vec<TensorInfo> {
        self.model.input_infos()
    }

    fn output_specs(&self) -> Vec<TensorInfo> {
        self.model.output_infos()
    }

    fn new_session(
        &self,
        options: &InterpreterOptions,
    ) -> Result<Box<dyn BackendSession>, Error> {
        let session = Session::with_limit(Arc::clone(&self.model), options.memory_limit)
            .map_err(|source| Error::InterpreterBuild { source })?;
        Ok(Box::new(EngineSession { session }))
    }
}

struct EngineSession {
    session: Session,
}

impl EngineSession {
    /// Maps an IO slot index to the graph's tensor table index.
    fn slot(&self, side_inputs: bool, index: usize) -> Option<usize> {
        let graph = self.session.model().graph();
        let list = if side_inputs {
            &graph.inputs
        } else {
            &graph.outputs
        };
        list.get(index).copied()
    }
}

impl BackendSession for EngineSession {
    fn allocate(&mut self) -> Result<(), Error> {
        self.session
            .allocate()
            .map(|_| ())
            .map_err(|source| Error::Allocation { source })
    }

    fn invoke(&mut self) -> Result<(), Error> {
        self.session
            .invoke()
            .map(|_| ())
            .map_err(|source| Error::Invocation { source })
    }

    fn input_count(&self) -> usize {
        self.session.model().graph().inputs.len()
    }

    fn output_count(&self) -> usize {
        self.session.model().graph().outputs.len()
    }

    fn input_info(&self, index: usize) -> Option<TensorInfo> {
        let t = self.slot(true, index)?;
        Some(self.session.model().graph().tensors[t].info())
    }

    fn output_info(&self, index: usize) -> Option<TensorInfo> {
        let t = self.slot(false, index)?;
        Some(self.session.model().graph().tensors[t].info())
    }

    fn input_bytes(&self, index: usize) -> Option<&[u8]> {
        let t = self.slot(true, index)?;
        Some(self.session.buffer(t)?.as_bytes())
    }

    fn output_bytes(&self, index: usize) -> Option<&[u8]> {
        let t = self.slot(false, index)?;
        Some(self.session.buffer(t)?.as_bytes())
    }

    fn input_bytes_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        let t = self.slot(true, index)?;
        Some(self.session.buffer_mut(t)?.as_bytes_mut())
    }

    fn output_bytes_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        let t = self.slot(false, index)?;
        Some(self.session.buffer_mut(t)?.as_bytes_mut())
    }
}
