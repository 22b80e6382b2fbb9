// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The model handle: shared ownership of one loaded model.

use crate::backend::{Backend, BackendModel, EngineBackend};
use crate::Error;
use std::path::Path;
use std::sync::Arc;
use tensor_core::TensorInfo;

/// An immutable loaded model.
///
/// Cloning is cheap and shares the parsed graph; the underlying engine
/// resources (including any file mapping) are released when the last
/// clone and the last [`Interpreter`](crate::Interpreter) built from it
/// are dropped. Dropping the `Model` first is safe: interpreters keep
/// their own reference.
#[derive(Clone)]
pub struct Model {
    inner: Arc<dyn BackendModel>,
}

impl Model {
    /// Loads a model file with the bundled engine.
    ///
    /// # Errors
    /// [`Error::ModelLoad`] if the file is unreadable or its bytes are
    /// not a valid model (bad magic, truncation, unsupported version,
    /// inconsistent graph).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_file_with(path, &EngineBackend)
    }

    /// Loads a model from in-memory bytes with the bundled engine.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Error> {
        Self::from_bytes_with(bytes, &EngineBackend)
    }

    /// Loads a model file through a caller-chosen backend.
    pub fn from_file_with(path: impl AsRef<Path>, backend: &dyn Backend) -> Result<Self, Error> {
        let inner = backend.load_file(path.as_ref())?;
        Ok(Self { inner })
    }

    /// Loads in-memory bytes through a caller-chosen backend.
    pub fn from_bytes_with(bytes: Vec<u8>, backend: &dyn Backend) -> Result<Self, Error> {
        let inner = backend.load_bytes(bytes)?;
        Ok(Self { inner })
    }

    /// Human-readable model description; may be empty.
    pub fn description(&self) -> String {
        self.inner.description()
    }

    /// Input tensor metadata, in binding order. Available without an
    /// interpreter.
    pub fn input_specs(&self) -> Vec<TensorInfo> {
        self.inner.input_specs()
    }

    /// Output tensor metadata, in binding order.
    pub fn output_specs(&self) -> Vec<TensorInfo> {
        self.inner.output_specs()
    }

    pub(crate) fn backend_model(&self) -> &dyn BackendModel {
        self.inner.as_ref()
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("description", &self.description())
            .field("inputs", &self.input_specs().len())
            .field("outputs", &self.output_specs().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_bad_magic() {
        let err = Model::from_bytes(b"XXXX garbage".to_vec()).unwrap_err();
        assert!(matches!(err, Error::ModelLoad { .. }));
    }

    #[test]
    fn test_from_bytes_truncated() {
        let err = Model::from_bytes(b"TGRF".to_vec()).unwrap_err();
        assert!(matches!(err, Error::ModelLoad { .. }));
    }

    #[test]
    fn test_from_file_unreadable() {
        let err = Model::from_file("/no/such/dir/model.tgrf").unwrap_err();
        assert!(matches!(err, Error::ModelLoad { .. }));
    }
}
