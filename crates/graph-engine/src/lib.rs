// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # graph-engine
//!
//! Single-threaded execution engine for TGRF model graphs.
//!
//! The engine takes a byte stream (file or memory) through three layers:
//!
//! - [`CompiledModel`] — parses and validates the graph via `model-format`,
//!   keeping the raw bytes alive (mmap for files) so constant tensors need
//!   no copy until a session wants them.
//! - [`Session`] — binds every op to a [`kernels::Kernel`], allocates one
//!   working buffer per tensor, and runs the op sequence in graph order.
//! - [`TensorData`] — the dtype-tagged buffers those kernels read and
//!   write.
//!
//! Sessions are independent: many can share one model behind an `Arc`,
//! each with its own buffers. There is no thread pool and no async; one
//! `invoke` call runs one inference on the calling thread.

mod error;
pub mod kernels;
mod limit;
mod model;
mod session;
mod tensor_data;

pub use error::EngineError;
pub use limit::MemoryLimit;
pub use model::CompiledModel;
pub use session::{InvokeStats, Session};
pub use tensor_data::TensorData;
