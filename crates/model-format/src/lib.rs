// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-format
//!
//! The TGRF ("tiny graph") binary model format: a flat, little-endian
//! container for small inference graphs.
//!
//! A TGRF file holds:
//! - a tensor table (name, dtype, shape, optional constant data location),
//! - input and output binding lists,
//! - an op sequence in execution order (each op produces one tensor),
//! - a trailing data segment with the constant payloads.
//!
//! This crate provides:
//! - [`GraphDef`] — the decoded graph, with a **type-state pattern**
//!   (`Parsed` → `Checked`) so only validated graphs reach the engine.
//! - [`read_graph`] / [`decode`] — bounds-checked decoding. Constant data
//!   is never copied; the graph records offsets into the source buffer.
//! - [`GraphBuilder`] — authoring and encoding.
//!
//! # Example
//! ```
//! use model_format::{read_graph, GraphBuilder, OpCode};
//! use tensor_core::DType;
//!
//! let mut b = GraphBuilder::new("single relu");
//! let x = b.input("x", DType::F32, &[1, 4]);
//! let y = b.tensor("y", DType::F32, &[1, 4]);
//! b.op(OpCode::Relu, &[x], y);
//! b.output(y);
//! let bytes = b.finish().unwrap();
//!
//! let graph = read_graph(&bytes).unwrap();
//! assert_eq!(graph.num_ops(), 1);
//! ```

mod error;
pub mod graph;
mod reader;
pub(crate) mod wire;
mod writer;

pub use error::FormatError;
pub use graph::{Checked, DataRegion, GraphDef, OpCode, OpDef, Parsed, TensorDef};
pub use reader::{decode, read_graph};
pub use wire::{FORMAT_VERSION, MAX_RANK};
pub use writer::GraphBuilder;
