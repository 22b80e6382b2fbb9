// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tinygraph
//!
//! A script-host-facing inference binding: load a serialized model, build
//! an interpreter over it, write host values into input tensors, invoke,
//! and read host values back out. The binding owns every native resource,
//! enforces the `Built → Allocated → Invoked` lifecycle at runtime, and
//! turns every failure into a typed [`Error`] instead of a crash.
//!
//! Three handle types carry the whole API:
//!
//! - [`Model`] — shared, immutable ownership of a loaded model
//!   (`Arc`-backed; clone freely, drop in any order).
//! - [`Interpreter`] — owns one execution session and its tensor
//!   buffers; all mutation goes through `&mut self`.
//! - [`Tensor`] / [`TensorMut`] — borrowed views used to read and write
//!   buffer contents as [`Value`] sequences.
//!
//! The engine behind the binding is pluggable via [`backend`]; the
//! bundled default executes the TGRF format through `graph-engine`.
//!
//! # Examples
//!
//! ```
//! use model_format::{GraphBuilder, OpCode};
//! use tinygraph::{DType, Interpreter, Model, Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Author a one-op model: y = relu(x).
//! let mut b = GraphBuilder::new("relu demo");
//! let x = b.input("x", DType::F32, &[4]);
//! let y = b.tensor("y", DType::F32, &[4]);
//! b.op(OpCode::Relu, &[x], y);
//! b.output(y);
//!
//! let model = Model::from_bytes(b.finish()?)?;
//! let mut interp = Interpreter::new(&model)?;
//! interp.allocate_tensors()?;
//! interp.input_tensor_mut(0)?.set_data(&[
//!     Value::Float(-1.0),
//!     Value::Float(2.0),
//!     Value::Float(-3.0),
//!     Value::Float(4.0),
//! ])?;
//! interp.invoke()?;
//! assert_eq!(
//!     interp.output_tensor(0)?.data(),
//!     vec![
//!         Value::Float(0.0),
//!         Value::Float(2.0),
//!         Value::Float(0.0),
//!         Value::Float(4.0),
//!     ],
//! );
//! # Ok(())
//! # }
//! ```

pub mod backend;
mod error;
mod interpreter;
mod lifecycle;
mod model;
mod tensor;

pub use error::Error;
pub use interpreter::{Interpreter, InterpreterOptions, InterpreterStats};
pub use lifecycle::Stage;
pub use model::Model;
pub use tensor::{Side, Tensor, TensorMut};

// Vocabulary shared with the lower crates, re-exported so embedders need
// only this crate.
pub use graph_engine::MemoryLimit;
pub use tensor_core::{DType, Shape, TensorInfo, Value};
