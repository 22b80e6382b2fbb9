// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Shared tensor vocabulary for the tinygraph inference stack.
//!
//! This crate provides:
//! - [`DType`] — supported element data types (float32, int32, int64, uint8, int8, bool).
//! - [`Shape`] — row-major shape descriptors with overflow-checked sizing.
//! - [`Value`] — the dynamically typed host-side scalar.
//! - [`TensorInfo`] — name/dtype/shape metadata for a tensor slot.
//! - [`marshal`] — explicit conversion between `Value` sequences and typed
//!   byte buffers, with per-dtype representability rules.
//!
//! # Design Goals
//! - No tensor storage here: buffers are owned by whoever runs the graph,
//!   this crate only describes and marshals them.
//! - Every narrowing conversion is explicit and checked; nothing coerces
//!   silently.
//! - Clean error types via `thiserror`.

mod dtype;
mod error;
mod info;
pub mod marshal;
mod shape;
mod value;

pub use dtype::DType;
pub use error::MarshalError;
pub use info::TensorInfo;
pub use shape::Shape;
pub use value::Value;
