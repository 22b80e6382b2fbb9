// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Execution sessions: buffer allocation and op dispatch over a compiled
//! model.
//!
//! A [`Session`] resolves every op to a kernel at construction time and
//! rejects graphs the kernel set cannot execute. Buffer allocation is a
//! separate, explicit step so callers control when memory is committed,
//! and it is all-or-nothing: a failed allocation leaves the session with
//! no buffers at all.

use crate::kernels::{kernel_for, Kernel};
use crate::{CompiledModel, EngineError, MemoryLimit, TensorData};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Timing and progress counters for one [`Session::invoke`] call.
#[derive(Debug, Clone, Copy)]
pub struct InvokeStats {
    /// Number of ops that ran to completion.
    pub ops_executed: usize,
    /// Wall-clock time spent inside the op loop.
    pub elapsed: Duration,
}

/// A single-threaded execution session over a shared [`CompiledModel`].
///
/// The session owns one working buffer per graph tensor once
/// [`allocate`](Session::allocate) has run. Several sessions may share one
/// model; each gets its own buffers.
pub struct Session {
    model: Arc<CompiledModel>,
    kernels: Vec<&'static dyn Kernel>,
    limit: Option<MemoryLimit>,
    buffers: Option<Vec<TensorData>>,
}

impl Session {
    /// Builds a session with no memory limit.
    ///
    /// # Errors
    /// Returns [`EngineError::Unsupported`] if an op has no registered
    /// kernel, or the kernel's own error if an op's operand dtypes or
    /// shapes are inconsistent.
    pub fn new(model: Arc<CompiledModel>) -> Result<Self, EngineError> {
        Self::with_limit(model, None)
    }

    /// Builds a session that refuses to allocate more than `limit` bytes
    /// of working buffers.
    pub fn with_limit(
        model: Arc<CompiledModel>,
        limit: Option<MemoryLimit>,
    ) -> Result<Self, EngineError> {
        let graph = model.graph();
        let mut kernels = Vec::with_capacity(graph.num_ops());
        for (index, op) in graph.ops.iter().enumerate() {
            let kernel = kernel_for(op.opcode).ok_or_else(|| EngineError::Unsupported {
                index,
                opcode: op.opcode.to_string(),
            })?;
            let inputs: Vec<_> = op.inputs.iter().map(|&t| &graph.tensors[t]).collect();
            kernel.check(&inputs, &graph.tensors[op.output])?;
            kernels.push(kernel);
        }
        tracing::debug!("session ready: {} ops bound to kernels", kernels.len());
        Ok(Self {
            model,
            kernels,
            limit,
            buffers: None,
        })
    }

    /// Allocates one working buffer per graph tensor and fills constants.
    ///
    /// Calling this on an already-allocated session is a no-op; existing
    /// buffer contents are preserved. Returns the total buffer bytes held
    /// by the session.
    ///
    /// # Errors
    /// Fails without allocating anything if a tensor still has a dynamic
    /// dimension, the total size overflows, or the configured
    /// [`MemoryLimit`] would be exceeded.
    pub fn allocate(&mut self) -> Result<usize, EngineError> {
        if self.buffers.is_some() {
            return Ok(self.arena_bytes());
        }
        let graph = self.model.graph();

        // Size everything up front so failure cannot leave partial state.
        let mut total = 0usize;
        for t in &graph.tensors {
            if t.shape.has_dynamic_dim() {
                return Err(EngineError::UnresolvedShape {
                    name: t.name.clone(),
                    shape: t.shape.clone(),
                });
            }
            let bytes = t.shape.checked_size_bytes(t.dtype).ok_or_else(|| {
                EngineError::SizeOverflow {
                    detail: format!("tensor '{}' of shape {}", t.name, t.shape),
                }
            })?;
            total = total
                .checked_add(bytes)
                .ok_or_else(|| EngineError::SizeOverflow {
                    detail: "total buffer size".into(),
                })?;
        }
        if let Some(limit) = self.limit {
            if total > limit.as_bytes() {
                return Err(EngineError::LimitExceeded {
                    required: total,
                    limit,
                });
            }
        }

        let mut buffers = Vec::with_capacity(graph.num_tensors());
        for t in &graph.tensors {
            let buf = match t.constant {
                Some(region) => {
                    TensorData::from_le_bytes(t.dtype, self.model.const_bytes(region))
                }
                None => TensorData::zeros(t.dtype, t.shape.num_elements()),
            };
            buffers.push(buf);
        }
        self.buffers = Some(buffers);
        tracing::debug!(
            "allocated {} buffers ({} bytes) for '{}'",
            graph.num_tensors(),
            total,
            self.model.description(),
        );
        Ok(total)
    }

    /// Runs every op in graph order.
    ///
    /// Input buffers must have been written beforehand via
    /// [`buffer_mut`](Session::buffer_mut); results land in the output
    /// tensors' buffers. On error the session stays allocated and a later
    /// retry is permitted.
    ///
    /// # Errors
    /// Returns [`EngineError::NotAllocated`] before allocation, and
    /// [`EngineError::NumericFault`] if an op produces a NaN or infinite
    /// float value.
    pub fn invoke(&mut self) -> Result<InvokeStats, EngineError> {
        let graph = self.model.graph();
        let buffers = self.buffers.as_mut().ok_or(EngineError::NotAllocated)?;

        let start = Instant::now();
        for (index, (op, kernel)) in graph.ops.iter().zip(&self.kernels).enumerate() {
            // Validation guarantees an op never reads its own output, so the
            // output buffer can be taken out while inputs stay borrowed.
            let mut out = std::mem::take(&mut buffers[op.output]);
            let inputs: Vec<&TensorData> =
                op.inputs.iter().map(|&t| &buffers[t]).collect();
            let out_shape = &graph.tensors[op.output].shape;
            let result = kernel.run(&inputs, &mut out, out_shape);
            drop(inputs);
            buffers[op.output] = out;
            result?;

            if let Some(vals) = buffers[op.output].as_f32() {
                if let Some(&bad) = vals.iter().find(|v| !v.is_finite()) {
                    return Err(EngineError::NumericFault {
                        index,
                        op: op.opcode.as_str(),
                        detail: format!("produced {bad}"),
                    });
                }
            }
        }
        let stats = InvokeStats {
            ops_executed: graph.num_ops(),
            elapsed: start.elapsed(),
        };
        tracing::trace!(
            "invoke: {} ops in {:.3} ms",
            stats.ops_executed,
            stats.elapsed.as_secs_f64() * 1000.0,
        );
        Ok(stats)
    }

    /// Returns `true` once buffers exist.
    pub fn is_allocated(&self) -> bool {
        self.buffers.is_some()
    }

    /// Total bytes currently held in working buffers.
    pub fn arena_bytes(&self) -> usize {
        self.buffers
            .as_ref()
            .map(|b| b.iter().map(TensorData::byte_len).sum())
            .unwrap_or(0)
    }

    /// The buffer for tensor `index`, or `None` before allocation or for a
    /// bad index.
    pub fn buffer(&self, index: usize) -> Option<&TensorData> {
        self.buffers.as_ref()?.get(index)
    }

    /// Mutable access to the buffer for tensor `index`.
    pub fn buffer_mut(&mut self, index: usize) -> Option<&mut TensorData> {
        self.buffers.as_mut()?.get_mut(index)
    }

    /// The model this session executes.
    pub fn model(&self) -> &CompiledModel {
        &self.model
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("ops", &self.kernels.len())
            .field("allocated", &self.is_allocated())
            .field("arena_bytes", &self.arena_bytes())
            .finish()
    }
}
