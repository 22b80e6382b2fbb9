// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The interpreter: lifecycle-guarded access to one execution session.
//!
//! An [`Interpreter`] owns a backend session and walks it through the
//! `Built → Allocated → Invoked` ladder, converting every out-of-order
//! call into [`Error::Lifecycle`] instead of undefined behavior. All
//! tensor access goes through index-resolved views; the interpreter hands
//! out no raw pointers and no long-lived references.

use crate::backend::BackendSession;
use crate::lifecycle::Stage;
use crate::tensor::{Side, Tensor, TensorMut};
use crate::{Error, Model};
use graph_engine::MemoryLimit;
use std::time::{Duration, Instant};

/// Build-time options for an [`Interpreter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InterpreterOptions {
    /// Upper bound on the session's total tensor buffer bytes. `None`
    /// means unlimited.
    pub memory_limit: Option<MemoryLimit>,
}

/// Invocation counters, updated by every successful [`Interpreter::invoke`].
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct InterpreterStats {
    /// Number of successful invocations.
    pub invocations: u64,
    /// Wall-clock duration of the most recent invocation.
    pub last_invoke: Option<Duration>,
    /// Cumulative wall-clock duration across all invocations.
    pub total_invoke: Duration,
}

/// Runs a [`Model`] and owns every tensor buffer involved.
///
/// # Lifecycle
///
/// A fresh interpreter is `Built`: the graph is bound to kernels but no
/// buffers exist, and all tensor access fails with [`Error::Lifecycle`].
/// [`allocate_tensors`](Interpreter::allocate_tensors) moves it to
/// `Allocated`; the first successful [`invoke`](Interpreter::invoke)
/// to `Invoked`. Output buffers hold meaningless zeros until then.
///
/// # Examples
///
/// ```no_run
/// use tinygraph::{Interpreter, Model, Value};
///
/// # fn main() -> Result<(), tinygraph::Error> {
/// let model = Model::from_file("model.tgrf")?;
/// let mut interp = Interpreter::new(&model)?;
/// interp.allocate_tensors()?;
/// interp.input_tensor_mut(0)?.set_data(&[Value::Float(1.0), Value::Float(0.0)])?;
/// interp.invoke()?;
/// let out = interp.output_tensor(0)?.data();
/// # let _ = out;
/// # Ok(())
/// # }
/// ```
pub struct Interpreter {
    model: Model,
    session: Box<dyn BackendSession>,
    stage: Stage,
    stats: InterpreterStats,
}

impl Interpreter {
    /// Builds an interpreter over `model` with default options.
    ///
    /// # Errors
    /// [`Error::InterpreterBuild`] if the backend cannot execute the
    /// model's graph.
    pub fn new(model: &Model) -> Result<Self, Error> {
        Self::with_options(model, InterpreterOptions::default())
    }

    /// Builds an interpreter with explicit options.
    pub fn with_options(model: &Model, options: InterpreterOptions) -> Result<Self, Error> {
        let session = model.backend_model().new_session(&options)?;
        tracing::debug!(
            "interpreter built over '{}' ({} inputs, {} outputs)",
            model.description(),
            session.input_count(),
            session.output_count(),
        );
        Ok(Self {
            model: model.clone(),
            session,
            stage: Stage::Built,
            stats: InterpreterStats::default(),
        })
    }

    /// Sizes and commits every tensor buffer and loads constant data.
    ///
    /// Idempotent: calling again after success is a no-op that preserves
    /// all buffer contents.
    ///
    /// # Errors
    /// [`Error::Allocation`] if a shape is still dynamic, sizes overflow,
    /// or the memory limit is exceeded. On failure the interpreter remains
    /// `Built` and owns no buffers.
    pub fn allocate_tensors(&mut self) -> Result<(), Error> {
        if self.stage.is_allocated() {
            return Ok(());
        }
        self.session.allocate()?;
        self.stage = Stage::Allocated;
        tracing::debug!("tensors allocated, stage is {}", self.stage);
        Ok(())
    }

    /// Runs the graph once on the calling thread.
    ///
    /// # Errors
    /// [`Error::Lifecycle`] before [`allocate_tensors`](Interpreter::allocate_tensors);
    /// [`Error::Invocation`] if execution fails. A failed invocation does
    /// not disturb allocation: inputs can be rewritten and the call
    /// retried.
    pub fn invoke(&mut self) -> Result<(), Error> {
        if !self.stage.is_allocated() {
            return Err(Error::Lifecycle {
                op: "invoke",
                stage: self.stage,
            });
        }
        let started = Instant::now();
        self.session.invoke()?;
        let elapsed = started.elapsed();

        self.stage = Stage::Invoked;
        self.stats.invocations += 1;
        self.stats.last_invoke = Some(elapsed);
        self.stats.total_invoke += elapsed;
        tracing::trace!(
            "invoke #{} took {:.3} ms",
            self.stats.invocations,
            elapsed.as_secs_f64() * 1000.0,
        );
        Ok(())
    }

    /// Number of input tensors; valid in every stage.
    pub fn input_tensor_count(&self) -> usize {
        self.session.input_count()
    }

    /// Number of output tensors; valid in every stage.
    pub fn output_tensor_count(&self) -> usize {
        self.session.output_count()
    }

    /// Read view of input tensor `index`.
    pub fn input_tensor(&self, index: usize) -> Result<Tensor<'_>, Error> {
        self.view(Side::Input, index, "input_tensor")
    }

    /// Write view of input tensor `index`.
    pub fn input_tensor_mut(&mut self, index: usize) -> Result<TensorMut<'_>, Error> {
        self.view_mut(Side::Input, index, "input_tensor_mut")
    }

    /// Read view of output tensor `index`.
    ///
    /// Reading before the first successful [`invoke`](Interpreter::invoke)
    /// is allowed but yields zeros, not results.
    pub fn output_tensor(&self, index: usize) -> Result<Tensor<'_>, Error> {
        self.view(Side::Output, index, "output_tensor")
    }

    /// Write view of output tensor `index`.
    ///
    /// Writing outputs is permitted; the next invocation overwrites them.
    pub fn output_tensor_mut(&mut self, index: usize) -> Result<TensorMut<'_>, Error> {
        self.view_mut(Side::Output, index, "output_tensor_mut")
    }

    /// The current lifecycle stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Invocation counters.
    pub fn stats(&self) -> InterpreterStats {
        self.stats
    }

    /// The model this interpreter runs.
    pub fn model(&self) -> &Model {
        &self.model
    }

    // Stage gate first: an out-of-range index before allocation still
    // reports the lifecycle problem, which is the one the caller must
    // fix first.
    fn check_access(&self, side: Side, index: usize, op: &'static str) -> Result<(), Error> {
        if !self.stage.is_allocated() {
            return Err(Error::Lifecycle {
                op,
                stage: self.stage,
            });
        }
        let count = match side {
            Side::Input => self.session.input_count(),
            Side::Output => self.session.output_count(),
        };
        if index >= count {
            return Err(Error::IndexOutOfRange {
                io: side,
                index,
                count,
            });
        }
        Ok(())
    }

    fn slot_info(&self, side: Side, index: usize) -> Result<tensor_core::TensorInfo, Error> {
        let info = match side {
            Side::Input => self.session.input_info(index),
            Side::Output => self.session.output_info(index),
        };
        info.ok_or_else(|| Error::Backend {
            detail: format!("{side} slot {index} has no metadata"),
        })
    }

    fn view(&self, side: Side, index: usize, op: &'static str) -> Result<Tensor<'_>, Error> {
        self.check_access(side, index, op)?;
        let info = self.slot_info(side, index)?;
        let bytes = match side {
            Side::Input => self.session.input_bytes(index),
            Side::Output => self.session.output_bytes(index),
        };
        let bytes = bytes.ok_or_else(|| Error::Backend {
            detail: format!("{side} slot {index} has no buffer after allocation"),
        })?;
        Ok(Tensor::new(info, bytes))
    }

    fn view_mut(
        &mut self,
        side: Side,
        index: usize,
        op: &'static str,
    ) -> Result<TensorMut<'_>, Error> {
        self.check_access(side, index, op)?;
        let info = self.slot_info(side, index)?;
        let bytes = match side {
            Side::Input => self.session.input_bytes_mut(index),
            Side::Output => self.session.output_bytes_mut(index),
        };
        let bytes = bytes.ok_or_else(|| Error::Backend {
            detail: format!("{side} slot {index} has no buffer after allocation"),
        })?;
        Ok(TensorMut::new(info, bytes))
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("stage", &self.stage)
            .field("inputs", &self.input_tensor_count())
            .field("outputs", &self.output_tensor_count())
            .field("invocations", &self.stats.invocations)
            .finish()
    }
}
