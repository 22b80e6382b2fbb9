// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Graph definition: tensors, ops, and the validation state machine.
//!
//! # Type-State Pattern
//!
//! A decoded graph transitions through states enforced at compile time:
//!
//! ```text
//! GraphDef<Parsed>   — structure decoded, not yet checked.
//!       │  .validate()
//!       ▼
//! GraphDef<Checked>  — indices, producers, and data regions verified.
//! ```
//!
//! This prevents the execution engine from ever compiling an inconsistent
//! graph. The transition consumes the old state and returns the new one, so
//! there is zero runtime cost — the marker types are `PhantomData` (ZST).

use crate::FormatError;
use std::fmt;
use tensor_core::{DType, Shape, TensorInfo};

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: graph has been decoded but not validated.
#[derive(Debug, Clone)]
pub struct Parsed;

/// Marker: graph has been validated and is ready for compilation.
#[derive(Debug, Clone)]
pub struct Checked;

/// Sealed trait for graph states.
pub trait GraphState: fmt::Debug + Clone {}
impl GraphState for Parsed {}
impl GraphState for Checked {}

// ── Op codes ───────────────────────────────────────────────────────

/// The kind of computation an op performs.
///
/// Every op consumes a fixed number of input tensors and produces exactly
/// one output tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    /// Dense projection: `y = x · Wᵀ + b`, weights stored `[out, in]`.
    FullyConnected,
    /// Element-wise addition of two same-shape tensors.
    Add,
    /// Element-wise multiplication of two same-shape tensors.
    Mul,
    /// Element-wise `max(x, 0)`.
    Relu,
    /// Element-wise hyperbolic tangent.
    Tanh,
    /// Element-wise logistic sigmoid `1 / (1 + e^-x)`.
    Logistic,
    /// Softmax over the last dimension.
    Softmax,
    /// Element-wise dtype conversion.
    Cast,
}

impl OpCode {
    /// Decodes an opcode from its wire byte.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::FullyConnected),
            2 => Some(Self::Add),
            3 => Some(Self::Mul),
            4 => Some(Self::Relu),
            5 => Some(Self::Tanh),
            6 => Some(Self::Logistic),
            7 => Some(Self::Softmax),
            8 => Some(Self::Cast),
            _ => None,
        }
    }

    /// Returns the wire byte for this opcode.
    pub fn code(self) -> u8 {
        match self {
            Self::FullyConnected => 1,
            Self::Add => 2,
            Self::Mul => 3,
            Self::Relu => 4,
            Self::Tanh => 5,
            Self::Logistic => 6,
            Self::Softmax => 7,
            Self::Cast => 8,
        }
    }

    /// Parses an opcode from a tooling string.
    ///
    /// Accepts both snake_case (`"fully_connected"`) and common aliases
    /// (`"fc"`, `"dense"`, `"sigmoid"`).
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fully_connected" | "fc" | "dense" | "linear" => Some(Self::FullyConnected),
            "add" => Some(Self::Add),
            "mul" | "multiply" => Some(Self::Mul),
            "relu" => Some(Self::Relu),
            "tanh" => Some(Self::Tanh),
            "logistic" | "sigmoid" => Some(Self::Logistic),
            "softmax" => Some(Self::Softmax),
            "cast" => Some(Self::Cast),
            _ => None,
        }
    }

    /// Returns a human-readable label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullyConnected => "fully_connected",
            Self::Add => "add",
            Self::Mul => "mul",
            Self::Relu => "relu",
            Self::Tanh => "tanh",
            Self::Logistic => "logistic",
            Self::Softmax => "softmax",
            Self::Cast => "cast",
        }
    }

    /// Number of input tensors this op consumes.
    pub fn num_inputs(self) -> usize {
        match self {
            Self::FullyConnected => 3, // activation, weights, bias
            Self::Add | Self::Mul => 2,
            Self::Relu | Self::Tanh | Self::Logistic | Self::Softmax | Self::Cast => 1,
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Tensor and op entries ──────────────────────────────────────────

/// Location of a constant tensor's payload within the data segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataRegion {
    /// Byte offset relative to the start of the data segment.
    pub offset: usize,
    /// Payload length in bytes.
    pub len: usize,
}

/// Metadata describing one tensor slot in the graph.
///
/// A `TensorDef` does not own tensor data. Constant tensors store a
/// [`DataRegion`] pointing into the file's data segment; the bytes stay in
/// the (possibly memory-mapped) file until a session allocates buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorDef {
    /// Tensor name; may be empty.
    pub name: String,
    /// Element data type.
    pub dtype: DType,
    /// Row-major shape. A dimension of 0 is a placeholder for a size
    /// unknown at authoring time.
    pub shape: Shape,
    /// Constant payload location, if this tensor carries baked-in data.
    pub constant: Option<DataRegion>,
}

impl TensorDef {
    /// Returns `true` if this tensor carries constant data.
    pub fn is_constant(&self) -> bool {
        self.constant.is_some()
    }

    /// Returns the name/dtype/shape metadata for this slot.
    pub fn info(&self) -> TensorInfo {
        TensorInfo::new(self.name.clone(), self.dtype, self.shape.clone())
    }
}

/// One computation step in the graph.
///
/// Ops execute in file order; input tensors index into the graph's tensor
/// table and must be produced before use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpDef {
    /// The kind of computation.
    pub opcode: OpCode,
    /// Indices of the consumed tensors.
    pub inputs: Vec<usize>,
    /// Index of the produced tensor.
    pub output: usize,
}

// ── GraphDef ───────────────────────────────────────────────────────

/// A complete inference graph: tensor table, IO lists, and op sequence.
///
/// The generic parameter `S` encodes the validation state at compile time.
/// Constant tensor payloads are not stored here, only their locations: the
/// caller keeps the file bytes alive and slices the data segment using
/// [`GraphDef::data_offset`].
#[derive(Debug, Clone)]
pub struct GraphDef<S: GraphState = Parsed> {
    /// Human-readable model description; may be empty.
    pub description: String,
    /// All tensor slots, indexed by position.
    pub tensors: Vec<TensorDef>,
    /// Indices of the graph's input tensors, in binding order.
    pub inputs: Vec<usize>,
    /// Indices of the graph's output tensors, in binding order.
    pub outputs: Vec<usize>,
    /// Ops in execution order.
    pub ops: Vec<OpDef>,
    /// Absolute byte offset of the data segment payload in the source file.
    pub data_offset: usize,
    /// Length of the data segment payload in bytes.
    pub data_len: usize,
    /// State marker (zero-sized, compile-time only).
    _state: std::marker::PhantomData<S>,
}

// ── Parsed state ───────────────────────────────────────────────────

impl GraphDef<Parsed> {
    /// Creates a new graph in the `Parsed` state.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        description: String,
        tensors: Vec<TensorDef>,
        inputs: Vec<usize>,
        outputs: Vec<usize>,
        ops: Vec<OpDef>,
        data_offset: usize,
        data_len: usize,
    ) -> Self {
        Self {
            description,
            tensors,
            inputs,
            outputs,
            ops,
            data_offset,
            data_len,
            _state: std::marker::PhantomData,
        }
    }

    /// Validates the graph and transitions to the `Checked` state.
    ///
    /// # Checks
    /// - The tensor table is non-empty and every tensor's byte size fits
    ///   in `usize`.
    /// - Constant data regions lie within the data segment and match their
    ///   tensor's byte size exactly; constant shapes are fully known.
    /// - Input and output lists are non-empty, in range, and free of
    ///   duplicates; inputs do not carry constant data.
    /// - Every op has the arity its opcode demands, reads only tensors
    ///   already produced (graph input, constant, or earlier op output),
    ///   and writes a tensor nothing else produces.
    /// - Every graph output is produced by something.
    pub fn validate(self) -> Result<GraphDef<Checked>, FormatError> {
        if self.tensors.is_empty() {
            return Err(FormatError::InvalidGraph(
                "graph defines no tensors".into(),
            ));
        }
        let n = self.tensors.len();

        for (i, t) in self.tensors.iter().enumerate() {
            let size = t.shape.checked_size_bytes(t.dtype).ok_or_else(|| {
                FormatError::InvalidTensor {
                    index: i,
                    detail: format!("byte size of shape {} overflows usize", t.shape),
                }
            })?;
            if let Some(region) = t.constant {
                if t.shape.has_dynamic_dim() {
                    return Err(FormatError::InvalidTensor {
                        index: i,
                        detail: format!(
                            "constant tensor '{}' has a dynamic dimension",
                            t.name
                        ),
                    });
                }
                let end = region.offset.checked_add(region.len).ok_or_else(|| {
                    FormatError::InvalidTensor {
                        index: i,
                        detail: "data region offset overflows usize".into(),
                    }
                })?;
                if end > self.data_len {
                    return Err(FormatError::InvalidTensor {
                        index: i,
                        detail: format!(
                            "data region {}..{} exceeds segment of {} bytes",
                            region.offset, end, self.data_len
                        ),
                    });
                }
                if region.len != size {
                    return Err(FormatError::InvalidTensor {
                        index: i,
                        detail: format!(
                            "data region holds {} bytes but shape {} of {} needs {}",
                            region.len, t.shape, t.dtype, size
                        ),
                    });
                }
            }
        }

        // Duplicate names make `inspect` output ambiguous but do not break
        // execution, which is index-based throughout.
        for (i, t) in self.tensors.iter().enumerate() {
            if !t.name.is_empty()
                && self.tensors[..i].iter().any(|prev| prev.name == t.name)
            {
                tracing::warn!("tensor name '{}' appears more than once", t.name);
            }
        }

        if self.inputs.is_empty() {
            return Err(FormatError::InvalidGraph(
                "graph declares no inputs".into(),
            ));
        }
        if self.outputs.is_empty() {
            return Err(FormatError::InvalidGraph(
                "graph declares no outputs".into(),
            ));
        }
        for (list, what) in [(&self.inputs, "input"), (&self.outputs, "output")] {
            for (pos, &idx) in list.iter().enumerate() {
                if idx >= n {
                    return Err(FormatError::InvalidGraph(format!(
                        "{what} index {idx} out of range ({n} tensors)"
                    )));
                }
                if list[..pos].contains(&idx) {
                    return Err(FormatError::InvalidGraph(format!(
                        "tensor {idx} listed twice as graph {what}"
                    )));
                }
            }
        }
        for &idx in &self.inputs {
            if self.tensors[idx].is_constant() {
                return Err(FormatError::InvalidGraph(format!(
                    "input tensor '{}' carries constant data",
                    self.tensors[idx].name
                )));
            }
        }

        // Single-assignment producer tracking, in execution order.
        let mut produced = vec![false; n];
        for &idx in &self.inputs {
            produced[idx] = true;
        }
        for (i, t) in self.tensors.iter().enumerate() {
            if t.is_constant() {
                produced[i] = true;
            }
        }
        for (i, op) in self.ops.iter().enumerate() {
            let want = op.opcode.num_inputs();
            if op.inputs.len() != want {
                return Err(FormatError::InvalidOp {
                    index: i,
                    detail: format!(
                        "{} takes {want} inputs, got {}",
                        op.opcode,
                        op.inputs.len()
                    ),
                });
            }
            for &ti in &op.inputs {
                if ti >= n {
                    return Err(FormatError::InvalidOp {
                        index: i,
                        detail: format!("input index {ti} out of range ({n} tensors)"),
                    });
                }
                if !produced[ti] {
                    return Err(FormatError::InvalidOp {
                        index: i,
                        detail: format!(
                            "input tensor '{}' is not produced before use",
                            self.tensors[ti].name
                        ),
                    });
                }
            }
            if op.output >= n {
                return Err(FormatError::InvalidOp {
                    index: i,
                    detail: format!(
                        "output index {} out of range ({n} tensors)",
                        op.output
                    ),
                });
            }
            if produced[op.output] {
                return Err(FormatError::InvalidOp {
                    index: i,
                    detail: format!(
                        "output tensor '{}' already has a producer",
                        self.tensors[op.output].name
                    ),
                });
            }
            produced[op.output] = true;
        }

        for &idx in &self.outputs {
            if !produced[idx] {
                return Err(FormatError::InvalidGraph(format!(
                    "output tensor '{}' is never produced",
                    self.tensors[idx].name
                )));
            }
        }

        Ok(GraphDef {
            description: self.description,
            tensors: self.tensors,
            inputs: self.inputs,
            outputs: self.outputs,
            ops: self.ops,
            data_offset: self.data_offset,
            data_len: self.data_len,
            _state: std::marker::PhantomData,
        })
    }
}

// ── Checked state ──────────────────────────────────────────────────

impl GraphDef<Checked> {
    /// Returns the number of tensor slots.
    pub fn num_tensors(&self) -> usize {
        self.tensors.len()
    }

    /// Returns the number of ops.
    pub fn num_ops(&self) -> usize {
        self.ops.len()
    }

    /// Returns a tensor slot by index.
    pub fn tensor(&self, index: usize) -> Option<&TensorDef> {
        self.tensors.get(index)
    }

    /// Returns metadata for every graph input, in binding order.
    pub fn input_infos(&self) -> Vec<TensorInfo> {
        self.inputs
            .iter()
            .map(|&i| self.tensors[i].info())
            .collect()
    }

    /// Returns metadata for every graph output, in binding order.
    pub fn output_infos(&self) -> Vec<TensorInfo> {
        self.outputs
            .iter()
            .map(|&i| self.tensors[i].info())
            .collect()
    }

    /// Total bytes of constant data referenced by the tensor table.
    pub fn total_const_bytes(&self) -> usize {
        self.tensors
            .iter()
            .filter_map(|t| t.constant.map(|r| r.len))
            .sum()
    }

    /// Returns a summary string describing the graph.
    pub fn summary(&self) -> String {
        let const_kb = self.total_const_bytes() as f64 / 1024.0;
        let desc = if self.description.is_empty() {
            "<unnamed>"
        } else {
            &self.description
        };
        format!(
            "Graph '{}': {} tensors, {} ops, {} inputs, {} outputs, {:.1} KB constant data",
            desc,
            self.num_tensors(),
            self.num_ops(),
            self.inputs.len(),
            self.outputs.len(),
            const_kb,
        )
    }
}

// ── Shared implementations ─────────────────────────────────────────

impl<S: GraphState> fmt::Display for GraphDef<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "GraphDef '{}' ({} tensors, {} ops):",
            self.description,
            self.tensors.len(),
            self.ops.len()
        )?;
        for (i, t) in self.tensors.iter().enumerate() {
            let kind = if t.is_constant() { "const" } else { "var" };
            writeln!(f, "  t{i}: {} [{kind}]", t.info().summary())?;
        }
        for (i, op) in self.ops.iter().enumerate() {
            writeln!(
                f,
                "  op{i}: {} {:?} -> t{}",
                op.opcode, op.inputs, op.output
            )?;
        }
        Ok(())
    }
}
