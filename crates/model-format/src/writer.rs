// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! TGRF binary encoding.
//!
//! [`GraphBuilder`] is the authoring surface: callers declare tensors, wire
//! ops between them, and receive the encoded file from [`GraphBuilder::finish`].
//! The builder validates the assembled graph before writing a single byte,
//! so it can only emit files the reader will accept.

use crate::graph::{DataRegion, GraphDef, OpCode, OpDef, Parsed, TensorDef};
use crate::wire::{dtype_code, FLAG_CONSTANT, FORMAT_VERSION, MAGIC, MAX_RANK};
use crate::{Checked, FormatError};
use tensor_core::{DType, Shape};

/// Incrementally assembles a graph and encodes it as a TGRF file.
///
/// Tensor declaration methods return the tensor's index, which later calls
/// use to wire ops and mark graph outputs.
///
/// # Examples
/// ```
/// use model_format::{GraphBuilder, OpCode};
/// use tensor_core::DType;
///
/// let mut b = GraphBuilder::new("single relu");
/// let x = b.input("x", DType::F32, &[1, 4]);
/// let y = b.tensor("y", DType::F32, &[1, 4]);
/// b.op(OpCode::Relu, &[x], y);
/// b.output(y);
/// let bytes = b.finish().unwrap();
/// assert_eq!(&bytes[..4], b"TGRF");
/// ```
#[derive(Debug, Default)]
pub struct GraphBuilder {
    description: String,
    tensors: Vec<TensorDef>,
    inputs: Vec<usize>,
    outputs: Vec<usize>,
    ops: Vec<OpDef>,
    data: Vec<u8>,
}

impl GraphBuilder {
    /// Creates an empty builder with the given model description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Declares a variable tensor slot and returns its index.
    pub fn tensor(&mut self, name: impl Into<String>, dtype: DType, dims: &[usize]) -> usize {
        self.push_tensor(TensorDef {
            name: name.into(),
            dtype,
            shape: Shape::new(dims.to_vec()),
            constant: None,
        })
    }

    /// Declares a graph input tensor and returns its index.
    pub fn input(&mut self, name: impl Into<String>, dtype: DType, dims: &[usize]) -> usize {
        let index = self.tensor(name, dtype, dims);
        self.inputs.push(index);
        index
    }

    /// Declares a constant tensor backed by raw little-endian bytes.
    ///
    /// # Errors
    /// Fails if `bytes` does not match the byte size of `dims` × `dtype`.
    pub fn constant(
        &mut self,
        name: impl Into<String>,
        dtype: DType,
        dims: &[usize],
        bytes: &[u8],
    ) -> Result<usize, FormatError> {
        let index = self.tensors.len();
        let shape = Shape::new(dims.to_vec());
        let expected = shape.checked_size_bytes(dtype).ok_or_else(|| {
            FormatError::InvalidTensor {
                index,
                detail: format!("byte size of shape {shape} overflows usize"),
            }
        })?;
        if bytes.len() != expected {
            return Err(FormatError::InvalidTensor {
                index,
                detail: format!(
                    "constant payload holds {} bytes but shape {} of {} needs {}",
                    bytes.len(),
                    shape,
                    dtype,
                    expected
                ),
            });
        }
        let offset = self.data.len();
        self.data.extend_from_slice(bytes);
        Ok(self.push_tensor(TensorDef {
            name: name.into(),
            dtype,
            shape,
            constant: Some(DataRegion {
                offset,
                len: bytes.len(),
            }),
        }))
    }

    /// Declares a `float32` constant tensor from a value slice.
    pub fn constant_f32(
        &mut self,
        name: impl Into<String>,
        dims: &[usize],
        values: &[f32],
    ) -> Result<usize, FormatError> {
        let mut bytes = Vec::with_capacity(values.len() * 4);
        for v in values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        self.constant(name, DType::F32, dims, &bytes)
    }

    /// Appends an op consuming `inputs` and producing `output`.
    pub fn op(&mut self, opcode: OpCode, inputs: &[usize], output: usize) {
        self.ops.push(OpDef {
            opcode,
            inputs: inputs.to_vec(),
            output,
        });
    }

    /// Marks a tensor as a graph output.
    pub fn output(&mut self, index: usize) {
        self.outputs.push(index);
    }

    /// Validates the assembled graph and encodes it.
    ///
    /// # Errors
    /// Returns the first validation failure, or an encoding error if a
    /// field exceeds what the wire format can represent (a tensor name
    /// over 65535 bytes, a dimension over `u32::MAX`, ...).
    pub fn finish(self) -> Result<Vec<u8>, FormatError> {
        let graph = GraphDef::<Parsed>::new(
            self.description,
            self.tensors,
            self.inputs,
            self.outputs,
            self.ops,
            0,
            self.data.len(),
        )
        .validate()?;
        encode(&graph, &self.data)
    }

    fn push_tensor(&mut self, def: TensorDef) -> usize {
        self.tensors.push(def);
        self.tensors.len() - 1
    }
}

/// Serializes a checked graph and its data segment.
///
/// The graph's `data_offset` field is ignored; the encoder lays the segment
/// out after the op table and the reader recomputes the offset.
fn encode(graph: &GraphDef<Checked>, data: &[u8]) -> Result<Vec<u8>, FormatError> {
    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());

    let desc = graph.description.as_bytes();
    let desc_len = u32::try_from(desc.len()).map_err(|_| {
        FormatError::InvalidGraph("description longer than u32::MAX bytes".into())
    })?;
    out.extend_from_slice(&desc_len.to_le_bytes());
    out.extend_from_slice(desc);

    out.extend_from_slice(&list_len(graph.tensors.len())?.to_le_bytes());
    for (index, t) in graph.tensors.iter().enumerate() {
        let name = t.name.as_bytes();
        let name_len = u16::try_from(name.len()).map_err(|_| FormatError::InvalidTensor {
            index,
            detail: "name longer than 65535 bytes".into(),
        })?;
        out.extend_from_slice(&name_len.to_le_bytes());
        out.extend_from_slice(name);
        out.push(dtype_code(t.dtype));
        out.push(if t.is_constant() { FLAG_CONSTANT } else { 0 });

        let dims = t.shape.dims();
        if dims.len() > MAX_RANK {
            return Err(FormatError::InvalidTensor {
                index,
                detail: format!("rank {} exceeds maximum of {MAX_RANK}", dims.len()),
            });
        }
        out.push(dims.len() as u8);
        for &d in dims {
            let d = u32::try_from(d).map_err(|_| FormatError::InvalidTensor {
                index,
                detail: format!("dimension {d} exceeds u32::MAX"),
            })?;
            out.extend_from_slice(&d.to_le_bytes());
        }
        if let Some(region) = t.constant {
            out.extend_from_slice(&(region.offset as u64).to_le_bytes());
            out.extend_from_slice(&(region.len as u64).to_le_bytes());
        }
    }

    for list in [&graph.inputs, &graph.outputs] {
        out.extend_from_slice(&list_len(list.len())?.to_le_bytes());
        for &idx in list.iter() {
            out.extend_from_slice(&index_u32(idx)?.to_le_bytes());
        }
    }

    out.extend_from_slice(&list_len(graph.ops.len())?.to_le_bytes());
    for (index, op) in graph.ops.iter().enumerate() {
        out.push(op.opcode.code());
        out.push(0);
        let n_in = u16::try_from(op.inputs.len()).map_err(|_| FormatError::InvalidOp {
            index,
            detail: "more than 65535 inputs".into(),
        })?;
        out.extend_from_slice(&n_in.to_le_bytes());
        for &ti in &op.inputs {
            out.extend_from_slice(&index_u32(ti)?.to_le_bytes());
        }
        out.extend_from_slice(&index_u32(op.output)?.to_le_bytes());
    }

    out.extend_from_slice(&(data.len() as u64).to_le_bytes());
    out.extend_from_slice(data);
    Ok(out)
}

fn list_len(n: usize) -> Result<u32, FormatError> {
    u32::try_from(n)
        .map_err(|_| FormatError::InvalidGraph(format!("list of {n} entries exceeds u32::MAX")))
}

fn index_u32(idx: usize) -> Result<u32, FormatError> {
    u32::try_from(idx)
        .map_err(|_| FormatError::InvalidGraph(format!("tensor index {idx} exceeds u32::MAX")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_graph;

    fn relu_builder() -> GraphBuilder {
        let mut b = GraphBuilder::new("relu test");
        let x = b.input("x", DType::F32, &[1, 4]);
        let y = b.tensor("y", DType::F32, &[1, 4]);
        b.op(OpCode::Relu, &[x], y);
        b.output(y);
        b
    }

    #[test]
    fn test_finish_emits_magic_and_version() {
        let bytes = relu_builder().finish().unwrap();
        assert_eq!(&bytes[..4], b"TGRF");
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), FORMAT_VERSION);
    }

    #[test]
    fn test_finish_is_deterministic() {
        assert_eq!(relu_builder().finish().unwrap(), relu_builder().finish().unwrap());
    }

    #[test]
    fn test_finish_rejects_invalid_graph() {
        // No outputs declared.
        let mut b = GraphBuilder::new("");
        let x = b.input("x", DType::F32, &[2]);
        let y = b.tensor("y", DType::F32, &[2]);
        b.op(OpCode::Relu, &[x], y);
        let err = b.finish().unwrap_err();
        assert!(matches!(err, FormatError::InvalidGraph(_)));
    }

    #[test]
    fn test_constant_payload_size_checked() {
        let mut b = GraphBuilder::new("");
        // 2x2 f32 needs 16 bytes, give 8.
        let err = b.constant("w", DType::F32, &[2, 2], &[0u8; 8]).unwrap_err();
        assert!(matches!(err, FormatError::InvalidTensor { .. }));
    }

    #[test]
    fn test_constant_f32_encodes_little_endian() {
        let mut b = GraphBuilder::new("");
        let x = b.input("x", DType::F32, &[1]);
        let w = b.constant_f32("w", &[1], &[1.0]).unwrap();
        let y = b.tensor("y", DType::F32, &[1]);
        b.op(OpCode::Mul, &[x, w], y);
        b.output(y);
        let bytes = b.finish().unwrap();

        let graph = read_graph(&bytes).unwrap();
        let region = graph.tensor(w).unwrap().constant.unwrap();
        let payload = &bytes[graph.data_offset + region.offset..][..region.len];
        assert_eq!(payload, 1.0f32.to_le_bytes());
    }

    #[test]
    fn test_name_length_limit() {
        let mut b = GraphBuilder::new("");
        let long = "n".repeat(u16::MAX as usize + 1);
        let x = b.input(long, DType::F32, &[2]);
        let y = b.tensor("y", DType::F32, &[2]);
        b.op(OpCode::Relu, &[x], y);
        b.output(y);
        let err = b.finish().unwrap_err();
        assert!(matches!(err, FormatError::InvalidTensor { index: 0, .. }));
    }

    #[test]
    fn test_multi_io_graph_roundtrip() {
        let mut b = GraphBuilder::new("two in, two out");
        let a = b.input("a", DType::F32, &[2]);
        let c = b.input("c", DType::F32, &[2]);
        let sum = b.tensor("sum", DType::F32, &[2]);
        let prod = b.tensor("prod", DType::F32, &[2]);
        b.op(OpCode::Add, &[a, c], sum);
        b.op(OpCode::Mul, &[a, c], prod);
        b.output(sum);
        b.output(prod);
        let bytes = b.finish().unwrap();

        let graph = read_graph(&bytes).unwrap();
        assert_eq!(graph.inputs.len(), 2);
        assert_eq!(graph.outputs, vec![2, 3]);
        assert_eq!(graph.num_ops(), 2);
    }

    #[test]
    fn test_mixed_dtypes_roundtrip() {
        let mut b = GraphBuilder::new("cast chain");
        let x = b.input("x", DType::U8, &[4]);
        let y = b.tensor("y", DType::F32, &[4]);
        b.op(OpCode::Cast, &[x], y);
        b.output(y);
        let bytes = b.finish().unwrap();

        let graph = read_graph(&bytes).unwrap();
        assert_eq!(graph.tensor(0).unwrap().dtype, DType::U8);
        assert_eq!(graph.tensor(1).unwrap().dtype, DType::F32);
    }
}
