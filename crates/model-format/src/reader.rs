// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! TGRF binary decoding.
//!
//! The decoder reads graph *structure* only. Constant tensor payloads stay
//! in the source buffer; the returned [`GraphDef`] records their locations
//! as offsets into the data segment. Callers that memory-map a model file
//! therefore never copy weight data during decoding.

use crate::graph::{DataRegion, GraphDef, OpCode, OpDef, Parsed, TensorDef};
use crate::wire::{dtype_from_code, FLAG_CONSTANT, FORMAT_VERSION, MAGIC, MAX_RANK};
use crate::{Checked, FormatError};
use tensor_core::Shape;

/// Decodes and validates a TGRF file in one step.
///
/// # Errors
/// Returns a [`FormatError`] if the bytes are not a well-formed TGRF file
/// of the supported version, or if the decoded graph fails validation.
pub fn read_graph(bytes: &[u8]) -> Result<GraphDef<Checked>, FormatError> {
    decode(bytes)?.validate()
}

/// Decodes TGRF bytes into an unvalidated graph.
///
/// Use [`GraphDef::validate`] to obtain a graph fit for compilation; the
/// decoder alone only guarantees the file's framing is intact.
pub fn decode(bytes: &[u8]) -> Result<GraphDef<Parsed>, FormatError> {
    let mut cur = Cursor::new(bytes);

    let magic = cur.take(4)?;
    if magic != MAGIC {
        return Err(FormatError::BadMagic {
            found: [magic[0], magic[1], magic[2], magic[3]],
        });
    }
    let version = cur.read_u16()?;
    if version != FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion {
            found: version,
            expected: FORMAT_VERSION,
        });
    }
    let reserved = cur.read_u16()?;
    if reserved != 0 {
        return Err(FormatError::InvalidGraph(format!(
            "reserved header bytes must be zero, got {reserved:#06x}"
        )));
    }

    let desc_len = cur.read_u32()? as usize;
    let description = String::from_utf8(cur.take(desc_len)?.to_vec())
        .map_err(|_| FormatError::InvalidGraph("description is not valid UTF-8".into()))?;

    let n_tensors = cur.read_u32()? as usize;
    let mut tensors = Vec::new();
    for index in 0..n_tensors {
        tensors.push(read_tensor(&mut cur, index)?);
    }

    let inputs = read_index_list(&mut cur)?;
    let outputs = read_index_list(&mut cur)?;

    let n_ops = cur.read_u32()? as usize;
    let mut ops = Vec::new();
    for index in 0..n_ops {
        ops.push(read_op(&mut cur, index)?);
    }

    let data_len = to_usize(cur.read_u64()?).ok_or_else(|| {
        FormatError::InvalidGraph("data segment length does not fit in memory".into())
    })?;
    let data_offset = cur.position();
    cur.take(data_len)?;

    let trailing = cur.remaining();
    if trailing != 0 {
        return Err(FormatError::TrailingBytes { count: trailing });
    }

    Ok(GraphDef::new(
        description,
        tensors,
        inputs,
        outputs,
        ops,
        data_offset,
        data_len,
    ))
}

fn read_tensor(cur: &mut Cursor<'_>, index: usize) -> Result<TensorDef, FormatError> {
    let name_len = cur.read_u16()? as usize;
    let name = String::from_utf8(cur.take(name_len)?.to_vec()).map_err(|_| {
        FormatError::InvalidTensor {
            index,
            detail: "name is not valid UTF-8".into(),
        }
    })?;

    let code = cur.read_u8()?;
    let dtype = dtype_from_code(code).ok_or_else(|| FormatError::InvalidTensor {
        index,
        detail: format!("unknown dtype code {code:#04x}"),
    })?;

    let flags = cur.read_u8()?;
    if flags & !FLAG_CONSTANT != 0 {
        return Err(FormatError::InvalidTensor {
            index,
            detail: format!("unknown flag bits {flags:#04x}"),
        });
    }

    let rank = cur.read_u8()? as usize;
    if rank > MAX_RANK {
        return Err(FormatError::InvalidTensor {
            index,
            detail: format!("rank {rank} exceeds maximum of {MAX_RANK}"),
        });
    }
    let mut dims = Vec::with_capacity(rank);
    for _ in 0..rank {
        dims.push(cur.read_u32()? as usize);
    }

    let constant = if flags & FLAG_CONSTANT != 0 {
        let offset = to_usize(cur.read_u64()?);
        let len = to_usize(cur.read_u64()?);
        let (Some(offset), Some(len)) = (offset, len) else {
            return Err(FormatError::InvalidTensor {
                index,
                detail: "data region does not fit in addressable memory".into(),
            });
        };
        Some(DataRegion { offset, len })
    } else {
        None
    };

    Ok(TensorDef {
        name,
        dtype,
        shape: Shape::new(dims),
        constant,
    })
}

fn read_op(cur: &mut Cursor<'_>, index: usize) -> Result<OpDef, FormatError> {
    let code = cur.read_u8()?;
    let opcode = OpCode::from_code(code).ok_or_else(|| FormatError::InvalidOp {
        index,
        detail: format!("unknown opcode {code:#04x}"),
    })?;
    let reserved = cur.read_u8()?;
    if reserved != 0 {
        return Err(FormatError::InvalidOp {
            index,
            detail: format!("reserved op byte must be zero, got {reserved:#04x}"),
        });
    }
    let n_in = cur.read_u16()? as usize;
    let mut inputs = Vec::with_capacity(n_in);
    for _ in 0..n_in {
        inputs.push(cur.read_u32()? as usize);
    }
    let output = cur.read_u32()? as usize;
    Ok(OpDef {
        opcode,
        inputs,
        output,
    })
}

fn read_index_list(cur: &mut Cursor<'_>) -> Result<Vec<usize>, FormatError> {
    let n = cur.read_u32()? as usize;
    let mut indices = Vec::new();
    for _ in 0..n {
        indices.push(cur.read_u32()? as usize);
    }
    Ok(indices)
}

fn to_usize(v: u64) -> Option<usize> {
    usize::try_from(v).ok()
}

// ── Cursor ─────────────────────────────────────────────────────────

/// Bounds-checked forward reader over the source buffer.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(FormatError::Truncated {
                offset: self.pos,
                needed: n - remaining,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16, FormatError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self) -> Result<u32, FormatError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_u64(&mut self) -> Result<u64, FormatError> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::GraphBuilder;
    use tensor_core::DType;

    /// Encoded x -> relu -> y graph for corruption tests.
    fn relu_bytes() -> Vec<u8> {
        let mut b = GraphBuilder::new("relu test");
        let x = b.input("x", DType::F32, &[1, 4]);
        let y = b.tensor("y", DType::F32, &[1, 4]);
        b.op(OpCode::Relu, &[x], y);
        b.output(y);
        b.finish().unwrap()
    }

    /// Magic + version + reserved + empty description.
    fn minimal_header() -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(b"TGRF");
        b.extend_from_slice(&1u16.to_le_bytes());
        b.extend_from_slice(&0u16.to_le_bytes());
        b.extend_from_slice(&0u32.to_le_bytes()); // description length
        b
    }

    #[test]
    fn test_decode_roundtrip() {
        let graph = read_graph(&relu_bytes()).unwrap();
        assert_eq!(graph.description, "relu test");
        assert_eq!(graph.num_tensors(), 2);
        assert_eq!(graph.num_ops(), 1);
        assert_eq!(graph.ops[0].opcode, OpCode::Relu);
        assert_eq!(graph.inputs, vec![0]);
        assert_eq!(graph.outputs, vec![1]);
    }

    #[test]
    fn test_decode_empty_file() {
        let err = decode(&[]).unwrap_err();
        assert_eq!(
            err,
            FormatError::Truncated {
                offset: 0,
                needed: 4,
            }
        );
    }

    #[test]
    fn test_decode_bad_magic() {
        let mut bytes = relu_bytes();
        bytes[0] = b'X';
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, FormatError::BadMagic { .. }));
    }

    #[test]
    fn test_decode_unsupported_version() {
        let mut bytes = relu_bytes();
        bytes[4] = 9;
        let err = decode(&bytes).unwrap_err();
        assert_eq!(
            err,
            FormatError::UnsupportedVersion {
                found: 9,
                expected: FORMAT_VERSION,
            }
        );
    }

    #[test]
    fn test_decode_nonzero_reserved() {
        let mut bytes = relu_bytes();
        bytes[6] = 1;
        assert!(matches!(
            decode(&bytes),
            Err(FormatError::InvalidGraph(_))
        ));
    }

    #[test]
    fn test_decode_truncated() {
        let bytes = relu_bytes();
        let err = decode(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, FormatError::Truncated { .. }));

        // Cutting mid-header truncates too, with the missing count.
        let err = decode(&bytes[..3]).unwrap_err();
        assert_eq!(
            err,
            FormatError::Truncated {
                offset: 0,
                needed: 1,
            }
        );
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let mut bytes = relu_bytes();
        bytes.extend_from_slice(&[0, 0, 0]);
        let err = decode(&bytes).unwrap_err();
        assert_eq!(err, FormatError::TrailingBytes { count: 3 });
    }

    #[test]
    fn test_decode_unknown_dtype() {
        let mut bytes = minimal_header();
        bytes.extend_from_slice(&1u32.to_le_bytes()); // one tensor
        bytes.extend_from_slice(&0u16.to_le_bytes()); // empty name
        bytes.push(0xEE); // bogus dtype code
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, FormatError::InvalidTensor { index: 0, .. }));
    }

    #[test]
    fn test_decode_unknown_flags() {
        let mut bytes = minimal_header();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.push(1); // dtype f32
        bytes.push(0x80); // unknown flag bit
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, FormatError::InvalidTensor { index: 0, .. }));
    }

    #[test]
    fn test_decode_rank_too_large() {
        let mut bytes = minimal_header();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.push(1); // dtype f32
        bytes.push(0); // no flags
        bytes.push(9); // rank 9 > MAX_RANK
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, FormatError::InvalidTensor { index: 0, .. }));
    }

    #[test]
    fn test_decode_unknown_opcode() {
        let mut bytes = minimal_header();
        // One scalar f32 tensor.
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.push(1);
        bytes.push(0);
        bytes.push(0); // rank 0
        // inputs: [0], outputs: [0]
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        // one op with a bogus opcode
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.push(0xEE);
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, FormatError::InvalidOp { index: 0, .. }));
    }

    #[test]
    fn test_decode_preserves_const_regions() {
        let mut b = GraphBuilder::new("fc");
        let x = b.input("x", DType::F32, &[1, 2]);
        let w = b.constant_f32("w", &[3, 2], &[0.5; 6]).unwrap();
        let bias = b.constant_f32("b", &[3], &[0.0; 3]).unwrap();
        let y = b.tensor("y", DType::F32, &[1, 3]);
        b.op(OpCode::FullyConnected, &[x, w, bias], y);
        b.output(y);
        let bytes = b.finish().unwrap();

        let graph = read_graph(&bytes).unwrap();
        assert_eq!(graph.data_len, 6 * 4 + 3 * 4);
        let w_def = graph.tensor(1).unwrap();
        let region = w_def.constant.unwrap();
        assert_eq!(region.len, 24);
        // The payload is addressable through data_offset.
        let payload = &bytes[graph.data_offset + region.offset..][..region.len];
        assert_eq!(payload.len(), 24);
        let first = f32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
        assert_eq!(first, 0.5);
    }
}
