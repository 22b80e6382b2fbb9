// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Typed tensor buffers owned by a session.
//!
//! Each buffer is a plain `Vec` of its element type; `bool` tensors are
//! stored one byte per element holding 0 or 1. Byte views are native-endian
//! and row-major, which is what the marshalling layer in `tensor-core`
//! expects.

use tensor_core::DType;

/// One allocated tensor buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    F32(Vec<f32>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    I8(Vec<i8>),
    Bool(Vec<u8>),
}

impl Default for TensorData {
    fn default() -> Self {
        Self::F32(Vec::new())
    }
}

impl TensorData {
    /// Allocates a zero-filled buffer of `elements` elements.
    pub fn zeros(dtype: DType, elements: usize) -> Self {
        match dtype {
            DType::F32 => Self::F32(vec![0.0; elements]),
            DType::I32 => Self::I32(vec![0; elements]),
            DType::I64 => Self::I64(vec![0; elements]),
            DType::U8 => Self::U8(vec![0; elements]),
            DType::I8 => Self::I8(vec![0; elements]),
            DType::Bool => Self::Bool(vec![0; elements]),
        }
    }

    /// Decodes a little-endian payload into a typed buffer.
    ///
    /// `bytes.len()` must be a multiple of the dtype's element size; the
    /// graph validator guarantees this for constant data regions.
    pub fn from_le_bytes(dtype: DType, bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len() % dtype.size_bytes(), 0);
        match dtype {
            DType::F32 => Self::F32(
                bytes
                    .chunks_exact(4)
                    .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                    .collect(),
            ),
            DType::I32 => Self::I32(
                bytes
                    .chunks_exact(4)
                    .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                    .collect(),
            ),
            DType::I64 => Self::I64(
                bytes
                    .chunks_exact(8)
                    .map(|b| {
                        i64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
                    })
                    .collect(),
            ),
            DType::U8 => Self::U8(bytes.to_vec()),
            DType::I8 => Self::I8(bytes.iter().map(|&b| b as i8).collect()),
            // Normalise to 0/1 so downstream logic can rely on it.
            DType::Bool => Self::Bool(bytes.iter().map(|&b| (b != 0) as u8).collect()),
        }
    }

    /// Returns the element dtype.
    pub fn dtype(&self) -> DType {
        match self {
            Self::F32(_) => DType::F32,
            Self::I32(_) => DType::I32,
            Self::I64(_) => DType::I64,
            Self::U8(_) => DType::U8,
            Self::I8(_) => DType::I8,
            Self::Bool(_) => DType::Bool,
        }
    }

    /// Returns the number of elements.
    pub fn elements(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::I8(v) => v.len(),
            Self::Bool(v) => v.len(),
        }
    }

    /// Returns the buffer size in bytes.
    pub fn byte_len(&self) -> usize {
        self.elements() * self.dtype().size_bytes()
    }

    /// Views the buffer as raw native-endian bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::F32(v) => bytes_of(v),
            Self::I32(v) => bytes_of(v),
            Self::I64(v) => bytes_of(v),
            Self::U8(v) | Self::Bool(v) => v,
            Self::I8(v) => bytes_of(v),
        }
    }

    /// Views the buffer as mutable raw native-endian bytes.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match self {
            Self::F32(v) => bytes_of_mut(v),
            Self::I32(v) => bytes_of_mut(v),
            Self::I64(v) => bytes_of_mut(v),
            Self::U8(v) | Self::Bool(v) => v,
            Self::I8(v) => bytes_of_mut(v),
        }
    }

    /// Returns the `f32` slice if this is a float buffer.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            Self::F32(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the mutable `f32` slice if this is a float buffer.
    pub fn as_f32_mut(&mut self) -> Option<&mut [f32]> {
        match self {
            Self::F32(v) => Some(v),
            _ => None,
        }
    }
}

/// Reinterprets a primitive-element slice as raw bytes.
fn bytes_of<T>(v: &[T]) -> &[u8] {
    // SAFETY: instantiated only with fixed-width primitives (f32, i32, i64,
    // i8), which have no padding bytes, and every byte of them is a valid u8.
    unsafe { std::slice::from_raw_parts(v.as_ptr().cast::<u8>(), std::mem::size_of_val(v)) }
}

/// Reinterprets a mutable primitive-element slice as raw bytes.
fn bytes_of_mut<T>(v: &mut [T]) -> &mut [u8] {
    // SAFETY: as for `bytes_of`; additionally every byte pattern is a valid
    // value for these primitive types, so arbitrary writes stay sound.
    unsafe {
        std::slice::from_raw_parts_mut(v.as_mut_ptr().cast::<u8>(), std::mem::size_of_val(v))
    }
}
