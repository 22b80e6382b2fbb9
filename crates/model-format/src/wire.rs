// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Wire-level constants shared by the reader and writer.
//!
//! All multi-byte fields in a TGRF file are little-endian.

use tensor_core::DType;

/// File magic, the first four bytes of every TGRF file.
pub(crate) const MAGIC: [u8; 4] = *b"TGRF";

/// The format version this crate reads and writes.
pub const FORMAT_VERSION: u16 = 1;

/// Maximum tensor rank the format can express.
pub const MAX_RANK: usize = 8;

/// Tensor flag bit: the tensor carries constant data.
pub(crate) const FLAG_CONSTANT: u8 = 0b0000_0001;

/// Returns the wire byte for a dtype.
pub(crate) fn dtype_code(dtype: DType) -> u8 {
    match dtype {
        DType::F32 => 1,
        DType::I32 => 2,
        DType::I64 => 3,
        DType::U8 => 4,
        DType::I8 => 5,
        DType::Bool => 6,
    }
}

/// Decodes a dtype from its wire byte.
pub(crate) fn dtype_from_code(code: u8) -> Option<DType> {
    match code {
        1 => Some(DType::F32),
        2 => Some(DType::I32),
        3 => Some(DType::I64),
        4 => Some(DType::U8),
        5 => Some(DType::I8),
        6 => Some(DType::Bool),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_code_roundtrip() {
        for dtype in [
            DType::F32,
            DType::I32,
            DType::I64,
            DType::U8,
            DType::I8,
            DType::Bool,
        ] {
            assert_eq!(dtype_from_code(dtype_code(dtype)), Some(dtype));
        }
        assert_eq!(dtype_from_code(0), None);
        assert_eq!(dtype_from_code(7), None);
    }
}
