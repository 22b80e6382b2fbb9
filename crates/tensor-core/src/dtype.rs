// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Supported tensor element data types.

use std::fmt;

/// Element data type of a tensor buffer.
///
/// The runtime uses `DType` to decide buffer layout and which marshalling
/// path applies. Integers are two's-complement, floats are IEEE 754, and
/// booleans occupy one byte per element (nonzero reads as `true`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DType {
    /// 32-bit IEEE 754 floating point.
    #[serde(rename = "float32")]
    F32,
    /// 32-bit signed integer.
    #[serde(rename = "int32")]
    I32,
    /// 64-bit signed integer.
    #[serde(rename = "int64")]
    I64,
    /// 8-bit unsigned integer.
    #[serde(rename = "uint8")]
    U8,
    /// 8-bit signed integer.
    #[serde(rename = "int8")]
    I8,
    /// One-byte boolean.
    #[serde(rename = "bool")]
    Bool,
}

impl DType {
    /// Returns the size of a single element in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            DType::F32 | DType::I32 => 4,
            DType::I64 => 8,
            DType::U8 | DType::I8 | DType::Bool => 1,
        }
    }

    /// Returns the canonical lowercase name, e.g. `"float32"`.
    pub fn as_str(self) -> &'static str {
        match self {
            DType::F32 => "float32",
            DType::I32 => "int32",
            DType::I64 => "int64",
            DType::U8 => "uint8",
            DType::I8 => "int8",
            DType::Bool => "bool",
        }
    }

    /// Parses a type name back into a `DType`.
    ///
    /// Accepts the canonical names produced by [`DType::as_str`] plus the
    /// short aliases `"f32"`, `"i32"`, `"i64"`, `"u8"`, `"i8"`.
    /// Case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "float32" | "f32" => Some(DType::F32),
            "int32" | "i32" => Some(DType::I32),
            "int64" | "i64" => Some(DType::I64),
            "uint8" | "u8" => Some(DType::U8),
            "int8" | "i8" => Some(DType::I8),
            "bool" => Some(DType::Bool),
            _ => None,
        }
    }

    /// `true` for floating-point types.
    pub fn is_float(self) -> bool {
        matches!(self, DType::F32)
    }

    /// `true` for signed/unsigned integer types.
    pub fn is_integer(self) -> bool {
        matches!(self, DType::I32 | DType::I64 | DType::U8 | DType::I8)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_bytes() {
        assert_eq!(DType::F32.size_bytes(), 4);
        assert_eq!(DType::I32.size_bytes(), 4);
        assert_eq!(DType::I64.size_bytes(), 8);
        assert_eq!(DType::U8.size_bytes(), 1);
        assert_eq!(DType::I8.size_bytes(), 1);
        assert_eq!(DType::Bool.size_bytes(), 1);
    }

    #[test]
    fn test_display_uses_canonical_names() {
        assert_eq!(format!("{}", DType::F32), "float32");
        assert_eq!(format!("{}", DType::U8), "uint8");
        assert_eq!(format!("{}", DType::Bool), "bool");
    }

    #[test]
    fn test_from_name_roundtrip() {
        for dtype in [
            DType::F32,
            DType::I32,
            DType::I64,
            DType::U8,
            DType::I8,
            DType::Bool,
        ] {
            assert_eq!(DType::from_name(dtype.as_str()), Some(dtype));
        }
    }

    #[test]
    fn test_from_name_aliases_and_rejects() {
        assert_eq!(DType::from_name("f32"), Some(DType::F32));
        assert_eq!(DType::from_name("U8"), Some(DType::U8));
        assert_eq!(DType::from_name("FLOAT32"), Some(DType::F32));
        assert_eq!(DType::from_name("float16"), None);
        assert_eq!(DType::from_name(""), None);
    }

    #[test]
    fn test_classification() {
        assert!(DType::F32.is_float());
        assert!(!DType::F32.is_integer());
        assert!(DType::I64.is_integer());
        assert!(!DType::Bool.is_integer());
        assert!(!DType::Bool.is_float());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&DType::F32).unwrap();
        assert_eq!(json, "\"float32\"");
        let back: DType = serde_json::from_str("\"uint8\"").unwrap();
        assert_eq!(back, DType::U8);
    }
}
