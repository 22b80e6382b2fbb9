// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for TGRF decoding, validation, and encoding.

/// Errors that can occur when working with TGRF graph files.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The file does not start with the `TGRF` magic bytes.
    #[error("not a TGRF file: bad magic {found:?}")]
    BadMagic { found: [u8; 4] },

    /// The file declares a format version this reader does not understand.
    #[error("unsupported TGRF version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },

    /// The file ends before a declared field is complete.
    #[error("file truncated at byte {offset}: {needed} more bytes needed")]
    Truncated { offset: usize, needed: usize },

    /// Bytes remain after the data segment.
    #[error("{count} trailing bytes after end of graph")]
    TrailingBytes { count: usize },

    /// A tensor entry is malformed (bad dtype code, oversized rank,
    /// data region out of bounds, ...).
    #[error("invalid tensor {index}: {detail}")]
    InvalidTensor { index: usize, detail: String },

    /// An op entry is malformed (unknown opcode, wrong arity, index out of
    /// range, use before production, ...).
    #[error("invalid op {index}: {detail}")]
    InvalidOp { index: usize, detail: String },

    /// The graph as a whole is inconsistent.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),
}
