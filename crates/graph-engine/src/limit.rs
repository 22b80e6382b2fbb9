// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Memory limit configuration and parsing.
//!
//! A [`MemoryLimit`] caps the total bytes a session may allocate for its
//! tensor buffers. It supports human-readable string parsing for CLI
//! ergonomics.

use crate::EngineError;
use std::fmt;

const KIB: usize = 1024;
const MIB: usize = 1024 * 1024;
const GIB: usize = 1024 * 1024 * 1024;

/// A hard ceiling on session buffer memory.
///
/// # Parsing
/// Supports human-readable strings with SI-style suffixes:
/// - `"512M"` or `"512MB"` → 512 × 1024² bytes
/// - `"1G"` or `"1GB"` → 1 × 1024³ bytes
/// - `"64K"` or `"64KB"` → 64 × 1024 bytes
/// - `"1048576"` → raw byte count
///
/// # Examples
/// ```
/// use graph_engine::MemoryLimit;
///
/// let limit = MemoryLimit::parse("4M").unwrap();
/// assert_eq!(limit.as_bytes(), 4 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MemoryLimit {
    bytes: usize,
}

impl MemoryLimit {
    /// Creates a limit from a byte count.
    pub fn from_bytes(bytes: usize) -> Self {
        Self { bytes }
    }

    /// Creates a limit from kibibytes.
    pub fn from_kb(kb: usize) -> Self {
        Self { bytes: kb * KIB }
    }

    /// Creates a limit from mebibytes.
    pub fn from_mb(mb: usize) -> Self {
        Self { bytes: mb * MIB }
    }

    /// Returns the limit in bytes.
    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Parses a human-readable limit string.
    ///
    /// Accepted formats: `"512M"`, `"512MB"`, `"1G"`, `"1GB"`, `"64K"`,
    /// `"64KB"`, or a plain byte count. Case-insensitive.
    pub fn parse(s: &str) -> Result<Self, EngineError> {
        let s = s.trim();
        let upper = s.to_uppercase();

        let suffixes: [(&str, usize); 7] = [
            ("GB", GIB),
            ("MB", MIB),
            ("KB", KIB),
            ("G", GIB),
            ("M", MIB),
            ("K", KIB),
            ("B", 1),
        ];
        let (digits, multiplier) = suffixes
            .iter()
            .find(|(suffix, _)| upper.ends_with(suffix))
            .map(|&(suffix, mult)| (&s[..s.len() - suffix.len()], mult))
            .unwrap_or((s, 1));

        let value: usize = digits.trim().parse().map_err(|_| {
            EngineError::InvalidLimit(format!(
                "'{s}': expected a number with an optional K/M/G suffix"
            ))
        })?;
        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| EngineError::InvalidLimit(format!("'{s}' overflows usize")))?;
        if bytes == 0 {
            return Err(EngineError::InvalidLimit(format!("'{s}' is zero")));
        }
        Ok(Self { bytes })
    }
}

impl fmt::Display for MemoryLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bytes >= GIB && self.bytes % GIB == 0 {
            write!(f, "{} GB", self.bytes / GIB)
        } else if self.bytes >= MIB && self.bytes % MIB == 0 {
            write!(f, "{} MB", self.bytes / MIB)
        } else if self.bytes >= KIB && self.bytes % KIB == 0 {
            write!(f, "{} KB", self.bytes / KIB)
        } else {
            write!(f, "{} B", self.bytes)
        }
    }
}
