// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The interpreter lifecycle ladder.
//!
//! ```text
//! Built ──allocate_tensors()──▶ Allocated ──invoke()──▶ Invoked
//!                                   ▲                      │
//!                                   └──────invoke()────────┘
//! ```
//!
//! Tensor access and `invoke()` require at least `Allocated`; calling them
//! earlier yields [`Error::Lifecycle`](crate::Error::Lifecycle) rather than
//! a crash. The ladder only moves forward: a failed `allocate_tensors()`
//! stays in `Built`, a failed `invoke()` keeps its current stage.

use std::fmt;

/// Where an [`Interpreter`](crate::Interpreter) is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Session built, no tensor buffers yet.
    Built,
    /// Buffers allocated; inputs can be written, nothing has run.
    Allocated,
    /// At least one successful `invoke()`; outputs are meaningful.
    Invoked,
}

impl Stage {
    /// Returns a lowercase label for messages and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Built => "built",
            Self::Allocated => "allocated",
            Self::Invoked => "invoked",
        }
    }

    /// Returns `true` once tensor buffers exist.
    pub fn is_allocated(self) -> bool {
        !matches!(self, Self::Built)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
