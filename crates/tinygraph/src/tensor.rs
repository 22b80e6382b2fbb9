// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor views: short-lived handles into interpreter-owned buffers.
//!
//! A view never owns data. [`Tensor`] borrows the interpreter immutably,
//! [`TensorMut`] mutably, so the borrow checker rules out holding a view
//! across `invoke()` or interpreter drop. Views are resolved fresh from a
//! `(side, index)` pair on every accessor call and are meant to be
//! discarded immediately after use.

use crate::Error;
use std::fmt;
use tensor_core::{marshal, DType, Shape, TensorInfo, Value};

/// Which tensor list an index points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Input,
    Output,
}

impl Side {
    /// Returns a lowercase label for messages and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of one interpreter tensor.
#[derive(Debug)]
pub struct Tensor<'a> {
    info: TensorInfo,
    bytes: &'a [u8],
}

impl<'a> Tensor<'a> {
    pub(crate) fn new(info: TensorInfo, bytes: &'a [u8]) -> Self {
        Self { info, bytes }
    }

    /// The tensor's name; may be empty.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// The element data type.
    pub fn dtype(&self) -> DType {
        self.info.dtype
    }

    /// The row-major shape.
    pub fn shape(&self) -> &Shape {
        &self.info.shape
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.info.shape.rank()
    }

    /// Number of elements in the buffer.
    pub fn element_count(&self) -> usize {
        self.info.element_count()
    }

    /// Size of the underlying buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Copies the buffer out as host values, one per element, row-major.
    ///
    /// Values are faithful to the raw buffer: no rounding, no clamping, no
    /// thresholding. Floats come back as [`Value::Float`], every integer
    /// dtype as [`Value::Int`], booleans as [`Value::Bool`].
    pub fn data(&self) -> Vec<Value> {
        marshal::read_values(self.bytes, self.info.dtype)
    }

    /// The raw native-endian buffer bytes.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

/// Mutable view of one interpreter tensor.
#[derive(Debug)]
pub struct TensorMut<'a> {
    info: TensorInfo,
    bytes: &'a mut [u8],
}

impl<'a> TensorMut<'a> {
    pub(crate) fn new(info: TensorInfo, bytes: &'a mut [u8]) -> Self {
        Self { info, bytes }
    }

    /// The tensor's name; may be empty.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// The element data type.
    pub fn dtype(&self) -> DType {
        self.info.dtype
    }

    /// The row-major shape.
    pub fn shape(&self) -> &Shape {
        &self.info.shape
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.info.shape.rank()
    }

    /// Number of elements in the buffer.
    pub fn element_count(&self) -> usize {
        self.info.element_count()
    }

    /// Size of the underlying buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Copies the buffer out as host values; see [`Tensor::data`].
    pub fn data(&self) -> Vec<Value> {
        marshal::read_values(self.bytes, self.info.dtype)
    }

    /// The raw native-endian buffer bytes.
    pub fn bytes(&self) -> &[u8] {
        self.bytes
    }

    /// Converts and writes one host value per element into the buffer.
    ///
    /// The write is atomic: the value count is checked against the element
    /// count, then every value is converted, and only if all of that
    /// succeeds is the buffer modified. The buffer is never resized or
    /// reallocated.
    ///
    /// # Errors
    /// [`Error::ShapeMismatch`] if `values.len()` differs from
    /// [`element_count`](TensorMut::element_count);
    /// [`Error::DTypeConversion`] if any value does not fit the dtype
    /// (fractional or out-of-range values for integer targets, booleans
    /// for numeric targets and vice versa). On either error the previous
    /// buffer contents are intact.
    pub fn set_data(&mut self, values: &[Value]) -> Result<(), Error> {
        marshal::write_values(self.bytes, self.info.dtype, values).map_err(|e| match e {
            tensor_core::MarshalError::LengthMismatch { expected, got } => Error::ShapeMismatch {
                shape: self.info.shape.clone(),
                expected,
                got,
            },
            tensor_core::MarshalError::NotRepresentable { value, dtype } => {
                Error::DTypeConversion { value, dtype }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(dims: &[usize], dtype: DType) -> TensorInfo {
        TensorInfo::new("t", dtype, Shape::new(dims.to_vec()))
    }

    #[test]
    fn test_read_view_metadata() {
        let bytes = [0u8; 24];
        let t = Tensor::new(info(&[2, 3], DType::F32), &bytes);
        assert_eq!(t.name(), "t");
        assert_eq!(t.rank(), 2);
        assert_eq!(t.element_count(), 6);
        assert_eq!(t.byte_len(), 24);
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let mut bytes = [0u8; 12];
        let mut t = TensorMut::new(info(&[3], DType::F32), &mut bytes);
        t.set_data(&[Value::Float(1.5), Value::Int(2), Value::Float(-0.25)])
            .unwrap();
        assert_eq!(
            t.data(),
            vec![Value::Float(1.5), Value::Float(2.0), Value::Float(-0.25)]
        );
    }

    #[test]
    fn test_length_mismatch_leaves_buffer() {
        let mut bytes = [0u8; 28];
        let mut t = TensorMut::new(info(&[7], DType::F32), &mut bytes);
        t.set_data(&[Value::Float(9.0); 7]).unwrap();

        let err = t.set_data(&[Value::Float(1.0); 3]).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch { expected: 7, got: 3, .. }
        ));
        assert_eq!(t.data(), vec![Value::Float(9.0); 7]);
    }

    #[test]
    fn test_conversion_failure_is_atomic() {
        let mut bytes = [0u8; 8];
        let mut t = TensorMut::new(info(&[2], DType::I32), &mut bytes);
        t.set_data(&[Value::Int(4), Value::Int(5)]).unwrap();

        // Second value is fractional; the first must not land either.
        let err = t
            .set_data(&[Value::Int(1), Value::Float(0.5)])
            .unwrap_err();
        assert!(matches!(err, Error::DTypeConversion { .. }));
        assert_eq!(t.data(), vec![Value::Int(4), Value::Int(5)]);
    }

    #[test]
    fn test_bool_buffer() {
        let mut bytes = [0u8; 3];
        let mut t = TensorMut::new(info(&[3], DType::Bool), &mut bytes);
        t.set_data(&[Value::Bool(true), Value::Bool(false), Value::Bool(true)])
            .unwrap();
        assert_eq!(
            t.data(),
            vec![Value::Bool(true), Value::Bool(false), Value::Bool(true)]
        );
        assert!(matches!(
            t.set_data(&[Value::Int(1), Value::Int(0), Value::Int(1)]),
            Err(Error::DTypeConversion { .. })
        ));
    }

    #[test]
    fn test_side_labels() {
        assert_eq!(Side::Input.to_string(), "input");
        assert_eq!(Side::Output.to_string(), "output");
    }
}
