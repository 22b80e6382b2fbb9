// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Row-major tensor shapes with overflow-checked sizing.

use std::fmt;

/// The extents of a tensor, outermost dimension first.
///
/// A `Shape` is immutable after construction. A dimension of `0` stands
/// for an extent the model left unresolved (a dynamic dimension); such a
/// tensor has no fixed byte size and cannot be given a buffer until the
/// extent is known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    dims: Box<[usize]>,
}

impl Shape {
    /// Builds a shape from explicit dimensions.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(vec![2, 3, 4]);
    /// assert_eq!(s.rank(), 3);
    /// assert_eq!(s.num_elements(), 24);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self {
            dims: dims.into_boxed_slice(),
        }
    }

    /// A rank-0 shape holding exactly one element.
    pub fn scalar() -> Self {
        Self::new(Vec::new())
    }

    /// A rank-1 shape of `len` elements.
    pub fn vector(len: usize) -> Self {
        Self::new(vec![len])
    }

    /// A rank-2 shape of `rows * cols` elements.
    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self::new(vec![rows, cols])
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total element count; `1` for a scalar, `0` if any dimension is
    /// dynamic.
    ///
    /// May wrap for absurd shapes; sizing code that feeds an allocator
    /// must use [`checked_num_elements`](Self::checked_num_elements)
    /// instead.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// Element count, or `None` if the product overflows `usize`.
    pub fn checked_num_elements(&self) -> Option<usize> {
        self.dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// The dimensions, outermost first.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// `true` if any dimension is `0` (an unresolved dynamic extent).
    pub fn has_dynamic_dim(&self) -> bool {
        self.dims.contains(&0)
    }

    /// Byte footprint of a dense buffer of this shape.
    pub fn size_bytes(&self, dtype: super::DType) -> usize {
        self.num_elements() * dtype.size_bytes()
    }

    /// Byte footprint, or `None` on overflow.
    pub fn checked_size_bytes(&self, dtype: super::DType) -> Option<usize> {
        self.checked_num_elements()?
            .checked_mul(dtype.size_bytes())
    }

    /// Row-major strides, in elements: how far the flat index moves when
    /// one coordinate of the corresponding dimension advances by one.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = Vec::with_capacity(self.dims.len());
        let mut step = 1usize;
        for &d in self.dims.iter().rev() {
            strides.push(step);
            step = step.saturating_mul(d);
        }
        strides.reverse();
        strides
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.dims.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", dims.join(", "))
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DType;

    #[test]
    fn test_scalar_is_one_element() {
        let s = Shape::scalar();
        assert_eq!(s.rank(), 0);
        assert_eq!(s.num_elements(), 1);
        assert_eq!(s.size_bytes(DType::F32), 4);
        assert!(s.strides().is_empty());
        assert!(!s.has_dynamic_dim());
    }

    #[test]
    fn test_constructors_agree_with_new() {
        assert_eq!(Shape::vector(6), Shape::new(vec![6]));
        assert_eq!(Shape::matrix(2, 5), Shape::new(vec![2, 5]));
    }

    #[test]
    fn test_element_and_byte_counts() {
        let s = Shape::new(vec![3, 4]);
        assert_eq!(s.num_elements(), 12);
        assert_eq!(s.size_bytes(DType::F32), 48);
        assert_eq!(s.checked_size_bytes(DType::I64), Some(96));
        assert_eq!(s.checked_size_bytes(DType::Bool), Some(12));
    }

    #[test]
    fn test_strides_row_major() {
        assert_eq!(Shape::vector(5).strides(), vec![1]);
        assert_eq!(Shape::matrix(3, 4).strides(), vec![4, 1]);
        assert_eq!(Shape::new(vec![2, 3, 4]).strides(), vec![12, 4, 1]);
    }

    #[test]
    fn test_dynamic_dim_zeroes_the_count() {
        let s = Shape::new(vec![1, 0, 3]);
        assert!(s.has_dynamic_dim());
        assert_eq!(s.num_elements(), 0);
        assert_eq!(s.checked_num_elements(), Some(0));
    }

    #[test]
    fn test_overflow_is_caught() {
        let s = Shape::new(vec![usize::MAX, 2]);
        assert_eq!(s.checked_num_elements(), None);
        assert_eq!(s.checked_size_bytes(DType::F32), None);

        // Element count fits but the byte count does not.
        let tight = Shape::new(vec![usize::MAX / 2]);
        assert_eq!(tight.checked_size_bytes(DType::I32), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::new(vec![2, 3, 4]).to_string(), "[2, 3, 4]");
        assert_eq!(Shape::scalar().to_string(), "[]");
        assert_eq!(Shape::vector(0).to_string(), "[0]");
    }

    #[test]
    fn test_from_conversions() {
        let a: Shape = vec![4, 2].into();
        let b: Shape = (&[4, 2][..]).into();
        assert_eq!(a, b);
        assert_eq!(a.dims(), &[4, 2]);
    }
}
