// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Conversion between host value sequences and typed tensor buffers.
//!
//! Buffers hold elements in native byte order; row-major element order is
//! the host-visible ordering. Each dtype has an explicit conversion rule —
//! there is no implicit coercion ladder:
//!
//! | target           | accepted values                                   |
//! |------------------|---------------------------------------------------|
//! | `float32`        | `Float` (narrowed to f32), `Int`                  |
//! | integer types    | `Int` in range; `Float` with zero fractional part in range |
//! | `bool`           | `Bool` only                                       |
//!
//! Fractional floats never truncate into integer tensors and booleans never
//! coerce numerically; both are [`MarshalError::NotRepresentable`].
//! Non-finite floats are representable in `float32` (they are legitimate
//! IEEE 754 values; what the engine does with them is its own business).
//!
//! Writes are atomic: every value is converted before the first byte of the
//! destination changes, so a failure part-way through a sequence cannot
//! leave a half-written tensor.

use crate::{DType, MarshalError, Value};

/// Decodes a typed buffer into one host [`Value`] per element.
///
/// `src.len()` must be a multiple of the dtype's element size; complete
/// elements are decoded in order.
pub fn read_values(src: &[u8], dtype: DType) -> Vec<Value> {
    debug_assert_eq!(
        src.len() % dtype.size_bytes(),
        0,
        "buffer length must be a whole number of {dtype} elements",
    );
    match dtype {
        DType::F32 => src
            .chunks_exact(4)
            .map(|b| Value::Float(f32::from_ne_bytes([b[0], b[1], b[2], b[3]]) as f64))
            .collect(),
        DType::I32 => src
            .chunks_exact(4)
            .map(|b| Value::Int(i32::from_ne_bytes([b[0], b[1], b[2], b[3]]) as i64))
            .collect(),
        DType::I64 => src
            .chunks_exact(8)
            .map(|b| {
                Value::Int(i64::from_ne_bytes([
                    b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
                ]))
            })
            .collect(),
        DType::U8 => src.iter().map(|&b| Value::Int(b as i64)).collect(),
        DType::I8 => src.iter().map(|&b| Value::Int(b as i8 as i64)).collect(),
        DType::Bool => src.iter().map(|&b| Value::Bool(b != 0)).collect(),
    }
}

/// Encodes host values into an existing typed buffer.
///
/// The value count must equal the buffer's element count and every value
/// must be representable in `dtype`; otherwise the buffer is left untouched
/// and the corresponding [`MarshalError`] is returned. The buffer is never
/// grown, shrunk, or reallocated.
pub fn write_values(dst: &mut [u8], dtype: DType, values: &[Value]) -> Result<(), MarshalError> {
    let expected = dst.len() / dtype.size_bytes();
    if values.len() != expected {
        return Err(MarshalError::LengthMismatch {
            expected,
            got: values.len(),
        });
    }

    // Convert everything up front; only then touch the destination.
    match dtype {
        DType::F32 => {
            let elems = convert_all(values, dtype, try_f32)?;
            for (chunk, e) in dst.chunks_exact_mut(4).zip(elems) {
                chunk.copy_from_slice(&e.to_ne_bytes());
            }
        }
        DType::I32 => {
            let elems = convert_all(values, dtype, try_i32)?;
            for (chunk, e) in dst.chunks_exact_mut(4).zip(elems) {
                chunk.copy_from_slice(&e.to_ne_bytes());
            }
        }
        DType::I64 => {
            let elems = convert_all(values, dtype, try_i64)?;
            for (chunk, e) in dst.chunks_exact_mut(8).zip(elems) {
                chunk.copy_from_slice(&e.to_ne_bytes());
            }
        }
        DType::U8 => {
            let elems = convert_all(values, dtype, try_u8)?;
            dst.copy_from_slice(&elems);
        }
        DType::I8 => {
            let elems = convert_all(values, dtype, try_i8)?;
            for (b, e) in dst.iter_mut().zip(elems) {
                *b = e as u8;
            }
        }
        DType::Bool => {
            let elems = convert_all(values, dtype, try_bool)?;
            for (b, e) in dst.iter_mut().zip(elems) {
                *b = e as u8;
            }
        }
    }
    Ok(())
}

/// Runs one converter over the whole sequence, failing on the first value
/// that has no exact representation.
fn convert_all<T>(
    values: &[Value],
    dtype: DType,
    convert: fn(Value) -> Option<T>,
) -> Result<Vec<T>, MarshalError> {
    values
        .iter()
        .map(|&v| {
            convert(v).ok_or(MarshalError::NotRepresentable { value: v, dtype })
        })
        .collect()
}

fn try_f32(v: Value) -> Option<f32> {
    match v {
        Value::Int(i) => Some(i as f32),
        Value::Float(f) => Some(f as f32),
        Value::Bool(_) => None,
    }
}

fn try_i32(v: Value) -> Option<i32> {
    match v {
        Value::Int(i) => i32::try_from(i).ok(),
        Value::Float(f) if is_integral(f) && f >= i32::MIN as f64 && f <= i32::MAX as f64 => {
            Some(f as i32)
        }
        _ => None,
    }
}

fn try_i64(v: Value) -> Option<i64> {
    match v {
        Value::Int(i) => Some(i),
        // `i64::MAX as f64` rounds up to 2^63, so use it as an exclusive
        // bound; everything below it converts exactly.
        Value::Float(f) if is_integral(f) && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Some(f as i64)
        }
        _ => None,
    }
}

fn try_u8(v: Value) -> Option<u8> {
    match v {
        Value::Int(i) => u8::try_from(i).ok(),
        Value::Float(f) if is_integral(f) && (0.0..=255.0).contains(&f) => Some(f as u8),
        _ => None,
    }
}

fn try_i8(v: Value) -> Option<i8> {
    match v {
        Value::Int(i) => i8::try_from(i).ok(),
        Value::Float(f) if is_integral(f) && (-128.0..=127.0).contains(&f) => Some(f as i8),
        _ => None,
    }
}

fn try_bool(v: Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(b),
        _ => None,
    }
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(dtype: DType, values: &[Value]) -> Vec<Value> {
        let mut buf = vec![0u8; values.len() * dtype.size_bytes()];
        write_values(&mut buf, dtype, values).unwrap();
        read_values(&buf, dtype)
    }

    #[test]
    fn test_f32_roundtrip() {
        let vals = [
            Value::Float(0.5),
            Value::Float(-1.25),
            Value::Int(3),
            Value::Float(0.0),
        ];
        let back = roundtrip(DType::F32, &vals);
        assert_eq!(
            back,
            vec![
                Value::Float(0.5),
                Value::Float(-1.25),
                Value::Float(3.0),
                Value::Float(0.0),
            ]
        );
    }

    #[test]
    fn test_i32_roundtrip() {
        let vals = [Value::Int(-7), Value::Int(0), Value::Float(42.0)];
        let back = roundtrip(DType::I32, &vals);
        assert_eq!(back, vec![Value::Int(-7), Value::Int(0), Value::Int(42)]);
    }

    #[test]
    fn test_i64_roundtrip() {
        let big = i64::MAX - 1;
        let back = roundtrip(DType::I64, &[Value::Int(big), Value::Int(i64::MIN)]);
        assert_eq!(back, vec![Value::Int(big), Value::Int(i64::MIN)]);
    }

    #[test]
    fn test_u8_roundtrip() {
        let back = roundtrip(DType::U8, &[Value::Int(0), Value::Int(255), Value::Float(7.0)]);
        assert_eq!(back, vec![Value::Int(0), Value::Int(255), Value::Int(7)]);
    }

    #[test]
    fn test_i8_roundtrip() {
        let back = roundtrip(DType::I8, &[Value::Int(-128), Value::Int(127)]);
        assert_eq!(back, vec![Value::Int(-128), Value::Int(127)]);
    }

    #[test]
    fn test_bool_roundtrip() {
        let back = roundtrip(DType::Bool, &[Value::Bool(true), Value::Bool(false)]);
        assert_eq!(back, vec![Value::Bool(true), Value::Bool(false)]);
    }

    #[test]
    fn test_length_mismatch_leaves_buffer_untouched() {
        let mut buf = vec![0u8; 7 * 4]; // 7 f32 elements
        write_values(&mut buf, DType::F32, &[Value::Float(9.0); 7]).unwrap();
        let before = buf.clone();

        let err = write_values(&mut buf, DType::F32, &[Value::Float(1.0); 3]).unwrap_err();
        assert_eq!(
            err,
            MarshalError::LengthMismatch {
                expected: 7,
                got: 3
            }
        );
        assert_eq!(buf, before);
    }

    #[test]
    fn test_partial_conversion_failure_is_atomic() {
        let mut buf = vec![0u8; 3 * 4];
        write_values(&mut buf, DType::I32, &[Value::Int(1); 3]).unwrap();
        let before = buf.clone();

        // Second value is unrepresentable; the first must not be written.
        let err = write_values(
            &mut buf,
            DType::I32,
            &[Value::Int(5), Value::Float(0.5), Value::Int(6)],
        )
        .unwrap_err();
        assert!(matches!(err, MarshalError::NotRepresentable { .. }));
        assert_eq!(buf, before);
    }

    #[test]
    fn test_fractional_float_rejected_by_integer_dtypes() {
        for dtype in [DType::I32, DType::I64, DType::U8, DType::I8] {
            let mut buf = vec![0u8; dtype.size_bytes()];
            let err = write_values(&mut buf, dtype, &[Value::Float(1.5)]).unwrap_err();
            assert!(matches!(err, MarshalError::NotRepresentable { .. }), "{dtype}");
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut buf = vec![0u8; 1];
        assert!(write_values(&mut buf, DType::U8, &[Value::Int(256)]).is_err());
        assert!(write_values(&mut buf, DType::U8, &[Value::Int(-1)]).is_err());
        assert!(write_values(&mut buf, DType::I8, &[Value::Int(128)]).is_err());

        let mut buf = vec![0u8; 4];
        assert!(write_values(&mut buf, DType::I32, &[Value::Int(i64::MAX)]).is_err());
    }

    #[test]
    fn test_bool_never_coerces() {
        let mut buf = vec![0u8; 4];
        assert!(write_values(&mut buf, DType::F32, &[Value::Bool(true)]).is_err());
        assert!(write_values(&mut buf, DType::I32, &[Value::Bool(false)]).is_err());

        let mut buf = vec![0u8; 1];
        assert!(write_values(&mut buf, DType::Bool, &[Value::Int(1)]).is_err());
        assert!(write_values(&mut buf, DType::Bool, &[Value::Float(0.0)]).is_err());
    }

    #[test]
    fn test_nonfinite_floats_representable_in_f32() {
        let mut buf = vec![0u8; 8];
        write_values(
            &mut buf,
            DType::F32,
            &[Value::Float(f64::INFINITY), Value::Float(f64::NAN)],
        )
        .unwrap();
        let back = read_values(&buf, DType::F32);
        assert_eq!(back[0], Value::Float(f64::INFINITY));
        assert!(matches!(back[1], Value::Float(f) if f.is_nan()));
    }

    #[test]
    fn test_i8_sign_preserved() {
        let back = roundtrip(DType::I8, &[Value::Int(-1)]);
        assert_eq!(back, vec![Value::Int(-1)]);
    }

    #[test]
    fn test_read_bool_nonzero_is_true() {
        let buf = [0u8, 1, 2, 255];
        let vals = read_values(&buf, DType::Bool);
        assert_eq!(
            vals,
            vec![
                Value::Bool(false),
                Value::Bool(true),
                Value::Bool(true),
                Value::Bool(true),
            ]
        );
    }
}
