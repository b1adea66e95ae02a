//! Numeric narrowing for JSON arrays decoded into runtime-typed buffers.

use serde_json::Value;

use super::json_kind;
use crate::util::{Error, Number, Result, ScalarType};

/// Largest integer magnitude a `float32` represents exactly (2^24).
const F32_EXACT_LIMIT: u64 = 1 << 24;

/// Pick the narrowest element type that holds every value of `items`
/// losslessly.
///
/// - any float present: `Float32`, unless some value exceeds 2^24 in
///   magnitude or changes its decimal value through `float32`, then `Float64`
/// - integers with a negative minimum: smallest signed type covering both
///   the minimum and the maximum
/// - non-negative integers: smallest unsigned type covering the maximum
/// - empty input: `Uint8`
///
/// Non-numeric elements and integer sets no type can hold (a negative
/// together with a value above `i64::MAX`) are errors.
pub fn figure_out_array_type(items: &[Value]) -> Result<ScalarType> {
    let mut smallest_int: i64 = 0;
    let mut biggest_int: u64 = 0;
    let mut is_float = false;
    let mut needs_double = false;

    for item in items {
        let n = match item {
            Value::Number(n) => Number::from(n),
            other => return Err(Error::mismatch("number", json_kind(other))),
        };
        match n {
            Number::Int(i) => {
                smallest_int = smallest_int.min(i);
                needs_double |= i.unsigned_abs() > F32_EXACT_LIMIT;
            }
            Number::UInt(u) => {
                biggest_int = biggest_int.max(u);
                needs_double |= u > F32_EXACT_LIMIT;
            }
            Number::Float(f) => {
                is_float = true;
                needs_double |= f.abs() > F32_EXACT_LIMIT as f64 || !survives_f32(f);
            }
        }
    }

    if is_float {
        return Ok(if needs_double {
            ScalarType::Float64
        } else {
            ScalarType::Float32
        });
    }

    if smallest_int < 0 {
        let fits = |min: i64, max: i64| smallest_int >= min && biggest_int <= max as u64;
        return [
            (ScalarType::Int8, i8::MIN as i64, i8::MAX as i64),
            (ScalarType::Int16, i16::MIN as i64, i16::MAX as i64),
            (ScalarType::Int32, i32::MIN as i64, i32::MAX as i64),
            (ScalarType::Int64, i64::MIN, i64::MAX),
        ]
        .into_iter()
        .find(|&(_, min, max)| fits(min, max))
        .map(|(ty, _, _)| ty)
        .ok_or_else(|| Error::NumericRange {
            value: biggest_int.to_string(),
            target: ScalarType::Int64,
        });
    }

    Ok(if biggest_int <= u8::MAX as u64 {
        ScalarType::Uint8
    } else if biggest_int <= u16::MAX as u64 {
        ScalarType::Uint16
    } else if biggest_int <= u32::MAX as u64 {
        ScalarType::Uint32
    } else {
        ScalarType::Uint64
    })
}

/// True if `f` prints back to the same decimal value after a trip through
/// `f32`.
fn survives_f32(f: f64) -> bool {
    let narrowed = f as f32;
    narrowed.to_string().parse::<f64>().is_ok_and(|back| back == f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn narrow(v: Value) -> Result<ScalarType> {
        figure_out_array_type(v.as_array().unwrap())
    }

    #[test]
    fn test_small_unsigned() {
        assert_eq!(narrow(json!([1, 2, 255])).unwrap(), ScalarType::Uint8);
        assert_eq!(narrow(json!([0, 256])).unwrap(), ScalarType::Uint16);
        assert_eq!(narrow(json!([70000])).unwrap(), ScalarType::Uint32);
        assert_eq!(narrow(json!([u64::MAX])).unwrap(), ScalarType::Uint64);
    }

    #[test]
    fn test_signed() {
        assert_eq!(narrow(json!([-1, 127])).unwrap(), ScalarType::Int8);
        assert_eq!(narrow(json!([-128])).unwrap(), ScalarType::Int8);
        assert_eq!(narrow(json!([-1, 200])).unwrap(), ScalarType::Int16);
        assert_eq!(narrow(json!([-40000, 1])).unwrap(), ScalarType::Int32);
        assert_eq!(narrow(json!([i64::MIN, i64::MAX])).unwrap(), ScalarType::Int64);
    }

    #[test]
    fn test_floats() {
        assert_eq!(narrow(json!([1.5, 2])).unwrap(), ScalarType::Float32);
        assert_eq!(narrow(json!([0.1, 0.25])).unwrap(), ScalarType::Float32);
        assert_eq!(narrow(json!([0.5, 16777217])).unwrap(), ScalarType::Float64);
        assert_eq!(narrow(json!([0.123456789])).unwrap(), ScalarType::Float64);
        assert_eq!(narrow(json!([1e30])).unwrap(), ScalarType::Float64);
    }

    #[test]
    fn test_empty_is_uint8() {
        assert_eq!(narrow(json!([])).unwrap(), ScalarType::Uint8);
    }

    #[test]
    fn test_no_lossless_fit() {
        let err = narrow(json!([-1, u64::MAX])).unwrap_err();
        assert!(matches!(err, Error::NumericRange { target: ScalarType::Int64, .. }));
    }

    #[test]
    fn test_non_numeric() {
        assert!(matches!(
            narrow(json!([1, "two"])).unwrap_err(),
            Error::TypeMismatch { .. }
        ));
    }
}
