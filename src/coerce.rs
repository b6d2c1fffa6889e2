// Copyright (c) Conforma contributors.
// Licensed under the MIT License.

//! Total coercion primitives.
//!
//! Each `try_*` classifier answers "can this input be read as the target
//! kind?" and returns `None` instead of failing; the matching `coerce_*`
//! wrapper substitutes a fallback. Numeric fallbacks pass through the same
//! min/max clamp as successfully converted values, so a caller-supplied
//! default can never escape the configured range.

use std::rc::Rc;
use std::str::FromStr;

use crate::number::Number;
use crate::value::Value;

// Math.max(min, Math.min(max, v)): when the bounds cross, min wins.
fn clamp_i64(v: i64, min: i64, max: i64) -> i64 {
    v.min(max).max(min)
}

fn clamp_f64(v: f64, min: f64, max: f64) -> f64 {
    v.min(max).max(min)
}

/// Truthiness of a present value. `None` for absent input and for NaN,
/// which signals a malformed upstream computation rather than a value.
pub fn try_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Undefined | Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::Number(n) => {
            if n.is_nan() {
                None
            } else {
                // -0 and 0 are falsy; infinities and everything else truthy.
                Some(n.to_f64_lossy() != 0.0)
            }
        }
        Value::String(s) => Some(!s.is_empty()),
        Value::Array(_) | Value::Object(_) => Some(true),
    }
}

pub fn coerce_bool(v: &Value, fallback: bool) -> bool {
    try_bool(v).unwrap_or(fallback)
}

fn int_from_f64(f: f64, min: i64, max: i64) -> Option<i64> {
    if f.is_nan() {
        return None;
    }
    if f == f64::INFINITY {
        return Some(max.max(min));
    }
    if f == f64::NEG_INFINITY {
        return Some(min);
    }
    // Truncate toward zero; -0 normalizes to 0 on the cast.
    let t = f.trunc();
    let saturated = if t >= i64::MAX as f64 {
        i64::MAX
    } else if t <= i64::MIN as f64 {
        i64::MIN
    } else {
        t as i64
    };
    Some(clamp_i64(saturated, min, max))
}

fn int_from_number(n: &Number, min: i64, max: i64) -> Option<i64> {
    match n {
        Number::UInt(u) => {
            let v = i64::try_from(*u).unwrap_or(i64::MAX);
            Some(clamp_i64(v, min, max))
        }
        Number::Int(i) => Some(clamp_i64(*i, min, max)),
        Number::Float(f) => int_from_f64(*f, min, max),
        // Arbitrary-precision integers do not convert; they fall back.
        Number::BigInt(_) => None,
    }
}

/// Bounded integer view of a present value. Infinities clamp to the bounds
/// (they read as "very large", not invalid); NaN, big integers, sequences
/// and maps yield `None`; numeric strings parse numerically.
pub fn try_int(v: &Value, min: i64, max: i64) -> Option<i64> {
    match v {
        Value::Undefined | Value::Null => None,
        Value::Bool(b) => Some(clamp_i64(*b as i64, min, max)),
        Value::Number(n) => int_from_number(n, min, max),
        Value::String(s) => {
            // The empty string reads as zero, the way '' * 1 does.
            if s.trim().is_empty() {
                return Some(clamp_i64(0, min, max));
            }
            match Number::from_str(s) {
                // A huge integer literal inside a string is numeric text,
                // not an arbitrary-precision value; treat it as a float.
                Ok(Number::BigInt(b)) => {
                    int_from_f64(Number::BigInt(b).to_f64_lossy(), min, max)
                }
                Ok(n) => int_from_number(&n, min, max),
                Err(_) => None,
            }
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}

pub fn coerce_int(v: &Value, fallback: i64, min: i64, max: i64) -> i64 {
    try_int(v, min, max).unwrap_or_else(|| clamp_i64(fallback, min, max))
}

fn float_from_f64(f: f64, min: f64, max: f64) -> Option<f64> {
    if f.is_nan() {
        return None;
    }
    let v = clamp_f64(f, min, max);
    // -0 normalizes to 0.
    Some(if v == 0.0 { 0.0 } else { v })
}

fn float_from_number(n: &Number, min: f64, max: f64) -> Option<f64> {
    match n {
        Number::BigInt(_) => None,
        _ => float_from_f64(n.to_f64_lossy(), min, max),
    }
}

/// Bounded float view of a present value; same rules as [`try_int`] without
/// truncation.
pub fn try_float(v: &Value, min: f64, max: f64) -> Option<f64> {
    match v {
        Value::Undefined | Value::Null => None,
        Value::Bool(b) => float_from_f64(*b as u8 as f64, min, max),
        Value::Number(n) => float_from_number(n, min, max),
        Value::String(s) => {
            if s.trim().is_empty() {
                return float_from_f64(0.0, min, max);
            }
            match Number::from_str(s) {
                Ok(Number::BigInt(b)) => {
                    float_from_f64(Number::BigInt(b).to_f64_lossy(), min, max)
                }
                Ok(n) => float_from_number(&n, min, max),
                Err(_) => None,
            }
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}

pub fn coerce_float(v: &Value, fallback: f64, min: f64, max: f64) -> f64 {
    try_float(v, min, max)
        .unwrap_or_else(|| float_from_f64(fallback, min, max).unwrap_or(0.0))
}

/// String view of a present value. Only strings, booleans, big integers and
/// finite numbers convert; `-0` renders as `"0"`.
pub fn try_str(v: &Value) -> Option<Rc<str>> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "true".into() } else { "false".into() }),
        Value::Number(n) => match n {
            Number::Float(f) => {
                if !f.is_finite() {
                    None
                } else if *f == 0.0 {
                    Some("0".into())
                } else {
                    Some(n.format_decimal().into())
                }
            }
            _ => Some(n.format_decimal().into()),
        },
        _ => None,
    }
}

pub fn coerce_str(v: &Value, fallback: &str) -> Rc<str> {
    try_str(v).unwrap_or_else(|| fallback.into())
}

/// Keyed-map view of a present value; sequences do not qualify.
pub fn try_obj(v: &Value) -> Option<&Value> {
    match v {
        Value::Object(_) => Some(v),
        _ => None,
    }
}

pub fn coerce_obj(v: &Value) -> Value {
    match v {
        Value::Object(_) => v.clone(),
        _ => Value::new_object(),
    }
}
