// Copyright (c) Conforma contributors.
// Licensed under the MIT License.

use core::cmp::Ordering;
use core::fmt::{Debug, Formatter};
use core::str::FromStr;
use std::rc::Rc;

use num_bigint::BigInt as NumBigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use serde::ser::Serializer;
use serde::Serialize;

pub type BigInt = NumBigInt;

const F64_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0; // 2^53

/// Numeric value. Integers keep exact representations (`u64`/`i64`, falling
/// back to an arbitrary-precision integer when they do not fit); everything
/// else is an `f64`, including the IEEE-754 specials that drive the coercion
/// fallback rules.
#[derive(Clone)]
pub enum Number {
    UInt(u64),
    Int(i64),
    Float(f64),
    BigInt(Rc<BigInt>),
}

impl Number {
    fn from_bigint_owned(value: BigInt) -> Self {
        if value.is_zero() {
            return Number::Int(0);
        }

        if value.is_negative() {
            if let Some(i) = value.to_i64() {
                return Number::Int(i);
            }
        } else if let Some(u) = value.to_u64() {
            return Number::UInt(u);
        }

        Number::BigInt(Rc::new(value))
    }

    fn float_to_small_bigint(value: f64) -> Option<BigInt> {
        if !value.is_finite() || value.fract() != 0.0 || value.abs() > F64_SAFE_INTEGER {
            return None;
        }
        Some(BigInt::from(value as i64))
    }

    fn to_bigint_owned(&self) -> Option<BigInt> {
        match self {
            Number::UInt(v) => Some(BigInt::from(*v)),
            Number::Int(v) => Some(BigInt::from(*v)),
            Number::BigInt(v) => Some((**v).clone()),
            Number::Float(f) => Self::float_to_small_bigint(*f),
        }
    }

    /// Lossy `f64` view. Big integers beyond `f64` range saturate to
    /// ±infinity, which is what makes them behave as "very large" under the
    /// clamping rules.
    pub fn to_f64_lossy(&self) -> f64 {
        match self {
            Number::UInt(v) => *v as f64,
            Number::Int(v) => *v as f64,
            Number::Float(v) => *v,
            Number::BigInt(v) => {
                if let Some(f) = v.to_f64() {
                    f
                } else if v.is_negative() {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                }
            }
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Number::UInt(v) => Some(*v),
            Number::Int(v) if *v >= 0 => Some(*v as u64),
            Number::BigInt(v) => v.to_u64(),
            Number::Float(f) => {
                if f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64 {
                    let candidate = *f as u64;
                    if (candidate as f64) == *f {
                        return Some(candidate);
                    }
                }
                None
            }
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::UInt(v) if *v <= i64::MAX as u64 => Some(*v as i64),
            Number::Int(v) => Some(*v),
            Number::BigInt(v) => v.to_i64(),
            Number::Float(f) => {
                if f.is_finite()
                    && f.fract() == 0.0
                    && *f >= i64::MIN as f64
                    && *f <= i64::MAX as f64
                {
                    let candidate = *f as i64;
                    if (candidate as f64) == *f {
                        return Some(candidate);
                    }
                }
                None
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Number::Float(f) if f.is_finite() => Some(*f),
            Number::UInt(v) if *v <= F64_SAFE_INTEGER as u64 => Some(*v as f64),
            Number::Int(v) if v.unsigned_abs() <= F64_SAFE_INTEGER as u64 => Some(*v as f64),
            Number::BigInt(v) if v.bits() <= 53 => v.to_f64(),
            _ => None,
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Number::Float(f) if f.is_nan())
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Number::Float(f) => f.is_finite(),
            _ => true,
        }
    }

    /// True if the number fits `i64` exactly after the usual float checks.
    pub fn is_integer(&self) -> bool {
        match self {
            Number::UInt(_) | Number::Int(_) | Number::BigInt(_) => true,
            Number::Float(f) => f.is_finite() && f.fract() == 0.0,
        }
    }

    /// True for integers that do not fit the machine word; these are the
    /// "arbitrary-precision" inputs the numeric coercions refuse.
    pub fn is_big(&self) -> bool {
        matches!(self, Number::BigInt(_))
    }

    pub fn format_decimal(&self) -> String {
        match self {
            Number::UInt(v) => v.to_string(),
            Number::Int(v) => v.to_string(),
            Number::BigInt(v) => v.to_string(),
            Number::Float(f) => {
                if f.is_nan() {
                    "NaN".to_string()
                } else {
                    f.to_string()
                }
            }
        }
    }
}

impl Debug for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.format_decimal())
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            // NaN and the infinities have no JSON form.
            Number::Float(f) if !f.is_finite() => serializer.serialize_none(),
            _ => {
                let s = self.format_decimal();
                let v = serde_json::Number::from_str(&s)
                    .map_err(|_| serde::ser::Error::custom("could not serialize number"))?;
                v.serialize(serializer)
            }
        }
    }
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Number::from_bigint_owned(value)
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Number::UInt(value)
    }
}

impl From<usize> for Number {
    fn from(value: usize) -> Self {
        Number::UInt(value as u64)
    }
}

impl From<u128> for Number {
    fn from(value: u128) -> Self {
        if let Ok(n) = u64::try_from(value) {
            Number::UInt(n)
        } else {
            Number::from_bigint_owned(BigInt::from(value))
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Int(value as i64)
    }
}

impl From<i128> for Number {
    fn from(value: i128) -> Self {
        if let Ok(i) = i64::try_from(value) {
            Number::Int(i)
        } else {
            Number::from_bigint_owned(BigInt::from(value))
        }
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseNumberError;

impl FromStr for Number {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseNumberError);
        }

        let is_integer_literal =
            !trimmed.contains('.') && !trimmed.contains('e') && !trimmed.contains('E');

        if is_integer_literal {
            let (sign, digits) = if let Some(rest) = trimmed.strip_prefix('-') {
                (-1, rest)
            } else if let Some(rest) = trimmed.strip_prefix('+') {
                (1, rest)
            } else {
                (1, trimmed)
            };

            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                if let Some(mut value) = BigInt::parse_bytes(digits.as_bytes(), 10) {
                    if sign < 0 {
                        value = -value;
                    }
                    return Ok(Number::from_bigint_owned(value));
                }
            }
        }

        trimmed
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|_| ParseNumberError)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.to_bigint_owned(), other.to_bigint_owned()) {
            return a == b;
        }

        let a = self.to_f64_lossy();
        let b = other.to_f64_lossy();
        if a.is_nan() || b.is_nan() {
            return false;
        }
        a == b
    }
}

impl Eq for Number {}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        if let (Some(a), Some(b)) = (self.to_bigint_owned(), other.to_bigint_owned()) {
            return a.cmp(&b);
        }

        self.to_f64_lossy()
            .partial_cmp(&other.to_f64_lossy())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
