//! Scalar values held by parameter defaults.
//!
//! Integers are carried as `i128`, which covers the whole `int64` and
//! `uint64` domains exactly. A value never passes through `f64` unless it was
//! written as a floating-point literal.
//!
//! Interchange encoding:
//! - integers with magnitude above 2^53 - 1 are written as decimal strings
//! - NaN is written as the string `"NaN"`, infinities as `"Infinity"` /
//!   `"-Infinity"`
//! - everything else is a native JSON number
//!
//! On input, strings shaped like `[-+]?(0x[0-9a-fA-F]+|\d+)` and the
//! case-insensitive `nan`/`inf`/`infinity` literals are read back as numbers.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::numeric::DataType;

/// Largest integer magnitude an IEEE-754 double holds exactly.
pub const MAX_SAFE_INTEGER: i128 = (1 << 53) - 1;

/// A numeric value: exact integer or IEEE-754 double.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int(i128),
    Float(f64),
}

/// Preferred interpretation of an ambiguous numeric token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberHint {
    /// Integer unless the token has a fractional part or exponent.
    #[default]
    Integer,
    /// Always floating-point (except hexadecimal literals).
    Float,
}

impl NumberHint {
    /// Hint matching a parameter's storage type.
    pub fn for_type(data_type: DataType) -> Self {
        if data_type.is_float() {
            NumberHint::Float
        } else {
            NumberHint::Integer
        }
    }
}

/// Display radix for integer defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Radix {
    #[default]
    Decimal,
    Hex,
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::Int(0)
    }
}

impl From<i128> for Scalar {
    fn from(v: i128) -> Self {
        Scalar::Int(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v.into())
    }
}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        Scalar::Int(v.into())
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl Scalar {
    /// True for a floating NaN.
    pub fn is_nan(&self) -> bool {
        matches!(self, Scalar::Float(f) if f.is_nan())
    }

    /// True if the value has no fractional part (integers, and finite
    /// integral floats).
    pub fn is_integral(&self) -> bool {
        match self {
            Scalar::Int(_) => true,
            Scalar::Float(f) => is_integral_f64(*f),
        }
    }

    /// Integer view used for range checks: floats truncate toward zero,
    /// saturate at the `i128` bounds, and NaN reads as zero.
    pub fn truncated(&self) -> i128 {
        match *self {
            Scalar::Int(i) => i,
            Scalar::Float(f) if f.is_nan() => 0,
            Scalar::Float(f) => f.trunc() as i128,
        }
    }

    /// Parse a token typed by a user.
    ///
    /// Empty and unparseable tokens yield `0`. Hexadecimal literals are always
    /// integers; `nan`/`inf` are only recognised with a float hint.
    pub fn parse_token(token: &str, hint: NumberHint) -> Scalar {
        let s = token.trim();
        if s.is_empty() {
            return Scalar::Int(0);
        }
        if hint == NumberHint::Float {
            if let Some(special) = parse_special_float(s) {
                return Scalar::Float(special);
            }
        }
        if let Some(digits) = hex_body(s) {
            return parse_hex(s, digits);
        }
        if hint == NumberHint::Float || s.contains('.') {
            return parse_plain_float(s).map(Scalar::Float).unwrap_or(Scalar::Int(0));
        }
        if is_decimal_literal(s) {
            if let Ok(i) = s.parse::<i128>() {
                return Scalar::Int(i);
            }
        }
        parse_plain_float(s).map(Scalar::Float).unwrap_or(Scalar::Int(0))
    }

    /// Read back a value that was stored as a string in an interchange
    /// document. Returns `None` for text that is not a numeric literal.
    pub fn from_interchange_str(s: &str) -> Option<Scalar> {
        let t = s.trim();
        if let Some(special) = parse_special_float(t) {
            return Some(Scalar::Float(special));
        }
        if let Some(digits) = hex_body(t) {
            return Some(parse_hex(t, digits));
        }
        if is_decimal_literal(t) {
            return Some(
                t.parse::<i128>()
                    .map(Scalar::Int)
                    .or_else(|_| t.parse::<f64>().map(Scalar::Float))
                    .unwrap_or(Scalar::Int(0)),
            );
        }
        None
    }

    /// Render for display. Hex applies to integer storage types only and uses
    /// the full declared width; negative values show their two's-complement
    /// bit pattern.
    pub fn format(&self, data_type: DataType, radix: Radix) -> String {
        if data_type.is_float() || !self.is_integral() {
            return self.to_string();
        }
        let v = self.truncated();
        match radix {
            Radix::Decimal => v.to_string(),
            Radix::Hex => {
                let bits = data_type.bit_size();
                let mask = (1u128 << bits) - 1;
                format!("0x{:X}", (v as u128) & mask)
            }
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) if x.is_nan() => write!(f, "NaN"),
            Scalar::Float(x) if x.is_infinite() => {
                write!(f, "{}", if *x > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Scalar::Float(x) => write!(f, "{x}"),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Scalar::Int(i) => serialize_int(i, serializer),
            Scalar::Float(f) => serialize_float(f, serializer),
        }
    }
}

/// Write an integer as a JSON number when exact, else as a decimal string.
pub fn serialize_int<S: Serializer>(i: i128, serializer: S) -> Result<S::Ok, S::Error> {
    if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&i) {
        serializer.serialize_i64(i as i64)
    } else {
        serializer.serialize_str(&i.to_string())
    }
}

/// Write a float, spelling out the values JSON has no literal for.
pub fn serialize_float<S: Serializer>(f: f64, serializer: S) -> Result<S::Ok, S::Error> {
    if f.is_nan() {
        serializer.serialize_str("NaN")
    } else if f.is_infinite() {
        serializer.serialize_str(if f > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        serializer.serialize_f64(f)
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ScalarVisitor)
    }
}

struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = Scalar;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Scalar, E> {
        Ok(Scalar::Int(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Scalar, E> {
        Ok(Scalar::Int(v.into()))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Scalar, E> {
        Ok(Scalar::Int(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Scalar, E> {
        Ok(i128::try_from(v)
            .map(Scalar::Int)
            .unwrap_or(Scalar::Float(v as f64)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Scalar, E> {
        Ok(Scalar::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Scalar, E> {
        Scalar::from_interchange_str(v)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

/// A default value as read from a document, remembering whether it was
/// written as a plain decimal string. Such a string belongs to the
/// parameter's type: under a float hint `"3"` is `3.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Literal {
    value: Scalar,
    decimal_text: Option<f64>,
}

impl Literal {
    pub(crate) fn plain(value: Scalar) -> Self {
        Self {
            value,
            decimal_text: None,
        }
    }

    pub(crate) fn hinted(self, hint: NumberHint) -> Scalar {
        match (hint, self.decimal_text) {
            (NumberHint::Float, Some(f)) => Scalar::Float(f),
            _ => self.value,
        }
    }
}

impl<'de> Deserialize<'de> for Literal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LiteralVisitor)
    }
}

struct LiteralVisitor;

impl<'de> Visitor<'de> for LiteralVisitor {
    type Value = Literal;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ScalarVisitor.expecting(f)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Literal, E> {
        ScalarVisitor.visit_i64(v).map(Literal::plain)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Literal, E> {
        ScalarVisitor.visit_u64(v).map(Literal::plain)
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Literal, E> {
        ScalarVisitor.visit_i128(v).map(Literal::plain)
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Literal, E> {
        ScalarVisitor.visit_u128(v).map(Literal::plain)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Literal, E> {
        ScalarVisitor.visit_f64(v).map(Literal::plain)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Literal, E> {
        let value = ScalarVisitor.visit_str(v)?;
        let t = v.trim();
        let decimal_text = if is_decimal_literal(t) {
            t.parse::<f64>().ok()
        } else {
            None
        };
        Ok(Literal {
            value,
            decimal_text,
        })
    }
}

pub(crate) fn is_integral_f64(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0
}

/// Digits of a `[-+]?0x[0-9a-fA-F]+` literal.
fn hex_body(s: &str) -> Option<&str> {
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    let digits = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))?;
    (!digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit())).then_some(digits)
}

fn parse_hex(literal: &str, digits: &str) -> Scalar {
    let negative = literal.starts_with('-');
    match i128::from_str_radix(digits, 16) {
        Ok(v) => Scalar::Int(if negative { -v } else { v }),
        Err(_) => {
            let magnitude = digits
                .chars()
                .filter_map(|c| c.to_digit(16))
                .fold(0f64, |acc, d| acc * 16.0 + f64::from(d));
            Scalar::Float(if negative { -magnitude } else { magnitude })
        }
    }
}

/// `[-+]?\d+`
pub(crate) fn is_decimal_literal(s: &str) -> bool {
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    !unsigned.is_empty() && unsigned.chars().all(|c| c.is_ascii_digit())
}

/// Integer literal in decimal or hexadecimal form.
pub(crate) fn parse_int_literal(s: &str) -> Option<i128> {
    let t = s.trim();
    if let Some(digits) = hex_body(t) {
        let v = i128::from_str_radix(digits, 16).ok()?;
        return Some(if t.starts_with('-') { -v } else { v });
    }
    if is_decimal_literal(t) {
        return t.parse::<i128>().ok();
    }
    None
}

/// Float in positional or exponent notation. Rejects the `nan`/`inf`
/// spellings that `f64::from_str` would otherwise accept.
fn parse_plain_float(s: &str) -> Option<f64> {
    s.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        .then(|| s.parse::<f64>().ok())
        .flatten()
}

fn parse_special_float(s: &str) -> Option<f64> {
    let lower = s.to_ascii_lowercase();
    let (negative, body) = match lower.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, lower.strip_prefix('+').unwrap_or(&lower)),
    };
    match body {
        "nan" => Some(f64::NAN),
        "inf" | "infinity" => Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        }),
        _ => None,
    }
}
