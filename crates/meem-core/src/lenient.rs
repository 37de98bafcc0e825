//! Forgiving field decoders for hand-edited documents.
//!
//! Documents written by other tools store integers as JSON numbers, as
//! decimal strings, or as `0x` hexadecimal strings, and sometimes write
//! `null` where an empty string or list is meant. These helpers are used
//! through `#[serde(deserialize_with = ...)]` on numeric and container
//! fields only; plain text fields are never reinterpreted as numbers.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

use crate::value::{is_integral_f64, parse_int_literal};

/// An integer read from a number, an integral float, or a numeric string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Integer(pub i128);

impl Integer {
    /// Saturating conversion for count-like fields.
    pub fn saturating_i64(self) -> i64 {
        i64::try_from(self.0).unwrap_or(if self.0 < 0 { i64::MIN } else { i64::MAX })
    }
}

impl<'de> Deserialize<'de> for Integer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IntegerVisitor)
    }
}

struct IntegerVisitor;

impl<'de> Visitor<'de> for IntegerVisitor {
    type Value = Integer;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or an integer literal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Integer, E> {
        Ok(Integer(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Integer, E> {
        Ok(Integer(v.into()))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Integer, E> {
        Ok(Integer(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Integer, E> {
        i128::try_from(v)
            .map(Integer)
            .map_err(|_| E::custom(format!("integer {v} is too large")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Integer, E> {
        if is_integral_f64(v) {
            Ok(Integer(v as i128))
        } else {
            Err(E::invalid_value(de::Unexpected::Float(v), &self))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Integer, E> {
        parse_int_literal(v)
            .map(Integer)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

/// Integer field stored as `i64`, saturating on overflow.
pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Integer::deserialize(deserializer).map(Integer::saturating_i64)
}

/// Text field where `null` reads as the empty string.
pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Sequence field where `null` reads as an empty sequence.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
