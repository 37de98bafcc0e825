//! Checksum settings: an algorithm name plus free-form tuning parameters.
//!
//! The document is a flat JSON object whose `algo` key is mandatory. Every
//! other key is a parameter consumed by the downstream generator. Parameter
//! order is kept as loaded.

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ident::is_valid_identifier;
use crate::value::{parse_int_literal, serialize_float, serialize_int, Scalar};

/// Name of the mandatory algorithm key.
pub const ALGO_KEY: &str = "algo";

/// Kind of a checksum parameter. Decides how the value is shown and parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    Text,
    Integer,
    Float,
    Boolean,
}

impl ChecksumKind {
    pub fn name(self) -> &'static str {
        match self {
            ChecksumKind::Text => "string",
            ChecksumKind::Integer => "number",
            ChecksumKind::Float => "float",
            ChecksumKind::Boolean => "boolean",
        }
    }

    /// Value a freshly added parameter starts with.
    pub fn zero(self) -> ChecksumValue {
        match self {
            ChecksumKind::Text => ChecksumValue::Text(String::new()),
            ChecksumKind::Integer => ChecksumValue::Integer(0),
            ChecksumKind::Float => ChecksumValue::Float(0.0),
            ChecksumKind::Boolean => ChecksumValue::Boolean(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChecksumValue {
    Integer(i128),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl ChecksumValue {
    pub fn kind(&self) -> ChecksumKind {
        match self {
            ChecksumValue::Integer(_) => ChecksumKind::Integer,
            ChecksumValue::Float(_) => ChecksumKind::Float,
            ChecksumValue::Boolean(_) => ChecksumKind::Boolean,
            ChecksumValue::Text(_) => ChecksumKind::Text,
        }
    }

    /// Parse editor text as a value of `kind`.
    pub fn parse_as(kind: ChecksumKind, text: &str) -> Result<ChecksumValue> {
        let t = text.trim();
        let invalid = || ModelError::InvalidChecksumValue {
            kind: kind.name(),
            text: text.to_string(),
        };
        match kind {
            ChecksumKind::Text => Ok(ChecksumValue::Text(text.to_string())),
            ChecksumKind::Integer => parse_int_literal(t)
                .map(ChecksumValue::Integer)
                .ok_or_else(invalid),
            ChecksumKind::Float => t.parse::<f64>().map(ChecksumValue::Float).map_err(|_| invalid()),
            ChecksumKind::Boolean => match t {
                "true" => Ok(ChecksumValue::Boolean(true)),
                "false" => Ok(ChecksumValue::Boolean(false)),
                _ => Err(invalid()),
            },
        }
    }

    /// Display text. Integers are shown in upper-case hexadecimal, floats in
    /// decimal.
    pub fn render(&self) -> String {
        match self {
            ChecksumValue::Integer(i) if *i < 0 => format!("-0x{:X}", i.unsigned_abs()),
            ChecksumValue::Integer(i) => format!("0x{i:X}"),
            ChecksumValue::Float(f) => Scalar::Float(*f).to_string(),
            ChecksumValue::Boolean(b) => b.to_string(),
            ChecksumValue::Text(s) => s.clone(),
        }
    }
}

impl Serialize for ChecksumValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ChecksumValue::Integer(i) => serialize_int(*i, serializer),
            ChecksumValue::Float(f) => serialize_float(*f, serializer),
            ChecksumValue::Boolean(b) => serializer.serialize_bool(*b),
            ChecksumValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for ChecksumValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ChecksumValueVisitor)
    }
}

struct ChecksumValueVisitor;

impl<'de> Visitor<'de> for ChecksumValueVisitor {
    type Value = ChecksumValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, boolean or string")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<ChecksumValue, E> {
        Ok(ChecksumValue::Boolean(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<ChecksumValue, E> {
        Ok(ChecksumValue::Integer(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<ChecksumValue, E> {
        Ok(ChecksumValue::Integer(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<ChecksumValue, E> {
        Ok(ChecksumValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<ChecksumValue, E> {
        Ok(match Scalar::from_interchange_str(v) {
            Some(Scalar::Int(i)) => ChecksumValue::Integer(i),
            Some(Scalar::Float(f)) => ChecksumValue::Float(f),
            None => ChecksumValue::Text(v.to_string()),
        })
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<ChecksumValue, E> {
        Ok(ChecksumValue::Text(String::new()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChecksumParameter {
    pub name: String,
    pub value: ChecksumValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChecksumSettings {
    pub algo: String,
    pub parameters: Vec<ChecksumParameter>,
}

impl Default for ChecksumSettings {
    fn default() -> Self {
        Self {
            algo: "crc".to_string(),
            parameters: Vec::new(),
        }
    }
}

impl ChecksumSettings {
    pub fn get(&self, name: &str) -> Option<&ChecksumValue> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// Add a parameter holding the zero value of `kind`.
    pub fn add_parameter(&mut self, name: &str, kind: ChecksumKind) -> Result<&mut ChecksumValue> {
        let name = name.trim();
        if name == ALGO_KEY || !is_valid_identifier(name) {
            return Err(ModelError::ReservedChecksumParameter(name.to_string()));
        }
        if self.get(name).is_some() {
            return Err(ModelError::DuplicateChecksumParameter(name.to_string()));
        }
        self.parameters.push(ChecksumParameter {
            name: name.to_string(),
            value: kind.zero(),
        });
        let last = self.parameters.len() - 1;
        Ok(&mut self.parameters[last].value)
    }

    /// Remove a parameter, returning its last value.
    pub fn remove_parameter(&mut self, name: &str) -> Option<ChecksumValue> {
        let index = self.parameters.iter().position(|p| p.name == name)?;
        Some(self.parameters.remove(index).value)
    }

    /// Replace or append a parameter.
    pub fn set(&mut self, name: &str, value: ChecksumValue) {
        match self.parameters.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.value = value,
            None => self.parameters.push(ChecksumParameter {
                name: name.to_string(),
                value,
            }),
        }
    }
}

impl Serialize for ChecksumSettings {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.parameters.len() + 1))?;
        map.serialize_entry(ALGO_KEY, &self.algo)?;
        for p in &self.parameters {
            map.serialize_entry(&p.name, &p.value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ChecksumSettings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(ChecksumSettingsVisitor)
    }
}

struct ChecksumSettingsVisitor;

impl<'de> Visitor<'de> for ChecksumSettingsVisitor {
    type Value = ChecksumSettings;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with a string 'algo' entry")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<ChecksumSettings, A::Error> {
        let mut algo: Option<String> = None;
        let mut settings = ChecksumSettings {
            algo: String::new(),
            parameters: Vec::new(),
        };
        while let Some(key) = map.next_key::<String>()? {
            if key == ALGO_KEY {
                algo = Some(map.next_value::<String>()?);
            } else {
                let value = map.next_value::<ChecksumValue>()?;
                settings.set(&key, value);
            }
        }
        settings.algo = algo.ok_or_else(|| de::Error::missing_field(ALGO_KEY))?;
        Ok(settings)
    }
}
