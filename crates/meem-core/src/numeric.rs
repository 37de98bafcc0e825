//! Scalar storage types and their numeric rules.
//!
//! Three pure checks drive default-value handling:
//! - [`type_mismatch`]: a value of the wrong kind (fraction or NaN in an
//!   integer slot)
//! - [`out_of_range`]: a value outside the exact storage range
//! - [`clamp`]: saturate into the storage range
//!
//! Integer ranges are compared in `i128`, so the full `uint64`/`int64`
//! domains are enforced exactly.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::lenient::Integer;
use crate::value::Scalar;

/// Largest magnitude accepted for `float32` defaults.
pub const FLOAT32_LIMIT: f64 = 3.4e38;

/// Storage type of a parameter. Serialized as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Integer", into = "u8")]
pub enum DataType {
    #[default]
    Uint8 = 0,
    Int8 = 1,
    Uint16 = 2,
    Int16 = 3,
    Uint32 = 4,
    Int32 = 5,
    Uint64 = 6,
    Int64 = 7,
    Float32 = 8,
    Float64 = 9,
}

impl DataType {
    /// All types in code order.
    pub const ALL: [DataType; 10] = [
        DataType::Uint8,
        DataType::Int8,
        DataType::Uint16,
        DataType::Int16,
        DataType::Uint32,
        DataType::Int32,
        DataType::Uint64,
        DataType::Int64,
        DataType::Float32,
        DataType::Float64,
    ];

    /// Integer code used in documents.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look up a type by its document code.
    pub fn from_code(code: i128) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Storage size in bytes.
    pub fn size_in_bytes(self) -> u32 {
        match self {
            DataType::Uint8 | DataType::Int8 => 1,
            DataType::Uint16 | DataType::Int16 => 2,
            DataType::Uint32 | DataType::Int32 | DataType::Float32 => 4,
            DataType::Uint64 | DataType::Int64 | DataType::Float64 => 8,
        }
    }

    /// Storage size in bits.
    pub fn bit_size(self) -> u32 {
        self.size_in_bytes() * 8
    }

    pub fn is_float(self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float64)
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64
        ) || self.is_float()
    }

    /// Inclusive two's-complement/unsigned range of an integer type.
    pub fn int_range(self) -> Option<(i128, i128)> {
        match self {
            DataType::Uint8 => Some((0, u8::MAX.into())),
            DataType::Int8 => Some((i8::MIN.into(), i8::MAX.into())),
            DataType::Uint16 => Some((0, u16::MAX.into())),
            DataType::Int16 => Some((i16::MIN.into(), i16::MAX.into())),
            DataType::Uint32 => Some((0, u32::MAX.into())),
            DataType::Int32 => Some((i32::MIN.into(), i32::MAX.into())),
            DataType::Uint64 => Some((0, u64::MAX.into())),
            DataType::Int64 => Some((i64::MIN.into(), i64::MAX.into())),
            DataType::Float32 | DataType::Float64 => None,
        }
    }

    /// C-style type name (`uint8`, `float64`, ...).
    pub fn name(self) -> &'static str {
        match self {
            DataType::Uint8 => "uint8",
            DataType::Int8 => "int8",
            DataType::Uint16 => "uint16",
            DataType::Int16 => "int16",
            DataType::Uint32 => "uint32",
            DataType::Int32 => "int32",
            DataType::Uint64 => "uint64",
            DataType::Int64 => "int64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<DataType> for u8 {
    fn from(t: DataType) -> u8 {
        t.code()
    }
}

impl TryFrom<Integer> for DataType {
    type Error = ModelError;

    fn try_from(code: Integer) -> Result<Self, Self::Error> {
        DataType::from_code(code.0).ok_or(ModelError::UnknownCode {
            kind: "data type",
            code: code.0,
        })
    }
}

/// True if `value` is the wrong kind of number for `data_type`.
///
/// Fractions, NaN and infinities do not fit integer slots. Integral values
/// always fit float slots.
pub fn type_mismatch(value: Scalar, data_type: DataType) -> bool {
    !data_type.is_float() && !value.is_integral()
}

/// True if `value` lies outside the storage range of `data_type`.
///
/// Floats are truncated before an integer range comparison. For `float32`,
/// only non-integral values beyond ±3.4e38 are flagged; `float64` is never
/// flagged.
pub fn out_of_range(value: Scalar, data_type: DataType) -> bool {
    match data_type.int_range() {
        Some((min, max)) => {
            let v = value.truncated();
            v < min || v > max
        }
        None => match value {
            Scalar::Float(f) if data_type == DataType::Float32 && !value.is_integral() => {
                !(-FLOAT32_LIMIT..=FLOAT32_LIMIT).contains(&f) && !f.is_nan()
            }
            _ => false,
        },
    }
}

/// Saturate `value` into the storage range of `data_type`.
///
/// In-range values are returned unchanged. Clamped integer results stay
/// exact (`Scalar::Int`).
pub fn clamp(value: Scalar, data_type: DataType) -> Scalar {
    match data_type.int_range() {
        Some((min, max)) => {
            if !out_of_range(value, data_type) {
                return value;
            }
            Scalar::Int(value.truncated().clamp(min, max))
        }
        None => match (data_type, value) {
            (DataType::Float32, Scalar::Float(f)) if !f.is_nan() => {
                Scalar::Float(f.clamp(-FLOAT32_LIMIT, FLOAT32_LIMIT))
            }
            _ => value,
        },
    }
}
