//! Data type, shape and access enumerations for descriptors.
//!
//! Declared schemas spell types loosely (`"int"`, `"Integer"`, `"float"`,
//! `["double"]` for a one-dimensional double, ...). This module resolves
//! those spellings into the closed `DataType`/`DataFormat`/`DataAccess`
//! enums, renders the canonical display strings used in serialized
//! dictionaries, and validates JSON values against a resolved (type, shape)
//! pair.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Scalar base type of a property or attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Signed integer.
    Integer,
    /// Double-precision float.
    Double,
    /// Text.
    String,
    /// Boolean flag.
    Boolean,
}

impl DataType {
    /// Canonical display name, as rendered in serialized dictionaries.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Integer => "Integer",
            DataType::Double => "Double",
            DataType::String => "String",
            DataType::Boolean => "Boolean",
        }
    }

    /// Reverse lookup from a canonical display name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Integer" => Some(DataType::Integer),
            "Double" => Some(DataType::Double),
            "String" => Some(DataType::String),
            "Boolean" => Some(DataType::Boolean),
            _ => None,
        }
    }

    /// Resolve a loosely spelled type token, case-insensitively.
    pub fn resolve(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "int" | "integer" | "long" => Some(DataType::Integer),
            "float" | "double" => Some(DataType::Double),
            "str" | "string" => Some(DataType::String),
            "bool" | "boolean" => Some(DataType::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape of a property or attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataFormat {
    /// Single value.
    Scalar,
    /// One-dimensional sequence.
    OneD,
    /// Two-dimensional sequence.
    TwoD,
}

impl DataFormat {
    /// Canonical display name, as rendered in serialized dictionaries.
    pub fn name(self) -> &'static str {
        match self {
            DataFormat::Scalar => "Scalar",
            DataFormat::OneD => "OneD",
            DataFormat::TwoD => "TwoD",
        }
    }

    /// Reverse lookup from a canonical display name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Scalar" => Some(DataFormat::Scalar),
            "OneD" => Some(DataFormat::OneD),
            "TwoD" => Some(DataFormat::TwoD),
            _ => None,
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Access mode of a runtime attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataAccess {
    /// Value can only be read.
    ReadOnly,
    /// Value can be read and written.
    ReadWrite,
}

impl DataAccess {
    /// Canonical display name, as rendered in serialized dictionaries.
    pub fn name(self) -> &'static str {
        match self {
            DataAccess::ReadOnly => "ReadOnly",
            DataAccess::ReadWrite => "ReadWrite",
        }
    }

    /// Reverse lookup from a canonical display name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ReadOnly" => Some(DataAccess::ReadOnly),
            "ReadWrite" => Some(DataAccess::ReadWrite),
            _ => None,
        }
    }

    /// Resolve a loosely spelled access token, case-insensitively.
    pub fn resolve(token: &str) -> Option<Self> {
        let folded: String = token
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-' | '/'))
            .collect();
        match folded.as_str() {
            "read" | "readonly" | "ro" => Some(DataAccess::ReadOnly),
            "readwrite" | "rw" => Some(DataAccess::ReadWrite),
            _ => None,
        }
    }
}

impl fmt::Display for DataAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve a raw `type` schema value into a (type, shape) pair.
///
/// A bare token resolves to a scalar. A one-element sequence wraps the
/// element shape in one more dimension: `["float"]` is a OneD double and
/// `[["float"]]` a TwoD double. Deeper nesting is rejected.
pub fn to_dtype_dformat(raw: &Value) -> Option<(DataType, DataFormat)> {
    match raw {
        Value::String(token) => DataType::resolve(token).map(|t| (t, DataFormat::Scalar)),
        Value::Array(items) => {
            let first = items.first()?;
            match to_dtype_dformat(first)? {
                (dtype, DataFormat::Scalar) => Some((dtype, DataFormat::OneD)),
                (dtype, DataFormat::OneD) => Some((dtype, DataFormat::TwoD)),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Resolve a raw `r/w type` schema value into an access mode.
pub fn to_daccess(raw: &Value) -> Option<DataAccess> {
    raw.as_str().and_then(DataAccess::resolve)
}

/// Whether a JSON value has the declared type and shape.
pub fn value_matches(value: &Value, dtype: DataType, dformat: DataFormat) -> bool {
    match dformat {
        DataFormat::Scalar => scalar_matches(value, dtype),
        DataFormat::OneD => value
            .as_array()
            .is_some_and(|items| items.iter().all(|v| scalar_matches(v, dtype))),
        DataFormat::TwoD => value.as_array().is_some_and(|rows| {
            rows.iter().all(|row| {
                row.as_array()
                    .is_some_and(|items| items.iter().all(|v| scalar_matches(v, dtype)))
            })
        }),
    }
}

fn scalar_matches(value: &Value, dtype: DataType) -> bool {
    match dtype {
        DataType::Integer => value.is_i64() || value.is_u64(),
        DataType::Double => value.is_number(),
        DataType::String => value.is_string(),
        DataType::Boolean => value.is_boolean(),
    }
}
