//! Normalized descriptors for declared properties and attributes.
//!
//! A controller class declares its configuration items as loosely-typed
//! mappings (`type`, `r/w type`, `defaultvalue`, `description`, `fget`,
//! `fset`, in any letter case). `DataInfo::from_raw` coerces one such entry
//! into a typed record whose type and access mode are always resolved and
//! whose default value, when present, is correctly typed.

use serde::Serialize;
use serde_json::{json, Value};

use crate::caseless::CaselessMap;
use crate::data::{self, DataAccess, DataFormat, DataType};
use crate::error::{CatalogError, CatalogResult};
use crate::literal;

/// Normalized description of one declared property or attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataInfo {
    /// Descriptor name (unique case-insensitively within its collection).
    pub name: String,
    /// Resolved data type.
    pub dtype: DataType,
    /// Resolved data shape.
    pub dformat: DataFormat,
    /// Resolved access mode.
    pub access: DataAccess,
    /// Free-text description.
    pub description: String,
    /// Typed default value, if declared.
    pub default_value: Option<Value>,
    /// Custom getter method name.
    pub fget: String,
    /// Custom setter method name.
    pub fset: String,
}

impl DataInfo {
    /// Create a scalar read-write descriptor with default accessor names.
    pub fn new(name: &str, dtype: DataType) -> Self {
        Self {
            name: name.to_string(),
            dtype,
            dformat: DataFormat::Scalar,
            access: DataAccess::ReadWrite,
            description: String::new(),
            default_value: None,
            fget: format!("get{name}"),
            fset: format!("set{name}"),
        }
    }

    /// Normalize a raw schema entry into a descriptor.
    ///
    /// Pure function of its input: identical input yields identical output.
    /// Keys are matched case-insensitively. `type` is required; everything
    /// else has a documented default.
    pub fn from_raw(name: &str, raw: &Value) -> CatalogResult<Self> {
        let invalid = |reason: String| CatalogError::InvalidConfiguration {
            name: name.to_string(),
            reason,
        };

        let entry = raw
            .as_object()
            .ok_or_else(|| invalid("schema entry is not a mapping".to_string()))?;
        let info: CaselessMap<&Value> = entry.iter().map(|(k, v)| (k.clone(), v)).collect();

        let raw_type = info
            .get("type")
            .ok_or_else(|| invalid("missing required key 'type'".to_string()))?;
        let (dtype, dformat) = data::to_dtype_dformat(raw_type)
            .ok_or_else(|| invalid(format!("unknown data type {raw_type}")))?;

        let access = match info.get("r/w type") {
            Some(raw_access) => data::to_daccess(raw_access)
                .ok_or_else(|| invalid(format!("unknown access mode {raw_access}")))?,
            None => DataAccess::ReadWrite,
        };

        let description = info
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let default_value = match info.get("defaultvalue").copied() {
            None | Some(Value::Null) => None,
            // A textual default for a string descriptor is the value itself.
            Some(Value::String(text)) if dtype == DataType::String => {
                Some(Value::String(text.clone()))
            }
            // For any other type a textual default is a literal to parse.
            Some(Value::String(text)) => Some(
                literal::parse_literal(text, dtype, dformat).ok_or_else(|| {
                    CatalogError::MalformedDefaultLiteral {
                        name: name.to_string(),
                        literal: text.clone(),
                        dtype,
                        dformat,
                    }
                })?,
            ),
            Some(value) => {
                if !data::value_matches(value, dtype, dformat) {
                    return Err(invalid(format!(
                        "default value {value} does not match {dformat} {dtype}"
                    )));
                }
                Some(value.clone())
            }
        };

        let fget = info
            .get("fget")
            .and_then(|v| v.as_str())
            .map_or_else(|| format!("get{name}"), str::to_string);
        let fset = info
            .get("fset")
            .and_then(|v| v.as_str())
            .map_or_else(|| format!("set{name}"), str::to_string);

        Ok(Self {
            name: name.to_string(),
            dtype,
            dformat,
            access,
            description,
            default_value,
            fget,
            fset,
        })
    }

    /// Project the descriptor into a serializable dictionary.
    ///
    /// Enumerations are rendered as their canonical display strings.
    pub fn to_dict(&self) -> Value {
        json!({
            "name": self.name,
            "type": self.dtype.name(),
            "format": self.dformat.name(),
            "access": self.access.name(),
            "description": self.description,
            "default_value": self.default_value,
        })
    }
}
