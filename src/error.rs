//! Custom error types for the catalog.
//!
//! This module defines the primary error type, `CatalogError`, used throughout
//! the crate. Using the `thiserror` crate, it provides a centralized and
//! consistent way to handle the failure modes of descriptor normalization and
//! class cataloguing.
//!
//! ## Error Kinds
//!
//! - **`InvalidConfiguration`**: a declared property/attribute schema entry
//!   could not be resolved (unknown data type, unknown access mode, entry is
//!   not a mapping). Fatal to that single descriptor and therefore to the
//!   class being catalogued, never to the whole module.
//! - **`MalformedDefaultLiteral`**: a textual default value could not be
//!   parsed into the declared type. Silent coercion is deliberately not
//!   attempted.
//! - **`IncompleteControllerDeclaration`**: a declaration is missing a
//!   required member (feature list or one of the schema mappings). Recorded
//!   against the owning module record; sibling classes are unaffected.
//! - **`Yaml`** / **`Json`**: declaration text handed over by the module
//!   loader failed to parse.
//! - **`NameTemplate`**: an auto-full-name template referenced a variable
//!   that was not supplied.

use thiserror::Error;

use crate::data::{DataFormat, DataType};

/// Convenience alias for results using the catalog error type.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Errors produced while normalizing descriptors or cataloguing classes.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A schema entry declares something the catalog does not understand.
    #[error("Invalid configuration for '{name}': {reason}")]
    InvalidConfiguration {
        /// Name of the offending descriptor.
        name: String,
        /// What was wrong with the declaration.
        reason: String,
    },

    /// A textual default value does not parse as the declared type.
    #[error("Malformed default literal {literal:?} for '{name}': expected {dformat} {dtype}")]
    MalformedDefaultLiteral {
        /// Name of the offending descriptor.
        name: String,
        /// The literal as it appeared in the declaration.
        literal: String,
        /// Declared data type.
        dtype: DataType,
        /// Declared data shape.
        dformat: DataFormat,
    },

    /// A controller declaration is missing a required member.
    #[error("Controller '{class_name}' is missing required declared member '{member}'")]
    IncompleteControllerDeclaration {
        /// Name of the class that failed to catalog.
        class_name: String,
        /// The member that was absent.
        member: &'static str,
    },

    /// Declaration text was not valid YAML.
    #[error("Declaration parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Declaration value was not valid JSON for a controller declaration.
    #[error("Declaration parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// An instance name template could not be expanded.
    #[error("Name template error: {0}")]
    NameTemplate(#[from] strfmt::FmtError),
}
