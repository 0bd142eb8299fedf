//! Controller class declarations.
//!
//! A `ControllerDecl` is the in-memory image of one loaded controller
//! class: its identity, the controller APIs it implements, its feature
//! list, and its raw property/attribute schema mappings exactly as
//! declared. The external module loader hands these over, either built in
//! code through the builder methods or parsed from declaration text.
//!
//! Legacy member spellings (`class_prop`, `ctrl_extra_attributes`) are kept
//! so that older declarations still load; during cataloguing they are
//! merged under the current mappings, which win on key collision.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::CatalogResult;
use crate::registry::ControllerApi;

/// Raw schema mapping: descriptor name to its declared configuration.
pub type SchemaMap = BTreeMap<String, Value>;

/// Declaration of one controller class, as handed over by the loader.
///
/// Required members (`features` and the three current schema mappings) are
/// `Option` so that a declaration missing them can be detected and reported
/// as incomplete during cataloguing rather than silently defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerDecl {
    /// Declared class name.
    pub name: String,

    /// Free-text documentation for the class.
    #[serde(default)]
    pub description: Option<String>,

    /// Device gender (e.g. "Motor controller").
    #[serde(default)]
    pub gender: Option<String>,

    /// Hardware model.
    #[serde(default)]
    pub model: Option<String>,

    /// Manufacturer or maintainer.
    #[serde(default)]
    pub organization: Option<String>,

    /// Image resource name for GUIs.
    #[serde(default)]
    pub image: Option<String>,

    /// Logo resource name for GUIs.
    #[serde(default)]
    pub logo: Option<String>,

    /// Controller APIs this class implements.
    #[serde(default)]
    pub implements: Vec<ControllerApi>,

    /// Declared feature tokens, stored verbatim.
    #[serde(default)]
    pub features: Option<Vec<String>>,

    /// Legacy property schema mapping.
    #[serde(default)]
    pub class_prop: Option<SchemaMap>,

    /// Property schema mapping.
    #[serde(default)]
    pub ctrl_properties: Option<SchemaMap>,

    /// Controller-level attribute schema mapping.
    #[serde(default)]
    pub ctrl_attributes: Option<SchemaMap>,

    /// Legacy per-axis attribute schema mapping.
    #[serde(default)]
    pub ctrl_extra_attributes: Option<SchemaMap>,

    /// Per-axis attribute schema mapping.
    #[serde(default)]
    pub axis_attributes: Option<SchemaMap>,

    /// Ordered physical-motor role names (pseudo-motor classes).
    #[serde(default)]
    pub motor_roles: Vec<String>,

    /// Ordered derived pseudo-motor role names (pseudo-motor classes).
    #[serde(default)]
    pub pseudo_motor_roles: Vec<String>,

    /// Whether the constructor accepts arbitrary extension arguments.
    ///
    /// Declarations written against the current API accept them; absent
    /// from older declaration text, which marks the class API level 0.
    #[serde(default)]
    pub accepts_extra_args: bool,
}

impl ControllerDecl {
    /// Create a complete, empty declaration for in-code construction.
    ///
    /// All required members are present (empty) and the current API level
    /// is assumed; builder methods fill in the rest.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            gender: None,
            model: None,
            organization: None,
            image: None,
            logo: None,
            implements: Vec::new(),
            features: Some(Vec::new()),
            class_prop: None,
            ctrl_properties: Some(SchemaMap::new()),
            ctrl_attributes: Some(SchemaMap::new()),
            ctrl_extra_attributes: None,
            axis_attributes: Some(SchemaMap::new()),
            motor_roles: Vec::new(),
            pseudo_motor_roles: Vec::new(),
            accepts_extra_args: true,
        }
    }

    /// Builder method to set the class documentation.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Builder method to set the gender.
    pub fn with_gender(mut self, gender: &str) -> Self {
        self.gender = Some(gender.to_string());
        self
    }

    /// Builder method to set the model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    /// Builder method to set the organization.
    pub fn with_organization(mut self, organization: &str) -> Self {
        self.organization = Some(organization.to_string());
        self
    }

    /// Builder method to declare an implemented controller API.
    pub fn with_api(mut self, api: ControllerApi) -> Self {
        if !self.implements.contains(&api) {
            self.implements.push(api);
        }
        self
    }

    /// Builder method to append a feature token.
    pub fn with_feature(mut self, feature: &str) -> Self {
        self.features.get_or_insert_with(Vec::new).push(feature.to_string());
        self
    }

    /// Builder method to declare a property schema entry.
    pub fn with_property(mut self, name: &str, raw: Value) -> Self {
        self.ctrl_properties
            .get_or_insert_with(SchemaMap::new)
            .insert(name.to_string(), raw);
        self
    }

    /// Builder method to declare a controller-attribute schema entry.
    pub fn with_ctrl_attribute(mut self, name: &str, raw: Value) -> Self {
        self.ctrl_attributes
            .get_or_insert_with(SchemaMap::new)
            .insert(name.to_string(), raw);
        self
    }

    /// Builder method to declare an axis-attribute schema entry.
    pub fn with_axis_attribute(mut self, name: &str, raw: Value) -> Self {
        self.axis_attributes
            .get_or_insert_with(SchemaMap::new)
            .insert(name.to_string(), raw);
        self
    }

    /// Builder method to append a physical-motor role.
    pub fn with_motor_role(mut self, role: &str) -> Self {
        self.motor_roles.push(role.to_string());
        self
    }

    /// Builder method to append a pseudo-motor role.
    pub fn with_pseudo_motor_role(mut self, role: &str) -> Self {
        self.pseudo_motor_roles.push(role.to_string());
        self
    }

    /// Builder method to mark the class as written against the older API.
    pub fn legacy_api(mut self) -> Self {
        self.accepts_extra_args = false;
        self
    }

    /// Parse a single declaration from YAML text handed over by the loader.
    pub fn from_yaml(text: &str) -> CatalogResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse a declaration from an already-decoded JSON value.
    pub fn from_json(value: Value) -> CatalogResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Parse all declarations in one module's declaration text.
///
/// The text may hold a single mapping or a sequence of mappings; a module
/// may declare zero or more classes.
pub fn decls_from_yaml(text: &str) -> CatalogResult<Vec<ControllerDecl>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    match value {
        serde_yaml::Value::Sequence(items) => items
            .into_iter()
            .map(|item| Ok(serde_yaml::from_value(item)?))
            .collect(),
        serde_yaml::Value::Null => Ok(Vec::new()),
        other => Ok(vec![serde_yaml::from_value(other)?]),
    }
}
