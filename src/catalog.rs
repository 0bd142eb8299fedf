//! Module and class records produced by cataloguing.
//!
//! `ControllerLib` represents one loaded declaration module and owns the
//! `ControllerClass` records catalogued from it, plus the errors of classes
//! that failed to catalog. `ControllerClass` is the immutable descriptive
//! record of one controller class; the only permitted mutation after
//! cataloguing is an explicit overwrite of its satisfied element types.

use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::caseless::CaselessMap;
use crate::decl::{ControllerDecl, SchemaMap};
use crate::descriptor::DataInfo;
use crate::error::{CatalogError, CatalogResult};
use crate::registry::{type_data, ElementType, TYPE_ELEMENTS};

/// Fallback description for classes without documentation.
pub const NO_DOC: &str = "<Undocumented controller>";

/// Width used by `ControllerClass::brief_description`.
const BRIEF_DESCRIPTION_CHARS: usize = 60;

/// Record of one loaded declaration module.
#[derive(Debug)]
pub struct ControllerLib {
    name: String,
    file_path: PathBuf,
    classes: CaselessMap<ControllerClass>,
    errors: Vec<(String, CatalogError)>,
}

impl ControllerLib {
    /// Create a module record from the identity resolved by the loader.
    ///
    /// `name` is the module name without extension; `file_path` the
    /// complete path to the declaration file.
    pub fn new(name: &str, file_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            file_path: file_path.into(),
            classes: CaselessMap::new(),
            errors: Vec::new(),
        }
    }

    /// Module name, without file extension.
    pub fn module_name(&self) -> &str {
        &self.name
    }

    /// Complete path to the declaration file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// File name, including extension.
    pub fn file_name(&self) -> &str {
        self.file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.name)
    }

    /// Directory holding the declaration file.
    pub fn path(&self) -> &Path {
        self.file_path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Catalog one declaration into this module record.
    ///
    /// On failure the error is recorded against this record and `false` is
    /// returned; sibling classes are unaffected. This continue-on-failure
    /// policy lets a module with one broken class still publish the rest.
    pub fn add_decl(&mut self, decl: &ControllerDecl, explicit_name: Option<&str>) -> bool {
        let class_name = explicit_name.unwrap_or(&decl.name).to_string();
        match ControllerClass::catalog(self, decl, explicit_name) {
            Ok(class) => {
                debug!(module = %self.name, class = %class_name, "catalogued controller class");
                self.classes.insert(class_name, class);
                true
            }
            Err(err) => {
                warn!(module = %self.name, class = %class_name, error = %err,
                      "failed to catalog controller class");
                self.errors.push((class_name, err));
                false
            }
        }
    }

    /// Catalog every declaration of a module, in order.
    ///
    /// Returns how many classes were catalogued successfully.
    pub fn add_decls<'a>(&mut self, decls: impl IntoIterator<Item = &'a ControllerDecl>) -> usize {
        decls
            .into_iter()
            .filter(|decl| self.add_decl(decl, None))
            .count()
    }

    /// Insert an already-catalogued class record.
    pub fn add_controller(&mut self, class: ControllerClass) {
        self.classes.insert(class.name().to_string(), class);
    }

    /// Look up a catalogued class by name (case-insensitive).
    pub fn get_controller(&self, name: &str) -> Option<&ControllerClass> {
        self.classes.get(name)
    }

    /// Whether a class of that name was catalogued.
    pub fn has_controller(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Iterate catalogued classes in insertion order.
    pub fn get_controllers(&self) -> impl Iterator<Item = &ControllerClass> {
        self.classes.values()
    }

    /// Errors of classes that failed to catalog, as `(name, error)` pairs.
    pub fn errors(&self) -> &[(String, CatalogError)] {
        &self.errors
    }

    /// Read the module's declaration source text, for display purposes.
    pub fn source(&self) -> std::io::Result<String> {
        std::fs::read_to_string(&self.file_path)
    }

    /// Project the module record into a serializable dictionary.
    pub fn to_dict(&self) -> Value {
        json!({
            "name": self.name,
            "filename": self.file_name(),
            "path": self.path().to_string_lossy(),
            "controllers": self.classes.keys().collect::<Vec<_>>(),
            "errors": self
                .errors
                .iter()
                .map(|(name, err)| json!({"name": name, "error": err.to_string()}))
                .collect::<Vec<_>>(),
        })
    }
}

/// Descriptive record of one catalogued controller class.
#[derive(Debug, Clone)]
pub struct ControllerClass {
    name: String,
    module_name: String,
    file_name: String,
    description: String,
    gender: Option<String>,
    model: Option<String>,
    organization: Option<String>,
    image: Option<String>,
    logo: Option<String>,
    api_version: u32,
    features: Vec<String>,
    ctrl_properties: CaselessMap<DataInfo>,
    ctrl_attributes: CaselessMap<DataInfo>,
    axis_attributes: CaselessMap<DataInfo>,
    types: Vec<ElementType>,
    motor_roles: Vec<String>,
    pseudo_motor_roles: Vec<String>,
}

impl ControllerClass {
    /// Catalog a declaration into a class record.
    ///
    /// See the module documentation for the step-by-step contract. Fails
    /// with `IncompleteControllerDeclaration` when a required member is
    /// absent and with the descriptor errors of any malformed schema entry.
    pub fn catalog(
        lib: &ControllerLib,
        decl: &ControllerDecl,
        explicit_name: Option<&str>,
    ) -> CatalogResult<Self> {
        let name = explicit_name.unwrap_or(&decl.name).to_string();
        let missing = |member: &'static str| CatalogError::IncompleteControllerDeclaration {
            class_name: name.clone(),
            member,
        };

        let features = decl.features.as_ref().ok_or_else(|| missing("features"))?.clone();
        let cur_props = decl
            .ctrl_properties
            .as_ref()
            .ok_or_else(|| missing("ctrl_properties"))?;
        let ctrl_attr_schema = decl
            .ctrl_attributes
            .as_ref()
            .ok_or_else(|| missing("ctrl_attributes"))?;
        let cur_axis = decl
            .axis_attributes
            .as_ref()
            .ok_or_else(|| missing("axis_attributes"))?;

        // Legacy mappings merge first so the current ones win on collision.
        let ctrl_properties = normalize_schemas(&[decl.class_prop.as_ref(), Some(cur_props)])?;
        let ctrl_attributes = normalize_schemas(&[Some(ctrl_attr_schema)])?;
        let axis_attributes =
            normalize_schemas(&[decl.ctrl_extra_attributes.as_ref(), Some(cur_axis)])?;

        let types: Vec<ElementType> = TYPE_ELEMENTS
            .iter()
            .copied()
            .filter(|t| {
                type_data(*t)
                    .and_then(|data| data.ctrl_api)
                    .is_some_and(|api| decl.implements.contains(&api))
            })
            .collect();

        let (motor_roles, pseudo_motor_roles) = if types.contains(&ElementType::PseudoMotor) {
            (decl.motor_roles.clone(), decl.pseudo_motor_roles.clone())
        } else {
            (Vec::new(), Vec::new())
        };

        let api_version = u32::from(decl.accepts_extra_args);

        Ok(Self {
            name,
            module_name: lib.module_name().to_string(),
            file_name: lib.file_name().to_string(),
            description: decl
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| NO_DOC.to_string()),
            gender: decl.gender.clone(),
            model: decl.model.clone(),
            organization: decl.organization.clone(),
            image: decl.image.clone(),
            logo: decl.logo.clone(),
            api_version,
            features,
            ctrl_properties,
            ctrl_attributes,
            axis_attributes,
            types,
            motor_roles,
            pseudo_motor_roles,
        })
    }

    /// Class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `module.class` qualified name.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.module_name, self.name)
    }

    /// Name of the owning module.
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// File name of the owning module.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Class documentation, or the undocumented fallback.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Single-line description truncated for list displays.
    pub fn brief_description(&self) -> String {
        let flat = self.description.replace('\n', " ");
        if flat.chars().count() > BRIEF_DESCRIPTION_CHARS {
            let cut: String = flat.chars().take(BRIEF_DESCRIPTION_CHARS - 5).collect();
            format!("{cut}[...]")
        } else {
            flat
        }
    }

    /// Device gender.
    pub fn gender(&self) -> Option<&str> {
        self.gender.as_deref()
    }

    /// Hardware model.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Manufacturer or maintainer.
    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }

    /// Image resource name.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Logo resource name.
    pub fn logo(&self) -> Option<&str> {
        self.logo.as_deref()
    }

    /// API compatibility level (0 legacy, 1 current).
    pub fn api_version(&self) -> u32 {
        self.api_version
    }

    /// Declared feature tokens, verbatim and ordered.
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Normalized property descriptors.
    pub fn ctrl_properties(&self) -> &CaselessMap<DataInfo> {
        &self.ctrl_properties
    }

    /// Normalized controller-attribute descriptors.
    pub fn ctrl_attributes(&self) -> &CaselessMap<DataInfo> {
        &self.ctrl_attributes
    }

    /// Normalized axis-attribute descriptors.
    pub fn axis_attributes(&self) -> &CaselessMap<DataInfo> {
        &self.axis_attributes
    }

    /// Element types this class satisfies.
    pub fn types(&self) -> &[ElementType] {
        &self.types
    }

    /// Overwrite the satisfied element types.
    ///
    /// The one permitted post-catalog mutation, for callers that refine the
    /// computed list.
    pub fn set_types(&mut self, types: Vec<ElementType>) {
        self.types = types;
    }

    /// Ordered physical-motor roles (pseudo-motor classes only).
    pub fn motor_roles(&self) -> &[String] {
        &self.motor_roles
    }

    /// Ordered pseudo-motor roles (pseudo-motor classes only).
    pub fn pseudo_motor_roles(&self) -> &[String] {
        &self.pseudo_motor_roles
    }

    /// Project the class record into a serializable dictionary.
    ///
    /// Deterministic, pure projection: enum fields render as their
    /// canonical display strings and the role lists appear only for
    /// pseudo-motor classes.
    pub fn to_dict(&self) -> Value {
        let mut ret = Map::new();
        ret.insert("name".into(), json!(self.name));
        ret.insert("full_name".into(), json!(self.full_name()));
        ret.insert("module".into(), json!(self.module_name));
        ret.insert("filename".into(), json!(self.file_name));
        ret.insert("description".into(), json!(self.description));
        ret.insert("gender".into(), json!(self.gender));
        ret.insert("model".into(), json!(self.model));
        ret.insert("organization".into(), json!(self.organization));
        ret.insert("api_version".into(), json!(self.api_version));
        ret.insert(
            "types".into(),
            json!(self.types.iter().map(|t| t.name()).collect::<Vec<_>>()),
        );
        ret.insert(
            "ctrl_properties".into(),
            collection_to_dict(&self.ctrl_properties),
        );
        ret.insert(
            "ctrl_attributes".into(),
            collection_to_dict(&self.ctrl_attributes),
        );
        ret.insert(
            "axis_attributes".into(),
            collection_to_dict(&self.axis_attributes),
        );
        ret.insert("ctrl_features".into(), json!(self.features));
        ret.insert("type".into(), json!("ControllerClass"));
        if self.types.contains(&ElementType::PseudoMotor) {
            ret.insert("motor_roles".into(), json!(self.motor_roles));
            ret.insert("pseudo_motor_roles".into(), json!(self.pseudo_motor_roles));
        }
        Value::Object(ret)
    }

    /// Like `to_dict`, extending a caller-provided mapping.
    pub fn serialize_into(&self, target: &mut Map<String, Value>) {
        if let Value::Object(dict) = self.to_dict() {
            target.extend(dict);
        }
    }
}

/// Merge schema mappings into one normalized, caseless collection.
///
/// Mappings are applied in order; later ones win on caseless key collision.
fn normalize_schemas(schemas: &[Option<&SchemaMap>]) -> CatalogResult<CaselessMap<DataInfo>> {
    let mut collection = CaselessMap::new();
    for schema in schemas.iter().flatten() {
        for (key, raw) in schema.iter() {
            collection.insert(key.clone(), DataInfo::from_raw(key, raw)?);
        }
    }
    Ok(collection)
}

/// Project a descriptor collection into a name-keyed dictionary.
fn collection_to_dict(collection: &CaselessMap<DataInfo>) -> Value {
    let mut out = Map::new();
    for info in collection.values() {
        out.insert(info.name.clone(), info.to_dict());
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataAccess, DataType};
    use crate::registry::ControllerApi;
    use serde_json::json;

    fn motor_decl() -> ControllerDecl {
        ControllerDecl::new("IcePapCtrl")
            .with_description("IcePap motor controller")
            .with_gender("Motor controller")
            .with_model("IcePap")
            .with_organization("ALBA")
            .with_api(ControllerApi::Motor)
            .with_feature("Home_speed")
            .with_property("Host", json!({"type": "string", "description": "host name"}))
            .with_property("Port", json!({"type": "int", "defaultvalue": "5000"}))
            .with_axis_attribute(
                "PowerOn",
                json!({"type": "bool", "r/w type": "read_write"}),
            )
    }

    fn lib() -> ControllerLib {
        ControllerLib::new("ice_pap", "/pool/controllers/ice_pap.yaml")
    }

    #[test]
    fn test_catalog_motor_controller() {
        let class = ControllerClass::catalog(&lib(), &motor_decl(), None).unwrap();

        assert_eq!(class.name(), "IcePapCtrl");
        assert_eq!(class.full_name(), "ice_pap.IcePapCtrl");
        assert_eq!(class.types(), &[ElementType::Motor]);
        assert_eq!(class.api_version(), 1);
        assert_eq!(class.features(), &["Home_speed".to_string()]);

        let port = class.ctrl_properties().get("port").unwrap();
        assert_eq!(port.dtype, DataType::Integer);
        assert_eq!(port.default_value, Some(json!(5000)));

        let power = class.axis_attributes().get("PowerOn").unwrap();
        assert_eq!(power.access, DataAccess::ReadWrite);
    }

    #[test]
    fn test_explicit_name_overrides_declared() {
        let class = ControllerClass::catalog(&lib(), &motor_decl(), Some("Renamed")).unwrap();
        assert_eq!(class.name(), "Renamed");
    }

    #[test]
    fn test_no_implemented_api_means_no_types() {
        let decl = ControllerDecl::new("Bare");
        let class = ControllerClass::catalog(&lib(), &decl, None).unwrap();
        assert!(class.types().is_empty());
    }

    #[test]
    fn test_multiple_apis_mean_multiple_types() {
        let decl = ControllerDecl::new("Hybrid")
            .with_api(ControllerApi::Motor)
            .with_api(ControllerApi::CounterTimer);
        let class = ControllerClass::catalog(&lib(), &decl, None).unwrap();
        assert_eq!(
            class.types(),
            &[ElementType::Motor, ElementType::CTExpChannel]
        );
    }

    #[test]
    fn test_legacy_schema_merge_current_wins() {
        let mut decl = ControllerDecl::new("Merge").with_property(
            "Timeout",
            json!({"type": "float", "description": "current"}),
        );
        let mut legacy = SchemaMap::new();
        legacy.insert(
            "timeout".to_string(),
            json!({"type": "int", "description": "legacy"}),
        );
        legacy.insert("Retries".to_string(), json!({"type": "int"}));
        decl.class_prop = Some(legacy);

        let class = ControllerClass::catalog(&lib(), &decl, None).unwrap();
        assert_eq!(class.ctrl_properties().len(), 2);
        let timeout = class.ctrl_properties().get("timeout").unwrap();
        assert_eq!(timeout.dtype, DataType::Double);
        assert_eq!(timeout.description, "current");
        assert!(class.ctrl_properties().contains_key("Retries"));
    }

    #[test]
    fn test_legacy_axis_attribute_merge() {
        let mut decl =
            ControllerDecl::new("Axes").with_axis_attribute("Backlash", json!({"type": "float"}));
        let mut legacy = SchemaMap::new();
        legacy.insert("StepPerUnit".to_string(), json!({"type": "float"}));
        decl.ctrl_extra_attributes = Some(legacy);

        let class = ControllerClass::catalog(&lib(), &decl, None).unwrap();
        assert!(class.axis_attributes().contains_key("Backlash"));
        assert!(class.axis_attributes().contains_key("StepPerUnit"));
    }

    #[test]
    fn test_pseudo_motor_roles() {
        let decl = ControllerDecl::new("SlitCtrl")
            .with_api(ControllerApi::PseudoMotor)
            .with_motor_role("sl2t")
            .with_motor_role("sl2b")
            .with_pseudo_motor_role("Gap")
            .with_pseudo_motor_role("Offset");
        let class = ControllerClass::catalog(&lib(), &decl, None).unwrap();

        assert_eq!(class.types(), &[ElementType::PseudoMotor]);
        assert_eq!(class.motor_roles(), &["sl2t".to_string(), "sl2b".to_string()]);
        assert_eq!(
            class.pseudo_motor_roles(),
            &["Gap".to_string(), "Offset".to_string()]
        );

        let dict = class.to_dict();
        assert_eq!(dict["motor_roles"], json!(["sl2t", "sl2b"]));
        assert_eq!(dict["pseudo_motor_roles"], json!(["Gap", "Offset"]));
    }

    #[test]
    fn test_non_pseudo_class_omits_roles() {
        let class = ControllerClass::catalog(&lib(), &motor_decl(), None).unwrap();
        let dict = class.to_dict();
        assert!(dict.get("motor_roles").is_none());
        assert!(dict.get("pseudo_motor_roles").is_none());
    }

    #[test]
    fn test_missing_required_member() {
        let mut decl = ControllerDecl::new("Broken");
        decl.features = None;
        let err = ControllerClass::catalog(&lib(), &decl, None).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::IncompleteControllerDeclaration {
                member: "features",
                ..
            }
        ));
    }

    #[test]
    fn test_legacy_api_level() {
        let decl = ControllerDecl::new("Old").legacy_api();
        let class = ControllerClass::catalog(&lib(), &decl, None).unwrap();
        assert_eq!(class.api_version(), 0);
    }

    #[test]
    fn test_undocumented_fallback_and_brief() {
        let decl = ControllerDecl::new("Quiet");
        let class = ControllerClass::catalog(&lib(), &decl, None).unwrap();
        assert_eq!(class.description(), NO_DOC);

        let long = ControllerDecl::new("Wordy")
            .with_description(&"line one\n".repeat(20));
        let class = ControllerClass::catalog(&lib(), &long, None).unwrap();
        let brief = class.brief_description();
        assert!(brief.chars().count() <= BRIEF_DESCRIPTION_CHARS);
        assert!(brief.ends_with("[...]"));
        assert!(!brief.contains('\n'));
    }

    #[test]
    fn test_set_types_overwrites() {
        let mut class = ControllerClass::catalog(&lib(), &motor_decl(), None).unwrap();
        class.set_types(vec![ElementType::Motor, ElementType::Ctrl]);
        assert_eq!(class.types(), &[ElementType::Motor, ElementType::Ctrl]);
    }

    #[test]
    fn test_lib_continue_on_failure() {
        let mut lib = lib();
        let good = motor_decl();
        let mut broken = ControllerDecl::new("Broken");
        broken.ctrl_attributes = None;
        let also_good = ControllerDecl::new("Plain");

        assert_eq!(lib.add_decls([&good, &broken, &also_good]), 2);
        assert!(lib.has_controller("IcePapCtrl"));
        assert!(lib.has_controller("Plain"));
        assert!(!lib.has_controller("Broken"));
        assert_eq!(lib.errors().len(), 1);
        assert_eq!(lib.errors()[0].0, "Broken");
    }

    #[test]
    fn test_lib_identity_and_dict() {
        let mut lib = lib();
        lib.add_decl(&motor_decl(), None);

        assert_eq!(lib.module_name(), "ice_pap");
        assert_eq!(lib.file_name(), "ice_pap.yaml");
        assert_eq!(lib.path(), Path::new("/pool/controllers"));

        let dict = lib.to_dict();
        assert_eq!(dict["name"], json!("ice_pap"));
        assert_eq!(dict["controllers"], json!(["IcePapCtrl"]));
        assert_eq!(dict["errors"], json!([]));
    }

    #[test]
    fn test_to_dict_is_deterministic() {
        let class = ControllerClass::catalog(&lib(), &motor_decl(), None).unwrap();
        assert_eq!(class.to_dict(), class.to_dict());
    }

    #[test]
    fn test_descriptor_dict_enum_strings() {
        let class = ControllerClass::catalog(&lib(), &motor_decl(), None).unwrap();
        let dict = class.to_dict();
        let host = &dict["ctrl_properties"]["Host"];
        assert_eq!(host["type"], json!("String"));
        assert_eq!(host["format"], json!("Scalar"));
        assert_eq!(host["access"], json!("ReadWrite"));
    }
}
