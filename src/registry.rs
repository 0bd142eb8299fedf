//! Static element-type registry.
//!
//! Maps each element-type tag to its display metadata: name, family, the
//! pool record kind backing instances of that type, the template used to
//! derive a canonical instance full name, and the controller API a loaded
//! class must implement to be accepted as that type. Built once at first
//! use, read-only afterwards.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use strfmt::strfmt;

use crate::error::CatalogResult;

/// Category tag for a controllable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    /// A controller itself.
    Ctrl,
    /// A physical instrument grouping.
    Instrument,
    /// A physical motor axis.
    Motor,
    /// A counter/timer experimental channel.
    CTExpChannel,
    /// A derived motor computed from physical ones.
    PseudoMotor,
    /// A named group of motors.
    MotorGroup,
    /// A named group of acquisition channels.
    MeasurementGroup,
}

impl ElementType {
    /// Canonical tag name, as rendered in serialized dictionaries.
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Ctrl => "Ctrl",
            ElementType::Instrument => "Instrument",
            ElementType::Motor => "Motor",
            ElementType::CTExpChannel => "CTExpChannel",
            ElementType::PseudoMotor => "PseudoMotor",
            ElementType::MotorGroup => "MotorGroup",
            ElementType::MeasurementGroup => "MeasurementGroup",
        }
    }

    /// Reverse lookup from a canonical tag name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Ctrl" => Some(ElementType::Ctrl),
            "Instrument" => Some(ElementType::Instrument),
            "Motor" => Some(ElementType::Motor),
            "CTExpChannel" => Some(ElementType::CTExpChannel),
            "PseudoMotor" => Some(ElementType::PseudoMotor),
            "MotorGroup" => Some(ElementType::MotorGroup),
            "MeasurementGroup" => Some(ElementType::MeasurementGroup),
            _ => None,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Controller API a class can declare it implements.
///
/// The capability-tag counterpart of base-class membership: a declaration
/// lists the APIs it implements, and cataloguing matches them against the
/// registry instead of walking an inheritance chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerApi {
    /// The generic controller API.
    Controller,
    /// The motor controller API.
    Motor,
    /// The counter/timer controller API.
    CounterTimer,
    /// The pseudo-motor controller API.
    PseudoMotor,
}

impl ControllerApi {
    /// Canonical API name.
    pub fn name(self) -> &'static str {
        match self {
            ControllerApi::Controller => "Controller",
            ControllerApi::Motor => "Motor",
            ControllerApi::CounterTimer => "CounterTimer",
            ControllerApi::PseudoMotor => "PseudoMotor",
        }
    }
}

impl fmt::Display for ControllerApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Display metadata for one element type.
#[derive(Debug, Clone, Copy)]
pub struct TypeData {
    /// The tag this entry describes.
    pub element_type: ElementType,
    /// Display name.
    pub name: &'static str,
    /// Family grouping.
    pub family: &'static str,
    /// Pool record kind backing instances of this type.
    pub record_kind: &'static str,
    /// Template for deriving a canonical instance full name.
    pub auto_full_name: &'static str,
    /// Controller API a class must implement to satisfy this tag, if any.
    pub ctrl_api: Option<ControllerApi>,
}

impl TypeData {
    /// Expand the auto-full-name template with the given variables.
    ///
    /// Fails when the template references a variable that is not supplied.
    pub fn format_full_name(&self, vars: &HashMap<String, String>) -> CatalogResult<String> {
        Ok(strfmt(self.auto_full_name, vars)?)
    }
}

/// The fixed element-type registry.
static TYPE_MAP: Lazy<HashMap<ElementType, TypeData>> = Lazy::new(|| {
    let entries = [
        TypeData {
            element_type: ElementType::Ctrl,
            name: "Controller",
            family: "Controller",
            record_kind: "Controller",
            auto_full_name: "controller/{klass}/{name}",
            ctrl_api: Some(ControllerApi::Controller),
        },
        TypeData {
            element_type: ElementType::Instrument,
            name: "Instrument",
            family: "Instrument",
            record_kind: "Instrument",
            auto_full_name: "{full_name}",
            ctrl_api: None,
        },
        TypeData {
            element_type: ElementType::Motor,
            name: "Motor",
            family: "Motor",
            record_kind: "Motor",
            auto_full_name: "motor/{ctrl_name}/{axis}",
            ctrl_api: Some(ControllerApi::Motor),
        },
        TypeData {
            element_type: ElementType::CTExpChannel,
            name: "CTExpChannel",
            family: "ExpChannel",
            record_kind: "CounterTimer",
            auto_full_name: "expchan/{ctrl_name}/{axis}",
            ctrl_api: Some(ControllerApi::CounterTimer),
        },
        TypeData {
            element_type: ElementType::PseudoMotor,
            name: "PseudoMotor",
            family: "Motor",
            record_kind: "PseudoMotor",
            auto_full_name: "pm/{ctrl_name}/{axis}",
            ctrl_api: Some(ControllerApi::PseudoMotor),
        },
        TypeData {
            element_type: ElementType::MotorGroup,
            name: "MotorGroup",
            family: "MotorGroup",
            record_kind: "MotorGroup",
            auto_full_name: "mg/{pool_name}/{name}",
            ctrl_api: None,
        },
        TypeData {
            element_type: ElementType::MeasurementGroup,
            name: "MeasurementGroup",
            family: "MeasurementGroup",
            record_kind: "MeasurementGroup",
            auto_full_name: "mntgrp/{pool_name}/{name}",
            ctrl_api: None,
        },
    ];
    entries.into_iter().map(|t| (t.element_type, t)).collect()
});

/// Element types that denote a concrete controllable-device category.
///
/// Only these participate in the satisfied-types scan during cataloguing.
pub const TYPE_ELEMENTS: &[ElementType] = &[
    ElementType::Motor,
    ElementType::CTExpChannel,
    ElementType::PseudoMotor,
];

/// Look up the registry entry for an element type.
pub fn type_data(element_type: ElementType) -> Option<&'static TypeData> {
    TYPE_MAP.get(&element_type)
}

/// Skeleton declaration text for a new controller class.
pub const CONTROLLER_TEMPLATE: &str = "\
name: {controller_name}
description: {controller_name} controller.
implements: [{controller_api}]
features: []
ctrl_properties: {{}}
ctrl_attributes: {{}}
axis_attributes: {{}}
";

/// Render the declaration skeleton for a new controller.
pub fn controller_template(name: &str, api: ControllerApi) -> CatalogResult<String> {
    let mut vars = HashMap::new();
    vars.insert("controller_name".to_string(), name.to_string());
    vars.insert("controller_api".to_string(), api.name().to_string());
    Ok(strfmt(CONTROLLER_TEMPLATE, &vars)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let motor = type_data(ElementType::Motor).unwrap();
        assert_eq!(motor.name, "Motor");
        assert_eq!(motor.family, "Motor");
        assert_eq!(motor.ctrl_api, Some(ControllerApi::Motor));

        let ct = type_data(ElementType::CTExpChannel).unwrap();
        assert_eq!(ct.family, "ExpChannel");

        let mg = type_data(ElementType::MeasurementGroup).unwrap();
        assert_eq!(mg.ctrl_api, None);
    }

    #[test]
    fn test_type_elements_all_have_ctrl_api() {
        for t in TYPE_ELEMENTS {
            assert!(type_data(*t).unwrap().ctrl_api.is_some());
        }
    }

    #[test]
    fn test_element_type_name_round_trip() {
        for t in [
            ElementType::Ctrl,
            ElementType::Instrument,
            ElementType::Motor,
            ElementType::CTExpChannel,
            ElementType::PseudoMotor,
            ElementType::MotorGroup,
            ElementType::MeasurementGroup,
        ] {
            assert_eq!(ElementType::from_name(t.name()), Some(t));
        }
        assert_eq!(ElementType::from_name("Spectrometer"), None);
    }

    #[test]
    fn test_auto_full_name_expansion() {
        let motor = type_data(ElementType::Motor).unwrap();
        let mut vars = HashMap::new();
        vars.insert("ctrl_name".to_string(), "ipap01".to_string());
        vars.insert("axis".to_string(), "3".to_string());
        assert_eq!(motor.format_full_name(&vars).unwrap(), "motor/ipap01/3");
    }

    #[test]
    fn test_auto_full_name_missing_variable() {
        let motor = type_data(ElementType::Motor).unwrap();
        let vars = HashMap::new();
        assert!(motor.format_full_name(&vars).is_err());
    }

    #[test]
    fn test_controller_template() {
        let text = controller_template("MyMotorCtrl", ControllerApi::Motor).unwrap();
        assert!(text.contains("name: MyMotorCtrl"));
        assert!(text.contains("implements: [Motor]"));
        assert!(text.contains("ctrl_properties: {}"));
    }
}
