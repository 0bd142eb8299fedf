//! End-to-end cataloguing: declaration text in, dictionary view out.

use anyhow::Result;
use controller_catalog::{
    decls_from_yaml, ControllerLib, DataAccess, DataFormat, DataType, ElementType,
};
use serde_json::json;
use std::io::Write;
use tempfile::TempDir;

const MODULE_TEXT: &str = r#"
- name: DummyMotorCtrl
  description: |
    Software motor controller for tests.
  gender: Motor controller
  model: Simulated
  organization: Lab
  implements: [Motor]
  features: [Home_speed]
  accepts_extra_args: true
  ctrl_properties:
    Host:
      type: string
      description: controller host
    Port:
      type: int
      defaultvalue: "5000"
  ctrl_attributes:
    LogLevel:
      type: int
      r/w type: read_write
  axis_attributes:
    PowerOn:
      type: bool
      r/w type: read

- name: SlitCtrl
  implements: [PseudoMotor]
  features: []
  accepts_extra_args: true
  ctrl_properties: {}
  ctrl_attributes: {}
  axis_attributes: {}
  motor_roles: [sl2t, sl2b]
  pseudo_motor_roles: [Gap, Offset]

- name: BrokenCtrl
  implements: [Motor]
  features: []
  ctrl_properties:
    Speed:
      type: warp
  ctrl_attributes: {}
  axis_attributes: {}
"#;

#[test]
fn catalog_module_from_declaration_file() -> Result<()> {
    // The module loader resolves the file and hands over its text.
    let dir = TempDir::new()?;
    let path = dir.path().join("dummy_motor.yaml");
    let mut file = std::fs::File::create(&path)?;
    file.write_all(MODULE_TEXT.as_bytes())?;

    let mut lib = ControllerLib::new("dummy_motor", &path);
    let decls = decls_from_yaml(&lib.source()?)?;
    assert_eq!(decls.len(), 3);
    assert_eq!(lib.add_decls(&decls), 2);

    // The broken class is recorded, siblings are unaffected.
    assert_eq!(lib.errors().len(), 1);
    assert_eq!(lib.errors()[0].0, "BrokenCtrl");
    assert!(!lib.has_controller("BrokenCtrl"));

    // Motor controller record.
    let motor = lib.get_controller("DummyMotorCtrl").unwrap();
    assert_eq!(motor.types(), &[ElementType::Motor]);
    assert_eq!(motor.full_name(), "dummy_motor.DummyMotorCtrl");
    assert_eq!(motor.api_version(), 1);

    let port = motor.ctrl_properties().get("PORT").unwrap();
    assert_eq!(port.dtype, DataType::Integer);
    assert_eq!(port.dformat, DataFormat::Scalar);
    assert_eq!(port.default_value, Some(json!(5000)));

    let power = motor.axis_attributes().get("poweron").unwrap();
    assert_eq!(power.access, DataAccess::ReadOnly);

    // Dictionary view renders canonical display strings.
    let dict = motor.to_dict();
    assert_eq!(dict["types"], json!(["Motor"]));
    assert_eq!(dict["ctrl_properties"]["Port"]["type"], json!("Integer"));
    assert_eq!(dict["ctrl_attributes"]["LogLevel"]["access"], json!("ReadWrite"));
    assert_eq!(dict["filename"], json!("dummy_motor.yaml"));
    assert!(dict.get("motor_roles").is_none());

    // Pseudo-motor record surfaces its role lists.
    let slit = lib.get_controller("SlitCtrl").unwrap();
    let dict = slit.to_dict();
    assert_eq!(dict["motor_roles"], json!(["sl2t", "sl2b"]));
    assert_eq!(dict["pseudo_motor_roles"], json!(["Gap", "Offset"]));

    Ok(())
}

#[test]
fn dictionary_view_round_trips_through_reverse_lookup() -> Result<()> {
    let text = r#"
name: RoundTrip
implements: [CounterTimer]
features: []
ctrl_properties: {}
ctrl_attributes:
  Gain:
    type: [float]
    r/w type: read
axis_attributes: {}
accepts_extra_args: true
"#;
    let mut lib = ControllerLib::new("round_trip", "/pool/round_trip.yaml");
    let decls = decls_from_yaml(text)?;
    assert_eq!(lib.add_decls(&decls), 1);

    let class = lib.get_controller("RoundTrip").unwrap();
    let dict = class.to_dict();

    for tag in dict["types"].as_array().unwrap() {
        let parsed = ElementType::from_name(tag.as_str().unwrap()).unwrap();
        assert!(class.types().contains(&parsed));
    }

    let gain = &dict["ctrl_attributes"]["Gain"];
    assert_eq!(
        DataType::from_name(gain["type"].as_str().unwrap()),
        Some(DataType::Double)
    );
    assert_eq!(
        DataFormat::from_name(gain["format"].as_str().unwrap()),
        Some(DataFormat::OneD)
    );
    assert_eq!(
        DataAccess::from_name(gain["access"].as_str().unwrap()),
        Some(DataAccess::ReadOnly)
    );

    Ok(())
}
