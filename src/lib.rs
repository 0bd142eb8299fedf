//! Controller class introspection and metadata catalog.
//!
//! This library inspects loaded controller class declarations (motor
//! controllers, counter/timer controllers, pseudo-motor controllers) and
//! builds the descriptive records a device pool publishes over its API:
//! names, normalized property and attribute descriptors, feature flags,
//! satisfied element types and, for pseudo-motors, role lists.
//!
//! The external module loader resolves files and hands over
//! [`ControllerDecl`] values (built in code or parsed from declaration
//! text); [`ControllerLib::add_decl`] catalogues each one into a
//! [`ControllerClass`] record, recording per-class failures on the module
//! record so sibling classes still load. `to_dict` on either record
//! produces the serializable dictionary view.

pub mod caseless;
pub mod catalog;
pub mod data;
pub mod decl;
pub mod descriptor;
pub mod error;
pub mod literal;
pub mod registry;

pub use caseless::CaselessMap;
pub use catalog::{ControllerClass, ControllerLib};
pub use data::{DataAccess, DataFormat, DataType};
pub use decl::{decls_from_yaml, ControllerDecl};
pub use descriptor::DataInfo;
pub use error::{CatalogError, CatalogResult};
pub use registry::{controller_template, type_data, ControllerApi, ElementType, TypeData, TYPE_ELEMENTS};
