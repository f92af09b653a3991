pub mod ancestry;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod reformat;
pub mod schema;
pub mod text;
pub mod validation;

pub use ancestry::{ancestry, ancestry_of, Ancestry};
pub use config::{load_config, GeneratorConfig};
pub use error::{Result, TypeGraphError};
pub use hierarchy::{load_hierarchy, Hierarchy, HierarchyNode};
pub use schema::{load_schema, load_schema_from_config, Schema};
pub use validation::{check, Diagnostic, DiagnosticReport};
