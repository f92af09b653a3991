pub mod model;
pub mod parser;
pub mod types;

pub use model::Schema;
pub use parser::{load_schema, load_schema_from_config};
pub use types::{
    FieldOrigin, PredicateKind, PredicateType, PrimitiveType, ResolvedField, ANY_TYPE,
};
