use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::hierarchy::load_hierarchy;
use std::path::Path;

use super::model::Schema;

/// Load both hierarchies from disk and cross-link them into a schema.
pub fn load_schema(
    entities_root: &Path,
    entity_label: &str,
    predicates_root: &Path,
    predicate_label: &str,
) -> Result<Schema> {
    let entities = load_hierarchy(entities_root, entity_label)?;
    let predicates = load_hierarchy(predicates_root, predicate_label)?;
    Schema::build(entities, predicates)
}

/// Load the schema described by a generator config.
pub fn load_schema_from_config(config: &GeneratorConfig) -> Result<Schema> {
    load_schema(
        &config.entities.root,
        &config.entities.label,
        &config.predicates.root,
        &config.predicates.label,
    )
}
