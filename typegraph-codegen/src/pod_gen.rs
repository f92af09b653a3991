use serde_json::json;
use typegraph::schema::{FieldOrigin, PrimitiveType, Schema};

use crate::EmitOptions;

fn db_type(primitive: PrimitiveType) -> &'static str {
    match primitive {
        PrimitiveType::String => "Text",
        PrimitiveType::Int => "Integer",
        PrimitiveType::Bool => "Bool",
        PrimitiveType::Float => "Real",
        PrimitiveType::Datetime => "DateTime",
    }
}

/// `database_schema.json`: the primitive properties of every entity,
/// sorted by name, with their database column types.
pub fn generate_pod_schema(
    schema: &Schema,
    options: &EmitOptions,
) -> Result<String, serde_json::Error> {
    let types: Vec<_> = options
        .entities(schema)
        .map(|entity| {
            let mut properties: Vec<_> = options
                .fields(schema, &entity.name)
                .into_iter()
                .filter(|f| f.origin == FieldOrigin::Property)
                .filter_map(|f| f.primitive().map(|p| (f.name.as_str(), db_type(p))))
                .collect();
            properties.sort();
            let properties: Vec<_> = properties
                .into_iter()
                .map(|(name, dbtype)| json!({ "name": name, "dbtype": dbtype, "indexed": false }))
                .collect();
            json!({ "name": entity.name, "properties": properties })
        })
        .collect();

    let mut out = serde_json::to_string_pretty(&json!({ "types": types }))?;
    out.push('\n');
    Ok(out)
}
