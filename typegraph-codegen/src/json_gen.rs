use serde_json::json;
use typegraph::schema::{PredicateType, Schema};

use crate::EmitOptions;

/// `schema.json`: one `(item_type, property, property_type)` row per typed
/// field of every entity. Fields typed `any` carry no usable type and are left out.
pub fn generate_schema_json(
    schema: &Schema,
    options: &EmitOptions,
) -> Result<String, serde_json::Error> {
    let mut rows = Vec::new();
    for entity in options.entities(schema) {
        for field in options.fields(schema, &entity.name) {
            let Some(property_type) = schema
                .predicate_type(&field.name)
                .filter(|t| !matches!(t, PredicateType::Any))
                .and_then(PredicateType::type_name)
            else {
                continue;
            };
            rows.push(json!({
                "item_type": entity.name,
                "property": field.name,
                "property_type": property_type,
            }));
        }
    }
    let mut out = serde_json::to_string_pretty(&json!({ "types": rows }))?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_schema;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    #[test]
    fn test_rows_per_entity_field() {
        let (_tmp, schema) = sample_schema();
        let out = generate_schema_json(&schema, &EmitOptions::default()).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        let rows = value["types"].as_array().unwrap();

        let person: Vec<_> = rows
            .iter()
            .filter(|r| r["item_type"] == "Person")
            .map(|r| (r["property"].as_str().unwrap(), r["property_type"].as_str().unwrap()))
            .collect();
        assert_eq!(
            person,
            vec![
                ("uid", "int"),
                ("dateCreated", "datetime"),
                ("name", "string"),
                ("type", "string"),
                ("friend", "Person"),
                ("spouse", "Person"),
            ]
        );
        assert!(rows.iter().all(|r| r["property"] != "label"));
    }
}
