//! Conversion of flat attribute files into one JSON file per node.

use crate::error::{Result, TypeGraphError};
use crate::hierarchy::{HierarchyNode, RelationDecl, RelationFlags};
use crate::schema::Schema;
use serde_json::{json, Map, Value};
use std::path::PathBuf;

/// One JSON node file to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRewrite {
    pub path: PathBuf,
    pub document: Value,
}

/// Compute the JSON file for every entity and predicate in the schema.
///
/// Entity properties whose predicate is not primitive move to `relations`;
/// predicates carry their description and declared type.
pub fn plan(schema: &Schema) -> Vec<NodeRewrite> {
    let entities = schema.entities().iter().map(|entity| NodeRewrite {
        path: json_path(entity),
        document: entity_document(schema, entity),
    });
    let predicates = schema.predicates().iter().map(|predicate| NodeRewrite {
        path: json_path(predicate),
        document: json!({
            "description": predicate.description,
            "type": predicate.declared_type,
        }),
    });
    entities.chain(predicates).collect()
}

/// Write every planned file as pretty-printed JSON.
pub fn apply(rewrites: &[NodeRewrite]) -> Result<()> {
    for rewrite in rewrites {
        let body = serde_json::to_string_pretty(&rewrite.document)?;
        std::fs::write(&rewrite.path, body + "\n")
            .map_err(|e| TypeGraphError::write(&rewrite.path, e))?;
        log::info!("Wrote {}", rewrite.path.display());
    }
    Ok(())
}

fn json_path(node: &HierarchyNode) -> PathBuf {
    node.dir.join(format!("{}.json", node.name))
}

fn entity_document(schema: &Schema, entity: &HierarchyNode) -> Value {
    let mut properties = Vec::new();
    let mut relations: Vec<RelationDecl> = Vec::new();

    for property in &entity.properties {
        match schema.predicate_type(property) {
            Some(t) if t.is_primitive() => properties.push(property.clone()),
            Some(_) => {
                relations.push(RelationDecl::new(property.clone(), RelationFlags::default()))
            }
            None => {
                log::warn!(
                    "{}: property '{property}' has no predicate; kept as a property",
                    entity.path_string()
                );
                properties.push(property.clone());
            }
        }
    }
    relations.extend(entity.relations.iter().cloned());

    let mut relation_map = Map::new();
    for relation in relations {
        relation_map.insert(
            relation.name,
            json!({
                "sequenced": relation.flags.sequenced,
                "singular": relation.flags.singular,
            }),
        );
    }

    let mut document = Map::new();
    document.insert("description".into(), json!(entity.description));
    document.insert("properties".into(), json!(properties));
    document.insert("relations".into(), Value::Object(relation_map));
    if let Some(color) = &entity.foreground_color {
        document.insert("foregroundColor".into(), json!(color));
    }
    if let Some(color) = &entity.background_color {
        document.insert("backgroundColor".into(), json!(color));
    }
    for (key, value) in &entity.attributes {
        document.entry(key.clone()).or_insert_with(|| value.clone());
    }
    Value::Object(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::load_hierarchy;
    use crate::schema::load_schema;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn text_schema() -> (TempDir, Schema) {
        let tmp = TempDir::new().unwrap();
        let e = tmp.path().join("entities");
        let p = tmp.path().join("predicates");
        write(&e, "description.md", "Anything.");
        write(&e, "properties.txt", "uid\n");
        write(&e, "Person/description.md", "A human.");
        write(&e, "Person/properties.txt", "name\nfriend\nsequenced_one_spouse\n");
        write(&p, "uid/expectedTypes.txt", "int");
        write(&p, "name/expectedTypes.txt", "string");
        write(&p, "name/description.md", "Full name.");
        write(&p, "friend/expectedTypes.txt", "Person");
        write(&p, "spouse/expectedTypes.txt", "Person");
        let schema = load_schema(&e, "Item", &p, "EdgeOrProperty").unwrap();
        (tmp, schema)
    }

    #[test]
    fn test_plan_moves_entity_typed_properties_to_relations() {
        let (_tmp, schema) = text_schema();
        let rewrites = plan(&schema);
        let person = rewrites
            .iter()
            .find(|r| r.path.ends_with("Person/Person.json"))
            .unwrap();

        assert_eq!(person.document["properties"], json!(["name"]));
        assert_eq!(
            person.document["relations"]["friend"],
            json!({"sequenced": false, "singular": false})
        );
        assert_eq!(
            person.document["relations"]["spouse"],
            json!({"sequenced": true, "singular": true})
        );
        assert_eq!(person.document["description"], json!("A human."));
    }

    #[test]
    fn test_plan_moves_every_non_primitive_property() {
        let (tmp, _) = text_schema();
        let e = tmp.path().join("entities");
        let p = tmp.path().join("predicates");
        write(&e, "Place/properties.txt", "latitude\nghostly\nuntyped\ngroup\nmissing\n");
        write(&p, "latitude/expectedTypes.txt", "float");
        write(&p, "ghostly/expectedTypes.txt", "Ghost");
        write(&p, "untyped/description.md", "No type.");
        write(&p, "group/member/expectedTypes.txt", "Person");
        let schema = load_schema(&e, "Item", &p, "EdgeOrProperty").unwrap();

        let place = plan(&schema)
            .into_iter()
            .find(|r| r.path.ends_with("Place/Place.json"))
            .unwrap();
        assert_eq!(place.document["properties"], json!(["latitude", "missing"]));
        let relations: Vec<_> = place.document["relations"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(relations, vec!["ghostly", "group", "untyped"]);
    }

    #[test]
    fn test_apply_reports_write_failures() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing/dir/Node.json");
        let err = apply(&[NodeRewrite {
            path: path.clone(),
            document: json!({}),
        }])
        .unwrap_err();

        assert!(err.to_string().starts_with("Cannot write"), "{err}");
        match err {
            TypeGraphError::Write { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("expected write error, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_predicate_documents() {
        let (_tmp, schema) = text_schema();
        let rewrites = plan(&schema);
        let name = rewrites
            .iter()
            .find(|r| r.path.ends_with("name/name.json"))
            .unwrap();
        assert_eq!(name.document, json!({"description": "Full name.", "type": "string"}));
    }

    #[test]
    fn test_apply_then_reload_preserves_model() {
        let (tmp, schema) = text_schema();
        apply(&plan(&schema)).unwrap();

        // Drop the text files so only the JSON encoding remains.
        for entry in ["entities/properties.txt", "entities/Person/properties.txt"] {
            std::fs::remove_file(tmp.path().join(entry)).unwrap();
        }
        let reloaded = load_schema(
            &tmp.path().join("entities"),
            "Item",
            &tmp.path().join("predicates"),
            "EdgeOrProperty",
        )
        .unwrap();

        assert_eq!(
            reloaded.resolved_field_names("Person"),
            Some(vec!["uid", "name", "friend", "spouse"])
        );
        let entities = load_hierarchy(&tmp.path().join("entities"), "Item").unwrap();
        assert!(entities.notices.is_empty());
    }
}
