//! `schema.swift`: the `ItemFamily` enum with its color tables, and one
//! `Codable` class per entity for the iOS client.

use typegraph::schema::{PredicateKind, PrimitiveType, ResolvedField, Schema};
use typegraph::text::{insert_list, wrap_text};
use typegraph::HierarchyNode;

use crate::type_utils::entity_struct_name;
use crate::EmitOptions;

const LINE_WIDTH: usize = 100;

/// Base class supplied by the client runtime.
const BASE_CLASS: &str = "ItemBase";

pub(crate) const DEFAULT_BACKGROUND: &str = "#93c47d";
pub(crate) const DEFAULT_FOREGROUND: &str = "#ffffff";

const SWIFT_KEYWORDS: &[&str] = &[
    "Any", "as", "associatedtype", "break", "case", "catch", "class", "continue", "default",
    "defer", "deinit", "do", "else", "enum", "extension", "fallthrough", "false", "fileprivate",
    "for", "func", "guard", "if", "import", "in", "init", "inout", "internal", "is", "let", "nil",
    "operator", "private", "protocol", "public", "repeat", "rethrows", "return", "self", "Self",
    "static", "struct", "subscript", "super", "switch", "throw", "throws", "true", "try",
    "typealias", "var", "where", "while",
];

fn swift_ident(name: &str) -> String {
    if SWIFT_KEYWORDS.contains(&name) {
        format!("`{name}`")
    } else {
        name.to_string()
    }
}

pub fn generate_swift(schema: &Schema, options: &EmitOptions) -> String {
    let classes: Vec<String> = options
        .entities_parent_first(schema)
        .into_iter()
        .map(|entity| generate_class(schema, options, entity))
        .collect();

    format!(
        "// Generated by typegraph from the entity and predicate hierarchies. Do not edit.\n\n\
         import Foundation\nimport SwiftUI\n{}{}",
        generate_item_family(schema, options),
        classes.join("")
    )
}

/// The enum naming every non-root entity, with its colors and class.
fn generate_item_family(schema: &Schema, options: &EmitOptions) -> String {
    let members: Vec<&HierarchyNode> = options.entities(schema).filter(|e| !e.is_root()).collect();
    if members.is_empty() {
        return String::new();
    }

    let mut cases = Vec::new();
    let mut backgrounds = Vec::new();
    let mut foregrounds = Vec::new();
    let mut types = Vec::new();
    for entity in members {
        let class_name = entity_struct_name(&entity.name);
        let background = entity.background_color.as_deref().unwrap_or(DEFAULT_BACKGROUND);
        let foreground = entity.foreground_color.as_deref().unwrap_or(DEFAULT_FOREGROUND);
        cases.push(format!("case type{class_name} = \"{}\"", entity.name));
        backgrounds.push(format!("case .type{class_name}: return Color(hex: \"{background}\")"));
        foregrounds.push(format!("case .type{class_name}: return Color(hex: \"{foreground}\")"));
        types.push(format!("case .type{class_name}: return {class_name}.self"));
    }

    format!(
        "\n// The family of all item classes\n\
         enum ItemFamily: String, CaseIterable {{\n    {}\n\n\
         \x20   var backgroundColor: Color {{\n        switch self {{\n        {}\n        }}\n    }}\n\n\
         \x20   var foregroundColor: Color {{\n        switch self {{\n        {}\n        }}\n    }}\n\n\
         \x20   func getType() -> {BASE_CLASS}.Type {{\n        switch self {{\n        {}\n        }}\n    }}\n}}\n",
        insert_list(&cases, 4),
        insert_list(&backgrounds, 8),
        insert_list(&foregrounds, 8),
        insert_list(&types, 8),
    )
}

fn doc_comment(description: Option<&str>, indent: usize) -> String {
    let pad = " ".repeat(indent);
    let wrapped = wrap_text(
        &format!("/// {}", description.unwrap_or("No description.")),
        LINE_WIDTH - indent,
        &format!("\n{pad}/// "),
    );
    format!("{pad}{wrapped}")
}

/// The Swift type of a stored primitive, and its default when decoding
/// finds nothing.
fn primitive_swift_type(primitive: PrimitiveType) -> (&'static str, Option<&'static str>) {
    match primitive {
        PrimitiveType::Bool => ("Bool", Some("false")),
        PrimitiveType::Int => ("Int", None),
        PrimitiveType::Float => ("Double", None),
        PrimitiveType::String => ("String", None),
        PrimitiveType::Datetime => ("Date", None),
    }
}

/// Class name a relation to `entity` is typed with.
fn target_class(schema: &Schema, options: &EmitOptions, entity: &str) -> String {
    options
        .nearest_included(schema, entity)
        .map(|e| entity_struct_name(&e.name))
        .unwrap_or_else(|| BASE_CLASS.to_string())
}

fn generate_class(schema: &Schema, options: &EmitOptions, entity: &HierarchyNode) -> String {
    let class_name = entity_struct_name(&entity.name);
    let base_name = options
        .base_entity(schema, entity)
        .map(|b| entity_struct_name(&b.name))
        .unwrap_or_else(|| BASE_CLASS.to_string());

    let mut stored = Vec::new();
    let mut computed = Vec::new();
    let mut decoded = Vec::new();
    for field in options.fields_beyond_base(schema, entity) {
        let Some(kind) = &field.kind else {
            log::debug!("{}.{}: no resolved type; skipped", entity.name, field.name);
            continue;
        };
        let doc = doc_comment(
            schema.predicate(&field.name).and_then(|p| p.description.as_deref()),
            4,
        );
        let ident = swift_ident(&field.name);
        match kind {
            PredicateKind::Primitive(p) => {
                let (ty, default) = primitive_swift_type(*p);
                let declaration = match default {
                    Some(value) => format!("    public var {ident}: {ty} = {value}"),
                    None => format!("    public var {ident}: {ty}?"),
                };
                stored.push(format!("{doc}\n{declaration}\n"));
                let fallback = default.map(|v| format!(" ?? {v}")).unwrap_or_default();
                decoded.push((field, ty, fallback));
            }
            _ => computed.push(format!("{doc}\n{}\n", relation_property(schema, options, field, kind))),
        }
    }

    let mut body = String::new();
    body.push_str(&stored.join(""));
    if !stored.is_empty() && !computed.is_empty() {
        body.push('\n');
    }
    body.push_str(&computed.join("\n"));
    if !decoded.is_empty() {
        body.push_str(&decoder(&decoded));
    }

    format!(
        "\n{}\npublic class {class_name}: {base_name} {{\n{body}}}\n",
        doc_comment(entity.description.as_deref(), 0)
    )
}

/// A computed property reading the relation's edges through the runtime.
fn relation_property(
    schema: &Schema,
    options: &EmitOptions,
    field: &ResolvedField,
    kind: &PredicateKind,
) -> String {
    let ident = swift_ident(&field.name);
    let name = &field.name;
    match kind {
        PredicateKind::EntityRef { entity, flags } => {
            let target = target_class(schema, options, entity);
            if flags.singular {
                format!(
                    "    public var {ident}: {target}? {{\n        edge(\"{name}\")?.target(type: {target}.self)\n    }}"
                )
            } else {
                let sorted = if flags.sequenced {
                    ".sorted(byKeyPath: \"sequence\")"
                } else {
                    ""
                };
                format!(
                    "    public var {ident}: [{target}]? {{\n        edges(\"{name}\")?{sorted}.items(type: {target}.self)\n    }}"
                )
            }
        }
        _ => format!(
            "    public var {ident}: [{BASE_CLASS}]? {{\n        edges(\"{name}\")?.itemsArray()\n    }}"
        ),
    }
}

fn decoder(decoded: &[(&ResolvedField, &str, String)]) -> String {
    let keys: Vec<String> = decoded.iter().map(|(f, _, _)| swift_ident(&f.name)).collect();
    let key_line = wrap_text(
        &format!("case {}", keys.join(", ")),
        LINE_WIDTH - 8,
        "\n             ",
    );
    let assignments: Vec<String> = decoded
        .iter()
        .map(|(field, ty, fallback)| {
            let ident = swift_ident(&field.name);
            format!("{ident} = try container.decodeIfPresent({ty}.self, forKey: .{ident}){fallback}")
        })
        .collect();

    format!(
        "\n    private enum CodingKeys: String, CodingKey {{\n        {key_line}\n    }}\n\n\
         \x20   public required init(from decoder: Decoder) throws {{\n\
         \x20       let container = try decoder.container(keyedBy: CodingKeys.self)\n\
         \x20       {}\n\
         \x20       try super.init(from: decoder)\n    }}\n",
        insert_list(&assignments, 8)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_schema;

    fn render() -> String {
        let (_tmp, schema) = sample_schema();
        generate_swift(&schema, &EmitOptions::default())
    }

    fn class<'a>(code: &'a str, header: &str) -> &'a str {
        code.split(header)
            .nth(1)
            .and_then(|rest| rest.split("\npublic class ").next())
            .unwrap_or_else(|| panic!("{header} missing"))
    }

    #[test]
    fn test_item_family_lists_non_root_entities_with_colors() {
        let code = render();
        assert!(code.contains("enum ItemFamily: String, CaseIterable {"));
        assert!(code.contains("case typePerson = \"Person\""));
        assert!(code.contains("case typeStudent = \"Student\""));
        assert!(!code.contains("case typeItem"));
        assert!(code.contains("case .typePerson: return Color(hex: \"#3a6ea5\")"));
        assert!(code.contains(&format!(
            "case .typeStudent: return Color(hex: \"{DEFAULT_BACKGROUND}\")"
        )));
        assert!(code.contains(&format!(
            "case .typePerson: return Color(hex: \"{DEFAULT_FOREGROUND}\")"
        )));
        assert!(code.contains("case .typePlace: return Place.self"));
    }

    #[test]
    fn test_classes_follow_the_hierarchy() {
        let code = render();
        let pos = |needle: &str| code.find(needle).unwrap_or_else(|| panic!("{needle} missing"));
        assert!(pos("public class Item: ItemBase {") < pos("public class Person: Item {"));
        assert!(pos("public class Person: Item {") < pos("public class Student: Person {"));

        let student = class(&code, "public class Student: Person {");
        assert!(student.contains("public var school: String?"));
        assert!(!student.contains("public var name"));
        assert!(student.contains("case school"));
    }

    #[test]
    fn test_properties_and_relations() {
        let code = render();
        let person = class(&code, "public class Person: Item {");
        assert!(person.contains("    /// Full name.\n    public var name: String?"));
        assert!(person.contains("edges(\"friend\")?.items(type: Person.self)"));
        assert!(person.contains("public var spouse: Person? {\n        edge(\"spouse\")?.target(type: Person.self)"));
        assert!(person.contains("case name, type"));
        assert!(person.contains("name = try container.decodeIfPresent(String.self, forKey: .name)"));

        let item = class(&code, "public class Item: ItemBase {");
        assert!(item.contains("public var dateCreated: Date?"));
        assert!(item.contains("public var label: [ItemBase]? {\n        edges(\"label\")?.itemsArray()"));

        let place = class(&code, "public class Place: Item {");
        assert!(place.contains("public var hidden: Bool = false"));
        assert!(place.contains("decodeIfPresent(Bool.self, forKey: .hidden) ?? false"));
    }

    #[test]
    fn test_excluded_relation_targets_fall_back_to_included_ancestor() {
        let (_tmp, schema) = sample_schema();
        let options = EmitOptions {
            exclude_entities: vec!["Person".into()],
            ..EmitOptions::default()
        };
        let code = generate_swift(&schema, &options);
        assert!(!code.contains("Person"));
        assert!(code.contains("public class Student: Item {"));
    }

    #[test]
    fn test_keywords_are_escaped() {
        assert_eq!(swift_ident("default"), "`default`");
        assert_eq!(swift_ident("type"), "type");
    }
}
