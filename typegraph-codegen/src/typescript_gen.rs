//! `schema.ts`: the `ItemFamily` enum, color lookups and one class per entity
//! for the browser client.

use typegraph::schema::{PredicateKind, PrimitiveType, ResolvedField, Schema};
use typegraph::text::{insert_list, wrap_text};
use typegraph::HierarchyNode;

use crate::swift_gen::{DEFAULT_BACKGROUND, DEFAULT_FOREGROUND};
use crate::type_utils::entity_struct_name;
use crate::EmitOptions;

const LINE_WIDTH: usize = 100;

const BASE_CLASS: &str = "ItemBase";

pub fn generate_typescript(schema: &Schema, options: &EmitOptions) -> String {
    let classes: Vec<String> = options
        .entities_parent_first(schema)
        .into_iter()
        .map(|entity| generate_class(schema, options, entity))
        .collect();

    format!(
        "// Generated by typegraph from the entity and predicate hierarchies. Do not edit.\n\n\
         import {{ {BASE_CLASS} }} from \"./itembase\";\n{}{}",
        generate_item_family(schema, options),
        classes.join("")
    )
}

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
        cases.push(format!("type{class_name} = \"{}\",", entity.name));
        backgrounds.push(format!("case ItemFamily.type{class_name}: return \"{background}\";"));
        foregrounds.push(format!("case ItemFamily.type{class_name}: return \"{foreground}\";"));
        types.push(format!("case ItemFamily.type{class_name}: return {class_name};"));
    }

    format!(
        "\n// The family of all item classes\nexport enum ItemFamily {{\n    {}\n}}\n{}{}{}",
        insert_list(&cases, 4),
        lookup("backgroundColor", "string", &backgrounds),
        lookup("foregroundColor", "string", &foregrounds),
        lookup("getItemType", &format!("typeof {BASE_CLASS}"), &types),
    )
}

/// An exported function switching over every `ItemFamily` member.
fn lookup(name: &str, returns: &str, arms: &[String]) -> String {
    format!(
        "\nexport function {name}(family: ItemFamily): {returns} {{\n    switch (family) {{\n        {}\n    }}\n}}\n",
        insert_list(arms, 8)
    )
}

fn doc_comment(description: Option<&str>, indent: usize) -> String {
    let pad = " ".repeat(indent);
    let wrapped = wrap_text(
        &format!("/** {} */", description.unwrap_or("No description.")),
        LINE_WIDTH - indent,
        &format!("\n{pad} * "),
    );
    format!("{pad}{wrapped}")
}

fn primitive_ts_type(primitive: PrimitiveType) -> &'static str {
    match primitive {
        PrimitiveType::Bool => "boolean",
        PrimitiveType::Int | PrimitiveType::Float => "number",
        PrimitiveType::String => "string",
        PrimitiveType::Datetime => "Date",
    }
}

fn generate_class(schema: &Schema, options: &EmitOptions, entity: &HierarchyNode) -> String {
    let class_name = entity_struct_name(&entity.name);
    let base_name = options
        .base_entity(schema, entity)
        .map(|b| entity_struct_name(&b.name))
        .unwrap_or_else(|| BASE_CLASS.to_string());

    let members: Vec<String> = options
        .fields_beyond_base(schema, entity)
        .into_iter()
        .filter_map(|field| {
            let kind = field.kind.as_ref()?;
            let doc = doc_comment(
                schema.predicate(&field.name).and_then(|p| p.description.as_deref()),
                4,
            );
            Some(format!("{doc}\n{}\n", member(schema, options, field, kind)))
        })
        .collect();

    format!(
        "\n{}\nexport class {class_name} extends {base_name} {{\n{}}}\n",
        doc_comment(entity.description.as_deref(), 0),
        members.join("\n")
    )
}

/// A field declaration for primitives, a getter over the edges otherwise.
fn member(schema: &Schema, options: &EmitOptions, field: &ResolvedField, kind: &PredicateKind) -> String {
    let name = &field.name;
    match kind {
        PredicateKind::Primitive(PrimitiveType::Bool) => format!("    {name}: boolean = false;"),
        PredicateKind::Primitive(p) => format!("    {name}?: {};", primitive_ts_type(*p)),
        PredicateKind::EntityRef { entity, flags } => {
            let target = options
                .nearest_included(schema, entity)
                .map(|e| entity_struct_name(&e.name))
                .unwrap_or_else(|| BASE_CLASS.to_string());
            if flags.singular {
                format!(
                    "    get {name}(): {target} | undefined {{\n        return this.edge(\"{name}\")?.target({target});\n    }}"
                )
            } else {
                let sorted = if flags.sequenced { ".sorted(\"sequence\")" } else { "" };
                format!(
                    "    get {name}(): {target}[] | undefined {{\n        return this.edges(\"{name}\")?{sorted}.items({target});\n    }}"
                )
            }
        }
        PredicateKind::Any => format!(
            "    get {name}(): {BASE_CLASS}[] | undefined {{\n        return this.edges(\"{name}\")?.itemsArray();\n    }}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_schema;

    fn render() -> String {
        let (_tmp, schema) = sample_schema();
        generate_typescript(&schema, &EmitOptions::default())
    }

    fn class<'a>(code: &'a str, header: &str) -> &'a str {
        code.split(header)
            .nth(1)
            .and_then(|rest| rest.split("\nexport class ").next())
            .unwrap_or_else(|| panic!("{header} missing"))
    }

    #[test]
    fn test_item_family_and_lookups() {
        let code = render();
        assert!(code.contains("export enum ItemFamily {\n    typePerson = \"Person\","));
        assert!(!code.contains("typeItem"));
        assert!(code.contains("export function backgroundColor(family: ItemFamily): string {"));
        assert!(code.contains("case ItemFamily.typePerson: return \"#3a6ea5\";"));
        assert!(code.contains(&format!(
            "case ItemFamily.typePlace: return \"{DEFAULT_BACKGROUND}\";"
        )));
        assert!(code.contains("export function getItemType(family: ItemFamily): typeof ItemBase {"));
        assert!(code.contains("case ItemFamily.typeStudent: return Student;"));
    }

    #[test]
    fn test_classes_extend_their_nearest_ancestor() {
        let code = render();
        let pos = |needle: &str| code.find(needle).unwrap_or_else(|| panic!("{needle} missing"));
        assert!(pos("export class Item extends ItemBase {") < pos("export class Person extends Item {"));
        assert!(pos("export class Person extends Item {") < pos("export class Student extends Person {"));

        let student = class(&code, "export class Student extends Person {");
        assert!(student.contains("school?: string;"));
        assert!(!student.contains("name?: string;"));
    }

    #[test]
    fn test_members() {
        let code = render();
        let person = class(&code, "export class Person extends Item {");
        assert!(person.contains("    /** Full name. */\n    name?: string;"));
        assert!(person.contains("get friend(): Person[] | undefined {\n        return this.edges(\"friend\")?.items(Person);"));
        assert!(person.contains("get spouse(): Person | undefined {\n        return this.edge(\"spouse\")?.target(Person);"));

        let item = class(&code, "export class Item extends ItemBase {");
        assert!(item.contains("uid?: number;"));
        assert!(item.contains("dateCreated?: Date;"));
        assert!(item.contains("get label(): ItemBase[] | undefined {"));

        let place = class(&code, "export class Place extends Item {");
        assert!(place.contains("hidden: boolean = false;"));
        assert!(place.contains("latitude?: number;"));
    }

    #[test]
    fn test_long_descriptions_wrap_as_block_comments() {
        let wrapped = doc_comment(Some("word ".repeat(40).as_str()), 4);
        assert!(wrapped.starts_with("    /** word"));
        assert!(wrapped.contains("\n     * word"));
        assert!(wrapped.ends_with("word */"));
        assert!(wrapped.lines().all(|l| l.chars().count() <= LINE_WIDTH));
    }
}
