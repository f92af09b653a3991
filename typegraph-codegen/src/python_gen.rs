use std::collections::HashSet;

use typegraph::schema::{FieldOrigin, PredicateKind, ResolvedField, Schema};
use typegraph::text::{insert_list, wrap_text};
use typegraph::HierarchyNode;

use crate::type_utils::entity_struct_name;
use crate::EmitOptions;

const LINE_WIDTH: usize = 100;

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield", "cls", "self", "json",
];

fn python_ident(name: &str) -> String {
    if PYTHON_KEYWORDS.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

fn is_edge(field: &ResolvedField) -> bool {
    field.origin == FieldOrigin::Relation
        || matches!(
            field.kind,
            Some(PredicateKind::EntityRef { .. }) | Some(PredicateKind::Any)
        )
}

/// `schema.py`: a class per entity, parents before children.
pub fn generate_python(schema: &Schema, options: &EmitOptions) -> String {
    let classes: Vec<String> = options
        .entities_parent_first(schema)
        .into_iter()
        .map(|entity| generate_class(schema, options, entity))
        .collect();

    format!(
        "# Generated by typegraph from the entity and predicate hierarchies. Do not edit.\n\n\
         from .itembase import ItemBase, Edge\n\n{}\n",
        classes.join("")
    )
}

fn generate_class(schema: &Schema, options: &EmitOptions, entity: &HierarchyNode) -> String {
    let class_name = entity_struct_name(&entity.name);
    let fields = options.fields(schema, &entity.name);
    let base = options.base_entity(schema, entity);

    let (base_name, base_fields): (String, HashSet<&str>) = match base {
        Some(b) => (
            entity_struct_name(&b.name),
            options
                .fields(schema, &b.name)
                .into_iter()
                .map(|f| f.name.as_str())
                .collect(),
        ),
        None => ("ItemBase".to_string(), HashSet::new()),
    };

    let description = wrap_text(
        &format!(
            "# {}",
            entity.description.as_deref().unwrap_or("No description.")
        ),
        LINE_WIDTH,
        "\n# ",
    );

    let args: Vec<String> = fields
        .iter()
        .map(|f| format!("{}=None", python_ident(&f.name)))
        .collect();
    let def_line = wrap_text(
        &format!("def __init__(self{})", prefixed(", ", &args.join(", "))),
        LINE_WIDTH,
        &format!("\n{}", " ".repeat(17)),
    );

    let super_args: Vec<String> = fields
        .iter()
        .filter(|f| base_fields.contains(f.name.as_str()))
        .map(|f| {
            let ident = python_ident(&f.name);
            format!("{ident}={ident}")
        })
        .collect();
    let super_line = wrap_text(
        &format!("super().__init__({})", super_args.join(", ")),
        LINE_WIDTH,
        &format!("\n{}", " ".repeat(25)),
    );

    let attributes: Vec<String> = fields
        .iter()
        .filter(|f| !base_fields.contains(f.name.as_str()))
        .map(|f| {
            let ident = python_ident(&f.name);
            if is_edge(f) {
                format!("self.{ident} = {ident} if {ident} is not None else []")
            } else {
                format!("self.{ident} = {ident}")
            }
        })
        .collect();

    let mut class = format!(
        "\n\n{description}\nclass {class_name}({base_name}):\n    {def_line}:\n        {super_line}\n"
    );
    if !attributes.is_empty() {
        class.push_str(&format!("        {}\n", insert_list(&attributes, 8)));
    }
    class.push_str(&generate_from_json(&fields));
    class
}

fn generate_from_json(fields: &[&ResolvedField]) -> String {
    let (edges, properties): (Vec<&ResolvedField>, Vec<&ResolvedField>) =
        fields.iter().copied().partition(|f| is_edge(f));

    let mut body: Vec<String> = Vec::new();
    if !edges.is_empty() {
        body.push("all_edges = json.get(\"allEdges\", None)".to_string());
    }
    body.extend(properties.iter().map(|f| {
        format!("{} = json.get(\"{}\", None)", python_ident(&f.name), f.name)
    }));
    body.extend(edges.iter().map(|f| format!("{} = []", python_ident(&f.name))));

    let mut out = String::from("\n    @classmethod\n    def from_json(cls, json):\n");
    if !body.is_empty() {
        out.push_str(&format!("        {}\n", insert_list(&body, 8)));
    }

    if !edges.is_empty() {
        let dispatch: Vec<String> = edges
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let keyword = if i == 0 { "if" } else { "elif" };
                format!(
                    "{keyword} edge._type == \"{name}\" or edge._type == \"~{name}\":\n{pad}{ident}.append(edge)",
                    name = f.name,
                    pad = " ".repeat(20),
                    ident = python_ident(&f.name),
                )
            })
            .collect();
        out.push_str(&format!(
            "        if all_edges is not None:\n            for edge_json in all_edges:\n                \
             edge = Edge.from_json(edge_json)\n                {}\n",
            insert_list(&dispatch, 16)
        ));
    }

    let kwargs: Vec<String> = fields
        .iter()
        .map(|f| {
            let ident = python_ident(&f.name);
            format!("{ident}={ident}")
        })
        .collect();
    let return_line = wrap_text(
        &format!("return cls({})", kwargs.join(", ")),
        LINE_WIDTH,
        &format!("\n{}", " ".repeat(19)),
    );
    out.push_str(&format!("        {return_line}\n"));
    out
}

fn prefixed(prefix: &str, s: &str) -> String {
    if s.is_empty() {
        String::new()
    } else {
        format!("{prefix}{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_schema;

    fn render() -> String {
        let (_tmp, schema) = sample_schema();
        generate_python(&schema, &EmitOptions::default())
    }

    #[test]
    fn test_classes_ordered_parent_first() {
        let code = render();
        let pos = |needle: &str| code.find(needle).unwrap_or_else(|| panic!("{needle} missing"));
        assert!(pos("class Item(ItemBase):") < pos("class Person(Item):"));
        assert!(pos("class Person(Item):") < pos("class Student(Person):"));
        assert!(code.contains("class Place(Item):"));
    }

    #[test]
    fn test_inherited_fields_passed_to_super() {
        let code = render();
        let student = code.split("class Student(Person):").nth(1).unwrap();
        assert!(student.contains("super().__init__(uid=uid, dateCreated=dateCreated"));
        assert!(student.contains("self.school = school"));
        assert!(!student.contains("self.name = name"));
    }

    #[test]
    fn test_edges_default_to_lists_and_dispatch() {
        let code = render();
        let person = code
            .split("class Person(Item):")
            .nth(1)
            .and_then(|rest| rest.split("\nclass ").next())
            .unwrap();
        assert!(person.contains("self.friend = friend if friend is not None else []"));
        assert!(person.contains("if edge._type == \"friend\" or edge._type == \"~friend\":"));
        assert!(person.contains("elif edge._type == \"spouse\""));
        assert!(person.contains("name = json.get(\"name\", None)"));
    }

    #[test]
    fn test_descriptions_wrapped_as_comments() {
        let code = render();
        assert!(code.contains("# A human being.\nclass Person(Item):"));
        assert!(code
            .lines()
            .filter(|l| l.starts_with('#'))
            .all(|l| l.chars().count() <= LINE_WIDTH));
    }
}
