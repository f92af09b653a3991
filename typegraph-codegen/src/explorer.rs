//! Static HTML explorer: an index with both trees and one page per node.

use typegraph::schema::{PredicateType, Schema};
use typegraph::{Hierarchy, HierarchyNode};

use crate::{EmitOptions, GeneratedFile};

const ENTITY_DIR: &str = "entities";
const PREDICATE_DIR: &str = "predicates";

const STYLE: &str = "body{font-family:sans-serif;max-width:60em;margin:2em auto;padding:0 1em}\
nav{color:#666;margin-bottom:1em}\
table{border-collapse:collapse}td,th{padding:.2em .8em;border-bottom:1px solid #ddd;text-align:left}\
.inherited{color:#777}ul.tree{list-style:none;padding-left:1.2em}";

#[derive(Clone, Copy)]
enum Side {
    Entities,
    Predicates,
}

impl Side {
    fn dir(self) -> &'static str {
        match self {
            Side::Entities => ENTITY_DIR,
            Side::Predicates => PREDICATE_DIR,
        }
    }

    fn includes(self, options: &EmitOptions, name: &str) -> bool {
        match self {
            Side::Entities => options.includes_entity(name),
            Side::Predicates => options.includes_field(name),
        }
    }
}

pub fn generate_site(schema: &Schema, options: &EmitOptions) -> Vec<GeneratedFile> {
    let mut files = vec![GeneratedFile::new(
        "index.html",
        render_index(schema, options),
    )];

    for entity in options.entities(schema) {
        files.push(GeneratedFile::new(
            format!("{ENTITY_DIR}/{}.html", entity.name),
            render_entity(schema, options, entity),
        ));
    }
    for predicate in schema.predicates().iter() {
        if !options.includes_field(&predicate.name) {
            continue;
        }
        files.push(GeneratedFile::new(
            format!("{PREDICATE_DIR}/{}.html", predicate.name),
            render_predicate(schema, options, predicate),
        ));
    }
    files
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, root_prefix: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>{STYLE}</style>\n</head>\n<body>\n<p><a href=\"{root_prefix}index.html\">Schema explorer</a></p>\n\
         {body}</body>\n</html>\n",
        title = escape(title),
    )
}

/// A link to a node page from a page `root_prefix` below the site root.
fn link(root_prefix: &str, side: Side, name: &str) -> String {
    let name = escape(name);
    format!(
        "<a href=\"{root_prefix}{}/{name}.html\">{name}</a>",
        side.dir()
    )
}

/// Direct children of `node` in `hierarchy`, skipping same-named nodes elsewhere.
fn children<'a>(hierarchy: &'a Hierarchy, node: &HierarchyNode) -> Vec<&'a HierarchyNode> {
    node.children
        .iter()
        .filter_map(|name| hierarchy.get(name))
        .filter(|child| {
            child.path.len() == node.path.len() + 1 && child.path.starts_with(&node.path)
        })
        .collect()
}

fn render_tree(
    hierarchy: &Hierarchy,
    options: &EmitOptions,
    side: Side,
    node: &HierarchyNode,
) -> String {
    if !side.includes(options, &node.name) {
        return String::new();
    }
    let nested: String = children(hierarchy, node)
        .into_iter()
        .map(|child| render_tree(hierarchy, options, side, child))
        .collect();
    let nested = if nested.is_empty() {
        nested
    } else {
        format!("<ul class=\"tree\">{nested}</ul>")
    };
    format!("<li>{}{nested}</li>", link("", side, &node.name))
}

fn render_index(schema: &Schema, options: &EmitOptions) -> String {
    let mut body = String::new();
    for (title, hierarchy, side) in [
        ("Entities", schema.entities(), Side::Entities),
        ("Predicates", schema.predicates(), Side::Predicates),
    ] {
        body.push_str(&format!("<h2>{title}</h2>\n"));
        if let Some(root) = hierarchy.root_node() {
            body.push_str(&format!(
                "<ul class=\"tree\">{}</ul>\n",
                render_tree(hierarchy, options, side, root)
            ));
        }
    }
    page("Schema explorer", "", &body)
}

fn breadcrumbs(options: &EmitOptions, side: Side, node: &HierarchyNode) -> String {
    let crumbs: Vec<String> = node
        .path
        .iter()
        .map(|segment| {
            if side.includes(options, segment) {
                link("../", side, segment)
            } else {
                escape(segment)
            }
        })
        .collect();
    format!("<nav>{}</nav>\n", crumbs.join(" / "))
}

fn heading(node: &HierarchyNode) -> String {
    let style = match (&node.background_color, &node.foreground_color) {
        (None, None) => String::new(),
        (background, foreground) => {
            let mut css = String::new();
            if let Some(bg) = background {
                css.push_str(&format!("background:{};", escape(bg)));
            }
            if let Some(fg) = foreground {
                css.push_str(&format!("color:{};", escape(fg)));
            }
            format!(" style=\"{css}\"")
        }
    };
    format!("<h1{style}>{}</h1>\n", escape(&node.name))
}

fn description(node: &HierarchyNode) -> String {
    match node.description.as_deref() {
        Some(text) if !text.trim().is_empty() => format!("<p>{}</p>\n", escape(text)),
        _ => "<p><em>No description.</em></p>\n".to_string(),
    }
}

fn child_list(hierarchy: &Hierarchy, options: &EmitOptions, side: Side, node: &HierarchyNode) -> String {
    let items: Vec<String> = children(hierarchy, node)
        .into_iter()
        .filter(|c| side.includes(options, &c.name))
        .map(|c| format!("<li>{}</li>", link("../", side, &c.name)))
        .collect();
    if items.is_empty() {
        String::new()
    } else {
        format!("<h2>Children</h2>\n<ul>{}</ul>\n", items.join(""))
    }
}

fn type_cell(schema: &Schema, options: &EmitOptions, predicate: &str) -> String {
    match schema.predicate_type(predicate) {
        Some(PredicateType::Entity(entity)) if options.includes_entity(entity) => {
            link("../", Side::Entities, entity)
        }
        Some(t) => t
            .type_name()
            .map(escape)
            .unwrap_or_else(|| "<em>untyped</em>".to_string()),
        None => "<em>unknown predicate</em>".to_string(),
    }
}

fn render_entity(schema: &Schema, options: &EmitOptions, entity: &HierarchyNode) -> String {
    let mut body = breadcrumbs(options, Side::Entities, entity);
    body.push_str(&heading(entity));
    body.push_str(&description(entity));

    let rows: Vec<String> = options
        .fields(schema, &entity.name)
        .into_iter()
        .map(|field| {
            let inherited = field.is_inherited_by(&entity.name);
            let declared_on = if options.includes_entity(&field.declared_on) {
                link("../", Side::Entities, &field.declared_on)
            } else {
                escape(&field.declared_on)
            };
            format!(
                "<tr{}><td>{}</td><td>{}</td><td>{}</td></tr>",
                if inherited { " class=\"inherited\"" } else { "" },
                link("../", Side::Predicates, &field.name),
                type_cell(schema, options, &field.name),
                declared_on,
            )
        })
        .collect();
    if !rows.is_empty() {
        body.push_str(&format!(
            "<h2>Fields</h2>\n<table>\n<tr><th>Name</th><th>Type</th><th>Declared on</th></tr>\n{}\n</table>\n",
            rows.join("\n")
        ));
    }

    body.push_str(&child_list(schema.entities(), options, Side::Entities, entity));
    page(&entity.name, "../", &body)
}

fn render_predicate(schema: &Schema, options: &EmitOptions, predicate: &HierarchyNode) -> String {
    let mut body = breadcrumbs(options, Side::Predicates, predicate);
    body.push_str(&heading(predicate));
    body.push_str(&description(predicate));
    body.push_str(&format!(
        "<p>Type: {}</p>\n",
        type_cell(schema, options, &predicate.name)
    ));

    let users: Vec<String> = schema
        .entities_declaring(&predicate.name)
        .into_iter()
        .filter(|e| options.includes_entity(e))
        .map(|e| format!("<li>{}</li>", link("../", Side::Entities, e)))
        .collect();
    if !users.is_empty() {
        body.push_str(&format!(
            "<h2>Declared by</h2>\n<ul>{}</ul>\n",
            users.join("")
        ));
    }

    body.push_str(&child_list(schema.predicates(), options, Side::Predicates, predicate));
    page(&predicate.name, "../", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_schema;

    fn site() -> Vec<GeneratedFile> {
        let (_tmp, schema) = sample_schema();
        generate_site(&schema, &EmitOptions::default())
    }

    fn file<'a>(files: &'a [GeneratedFile], path: &str) -> &'a str {
        &files
            .iter()
            .find(|f| f.path.to_str() == Some(path))
            .unwrap_or_else(|| panic!("{path} not generated"))
            .contents
    }

    #[test]
    fn test_page_per_node() {
        let files = site();
        // index + 4 entities + 11 predicates
        assert_eq!(files.len(), 16);
        assert!(file(&files, "index.html").contains("entities/Student.html"));
    }

    #[test]
    fn test_entity_page() {
        let files = site();
        let student = file(&files, "entities/Student.html");

        assert!(student.contains(
            "<a href=\"../entities/Item.html\">Item</a> / <a href=\"../entities/Person.html\">Person</a>"
        ));
        assert!(student.contains("Someone &lt;enrolled&gt; &amp; studying."));
        assert!(student.contains("<tr class=\"inherited\"><td><a href=\"../predicates/uid.html\">uid</a>"));
        assert!(student.contains("<tr><td><a href=\"../predicates/school.html\">school</a></td><td>string</td>"));
    }

    #[test]
    fn test_predicate_page_lists_declaring_entities() {
        let files = site();
        let friend = file(&files, "predicates/friend.html");
        assert!(friend.contains("Type: <a href=\"../entities/Person.html\">Person</a>"));
        assert!(friend.contains("<h2>Declared by</h2>"));

        let root = file(&files, "predicates/EdgeOrProperty.html");
        assert!(root.contains("<h2>Children</h2>"));
        assert!(root.contains("<em>untyped</em>"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
    }
}
