//! Structural lint over a loaded schema.
//!
//! Every check runs over every node; findings are returned as data and the
//! caller decides whether errors fail the build.

use crate::hierarchy::{Hierarchy, HierarchyNode, NoticeKind};
use crate::schema::{PredicateType, Schema};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

pub const DEFAULT_PLACEHOLDER_MARKERS: [&str; 4] = ["TODO", "TBD", "FIXME", "placeholder"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    DanglingReference,
    UnknownPredicateType,
    MissingPredicateType,
    Redefinition,
    MisfiledField,
    DuplicateName,
    UnusedPredicate,
    MissingDescription,
    FileNameMismatch,
}

impl Category {
    pub fn severity(self) -> Severity {
        match self {
            Category::UnusedPredicate | Category::MissingDescription | Category::FileNameMismatch => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }

    /// Heading used when printing a report.
    pub fn title(self) -> &'static str {
        match self {
            Category::DanglingReference => "Properties and relations that do not exist",
            Category::UnknownPredicateType => "Predicates with a non-existent type",
            Category::MissingPredicateType => "Predicates without a type",
            Category::Redefinition => "Redefined properties and relations",
            Category::MisfiledField => "Fields filed under the wrong list",
            Category::DuplicateName => "Duplicate node names",
            Category::UnusedPredicate => "Unused predicates",
            Category::MissingDescription => "Missing descriptions",
            Category::FileNameMismatch => "JSON files not named after their directory",
        }
    }
}

/// One finding: what kind, where, and a readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: Category,
    pub severity: Severity,
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(category: Category, path: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic {
            category,
            severity: category.severity(),
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.path, self.message)
    }
}

/// Result of checking a schema
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiagnosticReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticReport {
    pub fn is_ok(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn of(&self, category: Category) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.category == category)
    }

    pub fn by_category(&self) -> BTreeMap<Category, Vec<&Diagnostic>> {
        let mut grouped: BTreeMap<Category, Vec<&Diagnostic>> = BTreeMap::new();
        for d in &self.diagnostics {
            grouped.entry(d.category).or_default().push(d);
        }
        grouped
    }
}

#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Case-insensitive markers that flag a description as unfinished.
    pub placeholder_markers: Vec<String>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            placeholder_markers: DEFAULT_PLACEHOLDER_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

/// Run every check against the schema and collect the findings.
pub fn check(schema: &Schema, options: &CheckOptions) -> DiagnosticReport {
    let mut diagnostics = Vec::new();
    diagnostics.extend(check_references(schema));
    diagnostics.extend(check_predicate_types(schema));
    diagnostics.extend(check_redefinitions(schema.entities()));
    diagnostics.extend(check_misfiled(schema));
    diagnostics.extend(check_notices(schema.entities()));
    diagnostics.extend(check_notices(schema.predicates()));
    diagnostics.extend(check_unused(schema));
    diagnostics.extend(check_descriptions(schema.entities(), options, true));
    diagnostics.extend(check_descriptions(schema.predicates(), options, false));

    log::debug!("Schema check produced {} diagnostics", diagnostics.len());
    DiagnosticReport { diagnostics }
}

fn check_references(schema: &Schema) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for entity in schema.entities().iter() {
        for property in &entity.properties {
            if schema.predicate(property).is_none() {
                out.push(Diagnostic::new(
                    Category::DanglingReference,
                    entity.path_string(),
                    format!("'{}' has non-existent property '{property}'", entity.name),
                ));
            }
        }
        for relation in entity.relation_names() {
            if schema.predicate(relation).is_none() {
                out.push(Diagnostic::new(
                    Category::DanglingReference,
                    entity.path_string(),
                    format!("'{}' has non-existent relation '{relation}'", entity.name),
                ));
            }
        }
    }
    out
}

fn check_predicate_types(schema: &Schema) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for predicate in schema.predicates().iter() {
        match schema.predicate_type(&predicate.name) {
            Some(PredicateType::Unknown(t)) => out.push(Diagnostic::new(
                Category::UnknownPredicateType,
                predicate.path_string(),
                format!("'{}' expects non-existent type '{t}'", predicate.name),
            )),
            Some(PredicateType::Missing) => out.push(Diagnostic::new(
                Category::MissingPredicateType,
                predicate.path_string(),
                format!("'{}' has no type", predicate.name),
            )),
            _ => {}
        }
    }
    out
}

/// A field may be declared once along any root-to-leaf chain.
fn check_redefinitions(entities: &Hierarchy) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for entity in entities.iter() {
        let mut seen: HashSet<&str> = HashSet::new();
        for field in entity.own_fields() {
            if !seen.insert(field) {
                out.push(Diagnostic::new(
                    Category::Redefinition,
                    entity.path_string(),
                    format!("'{}' declares '{field}' more than once", entity.name),
                ));
                continue;
            }

            let nearest = ancestor_nodes(entity, entities)
                .rev()
                .find(|ancestor| ancestor.declares(field));
            if let Some(ancestor) = nearest {
                out.push(Diagnostic::new(
                    Category::Redefinition,
                    entity.path_string(),
                    format!(
                        "'{}' redefines '{field}' that is already in '{}'",
                        entity.name, ancestor.name
                    ),
                ));
            }
        }
    }
    out
}

/// Strict ancestors of `node`, root first, skipping any name that resolves elsewhere.
fn ancestor_nodes<'a>(
    node: &'a HierarchyNode,
    hierarchy: &'a Hierarchy,
) -> impl DoubleEndedIterator<Item = &'a HierarchyNode> {
    let ancestors = node.ancestors();
    ancestors.iter().enumerate().filter_map(move |(i, name)| {
        hierarchy
            .get(name)
            .filter(|n| n.path[..] == ancestors[..=i])
    })
}

fn check_misfiled(schema: &Schema) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for entity in schema.entities().iter() {
        for property in &entity.properties {
            if let Some(ty) = schema.predicate_type(property).filter(|t| t.is_relation()) {
                out.push(Diagnostic::new(
                    Category::MisfiledField,
                    entity.path_string(),
                    format!(
                        "'{}' lists '{property}' as a property, but its type '{}' makes it a relation",
                        entity.name,
                        ty.type_name().unwrap_or_default()
                    ),
                ));
            }
        }
        for relation in entity.relation_names() {
            if let Some(ty) = schema.predicate_type(relation).filter(|t| t.is_primitive()) {
                out.push(Diagnostic::new(
                    Category::MisfiledField,
                    entity.path_string(),
                    format!(
                        "'{}' lists '{relation}' as a relation, but its type '{}' makes it a property",
                        entity.name,
                        ty.type_name().unwrap_or_default()
                    ),
                ));
            }
        }
    }
    out
}

fn check_notices(hierarchy: &Hierarchy) -> Vec<Diagnostic> {
    hierarchy
        .notices
        .iter()
        .map(|notice| {
            let category = match notice.kind {
                NoticeKind::FileNameMismatch => Category::FileNameMismatch,
                NoticeKind::DuplicateName => Category::DuplicateName,
            };
            Diagnostic::new(category, notice.path.clone(), notice.message.clone())
        })
        .collect()
}

fn check_unused(schema: &Schema) -> Vec<Diagnostic> {
    let used_properties: HashSet<&str> = schema
        .entities()
        .iter()
        .flat_map(|e| e.properties.iter().map(String::as_str))
        .collect();
    let used_relations: HashSet<&str> = schema
        .entities()
        .iter()
        .flat_map(|e| e.relation_names())
        .collect();

    let mut out = Vec::new();
    for predicate in schema.predicates().iter() {
        let name = predicate.name.as_str();
        match schema.predicate_type(name) {
            Some(t) if t.is_primitive() && !used_properties.contains(name) => {
                out.push(Diagnostic::new(
                    Category::UnusedPredicate,
                    predicate.path_string(),
                    format!("property '{name}' is not used by any entity"),
                ));
            }
            Some(t) if t.is_relation() && !used_relations.contains(name) => {
                out.push(Diagnostic::new(
                    Category::UnusedPredicate,
                    predicate.path_string(),
                    format!("edge '{name}' is not used by any entity relation"),
                ));
            }
            _ => {}
        }
    }
    out
}

/// The entity root is a real entity and is checked; the predicate root only
/// groups the predicates below it, so `include_root` is false there.
fn check_descriptions(
    hierarchy: &Hierarchy,
    options: &CheckOptions,
    include_root: bool,
) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for node in hierarchy.iter().filter(|n| include_root || !n.is_root()) {
        let description = node.description.as_deref().map(str::trim).unwrap_or("");
        if description.is_empty() {
            out.push(Diagnostic::new(
                Category::MissingDescription,
                node.path_string(),
                format!("'{}' has no description", node.name),
            ));
            continue;
        }

        let lowered = description.to_lowercase();
        if let Some(marker) = options
            .placeholder_markers
            .iter()
            .find(|m| contains_word(&lowered, &m.to_lowercase()))
        {
            out.push(Diagnostic::new(
                Category::MissingDescription,
                node.path_string(),
                format!("'{}' has a placeholder description ('{marker}')", node.name),
            ));
        }
    }
    out
}

/// `needle` occurs in `haystack` with no alphanumeric character on either side.
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
