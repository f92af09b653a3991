//! typegraph code generation - renders a loaded [`Schema`] into artifacts.
//!
//! The main entry point is [`generate`], which runs one emitter over the
//! schema and returns the files it would write. [`write_files`] puts them
//! on disk.

mod explorer;
mod json_gen;
mod pod_gen;
mod predicate_gen;
mod python_gen;
mod struct_gen;
mod swift_gen;
pub mod type_utils;
mod typescript_gen;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use proc_macro2::TokenStream;
use typegraph::config::GeneratorConfig;
use typegraph::schema::{ResolvedField, Schema};
use typegraph::HierarchyNode;

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    /// Entity structs and predicate lookup functions.
    Rust,
    /// Flat `(item_type, property, property_type)` list.
    Json,
    /// Column types for the pod database.
    PodDb,
    /// Python classes for integrators.
    Python,
    /// Static HTML pages for browsing both hierarchies.
    Explorer,
    /// Swift classes and the `ItemFamily` enum for the iOS client.
    Swift,
    /// TypeScript classes and the `ItemFamily` enum for the browser client.
    TypeScript,
}

impl Target {
    pub const ALL: [Target; 7] = [
        Target::Rust,
        Target::Json,
        Target::PodDb,
        Target::Python,
        Target::Explorer,
        Target::Swift,
        Target::TypeScript,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Target::Rust => "rust",
            Target::Json => "json",
            Target::PodDb => "pod-db",
            Target::Python => "python",
            Target::Explorer => "explorer",
            Target::Swift => "swift",
            Target::TypeScript => "typescript",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Target::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Target::ALL.iter().map(|t| t.as_str()).collect();
                format!("unknown target '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// What the emitters leave out.
#[derive(Debug, Clone, Default)]
pub struct EmitOptions {
    pub exclude_entities: Vec<String>,
    pub exclude_fields: Vec<String>,
}

impl EmitOptions {
    pub fn from_config(config: &GeneratorConfig) -> Self {
        EmitOptions {
            exclude_entities: config.exclude_entities.clone(),
            exclude_fields: config.exclude_fields.clone(),
        }
    }

    pub fn includes_entity(&self, name: &str) -> bool {
        !self.exclude_entities.iter().any(|e| e == name)
    }

    pub fn includes_field(&self, name: &str) -> bool {
        !self.exclude_fields.iter().any(|f| f == name)
    }

    /// Included entities in name order.
    pub(crate) fn entities<'a>(
        &'a self,
        schema: &'a Schema,
    ) -> impl Iterator<Item = &'a HierarchyNode> + 'a {
        schema
            .entities()
            .iter()
            .filter(move |e| self.includes_entity(&e.name))
    }

    /// Included entities ordered parent first: by depth, then by name.
    pub(crate) fn entities_parent_first<'a>(&'a self, schema: &'a Schema) -> Vec<&'a HierarchyNode> {
        let mut entities: Vec<&HierarchyNode> = self.entities(schema).collect();
        entities.sort_by(|a, b| (a.path.len(), &a.name).cmp(&(b.path.len(), &b.name)));
        entities
    }

    /// Included resolved fields of `entity`, root ancestor first.
    pub(crate) fn fields<'a>(&self, schema: &'a Schema, entity: &str) -> Vec<&'a ResolvedField> {
        schema
            .resolved_fields(entity)
            .unwrap_or_default()
            .iter()
            .filter(|f| self.includes_field(&f.name))
            .collect()
    }

    /// The nearest included strict ancestor, which becomes the base class in
    /// class-based targets.
    pub(crate) fn base_entity<'a>(
        &self,
        schema: &'a Schema,
        entity: &HierarchyNode,
    ) -> Option<&'a HierarchyNode> {
        entity
            .ancestors()
            .iter()
            .rev()
            .filter(|name| self.includes_entity(name))
            .find_map(|name| schema.entity(name))
    }

    /// `entity` itself when included, else its nearest included ancestor.
    pub(crate) fn nearest_included<'a>(
        &self,
        schema: &'a Schema,
        entity: &str,
    ) -> Option<&'a HierarchyNode> {
        let node = schema.entity(entity)?;
        if self.includes_entity(&node.name) {
            Some(node)
        } else {
            self.base_entity(schema, node)
        }
    }

    /// Included fields of `entity` that its base class does not already carry.
    pub(crate) fn fields_beyond_base<'a>(
        &self,
        schema: &'a Schema,
        entity: &HierarchyNode,
    ) -> Vec<&'a ResolvedField> {
        let inherited: Vec<&str> = self
            .base_entity(schema, entity)
            .map(|base| {
                self.fields(schema, &base.name)
                    .into_iter()
                    .map(|f| f.name.as_str())
                    .collect()
            })
            .unwrap_or_default();
        self.fields(schema, &entity.name)
            .into_iter()
            .filter(|f| !inherited.contains(&f.name.as_str()))
            .collect()
    }
}

/// One output file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    pub(crate) fn new(path: impl Into<PathBuf>, contents: String) -> Self {
        GeneratedFile {
            path: path.into(),
            contents,
        }
    }
}

/// Run one emitter over `schema`.
///
/// # Example
///
/// ```no_run
/// use typegraph_codegen::{generate, write_files, EmitOptions, Target};
///
/// let config = typegraph::load_config("typegraph.yaml".as_ref()).unwrap();
/// let schema = typegraph::load_schema_from_config(&config).unwrap();
/// let files = generate(&schema, &EmitOptions::from_config(&config), Target::Rust).unwrap();
/// write_files(&config.output_dir, &files).unwrap();
/// ```
pub fn generate(
    schema: &Schema,
    options: &EmitOptions,
    target: Target,
) -> Result<Vec<GeneratedFile>, Box<dyn std::error::Error>> {
    log::debug!("Generating {target} output");
    let files = match target {
        Target::Rust => vec![GeneratedFile::new(
            "schema.rs",
            generate_rust(schema, options)?,
        )],
        Target::Json => vec![GeneratedFile::new(
            "schema.json",
            json_gen::generate_schema_json(schema, options)?,
        )],
        Target::PodDb => vec![GeneratedFile::new(
            "database_schema.json",
            pod_gen::generate_pod_schema(schema, options)?,
        )],
        Target::Python => vec![GeneratedFile::new(
            "schema.py",
            python_gen::generate_python(schema, options),
        )],
        Target::Explorer => explorer::generate_site(schema, options),
        Target::Swift => vec![GeneratedFile::new(
            "schema.swift",
            swift_gen::generate_swift(schema, options),
        )],
        Target::TypeScript => vec![GeneratedFile::new(
            "schema.ts",
            typescript_gen::generate_typescript(schema, options),
        )],
    };
    Ok(files)
}

/// Write `files` below `out_dir`, creating directories as needed.
pub fn write_files(
    out_dir: &Path,
    files: &[GeneratedFile],
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = out_dir.join(&file.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &file.contents)?;
        log::info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Rust source for the entity structs and predicate lookups.
pub fn generate_rust(
    schema: &Schema,
    options: &EmitOptions,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut tokens = TokenStream::new();
    tokens.extend(quote::quote! {
        use std::collections::HashMap;
    });
    tokens.extend(struct_gen::generate_structs(schema, options));
    tokens.extend(predicate_gen::generate_lookups(schema, options));

    let formatted = format_token_stream(tokens)?;
    Ok(format!(
        "// Generated by typegraph from the entity and predicate hierarchies. Do not edit.\n\n{formatted}"
    ))
}

fn format_token_stream(tokens: TokenStream) -> Result<String, syn::Error> {
    let file: syn::File = syn::parse2(tokens)?;
    Ok(prettyplease::unparse(&file))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;
    use tempfile::TempDir;
    use typegraph::schema::{load_schema, Schema};

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    /// Item > Person > Student, Item > Place, with primitive and edge predicates.
    pub fn sample_schema() -> (TempDir, Schema) {
        let tmp = TempDir::new().unwrap();
        let e = tmp.path().join("entities");
        let p = tmp.path().join("predicates");

        write(
            &e,
            "Item.json",
            r#"{"description": "Anything.", "properties": ["uid", "dateCreated"], "relations": {"label": {}}}"#,
        );
        write(
            &e,
            "Person/Person.json",
            r##"{"description": "A human being.", "properties": ["name", "type"],
                "relations": {"friend": {}, "spouse": {"singular": true}},
                "backgroundColor": "#3a6ea5"}"##,
        );
        write(
            &e,
            "Person/Student/Student.json",
            r#"{"description": "Someone <enrolled> & studying.", "properties": ["school"]}"#,
        );
        write(
            &e,
            "Place/Place.json",
            r#"{"description": "A location.", "properties": ["latitude", "hidden"]}"#,
        );

        write(&p, "EdgeOrProperty.json", r#"{"description": "Any predicate."}"#);
        write(&p, "uid/uid.json", r#"{"description": "Unique id.", "type": "int"}"#);
        write(
            &p,
            "dateCreated/dateCreated.json",
            r#"{"description": "Creation time.", "type": "datetime"}"#,
        );
        write(&p, "label/label.json", r#"{"description": "A tag.", "type": "any"}"#);
        write(&p, "name/name.json", r#"{"description": "Full name.", "type": "string"}"#);
        write(&p, "type/type.json", r#"{"description": "Kind.", "type": "string"}"#);
        write(&p, "friend/friend.json", r#"{"description": "A friend.", "type": "Person"}"#);
        write(&p, "spouse/spouse.json", r#"{"description": "Married to.", "type": "Person"}"#);
        write(&p, "school/school.json", r#"{"description": "School name.", "type": "string"}"#);
        write(&p, "latitude/latitude.json", r#"{"description": "Lat.", "type": "float"}"#);
        write(&p, "hidden/hidden.json", r#"{"description": "Hidden.", "type": "bool"}"#);

        let schema = load_schema(&e, "Item", &p, "EdgeOrProperty").unwrap();
        (tmp, schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_schema;
    use tempfile::TempDir;

    #[test]
    fn test_target_round_trips_through_str() {
        for target in Target::ALL {
            assert_eq!(target.as_str().parse::<Target>().unwrap(), target);
        }
        assert!("cobol".parse::<Target>().is_err());
        assert_eq!("typescript".parse::<Target>().unwrap(), Target::TypeScript);
    }

    #[test]
    fn test_generate_rust_is_valid() {
        let (_tmp, schema) = sample_schema();
        let code = generate_rust(&schema, &EmitOptions::default()).unwrap();

        assert!(
            syn::parse_file(&code).is_ok(),
            "Generated code is not valid Rust:\n{}",
            &code[..code.len().min(2000)]
        );
        assert!(code.contains("pub struct Person"), "Missing Person struct");
        assert!(code.contains("pub struct Student"), "Missing Student struct");
        assert!(code.contains("pub fn edge_predicates"), "Missing edge lookup");
        assert!(code.contains("pub fn all_types"), "Missing type table");
    }

    #[test]
    fn test_every_target_produces_files() {
        let (_tmp, schema) = sample_schema();
        let options = EmitOptions::default();
        for target in Target::ALL {
            let files = generate(&schema, &options, target).unwrap();
            assert!(!files.is_empty(), "{target} produced nothing");
            assert!(files.iter().all(|f| !f.contents.is_empty()));
        }
    }

    #[test]
    fn test_excluded_entities_and_fields_skipped_everywhere() {
        let (_tmp, schema) = sample_schema();
        let options = EmitOptions {
            exclude_entities: vec!["Place".into()],
            exclude_fields: vec!["dateCreated".into()],
        };
        for target in Target::ALL {
            for file in generate(&schema, &options, target).unwrap() {
                assert!(
                    !file.contents.contains("Place") && !file.path.ends_with("Place.html"),
                    "{target}: Place leaked into {}",
                    file.path.display()
                );
                assert!(
                    !file.contents.contains("dateCreated")
                        && !file.contents.contains("date_created"),
                    "{target}: dateCreated leaked into {}",
                    file.path.display()
                );
            }
        }
    }

    #[test]
    fn test_fields_beyond_base_skip_inherited() {
        let (_tmp, schema) = sample_schema();
        let options = EmitOptions::default();
        let student = schema.entity("Student").unwrap();
        let names: Vec<_> = options
            .fields_beyond_base(&schema, student)
            .into_iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["school"]);

        let skip_person = EmitOptions {
            exclude_entities: vec!["Person".into()],
            ..EmitOptions::default()
        };
        assert_eq!(skip_person.base_entity(&schema, student).unwrap().name, "Item");
        assert_eq!(skip_person.nearest_included(&schema, "Person").unwrap().name, "Item");
    }

    #[test]
    fn test_write_files_creates_directories() {
        let (_tmp, schema) = sample_schema();
        let out = TempDir::new().unwrap();
        let files = generate(&schema, &EmitOptions::default(), Target::Explorer).unwrap();

        let written = write_files(out.path(), &files).unwrap();
        assert_eq!(written.len(), files.len());
        assert!(out.path().join("index.html").exists());
        assert!(out.path().join("entities/Person.html").exists());
    }
}
