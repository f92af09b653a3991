use crate::error::{Result, TypeGraphError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::types::{
    Hierarchy, HierarchyNode, LoadNotice, NodeFile, NoticeKind, RelationDecl, RelationFlags,
};

pub const DESCRIPTION_FILE: &str = "description.md";
pub const PROPERTIES_FILE: &str = "properties.txt";
pub const EXPECTED_TYPES_FILE: &str = "expectedTypes.txt";

const SEQUENCED_PREFIX: &str = "sequenced_";
const SINGULAR_PREFIX: &str = "one_";

/// Nodes and notices contributed by one directory and everything below it.
struct Subtree {
    nodes: Vec<HierarchyNode>,
    notices: Vec<LoadNotice>,
}

/// Recursively read the directory tree at `root` into a hierarchy.
///
/// The root directory becomes a node named `label`; every other node is named
/// after its directory. Fails on a missing root, an unreadable directory or
/// file, or a malformed JSON node file.
pub fn load_hierarchy(root: &Path, label: &str) -> Result<Hierarchy> {
    if !root.is_dir() {
        return Err(TypeGraphError::RootNotFound(root.to_path_buf()));
    }

    let subtree = load_subtree(root, vec![label.to_string()])?;
    let mut notices = subtree.notices;
    let mut nodes: BTreeMap<String, HierarchyNode> = BTreeMap::new();

    // Nodes arrive in pre-order, so a dropped duplicate's descendants follow it.
    let mut shadowed: Option<(usize, Vec<String>)> = None;
    for node in subtree.nodes {
        if let Some((dropped, path)) = &mut shadowed {
            if node.path.starts_with(path) {
                *dropped += 1;
                continue;
            }
        }
        if let Some((dropped, path)) = shadowed.take() {
            report_shadowed(&mut notices, &nodes, &path, dropped);
        }

        if nodes.contains_key(&node.name) {
            if let Some(parent) = node.parent.as_ref().and_then(|p| nodes.get_mut(p)) {
                parent.children.retain(|c| c != &node.name);
            }
            shadowed = Some((0, node.path));
            continue;
        }
        nodes.insert(node.name.clone(), node);
    }
    if let Some((dropped, path)) = shadowed {
        report_shadowed(&mut notices, &nodes, &path, dropped);
    }

    log::debug!("Loaded {} nodes for '{}' from {}", nodes.len(), label, root.display());

    Ok(Hierarchy {
        label: label.to_string(),
        root: root.to_path_buf(),
        nodes,
        notices,
    })
}

/// Record a duplicate that was dropped together with `descendants` nodes below it.
fn report_shadowed(
    notices: &mut Vec<LoadNotice>,
    nodes: &BTreeMap<String, HierarchyNode>,
    path: &[String],
    descendants: usize,
) {
    let name = path.last().map(String::as_str).unwrap_or_default();
    let kept = nodes
        .get(name)
        .map(HierarchyNode::path_string)
        .unwrap_or_default();
    let mut message = format!(
        "'{name}' at {} duplicates the node at {kept}; keeping the first",
        path.join("/")
    );
    if descendants > 0 {
        message.push_str(&format!(" and skipping {descendants} nodes below it"));
    }
    log::warn!("{message}");
    notices.push(LoadNotice {
        kind: NoticeKind::DuplicateName,
        path: path.join("/"),
        message,
    });
}

fn load_subtree(dir: &Path, path: Vec<String>) -> Result<Subtree> {
    let (subdirs, files) = read_dir_sorted(dir)?;

    let mut node = HierarchyNode::new(path, dir.to_path_buf());
    let mut notices = Vec::new();
    log::debug!("Reading node {} from {}", node.path_string(), dir.display());

    // Text encoding first so a JSON node file wins key by key.
    for file in &files {
        match file_name(file).as_str() {
            DESCRIPTION_FILE => {
                node.description = Some(read_file(file)?.trim().to_string());
            }
            PROPERTIES_FILE => {
                let (properties, relations) = parse_properties(&read_file(file)?);
                node.properties = properties;
                node.relations = relations;
            }
            EXPECTED_TYPES_FILE => {
                let content = read_file(file)?;
                let mut types = non_blank_lines(&content);
                node.declared_type = types.next().map(str::to_string);
                if types.next().is_some() {
                    log::warn!(
                        "{} lists more than one type; only the first is used",
                        file.display()
                    );
                }
            }
            _ => {}
        }
    }

    for file in files
        .iter()
        .filter(|f| f.extension().is_some_and(|ext| ext == "json"))
    {
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        if !json_stem_matches(&stem, &node, dir) {
            let message = format!(
                "JSON file '{}' does not match directory name '{}'",
                file_name(file),
                node.name
            );
            log::warn!("{}: {message}", node.path_string());
            notices.push(LoadNotice {
                kind: NoticeKind::FileNameMismatch,
                path: node.path_string(),
                message,
            });
        }

        let content = read_file(file)?;
        let parsed: NodeFile =
            serde_json::from_str(&content).map_err(|source| TypeGraphError::Parse {
                path: file.clone(),
                source,
            })?;
        parsed.merge_into(&mut node);
    }

    let mut descendants = Vec::new();
    for subdir in &subdirs {
        let child = file_name(subdir);
        node.children.push(child.clone());

        let mut child_path = node.path.clone();
        child_path.push(child);
        let subtree = load_subtree(subdir, child_path)?;
        descendants.extend(subtree.nodes);
        notices.extend(subtree.notices);
    }

    let mut nodes = Vec::with_capacity(descendants.len() + 1);
    nodes.push(node);
    nodes.extend(descendants);
    Ok(Subtree { nodes, notices })
}

/// The root's JSON file may be named after the label or the real directory.
fn json_stem_matches(stem: &str, node: &HierarchyNode, dir: &Path) -> bool {
    stem == node.name || (node.is_root() && dir.file_name().is_some_and(|d| d == stem))
}

/// Split a `properties.txt` body into plain properties and prefixed relations.
///
/// `sequenced_` then `one_` prefixes mark an entry as a relation.
pub fn parse_properties(content: &str) -> (Vec<String>, Vec<RelationDecl>) {
    let mut properties = Vec::new();
    let mut relations = Vec::new();

    for line in non_blank_lines(content) {
        let mut name = line;
        let mut flags = RelationFlags::default();
        let mut is_relation = false;

        if let Some(rest) = name.strip_prefix(SEQUENCED_PREFIX) {
            flags.sequenced = true;
            is_relation = true;
            name = rest;
        }
        if let Some(rest) = name.strip_prefix(SINGULAR_PREFIX) {
            flags.singular = true;
            is_relation = true;
            name = rest;
        }

        if is_relation {
            relations.push(RelationDecl::new(name, flags));
        } else {
            properties.push(name.to_string());
        }
    }

    (properties, relations)
}

fn non_blank_lines(content: &str) -> impl Iterator<Item = &str> {
    content.lines().map(str::trim).filter(|l| !l.is_empty())
}

fn read_dir_sorted(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut subdirs = Vec::new();
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir).map_err(|e| TypeGraphError::read(dir, e))? {
        let entry = entry.map_err(|e| TypeGraphError::read(dir, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| TypeGraphError::read(entry.path(), e))?;
        if file_type.is_dir() {
            subdirs.push(entry.path());
        } else {
            files.push(entry.path());
        }
    }

    subdirs.sort();
    files.sort();
    Ok((subdirs, files))
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| TypeGraphError::read(path, e))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
