use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Metadata attached to a relation declared on an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationFlags {
    /// Targets are ordered.
    #[serde(default)]
    pub sequenced: bool,
    /// At most one target.
    #[serde(default)]
    pub singular: bool,
}

/// A relation declared directly on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDecl {
    pub name: String,
    pub flags: RelationFlags,
}

impl RelationDecl {
    pub fn new(name: impl Into<String>, flags: RelationFlags) -> Self {
        RelationDecl {
            name: name.into(),
            flags,
        }
    }
}

/// One directory of a hierarchy tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyNode {
    pub name: String,
    /// Ancestry segments from the hierarchy root (the label) to this node, inclusive.
    #[serde(serialize_with = "serialize_path")]
    pub path: Vec<String>,
    #[serde(skip)]
    pub dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub properties: Vec<String>,
    #[serde(serialize_with = "serialize_relations")]
    pub relations: Vec<RelationDecl>,
    pub children: Vec<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<String>,
    /// Keys from a node's JSON file that have no dedicated field.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl HierarchyNode {
    pub fn new(path: Vec<String>, dir: PathBuf) -> Self {
        let name = path.last().cloned().unwrap_or_default();
        let parent = path.len().checked_sub(2).map(|i| path[i].clone());
        HierarchyNode {
            name,
            path,
            dir,
            parent,
            description: None,
            properties: Vec::new(),
            relations: Vec::new(),
            children: Vec::new(),
            declared_type: None,
            background_color: None,
            foreground_color: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Slash-joined path, e.g. `Item/Person`.
    pub fn path_string(&self) -> String {
        self.path.join("/")
    }

    /// Directory of this node relative to the hierarchy root.
    /// Empty for the root itself.
    pub fn relative_dir(&self) -> String {
        self.path[1..].join("/")
    }

    /// Names of strict ancestors, root first.
    pub fn ancestors(&self) -> &[String] {
        &self.path[..self.path.len().saturating_sub(1)]
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn relation(&self, name: &str) -> Option<&RelationDecl> {
        self.relations.iter().find(|r| r.name == name)
    }

    pub fn relation_names(&self) -> impl Iterator<Item = &str> {
        self.relations.iter().map(|r| r.name.as_str())
    }

    /// Properties followed by relation names, as declared on this node.
    pub fn own_fields(&self) -> Vec<&str> {
        self.properties
            .iter()
            .map(String::as_str)
            .chain(self.relation_names())
            .collect()
    }

    pub fn declares(&self, field: &str) -> bool {
        self.properties.iter().any(|p| p == field) || self.relation(field).is_some()
    }
}

/// A non-fatal finding recorded while walking the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadNotice {
    pub kind: NoticeKind,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    FileNameMismatch,
    DuplicateName,
}

/// A loaded hierarchy: node name -> node. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct Hierarchy {
    pub label: String,
    pub root: PathBuf,
    pub nodes: BTreeMap<String, HierarchyNode>,
    pub notices: Vec<LoadNotice>,
}

impl Hierarchy {
    pub fn get(&self, name: &str) -> Option<&HierarchyNode> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn root_node(&self) -> Option<&HierarchyNode> {
        self.nodes.get(&self.label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.nodes.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn serialize_path<S: Serializer>(path: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.join("/"))
}

fn serialize_relations<S: Serializer>(
    relations: &[RelationDecl],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(relations.len()))?;
    for relation in relations {
        map.serialize_entry(&relation.name, &relation.flags)?;
    }
    map.end()
}

/// Deserialize a `{ name: { sequenced, singular } }` object, keeping key order.
pub(crate) fn deserialize_relations<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<RelationDecl>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct RelationsVisitor;

    impl<'de> Visitor<'de> for RelationsVisitor {
        type Value = Option<Vec<RelationDecl>>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of relation name to {sequenced, singular}")
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut relations = Vec::new();
            while let Some((name, flags)) = access.next_entry::<String, Option<RelationFlags>>()? {
                relations.push(RelationDecl::new(name, flags.unwrap_or_default()));
            }
            Ok(Some(relations))
        }
    }

    deserializer.deserialize_any(RelationsVisitor)
}

/// The JSON encoding of a node: `<dir>/<dir>.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NodeFile {
    pub description: Option<String>,
    pub properties: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_relations")]
    pub relations: Option<Vec<RelationDecl>>,
    #[serde(rename = "type", alias = "expectedTypes")]
    pub declared_type: Option<String>,
    pub background_color: Option<String>,
    pub foreground_color: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl NodeFile {
    /// Key-by-key merge; keys absent from the file leave the node untouched.
    pub fn merge_into(self, node: &mut HierarchyNode) {
        if let Some(description) = self.description {
            node.description = Some(description.trim().to_string());
        }
        if let Some(properties) = self.properties {
            node.properties = properties;
        }
        if let Some(relations) = self.relations {
            node.relations = relations;
        }
        if let Some(declared_type) = self.declared_type {
            node.declared_type = Some(declared_type.trim().to_string());
        }
        if let Some(color) = self.background_color {
            node.background_color = Some(color);
        }
        if let Some(color) = self.foreground_color {
            node.foreground_color = Some(color);
        }
        node.attributes.extend(self.extra);
    }
}
