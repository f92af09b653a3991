//! Directory-encoded hierarchies.
//!
//! Each directory below a hierarchy root is one node. A node's data lives
//! either in flat attribute files (`description.md`, `properties.txt`,
//! `expectedTypes.txt`) or in a single JSON file named after the directory.

pub mod loader;
pub mod types;

pub use loader::{load_hierarchy, parse_properties};
pub use types::{
    Hierarchy, HierarchyNode, LoadNotice, NoticeKind, RelationDecl, RelationFlags,
};
