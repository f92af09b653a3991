use crate::error::{Result, TypeGraphError};
use serde::Serialize;

/// One step of an ancestry: a node name and the path up to and including it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AncestryEntry {
    pub name: String,
    pub path: String,
}

/// Root-to-leaf ancestry of a node, the root included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ancestry {
    entries: Vec<AncestryEntry>,
}

impl Ancestry {
    pub fn entries(&self) -> &[AncestryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &AncestryEntry> {
        self.entries.iter()
    }

    /// Ancestor names, root first, ending with the node itself.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Cumulative path for `name`, if it is part of this ancestry.
    pub fn path_of(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.path.as_str())
    }

    pub fn last(&self) -> Option<&AncestryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Ancestry {
    type Item = &'a AncestryEntry;
    type IntoIter = std::slice::Iter<'a, AncestryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Build the ancestry of the node at `segments` (root first).
///
/// Every prefix of the path yields one entry, so index 0 is the hierarchy root.
pub fn ancestry<S: AsRef<str>>(segments: &[S]) -> Result<Ancestry> {
    if segments.is_empty() || segments.iter().any(|s| s.as_ref().is_empty()) {
        let joined: Vec<&str> = segments.iter().map(AsRef::as_ref).collect();
        return Err(TypeGraphError::InvalidPath(joined.join("/")));
    }

    let mut entries = Vec::with_capacity(segments.len());
    let mut path = String::new();
    for segment in segments {
        let segment = segment.as_ref();
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(segment);
        entries.push(AncestryEntry {
            name: segment.to_string(),
            path: path.clone(),
        });
    }

    Ok(Ancestry { entries })
}

/// Build the ancestry of a slash-joined path such as `Item/Person/Student`.
pub fn ancestry_of(path: &str) -> Result<Ancestry> {
    let segments: Vec<&str> = path.split('/').collect();
    ancestry(&segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ancestry_root_to_leaf() {
        let a = ancestry_of("Item/Person/Student").unwrap();
        let pairs: Vec<_> = a.iter().map(|e| (e.name.as_str(), e.path.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                ("Item", "Item"),
                ("Person", "Item/Person"),
                ("Student", "Item/Person/Student"),
            ]
        );
        assert_eq!(a.last().unwrap().path, "Item/Person/Student");
        assert_eq!(a.path_of("Person"), Some("Item/Person"));
    }

    #[test]
    fn test_ancestry_of_root() {
        let a = ancestry(&["Item"]).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a.last().unwrap().path, "Item");
    }

    #[test]
    fn test_last_entry_matches_input_for_many_paths() {
        for path in ["a", "a/b", "a/b/c/d/e", "Item/Edge"] {
            let a = ancestry_of(path).unwrap();
            assert_eq!(a.last().unwrap().path, path);
            assert_eq!(a.names().collect::<Vec<_>>().join("/"), path);
        }
    }

    #[test]
    fn test_empty_segments_rejected() {
        assert!(matches!(ancestry_of(""), Err(TypeGraphError::InvalidPath(_))));
        assert!(matches!(ancestry_of("Item//Person"), Err(TypeGraphError::InvalidPath(_))));
        assert!(matches!(ancestry_of("/Item"), Err(TypeGraphError::InvalidPath(_))));
        let empty: [&str; 0] = [];
        assert!(matches!(ancestry(&empty), Err(TypeGraphError::InvalidPath(_))));
    }
}
