use crate::ancestry::ancestry;
use crate::error::Result;
use crate::hierarchy::{Hierarchy, HierarchyNode, RelationFlags};
use crate::validation::{self, CheckOptions, DiagnosticReport};
use std::collections::{BTreeMap, HashSet};

use super::types::{FieldOrigin, PredicateType, ResolvedField};

/// The validated view over an entity hierarchy and a predicate hierarchy.
///
/// Built once, then read-only. Resolved field sets and predicate types are
/// computed at construction.
#[derive(Debug, Clone)]
pub struct Schema {
    entities: Hierarchy,
    predicates: Hierarchy,
    predicate_types: BTreeMap<String, PredicateType>,
    resolved: BTreeMap<String, Vec<ResolvedField>>,
}

impl Schema {
    /// Cross-link two independently loaded hierarchies.
    pub fn build(entities: Hierarchy, predicates: Hierarchy) -> Result<Self> {
        let predicate_types: BTreeMap<String, PredicateType> = predicates
            .iter()
            .map(|p| (p.name.clone(), PredicateType::classify(p, &entities)))
            .collect();

        let mut resolved = BTreeMap::new();
        for entity in entities.iter() {
            let fields = resolve_fields(entity, &entities, &predicate_types)?;
            resolved.insert(entity.name.clone(), fields);
        }

        Ok(Schema {
            entities,
            predicates,
            predicate_types,
            resolved,
        })
    }

    pub fn entities(&self) -> &Hierarchy {
        &self.entities
    }

    pub fn predicates(&self) -> &Hierarchy {
        &self.predicates
    }

    pub fn entity(&self, name: &str) -> Option<&HierarchyNode> {
        self.entities.get(name)
    }

    pub fn predicate(&self, name: &str) -> Option<&HierarchyNode> {
        self.predicates.get(name)
    }

    pub fn predicate_type(&self, name: &str) -> Option<&PredicateType> {
        self.predicate_types.get(name)
    }

    /// Own and inherited fields of `entity`, root ancestor first.
    pub fn resolved_fields(&self, entity: &str) -> Option<&[ResolvedField]> {
        self.resolved.get(entity).map(Vec::as_slice)
    }

    pub fn resolved_field_names(&self, entity: &str) -> Option<Vec<&str>> {
        self.resolved
            .get(entity)
            .map(|fields| fields.iter().map(|f| f.name.as_str()).collect())
    }

    /// Entity names in sorted order.
    pub fn entity_names_sorted(&self) -> impl Iterator<Item = &str> {
        self.entities.names()
    }

    /// The node from either hierarchy whose path is `path`.
    pub fn node_by_path(&self, path: &str) -> Option<&HierarchyNode> {
        let name = path.rsplit('/').next()?;
        self.entities
            .get(name)
            .into_iter()
            .chain(self.predicates.get(name))
            .find(|n| n.path_string() == path)
    }

    /// Entities that declare `predicate` directly, as a property or relation.
    pub fn entities_declaring(&self, predicate: &str) -> Vec<&str> {
        self.entities
            .iter()
            .filter(|e| e.declares(predicate))
            .map(|e| e.name.as_str())
            .collect()
    }

    /// Run every integrity check with default options.
    pub fn diagnostics(&self) -> DiagnosticReport {
        validation::check(self, &CheckOptions::default())
    }
}

fn resolve_fields(
    entity: &HierarchyNode,
    entities: &Hierarchy,
    predicate_types: &BTreeMap<String, PredicateType>,
) -> Result<Vec<ResolvedField>> {
    let mut fields = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for entry in ancestry(&entity.path)?.iter() {
        // A name shadowed by a duplicate elsewhere in the tree is not this ancestor.
        let Some(ancestor) = entities
            .get(&entry.name)
            .filter(|a| a.path_string() == entry.path)
        else {
            log::debug!("{}: ancestor {} not loaded", entity.path_string(), entry.path);
            continue;
        };

        let declared = ancestor
            .properties
            .iter()
            .map(|p| (p.as_str(), FieldOrigin::Property, RelationFlags::default()))
            .chain(
                ancestor
                    .relations
                    .iter()
                    .map(|r| (r.name.as_str(), FieldOrigin::Relation, r.flags)),
            );

        for (name, origin, flags) in declared {
            if !seen.insert(name) {
                continue;
            }
            let kind = predicate_types.get(name).and_then(|t| t.kind(flags));
            fields.push(ResolvedField {
                name: name.to_string(),
                declared_on: ancestor.name.clone(),
                origin,
                flags,
                kind,
            });
        }
    }

    Ok(fields)
}
