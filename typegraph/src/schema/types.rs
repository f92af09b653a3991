use crate::hierarchy::{Hierarchy, HierarchyNode, RelationFlags};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The sentinel type of a predicate that may point at anything.
pub const ANY_TYPE: &str = "any";

/// Scalar types a property can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    Bool,
    Int,
    Float,
    String,
    Datetime,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 5] = [
        PrimitiveType::Bool,
        PrimitiveType::Int,
        PrimitiveType::Float,
        PrimitiveType::String,
        PrimitiveType::Datetime,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Int => "int",
            PrimitiveType::Float => "float",
            PrimitiveType::String => "string",
            PrimitiveType::Datetime => "datetime",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a predicate's declared type resolves to against the entity hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "type", rename_all = "snake_case")]
pub enum PredicateType {
    Primitive(PrimitiveType),
    Entity(String),
    Any,
    /// No declared type, but child predicates refine it. The hierarchy root
    /// is always at least deferred.
    Deferred,
    /// No declared type and no children.
    Missing,
    /// Declared type is neither primitive, `any`, nor an entity.
    Unknown(String),
}

impl PredicateType {
    pub fn classify(predicate: &HierarchyNode, entities: &Hierarchy) -> Self {
        match predicate.declared_type.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => {
                if let Some(primitive) = PrimitiveType::parse(t) {
                    PredicateType::Primitive(primitive)
                } else if t == ANY_TYPE {
                    PredicateType::Any
                } else if entities.contains(t) {
                    PredicateType::Entity(t.to_string())
                } else {
                    PredicateType::Unknown(t.to_string())
                }
            }
            _ if predicate.is_root() || !predicate.children.is_empty() => PredicateType::Deferred,
            _ => PredicateType::Missing,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, PredicateType::Primitive(_))
    }

    /// Entity-typed or `any`: stored as a graph edge.
    pub fn is_relation(&self) -> bool {
        matches!(self, PredicateType::Entity(_) | PredicateType::Any)
    }

    /// The type name as written in the source tree, if any.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            PredicateType::Primitive(p) => Some(p.as_str()),
            PredicateType::Entity(name) | PredicateType::Unknown(name) => Some(name),
            PredicateType::Any => Some(ANY_TYPE),
            PredicateType::Deferred | PredicateType::Missing => None,
        }
    }

    /// The field kind this predicate gives an entity field, when it resolves.
    pub fn kind(&self, flags: RelationFlags) -> Option<PredicateKind> {
        match self {
            PredicateType::Primitive(p) => Some(PredicateKind::Primitive(*p)),
            PredicateType::Entity(entity) => Some(PredicateKind::EntityRef {
                entity: entity.clone(),
                flags,
            }),
            PredicateType::Any => Some(PredicateKind::Any),
            _ => None,
        }
    }
}

/// The resolved kind of a field on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateKind {
    Primitive(PrimitiveType),
    EntityRef {
        entity: String,
        flags: RelationFlags,
    },
    Any,
}

/// Which list a field was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOrigin {
    Property,
    Relation,
}

/// A field of an entity after inheritance has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedField {
    pub name: String,
    /// The entity (the owner itself or one of its ancestors) that declares it.
    pub declared_on: String,
    pub origin: FieldOrigin,
    pub flags: RelationFlags,
    /// `None` when the predicate is missing or its type does not resolve.
    pub kind: Option<PredicateKind>,
}

impl ResolvedField {
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, Some(PredicateKind::Primitive(_)))
    }

    pub fn primitive(&self) -> Option<PrimitiveType> {
        match self.kind {
            Some(PredicateKind::Primitive(p)) => Some(p),
            _ => None,
        }
    }

    pub fn is_inherited_by(&self, entity: &str) -> bool {
        self.declared_on != entity
    }
}
