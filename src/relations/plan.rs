use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::types::{ForeignKey, Table};
use crate::error::Warning;

/// Accessor kind generated for one side of a foreign-key edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelMethod {
    /// Many-to-one accessor on the referencing side.
    BelongsTo,
    /// One-to-many accessor on the referenced side.
    HasMany,
    /// One-to-one accessor on the referenced side (FK is unique locally).
    MightHave,
}

impl RelMethod {
    /// Priority used when ordering duplicate sets for numeric suffixing.
    /// Higher keeps its name.
    pub fn priority(&self) -> u8 {
        match self {
            RelMethod::BelongsTo => 3,
            RelMethod::HasMany => 2,
            RelMethod::MightHave => 1,
        }
    }

    /// True when the accessor names a single row (singular inflection).
    pub fn is_singular(&self) -> bool {
        matches!(self, RelMethod::BelongsTo | RelMethod::MightHave)
    }
}

impl fmt::Display for RelMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelMethod::BelongsTo => write!(f, "belongs_to"),
            RelMethod::HasMany => write!(f, "has_many"),
            RelMethod::MightHave => write!(f, "might_have"),
        }
    }
}

/// Attribute values attached to a relationship (`on_delete`, `join_type`,
/// `cascade_copy`, ...). Free-form by design; the emitter interprets them.
pub type RelAttrs = BTreeMap<String, serde_json::Value>;

/// Where a relationship record came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    /// The foreign-key edge that produced this record.
    pub origin_fk: ForeignKey,
    /// Moniker of the FK's declaring table.
    pub local_moniker: String,
    /// Moniker of the FK's referenced table.
    pub remote_moniker: String,
}

/// One named, directed relationship on a source.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    /// Source this accessor lives on.
    pub owning_source: String,
    /// Accessor kind.
    pub method: RelMethod,
    /// Resolved accessor name, unique within the owning source.
    pub name: String,
    /// Source the accessor points at.
    pub target_source: String,
    /// Ordered `(owning column, target column)` pairs.
    pub column_map: Vec<(String, String)>,
    /// Emitter-facing attributes.
    pub attrs: RelAttrs,
    /// Originating edge and monikers.
    pub provenance: Provenance,
}

/// A monikerized view of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Class name assigned by the monikerizer.
    pub moniker: String,
    /// The underlying table record.
    pub table: Table,
}

/// The final assignment of relationships to sources.
///
/// Sources and relationship lists keep deterministic order: sources sort by
/// moniker, relationships keep catalog order of their originating foreign
/// keys. Non-fatal warnings ride along for the caller to inspect, the way
/// the diagnostics of a translation report would.
#[derive(Debug, Default)]
pub struct RelationshipPlan {
    /// Moniker → source record.
    pub sources: BTreeMap<String, Source>,
    /// Moniker → ordered relationship list.
    pub relationships: BTreeMap<String, Vec<Relationship>>,
    /// Accumulated non-fatal diagnostics.
    pub warnings: Vec<Warning>,
}

impl RelationshipPlan {
    /// Relationships owned by `moniker`, empty when none.
    pub fn relationships_of(&self, moniker: &str) -> &[Relationship] {
        self.relationships
            .get(moniker)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Find a relationship by owning source and name.
    pub fn find(&self, moniker: &str, name: &str) -> Option<&Relationship> {
        self.relationships_of(moniker)
            .iter()
            .find(|r| r.name == name)
    }

    /// Total number of relationship records in the plan.
    pub fn len(&self) -> usize {
        self.relationships.values().map(Vec::len).sum()
    }

    /// True when no relationships were inferred.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
