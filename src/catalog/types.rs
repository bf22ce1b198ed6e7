use crate::catalog::names;

/// A single column as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Opaque type description (e.g. `INTEGER`, `TEXT`).
    pub type_hint: String,
    /// Opaque default expression, if declared.
    pub default: Option<String>,
    /// Column comment, if any.
    pub comment: Option<String>,
}

/// A named unique constraint over an ordered column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConstraint {
    /// Constraint name (synthesized when the DDL leaves it anonymous).
    pub name: String,
    /// Constrained columns, in declaration order.
    pub columns: Vec<String>,
}

/// Introspected table metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Name as reported by the catalog; may carry a schema prefix or
    /// non-identifier characters.
    pub raw_name: String,
    /// Identifier-safe name used for all name generation.
    pub sanitized_name: String,
    /// Schema qualifier, when the catalog reports one.
    pub schema: Option<String>,
    /// Columns in catalog order.
    pub columns: Vec<Column>,
    /// Primary-key column names, in key order. Empty when keyless.
    pub primary_key: Vec<String>,
    /// Unique constraints in declaration order.
    pub unique_constraints: Vec<UniqueConstraint>,
    /// Table comment, if any.
    pub comment: Option<String>,
}

impl Table {
    /// Build a table record, sanitizing the raw name.
    pub fn new(raw_name: impl Into<String>, quoted: bool) -> Self {
        let raw_name = raw_name.into();
        let sanitized_name = names::sanitize(&raw_name, quoted);
        Self {
            raw_name,
            sanitized_name,
            schema: None,
            columns: Vec::new(),
            primary_key: Vec::new(),
            unique_constraints: Vec::new(),
            comment: None,
        }
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// True when `columns` is exactly the primary key or exactly the column
    /// list of one of the unique constraints (ordered comparison).
    pub fn columns_are_unique(&self, columns: &[String]) -> bool {
        if !self.primary_key.is_empty() && self.primary_key == columns {
            return true;
        }
        self.unique_constraints
            .iter()
            .any(|uc| uc.columns == columns)
    }
}

/// A foreign-key edge between two tables.
///
/// The pairing is positional: `local_columns[i]` references
/// `remote_columns[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Declaring table (sanitized name).
    pub local_table: String,
    /// Referencing columns, in declaration order.
    pub local_columns: Vec<String>,
    /// Referenced table (sanitized name).
    pub remote_table: String,
    /// Referenced columns, in declaration order.
    pub remote_columns: Vec<String>,
}

impl ForeignKey {
    /// Ordered `(local, remote)` column pairs.
    pub fn column_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.local_columns
            .iter()
            .zip(&self.remote_columns)
            .map(|(l, r)| (l.as_str(), r.as_str()))
    }
}
