use std::path::PathBuf;

use crate::catalog::types::{ForeignKey, Table};
use crate::error::Error;

/// The narrow interface the core consumes from a database (or a pre-captured
/// catalog).
///
/// The adapter is the sole point where database flavor matters; the core
/// assumes normalized records. All queries are treated as blocking calls.
/// Adapter failures map to [`Error::Catalog`] and propagate unchanged.
pub trait Catalog {
    /// Raw table names, in catalog order.
    fn list_tables(&self) -> Result<Vec<String>, Error>;

    /// Columns, primary key, unique constraints, and comments for a table.
    fn describe_table(&self, raw_name: &str) -> Result<Table, Error>;

    /// Outgoing foreign keys of a table, in catalog order.
    fn foreign_keys(&self, raw_name: &str) -> Result<Vec<ForeignKey>, Error>;

    /// True when `name` would collide with a base or inherited method on the
    /// generated class for `moniker`.
    fn is_result_class_method(&self, name: &str, moniker: &str) -> bool;

    /// Path to a previously emitted relation file for `moniker`, when one
    /// exists. Used to preserve relationship names across runs.
    fn dump_filename(&self, _moniker: &str) -> Option<PathBuf> {
        None
    }
}
