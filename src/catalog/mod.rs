/// The consumed [`Catalog`](adapter::Catalog) trait.
pub mod adapter;
/// DDL-backed catalog implementation.
pub mod ddl;
/// Identifier sanitizing, splitting, and normalizing.
pub mod names;
/// Table, column, constraint, and foreign-key records.
pub mod types;
