//! Infer ORM relationship plans from SQL schema catalogs.
#![warn(missing_docs)]

/// Catalog records, the adapter trait, and the DDL-backed implementation.
pub mod catalog;
/// Fatal errors and non-fatal warnings.
pub mod error;
/// Singular/plural identifier inflection.
pub mod inflect;
/// Table → source-name assignment.
pub mod moniker;
/// Override maps, callbacks, and JSON-loadable configuration.
pub mod options;
/// Relation-file and report output.
pub mod output;
/// Relationship inference and name resolution.
pub mod relations;

pub use crate::catalog::adapter::Catalog;
pub use crate::catalog::ddl::DdlCatalog;
pub use crate::error::{Error, Warning};
pub use crate::moniker::monikerize;
pub use crate::options::BuilderOptions;
pub use crate::relations::inferencer::build_plan;
pub use crate::relations::plan::{RelMethod, Relationship, RelationshipPlan};

/// Pluralize an identifier the way generated relationship names are
/// pluralized, honoring the `inflect_plural` override.
///
/// Exposed so an emitter can reproduce the names the planner chose.
pub fn inflect_plural(name: &str, options: &BuilderOptions) -> String {
    inflect::to_plural(name, options.inflect_plural.as_ref()).value
}

/// Singularize an identifier, honoring the `inflect_singular` override.
pub fn inflect_singular(name: &str, options: &BuilderOptions) -> String {
    inflect::to_singular(name, options.inflect_singular.as_ref()).value
}
