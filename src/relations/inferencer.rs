//! Foreign-key edge inference: the core pipeline behind [`build_plan`].
//!
//! For every foreign key the catalog reports, exactly two relationship
//! records are produced: a BelongsTo on the declaring side and a HasMany or
//! MightHave on the referenced side. Naming runs through the resolver at
//! each decision; a post-pass settles duplicates per source.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::json;

use crate::catalog::adapter::Catalog;
use crate::catalog::names;
use crate::catalog::types::{ForeignKey, Table};
use crate::error::{Error, Warning};
use crate::inflect;
use crate::moniker::assign_monikers;
use crate::options::BuilderOptions;
use crate::relations::existing::ExistingRelations;
use crate::relations::plan::{
    Provenance, RelAttrs, RelMethod, Relationship, RelationshipPlan, Source,
};
use crate::relations::resolver::{self, PendingRel};

/// Build the relationship plan for everything the catalog exposes.
///
/// Deterministic for a given catalog: tables and their foreign keys are
/// processed in catalog order, and all override maps iterate in sorted
/// order.
pub fn build_plan(catalog: &dyn Catalog, options: &BuilderOptions) -> Result<RelationshipPlan, Error> {
    let mut warnings: Vec<Warning> = Vec::new();

    let mut tables: Vec<Table> = Vec::new();
    for raw_name in catalog.list_tables()? {
        let table = catalog.describe_table(&raw_name)?;
        let schema_matches = options
            .db_schema
            .as_deref()
            .map_or(true, |wanted| table.schema.as_deref() == Some(wanted));
        if schema_matches && options.table_included(&table.sanitized_name) {
            tables.push(table);
        } else {
            tracing::debug!(table = table.sanitized_name.as_str(), "table filtered out");
        }
    }

    let monikers = assign_monikers(&tables, options);
    let column_names: BTreeMap<String, BTreeSet<String>> = tables
        .iter()
        .map(|t| {
            (
                monikers[&t.raw_name].clone(),
                t.columns.iter().map(|c| c.name.clone()).collect(),
            )
        })
        .collect();
    let by_sanitized: BTreeMap<&str, usize> = tables
        .iter()
        .enumerate()
        .rev()
        .map(|(idx, t)| (t.sanitized_name.as_str(), idx))
        .collect();

    let mut pending: BTreeMap<String, Vec<PendingRel>> = BTreeMap::new();
    let mut existing_cache: BTreeMap<String, Option<ExistingRelations>> = BTreeMap::new();
    let mut edge_order = 0usize;

    for table in &tables {
        let local_moniker = &monikers[&table.raw_name];
        let edges = resolve_edges(catalog, table, &tables, &by_sanitized, &monikers)?;

        let mut counters: BTreeMap<&str, usize> = BTreeMap::new();
        for edge in &edges {
            *counters.entry(edge.remote_moniker.as_str()).or_default() += 1;
        }

        for edge in &edges {
            let parallel_edges = counters[edge.remote_moniker.as_str()];
            infer_edge(
                catalog,
                options,
                &mut warnings,
                &mut pending,
                &mut existing_cache,
                &column_names,
                table,
                local_moniker,
                edge,
                parallel_edges,
                edge_order,
            )?;
            edge_order += 1;
        }
    }

    static NO_COLUMNS: BTreeSet<String> = BTreeSet::new();
    for (moniker, rels) in &mut pending {
        let columns = column_names.get(moniker).unwrap_or(&NO_COLUMNS);
        resolver::resolve_duplicates(catalog, options, &mut warnings, moniker, columns, rels)?;
    }

    let mut plan = RelationshipPlan::default();
    for table in tables {
        let moniker = monikers[&table.raw_name].clone();
        plan.relationships.entry(moniker.clone()).or_default();
        plan.sources.insert(moniker.clone(), Source { moniker, table });
    }
    for (moniker, mut rels) in pending {
        rels.sort_by_key(|p| p.order);
        plan.relationships
            .insert(moniker, rels.into_iter().map(|p| p.rel).collect());
    }
    plan.warnings = warnings;
    Ok(plan)
}

/// A foreign key with its referenced table resolved.
struct Edge<'a> {
    fk: ForeignKey,
    remote_table: &'a Table,
    remote_moniker: String,
}

/// Validate and resolve a table's outgoing foreign keys.
///
/// Arity mismatches are fatal; edges to tables the catalog filter dropped
/// (or never reported) are skipped.
fn resolve_edges<'a>(
    catalog: &dyn Catalog,
    table: &Table,
    tables: &'a [Table],
    by_sanitized: &BTreeMap<&str, usize>,
    monikers: &BTreeMap<String, String>,
) -> Result<Vec<Edge<'a>>, Error> {
    let mut edges = Vec::new();
    for fk in catalog.foreign_keys(&table.raw_name)? {
        if fk.local_columns.is_empty() || fk.local_columns.len() != fk.remote_columns.len() {
            return Err(Error::SchemaMismatch {
                local_table: table.sanitized_name.clone(),
                local_columns: fk.local_columns,
                remote_table: fk.remote_table,
                remote_columns: fk.remote_columns,
            });
        }

        let remote_key = names::sanitize(&fk.remote_table, false);
        let Some(&remote_idx) = by_sanitized.get(remote_key.as_str()) else {
            tracing::debug!(
                table = table.sanitized_name.as_str(),
                remote = fk.remote_table.as_str(),
                "skipping foreign key to a table outside the catalog"
            );
            continue;
        };
        let remote_table = &tables[remote_idx];
        let remote_moniker = monikers[&remote_table.raw_name].clone();
        edges.push(Edge {
            fk,
            remote_table,
            remote_moniker,
        });
    }
    Ok(edges)
}

/// Emit the two pending records for one edge.
#[allow(clippy::too_many_arguments)]
fn infer_edge(
    catalog: &dyn Catalog,
    options: &BuilderOptions,
    warnings: &mut Vec<Warning>,
    pending: &mut BTreeMap<String, Vec<PendingRel>>,
    existing_cache: &mut BTreeMap<String, Option<ExistingRelations>>,
    column_names: &BTreeMap<String, BTreeSet<String>>,
    table: &Table,
    local_moniker: &str,
    edge: &Edge<'_>,
    parallel_edges: usize,
    edge_order: usize,
) -> Result<(), Error> {
    let fk = &edge.fk;
    let remote_method = if table.columns_are_unique(&fk.local_columns) {
        RelMethod::MightHave
    } else {
        RelMethod::HasMany
    };

    // Near side: BelongsTo, named after the single FK column (sans `_id`)
    // or the referenced table.
    let near_stem = if fk.local_columns.len() == 1 {
        names::normalize(names::strip_id_suffix(&fk.local_columns[0]))
    } else {
        names::normalize(&edge.remote_table.sanitized_name)
    };
    let near = inflect::to_singular(&near_stem, options.inflect_singular.as_ref());

    // Far side: HasMany or MightHave, named after the declaring table.
    let far_stem = names::normalize(&table.sanitized_name);
    let far = if remote_method.is_singular() {
        inflect::to_singular(&far_stem, options.inflect_singular.as_ref())
    } else {
        inflect::to_plural(&far_stem, options.inflect_plural.as_ref())
    };
    let (mut far_name, mut far_stem, mut far_mapped) = (far.value, far_stem, far.mapped);

    // Parallel edges to the same source disambiguate by column names,
    // unless a previously emitted file already names this exact edge.
    if parallel_edges > 1 {
        let previously_used = existing_cache
            .entry(edge.remote_moniker.clone())
            .or_insert_with(|| load_existing(catalog, warnings, &edge.remote_moniker))
            .as_ref()
            .and_then(|existing| existing.name_for(local_moniker, &fk.local_columns))
            .map(str::to_string);

        if let Some(name) = previously_used {
            far_stem = name.clone();
            far_name = name;
            far_mapped = true;
        } else {
            let colnames = names::normalize(&fk.local_columns.join("_"));
            let stem = format!("{far_name}_{colnames}");
            let stem = names::strip_id_suffix(&stem).to_string();
            let inflected = if remote_method.is_singular() {
                inflect::to_singular(&stem, options.inflect_singular.as_ref())
            } else {
                inflect::to_plural(&stem, options.inflect_plural.as_ref())
            };
            far_name = inflected.value;
            far_mapped |= inflected.mapped;
            far_stem = stem;
        }
    }

    let provenance = Provenance {
        origin_fk: fk.clone(),
        local_moniker: local_moniker.to_string(),
        remote_moniker: edge.remote_moniker.clone(),
    };

    let near_rel = Relationship {
        owning_source: local_moniker.to_string(),
        method: RelMethod::BelongsTo,
        name: near.value,
        target_source: edge.remote_moniker.clone(),
        column_map: fk
            .column_pairs()
            .map(|(l, r)| (l.to_string(), r.to_string()))
            .collect(),
        attrs: belongs_to_attrs(options, table, fk),
        provenance: provenance.clone(),
    };
    push_pending(
        catalog, options, warnings, pending, column_names, near_rel, near_stem, near.mapped,
        edge_order,
    )?;

    let far_rel = Relationship {
        owning_source: edge.remote_moniker.clone(),
        method: remote_method,
        name: far_name,
        target_source: local_moniker.to_string(),
        column_map: fk
            .column_pairs()
            .map(|(l, r)| (r.to_string(), l.to_string()))
            .collect(),
        attrs: options.relationship_attrs.merged(
            remote_method,
            far_default_attrs(),
        ),
        provenance,
    };
    push_pending(
        catalog, options, warnings, pending, column_names, far_rel, far_stem, far_mapped,
        edge_order,
    )?;
    Ok(())
}

/// Run a fresh record through `rel_name_map` and the method-collision check,
/// then queue it on its owning source.
#[allow(clippy::too_many_arguments)]
fn push_pending(
    catalog: &dyn Catalog,
    options: &BuilderOptions,
    warnings: &mut Vec<Warning>,
    pending: &mut BTreeMap<String, Vec<PendingRel>>,
    column_names: &BTreeMap<String, BTreeSet<String>>,
    rel: Relationship,
    stem: String,
    mapped: bool,
    order: usize,
) -> Result<(), Error> {
    let mut record = PendingRel {
        rel,
        stem,
        mapped,
        order,
    };

    if let Some(new) = resolver::apply_rel_name_map(options, &record) {
        record.rel.name = new;
        record.mapped = true;
    }
    static NO_COLUMNS: BTreeSet<String> = BTreeSet::new();
    let columns = column_names
        .get(&record.rel.owning_source)
        .unwrap_or(&NO_COLUMNS);
    let resolved = resolver::resolve_method_collision(
        catalog,
        options,
        warnings,
        &record.rel.owning_source,
        columns,
        &record.rel.name,
    )?;
    record.mapped |= resolved.templated;
    record.rel.name = resolved.name;

    pending
        .entry(record.rel.owning_source.clone())
        .or_default()
        .push(record);
    Ok(())
}

fn load_existing(
    catalog: &dyn Catalog,
    warnings: &mut Vec<Warning>,
    moniker: &str,
) -> Option<ExistingRelations> {
    let path = catalog.dump_filename(moniker)?;
    match ExistingRelations::load(&path) {
        Ok(existing) => Some(existing),
        Err(reason) => {
            tracing::warn!(moniker, reason = reason.as_str(), "stale relation dump");
            warnings.push(Warning::StaleDump {
                moniker: moniker.to_string(),
                path: path.display().to_string(),
                reason,
            });
            None
        }
    }
}

fn belongs_to_attrs(options: &BuilderOptions, table: &Table, fk: &ForeignKey) -> RelAttrs {
    let mut defaults = RelAttrs::new();
    defaults.insert("on_delete".to_string(), json!("CASCADE"));
    defaults.insert("on_update".to_string(), json!("CASCADE"));
    defaults.insert("is_deferrable".to_string(), json!(true));

    let any_nullable = fk
        .local_columns
        .iter()
        .any(|name| table.column(name).is_some_and(|c| c.nullable));
    if any_nullable {
        defaults.insert("join_type".to_string(), json!("LEFT"));
    }

    options
        .relationship_attrs
        .merged(RelMethod::BelongsTo, defaults)
}

fn far_default_attrs() -> RelAttrs {
    let mut defaults = RelAttrs::new();
    defaults.insert("cascade_delete".to_string(), json!(false));
    defaults.insert("cascade_copy".to_string(), json!(false));
    defaults
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ddl::DdlCatalog;

    fn plan_for(sql: &str) -> RelationshipPlan {
        let catalog = DdlCatalog::parse(sql).expect("schema should parse");
        build_plan(&catalog, &BuilderOptions::new()).expect("plan should build")
    }

    #[test]
    fn every_edge_produces_exactly_two_records() {
        let plan = plan_for(
            "CREATE TABLE author(id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             CREATE TABLE book(
               id INTEGER PRIMARY KEY,
               author_id INTEGER NOT NULL REFERENCES author(id)
             );",
        );
        assert_eq!(plan.len(), 2);
        assert!(plan.find("Book", "author").is_some());
        assert!(plan.find("Author", "books").is_some());
    }

    #[test]
    fn foreign_keys_to_unlisted_tables_are_skipped() {
        let plan = plan_for(
            "CREATE TABLE book(
               id INTEGER PRIMARY KEY,
               author_id INTEGER REFERENCES author(id)
             );",
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn nullable_fk_column_sets_left_join_hint() {
        let plan = plan_for(
            "CREATE TABLE author(id INTEGER PRIMARY KEY);
             CREATE TABLE book(
               id INTEGER PRIMARY KEY,
               author_id INTEGER REFERENCES author(id)
             );",
        );
        let rel = plan.find("Book", "author").expect("belongs_to author");
        assert_eq!(rel.attrs["join_type"], json!("LEFT"));

        let plan = plan_for(
            "CREATE TABLE author(id INTEGER PRIMARY KEY);
             CREATE TABLE book(
               id INTEGER PRIMARY KEY,
               author_id INTEGER NOT NULL REFERENCES author(id)
             );",
        );
        let rel = plan.find("Book", "author").expect("belongs_to author");
        assert!(!rel.attrs.contains_key("join_type"));
    }

    #[test]
    fn self_referential_edges_land_on_one_source() {
        let plan = plan_for(
            "CREATE TABLE employee(
               id INTEGER PRIMARY KEY,
               manager_id INTEGER REFERENCES employee(id)
             );",
        );
        let rels = plan.relationships_of("Employee");
        assert_eq!(rels.len(), 2);
        assert!(plan.find("Employee", "manager").is_some());
        assert!(plan.find("Employee", "employees").is_some());
    }
}
