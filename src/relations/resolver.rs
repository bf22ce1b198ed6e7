//! Collision and duplicate resolution for relationship names.
//!
//! Invoked re-entrantly by the inferencer at each naming decision (inherited
//! method collisions) and as a post-pass over each source (duplicate names).

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::adapter::Catalog;
use crate::error::{Error, Warning};
use crate::inflect;
use crate::options::{BuilderOptions, RelNameContext};
use crate::relations::adjectives;
use crate::relations::plan::{RelMethod, Relationship};

/// How many `_rel` (or numeric) suffixes to try before declaring the name
/// unresolvable.
pub(crate) const SUFFIX_BUDGET: usize = 16;

/// A relationship still carrying its naming state.
#[derive(Debug)]
pub(crate) struct PendingRel {
    /// The record under construction; `rel.name` is the current candidate.
    pub rel: Relationship,
    /// Pre-inflection stem, used whenever the name must be rebuilt.
    pub stem: String,
    /// True when any override stage supplied part of the name.
    pub mapped: bool,
    /// Catalog order of the originating foreign key.
    pub order: usize,
}

/// Outcome of an inherited-method collision check.
pub(crate) struct ResolvedName {
    /// The final, collision-free name.
    pub name: String,
    /// True when a `rel_collision_map` template produced it.
    pub templated: bool,
}

/// True when `name` is unusable on `moniker`: an inherited method of the
/// generated class, or one of the source's own column accessors.
fn collides(
    catalog: &dyn Catalog,
    columns: &BTreeSet<String>,
    moniker: &str,
    name: &str,
) -> bool {
    catalog.is_result_class_method(name, moniker) || columns.contains(name)
}

/// Free `name` from accessor collisions on `moniker`.
///
/// A configured `rel_collision_map` is consulted first; whatever it
/// produces is then still required to be collision-free, falling back to
/// repeated `_rel` suffixing within [`SUFFIX_BUDGET`].
pub(crate) fn resolve_method_collision(
    catalog: &dyn Catalog,
    options: &BuilderOptions,
    warnings: &mut Vec<Warning>,
    moniker: &str,
    columns: &BTreeSet<String>,
    name: &str,
) -> Result<ResolvedName, Error> {
    let mut current = name.to_string();
    let mut templated = false;

    if collides(catalog, columns, moniker, &current) {
        if let Some(new) = options.rel_collision_map.resolve(&current) {
            current = new;
            templated = true;
        }
    }

    let mut attempts = 0usize;
    while collides(catalog, columns, moniker, &current) {
        if attempts >= SUFFIX_BUDGET {
            return Err(Error::NameCollision {
                moniker: moniker.to_string(),
                name: name.to_string(),
                attempts,
            });
        }
        current.push_str("_rel");
        attempts += 1;
    }

    if attempts > 0 {
        tracing::warn!(
            moniker,
            from = name,
            to = current.as_str(),
            "relationship name collides with an existing accessor"
        );
        warnings.push(Warning::MethodCollision {
            moniker: moniker.to_string(),
            from: name.to_string(),
            to: current.clone(),
        });
    }

    Ok(ResolvedName {
        name: current,
        templated,
    })
}

/// Consult `rel_name_map` for the candidate currently held by `pending`.
pub(crate) fn apply_rel_name_map(options: &BuilderOptions, pending: &PendingRel) -> Option<String> {
    let map = options.rel_name_map.as_ref()?;
    let ctx = RelNameContext {
        name: &pending.rel.name,
        method: pending.rel.method,
        owning_moniker: &pending.rel.owning_source,
        local_moniker: &pending.rel.provenance.local_moniker,
        local_columns: &pending.rel.provenance.origin_fk.local_columns,
        remote_moniker: &pending.rel.provenance.remote_moniker,
        remote_columns: &pending.rel.provenance.origin_fk.remote_columns,
    };
    map.lookup(&ctx)
}

fn inflect_for(method: RelMethod, stem: &str, options: &BuilderOptions) -> inflect::Inflected {
    if method.is_singular() {
        inflect::to_singular(stem, options.inflect_singular.as_ref())
    } else {
        inflect::to_plural(stem, options.inflect_plural.as_ref())
    }
}

/// Name → indices of the pending records holding it, for groups of two or
/// more. BTreeMap keeps group iteration deterministic.
fn duplicate_groups(rels: &[PendingRel]) -> BTreeMap<String, Vec<usize>> {
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, pending) in rels.iter().enumerate() {
        groups.entry(pending.rel.name.clone()).or_default().push(idx);
    }
    groups.retain(|_, indices| indices.len() >= 2);
    groups
}

fn name_in_use(rels: &[PendingRel], except: usize, name: &str) -> bool {
    rels.iter()
        .enumerate()
        .any(|(idx, pending)| idx != except && pending.rel.name == name)
}

/// Resolve duplicate relationship names within one source.
///
/// First strategy: adjective extraction from the far-side column names
/// (BelongsTo records keep their names in this pass). Second strategy:
/// numeric suffixing on the pre-inflection stem, ordered by method priority
/// with catalog-order tie-break.
pub(crate) fn resolve_duplicates(
    catalog: &dyn Catalog,
    options: &BuilderOptions,
    warnings: &mut Vec<Warning>,
    moniker: &str,
    columns: &BTreeSet<String>,
    rels: &mut Vec<PendingRel>,
) -> Result<(), Error> {
    // First strategy: adjectives.
    for (_, indices) in duplicate_groups(rels) {
        for idx in indices {
            if rels[idx].rel.method == RelMethod::BelongsTo {
                continue;
            }
            let adjs = adjectives_for(rels, idx);
            if adjs.is_empty() {
                continue;
            }

            let stem = format!("{}_{}", adjs.join("_"), rels[idx].stem);
            let inflected = inflect_for(rels[idx].rel.method, &stem, options);
            rels[idx].rel.name = inflected.value;
            rels[idx].stem = stem;
            rels[idx].mapped |= inflected.mapped;

            if let Some(new) = apply_rel_name_map(options, &rels[idx]) {
                rels[idx].rel.name = new;
                rels[idx].mapped = true;
            }
            let resolved = resolve_method_collision(
                catalog,
                options,
                warnings,
                moniker,
                columns,
                &rels[idx].rel.name,
            )?;
            rels[idx].mapped |= resolved.templated;
            rels[idx].rel.name = resolved.name;
        }
    }

    // Second strategy: numeric suffixes for whatever is still duplicated.
    for (name, mut indices) in duplicate_groups(rels) {
        indices.sort_by_key(|&idx| (Reverse(rels[idx].rel.method.priority()), rels[idx].order));

        for &idx in indices.iter().skip(1) {
            let base_stem = rels[idx].stem.clone();
            let mut suffix = 2usize;
            loop {
                if suffix > SUFFIX_BUDGET + 1 {
                    return Err(Error::NameCollision {
                        moniker: moniker.to_string(),
                        name: name.clone(),
                        attempts: SUFFIX_BUDGET,
                    });
                }
                let stem = format!("{base_stem}_{suffix}");
                let inflected = inflect_for(rels[idx].rel.method, &stem, options);
                rels[idx].rel.name = inflected.value;
                rels[idx].stem = stem;
                rels[idx].mapped |= inflected.mapped;

                if let Some(new) = apply_rel_name_map(options, &rels[idx]) {
                    rels[idx].rel.name = new;
                    rels[idx].mapped = true;
                }
                let resolved = resolve_method_collision(
                    catalog,
                    options,
                    warnings,
                    moniker,
                    columns,
                    &rels[idx].rel.name,
                )?;
                rels[idx].mapped |= resolved.templated;
                rels[idx].rel.name = resolved.name;

                if !name_in_use(rels, idx, &rels[idx].rel.name) {
                    break;
                }
                suffix += 1;
            }

            if !rels[idx].mapped {
                tracing::warn!(
                    moniker,
                    from = name.as_str(),
                    to = rels[idx].rel.name.as_str(),
                    "duplicate relationship name disambiguated numerically"
                );
                warnings.push(Warning::UnmappedDuplicate {
                    moniker: moniker.to_string(),
                    from: name.clone(),
                    to: rels[idx].rel.name.clone(),
                });
            }
        }
    }

    // Residual duplicates mean the overrides themselves conflict.
    if let Some((name, _)) = duplicate_groups(rels).into_iter().next() {
        return Err(Error::NameCollision {
            moniker: moniker.to_string(),
            name,
            attempts: SUFFIX_BUDGET,
        });
    }
    Ok(())
}

/// Adjectives describing the record at `idx`, with the synthetic `active`
/// fallback for the MightHave half of a one-to-one pair.
fn adjectives_for(rels: &[PendingRel], idx: usize) -> Vec<String> {
    let pending = &rels[idx];
    let far_columns: Vec<String> = pending
        .rel
        .column_map
        .iter()
        .map(|(_, far)| far.clone())
        .collect();
    let mut adjs = adjectives::extract(&far_columns);

    if adjs.is_empty() && pending.rel.method == RelMethod::MightHave {
        let sibling_might_haves = rels
            .iter()
            .enumerate()
            .filter(|(other, candidate)| {
                *other != idx
                    && candidate.rel.method == RelMethod::MightHave
                    && candidate.rel.target_source == pending.rel.target_source
            })
            .count();
        if sibling_might_haves == 1 {
            adjs = vec![adjectives::SYNTHETIC.to_string()];
        }
    }
    adjs
}
