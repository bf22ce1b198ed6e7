//! Table → source-name (moniker) assignment.

use std::collections::BTreeMap;

use heck::ToUpperCamelCase;

use crate::catalog::names;
use crate::catalog::types::Table;
use crate::inflect;
use crate::options::BuilderOptions;

/// Moniker for a single table name, applying the `moniker_map` override and
/// the default singularize-and-CamelCase rule.
///
/// Exposed for emitter reuse; cross-table uniqueness is handled by
/// [`assign_monikers`].
pub fn monikerize(table_name: &str, options: &BuilderOptions) -> String {
    let sanitized = names::sanitize(table_name, false);
    moniker_for(&sanitized, options)
}

fn moniker_for(sanitized: &str, options: &BuilderOptions) -> String {
    if let Some(mapped) = options.moniker_map.as_ref().and_then(|o| o.lookup(sanitized)) {
        return mapped;
    }

    let mut words = names::split_name(sanitized);
    if let Some(last) = words.last_mut() {
        *last = inflect::to_singular(last, options.inflect_singular.as_ref()).value;
    }
    words.join("_").to_upper_camel_case()
}

/// Assign a unique moniker to every table, in catalog order.
///
/// Returns raw table name → moniker. Collisions after the default rule fall
/// back to appending the table's schema qualifier, or a numeric `_2`, `_3`,
/// ... disambiguator in catalog order when no schema is available (or the
/// qualified form collides too).
pub fn assign_monikers(tables: &[Table], options: &BuilderOptions) -> BTreeMap<String, String> {
    let mut assigned: BTreeMap<String, String> = BTreeMap::new();
    let mut used: BTreeMap<String, usize> = BTreeMap::new();

    for table in tables {
        let base = moniker_for(&table.sanitized_name, options);
        let occurrence = {
            let slot = used.entry(base.clone()).or_insert(0);
            *slot += 1;
            *slot
        };

        let moniker = if occurrence == 1 {
            base
        } else {
            let qualified = table
                .schema
                .as_deref()
                .map(|schema| format!("{base}{}", schema.to_upper_camel_case()));
            match qualified {
                Some(qualified) if !used.contains_key(&qualified) => {
                    used.insert(qualified.clone(), 1);
                    qualified
                }
                _ => format!("{base}_{occurrence}"),
            }
        };

        assigned.insert(table.raw_name.clone(), moniker);
    }
    assigned
}
