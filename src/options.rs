use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::Deserialize;

use crate::error::Error;
use crate::relations::plan::{RelAttrs, RelMethod};

/// A name-for-name override: either an exact lookup table or a callback.
///
/// Callbacks returning `None` or an empty string mean "no override"; the
/// default rule applies and the result is not flagged mapped.
pub enum NameOverride {
    /// Exact mapping, input name → replacement.
    Map(BTreeMap<String, String>),
    /// Host-supplied callback.
    Callback(Box<dyn Fn(&str) -> Option<String> + Send + Sync>),
}

impl NameOverride {
    /// Consult the override for `name`.
    pub fn lookup(&self, name: &str) -> Option<String> {
        let mapped = match self {
            NameOverride::Map(map) => map.get(name).cloned(),
            NameOverride::Callback(cb) => cb(name),
        };
        mapped.filter(|value| !value.is_empty())
    }
}

impl fmt::Debug for NameOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameOverride::Map(map) => f.debug_tuple("Map").field(map).finish(),
            NameOverride::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Everything a relationship-name override callback gets to see.
#[derive(Debug, Clone)]
pub struct RelNameContext<'a> {
    /// Candidate name being decided.
    pub name: &'a str,
    /// Accessor kind of the record being named.
    pub method: RelMethod,
    /// Moniker owning the accessor.
    pub owning_moniker: &'a str,
    /// Moniker of the FK's declaring table.
    pub local_moniker: &'a str,
    /// FK columns on the declaring table.
    pub local_columns: &'a [String],
    /// Moniker of the FK's referenced table.
    pub remote_moniker: &'a str,
    /// Referenced columns.
    pub remote_columns: &'a [String],
}

/// User override for relationship names, consulted at every naming decision.
pub enum RelNameMap {
    /// name → new, applied on every source.
    Flat(BTreeMap<String, String>),
    /// owning moniker → name → new.
    PerMoniker(BTreeMap<String, BTreeMap<String, String>>),
    /// Callback receiving the full naming context.
    Callback(Box<dyn Fn(&RelNameContext<'_>) -> Option<String> + Send + Sync>),
}

impl RelNameMap {
    /// Consult the override for the candidate described by `ctx`.
    pub fn lookup(&self, ctx: &RelNameContext<'_>) -> Option<String> {
        let mapped = match self {
            RelNameMap::Flat(map) => map.get(ctx.name).cloned(),
            RelNameMap::PerMoniker(map) => map
                .get(ctx.owning_moniker)
                .and_then(|names| names.get(ctx.name))
                .cloned(),
            RelNameMap::Callback(cb) => cb(ctx),
        };
        mapped.filter(|value| !value.is_empty())
    }
}

impl fmt::Debug for RelNameMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelNameMap::Flat(map) => f.debug_tuple("Flat").field(map).finish(),
            RelNameMap::PerMoniker(map) => f.debug_tuple("PerMoniker").field(map).finish(),
            RelNameMap::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Ordered regex → printf-template rules for inherited-method collisions.
///
/// The first matching regex wins. Each `%s` in the template consumes the
/// next capture group of the match, in order; `%%` is a literal percent;
/// a `%s` with no capture left renders as the empty string.
#[derive(Debug, Default)]
pub struct CollisionMap {
    entries: Vec<(Regex, String)>,
}

impl CollisionMap {
    /// Build from `(pattern, template)` pairs, kept in insertion order.
    pub fn new<I, S, T>(rules: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: Into<String>,
    {
        let mut entries = Vec::new();
        for (pattern, template) in rules {
            let regex = Regex::new(pattern.as_ref())
                .map_err(|e| Error::Options(format!("bad collision regex: {e}")))?;
            entries.push((regex, template.into()));
        }
        Ok(Self { entries })
    }

    /// True when no rules are configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply the first matching rule to `name`.
    pub fn resolve(&self, name: &str) -> Option<String> {
        for (regex, template) in &self.entries {
            if let Some(caps) = regex.captures(name) {
                let groups: Vec<&str> = caps
                    .iter()
                    .skip(1)
                    .map(|m| m.map_or("", |m| m.as_str()))
                    .collect();
                return Some(expand_template(template, &groups));
            }
        }
        None
    }
}

fn expand_template(template: &str, groups: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut next_group = 0usize;
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('s') => {
                out.push_str(groups.get(next_group).copied().unwrap_or(""));
                next_group += 1;
            }
            Some('%') => out.push('%'),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}

/// Attribute buckets merged into every relationship record.
///
/// Merge order is defaults ← `all` ← per-method bucket, last wins.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationshipAttrs {
    /// Applied to every method kind.
    #[serde(default)]
    pub all: RelAttrs,
    /// Applied to BelongsTo records.
    #[serde(default)]
    pub belongs_to: RelAttrs,
    /// Applied to HasMany records.
    #[serde(default)]
    pub has_many: RelAttrs,
    /// Applied to MightHave records.
    #[serde(default)]
    pub might_have: RelAttrs,
}

impl RelationshipAttrs {
    /// The per-method bucket for `method`.
    pub fn bucket(&self, method: RelMethod) -> &RelAttrs {
        match method {
            RelMethod::BelongsTo => &self.belongs_to,
            RelMethod::HasMany => &self.has_many,
            RelMethod::MightHave => &self.might_have,
        }
    }

    /// Merge `defaults` with the `all` bucket and the bucket for `method`.
    pub fn merged(&self, method: RelMethod, defaults: RelAttrs) -> RelAttrs {
        let mut attrs = defaults;
        for (key, value) in self.all.iter().chain(self.bucket(method)) {
            attrs.insert(key.clone(), value.clone());
        }
        attrs
    }
}

/// Data-only override file, loadable from JSON.
///
/// Callback forms of the overrides are set programmatically on
/// [`BuilderOptions`]; everything else round-trips through this struct.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverrideConfig {
    /// Table name → moniker.
    #[serde(default)]
    pub moniker_map: Option<BTreeMap<String, String>>,
    /// Identifier → plural form.
    #[serde(default)]
    pub inflect_plural: Option<BTreeMap<String, String>>,
    /// Identifier → singular form.
    #[serde(default)]
    pub inflect_singular: Option<BTreeMap<String, String>>,
    /// Either `name → new` or `moniker → { name → new }`; detected by shape.
    #[serde(default)]
    pub rel_name_map: Option<serde_json::Value>,
    /// Ordered `[pattern, template]` pairs.
    #[serde(default)]
    pub rel_collision_map: Option<Vec<(String, String)>>,
    /// Attribute buckets.
    #[serde(default)]
    pub relationship_attrs: Option<RelationshipAttrs>,
    /// Schema filter passed to the adapter.
    #[serde(default)]
    pub db_schema: Option<String>,
    /// Keep only tables matching this regex.
    #[serde(default)]
    pub constraint: Option<String>,
    /// Drop tables matching this regex (after `constraint`).
    #[serde(default)]
    pub exclude: Option<String>,
}

/// All knobs recognized by the core.
#[derive(Debug, Default)]
pub struct BuilderOptions {
    /// Table name → moniker override.
    pub moniker_map: Option<NameOverride>,
    /// Plural-inflection override.
    pub inflect_plural: Option<NameOverride>,
    /// Singular-inflection override.
    pub inflect_singular: Option<NameOverride>,
    /// Relationship-name override.
    pub rel_name_map: Option<RelNameMap>,
    /// Inherited-method collision rules.
    pub rel_collision_map: CollisionMap,
    /// Attribute buckets.
    pub relationship_attrs: RelationshipAttrs,
    /// Schema filter passed to the adapter.
    pub db_schema: Option<String>,
    /// Keep only tables matching this regex.
    pub constraint: Option<Regex>,
    /// Drop tables matching this regex (after `constraint`).
    pub exclude: Option<Regex>,
}

impl BuilderOptions {
    /// Options with every knob at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load data-only overrides from a JSON string.
    pub fn load_from_json(&mut self, json: &str) -> Result<(), Error> {
        let config: OverrideConfig = serde_json::from_str(json)
            .map_err(|e| Error::Options(format!("invalid override JSON: {e}")))?;
        self.apply_config(config)
    }

    /// Fold a parsed [`OverrideConfig`] into these options.
    pub fn apply_config(&mut self, config: OverrideConfig) -> Result<(), Error> {
        if let Some(map) = config.moniker_map {
            self.moniker_map = Some(NameOverride::Map(map));
        }
        if let Some(map) = config.inflect_plural {
            self.inflect_plural = Some(NameOverride::Map(map));
        }
        if let Some(map) = config.inflect_singular {
            self.inflect_singular = Some(NameOverride::Map(map));
        }
        if let Some(value) = config.rel_name_map {
            self.rel_name_map = Some(rel_name_map_from_value(value)?);
        }
        if let Some(rules) = config.rel_collision_map {
            self.rel_collision_map = CollisionMap::new(rules)?;
        }
        if let Some(attrs) = config.relationship_attrs {
            self.relationship_attrs = attrs;
        }
        if config.db_schema.is_some() {
            self.db_schema = config.db_schema;
        }
        if let Some(pattern) = config.constraint {
            self.constraint = Some(compile(&pattern, "constraint")?);
        }
        if let Some(pattern) = config.exclude {
            self.exclude = Some(compile(&pattern, "exclude")?);
        }
        Ok(())
    }

    /// Apply the `constraint`/`exclude` pair to a sanitized table name.
    pub fn table_included(&self, table: &str) -> bool {
        if let Some(constraint) = &self.constraint {
            if !constraint.is_match(table) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(table) {
                return false;
            }
        }
        true
    }
}

fn compile(pattern: &str, which: &str) -> Result<Regex, Error> {
    Regex::new(pattern).map_err(|e| Error::Options(format!("bad {which} regex: {e}")))
}

fn rel_name_map_from_value(value: serde_json::Value) -> Result<RelNameMap, Error> {
    let serde_json::Value::Object(entries) = value else {
        return Err(Error::Options(
            "rel_name_map must be an object".to_string(),
        ));
    };

    let nested = entries.values().all(|v| v.is_object());
    if nested {
        let mut map = BTreeMap::new();
        for (moniker, names) in entries {
            let serde_json::Value::Object(names) = names else {
                unreachable!("checked above");
            };
            let mut inner = BTreeMap::new();
            for (name, new) in names {
                let serde_json::Value::String(new) = new else {
                    return Err(Error::Options(format!(
                        "rel_name_map.{moniker}.{name} must be a string"
                    )));
                };
                inner.insert(name, new);
            }
            map.insert(moniker, inner);
        }
        return Ok(RelNameMap::PerMoniker(map));
    }

    let mut map = BTreeMap::new();
    for (name, new) in entries {
        let serde_json::Value::String(new) = new else {
            return Err(Error::Options(format!(
                "rel_name_map.{name} must be a string (or all values must be objects)"
            )));
        };
        map.insert(name, new);
    }
    Ok(RelNameMap::Flat(map))
}
