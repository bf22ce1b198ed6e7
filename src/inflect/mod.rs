//! Identifier inflection between singular and plural forms.
//!
//! Identifiers are treated as underscore-joined noun phrases: only the final
//! word inflects (`order_line` -> `order_lines`). User overrides are
//! consulted on the whole identifier before any rule runs, and their hits
//! are flagged so later naming stages can suppress "please supply a name"
//! warnings.

/// English word-level rule tables.
pub mod rules;

use crate::options::NameOverride;

/// An inflection result and whether a user override produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inflected {
    /// The inflected identifier.
    pub value: String,
    /// True when a user override supplied the value.
    pub mapped: bool,
}

impl Inflected {
    fn mapped(value: String) -> Self {
        Self {
            value,
            mapped: true,
        }
    }

    fn unmapped(value: String) -> Self {
        Self {
            value,
            mapped: false,
        }
    }
}

/// Pluralize an identifier, consulting `overrides` first.
///
/// The empty string inflects to the empty string; that is not an error.
pub fn to_plural(name: &str, overrides: Option<&NameOverride>) -> Inflected {
    if let Some(value) = overrides.and_then(|o| o.lookup(name)) {
        return Inflected::mapped(value);
    }
    Inflected::unmapped(inflect_phrase(name, rules::plural_word))
}

/// Singularize an identifier, consulting `overrides` first.
pub fn to_singular(name: &str, overrides: Option<&NameOverride>) -> Inflected {
    if let Some(value) = overrides.and_then(|o| o.lookup(name)) {
        return Inflected::mapped(value);
    }
    Inflected::unmapped(inflect_phrase(name, rules::singular_word))
}

fn inflect_phrase(name: &str, inflect: impl Fn(&str) -> String) -> String {
    if name.is_empty() {
        return String::new();
    }
    let mut words: Vec<String> = name.split('_').map(str::to_string).collect();
    // The last noun inflects; trailing digit runs (numeric disambiguators)
    // are not nouns.
    if let Some(last) = words
        .iter_mut()
        .rev()
        .find(|w| w.chars().any(char::is_alphabetic))
    {
        *last = inflect(last);
    }
    words.join("_")
}
