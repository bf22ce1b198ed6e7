//! Adjective extraction from column-name tokens.
//!
//! Duplicate relationship names are first disambiguated with the descriptive
//! words users actually put in column names (`active_user_id`,
//! `primary_contact_id`). The tagger is a fixed lexicon of adjectives
//! common in schema vocabulary; anything outside it is treated as a noun.

use crate::catalog::names;

/// Adjectives that appear in column names, sorted for binary search.
const ADJECTIVES: &[&str] = &[
    "active",
    "alternate",
    "approved",
    "archived",
    "closed",
    "current",
    "default",
    "external",
    "final",
    "first",
    "former",
    "inactive",
    "internal",
    "last",
    "latest",
    "main",
    "new",
    "next",
    "old",
    "open",
    "original",
    "pending",
    "preferred",
    "previous",
    "primary",
    "private",
    "public",
    "secondary",
    "temporary",
];

/// The synthetic adjective substituted for the second of a MightHave pair
/// when the column names carry no natural adjective.
pub const SYNTHETIC: &str = "active";

fn is_adjective(token: &str) -> bool {
    ADJECTIVES.binary_search(&token).is_ok()
}

/// Distinct adjectives found in `column_names`, sorted.
pub fn extract(column_names: &[String]) -> Vec<String> {
    let mut found: Vec<String> = column_names
        .iter()
        .flat_map(|column| names::split_name(column))
        .filter(|token| is_adjective(token))
        .collect();
    found.sort();
    found.dedup();
    found
}
