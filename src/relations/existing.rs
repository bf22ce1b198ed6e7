//! Index of relationship names from previously emitted relation files.
//!
//! The formatter writes each source's relationships inside a marker region
//! (see [`crate::output::formatter`]). Re-runs parse that region back so a
//! name the user hand-edited keeps pointing at the same foreign-key edge
//! instead of being re-disambiguated. Parsing replaces the reference
//! implementation's load-inspect-unload of generated class files; no global
//! state is involved.

use std::collections::BTreeMap;
use std::path::Path;

/// Opening marker of the machine-readable region.
pub const REGION_BEGIN: &str = "# relations begin";
/// Closing marker of the machine-readable region.
pub const REGION_END: &str = "# relations end";

/// Names declared by one previously emitted relation file.
///
/// Keyed by `(target moniker, far-side column list)` — the far-side columns
/// of a has_many/might_have line are the referencing columns of the
/// originating foreign key, which is exactly what the disambiguator knows
/// about an edge before naming it.
#[derive(Debug, Default)]
pub struct ExistingRelations {
    by_edge: BTreeMap<(String, String), String>,
}

impl ExistingRelations {
    /// Parse the marker region of a previously emitted relation file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("read failed: {e}"))?;
        Ok(Self::parse(&content))
    }

    /// Parse relation lines out of `content`'s marker region.
    pub fn parse(content: &str) -> Self {
        let mut by_edge = BTreeMap::new();
        let mut in_region = false;

        for line in content.lines() {
            let line = line.trim();
            if line == REGION_BEGIN {
                in_region = true;
                continue;
            }
            if line == REGION_END {
                break;
            }
            if !in_region || line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (Some(method), Some(name), Some(target), Some(pairs)) = (
                fields.next(),
                fields.next(),
                fields.next(),
                fields.next(),
            ) else {
                continue;
            };
            // Only far-side lines participate in the reuse check.
            if method != "has_many" && method != "might_have" {
                continue;
            }

            let far_columns: Vec<&str> = pairs
                .split(',')
                .filter_map(|pair| pair.split_once('='))
                .map(|(_, far)| far)
                .collect();
            if far_columns.is_empty() {
                continue;
            }

            by_edge.insert(
                (target.to_string(), far_columns.join(",")),
                name.to_string(),
            );
        }

        Self { by_edge }
    }

    /// Name previously used for the edge from `target` over `far_columns`.
    pub fn name_for(&self, target: &str, far_columns: &[String]) -> Option<&str> {
        self.by_edge
            .get(&(target.to_string(), far_columns.join(",")))
            .map(String::as_str)
    }

    /// True when the file declared no reusable lines.
    pub fn is_empty(&self) -> bool {
        self.by_edge.is_empty()
    }
}
