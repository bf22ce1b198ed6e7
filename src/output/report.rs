use std::fmt::Write;

use crate::relations::plan::{RelMethod, RelationshipPlan};

/// Build a markdown report with a per-source summary and warnings.
pub fn build_report(plan: &RelationshipPlan) -> String {
    let mut report = String::new();

    writeln!(report, "# sql2rel Relationship Report").unwrap();
    writeln!(report).unwrap();

    writeln!(report, "## Sources").unwrap();
    writeln!(report).unwrap();
    writeln!(
        report,
        "| Source | Table | belongs_to | has_many | might_have |"
    )
    .unwrap();
    writeln!(
        report,
        "|--------|-------|------------|----------|------------|"
    )
    .unwrap();

    for (moniker, source) in &plan.sources {
        let rels = plan.relationships_of(moniker);
        let count =
            |method: RelMethod| rels.iter().filter(|r| r.method == method).count();
        writeln!(
            report,
            "| {} | {} | {} | {} | {} |",
            moniker,
            source.table.sanitized_name,
            count(RelMethod::BelongsTo),
            count(RelMethod::HasMany),
            count(RelMethod::MightHave),
        )
        .unwrap();
    }

    writeln!(report).unwrap();
    writeln!(report, "## Relationships").unwrap();
    writeln!(report).unwrap();
    for (moniker, rels) in &plan.relationships {
        for rel in rels {
            writeln!(
                report,
                "- `{moniker}.{}` {} `{}`",
                rel.name, rel.method, rel.target_source
            )
            .unwrap();
        }
    }

    if !plan.warnings.is_empty() {
        writeln!(report).unwrap();
        writeln!(report, "## Warnings").unwrap();
        writeln!(report).unwrap();
        for warning in &plan.warnings {
            writeln!(report, "- {warning}").unwrap();
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ddl::DdlCatalog;
    use crate::options::BuilderOptions;
    use crate::relations::inferencer::build_plan;

    #[test]
    fn report_lists_sources_and_relationships() {
        let catalog = DdlCatalog::parse(
            "CREATE TABLE author(id INTEGER PRIMARY KEY);
             CREATE TABLE book(
               id INTEGER PRIMARY KEY,
               author_id INTEGER NOT NULL REFERENCES author(id)
             );",
        )
        .unwrap();
        let plan = build_plan(&catalog, &BuilderOptions::new()).unwrap();

        let report = build_report(&plan);
        assert!(report.contains("| Author | author | 0 | 1 | 0 |"));
        assert!(report.contains("| Book | book | 1 | 0 | 0 |"));
        assert!(report.contains("- `Book.author` belongs_to `Author`"));
        assert!(!report.contains("## Warnings"));
    }
}
