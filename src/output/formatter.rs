use std::fmt::Write as _;
use std::path::Path;

use crate::output::report;
use crate::relations::existing::{REGION_BEGIN, REGION_END};
use crate::relations::plan::{RelationshipPlan, Source};

/// Write one `<Moniker>.rels` file per source plus `report.md`.
///
/// The marker region of each `.rels` file is machine-readable: re-runs parse
/// it to keep hand-edited relationship names stable (see
/// [`crate::relations::existing`]). Text outside the region is free-form.
pub fn write_output(output_dir: &Path, plan: &RelationshipPlan) -> Result<(), String> {
    std::fs::create_dir_all(output_dir)
        .map_err(|e| format!("Failed to create output directory: {e}"))?;

    for (moniker, source) in &plan.sources {
        let path = output_dir.join(format!("{moniker}.rels"));
        let content = render_source(plan, moniker, source);
        std::fs::write(&path, content)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    }

    let report_path = output_dir.join("report.md");
    std::fs::write(&report_path, report::build_report(plan))
        .map_err(|e| format!("Failed to write {}: {e}", report_path.display()))?;

    Ok(())
}

/// Render one source's relation file.
pub fn render_source(plan: &RelationshipPlan, moniker: &str, source: &Source) -> String {
    let mut out = String::new();
    writeln!(out, "# {moniker} (table {})", source.table.sanitized_name).unwrap();
    if let Some(comment) = &source.table.comment {
        writeln!(out, "# {comment}").unwrap();
    }
    writeln!(
        out,
        "# relationship names may be edited; keep lines inside the markers parseable"
    )
    .unwrap();
    writeln!(out, "{REGION_BEGIN}").unwrap();
    for rel in plan.relationships_of(moniker) {
        let pairs: Vec<String> = rel
            .column_map
            .iter()
            .map(|(own, far)| format!("{own}={far}"))
            .collect();
        writeln!(
            out,
            "{} {} {} {}",
            rel.method,
            rel.name,
            rel.target_source,
            pairs.join(",")
        )
        .unwrap();
    }
    writeln!(out, "{REGION_END}").unwrap();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ddl::DdlCatalog;
    use crate::options::BuilderOptions;
    use crate::relations::existing::ExistingRelations;
    use crate::relations::inferencer::build_plan;

    fn sample_plan() -> RelationshipPlan {
        let catalog = DdlCatalog::parse(
            "CREATE TABLE author(id INTEGER PRIMARY KEY);
             CREATE TABLE book(
               id INTEGER PRIMARY KEY,
               author_id INTEGER NOT NULL REFERENCES author(id)
             );",
        )
        .unwrap();
        build_plan(&catalog, &BuilderOptions::new()).unwrap()
    }

    #[test]
    fn rendered_region_round_trips_through_the_existing_parser() {
        let plan = sample_plan();
        let rendered = render_source(&plan, "Author", &plan.sources["Author"]);

        let existing = ExistingRelations::parse(&rendered);
        assert_eq!(
            existing.name_for("Book", &["author_id".to_string()]),
            Some("books")
        );
    }

    #[test]
    fn write_output_reports_directory_creation_errors() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let err = write_output(file.path(), &sample_plan())
            .expect_err("directory creation should fail");
        assert!(err.contains("Failed to create output directory"));
    }

    #[test]
    fn write_output_emits_one_file_per_source_and_a_report() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_output(dir.path(), &sample_plan()).expect("output should write");

        assert!(dir.path().join("Author.rels").is_file());
        assert!(dir.path().join("Book.rels").is_file());
        assert!(dir.path().join("report.md").is_file());
    }
}
