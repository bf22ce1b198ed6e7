use sql2rel::catalog::ddl::DdlCatalog;
use sql2rel::options::BuilderOptions;
use sql2rel::relations::inferencer::build_plan;

const SCHEMA: &str = "
CREATE TABLE app_users(id INTEGER PRIMARY KEY);
CREATE TABLE app_posts(
  id INTEGER PRIMARY KEY,
  user_id INTEGER NOT NULL REFERENCES app_users(id)
);
CREATE TABLE tmp_scratch(id INTEGER PRIMARY KEY);
CREATE TABLE app_posts_audit(
  id INTEGER PRIMARY KEY,
  post_id INTEGER NOT NULL REFERENCES app_posts(id)
);";

#[test]
fn constraint_keeps_only_matching_tables() {
    let catalog = DdlCatalog::parse(SCHEMA).unwrap();
    let mut options = BuilderOptions::new();
    options.load_from_json(r#"{"constraint": "^app_"}"#).unwrap();
    let plan = build_plan(&catalog, &options).unwrap();

    assert!(plan.sources.contains_key("AppUser"));
    assert!(plan.sources.contains_key("AppPost"));
    assert!(!plan.sources.contains_key("TmpScratch"));
}

#[test]
fn exclude_runs_after_constraint_and_drops_edges_too() {
    let catalog = DdlCatalog::parse(SCHEMA).unwrap();
    let mut options = BuilderOptions::new();
    options
        .load_from_json(r#"{"constraint": "^app_", "exclude": "_audit$"}"#)
        .unwrap();
    let plan = build_plan(&catalog, &options).unwrap();

    assert!(!plan.sources.contains_key("AppPostsAudit"));
    // The audit table's FK must not leave a dangling half-relationship.
    assert!(plan
        .relationships_of("AppPost")
        .iter()
        .all(|r| r.target_source != "AppPostsAudit"));
}

#[test]
fn db_schema_option_filters_tables() {
    let catalog = DdlCatalog::parse(
        "CREATE TABLE app.users(id INTEGER PRIMARY KEY);
         CREATE TABLE audit.users(id INTEGER PRIMARY KEY);",
    )
    .unwrap();
    let mut options = BuilderOptions::new();
    options.load_from_json(r#"{"db_schema": "app"}"#).unwrap();
    let plan = build_plan(&catalog, &options).unwrap();

    assert_eq!(plan.sources.len(), 1);
    let source = plan.sources.values().next().unwrap();
    assert_eq!(source.table.schema.as_deref(), Some("app"));
}
