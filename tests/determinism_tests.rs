use sql2rel::catalog::ddl::DdlCatalog;
use sql2rel::options::BuilderOptions;
use sql2rel::output::report;
use sql2rel::relations::inferencer::build_plan;

const SCHEMA: &str = r#"
CREATE TABLE users(id INTEGER PRIMARY KEY);
CREATE TABLE teams(id INTEGER PRIMARY KEY);
CREATE TABLE team_members(
  team_id INTEGER NOT NULL REFERENCES teams(id),
  user_id INTEGER NOT NULL REFERENCES users(id),
  PRIMARY KEY (team_id, user_id)
);
CREATE TABLE message(
  id INTEGER PRIMARY KEY,
  sender_id INTEGER NOT NULL REFERENCES users(id),
  recipient_id INTEGER REFERENCES users(id)
);
CREATE TABLE profile(
  id INTEGER PRIMARY KEY,
  user_id INTEGER NOT NULL UNIQUE REFERENCES users(id)
);"#;

#[test]
fn two_runs_on_the_same_catalog_are_byte_identical() {
    let build = || {
        let catalog = DdlCatalog::parse(SCHEMA).expect("schema should parse");
        build_plan(&catalog, &BuilderOptions::new()).expect("plan should build")
    };
    let first = build();
    let second = build();

    assert_eq!(report::build_report(&first), report::build_report(&second));
    assert_eq!(format!("{first:?}"), format!("{second:?}"));
}

#[test]
fn attribute_ordering_is_stable() {
    let catalog = DdlCatalog::parse(SCHEMA).expect("schema should parse");
    let plan = build_plan(&catalog, &BuilderOptions::new()).expect("plan should build");

    let rel = plan.find("Message", "sender").expect("Message.sender");
    let keys: Vec<&str> = rel.attrs.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["is_deferrable", "on_delete", "on_update"]);
}
