use std::fs;

use sql2rel::catalog::ddl::DdlCatalog;
use sql2rel::error::Warning;
use sql2rel::options::BuilderOptions;
use sql2rel::output::formatter;
use sql2rel::relations::inferencer::build_plan;

const MESSAGE_SCHEMA: &str = "
CREATE TABLE users(id INTEGER PRIMARY KEY);
CREATE TABLE message(
  id INTEGER PRIMARY KEY,
  sender_id INTEGER NOT NULL REFERENCES users(id),
  recipient_id INTEGER NOT NULL REFERENCES users(id)
);";

#[test]
fn previously_emitted_names_survive_reruns() {
    let dir = tempfile::tempdir().expect("temp dir");
    let prior = "\
# User (table users)
# relations begin
has_many sent_messages Message id=sender_id
# relations end
";
    fs::write(dir.path().join("User.rels"), prior).unwrap();

    let catalog = DdlCatalog::parse(MESSAGE_SCHEMA)
        .unwrap()
        .with_dump_dir(dir.path());
    let plan = build_plan(&catalog, &BuilderOptions::new()).unwrap();

    // The edited name is reused for the sender edge; the recipient edge
    // still gets the column-disambiguated default.
    let reused = plan.find("User", "sent_messages").expect("User.sent_messages");
    assert_eq!(
        reused.provenance.origin_fk.local_columns,
        vec!["sender_id".to_string()]
    );
    assert!(plan.find("User", "messages_recipients").is_some());
    assert!(plan.find("User", "messages_senders").is_none());

    // Near-side names are unaffected.
    assert!(plan.find("Message", "sender").is_some());
    assert!(plan.find("Message", "recipient").is_some());
}

#[test]
fn full_write_then_rebuild_is_stable() {
    let dir = tempfile::tempdir().expect("temp dir");

    let catalog = DdlCatalog::parse(MESSAGE_SCHEMA).unwrap();
    let first = build_plan(&catalog, &BuilderOptions::new()).unwrap();
    formatter::write_output(dir.path(), &first).unwrap();

    // Second run reads its own output back; nothing should change.
    let catalog = DdlCatalog::parse(MESSAGE_SCHEMA)
        .unwrap()
        .with_dump_dir(dir.path());
    let second = build_plan(&catalog, &BuilderOptions::new()).unwrap();

    let names = |plan: &sql2rel::RelationshipPlan| -> Vec<String> {
        plan.relationships_of("User")
            .iter()
            .map(|r| r.name.clone())
            .collect()
    };
    assert_eq!(names(&first), names(&second));
}

#[test]
fn unreadable_dump_file_warns_and_falls_back() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("User.rels"), [0xFF, 0xFE, 0x00]).unwrap();

    let catalog = DdlCatalog::parse(MESSAGE_SCHEMA)
        .unwrap()
        .with_dump_dir(dir.path());
    let plan = build_plan(&catalog, &BuilderOptions::new()).unwrap();

    assert!(plan.find("User", "messages_senders").is_some());
    assert!(plan.find("User", "messages_recipients").is_some());
    assert!(
        plan.warnings
            .iter()
            .any(|w| matches!(w, Warning::StaleDump { moniker, .. } if moniker == "User")),
        "expected a StaleDump warning, got: {:?}",
        plan.warnings
    );
}

#[test]
fn missing_dump_file_is_not_a_warning() {
    let dir = tempfile::tempdir().expect("temp dir");
    let catalog = DdlCatalog::parse(MESSAGE_SCHEMA)
        .unwrap()
        .with_dump_dir(dir.path());
    let plan = build_plan(&catalog, &BuilderOptions::new()).unwrap();

    assert!(plan.warnings.is_empty());
    assert!(plan.find("User", "messages_senders").is_some());
}
