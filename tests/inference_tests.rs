use serde_json::json;
use sql2rel::catalog::ddl::DdlCatalog;
use sql2rel::error::Error;
use sql2rel::options::BuilderOptions;
use sql2rel::relations::inferencer::build_plan;
use sql2rel::relations::plan::{RelMethod, RelationshipPlan};

fn plan(sql: &str) -> RelationshipPlan {
    let catalog = DdlCatalog::parse(sql).expect("schema should parse");
    build_plan(&catalog, &BuilderOptions::new()).expect("plan should build")
}

#[test]
fn single_column_nullable_fk_yields_belongs_to_and_has_many() {
    let plan = plan(
        "CREATE TABLE author(id INTEGER PRIMARY KEY, name TEXT NOT NULL);
         CREATE TABLE book(
           id INTEGER PRIMARY KEY,
           author_id INTEGER REFERENCES author(id)
         );",
    );

    let author = plan.find("Book", "author").expect("Book.author");
    assert_eq!(author.method, RelMethod::BelongsTo);
    assert_eq!(author.target_source, "Author");
    assert_eq!(
        author.column_map,
        vec![("author_id".to_string(), "id".to_string())]
    );
    assert_eq!(author.attrs["join_type"], json!("LEFT"));
    assert_eq!(author.attrs["on_delete"], json!("CASCADE"));
    assert_eq!(author.attrs["on_update"], json!("CASCADE"));
    assert_eq!(author.attrs["is_deferrable"], json!(true));

    let books = plan.find("Author", "books").expect("Author.books");
    assert_eq!(books.method, RelMethod::HasMany);
    assert_eq!(books.target_source, "Book");
    assert_eq!(
        books.column_map,
        vec![("id".to_string(), "author_id".to_string())]
    );
    assert_eq!(books.attrs["cascade_delete"], json!(false));
    assert_eq!(books.attrs["cascade_copy"], json!(false));

    assert!(plan.warnings.is_empty());
}

#[test]
fn multi_column_fk_names_after_the_remote_table() {
    let plan = plan(
        r#"CREATE TABLE "order"(id INTEGER PRIMARY KEY);
           CREATE TABLE order_line(
             order_id INTEGER,
             line_no INTEGER,
             PRIMARY KEY (order_id, line_no),
             FOREIGN KEY (order_id) REFERENCES "order"(id)
           );"#,
    );

    let rel = plan.find("OrderLine", "order").expect("OrderLine.order");
    assert_eq!(rel.method, RelMethod::BelongsTo);

    let rel = plan.find("Order", "order_lines").expect("Order.order_lines");
    assert_eq!(rel.method, RelMethod::HasMany);
}

#[test]
fn unique_fk_yields_might_have_with_singular_name() {
    let plan = plan(
        r#"CREATE TABLE "user"(id INTEGER PRIMARY KEY);
           CREATE TABLE profile(
             id INTEGER PRIMARY KEY,
             user_id INTEGER NOT NULL UNIQUE REFERENCES "user"(id)
           );"#,
    );

    let rel = plan.find("Profile", "user").expect("Profile.user");
    assert_eq!(rel.method, RelMethod::BelongsTo);
    assert!(!rel.attrs.contains_key("join_type"));

    let rel = plan.find("User", "profile").expect("User.profile");
    assert_eq!(rel.method, RelMethod::MightHave);
    assert_eq!(rel.target_source, "Profile");
}

#[test]
fn fk_matching_the_whole_primary_key_yields_might_have() {
    let plan = plan(
        "CREATE TABLE account(id INTEGER PRIMARY KEY);
         CREATE TABLE account_settings(
           account_id INTEGER PRIMARY KEY REFERENCES account(id)
         );",
    );

    let rel = plan
        .find("Account", "account_setting")
        .expect("Account.account_setting");
    assert_eq!(rel.method, RelMethod::MightHave);
}

#[test]
fn parallel_edges_disambiguate_by_column_names() {
    let plan = plan(
        "CREATE TABLE users(id INTEGER PRIMARY KEY);
         CREATE TABLE message(
           id INTEGER PRIMARY KEY,
           sender_id INTEGER NOT NULL REFERENCES users(id),
           recipient_id INTEGER NOT NULL REFERENCES users(id)
         );",
    );

    assert!(plan.find("Message", "sender").is_some());
    assert!(plan.find("Message", "recipient").is_some());
    assert!(plan.find("User", "messages_senders").is_some());
    assert!(plan.find("User", "messages_recipients").is_some());
    assert_eq!(plan.relationships_of("User").len(), 2);
    assert!(plan.warnings.is_empty());
}

#[test]
fn every_foreign_key_appears_in_exactly_two_provenances() {
    let plan = plan(
        "CREATE TABLE team(id INTEGER PRIMARY KEY);
         CREATE TABLE player(
           id INTEGER PRIMARY KEY,
           team_id INTEGER NOT NULL REFERENCES team(id)
         );
         CREATE TABLE coach(
           id INTEGER PRIMARY KEY,
           team_id INTEGER NOT NULL UNIQUE REFERENCES team(id)
         );",
    );

    let mut by_fk: std::collections::BTreeMap<String, Vec<RelMethod>> =
        std::collections::BTreeMap::new();
    for rels in plan.relationships.values() {
        for rel in rels {
            by_fk
                .entry(format!(
                    "{}:{:?}",
                    rel.provenance.origin_fk.local_table, rel.provenance.origin_fk.local_columns
                ))
                .or_default()
                .push(rel.method);
        }
    }

    assert_eq!(by_fk.len(), 2);
    for (fk, mut methods) in by_fk {
        methods.sort_by_key(|m| m.to_string());
        assert_eq!(methods.len(), 2, "fk {fk} should produce two records");
        assert_eq!(methods[0], RelMethod::BelongsTo, "fk {fk}");
        assert!(
            matches!(methods[1], RelMethod::HasMany | RelMethod::MightHave),
            "fk {fk}"
        );
    }
}

#[test]
fn relationship_names_are_unique_per_source() {
    let plan = plan(
        r#"CREATE TABLE orders(id INTEGER PRIMARY KEY);
           CREATE TABLE order_line(
             id INTEGER PRIMARY KEY,
             order_id INTEGER NOT NULL REFERENCES orders(id)
           );
           CREATE TABLE "OrderLine"(
             id INTEGER PRIMARY KEY,
             order_id INTEGER NOT NULL REFERENCES orders(id)
           );"#,
    );

    for (moniker, rels) in &plan.relationships {
        let mut names: Vec<&str> = rels.iter().map(|r| r.name.as_str()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total, "duplicate names on {moniker}");
    }
}

#[test]
fn column_count_mismatch_is_fatal() {
    let catalog = DdlCatalog::parse(
        "CREATE TABLE t(x INTEGER PRIMARY KEY);
         CREATE TABLE s(
           a INTEGER,
           b INTEGER,
           FOREIGN KEY (a, b) REFERENCES t(x)
         );",
    )
    .expect("schema should parse");

    let err = build_plan(&catalog, &BuilderOptions::new())
        .expect_err("mismatched foreign key should be fatal");
    match err {
        Error::SchemaMismatch {
            local_table,
            local_columns,
            remote_table,
            remote_columns,
        } => {
            assert_eq!(local_table, "s");
            assert_eq!(local_columns, vec!["a".to_string(), "b".to_string()]);
            assert_eq!(remote_table, "t");
            assert_eq!(remote_columns, vec!["x".to_string()]);
        }
        other => panic!("expected SchemaMismatch, got: {other}"),
    }
}

#[test]
fn self_referential_table_gets_both_sides() {
    let plan = plan(
        "CREATE TABLE employee(
           id INTEGER PRIMARY KEY,
           manager_id INTEGER REFERENCES employee(id)
         );",
    );

    let manager = plan.find("Employee", "manager").expect("Employee.manager");
    assert_eq!(manager.method, RelMethod::BelongsTo);
    assert_eq!(manager.target_source, "Employee");

    let reports = plan.find("Employee", "employees").expect("Employee.employees");
    assert_eq!(reports.method, RelMethod::HasMany);
}

#[test]
fn belongs_to_name_comes_from_column_even_without_id_suffix() {
    let plan = plan(
        "CREATE TABLE category(id INTEGER PRIMARY KEY);
         CREATE TABLE item(
           id INTEGER PRIMARY KEY,
           category INTEGER NOT NULL,
           FOREIGN KEY (category) REFERENCES category(id)
         );",
    );

    // The column has no `_id` suffix but it still collides with the column
    // itself, so the accessor gets the `_rel` suffix and a warning.
    assert!(plan.find("Item", "category_rel").is_some());
    assert_eq!(plan.warnings.len(), 1);
}
