use std::fs;

fn read(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"))
}

#[test]
fn id_suffix_stripping_has_single_source_of_truth() {
    let files = [
        "src/catalog/names.rs",
        "src/relations/inferencer.rs",
        "src/relations/resolver.rs",
    ];

    let definitions = files
        .iter()
        .map(|path| read(path).matches("fn strip_id_suffix(").count())
        .sum::<usize>();

    assert_eq!(
        definitions, 1,
        "expected a single `_id`-stripping implementation, found {definitions}"
    );
}

#[test]
fn accessor_collision_check_has_single_source_of_truth() {
    let files = [
        "src/relations/resolver.rs",
        "src/relations/inferencer.rs",
        "src/moniker.rs",
    ];

    let definitions = files
        .iter()
        .map(|path| read(path).matches("fn resolve_method_collision(").count())
        .sum::<usize>();

    assert_eq!(
        definitions, 1,
        "expected a single collision-resolution implementation, found {definitions}"
    );
}

#[test]
fn marker_region_constants_are_centralized() {
    let existing = read("src/relations/existing.rs");
    assert_eq!(existing.matches("\"# relations begin\"").count(), 1);
    assert_eq!(existing.matches("\"# relations end\"").count(), 1);

    // The formatter must reuse the constants rather than repeat the literals.
    let formatter = read("src/output/formatter.rs");
    assert_eq!(formatter.matches("# relations begin").count(), 0);
    assert!(formatter.contains("REGION_BEGIN"));
    assert!(formatter.contains("REGION_END"));
}

#[test]
fn suffix_budget_is_defined_once() {
    let resolver = read("src/relations/resolver.rs");
    assert_eq!(resolver.matches("const SUFFIX_BUDGET").count(), 1);

    let inferencer = read("src/relations/inferencer.rs");
    assert_eq!(inferencer.matches("const SUFFIX_BUDGET").count(), 0);
}

#[test]
fn english_rule_tables_live_in_the_rules_module_only() {
    let files = ["src/inflect/mod.rs", "src/moniker.rs", "src/relations/resolver.rs"];
    for path in files {
        let source = read(path);
        assert!(
            !source.contains("IRREGULARS"),
            "{path} should rely on inflect::rules instead of its own tables"
        );
    }
}
