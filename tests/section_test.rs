//! Integration tests for section views over loaded documents.

use std::rc::Rc;

use rstest::rstest;

use cfgbind::application::ConfigBinder;
use cfgbind::domain::{ConfigSection, DomainError, TreeNode};
use cfgbind::infrastructure::codec::YamlCodec;
use cfgbind::infrastructure::logger::NoopSink;

const DOC: &str = r#"
app:
  name: demo
  port: "8080"
  ratio: 1.5
  enabled: "TRUE"
  servers:
    - a
    - b
  db:
    user: admin
"#;

fn loaded() -> ConfigSection {
    ConfigBinder::with_deps(Box::new(YamlCodec), Rc::new(NoopSink), false)
        .load(DOC)
        .expect("load")
}

#[test]
fn given_loaded_document_when_descending_then_paths_are_absolute() {
    let root = loaded();

    let db = root.get_section_deep("app.db").expect("db");

    assert_eq!(db.path(), "app.db");
    assert_eq!(db.get_string("user"), Some("admin".to_string()));
    assert_eq!(
        root.get_section("app").and_then(|app| app.get_section("db")).map(|s| s.path().to_string()),
        Some("app.db".to_string())
    );
}

#[rstest]
#[case("app.servers.0")]
#[case("app.name.first")]
#[case("missing.key")]
fn given_non_mapping_or_missing_step_when_get_node_deep_then_none(#[case] key: &str) {
    assert_eq!(loaded().get_node_deep(key), None);
}

#[test]
fn given_text_scalars_when_reading_then_strict_and_best_effort_differ() {
    let app = loaded().get_section("app").expect("app");

    assert_eq!(app.get_int("port"), 0);
    assert_eq!(app.get_optional_int("port"), Some(8080));
    assert_eq!(app.get_as_long("port"), 8080);

    assert!(!app.get_bool("enabled"));
    assert_eq!(app.get_optional_bool("enabled"), Some(true));

    assert_eq!(app.get_double("ratio"), 1.5);
    assert_eq!(app.get_as_string("ratio"), "1.5");
    assert_eq!(app.get_optional_double("name"), None);
    assert_eq!(app.get_as_int("absent"), 0);
}

#[test]
fn given_two_views_of_same_subtree_when_one_mutates_then_other_sees_it() {
    let root = loaded();
    let first = root.get_section_deep("app.db").expect("first");
    let second = root
        .get_section("app")
        .and_then(|app| app.get_section("db"))
        .expect("second");

    first.set("password", "s3cret");

    assert!(second.shares_elements_with(&first));
    assert_eq!(second.get_string("password"), Some("s3cret".to_string()));
    assert_eq!(
        root.get_node_deep("app.db.password"),
        Some(TreeNode::from("s3cret"))
    );
}

#[test]
fn given_scalar_on_path_when_set_deep_then_not_a_mapping_with_absolute_path() {
    let app = loaded().get_section("app").expect("app");

    let err = app.set_deep("name.first", "x").unwrap_err();

    assert!(matches!(err, DomainError::NotAMapping { ref path } if path == "app.name"));
}

#[test]
fn given_deep_lookup_when_walking_up_then_each_level_is_visited() {
    let root = loaded();

    let db = root.get_section_deep("app.db").expect("db");
    let app = db.parent().expect("app");

    assert_eq!(app.path(), "app");
    assert_eq!(app.get_string("name"), Some("demo".to_string()));
    assert_eq!(app.parent().map(|r| r.path().to_string()), Some(String::new()));
}

#[test]
fn given_dropped_parent_when_asking_child_then_parent_is_gone() {
    let child = {
        let root = ConfigSection::root();
        root.create_section("tmp").expect("create")
    };

    assert!(child.parent().is_none());
    assert_eq!(child.path(), "tmp");
}
