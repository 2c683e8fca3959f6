//! Integration tests for the binder facade: files, formats and round trips.

use std::collections::BTreeMap;
use std::fs;
use std::rc::Rc;

use tempfile::TempDir;

use cfgbind::application::{ApplicationError, ConfigBinder};
use cfgbind::config::Settings;
use cfgbind::domain::{DomainError, Entry, SchemaBuilder, TreeNode};
use cfgbind::infrastructure::codec::{DocumentFormat, TomlCodec, YamlCodec};
use cfgbind::infrastructure::traits::RealFileSystem;
use cfgbind::util::testing::{init_test_setup, RecordingSink};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum Level {
    #[default]
    Low,
    High,
}

cfgbind::bind_enum!(Level { Low, High });

#[derive(Debug, Default, PartialEq)]
struct Database {
    url: String,
    pool: i64,
}

impl Entry for Database {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema
            .field("url", |d| &d.url, |d| &mut d.url)
            .field("pool", |d| &d.pool, |d| &mut d.pool);
    }
}

#[derive(Debug, Default, PartialEq)]
struct Service {
    name: String,
    ratio: f64,
    level: Level,
    hosts: Vec<String>,
    timeout: Option<i32>,
    database: Database,
}

impl Entry for Service {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema
            .field("name", |s| &s.name, |s| &mut s.name)
            .field("ratio", |s| &s.ratio, |s| &mut s.ratio)
            .field("level", |s| &s.level, |s| &mut s.level)
            .field("hosts", |s| &s.hosts, |s| &mut s.hosts)
            .field("timeout", |s| &s.timeout, |s| &mut s.timeout)
            .entry("database", |s| &s.database, |s| &mut s.database);
    }
}

fn sample() -> Service {
    Service {
        name: "billing".into(),
        ratio: 0.5,
        level: Level::High,
        hosts: vec!["a.local".into(), "b.local".into()],
        timeout: Some(30),
        database: Database {
            url: "postgres://db".into(),
            pool: 8,
        },
    }
}

fn yaml_binder() -> (ConfigBinder, Rc<RecordingSink>) {
    init_test_setup();
    let sink = Rc::new(RecordingSink::new());
    (
        ConfigBinder::with_deps(Box::new(YamlCodec), sink.clone(), false),
        sink,
    )
}

// ============================================================
// round trips
// ============================================================

#[test]
fn given_typed_value_when_dumped_and_loaded_as_yaml_then_equal() {
    let (binder, sink) = yaml_binder();

    let text = binder.dump_as(&sample()).expect("dump");
    let back: Service = binder.load_as(&text).expect("load");

    assert_eq!(back, sample());
    assert!(sink.warnings().is_empty(), "{:?}", sink.warnings());
}

#[test]
fn given_typed_value_when_dumped_and_loaded_as_toml_then_equal() {
    init_test_setup();
    let sink = Rc::new(RecordingSink::new());
    let binder = ConfigBinder::with_deps(Box::new(TomlCodec), sink.clone(), false);

    let text = binder.dump_as(&sample()).expect("dump");
    assert!(text.contains("[database]"), "{text}");

    let back: Service = binder.load_as(&text).expect("load");
    assert_eq!(back, sample());
}

#[test]
fn given_absent_optional_when_dumped_as_toml_then_key_omitted() {
    init_test_setup();
    let binder = ConfigBinder::with_deps(Box::new(TomlCodec), Rc::new(RecordingSink::new()), false);
    let mut service = sample();
    service.timeout = None;

    let text = binder.dump_as(&service).expect("dump");

    assert!(!text.contains("timeout"), "{text}");
}

#[test]
fn given_stored_value_when_inspecting_section_then_native_scalars() {
    let (binder, _sink) = yaml_binder();

    let section = binder.store(&sample()).expect("store");

    assert_eq!(section.path(), "");
    assert_eq!(section.get_node("ratio"), Some(TreeNode::from(0.5)));
    assert_eq!(section.get_string("level"), Some("High".to_string()));
    assert_eq!(section.get_long("database.pool"), 0);
    assert_eq!(
        section.get_section("database").map(|db| db.get_long("pool")),
        Some(8)
    );
}

// ============================================================
// files
// ============================================================

#[test]
fn given_toml_file_when_yaml_binder_loads_then_format_follows_extension() {
    let (binder, _sink) = yaml_binder();
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("service.toml");
    fs::write(
        &path,
        "name = \"billing\"\nratio = 0.5\nlevel = \"Low\"\nhosts = []\n\n[database]\nurl = \"x\"\npool = 2\n",
    )
    .expect("write");

    let section = binder.load_file(&RealFileSystem, &path).expect("load");
    let service: Service = binder.resolve(&section).expect("resolve");

    assert_eq!(service.database.pool, 2);
    assert_eq!(service.level, Level::Low);
    assert!(service.hosts.is_empty());
    assert_eq!(service.timeout, None);
}

#[test]
fn given_section_when_dumped_to_nested_path_then_parent_created_and_readable() {
    let (binder, _sink) = yaml_binder();
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("out").join("service.yaml");
    let section = binder.store(&sample()).expect("store");

    binder
        .dump_file(&RealFileSystem, &section, &path)
        .expect("dump");

    let reloaded = binder.load_file(&RealFileSystem, &path).expect("reload");
    assert_eq!(binder.resolve::<Service>(&reloaded).expect("resolve"), sample());
}

#[test]
fn given_missing_file_when_loading_then_operation_failed_with_path() {
    let (binder, _sink) = yaml_binder();
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("absent.yaml");

    let err = binder.load_file(&RealFileSystem, &path).unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn given_sequence_root_when_loading_then_not_a_mapping() {
    let (binder, _sink) = yaml_binder();

    let err = binder.load("- a\n- b\n").unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::NotAMapping { ref path }) if path.is_empty()
    ));
}

#[test]
fn given_reader_and_writer_when_round_tripping_then_text_preserved() {
    let (binder, _sink) = yaml_binder();

    let section = binder.load_reader("a: 1\nb:\n  c: two\n".as_bytes()).expect("load");
    let mut out = Vec::new();
    binder.dump_to(&section, &mut out).expect("dump");

    let text = String::from_utf8(out).expect("utf8");
    let again = binder.load(&text).expect("reload");
    assert_eq!(again.get_node_deep("b.c"), Some(TreeNode::from("two")));
    assert_eq!(again.keys(), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn given_settings_when_building_binder_then_format_and_strictness_applied() {
    init_test_setup();
    let settings = Settings {
        format: DocumentFormat::Toml,
        strict_scalars: true,
    };

    let binder = ConfigBinder::new(&settings);

    assert_eq!(binder.format(), DocumentFormat::Toml);
    let db: Database = binder.load_as("url = \"x\"\npool = \"4\"\n").expect("load");
    assert_eq!(db.pool, 0);
}

#[derive(Debug, Default, PartialEq)]
struct Ports {
    by_id: BTreeMap<i32, String>,
}

impl Entry for Ports {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.field("by_id", |p| &p.by_id, |p| &mut p.by_id);
    }
}

#[test]
fn given_strict_binder_when_loading_int_keyed_map_then_entries_resolved() {
    init_test_setup();
    let sink = Rc::new(RecordingSink::new());
    let binder = ConfigBinder::with_deps(Box::new(YamlCodec), sink.clone(), true);

    let ports: Ports = binder.load_as("by_id:\n  1: a\n  2: b\n").expect("load");

    assert_eq!(
        ports.by_id,
        BTreeMap::from([(1, "a".to_string()), (2, "b".to_string())])
    );
    assert!(sink.warnings().is_empty(), "{:?}", sink.warnings());
}
