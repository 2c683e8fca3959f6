//! Integration tests for the built-in scalar/container resolver.

use std::rc::Rc;

use rstest::rstest;

use cfgbind::application::{ApplicationError, Resolver, ResolverRegistry, UniversalResolver};
use cfgbind::domain::{Bind, EnumValue, Mapping, TreeNode, TypeDesc, Value};
use cfgbind::infrastructure::logger::LogLevel;
use cfgbind::util::testing::RecordingSink;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum Color {
    #[default]
    Red,
    Green,
}

cfgbind::bind_enum!(Color { Red, Green });

fn registry() -> (ResolverRegistry, Rc<RecordingSink>) {
    let sink = Rc::new(RecordingSink::new());
    (ResolverRegistry::with_builtins(sink.clone(), false), sink)
}

fn resolve(ty: &TypeDesc, node: &TreeNode) -> Result<Value, ApplicationError> {
    let (registry, _sink) = registry();
    UniversalResolver::default().resolve(&registry, ty, node, "x")
}

// ============================================================
// scalar coercion
// ============================================================

#[rstest]
#[case(TreeNode::from(42), Value::Int(42))]
#[case(TreeNode::from("42"), Value::Int(42))]
#[case(TreeNode::from(" 7 "), Value::Int(7))]
#[case(TreeNode::from(3.0), Value::Int(3))]
fn given_integer_like_node_when_resolving_int_then_value(
    #[case] node: TreeNode,
    #[case] expected: Value,
) {
    assert_eq!(resolve(&TypeDesc::int(), &node).ok(), Some(expected));
}

#[rstest]
#[case(TreeNode::from("4x"))]
#[case(TreeNode::from(2.5))]
#[case(TreeNode::from(true))]
#[case(TreeNode::from(vec![TreeNode::from(1)]))]
fn given_non_integer_node_when_resolving_int_then_parse_failure(#[case] node: TreeNode) {
    let err = resolve(&TypeDesc::int(), &node).unwrap_err();
    assert!(matches!(err, ApplicationError::ParseFailure { ref path, .. } if path == "x"));
}

#[rstest]
#[case(TreeNode::from(true), true)]
#[case(TreeNode::from("TRUE"), true)]
#[case(TreeNode::from("false"), false)]
fn given_boolean_like_node_when_resolving_bool_then_value(
    #[case] node: TreeNode,
    #[case] expected: bool,
) {
    assert_eq!(resolve(&TypeDesc::bool(), &node).ok(), Some(Value::Bool(expected)));
}

#[test]
fn given_yes_when_resolving_bool_then_parse_failure() {
    let err = resolve(&TypeDesc::bool(), &TreeNode::from("yes")).unwrap_err();
    assert!(matches!(err, ApplicationError::ParseFailure { .. }));
}

#[test]
fn given_small_types_when_resolving_then_range_is_enforced() {
    assert_eq!(
        resolve(&TypeDesc::byte(), &TreeNode::from(127)).ok(),
        Some(Value::Byte(127))
    );
    assert!(resolve(&TypeDesc::byte(), &TreeNode::from(128)).is_err());
    assert_eq!(
        resolve(&TypeDesc::short(), &TreeNode::from("-300")).ok(),
        Some(Value::Short(-300))
    );
}

#[test]
fn given_number_when_resolving_string_then_text_form() {
    assert_eq!(
        resolve(&TypeDesc::string(), &TreeNode::from(8080)).ok(),
        Some(Value::Str("8080".into()))
    );
}

#[test]
fn given_null_when_resolving_required_scalar_then_null_input() {
    let err = resolve(&TypeDesc::long(), &TreeNode::Empty).unwrap_err();
    assert!(matches!(err, ApplicationError::NullInput { ref path } if path == "x"));
}

// ============================================================
// optional, list, map, enum
// ============================================================

#[rstest]
#[case(TreeNode::Empty)]
#[case(TreeNode::from("n/a"))]
fn given_unusable_node_when_resolving_optional_long_then_absent(#[case] node: TreeNode) {
    let ty = <Option<i64>>::type_desc();
    assert_eq!(resolve(&ty, &node).ok(), Some(Value::none()));
}

#[test]
fn given_null_when_resolving_generic_optional_then_absent() {
    let ty = <Option<String>>::type_desc();
    assert_eq!(resolve(&ty, &TreeNode::Empty).ok(), Some(Value::none()));
}

#[test]
fn given_bad_element_when_resolving_list_then_error_names_index() {
    let node = TreeNode::from(vec![TreeNode::from(1), TreeNode::from("two")]);

    let err = resolve(&<Vec<i32>>::type_desc(), &node).unwrap_err();

    assert!(matches!(err, ApplicationError::ParseFailure { ref path, .. } if path == "x[1]"));
}

#[test]
fn given_mapping_when_resolving_map_then_entries_in_document_order() {
    let mut mapping = Mapping::new();
    mapping.insert("b", TreeNode::from(2));
    mapping.insert("a", TreeNode::from(1));

    let value = resolve(
        &TypeDesc::map(TypeDesc::string(), TypeDesc::int()),
        &TreeNode::from(mapping),
    )
    .expect("resolve");

    assert_eq!(
        value,
        Value::Map(vec![
            (Value::Str("b".into()), Value::Int(2)),
            (Value::Str("a".into()), Value::Int(1)),
        ])
    );
}

#[test]
fn given_bare_scalar_when_resolving_map_then_stored_under_empty_key() {
    let value = resolve(&TypeDesc::map_raw(), &TreeNode::from("v")).expect("resolve");

    assert_eq!(
        value,
        Value::Map(vec![(Value::Str(String::new()), Value::Raw(TreeNode::from("v")))])
    );
}

#[rstest]
#[case(TreeNode::from(1), Color::Green)]
#[case(TreeNode::from(1.0), Color::Green)]
#[case(TreeNode::from("Red"), Color::Red)]
fn given_ordinal_or_name_when_resolving_enum_then_case(
    #[case] node: TreeNode,
    #[case] expected: Color,
) {
    let value = resolve(&Color::type_desc(), &node).expect("resolve");
    assert_eq!(Color::from_value(value).ok(), Some(expected));
}

#[test]
fn given_negative_ordinal_when_resolving_enum_then_index_out_of_range() {
    let err = resolve(&Color::type_desc(), &TreeNode::from(-1)).unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::IndexOutOfRange { index: -1, len: 2, .. }
    ));
}

#[test]
fn given_fractional_number_when_resolving_enum_then_parse_failure() {
    let err = resolve(&Color::type_desc(), &TreeNode::from(0.5)).unwrap_err();
    assert!(matches!(err, ApplicationError::ParseFailure { ref raw, .. } if raw == "0.5"));
}

#[test]
fn given_strict_resolver_when_resolving_int_keyed_map_then_keys_are_parsed() {
    let (registry, _sink) = registry();
    let node: TreeNode = serde_yaml::from_str("1: a\n2: b\n").expect("parse");

    let value = UniversalResolver::new(true)
        .resolve(&registry, &TypeDesc::map(TypeDesc::int(), TypeDesc::string()), &node, "x")
        .expect("resolve");

    assert_eq!(
        value,
        Value::Map(vec![
            (Value::Int(1), Value::Str("a".into())),
            (Value::Int(2), Value::Str("b".into())),
        ])
    );
}

#[test]
fn given_strict_resolver_when_map_value_is_text_number_then_parse_failure() {
    let (registry, _sink) = registry();
    let node: TreeNode = serde_yaml::from_str("1: \"7\"\n").expect("parse");

    let err = UniversalResolver::new(true)
        .resolve(&registry, &TypeDesc::map(TypeDesc::int(), TypeDesc::int()), &node, "x")
        .unwrap_err();

    assert!(matches!(err, ApplicationError::ParseFailure { ref path, .. } if path == "x.1"));
}

// ============================================================
// store
// ============================================================

#[test]
fn given_mixed_list_when_storing_then_members_follow_first_type() {
    let (registry, sink) = registry();
    let value = Value::List(vec![Value::Int(1), Value::Str("x".into()), Value::Int(3)]);

    let node = UniversalResolver::default()
        .store(&registry, &TypeDesc::list_raw(), &value, "nums")
        .expect("store");

    assert_eq!(node, TreeNode::from(vec![TreeNode::from(1), TreeNode::from(3)]));
    let records = sink.records();
    assert_eq!(records.len(), 1, "{records:?}");
    assert_eq!(records[0].level, LogLevel::Warning);
    assert_eq!(records[0].path, "nums");
}

#[test]
fn given_enum_value_when_storing_then_case_name() {
    let (registry, _sink) = registry();
    let value = Color::Green.to_value();

    let node = UniversalResolver::default()
        .store(&registry, &Color::type_desc(), &value, "color")
        .expect("store");

    assert_eq!(node, TreeNode::from("Green"));
    assert!(matches!(value, Value::Enum(EnumValue { ordinal: 1, .. })));
}

#[test]
fn given_absent_optional_when_storing_then_null_node() {
    let (registry, _sink) = registry();

    let node = UniversalResolver::default()
        .store(&registry, &<Option<i32>>::type_desc(), &Value::none(), "x")
        .expect("store");

    assert_eq!(node, TreeNode::Empty);
}

#[test]
fn given_value_of_wrong_kind_when_storing_then_unsupported_conversion() {
    let (registry, _sink) = registry();

    let err = UniversalResolver::default()
        .store(&registry, &TypeDesc::int(), &Value::Str("1".into()), "x")
        .unwrap_err();

    assert!(matches!(err, ApplicationError::UnsupportedConversion { .. }));
}
