//! Generic document tree: scalars, sequences and ordered mappings.
//!
//! Mapping nodes are reference counted so that section views and their
//! parents observe each other's mutations.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use itertools::Itertools;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::domain::error::{DomainError, DomainResult};

/// Separator between the tokens of a dotted path.
pub const PATH_SEPARATOR: char = '.';

/// Key toml uses to smuggle datetimes through `deserialize_any`.
const TOML_DATETIME_KEY: &str = "$__toml_private_datetime";

/// Mapping shared between a section view and every other view of the same subtree.
pub type SharedMapping = Rc<RefCell<Mapping>>;

/// Append `key` to an absolute dotted path. The root path is the empty string.
pub fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}{PATH_SEPARATOR}{key}")
    }
}

/// Raw scalar value as produced by the document parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// String representation used for best-effort coercion.
    pub fn text(&self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Str(s) => s.clone(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "bool",
            Scalar::Int(_) => "int",
            Scalar::Float(_) => "float",
            Scalar::Str(_) => "string",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Scalar::Int(_) | Scalar::Float(_))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

/// Parse `true`/`false` ignoring ASCII case.
pub fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Ordered string-keyed map. Iteration follows insertion order; replacing
/// an existing key keeps its position.
///
/// `indices` maps each key to its slot in `entries`.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    entries: Vec<(String, TreeNode)>,
    indices: HashMap<String, usize>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            indices: HashMap::with_capacity(capacity),
        }
    }

    pub fn shared(self) -> SharedMapping {
        Rc::new(RefCell::new(self))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.indices.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&TreeNode> {
        let index = *self.indices.get(key)?;
        self.entries.get(index).map(|(_, v)| v)
    }

    /// Insert or replace; returns the prior value.
    pub fn insert(&mut self, key: impl Into<String>, value: TreeNode) -> Option<TreeNode> {
        let key = key.into();
        if let Some(&index) = self.indices.get(&key) {
            return Some(std::mem::replace(&mut self.entries[index].1, value));
        }
        self.indices.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Remove `key`, shifting later entries down to keep the order.
    pub fn remove(&mut self, key: &str) -> Option<TreeNode> {
        let index = self.indices.remove(key)?;
        let (_, value) = self.entries.remove(index);
        for (k, _) in &self.entries[index..] {
            if let Some(slot) = self.indices.get_mut(k) {
                *slot -= 1;
            }
        }
        Some(value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TreeNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert under a dotted key, creating intermediate mappings as needed.
    ///
    /// Fails if an intermediate token already holds a non-mapping node.
    pub fn insert_deep(&mut self, key: &str, value: TreeNode) -> DomainResult<Option<TreeNode>> {
        let tokens: Vec<&str> = key
            .split(PATH_SEPARATOR)
            .filter(|t| !t.is_empty())
            .collect();
        match tokens.split_last() {
            None => Ok(None),
            Some((last, parents)) => insert_path(self, "", parents, last, value),
        }
    }
}

fn insert_path(
    map: &mut Mapping,
    path: &str,
    parents: &[&str],
    last: &str,
    value: TreeNode,
) -> DomainResult<Option<TreeNode>> {
    let Some((head, rest)) = parents.split_first() else {
        return Ok(map.insert(last, value));
    };
    let head_path = join_path(path, head);
    if !map.contains_key(head) {
        map.insert(*head, TreeNode::mapping());
    }
    match map.get(head) {
        Some(TreeNode::Mapping(child)) => {
            let child = Rc::clone(child);
            let mut child = child.borrow_mut();
            insert_path(&mut child, &head_path, rest, last, value)
        }
        _ => Err(DomainError::NotAMapping { path: head_path }),
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl FromIterator<(String, TreeNode)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (String, TreeNode)>>(iter: I) -> Self {
        let mut map = Mapping::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// A parsed document value.
///
/// The variant of a node never changes once it is created; mutation
/// happens by replacing children inside a mapping or sequence.
#[derive(Debug, Clone, Default)]
pub enum TreeNode {
    #[default]
    Empty,
    Scalar(Scalar),
    Sequence(Vec<TreeNode>),
    Mapping(SharedMapping),
}

impl TreeNode {
    /// Fresh, unshared empty mapping node.
    pub fn mapping() -> Self {
        TreeNode::Mapping(Mapping::new().shared())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TreeNode::Empty)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, TreeNode::Scalar(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, TreeNode::Sequence(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, TreeNode::Mapping(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            TreeNode::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[TreeNode]> {
        match self {
            TreeNode::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Shared handle to the backing mapping, if this is a mapping node.
    pub fn as_mapping(&self) -> Option<SharedMapping> {
        match self {
            TreeNode::Mapping(map) => Some(Rc::clone(map)),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            TreeNode::Empty => "null",
            TreeNode::Scalar(s) => s.kind_name(),
            TreeNode::Sequence(_) => "sequence",
            TreeNode::Mapping(_) => "mapping",
        }
    }

    /// Copy of this node whose mappings are no longer shared with the original.
    pub fn detached(&self) -> TreeNode {
        match self {
            TreeNode::Sequence(items) => {
                TreeNode::Sequence(items.iter().map(TreeNode::detached).collect())
            }
            TreeNode::Mapping(map) => TreeNode::Mapping(
                map.borrow()
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.detached()))
                    .collect::<Mapping>()
                    .shared(),
            ),
            other => other.clone(),
        }
    }
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TreeNode::Empty, TreeNode::Empty) => true,
            (TreeNode::Scalar(a), TreeNode::Scalar(b)) => a == b,
            (TreeNode::Sequence(a), TreeNode::Sequence(b)) => a == b,
            (TreeNode::Mapping(a), TreeNode::Mapping(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            _ => false,
        }
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeNode::Empty => write!(f, "null"),
            TreeNode::Scalar(s) => write!(f, "{s}"),
            TreeNode::Sequence(items) => write!(f, "[{}]", items.iter().join(", ")),
            TreeNode::Mapping(map) => {
                let joined = map
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .join(", ");
                write!(f, "{{{joined}}}")
            }
        }
    }
}

impl From<Scalar> for TreeNode {
    fn from(value: Scalar) -> Self {
        TreeNode::Scalar(value)
    }
}

impl From<bool> for TreeNode {
    fn from(value: bool) -> Self {
        TreeNode::Scalar(Scalar::Bool(value))
    }
}

impl From<i32> for TreeNode {
    fn from(value: i32) -> Self {
        TreeNode::Scalar(Scalar::Int(i64::from(value)))
    }
}

impl From<i64> for TreeNode {
    fn from(value: i64) -> Self {
        TreeNode::Scalar(Scalar::Int(value))
    }
}

impl From<f64> for TreeNode {
    fn from(value: f64) -> Self {
        TreeNode::Scalar(Scalar::Float(value))
    }
}

impl From<&str> for TreeNode {
    fn from(value: &str) -> Self {
        TreeNode::Scalar(Scalar::Str(value.to_string()))
    }
}

impl From<String> for TreeNode {
    fn from(value: String) -> Self {
        TreeNode::Scalar(Scalar::Str(value))
    }
}

impl From<Vec<TreeNode>> for TreeNode {
    fn from(value: Vec<TreeNode>) -> Self {
        TreeNode::Sequence(value)
    }
}

impl From<Mapping> for TreeNode {
    fn from(value: Mapping) -> Self {
        TreeNode::Mapping(value.shared())
    }
}

// ============================================================
// serde: lets any self-describing format act as the document codec
// ============================================================

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::Float(f) => serializer.serialize_f64(*f),
            Scalar::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for TreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TreeNode::Empty => serializer.serialize_unit(),
            TreeNode::Scalar(s) => s.serialize(serializer),
            TreeNode::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            TreeNode::Mapping(map) => {
                let map = map.borrow();
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

/// Mapping key accepted from any scalar (YAML allows `1: x` or `true: y`).
struct MapKey(String);

impl<'de> Deserialize<'de> for MapKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl<'de> Visitor<'de> for KeyVisitor {
            type Value = MapKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a scalar mapping key")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<MapKey, E> {
                Ok(MapKey(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<MapKey, E> {
                Ok(MapKey(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<MapKey, E> {
                Ok(MapKey(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<MapKey, E> {
                Ok(MapKey(v.to_string()))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<MapKey, E> {
                Ok(MapKey(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<MapKey, E> {
                Ok(MapKey(v))
            }

            fn visit_unit<E: de::Error>(self) -> Result<MapKey, E> {
                Ok(MapKey("null".to_string()))
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = TreeNode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a document node")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<TreeNode, E> {
        Ok(TreeNode::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<TreeNode, E> {
        Ok(TreeNode::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<TreeNode, E> {
        Ok(match i64::try_from(v) {
            Ok(i) => TreeNode::from(i),
            Err(_) => TreeNode::from(v as f64),
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<TreeNode, E> {
        Ok(TreeNode::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<TreeNode, E> {
        Ok(TreeNode::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<TreeNode, E> {
        Ok(TreeNode::from(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<TreeNode, E> {
        Ok(TreeNode::Empty)
    }

    fn visit_none<E: de::Error>(self) -> Result<TreeNode, E> {
        Ok(TreeNode::Empty)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<TreeNode, D::Error> {
        TreeNode::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<TreeNode, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<TreeNode>()? {
            items.push(item);
        }
        Ok(TreeNode::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<TreeNode, A::Error> {
        let mut map = Mapping::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(MapKey(key)) = access.next_key::<MapKey>()? {
            let value = access.next_value::<TreeNode>()?;
            map.insert(key, value);
        }
        if map.len() == 1 {
            if let Some(TreeNode::Scalar(stamp)) = map.get(TOML_DATETIME_KEY) {
                return Ok(TreeNode::from(stamp.text()));
            }
        }
        Ok(TreeNode::from(map))
    }
}

impl<'de> Deserialize<'de> for TreeNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}
