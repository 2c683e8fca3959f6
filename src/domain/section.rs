//! Navigable views over mapping nodes.
//!
//! A [`ConfigSection`] does not own its data: it shares the backing
//! [`Mapping`] with its parent and with every other view of the same
//! subtree, so a write through one view is visible through all of them.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{
    join_path, parse_bool, Mapping, Scalar, SharedMapping, TreeNode, PATH_SEPARATOR,
};

/// Back-reference to the mapping a section was reached from.
///
/// Holds the ancestor mapping weakly: the tree keeps it alive, not the
/// (possibly temporary) view that produced the child.
struct ParentLink {
    elements: Weak<RefCell<Mapping>>,
    path: String,
    parent: Option<Rc<ParentLink>>,
}

struct SectionInner {
    parent: Option<Rc<ParentLink>>,
    elements: SharedMapping,
    path: String,
}

/// Cursor over a mapping node with a cached absolute dotted path.
#[derive(Clone)]
pub struct ConfigSection {
    inner: Rc<SectionInner>,
}

impl ConfigSection {
    /// Empty root section (path `""`, no parent).
    pub fn root() -> Self {
        Self::from_mapping(Mapping::new().shared(), "")
    }

    /// Parentless view over an existing mapping.
    pub fn from_mapping(elements: SharedMapping, path: impl Into<String>) -> Self {
        Self::with_link(None, elements, path.into())
    }

    fn with_link(parent: Option<Rc<ParentLink>>, elements: SharedMapping, path: String) -> Self {
        Self {
            inner: Rc::new(SectionInner {
                parent,
                elements,
                path,
            }),
        }
    }

    fn child(&self, elements: SharedMapping, path: String) -> Self {
        let link = ParentLink {
            elements: Rc::downgrade(&self.inner.elements),
            path: self.inner.path.clone(),
            parent: self.inner.parent.clone(),
        };
        Self::with_link(Some(Rc::new(link)), elements, path)
    }

    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// View of the enclosing mapping, while the tree holding it is alive.
    pub fn parent(&self) -> Option<ConfigSection> {
        let link = self.inner.parent.as_ref()?;
        let elements = link.elements.upgrade()?;
        Some(Self::with_link(link.parent.clone(), elements, link.path.clone()))
    }

    /// Shared handle to the backing mapping.
    pub fn elements(&self) -> SharedMapping {
        Rc::clone(&self.inner.elements)
    }

    /// Mapping node sharing this section's backing map.
    pub fn to_node(&self) -> TreeNode {
        TreeNode::Mapping(self.elements())
    }

    /// True when both views are backed by the same mapping.
    pub fn shares_elements_with(&self, other: &ConfigSection) -> bool {
        Rc::ptr_eq(&self.inner.elements, &other.inner.elements)
    }

    // ------------------------------------------------------------------
    // structure
    // ------------------------------------------------------------------

    /// Insert a new empty mapping under `key` and return a view of it.
    pub fn create_section(&self, key: &str) -> DomainResult<ConfigSection> {
        let mut elements = self.inner.elements.borrow_mut();
        if elements.contains_key(key) {
            return Err(DomainError::Structural {
                key: key.to_string(),
                path: self.path().to_string(),
            });
        }
        let child = Mapping::new().shared();
        elements.insert(key, TreeNode::Mapping(Rc::clone(&child)));
        Ok(self.child(child, join_path(self.path(), key)))
    }

    pub fn get_section(&self, key: &str) -> Option<ConfigSection> {
        let map = self.get_node(key)?.as_mapping()?;
        Some(self.child(map, join_path(self.path(), key)))
    }

    pub fn get_section_deep(&self, dotted_key: &str) -> Option<ConfigSection> {
        tokens(dotted_key).try_fold(self.clone(), |section, token| section.get_section(token))
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.inner.elements.borrow().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner
            .elements
            .borrow()
            .keys()
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.elements.borrow().is_empty()
    }

    // ------------------------------------------------------------------
    // mutation
    // ------------------------------------------------------------------

    /// Store `value` under `key`, returning the prior node.
    ///
    /// Passing a section stores its backing mapping, not a copy.
    pub fn set(&self, key: &str, value: impl Into<TreeNode>) -> Option<TreeNode> {
        self.inner.elements.borrow_mut().insert(key, value.into())
    }

    /// Store under a dotted key, creating intermediate mappings.
    pub fn set_deep(&self, dotted_key: &str, value: impl Into<TreeNode>) -> DomainResult<()> {
        self.inner
            .elements
            .borrow_mut()
            .insert_deep(dotted_key, value.into())
            .map(|_| ())
            .map_err(|e| match e {
                DomainError::NotAMapping { path } => DomainError::NotAMapping {
                    path: join_path(self.path(), &path),
                },
                other => other,
            })
    }

    pub fn remove(&self, key: &str) -> Option<TreeNode> {
        self.inner.elements.borrow_mut().remove(key)
    }

    // ------------------------------------------------------------------
    // lookup
    // ------------------------------------------------------------------

    pub fn get_node(&self, key: &str) -> Option<TreeNode> {
        self.inner.elements.borrow().get(key).cloned()
    }

    /// Descend token by token through mapping nodes.
    ///
    /// Returns `None` at the first missing child or non-mapping parent.
    pub fn get_node_deep(&self, dotted_key: &str) -> Option<TreeNode> {
        let mut current = self.to_node();
        for token in tokens(dotted_key) {
            let next = match &current {
                TreeNode::Mapping(map) => map.borrow().get(token).cloned(),
                _ => None,
            };
            current = next?;
        }
        Some(current)
    }

    fn scalar(&self, key: &str) -> Option<Scalar> {
        match self.get_node(key)? {
            TreeNode::Scalar(s) => Some(s),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // strict getters: exact scalar kind only, zero value otherwise
    // ------------------------------------------------------------------

    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.scalar(key)? {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> i32 {
        match self.scalar(key) {
            Some(Scalar::Int(i)) => i32::try_from(i).unwrap_or_default(),
            _ => 0,
        }
    }

    pub fn get_long(&self, key: &str) -> i64 {
        match self.scalar(key) {
            Some(Scalar::Int(i)) => i,
            _ => 0,
        }
    }

    pub fn get_double(&self, key: &str) -> f64 {
        match self.scalar(key) {
            Some(Scalar::Float(f)) => f,
            Some(Scalar::Int(i)) => i as f64,
            _ => 0.0,
        }
    }

    pub fn get_bool(&self, key: &str) -> bool {
        matches!(self.scalar(key), Some(Scalar::Bool(true)))
    }

    // ------------------------------------------------------------------
    // best-effort getters: fall back to parsing the text form
    // ------------------------------------------------------------------

    pub fn get_optional_string(&self, key: &str) -> Option<String> {
        self.scalar(key).map(|s| s.text())
    }

    pub fn get_optional_int(&self, key: &str) -> Option<i32> {
        match self.scalar(key)? {
            Scalar::Int(i) => i32::try_from(i).ok(),
            other => other.text().trim().parse().ok(),
        }
    }

    pub fn get_optional_long(&self, key: &str) -> Option<i64> {
        match self.scalar(key)? {
            Scalar::Int(i) => Some(i),
            other => other.text().trim().parse().ok(),
        }
    }

    pub fn get_optional_double(&self, key: &str) -> Option<f64> {
        match self.scalar(key)? {
            Scalar::Float(f) => Some(f),
            Scalar::Int(i) => Some(i as f64),
            other => other.text().trim().parse().ok(),
        }
    }

    pub fn get_optional_bool(&self, key: &str) -> Option<bool> {
        match self.scalar(key)? {
            Scalar::Bool(b) => Some(b),
            other => parse_bool(&other.text()),
        }
    }

    pub fn get_as_string(&self, key: &str) -> String {
        self.get_optional_string(key).unwrap_or_default()
    }

    pub fn get_as_int(&self, key: &str) -> i32 {
        self.get_optional_int(key).unwrap_or_default()
    }

    pub fn get_as_long(&self, key: &str) -> i64 {
        self.get_optional_long(key).unwrap_or_default()
    }

    pub fn get_as_double(&self, key: &str) -> f64 {
        self.get_optional_double(key).unwrap_or_default()
    }

    pub fn get_as_bool(&self, key: &str) -> bool {
        self.get_optional_bool(key).unwrap_or_default()
    }
}

fn tokens(dotted_key: &str) -> impl Iterator<Item = &str> {
    dotted_key.split(PATH_SEPARATOR).filter(|t| !t.is_empty())
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Debug for ConfigSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigSection")
            .field("path", &self.inner.path)
            .field("elements", &*self.inner.elements.borrow())
            .finish()
    }
}

impl fmt::Display for ConfigSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_node())
    }
}

impl From<&ConfigSection> for TreeNode {
    fn from(section: &ConfigSection) -> Self {
        section.to_node()
    }
}

impl From<ConfigSection> for TreeNode {
    fn from(section: ConfigSection) -> Self {
        section.to_node()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_root_when_creating_nested_sections_then_paths_accumulate() {
        let root = ConfigSection::root();
        let b = root
            .create_section("a")
            .and_then(|a| a.create_section("b"))
            .expect("create");

        assert_eq!(b.path(), "a.b");
        assert_eq!(b.parent().map(|p| p.path().to_string()), Some("a".to_string()));
    }

    #[test]
    fn given_intermediate_view_dropped_when_walking_up_then_ancestors_resolve() {
        let root = ConfigSection::root();
        root.set_deep("a.b.c", 1).expect("set");
        let b = root
            .get_section("a")
            .and_then(|a| a.get_section("b"))
            .expect("b");

        let a = b.parent().expect("a");
        let top = a.parent().expect("root");

        assert_eq!(a.path(), "a");
        assert!(a.get_section("b").is_some_and(|v| v.shares_elements_with(&b)));
        assert_eq!(top.path(), "");
        assert!(top.shares_elements_with(&root));
        assert!(top.parent().is_none());
    }

    #[test]
    fn given_existing_key_when_create_section_then_structural_error() {
        let root = ConfigSection::root();
        root.create_section("x").expect("first");

        let err = root.create_section("x").unwrap_err();
        assert!(matches!(err, DomainError::Structural { ref key, .. } if key == "x"));
    }

    #[test]
    fn given_child_view_when_mutating_then_parent_observes_change() {
        let root = ConfigSection::root();
        root.create_section("db").expect("create");
        let db = root.get_section("db").expect("view");

        db.set("port", 5432);

        assert_eq!(root.get_node_deep("db.port"), Some(TreeNode::from(5432)));
    }

    #[test]
    fn given_section_value_when_set_then_backing_map_is_shared() {
        let root = ConfigSection::root();
        let other = ConfigSection::root();
        root.set("shared", &other);

        other.set("k", "v");

        let view = root.get_section("shared").expect("view");
        assert!(view.shares_elements_with(&other));
        assert_eq!(view.get_string("k"), Some("v".to_string()));
    }

    #[test]
    fn given_scalar_in_path_when_get_node_deep_then_none() {
        let root = ConfigSection::root();
        root.set_deep("a.b", "leaf").expect("set");

        assert_eq!(root.get_node_deep("a.b.c"), None);
        assert!(root.get_section_deep("a.b").is_none());
    }

    #[test]
    fn given_string_number_when_strict_getter_then_zero() {
        let root = ConfigSection::root();
        root.set("n", "42");

        assert_eq!(root.get_int("n"), 0);
        assert_eq!(root.get_optional_int("n"), Some(42));
        assert_eq!(root.get_as_int("n"), 42);
    }

    #[test]
    fn given_wide_integer_when_get_int_then_out_of_range_yields_zero() {
        let root = ConfigSection::root();
        root.set("small", 7_i64);
        root.set("big", i64::MAX);

        assert_eq!(root.get_int("small"), 7);
        assert_eq!(root.get_int("big"), 0);
        assert_eq!(root.get_long("big"), i64::MAX);
    }

    #[test]
    fn given_removed_key_when_remove_then_returns_prior() {
        let root = ConfigSection::root();
        root.set("flag", true);

        assert_eq!(root.remove("flag"), Some(TreeNode::from(true)));
        assert_eq!(root.remove("flag"), None);
        assert!(!root.is_set("flag"));
    }
}
