//! Built-in resolver for scalars, optionals, sequences, maps and enums.

use tracing::instrument;

use crate::application::registry::ResolverRegistry;
use crate::application::resolve::resolver::{resolve_primitive, Resolver};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::node::parse_bool;
use crate::domain::{
    join_path, EnumDesc, EnumValue, Mapping, Scalar, TreeNode, TypeDesc, TypeKind, Value,
};

/// Registered name of the built-in scalar/container resolver.
pub const UNIVERSAL: &str = "universal";

#[derive(Debug, Clone)]
pub struct UniversalResolver {
    name: String,
    strict: bool,
}

impl Default for UniversalResolver {
    fn default() -> Self {
        Self::new(false)
    }
}

impl UniversalResolver {
    /// With `strict` set, scalars must match natively; no text parsing.
    pub fn new(strict: bool) -> Self {
        Self::named(UNIVERSAL, strict)
    }

    pub fn named(name: impl Into<String>, strict: bool) -> Self {
        Self {
            name: name.into(),
            strict,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    fn integral(
        &self,
        node: &TreeNode,
        path: &str,
        target: &str,
        min: i64,
        max: i64,
    ) -> ApplicationResult<i64> {
        let in_range = |i: &i64| (min..=max).contains(i);
        match node {
            TreeNode::Empty => Err(ApplicationError::null_input(path)),
            TreeNode::Scalar(Scalar::Int(i)) if in_range(i) => Ok(*i),
            TreeNode::Scalar(Scalar::Float(f))
                if f.fract() == 0.0 && *f >= min as f64 && *f <= max as f64 =>
            {
                Ok(*f as i64)
            }
            TreeNode::Scalar(s) if !self.strict => s
                .text()
                .trim()
                .parse::<i64>()
                .ok()
                .filter(in_range)
                .ok_or_else(|| ApplicationError::parse_failure(path, s.text(), target)),
            other => Err(ApplicationError::parse_failure(path, other.to_string(), target)),
        }
    }

    fn resolve_optional(
        &self,
        registry: &ResolverRegistry,
        ty: &TypeDesc,
        node: &TreeNode,
        path: &str,
    ) -> ApplicationResult<Value> {
        if node.is_empty() {
            return Ok(Value::none());
        }
        match ty.generic(0) {
            Some(inner) => Ok(Value::some(self.resolve(registry, inner, node, path)?)),
            None => Ok(Value::some(Value::Raw(node.clone()))),
        }
    }

    fn resolve_list(
        &self,
        registry: &ResolverRegistry,
        ty: &TypeDesc,
        node: &TreeNode,
        path: &str,
    ) -> ApplicationResult<Value> {
        let element = ty.generic(0).cloned().unwrap_or_else(TypeDesc::any);
        match node {
            TreeNode::Empty => Ok(Value::List(Vec::new())),
            TreeNode::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.resolve(registry, &element, item, &format!("{path}[{i}]")))
                .collect::<ApplicationResult<Vec<_>>>()
                .map(Value::List),
            single => Ok(Value::List(vec![self.resolve(registry, &element, single, path)?])),
        }
    }

    fn resolve_map(
        &self,
        registry: &ResolverRegistry,
        ty: &TypeDesc,
        node: &TreeNode,
        path: &str,
    ) -> ApplicationResult<Value> {
        let key_ty = ty.generic(0).cloned().unwrap_or_else(TypeDesc::string);
        let value_ty = ty.generic(1).cloned().unwrap_or_else(TypeDesc::any);
        // keys are always text in the tree, so they are parsed even when strict
        let keys = Self::named(self.name.as_str(), false);
        match node {
            TreeNode::Empty => Ok(Value::Map(Vec::new())),
            TreeNode::Mapping(map) => {
                let map = map.borrow();
                let mut entries = Vec::with_capacity(map.len());
                for (key, value) in map.iter() {
                    let entry_path = join_path(path, key);
                    let key = keys.resolve(registry, &key_ty, &TreeNode::from(key), &entry_path)?;
                    let value = self.resolve(registry, &value_ty, value, &entry_path)?;
                    entries.push((key, value));
                }
                Ok(Value::Map(entries))
            }
            single => {
                let key = keys.resolve(registry, &key_ty, &TreeNode::from(""), path)?;
                let value = self.resolve(registry, &value_ty, single, path)?;
                Ok(Value::Map(vec![(key, value)]))
            }
        }
    }

    fn resolve_enum(
        &self,
        desc: &'static EnumDesc,
        node: &TreeNode,
        path: &str,
    ) -> ApplicationResult<Value> {
        let ordinal = |index: i64| {
            usize::try_from(index)
                .ok()
                .filter(|i| *i < desc.cases.len())
                .map(|ordinal| Value::Enum(EnumValue { desc, ordinal }))
                .ok_or_else(|| ApplicationError::IndexOutOfRange {
                    path: path.to_string(),
                    index,
                    len: desc.cases.len(),
                })
        };
        match node {
            TreeNode::Scalar(Scalar::Int(index)) => ordinal(*index),
            TreeNode::Scalar(Scalar::Float(f)) if f.fract() == 0.0 => ordinal(*f as i64),
            TreeNode::Scalar(s) if s.is_numeric() => Err(ApplicationError::parse_failure(
                path,
                s.text(),
                format!("{} ordinal", desc.name),
            )),
            other => {
                let name = match other {
                    TreeNode::Scalar(s) => s.text(),
                    _ => other.to_string(),
                };
                desc.ordinal_of(name.trim())
                    .map(|ordinal| Value::Enum(EnumValue { desc, ordinal }))
                    .ok_or_else(|| ApplicationError::UnknownCase {
                        path: path.to_string(),
                        name,
                        enum_name: desc.name.to_string(),
                    })
            }
        }
    }

    fn store_list(&self, registry: &ResolverRegistry, items: &[Value], path: &str) -> TreeNode {
        // every member is stored as the runtime type of the first one
        let Some(element) = items.first().map(Value::runtime_type) else {
            return TreeNode::Sequence(Vec::new());
        };
        let mut stored = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let item_path = format!("{path}[{i}]");
            match self.store(registry, &element, item, &item_path) {
                Ok(node) => stored.push(node),
                Err(e) => registry
                    .logger()
                    .warning(path, &format!("skipping list element {i}: {e}")),
            }
        }
        TreeNode::Sequence(stored)
    }

    fn store_map(
        &self,
        registry: &ResolverRegistry,
        entries: &[(Value, Value)],
        path: &str,
    ) -> TreeNode {
        let Some((key_ty, value_ty)) = entries
            .first()
            .map(|(k, v)| (k.runtime_type(), v.runtime_type()))
        else {
            return TreeNode::mapping();
        };
        let mut stored = Mapping::new();
        for (key, value) in entries {
            let result = self.store(registry, &key_ty, key, path).and_then(|key| match key {
                TreeNode::Scalar(s) => {
                    let key = s.text();
                    let node = self.store(registry, &value_ty, value, &join_path(path, &key))?;
                    Ok((key, node))
                }
                other => Err(ApplicationError::unsupported(
                    format!("map key {}", other.kind_name()),
                    path,
                )),
            });
            match result {
                Ok((key, node)) => {
                    stored.insert(key, node);
                }
                Err(e) => registry
                    .logger()
                    .warning(path, &format!("skipping map entry: {e}")),
            }
        }
        TreeNode::from(stored)
    }
}

fn optional_numeric(result: ApplicationResult<Value>) -> Value {
    result.map(Value::some).unwrap_or_else(|_| Value::none())
}

fn text_of(node: &TreeNode) -> String {
    match node {
        TreeNode::Scalar(s) => s.text(),
        other => other.to_string(),
    }
}

impl Resolver for UniversalResolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_accept(&self, kind: &TypeKind) -> bool {
        !matches!(kind, TypeKind::Entry(_))
    }

    #[instrument(level = "trace", skip_all, fields(path = %path, ty = %ty))]
    fn resolve(
        &self,
        registry: &ResolverRegistry,
        ty: &TypeDesc,
        node: &TreeNode,
        path: &str,
    ) -> ApplicationResult<Value> {
        match ty.kind() {
            TypeKind::Any => return Ok(Value::Raw(node.clone())),
            TypeKind::OptionalInt => {
                return Ok(optional_numeric(self.as_int(node, path).map(Value::Int)))
            }
            TypeKind::OptionalLong => {
                return Ok(optional_numeric(self.as_long(node, path).map(Value::Long)))
            }
            TypeKind::OptionalDouble => {
                return Ok(optional_numeric(self.as_double(node, path).map(Value::Double)))
            }
            _ => {}
        }
        if node.is_empty() && !ty.accepts_absent() {
            return Err(ApplicationError::null_input(path));
        }
        match ty.kind() {
            _ if ty.is_primitive() => resolve_primitive(self, ty, node, path),
            TypeKind::String => Ok(Value::Str(text_of(node))),
            TypeKind::Optional => self.resolve_optional(registry, ty, node, path),
            TypeKind::List => self.resolve_list(registry, ty, node, path),
            TypeKind::Map => self.resolve_map(registry, ty, node, path),
            TypeKind::Enum(desc) => self.resolve_enum(desc, node, path),
            _ => Err(ApplicationError::unsupported(ty.name(), path)),
        }
    }

    #[instrument(level = "trace", skip_all, fields(path = %path, ty = %ty))]
    fn store(
        &self,
        registry: &ResolverRegistry,
        ty: &TypeDesc,
        value: &Value,
        path: &str,
    ) -> ApplicationResult<TreeNode> {
        let mismatch = || {
            ApplicationError::unsupported(format!("{} from {}", ty.name(), value.kind_name()), path)
        };
        match (ty.kind(), value) {
            (TypeKind::Any, Value::Raw(node)) => Ok(node.clone()),
            (TypeKind::Any, Value::Object(_)) => Err(mismatch()),
            (TypeKind::Any, other) => self.store(registry, &other.runtime_type(), other, path),
            (TypeKind::Bool, Value::Bool(b)) => Ok(TreeNode::from(*b)),
            (TypeKind::Byte, Value::Byte(v)) => Ok(TreeNode::from(i64::from(*v))),
            (TypeKind::Short, Value::Short(v)) => Ok(TreeNode::from(i64::from(*v))),
            (TypeKind::Int, Value::Int(v)) => Ok(TreeNode::from(i64::from(*v))),
            (TypeKind::Long, Value::Long(v)) => Ok(TreeNode::from(*v)),
            (TypeKind::Float, Value::Float(v)) => Ok(TreeNode::from(f64::from(*v))),
            (TypeKind::Double, Value::Double(v)) => Ok(TreeNode::from(*v)),
            (TypeKind::String, Value::Str(s)) => Ok(TreeNode::from(s.as_str())),
            (
                TypeKind::OptionalInt
                | TypeKind::OptionalLong
                | TypeKind::OptionalDouble
                | TypeKind::Optional,
                Value::Optional(inner),
            ) => match inner {
                None => Ok(TreeNode::Empty),
                Some(inner) => {
                    let inner_ty = match ty.kind() {
                        TypeKind::OptionalInt => TypeDesc::int(),
                        TypeKind::OptionalLong => TypeDesc::long(),
                        TypeKind::OptionalDouble => TypeDesc::double(),
                        _ => ty.generic(0).cloned().unwrap_or_else(|| inner.runtime_type()),
                    };
                    self.store(registry, &inner_ty, inner, path)
                }
            },
            (TypeKind::List, Value::List(items)) => Ok(self.store_list(registry, items, path)),
            (TypeKind::Map, Value::Map(entries)) => Ok(self.store_map(registry, entries, path)),
            (TypeKind::Enum(desc), Value::Enum(e)) if *e.desc == *desc => {
                Ok(TreeNode::from(e.name()))
            }
            _ => Err(mismatch()),
        }
    }

    fn as_int(&self, node: &TreeNode, path: &str) -> ApplicationResult<i32> {
        let v = self.integral(node, path, "i32", i64::from(i32::MIN), i64::from(i32::MAX))?;
        i32::try_from(v).map_err(|_| ApplicationError::parse_failure(path, v.to_string(), "i32"))
    }

    fn as_long(&self, node: &TreeNode, path: &str) -> ApplicationResult<i64> {
        self.integral(node, path, "i64", i64::MIN, i64::MAX)
    }

    fn as_short(&self, node: &TreeNode, path: &str) -> ApplicationResult<i16> {
        let v = self.integral(node, path, "i16", i64::from(i16::MIN), i64::from(i16::MAX))?;
        i16::try_from(v).map_err(|_| ApplicationError::parse_failure(path, v.to_string(), "i16"))
    }

    fn as_byte(&self, node: &TreeNode, path: &str) -> ApplicationResult<i8> {
        let v = self.integral(node, path, "i8", i64::from(i8::MIN), i64::from(i8::MAX))?;
        i8::try_from(v).map_err(|_| ApplicationError::parse_failure(path, v.to_string(), "i8"))
    }

    fn as_double(&self, node: &TreeNode, path: &str) -> ApplicationResult<f64> {
        match node {
            TreeNode::Empty => Err(ApplicationError::null_input(path)),
            TreeNode::Scalar(Scalar::Float(f)) => Ok(*f),
            TreeNode::Scalar(Scalar::Int(i)) => Ok(*i as f64),
            TreeNode::Scalar(s) if !self.strict => s
                .text()
                .trim()
                .parse::<f64>()
                .map_err(|_| ApplicationError::parse_failure(path, s.text(), "f64")),
            other => Err(ApplicationError::parse_failure(path, other.to_string(), "f64")),
        }
    }

    fn as_float(&self, node: &TreeNode, path: &str) -> ApplicationResult<f32> {
        self.as_double(node, path).map(|d| d as f32)
    }

    fn as_bool(&self, node: &TreeNode, path: &str) -> ApplicationResult<bool> {
        match node {
            TreeNode::Empty => Err(ApplicationError::null_input(path)),
            TreeNode::Scalar(Scalar::Bool(b)) => Ok(*b),
            TreeNode::Scalar(s) if !self.strict => parse_bool(&s.text())
                .ok_or_else(|| ApplicationError::parse_failure(path, s.text(), "bool")),
            other => Err(ApplicationError::parse_failure(path, other.to_string(), "bool")),
        }
    }
}
