//! The contract every resolver implements.

use crate::application::registry::ResolverRegistry;
use crate::application::resolve::entry::EntryResolver;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{TreeNode, TypeDesc, TypeKind, Value};

/// A named, type-directed converter between tree nodes and [`Value`]s.
///
/// The registry is passed into every call so resolvers can delegate
/// nested work to other named resolvers.
pub trait Resolver {
    fn name(&self) -> &str;

    fn can_accept(&self, kind: &TypeKind) -> bool;

    /// Generic-aware refinement of [`Resolver::can_accept`].
    fn can_accept_type(&self, ty: &TypeDesc) -> bool {
        self.can_accept(&ty.kind())
    }

    fn resolve(
        &self,
        registry: &ResolverRegistry,
        ty: &TypeDesc,
        node: &TreeNode,
        path: &str,
    ) -> ApplicationResult<Value>;

    /// Structural inverse of [`Resolver::resolve`].
    fn store(
        &self,
        registry: &ResolverRegistry,
        ty: &TypeDesc,
        value: &Value,
        path: &str,
    ) -> ApplicationResult<TreeNode>;

    fn as_int(&self, _node: &TreeNode, _path: &str) -> ApplicationResult<i32> {
        Err(unsupported_operation(self.name(), "as_int"))
    }

    fn as_long(&self, _node: &TreeNode, _path: &str) -> ApplicationResult<i64> {
        Err(unsupported_operation(self.name(), "as_long"))
    }

    fn as_double(&self, _node: &TreeNode, _path: &str) -> ApplicationResult<f64> {
        Err(unsupported_operation(self.name(), "as_double"))
    }

    fn as_float(&self, _node: &TreeNode, _path: &str) -> ApplicationResult<f32> {
        Err(unsupported_operation(self.name(), "as_float"))
    }

    fn as_bool(&self, _node: &TreeNode, _path: &str) -> ApplicationResult<bool> {
        Err(unsupported_operation(self.name(), "as_bool"))
    }

    fn as_short(&self, _node: &TreeNode, _path: &str) -> ApplicationResult<i16> {
        Err(unsupported_operation(self.name(), "as_short"))
    }

    fn as_byte(&self, _node: &TreeNode, _path: &str) -> ApplicationResult<i8> {
        Err(unsupported_operation(self.name(), "as_byte"))
    }

    /// `Some` for resolvers that map aggregates section by section.
    fn as_entry_resolver(&self) -> Option<&EntryResolver> {
        None
    }
}

fn unsupported_operation(resolver: &str, operation: &str) -> ApplicationError {
    ApplicationError::UnsupportedOperation {
        resolver: resolver.to_string(),
        operation: operation.to_string(),
    }
}

/// Route a primitive kind to the matching scalar helper of `resolver`.
pub fn resolve_primitive(
    resolver: &dyn Resolver,
    ty: &TypeDesc,
    node: &TreeNode,
    path: &str,
) -> ApplicationResult<Value> {
    match ty.kind() {
        TypeKind::Bool => resolver.as_bool(node, path).map(Value::Bool),
        TypeKind::Byte => resolver.as_byte(node, path).map(Value::Byte),
        TypeKind::Short => resolver.as_short(node, path).map(Value::Short),
        TypeKind::Int => resolver.as_int(node, path).map(Value::Int),
        TypeKind::Long => resolver.as_long(node, path).map(Value::Long),
        TypeKind::Float => resolver.as_float(node, path).map(Value::Float),
        TypeKind::Double => resolver.as_double(node, path).map(Value::Double),
        _ => Err(ApplicationError::unsupported(ty.name(), path)),
    }
}
