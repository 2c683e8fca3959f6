//! Resolver for aggregate types, walking their schema field by field.
//!
//! A failure on one field is logged at that field's path and the field is
//! skipped; the rest of the aggregate is still processed.

use std::any::Any;

use tracing::{debug, instrument};

use crate::application::registry::ResolverRegistry;
use crate::application::resolve::directive::Directive;
use crate::application::resolve::resolver::{resolve_primitive, Resolver};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    ConfigSection, FieldSchema, FieldSelector, Mapping, ObjectSchema, TreeNode, TypeDesc,
    TypeKind, Value,
};

/// Registered name of the built-in aggregate resolver.
pub const ENTRY: &str = "entry";

#[derive(Debug, Clone)]
pub struct EntryResolver {
    name: String,
}

impl Default for EntryResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryResolver {
    pub fn new() -> Self {
        Self::named(ENTRY)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Build an instance of `schema`'s type from `section`.
    ///
    /// Only instantiation failures propagate.
    #[instrument(level = "trace", skip_all, fields(ty = schema.name(), path = %path))]
    pub fn resolve_object(
        &self,
        registry: &ResolverRegistry,
        schema: &ObjectSchema,
        selector: &dyn FieldSelector,
        section: &ConfigSection,
        path: &str,
    ) -> ApplicationResult<Box<dyn Any>> {
        debug!("resolve_object: type={} path={}", schema.name(), path);
        let mut instance = schema
            .instantiate()
            .ok_or_else(|| ApplicationError::Instantiation {
                type_name: schema.name().to_string(),
            })?;
        for field in selector.apply(schema) {
            let directive = Directive::of(field);
            let field_path = directive.field_path(path);
            let resolved = self.resolve_field(
                registry,
                field,
                &directive,
                section,
                &field_path,
                instance.as_mut(),
            );
            if let Err(e) = resolved {
                registry.logger().warning(
                    &field_path,
                    &format!("failed to resolve field {}.{}: {e}", schema.name(), field.name()),
                );
            }
        }
        Ok(instance)
    }

    fn resolve_field(
        &self,
        registry: &ResolverRegistry,
        field: &FieldSchema,
        directive: &Directive,
        section: &ConfigSection,
        field_path: &str,
        instance: &mut dyn Any,
    ) -> ApplicationResult<()> {
        let field_ty = field.type_desc();
        let resolver =
            registry.get_resolver_or_default(&directive.resolver_name, &field_ty, field_path)?;

        if let Some(entry) = resolver.as_entry_resolver() {
            let schema = field_ty
                .schema()
                .ok_or_else(|| ApplicationError::unsupported(field_ty.name(), field_path))?;
            let sub = match section.get_section_deep(&directive.key) {
                Some(sub) => sub,
                None => {
                    return Err(match section.get_node_deep(&directive.key) {
                        None | Some(TreeNode::Empty) => ApplicationError::null_input(field_path),
                        Some(_) => ApplicationError::unsupported(field_ty.name(), field_path),
                    })
                }
            };
            let nested =
                entry.resolve_object(registry, &schema, &directive.selection, &sub, field_path)?;
            field.place(instance, nested)?;
            return Ok(());
        }

        let node = section.get_node_deep(&directive.key).unwrap_or_default();
        let value = if field_ty.is_primitive() {
            resolve_primitive(resolver.as_ref(), &field_ty, &node, field_path)?
        } else {
            resolver.resolve(registry, &field_ty, &node, field_path)?
        };
        match value {
            Value::Object(nested) if field.is_entry() => field.place(instance, nested)?,
            value => field.assign(instance, value)?,
        }
        Ok(())
    }

    /// Flatten `instance` into a mapping keyed by each field's directive key.
    ///
    /// Dotted keys produce nested mappings. Fields that fail are omitted.
    #[instrument(level = "trace", skip_all, fields(ty = schema.name(), path = %path))]
    pub fn store_object(
        &self,
        registry: &ResolverRegistry,
        schema: &ObjectSchema,
        selector: &dyn FieldSelector,
        instance: &dyn Any,
        path: &str,
    ) -> ApplicationResult<Mapping> {
        debug!("store_object: type={} path={}", schema.name(), path);
        let mut mapping = Mapping::new();
        for field in selector.apply(schema) {
            let directive = Directive::of(field);
            let field_path = directive.field_path(path);
            let stored = self
                .store_field(registry, field, &directive, instance, &field_path)
                .and_then(|node| {
                    mapping
                        .insert_deep(&directive.key, node)
                        .map_err(ApplicationError::from)
                });
            if let Err(e) = stored {
                registry.logger().warning(
                    &field_path,
                    &format!("failed to store field {}.{}: {e}", schema.name(), field.name()),
                );
            }
        }
        Ok(mapping)
    }

    fn store_field(
        &self,
        registry: &ResolverRegistry,
        field: &FieldSchema,
        directive: &Directive,
        instance: &dyn Any,
        field_path: &str,
    ) -> ApplicationResult<TreeNode> {
        let field_ty = field.type_desc();
        let resolver =
            registry.get_resolver_or_default(&directive.resolver_name, &field_ty, field_path)?;

        if let Some(entry) = resolver.as_entry_resolver() {
            let schema = field_ty
                .schema()
                .ok_or_else(|| ApplicationError::unsupported(field_ty.name(), field_path))?;
            let nested = field
                .project(instance)
                .ok_or_else(|| ApplicationError::unsupported(field_ty.name(), field_path))?;
            let mapping =
                entry.store_object(registry, &schema, &directive.selection, nested, field_path)?;
            return Ok(TreeNode::from(mapping));
        }

        let value = field.read(instance)?;
        resolver.store(registry, &field_ty, &value, field_path)
    }
}

impl Resolver for EntryResolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_accept(&self, kind: &TypeKind) -> bool {
        matches!(kind, TypeKind::Entry(_))
    }

    fn resolve(
        &self,
        registry: &ResolverRegistry,
        ty: &TypeDesc,
        node: &TreeNode,
        path: &str,
    ) -> ApplicationResult<Value> {
        let schema = ty
            .schema()
            .ok_or_else(|| ApplicationError::unsupported(ty.name(), path))?;
        match node {
            TreeNode::Mapping(map) => {
                let section = ConfigSection::from_mapping(map.clone(), path);
                let selection = schema.selection();
                self.resolve_object(registry, &schema, &selection, &section, path)
                    .map(Value::Object)
            }
            TreeNode::Empty => Err(ApplicationError::null_input(path)),
            _ => Err(ApplicationError::unsupported(ty.name(), path)),
        }
    }

    fn store(
        &self,
        registry: &ResolverRegistry,
        ty: &TypeDesc,
        value: &Value,
        path: &str,
    ) -> ApplicationResult<TreeNode> {
        let schema = ty
            .schema()
            .ok_or_else(|| ApplicationError::unsupported(ty.name(), path))?;
        match value {
            Value::Object(instance) => {
                let selection = schema.selection();
                self.store_object(registry, &schema, &selection, instance.as_ref(), path)
                    .map(TreeNode::from)
            }
            other => Err(ApplicationError::unsupported(
                format!("{} from {}", ty.name(), other.kind_name()),
                path,
            )),
        }
    }

    fn as_entry_resolver(&self) -> Option<&EntryResolver> {
        Some(self)
    }
}
