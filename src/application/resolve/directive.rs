//! Per-field resolution directives.

use crate::application::resolve::entry::ENTRY;
use crate::application::resolve::universal::UNIVERSAL;
use crate::domain::{join_path, FieldSchema, FieldSelection, TypeDesc};

/// How one field is mapped: where its node lives, which resolver handles
/// it, and which selection policy applies to nested aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub key: String,
    pub resolver_name: String,
    pub selection: FieldSelection,
}

impl Directive {
    pub fn of(field: &FieldSchema) -> Self {
        let options = field.options();
        Self {
            key: options
                .path
                .clone()
                .unwrap_or_else(|| field.name().to_string()),
            resolver_name: options
                .resolver
                .clone()
                .unwrap_or_else(|| default_resolver_name(&field.type_desc())),
            selection: options.selection.unwrap_or_else(|| field.owner_selection()),
        }
    }

    /// Absolute path of the field below `parent`.
    pub fn field_path(&self, parent: &str) -> String {
        join_path(parent, &self.key)
    }
}

/// Resolver name an undecorated value of `ty` is handled by.
pub fn default_resolver_name(ty: &TypeDesc) -> String {
    match ty.schema() {
        Some(schema) => schema.resolver().unwrap_or(ENTRY).to_string(),
        None => UNIVERSAL.to_string(),
    }
}
