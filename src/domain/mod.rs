//! Domain layer: document tree, typed surface and schemas
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod bind;
pub mod error;
pub mod node;
pub mod schema;
pub mod section;
pub mod selector;
pub mod types;
pub mod value;

pub use bind::Bind;
pub use error::{DomainError, DomainResult};
pub use node::{join_path, Mapping, Scalar, SharedMapping, TreeNode};
pub use schema::{
    schema_of, Entry, FieldOptions, FieldSchema, ObjectSchema, SchemaBuilder, Visibility,
};
pub use section::ConfigSection;
pub use selector::{FieldSelection, FieldSelector};
pub use types::{EntryDesc, EnumDesc, TypeDesc, TypeKind};
pub use value::{EnumValue, Value};
