//! Type-directed resolvers between tree nodes and typed values.

pub mod directive;
pub mod entry;
pub mod resolver;
pub mod universal;

pub use directive::Directive;
pub use entry::{EntryResolver, ENTRY};
pub use resolver::{resolve_primitive, Resolver};
pub use universal::{UniversalResolver, UNIVERSAL};
