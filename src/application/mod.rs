//! Application layer: resolvers, registry and the binder facade
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod registry;
pub mod resolve;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use registry::ResolverRegistry;
pub use resolve::{Directive, EntryResolver, Resolver, UniversalResolver, ENTRY, UNIVERSAL};
pub use services::ConfigBinder;
