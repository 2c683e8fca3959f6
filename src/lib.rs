//! Type-directed binding between YAML/TOML document trees and typed values.
//!
//! Layers, innermost first: [`domain`] (tree model, type descriptors,
//! schemas), [`application`] (resolvers, registry, binder facade),
//! [`infrastructure`] (codecs, logger sinks, filesystem), then [`cli`].
//!
//! ```ignore
//! use cfgbind::prelude::*;
//!
//! #[derive(Default)]
//! struct Server { host: String, port: i32 }
//!
//! impl Entry for Server {
//!     fn describe(s: &mut SchemaBuilder<Self>) {
//!         s.field("host", |v| &v.host, |v| &mut v.host)
//!             .field("port", |v| &v.port, |v| &mut v.port);
//!     }
//! }
//!
//! let binder = ConfigBinder::new(&Settings::default());
//! let server: Server = binder.load_as("host: localhost\nport: 8080\n")?;
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;

pub mod prelude {
    pub use crate::application::{ApplicationError, ConfigBinder, Resolver, ResolverRegistry};
    pub use crate::bind_enum;
    pub use crate::config::Settings;
    pub use crate::domain::{
        Bind, ConfigSection, Entry, FieldOptions, FieldSelection, SchemaBuilder, TreeNode,
    };
    pub use crate::infrastructure::{DocumentFormat, LogSink};
}
