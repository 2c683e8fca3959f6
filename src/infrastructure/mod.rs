//! Infrastructure layer: codecs, logger sinks, I/O implementations and DI container
//!
//! This layer implements I/O boundary traits and wires up services.

pub mod codec;
pub mod di;
pub mod error;
pub mod logger;
pub mod traits;

pub use codec::{DocumentCodec, DocumentFormat, TomlCodec, YamlCodec};
pub use error::{InfraError, InfraResult};
pub use logger::{LogLevel, LogSink, NoopSink, TracingSink};
