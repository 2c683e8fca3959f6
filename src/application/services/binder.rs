//! Binder facade
//!
//! Wires a document codec to the resolver registry: text in, typed values
//! out, and back.

use std::any::Any;
use std::io::{Read, Write};
use std::path::Path;
use std::rc::Rc;

use tracing::debug;

use crate::application::error_ext::IoResultExt;
use crate::application::registry::ResolverRegistry;
use crate::application::resolve::directive::default_resolver_name;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{
    schema_of, ConfigSection, DomainError, Entry, ObjectSchema, TreeNode, TypeDesc, Value,
};
use crate::infrastructure::codec::{DocumentCodec, DocumentFormat};
use crate::infrastructure::logger::{LogSink, TracingSink};
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::InfraError;

/// Loads documents into sections and maps sections to typed values.
pub struct ConfigBinder {
    registry: ResolverRegistry,
    codec: Box<dyn DocumentCodec>,
    sink: Rc<dyn LogSink>,
}

impl ConfigBinder {
    /// Binder using the configured format, logging through `tracing`.
    pub fn new(settings: &Settings) -> Self {
        Self::with_deps(
            settings.format.codec(),
            Rc::new(TracingSink),
            settings.strict_scalars,
        )
    }

    /// Create a binder with custom dependencies (for testing).
    pub fn with_deps(
        codec: Box<dyn DocumentCodec>,
        sink: Rc<dyn LogSink>,
        strict_scalars: bool,
    ) -> Self {
        Self {
            registry: ResolverRegistry::with_builtins(Rc::clone(&sink), strict_scalars),
            codec,
            sink,
        }
    }

    pub fn registry(&self) -> &ResolverRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ResolverRegistry {
        &mut self.registry
    }

    pub fn format(&self) -> DocumentFormat {
        self.codec.format()
    }

    pub fn logger(&self) -> &dyn LogSink {
        self.sink.as_ref()
    }

    // ------------------------------------------------------------------
    // text <-> section
    // ------------------------------------------------------------------

    /// Parse `text` into a root section (path `""`).
    pub fn load(&self, text: &str) -> ApplicationResult<ConfigSection> {
        load_with(self.codec.as_ref(), text)
    }

    pub fn load_reader(&self, mut reader: impl Read) -> ApplicationResult<ConfigSection> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| ApplicationError::OperationFailed {
                context: "read document".to_string(),
                source: Box::new(e),
            })?;
        self.load(&text)
    }

    /// Load a file, picking the codec from its extension.
    pub fn load_file(&self, fs: &dyn FileSystem, path: &Path) -> ApplicationResult<ConfigSection> {
        debug!("load_file: path={}", path.display());
        let text = fs
            .read_to_string(path)
            .with_path_context("read config", path)?;
        match DocumentFormat::from_path(path) {
            Some(format) if format != self.format() => load_with(format.codec().as_ref(), &text),
            _ => self.load(&text),
        }
    }

    pub fn dump(&self, section: &ConfigSection) -> ApplicationResult<String> {
        emit_with(self.codec.as_ref(), &section.to_node())
    }

    pub fn dump_to(&self, section: &ConfigSection, mut writer: impl Write) -> ApplicationResult<()> {
        let text = self.dump(section)?;
        writer
            .write_all(text.as_bytes())
            .map_err(|e| ApplicationError::OperationFailed {
                context: "write document".to_string(),
                source: Box::new(e),
            })
    }

    /// Write a file, picking the codec from its extension.
    pub fn dump_file(
        &self,
        fs: &dyn FileSystem,
        section: &ConfigSection,
        path: &Path,
    ) -> ApplicationResult<()> {
        debug!("dump_file: path={}", path.display());
        let text = match DocumentFormat::from_path(path) {
            Some(format) if format != self.format() => {
                emit_with(format.codec().as_ref(), &section.to_node())?
            }
            _ => self.dump(section)?,
        };
        fs.ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        fs.write(path, &text).with_path_context("write config", path)
    }

    // ------------------------------------------------------------------
    // section <-> typed value
    // ------------------------------------------------------------------

    /// Map `section` onto a fresh `T`.
    pub fn resolve<T: Entry>(&self, section: &ConfigSection) -> ApplicationResult<T> {
        let ty = TypeDesc::entry::<T>();
        let schema = schema_of::<T>();
        debug!("resolve: type={} path={}", schema.name(), section.path());
        let resolver = self.registry.get_resolver_or_default(
            &default_resolver_name(&ty),
            &ty,
            section.path(),
        )?;
        let instance = match resolver.as_entry_resolver() {
            Some(entry) => entry.resolve_object(
                &self.registry,
                &schema,
                &schema.selection(),
                section,
                section.path(),
            )?,
            None => match resolver.resolve(&self.registry, &ty, &section.to_node(), section.path())? {
                Value::Object(instance) => instance,
                other => {
                    return Err(ApplicationError::unsupported(
                        format!("{} from {}", ty.name(), other.kind_name()),
                        section.path(),
                    ))
                }
            },
        };
        downcast(instance, &schema, section.path())
    }

    pub fn load_as<T: Entry>(&self, text: &str) -> ApplicationResult<T> {
        let section = self.load(text)?;
        self.resolve(&section)
    }

    /// Flatten `value` into a new root section.
    pub fn store<T: Entry>(&self, value: &T) -> ApplicationResult<ConfigSection> {
        let ty = TypeDesc::entry::<T>();
        let schema = schema_of::<T>();
        debug!("store: type={}", schema.name());
        let resolver = self
            .registry
            .get_resolver_or_default(&default_resolver_name(&ty), &ty, "")?;
        let entry = resolver
            .as_entry_resolver()
            .ok_or_else(|| ApplicationError::UnsupportedOperation {
                resolver: resolver.name().to_string(),
                operation: format!("store {}", schema.name()),
            })?;
        let mapping = entry.store_object(
            &self.registry,
            &schema,
            &schema.selection(),
            value as &dyn Any,
            "",
        )?;
        Ok(ConfigSection::from_mapping(mapping.shared(), ""))
    }

    pub fn dump_as<T: Entry>(&self, value: &T) -> ApplicationResult<String> {
        let section = self.store(value)?;
        self.dump(&section)
    }
}

fn downcast<T: Entry>(
    instance: Box<dyn Any>,
    schema: &ObjectSchema,
    path: &str,
) -> ApplicationResult<T> {
    instance
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| ApplicationError::unsupported(schema.name(), path))
}

fn codec_failure(action: &str, format: DocumentFormat) -> impl FnOnce(InfraError) -> ApplicationError {
    let context = format!("{action} {format} document");
    move |e| ApplicationError::OperationFailed {
        context,
        source: Box::new(e),
    }
}

fn load_with(codec: &dyn DocumentCodec, text: &str) -> ApplicationResult<ConfigSection> {
    let root = codec
        .parse(text)
        .map_err(codec_failure("parse", codec.format()))?;
    match root {
        TreeNode::Mapping(map) => Ok(ConfigSection::from_mapping(map, "")),
        TreeNode::Empty => Ok(ConfigSection::root()),
        _ => Err(DomainError::NotAMapping {
            path: String::new(),
        }
        .into()),
    }
}

fn emit_with(codec: &dyn DocumentCodec, node: &TreeNode) -> ApplicationResult<String> {
    codec
        .emit(node)
        .map_err(codec_failure("emit", codec.format()))
}
