//! Named lookup table of resolvers.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, instrument};

use crate::application::resolve::{EntryResolver, Resolver, UniversalResolver, ENTRY, UNIVERSAL};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::TypeDesc;
use crate::infrastructure::logger::LogSink;

/// Resolvers by name plus the sink that receives resolution warnings.
///
/// Owned by the binder and passed by reference into every resolution call.
pub struct ResolverRegistry {
    resolvers: HashMap<String, Rc<dyn Resolver>>,
    logger: Rc<dyn LogSink>,
}

impl ResolverRegistry {
    /// Empty registry, no built-ins.
    pub fn new(logger: Rc<dyn LogSink>) -> Self {
        Self {
            resolvers: HashMap::new(),
            logger,
        }
    }

    /// Registry with `"universal"` and `"entry"` installed.
    pub fn with_builtins(logger: Rc<dyn LogSink>, strict_scalars: bool) -> Self {
        let mut registry = Self::new(logger);
        registry.register(UniversalResolver::new(strict_scalars));
        registry.register(EntryResolver::new());
        registry
    }

    pub fn logger(&self) -> &dyn LogSink {
        self.logger.as_ref()
    }

    pub fn set_logger(&mut self, logger: Rc<dyn LogSink>) {
        self.logger = logger;
    }

    /// Insert only if `name` is free. Returns whether it was inserted.
    #[instrument(level = "trace", skip(self, resolver))]
    pub fn add_resolver(&mut self, name: &str, resolver: Rc<dyn Resolver>) -> bool {
        if self.resolvers.contains_key(name) {
            return false;
        }
        self.resolvers.insert(name.to_string(), resolver);
        true
    }

    /// Insert unconditionally. Returns whether an entry was replaced.
    #[instrument(level = "trace", skip(self, resolver))]
    pub fn force_add_resolver(&mut self, name: &str, resolver: Rc<dyn Resolver>) -> bool {
        self.resolvers.insert(name.to_string(), resolver).is_some()
    }

    /// [`ResolverRegistry::add_resolver`] under the resolver's own name.
    pub fn register<R: Resolver + 'static>(&mut self, resolver: R) -> bool {
        let name = resolver.name().to_string();
        self.add_resolver(&name, Rc::new(resolver))
    }

    pub fn force_register<R: Resolver + 'static>(&mut self, resolver: R) -> bool {
        let name = resolver.name().to_string();
        self.force_add_resolver(&name, Rc::new(resolver))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn remove_resolver(&mut self, name: &str) -> bool {
        self.resolvers.remove(name).is_some()
    }

    pub fn get_resolver(&self, name: &str) -> Option<Rc<dyn Resolver>> {
        self.resolvers.get(name).cloned()
    }

    /// Resolver registered as `name`, else the default for `ty`.
    ///
    /// A miss is logged once as a warning at `path`.
    pub fn get_resolver_or_default(
        &self,
        name: &str,
        ty: &TypeDesc,
        path: &str,
    ) -> ApplicationResult<Rc<dyn Resolver>> {
        if let Some(resolver) = self.get_resolver(name) {
            return Ok(resolver);
        }
        let fallback = self.get_default_resolver(ty)?;
        debug!("get_resolver_or_default: missing={} fallback={}", name, fallback.name());
        self.logger.warning(
            path,
            &format!(
                "cannot find resolver \"{name}\", using \"{}\" instead",
                fallback.name()
            ),
        );
        Ok(fallback)
    }

    /// `"entry"` for aggregate types, `"universal"` otherwise; the other
    /// built-in stands in if the preferred one was removed.
    pub fn get_default_resolver(&self, ty: &TypeDesc) -> ApplicationResult<Rc<dyn Resolver>> {
        let (preferred, other) = if ty.is_entry() {
            (ENTRY, UNIVERSAL)
        } else {
            (UNIVERSAL, ENTRY)
        };
        self.get_resolver(preferred)
            .or_else(|| self.get_resolver(other))
            .ok_or_else(|| ApplicationError::Configuration {
                message: format!("no default resolver registered (need \"{UNIVERSAL}\" or \"{ENTRY}\")"),
            })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resolvers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::logger::NoopSink;

    #[test]
    fn given_builtins_when_listing_then_both_names_present() {
        let registry = ResolverRegistry::with_builtins(Rc::new(NoopSink), false);
        assert_eq!(registry.names(), vec![ENTRY, UNIVERSAL]);
    }

    #[test]
    fn given_taken_name_when_add_then_refused_and_force_replaces() {
        let mut registry = ResolverRegistry::with_builtins(Rc::new(NoopSink), false);

        assert!(!registry.add_resolver(UNIVERSAL, Rc::new(UniversalResolver::new(true))));
        assert!(registry.force_add_resolver(UNIVERSAL, Rc::new(UniversalResolver::new(true))));
        assert!(!registry.force_add_resolver("fresh", Rc::new(UniversalResolver::new(true))));
    }

    #[test]
    fn given_no_builtins_when_default_resolver_then_configuration_error() {
        let mut registry = ResolverRegistry::with_builtins(Rc::new(NoopSink), false);
        registry.remove_resolver(UNIVERSAL);
        registry.remove_resolver(ENTRY);

        let err = registry.get_default_resolver(&TypeDesc::int()).err();
        assert!(matches!(err, Some(ApplicationError::Configuration { .. })));
    }

    #[test]
    fn given_universal_removed_when_default_for_scalar_then_entry_stands_in() {
        let mut registry = ResolverRegistry::with_builtins(Rc::new(NoopSink), false);
        registry.remove_resolver(UNIVERSAL);

        let resolver = registry.get_default_resolver(&TypeDesc::int()).expect("fallback");
        assert_eq!(resolver.name(), ENTRY);
    }
}
