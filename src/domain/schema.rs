//! Explicit per-type schemas for aggregate ("entry") types.
//!
//! An [`Entry`] lists its fields once in [`Entry::describe`]; each field
//! carries typed accessor closures that are erased to `dyn Any` so the
//! resolvers can walk any aggregate without knowing its concrete type.

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::domain::bind::Bind;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::selector::FieldSelection;
use crate::domain::types::TypeDesc;
use crate::domain::value::Value;

/// A user-defined aggregate that can be mapped field by field.
pub trait Entry: Default + 'static {
    fn describe(schema: &mut SchemaBuilder<Self>);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Per-field directive overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOptions {
    pub path: Option<String>,
    pub resolver: Option<String>,
    pub selection: Option<FieldSelection>,
    pub visibility: Visibility,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dotted key relative to the owning section (default: field name).
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn resolver(mut self, name: impl Into<String>) -> Self {
        self.resolver = Some(name.into());
        self
    }

    pub fn selection(mut self, selection: FieldSelection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }
}

type Getter = Rc<dyn Fn(&dyn Any) -> Option<Value>>;
type Setter = Rc<dyn Fn(&mut dyn Any, Value) -> DomainResult<()>>;
type Projector = Rc<dyn Fn(&dyn Any) -> Option<&dyn Any>>;
type Placer = Rc<dyn Fn(&mut dyn Any, Box<dyn Any>) -> DomainResult<()>>;

fn projector<F>(f: F) -> Projector
where
    F: Fn(&dyn Any) -> Option<&dyn Any> + 'static,
{
    Rc::new(f)
}

fn foreign<T: 'static>() -> DomainError {
    DomainError::mismatch(short_type_name::<T>(), "foreign object")
}

#[derive(Clone)]
enum Access {
    Value { get: Getter, set: Setter },
    Entry { get: Projector, set: Placer },
}

impl Access {
    /// Re-root accessors of a base type onto the type that embeds it.
    fn lift<T: 'static, B: 'static>(
        self,
        read: Rc<dyn Fn(&T) -> &B>,
        write: Rc<dyn Fn(&mut T) -> &mut B>,
    ) -> Access {
        match self {
            Access::Value { get, set } => Access::Value {
                get: Rc::new(move |obj: &dyn Any| {
                    obj.downcast_ref::<T>().and_then(|t| get(read(t) as &dyn Any))
                }),
                set: Rc::new(move |obj: &mut dyn Any, value: Value| -> DomainResult<()> {
                    let target = obj.downcast_mut::<T>().ok_or_else(foreign::<T>)?;
                    set(write(target) as &mut dyn Any, value)
                }),
            },
            Access::Entry { get, set } => Access::Entry {
                get: projector(move |obj| {
                    let target = obj.downcast_ref::<T>()?;
                    get(read(target) as &dyn Any)
                }),
                set: Rc::new(move |obj: &mut dyn Any, boxed: Box<dyn Any>| -> DomainResult<()> {
                    let target = obj.downcast_mut::<T>().ok_or_else(foreign::<T>)?;
                    set(write(target) as &mut dyn Any, boxed)
                }),
            },
        }
    }
}

/// One mapped field of an aggregate.
#[derive(Clone)]
pub struct FieldSchema {
    name: &'static str,
    type_of: fn() -> TypeDesc,
    options: FieldOptions,
    depth: usize,
    declared_by: &'static str,
    owner_selection: FieldSelection,
    access: Access,
}

impl FieldSchema {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_desc(&self) -> TypeDesc {
        (self.type_of)()
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    /// 0 for fields declared on the type itself, +1 per inheritance level.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn declared_by(&self) -> &'static str {
        self.declared_by
    }

    /// Selection policy of the declaring type.
    pub fn owner_selection(&self) -> FieldSelection {
        self.owner_selection
    }

    pub fn is_public(&self) -> bool {
        self.options.visibility == Visibility::Public
    }

    pub fn is_entry(&self) -> bool {
        matches!(self.access, Access::Entry { .. })
    }

    pub(crate) fn read(&self, obj: &dyn Any) -> DomainResult<Value> {
        match &self.access {
            Access::Value { get, .. } => {
                get(obj).ok_or_else(|| DomainError::mismatch(self.declared_by, "foreign object"))
            }
            Access::Entry { .. } => Err(DomainError::mismatch("value field", "entry field")),
        }
    }

    pub(crate) fn assign(&self, obj: &mut dyn Any, value: Value) -> DomainResult<()> {
        match &self.access {
            Access::Value { set, .. } => set(obj, value),
            Access::Entry { .. } => Err(DomainError::mismatch("value field", "entry field")),
        }
    }

    pub(crate) fn project<'a>(&self, obj: &'a dyn Any) -> Option<&'a dyn Any> {
        match &self.access {
            Access::Entry { get, .. } => get(obj),
            Access::Value { .. } => None,
        }
    }

    pub(crate) fn place(&self, obj: &mut dyn Any, nested: Box<dyn Any>) -> DomainResult<()> {
        match &self.access {
            Access::Entry { set, .. } => set(obj, nested),
            Access::Value { .. } => Err(DomainError::mismatch("entry field", "value field")),
        }
    }
}

impl fmt::Debug for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSchema")
            .field("name", &self.name)
            .field("type", &self.type_desc().name())
            .field("options", &self.options)
            .field("depth", &self.depth)
            .field("declared_by", &self.declared_by)
            .finish()
    }
}

/// Field layout and type-level directives of one aggregate type.
pub struct ObjectSchema {
    type_id: TypeId,
    name: &'static str,
    constructor: Option<fn() -> Box<dyn Any>>,
    selection: FieldSelection,
    resolver: Option<String>,
    fields: Vec<FieldSchema>,
    base: Option<&'static str>,
}

impl ObjectSchema {
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Default selection policy for this type.
    pub fn selection(&self) -> FieldSelection {
        self.selection
    }

    /// Resolver named by the type itself, if any.
    pub fn resolver(&self) -> Option<&str> {
        self.resolver.as_deref()
    }

    /// Declared fields first, then inherited ones.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn base(&self) -> Option<&'static str> {
        self.base
    }

    /// Fresh default instance, or `None` for abstract types.
    pub fn instantiate(&self) -> Option<Box<dyn Any>> {
        self.constructor.map(|construct| construct())
    }
}

impl fmt::Debug for ObjectSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSchema")
            .field("name", &self.name)
            .field("selection", &self.selection)
            .field("resolver", &self.resolver)
            .field("fields", &self.fields)
            .field("base", &self.base)
            .finish()
    }
}

fn construct<T: Entry>() -> Box<dyn Any> {
    Box::new(T::default())
}

/// Collects the field layout of `T` inside [`Entry::describe`].
pub struct SchemaBuilder<T: Entry> {
    declared: Vec<FieldSchema>,
    inherited: Vec<FieldSchema>,
    selection: Option<FieldSelection>,
    resolver: Option<String>,
    is_abstract: bool,
    base: Option<&'static str>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entry> SchemaBuilder<T> {
    fn new() -> Self {
        Self {
            declared: Vec::new(),
            inherited: Vec::new(),
            selection: None,
            resolver: None,
            is_abstract: false,
            base: None,
            _marker: PhantomData,
        }
    }

    fn push(
        &mut self,
        name: &'static str,
        type_of: fn() -> TypeDesc,
        options: FieldOptions,
        access: Access,
    ) {
        self.declared.push(FieldSchema {
            name,
            type_of,
            options,
            depth: 0,
            declared_by: short_type_name::<T>(),
            owner_selection: FieldSelection::default(),
            access,
        });
    }

    /// Scalar or container field.
    pub fn field<V: Bind>(
        &mut self,
        name: &'static str,
        read: impl Fn(&T) -> &V + 'static,
        write: impl Fn(&mut T) -> &mut V + 'static,
    ) -> &mut Self {
        self.field_with(name, FieldOptions::default(), read, write)
    }

    pub fn field_with<V: Bind>(
        &mut self,
        name: &'static str,
        options: FieldOptions,
        read: impl Fn(&T) -> &V + 'static,
        write: impl Fn(&mut T) -> &mut V + 'static,
    ) -> &mut Self {
        let get: Getter =
            Rc::new(move |obj: &dyn Any| obj.downcast_ref::<T>().map(|t| read(t).to_value()));
        let set: Setter = Rc::new(move |obj: &mut dyn Any, value: Value| -> DomainResult<()> {
            let target = obj.downcast_mut::<T>().ok_or_else(foreign::<T>)?;
            *write(target) = V::from_value(value)?;
            Ok(())
        });
        self.push(name, V::type_desc, options, Access::Value { get, set });
        self
    }

    /// Nested aggregate field, resolved from the sub-section at its key.
    pub fn entry<E: Entry>(
        &mut self,
        name: &'static str,
        read: impl Fn(&T) -> &E + 'static,
        write: impl Fn(&mut T) -> &mut E + 'static,
    ) -> &mut Self {
        self.entry_with(name, FieldOptions::default(), read, write)
    }

    pub fn entry_with<E: Entry>(
        &mut self,
        name: &'static str,
        options: FieldOptions,
        read: impl Fn(&T) -> &E + 'static,
        write: impl Fn(&mut T) -> &mut E + 'static,
    ) -> &mut Self {
        let get = projector(move |obj| {
            let target = obj.downcast_ref::<T>()?;
            Some(read(target) as &dyn Any)
        });
        let set: Placer = Rc::new(move |obj: &mut dyn Any, nested: Box<dyn Any>| -> DomainResult<()> {
            let target = obj.downcast_mut::<T>().ok_or_else(foreign::<T>)?;
            let nested = nested.downcast::<E>().map_err(|_| foreign::<E>())?;
            *write(target) = *nested;
            Ok(())
        });
        self.push(name, TypeDesc::entry::<E>, options, Access::Entry { get, set });
        self
    }

    /// Inherit the fields of `B`, reached through the embedded base value.
    ///
    /// A later call replaces the earlier base.
    pub fn extends<B: Entry>(
        &mut self,
        read: impl Fn(&T) -> &B + 'static,
        write: impl Fn(&mut T) -> &mut B + 'static,
    ) -> &mut Self {
        let base = schema_of::<B>();
        let read: Rc<dyn Fn(&T) -> &B> = Rc::new(read);
        let write: Rc<dyn Fn(&mut T) -> &mut B> = Rc::new(write);
        self.inherited = base
            .fields()
            .iter()
            .cloned()
            .map(|mut field| {
                field.depth += 1;
                field.access = field.access.lift(Rc::clone(&read), Rc::clone(&write));
                field
            })
            .collect();
        self.base = Some(base.name());
        self
    }

    pub fn selection(&mut self, selection: FieldSelection) -> &mut Self {
        self.selection = Some(selection);
        self
    }

    pub fn resolver(&mut self, name: impl Into<String>) -> &mut Self {
        self.resolver = Some(name.into());
        self
    }

    /// Mark the type as not constructible by the resolvers.
    pub fn abstract_type(&mut self) -> &mut Self {
        self.is_abstract = true;
        self
    }

    fn build(self) -> ObjectSchema {
        let selection = self.selection.unwrap_or_default();
        let mut fields = self.declared;
        for field in &mut fields {
            field.owner_selection = selection;
        }
        fields.extend(self.inherited);
        ObjectSchema {
            type_id: TypeId::of::<T>(),
            name: short_type_name::<T>(),
            constructor: (!self.is_abstract).then_some(construct::<T> as fn() -> Box<dyn Any>),
            selection,
            resolver: self.resolver,
            fields,
            base: self.base,
        }
    }
}

thread_local! {
    static SCHEMAS: RefCell<HashMap<TypeId, Rc<ObjectSchema>>> = RefCell::new(HashMap::new());
}

/// Schema of `T`, built on first request and cached per thread.
pub fn schema_of<T: Entry>() -> Rc<ObjectSchema> {
    let id = TypeId::of::<T>();
    if let Some(schema) = SCHEMAS.with(|cache| cache.borrow().get(&id).cloned()) {
        return schema;
    }
    // describe() may request other schemas; no borrow is held here
    let mut builder = SchemaBuilder::<T>::new();
    T::describe(&mut builder);
    let schema = Rc::new(builder.build());
    SCHEMAS.with(|cache| Rc::clone(cache.borrow_mut().entry(id).or_insert(schema)))
}

/// Last path segment of a type name, without generic arguments.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let head = full.split('<').next().unwrap_or(full);
    head.rsplit("::").next().unwrap_or(head)
}
