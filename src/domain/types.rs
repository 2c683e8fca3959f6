//! Type descriptors driving resolver dispatch.

use std::any::TypeId;
use std::fmt;
use std::rc::Rc;

use crate::domain::schema::{schema_of, short_type_name, Entry, ObjectSchema};

/// Declared cases of an enumeration, in ordinal order.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumDesc {
    pub name: &'static str,
    pub cases: &'static [&'static str],
}

impl EnumDesc {
    pub fn ordinal_of(&self, case: &str) -> Option<usize> {
        self.cases.iter().position(|c| *c == case)
    }

    pub fn case(&self, ordinal: usize) -> Option<&'static str> {
        self.cases.get(ordinal).copied()
    }
}

/// Handle to an aggregate type; its schema is built on first use.
#[derive(Clone, Copy)]
pub struct EntryDesc {
    type_id: TypeId,
    name: &'static str,
    schema: fn() -> Rc<ObjectSchema>,
}

impl EntryDesc {
    pub fn of<T: Entry>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: short_type_name::<T>(),
            schema: schema_of::<T>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn schema(&self) -> Rc<ObjectSchema> {
        (self.schema)()
    }
}

impl fmt::Debug for EntryDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryDesc({})", self.name)
    }
}

impl PartialEq for EntryDesc {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeKind {
    /// Opaque: the raw node is passed through.
    Any,
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    OptionalInt,
    OptionalLong,
    OptionalDouble,
    Optional,
    List,
    Map,
    Enum(&'static EnumDesc),
    Entry(EntryDesc),
}

/// A type kind plus its generic arguments, when known.
///
/// Containers built without generics fall back to opaque elements
/// (and string keys for maps).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDesc {
    kind: TypeKind,
    generics: Option<Vec<TypeDesc>>,
}

impl TypeDesc {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            generics: None,
        }
    }

    pub fn with_generics(kind: TypeKind, generics: Vec<TypeDesc>) -> Self {
        Self {
            kind,
            generics: Some(generics),
        }
    }

    pub fn any() -> Self {
        Self::new(TypeKind::Any)
    }

    pub fn bool() -> Self {
        Self::new(TypeKind::Bool)
    }

    pub fn byte() -> Self {
        Self::new(TypeKind::Byte)
    }

    pub fn short() -> Self {
        Self::new(TypeKind::Short)
    }

    pub fn int() -> Self {
        Self::new(TypeKind::Int)
    }

    pub fn long() -> Self {
        Self::new(TypeKind::Long)
    }

    pub fn float() -> Self {
        Self::new(TypeKind::Float)
    }

    pub fn double() -> Self {
        Self::new(TypeKind::Double)
    }

    pub fn string() -> Self {
        Self::new(TypeKind::String)
    }

    /// Optional of `inner`; int/long/double become the dedicated numeric wrappers.
    pub fn optional(inner: TypeDesc) -> Self {
        match inner.kind {
            TypeKind::Int => Self::new(TypeKind::OptionalInt),
            TypeKind::Long => Self::new(TypeKind::OptionalLong),
            TypeKind::Double => Self::new(TypeKind::OptionalDouble),
            _ => Self::with_generics(TypeKind::Optional, vec![inner]),
        }
    }

    /// Optional without generic metadata: the raw node is wrapped as-is.
    pub fn optional_raw() -> Self {
        Self::new(TypeKind::Optional)
    }

    pub fn list(element: TypeDesc) -> Self {
        Self::with_generics(TypeKind::List, vec![element])
    }

    pub fn list_raw() -> Self {
        Self::new(TypeKind::List)
    }

    pub fn map(key: TypeDesc, value: TypeDesc) -> Self {
        Self::with_generics(TypeKind::Map, vec![key, value])
    }

    pub fn map_raw() -> Self {
        Self::new(TypeKind::Map)
    }

    pub fn enumeration(desc: &'static EnumDesc) -> Self {
        Self::new(TypeKind::Enum(desc))
    }

    pub fn entry<T: Entry>() -> Self {
        Self::new(TypeKind::Entry(EntryDesc::of::<T>()))
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn generics(&self) -> Option<&[TypeDesc]> {
        self.generics.as_deref()
    }

    /// Generic argument at `index`, if present.
    pub fn generic(&self, index: usize) -> Option<&TypeDesc> {
        self.generics.as_ref().and_then(|g| g.get(index))
    }

    pub fn entry_desc(&self) -> Option<EntryDesc> {
        match self.kind {
            TypeKind::Entry(desc) => Some(desc),
            _ => None,
        }
    }

    /// Schema of an aggregate type.
    pub fn schema(&self) -> Option<Rc<ObjectSchema>> {
        self.entry_desc().map(|d| d.schema())
    }

    pub fn is_entry(&self) -> bool {
        matches!(self.kind, TypeKind::Entry(_))
    }

    /// Scalar kinds served by the resolver `as_*` helpers.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Bool
                | TypeKind::Byte
                | TypeKind::Short
                | TypeKind::Int
                | TypeKind::Long
                | TypeKind::Float
                | TypeKind::Double
        )
    }

    /// Kinds that resolve an absent node to a value instead of failing.
    pub fn accepts_absent(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Any
                | TypeKind::OptionalInt
                | TypeKind::OptionalLong
                | TypeKind::OptionalDouble
                | TypeKind::Optional
                | TypeKind::List
                | TypeKind::Map
        )
    }

    pub fn name(&self) -> String {
        let base = match self.kind {
            TypeKind::Any => "any",
            TypeKind::Bool => "bool",
            TypeKind::Byte => "i8",
            TypeKind::Short => "i16",
            TypeKind::Int => "i32",
            TypeKind::Long => "i64",
            TypeKind::Float => "f32",
            TypeKind::Double => "f64",
            TypeKind::String => "String",
            TypeKind::OptionalInt => "Option<i32>",
            TypeKind::OptionalLong => "Option<i64>",
            TypeKind::OptionalDouble => "Option<f64>",
            TypeKind::Optional => "Option",
            TypeKind::List => "Vec",
            TypeKind::Map => "Map",
            TypeKind::Enum(desc) => desc.name,
            TypeKind::Entry(desc) => desc.name,
        };
        match &self.generics {
            Some(args) if !args.is_empty() => {
                let args: Vec<String> = args.iter().map(TypeDesc::name).collect();
                format!("{base}<{}>", args.join(", "))
            }
            _ => base.to_string(),
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
