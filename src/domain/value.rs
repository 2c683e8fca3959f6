//! Dynamically typed values exchanged between resolvers and typed fields.

use std::any::Any;
use std::fmt;

use crate::domain::node::TreeNode;
use crate::domain::types::{EnumDesc, TypeDesc};

/// One case of an enumeration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnumValue {
    pub desc: &'static EnumDesc,
    pub ordinal: usize,
}

impl EnumValue {
    pub fn name(&self) -> &'static str {
        self.desc.case(self.ordinal).unwrap_or("")
    }
}

/// Result of resolving a tree node against a [`TypeDesc`].
pub enum Value {
    Raw(TreeNode),
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    Optional(Option<Box<Value>>),
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Enum(EnumValue),
    /// Instance of an aggregate type.
    Object(Box<dyn Any>),
}

impl Value {
    pub fn some(value: Value) -> Self {
        Value::Optional(Some(Box::new(value)))
    }

    pub fn none() -> Self {
        Value::Optional(None)
    }

    /// Descriptor of the value as it is, without container generics.
    pub fn runtime_type(&self) -> TypeDesc {
        match self {
            Value::Raw(_) | Value::Object(_) => TypeDesc::any(),
            Value::Bool(_) => TypeDesc::bool(),
            Value::Byte(_) => TypeDesc::byte(),
            Value::Short(_) => TypeDesc::short(),
            Value::Int(_) => TypeDesc::int(),
            Value::Long(_) => TypeDesc::long(),
            Value::Float(_) => TypeDesc::float(),
            Value::Double(_) => TypeDesc::double(),
            Value::Str(_) => TypeDesc::string(),
            Value::Optional(_) => TypeDesc::optional_raw(),
            Value::List(_) => TypeDesc::list_raw(),
            Value::Map(_) => TypeDesc::map_raw(),
            Value::Enum(e) => TypeDesc::enumeration(e.desc),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Raw(_) => "raw",
            Value::Bool(_) => "bool",
            Value::Byte(_) => "i8",
            Value::Short(_) => "i16",
            Value::Int(_) => "i32",
            Value::Long(_) => "i64",
            Value::Float(_) => "f32",
            Value::Double(_) => "f64",
            Value::Str(_) => "string",
            Value::Optional(_) => "optional",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Enum(_) => "enum",
            Value::Object(_) => "object",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Raw(n) => f.debug_tuple("Raw").field(n).finish(),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Byte(v) => f.debug_tuple("Byte").field(v).finish(),
            Value::Short(v) => f.debug_tuple("Short").field(v).finish(),
            Value::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Value::Long(v) => f.debug_tuple("Long").field(v).finish(),
            Value::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Value::Double(v) => f.debug_tuple("Double").field(v).finish(),
            Value::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Value::Optional(v) => f.debug_tuple("Optional").field(v).finish(),
            Value::List(v) => f.debug_tuple("List").field(v).finish(),
            Value::Map(v) => f.debug_tuple("Map").field(v).finish(),
            Value::Enum(v) => write!(f, "Enum({}::{})", v.desc.name, v.name()),
            Value::Object(_) => write!(f, "Object(..)"),
        }
    }
}

/// Objects never compare equal; everything else compares structurally.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Raw(a), Value::Raw(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Optional(a), Value::Optional(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            _ => false,
        }
    }
}
