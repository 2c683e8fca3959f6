//! Conversion between typed Rust values and [`Value`].
//!
//! `Bind` replaces runtime type inspection: every bindable type states its
//! [`TypeDesc`] up front and knows how to move in and out of a `Value`.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::TreeNode;
use crate::domain::types::TypeDesc;
use crate::domain::value::Value;

pub trait Bind: Sized + 'static {
    fn type_desc() -> TypeDesc;

    fn from_value(value: Value) -> DomainResult<Self>;

    fn to_value(&self) -> Value;
}

fn mismatch<T: Bind>(found: &Value) -> DomainError {
    DomainError::mismatch(T::type_desc().name(), found.kind_name())
}

macro_rules! bind_copy {
    ($($ty:ty => $desc:ident, $variant:ident;)+) => {
        $(
            impl Bind for $ty {
                fn type_desc() -> TypeDesc {
                    TypeDesc::$desc()
                }

                fn from_value(value: Value) -> DomainResult<Self> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(mismatch::<Self>(&other)),
                    }
                }

                fn to_value(&self) -> Value {
                    Value::$variant(*self)
                }
            }
        )+
    };
}

bind_copy! {
    bool => bool, Bool;
    i8 => byte, Byte;
    i16 => short, Short;
    i32 => int, Int;
    i64 => long, Long;
    f32 => float, Float;
    f64 => double, Double;
}

impl Bind for String {
    fn type_desc() -> TypeDesc {
        TypeDesc::string()
    }

    fn from_value(value: Value) -> DomainResult<Self> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl Bind for TreeNode {
    fn type_desc() -> TypeDesc {
        TypeDesc::any()
    }

    fn from_value(value: Value) -> DomainResult<Self> {
        match value {
            Value::Raw(node) => Ok(node),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Raw(self.clone())
    }
}

impl<T: Bind> Bind for Option<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::optional(T::type_desc())
    }

    fn from_value(value: Value) -> DomainResult<Self> {
        match value {
            Value::Optional(None) => Ok(None),
            Value::Optional(Some(inner)) => T::from_value(*inner).map(Some),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => Value::some(v.to_value()),
            None => Value::none(),
        }
    }
}

impl<T: Bind> Bind for Vec<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::list(T::type_desc())
    }

    fn from_value(value: Value) -> DomainResult<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Bind::to_value).collect())
    }
}

impl<K: Bind + Ord, V: Bind> Bind for BTreeMap<K, V> {
    fn type_desc() -> TypeDesc {
        TypeDesc::map(K::type_desc(), V::type_desc())
    }

    fn from_value(value: Value) -> DomainResult<Self> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }
}

impl<K: Bind + Eq + Hash, V: Bind> Bind for HashMap<K, V> {
    fn type_desc() -> TypeDesc {
        TypeDesc::map(K::type_desc(), V::type_desc())
    }

    fn from_value(value: Value) -> DomainResult<Self> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }
}

/// Implement [`Bind`] for a fieldless enum. Declaration order is ordinal order.
///
/// ```
/// #[derive(Debug, Default, PartialEq)]
/// enum Level { #[default] Low, High }
/// cfgbind::bind_enum!(Level { Low, High });
/// ```
#[macro_export]
macro_rules! bind_enum {
    ($ty:ident { $($case:ident),+ $(,)? }) => {
        const _: () = {
            static DESC: $crate::domain::types::EnumDesc = $crate::domain::types::EnumDesc {
                name: stringify!($ty),
                cases: &[$(stringify!($case)),+],
            };

            impl $crate::domain::bind::Bind for $ty {
                fn type_desc() -> $crate::domain::types::TypeDesc {
                    $crate::domain::types::TypeDesc::enumeration(&DESC)
                }

                fn from_value(
                    value: $crate::domain::value::Value,
                ) -> $crate::domain::error::DomainResult<Self> {
                    match value {
                        $crate::domain::value::Value::Enum(e) => match e.name() {
                            $(stringify!($case) => Ok($ty::$case),)+
                            other => Err($crate::domain::error::DomainError::mismatch(
                                stringify!($ty),
                                other,
                            )),
                        },
                        other => Err($crate::domain::error::DomainError::mismatch(
                            stringify!($ty),
                            other.kind_name(),
                        )),
                    }
                }

                fn to_value(&self) -> $crate::domain::value::Value {
                    let name = match self {
                        $($ty::$case => stringify!($case),)+
                    };
                    $crate::domain::value::Value::Enum($crate::domain::value::EnumValue {
                        desc: &DESC,
                        ordinal: DESC.ordinal_of(name).unwrap_or_default(),
                    })
                }
            }
        };
    };
}
