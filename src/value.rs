//! # Argument Values
//!
//! The closed set of shapes a front-end can hand to a recorder. Every argument the front-end
//! discovers has already been evaluated into one of these variants; nothing in this crate
//! looks at source text.
//!
//! Coercion never inspects variants ad hoc. It classifies a value once with
//! [`ArgumentValue::kind`] and matches the resulting [`ArgumentKind`] against the target.

use serde::{Deserialize, Serialize};

/// An integral value tagged with its width and signedness.
///
/// # Examples
///
/// ```rust
/// use paramap::value::IntegralValue;
/// assert_eq!(IntegralValue::I8(-1).widen(), -1);
/// assert_eq!(IntegralValue::U64(u64::MAX).widen(), u64::MAX as i128);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntegralValue {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
}

impl IntegralValue {
    /// Widens to `i128`, sign-extending signed sources and zero-extending unsigned ones.
    /// Every integral width fits, so this is lossless.
    pub fn widen(self) -> i128 {
        match self {
            IntegralValue::I8(v) => v as i128,
            IntegralValue::U8(v) => v as i128,
            IntegralValue::I16(v) => v as i128,
            IntegralValue::U16(v) => v as i128,
            IntegralValue::I32(v) => v as i128,
            IntegralValue::U32(v) => v as i128,
            IntegralValue::I64(v) => v as i128,
            IntegralValue::U64(v) => v as i128,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            IntegralValue::I8(_) => "i8",
            IntegralValue::U8(_) => "u8",
            IntegralValue::I16(_) => "i16",
            IntegralValue::U16(_) => "u16",
            IntegralValue::I32(_) => "i32",
            IntegralValue::U32(_) => "u32",
            IntegralValue::I64(_) => "i64",
            IntegralValue::U64(_) => "u64",
        }
    }
}

/// A value of some enumerated type, carried as its underlying integral representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
    pub type_name: String,
    pub value: IntegralValue,
}

impl EnumValue {
    pub fn new(type_name: impl Into<String>, value: IntegralValue) -> Self {
        Self {
            type_name: type_name.into(),
            value,
        }
    }
}

/// A reference to a type, as passed to type parameters or `typeof`-style arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A dynamically-typed argument value produced by the front-end.
///
/// # Examples
///
/// ```rust
/// use paramap::value::{ArgumentKind, ArgumentValue};
/// let v = ArgumentValue::from(3i32);
/// assert_eq!(v.kind(), ArgumentKind::Integral);
/// assert!(ArgumentValue::Null.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum ArgumentValue {
    #[default]
    Null,
    Bool(bool),
    Char(char),
    Integral(IntegralValue),
    F32(f32),
    F64(f64),
    String(String),
    Type(TypeRef),
    Enum(EnumValue),
    Array(Vec<ArgumentValue>),
}

/// Runtime classification of an [`ArgumentValue`], computed once per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentKind {
    Null,
    Enum,
    Integral,
    Floating,
    Text,
    Boolean,
    Character,
    Type,
    Array,
}

impl ArgumentValue {
    pub fn kind(&self) -> ArgumentKind {
        match self {
            ArgumentValue::Null => ArgumentKind::Null,
            ArgumentValue::Bool(_) => ArgumentKind::Boolean,
            ArgumentValue::Char(_) => ArgumentKind::Character,
            ArgumentValue::Integral(_) => ArgumentKind::Integral,
            ArgumentValue::F32(_) | ArgumentValue::F64(_) => ArgumentKind::Floating,
            ArgumentValue::String(_) => ArgumentKind::Text,
            ArgumentValue::Type(_) => ArgumentKind::Type,
            ArgumentValue::Enum(_) => ArgumentKind::Enum,
            ArgumentValue::Array(_) => ArgumentKind::Array,
        }
    }

    /// Returns the name of the runtime type, for logs.
    pub fn type_name(&self) -> &str {
        match self {
            ArgumentValue::Null => "null",
            ArgumentValue::Bool(_) => "bool",
            ArgumentValue::Char(_) => "char",
            ArgumentValue::Integral(v) => v.type_name(),
            ArgumentValue::F32(_) => "f32",
            ArgumentValue::F64(_) => "f64",
            ArgumentValue::String(_) => "string",
            ArgumentValue::Type(_) => "type",
            ArgumentValue::Enum(e) => &e.type_name,
            ArgumentValue::Array(_) => "array",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ArgumentValue::Null)
    }

    /// The underlying integral representation, for enum and integral values only.
    pub fn as_integral(&self) -> Option<IntegralValue> {
        match self {
            ArgumentValue::Integral(v) => Some(*v),
            ArgumentValue::Enum(e) => Some(e.value),
            _ => None,
        }
    }
}

macro_rules! impl_from_integral {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for IntegralValue {
                fn from(v: $ty) -> Self {
                    IntegralValue::$variant(v)
                }
            }

            impl From<$ty> for ArgumentValue {
                fn from(v: $ty) -> Self {
                    ArgumentValue::Integral(IntegralValue::$variant(v))
                }
            }
        )*
    };
}

impl_from_integral!(
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
);

impl From<bool> for ArgumentValue {
    fn from(v: bool) -> Self {
        ArgumentValue::Bool(v)
    }
}

impl From<char> for ArgumentValue {
    fn from(v: char) -> Self {
        ArgumentValue::Char(v)
    }
}

impl From<f32> for ArgumentValue {
    fn from(v: f32) -> Self {
        ArgumentValue::F32(v)
    }
}

impl From<f64> for ArgumentValue {
    fn from(v: f64) -> Self {
        ArgumentValue::F64(v)
    }
}

impl From<&str> for ArgumentValue {
    fn from(v: &str) -> Self {
        ArgumentValue::String(v.to_string())
    }
}

impl From<String> for ArgumentValue {
    fn from(v: String) -> Self {
        ArgumentValue::String(v)
    }
}

impl From<TypeRef> for ArgumentValue {
    fn from(v: TypeRef) -> Self {
        ArgumentValue::Type(v)
    }
}

impl From<EnumValue> for ArgumentValue {
    fn from(v: EnumValue) -> Self {
        ArgumentValue::Enum(v)
    }
}

impl<T: Into<ArgumentValue>> From<Option<T>> for ArgumentValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ArgumentValue::Null, Into::into)
    }
}

impl<T: Into<ArgumentValue>> From<Vec<T>> for ArgumentValue {
    fn from(v: Vec<T>) -> Self {
        ArgumentValue::Array(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod value_tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(ArgumentValue::Null.kind(), ArgumentKind::Null);
        assert_eq!(ArgumentValue::from(1.5f64).kind(), ArgumentKind::Floating);
        assert_eq!(ArgumentValue::from(1.5f32).kind(), ArgumentKind::Floating);
        assert_eq!(ArgumentValue::from("x").kind(), ArgumentKind::Text);
        assert_eq!(
            ArgumentValue::from(EnumValue::new("Color", IntegralValue::I32(2))).kind(),
            ArgumentKind::Enum
        );
        assert_eq!(ArgumentValue::from(vec![1i32, 2]).kind(), ArgumentKind::Array);
    }

    #[test]
    fn test_option_and_vec_conversions() {
        let v = ArgumentValue::from(vec![Some(1i32), None]);
        assert_eq!(
            v,
            ArgumentValue::Array(vec![ArgumentValue::from(1i32), ArgumentValue::Null])
        );
    }

    #[test]
    fn test_as_integral_reads_enum_representation() {
        let e = ArgumentValue::from(EnumValue::new("Flags", IntegralValue::U8(7)));
        assert_eq!(e.as_integral(), Some(IntegralValue::U8(7)));
        assert_eq!(e.type_name(), "Flags");
        assert_eq!(ArgumentValue::from(7.0f64).as_integral(), None);
    }
}
