//! # Argument Coercion
//!
//! Converts an untyped [`ArgumentValue`] into the exact static type a recorder expects.
//!
//! ## Policy
//!
//! 1. `Null` is accepted only by nullable element policies, as `None`.
//! 2. Enum targets ([`ArgumentEnum`]) accept any enum or integral value and reinterpret its
//!    underlying bits as the target's representation. Values are not range checked.
//!    Floating, text, boolean and character values are rejected.
//! 3. Every other target accepts only its own runtime type. There is no numeric widening or
//!    narrowing: an `f64` never becomes an `i32`, and an enum value never becomes its
//!    underlying integral type. [`ArgumentValue`] itself is the one open target and accepts
//!    any non-null value.
//! 4. Collections coerce each element under (1)-(3) and are atomic: one rejected element
//!    rejects the whole collection.
//!
//! Coercion is a pure computation. It never panics and never returns an error; rejection is
//! the ordinary [`CoercionOutcome::Rejected`] value.

use crate::value::{ArgumentKind, ArgumentValue, EnumValue, TypeRef};

pub mod adapters;

pub use adapters::Adapter;

// ============================================================================
// OUTCOME
// ============================================================================

/// The result of coercing one argument.
///
/// # Examples
///
/// ```rust
/// use paramap::coerce::{coerce_value, CoercionOutcome};
/// use paramap::value::ArgumentValue;
/// assert_eq!(coerce_value::<i32>(&ArgumentValue::from(4i32)), CoercionOutcome::Accepted(4));
/// assert_eq!(coerce_value::<i32>(&ArgumentValue::from(4.0f64)), CoercionOutcome::Rejected);
/// ```
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoercionOutcome<T> {
    Accepted(T),
    Rejected,
}

impl<T> CoercionOutcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CoercionOutcome::Accepted(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            CoercionOutcome::Accepted(value) => Some(value),
            CoercionOutcome::Rejected => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CoercionOutcome<U> {
        match self {
            CoercionOutcome::Accepted(value) => CoercionOutcome::Accepted(f(value)),
            CoercionOutcome::Rejected => CoercionOutcome::Rejected,
        }
    }
}

impl<T> From<Option<T>> for CoercionOutcome<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(CoercionOutcome::Rejected, CoercionOutcome::Accepted)
    }
}

// ============================================================================
// TARGET TYPES
// ============================================================================

/// A type a non-null argument can be coerced into.
///
/// Implementations only see non-null values; nullability is handled by the element policies
/// in this module.
pub trait FromArgument: Sized {
    fn from_argument(value: &ArgumentValue) -> CoercionOutcome<Self>;
}

/// A primitive integral type that can hold an enum's underlying representation.
pub trait Integral: Copy + Send + Sync + 'static {
    /// Truncates a widened value to this width, as an `as` cast does.
    fn wrapping_from_i128(value: i128) -> Self;
}

/// An enumerated target type.
///
/// Because enum coercion does not range check, `from_repr` must accept every value of
/// `Repr`. Newtypes over the representation (see [`argument_enum!`](crate::argument_enum))
/// satisfy that directly.
pub trait ArgumentEnum: Sized {
    type Repr: Integral;

    fn from_repr(repr: Self::Repr) -> Self;
}

/// Coerces a non-null value into an enum target.
pub fn coerce_enum<T: ArgumentEnum>(value: &ArgumentValue) -> CoercionOutcome<T> {
    match value.kind() {
        ArgumentKind::Enum | ArgumentKind::Integral => value
            .as_integral()
            .map(|bits| T::from_repr(T::Repr::wrapping_from_i128(bits.widen())))
            .into(),
        ArgumentKind::Null
        | ArgumentKind::Floating
        | ArgumentKind::Text
        | ArgumentKind::Boolean
        | ArgumentKind::Character
        | ArgumentKind::Type
        | ArgumentKind::Array => CoercionOutcome::Rejected,
    }
}

macro_rules! impl_integral_targets {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Integral for $ty {
                fn wrapping_from_i128(value: i128) -> Self {
                    value as $ty
                }
            }

            impl FromArgument for $ty {
                fn from_argument(value: &ArgumentValue) -> CoercionOutcome<Self> {
                    match value {
                        ArgumentValue::Integral($crate::value::IntegralValue::$variant(v)) => {
                            CoercionOutcome::Accepted(*v)
                        }
                        _ => CoercionOutcome::Rejected,
                    }
                }
            }
        )*
    };
}

impl_integral_targets!(
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
);

macro_rules! impl_exact_targets {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromArgument for $ty {
                fn from_argument(value: &ArgumentValue) -> CoercionOutcome<Self> {
                    match value {
                        ArgumentValue::$variant(v) => CoercionOutcome::Accepted(v.clone()),
                        _ => CoercionOutcome::Rejected,
                    }
                }
            }
        )*
    };
}

impl_exact_targets!(
    bool => Bool,
    char => Char,
    f32 => F32,
    f64 => F64,
    String => String,
    TypeRef => Type,
    EnumValue => Enum,
);

impl FromArgument for ArgumentValue {
    fn from_argument(value: &ArgumentValue) -> CoercionOutcome<Self> {
        match value {
            ArgumentValue::Null => CoercionOutcome::Rejected,
            other => CoercionOutcome::Accepted(other.clone()),
        }
    }
}

/// Implements [`FromArgument`] for an enum target.
///
/// Two forms:
///
/// - `argument_enum!(MyEnum);` for a type that already implements [`ArgumentEnum`];
/// - `argument_enum!(pub struct Flags(u8));` defines a representation newtype and implements
///   both traits for it.
///
/// # Examples
///
/// ```rust
/// use paramap::argument_enum;
/// use paramap::coerce::{coerce_value, CoercionOutcome};
/// use paramap::value::ArgumentValue;
///
/// argument_enum!(pub struct Level(u8));
///
/// assert_eq!(coerce_value::<Level>(&ArgumentValue::from(-1i32)), CoercionOutcome::Accepted(Level(255)));
/// assert_eq!(coerce_value::<Level>(&ArgumentValue::from("1")), CoercionOutcome::Rejected);
/// ```
#[macro_export]
macro_rules! argument_enum {
    ($(#[$meta:meta])* $vis:vis struct $name:ident($repr:ty) $(;)?) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis struct $name(pub $repr);

        impl $crate::coerce::ArgumentEnum for $name {
            type Repr = $repr;

            fn from_repr(repr: $repr) -> Self {
                $name(repr)
            }
        }

        $crate::argument_enum!($name);
    };
    ($ty:ty) => {
        impl $crate::coerce::FromArgument for $ty {
            fn from_argument(
                value: &$crate::value::ArgumentValue,
            ) -> $crate::coerce::CoercionOutcome<Self> {
                $crate::coerce::coerce_enum::<$ty>(value)
            }
        }
    };
}

// ============================================================================
// ELEMENT POLICIES
// ============================================================================

/// Non-nullable single value.
pub fn coerce_value<T: FromArgument>(value: &ArgumentValue) -> CoercionOutcome<T> {
    match value {
        ArgumentValue::Null => CoercionOutcome::Rejected,
        other => T::from_argument(other),
    }
}

/// Nullable single value: `Null` becomes `None`.
pub fn coerce_nullable<T: FromArgument>(value: &ArgumentValue) -> CoercionOutcome<Option<T>> {
    match value {
        ArgumentValue::Null => CoercionOutcome::Accepted(None),
        other => T::from_argument(other).map(Some),
    }
}

/// Non-null collection of non-null elements.
pub fn coerce_collection<T: FromArgument>(value: &ArgumentValue) -> CoercionOutcome<Vec<T>> {
    coerce_elements(value, coerce_value::<T>)
}

/// Collection that may itself be `Null`, of non-null elements.
pub fn coerce_nullable_collection<T: FromArgument>(
    value: &ArgumentValue,
) -> CoercionOutcome<Option<Vec<T>>> {
    match value {
        ArgumentValue::Null => CoercionOutcome::Accepted(None),
        other => coerce_elements(other, coerce_value::<T>).map(Some),
    }
}

/// Non-null collection whose elements may be `Null`.
pub fn coerce_collection_of_nullable<T: FromArgument>(
    value: &ArgumentValue,
) -> CoercionOutcome<Vec<Option<T>>> {
    coerce_elements(value, coerce_nullable::<T>)
}

/// Collection that may be `Null`, whose elements may also be `Null`.
pub fn coerce_nullable_collection_of_nullable<T: FromArgument>(
    value: &ArgumentValue,
) -> CoercionOutcome<Option<Vec<Option<T>>>> {
    match value {
        ArgumentValue::Null => CoercionOutcome::Accepted(None),
        other => coerce_elements(other, coerce_nullable::<T>).map(Some),
    }
}

// All-or-nothing: the first rejected element rejects the collection.
fn coerce_elements<T>(
    value: &ArgumentValue,
    element: fn(&ArgumentValue) -> CoercionOutcome<T>,
) -> CoercionOutcome<Vec<T>> {
    let ArgumentValue::Array(items) = value else {
        return CoercionOutcome::Rejected;
    };
    items
        .iter()
        .map(|item| element(item).into_option())
        .collect::<Option<Vec<T>>>()
        .into()
}
