//! Parameter identities and the raw, not-yet-coerced arguments supplied for them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::syntax::ArgumentLocation;
use crate::value::ArgumentValue;

/// The key a parameter is registered under: a name and, for positional parameters, an index.
///
/// Two keys collide if their names compare equal under the active comparer, or if both have
/// an index and the indices are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterKey {
    pub name: String,
    pub index: Option<usize>,
}

impl ParameterKey {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    pub fn positional(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
        }
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}#{}", self.name, index),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A parameter as discovered by the front-end. Either part may fail to match a mapping.
///
/// An empty name means the front-end found no name; resolution then goes by index alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ParameterIdentity {
    pub name: String,
    pub index: Option<usize>,
}

impl ParameterIdentity {
    pub fn new(name: impl Into<String>, index: Option<usize>) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

impl From<ParameterKey> for ParameterIdentity {
    fn from(key: ParameterKey) -> Self {
        Self {
            name: key.name,
            index: key.index,
        }
    }
}

impl fmt::Display for ParameterIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}#{}", self.name, index),
            None => write!(f, "{}", self.name),
        }
    }
}

/// The argument supplied for a parameter, before coercion.
///
/// # Examples
///
/// ```rust
/// use paramap::argument::RawArgument;
/// use paramap::value::ArgumentValue;
/// let raw = RawArgument::ParamsList(vec![ArgumentValue::from(1i32), ArgumentValue::from(2i32)]);
/// assert_eq!(raw.variant_name(), "ParamsList");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawArgument {
    /// Not supplied; the parameter's default is used.
    Missing,
    Single(ArgumentValue),
    /// The expanded elements of a `params`-style argument.
    ParamsList(Vec<ArgumentValue>),
}

impl RawArgument {
    pub fn single(value: impl Into<ArgumentValue>) -> Self {
        RawArgument::Single(value.into())
    }

    pub fn params<T: Into<ArgumentValue>>(values: impl IntoIterator<Item = T>) -> Self {
        RawArgument::ParamsList(values.into_iter().map(Into::into).collect())
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            RawArgument::Missing => "Missing",
            RawArgument::Single(_) => "Single",
            RawArgument::ParamsList(_) => "ParamsList",
        }
    }

    /// Whether `location` has the shape this argument needs: `Default` for `Missing`, `Value`
    /// for `Single`, and `Params` with one element location per value for `ParamsList`.
    pub fn matches_location(&self, location: &ArgumentLocation) -> bool {
        match (self, location) {
            (RawArgument::Missing, ArgumentLocation::Default(_)) => true,
            (RawArgument::Single(_), ArgumentLocation::Value(_)) => true,
            (RawArgument::ParamsList(values), ArgumentLocation::Params(params)) => {
                values.len() == params.elements.len()
            }
            _ => false,
        }
    }
}

impl From<ArgumentValue> for RawArgument {
    fn from(value: ArgumentValue) -> Self {
        RawArgument::Single(value)
    }
}

#[cfg(test)]
mod argument_tests {
    use super::*;
    use crate::syntax::{Location, ParamsLocation, Span};

    #[test]
    fn test_location_shape_must_match_variant() {
        let at = Location::at(Span::new(0, 1));
        let single = RawArgument::single(1i32);
        assert!(single.matches_location(&ArgumentLocation::Value(at.clone())));
        assert!(!single.matches_location(&ArgumentLocation::Default(at.clone())));

        let params = RawArgument::params([1i32, 2]);
        let short = ArgumentLocation::Params(ParamsLocation {
            collection: at.clone(),
            elements: vec![at.clone()],
        });
        let exact = ArgumentLocation::Params(ParamsLocation {
            collection: at.clone(),
            elements: vec![at.clone(), at],
        });
        assert!(!params.matches_location(&short));
        assert!(params.matches_location(&exact));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(ParameterKey::positional("T1", 0).to_string(), "T1#0");
        assert_eq!(ParameterKey::named("Name").to_string(), "Name");
    }
}
