//! Source-location handles threaded through syntax-aware (combined and syntactic) recorders.
//!
//! Locations are opaque to this crate: they are produced by the front-end and passed back to
//! user callbacks untouched. They never influence whether a value is accepted.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

// All locations carry a span for source tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A location in some source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    pub file: Option<Arc<str>>,
    pub span: Span,
}

impl Location {
    pub fn new(file: impl Into<Arc<str>>, span: Span) -> Self {
        Self {
            file: Some(file.into()),
            span,
        }
    }

    /// A location with a span but no file, as used by in-memory front-ends.
    pub fn at(span: Span) -> Self {
        Self { file: None, span }
    }
}

/// Locations of a `params`-style argument: the whole collection plus one per element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ParamsLocation {
    pub collection: Location,
    pub elements: Vec<Location>,
}

/// The location tag running parallel to a [`RawArgument`](crate::argument::RawArgument).
///
/// | raw argument | location |
/// |--------------|----------|
/// | `Missing`    | `Default`, the place where the default value was used |
/// | `Single`     | `Value` |
/// | `ParamsList` | `Params` |
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArgumentLocation {
    Default(Location),
    Value(Location),
    Params(ParamsLocation),
}

impl ArgumentLocation {
    /// The outermost location, regardless of shape.
    pub fn primary(&self) -> &Location {
        match self {
            ArgumentLocation::Default(location) | ArgumentLocation::Value(location) => location,
            ArgumentLocation::Params(params) => &params.collection,
        }
    }
}
