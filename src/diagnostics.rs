//!
//! # Configuration Defects
//!
//! This module defines the single, `miette`-based error type for the crate. Only
//! *configuration defects* are errors: duplicate keys, building a repository twice when that
//! is disallowed, reentrant population, or a population routine that reports its own failure.
//!
//! Per-argument outcomes (a value that fails coercion, a callback that rejects, a parameter
//! that is not mapped) are never errors. They are plain `bool`, `Option` or
//! [`CoercionOutcome`](crate::coerce::CoercionOutcome) values.
//!
//! # Error Construction
//!
//! - **Use `mapping_err!` for message-only population failures.**
//!   - `mapping_err!("missing mapping for {}", name)`
//! - Structured variants (`DuplicateName`, `DuplicateIndex`, ...) are constructed directly by
//!   the repository, which owns the data they describe.

use miette::Diagnostic;
use thiserror::Error;

/// Crate-wide result alias. The error defaults to [`MappingError`].
pub type Result<T, E = MappingError> = std::result::Result<T, E>;

/// Which sub-repository a defect was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterCategory {
    Type,
    Constructor,
    Named,
}

impl ParameterCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterCategory::Type => "type",
            ParameterCategory::Constructor => "constructor",
            ParameterCategory::Named => "named",
        }
    }
}

impl std::fmt::Display for ParameterCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A configuration defect. Always raised at population or build time, never while recording.
///
/// `Clone` so a mapper can memoise a failed population and hand the same defect to every
/// later caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum MappingError {
    #[error("{category} parameter '{name}' collides with the already mapped parameter '{existing}'")]
    #[diagnostic(
        code(paramap::duplicate_name),
        help("each parameter name may be mapped once; names are compared with the mapper's comparer")
    )]
    DuplicateName {
        category: ParameterCategory,
        name: String,
        existing: String,
    },

    #[error("{category} parameter '{name}' reuses index {index}, already mapped by '{existing}'")]
    #[diagnostic(
        code(paramap::duplicate_index),
        help("each ordinal position may be mapped once")
    )]
    DuplicateIndex {
        category: ParameterCategory,
        name: String,
        index: usize,
        existing: String,
    },

    #[error("cannot add {category} parameter '{name}': the repository has already been built")]
    #[diagnostic(code(paramap::already_built))]
    AlreadyBuilt {
        category: ParameterCategory,
        name: String,
    },

    #[error("the {category} parameter repository has already been built")]
    #[diagnostic(
        code(paramap::multiple_builds),
        help("set `throw_on_multiple_builds = false` to receive independent snapshots instead")
    )]
    MultipleBuilds { category: ParameterCategory },

    #[error("the mapping population routine re-entered its own mapper")]
    #[diagnostic(
        code(paramap::reentrant_population),
        help("do not resolve parameters from inside `MappingSource::populate`")
    )]
    ReentrantPopulation,

    #[error("mapping population failed: {message}")]
    #[diagnostic(code(paramap::population))]
    Population { message: String },
}

impl MappingError {
    /// Returns the sub-repository the defect belongs to, if it is tied to one.
    pub fn category(&self) -> Option<ParameterCategory> {
        match self {
            MappingError::DuplicateName { category, .. }
            | MappingError::DuplicateIndex { category, .. }
            | MappingError::AlreadyBuilt { category, .. }
            | MappingError::MultipleBuilds { category } => Some(*category),
            MappingError::ReentrantPopulation | MappingError::Population { .. } => None,
        }
    }
}

/// Constructs a [`MappingError::Population`] with a formatted message.
///
/// Intended for `MappingSource::populate` implementations that need to abort population for
/// reasons of their own.
#[macro_export]
macro_rules! mapping_err {
    ($msg:expr) => {
        $crate::MappingError::Population {
            message: format!("{}", $msg),
        }
    };
    ($msg:expr, $($arg:expr),+ $(,)?) => {
        $crate::MappingError::Population {
            message: format!($msg, $($arg),+),
        }
    };
}

#[cfg(test)]
mod diagnostics_tests {
    use miette::{Diagnostic, Report};

    use super::*;

    #[test]
    fn test_duplicate_name_renders_help() {
        let err = MappingError::DuplicateName {
            category: ParameterCategory::Type,
            name: "t1".to_string(),
            existing: "T1".to_string(),
        };
        let help = err.help().map(|help| help.to_string());
        assert_eq!(
            help.as_deref(),
            Some("each parameter name may be mapped once; names are compared with the mapper's comparer")
        );
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("type parameter 't1'"));
    }

    #[test]
    fn test_mapping_err_macro_formats() {
        let err = mapping_err!("no mapping for {} at {}", "Value", 3);
        assert_eq!(
            err,
            MappingError::Population {
                message: "no mapping for Value at 3".to_string()
            }
        );
        assert_eq!(err.category(), None);
    }

    #[test]
    fn test_category_of_structured_defects() {
        let err = MappingError::MultipleBuilds {
            category: ParameterCategory::Named,
        };
        assert_eq!(err.category(), Some(ParameterCategory::Named));
        assert_eq!(err.to_string(), "the named parameter repository has already been built");
    }
}
