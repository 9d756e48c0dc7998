pub use crate::diagnostics::{MappingError, ParameterCategory, Result};

pub mod argument;
pub mod coerce;
pub mod diagnostics;
pub mod mapper;
pub mod pass;
pub mod recorder;
pub mod repository;
pub mod syntax;
pub mod value;
