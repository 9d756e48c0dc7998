//! Driving a whole set of discovered arguments through a mapper.
//!
//! A front-end discovers arguments in whatever order it meets them. [`record_arguments`]
//! resolves and records each one and keeps going past unmapped or rejected parameters, so
//! one bad argument never hides the outcome of the others. The caller gets a [`PassReport`]
//! and decides what an overall failure means.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::argument::{ParameterIdentity, RawArgument};
use crate::diagnostics::Result;
use crate::mapper::{Mapper, MappingSource};
use crate::recorder::Recorder;
use crate::syntax::ArgumentLocation;

/// Which kind of parameter the front-end found, and how it identified it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscoveredParameter {
    Type(ParameterIdentity),
    Constructor(ParameterIdentity),
    Named(String),
}

impl fmt::Display for DiscoveredParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveredParameter::Type(identity) => write!(f, "type parameter {identity}"),
            DiscoveredParameter::Constructor(identity) => write!(f, "constructor parameter {identity}"),
            DiscoveredParameter::Named(name) => write!(f, "named parameter {name}"),
        }
    }
}

/// One `(parameter, argument, location?)` triple from the front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredArgument {
    pub parameter: DiscoveredParameter,
    pub raw: RawArgument,
    #[serde(default)]
    pub location: Option<ArgumentLocation>,
}

/// Outcome of one pass, grouped by result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub recorded: Vec<DiscoveredParameter>,
    pub rejected: Vec<DiscoveredParameter>,
    pub unmapped: Vec<DiscoveredParameter>,
}

impl PassReport {
    /// True when every argument was mapped and recorded.
    pub fn is_success(&self) -> bool {
        self.rejected.is_empty() && self.unmapped.is_empty()
    }

    pub fn total(&self) -> usize {
        self.recorded.len() + self.rejected.len() + self.unmapped.len()
    }
}

impl<R, S: MappingSource<R>> Mapper<R, S> {
    /// Resolves any kind of discovered parameter.
    pub fn resolve<'r>(
        &self,
        parameter: &DiscoveredParameter,
        record: &'r mut R,
    ) -> Result<Option<Recorder<'r, R>>> {
        match parameter {
            DiscoveredParameter::Type(identity) => self.resolve_type_parameter(identity, record),
            DiscoveredParameter::Constructor(identity) => {
                self.resolve_constructor_parameter(identity, record)
            }
            DiscoveredParameter::Named(name) => self.resolve_named_parameter(name, record),
        }
    }
}

/// Records every argument into `record`.
///
/// # Errors
/// Only configuration defects from the mapper's one-time population. Unmapped and rejected
/// arguments are reported in the [`PassReport`].
pub fn record_arguments<R, S, I>(
    mapper: &Mapper<R, S>,
    record: &mut R,
    arguments: I,
) -> Result<PassReport>
where
    S: MappingSource<R>,
    I: IntoIterator<Item = DiscoveredArgument>,
{
    let mut report = PassReport::default();
    for argument in arguments {
        let Some(mut recorder) = mapper.resolve(&argument.parameter, record)? else {
            report.unmapped.push(argument.parameter);
            continue;
        };
        if recorder.try_record(&argument.raw, argument.location.as_ref()) {
            report.recorded.push(argument.parameter);
        } else {
            debug!(parameter = %argument.parameter, raw = argument.raw.variant_name(), "argument rejected");
            report.rejected.push(argument.parameter);
        }
    }
    if !report.is_success() {
        warn!(
            recorded = report.recorded.len(),
            rejected = report.rejected.len(),
            unmapped = report.unmapped.len(),
            "argument pass incomplete"
        );
    }
    Ok(report)
}
