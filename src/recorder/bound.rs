//! Recorders bound to a destination record.
//!
//! A [`Recorder`] is what the mapper hands back for a resolved parameter: the parameter's
//! providers plus a mutable borrow of the record the values are written into. It is created
//! per resolution call and holds no other state.

use std::sync::Arc;

use tracing::trace;

use super::{ConstructorParameterKind, ConstructorProvider, DefaultRecorder, RecorderProvider};
use crate::argument::{ParameterKey, RawArgument};
use crate::syntax::{ArgumentLocation, Location};
use crate::value::ArgumentValue;

pub(crate) enum Binding<R> {
    /// Type and named parameters: single values only.
    Value(Arc<RecorderProvider<R>>),
    Constructor(Arc<ConstructorProvider<R>>),
}

/// A resolved parameter bound to a record.
pub struct Recorder<'r, R> {
    record: &'r mut R,
    parameter: ParameterKey,
    binding: Binding<R>,
}

impl<'r, R> Recorder<'r, R> {
    pub(crate) fn new(record: &'r mut R, parameter: ParameterKey, binding: Binding<R>) -> Self {
        Self {
            record,
            parameter,
            binding,
        }
    }

    /// The key of the mapping this recorder was resolved to.
    pub fn parameter(&self) -> &ParameterKey {
        &self.parameter
    }

    /// The declaration kind, for constructor parameters.
    pub fn constructor_kind(&self) -> Option<ConstructorParameterKind> {
        match &self.binding {
            Binding::Value(_) => None,
            Binding::Constructor(provider) => Some(provider.kind()),
        }
    }

    /// Records `raw`, with its location when the caller has one.
    ///
    /// Returns `false` when the raw variant is not accepted by this parameter, when the
    /// location's shape does not match the raw variant, when coercion rejects the value, or
    /// when the user callback rejects it.
    pub fn try_record(&mut self, raw: &RawArgument, location: Option<&ArgumentLocation>) -> bool {
        if let Some(location) = location {
            if !raw.matches_location(location) {
                trace!(
                    parameter = %self.parameter,
                    raw = raw.variant_name(),
                    "location shape does not match argument"
                );
                return false;
            }
        }
        if !self.accepts(raw) {
            trace!(
                parameter = %self.parameter,
                raw = raw.variant_name(),
                "argument variant not accepted by parameter"
            );
            return false;
        }
        match raw {
            RawArgument::Missing => self.record_default(location.map(ArgumentLocation::primary)),
            RawArgument::Single(value) => self.record_value(value, location),
            RawArgument::ParamsList(values) => {
                let collection = ArgumentValue::Array(values.clone());
                self.record_value(&collection, location)
            }
        }
    }

    /// Records through the semantic view only.
    pub fn try_record_semantic(&mut self, raw: &RawArgument) -> bool {
        self.try_record(raw, None)
    }

    /// Records through the combined view only, never falling back to the semantic view.
    pub fn try_record_combined(&mut self, raw: &RawArgument, location: &ArgumentLocation) -> bool {
        if !raw.matches_location(location) || !self.accepts(raw) {
            return false;
        }
        match raw {
            RawArgument::Missing => match default_of(&self.binding) {
                Some(default) => default.record_located(self.record, location.primary()),
                None => false,
            },
            RawArgument::Single(value) => {
                recorders_of(&self.binding).record_combined(self.record, value, location)
            }
            RawArgument::ParamsList(values) => {
                let collection = ArgumentValue::Array(values.clone());
                recorders_of(&self.binding).record_combined(self.record, &collection, location)
            }
        }
    }

    /// Records only the location, through the syntactic view.
    pub fn try_record_syntactic(&mut self, location: &ArgumentLocation) -> bool {
        let accepted = match (location, self.constructor_kind()) {
            (ArgumentLocation::Value(_), _) => true,
            (ArgumentLocation::Params(_), Some(ConstructorParameterKind::Params)) => true,
            (ArgumentLocation::Default(_), Some(ConstructorParameterKind::Optional)) => true,
            _ => false,
        };
        if !accepted {
            return false;
        }
        match location {
            ArgumentLocation::Default(default_location) => match default_of(&self.binding) {
                Some(default) => default.record_located(self.record, default_location),
                None => false,
            },
            _ => recorders_of(&self.binding).record_syntactic(self.record, location),
        }
    }

    fn accepts(&self, raw: &RawArgument) -> bool {
        match (raw, self.constructor_kind()) {
            (RawArgument::Single(_), _) => true,
            (RawArgument::ParamsList(_), Some(ConstructorParameterKind::Params)) => true,
            (RawArgument::Missing, Some(ConstructorParameterKind::Optional)) => true,
            _ => false,
        }
    }

    fn record_value(&mut self, value: &ArgumentValue, location: Option<&ArgumentLocation>) -> bool {
        recorders_of(&self.binding).record(self.record, value, location)
    }

    fn record_default(&mut self, location: Option<&Location>) -> bool {
        match default_of(&self.binding) {
            Some(default) => default.record(self.record, location),
            None => false,
        }
    }
}

// Free functions so callers can borrow `binding` and `record` as disjoint fields.
fn recorders_of<R>(binding: &Binding<R>) -> &RecorderProvider<R> {
    match binding {
        Binding::Value(provider) => provider.as_ref(),
        Binding::Constructor(provider) => provider.recorders(),
    }
}

fn default_of<R>(binding: &Binding<R>) -> Option<&DefaultRecorder<R>> {
    match binding {
        Binding::Value(_) => None,
        Binding::Constructor(provider) => provider.default_recorder(),
    }
}

impl<R> std::fmt::Debug for Recorder<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("parameter", &self.parameter)
            .field("constructor_kind", &self.constructor_kind())
            .finish()
    }
}
