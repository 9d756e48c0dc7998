//! # Recorder Providers
//!
//! A provider bundles the type-erased recorders built for one parameter. Three views exist:
//!
//! - **semantic**: `(record, value) -> bool`, for consumers without source locations;
//! - **syntactic**: `(record, location) -> bool`, for consumers that only want locations;
//! - **combined**: `(record, value, location) -> bool`, value and location in one call.
//!
//! Providers are assembled in one of the following modes:
//!
//! | Constructor | Views | Dispatch with a location | without |
//! |---|---|---|---|
//! | [`RecorderProvider::semantic`] | semantic | semantic | semantic |
//! | [`RecorderProvider::combined`] | combined | combined | rejected |
//! | [`RecorderProvider::syntactic`] | syntactic | syntactic | rejected |
//! | [`RecorderProvider::adaptive`] | combined + semantic | combined | semantic |
//! | [`RecorderProvider::split`] | semantic + syntactic | both, independently | semantic |
//!
//! Combined and semantic recorders built from the same [`Adapter`](crate::coerce::Adapter)
//! share one coercion policy, so they always agree on whether a value is accepted.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::syntax::{ArgumentLocation, Location};
use crate::value::ArgumentValue;

pub mod bound;

pub use bound::Recorder;

// ============================================================================
// RECORDER FUNCTION TYPES
// ============================================================================

pub type SemanticRecorderFn<R> = Arc<dyn Fn(&mut R, &ArgumentValue) -> bool + Send + Sync>;

pub type CombinedRecorderFn<R> =
    Arc<dyn Fn(&mut R, &ArgumentValue, &ArgumentLocation) -> bool + Send + Sync>;

pub type SyntacticRecorderFn<R> = Arc<dyn Fn(&mut R, &ArgumentLocation) -> bool + Send + Sync>;

// ============================================================================
// VALUE RECORDER PROVIDER
// ============================================================================

/// The recorders for one parameter, built from a single adapter.
pub struct RecorderProvider<R> {
    semantic: Option<SemanticRecorderFn<R>>,
    combined: Option<CombinedRecorderFn<R>>,
    syntactic: Option<SyntacticRecorderFn<R>>,
}

impl<R> Clone for RecorderProvider<R> {
    fn clone(&self) -> Self {
        Self {
            semantic: self.semantic.clone(),
            combined: self.combined.clone(),
            syntactic: self.syntactic.clone(),
        }
    }
}

impl<R> fmt::Debug for RecorderProvider<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecorderProvider")
            .field("semantic", &self.semantic.is_some())
            .field("combined", &self.combined.is_some())
            .field("syntactic", &self.syntactic.is_some())
            .finish()
    }
}

impl<R> RecorderProvider<R> {
    pub fn semantic(semantic: SemanticRecorderFn<R>) -> Self {
        Self {
            semantic: Some(semantic),
            combined: None,
            syntactic: None,
        }
    }

    pub fn combined(combined: CombinedRecorderFn<R>) -> Self {
        Self {
            semantic: None,
            combined: Some(combined),
            syntactic: None,
        }
    }

    pub fn syntactic(syntactic: SyntacticRecorderFn<R>) -> Self {
        Self {
            semantic: None,
            combined: None,
            syntactic: Some(syntactic),
        }
    }

    /// Combined and semantic siblings; the combined one is used whenever a location is known.
    pub fn adaptive(combined: CombinedRecorderFn<R>, semantic: SemanticRecorderFn<R>) -> Self {
        Self {
            semantic: Some(semantic),
            combined: Some(combined),
            syntactic: None,
        }
    }

    /// Semantic and syntactic siblings invoked independently of each other.
    pub fn split(semantic: SemanticRecorderFn<R>, syntactic: SyntacticRecorderFn<R>) -> Self {
        Self {
            semantic: Some(semantic),
            combined: None,
            syntactic: Some(syntactic),
        }
    }

    pub fn has_semantic(&self) -> bool {
        self.semantic.is_some()
    }

    pub fn has_combined(&self) -> bool {
        self.combined.is_some()
    }

    pub fn has_syntactic(&self) -> bool {
        self.syntactic.is_some()
    }

    pub fn record_semantic(&self, record: &mut R, value: &ArgumentValue) -> bool {
        match &self.semantic {
            Some(recorder) => recorder(record, value),
            None => {
                debug!("no semantic recorder for parameter");
                false
            }
        }
    }

    pub fn record_combined(
        &self,
        record: &mut R,
        value: &ArgumentValue,
        location: &ArgumentLocation,
    ) -> bool {
        match &self.combined {
            Some(recorder) => recorder(record, value, location),
            None => {
                debug!("no combined recorder for parameter");
                false
            }
        }
    }

    pub fn record_syntactic(&self, record: &mut R, location: &ArgumentLocation) -> bool {
        match &self.syntactic {
            Some(recorder) => recorder(record, location),
            None => {
                debug!("no syntactic recorder for parameter");
                false
            }
        }
    }

    /// Dispatches to whichever views this provider carries; see the module table.
    ///
    /// In split mode both recorders run even when the semantic one rejects, so the record
    /// may receive a location for a value it did not keep.
    pub fn record(
        &self,
        record: &mut R,
        value: &ArgumentValue,
        location: Option<&ArgumentLocation>,
    ) -> bool {
        let Some(location) = location else {
            return self.record_semantic(record, value);
        };
        if let Some(combined) = &self.combined {
            return combined(record, value, location);
        }
        match (&self.semantic, &self.syntactic) {
            (Some(semantic), Some(syntactic)) => {
                let value_recorded = semantic(record, value);
                let location_recorded = syntactic(record, location);
                value_recorded && location_recorded
            }
            (Some(semantic), None) => semantic(record, value),
            (None, Some(syntactic)) => syntactic(record, location),
            (None, None) => false,
        }
    }
}

// ============================================================================
// DEFAULT-VALUE RECORDER
// ============================================================================

pub type DefaultSemanticFn<R> = Arc<dyn Fn(&mut R) -> bool + Send + Sync>;

pub type DefaultLocatedFn<R> = Arc<dyn Fn(&mut R, &Location) -> bool + Send + Sync>;

/// Records that an optional parameter fell back to its default value.
pub struct DefaultRecorder<R> {
    semantic: Option<DefaultSemanticFn<R>>,
    located: Option<DefaultLocatedFn<R>>,
}

impl<R> Clone for DefaultRecorder<R> {
    fn clone(&self) -> Self {
        Self {
            semantic: self.semantic.clone(),
            located: self.located.clone(),
        }
    }
}

impl<R> fmt::Debug for DefaultRecorder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultRecorder")
            .field("semantic", &self.semantic.is_some())
            .field("located", &self.located.is_some())
            .finish()
    }
}

impl<R: 'static> DefaultRecorder<R> {
    /// Accepts the default without recording anything.
    pub fn accept() -> Self {
        Self::semantic(|_: &mut R| true)
    }

    pub fn semantic<F>(callback: F) -> Self
    where
        F: Fn(&mut R) -> bool + Send + Sync + 'static,
    {
        Self {
            semantic: Some(Arc::new(callback)),
            located: None,
        }
    }

    pub fn located<F>(callback: F) -> Self
    where
        F: Fn(&mut R, &Location) -> bool + Send + Sync + 'static,
    {
        Self {
            semantic: None,
            located: Some(Arc::new(callback)),
        }
    }

    pub fn with_semantic<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut R) -> bool + Send + Sync + 'static,
    {
        self.semantic = Some(Arc::new(callback));
        self
    }
}

impl<R> DefaultRecorder<R> {
    /// Uses the located callback when a location is known, else the semantic one.
    pub fn record(&self, record: &mut R, location: Option<&Location>) -> bool {
        match (location, &self.located, &self.semantic) {
            (Some(location), Some(located), _) => located(record, location),
            (_, _, Some(semantic)) => semantic(record),
            _ => {
                debug!("no default recorder view for the available location");
                false
            }
        }
    }

    pub fn record_located(&self, record: &mut R, location: &Location) -> bool {
        match &self.located {
            Some(located) => located(record, location),
            None => false,
        }
    }
}

// ============================================================================
// CONSTRUCTOR PARAMETER PROVIDER
// ============================================================================

/// How a constructor parameter is declared, which decides the raw arguments it accepts.
///
/// | kind | `Single` | `ParamsList` | `Missing` |
/// |---|---|---|---|
/// | `Normal` | yes | no | no |
/// | `Params` | yes | yes | no |
/// | `Optional` | yes | no | yes |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructorParameterKind {
    Normal,
    Params,
    Optional,
}

/// Recorders for a constructor parameter together with its declaration kind.
pub struct ConstructorProvider<R> {
    kind: ConstructorParameterKind,
    recorders: RecorderProvider<R>,
    default: Option<DefaultRecorder<R>>,
}

impl<R> Clone for ConstructorProvider<R> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            recorders: self.recorders.clone(),
            default: self.default.clone(),
        }
    }
}

impl<R> fmt::Debug for ConstructorProvider<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorProvider")
            .field("kind", &self.kind)
            .field("recorders", &self.recorders)
            .field("default", &self.default)
            .finish()
    }
}

impl<R> ConstructorProvider<R> {
    pub fn normal(recorders: RecorderProvider<R>) -> Self {
        Self {
            kind: ConstructorParameterKind::Normal,
            recorders,
            default: None,
        }
    }

    pub fn params(recorders: RecorderProvider<R>) -> Self {
        Self {
            kind: ConstructorParameterKind::Params,
            recorders,
            default: None,
        }
    }

    pub fn optional(recorders: RecorderProvider<R>, default: DefaultRecorder<R>) -> Self {
        Self {
            kind: ConstructorParameterKind::Optional,
            recorders,
            default: Some(default),
        }
    }

    pub fn kind(&self) -> ConstructorParameterKind {
        self.kind
    }

    pub fn recorders(&self) -> &RecorderProvider<R> {
        &self.recorders
    }

    pub fn default_recorder(&self) -> Option<&DefaultRecorder<R>> {
        self.default.as_ref()
    }
}
