//! # Mapper
//!
//! The top-level component: lazily populates a [`MappingRepository`] exactly once, resolves
//! discovered parameters against the frozen result, and binds the resolved provider to a
//! destination record.
//!
//! ## State Machine
//!
//! ```text
//! Uninitialized --first resolve--> Initializing --populate + build ok--> Initialized
//!                                        \--defect--> Faulted
//! ```
//!
//! The transition happens once per mapper. Concurrent first calls block until the winning
//! thread has finished; a population routine that resolves through its own mapper gets
//! [`MappingError::ReentrantPopulation`], and so does the outer call. A faulted mapper keeps
//! returning the same defect without running the routine again.
//!
//! ## Example
//!
//! ```rust
//! use paramap::argument::{ParameterIdentity, ParameterKey, RawArgument};
//! use paramap::coerce::adapters;
//! use paramap::mapper::{Mapper, MappingSource};
//! use paramap::recorder::RecorderProvider;
//! use paramap::repository::MappingRepository;
//!
//! #[derive(Default)]
//! struct Size { width: Option<i32> }
//!
//! struct SizeMappings;
//!
//! impl MappingSource<Size> for SizeMappings {
//!     fn populate(&self, mappings: &mut MappingRepository<Size>) -> paramap::Result<()> {
//!         mappings.constructor_parameters.add_normal(
//!             ParameterKey::positional("width", 0),
//!             RecorderProvider::semantic(
//!                 adapters::value::<i32>().semantic_action(|r: &mut Size, w| r.width = Some(w)),
//!             ),
//!         )
//!     }
//! }
//!
//! let mapper = Mapper::new(SizeMappings);
//! let mut size = Size::default();
//! let mut recorder = mapper
//!     .resolve_constructor_parameter(&ParameterIdentity::new("width", Some(0)), &mut size)
//!     .unwrap()
//!     .expect("width is mapped");
//! assert!(recorder.try_record(&RawArgument::single(12i32), None));
//! assert_eq!(size.width, Some(12));
//! ```

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::argument::ParameterIdentity;
use crate::diagnostics::{MappingError, Result};
use crate::recorder::bound::Binding;
use crate::recorder::Recorder;
use crate::repository::{FrozenMappings, MappingRepository, NameComparer, Ordinal, RepositoryOptions};

// ============================================================================
// MAPPING SOURCE
// ============================================================================

/// User-supplied mapping definitions for records of type `R`.
pub trait MappingSource<R>: Send + Sync {
    /// Registers every mapping. Runs at most once per [`Mapper`].
    fn populate(&self, mappings: &mut MappingRepository<R>) -> Result<()>;

    /// The comparer used for parameter names.
    ///
    /// Read exactly once, when the mapper populates. Returning a different comparer later has
    /// no effect on a mapper that is already initialized.
    fn comparer(&self) -> Arc<dyn NameComparer> {
        Arc::new(Ordinal)
    }

    fn repository_options(&self) -> RepositoryOptions {
        RepositoryOptions::default()
    }
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MapperState {
    Uninitialized = 0,
    Initializing = 1,
    Initialized = 2,
    /// Population reported a configuration defect.
    Faulted = 3,
}

impl MapperState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => MapperState::Uninitialized,
            1 => MapperState::Initializing,
            2 => MapperState::Initialized,
            _ => MapperState::Faulted,
        }
    }
}

// Clears the initializing-thread marker even if the population routine panics.
struct InitializerGuard<'a>(&'a Mutex<Option<ThreadId>>);

impl Drop for InitializerGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock() = None;
    }
}

// ============================================================================
// MAPPER
// ============================================================================

pub struct Mapper<R, S> {
    source: S,
    state: AtomicU8,
    frozen: OnceCell<Result<FrozenMappings<R>>>,
    initializer: Mutex<Option<ThreadId>>,
    reentered: AtomicBool,
}

impl<R, S: MappingSource<R>> Mapper<R, S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: AtomicU8::new(MapperState::Uninitialized as u8),
            frozen: OnceCell::new(),
            initializer: Mutex::new(None),
            reentered: AtomicBool::new(false),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn state(&self) -> MapperState {
        MapperState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Populates eagerly. Resolution does this on first use anyway.
    pub fn initialize(&self) -> Result<()> {
        self.mappings().map(|_| ())
    }

    /// The frozen mappings, populating them on first call.
    pub fn mappings(&self) -> Result<&FrozenMappings<R>> {
        if let Some(result) = self.frozen.get() {
            return result.as_ref().map_err(Clone::clone);
        }
        if *self.initializer.lock() == Some(thread::current().id()) {
            self.reentered.store(true, Ordering::Release);
            return Err(MappingError::ReentrantPopulation);
        }
        self.frozen
            .get_or_init(|| self.populate())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn populate(&self) -> Result<FrozenMappings<R>> {
        self.state
            .store(MapperState::Initializing as u8, Ordering::Release);
        *self.initializer.lock() = Some(thread::current().id());
        let guard = InitializerGuard(&self.initializer);

        debug!("populating parameter mappings");
        let mut repository = MappingRepository::new(self.source.comparer(), self.source.repository_options());
        let populated = self.source.populate(&mut repository);
        drop(guard);

        let result = populated.and_then(|()| {
            if self.reentered.load(Ordering::Acquire) {
                Err(MappingError::ReentrantPopulation)
            } else {
                repository.build()
            }
        });

        match &result {
            Ok(frozen) => {
                self.state
                    .store(MapperState::Initialized as u8, Ordering::Release);
                debug!(
                    type_parameters = frozen.type_parameters.len(),
                    constructor_parameters = frozen.constructor_parameters.len(),
                    named_parameters = frozen.named_parameters.len(),
                    "parameter mappings initialized"
                );
            }
            Err(error) => {
                self.state.store(MapperState::Faulted as u8, Ordering::Release);
                warn!(%error, "parameter mapping population failed");
            }
        }
        result
    }

    // ------------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------------

    /// Resolves a type parameter by name and ordinal.
    ///
    /// `Ok(None)` means the parameter is not mapped, which is an expected outcome. `Err` is only
    /// ever a configuration defect from the one-time population.
    pub fn resolve_type_parameter<'r>(
        &self,
        identity: &ParameterIdentity,
        record: &'r mut R,
    ) -> Result<Option<Recorder<'r, R>>> {
        let mappings = self.mappings()?;
        let Some(entry) = mappings
            .type_parameters
            .resolve(&identity.name, identity.index)
        else {
            debug!(category = "type", parameter = %identity, "unmapped parameter");
            return Ok(None);
        };
        Ok(Some(Recorder::new(
            record,
            entry.key.clone(),
            Binding::Value(Arc::clone(&entry.provider)),
        )))
    }

    /// Resolves a constructor parameter by name and ordinal.
    pub fn resolve_constructor_parameter<'r>(
        &self,
        identity: &ParameterIdentity,
        record: &'r mut R,
    ) -> Result<Option<Recorder<'r, R>>> {
        let mappings = self.mappings()?;
        let Some(entry) = mappings
            .constructor_parameters
            .resolve(&identity.name, identity.index)
        else {
            debug!(category = "constructor", parameter = %identity, "unmapped parameter");
            return Ok(None);
        };
        Ok(Some(Recorder::new(
            record,
            entry.key.clone(),
            Binding::Constructor(Arc::clone(&entry.provider)),
        )))
    }

    /// Resolves a named parameter.
    pub fn resolve_named_parameter<'r>(
        &self,
        name: &str,
        record: &'r mut R,
    ) -> Result<Option<Recorder<'r, R>>> {
        let mappings = self.mappings()?;
        let Some(entry) = mappings.named_parameters.get_by_name(name) else {
            debug!(category = "named", parameter = name, "unmapped parameter");
            return Ok(None);
        };
        Ok(Some(Recorder::new(
            record,
            entry.key.clone(),
            Binding::Value(Arc::clone(&entry.provider)),
        )))
    }
}

impl<R, S> std::fmt::Debug for Mapper<R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper")
            .field(
                "state",
                &MapperState::from_u8(self.state.load(Ordering::Acquire)),
            )
            .finish()
    }
}

#[cfg(test)]
mod mapper_tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::argument::ParameterKey;
    use crate::coerce::adapters;
    use crate::recorder::RecorderProvider;

    #[derive(Default)]
    struct Record {
        value: Option<i32>,
    }

    struct Counting {
        runs: AtomicUsize,
    }

    impl MappingSource<Record> for Counting {
        fn populate(&self, mappings: &mut MappingRepository<Record>) -> Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            mappings.named_parameters.add(
                "Value",
                RecorderProvider::semantic(
                    adapters::value::<i32>().semantic_action(|r: &mut Record, v| r.value = Some(v)),
                ),
            )
        }
    }

    #[test]
    fn test_population_runs_once() {
        let mapper = Mapper::new(Counting {
            runs: AtomicUsize::new(0),
        });
        assert_eq!(mapper.state(), MapperState::Uninitialized);
        let mut record = Record::default();
        for _ in 0..3 {
            assert!(mapper
                .resolve_named_parameter("Value", &mut record)
                .unwrap()
                .is_some());
            assert!(mapper
                .resolve_named_parameter("Other", &mut record)
                .unwrap()
                .is_none());
        }
        assert_eq!(mapper.source().runs.load(Ordering::SeqCst), 1);
        assert_eq!(mapper.state(), MapperState::Initialized);
    }

    struct Faulty {
        runs: AtomicUsize,
    }

    impl MappingSource<Record> for Faulty {
        fn populate(&self, mappings: &mut MappingRepository<Record>) -> Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            let provider = || {
                RecorderProvider::semantic(adapters::value::<i32>().semantic(|_: &mut Record, _| true))
            };
            mappings
                .type_parameters
                .add(ParameterKey::positional("T", 0), provider())?;
            mappings
                .type_parameters
                .add(ParameterKey::positional("U", 0), provider())
        }
    }

    #[test]
    fn test_faulted_population_is_memoised() {
        let mapper = Mapper::new(Faulty {
            runs: AtomicUsize::new(0),
        });
        let mut record = Record::default();
        let first = mapper
            .resolve_type_parameter(&ParameterIdentity::new("T", Some(0)), &mut record)
            .unwrap_err();
        let second = mapper.initialize().unwrap_err();
        assert!(matches!(first, MappingError::DuplicateIndex { index: 0, .. }));
        assert_eq!(first, second);
        assert_eq!(mapper.state(), MapperState::Faulted);
        assert_eq!(mapper.source().runs.load(Ordering::SeqCst), 1);
    }
}
