//! # Mapping Repository
//!
//! Append-only-then-frozen storage of `ParameterKey -> provider` mappings.
//!
//! ## Lifecycle
//!
//! A repository starts *open*: [`add`](ParameterRepository::add) appends entries and rejects
//! any key that collides with an existing one. The first [`build`](ParameterRepository::build)
//! moves it to *built*: further adds fail, and lookups are only available on the returned
//! [`FrozenParameters`], so reading an open repository cannot be expressed.
//!
//! A second `build` fails with [`MappingError::MultipleBuilds`] when
//! [`RepositoryOptions::throw_on_multiple_builds`] is set. Otherwise it returns another
//! snapshot of the same entries. Snapshots share structure through `im` and never observe
//! each other.
//!
//! ## Collisions
//!
//! Adding is a two-phase check: the canonical name (under the repository's
//! [`NameComparer`]) must be new, then the index, if any, must be new. A collision is always
//! an error; nothing is ever overwritten.
//!
//! ## Sub-repositories
//!
//! | Repository | Keyed by | Provider |
//! |---|---|---|
//! | [`TypeParameterRepository`] | name, index | [`RecorderProvider`] |
//! | [`ConstructorParameterRepository`] | name, index | [`ConstructorProvider`] |
//! | [`NamedParameterRepository`] | name | [`RecorderProvider`] |

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::argument::ParameterKey;
use crate::diagnostics::{MappingError, ParameterCategory, Result};
use crate::recorder::{ConstructorProvider, DefaultRecorder, RecorderProvider};

pub mod comparer;

pub use comparer::{IgnoreCase, NameComparer, Ordinal};

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryOptions {
    /// Treat a second `build()` as a configuration defect.
    pub throw_on_multiple_builds: bool,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            throw_on_multiple_builds: true,
        }
    }
}

// ============================================================================
// ENTRIES
// ============================================================================

/// One registered mapping.
pub struct MappingEntry<P> {
    pub key: ParameterKey,
    pub provider: Arc<P>,
}

impl<P> Clone for MappingEntry<P> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P> fmt::Debug for MappingEntry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingEntry").field("key", &self.key).finish()
    }
}

// ============================================================================
// OPEN REPOSITORY
// ============================================================================

/// The open, appendable form of one sub-repository.
pub struct ParameterRepository<P> {
    category: ParameterCategory,
    comparer: Arc<dyn NameComparer>,
    options: RepositoryOptions,
    entries: im::Vector<MappingEntry<P>>,
    by_name: im::HashMap<String, usize>,
    by_index: im::HashMap<usize, usize>,
    built: bool,
}

impl<P> ParameterRepository<P> {
    pub fn new(
        category: ParameterCategory,
        comparer: Arc<dyn NameComparer>,
        options: RepositoryOptions,
    ) -> Self {
        Self {
            category,
            comparer,
            options,
            entries: im::Vector::new(),
            by_name: im::HashMap::new(),
            by_index: im::HashMap::new(),
            built: false,
        }
    }

    /// Appends a mapping.
    ///
    /// # Errors
    /// - [`MappingError::AlreadyBuilt`] once the repository has been built;
    /// - [`MappingError::DuplicateName`] if the name collides under the comparer;
    /// - [`MappingError::DuplicateIndex`] if the index is already mapped.
    pub fn add(&mut self, key: ParameterKey, provider: P) -> Result<()> {
        if self.built {
            return Err(MappingError::AlreadyBuilt {
                category: self.category,
                name: key.name,
            });
        }

        let canonical = self.comparer.canonical(&key.name).into_owned();
        if let Some(&slot) = self.by_name.get(&canonical) {
            return Err(MappingError::DuplicateName {
                category: self.category,
                name: key.name,
                existing: self.entries[slot].key.name.clone(),
            });
        }
        if let Some(index) = key.index {
            if let Some(&slot) = self.by_index.get(&index) {
                return Err(MappingError::DuplicateIndex {
                    category: self.category,
                    name: key.name,
                    index,
                    existing: self.entries[slot].key.name.clone(),
                });
            }
        }

        let slot = self.entries.len();
        if let Some(index) = key.index {
            self.by_index.insert(index, slot);
        }
        self.by_name.insert(canonical, slot);
        self.entries.push_back(MappingEntry {
            key,
            provider: Arc::new(provider),
        });
        Ok(())
    }

    /// Freezes the repository into its lookup indices.
    ///
    /// # Errors
    /// [`MappingError::MultipleBuilds`] on a second call when `throw_on_multiple_builds` is set.
    pub fn build(&mut self) -> Result<FrozenParameters<P>> {
        if self.built && self.options.throw_on_multiple_builds {
            return Err(MappingError::MultipleBuilds {
                category: self.category,
            });
        }
        self.built = true;
        debug!(category = %self.category, entries = self.entries.len(), "built parameter repository");
        Ok(FrozenParameters {
            category: self.category,
            comparer: Arc::clone(&self.comparer),
            entries: self.entries.clone(),
            by_name: self.by_name.clone(),
            by_index: self.by_index.clone(),
        })
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn category(&self) -> ParameterCategory {
        self.category
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ParameterKey> {
        self.entries.iter().map(|entry| &entry.key)
    }
}

impl<P> fmt::Debug for ParameterRepository<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterRepository")
            .field("category", &self.category)
            .field("entries", &self.entries.len())
            .field("built", &self.built)
            .finish()
    }
}

// ============================================================================
// FROZEN REPOSITORY
// ============================================================================

/// A built, read-only snapshot of one sub-repository.
pub struct FrozenParameters<P> {
    category: ParameterCategory,
    comparer: Arc<dyn NameComparer>,
    entries: im::Vector<MappingEntry<P>>,
    by_name: im::HashMap<String, usize>,
    by_index: im::HashMap<usize, usize>,
}

impl<P> Clone for FrozenParameters<P> {
    fn clone(&self) -> Self {
        Self {
            category: self.category,
            comparer: Arc::clone(&self.comparer),
            entries: self.entries.clone(),
            by_name: self.by_name.clone(),
            by_index: self.by_index.clone(),
        }
    }
}

impl<P> FrozenParameters<P> {
    pub fn get_by_name(&self, name: &str) -> Option<&MappingEntry<P>> {
        let slot = self.slot_by_name(name)?;
        self.entries.get(slot)
    }

    pub fn get_by_index(&self, index: usize) -> Option<&MappingEntry<P>> {
        let slot = self.by_index.get(&index).copied()?;
        self.entries.get(slot)
    }

    /// Resolves a discovered parameter by name and, if given, by index.
    ///
    /// When both lookups hit they must hit the same entry. Two different entries make the
    /// identity ambiguous, and it resolves to nothing. An empty name carries no information
    /// and is never looked up, so the index alone decides.
    pub fn resolve(&self, name: &str, index: Option<usize>) -> Option<&MappingEntry<P>> {
        let named = if name.is_empty() {
            None
        } else {
            self.slot_by_name(name)
        };
        let indexed = index.and_then(|index| self.by_index.get(&index).copied());
        let slot = match (named, indexed) {
            (Some(named), Some(indexed)) if named == indexed => named,
            (Some(named), Some(indexed)) => {
                debug!(
                    category = %self.category,
                    name = name,
                    index = ?index,
                    by_name = %self.entries[named].key,
                    by_index = %self.entries[indexed].key,
                    "name and index resolve to different parameters"
                );
                return None;
            }
            (Some(slot), None) | (None, Some(slot)) => slot,
            (None, None) => return None,
        };
        self.entries.get(slot)
    }

    pub fn category(&self) -> ParameterCategory {
        self.category
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ParameterKey> {
        self.entries.iter().map(|entry| &entry.key)
    }

    fn slot_by_name(&self, name: &str) -> Option<usize> {
        let canonical = self.comparer.canonical(name);
        self.by_name.get(canonical.as_ref()).copied()
    }
}

impl<P> fmt::Debug for FrozenParameters<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrozenParameters")
            .field("category", &self.category)
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

pub type FrozenTypeParameters<R> = FrozenParameters<RecorderProvider<R>>;
pub type FrozenConstructorParameters<R> = FrozenParameters<ConstructorProvider<R>>;
pub type FrozenNamedParameters<R> = FrozenParameters<RecorderProvider<R>>;

// ============================================================================
// SUB-REPOSITORIES
// ============================================================================

/// Type parameters, keyed by name and ordinal.
#[derive(Debug)]
pub struct TypeParameterRepository<R>(ParameterRepository<RecorderProvider<R>>);

impl<R> TypeParameterRepository<R> {
    pub fn new(comparer: Arc<dyn NameComparer>, options: RepositoryOptions) -> Self {
        Self(ParameterRepository::new(ParameterCategory::Type, comparer, options))
    }

    pub fn add(&mut self, key: ParameterKey, provider: RecorderProvider<R>) -> Result<()> {
        self.0.add(key, provider)
    }

    pub fn build(&mut self) -> Result<FrozenTypeParameters<R>> {
        self.0.build()
    }

    pub fn inner(&self) -> &ParameterRepository<RecorderProvider<R>> {
        &self.0
    }
}

/// Constructor parameters, keyed by name and ordinal and classified by declaration kind.
#[derive(Debug)]
pub struct ConstructorParameterRepository<R>(ParameterRepository<ConstructorProvider<R>>);

impl<R> ConstructorParameterRepository<R> {
    pub fn new(comparer: Arc<dyn NameComparer>, options: RepositoryOptions) -> Self {
        Self(ParameterRepository::new(
            ParameterCategory::Constructor,
            comparer,
            options,
        ))
    }

    pub fn add(&mut self, key: ParameterKey, provider: ConstructorProvider<R>) -> Result<()> {
        self.0.add(key, provider)
    }

    pub fn add_normal(&mut self, key: ParameterKey, recorders: RecorderProvider<R>) -> Result<()> {
        self.add(key, ConstructorProvider::normal(recorders))
    }

    pub fn add_params(&mut self, key: ParameterKey, recorders: RecorderProvider<R>) -> Result<()> {
        self.add(key, ConstructorProvider::params(recorders))
    }

    pub fn add_optional(
        &mut self,
        key: ParameterKey,
        recorders: RecorderProvider<R>,
        default: DefaultRecorder<R>,
    ) -> Result<()> {
        self.add(key, ConstructorProvider::optional(recorders, default))
    }

    pub fn build(&mut self) -> Result<FrozenConstructorParameters<R>> {
        self.0.build()
    }

    pub fn inner(&self) -> &ParameterRepository<ConstructorProvider<R>> {
        &self.0
    }
}

/// Named parameters, keyed by name only.
#[derive(Debug)]
pub struct NamedParameterRepository<R>(ParameterRepository<RecorderProvider<R>>);

impl<R> NamedParameterRepository<R> {
    pub fn new(comparer: Arc<dyn NameComparer>, options: RepositoryOptions) -> Self {
        Self(ParameterRepository::new(ParameterCategory::Named, comparer, options))
    }

    pub fn add(&mut self, name: impl Into<String>, provider: RecorderProvider<R>) -> Result<()> {
        self.0.add(ParameterKey::named(name), provider)
    }

    pub fn build(&mut self) -> Result<FrozenNamedParameters<R>> {
        self.0.build()
    }

    pub fn inner(&self) -> &ParameterRepository<RecorderProvider<R>> {
        &self.0
    }
}

// ============================================================================
// COMBINED REPOSITORY
// ============================================================================

/// The three sub-repositories a mapper populates.
#[derive(Debug)]
pub struct MappingRepository<R> {
    pub type_parameters: TypeParameterRepository<R>,
    pub constructor_parameters: ConstructorParameterRepository<R>,
    pub named_parameters: NamedParameterRepository<R>,
}

impl<R> MappingRepository<R> {
    pub fn new(comparer: Arc<dyn NameComparer>, options: RepositoryOptions) -> Self {
        Self {
            type_parameters: TypeParameterRepository::new(Arc::clone(&comparer), options),
            constructor_parameters: ConstructorParameterRepository::new(
                Arc::clone(&comparer),
                options,
            ),
            named_parameters: NamedParameterRepository::new(comparer, options),
        }
    }

    /// Builds all three sub-repositories.
    pub fn build(&mut self) -> Result<FrozenMappings<R>> {
        Ok(FrozenMappings {
            type_parameters: self.type_parameters.build()?,
            constructor_parameters: self.constructor_parameters.build()?,
            named_parameters: self.named_parameters.build()?,
        })
    }
}

/// Frozen snapshots of all three sub-repositories.
#[derive(Debug)]
pub struct FrozenMappings<R> {
    pub type_parameters: FrozenTypeParameters<R>,
    pub constructor_parameters: FrozenConstructorParameters<R>,
    pub named_parameters: FrozenNamedParameters<R>,
}

impl<R> Clone for FrozenMappings<R> {
    fn clone(&self) -> Self {
        Self {
            type_parameters: self.type_parameters.clone(),
            constructor_parameters: self.constructor_parameters.clone(),
            named_parameters: self.named_parameters.clone(),
        }
    }
}

#[cfg(test)]
mod repository_tests {
    use super::*;

    fn repository(options: RepositoryOptions) -> ParameterRepository<u32> {
        ParameterRepository::new(ParameterCategory::Type, Arc::new(Ordinal), options)
    }

    #[test]
    fn test_name_collision_reports_existing_entry() {
        let mut repo = ParameterRepository::new(
            ParameterCategory::Named,
            Arc::new(IgnoreCase),
            RepositoryOptions::default(),
        );
        repo.add(ParameterKey::named("Value"), 1u32).unwrap();
        let err = repo.add(ParameterKey::named("VALUE"), 2).unwrap_err();
        assert_eq!(
            err,
            MappingError::DuplicateName {
                category: ParameterCategory::Named,
                name: "VALUE".to_string(),
                existing: "Value".to_string(),
            }
        );
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_index_collision_is_checked_after_name() {
        let mut repo = repository(RepositoryOptions::default());
        repo.add(ParameterKey::positional("T1", 0), 1).unwrap();
        let err = repo.add(ParameterKey::positional("T2", 0), 2).unwrap_err();
        assert!(matches!(err, MappingError::DuplicateIndex { index: 0, .. }));
        let err = repo.add(ParameterKey::positional("T1", 0), 3).unwrap_err();
        assert!(matches!(err, MappingError::DuplicateName { .. }));
    }

    #[test]
    fn test_add_after_build_is_rejected() {
        let mut repo = repository(RepositoryOptions::default());
        repo.build().unwrap();
        assert!(matches!(
            repo.add(ParameterKey::named("late"), 1),
            Err(MappingError::AlreadyBuilt { .. })
        ));
    }

    #[test]
    fn test_second_build_policy() {
        let mut strict = repository(RepositoryOptions::default());
        strict.build().unwrap();
        assert!(matches!(strict.build(), Err(MappingError::MultipleBuilds { .. })));

        let mut lenient = repository(RepositoryOptions {
            throw_on_multiple_builds: false,
        });
        lenient.add(ParameterKey::positional("T", 0), 7).unwrap();
        let first = lenient.build().unwrap();
        let second = lenient.build().unwrap();
        assert_eq!(*first.get_by_index(0).unwrap().provider, 7);
        assert_eq!(*second.get_by_name("T").unwrap().provider, 7);
    }

    #[test]
    fn test_resolve_requires_agreement() {
        let mut repo = repository(RepositoryOptions::default());
        repo.add(ParameterKey::positional("T1", 1), 1).unwrap();
        repo.add(ParameterKey::positional("T2", 2), 2).unwrap();
        let frozen = repo.build().unwrap();

        assert_eq!(frozen.resolve("", Some(1)).map(|e| *e.provider), Some(1));
        assert_eq!(frozen.resolve("T2", None).map(|e| *e.provider), Some(2));
        assert_eq!(frozen.resolve("T1", Some(1)).map(|e| *e.provider), Some(1));
        assert!(frozen.resolve("T1", Some(2)).is_none());
        assert!(frozen.resolve("T3", Some(3)).is_none());
    }

    #[test]
    fn test_empty_name_resolves_by_index_alone() {
        let mut repo = repository(RepositoryOptions::default());
        repo.add(ParameterKey::positional("", 0), 0).unwrap();
        repo.add(ParameterKey::positional("T1", 1), 1).unwrap();
        let frozen = repo.build().unwrap();

        assert_eq!(frozen.resolve("", Some(1)).map(|e| *e.provider), Some(1));
        assert_eq!(frozen.resolve("", Some(0)).map(|e| *e.provider), Some(0));
        assert!(frozen.resolve("", None).is_none());
    }
}
