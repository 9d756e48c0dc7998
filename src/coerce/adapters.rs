//! Coercion adapters: wrap a strongly-typed user callback into an untyped recorder.
//!
//! An [`Adapter<T>`] pairs one element policy from the parent module with the target type
//! `T`. The recorders it produces run the policy first and call the user callback only when
//! the value was accepted, so a `false` from a recorder means either "coercion rejected" or
//! "callback rejected", and the callback observes only the second.
//!
//! ```rust
//! use paramap::coerce::adapters;
//! use paramap::value::ArgumentValue;
//!
//! #[derive(Default)]
//! struct Record { sizes: Option<Vec<i32>> }
//!
//! let recorder = adapters::nullable_collection::<i32>()
//!     .semantic_action(|record: &mut Record, sizes| record.sizes = sizes.or(Some(vec![])));
//! let mut record = Record::default();
//! assert!(recorder(&mut record, &ArgumentValue::from(vec![1i32, 2])));
//! assert_eq!(record.sizes, Some(vec![1, 2]));
//! assert!(!recorder(&mut record, &ArgumentValue::from(vec![1.0f64])));
//! ```

use std::sync::Arc;

use tracing::trace;

use super::{
    coerce_collection, coerce_collection_of_nullable, coerce_nullable, coerce_nullable_collection,
    coerce_nullable_collection_of_nullable, coerce_value, CoercionOutcome, FromArgument,
};
use crate::recorder::{CombinedRecorderFn, SemanticRecorderFn};
use crate::syntax::ArgumentLocation;
use crate::value::ArgumentValue;

/// A coercion policy producing `T`, ready to wrap callbacks.
pub struct Adapter<T> {
    policy: fn(&ArgumentValue) -> CoercionOutcome<T>,
    target: &'static str,
}

impl<T> Clone for Adapter<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Adapter<T> {}

impl<T> std::fmt::Debug for Adapter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter").field("target", &self.target).finish()
    }
}

impl<T: 'static> Adapter<T> {
    fn new(policy: fn(&ArgumentValue) -> CoercionOutcome<T>) -> Self {
        Self {
            policy,
            target: std::any::type_name::<T>(),
        }
    }

    /// Runs the policy without any callback.
    pub fn coerce(&self, value: &ArgumentValue) -> CoercionOutcome<T> {
        let outcome = (self.policy)(value);
        if !outcome.is_accepted() {
            trace!(target_type = self.target, found = value.type_name(), "argument rejected by coercion");
        }
        outcome
    }

    /// A value-only recorder. The callback's return value is the recorder's result.
    pub fn semantic<R, F>(self, callback: F) -> SemanticRecorderFn<R>
    where
        R: 'static,
        F: Fn(&mut R, T) -> bool + Send + Sync + 'static,
    {
        Arc::new(move |record: &mut R, value: &ArgumentValue| match self.coerce(value) {
            CoercionOutcome::Accepted(typed) => callback(record, typed),
            CoercionOutcome::Rejected => false,
        })
    }

    /// A value-only recorder whose callback cannot reject.
    pub fn semantic_action<R, F>(self, callback: F) -> SemanticRecorderFn<R>
    where
        R: 'static,
        F: Fn(&mut R, T) + Send + Sync + 'static,
    {
        self.semantic(move |record: &mut R, typed| {
            callback(record, typed);
            true
        })
    }

    /// A recorder receiving the value together with its location.
    pub fn combined<R, F>(self, callback: F) -> CombinedRecorderFn<R>
    where
        R: 'static,
        F: Fn(&mut R, T, &ArgumentLocation) -> bool + Send + Sync + 'static,
    {
        Arc::new(
            move |record: &mut R, value: &ArgumentValue, location: &ArgumentLocation| {
                match self.coerce(value) {
                    CoercionOutcome::Accepted(typed) => callback(record, typed, location),
                    CoercionOutcome::Rejected => false,
                }
            },
        )
    }

    pub fn combined_action<R, F>(self, callback: F) -> CombinedRecorderFn<R>
    where
        R: 'static,
        F: Fn(&mut R, T, &ArgumentLocation) + Send + Sync + 'static,
    {
        self.combined(move |record: &mut R, typed, location: &ArgumentLocation| {
            callback(record, typed, location);
            true
        })
    }
}

/// A non-nullable single value of type `T`.
pub fn value<T: FromArgument + 'static>() -> Adapter<T> {
    Adapter::new(coerce_value::<T>)
}

/// A single value of type `T` or `Null`.
pub fn nullable<T: FromArgument + 'static>() -> Adapter<Option<T>> {
    Adapter::new(coerce_nullable::<T>)
}

/// A non-null collection of non-null `T`.
pub fn collection<T: FromArgument + 'static>() -> Adapter<Vec<T>> {
    Adapter::new(coerce_collection::<T>)
}

/// A collection of non-null `T` that may itself be `Null`.
pub fn nullable_collection<T: FromArgument + 'static>() -> Adapter<Option<Vec<T>>> {
    Adapter::new(coerce_nullable_collection::<T>)
}

/// A non-null collection whose elements may be `Null`.
pub fn collection_of_nullable<T: FromArgument + 'static>() -> Adapter<Vec<Option<T>>> {
    Adapter::new(coerce_collection_of_nullable::<T>)
}

/// A collection that may be `Null`, with elements that may be `Null`.
pub fn nullable_collection_of_nullable<T: FromArgument + 'static>() -> Adapter<Option<Vec<Option<T>>>> {
    Adapter::new(coerce_nullable_collection_of_nullable::<T>)
}

#[cfg(test)]
mod adapter_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::syntax::{Location, Span};

    #[derive(Default)]
    struct Record {
        value: Option<i32>,
        calls: usize,
    }

    #[test]
    fn test_callback_rejection_is_distinct_from_coercion_rejection() {
        let recorder = value::<i32>().semantic(|record: &mut Record, v| {
            record.calls += 1;
            v > 0
        });
        let mut record = Record::default();

        assert!(!recorder(&mut record, &ArgumentValue::from(1.0f64)));
        assert_eq!(record.calls, 0);

        assert!(!recorder(&mut record, &ArgumentValue::from(-1i32)));
        assert_eq!(record.calls, 1);

        assert!(recorder(&mut record, &ArgumentValue::from(2i32)));
        assert_eq!(record.calls, 2);
    }

    #[test]
    fn test_action_counts_as_accepted() {
        let recorder = nullable::<i32>().semantic_action(|record: &mut Record, v| record.value = v);
        let mut record = Record { value: Some(9), calls: 0 };
        assert!(recorder(&mut record, &ArgumentValue::Null));
        assert_eq!(record.value, None);
    }

    #[test]
    fn test_combined_passes_location_through() {
        static SEEN: AtomicUsize = AtomicUsize::new(0);
        let recorder = value::<i32>().combined_action(|record: &mut Record, v, location| {
            record.value = Some(v);
            SEEN.store(location.primary().span.start, Ordering::SeqCst);
        });
        let mut record = Record::default();
        let location = ArgumentLocation::Value(Location::at(Span::new(7, 9)));
        assert!(recorder(&mut record, &ArgumentValue::from(5i32), &location));
        assert_eq!(record.value, Some(5));
        assert_eq!(SEEN.load(Ordering::SeqCst), 7);
    }
}
