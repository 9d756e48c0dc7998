//! Name comparison for parameter keys.
//!
//! Comparers work by canonicalising names: two names are equal when their canonical forms
//! are equal. That keeps frozen lookups a single hash probe.

use std::borrow::Cow;
use std::fmt::Debug;

pub trait NameComparer: Send + Sync + Debug {
    fn canonical<'a>(&self, name: &'a str) -> Cow<'a, str>;

    fn equals(&self, left: &str, right: &str) -> bool {
        self.canonical(left) == self.canonical(right)
    }
}

/// Exact, case-sensitive comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ordinal;

impl NameComparer for Ordinal {
    fn canonical<'a>(&self, name: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(name)
    }
}

/// Case-insensitive comparison using Unicode lowercase folding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IgnoreCase;

impl NameComparer for IgnoreCase {
    fn canonical<'a>(&self, name: &'a str) -> Cow<'a, str> {
        let folded = name.to_lowercase();
        if folded == name {
            Cow::Borrowed(name)
        } else {
            Cow::Owned(folded)
        }
    }
}
