//! Parameter set combinators.
//!
//! A [`ParamSet`] is an immutable description of a sequence of
//! [`ParamRecord`]s. Nothing is computed until the set is iterated, and every
//! call to [`ParamSet::iter`] starts a fresh traversal, so one set can be
//! drained any number of times (and from several threads at once).
//!
//! ```rust
//! use paramset::{combine, options, params};
//! let set = combine([options("x", [1, 2]), options("y", ["a", "b"])]);
//! let cases = set.collect_records().unwrap();
//! assert_eq!(cases[1], params! { "x" => 1, "y" => "b" });
//! assert_eq!(cases.len(), 4);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::errors::ParamError;
use crate::record::ParamRecord;
use crate::value::Value;

mod iter;

pub use iter::Cases;

/// A shared record predicate used by [`ParamSet::Filter`].
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&ParamRecord) -> bool + Send + Sync>);

impl Predicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&ParamRecord) -> bool + Send + Sync + 'static,
    {
        Predicate(Arc::new(f))
    }

    pub fn test(&self, record: &ParamRecord) -> bool {
        (self.0)(record)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

#[derive(Debug, Clone, Default)]
pub enum ParamSet {
    /// Exactly one empty record; the identity of [`ParamSet::Combine`].
    #[default]
    Unit,
    /// One `{name: value}` record per value, in order.
    Options { name: String, values: Vec<Value> },
    /// Literal records, yielded as given.
    Records(Vec<ParamRecord>),
    /// Cartesian product; the last set varies fastest.
    Combine(Vec<ParamSet>),
    Filter {
        inner: Box<ParamSet>,
        predicate: Predicate,
    },
    /// Drops records matching any of the (partial) patterns.
    Exclude {
        inner: Box<ParamSet>,
        patterns: Vec<ParamRecord>,
    },
}

impl ParamSet {
    /// Starts a new lazy traversal.
    pub fn iter(&self) -> Cases<'_> {
        Cases::new(self)
    }

    /// Drains the set into a vector, stopping at the first error.
    pub fn collect_records(&self) -> Result<Vec<ParamRecord>, ParamError> {
        self.iter().collect()
    }

    /// Number of records the set yields. Drains without keeping records.
    pub fn count_cases(&self) -> Result<usize, ParamError> {
        self.iter().try_fold(0usize, |n, record| record.map(|_| n + 1))
    }

    pub fn filter<F>(self, predicate: F) -> ParamSet
    where
        F: Fn(&ParamRecord) -> bool + Send + Sync + 'static,
    {
        filter(self, predicate)
    }

    pub fn exclude<I>(self, patterns: I) -> ParamSet
    where
        I: IntoIterator<Item = ParamRecord>,
    {
        exclude(self, patterns)
    }

    pub fn only<I>(self, patterns: I) -> ParamSet
    where
        I: IntoIterator<Item = ParamRecord>,
    {
        only(self, patterns)
    }

    /// Appends `other` as the new fastest-varying axis.
    pub fn combine_with(self, other: ParamSet) -> ParamSet {
        match self {
            ParamSet::Combine(mut sets) => {
                sets.push(other);
                ParamSet::Combine(sets)
            }
            head => ParamSet::Combine(vec![head, other]),
        }
    }
}

impl<'a> IntoIterator for &'a ParamSet {
    type Item = Result<ParamRecord, ParamError>;
    type IntoIter = Cases<'a>;

    fn into_iter(self) -> Cases<'a> {
        self.iter()
    }
}

// ============================================================================
// CONSTRUCTORS
// ============================================================================

pub fn unit() -> ParamSet {
    ParamSet::Unit
}

pub fn options<V, I>(name: impl Into<String>, values: I) -> ParamSet
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    ParamSet::Options {
        name: name.into(),
        values: values.into_iter().map(Into::into).collect(),
    }
}

/// `options(name, [false, true])`.
pub fn bools(name: impl Into<String>) -> ParamSet {
    options(name, [false, true])
}

pub fn records<I>(records: I) -> ParamSet
where
    I: IntoIterator<Item = ParamRecord>,
{
    ParamSet::Records(records.into_iter().collect())
}

pub fn combine<I>(sets: I) -> ParamSet
where
    I: IntoIterator<Item = ParamSet>,
{
    ParamSet::Combine(sets.into_iter().collect())
}

pub fn filter<F>(set: ParamSet, predicate: F) -> ParamSet
where
    F: Fn(&ParamRecord) -> bool + Send + Sync + 'static,
{
    ParamSet::Filter {
        inner: Box::new(set),
        predicate: Predicate::new(predicate),
    }
}

pub fn exclude<I>(set: ParamSet, patterns: I) -> ParamSet
where
    I: IntoIterator<Item = ParamRecord>,
{
    ParamSet::Exclude {
        inner: Box::new(set),
        patterns: patterns.into_iter().collect(),
    }
}

/// Keeps only records matching at least one pattern.
pub fn only<I>(set: ParamSet, patterns: I) -> ParamSet
where
    I: IntoIterator<Item = ParamRecord>,
{
    let patterns: Vec<ParamRecord> = patterns.into_iter().collect();
    filter(set, move |record| {
        patterns.iter().any(|pattern| record.matches(pattern))
    })
}
