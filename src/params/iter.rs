use std::iter::FusedIterator;
use std::slice;

use super::{ParamSet, Predicate};
use crate::errors::ParamError;
use crate::record::ParamRecord;
use crate::value::Value;

/// A lazy traversal of a [`ParamSet`].
///
/// Each variant keeps only its cursor: a combine holds the current head
/// record and an iterator over the product of the remaining sets, never the
/// product itself. After yielding an error the iterator is exhausted.
pub struct Cases<'a> {
    state: State<'a>,
}

enum State<'a> {
    Unit,
    Options {
        name: &'a str,
        values: slice::Iter<'a, Value>,
    },
    Records(slice::Iter<'a, ParamRecord>),
    Product(Box<Product<'a>>),
    Filter {
        inner: Box<Cases<'a>>,
        predicate: &'a Predicate,
    },
    Exclude {
        inner: Box<Cases<'a>>,
        patterns: &'a [ParamRecord],
    },
    Done,
}

/// `head x product(rest)`, with `rest` restarted for every head record.
struct Product<'a> {
    head: Cases<'a>,
    rest: &'a [ParamSet],
    current: Option<ParamRecord>,
    tail: Option<Cases<'a>>,
}

impl<'a> Cases<'a> {
    pub(super) fn new(set: &'a ParamSet) -> Self {
        let state = match set {
            ParamSet::Unit => State::Unit,
            ParamSet::Options { name, values } => State::Options {
                name,
                values: values.iter(),
            },
            ParamSet::Records(records) => State::Records(records.iter()),
            ParamSet::Combine(sets) => return Cases::product(sets),
            ParamSet::Filter { inner, predicate } => State::Filter {
                inner: Box::new(inner.iter()),
                predicate,
            },
            ParamSet::Exclude { inner, patterns } => State::Exclude {
                inner: Box::new(inner.iter()),
                patterns,
            },
        };
        Cases { state }
    }

    fn product(sets: &'a [ParamSet]) -> Self {
        let state = match sets {
            [] => State::Unit,
            [only] => return only.iter(),
            [head, rest @ ..] => State::Product(Box::new(Product {
                head: head.iter(),
                rest,
                current: None,
                tail: None,
            })),
        };
        Cases { state }
    }
}

impl Product<'_> {
    fn next(&mut self) -> Option<Result<ParamRecord, ParamError>> {
        loop {
            if let (Some(a), Some(tail)) = (&self.current, &mut self.tail) {
                match tail.next() {
                    Some(Ok(b)) => return Some(a.merge(&b)),
                    Some(Err(e)) => return Some(Err(e)),
                    None => {}
                }
            }
            match self.head.next()? {
                Ok(a) => {
                    self.current = Some(a);
                    self.tail = Some(Cases::product(self.rest));
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl Iterator for Cases<'_> {
    type Item = Result<ParamRecord, ParamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let State::Unit = self.state {
            self.state = State::Done;
            return Some(Ok(ParamRecord::new()));
        }
        let item = match &mut self.state {
            State::Unit | State::Done => None,
            State::Options { name, values } => values
                .next()
                .map(|value| ParamRecord::single(*name, value.clone())),
            State::Records(records) => records
                .next()
                .map(|record| record.check_names().map(|()| record.clone())),
            State::Product(product) => product.next(),
            State::Filter { inner, predicate } => inner.find(|item| match item {
                Ok(record) => predicate.test(record),
                Err(_) => true,
            }),
            State::Exclude { inner, patterns } => inner.find(|item| match item {
                Ok(record) => !patterns.iter().any(|p| record.matches(p)),
                Err(_) => true,
            }),
        };
        if !matches!(item, Some(Ok(_))) {
            self.state = State::Done;
        }
        item
    }
}

impl FusedIterator for Cases<'_> {}
