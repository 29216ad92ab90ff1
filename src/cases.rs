//! Expansion of parameterised tests into individually named cases.
//!
//! A case is named `suite:test:query`, where the query is the case's record
//! rendered by [`ParamRecord::to_query`]. Names must be unique within a test.
//! A [`CaseQuery`] selects cases by id, optionally ending in a `*` wildcard.

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::errors::ParamError;
use crate::matrix::MatrixFile;
use crate::params::{Cases, ParamSet};
use crate::record::ParamRecord;

/// One expanded test case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCase {
    pub suite: String,
    pub test: String,
    pub params: ParamRecord,
}

impl TestCase {
    pub fn id(&self) -> String {
        format!("{}:{}:{}", self.suite, self.test, self.params.to_query())
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.suite, self.test, self.params.to_query())
    }
}

#[derive(Debug, Clone)]
pub struct CatalogTest {
    pub name: String,
    pub params: ParamSet,
}

/// The tests of one suite, each with its parameter set.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub suite: String,
    tests: Vec<CatalogTest>,
}

impl Catalog {
    pub fn new(suite: impl Into<String>) -> Self {
        Catalog {
            suite: suite.into(),
            tests: Vec::new(),
        }
    }

    /// Builds the catalog described by a loaded matrix file.
    pub fn from_matrix(file: &MatrixFile) -> Self {
        Catalog {
            suite: file.suite.clone(),
            tests: file
                .tests
                .iter()
                .map(|test| CatalogTest {
                    name: test.name.clone(),
                    params: test.params.build(),
                })
                .collect(),
        }
    }

    /// Registers a test. Test names are unique within the suite.
    pub fn add_test(
        &mut self,
        name: impl Into<String>,
        params: ParamSet,
    ) -> Result<(), ParamError> {
        let name = name.into();
        if self.tests.iter().any(|t| t.name == name) {
            return Err(ParamError::DuplicateCase {
                case: format!("{}:{}", self.suite, name),
            });
        }
        self.tests.push(CatalogTest { name, params });
        Ok(())
    }

    pub fn tests(&self) -> &[CatalogTest] {
        &self.tests
    }

    /// Lazily expands every test, in declaration order.
    pub fn cases(&self) -> Expansion<'_> {
        tracing::debug!(suite = %self.suite, tests = self.tests.len(), "expanding catalog");
        Expansion::over(self, 0..self.tests.len())
    }

    /// The cases a query selects, in declaration order.
    ///
    /// Only the tests the query names are expanded, so errors in other tests
    /// never surface. A query naming an unknown test selects nothing.
    pub fn select<'a>(
        &'a self,
        query: &'a CaseQuery,
    ) -> impl Iterator<Item = Result<TestCase, ParamError>> + 'a {
        let range = match query.test() {
            Some(name) => match self.tests.iter().position(|t| t.name == name) {
                Some(index) => index..index + 1,
                None => 0..0,
            },
            None => 0..self.tests.len(),
        };
        tracing::debug!(suite = %self.suite, ?query, "selecting cases");
        Expansion::over(self, range).filter(move |case| match case {
            Ok(case) => query.matches(case),
            Err(_) => true,
        })
    }

    /// Case count per test, checking names along the way.
    pub fn counts(&self) -> Result<Vec<(String, usize)>, ParamError> {
        let mut counts: Vec<(String, usize)> = self
            .tests
            .iter()
            .map(|t| (t.name.clone(), 0))
            .collect();
        let mut expansion = self.cases();
        while let Some(case) = expansion.next() {
            case?;
            if let Some(index) = expansion.current_test() {
                counts[index].1 += 1;
            }
        }
        Ok(counts)
    }
}

/// Iterator over the cases of a [`Catalog`].
///
/// Holds the canonical names of the current test's cases to reject
/// duplicates; memory grows with the largest single test, not the suite.
pub struct Expansion<'a> {
    catalog: &'a Catalog,
    next_test: usize,
    end: usize,
    current: Option<(usize, Cases<'a>)>,
    seen: HashSet<Vec<(String, String)>>,
}

impl<'a> Expansion<'a> {
    fn over(catalog: &'a Catalog, tests: Range<usize>) -> Self {
        Expansion {
            catalog,
            next_test: tests.start,
            end: tests.end,
            current: None,
            seen: HashSet::new(),
        }
    }

    /// Index of the test the last yielded case belongs to.
    fn current_test(&self) -> Option<usize> {
        self.current.as_ref().map(|(index, _)| *index)
    }

    fn finish(&mut self) {
        self.current = None;
        self.next_test = self.end;
    }
}

impl Iterator for Expansion<'_> {
    type Item = Result<TestCase, ParamError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current.is_none() {
                if self.next_test >= self.end {
                    return None;
                }
                let test = self.catalog.tests.get(self.next_test)?;
                self.current = Some((self.next_test, test.params.iter()));
                self.next_test += 1;
                self.seen.clear();
            }
            let (index, cases) = self.current.as_mut()?;
            let index = *index;
            match cases.next() {
                Some(Ok(params)) => {
                    let case = TestCase {
                        suite: self.catalog.suite.clone(),
                        test: self.catalog.tests[index].name.clone(),
                        params,
                    };
                    if !self.seen.insert(canonical_entries(&case.params)) {
                        self.finish();
                        return Some(Err(ParamError::DuplicateCase { case: case.id() }));
                    }
                    return Some(Ok(case));
                }
                Some(Err(e)) => {
                    self.finish();
                    return Some(Err(e));
                }
                None => self.current = None,
            }
        }
    }
}

/// Sorted `(name, json)` pairs; equal for records with the same entries.
fn canonical_entries(params: &ParamRecord) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = params
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_json()))
        .collect();
    entries.sort();
    entries
}

// ============================================================================
// QUERIES
// ============================================================================

/// A selection of cases by id.
///
/// | Text                         | Selects                                   |
/// |------------------------------|-------------------------------------------|
/// | `suite:*`                    | every case of the suite                   |
/// | `suite:test:*`               | every case of one test                    |
/// | `suite:test:k=v;k2=v2;*`     | cases of the test containing these entries |
/// | `suite:test:k=v;k2=v2`       | the case with exactly these entries       |
///
/// Entry order in the query does not matter.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseQuery {
    Suite,
    Test { test: String },
    Partial { test: String, params: ParamRecord },
    Exact { test: String, params: ParamRecord },
}

impl CaseQuery {
    /// Parses a query for cases of `suite`.
    ///
    /// ```rust
    /// use paramset::cases::CaseQuery;
    /// let q = CaseQuery::parse("webgpu:api", "webgpu:api:draw:indirect=true;*").unwrap();
    /// assert_eq!(q.test(), Some("draw"));
    /// ```
    pub fn parse(suite: &str, text: &str) -> Result<CaseQuery, ParamError> {
        let malformed = |reason: String| ParamError::MalformedQuery {
            query: text.to_string(),
            reason,
        };

        let rest = text
            .strip_prefix(suite)
            .and_then(|rest| rest.strip_prefix(':'))
            .ok_or_else(|| malformed(format!("not a query in suite '{}'", suite)))?;
        if rest == "*" {
            return Ok(CaseQuery::Suite);
        }
        let (test, params) = rest
            .split_once(':')
            .ok_or_else(|| malformed("expected 'test:*' or 'test:<params>' after the suite".to_string()))?;
        if test.is_empty() {
            return Err(malformed("empty test name".to_string()));
        }
        let test = test.to_string();
        if params == "*" {
            return Ok(CaseQuery::Test { test });
        }
        match params.strip_suffix(";*") {
            Some(partial) => Ok(CaseQuery::Partial {
                test,
                params: ParamRecord::parse_query(partial)?,
            }),
            None => Ok(CaseQuery::Exact {
                test,
                params: ParamRecord::parse_query(params)?,
            }),
        }
    }

    /// The test this query is limited to, if any.
    pub fn test(&self) -> Option<&str> {
        match self {
            CaseQuery::Suite => None,
            CaseQuery::Test { test }
            | CaseQuery::Partial { test, .. }
            | CaseQuery::Exact { test, .. } => Some(test),
        }
    }

    pub fn matches(&self, case: &TestCase) -> bool {
        match self {
            CaseQuery::Suite => true,
            CaseQuery::Test { test } => case.test == *test,
            CaseQuery::Partial { test, params } => {
                case.test == *test && case.params.matches(params)
            }
            CaseQuery::Exact { test, params } => case.test == *test && case.params == *params,
        }
    }
}

#[cfg(test)]
mod cases_tests {
    use super::*;
    use crate::params::{combine, options, records};
    use crate::params;

    #[test]
    fn cases_are_named_suite_test_query() {
        let mut catalog = Catalog::new("s");
        catalog
            .add_test("t", combine([options("x", [1]), options("y", ["a"])]))
            .unwrap();
        let case = catalog.cases().next().unwrap().unwrap();
        assert_eq!(case.id(), "s:t:x=1;y=\"a\"");
        assert_eq!(case.to_string(), case.id());
    }

    #[test]
    fn duplicates_within_a_test_are_rejected() {
        let mut catalog = Catalog::new("s");
        catalog
            .add_test(
                "t",
                records([params! { "a" => 1, "b" => 2 }, params! { "b" => 2, "a" => 1 }]),
            )
            .unwrap();
        let results: Vec<_> = catalog.cases().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ParamError::DuplicateCase { .. })));
    }

    #[test]
    fn same_params_in_different_tests_are_fine() {
        let mut catalog = Catalog::new("s");
        catalog.add_test("one", options("x", [1, 2])).unwrap();
        catalog.add_test("two", options("x", [1, 2])).unwrap();
        assert_eq!(
            catalog.counts().unwrap(),
            vec![("one".to_string(), 2), ("two".to_string(), 2)]
        );
    }

    #[test]
    fn empty_tests_count_zero() {
        let empty: [i64; 0] = [];
        let mut catalog = Catalog::new("s");
        catalog.add_test("none", options("x", empty)).unwrap();
        catalog.add_test("one", options("x", [5])).unwrap();
        assert_eq!(
            catalog.counts().unwrap(),
            vec![("none".to_string(), 0), ("one".to_string(), 1)]
        );
    }

    #[test]
    fn non_finite_floats_are_distinct_cases() {
        let mut catalog = Catalog::new("s");
        catalog
            .add_test("t", options("x", [f64::NAN, f64::INFINITY, f64::NEG_INFINITY]))
            .unwrap();
        let cases: Vec<TestCase> = catalog.cases().map(Result::unwrap).collect();
        let ids: Vec<String> = cases.iter().map(TestCase::id).collect();
        assert_eq!(
            ids,
            vec!["s:t:x=\"_nan_\"", "s:t:x=\"_posinf_\"", "s:t:x=\"_neginf_\""]
        );
        for case in &cases {
            let query = case.params.to_query();
            assert_eq!(ParamRecord::parse_query(&query).unwrap(), case.params);
        }
    }

    #[test]
    fn invalid_names_are_not_reported_as_duplicates() {
        let mut catalog = Catalog::new("s");
        catalog
            .add_test(
                "t",
                records([params! { "a" => 1, "b" => 2 }, params! { "a=1;b" => 2 }]),
            )
            .unwrap();
        let results: Vec<_> = catalog.cases().collect();
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ParamError::InvalidName { .. })));
    }

    #[test]
    fn separators_inside_values_are_distinct_cases() {
        let mut catalog = Catalog::new("s");
        catalog
            .add_test(
                "t",
                records([params! { "a" => "1;b=2" }, params! { "a" => 1, "b" => 2 }]),
            )
            .unwrap();
        assert_eq!(catalog.counts().unwrap(), vec![("t".to_string(), 2)]);
    }

    fn grid() -> Catalog {
        let mut catalog = Catalog::new("web:api");
        catalog
            .add_test("draw", combine([options("indirect", [false, true]), options("count", [1, 3])]))
            .unwrap();
        catalog.add_test("clear", options("x", [1])).unwrap();
        catalog
    }

    fn selected(catalog: &Catalog, text: &str) -> Vec<String> {
        let query = CaseQuery::parse(&catalog.suite, text).unwrap();
        catalog.select(&query).map(|case| case.unwrap().id()).collect()
    }

    #[test]
    fn partial_queries_select_containing_cases() {
        assert_eq!(
            selected(&grid(), "web:api:draw:indirect=true;*"),
            vec!["web:api:draw:indirect=true;count=1", "web:api:draw:indirect=true;count=3"]
        );
    }

    #[test]
    fn exact_queries_ignore_entry_order() {
        assert_eq!(
            selected(&grid(), "web:api:draw:count=3;indirect=false"),
            vec!["web:api:draw:indirect=false;count=3"]
        );
        assert!(selected(&grid(), "web:api:draw:indirect=false").is_empty());
    }

    #[test]
    fn wildcards_select_tests_and_suites() {
        assert_eq!(selected(&grid(), "web:api:draw:*").len(), 4);
        assert_eq!(selected(&grid(), "web:api:*").len(), 5);
        assert!(selected(&grid(), "web:api:draw:count=2;*").is_empty());
        assert!(selected(&grid(), "web:api:missing:*").is_empty());
    }

    #[test]
    fn selection_skips_broken_tests_it_does_not_name() {
        let mut catalog = grid();
        catalog
            .add_test("broken", combine([options("x", [1]), options("x", [2])]))
            .unwrap();
        assert_eq!(selected(&catalog, "web:api:clear:*"), vec!["web:api:clear:x=1"]);
    }

    #[test]
    fn malformed_case_queries_are_rejected() {
        for bad in ["other:*", "web:api", "web:api:draw", "web:api::*", "web:api:draw:x=;*"] {
            let err = CaseQuery::parse("web:api", bad).unwrap_err();
            assert!(matches!(err, ParamError::MalformedQuery { .. }), "{bad} gave {err:?}");
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut catalog = Catalog::new("s");
        catalog.add_test("t", options("x", [1])).unwrap();
        let err = catalog.add_test("t", options("y", [1])).unwrap_err();
        assert!(err.to_string().contains("s:t"));
    }
}
