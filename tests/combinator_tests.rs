//! Behavioural tests for the parameter set combinators.
//!
//! Each module covers one combinator family; together they pin down
//! cardinality, ordering, collision and restartability guarantees.

mod common;

use common::{drain, queries};
use paramset::{
    bools, combine, exclude, filter, only, options, params, records, unit, ParamError,
    ParamRecord, ParamSet, Value,
};

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn unit_yields_one_empty_record() {
        assert_eq!(drain(&unit()), vec![ParamRecord::new()]);
    }

    #[test]
    fn empty_combine_behaves_like_unit() {
        let none: Vec<ParamSet> = Vec::new();
        assert_eq!(drain(&combine(none)), drain(&unit()));
    }
}

#[cfg(test)]
mod options_tests {
    use super::*;

    #[test]
    fn one_record_per_value_in_order() {
        let got = drain(&options("format", ["r8", "rg8", "rgba8"]));
        assert_eq!(
            got,
            vec![
                params! { "format" => "r8" },
                params! { "format" => "rg8" },
                params! { "format" => "rgba8" },
            ]
        );
    }

    #[test]
    fn empty_values_yield_nothing() {
        let empty: Vec<Value> = Vec::new();
        assert!(drain(&options("x", empty)).is_empty());
    }

    #[test]
    fn bools_are_false_then_true() {
        assert_eq!(queries(&bools("m")), vec!["m=false", "m=true"]);
    }

    #[test]
    fn mixed_value_kinds_are_kept() {
        let values = vec![Value::from(1), Value::from(1.5), Value::from("one")];
        assert_eq!(queries(&options("v", values)), vec!["v=1", "v=1.5", "v=\"one\""]);
    }
}

#[cfg(test)]
mod combine_tests {
    use super::*;

    #[test]
    fn last_axis_varies_fastest() {
        let set = combine([options("x", [1, 2]), options("y", ["a", "b"])]);
        assert_eq!(
            drain(&set),
            vec![
                params! { "x" => 1, "y" => "a" },
                params! { "x" => 1, "y" => "b" },
                params! { "x" => 2, "y" => "a" },
                params! { "x" => 2, "y" => "b" },
            ]
        );
    }

    #[test]
    fn cardinality_is_the_product() {
        let set = combine([
            options("a", [1, 2, 3]),
            bools("b"),
            options("c", ["p", "q", "r", "s"]),
            unit(),
        ]);
        assert_eq!(set.count_cases().unwrap(), 3 * 2 * 4);
    }

    #[test]
    fn zero_length_axis_collapses_the_product() {
        let empty: Vec<i64> = Vec::new();
        let set = combine([options("a", [1, 2, 3]), options("b", empty), bools("c")]);
        assert_eq!(set.count_cases().unwrap(), 0);
    }

    #[test]
    fn records_are_disjoint_unions() {
        let left = records([params! { "w" => 4, "h" => 4 }, params! { "w" => 8, "h" => 2 }]);
        let right = options("format", ["r8", "rgba8"]);
        for record in drain(&combine([left, right])) {
            assert_eq!(record.len(), 3);
            assert!(record.contains_key("w"));
            assert!(record.contains_key("h"));
            assert!(record.contains_key("format"));
        }
    }

    #[test]
    fn duplicate_keys_fail_instead_of_overwriting() {
        let set = combine([options("x", [1]), options("x", [2])]);
        let results: Vec<_> = set.iter().collect();
        assert_eq!(results.len(), 1);
        match &results[0] {
            Err(ParamError::DuplicateKey { key }) => assert_eq!(key, "x"),
            other => panic!("expected a duplicate key error, got {:?}", other),
        }
        assert!(set.collect_records().is_err());
        assert!(set.count_cases().is_err());
    }

    #[test]
    fn draining_twice_gives_the_same_sequence() {
        let set = combine([
            options("x", [1, 2]),
            filter(bools("m"), |r| r.get("m") == Some(&Value::Bool(true))),
            options("y", ["a", "b", "c"]),
        ]);
        let first = drain(&set);
        let second = drain(&set);
        assert_eq!(first.len(), 6);
        assert_eq!(first, second);
    }

    #[test]
    fn a_half_drained_iterator_does_not_affect_a_new_one() {
        let set = combine([options("x", [1, 2]), options("y", [1, 2])]);
        let mut partial = set.iter();
        partial.next();
        partial.next();
        assert_eq!(drain(&set).len(), 4);
        assert_eq!(partial.count(), 2);
    }

    #[test]
    fn combine_with_appends_the_fastest_axis() {
        let set = options("x", [1, 2]).combine_with(options("y", [1, 2]));
        let set = set.combine_with(bools("z"));
        let got = queries(&set);
        assert_eq!(got.len(), 8);
        assert_eq!(got[0], "x=1;y=1;z=false");
        assert_eq!(got[1], "x=1;y=1;z=true");
    }

    #[test]
    fn concurrent_traversals_agree() {
        let set = combine([options("x", [1, 2, 3]), bools("m"), options("y", ["a", "b"])]);
        let expected = queries(&set);
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4).map(|_| scope.spawn(|| queries(&set))).collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn large_products_are_not_materialised() {
        let axis: Vec<i64> = (0..100).collect();
        let set = combine([
            options("a", axis.clone()),
            options("b", axis.clone()),
            options("c", axis),
        ]);
        let mut cases = set.iter();
        let first = cases.next().unwrap().unwrap();
        assert_eq!(first.to_query(), "a=0;b=0;c=0");
        let thousandth = cases.nth(998).unwrap().unwrap();
        assert_eq!(thousandth.to_query(), "a=0;b=9;c=99");
    }
}

#[cfg(test)]
mod filter_tests {
    use super::*;

    #[test]
    fn filter_keeps_matching_records_in_order() {
        let set = filter(
            options("a", [true, false, true]),
            |r| r.get("a").and_then(Value::as_bool) == Some(true),
        );
        assert_eq!(queries(&set), vec!["a=true", "a=true"]);
    }

    #[test]
    fn filter_on_a_product() {
        let set = combine([options("x", [1, 2, 3]), options("y", [1, 2, 3])])
            .filter(|r| r.get("x") != r.get("y"));
        assert_eq!(set.count_cases().unwrap(), 6);
    }

    #[test]
    fn exclude_uses_partial_patterns() {
        let source = records([
            params! { "a" => true, "x" => 1 },
            params! { "a" => false, "y" => 2 },
        ]);
        let set = exclude(source, [params! { "a" => true }]);
        assert_eq!(drain(&set), vec![params! { "a" => false, "y" => 2 }]);
    }

    #[test]
    fn exclude_with_several_patterns() {
        let set = combine([options("x", [1, 2]), options("y", [1, 2])])
            .exclude([params! { "x" => 1, "y" => 2 }, params! { "x" => 2, "y" => 1 }]);
        assert_eq!(queries(&set), vec!["x=1;y=1", "x=2;y=2"]);
    }

    #[test]
    fn exclude_pattern_with_unknown_key_matches_nothing() {
        let set = options("x", [1, 2]).exclude([params! { "z" => 1 }]);
        assert_eq!(set.count_cases().unwrap(), 2);
    }

    #[test]
    fn empty_pattern_excludes_everything() {
        let set = options("x", [1, 2]).exclude([params! {}]);
        assert_eq!(set.count_cases().unwrap(), 0);
    }

    #[test]
    fn only_keeps_records_matching_any_pattern() {
        let set = only(
            combine([options("x", [1, 2]), bools("m")]),
            [params! { "m" => true }, params! { "x" => 1 }],
        );
        assert_eq!(queries(&set), vec!["x=1;m=false", "x=1;m=true", "x=2;m=true"]);
    }

    #[test]
    fn errors_pass_through_filters() {
        let colliding = combine([options("x", [1]), options("x", [2])]);
        let set = filter(colliding, |_| false);
        assert!(matches!(
            set.iter().next(),
            Some(Err(ParamError::DuplicateKey { .. }))
        ));
    }
}
