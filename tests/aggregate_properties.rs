//! Property-based checks for grouping and series transforms.
//!
//! 1. Factor count equals the product of distinct values per field
//! 2. Per-split group sums add up to the matching rows' total
//! 3. Cumulative sum of the differences rebuilds the forward-filled series
//! 4. A rolling window of one is the identity
//! 5. Rolling means stay within the window's min and max

use std::collections::HashSet;

use dvcrust::{
    aggregate_measure, build_category_factors, difference_series, forward_fill, rolling_mean,
    DemographicRow,
};
use proptest::prelude::*;

fn demographic_row() -> impl Strategy<Value = DemographicRow> {
    (
        prop::sample::select(vec!["AG", "BE", "GE", "ZH"]),
        prop::sample::select(vec!["0 - 9", "10 - 19", "20 - 29"]),
        prop::sample::select(vec!["female", "male"]),
        prop::option::of(0u32..200_000),
    )
        .prop_map(|(canton, age, sex, pop)| DemographicRow {
            canton: canton.to_string(),
            age_group: age.to_string(),
            sex: sex.to_string(),
            pop_size: pop.map(f64::from),
        })
}

fn distinct(rows: &[DemographicRow], f: impl Fn(&DemographicRow) -> &str) -> usize {
    rows.iter().map(f).collect::<HashSet<_>>().len()
}

proptest! {
    #[test]
    fn factor_count_is_cartesian(rows in prop::collection::vec(demographic_row(), 1..60)) {
        let factors = build_category_factors(&rows, &["canton", "age_group", "sex"]).unwrap();
        let expected = distinct(&rows, |r| r.canton.as_str())
            * distinct(&rows, |r| r.age_group.as_str())
            * distinct(&rows, |r| r.sex.as_str());
        prop_assert_eq!(factors.len(), expected);

        let unique: HashSet<_> = factors.iter().collect();
        prop_assert_eq!(unique.len(), factors.len());
    }

    #[test]
    fn split_totals_match_input(rows in prop::collection::vec(demographic_row(), 1..60)) {
        for sex in ["female", "male"] {
            let grouped = aggregate_measure(&rows, &["canton", "age_group"], "sex", sex, "pop_size")
                .unwrap();
            let expected: f64 = rows
                .iter()
                .filter(|r| r.sex == sex)
                .filter_map(|r| r.pop_size)
                .sum();
            prop_assert_eq!(grouped.total(), expected);
        }
    }

    #[test]
    fn differences_rebuild_filled_series(
        raw in prop::collection::vec(prop::option::of(0u32..1_000_000), 1..80)
    ) {
        let raw: Vec<Option<f64>> = raw.into_iter().map(|v| v.map(f64::from)).collect();
        let filled = forward_fill(&raw);
        let daily = difference_series(&raw);
        prop_assert_eq!(daily.len(), raw.len());
        prop_assert_eq!(daily[0], 0.0);

        let mut acc = filled[0];
        for i in 1..daily.len() {
            acc += daily[i];
            prop_assert_eq!(acc, filled[i]);
        }
    }

    #[test]
    fn unit_window_is_identity(xs in prop::collection::vec(-1.0e6f64..1.0e6, 0..100)) {
        prop_assert_eq!(rolling_mean(&xs, 1).unwrap(), xs);
    }

    #[test]
    fn rolling_mean_is_bounded_by_window(
        xs in prop::collection::vec(-1.0e3f64..1.0e3, 1..100),
        window in 1usize..10,
    ) {
        let means = rolling_mean(&xs, window).unwrap();
        prop_assert_eq!(means.len(), xs.len());
        for (i, m) in means.iter().enumerate() {
            let slice = &xs[(i + 1).saturating_sub(window)..=i];
            let lo = slice.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = slice.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(*m >= lo - 1e-9 && *m <= hi + 1e-9, "mean {} outside [{}, {}]", m, lo, hi);
        }
    }
}
