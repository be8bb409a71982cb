use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::error::{AggregateError, Result};
use crate::model::record::{check_category_field, check_measure_field, GroupKey, Record};
use crate::model::table::{NamedSeries, SeriesTable};

/// Per-group sums of one measure, in factor order. Empty groups hold 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedMeasure {
    pub rows: Vec<(GroupKey, f64)>,
}

impl GroupedMeasure {
    pub fn get(&self, key: &GroupKey) -> Option<f64> {
        self.rows.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|(_, v)| *v).collect()
    }

    pub fn total(&self) -> f64 {
        self.rows.iter().map(|(_, v)| v).sum()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One factor with one value per stack, in stack order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow {
    pub key: GroupKey,
    pub values: Vec<f64>,
}

/// Stacked bar data: every factor of the grouping, one value per stack.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedTable {
    pub group_fields: Vec<String>,
    pub stacks: Vec<String>,
    pub rows: Vec<AggregatedRow>,
}

impl StackedTable {
    pub fn factors(&self) -> impl Iterator<Item = &GroupKey> {
        self.rows.iter().map(|r| &r.key)
    }

    /// Values of stack `name` across all factors.
    pub fn stack(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.stacks.iter().position(|s| s == name)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    pub fn to_series_table(&self) -> SeriesTable {
        let index = self.rows.iter().map(|r| r.key.to_string()).collect();
        let series = self
            .stacks
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                NamedSeries::new(
                    name.clone(),
                    self.rows.iter().map(|r| Some(r.values[idx])).collect(),
                )
            })
            .collect();
        SeriesTable {
            index_name: self.group_fields.join("/"),
            index,
            series,
        }
    }
}

fn check_grouping<R: Record>(observations: &[R], group_fields: &[&str]) -> Result<()> {
    if observations.is_empty() {
        return Err(AggregateError::EmptyInput);
    }
    if group_fields.is_empty() {
        return Err(AggregateError::InvalidArgument(
            "at least one grouping field is required".into(),
        ));
    }
    group_fields
        .iter()
        .try_for_each(|f| check_category_field::<R>(f))
}

/// Distinct values of `field` in first-seen order.
fn distinct_values<'a, R: Record>(observations: &'a [R], field: &str) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for obs in observations {
        if let Some(v) = obs.category(field) {
            if seen.insert(v) {
                out.push(v);
            }
        }
    }
    out
}

/// Cartesian product of the distinct values of each grouping field.
///
/// Values keep their first-seen order; the first field varies slowest.
pub fn build_category_factors<R: Record>(
    observations: &[R],
    group_fields: &[&str],
) -> Result<Vec<GroupKey>> {
    check_grouping(observations, group_fields)?;

    let mut prefixes: Vec<Vec<&str>> = vec![Vec::new()];
    for field in group_fields {
        let values = distinct_values(observations, field);
        let mut next = Vec::with_capacity(prefixes.len() * values.len());
        for prefix in &prefixes {
            for v in &values {
                let mut key = prefix.clone();
                key.push(v);
                next.push(key);
            }
        }
        prefixes = next;
    }

    debug!(fields = ?group_fields, factors = prefixes.len(), "built category factors");
    Ok(prefixes.into_iter().map(GroupKey::new).collect())
}

/// Sum `measure_field` per group over rows where `split_field == split_value`.
///
/// Every factor of the full input appears in the result; groups without a
/// matching row, and missing measure values, count as 0.
pub fn aggregate_measure<R: Record>(
    observations: &[R],
    group_fields: &[&str],
    split_field: &str,
    split_value: &str,
    measure_field: &str,
) -> Result<GroupedMeasure> {
    let factors = build_category_factors(observations, group_fields)?;
    check_category_field::<R>(split_field)?;
    check_measure_field::<R>(measure_field)?;

    let mut sums: HashMap<GroupKey, f64> = HashMap::new();
    for obs in observations
        .iter()
        .filter(|o| o.category(split_field) == Some(split_value))
    {
        let value = obs.measure(measure_field).unwrap_or(0.0);
        *sums.entry(GroupKey::of(obs, group_fields)).or_insert(0.0) += value;
    }

    let rows = factors
        .into_iter()
        .map(|key| {
            let v = sums.get(&key).copied().unwrap_or(0.0);
            (key, v)
        })
        .collect();
    Ok(GroupedMeasure { rows })
}

/// Run [`aggregate_measure`] once per `(stack name, split value)` pair.
pub fn stack_measure<R: Record>(
    observations: &[R],
    group_fields: &[&str],
    split_field: &str,
    stacks: &[(&str, &str)],
    measure_field: &str,
) -> Result<StackedTable> {
    if stacks.is_empty() {
        return Err(AggregateError::InvalidArgument(
            "at least one stack is required".into(),
        ));
    }

    let per_stack = stacks
        .iter()
        .map(|(_, split_value)| {
            aggregate_measure(observations, group_fields, split_field, split_value, measure_field)
        })
        .collect::<Result<Vec<_>>>()?;

    let rows = per_stack[0]
        .rows
        .iter()
        .enumerate()
        .map(|(i, (key, _))| AggregatedRow {
            key: key.clone(),
            values: per_stack.iter().map(|m| m.rows[i].1).collect(),
        })
        .collect();

    Ok(StackedTable {
        group_fields: group_fields.iter().map(|f| f.to_string()).collect(),
        stacks: stacks.iter().map(|(name, _)| name.to_string()).collect(),
        rows,
    })
}

/// Drop rows whose categorical `field` equals any of `values`.
pub fn exclude_category<R: Record + Clone>(
    observations: &[R],
    field: &str,
    values: &[&str],
) -> Result<Vec<R>> {
    check_category_field::<R>(field)?;
    let kept: Vec<R> = observations
        .iter()
        .filter(|o| o.category(field).map_or(true, |v| !values.contains(&v)))
        .cloned()
        .collect();
    debug!(field, dropped = observations.len() - kept.len(), "excluded categories");
    Ok(kept)
}

/// The raw values of one measure, in row order.
pub fn measure_column<R: Record>(observations: &[R], field: &str) -> Result<Vec<Option<f64>>> {
    check_measure_field::<R>(field)?;
    Ok(observations.iter().map(|o| o.measure(field)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::DemographicRow;

    fn row(canton: &str, age: &str, sex: &str, pop: Option<f64>) -> DemographicRow {
        DemographicRow {
            canton: canton.into(),
            age_group: age.into(),
            sex: sex.into(),
            pop_size: pop,
        }
    }

    fn sample() -> Vec<DemographicRow> {
        vec![
            row("A", "0-9", "F", Some(5.0)),
            row("A", "0-9", "M", Some(3.0)),
            row("B", "0-9", "F", Some(2.0)),
        ]
    }

    #[test]
    fn split_by_sex_fills_missing_groups_with_zero() {
        let obs = sample();
        let f = aggregate_measure(&obs, &["canton"], "sex", "F", "pop_size").unwrap();
        assert_eq!(f.get(&GroupKey::new(["A"])), Some(5.0));
        assert_eq!(f.get(&GroupKey::new(["B"])), Some(2.0));

        let m = aggregate_measure(&obs, &["canton"], "sex", "M", "pop_size").unwrap();
        assert_eq!(m.values(), vec![3.0, 0.0]);
    }

    #[test]
    fn factors_follow_first_seen_order_first_field_slowest() {
        let obs = vec![
            row("ZH", "10-19", "F", Some(1.0)),
            row("BE", "0-9", "F", Some(1.0)),
            row("ZH", "0-9", "M", Some(1.0)),
        ];
        let factors = build_category_factors(&obs, &["canton", "age_group"]).unwrap();
        let labels: Vec<String> = factors.iter().map(|k| k.to_string()).collect();
        assert_eq!(labels, vec!["ZH/10-19", "ZH/0-9", "BE/10-19", "BE/0-9"]);
    }

    #[test]
    fn factor_count_is_product_of_distinct_values() {
        let obs = vec![
            row("A", "x", "F", None),
            row("B", "y", "M", None),
            row("C", "x", "F", None),
        ];
        let factors = build_category_factors(&obs, &["canton", "age_group", "sex"]).unwrap();
        assert_eq!(factors.len(), 3 * 2 * 2);
    }

    #[test]
    fn missing_measure_counts_as_zero() {
        let obs = vec![row("A", "0-9", "F", None), row("A", "0-9", "F", Some(4.0))];
        let f = aggregate_measure(&obs, &["canton"], "sex", "F", "pop_size").unwrap();
        assert_eq!(f.total(), 4.0);
    }

    #[test]
    fn invalid_inputs_fail_fast() {
        let obs = sample();
        assert_eq!(
            build_category_factors(&obs, &["region"]),
            Err(AggregateError::InvalidField { field: "region".into() })
        );
        assert!(matches!(
            build_category_factors(&obs, &[]),
            Err(AggregateError::InvalidArgument(_))
        ));
        assert_eq!(
            build_category_factors::<DemographicRow>(&[], &["canton"]),
            Err(AggregateError::EmptyInput)
        );
        assert!(matches!(
            aggregate_measure(&obs, &["canton"], "sex", "F", "cases"),
            Err(AggregateError::InvalidField { .. })
        ));
        assert!(matches!(
            aggregate_measure(&obs, &["canton"], "gender", "F", "pop_size"),
            Err(AggregateError::InvalidField { .. })
        ));
    }

    #[test]
    fn stacks_share_factor_order() {
        let obs = sample();
        let table = stack_measure(
            &obs,
            &["canton", "age_group"],
            "sex",
            &[("female", "F"), ("male", "M")],
            "pop_size",
        )
        .unwrap();
        assert_eq!(table.stacks, vec!["female", "male"]);
        assert_eq!(table.stack("female"), Some(vec![5.0, 2.0]));
        assert_eq!(table.stack("male"), Some(vec![3.0, 0.0]));
        assert_eq!(table.stack("other"), None);
        let factors: Vec<String> = table.factors().map(|k| k.to_string()).collect();
        assert_eq!(factors, vec!["A/0-9", "B/0-9"]);

        let st = table.to_series_table();
        assert_eq!(st.index, vec!["A/0-9", "B/0-9"]);
        assert_eq!(st.index_name, "canton/age_group");
    }

    #[test]
    fn stacking_requires_a_stack() {
        let obs = sample();
        assert!(matches!(
            stack_measure(&obs, &["canton"], "sex", &[], "pop_size"),
            Err(AggregateError::InvalidArgument(_))
        ));
    }

    #[test]
    fn exclude_drops_matching_rows() {
        let mut obs = sample();
        obs.push(row("CH", "0-9", "F", Some(100.0)));
        let kept = exclude_category(&obs, "canton", &["CH"]).unwrap();
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|r| r.canton != "CH"));
        assert!(exclude_category(&obs, "nation", &["CH"]).is_err());
    }
}
