use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AggregateError, Result};

/// A strongly typed observation whose fields can be addressed by name.
///
/// The field sets are fixed per type, so a name is validated once against
/// `CATEGORY_FIELDS`/`MEASURE_FIELDS` instead of on every row.
pub trait Record {
    const CATEGORY_FIELDS: &'static [&'static str];
    const MEASURE_FIELDS: &'static [&'static str];

    fn category(&self, field: &str) -> Option<&str>;

    /// `None` means the value is missing for this row.
    fn measure(&self, field: &str) -> Option<f64>;
}

pub fn check_category_field<R: Record>(field: &str) -> Result<()> {
    if R::CATEGORY_FIELDS.contains(&field) {
        Ok(())
    } else {
        Err(AggregateError::InvalidField { field: field.to_string() })
    }
}

pub fn check_measure_field<R: Record>(field: &str) -> Result<()> {
    if R::MEASURE_FIELDS.contains(&field) {
        Ok(())
    } else {
        Err(AggregateError::InvalidField { field: field.to_string() })
    }
}

/// Ordered tuple of categorical values identifying one aggregation bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(Vec<String>);

impl GroupKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// Key of `record` over `fields`. Fields must already be validated.
    pub(crate) fn of<R: Record>(record: &R, fields: &[&str]) -> Self {
        Self(
            fields
                .iter()
                .map(|f| record.category(f).unwrap_or_default().to_string())
                .collect(),
        )
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// One row of the BAG demographics table: population by canton, age band and sex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicRow {
    pub canton: String,
    pub age_group: String,
    pub sex: String,
    pub pop_size: Option<f64>,
}

impl Record for DemographicRow {
    const CATEGORY_FIELDS: &'static [&'static str] = &["canton", "age_group", "sex"];
    const MEASURE_FIELDS: &'static [&'static str] = &["pop_size"];

    fn category(&self, field: &str) -> Option<&str> {
        match field {
            "canton" => Some(&self.canton),
            "age_group" => Some(&self.age_group),
            "sex" => Some(&self.sex),
            _ => None,
        }
    }

    fn measure(&self, field: &str) -> Option<f64> {
        match field {
            "pop_size" => self.pop_size,
            _ => None,
        }
    }
}

/// One day of the BAG test statistics.
///
/// `frac_negative` holds the fraction of positive tests; the column name is
/// kept as published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestsRow {
    pub date: NaiveDate,
    pub n_negative: Option<f64>,
    pub n_positive: Option<f64>,
    pub n_tests: Option<f64>,
    pub frac_negative: Option<f64>,
}

impl Record for TestsRow {
    const CATEGORY_FIELDS: &'static [&'static str] = &[];
    const MEASURE_FIELDS: &'static [&'static str] =
        &["n_negative", "n_positive", "n_tests", "frac_negative"];

    fn category(&self, _field: &str) -> Option<&str> {
        None
    }

    fn measure(&self, field: &str) -> Option<f64> {
        match field {
            "n_negative" => self.n_negative,
            "n_positive" => self.n_positive,
            "n_tests" => self.n_tests,
            "frac_negative" => self.frac_negative,
            _ => None,
        }
    }
}
