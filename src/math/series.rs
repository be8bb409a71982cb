use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{AggregateError, Result};

/// Replace each missing value with the most recent present one.
/// Leading missing values become 0.
pub fn forward_fill(series: &[Option<f64>]) -> Vec<f64> {
    let mut last = 0.0;
    series
        .iter()
        .map(|v| {
            if let Some(x) = v {
                last = *x;
            }
            last
        })
        .collect()
}

/// Day-over-day change of a cumulative series after forward-filling it.
///
/// `out[0]` is 0 and `out[i] = filled[i] - filled[i - 1]`; the output has the
/// input's length.
pub fn difference_series(cumulative: &[Option<f64>]) -> Vec<f64> {
    let filled = forward_fill(cumulative);
    let mut out = vec![0.0; filled.len()];
    for i in 1..filled.len() {
        out[i] = filled[i] - filled[i - 1];
    }
    out
}

/// Trailing mean over `window` points, clipped at the series start so the
/// first `window - 1` entries average over fewer points.
pub fn rolling_mean(series: &[f64], window: usize) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(AggregateError::InvalidArgument(
            "rolling window must be >= 1".into(),
        ));
    }
    let mut out = Vec::with_capacity(series.len());
    for i in 0..series.len() {
        let start = (i + 1).saturating_sub(window);
        let slice = &series[start..=i];
        out.push(slice.iter().sum::<f64>() / slice.len() as f64);
    }
    Ok(out)
}

pub(crate) fn check_strictly_increasing(dates: &[NaiveDate]) -> Result<()> {
    match dates.windows(2).position(|w| w[0] >= w[1]) {
        Some(i) => Err(AggregateError::InvalidArgument(format!(
            "dates not strictly increasing at index {}: {} >= {}",
            i + 1,
            dates[i],
            dates[i + 1]
        ))),
        None => Ok(()),
    }
}

/// Named sequence of (date, value) points with strictly increasing dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub name: String,
    points: Vec<(NaiveDate, f64)>,
}

impl TimeSeries {
    pub fn new(name: impl Into<String>, dates: &[NaiveDate], values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(AggregateError::InvalidArgument(format!(
                "{} dates but {} values",
                dates.len(),
                values.len()
            )));
        }
        check_strictly_increasing(dates)?;
        Ok(Self {
            name: name.into(),
            points: dates.iter().copied().zip(values).collect(),
        })
    }

    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|(d, _)| *d).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, v)| *v).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Smoothed daily increments of a cumulative series:
/// forward-fill, difference, then a trailing rolling mean.
pub fn smoothed_daily_series(
    name: &str,
    dates: &[NaiveDate],
    cumulative: &[Option<f64>],
    window: usize,
) -> Result<TimeSeries> {
    let daily = difference_series(cumulative);
    let smoothed = rolling_mean(&daily, window)?;
    TimeSeries::new(name, dates, smoothed)
}
