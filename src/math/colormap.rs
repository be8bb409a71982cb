use serde::Serialize;

use crate::error::{AggregateError, Result};

/// ColorBrewer "Spectral", 6 classes.
pub const SPECTRAL6: [&str; 6] = ["#3288bd", "#99d594", "#e6f598", "#fee08b", "#fc8d59", "#d53e4f"];

/// ColorBrewer "Spectral", 8 classes.
pub const SPECTRAL8: [&str; 8] = [
    "#3288bd", "#66c2a5", "#abdda4", "#e6f598", "#fee08b", "#fdae61", "#f46d43", "#d53e4f",
];

pub const NAN_COLOR: &str = "gray";

/// Endless repetition of `palette`, one color per series.
pub fn palette_cycle<'a>(palette: &'a [&'a str]) -> impl Iterator<Item = &'a str> + 'a {
    palette.iter().copied().cycle()
}

/// Min and max of the present, finite values; `None` if there are none.
pub fn finite_range(values: &[Option<f64>]) -> Option<(f64, f64)> {
    values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
}

/// Maps numbers onto a palette by splitting `[low, high]` into equal bins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearColorMapper {
    pub low: f64,
    pub high: f64,
    pub palette: Vec<String>,
    pub nan_color: String,
}

impl LinearColorMapper {
    pub fn new(low: f64, high: f64, palette: &[&str]) -> Result<Self> {
        if palette.is_empty() {
            return Err(AggregateError::InvalidArgument("palette is empty".into()));
        }
        if !(low <= high) {
            return Err(AggregateError::InvalidArgument(format!(
                "color range low={low} must not exceed high={high}"
            )));
        }
        Ok(Self {
            low,
            high,
            palette: palette.iter().map(|c| c.to_string()).collect(),
            nan_color: NAN_COLOR.to_string(),
        })
    }

    /// Range taken from the min and max of the present, finite values.
    pub fn from_values(values: &[Option<f64>], palette: &[&str]) -> Result<Self> {
        let (low, high) = finite_range(values).ok_or_else(|| {
            AggregateError::InvalidArgument("no values to derive a color range from".into())
        })?;
        Self::new(low, high, palette)
    }

    pub fn color(&self, value: Option<f64>) -> &str {
        let v = match value {
            Some(v) if !v.is_nan() => v,
            _ => return &self.nan_color,
        };
        let n = self.palette.len();
        let span = self.high - self.low;
        let idx = if v <= self.low || span <= 0.0 {
            0
        } else if v >= self.high {
            n - 1
        } else {
            (((v - self.low) / span * n as f64).floor() as usize).min(n - 1)
        };
        &self.palette[idx]
    }

    pub fn colors(&self, values: &[Option<f64>]) -> Vec<String> {
        values.iter().map(|v| self.color(*v).to_string()).collect()
    }
}

/// Marker sizes for the positive-rate encoding of the tests scatter plot.
pub const SIZE_RANGE: (f64, f64) = (5.0, 50.0);

/// Linear map from `[x0, x1]` onto `[y0, y1]`, clamped to the end points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearInterpolator {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl LinearInterpolator {
    pub fn new(x: (f64, f64), y: (f64, f64)) -> Result<Self> {
        if !(x.0 <= x.1) {
            return Err(AggregateError::InvalidArgument(format!(
                "interpolation domain {} .. {} is reversed",
                x.0, x.1
            )));
        }
        Ok(Self { x, y })
    }

    /// Domain taken from the present, finite values. With none, the domain
    /// collapses to `(0, 0)`; every value is missing then anyway.
    pub fn from_values(values: &[Option<f64>], y: (f64, f64)) -> Self {
        Self { x: finite_range(values).unwrap_or((0.0, 0.0)), y }
    }

    /// Missing and NaN values stay missing.
    pub fn interpolate(&self, value: Option<f64>) -> Option<f64> {
        let v = value.filter(|v| !v.is_nan())?;
        let (x0, x1) = self.x;
        let (y0, y1) = self.y;
        if v <= x0 || x1 <= x0 {
            return Some(y0);
        }
        if v >= x1 {
            return Some(y1);
        }
        Some(y0 + (v - x0) / (x1 - x0) * (y1 - y0))
    }

    pub fn interpolate_all(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        values.iter().map(|v| self.interpolate(*v)).collect()
    }
}
