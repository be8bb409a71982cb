use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use tracing::{debug, info};

/// Wide table of cumulative counts: one date column and one column per region.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeTable {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<(String, Vec<Option<f64>>)>,
}

impl CumulativeTable {
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }
}

/// Load a wide cumulative-cases CSV (`Date,AG,AI,...`), skipping the columns
/// named in `exclude`. Empty cells load as missing values.
pub fn load_cumulative_csv(
    path: impl AsRef<Path>,
    exclude: &[&str],
) -> anyhow::Result<CumulativeTable> {
    let path = path.as_ref();
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open cumulative CSV: {}", path.display()))?;
    let table = read_cumulative(rdr, exclude)
        .with_context(|| format!("Failed to read cumulative CSV: {}", path.display()))?;
    info!(
        path = %path.display(),
        days = table.dates.len(),
        regions = table.columns.len(),
        "loaded cumulative counts"
    );
    Ok(table)
}

pub fn read_cumulative<R: std::io::Read>(
    mut rdr: csv::Reader<R>,
    exclude: &[&str],
) -> anyhow::Result<CumulativeTable> {
    let headers = rdr.headers()?.clone();
    anyhow::ensure!(headers.len() >= 2, "expected a date column and at least one region");

    // (csv column index, name) of every kept region
    let kept: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, h)| !exclude.contains(&h.trim()))
        .map(|(i, h)| (i, h.trim().to_string()))
        .collect();
    debug!(dropped = headers.len() - 1 - kept.len(), "excluded region columns");

    let mut dates = Vec::new();
    let mut values: Vec<Vec<Option<f64>>> = vec![Vec::new(); kept.len()];
    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let raw_date = record.get(0).unwrap_or_default().trim();
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .with_context(|| format!("bad date '{}' on record {}", raw_date, line + 1))?;
        dates.push(date);

        for ((idx, name), column) in kept.iter().zip(values.iter_mut()) {
            let cell = record.get(*idx).unwrap_or_default().trim();
            let v = if cell.is_empty() {
                None
            } else {
                Some(cell.parse::<f64>().with_context(|| {
                    format!("bad count '{}' for {} on record {}", cell, name, line + 1)
                })?)
            };
            column.push(v);
        }
    }
    anyhow::ensure!(!dates.is_empty(), "cumulative table has no rows");

    let columns = kept.into_iter().map(|(_, n)| n).zip(values).collect();
    Ok(CumulativeTable { dates, columns })
}
