use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::model::record::TestsRow;

/// Load daily test statistics from a CSV with columns
/// `date,n_negative,n_positive,n_tests,frac_negative` (dates as `YYYY-MM-DD`).
pub fn load_tests_csv(path: impl AsRef<Path>) -> anyhow::Result<Vec<TestsRow>> {
    let path = path.as_ref();
    let rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open tests CSV: {}", path.display()))?;
    let rows = read_tests(rdr)
        .with_context(|| format!("Failed to read tests CSV: {}", path.display()))?;
    info!(path = %path.display(), rows = rows.len(), "loaded test statistics");
    Ok(rows)
}

pub fn read_tests<R: std::io::Read>(mut rdr: csv::Reader<R>) -> anyhow::Result<Vec<TestsRow>> {
    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize::<TestsRow>().enumerate() {
        rows.push(result.with_context(|| format!("bad tests record {}", line + 1))?);
    }
    anyhow::ensure!(!rows.is_empty(), "tests table is empty");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn parses_dates_and_nullable_counts() {
        let data = "date,n_negative,n_positive,n_tests,frac_negative\n\
                    2020-05-01,900,100,1000,0.1\n\
                    2020-05-02,,,,\n";
        let rows = read_tests(csv::Reader::from_reader(data.as_bytes())).unwrap();
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2020, 5, 1).unwrap());
        assert_eq!(rows[0].n_tests, Some(1000.0));
        assert_eq!(rows[1].n_positive, None);
    }

    #[test]
    fn malformed_date_is_rejected() {
        let data = "date,n_negative,n_positive,n_tests,frac_negative\n01/05/2020,1,1,2,0.5\n";
        assert!(read_tests(csv::Reader::from_reader(data.as_bytes())).is_err());
    }
}
