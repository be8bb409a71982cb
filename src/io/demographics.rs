use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::model::record::DemographicRow;

/// Load population rows from a CSV with columns `canton,age_group,sex,pop_size`.
///
/// Other columns (the leading index column of the BAG export, for instance)
/// are ignored. An empty `pop_size` cell loads as a missing value.
pub fn load_demographics_csv(path: impl AsRef<Path>) -> anyhow::Result<Vec<DemographicRow>> {
    let path = path.as_ref();
    let rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open demographics CSV: {}", path.display()))?;
    let rows = read_demographics(rdr)
        .with_context(|| format!("Failed to read demographics CSV: {}", path.display()))?;
    info!(path = %path.display(), rows = rows.len(), "loaded demographics");
    Ok(rows)
}

pub fn read_demographics<R: std::io::Read>(
    mut rdr: csv::Reader<R>,
) -> anyhow::Result<Vec<DemographicRow>> {
    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize::<DemographicRow>().enumerate() {
        let row = result.with_context(|| format!("bad demographics record {}", line + 1))?;
        rows.push(row);
    }
    anyhow::ensure!(!rows.is_empty(), "demographics table is empty");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_and_ignores_index_column() {
        let data = ",canton,age_group,sex,pop_size\n\
                    0,ZH,0 - 9,male,1200\n\
                    1,ZH,0 - 9,female,\n";
        let rows = read_demographics(csv::Reader::from_reader(data.as_bytes())).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].canton, "ZH");
        assert_eq!(rows[0].pop_size, Some(1200.0));
        assert_eq!(rows[1].pop_size, None);
    }

    #[test]
    fn empty_table_is_an_error() {
        let data = "canton,age_group,sex,pop_size\n";
        assert!(read_demographics(csv::Reader::from_reader(data.as_bytes())).is_err());
    }
}
