use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use tracing::info;

use crate::model::table::SeriesTable;

/// Files produced by [`export_chart_source`].
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub json: PathBuf,
}

/// Write `table` as `<name>.csv`: the index column then one column per series,
/// values with three decimals, missing values as empty cells.
pub fn write_series_csv(
    out_dir: impl AsRef<Path>,
    name: &str,
    table: &SeriesTable,
) -> anyhow::Result<PathBuf> {
    anyhow::ensure!(table.is_rectangular(), "series length does not match index ({})", name);

    std::fs::create_dir_all(out_dir.as_ref()).context("create export dir failed")?;
    let path = out_dir.as_ref().join(format!("{}.csv", name));
    let mut w = csv::Writer::from_path(&path)
        .with_context(|| format!("create export file failed (path={:?})", path))?;

    let mut header = vec![table.index_name.clone()];
    header.extend(table.series.iter().map(|s| s.name.clone()));
    w.write_record(&header)?;

    for (i, label) in table.index.iter().enumerate() {
        let mut record = vec![label.clone()];
        for s in &table.series {
            record.push(match s.values[i] {
                Some(v) => format!("{:.3}", v),
                None => String::new(),
            });
        }
        w.write_record(&record)?;
    }
    w.flush()?;

    Ok(path)
}

/// Write any serializable chart source as pretty JSON to `<name>.json`.
pub fn write_json<T: Serialize>(
    out_dir: impl AsRef<Path>,
    name: &str,
    value: &T,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(out_dir.as_ref()).context("create export dir failed")?;
    let path = out_dir.as_ref().join(format!("{}.json", name));
    let f = std::fs::File::create(&path)
        .with_context(|| format!("create export file failed (path={:?})", path))?;
    let mut w = std::io::BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, value)
        .with_context(|| format!("serialize {} failed", name))?;
    w.flush()?;
    Ok(path)
}

/// Static export of a chart source: its flat table as CSV and the full
/// source (colors, ranges, factors) as JSON.
pub fn export_chart_source<C>(
    out_dir: impl AsRef<Path>,
    name: &str,
    source: &C,
) -> anyhow::Result<ExportPaths>
where
    C: crate::chart::ChartSource,
{
    let csv = write_series_csv(out_dir.as_ref(), name, source.table())?;
    let json = write_json(out_dir.as_ref(), name, source)?;
    info!(csv = %csv.display(), json = %json.display(), "exported chart source");
    Ok(ExportPaths { csv, json })
}
