//! Chart sources for the three Swiss COVID-19 views: population stacked by
//! sex, smoothed daily new cases per canton, and the linked tests plots.

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::{AggregateError, Result};
use crate::io::cumulative::{load_cumulative_csv, CumulativeTable};
use crate::io::demographics::load_demographics_csv;
use crate::io::tests_bag::load_tests_csv;
use crate::math::colormap::{
    finite_range, palette_cycle, LinearColorMapper, LinearInterpolator, SIZE_RANGE, SPECTRAL6,
    SPECTRAL8,
};
use crate::math::series::{check_strictly_increasing, smoothed_daily_series};
use crate::model::aggregate::{exclude_category, measure_column, stack_measure, StackedTable};
use crate::model::record::{DemographicRow, TestsRow};
use crate::model::table::{NamedSeries, SeriesTable};

/// Stack names and the `sex` values they select.
pub const SEX_STACKS: [(&str, &str); 2] = [("female", "female"), ("male", "male")];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Anything a chart layer consumes: serializable, with a flat table view.
pub trait ChartSource: Serialize {
    fn table(&self) -> &SeriesTable;
}

#[derive(Debug, Clone, Serialize)]
pub struct StackedPopulationSource {
    pub stacked: StackedTable,
    pub table: SeriesTable,
}

impl ChartSource for StackedPopulationSource {
    fn table(&self) -> &SeriesTable {
        &self.table
    }
}

/// Population per (canton, age group), one stack per sex.
pub fn stacked_population_source(
    rows: &[DemographicRow],
    excluded_cantons: &[&str],
) -> Result<StackedPopulationSource> {
    let rows = exclude_category(rows, "canton", excluded_cantons)?;
    let stacked = stack_measure(
        &rows,
        &["canton", "age_group"],
        "sex",
        &SEX_STACKS,
        "pop_size",
    )?;
    let table = stacked.to_series_table();
    info!(factors = table.len(), "built stacked population source");
    Ok(StackedPopulationSource { stacked, table })
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyNewCasesSource {
    pub window: usize,
    pub table: SeriesTable,
}

impl ChartSource for DailyNewCasesSource {
    fn table(&self) -> &SeriesTable {
        &self.table
    }
}

/// Rolling mean of daily new cases per region, one color per region.
pub fn daily_new_cases_source(
    cumulative: &CumulativeTable,
    window: usize,
) -> Result<DailyNewCasesSource> {
    let mut colors = palette_cycle(&SPECTRAL8);
    let mut series = Vec::with_capacity(cumulative.columns.len());
    for (name, values) in &cumulative.columns {
        let ts = smoothed_daily_series(name, &cumulative.dates, values, window)?;
        let color = colors.next().unwrap_or(SPECTRAL8[0]);
        let values = ts.values().into_iter().map(Some).collect();
        series.push(NamedSeries::new(name.clone(), values).with_color(color));
    }

    let table = SeriesTable {
        index_name: "date".to_string(),
        index: cumulative
            .dates
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect(),
        series,
    };
    info!(
        regions = table.series.len(),
        days = table.len(),
        window,
        "built daily new cases source"
    );
    Ok(DailyNewCasesSource { window, table })
}

#[derive(Debug, Clone, Serialize)]
pub struct TestsSource {
    pub table: SeriesTable,
    /// Point colors, encoding `positive_rate`.
    pub colors: Vec<String>,
    pub color_mapper: LinearColorMapper,
    /// Point sizes, encoding `positive_rate`; missing where the rate is.
    pub sizes: Vec<Option<f64>>,
    pub size_mapper: LinearInterpolator,
    pub initial_range: (NaiveDate, NaiveDate),
}

impl ChartSource for TestsSource {
    fn table(&self) -> &SeriesTable {
        &self.table
    }
}

/// First visible x-range: the first date through `days` days later, clipped
/// to the last date.
pub fn initial_range(dates: &[NaiveDate], days: usize) -> Result<(NaiveDate, NaiveDate)> {
    let first = dates
        .first()
        .ok_or_else(|| AggregateError::InvalidArgument("no dates for initial range".into()))?;
    let last = dates[days.min(dates.len() - 1)];
    Ok((*first, last))
}

/// Total tests, positives and positive rate by date, with the positive rate
/// encoded both as color and as point size. Rows must be in date order.
pub fn tests_source(rows: &[TestsRow], initial_days: usize) -> Result<TestsSource> {
    if rows.is_empty() {
        return Err(AggregateError::EmptyInput);
    }
    let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
    check_strictly_increasing(&dates)?;

    let positive_rate = measure_column(rows, "frac_negative")?;
    // no rate at all: every point gets the missing color
    let (low, high) = finite_range(&positive_rate).unwrap_or((0.0, 0.0));
    let color_mapper = LinearColorMapper::new(low, high, &SPECTRAL6)?;
    let colors = color_mapper.colors(&positive_rate);
    let size_mapper = LinearInterpolator::from_values(&positive_rate, SIZE_RANGE);
    let sizes = size_mapper.interpolate_all(&positive_rate);

    let table = SeriesTable {
        index_name: "date".to_string(),
        index: dates.iter().map(|d| d.format(DATE_FORMAT).to_string()).collect(),
        series: vec![
            NamedSeries::new("positive_number", measure_column(rows, "n_positive")?),
            NamedSeries::new("positive_rate", positive_rate),
            NamedSeries::new("total_tests", measure_column(rows, "n_tests")?),
        ],
    };
    let initial_range = initial_range(&dates, initial_days)?;
    info!(days = table.len(), "built tests source");
    Ok(TestsSource {
        table,
        colors,
        color_mapper,
        sizes,
        size_mapper,
        initial_range,
    })
}

pub fn load_stacked_population(cfg: &PipelineConfig) -> anyhow::Result<StackedPopulationSource> {
    let rows = load_demographics_csv(&cfg.demographics_csv)?;
    stacked_population_source(&rows, &cfg.excluded()).context("stacked population aggregation failed")
}

pub fn load_daily_new_cases(cfg: &PipelineConfig, window: usize) -> anyhow::Result<DailyNewCasesSource> {
    let table = load_cumulative_csv(&cfg.cumulative_cases_csv, &cfg.excluded())?;
    daily_new_cases_source(&table, window).context("daily new cases computation failed")
}

pub fn load_tests_overview(cfg: &PipelineConfig, initial_days: usize) -> anyhow::Result<TestsSource> {
    let rows = load_tests_csv(&cfg.tests_csv)?;
    tests_source(&rows, initial_days).context("tests source failed")
}
