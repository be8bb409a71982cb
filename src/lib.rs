pub mod chart;
pub mod config;
pub mod error;
pub mod io;
pub mod math;
pub mod model;

pub use config::PipelineConfig;
pub use error::AggregateError;
pub use math::series::{difference_series, forward_fill, rolling_mean, TimeSeries};
pub use model::aggregate::{aggregate_measure, build_category_factors, stack_measure};
pub use model::record::{DemographicRow, GroupKey, Record, TestsRow};
