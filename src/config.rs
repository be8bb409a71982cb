use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const DEMOGRAPHICS_FILE: &str = "demographics_switzerland_bag.csv";
pub const CUMULATIVE_CASES_FILE: &str = "covid19_cases_switzerland_openzh-phase2.csv";
pub const TESTS_FILE: &str = "covid19_tests_switzerland_bag.csv";

/// Inputs and knobs of the three chart pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub demographics_csv: PathBuf,
    pub cumulative_cases_csv: PathBuf,
    pub tests_csv: PathBuf,

    /// Rows/columns dropped before aggregation; "CH" is the national total.
    pub excluded_cantons: Vec<String>,

    // Smoothing window for daily new cases, in days
    pub rolling_window: usize,
    // Visible span of the linked tests plot on first render, in days
    pub initial_range_days: usize,

    pub export_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_data_dir("data")
    }
}

impl PipelineConfig {
    /// Defaults with the three input files expected under `dir`.
    pub fn with_data_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            demographics_csv: dir.join(DEMOGRAPHICS_FILE),
            cumulative_cases_csv: dir.join(CUMULATIVE_CASES_FILE),
            tests_csv: dir.join(TESTS_FILE),
            excluded_cantons: vec!["CH".to_string()],
            rolling_window: 3,
            initial_range_days: 30,
            export_dir: PathBuf::from("out"),
        }
    }

    /// Defaults overlaid with `DVC_DATA_DIR`, `DVC_EXPORT_DIR`,
    /// `DVC_ROLLING_WINDOW` and `DVC_INITIAL_RANGE_DAYS`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match lookup("DVC_DATA_DIR") {
            Some(dir) => Self::with_data_dir(dir),
            None => Self::default(),
        };
        if let Some(dir) = lookup("DVC_EXPORT_DIR") {
            cfg.export_dir = PathBuf::from(dir);
        }
        if let Some(v) = lookup("DVC_ROLLING_WINDOW") {
            cfg.rolling_window = v
                .trim()
                .parse()
                .with_context(|| format!("DVC_ROLLING_WINDOW is not a count: {}", v))?;
        }
        if let Some(v) = lookup("DVC_INITIAL_RANGE_DAYS") {
            cfg.initial_range_days = v
                .trim()
                .parse()
                .with_context(|| format!("DVC_INITIAL_RANGE_DAYS is not a count: {}", v))?;
        }
        cfg.check()?;
        Ok(cfg)
    }

    pub fn check(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.rolling_window >= 1, "rolling_window must be >= 1");
        Ok(())
    }

    pub fn excluded(&self) -> Vec<&str> {
        self.excluded_cantons.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.rolling_window, 3);
        assert_eq!(cfg.initial_range_days, 30);
        assert_eq!(cfg.excluded(), vec!["CH"]);
        assert_eq!(cfg.tests_csv, Path::new("data").join(TESTS_FILE));
    }

    #[test]
    fn env_overrides_apply() {
        let cfg = PipelineConfig::from_lookup(lookup(&[
            ("DVC_DATA_DIR", "/srv/dvc"),
            ("DVC_ROLLING_WINDOW", "7"),
            ("DVC_EXPORT_DIR", "/tmp/exports"),
        ]))
        .unwrap();
        assert_eq!(cfg.rolling_window, 7);
        assert_eq!(cfg.demographics_csv, Path::new("/srv/dvc").join(DEMOGRAPHICS_FILE));
        assert_eq!(cfg.export_dir, PathBuf::from("/tmp/exports"));
    }

    #[test]
    fn bad_window_is_rejected() {
        assert!(PipelineConfig::from_lookup(lookup(&[("DVC_ROLLING_WINDOW", "0")])).is_err());
        assert!(PipelineConfig::from_lookup(lookup(&[("DVC_ROLLING_WINDOW", "three")])).is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: PipelineConfig = serde_json::from_str(r#"{"rolling_window": 5}"#).unwrap();
        assert_eq!(cfg.rolling_window, 5);
        assert_eq!(cfg.initial_range_days, 30);
    }
}
