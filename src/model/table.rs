use serde::{Deserialize, Serialize};

/// One named numeric column of a chart source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub color: Option<String>,
}

impl NamedSeries {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self { name: name.into(), values, color: None }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Flat chart hand-off: an index column plus ordered named columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesTable {
    pub index_name: String,
    pub index: Vec<String>,
    pub series: Vec<NamedSeries>,
}

impl SeriesTable {
    pub fn column(&self, name: &str) -> Option<&NamedSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Every column has exactly one value per index entry.
    pub fn is_rectangular(&self) -> bool {
        self.series.iter().all(|s| s.values.len() == self.index.len())
    }
}
