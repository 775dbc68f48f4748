//! Aggregate figures over a filtered set of disposed entities.

use std::fmt;

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean durations over the entities matching one query.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    pub entities:        usize,
    pub mean_total:      Option<f64>,
    pub mean_waiting:    Option<f64>,
    pub mean_processing: Option<f64>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<f64>| v.map_or_else(|| "-".to_owned(), |v| format!("{v:.2}"));
        write!(
            f,
            "{} entities, mean total {}, mean waiting {}, mean processing {}",
            self.entities,
            show(self.mean_total),
            show(self.mean_waiting),
            show(self.mean_processing),
        )
    }
}
