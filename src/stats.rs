//! Descriptive statistics for the numeric columns of a view.
//!
//! A column is numeric when it has at least one non-missing value and every
//! non-missing value has a numeric reading. Quantiles use linear
//! interpolation between closest ranks; `std` is the sample deviation.

use serde::Serialize;

use crate::{data::Value, dataset::View};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl ColumnSummary {
    pub const HEADERS: [&'static str; 9] =
        ["column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    pub fn cells(&self) -> Vec<Value> {
        vec![
            Value::Text(self.column.clone()),
            Value::Number(self.count as f64),
            Value::Number(self.mean),
            self.std.map_or(Value::Missing, Value::Number),
            Value::Number(self.min),
            Value::Number(self.p25),
            Value::Number(self.median),
            Value::Number(self.p75),
            Value::Number(self.max),
        ]
    }
}

pub fn describe(view: &View<'_>) -> Vec<ColumnSummary> {
    view.dataset()
        .columns()
        .iter()
        .filter_map(|column| summarize_column(view, column))
        .collect()
}

pub fn summarize_column(view: &View<'_>, column: &str) -> Option<ColumnSummary> {
    let mut stats = ColumnStats::default();
    for value in view.column_values(column) {
        if value.is_missing() {
            continue;
        }
        stats.add_value(value.as_number()?);
    }
    stats.summary(column)
}

#[derive(Default)]
struct ColumnStats {
    values: Vec<f64>,
    sum: f64,
}

impl ColumnStats {
    fn add_value(&mut self, value: f64) {
        self.sum += value;
        self.values.push(value);
    }

    fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.sum / self.values.len() as f64)
        }
    }

    fn std_dev(&self, mean: f64) -> Option<f64> {
        let count = self.values.len();
        if count < 2 {
            return None;
        }
        let squares = self
            .values
            .iter()
            .map(|value| (value - mean) * (value - mean))
            .sum::<f64>();
        Some((squares / (count as f64 - 1.0)).sqrt())
    }

    fn summary(mut self, column: &str) -> Option<ColumnSummary> {
        let mean = self.mean()?;
        let std = self.std_dev(mean);
        self.values.sort_by(f64::total_cmp);
        let sorted = &self.values;
        Some(ColumnSummary {
            column: column.to_string(),
            count: sorted.len(),
            mean,
            std,
            min: sorted[0],
            p25: quantile(sorted, 0.25),
            median: quantile(sorted, 0.5),
            p75: quantile(sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = (sorted.len() - 1) as f64 * q;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
