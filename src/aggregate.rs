//! Grouped sums and occurrence rankings.
//!
//! Both operations keep groups in the order their key first appears in the
//! view. Sums read metric cells through [`Value::as_number`] and treat
//! anything without a numeric reading as zero.

use std::collections::HashMap;

use serde::Serialize;

use crate::{data::Value, dataset::View};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: Value,
    /// Totals aligned with [`AggregateTable::metrics`].
    pub totals: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateTable {
    pub key_field: String,
    pub metrics: Vec<String>,
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    pub fn row(&self, key: &Value) -> Option<&AggregateRow> {
        self.rows.iter().find(|row| &row.key == key)
    }

    pub fn total(&self, key: &Value, metric: &str) -> Option<f64> {
        let position = self.metrics.iter().position(|m| m == metric)?;
        self.row(key).map(|row| row.totals[position])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    pub key: Value,
    pub count: usize,
}

/// Sums `metrics` per distinct value of `key_field`. Missing keys form their
/// own group.
pub fn grouped_sum<S: AsRef<str>>(
    view: &View<'_>,
    key_field: &str,
    metrics: &[S],
) -> AggregateTable {
    let dataset = view.dataset();
    let metric_columns = metrics
        .iter()
        .map(|metric| dataset.column_index(metric.as_ref()))
        .collect::<Vec<_>>();

    let mut positions: HashMap<&Value, usize> = HashMap::new();
    let mut rows: Vec<AggregateRow> = Vec::new();
    for record in view.records() {
        let key = dataset.value(record, key_field);
        let slot = *positions.entry(key).or_insert_with(|| {
            rows.push(AggregateRow {
                key: key.clone(),
                totals: vec![0.0; metric_columns.len()],
            });
            rows.len() - 1
        });
        for (total, &column) in rows[slot].totals.iter_mut().zip(&metric_columns) {
            if let Some(amount) = column.and_then(|idx| record.values[idx].as_number()) {
                *total += amount;
            }
        }
    }

    AggregateTable {
        key_field: key_field.to_string(),
        metrics: metrics.iter().map(|m| m.as_ref().to_string()).collect(),
        rows,
    }
}

/// Occurrence count per distinct non-missing value of `field`, highest count
/// first. Equal counts keep first-seen order.
pub fn value_counts(view: &View<'_>, field: &str) -> Vec<RankingEntry> {
    let mut positions: HashMap<&Value, usize> = HashMap::new();
    let mut entries: Vec<RankingEntry> = Vec::new();
    for value in view.column_values(field).filter(|value| !value.is_missing()) {
        match positions.get(value) {
            Some(&slot) => entries[slot].count += 1,
            None => {
                positions.insert(value, entries.len());
                entries.push(RankingEntry {
                    key: value.clone(),
                    count: 1,
                });
            }
        }
    }
    // Stable sort keeps first-seen order among ties.
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

/// The `n` most frequent values of `field`.
pub fn top_n(view: &View<'_>, field: &str, n: usize) -> Vec<RankingEntry> {
    let mut entries = value_counts(view, field);
    entries.truncate(n);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coerce::coerce_numeric,
        dataset::Dataset,
        reader::{SourceOptions, SourceTag, read_source},
    };

    fn dataset(data: &str) -> Dataset {
        let fragment = read_source(
            data.as_bytes(),
            SourceTag {
                name: "fixture.csv".into(),
            },
            &SourceOptions::default(),
        )
        .unwrap();
        Dataset::unify(vec![fragment])
    }

    #[test]
    fn grouped_sum_treats_missing_as_zero() {
        let data = coerce_numeric(&dataset("player,card\nA,1\nB,2\nA,x\n"), &["card"]);
        let table = grouped_sum(&data.view(), "player", &["card"]);
        assert_eq!(
            table.rows,
            vec![
                AggregateRow {
                    key: Value::from("A"),
                    totals: vec![1.0],
                },
                AggregateRow {
                    key: Value::from("B"),
                    totals: vec![2.0],
                },
            ]
        );
    }

    #[test]
    fn grouped_sum_keeps_first_seen_order_and_missing_group() {
        let data = dataset("player,card\nZ,1\n,4\nA,2\nZ,3\n,1\n");
        let table = grouped_sum(&data.view(), "player", &["card"]);
        let keys = table.rows.iter().map(|r| r.key.clone()).collect::<Vec<_>>();
        assert_eq!(keys, vec![Value::from("Z"), Value::Missing, Value::from("A")]);
        assert_eq!(table.total(&Value::from("Z"), "card"), Some(4.0));
        assert_eq!(table.total(&Value::Missing, "card"), Some(5.0));
    }

    #[test]
    fn unknown_metric_sums_to_zero() {
        let data = dataset("player,card\nA,1\n");
        let table = grouped_sum(&data.view(), "player", &["card", "faltas"]);
        assert_eq!(table.rows[0].totals, vec![1.0, 0.0]);
    }

    #[test]
    fn ranking_orders_by_count_then_first_seen() {
        let data = dataset("player\nB\nA\nA\nC\nB\nD\n");
        let ranking = top_n(&data.view(), "player", 3);
        let flat = ranking
            .iter()
            .map(|e| (e.key.as_display(), e.count))
            .collect::<Vec<_>>();
        assert_eq!(
            flat,
            vec![("B".to_string(), 2), ("A".to_string(), 2), ("C".to_string(), 1)]
        );
    }

    #[test]
    fn ranking_example_from_card_dataset() {
        let data = dataset("player,card\nA,1\nB,2\nA,x\n");
        let ranking = top_n(&data.view(), "player", 10);
        assert_eq!(
            ranking,
            vec![
                RankingEntry {
                    key: Value::from("A"),
                    count: 2,
                },
                RankingEntry {
                    key: Value::from("B"),
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn value_counts_skip_missing_values() {
        let data = coerce_numeric(&dataset("card\n1\n\n1\n0\nx\n"), &["card"]);
        let counts = value_counts(&data.view(), "card");
        assert_eq!(
            counts,
            vec![
                RankingEntry {
                    key: Value::Number(1.0),
                    count: 2,
                },
                RankingEntry {
                    key: Value::Number(0.0),
                    count: 1,
                },
            ]
        );
    }
}
