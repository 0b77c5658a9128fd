use std::collections::HashSet;

use log::warn;
use serde::Serialize;

use crate::{
    aggregate::{AggregateTable, grouped_sum},
    data::Value,
    dataset::View,
    error::{QueryError, quoted},
    schema::QueryKind,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub table: AggregateTable,
    /// Selected entities with no record in the view. They get no row.
    pub absent: Vec<Value>,
}

/// Side-by-side totals for the selected entities. Fewer than two distinct
/// selections is reported as [`QueryError::InsufficientSelection`].
pub fn compare<S: AsRef<str>>(
    view: &View<'_>,
    query: QueryKind,
    entity_field: &str,
    selection: &[Value],
    metrics: &[S],
) -> Result<Comparison, QueryError> {
    let mut distinct = HashSet::new();
    let selected = selection
        .iter()
        .filter(|value| distinct.insert(*value))
        .cloned()
        .collect::<Vec<_>>();
    if selected.len() < 2 {
        return Err(QueryError::InsufficientSelection {
            query,
            selected: selected.len(),
        });
    }

    let dataset = view.dataset();
    let restricted = view.retain(|record| {
        let value = dataset.value(record, entity_field);
        !value.is_missing() && distinct.contains(value)
    });
    let table = grouped_sum(&restricted, entity_field, metrics);

    let absent = selected
        .into_iter()
        .filter(|value| table.row(value).is_none())
        .collect::<Vec<_>>();
    if !absent.is_empty() {
        warn!("{query}: no records for {}", quoted(&absent));
    }
    Ok(Comparison { table, absent })
}

/// Resolves rendered selections against the distinct values of
/// `entity_field`. Names with no match are kept as text so the comparison
/// can report them as absent.
pub fn resolve_selection(view: &View<'_>, entity_field: &str, names: &[String]) -> Vec<Value> {
    let domain = view.distinct_values(entity_field);
    names
        .iter()
        .map(|name| {
            domain
                .iter()
                .find(|value| value.as_display() == *name)
                .cloned()
                .unwrap_or_else(|| Value::Text(name.clone()))
        })
        .collect()
}
