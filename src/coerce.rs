use log::debug;

use crate::{
    data::{Value, parse_number},
    dataset::Dataset,
};

/// Numeric reading of a single cell: parseable text or numbers become
/// `Number`, everything else becomes `Missing`.
pub fn coerce_value(value: &Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(*n),
        Value::Text(raw) => parse_number(raw).map_or(Value::Missing, Value::Number),
        Value::Missing => Value::Missing,
    }
}

/// Returns a copy of `dataset` with each named column coerced to numbers.
/// Columns the dataset does not have are skipped. Applying it twice gives
/// the same dataset as applying it once.
pub fn coerce_numeric<S: AsRef<str>>(dataset: &Dataset, fields: &[S]) -> Dataset {
    let mut columns = Vec::new();
    for field in fields {
        let field = field.as_ref();
        let Some(idx) = dataset.column_index(field) else {
            continue;
        };
        if columns.contains(&idx) {
            continue;
        }
        let failures = dataset
            .records()
            .iter()
            .filter(|record| {
                matches!(&record.values[idx], Value::Text(raw) if parse_number(raw).is_none())
            })
            .count();
        if failures > 0 {
            debug!("Column '{field}': {failures} value(s) could not be read as numbers");
        }
        columns.push(idx);
    }
    dataset.map_columns(&columns, coerce_value)
}
