use std::fmt::Display;

use itertools::Itertools;
use thiserror::Error;

use crate::schema::QueryKind;

/// Recoverable failures at the query boundary. None of them is fatal: a
/// report turns each into a named warning and moves on to the next query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("{query}: column(s) {} not found in the data", quoted(.missing))]
    MissingColumn {
        query: QueryKind,
        missing: Vec<String>,
    },
    #[error("{query}: select at least two players to compare ({selected} selected)")]
    InsufficientSelection { query: QueryKind, selected: usize },
    #[error("no input sources were supplied")]
    EmptyInput,
    #[error("'{value}' is not a value of column '{field}'")]
    UnknownSelection { field: String, value: String },
}

/// `'a', 'b'` rendering used in messages that name columns or values.
pub(crate) fn quoted<I>(names: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    names.into_iter().map(|name| format!("'{name}'")).join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_message_names_every_field() {
        let err = QueryError::MissingColumn {
            query: QueryKind::ResultsTable,
            missing: vec!["minuto".into(), "posicao".into()],
        };
        assert_eq!(
            err.to_string(),
            "results table: column(s) 'minuto', 'posicao' not found in the data"
        );
    }
}
