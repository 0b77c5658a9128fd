//! Column-presence checks for the fixed query set.
//!
//! Each [`QueryKind`] declares the columns it reads (resolved through the
//! active [`Profile`]). [`check`] compares that list against a
//! [`SchemaSnapshot`] once per query, so a query with missing columns is
//! skipped with a named warning while every other query still runs.

use std::fmt;

use serde::Serialize;

use crate::{config::Profile, dataset::SchemaSnapshot, error::QueryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryKind {
    Summary,
    TeamDateFilter,
    CardDistribution,
    PerformanceComparison,
    CardComparison,
    TopPlayers,
    ResultsTable,
}

impl QueryKind {
    pub const ALL: [QueryKind; 7] = [
        QueryKind::Summary,
        QueryKind::TeamDateFilter,
        QueryKind::CardDistribution,
        QueryKind::PerformanceComparison,
        QueryKind::CardComparison,
        QueryKind::TopPlayers,
        QueryKind::ResultsTable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            QueryKind::Summary => "summary statistics",
            QueryKind::TeamDateFilter => "team and date filter",
            QueryKind::CardDistribution => "card distribution",
            QueryKind::PerformanceComparison => "performance comparison",
            QueryKind::CardComparison => "card comparison",
            QueryKind::TopPlayers => "top players",
            QueryKind::ResultsTable => "results table",
        }
    }

    pub fn required_columns(self, profile: &Profile) -> Vec<String> {
        match self {
            QueryKind::Summary => Vec::new(),
            QueryKind::TeamDateFilter => {
                vec![profile.team_field.clone(), profile.date_field.clone()]
            }
            QueryKind::CardDistribution => vec![profile.card_distribution_field.clone()],
            QueryKind::PerformanceComparison => {
                with_entity(&profile.entity_field, &profile.performance_metrics)
            }
            QueryKind::CardComparison => with_entity(&profile.entity_field, &profile.card_metrics),
            QueryKind::TopPlayers => vec![profile.entity_field.clone()],
            QueryKind::ResultsTable => profile.results_columns.clone(),
        }
    }
}

fn with_entity(entity: &str, metrics: &[String]) -> Vec<String> {
    let mut columns = Vec::with_capacity(metrics.len() + 1);
    columns.push(entity.to_string());
    columns.extend(metrics.iter().cloned());
    columns
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of checking one query against a schema snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capability {
    pub query: QueryKind,
    pub runnable: bool,
    pub missing: Vec<String>,
}

impl Capability {
    /// Converts a not-runnable decision into the error the caller renders
    /// as a warning.
    pub fn require(&self) -> Result<(), QueryError> {
        if self.runnable {
            Ok(())
        } else {
            Err(QueryError::MissingColumn {
                query: self.query,
                missing: self.missing.clone(),
            })
        }
    }
}

pub fn check(schema: &SchemaSnapshot, query: QueryKind, profile: &Profile) -> Capability {
    let missing = schema.missing(&query.required_columns(profile));
    Capability {
        query,
        runnable: missing.is_empty(),
        missing,
    }
}

pub fn check_all(schema: &SchemaSnapshot, profile: &Profile) -> Vec<Capability> {
    QueryKind::ALL
        .iter()
        .map(|query| check(schema, *query, profile))
        .collect()
}
