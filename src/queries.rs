//! The fixed query set, each guarded by its column-presence check.
//!
//! A [`Session`] borrows one unified dataset and the active profile. Every
//! query returns `Result<_, QueryError>` so a caller can render the failure
//! as a warning and carry on with the others.

use crate::{
    aggregate::{self, RankingEntry},
    compare::{self, Comparison},
    config::Profile,
    data::Value,
    dataset::{Dataset, SchemaSnapshot, View},
    error::QueryError,
    filter::{self, FilterPredicate},
    schema::{self, Capability, QueryKind},
    stats::{self, ColumnSummary},
    table::Table,
};

pub struct Session<'a> {
    dataset: &'a Dataset,
    profile: &'a Profile,
    schema: SchemaSnapshot,
}

/// Outcome of the team and date filter, including the values that were
/// actually selected.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    pub predicate: FilterPredicate,
    pub view: View<'a>,
}

impl<'a> FilteredView<'a> {
    pub fn selected(&self, field: &str) -> Option<&Value> {
        self.predicate
            .conditions()
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }
}

impl<'a> Session<'a> {
    pub fn new(dataset: &'a Dataset, profile: &'a Profile) -> Self {
        Self {
            dataset,
            profile,
            schema: dataset.schema(),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn profile(&self) -> &'a Profile {
        self.profile
    }

    pub fn schema(&self) -> &SchemaSnapshot {
        &self.schema
    }

    pub fn capability(&self, query: QueryKind) -> Capability {
        schema::check(&self.schema, query, self.profile)
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        schema::check_all(&self.schema, self.profile)
    }

    fn guard(&self, query: QueryKind) -> Result<View<'a>, QueryError> {
        if self.dataset.is_empty() {
            return Err(QueryError::EmptyInput);
        }
        self.capability(query).require()?;
        Ok(self.dataset.view())
    }

    pub fn raw(&self) -> Result<Table, QueryError> {
        if self.dataset.is_empty() {
            return Err(QueryError::EmptyInput);
        }
        Ok(Table::from_view(&self.dataset.view(), true))
    }

    /// Records of one source, as uploaded.
    pub fn source_table(&self, source: usize) -> Result<Table, QueryError> {
        if self.dataset.is_empty() {
            return Err(QueryError::EmptyInput);
        }
        let view = self.dataset.view().from_source(source);
        Ok(Table::from_view(&view, false))
    }

    pub fn summary(&self) -> Result<Vec<ColumnSummary>, QueryError> {
        let view = self.guard(QueryKind::Summary)?;
        Ok(stats::describe(&view))
    }

    pub fn team_date_filter(
        &self,
        team: Option<&str>,
        date: Option<&str>,
    ) -> Result<FilteredView<'a>, QueryError> {
        let view = self.guard(QueryKind::TeamDateFilter)?;
        let predicate = FilterPredicate::new()
            .select(&view, &self.profile.team_field, team)?
            .select(&view, &self.profile.date_field, date)?;
        let filtered = filter::apply(&view, &predicate);
        Ok(FilteredView {
            predicate,
            view: filtered,
        })
    }

    pub fn card_distribution(&self) -> Result<Vec<RankingEntry>, QueryError> {
        let view = self.guard(QueryKind::CardDistribution)?;
        Ok(aggregate::value_counts(
            &view,
            &self.profile.card_distribution_field,
        ))
    }

    pub fn performance_comparison(&self, players: &[String]) -> Result<Comparison, QueryError> {
        self.comparison(
            QueryKind::PerformanceComparison,
            players,
            &self.profile.performance_metrics,
        )
    }

    pub fn card_comparison(&self, players: &[String]) -> Result<Comparison, QueryError> {
        self.comparison(QueryKind::CardComparison, players, &self.profile.card_metrics)
    }

    fn comparison(
        &self,
        query: QueryKind,
        players: &[String],
        metrics: &[String],
    ) -> Result<Comparison, QueryError> {
        let view = self.guard(query)?;
        let entity = &self.profile.entity_field;
        let selection = compare::resolve_selection(&view, entity, players);
        compare::compare(&view, query, entity, &selection, metrics)
    }

    pub fn top_players(&self) -> Result<Vec<RankingEntry>, QueryError> {
        self.top_n_players(self.profile.top_n)
    }

    pub fn top_n_players(&self, n: usize) -> Result<Vec<RankingEntry>, QueryError> {
        let view = self.guard(QueryKind::TopPlayers)?;
        Ok(aggregate::top_n(&view, &self.profile.entity_field, n))
    }

    pub fn results_table(&self) -> Result<Table, QueryError> {
        let view = self.guard(QueryKind::ResultsTable)?;
        Ok(Table::project(&view, &self.profile.results_columns))
    }
}
