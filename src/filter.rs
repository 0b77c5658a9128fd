use crate::{
    data::Value,
    dataset::{Dataset, Record, View},
    error::QueryError,
};

/// Exact-match conditions over named fields. A record matches when every
/// field equals its required value; `Missing` never matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPredicate {
    conditions: Vec<(String, Value)>,
}

impl FilterPredicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the required value for `field`.
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        let field = field.into();
        match self.conditions.iter_mut().find(|(name, _)| *name == field) {
            Some(existing) => existing.1 = value,
            None => self.conditions.push((field, value)),
        }
        self
    }

    /// Adds a condition whose value is picked from the field's distinct-value
    /// domain by its rendered text. `None` picks the first value of the
    /// domain. An empty domain selects `Missing`, which matches no record.
    pub fn select(
        self,
        view: &View<'_>,
        field: &str,
        choice: Option<&str>,
    ) -> Result<Self, QueryError> {
        let domain = view.distinct_values(field);
        let selected = match choice {
            Some(wanted) => domain
                .into_iter()
                .find(|value| value.as_display() == wanted)
                .ok_or_else(|| QueryError::UnknownSelection {
                    field: field.to_string(),
                    value: wanted.to_string(),
                })?,
            None => domain.into_iter().next().unwrap_or(Value::Missing),
        };
        Ok(self.with(field, selected))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    /// One line per condition, naming fields whose domain was empty.
    pub fn describe(&self) -> Vec<String> {
        self.conditions
            .iter()
            .map(|(field, value)| {
                if value.is_missing() {
                    format!("{field} has no values to select; nothing matches")
                } else {
                    format!("{field} = '{value}'")
                }
            })
            .collect()
    }

    pub fn matches(&self, dataset: &Dataset, record: &Record) -> bool {
        self.conditions.iter().all(|(field, required)| {
            let actual = dataset.value(record, field);
            !actual.is_missing() && actual == required
        })
    }
}

/// Records of `view` matching `predicate`, in their original order.
pub fn apply<'a>(view: &View<'a>, predicate: &FilterPredicate) -> View<'a> {
    if predicate.is_empty() {
        return view.clone();
    }
    let dataset = view.dataset();
    view.retain(|record| predicate.matches(dataset, record))
}
