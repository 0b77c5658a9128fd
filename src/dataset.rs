//! The unified record set and read-only views over it.
//!
//! [`Dataset::unify`] concatenates source fragments in upload order. Columns
//! are the union of every fragment's header in first-seen order, and each
//! record is stored densely against that union so a column a source never had
//! reads as [`Value::Missing`]. A dataset is never mutated once built; every
//! query works on a [`View`], which is a list of record positions.

use std::collections::HashMap;

use log::info;

use crate::{
    data::Value,
    reader::{SourceFragment, SourceTag},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Position of the originating source in [`Dataset::sources`].
    pub source: usize,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    sources: Vec<SourceTag>,
    columns: Vec<String>,
    index: HashMap<String, usize>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn unify(fragments: Vec<SourceFragment>) -> Self {
        let mut dataset = Dataset::default();
        for fragment in &fragments {
            for column in &fragment.columns {
                dataset.push_column(column);
            }
        }

        let width = dataset.columns.len();
        let total: usize = fragments.iter().map(SourceFragment::record_count).sum();
        dataset.records.reserve(total);
        for fragment in fragments {
            let source = dataset.sources.len();
            // Duplicate header names within one source resolve to the first
            // occurrence, mirroring column lookup everywhere else.
            let mapping = fragment
                .columns
                .iter()
                .enumerate()
                .filter(|(pos, name)| fragment.columns[..*pos].iter().all(|prior| prior != *name))
                .map(|(pos, name)| (pos, dataset.index[name.as_str()]))
                .collect::<Vec<_>>();
            for row in fragment.rows {
                let mut values = vec![Value::Missing; width];
                for &(from, to) in &mapping {
                    if let Some(value) = row.get(from) {
                        values[to] = value.clone();
                    }
                }
                dataset.records.push(Record { source, values });
            }
            dataset.sources.push(fragment.tag);
        }

        info!(
            "Unified {} record(s) from {} source(s) across {} column(s)",
            dataset.records.len(),
            dataset.sources.len(),
            dataset.columns.len()
        );
        dataset
    }

    fn push_column(&mut self, name: &str) {
        if !self.index.contains_key(name) {
            self.index.insert(name.to_string(), self.columns.len());
            self.columns.push(name.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn sources(&self) -> &[SourceTag] {
        &self.sources
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn schema(&self) -> SchemaSnapshot {
        SchemaSnapshot {
            columns: self.columns.clone(),
        }
    }

    pub fn source_of(&self, record: &Record) -> &SourceTag {
        &self.sources[record.source]
    }

    /// Reads `column` from `record`, returning `Missing` for unknown columns.
    pub fn value<'a>(&self, record: &'a Record, column: &str) -> &'a Value {
        const MISSING: &Value = &Value::Missing;
        self.column_index(column)
            .and_then(|idx| record.values.get(idx))
            .unwrap_or(MISSING)
    }

    pub fn view(&self) -> View<'_> {
        View {
            dataset: self,
            rows: (0..self.records.len()).collect(),
        }
    }

    /// Returns a copy with `transform` applied to every value of the columns
    /// at the given positions.
    pub(crate) fn map_columns<F>(&self, columns: &[usize], transform: F) -> Dataset
    where
        F: Fn(&Value) -> Value,
    {
        let mut mapped = self.clone();
        for record in &mut mapped.records {
            for &idx in columns {
                record.values[idx] = transform(&record.values[idx]);
            }
        }
        mapped
    }
}

/// Set of column names observed across a dataset, captured once after
/// unification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSnapshot {
    columns: Vec<String>,
}

impl SchemaSnapshot {
    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Required names absent from the snapshot, in the order requested.
    pub fn missing<S: AsRef<str>>(&self, required: &[S]) -> Vec<String> {
        let mut missing: Vec<String> = Vec::new();
        for name in required {
            let name = name.as_ref();
            if !self.contains(name) && !missing.iter().any(|m| m == name) {
                missing.push(name.to_string());
            }
        }
        missing
    }
}

/// An ordered selection of records from a dataset.
#[derive(Debug, Clone)]
pub struct View<'a> {
    dataset: &'a Dataset,
    rows: Vec<usize>,
}

impl<'a> View<'a> {
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn positions(&self) -> &[usize] {
        &self.rows
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> {
        let records = self.dataset.records();
        self.rows.iter().map(move |&idx| &records[idx])
    }

    /// Values of `column` in view order. Unknown columns yield only `Missing`.
    pub fn column_values(&self, column: &str) -> impl Iterator<Item = &'a Value> {
        let dataset = self.dataset;
        self.records().map(move |record| dataset.value(record, column))
    }

    pub fn retain<P>(&self, mut keep: P) -> View<'a>
    where
        P: FnMut(&'a Record) -> bool,
    {
        let records = self.dataset.records();
        View {
            dataset: self.dataset,
            rows: self
                .rows
                .iter()
                .copied()
                .filter(|&idx| keep(&records[idx]))
                .collect(),
        }
    }

    /// Records that came from the source with the given position.
    pub fn from_source(&self, source: usize) -> View<'a> {
        self.retain(|record| record.source == source)
    }

    /// Distinct non-missing values of `column` in first-seen order. This is
    /// the domain selections are drawn from.
    pub fn distinct_values(&self, column: &str) -> Vec<Value> {
        let mut seen = std::collections::HashSet::new();
        self.column_values(column)
            .filter(|value| !value.is_missing())
            .filter(|value| seen.insert(*value))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{SourceOptions, read_source};

    fn fragment(name: &str, data: &str) -> SourceFragment {
        read_source(
            data.as_bytes(),
            SourceTag {
                name: name.to_string(),
            },
            &SourceOptions::default(),
        )
        .expect("read fragment")
    }

    #[test]
    fn disjoint_columns_produce_schema_union() {
        let cards = fragment("cartoes.csv", "atleta,cartao_amarelo\nA,1\nB,2\n");
        let stats = fragment("estatisticas.csv", "clube,chutes\nFla,4\n");
        let dataset = Dataset::unify(vec![cards, stats]);

        assert_eq!(
            dataset.columns(),
            &["atleta", "cartao_amarelo", "clube", "chutes"]
        );
        assert_eq!(dataset.len(), 3);
        let records = dataset.records();
        assert_eq!(dataset.value(&records[0], "clube"), &Value::Missing);
        assert_eq!(dataset.value(&records[2], "atleta"), &Value::Missing);
        assert_eq!(dataset.value(&records[2], "chutes"), &Value::Text("4".into()));
        assert_eq!(dataset.source_of(&records[2]).name, "estatisticas.csv");
    }

    #[test]
    fn shared_columns_keep_first_seen_position() {
        let first = fragment("a.csv", "clube,atleta\nFla,A\n");
        let second = fragment("b.csv", "atleta,clube\nB,Pal\n");
        let dataset = Dataset::unify(vec![first, second]);
        assert_eq!(dataset.columns(), &["clube", "atleta"]);
        let last = &dataset.records()[1];
        assert_eq!(dataset.value(last, "clube"), &Value::Text("Pal".into()));
        assert_eq!(dataset.value(last, "atleta"), &Value::Text("B".into()));
    }

    #[test]
    fn empty_fragment_list_is_inert() {
        let dataset = Dataset::unify(Vec::new());
        assert!(dataset.is_empty());
        assert_eq!(dataset.len(), 0);
        assert!(dataset.columns().is_empty());
    }

    #[test]
    fn distinct_values_preserve_first_seen_order_and_skip_missing() {
        let data = fragment("a.csv", "clube\nPal\n\nFla\nPal\n");
        let padded = fragment("b.csv", "atleta\nX\n");
        let dataset = Dataset::unify(vec![data, padded]);
        let domain = dataset.view().distinct_values("clube");
        assert_eq!(
            domain,
            vec![Value::Text("Pal".into()), Value::Text("Fla".into())]
        );
    }

    #[test]
    fn schema_snapshot_reports_missing_names_once() {
        let dataset = Dataset::unify(vec![fragment("a.csv", "clube,atleta\nFla,A\n")]);
        let schema = dataset.schema();
        assert!(schema.contains("clube"));
        assert_eq!(
            schema.missing(&["rodata", "clube", "rodata"]),
            vec!["rodata".to_string()]
        );
    }
}
