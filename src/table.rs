//! Output tables and their text, CSV, and JSON renderings.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde_json::{Map, Value as JsonValue};

use crate::{
    aggregate::{AggregateTable, RankingEntry},
    data::{Value, format_number_rounded},
    dataset::View,
    io_utils,
    stats::ColumnSummary,
};

const TEXT_DECIMALS: usize = 4;

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Every column of the view's dataset, prefixed with the originating
    /// source when `with_source` is set.
    pub fn from_view(view: &View<'_>, with_source: bool) -> Self {
        let dataset = view.dataset();
        let mut headers = Vec::with_capacity(dataset.columns().len() + 1);
        if with_source {
            headers.push("source".to_string());
        }
        headers.extend(dataset.columns().iter().cloned());
        let rows = view
            .records()
            .map(|record| {
                let mut row = Vec::with_capacity(headers.len());
                if with_source {
                    row.push(Value::Text(dataset.source_of(record).name.clone()));
                }
                row.extend(record.values.iter().cloned());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Selected columns in the order given. Unknown columns read as missing.
    pub fn project<S: AsRef<str>>(view: &View<'_>, columns: &[S]) -> Self {
        let dataset = view.dataset();
        let headers = columns
            .iter()
            .map(|c| c.as_ref().to_string())
            .collect::<Vec<_>>();
        let rows = view
            .records()
            .map(|record| {
                headers
                    .iter()
                    .map(|column| dataset.value(record, column).clone())
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    pub fn from_aggregate(table: &AggregateTable) -> Self {
        let mut headers = Vec::with_capacity(table.metrics.len() + 1);
        headers.push(table.key_field.clone());
        headers.extend(table.metrics.iter().cloned());
        let rows = table
            .rows
            .iter()
            .map(|row| {
                let mut cells = Vec::with_capacity(headers.len());
                cells.push(row.key.clone());
                cells.extend(row.totals.iter().map(|total| Value::Number(*total)));
                cells
            })
            .collect();
        Self { headers, rows }
    }

    pub fn from_ranking(field: &str, entries: &[RankingEntry]) -> Self {
        let rows = entries
            .iter()
            .map(|entry| vec![entry.key.clone(), Value::Number(entry.count as f64)])
            .collect();
        Self {
            headers: vec![field.to_string(), "count".to_string()],
            rows,
        }
    }

    pub fn from_summary(summary: &[ColumnSummary]) -> Self {
        Self {
            headers: ColumnSummary::HEADERS.iter().map(|h| h.to_string()).collect(),
            rows: summary.iter().map(ColumnSummary::cells).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells as text. The aligned table rounds numbers for readability; CSV
    /// keeps every digit so it reads back to the same values.
    fn display_rows(&self, format: OutputFormat) -> Vec<Vec<String>> {
        let render = |value: &Value| match (format, value) {
            (OutputFormat::Table, Value::Number(n)) => {
                format_number_rounded(*n, TEXT_DECIMALS)
            }
            _ => value.as_display(),
        };
        self.rows
            .iter()
            .map(|row| row.iter().map(&render).collect())
            .collect()
    }

    pub fn to_json(&self) -> JsonValue {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut object = Map::new();
                for (header, cell) in self.headers.iter().zip(row) {
                    object.insert(
                        header.clone(),
                        serde_json::to_value(cell).unwrap_or(JsonValue::Null),
                    );
                }
                JsonValue::Object(object)
            })
            .collect();
        JsonValue::Array(rows)
    }

    pub fn write<W: Write>(&self, out: &mut W, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Table => {
                out.write_all(render_table(&self.headers, &self.display_rows(format)).as_bytes())
                    .context("Writing table")?;
            }
            OutputFormat::Csv => {
                let mut writer = io_utils::open_csv_writer(&mut *out, b',');
                writer
                    .write_record(&self.headers)
                    .context("Writing CSV headers")?;
                for row in self.display_rows(format) {
                    writer.write_record(&row).context("Writing CSV row")?;
                }
                writer.flush().context("Flushing CSV output")?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, &self.to_json())
                    .context("Writing JSON output")?;
                writeln!(out).context("Writing JSON output")?;
            }
        }
        Ok(())
    }
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }

    for width in &mut widths {
        *width = (*width).max(1);
    }

    let mut output = String::new();

    let header_line = format_row(headers, &widths);
    let _ = writeln!(output, "{header_line}");

    let separator_widths = widths.iter().map(|w| (*w).max(3)).collect::<Vec<usize>>();
    let separator_cells = separator_widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>();
    let separator_line = format_row(&separator_cells, &separator_widths);
    let _ = writeln!(output, "{separator_line}");

    for row in rows {
        let row_line = format_row(row, &widths);
        let _ = writeln!(output, "{row_line}");
    }

    output
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut cells = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate() {
        if idx >= widths.len() {
            break;
        }
        let sanitized = sanitize_cell(value);
        let display = display_width(sanitized.as_ref());
        let mut cell = sanitized.into_owned();
        let padding = widths[idx].saturating_sub(display);
        if padding > 0 {
            cell.push_str(&" ".repeat(padding));
        }
        cells.push(cell);
    }
    let mut line = cells.join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table {
            headers: vec!["atleta".into(), "cartao_amarelo".into()],
            rows: vec![
                vec![Value::from("Gabigol"), Value::Number(3.0)],
                vec![Value::from("Dudu"), Value::Missing],
            ],
        }
    }

    #[test]
    fn render_table_aligns_columns() {
        let headers = vec!["atleta".to_string(), "n".to_string()];
        let rows = vec![vec!["Gerson".to_string(), "12".to_string()]];
        let rendered = render_table(&headers, &rows);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "atleta  n");
        assert_eq!(lines[1], "------  ---");
        assert_eq!(lines[2], "Gerson  12");
    }

    #[test]
    fn sanitize_cell_flattens_line_breaks() {
        assert_eq!(sanitize_cell("a\nb"), "a b");
        assert!(matches!(sanitize_cell("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn csv_output_leaves_missing_cells_empty() {
        let mut out = Vec::new();
        sample().write(&mut out, OutputFormat::Csv).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "atleta,cartao_amarelo\nGabigol,3\nDudu,\n");
    }

    #[test]
    fn csv_output_reads_back_exact_totals() {
        let table = Table {
            headers: vec!["atleta".into(), "passes".into()],
            rows: vec![
                vec![Value::from("A"), Value::Number(0.00004)],
                vec![Value::from("B"), Value::Number(1234.56789)],
            ],
        };
        let mut out = Vec::new();
        table.write(&mut out, OutputFormat::Csv).unwrap();
        let mut reader = csv::Reader::from_reader(out.as_slice());
        let totals = reader
            .records()
            .map(|record| record.unwrap()[1].parse::<f64>().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(totals, vec![0.00004, 1234.56789]);

        let mut text = Vec::new();
        table.write(&mut text, OutputFormat::Table).unwrap();
        assert!(String::from_utf8(text).unwrap().contains("1234.5679"));
    }

    #[test]
    fn json_output_uses_null_for_missing() {
        let json = sample().to_json();
        assert_eq!(json[0]["atleta"], "Gabigol");
        assert_eq!(json[0]["cartao_amarelo"], 3.0);
        assert!(json[1]["cartao_amarelo"].is_null());
    }
}
