//! Full analysis report: every query in a fixed order, each section either a
//! table or a named warning.

use std::io::Write;

use anyhow::{Context, Result};
use log::warn;
use serde_json::{Value as JsonValue, json};

use crate::{
    compare::Comparison,
    error::QueryError,
    queries::Session,
    table::{OutputFormat, Table},
};

#[derive(Debug, Clone, Default)]
pub struct ReportParams {
    pub team: Option<String>,
    pub date: Option<String>,
    pub performance_players: Vec<String>,
    pub card_players: Vec<String>,
    pub include_sources: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    Table(Table),
    Warning(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub body: SectionBody,
    /// Caveats that accompany a table, such as players with no records.
    pub notes: Vec<String>,
}

impl Section {
    fn table(title: impl Into<String>, table: Table) -> Self {
        Self {
            title: title.into(),
            body: SectionBody::Table(table),
            notes: Vec::new(),
        }
    }

    fn from_result(title: impl Into<String>, result: Result<Table, QueryError>) -> Self {
        let title = title.into();
        match result {
            Ok(table) => Self::table(title, table),
            Err(err) => {
                warn!("{err}");
                Self {
                    title,
                    body: SectionBody::Warning(err.to_string()),
                    notes: Vec::new(),
                }
            }
        }
    }

    fn from_comparison(title: &str, result: Result<Comparison, QueryError>) -> Self {
        match result {
            Ok(comparison) => {
                let mut section = Self::table(title, Table::from_aggregate(&comparison.table));
                section.notes = comparison
                    .absent
                    .iter()
                    .map(|value| format!("no records for '{value}'"))
                    .collect();
                section
            }
            Err(err) => Self::from_result(title, Err(err)),
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self.body, SectionBody::Warning(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub sections: Vec<Section>,
}

impl Report {
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.title == title)
    }

    pub fn write<W: Write>(&self, out: &mut W, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Json => {
                let sections = self.sections.iter().map(section_json).collect::<Vec<_>>();
                serde_json::to_writer_pretty(&mut *out, &JsonValue::Array(sections))
                    .context("Writing JSON report")?;
                writeln!(out).context("Writing JSON report")?;
            }
            OutputFormat::Table | OutputFormat::Csv => {
                for (idx, section) in self.sections.iter().enumerate() {
                    if idx > 0 {
                        writeln!(out).context("Writing report")?;
                    }
                    let heading = match format {
                        OutputFormat::Csv => writeln!(out, "# {}", section.title),
                        _ => writeln!(out, "== {} ==", section.title),
                    };
                    heading.context("Writing report")?;
                    match &section.body {
                        SectionBody::Table(table) => table.write(out, format)?,
                        SectionBody::Warning(message) => {
                            writeln!(out, "warning: {message}").context("Writing report")?
                        }
                    }
                    for note in &section.notes {
                        writeln!(out, "note: {note}").context("Writing report")?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn section_json(section: &Section) -> JsonValue {
    match &section.body {
        SectionBody::Table(table) => json!({
            "title": section.title,
            "rows": table.to_json(),
            "notes": section.notes,
        }),
        SectionBody::Warning(message) => json!({
            "title": section.title,
            "warning": message,
        }),
    }
}

pub const SUMMARY: &str = "Summary statistics";
pub const CARD_DISTRIBUTION: &str = "Card distribution";
pub const PERFORMANCE_COMPARISON: &str = "Player performance comparison";
pub const CARD_COMPARISON: &str = "Player card comparison";
pub const TEAM_PERFORMANCE: &str = "Team performance";
pub const TOP_PLAYERS: &str = "Top players by appearances";
pub const RESULTS: &str = "Results table";

/// Runs every query against the session. An empty dataset yields an empty
/// report: that is the idle state, not a failure.
pub fn build(session: &Session<'_>, params: &ReportParams) -> Report {
    let dataset = session.dataset();
    if dataset.is_empty() {
        return Report::default();
    }
    let profile = session.profile();
    let mut sections = Vec::new();

    if params.include_sources {
        for (idx, source) in dataset.sources().iter().enumerate() {
            sections.push(Section::from_result(
                format!("Data from {}", source.name),
                session.source_table(idx),
            ));
        }
    }

    sections.push(Section::from_result(
        SUMMARY,
        session.summary().map(|summary| Table::from_summary(&summary)),
    ));
    sections.push(Section::from_result(
        CARD_DISTRIBUTION,
        session.card_distribution().map(|counts| {
            Table::from_ranking(&profile.card_distribution_field, &counts)
        }),
    ));
    sections.push(Section::from_comparison(
        PERFORMANCE_COMPARISON,
        session.performance_comparison(&params.performance_players),
    ));
    sections.push(Section::from_comparison(
        CARD_COMPARISON,
        session.card_comparison(&params.card_players),
    ));

    let team_section = match session.team_date_filter(params.team.as_deref(), params.date.as_deref())
    {
        Ok(filtered) => {
            let mut section =
                Section::table(TEAM_PERFORMANCE, Table::from_view(&filtered.view, false));
            section.notes = filtered
                .predicate
                .describe()
                .into_iter()
                .map(|condition| format!("selected {condition}"))
                .collect();
            section
        }
        Err(err) => Section::from_result(TEAM_PERFORMANCE, Err(err)),
    };
    sections.push(team_section);

    sections.push(Section::from_result(
        TOP_PLAYERS,
        session
            .top_players()
            .map(|entries| Table::from_ranking(&profile.entity_field, &entries)),
    ));
    sections.push(Section::from_result(RESULTS, session.results_table()));

    Report { sections }
}
