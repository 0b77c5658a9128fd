use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::table::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Analyse player-match event CSV exports",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List unified columns and which queries they make runnable
    Columns(InputArgs),
    /// Show each source's records as uploaded
    Sources(SourcesArgs),
    /// Show the unified record set with its source tags
    Show(InputArgs),
    /// Descriptive statistics for numeric columns
    Summary(InputArgs),
    /// Records for one team on one date
    Filter(FilterArgs),
    /// Frequency of card count values
    Distribution(InputArgs),
    /// Players ranked by number of appearances
    Rank(RankArgs),
    /// Side-by-side totals for two or more players
    Compare(CompareArgs),
    /// Fixed-column match results table
    Results(InputArgs),
    /// Run every query and print one section per query
    Report(ReportArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// CSV sources to analyse, unified in the order given ('-' reads stdin)
    #[arg(short = 'i', long = "input", action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the inputs (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// YAML profile overriding column roles and metric lists
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct SourcesArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Only show the source at this 1-based position
    #[arg(long)]
    pub source: Option<usize>,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Team to keep (defaults to the first team in the data)
    #[arg(long)]
    pub team: Option<String>,
    /// Date to keep (defaults to the first date in the data)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Args)]
pub struct RankArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Number of players to list (defaults to the profile's top_n)
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Players to compare (repeat or comma-separate; at least two)
    #[arg(short = 'p', long = "player", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub players: Vec<String>,
    /// Compare card totals instead of performance metrics
    #[arg(long)]
    pub cards: bool,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Team for the team performance section
    #[arg(long)]
    pub team: Option<String>,
    /// Date for the team performance section
    #[arg(long)]
    pub date: Option<String>,
    /// Players for the performance comparison
    #[arg(long = "compare-player", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub compare_players: Vec<String>,
    /// Players for the card comparison
    #[arg(long = "card-player", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub card_players: Vec<String>,
    /// Prepend each source's raw records
    #[arg(long = "include-sources")]
    pub include_sources: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
