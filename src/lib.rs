pub mod aggregate;
pub mod cli;
pub mod coerce;
pub mod compare;
pub mod config;
pub mod data;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod filter;
pub mod io_utils;
pub mod queries;
pub mod reader;
pub mod report;
pub mod schema;
pub mod stats;
pub mod table;

use std::{
    env,
    io::{self, Write},
    sync::{Arc, OnceLock},
};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{LevelFilter, debug, info, warn};

use crate::{
    cli::{Cli, Commands, InputArgs},
    config::Profile,
    dataset::Dataset,
    engine::{Engine, SourceInput},
    error::QueryError,
    queries::Session,
    reader::SourceOptions,
    table::{OutputFormat, Table},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("match_stats", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Columns(args) => handle_columns(&args),
        Commands::Sources(args) => handle_sources(&args),
        Commands::Show(args) => with_session(&args, |session| session.raw()),
        Commands::Summary(args) => with_session(&args, |session| {
            session
                .summary()
                .map(|summary| Table::from_summary(&summary))
        }),
        Commands::Filter(args) => with_session(&args.input, |session| {
            let filtered =
                session.team_date_filter(args.team.as_deref(), args.date.as_deref())?;
            for condition in filtered.predicate.describe() {
                info!("Selected {condition}");
            }
            Ok(Table::from_view(&filtered.view, false))
        }),
        Commands::Distribution(args) => with_session(&args, |session| {
            let field = &session.profile().card_distribution_field;
            session
                .card_distribution()
                .map(|counts| Table::from_ranking(field, &counts))
        }),
        Commands::Rank(args) => with_session(&args.input, |session| {
            let top = args.top.unwrap_or(session.profile().top_n);
            session
                .top_n_players(top)
                .map(|entries| Table::from_ranking(&session.profile().entity_field, &entries))
        }),
        Commands::Compare(args) => with_session(&args.input, |session| {
            let comparison = if args.cards {
                session.card_comparison(&args.players)?
            } else {
                session.performance_comparison(&args.players)?
            };
            Ok(Table::from_aggregate(&comparison.table))
        }),
        Commands::Results(args) => with_session(&args, |session| session.results_table()),
        Commands::Report(args) => handle_report(&args),
    }
}

/// Reads, unifies, and coerces the sources named on the command line.
pub fn load_dataset(args: &InputArgs) -> Result<(Profile, Arc<Dataset>)> {
    let profile = Profile::load_or_default(args.config.as_deref())?;
    let delimiter = match args.inputs.first() {
        Some(first) => io_utils::resolve_input_delimiter(first, args.delimiter),
        None => args.delimiter.unwrap_or(io_utils::DEFAULT_CSV_DELIMITER),
    };
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    debug!(
        "Reading {} source(s) with delimiter '{}' and encoding {}",
        args.inputs.len(),
        io_utils::printable_delimiter(delimiter),
        encoding.name()
    );
    let sources = args
        .inputs
        .iter()
        .map(|path| SourceInput::from_path(path))
        .collect::<Result<Vec<_>>>()?;
    let mut engine = Engine::new(profile.clone(), SourceOptions { delimiter, encoding });
    let dataset = engine.ingest(&sources)?;
    Ok((profile, dataset))
}

fn with_session<F>(args: &InputArgs, query: F) -> Result<()>
where
    F: FnOnce(&Session<'_>) -> Result<Table, QueryError>,
{
    let (profile, dataset) = load_dataset(args)?;
    let session = Session::new(&dataset, &profile);
    match query(&session) {
        Ok(table) => {
            info!("{} row(s)", table.len());
            emit(&table, args.format)
        }
        Err(QueryError::EmptyInput) => {
            info!("No input sources supplied; nothing to show");
            Ok(())
        }
        Err(err) => {
            warn!("{err}");
            Ok(())
        }
    }
}

fn emit(table: &Table, format: OutputFormat) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    table.write(&mut out, format)?;
    out.flush().context("Flushing output")
}

fn handle_columns(args: &InputArgs) -> Result<()> {
    let (profile, dataset) = load_dataset(args)?;
    if dataset.is_empty() {
        info!("No input sources supplied; nothing to show");
        return Ok(());
    }
    let session = Session::new(&dataset, &profile);
    let mut table = Table::new(vec![
        "query".to_string(),
        "runnable".to_string(),
        "missing".to_string(),
    ]);
    for capability in session.capabilities() {
        table.rows.push(vec![
            data::Value::Text(capability.query.to_string()),
            data::Value::Text(if capability.runnable { "yes" } else { "no" }.to_string()),
            data::Value::Text(capability.missing.join(", ")),
        ]);
    }
    info!(
        "Unified columns: {}",
        session.schema().columns().join(", ")
    );
    emit(&table, args.format)
}

fn handle_sources(args: &cli::SourcesArgs) -> Result<()> {
    let (profile, dataset) = load_dataset(&args.input)?;
    let session = Session::new(&dataset, &profile);
    let selected = match args.source {
        Some(position) => {
            if position == 0 || position > dataset.sources().len() {
                return Err(anyhow!(
                    "Source {position} out of range (1-{})",
                    dataset.sources().len()
                ));
            }
            vec![position - 1]
        }
        None => (0..dataset.sources().len()).collect(),
    };
    for idx in selected {
        let table = session.source_table(idx).map_err(|err| anyhow!(err))?;
        if args.input.format == OutputFormat::Table {
            println!("== Data from {} ==", dataset.sources()[idx].name);
        }
        emit(&table, args.input.format)?;
    }
    Ok(())
}

fn handle_report(args: &cli::ReportArgs) -> Result<()> {
    let (profile, dataset) = load_dataset(&args.input)?;
    if dataset.is_empty() {
        info!("No input sources supplied; nothing to report");
        return Ok(());
    }
    let session = Session::new(&dataset, &profile);
    let params = report::ReportParams {
        team: args.team.clone(),
        date: args.date.clone(),
        performance_players: args.compare_players.clone(),
        card_players: args.card_players.clone(),
        include_sources: args.include_sources,
    };
    let report = report::build(&session, &params);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    report.write(&mut out, args.input.format)?;
    out.flush().context("Flushing output")
}
