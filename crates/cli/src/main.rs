use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use orgview_graph::{
    visible_rows, EngineConfig, ExpansionState, FilterState, Row, TableGrouping, ViewEngine,
    ViewRequest, ViewStrategy,
};
use orgview_model::EntityStore;
use serde::Serialize;
use std::path::PathBuf;

use crate::source::DirectorySource;

mod source;

#[derive(Parser)]
#[command(name = "orgview")]
#[command(
    about = "Compose organizational graphs and tables from entity snapshots",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Engine configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding org_units.json, locations.json, geo_units.json,
    /// business_units.json and assignments.json
    #[arg(long, global = true, default_value = ".")]
    data: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a positioned graph
    Graph(GraphArgs),

    /// Project grouped table rows
    Table(TableArgs),
}

#[derive(Args)]
struct FilterArgs {
    /// Case-insensitive substring over labels and descriptions
    #[arg(long)]
    search: Option<String>,

    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    business_unit: Option<String>,

    #[arg(long)]
    geo_unit: Option<String>,
}

impl FilterArgs {
    fn into_state(self) -> FilterState {
        FilterState {
            search_term: self.search,
            location_id: self.location,
            business_unit_id: self.business_unit,
            geo_unit_id: self.geo_unit,
        }
    }
}

#[derive(Args)]
struct GraphArgs {
    /// general|geographical|business|organizational|employees
    #[arg(short, long, default_value = "general")]
    strategy: ViewStrategy,

    #[command(flatten)]
    filters: FilterArgs,
}

#[derive(Args)]
struct TableArgs {
    /// location|business-unit|geo-unit|level|org-unit
    #[arg(short, long)]
    grouping: Option<TableGrouping>,

    /// Pick the grouping that lines up with this strategy
    #[arg(short, long, conflicts_with = "grouping")]
    strategy: Option<ViewStrategy>,

    #[command(flatten)]
    filters: FilterArgs,

    /// Header row id to expand (repeatable)
    #[arg(long)]
    expand: Vec<String>,

    /// Expand every header row
    #[arg(long)]
    expand_all: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TableOutput {
    grouping: TableGrouping,
    rows: Vec<TableLine>,
}

/// One visible table line; members of expanded headers follow their header
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TableLine {
    #[serde(flatten)]
    row: Row,
    #[serde(skip_serializing_if = "Option::is_none")]
    expanded: Option<bool>,
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn run_graph(engine: &ViewEngine<'_>, args: GraphArgs) -> Result<serde_json::Value> {
    let request = ViewRequest::new(args.strategy).with_filters(args.filters.into_state());
    let graph = engine.compose(&request);
    log::info!(
        "{} graph: {} nodes, {} edges after filtering",
        request.strategy,
        graph.node_count(),
        graph.edge_count()
    );
    Ok(serde_json::to_value(graph)?)
}

fn run_table(engine: &ViewEngine<'_>, args: TableArgs) -> Result<serde_json::Value> {
    let grouping = match (args.grouping, args.strategy) {
        (Some(grouping), _) => grouping,
        (None, Some(strategy)) => TableGrouping::for_strategy(strategy),
        (None, None) => TableGrouping::default(),
    };
    let rows = engine.project_table(grouping, &args.filters.into_state());

    let mut state = ExpansionState::new();
    if args.expand_all {
        state.expand_all(&rows);
    }
    for id in args.expand {
        state.expand(id);
    }

    let lines = visible_rows(&rows, &state)
        .into_iter()
        .map(|row| {
            let expanded = row.is_header().then(|| state.is_expanded(&row.id));
            let mut row = row.clone();
            row.expanded_data.clear();
            TableLine { row, expanded }
        })
        .collect();

    Ok(serde_json::to_value(TableOutput {
        grouping,
        rows: lines,
    })?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = load_config(cli.config.as_ref())?;
    let source = DirectorySource::new(cli.data.clone());
    let mut store = EntityStore::new();
    let snapshot = store
        .refresh(&source)
        .await
        .with_context(|| format!("Failed to load snapshot from {}", cli.data.display()))?;

    let engine = ViewEngine::new(&snapshot, config);
    let output = match cli.command {
        Commands::Graph(args) => run_graph(&engine, args)?,
        Commands::Table(args) => run_table(&engine, args)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
