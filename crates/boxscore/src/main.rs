use std::path::PathBuf;

use anyhow::{Context, Result};
use boxscore_core::config::parse_date;
use boxscore_core::db::DbRole;
use boxscore_core::{
    db, AggregateKind, BoxScore, BoxScoreSink, ConfigFile, DatabaseConfig, DatabaseSink,
    Destination, ErrorPolicy, FileSink, OutputRecord, PgMapped, PgRowSource, Pipeline,
    RawOfficialBoxScore, RawPlayerBoxScore, RawTeamBoxScore, RunConfig, RunOverrides,
    RunSummary, WriterConfig,
};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Box score aggregation jobs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enrich completed games in a date window and deliver them to the configured writer
    Aggregate(AggregateArgs),
    /// Create the aggregate tables in the target database
    Migrate,
}

#[derive(Args, Debug)]
struct AggregateArgs {
    /// Row shape to aggregate: team, official or player
    kind: AggregateKind,

    /// TOML file with run settings; flags below take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// First game date (YYYY-MM-DD), inclusive
    #[arg(long, value_parser = |s: &str| parse_date("from", s))]
    from: Option<chrono::NaiveDate>,

    /// Last game date (YYYY-MM-DD), inclusive
    #[arg(long, value_parser = |s: &str| parse_date("to", s))]
    to: Option<chrono::NaiveDate>,

    /// Writer destination: database or file
    #[arg(long)]
    destination: Option<Destination>,

    /// Directory receiving extract files when writing to file
    #[arg(long)]
    extract_dir: Option<PathBuf>,

    /// Rows per chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// fail_fast or best_effort. Player lines often have no three-point or free-throw
    /// attempts or no turnovers, which fail those ratios; best_effort skips such rows
    #[arg(long)]
    error_policy: Option<ErrorPolicy>,
}

impl AggregateArgs {
    fn overrides(&self) -> RunOverrides {
        RunOverrides {
            from_date: self.from,
            to_date: self.to,
            destination: self.destination,
            extract_dir: self.extract_dir.clone(),
            chunk_size: self.chunk_size,
            error_policy: self.error_policy,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Aggregate(args) => aggregate(args).await,
        Command::Migrate => {
            let databases = DatabaseConfig::from_env()?;
            let pool = db::connect(&databases.target_url, DbRole::Target).await?;
            db::run_migrations(&pool).await?;
            info!("Database migrations applied");
            Ok(())
        }
    }
}

async fn aggregate(args: AggregateArgs) -> Result<()> {
    let file = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let config = RunConfig::resolve(args.kind, file, args.overrides())
        .context("invalid run configuration")?;
    let databases = DatabaseConfig::from_env()?;

    if config.kind() == AggregateKind::Player && config.error_policy() == ErrorPolicy::FailFast {
        warn!(
            "Player rows with zero attempts or turnovers fail the run under fail_fast; \
             consider --error-policy best_effort"
        );
    }

    let summary = match config.kind() {
        AggregateKind::Team => run_kind::<RawTeamBoxScore>(config, &databases).await?,
        AggregateKind::Official => run_kind::<RawOfficialBoxScore>(config, &databases).await?,
        AggregateKind::Player => run_kind::<RawPlayerBoxScore>(config, &databases).await?,
    };
    info!(run_id = %summary.run_id, "Aggregation finished");
    Ok(())
}

async fn open_sink<E>(
    writer: &WriterConfig,
    databases: &DatabaseConfig,
) -> Result<Box<dyn BoxScoreSink<E>>>
where
    E: OutputRecord + Send + Sync,
{
    match writer {
        WriterConfig::Database => {
            let pool = db::connect(&databases.target_url, DbRole::Target).await?;
            Ok(Box::new(DatabaseSink::new(pool)))
        }
        WriterConfig::File { extract_dir } => {
            let sink = FileSink::in_dir::<E>(extract_dir)
                .await
                .with_context(|| format!("failed to open extract in {}", extract_dir.display()))?;
            Ok(Box::new(sink))
        }
    }
}

/// Runs one aggregate kind end to end. The summary is printed whether or not the run
/// succeeds.
async fn run_kind<R>(config: RunConfig, databases: &DatabaseConfig) -> Result<RunSummary>
where
    R: PgMapped,
{
    let source_pool = db::connect(&databases.source_url, DbRole::Source).await?;
    let sink = open_sink::<<R as BoxScore>::Enriched>(config.writer(), databases).await?;
    let source = PgRowSource::<R>::new(source_pool, config.window());

    match Pipeline::new(config, source, sink).run().await {
        Ok(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(summary)
        }
        Err(failure) => {
            println!("{}", serde_json::to_string_pretty(&failure.summary)?);
            Err(anyhow::Error::new(failure.source))
                .with_context(|| format!("run {} failed", failure.summary.run_id))
        }
    }
}
