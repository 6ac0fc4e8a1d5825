//! CLI entry point for the bike demand service.
//!
//! Provides subcommands for loading hourly CSV exports, rebuilding the daily
//! aggregates, serving the HTTP API and predicting a whole day offline.

use anyhow::{Context, Result, bail};
use bike_demand::analyzers::analyzer::build_daily_aggregates;
use bike_demand::analyzers::types::BuildStatus;
use bike_demand::config::Config;
use bike_demand::features::DayLabels;
use bike_demand::infra::model::FsModelSource;
use bike_demand::parser::{ingest, parse_date};
use bike_demand::services::PredictionService;
use bike_demand::store::{self, DailyStore, HourlyStore};
use bike_demand::web::{self, AppState};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bike_demand")]
#[command(about = "Hourly bike rental store, daily aggregates and demand predictions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load an hourly CSV export into the hourly store
    Ingest {
        /// CSV file to load
        #[arg(short, long)]
        path: PathBuf,

        /// Empty the hourly store before loading
        #[arg(long, default_value_t = false)]
        truncate: bool,

        /// Data directory (defaults to BIKE_DATA_DIR)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Rebuild every daily aggregate from the hourly store
    BuildDaily {
        /// Data directory (defaults to BIKE_DATA_DIR)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Serve the HTTP API
    Serve {
        /// Address to bind (defaults to BIKE_BIND_ADDR)
        #[arg(short, long)]
        addr: Option<String>,

        /// Data directory (defaults to BIKE_DATA_DIR)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Model directory (defaults to BIKE_MODELS_DIR)
        #[arg(short, long)]
        models_dir: Option<PathBuf>,
    },
    /// Predict all 24 hours of a day from the season's typical weather
    PredictDay {
        /// Day to predict, e.g. 2018-07-14
        #[arg(long)]
        date: String,

        /// Season label, e.g. Summer
        #[arg(long)]
        season: String,

        #[arg(long, default_value = "No Holiday")]
        holiday: String,

        #[arg(long, default_value = "Yes")]
        functioning_day: String,

        /// Data directory (defaults to BIKE_DATA_DIR)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Model directory (defaults to BIKE_MODELS_DIR)
        #[arg(short, long)]
        models_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let config = Config::from_env();

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = config.log_file_path.parent().unwrap_or(Path::new("logs"));
    let log_file_name = config
        .log_file_path
        .file_name()
        .unwrap_or(OsStr::new("bike_demand.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest {
            path,
            truncate,
            data_dir,
        } => {
            let data_dir = data_dir.unwrap_or(config.data_dir);
            ingest_file(&path, truncate, &data_dir)?;
        }
        Commands::BuildDaily { data_dir } => {
            let data_dir = data_dir.unwrap_or(config.data_dir);
            let hourly = HourlyStore::open(store::hourly_path(&data_dir))?;
            let mut daily = DailyStore::open(store::daily_path(&data_dir))?;

            match build_daily_aggregates(&hourly, &mut daily)? {
                BuildStatus::NothingToDo => info!("No hourly data to aggregate."),
                BuildStatus::Built { days } => info!(days, "Built {days} daily aggregates."),
            }
        }
        Commands::Serve {
            addr,
            data_dir,
            models_dir,
        } => {
            let addr = addr.unwrap_or(config.bind_addr);
            let data_dir = data_dir.unwrap_or(config.data_dir);
            let models_dir = models_dir.unwrap_or(config.models_dir);

            let hourly = HourlyStore::open(store::hourly_path(&data_dir))?;
            let daily = DailyStore::open(store::daily_path(&data_dir))?;
            info!(
                hourly = hourly.len(),
                daily = daily.len(),
                models_dir = %models_dir.display(),
                "Stores loaded"
            );
            let predictor = PredictionService::new(FsModelSource::new(&models_dir));
            let state = Arc::new(AppState::new(hourly, daily, predictor));
            if let Err(e) = state.predictor.model() {
                warn!(error = %e, "Model not available yet; prediction endpoints will fail until it is");
            }

            web::run(&addr, state).await?;
        }
        Commands::PredictDay {
            date,
            season,
            holiday,
            functioning_day,
            data_dir,
            models_dir,
        } => {
            let date = parse_date(&date).with_context(|| format!("invalid --date {date:?}"))?;
            let data_dir = data_dir.unwrap_or(config.data_dir);
            let models_dir = models_dir.unwrap_or(config.models_dir);

            let hourly = HourlyStore::open(store::hourly_path(&data_dir))?;
            let predictor = PredictionService::new(FsModelSource::new(&models_dir));
            let labels = DayLabels {
                seasons: season,
                holiday,
                functioning_day,
            };

            let prediction = predictor.predict_day(&hourly, date, labels)?;
            println!("{}", serde_json::to_string_pretty(&prediction)?);
        }
    }

    Ok(())
}

/// Reads a CSV export from disk and merges it into the hourly store.
#[tracing::instrument(skip_all, fields(path = %path.display(), truncate = truncate))]
fn ingest_file(path: &Path, truncate: bool, data_dir: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("File not found: {}", path.display());
    }
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;

    let mut hourly = HourlyStore::open(store::hourly_path(data_dir))?;
    if truncate {
        info!(rows = hourly.len(), "Truncating hourly store");
        hourly.truncate();
    }

    let report = ingest(&mut hourly, &bytes)?;
    hourly.save()?;

    info!(
        encoding = report.encoding,
        rows_read = report.rows_read,
        rows_dropped = report.rows_dropped,
        values_defaulted = report.values_defaulted,
        inserted = report.inserted,
        duplicates = report.duplicates,
        "Ingest finished"
    );
    if !report.missing_columns.is_empty() {
        warn!(columns = ?report.missing_columns, "Optional columns absent; defaults used");
    }
    Ok(())
}
