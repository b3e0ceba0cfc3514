use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use incident_tally::app::{self, AppConfig};
use incident_tally::config::{load_config, TallyConfig};
use incident_tally::format::render;
use incident_tally::incidents::{parse, PrioritySum};
use incident_tally::pipeline::{CancellationSignal, Pipeline};
use incident_tally::server::{self, IncidentServer};
use incident_tally::source::{FileStore, HttpSource, RecordSource};
use incident_tally::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Tally incident reports by priority
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Fetch incident reports and count them by priority", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch incidents, print them, and print counts per priority
    Report {
        /// Incident endpoint URL (defaults to client.url from the config)
        url: Option<String>,

        /// Read incidents from a local file instead of over HTTP
        #[arg(short, long, conflicts_with = "url")]
        file: Option<PathBuf>,

        /// Number of reducer workers
        #[arg(short = 'w', long)]
        workers: Option<usize>,

        /// Skip the per-incident table
        #[arg(long)]
        summary_only: bool,
    },
    /// Serve an incident file over HTTP
    Serve {
        /// Incident file to serve
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Address to listen on
        #[arg(short, long)]
        addr: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let Cli {
        verbose,
        config: config_path,
        command,
    } = Cli::parse();
    app::initialize_app(&AppConfig::new(verbose));

    let result = async move {
        let config = load_config(config_path.as_deref())
            .await
            .context("Failed to load configuration")?;

        match command {
            Commands::Report {
                url,
                file,
                workers,
                summary_only,
            } => run_report(config, url, file, workers, summary_only).await,
            Commands::Serve { file, addr } => run_serve(config, file, addr).await,
        }
    }
    .await;

    if let Err(e) = result {
        app::handle_fatal_error(e, verbose);
    }
}

async fn run_report(
    mut config: TallyConfig,
    url: Option<String>,
    file: Option<PathBuf>,
    workers: Option<usize>,
    summary_only: bool,
) -> Result<()> {
    if let Some(workers) = workers {
        config.pipeline.worker_count = workers;
    }
    config.validate()?;

    let source: Box<dyn RecordSource> = match (file, url.or(config.client.url.clone())) {
        (Some(path), _) => Box::new(FileStore::new(path)),
        (None, Some(url)) => Box::new(HttpSource::new(url, &config.client)?),
        (None, None) => {
            return Err(Error::Config(
                "No incident source given: pass a URL, --file, or set client.url".to_string(),
            )
            .into())
        }
    };

    let payload = source
        .fetch()
        .await
        .with_context(|| format!("Failed to fetch incidents from {}", source.describe()))?;
    let incidents = parse(&payload)?;
    debug!(
        "Parsed report {:?} with {} incidents",
        incidents.name,
        incidents.report.len()
    );

    if !summary_only {
        println!("{}", render(&incidents.report));
    }

    let pipeline = Pipeline::new(config.pipeline).map_err(Error::from)?;
    let interrupt = CancellationSignal::new();
    let watcher = app::cancel_on_ctrl_c(&interrupt);
    let aggregated = pipeline.run_until(incidents.report, &interrupt).await;
    watcher.abort();
    let aggregated = aggregated.map_err(Error::from)?;

    debug!(
        "Pipeline spawned {} tasks, {} still alive",
        pipeline.gauge().spawned(),
        pipeline.gauge().live()
    );

    println!("{}", render(&PrioritySum::from_result(&aggregated)));
    Ok(())
}

async fn run_serve(
    mut config: TallyConfig,
    file: Option<PathBuf>,
    addr: Option<String>,
) -> Result<()> {
    if let Some(file) = file {
        config.server.file = file;
    }
    if let Some(addr) = addr {
        config.server.addr = addr;
    }

    let listener = server::bind(&config.server.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.addr))?;
    let store = Arc::new(FileStore::new(config.server.file));

    IncidentServer::new(store)
        .serve(listener, app::shutdown_signal())
        .await?;
    Ok(())
}
