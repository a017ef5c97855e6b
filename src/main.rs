use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

use astro_catalog::config::Config;
use astro_catalog::infra::session_store::FileSessionStore;
use astro_catalog::types::{FeedQuery, FeedSource};
use astro_catalog::{logging, observability, CatalogService};

#[derive(Parser)]
#[command(name = "astro_catalog")]
#[command(about = "Normalized views over the JWST image catalog and the OSDR dataset list")]
#[command(version)]
struct Cli {
    /// TOML config file; defaults apply when it does not exist
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Directory holding the featured selection between runs
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Directory for rolling JSON logs
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Print Prometheus metrics to stderr after the command
    #[arg(long)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    Jpg,
    Suffix,
    Program,
}

impl From<SourceArg> for FeedSource {
    fn from(value: SourceArg) -> Self {
        match value {
            SourceArg::Jpg => FeedSource::Jpg,
            SourceArg::Suffix => FeedSource::Suffix,
            SourceArg::Program => FeedSource::Program,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one normalized page of the image gallery
    Feed {
        #[arg(long, value_enum, default_value = "jpg")]
        source: SourceArg,
        /// File suffix, e.g. _cal, _thumb, _crf (with --source suffix)
        #[arg(long, default_value = "")]
        suffix: String,
        /// Program id (with --source program)
        #[arg(long, default_value = "")]
        program: String,
        /// Keep only items taken with this instrument (NIRCam, MIRI, NIRISS, NIRSpec, FGS)
        #[arg(long, default_value = "")]
        instrument: String,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,
        /// Page size; defaults to jwst.default_per_page
        #[arg(long, allow_negative_numbers = true)]
        per_page: Option<i64>,
    },
    /// Show the featured observation (stored selection or latest image)
    Featured,
    /// Store a featured observation
    Select {
        #[arg(long)]
        obs_id: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long, default_value = "")]
        program: String,
        #[arg(long, default_value = "")]
        suffix: String,
        /// Instrument name; repeat for several
        #[arg(long = "inst")]
        instruments: Vec<String>,
        #[arg(long)]
        link: Option<String>,
    },
    /// List datasets with dictionary rows flattened
    Osdr {
        #[arg(long)]
        limit: Option<u32>,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let log_guard = logging::init_logging(&cli.log_dir);

    if cli.print_metrics {
        observability::init()?;
    }

    let config = Config::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    let state_dir = cli
        .state_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.session.state_dir));
    let store = Arc::new(FileSessionStore::new(state_dir));
    let service = CatalogService::from_config(&config, store)?;

    let mut exit_code = 0;
    match cli.command {
        Commands::Feed {
            source,
            suffix,
            program,
            instrument,
            page,
            per_page,
        } => {
            let query = FeedQuery::new(source.into())
                .with_suffix(suffix)
                .with_program(program)
                .with_instrument(instrument)
                .with_page(page)
                .with_per_page(per_page.unwrap_or(config.jwst.default_per_page));
            let response = service.feed(&query).await;
            info!(source = %response.source, count = response.count, "Feed ready");
            print_json(&response)?;
        }
        Commands::Featured => {
            let featured = service.featured().await?;
            print_json(&featured)?;
        }
        Commands::Select {
            obs_id,
            url,
            program,
            suffix,
            instruments,
            link,
        } => {
            let request = json!({
                "obs_id": obs_id,
                "url": url,
                "program": program,
                "suffix": suffix,
                "inst": instruments,
                "link": link,
            });
            let success = service.select(&request).await?;
            print_json(&json!({ "success": success }))?;
            if !success {
                error!("Selection needs both --obs-id and --url");
                exit_code = 2;
            }
        }
        Commands::Osdr { limit } => {
            let response = service.osdr_list(limit).await;
            print_json(&response)?;
        }
    }

    if cli.print_metrics {
        if let Some(rendered) = observability::render() {
            eprintln!("{}", rendered);
        }
    }

    if exit_code != 0 {
        drop(log_guard);
        std::process::exit(exit_code);
    }
    drop(log_guard);
    Ok(())
}
