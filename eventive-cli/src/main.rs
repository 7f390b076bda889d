use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use eventive_core::BlockAttributes;
use eventive_donations::{DonationProgressEngine, RestDonationClient, hydrate_page};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod state;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("EVENTIVE_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "eventive", version = VERSION, about = "Eventive fundraiser progress tools")]
struct Cli {
    /// REST API root (overrides [api].root from config.toml)
    #[arg(long, global = true)]
    api_root: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch donations for a date range and print progress towards a goal
    Progress {
        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        /// Goal in dollars (default: 1000)
        #[arg(long)]
        goal: Option<f64>,

        /// Print the result as JSON instead of the caption line
        #[arg(long)]
        json: bool,
    },

    /// Replace every fundraiser container in a saved page with rendered progress
    Hydrate {
        /// Page markup to hydrate
        #[arg(long)]
        page: PathBuf,

        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the container markup the fundraiser block saves
    Placeholder {
        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        #[arg(long)]
        goal: Option<f64>,
    },

    /// Manage ~/.eventive/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml if none exists
    Init,

    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load_config()?;
    if let Some(root) = cli.api_root {
        cfg.api.root = root;
    }

    init_logging(&cfg.logging.level)?;

    match cli.command {
        Command::Progress {
            start,
            end,
            goal,
            json,
        } => {
            let engine = engine(&cfg)?;
            let attrs = BlockAttributes::new(start, end, goal);
            let result = match engine.compute(&attrs).await {
                Ok(result) => result,
                Err(err) => bail!("{}", err),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.caption());
            }
        }

        Command::Hydrate { page, out } => {
            let engine = engine(&cfg)?;
            let html = state::read_page(&page)?;
            let hydrated = hydrate_page(&engine, &html).await;

            let failures = hydrated.failure_count();
            if failures > 0 {
                warn!(failures, "some containers rendered an error");
            }
            info!(
                containers = hydrated.outcomes.len(),
                page = %page.display(),
                "hydrated page"
            );

            match out {
                Some(out) => state::write_page(&out, &hydrated.html)?,
                None => print!("{}", hydrated.html),
            }
        }

        Command::Placeholder { start, end, goal } => {
            println!("{}", BlockAttributes::new(start, end, goal).placeholder_markup());
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    let filter_layer = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::builder()
            .parse(level)
            .with_context(|| format!("invalid log level {:?}", level))?,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
    Ok(())
}

fn engine(cfg: &config::Config) -> Result<DonationProgressEngine> {
    let client = RestDonationClient::new(cfg.client_settings())
        .with_context(|| format!("build HTTP client for {}", cfg.api.root))?;
    Ok(DonationProgressEngine::new(Arc::new(client)))
}
