use activity_feed::config::Config;
use activity_feed::{fixtures, logging, metrics};
use activity_feed::{visible, ActivityRecord, Aggregator, Category, HttpSourceClient};
use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "activity_feed")]
#[command(about = "Unified activity feed across email, WhatsApp and meetings")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Expose Prometheus metrics on this address (e.g. 127.0.0.1:9898)
    #[arg(long, global = true, value_name = "ADDR")]
    metrics_addr: Option<SocketAddr>,

    /// Directory for rolling log files
    #[arg(long, global = true, default_value = logging::DEFAULT_LOG_DIR)]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every source once and print the visible records
    Feed {
        /// all, email, whatsapp or meeting
        #[arg(long, default_value = "all")]
        category: Category,
        /// Case-insensitive text matched against sender and details
        #[arg(long, default_value = "")]
        query: String,
        /// Print records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Serve local JSON fixtures as the three source endpoints
    ServeFixtures {
        /// Directory holding email.json, whatsapp.json and meeting.json
        #[arg(long, default_value = "fixtures")]
        dir: PathBuf,
        #[arg(long, default_value = "127.0.0.1:8081")]
        addr: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = logging::init_logging(&cli.log_dir);

    if let Some(addr) = cli.metrics_addr {
        metrics::init_metrics(addr);
    }

    match cli.command {
        Commands::Feed {
            category,
            query,
            json,
        } => {
            let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
            run_feed(&config, category, &query, json).await
        }
        Commands::ServeFixtures { dir, addr } => {
            fixtures::serve(dir, addr).await?;
            Ok(())
        }
    }
}

async fn run_feed(config: &Config, category: Category, query: &str, json: bool) -> Result<()> {
    let client = HttpSourceClient::new(config.endpoints()?, config.timeout())?;
    let aggregator = Aggregator::new(Arc::new(client), config.feed.sources.clone());

    info!(category = %category, query = %query, "Loading activity feed");
    let outcome = aggregator.load_all().await;

    // A failed run publishes an empty feed; render that before reporting.
    let records = aggregator.records().await;
    let shown = visible(&records, category, query);
    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
    } else {
        print!("{}", render_table(&shown));
    }

    if let Err(e) = outcome {
        error!("Feed unavailable: {}", e);
        return Err(e.into());
    }
    Ok(())
}

const ACTIVITY_WIDTH: usize = 10;
const SENDER_WIDTH: usize = 20;

fn render_table(records: &[&ActivityRecord]) -> String {
    if records.is_empty() {
        return "No data found\n".to_string();
    }

    let mut out = format!(
        "{:<aw$} {:<sw$} {}\n",
        "ACTIVITY",
        "SENDER",
        "DETAILS",
        aw = ACTIVITY_WIDTH,
        sw = SENDER_WIDTH
    );
    for record in records {
        let when = record
            .timestamp
            .map(|ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "{:<aw$} {:<sw$} {}\n{:<pad$}{}\n",
            record.source_type.as_str(),
            record.name.as_deref().unwrap_or(""),
            record.details.as_deref().unwrap_or(""),
            "",
            when,
            aw = ACTIVITY_WIDTH,
            sw = SENDER_WIDTH,
            pad = ACTIVITY_WIDTH + SENDER_WIDTH + 2
        ));
    }
    out
}
