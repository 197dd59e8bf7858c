//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use leadpipe_fetcher::{Deliverer, PubmedClient};
use leadpipe_shared::{
    AppConfig, DeliveryConfig, FetchConfig, ScoreConfig, init_config, load_config,
    validate_webhook_url,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// leadpipe — PubMed lead generation and scoring.
#[derive(Parser)]
#[command(
    name = "leadpipe",
    version,
    about = "Fetch researcher leads from PubMed, deliver them to a CRM webhook, and score enriched exports.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Search PubMed, extract leads, and stream them to the CRM webhook.
    Fetch {
        /// Free-text PubMed query (defaults to the configured query).
        #[arg(short, long)]
        query: Option<String>,

        /// Maximum number of search results.
        #[arg(short, long)]
        limit: Option<u32>,

        /// CSV backup path (overwritten each run).
        #[arg(short, long)]
        out: Option<String>,

        /// Fetch and export only; skip webhook delivery.
        #[arg(long)]
        no_deliver: bool,
    },

    /// Score an enriched lead CSV and write the re-ranked result.
    Score {
        /// Input CSV path (must include Paper Title, Current Position, Locality).
        #[arg(short, long)]
        input: Option<String>,

        /// Output CSV path (overwritten each run).
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "leadpipe=info",
        1 => "leadpipe=debug",
        _ => "leadpipe=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Fetch {
            query,
            limit,
            out,
            no_deliver,
        } => cmd_fetch(query.as_deref(), limit, out.as_deref(), no_deliver).await,
        Command::Score { input, output } => cmd_score(input.as_deref(), output.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// fetch
// ---------------------------------------------------------------------------

async fn cmd_fetch(
    query: Option<&str>,
    limit: Option<u32>,
    out: Option<&str>,
    no_deliver: bool,
) -> Result<()> {
    let start = Instant::now();
    let config = load_config()?;

    let mut fetch_config = FetchConfig::from(&config);
    if let Some(q) = query {
        fetch_config.query = q.to_string();
    }
    if let Some(n) = limit {
        fetch_config.limit = n;
    }
    if let Some(path) = out {
        fetch_config.export_path = PathBuf::from(path);
    }
    let export_path = fetch_config.export_path.clone();

    // Fail fast on a missing webhook URL before any network work happens.
    let delivery_config = DeliveryConfig::from(&config);
    if !no_deliver {
        validate_webhook_url(&delivery_config)?;
    }

    info!(
        query = %fetch_config.query,
        limit = fetch_config.limit,
        "starting fetch"
    );

    let spinner = phase_spinner();
    spinner.set_message("Searching PubMed");

    let client = PubmedClient::new(fetch_config)?;
    let leads = client.fetch().await?;

    if leads.is_empty() {
        spinner.finish_and_clear();
        println!();
        println!("  No leads found to send.");
        println!();
        return Ok(());
    }

    let delivered = if no_deliver {
        None
    } else {
        spinner.set_message(format!("Delivering {} leads to the CRM webhook", leads.len()));
        let deliverer = Deliverer::new(delivery_config)?;
        Some(deliverer.deliver(&leads).await)
    };

    spinner.finish_and_clear();

    // Print summary
    println!();
    println!("  Fetch complete!");
    println!("  Leads:   {}", leads.len());
    match &delivered {
        Some(report) => {
            println!("  Sent:    {} of {}", report.delivered, report.attempted);
            for (name, reason) in &report.failures {
                println!("  Failed:  {name} ({reason})");
            }
        }
        None => println!("  Sent:    skipped (--no-deliver)"),
    }
    println!("  Backup:  {}", export_path.display());
    println!("  Time:    {:.1}s", start.elapsed().as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// score
// ---------------------------------------------------------------------------

async fn cmd_score(input: Option<&str>, output: Option<&str>) -> Result<()> {
    let start = Instant::now();
    let config = load_config()?;

    let mut score_config = ScoreConfig::from(&config);
    if let Some(path) = input {
        score_config.input_path = PathBuf::from(path);
    }
    if let Some(path) = output {
        score_config.output_path = PathBuf::from(path);
    }

    info!(
        input = %score_config.input_path.display(),
        output = %score_config.output_path.display(),
        "scoring leads"
    );

    let report = leadpipe_scorer::run(&score_config)?;

    println!();
    println!("  Scoring complete!");
    println!("  Rows:    {}", report.rows);
    match report.top_score {
        Some(top) => println!("  Top:     {top}"),
        None => println!("  Top:     n/a (empty input)"),
    }
    println!("  Output:  {}", score_config.output_path.display());
    println!("  Time:    {:.1}s", start.elapsed().as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Progress spinner
// ---------------------------------------------------------------------------

/// Spinner shown during the network phases.
fn phase_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}
