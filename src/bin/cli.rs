//! ASN Bot CLI
//!
//! Drives an already-authenticated Chrome session over WebDriver. Start
//! chromedriver and a Chrome instance with a remote debugging port, log
//! in to Vendor Central, then run the bot against that session.

use std::io::{self, Write};
use std::path::PathBuf;

use asnbot::{
    automation::WebDriverSession,
    error::Result,
    models::{Config, LeadTimeTable},
    pipeline::{self, RunInputs},
    schedule,
    storage::LocalStorage,
};
use clap::{Parser, Subcommand};

/// asnbot - Vendor Central ASN automation
#[derive(Parser, Debug)]
#[command(name = "asnbot", version, about = "Vendor Central ASN submission bot")]

struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "asnbot.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the queue and submit an ASN for every matching shipment
    Run {
        /// Pickup date phrase matched against queue labels (prompts if omitted)
        #[arg(long)]
        pickup: Option<String>,

        /// Ship date as MM/DD/YYYY (prompts if omitted)
        #[arg(long)]
        ship_date: Option<String>,

        /// Override the lead-time table path
        #[arg(long)]
        lead_times: Option<PathBuf>,

        /// Override the report output path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Click the final confirm-and-submit control
        #[arg(long)]
        submit: bool,
    },

    /// Crawl the queue only and list the matching shipments
    Scan {
        /// Pickup date phrase matched against queue labels (prompts if omitted)
        #[arg(long)]
        pickup: Option<String>,
    },

    /// Validate the configuration and lead-time table
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Use the flag value when given, otherwise ask on stdin.
fn resolve_input(value: Option<String>, prompt: &str) -> Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }

    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("ASN Bot starting...");

    let mut config = Config::load_or_default(&cli.config);
    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Run {
            pickup,
            ship_date,
            lead_times,
            output,
            submit,
        } => {
            if submit {
                config.session.submit = true;
            }
            if let Some(path) = lead_times {
                config.paths.lead_times = path;
            }
            if let Some(path) = output {
                config.paths.output = path;
            }

            let pickup_marker = resolve_input(
                pickup,
                "Pickup date to match (e.g. Thu, Sep 19, 2024 CDT): ",
            )?;
            let ship_date = resolve_input(ship_date, "Ship date (MM/DD/YYYY): ")?;
            schedule::parse_ship_date(&ship_date)?;

            let lead_times = LeadTimeTable::load(&config.paths.lead_times)?;
            log::info!("Loaded {} lead-time entries", lead_times.len());

            let page = WebDriverSession::connect(
                &config.session.webdriver_url,
                &config.session.debugger_address,
            )
            .await?;
            let storage = LocalStorage::new(&config.paths.output);

            let inputs = RunInputs {
                pickup_marker,
                ship_date,
            };
            let summary =
                pipeline::run_submission(&config, &inputs, &page, &lead_times, &storage).await?;

            log::info!(
                "Run complete: {} shipments, {} rows written in {}s",
                summary.shipments,
                summary.rows_written,
                (summary.finished - summary.started).num_seconds()
            );
            if summary.without_lead_time > 0 {
                log::warn!(
                    "{} shipments had no lead-time entry",
                    summary.without_lead_time
                );
            }
        }

        Command::Scan { pickup } => {
            let pickup_marker = resolve_input(
                pickup,
                "Pickup date to match (e.g. Thu, Sep 19, 2024 CDT): ",
            )?;

            let page = WebDriverSession::connect(
                &config.session.webdriver_url,
                &config.session.debugger_address,
            )
            .await?;

            let shipments = pipeline::run_scan(&config, &pickup_marker, &page).await?;
            for shipment in &shipments {
                println!("{shipment}");
            }
            log::info!("Found {} matching shipments", shipments.len());
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            let lead_times = LeadTimeTable::load(&config.paths.lead_times)?;
            log::info!("✓ Lead-time table OK ({} entries)", lead_times.len());

            log::info!("All validations passed!");
        }
    }

    log::info!("Done!");

    Ok(())
}
