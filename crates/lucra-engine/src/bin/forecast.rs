//! # Forecast CLI
//!
//! Runs the projection service against the configured database and prints
//! the result as JSON.
//!
//! ## Usage
//! ```bash
//! # 30-day sales forecast for the seeded demo account
//! cargo run -p lucra-engine --bin forecast -- sales --account demo
//!
//! # Cashflow over a quarter, explicit config file
//! cargo run -p lucra-engine --bin forecast -- cashflow -a demo -p 90 --config ./lucra.toml
//!
//! # Health score, weekday tables
//! cargo run -p lucra-engine --bin forecast -- health -a demo
//! cargo run -p lucra-engine --bin forecast -- seasonality -a demo
//!
//! # Drop cached results after a sync
//! cargo run -p lucra-engine --bin forecast -- invalidate -a demo --event sync
//! ```

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use lucra_engine::{EngineConfig, InvalidationEvent, ProjectionService};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: forecast <sales|cashflow|health|seasonality|invalidate> \
--account ID [--period DAYS] [--event sale|sync|manual] [--config PATH]";

#[derive(Debug)]
struct Args {
    command: String,
    account_id: String,
    period: u32,
    event: InvalidationEvent,
    config: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let args: Vec<String> = env::args().collect();
    let Some(command) = args.get(1).cloned() else {
        bail!(USAGE);
    };

    let mut parsed = Args {
        command,
        account_id: String::new(),
        period: 30,
        event: InvalidationEvent::Manual,
        config: None,
    };

    let mut i = 2;
    while i < args.len() {
        let value = args.get(i + 1).with_context(|| format!("missing value for {}", args[i]))?;
        match args[i].as_str() {
            "--account" | "-a" => parsed.account_id = value.clone(),
            "--period" | "-p" => {
                parsed.period = value
                    .parse()
                    .with_context(|| format!("period must be a number of days, got {value:?}"))?;
            }
            "--event" | "-e" => parsed.event = value.parse()?,
            "--config" | "-c" => parsed.config = Some(PathBuf::from(value)),
            other => bail!("unknown argument {other:?}\n{USAGE}"),
        }
        i += 2;
    }

    Ok(parsed)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args()?;
    let config = EngineConfig::load(args.config.clone()).context("loading engine config")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let service = ProjectionService::from_config(&config)
        .await
        .context("opening history store")?;

    match args.command.as_str() {
        "sales" => print_json(&service.calculate_sales_projection(&args.account_id, args.period).await?)?,
        "cashflow" => print_json(&service.calculate_cashflow_projection(&args.account_id, args.period).await?)?,
        "health" => print_json(&service.calculate_health_score(&args.account_id).await?)?,
        "seasonality" => print_json(&service.seasonality_report(&args.account_id).await?)?,
        "invalidate" => {
            let deleted = service.invalidate_cache(&args.account_id, args.event).await?;
            println!("🧹 Invalidated {deleted} cached result(s) for {}", args.account_id);
        }
        other => bail!("unknown command {other:?}\n{USAGE}"),
    }

    Ok(())
}
