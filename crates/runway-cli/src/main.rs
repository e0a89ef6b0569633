//! Runway CLI - Cash flow forecasting and wellness/spending insights
//!
//! Usage:
//!   runway forecast -o obligations.csv -b 500       Project the next 90 days
//!   runway score -c checkins.csv                    Composite health scores
//!   runway correlate -c checkins.csv -s spend.csv   Correlation per category
//!   runway insights -c checkins.csv -s spend.csv    Actionable insights

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.as_deref();
    let config = || commands::load_config(config_path).map(|(config, _)| config);

    match cli.command {
        Commands::Forecast {
            obligations,
            balance,
            start,
            days,
            user,
            daily,
            json,
        } => {
            commands::cmd_forecast(
                &config()?,
                &obligations,
                &balance,
                start.as_deref(),
                days,
                &user,
                daily,
                json,
            )
            .await
        }
        Commands::Score { checkins, json } => commands::cmd_score(&config()?, &checkins, json),
        Commands::Correlate {
            checkins,
            spending,
            metric,
            category,
            period,
            json,
        } => commands::cmd_correlate(
            &config()?,
            &checkins,
            &spending,
            &metric,
            category.as_deref(),
            &period,
            json,
        ),
        Commands::Insights {
            checkins,
            spending,
            metric,
            period,
            all,
            json,
        } => commands::cmd_insights(&config()?, &checkins, &spending, &metric, &period, all, json),
        Commands::Config { default, json } => commands::cmd_config(config_path, default, json),
    }
}
