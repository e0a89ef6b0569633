//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Runway - See where your money and your week are heading
#[derive(Parser)]
#[command(name = "runway")]
#[command(about = "Cash flow forecasting and wellness/spending insights", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Engine config file (overrides RUNWAY_CONFIG and the data dir default)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Project daily balances from recurring obligations
    Forecast {
        /// Obligations CSV (id,direction,amount,frequency,anchor,start_date,end_date[,label])
        #[arg(short, long)]
        obligations: PathBuf,

        /// Starting balance (e.g. 500, $1,250.00)
        #[arg(short, long, allow_hyphen_values = true)]
        balance: String,

        /// First day of the forecast (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        start: Option<String>,

        /// Number of days to project
        #[arg(short, long, default_value = "90")]
        days: u32,

        /// User the forecast is cached under
        #[arg(long, default_value = "local")]
        user: String,

        /// Print every day instead of only days with activity
        #[arg(long)]
        daily: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute composite health scores from checkins
    Score {
        /// Checkins CSV (date,sleep_hours,activity_minutes,stress_level,energy,mood,relationships,mindfulness_minutes)
        #[arg(short, long)]
        checkins: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Correlate a wellness metric with spending by category
    Correlate {
        /// Checkins CSV
        #[arg(short, long)]
        checkins: PathBuf,

        /// Spending CSV (date,category,amount)
        #[arg(short, long)]
        spending: PathBuf,

        /// Metric to correlate (health_score, mood, sleep_hours, ...)
        #[arg(short, long, default_value = "health_score")]
        metric: String,

        /// Only this category (defaults to every category in the file)
        #[arg(long)]
        category: Option<String>,

        /// Aggregation period: daily, weekly, monthly
        #[arg(short, long, default_value = "weekly")]
        period: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate insights from wellness/spending correlations
    Insights {
        /// Checkins CSV
        #[arg(short, long)]
        checkins: PathBuf,

        /// Spending CSV (date,category,amount)
        #[arg(short, long)]
        spending: PathBuf,

        /// Metric to correlate
        #[arg(short, long, default_value = "health_score")]
        metric: String,

        /// Aggregation period: daily, weekly, monthly
        #[arg(short, long, default_value = "weekly")]
        period: String,

        /// Include insights that are not actionable
        #[arg(short, long)]
        all: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the active engine configuration
    Config {
        /// Print the built-in default config file instead
        #[arg(long)]
        default: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
