//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `forecast` - Cash flow projection from an obligations snapshot
//! - `analytics` - Health scores, correlations and insights
//! - `config` - Engine configuration display
//!
//! Shared helpers for reading snapshots and formatting output live here.

pub mod analytics;
pub mod config;
pub mod forecast;

// Re-export command functions for main.rs
pub use analytics::*;
pub use config::*;
pub use forecast::*;

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;

use runway_core::import::{parse_checkins, parse_obligations, parse_spending};
use runway_core::{
    ConfigSource, EngineConfig, HealthCheckin, RecurringObligation, SpendingObservation,
};

/// Load the engine config for a command
pub fn load_config(path: Option<&Path>) -> Result<(EngineConfig, ConfigSource)> {
    EngineConfig::load(path).context("Failed to load engine config")
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

pub fn read_obligations(path: &Path) -> Result<Vec<RecurringObligation>> {
    parse_obligations(open(path)?)
        .with_context(|| format!("Failed to parse obligations from {}", path.display()))
}

pub fn read_checkins(path: &Path) -> Result<Vec<HealthCheckin>> {
    parse_checkins(open(path)?)
        .with_context(|| format!("Failed to parse checkins from {}", path.display()))
}

pub fn read_spending(path: &Path) -> Result<Vec<SpendingObservation>> {
    parse_spending(open(path)?)
        .with_context(|| format!("Failed to parse spending from {}", path.display()))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format money as `$1,234.56` / `-$1,234.56`
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let digits = format!("{:.2}", rounded.abs());
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

/// Format a signed change as `+$12.00` / `-$12.00`
pub fn format_change(amount: Decimal) -> String {
    if amount > Decimal::ZERO {
        format!("+{}", format_money(amount))
    } else {
        format_money(amount)
    }
}
