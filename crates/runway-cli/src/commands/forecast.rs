//! Forecast command implementation

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;

use runway_core::models::parse_money;
use runway_core::{
    CashFlowProjector, EngineConfig, ForecastCache, ForecastJobs, Ledger, LedgerSummary,
    ProjectionRequest,
};

use super::{format_change, format_money, print_json, read_obligations};

#[derive(Serialize)]
struct ForecastReport<'a> {
    summary: LedgerSummary,
    ledger: &'a Ledger,
}

/// Resolve `--start`, defaulting to today
pub fn resolve_start(start: Option<&str>) -> Result<NaiveDate> {
    match start {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid --start date: {} (use YYYY-MM-DD)", s)),
        None => Ok(Utc::now().date_naive()),
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn cmd_forecast(
    config: &EngineConfig,
    obligations_path: &Path,
    balance: &str,
    start: Option<&str>,
    days: u32,
    user: &str,
    daily: bool,
    json: bool,
) -> Result<()> {
    let obligations = read_obligations(obligations_path)?;
    let initial_balance =
        parse_money(balance).with_context(|| format!("Invalid --balance: {}", balance))?;
    let start_date = resolve_start(start)?;

    let jobs = ForecastJobs::new(
        Arc::new(CashFlowProjector::with_config(config.projection.clone())),
        Arc::new(ForecastCache::new(config.cache.clone())),
    );
    let request = ProjectionRequest::new(initial_balance, start_date, days);
    let ledger = jobs
        .spawn(user, request, obligations)
        .join()
        .await
        .context("Forecast failed")?;

    let summary = ledger.summary();

    if json {
        return print_json(&ForecastReport {
            summary,
            ledger: &ledger,
        });
    }

    let end_date = start_date + Duration::days(days as i64 - 1);

    println!();
    println!(
        "📈 Forecast: {} → {} ({} days)",
        start_date, end_date, summary.horizon_days
    );
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:<12} {:>14} {:>14}   {}",
        "Date", "Change", "Balance", "Obligations"
    );

    for entry in &ledger.entries {
        if !daily && entry.contributing_occurrence_ids.is_empty() {
            continue;
        }
        println!(
            "   {:<12} {:>14} {:>14}   {}",
            entry.date,
            format_change(entry.net_change),
            format_money(entry.closing_balance),
            entry.contributing_occurrence_ids.join(", ")
        );
    }

    println!();
    println!("   Starting balance: {}", format_money(ledger.initial_balance));
    println!("   Income:           {}", format_money(summary.total_income));
    println!("   Expenses:         {}", format_money(summary.total_expense));
    println!("   Final balance:    {}", format_money(summary.final_balance));
    if let Some(date) = summary.lowest_balance_date {
        println!(
            "   Lowest balance:   {} on {}",
            format_money(summary.lowest_balance),
            date
        );
    }
    if let Some(date) = summary.first_shortfall {
        println!();
        println!("   ⚠️  Balance goes negative on {}", date);
    }
    println!();

    Ok(())
}
