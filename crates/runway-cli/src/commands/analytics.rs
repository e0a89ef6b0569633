//! Health score, correlation and insight commands

use std::path::Path;

use anyhow::{Context, Result};

use runway_core::{
    AnalysisRequest, CorrelationAnalyzer, CorrelationOutcome, CorrelationResult, EngineConfig,
    HealthScoreCalculator, InsightGenerator, Period,
};

use super::{print_json, read_checkins, read_spending};

fn parse_period(period: &str) -> Result<Period> {
    period.parse::<Period>().context("Invalid --period")
}

pub fn cmd_score(config: &EngineConfig, checkins_path: &Path, json: bool) -> Result<()> {
    let checkins = read_checkins(checkins_path)?;
    let calculator = HealthScoreCalculator::with_config(config.health.clone());
    let scores: Vec<_> = checkins.iter().map(|c| calculator.compute_score(c)).collect();

    if json {
        return print_json(&scores);
    }

    if scores.is_empty() {
        println!("No checkins found in {}", checkins_path.display());
        return Ok(());
    }

    println!();
    println!("💚 Health Scores");
    println!("   ─────────────────────────────────────────────────────────────");
    for score in &scores {
        if score.no_data {
            println!("   {}   (no data)", score.date);
        } else {
            println!("   {}   {:>5.1}", score.date, score.score);
        }
    }

    let scored: Vec<f64> = scores.iter().filter(|s| !s.no_data).map(|s| s.score).collect();
    if !scored.is_empty() {
        println!();
        println!(
            "   Average: {:.1} over {} checkins",
            scored.iter().sum::<f64>() / scored.len() as f64,
            scored.len()
        );
    }
    println!();

    Ok(())
}

/// Run the correlation analysis shared by `correlate` and `insights`
pub fn run_analysis(
    config: &EngineConfig,
    checkins_path: &Path,
    spending_path: &Path,
    metric: &str,
    category: Option<&str>,
    period: Period,
) -> Result<Vec<CorrelationResult>> {
    let checkins = read_checkins(checkins_path)?;
    let spending = read_spending(spending_path)?;

    let samples =
        HealthScoreCalculator::with_config(config.health.clone()).metric_samples(&checkins);
    let analyzer = CorrelationAnalyzer::with_config(config.correlation.clone());

    let results = match category {
        Some(category) => {
            let request = AnalysisRequest::new(metric, category, period);
            vec![analyzer.analyze(&samples, &spending, &request)?]
        }
        None => analyzer.analyze_categories(&samples, &spending, metric, period)?,
    };

    Ok(results)
}

fn describe_outcome(result: &CorrelationResult) -> String {
    match &result.outcome {
        CorrelationOutcome::Correlated(stats) => {
            let interval = stats
                .confidence_interval
                .map(|ci| format!("  [{:.2}, {:.2}]", ci.lower, ci.upper))
                .unwrap_or_default();
            format!(
                "r = {:>6.3}  p = {:.4}  {:<8}{}",
                stats.strength,
                stats.p_value,
                stats.direction.as_str(),
                interval
            )
        }
        CorrelationOutcome::InsufficientSample { required } => {
            format!("insufficient sample (need {})", required)
        }
        CorrelationOutcome::ZeroVariance => "no variance".to_string(),
    }
}

pub fn cmd_correlate(
    config: &EngineConfig,
    checkins_path: &Path,
    spending_path: &Path,
    metric: &str,
    category: Option<&str>,
    period: &str,
    json: bool,
) -> Result<()> {
    let period = parse_period(period)?;
    let results = run_analysis(config, checkins_path, spending_path, metric, category, period)?;

    if json {
        return print_json(&results);
    }

    if results.is_empty() {
        println!("No spending categories found in {}", spending_path.display());
        return Ok(());
    }

    println!();
    println!("🔗 {} vs spending ({})", metric, period);
    println!("   ─────────────────────────────────────────────────────────────");
    for result in &results {
        println!(
            "   {:<20} n = {:<4} {}",
            result.category,
            result.sample_size,
            describe_outcome(result)
        );
    }
    println!();

    Ok(())
}

pub fn cmd_insights(
    config: &EngineConfig,
    checkins_path: &Path,
    spending_path: &Path,
    metric: &str,
    period: &str,
    all: bool,
    json: bool,
) -> Result<()> {
    let period = parse_period(period)?;
    let results = run_analysis(config, checkins_path, spending_path, metric, None, period)?;

    let generator = InsightGenerator::with_config(config.insights.clone());
    let insights: Vec<_> = generator
        .generate_all(&results)
        .into_iter()
        .filter(|i| all || i.actionable)
        .collect();

    if json {
        return print_json(&insights);
    }

    if insights.is_empty() {
        println!("No actionable insights yet. Use --all to see every result.");
        return Ok(());
    }

    println!();
    println!("💡 Insights");
    println!("   ─────────────────────────────────────────────────────────────");
    for insight in &insights {
        let marker = if insight.actionable { "→" } else { " " };
        println!("   {} {}", marker, insight.text);
    }
    println!();

    Ok(())
}
