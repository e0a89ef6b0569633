//! Config command implementation

use std::path::Path;

use anyhow::Result;

use runway_core::config::{default_config_path, DEFAULT_CONFIG};
use runway_core::ConfigSource;

use super::{format_money, load_config, print_json};

pub fn cmd_config(path: Option<&Path>, default: bool, json: bool) -> Result<()> {
    if default {
        print!("{}", DEFAULT_CONFIG);
        return Ok(());
    }

    let (config, source) = load_config(path)?;

    if json {
        return print_json(&config);
    }

    println!();
    println!("⚙️  Engine Config");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Source: {}", source);
    if source == ConfigSource::Embedded {
        if let Some(override_path) = default_config_path() {
            println!("   Override location: {}", override_path.display());
        }
    }

    let p = &config.projection;
    println!();
    println!("   Projection");
    println!("     Max horizon:        {} days", p.max_horizon_days);
    println!("     Max amount:         {}", format_money(p.max_abs_amount));
    println!("     Job timeout:        {} ms", p.job_timeout.as_millis());

    let h = &config.health;
    println!();
    println!("   Health score");
    println!(
        "     Weights:            sleep {} / activity {} / stress {} / energy {} / mood {} / relationships {}",
        h.sleep_weight,
        h.activity_weight,
        h.stress_weight,
        h.energy_weight,
        h.mood_weight,
        h.relationships_weight
    );
    println!(
        "     Sleep optimal:      {}-{} h (acceptable {}-{} h)",
        h.sleep_optimal_min, h.sleep_optimal_max, h.sleep_acceptable_min, h.sleep_acceptable_max
    );
    println!("     Max score:          {}", h.max_score);

    let c = &config.correlation;
    println!();
    println!("   Correlation");
    println!("     Min sample size:    {}", c.min_sample_size);
    println!("     Direction epsilon:  {}", c.direction_epsilon);
    println!("     Confidence level:   {}", c.confidence_level);

    let i = &config.insights;
    println!();
    println!("   Insights");
    println!(
        "     Actionable when:    |r| > {}, p < {}, n > {}",
        i.min_strength, i.significance, i.min_sample_size
    );
    println!(
        "     Magnitude edges:    {} / {} / {}",
        i.negligible_below, i.weak_below, i.moderate_below
    );

    println!();
    println!("   Cache");
    println!("     Max entries:        {}", config.cache.max_entries);
    println!();

    Ok(())
}
