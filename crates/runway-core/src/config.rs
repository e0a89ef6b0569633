//! Engine configuration
//!
//! Every threshold the engine uses lives here. Loading is two-layer: an
//! override file if one is found, otherwise the defaults embedded at build
//! time. Keys missing from an override keep their default values.
//!
//! Override lookup order:
//! 1. An explicit path (`--config`)
//! 2. `RUNWAY_CONFIG`
//! 3. `<data dir>/runway/config/engine.toml`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::CacheConfig;
use crate::error::{Error, Result};
use crate::forecast::{ProjectionConfig, MAX_AMOUNT_CEILING};
use crate::health::HealthScoreConfig;
use crate::insights::{CorrelationConfig, InsightConfig};

/// Embedded default config (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../../config/engine.toml");

/// Environment variable naming an override file
pub const CONFIG_ENV_VAR: &str = "RUNWAY_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub projection: ProjectionConfig,
    pub health: HealthScoreConfig,
    pub correlation: CorrelationConfig,
    pub insights: InsightConfig,
    pub cache: CacheConfig,
}

/// Where a loaded config came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Embedded,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Embedded => write!(f, "built-in defaults"),
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::data_local_dir().map(|d| d.join("runway").join("config").join("engine.toml"))
}

impl EngineConfig {
    /// Load configuration (override first, then embedded default)
    ///
    /// An explicit path that does not exist is an error; the implicit
    /// locations are skipped when absent.
    pub fn load(override_path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let source = match override_path {
            Some(path) if path.exists() => ConfigSource::File(path.to_path_buf()),
            Some(path) => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )))
            }
            None => match default_config_path() {
                Some(path) if path.exists() => ConfigSource::File(path),
                _ => ConfigSource::Embedded,
            },
        };

        let config = match &source {
            ConfigSource::File(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Self::from_toml(&content)?
            }
            ConfigSource::Embedded => Self::from_toml(DEFAULT_CONFIG)?,
        };

        debug!(source = %source, "Loaded engine config");
        Ok((config, source))
    }

    /// Parse TOML over the built-in defaults and validate the result
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = EngineConfig::default();
        raw.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let p = &self.projection;
        if p.max_horizon_days == 0 {
            return Err(Error::Config("projection.max_horizon_days must be positive".into()));
        }
        if p.max_abs_amount <= Decimal::ZERO
            || p.max_abs_amount > Decimal::from(MAX_AMOUNT_CEILING)
        {
            return Err(Error::Config(format!(
                "projection.max_abs_amount must be positive and at most {}",
                MAX_AMOUNT_CEILING
            )));
        }
        if p.job_timeout.is_zero() {
            return Err(Error::Config("projection.job_timeout_ms must be positive".into()));
        }

        let h = &self.health;
        let weights = [
            h.sleep_weight,
            h.activity_weight,
            h.stress_weight,
            h.energy_weight,
            h.mood_weight,
            h.relationships_weight,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::Config("health weights must be non-negative".into()));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(Error::Config("health weights must not all be zero".into()));
        }
        if !(h.sleep_acceptable_min <= h.sleep_optimal_min
            && h.sleep_optimal_min <= h.sleep_optimal_max
            && h.sleep_optimal_max <= h.sleep_acceptable_max)
        {
            return Err(Error::Config(
                "health sleep bands must nest: acceptable_min <= optimal_min <= optimal_max <= acceptable_max"
                    .into(),
            ));
        }
        if h.max_score <= 0.0 || h.mindfulness_bonus_cap < 0.0 {
            return Err(Error::Config(
                "health.max_score must be positive and the mindfulness cap non-negative".into(),
            ));
        }

        let c = &self.correlation;
        if c.min_sample_size < 3 {
            return Err(Error::Config(
                "correlation.min_sample_size must be at least 3".into(),
            ));
        }
        if !(c.confidence_level > 0.0 && c.confidence_level < 1.0) {
            return Err(Error::Config(
                "correlation.confidence_level must be in (0, 1)".into(),
            ));
        }
        if !(0.0..1.0).contains(&c.direction_epsilon) {
            return Err(Error::Config(
                "correlation.direction_epsilon must be in [0, 1)".into(),
            ));
        }

        let i = &self.insights;
        if !(i.significance > 0.0 && i.significance <= 1.0) {
            return Err(Error::Config("insights.significance must be in (0, 1]".into()));
        }
        if !(0.0 <= i.negligible_below
            && i.negligible_below <= i.weak_below
            && i.weak_below <= i.moderate_below
            && i.moderate_below <= 1.0)
        {
            return Err(Error::Config(
                "insights magnitude edges must be ascending within [0, 1]".into(),
            ));
        }

        if self.cache.max_entries == 0 {
            return Err(Error::Config("cache.max_entries must be positive".into()));
        }

        Ok(())
    }
}

/// Raw config structure for TOML parsing
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    projection: Option<RawProjection>,
    health: Option<RawHealth>,
    correlation: Option<RawCorrelation>,
    insights: Option<RawInsights>,
    cache: Option<RawCache>,
}

#[derive(Debug, Deserialize)]
struct RawProjection {
    max_horizon_days: Option<u32>,
    max_abs_amount: Option<Decimal>,
    job_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawHealth {
    sleep_weight: Option<f64>,
    activity_weight: Option<f64>,
    stress_weight: Option<f64>,
    energy_weight: Option<f64>,
    mood_weight: Option<f64>,
    relationships_weight: Option<f64>,
    sleep_optimal_min: Option<f64>,
    sleep_optimal_max: Option<f64>,
    sleep_acceptable_min: Option<f64>,
    sleep_acceptable_max: Option<f64>,
    sleep_partial_credit: Option<f64>,
    sleep_falloff_hours: Option<f64>,
    activity_weekly_target_minutes: Option<f64>,
    mindfulness_points_per_minute: Option<f64>,
    mindfulness_bonus_cap: Option<f64>,
    max_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawCorrelation {
    min_sample_size: Option<usize>,
    direction_epsilon: Option<f64>,
    confidence_level: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawInsights {
    min_strength: Option<f64>,
    significance: Option<f64>,
    min_sample_size: Option<usize>,
    negligible_below: Option<f64>,
    weak_below: Option<f64>,
    moderate_below: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawCache {
    max_entries: Option<usize>,
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *target = v;
    }
}

impl RawConfig {
    fn apply(self, config: &mut EngineConfig) {
        if let Some(p) = self.projection {
            set(&mut config.projection.max_horizon_days, p.max_horizon_days);
            set(&mut config.projection.max_abs_amount, p.max_abs_amount);
            set(
                &mut config.projection.job_timeout,
                p.job_timeout_ms.map(Duration::from_millis),
            );
        }

        if let Some(h) = self.health {
            let cfg = &mut config.health;
            set(&mut cfg.sleep_weight, h.sleep_weight);
            set(&mut cfg.activity_weight, h.activity_weight);
            set(&mut cfg.stress_weight, h.stress_weight);
            set(&mut cfg.energy_weight, h.energy_weight);
            set(&mut cfg.mood_weight, h.mood_weight);
            set(&mut cfg.relationships_weight, h.relationships_weight);
            set(&mut cfg.sleep_optimal_min, h.sleep_optimal_min);
            set(&mut cfg.sleep_optimal_max, h.sleep_optimal_max);
            set(&mut cfg.sleep_acceptable_min, h.sleep_acceptable_min);
            set(&mut cfg.sleep_acceptable_max, h.sleep_acceptable_max);
            set(&mut cfg.sleep_partial_credit, h.sleep_partial_credit);
            set(&mut cfg.sleep_falloff_hours, h.sleep_falloff_hours);
            set(
                &mut cfg.activity_weekly_target_minutes,
                h.activity_weekly_target_minutes,
            );
            set(
                &mut cfg.mindfulness_points_per_minute,
                h.mindfulness_points_per_minute,
            );
            set(&mut cfg.mindfulness_bonus_cap, h.mindfulness_bonus_cap);
            set(&mut cfg.max_score, h.max_score);
        }

        if let Some(c) = self.correlation {
            set(&mut config.correlation.min_sample_size, c.min_sample_size);
            set(&mut config.correlation.direction_epsilon, c.direction_epsilon);
            set(&mut config.correlation.confidence_level, c.confidence_level);
        }

        if let Some(i) = self.insights {
            let cfg = &mut config.insights;
            set(&mut cfg.min_strength, i.min_strength);
            set(&mut cfg.significance, i.significance);
            set(&mut cfg.min_sample_size, i.min_sample_size);
            set(&mut cfg.negligible_below, i.negligible_below);
            set(&mut cfg.weak_below, i.weak_below);
            set(&mut cfg.moderate_below, i.moderate_below);
        }

        if let Some(c) = self.cache {
            set(&mut config.cache.max_entries, c.max_entries);
        }
    }
}
