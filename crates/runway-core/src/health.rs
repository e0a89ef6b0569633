//! Health score calculation
//!
//! Reduces one wellness checkin to a composite score in `[0, 100]`.
//! Every component is first mapped to a 0–100 contribution:
//!
//! - sleep: full credit inside the optimal band, partial credit inside the
//!   acceptable band, linear falloff to zero beyond it
//! - activity: proportional to the weekly target, capped at full credit
//! - stress: inverted (1 = calm = full credit)
//! - energy, mood, relationships: 1–10 rescaled to 10–100
//!
//! The weighted average of the present components plus a capped mindfulness
//! bonus is the score, clamped to [`HealthScoreConfig::max_score`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{HealthCheckin, HealthMetricSample};

/// Metric name used for the composite score in sample series
pub const HEALTH_SCORE_METRIC: &str = "health_score";

/// Weights, bands and caps for the composite score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScoreConfig {
    pub sleep_weight: f64,
    pub activity_weight: f64,
    pub stress_weight: f64,
    pub energy_weight: f64,
    pub mood_weight: f64,
    pub relationships_weight: f64,

    /// Hours of sleep earning full credit (inclusive band)
    pub sleep_optimal_min: f64,
    pub sleep_optimal_max: f64,
    /// Hours of sleep earning partial credit (inclusive band)
    pub sleep_acceptable_min: f64,
    pub sleep_acceptable_max: f64,
    /// Credit (0–100) inside the acceptable band
    pub sleep_partial_credit: f64,
    /// Hours beyond the acceptable band over which credit falls to zero
    pub sleep_falloff_hours: f64,

    /// Activity minutes that earn full credit
    pub activity_weekly_target_minutes: f64,

    pub mindfulness_points_per_minute: f64,
    pub mindfulness_bonus_cap: f64,

    pub max_score: f64,
}

impl Default for HealthScoreConfig {
    fn default() -> Self {
        Self {
            sleep_weight: 0.25,
            activity_weight: 0.15,
            stress_weight: 0.15,
            energy_weight: 0.15,
            mood_weight: 0.15,
            relationships_weight: 0.15,
            sleep_optimal_min: 7.0,
            sleep_optimal_max: 9.0,
            sleep_acceptable_min: 6.0,
            sleep_acceptable_max: 10.0,
            sleep_partial_credit: 70.0,
            sleep_falloff_hours: 3.0,
            activity_weekly_target_minutes: 150.0,
            mindfulness_points_per_minute: 0.5,
            mindfulness_bonus_cap: 5.0,
            max_score: 100.0,
        }
    }
}

/// Per-component contributions (0–100), None when the field was missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub sleep: Option<f64>,
    pub activity: Option<f64>,
    pub stress: Option<f64>,
    pub energy: Option<f64>,
    pub mood: Option<f64>,
    pub relationships: Option<f64>,
    pub mindfulness_bonus: f64,
}

/// Composite score for one checkin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    pub date: NaiveDate,
    pub score: f64,
    /// Set when no contributing field was present; `score` is then 0
    pub no_data: bool,
    pub components: ScoreComponents,
}

pub struct HealthScoreCalculator {
    config: HealthScoreConfig,
}

impl Default for HealthScoreCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthScoreCalculator {
    pub fn new() -> Self {
        Self {
            config: HealthScoreConfig::default(),
        }
    }

    pub fn with_config(config: HealthScoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HealthScoreConfig {
        &self.config
    }

    /// Compute the composite score for a checkin
    ///
    /// Out-of-range inputs are clamped into their scales and non-finite
    /// values count as missing.
    pub fn compute_score(&self, checkin: &HealthCheckin) -> HealthScore {
        let cfg = &self.config;
        let present = |v: Option<f64>| v.filter(|x| x.is_finite());

        let components = ScoreComponents {
            sleep: present(checkin.sleep_hours).map(|h| self.sleep_credit(h)),
            activity: present(checkin.activity_minutes).map(|m| self.activity_credit(m)),
            stress: present(checkin.stress_level).map(stress_credit),
            energy: present(checkin.energy).map(scale_one_to_ten),
            mood: present(checkin.mood).map(scale_one_to_ten),
            relationships: present(checkin.relationships).map(scale_one_to_ten),
            mindfulness_bonus: 0.0,
        };

        let weighted = [
            (components.sleep, cfg.sleep_weight),
            (components.activity, cfg.activity_weight),
            (components.stress, cfg.stress_weight),
            (components.energy, cfg.energy_weight),
            (components.mood, cfg.mood_weight),
            (components.relationships, cfg.relationships_weight),
        ];

        let (sum, weight_total) = weighted
            .iter()
            .filter_map(|(value, weight)| value.map(|v| (v * weight, *weight)))
            .fold((0.0, 0.0), |(s, w), (v, wt)| (s + v, w + wt));

        if weight_total <= 0.0 {
            return HealthScore {
                date: checkin.date,
                score: 0.0,
                no_data: true,
                components,
            };
        }

        let bonus = present(checkin.mindfulness_minutes)
            .map(|m| (m.max(0.0) * cfg.mindfulness_points_per_minute).min(cfg.mindfulness_bonus_cap))
            .unwrap_or(0.0);

        let score = (sum / weight_total + bonus).clamp(0.0, cfg.max_score);

        HealthScore {
            date: checkin.date,
            score: round_tenth(score),
            no_data: false,
            components: ScoreComponents {
                mindfulness_bonus: bonus,
                ..components
            },
        }
    }

    /// Composite score samples for a series of checkins, skipping empty ones
    pub fn score_samples(&self, checkins: &[HealthCheckin]) -> Vec<HealthMetricSample> {
        checkins
            .iter()
            .map(|c| self.compute_score(c))
            .filter(|s| !s.no_data)
            .map(|s| HealthMetricSample::new(s.date, HEALTH_SCORE_METRIC, s.score))
            .collect()
    }

    /// Every present field of every checkin plus its composite score
    pub fn metric_samples(&self, checkins: &[HealthCheckin]) -> Vec<HealthMetricSample> {
        let mut samples = Vec::with_capacity(checkins.len() * 8);
        for checkin in checkins {
            samples.extend(checkin.samples());
            let score = self.compute_score(checkin);
            if !score.no_data {
                samples.push(HealthMetricSample::new(
                    score.date,
                    HEALTH_SCORE_METRIC,
                    score.score,
                ));
            }
        }
        samples
    }

    fn sleep_credit(&self, hours: f64) -> f64 {
        let cfg = &self.config;
        let hours = hours.max(0.0);

        if (cfg.sleep_optimal_min..=cfg.sleep_optimal_max).contains(&hours) {
            return 100.0;
        }
        if (cfg.sleep_acceptable_min..=cfg.sleep_acceptable_max).contains(&hours) {
            return cfg.sleep_partial_credit;
        }

        let distance = if hours < cfg.sleep_acceptable_min {
            cfg.sleep_acceptable_min - hours
        } else {
            hours - cfg.sleep_acceptable_max
        };
        if cfg.sleep_falloff_hours <= 0.0 {
            return 0.0;
        }
        (cfg.sleep_partial_credit * (1.0 - distance / cfg.sleep_falloff_hours)).max(0.0)
    }

    fn activity_credit(&self, minutes: f64) -> f64 {
        let target = self.config.activity_weekly_target_minutes;
        if target <= 0.0 {
            return 100.0;
        }
        (minutes.max(0.0) / target).min(1.0) * 100.0
    }
}

/// Stress 1 (calm) → 100, stress 10 → 0
fn stress_credit(level: f64) -> f64 {
    (10.0 - level.clamp(1.0, 10.0)) / 9.0 * 100.0
}

/// 1–10 → 10–100
fn scale_one_to_ten(value: f64) -> f64 {
    value.clamp(1.0, 10.0) * 10.0
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
