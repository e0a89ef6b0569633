//! Insight Generator
//!
//! Turns correlation results into short statements. An insight is only
//! marked actionable when the relationship is large enough, significant,
//! and backed by enough overlapping periods.

use serde::{Deserialize, Serialize};

use super::types::{
    CorrelationDirection, CorrelationOutcome, CorrelationResult, Insight, MagnitudeBucket,
};

/// Gates and bucket edges for insight generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightConfig {
    /// |r| must be strictly above this
    pub min_strength: f64,
    /// p-value must be strictly below this
    pub significance: f64,
    /// Overlapping periods must be strictly above this
    pub min_sample_size: usize,
    pub negligible_below: f64,
    pub weak_below: f64,
    pub moderate_below: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            min_strength: 0.3,
            significance: 0.05,
            min_sample_size: 10,
            negligible_below: 0.1,
            weak_below: 0.3,
            moderate_below: 0.5,
        }
    }
}

pub struct InsightGenerator {
    config: InsightConfig,
}

impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightGenerator {
    pub fn new() -> Self {
        Self {
            config: InsightConfig::default(),
        }
    }

    pub fn with_config(config: InsightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    pub fn magnitude(&self, strength: f64) -> MagnitudeBucket {
        let r = strength.abs();
        if r < self.config.negligible_below {
            MagnitudeBucket::Negligible
        } else if r < self.config.weak_below {
            MagnitudeBucket::Weak
        } else if r < self.config.moderate_below {
            MagnitudeBucket::Moderate
        } else {
            MagnitudeBucket::Strong
        }
    }

    pub fn generate(&self, result: &CorrelationResult) -> Insight {
        let metric = result.metric.replace('_', " ");
        let category = &result.category;
        let noun = result.period.noun();
        let n = result.sample_size;

        match &result.outcome {
            CorrelationOutcome::InsufficientSample { required } => Insight {
                correlation_result_id: result.id.clone(),
                text: format!(
                    "Not enough data to relate {} to {} spending yet: {} overlapping {}, at least {} needed.",
                    metric, category, n, noun, required
                ),
                actionable: false,
                magnitude: MagnitudeBucket::Negligible,
                direction: CorrelationDirection::None,
                strength: None,
            },
            CorrelationOutcome::ZeroVariance => Insight {
                correlation_result_id: result.id.clone(),
                text: format!(
                    "Either {} or {} spending stayed flat across {} {}, so no relationship can be measured.",
                    metric, category, n, noun
                ),
                actionable: false,
                magnitude: MagnitudeBucket::Negligible,
                direction: CorrelationDirection::None,
                strength: None,
            },
            CorrelationOutcome::Correlated(stats) => {
                let magnitude = self.magnitude(stats.strength);
                let actionable = stats.strength.abs() > self.config.min_strength
                    && stats.p_value < self.config.significance
                    && n > self.config.min_sample_size;

                let mut text = match stats.direction {
                    CorrelationDirection::None => format!(
                        "No meaningful relationship between {} and {} spending across {} {} (r = {:.2}).",
                        metric, category, n, noun, stats.strength
                    ),
                    direction => format!(
                        "{} with higher {} tend to have {} {} spending ({} {} correlation, r = {:.2}).",
                        capitalize(noun),
                        metric,
                        if direction == CorrelationDirection::Positive {
                            "higher"
                        } else {
                            "lower"
                        },
                        category,
                        magnitude,
                        direction,
                        stats.strength
                    ),
                };

                if actionable {
                    text.push_str(&format!(
                        " The pattern holds across {} {} and is statistically significant (p = {:.3}).",
                        n, noun, stats.p_value
                    ));
                } else if stats.direction != CorrelationDirection::None {
                    text.push_str(" Not yet strong or consistent enough to act on.");
                }

                Insight {
                    correlation_result_id: result.id.clone(),
                    text,
                    actionable,
                    magnitude,
                    direction: stats.direction,
                    strength: Some(stats.strength),
                }
            }
        }
    }

    /// Insights for every result, actionable first, then by descending |r|
    pub fn generate_all(&self, results: &[CorrelationResult]) -> Vec<Insight> {
        let mut insights: Vec<Insight> = results.iter().map(|r| self.generate(r)).collect();

        insights.sort_by(|a, b| {
            b.actionable.cmp(&a.actionable).then_with(|| {
                let sa = a.strength.map(f64::abs).unwrap_or(-1.0);
                let sb = b.strength.map(f64::abs).unwrap_or(-1.0);
                sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
            })
        });

        insights
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::types::{AnalysisRequest, CorrelationStats};
    use crate::models::Period;

    fn correlated(strength: f64, p_value: f64, n: usize, category: &str) -> CorrelationResult {
        let request = AnalysisRequest::new("health_score", category, Period::Weekly);
        let direction = if strength.abs() <= 0.1 {
            CorrelationDirection::None
        } else if strength > 0.0 {
            CorrelationDirection::Positive
        } else {
            CorrelationDirection::Negative
        };
        CorrelationResult {
            id: request.result_id(),
            metric: request.metric,
            category: request.category,
            period: request.period,
            sample_size: n,
            outcome: CorrelationOutcome::Correlated(CorrelationStats {
                strength,
                direction,
                p_value,
                confidence_interval: None,
            }),
        }
    }

    #[test]
    fn test_magnitude_buckets() {
        let gen = InsightGenerator::new();
        assert_eq!(gen.magnitude(0.05), MagnitudeBucket::Negligible);
        assert_eq!(gen.magnitude(-0.1), MagnitudeBucket::Weak);
        assert_eq!(gen.magnitude(0.29), MagnitudeBucket::Weak);
        assert_eq!(gen.magnitude(-0.3), MagnitudeBucket::Moderate);
        assert_eq!(gen.magnitude(0.5), MagnitudeBucket::Strong);
        assert_eq!(gen.magnitude(-0.95), MagnitudeBucket::Strong);
    }

    #[test]
    fn test_actionable_requires_all_gates() {
        let gen = InsightGenerator::new();

        let insight = gen.generate(&correlated(-0.62, 0.01, 12, "Dining"));
        assert!(insight.actionable);
        assert_eq!(insight.magnitude, MagnitudeBucket::Strong);
        assert!(insight.text.starts_with("Weeks with higher health score tend to have lower Dining spending"));
        assert!(insight.text.contains("statistically significant"));

        // each gate failing on its own
        assert!(!gen.generate(&correlated(-0.25, 0.01, 12, "Dining")).actionable);
        assert!(!gen.generate(&correlated(-0.62, 0.05, 12, "Dining")).actionable);
        assert!(!gen.generate(&correlated(-0.62, 0.01, 9, "Dining")).actionable);
    }

    #[test]
    fn test_gates_exclude_their_thresholds() {
        let gen = InsightGenerator::new();

        assert!(!gen.generate(&correlated(0.3, 0.01, 12, "Dining")).actionable);
        assert!(!gen.generate(&correlated(-0.3, 0.01, 12, "Dining")).actionable);
        assert!(!gen.generate(&correlated(0.62, 0.01, 10, "Dining")).actionable);

        assert!(gen.generate(&correlated(0.31, 0.01, 11, "Dining")).actionable);
    }

    #[test]
    fn test_insufficient_sample_text() {
        let result = CorrelationResult {
            id: "correlation:mood:dining:daily".into(),
            metric: "mood".into(),
            category: "Dining".into(),
            period: Period::Daily,
            sample_size: 2,
            outcome: CorrelationOutcome::InsufficientSample { required: 3 },
        };

        let insight = InsightGenerator::new().generate(&result);
        assert!(!insight.actionable);
        assert_eq!(insight.magnitude, MagnitudeBucket::Negligible);
        assert_eq!(
            insight.text,
            "Not enough data to relate mood to Dining spending yet: 2 overlapping days, at least 3 needed."
        );
        assert_eq!(insight.correlation_result_id, result.id);
    }

    #[test]
    fn test_zero_variance_is_explained() {
        let result = CorrelationResult {
            outcome: CorrelationOutcome::ZeroVariance,
            ..correlated(0.0, 1.0, 6, "Travel")
        };
        let insight = InsightGenerator::new().generate(&result);
        assert!(!insight.actionable);
        assert!(insight.text.contains("stayed flat across 6 weeks"));
    }

    #[test]
    fn test_no_direction_text() {
        let insight = InsightGenerator::new().generate(&correlated(0.04, 0.8, 20, "Groceries"));
        assert!(!insight.actionable);
        assert!(insight.text.starts_with("No meaningful relationship"));
        assert!(insight.text.contains("r = 0.04"));
    }

    #[test]
    fn test_generate_all_ranks_actionable_first() {
        let results = vec![
            correlated(0.9, 0.2, 5, "Travel"),
            correlated(0.45, 0.001, 30, "Dining"),
            correlated(-0.7, 0.0001, 30, "Takeout"),
            CorrelationResult {
                outcome: CorrelationOutcome::InsufficientSample { required: 3 },
                ..correlated(0.0, 1.0, 1, "Gifts")
            },
        ];

        let insights = InsightGenerator::new().generate_all(&results);
        let order: Vec<_> = insights
            .iter()
            .map(|i| i.correlation_result_id.as_str())
            .collect();
        assert_eq!(
            order,
            vec![
                "correlation:health_score:takeout:weekly",
                "correlation:health_score:dining:weekly",
                "correlation:health_score:travel:weekly",
                "correlation:health_score:gifts:weekly",
            ]
        );
    }
}
