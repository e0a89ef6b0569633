//! Core types for correlation analysis and insights

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Period;

/// What to correlate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Metric name as found in the sample series (e.g. "health_score")
    pub metric: String,
    /// Spending category, matched case-insensitively
    pub category: String,
    pub period: Period,
}

impl AnalysisRequest {
    pub fn new(metric: impl Into<String>, category: impl Into<String>, period: Period) -> Self {
        Self {
            metric: metric.into(),
            category: category.into(),
            period,
        }
    }

    /// Stable identifier for results produced from this request
    pub fn result_id(&self) -> String {
        format!(
            "correlation:{}:{}:{}",
            self.metric,
            self.category.to_lowercase(),
            self.period.as_str()
        )
    }
}

/// Sign of a correlation, after the noise floor is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationDirection {
    Positive,
    Negative,
    /// |r| at or below the noise floor
    None,
}

impl CorrelationDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::None => "none",
        }
    }
}

impl fmt::Display for CorrelationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CorrelationDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "none" => Ok(Self::None),
            _ => Err(format!("Unknown correlation direction: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    /// e.g. 0.95
    pub level: f64,
}

impl ConfidenceInterval {
    pub fn contains(&self, value: f64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }
}

/// Statistics for a computed correlation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationStats {
    /// Pearson r in [-1, 1]
    pub strength: f64,
    pub direction: CorrelationDirection,
    /// Two-tailed, H0: r = 0
    pub p_value: f64,
    /// Absent with exactly three points (Fisher z needs n > 3)
    pub confidence_interval: Option<ConfidenceInterval>,
}

/// What the analysis was able to conclude
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorrelationOutcome {
    Correlated(CorrelationStats),
    /// Fewer overlapping buckets than the minimum sample size
    InsufficientSample { required: usize },
    /// One of the aligned series never changed
    ZeroVariance,
}

/// Result of correlating one metric with one spending category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub id: String,
    pub metric: String,
    pub category: String,
    pub period: Period,
    /// Number of overlapping buckets
    pub sample_size: usize,
    pub outcome: CorrelationOutcome,
}

impl CorrelationResult {
    pub fn stats(&self) -> Option<&CorrelationStats> {
        match &self.outcome {
            CorrelationOutcome::Correlated(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn strength(&self) -> Option<f64> {
        self.stats().map(|s| s.strength)
    }

    pub fn p_value(&self) -> Option<f64> {
        self.stats().map(|s| s.p_value)
    }

    pub fn direction(&self) -> CorrelationDirection {
        self.stats()
            .map(|s| s.direction)
            .unwrap_or(CorrelationDirection::None)
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self.outcome, CorrelationOutcome::InsufficientSample { .. })
    }
}

/// Coarse size of |r| used in insight text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeBucket {
    Negligible,
    Weak,
    Moderate,
    Strong,
}

impl MagnitudeBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negligible => "negligible",
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        }
    }
}

impl fmt::Display for MagnitudeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A human-readable statement about a correlation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub correlation_result_id: String,
    pub text: String,
    /// All three gates (magnitude, significance, sample size) passed
    pub actionable: bool,
    pub magnitude: MagnitudeBucket,
    pub direction: CorrelationDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
}
