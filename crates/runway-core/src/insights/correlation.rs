//! Correlation Analyzer
//!
//! Relates a wellness metric to spending in one category:
//! - Aligns both series into shared daily/weekly/monthly buckets
//! - Refuses to compute on fewer than `min_sample_size` overlapping buckets
//! - Reports Pearson r, a two-tailed p-value and a Fisher z interval

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::models::{HealthMetricSample, Period, SpendingObservation};
use crate::stats;

use super::types::{
    AnalysisRequest, ConfidenceInterval, CorrelationDirection, CorrelationOutcome,
    CorrelationResult, CorrelationStats,
};

/// Thresholds for the analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// Fewer overlapping buckets than this yields `InsufficientSample`
    pub min_sample_size: usize,
    /// |r| at or below this is reported with direction `none`
    pub direction_epsilon: f64,
    /// Confidence level of the reported interval
    pub confidence_level: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            min_sample_size: 3,
            direction_epsilon: 0.1,
            confidence_level: 0.95,
        }
    }
}

/// One aligned bucket: (bucket start, mean metric value, total spending)
pub type AlignedPoint = (NaiveDate, f64, f64);

pub struct CorrelationAnalyzer {
    config: CorrelationConfig,
}

impl Default for CorrelationAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrelationAnalyzer {
    pub fn new() -> Self {
        Self {
            config: CorrelationConfig::default(),
        }
    }

    pub fn with_config(config: CorrelationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CorrelationConfig {
        &self.config
    }

    /// Correlate `request.metric` with spending in `request.category`
    ///
    /// Too few overlapping buckets is an ordinary outcome, returned as
    /// `CorrelationOutcome::InsufficientSample`; errors are reserved for
    /// failures in the statistics themselves.
    pub fn analyze(
        &self,
        metric_series: &[HealthMetricSample],
        spending_series: &[SpendingObservation],
        request: &AnalysisRequest,
    ) -> Result<CorrelationResult> {
        let points = self.align(metric_series, spending_series, request);
        let sample_size = points.len();

        let outcome = if sample_size < self.config.min_sample_size.max(3) {
            CorrelationOutcome::InsufficientSample {
                required: self.config.min_sample_size.max(3),
            }
        } else {
            let metric: Vec<f64> = points.iter().map(|p| p.1).collect();
            let spending: Vec<f64> = points.iter().map(|p| p.2).collect();

            match stats::pearson(&metric, &spending) {
                Some(r) => CorrelationOutcome::Correlated(self.describe(r, sample_size)?),
                None => CorrelationOutcome::ZeroVariance,
            }
        };

        let strength = match &outcome {
            CorrelationOutcome::Correlated(s) => Some(s.strength),
            _ => None,
        };
        debug!(
            metric = request.metric.as_str(),
            category = request.category.as_str(),
            period = request.period.as_str(),
            sample_size,
            strength = ?strength,
            "Correlation analysis complete"
        );

        Ok(CorrelationResult {
            id: request.result_id(),
            metric: request.metric.clone(),
            category: request.category.clone(),
            period: request.period,
            sample_size,
            outcome,
        })
    }

    /// Analyze `metric` against every spending category in the snapshot
    ///
    /// Categories are matched case-insensitively; the first spelling seen is
    /// kept. Results are sorted by category name.
    pub fn analyze_categories(
        &self,
        metric_series: &[HealthMetricSample],
        spending_series: &[SpendingObservation],
        metric: &str,
        period: Period,
    ) -> Result<Vec<CorrelationResult>> {
        let mut categories: BTreeMap<String, String> = BTreeMap::new();
        for observation in spending_series {
            categories
                .entry(observation.category.to_lowercase())
                .or_insert_with(|| observation.category.clone());
        }

        categories
            .into_values()
            .map(|category| {
                let request = AnalysisRequest::new(metric, category, period);
                self.analyze(metric_series, spending_series, &request)
            })
            .collect()
    }

    /// Bucket both series and keep the buckets present in both
    ///
    /// Metric values are averaged per bucket; spending is summed.
    pub fn align(
        &self,
        metric_series: &[HealthMetricSample],
        spending_series: &[SpendingObservation],
        request: &AnalysisRequest,
    ) -> Vec<AlignedPoint> {
        let period = request.period;

        let mut metric_buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for sample in metric_series
            .iter()
            .filter(|s| s.metric_name == request.metric && s.value.is_finite())
        {
            let bucket = metric_buckets
                .entry(period.bucket_start(sample.date))
                .or_insert((0.0, 0));
            bucket.0 += sample.value;
            bucket.1 += 1;
        }

        let category = request.category.to_lowercase();
        let mut spending_buckets: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for observation in spending_series
            .iter()
            .filter(|o| o.category.to_lowercase() == category)
        {
            *spending_buckets
                .entry(period.bucket_start(observation.date))
                .or_insert(Decimal::ZERO) += observation.amount;
        }

        metric_buckets
            .into_iter()
            .filter_map(|(date, (sum, count))| {
                let spent = spending_buckets.get(&date)?.to_f64()?;
                Some((date, sum / count as f64, spent))
            })
            .collect()
    }

    fn describe(&self, r: f64, n: usize) -> Result<CorrelationStats> {
        let direction = if r.abs() <= self.config.direction_epsilon {
            CorrelationDirection::None
        } else if r > 0.0 {
            CorrelationDirection::Positive
        } else {
            CorrelationDirection::Negative
        };

        let p_value = stats::correlation_p_value(r, n)?;
        let confidence_interval = stats::fisher_interval(r, n, self.config.confidence_level)?
            .map(|(lower, upper)| ConfidenceInterval {
                lower,
                upper,
                level: self.config.confidence_level,
            });

        Ok(CorrelationStats {
            strength: r,
            direction,
            p_value,
            confidence_interval,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap() + Duration::days(offset)
    }

    fn metric(offset: i64, value: f64) -> HealthMetricSample {
        HealthMetricSample::new(day(offset), "health_score", value)
    }

    fn spend(offset: i64, category: &str, cents: i64) -> SpendingObservation {
        SpendingObservation {
            date: day(offset),
            category: category.to_string(),
            amount: Decimal::new(cents, 2),
        }
    }

    fn daily(category: &str) -> AnalysisRequest {
        AnalysisRequest::new("health_score", category, Period::Daily)
    }

    #[test]
    fn test_two_points_is_insufficient() {
        let metrics = vec![metric(0, 50.0), metric(1, 90.0)];
        let spending = vec![spend(0, "Dining", 1000), spend(1, "Dining", 9000)];

        let result = CorrelationAnalyzer::new()
            .analyze(&metrics, &spending, &daily("Dining"))
            .unwrap();

        assert_eq!(result.sample_size, 2);
        assert_eq!(
            result.outcome,
            CorrelationOutcome::InsufficientSample { required: 3 }
        );
        assert!(result.strength().is_none());
    }

    #[test]
    fn test_perfect_linear_relationship() {
        let metrics: Vec<_> = (0..8).map(|i| metric(i, 40.0 + i as f64 * 5.0)).collect();
        let spending: Vec<_> = (0..8)
            .map(|i| spend(i, "Dining", 2000 + i * 1500))
            .collect();

        let result = CorrelationAnalyzer::new()
            .analyze(&metrics, &spending, &daily("Dining"))
            .unwrap();

        let stats = result.stats().unwrap();
        assert!((stats.strength - 1.0).abs() < 1e-9);
        assert!(stats.p_value < 1e-9);
        assert_eq!(stats.direction, CorrelationDirection::Positive);
        assert!(stats.confidence_interval.is_some());
    }

    #[test]
    fn test_negative_correlation() {
        let metrics: Vec<_> = (0..6).map(|i| metric(i, 90.0 - i as f64 * 10.0)).collect();
        let spending: Vec<_> = [1000, 1800, 2500, 3900, 4100, 5600]
            .iter()
            .enumerate()
            .map(|(i, c)| spend(i as i64, "Takeout", *c))
            .collect();

        let result = CorrelationAnalyzer::new()
            .analyze(&metrics, &spending, &daily("takeout"))
            .unwrap();

        assert_eq!(result.direction(), CorrelationDirection::Negative);
        assert!(result.strength().unwrap() < -0.9);
    }

    #[test]
    fn test_near_zero_has_no_direction() {
        // symmetric around the mean of x, so r = 0
        let metrics: Vec<_> = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
            .iter()
            .enumerate()
            .map(|(i, v)| metric(i as i64, *v))
            .collect();
        let spending: Vec<_> = [500, 100, 300, 300, 100, 500]
            .iter()
            .enumerate()
            .map(|(i, c)| spend(i as i64, "Dining", *c))
            .collect();

        let result = CorrelationAnalyzer::new()
            .analyze(&metrics, &spending, &daily("Dining"))
            .unwrap();

        let stats = result.stats().unwrap();
        assert!(stats.strength.abs() <= 0.1);
        assert_eq!(stats.direction, CorrelationDirection::None);
    }

    #[test]
    fn test_constant_series_is_zero_variance() {
        let metrics: Vec<_> = (0..5).map(|i| metric(i, 70.0)).collect();
        let spending: Vec<_> = (0..5).map(|i| spend(i, "Dining", 1000 + i * 10)).collect();

        let result = CorrelationAnalyzer::new()
            .analyze(&metrics, &spending, &daily("Dining"))
            .unwrap();

        assert_eq!(result.outcome, CorrelationOutcome::ZeroVariance);
        assert_eq!(result.sample_size, 5);
    }

    #[test]
    fn test_weekly_alignment_averages_and_sums() {
        let analyzer = CorrelationAnalyzer::new();
        // day(0) is Monday 2026-01-05
        let metrics = vec![metric(0, 60.0), metric(2, 80.0), metric(7, 50.0), metric(21, 40.0)];
        let spending = vec![
            spend(1, "Dining", 1000),
            spend(3, "Dining", 2500),
            spend(8, "Dining", 700),
            spend(14, "Dining", 9900),
            spend(9, "Groceries", 5000),
        ];

        let points = analyzer.align(
            &metrics,
            &spending,
            &AnalysisRequest::new("health_score", "Dining", Period::Weekly),
        );

        assert_eq!(
            points,
            vec![(day(0), 70.0, 35.0), (day(7), 50.0, 7.0)]
        );
    }

    #[test]
    fn test_other_metrics_ignored() {
        let mut metrics: Vec<_> = (0..4).map(|i| metric(i, 50.0 + i as f64)).collect();
        metrics.push(HealthMetricSample::new(day(10), "mood", 3.0));
        let spending: Vec<_> = (0..11).map(|i| spend(i, "Dining", 100 * (i + 1))).collect();

        let result = CorrelationAnalyzer::new()
            .analyze(&metrics, &spending, &daily("Dining"))
            .unwrap();
        assert_eq!(result.sample_size, 4);
    }

    #[test]
    fn test_configured_minimum_sample() {
        let analyzer = CorrelationAnalyzer::with_config(CorrelationConfig {
            min_sample_size: 5,
            ..Default::default()
        });
        let metrics: Vec<_> = (0..4).map(|i| metric(i, i as f64)).collect();
        let spending: Vec<_> = (0..4).map(|i| spend(i, "Dining", 100 * i)).collect();

        let result = analyzer
            .analyze(&metrics, &spending, &daily("Dining"))
            .unwrap();
        assert_eq!(
            result.outcome,
            CorrelationOutcome::InsufficientSample { required: 5 }
        );
    }

    #[test]
    fn test_analyze_categories() {
        let metrics: Vec<_> = (0..5).map(|i| metric(i, 50.0 + i as f64 * 3.0)).collect();
        let mut spending: Vec<_> = (0..5).map(|i| spend(i, "Dining", 1000 + i * 200)).collect();
        spending.extend((0..5).map(|i| spend(i, "groceries", 9000 - i * 300)));
        spending.push(spend(0, "GROCERIES", 10));

        let results = CorrelationAnalyzer::new()
            .analyze_categories(&metrics, &spending, "health_score", Period::Daily)
            .unwrap();

        let categories: Vec<_> = results.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories, vec!["Dining", "groceries"]);
        assert_eq!(results[0].direction(), CorrelationDirection::Positive);
        assert_eq!(results[1].direction(), CorrelationDirection::Negative);
    }
}
