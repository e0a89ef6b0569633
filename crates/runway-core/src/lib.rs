//! Runway Core Library
//!
//! Forecasting and wellness analytics for personal finances:
//! - Schedule resolution for recurring income and expenses
//! - Day-by-day cash flow projection with exact decimal money
//! - Composite health scores from wellness checkins
//! - Correlation analysis between wellness metrics and spending
//! - Gated, human-readable insights from correlation results
//! - Explicit forecast cache and background forecast jobs
//! - CSV snapshot import and layered engine configuration

pub mod cache;
pub mod cancel;
pub mod config;
pub mod error;
pub mod forecast;
pub mod health;
pub mod import;
pub mod insights;
pub mod jobs;
pub mod models;
pub mod schedule;
pub mod stats;

pub use cache::{CacheConfig, CacheKey, ForecastCache};
pub use cancel::CancellationToken;
pub use config::{ConfigSource, EngineConfig};
pub use error::{Error, Result};
pub use forecast::{CashFlowProjector, Ledger, LedgerSummary, ProjectionConfig, ProjectionRequest};
pub use health::{HealthScore, HealthScoreCalculator, HealthScoreConfig, HEALTH_SCORE_METRIC};
pub use insights::{
    AnalysisRequest, CorrelationAnalyzer, CorrelationConfig, CorrelationDirection,
    CorrelationOutcome, CorrelationResult, Insight, InsightConfig, InsightGenerator,
    MagnitudeBucket,
};
pub use jobs::{ForecastHandle, ForecastJobs};
pub use models::{
    Anchor, DailyLedgerEntry, Direction, Frequency, HealthCheckin, HealthMetricSample, Money,
    Period, RecurringObligation, ScheduledOccurrence, SpendingObservation,
};
pub use schedule::ScheduleResolver;
