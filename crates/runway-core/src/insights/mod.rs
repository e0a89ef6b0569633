//! Wellness/Spending Insights
//!
//! The analytics path: health metric samples and spending observations are
//! aligned per period, correlated, and turned into short statements.
//!
//! ## Pieces
//!
//! - **Correlation Analyzer** - Pearson r, p-value and interval per category
//! - **Insight Generator** - Gated, human-readable insights from results
//!
//! ## Usage
//!
//! ```rust,ignore
//! use runway_core::insights::{AnalysisRequest, CorrelationAnalyzer, InsightGenerator};
//!
//! let request = AnalysisRequest::new("health_score", "Dining", Period::Weekly);
//! let result = CorrelationAnalyzer::new().analyze(&samples, &spending, &request)?;
//! let insight = InsightGenerator::new().generate(&result);
//! ```

pub mod correlation;
pub mod generator;
pub mod types;

pub use correlation::{AlignedPoint, CorrelationAnalyzer, CorrelationConfig};
pub use generator::{InsightConfig, InsightGenerator};
pub use types::{
    AnalysisRequest, ConfidenceInterval, CorrelationDirection, CorrelationOutcome,
    CorrelationResult, CorrelationStats, Insight, MagnitudeBucket,
};
