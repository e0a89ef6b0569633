//! Background forecast recomputation
//!
//! Forecasts are pure CPU work, so jobs run on tokio's blocking pool and
//! report back through a [`ForecastHandle`]. Each job gets a deadline from
//! [`ProjectionConfig::job_timeout`](crate::forecast::ProjectionConfig) and
//! writes its ledger into the shared [`ForecastCache`].

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::ForecastCache;
use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::forecast::{CashFlowProjector, Ledger, ProjectionRequest};
use crate::models::RecurringObligation;

/// A running forecast job
pub struct ForecastHandle {
    user_id: String,
    cancel: CancellationToken,
    task: JoinHandle<Result<Arc<Ledger>>>,
}

impl ForecastHandle {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Ask the job to stop; `join` then returns `Cancelled`
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the ledger
    pub async fn join(self) -> Result<Arc<Ledger>> {
        self.task
            .await
            .map_err(|e| Error::Job(format!("Forecast task for {} failed: {}", self.user_id, e)))?
    }
}

/// Spawns forecast jobs against a shared projector and cache
#[derive(Clone)]
pub struct ForecastJobs {
    projector: Arc<CashFlowProjector>,
    cache: Arc<ForecastCache>,
}

impl ForecastJobs {
    pub fn new(projector: Arc<CashFlowProjector>, cache: Arc<ForecastCache>) -> Self {
        Self { projector, cache }
    }

    pub fn cache(&self) -> &Arc<ForecastCache> {
        &self.cache
    }

    /// Start a forecast with the configured job deadline
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        &self,
        user_id: impl Into<String>,
        request: ProjectionRequest,
        obligations: Vec<RecurringObligation>,
    ) -> ForecastHandle {
        let token = CancellationToken::with_timeout(self.projector.config().job_timeout);
        self.spawn_with_token(user_id, request, obligations, token)
    }

    /// Start a forecast governed by a caller-supplied token
    pub fn spawn_with_token(
        &self,
        user_id: impl Into<String>,
        request: ProjectionRequest,
        obligations: Vec<RecurringObligation>,
        cancel: CancellationToken,
    ) -> ForecastHandle {
        let user_id = user_id.into();
        let projector = Arc::clone(&self.projector);
        let cache = Arc::clone(&self.cache);
        let token = cancel.clone();
        let job_user = user_id.clone();

        info!(
            user_id = %user_id,
            start = %request.start_date,
            horizon_days = request.horizon_days,
            obligations = obligations.len(),
            "Starting forecast job"
        );

        let task = tokio::task::spawn_blocking(move || {
            let started = Instant::now();
            let result =
                cache.get_or_project(&job_user, &request, &obligations, &projector, &token);

            match &result {
                Ok(ledger) => info!(
                    user_id = %job_user,
                    final_balance = %ledger.final_balance(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Forecast job complete"
                ),
                Err(e) => warn!(user_id = %job_user, error = %e, "Forecast job failed"),
            }
            result
        });

        ForecastHandle {
            user_id,
            cancel,
            task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::ProjectionConfig;
    use crate::models::{Direction, Frequency};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::time::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn obligations() -> Vec<RecurringObligation> {
        vec![
            RecurringObligation::new(
                "salary",
                Direction::Income,
                Decimal::new(3000, 0),
                Frequency::Monthly,
                date(2026, 1, 1),
            ),
            RecurringObligation::new(
                "rent",
                Direction::Expense,
                Decimal::new(1200, 0),
                Frequency::Monthly,
                date(2026, 1, 1),
            ),
        ]
    }

    fn request() -> ProjectionRequest {
        ProjectionRequest::new(Decimal::new(500, 0), date(2026, 3, 1), 60)
    }

    fn jobs(config: ProjectionConfig) -> ForecastJobs {
        ForecastJobs::new(
            Arc::new(CashFlowProjector::with_config(config)),
            Arc::new(ForecastCache::default()),
        )
    }

    #[tokio::test]
    async fn test_job_produces_ledger_and_fills_cache() {
        let jobs = jobs(ProjectionConfig::default());

        let handle = jobs.spawn("u1", request(), obligations());
        assert_eq!(handle.user_id(), "u1");
        let ledger = handle.join().await.unwrap();

        assert_eq!(ledger.final_balance(), Decimal::new(4100, 0));
        assert_eq!(jobs.cache().len().unwrap(), 1);

        // second run is served from the cache
        let again = jobs.spawn("u1", request(), obligations()).join().await.unwrap();
        assert!(Arc::ptr_eq(&ledger, &again));
    }

    #[tokio::test]
    async fn test_cancelled_job_returns_no_ledger() {
        let jobs = jobs(ProjectionConfig::default());
        let token = CancellationToken::new();
        token.cancel();

        let result = jobs
            .spawn_with_token("u1", request(), obligations(), token)
            .join()
            .await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(jobs.cache().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_job_deadline() {
        let jobs = jobs(ProjectionConfig {
            job_timeout: Duration::ZERO,
            ..Default::default()
        });

        let result = jobs.spawn("u1", request(), obligations()).join().await;
        assert!(matches!(result, Err(Error::Timeout(_))));
    }

    #[tokio::test]
    async fn test_handle_cancel_trips_shared_token() {
        let jobs = jobs(ProjectionConfig::default());
        let token = CancellationToken::new();
        let handle = jobs.spawn_with_token("u1", request(), obligations(), token.clone());

        handle.cancel();
        assert!(token.is_cancelled());
        // the job may or may not have finished before the cancel landed
        match handle.join().await {
            Ok(ledger) => assert!(ledger.is_consistent()),
            Err(e) => assert!(matches!(e, Error::Cancelled)),
        }
    }

    #[tokio::test]
    async fn test_invalid_request_surfaces_error() {
        let jobs = jobs(ProjectionConfig::default());
        let bad = ProjectionRequest::new(Decimal::new(500, 0), date(2026, 3, 1), 0);

        let result = jobs.spawn("u1", bad, obligations()).join().await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
