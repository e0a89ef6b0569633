//! Forecast memoization
//!
//! Ledgers are cached per `(user_id, input_hash)`, where the hash covers
//! the projection request and the obligation snapshot. Nothing is evicted
//! implicitly except the oldest entries once `max_entries` is reached;
//! invalidation is left to the caller.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::forecast::{CashFlowProjector, Ledger, ProjectionRequest};
use crate::models::RecurringObligation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 256 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub user_id: String,
    pub input_hash: String,
}

impl CacheKey {
    pub fn new(user_id: impl Into<String>, input_hash: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            input_hash: input_hash.into(),
        }
    }

    /// Key for a request and obligation snapshot
    pub fn for_inputs(
        user_id: impl Into<String>,
        request: &ProjectionRequest,
        obligations: &[RecurringObligation],
    ) -> Result<Self> {
        Ok(Self::new(user_id, input_hash(request, obligations)?))
    }
}

#[derive(Serialize)]
struct CanonicalInputs<'a> {
    request: &'a ProjectionRequest,
    obligations: Vec<RecurringObligation>,
}

/// SHA-256 (hex) over the canonical JSON of the projection inputs
///
/// Obligations are ordered by (id, version) and amounts normalized, so the
/// same snapshot hashes identically regardless of input order or scale
/// (`1200` and `1200.00`).
pub fn input_hash(request: &ProjectionRequest, obligations: &[RecurringObligation]) -> Result<String> {
    let mut canonical: Vec<RecurringObligation> = obligations
        .iter()
        .map(|o| RecurringObligation {
            amount: o.amount.normalize(),
            ..o.clone()
        })
        .collect();
    canonical.sort_by(|a, b| a.id.cmp(&b.id).then(a.version.cmp(&b.version)));

    let request = ProjectionRequest {
        initial_balance: request.initial_balance.map(|b| b.normalize()),
        ..request.clone()
    };

    let bytes = serde_json::to_vec(&CanonicalInputs {
        request: &request,
        obligations: canonical,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<CacheKey, Arc<Ledger>>,
    /// Insertion order, oldest first
    order: VecDeque<CacheKey>,
}

/// Bounded, explicitly invalidated ledger cache
///
/// Safe to share between threads; wrap in an `Arc`.
pub struct ForecastCache {
    config: CacheConfig,
    inner: RwLock<CacheInner>,
}

impl Default for ForecastCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl ForecastCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(CacheInner::default()),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Result<Option<Arc<Ledger>>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| Error::Cache("Failed to acquire cache read lock".into()))?;
        Ok(inner.entries.get(key).cloned())
    }

    pub fn insert(&self, key: CacheKey, ledger: Arc<Ledger>) -> Result<()> {
        let mut inner = self.write()?;

        if inner.entries.insert(key.clone(), ledger).is_none() {
            inner.order.push_back(key);
        }

        while inner.entries.len() > self.config.max_entries.max(1) {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
            debug!(user_id = %oldest.user_id, "Evicted cached forecast");
        }

        Ok(())
    }

    /// Remove one entry, returning whether it was present
    pub fn invalidate(&self, key: &CacheKey) -> Result<bool> {
        let mut inner = self.write()?;
        let removed = inner.entries.remove(key).is_some();
        if removed {
            inner.order.retain(|k| k != key);
        }
        Ok(removed)
    }

    /// Remove every entry for a user, returning how many were dropped
    pub fn invalidate_user(&self, user_id: &str) -> Result<usize> {
        let mut inner = self.write()?;
        let before = inner.entries.len();
        inner.entries.retain(|k, _| k.user_id != user_id);
        inner.order.retain(|k| k.user_id != user_id);
        Ok(before - inner.entries.len())
    }

    pub fn clear(&self) -> Result<()> {
        let mut inner = self.write()?;
        inner.entries.clear();
        inner.order.clear();
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        let inner = self
            .inner
            .read()
            .map_err(|_| Error::Cache("Failed to acquire cache read lock".into()))?;
        Ok(inner.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Return the cached ledger for these inputs, projecting on a miss
    ///
    /// The request is checked against `projector`'s limits first, so a hit
    /// never hands back a ledger that projector would have refused.
    pub fn get_or_project(
        &self,
        user_id: &str,
        request: &ProjectionRequest,
        obligations: &[RecurringObligation],
        projector: &CashFlowProjector,
        cancel: &CancellationToken,
    ) -> Result<Arc<Ledger>> {
        projector.validate_request(request, obligations)?;
        let key = CacheKey::for_inputs(user_id, request, obligations)?;

        if let Some(ledger) = self.get(&key)? {
            debug!(user_id, hash = %key.input_hash, "Forecast cache hit");
            return Ok(ledger);
        }

        let ledger = Arc::new(projector.project_request(request, obligations, cancel)?);
        self.insert(key, Arc::clone(&ledger))?;
        Ok(ledger)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, CacheInner>> {
        self.inner
            .write()
            .map_err(|_| Error::Cache("Failed to acquire cache write lock".into()))
    }
}
