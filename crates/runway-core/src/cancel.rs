//! Cooperative cancellation for long computations
//!
//! The projector polls a [`CancellationToken`] while it works. Tripping the
//! token (manually or by passing its deadline) makes the computation return
//! [`Error::Cancelled`] or [`Error::Timeout`] instead of a partial ledger.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<(Instant, Duration)>,
}

impl CancellationToken {
    /// A token that only trips when cancelled explicitly
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also trips once `budget` has elapsed from now
    pub fn with_timeout(budget: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some((Instant::now() + budget, budget)),
        }
    }

    /// Cancel every computation holding a clone of this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Err if the token was cancelled or its deadline has passed
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if let Some((deadline, budget)) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Error::Timeout(budget));
            }
        }
        Ok(())
    }
}
