//! Cash flow projection
//!
//! Builds a day-by-day balance ledger from a snapshot of recurring
//! obligations. All obligations are resolved once over the horizon, bucketed
//! by day offset, then accumulated in a single linear pass, so the cost is
//! O(horizon_days + occurrences) regardless of how many obligations there are.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use runway_core::forecast::CashFlowProjector;
//!
//! let projector = CashFlowProjector::new();
//! let ledger = projector.project(balance, &obligations, today, 90)?;
//! println!("Balance in 90 days: {}", ledger.final_balance());
//! ```

use std::collections::HashSet;
use std::time::{Duration as StdDuration, Instant};

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::models::{DailyLedgerEntry, Money, RecurringObligation, ScheduledOccurrence};
use crate::schedule::ScheduleResolver;

/// How many ledger days are processed between cancellation checks
const CANCEL_CHECK_INTERVAL: usize = 32;

/// Ceiling for `max_abs_amount`
///
/// Keeps a full horizon of daily sums well inside `Decimal`'s range.
pub const MAX_AMOUNT_CEILING: i64 = 1_000_000_000_000_000;

/// Projection limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Longest horizon accepted
    pub max_horizon_days: u32,
    /// Largest absolute amount accepted for balances and obligations
    pub max_abs_amount: Money,
    /// Budget for background projection jobs
    pub job_timeout: StdDuration,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            max_horizon_days: 3660,
            max_abs_amount: Decimal::from(1_000_000_000i64),
            job_timeout: StdDuration::from_secs(5),
        }
    }
}

/// A projection request as supplied by an external collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRequest {
    /// Missing balances are rejected rather than defaulted to zero
    pub initial_balance: Option<Money>,
    pub start_date: NaiveDate,
    pub horizon_days: u32,
}

impl ProjectionRequest {
    pub fn new(initial_balance: Money, start_date: NaiveDate, horizon_days: u32) -> Self {
        Self {
            initial_balance: Some(initial_balance),
            start_date,
            horizon_days,
        }
    }
}

/// The projected ledger plus the occurrences that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub start_date: NaiveDate,
    pub initial_balance: Money,
    pub entries: Vec<DailyLedgerEntry>,
    /// Every occurrence inside the horizon, ascending by date
    pub occurrences: Vec<ScheduledOccurrence>,
}

/// Headline numbers for a ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub horizon_days: usize,
    pub final_balance: Money,
    pub lowest_balance: Money,
    /// None when the balance never drops below the initial balance
    pub lowest_balance_date: Option<NaiveDate>,
    /// First day closing below zero
    pub first_shortfall: Option<NaiveDate>,
    pub total_income: Money,
    /// Positive total of all expenses
    pub total_expense: Money,
    pub occurrence_count: usize,
}

impl Ledger {
    pub fn horizon_days(&self) -> usize {
        self.entries.len()
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.entries.last().map(|e| e.date)
    }

    /// Closing balance of the last day (the initial balance for an empty ledger)
    pub fn final_balance(&self) -> Money {
        self.entries
            .last()
            .map(|e| e.closing_balance)
            .unwrap_or(self.initial_balance)
    }

    pub fn entry_for(&self, date: NaiveDate) -> Option<&DailyLedgerEntry> {
        let offset = (date - self.start_date).num_days();
        if offset < 0 {
            return None;
        }
        self.entries.get(offset as usize)
    }

    /// Check the opening/closing chaining invariants
    pub fn is_consistent(&self) -> bool {
        let mut expected_opening = self.initial_balance;
        for entry in &self.entries {
            if entry.opening_balance != expected_opening
                || entry.closing_balance != entry.opening_balance + entry.net_change
            {
                return false;
            }
            expected_opening = entry.closing_balance;
        }
        true
    }

    pub fn summary(&self) -> LedgerSummary {
        let mut lowest_balance = self.initial_balance;
        let mut lowest_balance_date = None;
        for entry in &self.entries {
            if entry.closing_balance < lowest_balance {
                lowest_balance = entry.closing_balance;
                lowest_balance_date = Some(entry.date);
            }
        }

        let first_shortfall = self
            .entries
            .iter()
            .find(|e| e.closing_balance < Decimal::ZERO)
            .map(|e| e.date);

        let total_income: Money = self
            .occurrences
            .iter()
            .filter(|o| o.signed_amount > Decimal::ZERO)
            .map(|o| o.signed_amount)
            .sum();
        let total_expense: Money = self
            .occurrences
            .iter()
            .filter(|o| o.signed_amount < Decimal::ZERO)
            .map(|o| -o.signed_amount)
            .sum();

        LedgerSummary {
            horizon_days: self.entries.len(),
            final_balance: self.final_balance(),
            lowest_balance,
            lowest_balance_date,
            first_shortfall,
            total_income,
            total_expense,
            occurrence_count: self.occurrences.len(),
        }
    }
}

/// Projects balances forward from a snapshot of obligations
pub struct CashFlowProjector {
    resolver: ScheduleResolver,
    config: ProjectionConfig,
}

impl Default for CashFlowProjector {
    fn default() -> Self {
        Self::new()
    }
}

impl CashFlowProjector {
    pub fn new() -> Self {
        Self::with_config(ProjectionConfig::default())
    }

    pub fn with_config(config: ProjectionConfig) -> Self {
        Self {
            resolver: ScheduleResolver::new(),
            config,
        }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project `horizon_days` days starting at `start_date`
    pub fn project(
        &self,
        initial_balance: Money,
        obligations: &[RecurringObligation],
        start_date: NaiveDate,
        horizon_days: u32,
    ) -> Result<Ledger> {
        self.project_with_cancel(
            initial_balance,
            obligations,
            start_date,
            horizon_days,
            &CancellationToken::new(),
        )
    }

    /// Project from a collaborator-supplied request
    pub fn project_request(
        &self,
        request: &ProjectionRequest,
        obligations: &[RecurringObligation],
        cancel: &CancellationToken,
    ) -> Result<Ledger> {
        self.project_with_cancel(
            required_balance(request)?,
            obligations,
            request.start_date,
            request.horizon_days,
            cancel,
        )
    }

    /// Check a request against this projector's limits without projecting
    pub fn validate_request(
        &self,
        request: &ProjectionRequest,
        obligations: &[RecurringObligation],
    ) -> Result<()> {
        self.validate_amount("Initial balance", required_balance(request)?)?;
        self.validate_horizon(request.start_date, request.horizon_days)?;
        self.validate_obligations(obligations)
    }

    /// Project with a cancellation token polled during the run
    ///
    /// A tripped token yields `Cancelled`/`Timeout` and no ledger.
    pub fn project_with_cancel(
        &self,
        initial_balance: Money,
        obligations: &[RecurringObligation],
        start_date: NaiveDate,
        horizon_days: u32,
        cancel: &CancellationToken,
    ) -> Result<Ledger> {
        let started = Instant::now();

        self.validate_amount("Initial balance", initial_balance)?;
        let end_date = self.validate_horizon(start_date, horizon_days)?;
        self.validate_obligations(obligations)?;

        let occurrences = self.resolve_window(obligations, start_date, end_date, cancel)?;
        let entries = accumulate(
            start_date,
            horizon_days as usize,
            initial_balance,
            &occurrences,
            cancel,
        )?;

        let ledger = Ledger {
            start_date,
            initial_balance,
            entries,
            occurrences,
        };

        debug!(
            start = %start_date,
            horizon_days,
            obligations = obligations.len(),
            occurrences = ledger.occurrences.len(),
            final_balance = %ledger.final_balance(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "Projection complete"
        );

        Ok(ledger)
    }

    /// Re-project a ledger after the obligation set changed
    ///
    /// Entries dated before `settled_before` are settled facts and are copied
    /// unchanged; only the remaining days are recomputed, opening from the
    /// last settled closing balance.
    pub fn reproject(
        &self,
        previous: &Ledger,
        obligations: &[RecurringObligation],
        settled_before: NaiveDate,
    ) -> Result<Ledger> {
        self.reproject_with_cancel(
            previous,
            obligations,
            settled_before,
            &CancellationToken::new(),
        )
    }

    pub fn reproject_with_cancel(
        &self,
        previous: &Ledger,
        obligations: &[RecurringObligation],
        settled_before: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Ledger> {
        let horizon = previous.entries.len();
        let settled = (settled_before - previous.start_date).num_days();

        if settled <= 0 {
            return self.project_with_cancel(
                previous.initial_balance,
                obligations,
                previous.start_date,
                horizon as u32,
                cancel,
            );
        }

        let settled = (settled as usize).min(horizon);
        if settled == horizon {
            return Ok(previous.clone());
        }

        self.validate_amount("Initial balance", previous.initial_balance)?;
        self.validate_obligations(obligations)?;

        let resume_date = previous.entries[settled].date;
        let end_date = previous.entries[horizon - 1].date;
        let opening = previous.entries[settled - 1].closing_balance;
        self.validate_amount("Settled closing balance", opening)?;

        let fresh = self.resolve_window(obligations, resume_date, end_date, cancel)?;
        let tail = accumulate(resume_date, horizon - settled, opening, &fresh, cancel)?;

        let mut entries = previous.entries[..settled].to_vec();
        entries.extend(tail);

        let mut occurrences: Vec<ScheduledOccurrence> = previous
            .occurrences
            .iter()
            .filter(|o| o.date < resume_date)
            .cloned()
            .collect();
        occurrences.extend(fresh);

        debug!(
            settled_days = settled,
            recomputed_days = horizon - settled,
            "Re-projection complete"
        );

        Ok(Ledger {
            start_date: previous.start_date,
            initial_balance: previous.initial_balance,
            entries,
            occurrences,
        })
    }

    /// Resolve every obligation once and merge into one date-ordered list
    fn resolve_window(
        &self,
        obligations: &[RecurringObligation],
        start: NaiveDate,
        end: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Vec<ScheduledOccurrence>> {
        let mut occurrences = Vec::new();
        for obligation in obligations {
            cancel.check()?;
            occurrences.extend(self.resolver.resolve(obligation, start, end)?);
        }
        occurrences.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.obligation_id.cmp(&b.obligation_id))
        });
        Ok(occurrences)
    }

    fn validate_amount(&self, what: &str, amount: Money) -> Result<()> {
        if amount.abs() > self.config.max_abs_amount {
            warn!(what, %amount, "Rejected amount above limit");
            return Err(Error::InvalidInput(format!(
                "{} {} exceeds the limit of {}",
                what, amount, self.config.max_abs_amount
            )));
        }
        Ok(())
    }

    fn validate_horizon(&self, start_date: NaiveDate, horizon_days: u32) -> Result<NaiveDate> {
        if horizon_days == 0 || horizon_days > self.config.max_horizon_days {
            return Err(Error::InvalidInput(format!(
                "Horizon must be between 1 and {} days, got {}",
                self.config.max_horizon_days, horizon_days
            )));
        }
        start_date
            .checked_add_signed(Duration::days(horizon_days as i64 - 1))
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "Horizon of {} days from {} leaves the calendar",
                    horizon_days, start_date
                ))
            })
    }

    fn validate_obligations(&self, obligations: &[RecurringObligation]) -> Result<()> {
        let mut seen = HashSet::new();
        for obligation in obligations {
            if obligation.amount <= Decimal::ZERO {
                return Err(Error::InvalidInput(format!(
                    "Obligation {} must have a positive amount, got {}",
                    obligation.id, obligation.amount
                )));
            }
            self.validate_amount(&format!("Obligation {}", obligation.id), obligation.amount)?;

            if let Some(end) = obligation.end_date {
                if end < obligation.start_date {
                    return Err(Error::InvalidInput(format!(
                        "Obligation {} ends ({}) before it starts ({})",
                        obligation.id, end, obligation.start_date
                    )));
                }
            }

            if !seen.insert((obligation.id.as_str(), obligation.version)) {
                return Err(Error::InvalidInput(format!(
                    "Obligation {} version {} appears more than once",
                    obligation.id, obligation.version
                )));
            }
        }
        Ok(())
    }
}

/// Bucket occurrences by day offset and carry the running balance
fn accumulate(
    start: NaiveDate,
    days: usize,
    opening: Money,
    occurrences: &[ScheduledOccurrence],
    cancel: &CancellationToken,
) -> Result<Vec<DailyLedgerEntry>> {
    let mut buckets: Vec<(Money, Vec<String>)> = vec![(Decimal::ZERO, Vec::new()); days];
    for occurrence in occurrences {
        let offset = (occurrence.date - start).num_days();
        if offset < 0 {
            continue;
        }
        if let Some((net, ids)) = buckets.get_mut(offset as usize) {
            *net = net
                .checked_add(occurrence.signed_amount)
                .ok_or_else(|| overflow(occurrence.date))?;
            ids.push(occurrence.obligation_id.clone());
        }
    }

    let mut balance = opening;
    let mut entries = Vec::with_capacity(days);
    for (offset, (net_change, ids)) in buckets.into_iter().enumerate() {
        if offset % CANCEL_CHECK_INTERVAL == 0 {
            cancel.check()?;
        }
        let date = start + Duration::days(offset as i64);
        let closing_balance = balance
            .checked_add(net_change)
            .ok_or_else(|| overflow(date))?;
        entries.push(DailyLedgerEntry {
            date,
            opening_balance: balance,
            net_change,
            closing_balance,
            contributing_occurrence_ids: ids,
        });
        balance = closing_balance;
    }
    Ok(entries)
}

fn required_balance(request: &ProjectionRequest) -> Result<Money> {
    request
        .initial_balance
        .ok_or_else(|| Error::InvalidInput("Initial balance is missing".into()))
}

fn overflow(date: NaiveDate) -> Error {
    Error::InvalidInput(format!("Balance on {} is outside the representable range", date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Anchor, Direction, Frequency};
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dollars(n: i64) -> Money {
        Decimal::from(n)
    }

    fn monthly(id: &str, direction: Direction, amount: i64, start: NaiveDate) -> RecurringObligation {
        RecurringObligation::new(id, direction, dollars(amount), Frequency::Monthly, start)
    }

    fn mixed_obligations() -> Vec<RecurringObligation> {
        vec![
            monthly("salary", Direction::Income, 3000, date(2026, 1, 1)),
            monthly("rent", Direction::Expense, 1200, date(2026, 1, 1)),
            RecurringObligation::new(
                "groceries",
                Direction::Expense,
                Decimal::new(8733, 2),
                Frequency::Weekly,
                date(2026, 1, 3),
            ),
            RecurringObligation::new(
                "side-gig",
                Direction::Income,
                Decimal::new(41050, 2),
                Frequency::Biweekly,
                date(2026, 1, 9),
            ),
            RecurringObligation::new(
                "insurance",
                Direction::Expense,
                Decimal::new(31999, 2),
                Frequency::Quarterly,
                date(2026, 1, 31),
            ),
            RecurringObligation::new(
                "domain",
                Direction::Expense,
                Decimal::new(1299, 2),
                Frequency::Annual,
                date(2026, 6, 15),
            ),
        ]
    }

    #[test]
    fn test_no_obligations_no_drift() {
        let projector = CashFlowProjector::new();
        let initial = Decimal::new(123456, 2);
        for horizon in [1u32, 2, 31, 200, 365] {
            let ledger = projector
                .project(initial, &[], date(2026, 1, 1), horizon)
                .unwrap();
            assert_eq!(ledger.entries.len(), horizon as usize);
            assert!(ledger.entries.iter().all(|e| e.closing_balance == initial));
        }
    }

    #[test]
    fn test_income_and_rent_scenario() {
        let obligations = vec![
            monthly("salary", Direction::Income, 3000, date(2026, 1, 1)),
            monthly("rent", Direction::Expense, 1200, date(2026, 1, 1)),
        ];

        // March 1 + 60 days covers March 1 and April 1 only
        let ledger = CashFlowProjector::new()
            .project(dollars(500), &obligations, date(2026, 3, 1), 60)
            .unwrap();

        let income = ledger
            .occurrences
            .iter()
            .filter(|o| o.obligation_id == "salary")
            .count();
        let expense = ledger
            .occurrences
            .iter()
            .filter(|o| o.obligation_id == "rent")
            .count();
        assert_eq!(income, 2);
        assert_eq!(expense, 2);
        assert_eq!(ledger.final_balance(), dollars(4100));

        let first = ledger.entry_for(date(2026, 3, 1)).unwrap();
        assert_eq!(first.net_change, dollars(1800));
        assert_eq!(first.contributing_occurrence_ids.len(), 2);
    }

    #[test]
    fn test_day_31_across_february() {
        let rent = monthly("rent", Direction::Expense, 100, date(2026, 1, 31));
        let ledger = CashFlowProjector::new()
            .project(dollars(1000), &[rent], date(2026, 1, 1), 90)
            .unwrap();

        // Jan, Feb, Mar spanned
        let dates: Vec<_> = ledger.occurrences.iter().map(|o| o.date).collect();
        assert_eq!(
            dates,
            vec![date(2026, 1, 31), date(2026, 2, 28), date(2026, 3, 31)]
        );
        assert_eq!(ledger.final_balance(), dollars(700));
    }

    #[test]
    fn test_splittable_projection() {
        let projector = CashFlowProjector::new();
        let obligations = mixed_obligations();
        let start = date(2026, 1, 1);
        let initial = Decimal::new(250075, 2);

        let whole = projector.project(initial, &obligations, start, 365).unwrap();
        let head = projector.project(initial, &obligations, start, 200).unwrap();
        let tail = projector
            .project(
                head.final_balance(),
                &obligations,
                start + Duration::days(200),
                165,
            )
            .unwrap();

        assert_eq!(tail.final_balance(), whole.final_balance());

        let mut joined = head.entries.clone();
        joined.extend(tail.entries.clone());
        assert_eq!(joined, whole.entries);
    }

    #[test]
    fn test_ledger_invariants_hold() {
        let ledger = CashFlowProjector::new()
            .project(dollars(0), &mixed_obligations(), date(2026, 1, 1), 365)
            .unwrap();
        assert!(ledger.is_consistent());
        for pair in ledger.entries.windows(2) {
            assert_eq!(pair[1].opening_balance, pair[0].closing_balance);
            assert_eq!(pair[1].date, pair[0].date + Duration::days(1));
        }
    }

    #[test]
    fn test_cents_do_not_drift() {
        let coffee = RecurringObligation::new(
            "coffee",
            Direction::Expense,
            Decimal::new(10, 2),
            Frequency::Weekly,
            date(2026, 1, 1),
        );
        // Many weekly dime expenses over ten years
        let ledger = CashFlowProjector::new()
            .project(dollars(0), &[coffee], date(2026, 1, 1), 3650)
            .unwrap();
        let expected = Decimal::new(-10, 2) * Decimal::from(ledger.occurrences.len() as i64);
        assert_eq!(ledger.final_balance(), expected);
    }

    #[test]
    fn test_invalid_inputs_fail_fast() {
        let projector = CashFlowProjector::new();
        let start = date(2026, 1, 1);

        assert!(matches!(
            projector.project(dollars(0), &[], start, 0),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            projector.project(dollars(0), &[], start, 100_000),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            projector.project(Decimal::from(10_000_000_000i64), &[], start, 10),
            Err(Error::InvalidInput(_))
        ));

        let negative = monthly("bad", Direction::Expense, -5, start);
        assert!(matches!(
            projector.project(dollars(0), &[negative], start, 10),
            Err(Error::InvalidInput(_))
        ));

        let backwards = monthly("bad", Direction::Expense, 5, start).with_end_date(date(2025, 1, 1));
        assert!(matches!(
            projector.project(dollars(0), &[backwards], start, 10),
            Err(Error::InvalidInput(_))
        ));

        let dup = monthly("dup", Direction::Expense, 5, start);
        assert!(matches!(
            projector.project(dollars(0), &[dup.clone(), dup], start, 10),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_missing_initial_balance() {
        let request = ProjectionRequest {
            initial_balance: None,
            start_date: date(2026, 1, 1),
            horizon_days: 30,
        };
        let err = CashFlowProjector::new()
            .project_request(&request, &[], &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_mismatched_anchor_rejected_before_ledger() {
        let weird = monthly("weird", Direction::Expense, 5, date(2026, 1, 1))
            .with_anchor(Anchor::Weekday(Weekday::Tue));
        let err = CashFlowProjector::new()
            .project(dollars(0), &[weird], date(2026, 1, 1), 30)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_cancelled_projection_returns_no_ledger() {
        let token = CancellationToken::new();
        token.cancel();
        let result = CashFlowProjector::new().project_with_cancel(
            dollars(0),
            &mixed_obligations(),
            date(2026, 1, 1),
            365,
            &token,
        );
        assert!(matches!(result, Err(Error::Cancelled)));

        let expired = CancellationToken::with_timeout(StdDuration::ZERO);
        let result = CashFlowProjector::new().project_with_cancel(
            dollars(0),
            &[],
            date(2026, 1, 1),
            365,
            &expired,
        );
        assert!(matches!(result, Err(Error::Timeout(_))));
    }

    #[test]
    fn test_reproject_keeps_settled_entries() {
        let projector = CashFlowProjector::new();
        let start = date(2026, 1, 1);
        let mut obligations = vec![monthly("salary", Direction::Income, 3000, start)];

        let original = projector.project(dollars(100), &obligations, start, 90).unwrap();

        // A new expense is added after January has settled; it started back in
        // January but settled days must not change
        obligations.push(monthly("gym", Direction::Expense, 50, date(2026, 1, 10)));
        let settled_before = date(2026, 2, 1);
        let updated = projector
            .reproject(&original, &obligations, settled_before)
            .unwrap();

        assert_eq!(updated.entries.len(), original.entries.len());
        assert_eq!(updated.entries[..31], original.entries[..31]);
        assert!(updated.is_consistent());

        // Gym lands Feb 10 and Mar 10 only
        let gym: Vec<_> = updated
            .occurrences
            .iter()
            .filter(|o| o.obligation_id == "gym")
            .map(|o| o.date)
            .collect();
        assert_eq!(gym, vec![date(2026, 2, 10), date(2026, 3, 10)]);
        assert_eq!(
            updated.final_balance(),
            original.final_balance() - dollars(100)
        );
    }

    #[test]
    fn test_reproject_rejects_out_of_range_previous_ledger() {
        let projector = CashFlowProjector::new();
        let start = date(2026, 1, 1);
        let obligations = vec![RecurringObligation::new(
            "bonus",
            Direction::Income,
            dollars(1_000_000_000),
            Frequency::Weekly,
            start,
        )];
        let original = projector.project(dollars(0), &obligations, start, 30).unwrap();

        let mut huge_closing = original.clone();
        for entry in &mut huge_closing.entries {
            entry.opening_balance = Decimal::MAX;
            entry.closing_balance = Decimal::MAX;
        }
        let result = projector.reproject(&huge_closing, &obligations, date(2026, 1, 10));
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let huge_initial = Ledger {
            initial_balance: Decimal::MAX,
            ..original
        };
        let result = projector.reproject(&huge_initial, &obligations, date(2026, 1, 10));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_overflowing_balance_is_an_error() {
        let projector = CashFlowProjector::with_config(ProjectionConfig {
            max_abs_amount: Decimal::MAX,
            ..ProjectionConfig::default()
        });
        let obligations = vec![RecurringObligation::new(
            "windfall",
            Direction::Income,
            Decimal::MAX,
            Frequency::Weekly,
            date(2026, 1, 1),
        )];

        let result = projector.project(Decimal::MAX, &obligations, date(2026, 1, 1), 30);
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        // two occurrences landing on one day overflow the daily net
        let twice = vec![
            obligations[0].clone(),
            RecurringObligation {
                id: "windfall-2".into(),
                ..obligations[0].clone()
            },
        ];
        let result = projector.project(dollars(0), &twice, date(2026, 1, 1), 30);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_reproject_edges() {
        let projector = CashFlowProjector::new();
        let start = date(2026, 1, 1);
        let obligations = vec![monthly("salary", Direction::Income, 3000, start)];
        let original = projector.project(dollars(0), &obligations, start, 30).unwrap();

        let everything_settled = projector
            .reproject(&original, &[], date(2026, 6, 1))
            .unwrap();
        assert_eq!(everything_settled, original);

        let nothing_settled = projector.reproject(&original, &[], start).unwrap();
        assert_eq!(nothing_settled.final_balance(), dollars(0));
    }

    #[test]
    fn test_summary() {
        let obligations = vec![
            monthly("rent", Direction::Expense, 1200, date(2026, 1, 5)),
            monthly("salary", Direction::Income, 1000, date(2026, 1, 20)),
        ];
        let ledger = CashFlowProjector::new()
            .project(dollars(500), &obligations, date(2026, 1, 1), 31)
            .unwrap();
        let summary = ledger.summary();

        assert_eq!(summary.first_shortfall, Some(date(2026, 1, 5)));
        assert_eq!(summary.lowest_balance, dollars(-700));
        assert_eq!(summary.lowest_balance_date, Some(date(2026, 1, 5)));
        assert_eq!(summary.total_income, dollars(1000));
        assert_eq!(summary.total_expense, dollars(1200));
        assert_eq!(summary.final_balance, dollars(300));
        assert_eq!(summary.occurrence_count, 2);
    }

    #[test]
    fn test_long_horizon_many_obligations_is_fast() {
        let start = date(2026, 1, 1);
        let obligations: Vec<_> = (0..60)
            .map(|i| {
                let frequency = Frequency::all()[i % Frequency::all().len()];
                RecurringObligation::new(
                    format!("o{}", i),
                    if i % 3 == 0 {
                        Direction::Income
                    } else {
                        Direction::Expense
                    },
                    Decimal::new(1000 + i as i64 * 37, 2),
                    frequency,
                    start + Duration::days(i as i64),
                )
            })
            .collect();

        let started = Instant::now();
        let ledger = CashFlowProjector::new()
            .project(dollars(10_000), &obligations, start, 365)
            .unwrap();
        assert!(started.elapsed() < StdDuration::from_secs(1));
        assert!(ledger.is_consistent());
    }
}
