//! Core data models shared by the forecast and analytics paths

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Monetary amount. Always fixed-point, never `f64`.
pub type Money = Decimal;

/// Convert a float coming from an external collaborator into money
///
/// Rejects NaN and infinities so they never reach the projector.
pub fn money_from_f64(value: f64) -> Result<Money> {
    if !value.is_finite() {
        return Err(Error::InvalidInput(format!(
            "Amount must be finite, got {}",
            value
        )));
    }
    Decimal::from_f64(value)
        .map(|d| d.round_dp(2))
        .ok_or_else(|| Error::InvalidInput(format!("Amount out of range: {}", value)))
}

/// Parse a money string, handling currency symbols, commas and accounting negatives
pub fn parse_money(s: &str) -> Result<Money> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    if cleaned.is_empty() {
        return Err(Error::InvalidInput("Amount is missing".into()));
    }

    cleaned
        .parse::<Decimal>()
        .map_err(|_| Error::InvalidInput(format!("Unable to parse amount: {}", s)))
}

// ========== Obligation Models ==========

/// Whether an obligation adds to or draws from the balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Income,
    Expense,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "credit" => Ok(Self::Income),
            "expense" | "debit" => Ok(Self::Expense),
            _ => Err(Error::InvalidInput(format!(
                "Unknown direction: {} (valid: income, expense)",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How often an obligation recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Annual,
}

/// Step between consecutive occurrences of a frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Fixed number of days, anchored on a weekday
    Days(i64),
    /// Calendar months, anchored on a day of month
    Months(u32),
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }

    pub fn cadence(&self) -> Cadence {
        match self {
            Self::Weekly => Cadence::Days(7),
            Self::Biweekly => Cadence::Days(14),
            Self::Monthly => Cadence::Months(1),
            Self::Quarterly => Cadence::Months(3),
            Self::Annual => Cadence::Months(12),
        }
    }

    /// Get all frequencies
    pub fn all() -> &'static [Frequency] {
        &[
            Self::Weekly,
            Self::Biweekly,
            Self::Monthly,
            Self::Quarterly,
            Self::Annual,
        ]
    }
}

impl std::str::FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "biweekly" | "fortnightly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "annual" | "yearly" => Ok(Self::Annual),
            _ => Err(Error::UnsupportedFrequency(s.to_string())),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The day an obligation lands on within its cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Weekly and biweekly schedules
    Weekday(Weekday),
    /// Monthly, quarterly and annual schedules (1..=31, clamped to month length)
    DayOfMonth(u32),
}

impl Anchor {
    /// The natural anchor for a frequency starting on `date`
    pub fn derive(frequency: Frequency, date: NaiveDate) -> Self {
        match frequency.cadence() {
            Cadence::Days(_) => Anchor::Weekday(date.weekday()),
            Cadence::Months(_) => Anchor::DayOfMonth(date.day()),
        }
    }
}

impl std::str::FromStr for Anchor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(day) = s.parse::<u32>() {
            return Ok(Anchor::DayOfMonth(day));
        }
        s.parse::<Weekday>()
            .map(Anchor::Weekday)
            .map_err(|_| Error::InvalidInput(format!("Unknown anchor: {}", s)))
    }
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Anchor::Weekday(day) => write!(f, "{}", day),
            Anchor::DayOfMonth(day) => write!(f, "day {}", day),
        }
    }
}

/// A recurring income or expense definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringObligation {
    pub id: String,
    /// Incremented each time the obligation is revised
    pub version: u32,
    pub direction: Direction,
    /// Always positive; the sign comes from `direction`
    pub amount: Money,
    pub frequency: Frequency,
    pub anchor: Anchor,
    pub start_date: NaiveDate,
    /// Inclusive
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl RecurringObligation {
    /// Create an open-ended obligation anchored on its start date
    pub fn new(
        id: impl Into<String>,
        direction: Direction,
        amount: Money,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            version: 1,
            direction,
            amount,
            frequency,
            anchor: Anchor::derive(frequency, start_date),
            start_date,
            end_date: None,
            label: None,
        }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Amount with the sign applied (income positive, expense negative)
    pub fn signed_amount(&self) -> Money {
        match self.direction {
            Direction::Income => self.amount,
            Direction::Expense => -self.amount,
        }
    }

    /// Whether the obligation can produce occurrences on or after `date`
    pub fn is_active_on_or_after(&self, date: NaiveDate) -> bool {
        self.end_date.map_or(true, |end| end >= date)
    }

    /// Revise the amount from `effective_from` onwards
    ///
    /// Occurrences already generated stay attached to the current version, so
    /// the current version is closed the day before and a new version takes
    /// over. Returns `(superseded, revised)`.
    pub fn revise(&self, effective_from: NaiveDate, amount: Money) -> Result<(Self, Self)> {
        if effective_from <= self.start_date {
            return Err(Error::InvalidInput(format!(
                "Revision of {} must take effect after its start date {}",
                self.id, self.start_date
            )));
        }
        if !self.is_active_on_or_after(effective_from) {
            return Err(Error::InvalidInput(format!(
                "Obligation {} has already ended",
                self.id
            )));
        }

        let mut superseded = self.clone();
        superseded.end_date = Some(effective_from - Duration::days(1));

        let mut revised = self.clone();
        revised.version = self.version + 1;
        revised.amount = amount;
        revised.start_date = effective_from;

        Ok((superseded, revised))
    }
}

/// One concrete dated instance of an obligation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledOccurrence {
    pub obligation_id: String,
    pub date: NaiveDate,
    pub signed_amount: Money,
}

/// One day of a projected ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLedgerEntry {
    pub date: NaiveDate,
    pub opening_balance: Money,
    pub net_change: Money,
    pub closing_balance: Money,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub contributing_occurrence_ids: Vec<String>,
}

// ========== Wellness Models ==========

/// A single wellness checkin as submitted by the health-tracking collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckin {
    pub date: NaiveDate,
    pub sleep_hours: Option<f64>,
    pub activity_minutes: Option<f64>,
    /// 1 (calm) to 10 (overwhelmed)
    pub stress_level: Option<f64>,
    /// 1 to 10
    pub energy: Option<f64>,
    /// 1 to 10
    pub mood: Option<f64>,
    /// 1 to 10
    pub relationships: Option<f64>,
    pub mindfulness_minutes: Option<f64>,
}

impl HealthCheckin {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            ..Default::default()
        }
    }

    /// Expand the checkin into per-metric samples (only present fields)
    pub fn samples(&self) -> Vec<HealthMetricSample> {
        [
            ("sleep_hours", self.sleep_hours),
            ("activity_minutes", self.activity_minutes),
            ("stress_level", self.stress_level),
            ("energy", self.energy),
            ("mood", self.mood),
            ("relationships", self.relationships),
            ("mindfulness_minutes", self.mindfulness_minutes),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .filter(|v| v.is_finite())
                .map(|v| HealthMetricSample::new(self.date, name, v))
        })
        .collect()
    }
}

/// One value of one wellness metric on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetricSample {
    pub date: NaiveDate,
    pub metric_name: String,
    pub value: f64,
}

impl HealthMetricSample {
    pub fn new(date: NaiveDate, metric_name: impl Into<String>, value: f64) -> Self {
        Self {
            date,
            metric_name: metric_name.into(),
            value,
        }
    }
}

/// Categorized spending for a date (or the first date of a period)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingObservation {
    pub date: NaiveDate,
    pub category: String,
    pub amount: Money,
}

// ========== Analysis Models ==========

/// Bucket granularity for aligning time series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Plural noun used in insight text ("Weeks with ...")
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Daily => "days",
            Self::Weekly => "weeks",
            Self::Monthly => "months",
        }
    }

    /// First date of the bucket containing `date`
    ///
    /// Weeks start on Monday.
    pub fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily => date,
            Self::Weekly => {
                date - Duration::days(date.weekday().num_days_from_monday() as i64)
            }
            Self::Monthly => date.with_day(1).unwrap_or(date),
        }
    }
}

impl std::str::FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" => Ok(Self::Daily),
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            _ => Err(Error::InvalidInput(format!(
                "Unknown period: {} (valid: daily, weekly, monthly)",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
