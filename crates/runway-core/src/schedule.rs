//! Schedule resolution
//!
//! Expands a [`RecurringObligation`] into concrete dated occurrences.
//!
//! ## Anchor policy
//!
//! - Weekly/biweekly series start on the first anchor weekday on or after the
//!   obligation's start date and step by 7 or 14 days from there, so a
//!   biweekly payday keeps its phase no matter which window is requested.
//! - Monthly/quarterly/annual series step by calendar months counted from the
//!   start date's month. Each occurrence is computed from the anchor day, and
//!   an anchor past the end of a month lands on that month's last day
//!   (day 31 → Feb 28/29 → Mar 31).

use chrono::{Datelike, Duration, NaiveDate};
use tracing::trace;

use crate::error::{Error, Result};
use crate::models::{Anchor, Cadence, RecurringObligation, ScheduledOccurrence};

/// Expands obligations into ordered, duplicate-free occurrences
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleResolver;

impl ScheduleResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve all occurrences of `obligation` within `[window_start, window_end]`
    ///
    /// Both bounds are inclusive. The result is clipped to the obligation's own
    /// start and (inclusive) end date and sorted ascending by date.
    pub fn resolve(
        &self,
        obligation: &RecurringObligation,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<ScheduledOccurrence>> {
        let first = window_start.max(obligation.start_date);
        let last = obligation
            .end_date
            .map_or(window_end, |end| end.min(window_end));

        if first > last {
            return Ok(Vec::new());
        }

        let dates = match (obligation.frequency.cadence(), obligation.anchor) {
            (Cadence::Days(step), Anchor::Weekday(weekday)) => {
                let offset = (weekday.num_days_from_monday() + 7
                    - obligation.start_date.weekday().num_days_from_monday())
                    % 7;
                let origin = add_days(obligation.start_date, offset as i64)?;
                day_series(origin, step, first, last)?
            }
            (Cadence::Months(step), Anchor::DayOfMonth(day)) => {
                month_series(obligation.start_date, day, step, first, last)?
            }
            (_, anchor) => {
                return Err(Error::InvalidInput(format!(
                    "Obligation {} has a {} schedule but is anchored on {}",
                    obligation.id, obligation.frequency, anchor
                )));
            }
        };

        trace!(
            obligation = obligation.id.as_str(),
            frequency = obligation.frequency.as_str(),
            count = dates.len(),
            "Resolved schedule"
        );

        let signed_amount = obligation.signed_amount();
        Ok(dates
            .into_iter()
            .map(|date| ScheduledOccurrence {
                obligation_id: obligation.id.clone(),
                date,
                signed_amount,
            })
            .collect())
    }

    /// The first occurrence strictly after `after`, if any
    pub fn next_occurrence(
        &self,
        obligation: &RecurringObligation,
        after: NaiveDate,
    ) -> Result<Option<ScheduledOccurrence>> {
        let from = add_days(after, 1)?;
        // One full year plus slack covers the longest cadence
        let until = add_days(from, 370)?;
        Ok(self.resolve(obligation, from, until)?.into_iter().next())
    }
}

/// Number of days in a month, or None when the month is outside the calendar
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|d| d.day())
}

/// The anchor day in the given month, clamped to the month's last day
pub fn clamp_to_month(year: i32, month: u32, anchor_day: u32) -> Result<NaiveDate> {
    if !(1..=31).contains(&anchor_day) {
        return Err(Error::CalendarResolution(format!(
            "Anchor day {} is outside 1..=31",
            anchor_day
        )));
    }
    let last = days_in_month(year, month).ok_or_else(|| {
        Error::CalendarResolution(format!("Month {}-{:02} is out of range", year, month))
    })?;
    NaiveDate::from_ymd_opt(year, month, anchor_day.min(last)).ok_or_else(|| {
        Error::CalendarResolution(format!(
            "Cannot place day {} in {}-{:02}",
            anchor_day, year, month
        ))
    })
}

fn add_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
        .ok_or_else(|| Error::CalendarResolution(format!("{} + {} days overflows", date, days)))
}

fn day_series(
    origin: NaiveDate,
    step: i64,
    first: NaiveDate,
    last: NaiveDate,
) -> Result<Vec<NaiveDate>> {
    let mut current = if origin >= first {
        origin
    } else {
        let behind = (first - origin).num_days();
        let periods = (behind + step - 1) / step;
        add_days(origin, periods * step)?
    };

    let mut dates = Vec::new();
    while current <= last {
        dates.push(current);
        match current.checked_add_signed(Duration::days(step)) {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(dates)
}

fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

fn month_series(
    series_start: NaiveDate,
    anchor_day: u32,
    step: u32,
    first: NaiveDate,
    last: NaiveDate,
) -> Result<Vec<NaiveDate>> {
    let step = step as i64;
    let origin = month_index(series_start);
    let skip = (month_index(first) - origin).max(0) / step;

    let mut dates = Vec::new();
    let mut k = skip;
    loop {
        let index = origin + k * step;
        let year = i32::try_from(index.div_euclid(12)).map_err(|_| {
            Error::CalendarResolution(format!("Month index {} is out of range", index))
        })?;
        let month = index.rem_euclid(12) as u32 + 1;
        let date = clamp_to_month(year, month, anchor_day)?;

        if date > last {
            break;
        }
        // Clamped dates only move earlier within the month, so the first
        // candidate may still fall before the window
        if date >= first {
            dates.push(date);
        }
        k += 1;
    }
    Ok(dates)
}
