//! CSV snapshot parsers
//!
//! Columns are located by header name (case-insensitive), so files may
//! reorder them or carry extras. Blank optional cells are treated as absent.
//!
//! - obligations: `id,direction,amount,frequency,anchor,start_date,end_date[,label]`
//! - checkins: `date,sleep_hours,activity_minutes,stress_level,energy,mood,relationships,mindfulness_minutes`
//! - spending: `date,category,amount`

use std::io::Read;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{
    parse_money, Anchor, Direction, Frequency, HealthCheckin, RecurringObligation,
    SpendingObservation,
};

/// Header positions for one file
struct Columns {
    headers: Vec<String>,
}

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        Self {
            headers: headers.iter().map(|h| h.trim().to_lowercase()).collect(),
        }
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.index(name)
            .ok_or_else(|| Error::Import(format!("Missing required column: {}", name)))
    }
}

/// Non-empty trimmed cell at `index`
fn cell(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn required<'r>(record: &'r StringRecord, index: usize, name: &str) -> Result<&'r str> {
    cell(record, Some(index)).ok_or_else(|| Error::Import(format!("Missing {}", name)))
}

/// Attach the row number; unsupported frequencies keep their own kind
fn at_row(row: usize, err: Error) -> Error {
    match err {
        Error::UnsupportedFrequency(_) => err,
        Error::Import(msg) | Error::InvalidInput(msg) => {
            Error::Import(format!("Row {}: {}", row, msg))
        }
        other => Error::Import(format!("Row {}: {}", row, other)),
    }
}

/// Parse a date in any of the accepted formats
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2026-03-01
        "%m/%d/%Y", // 03/01/2026
        "%m/%d/%y", // 03/01/26
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

fn parse_optional_f64(s: Option<&str>, name: &str) -> Result<Option<f64>> {
    s.map(|v| {
        v.parse::<f64>()
            .map_err(|_| Error::Import(format!("Invalid {}: {}", name, v)))
    })
    .transpose()
}

/// Parse recurring obligations
///
/// A blank anchor is derived from the start date.
pub fn parse_obligations<R: Read>(reader: R) -> Result<Vec<RecurringObligation>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let cols = Columns::new(rdr.headers()?);
    let id_col = cols.require("id")?;
    let direction_col = cols.require("direction")?;
    let amount_col = cols.require("amount")?;
    let frequency_col = cols.require("frequency")?;
    let start_col = cols.require("start_date")?;
    let anchor_col = cols.index("anchor");
    let end_col = cols.index("end_date");
    let label_col = cols.index("label");

    let mut obligations = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 2;

        let parse = || -> Result<RecurringObligation> {
            let id = required(&record, id_col, "id")?;
            let direction: Direction = required(&record, direction_col, "direction")?.parse()?;
            let amount = parse_money(required(&record, amount_col, "amount")?)?;
            let frequency: Frequency = required(&record, frequency_col, "frequency")?.parse()?;
            let start_date = parse_date(required(&record, start_col, "start_date")?)?;

            let mut obligation =
                RecurringObligation::new(id, direction, amount, frequency, start_date);
            if let Some(anchor) = cell(&record, anchor_col) {
                obligation = obligation.with_anchor(anchor.parse::<Anchor>()?);
            }
            if let Some(end) = cell(&record, end_col) {
                obligation = obligation.with_end_date(parse_date(end)?);
            }
            if let Some(label) = cell(&record, label_col) {
                obligation = obligation.with_label(label);
            }
            Ok(obligation)
        };

        obligations.push(parse().map_err(|e| at_row(row, e))?);
    }

    debug!(count = obligations.len(), "Parsed obligations");
    Ok(obligations)
}

/// Parse wellness checkins; blank cells are missing values
pub fn parse_checkins<R: Read>(reader: R) -> Result<Vec<HealthCheckin>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let cols = Columns::new(rdr.headers()?);
    let date_col = cols.require("date")?;
    let fields = [
        "sleep_hours",
        "activity_minutes",
        "stress_level",
        "energy",
        "mood",
        "relationships",
        "mindfulness_minutes",
    ]
    .map(|name| (name, cols.index(name)));

    let mut checkins = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 2;

        let parse = || -> Result<HealthCheckin> {
            let mut checkin = HealthCheckin::empty(parse_date(required(&record, date_col, "date")?)?);
            let mut values = [None; 7];
            for (slot, (name, index)) in values.iter_mut().zip(fields.iter()) {
                *slot = parse_optional_f64(cell(&record, *index), name)?;
            }
            let [sleep, activity, stress, energy, mood, relationships, mindfulness] = values;
            checkin.sleep_hours = sleep;
            checkin.activity_minutes = activity;
            checkin.stress_level = stress;
            checkin.energy = energy;
            checkin.mood = mood;
            checkin.relationships = relationships;
            checkin.mindfulness_minutes = mindfulness;
            Ok(checkin)
        };

        checkins.push(parse().map_err(|e| at_row(row, e))?);
    }

    debug!(count = checkins.len(), "Parsed checkins");
    Ok(checkins)
}

/// Parse categorized spending
///
/// Amounts are stored as magnitudes, so exports that sign expenses
/// negative import the same as unsigned ones.
pub fn parse_spending<R: Read>(reader: R) -> Result<Vec<SpendingObservation>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let cols = Columns::new(rdr.headers()?);
    let date_col = cols.require("date")?;
    let category_col = cols.require("category")?;
    let amount_col = cols.require("amount")?;

    let mut observations = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 2;

        let parse = || -> Result<SpendingObservation> {
            Ok(SpendingObservation {
                date: parse_date(required(&record, date_col, "date")?)?,
                category: required(&record, category_col, "category")?.to_string(),
                amount: parse_money(required(&record, amount_col, "amount")?)?.abs(),
            })
        };

        observations.push(parse().map_err(|e| at_row(row, e))?);
    }

    debug!(count = observations.len(), "Parsed spending observations");
    Ok(observations)
}
