//! Validation of raw rows into typed [`TxRecord`]s.
//!
//! Every row is checked exactly once here; the reconciler and reducer only
//! ever see well-formed records.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{RecordProblem, ReconError};
use crate::model::{Direction, RawRow, Side, TxRecord};

pub const COL_LEDGER: &str = "ledger";
pub const COL_TRACE_ID: &str = "trace_id";
pub const COL_TIMESTAMP: &str = "timestamp_iso";
pub const COL_AMOUNT: &str = "amount_cents";
pub const COL_CURRENCY: &str = "currency";
pub const COL_DIRECTION: &str = "direction";

/// Columns every ledger row must carry, in canonical file order.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    COL_LEDGER,
    COL_TRACE_ID,
    COL_TIMESTAMP,
    COL_AMOUNT,
    COL_CURRENCY,
    COL_DIRECTION,
];

/// Validate a whole ledger. Fails on the first malformed row.
pub fn parse_ledger(side: Side, rows: Vec<RawRow>) -> Result<Vec<TxRecord>, ReconError> {
    let records = rows
        .into_iter()
        .enumerate()
        .map(|(index, raw)| parse_record(side, index, raw))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(%side, rows = records.len(), "ledger validated");
    Ok(records)
}

/// Validate one row. `index` is the zero-based position within its ledger.
pub fn parse_record(side: Side, index: usize, raw: RawRow) -> Result<TxRecord, ReconError> {
    let fail = |problem| ReconError::malformed(side, index, problem);

    let ledger = required(&raw, COL_LEDGER).map_err(fail)?.to_string();
    let trace_id = required(&raw, COL_TRACE_ID).map_err(fail)?.to_string();
    let timestamp_text = required(&raw, COL_TIMESTAMP).map_err(fail)?.to_string();
    let amount_text = required(&raw, COL_AMOUNT).map_err(fail)?;
    let currency = required(&raw, COL_CURRENCY).map_err(fail)?.to_string();
    let direction_text = required(&raw, COL_DIRECTION).map_err(fail)?;

    let timestamp = parse_timestamp(&timestamp_text)
        .ok_or_else(|| fail(RecordProblem::Timestamp(timestamp_text.clone())))?;
    let amount_cents = parse_amount(amount_text)
        .ok_or_else(|| fail(RecordProblem::Amount(amount_text.to_string())))?;
    let direction = Direction::parse(direction_text)
        .ok_or_else(|| fail(RecordProblem::Direction(direction_text.to_string())))?;

    Ok(TxRecord {
        ledger,
        trace_id,
        timestamp_text,
        timestamp,
        amount_cents,
        amount_text: amount_text.to_string(),
        currency,
        direction,
        raw,
    })
}

fn required<'a>(raw: &'a RawRow, column: &'static str) -> Result<&'a str, RecordProblem> {
    match raw.get(column) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RecordProblem::MissingField(column)),
    }
}

/// Integer minor units only. No rounding, no decimal point.
pub fn parse_amount(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok()
}

/// ISO-8601 family: `T` or space separator, optional seconds and fraction,
/// bare dates (midnight), and RFC 3339 offsets (wall time is kept).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let s = s.trim();
    for fmt in FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.naive_local());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
