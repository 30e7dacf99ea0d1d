use thiserror::Error;

use crate::model::Side;

#[derive(Debug, Error)]
pub enum ReconError {
    /// A ledger row could not be turned into a typed record.
    #[error("ledger {side}, record {index}: {problem}")]
    MalformedRecord {
        side: Side,
        index: usize,
        problem: RecordProblem,
    },
    /// A sum or difference of amounts left the `i64` minor-unit range.
    #[error("amount overflow: {0} exceeds the i64 minor-unit range")]
    AmountOverflow(String),
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty file name, duplicate output path, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
}

/// What exactly was wrong with a malformed row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordProblem {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("cannot parse timestamp '{0}'")]
    Timestamp(String),
    #[error("cannot parse amount '{0}' (expected integer minor units)")]
    Amount(String),
    #[error("unknown direction '{0}' (expected DEBIT or CREDIT)")]
    Direction(String),
}

impl ReconError {
    pub fn malformed(side: Side, index: usize, problem: RecordProblem) -> Self {
        Self::MalformedRecord { side, index, problem }
    }

    pub fn overflow(what: impl Into<String>) -> Self {
        Self::AmountOverflow(what.into())
    }
}
