use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Which side of the reconciliation a ledger sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// Money direction of a record.
///
/// Variant order matches the lexicographic order of the wire names so that
/// derived `Ord` on keys sorts the same way the rendered strings would.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "CREDIT",
            Self::Debit => "DEBIT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREDIT" => Some(Self::Credit),
            "DEBIT" => Some(Self::Debit),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row exactly as read: header/value pairs in file column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Set a column, replacing an existing value in place or appending.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }
}

/// A validated ledger entry. Built only through [`crate::ingest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRecord {
    pub ledger: String,
    pub trace_id: String,
    /// Timestamp text as read; used verbatim in the fingerprint.
    pub timestamp_text: String,
    pub timestamp: NaiveDateTime,
    pub amount_cents: i64,
    /// Amount text as read; used verbatim in the fingerprint.
    pub amount_text: String,
    pub currency: String,
    pub direction: Direction,
    /// Every column of the source row, passthrough fields included.
    pub raw: RawRow,
}

impl TxRecord {
    pub fn minute_bucket(&self) -> String {
        minute_bucket(&self.timestamp)
    }

    pub fn join_key(&self) -> JoinKey {
        JoinKey {
            trace_id: self.trace_id.clone(),
            currency: self.currency.clone(),
            direction: self.direction,
            minute_bucket: self.minute_bucket(),
        }
    }

    pub fn reduction_key(&self) -> ReductionKey {
        ReductionKey {
            trace_id: self.trace_id.clone(),
            amount_cents: self.amount_cents,
            currency: self.currency.clone(),
            direction: self.direction,
            minute_bucket: self.minute_bucket(),
        }
    }

    /// First 16 hex chars of SHA-256 over `ledger|trace_id|timestamp|amount|currency|direction`.
    pub fn fingerprint(&self) -> String {
        let joined = format!(
            "{}|{}|{}|{}|{}|{}",
            self.ledger,
            self.trace_id,
            self.timestamp_text,
            self.amount_text,
            self.currency,
            self.direction,
        );
        let digest = Sha256::digest(joined.as_bytes());
        let mut hex = format!("{:x}", digest);
        hex.truncate(FINGERPRINT_LEN);
        hex
    }
}

pub const FINGERPRINT_LEN: usize = 16;

/// Truncate to one-minute resolution, rendered `YYYY-MM-DDTHH:MM`.
pub fn minute_bucket(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M").to_string()
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Reconciler grouping key. Serialized as a 4-element array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "JoinKeyTuple", into = "JoinKeyTuple")]
pub struct JoinKey {
    pub trace_id: String,
    pub currency: String,
    pub direction: Direction,
    pub minute_bucket: String,
}

type JoinKeyTuple = (String, String, Direction, String);

impl From<JoinKeyTuple> for JoinKey {
    fn from((trace_id, currency, direction, minute_bucket): JoinKeyTuple) -> Self {
        Self { trace_id, currency, direction, minute_bucket }
    }
}

impl From<JoinKey> for JoinKeyTuple {
    fn from(k: JoinKey) -> Self {
        (k.trace_id, k.currency, k.direction, k.minute_bucket)
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.trace_id, self.currency, self.direction, self.minute_bucket
        )
    }
}

/// Reducer key. Finer than [`JoinKey`]: includes the amount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReductionKey {
    pub trace_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub direction: Direction,
    pub minute_bucket: String,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Max sample fingerprints kept per side of a mismatch group.
pub const SAMPLE_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchGroup {
    pub join_key: JoinKey,
    #[serde(rename = "count_A")]
    pub count_a: usize,
    #[serde(rename = "count_B")]
    pub count_b: usize,
    #[serde(rename = "sumA_cents")]
    pub sum_a_cents: i64,
    #[serde(rename = "sumB_cents")]
    pub sum_b_cents: i64,
    #[serde(rename = "sample_tx_A")]
    pub sample_tx_a: Vec<String>,
    #[serde(rename = "sample_tx_B")]
    pub sample_tx_b: Vec<String>,
}

impl MismatchGroup {
    /// Signed `sum_A - sum_B`, `None` if it leaves the `i64` range.
    pub fn delta_cents(&self) -> Option<i64> {
        self.sum_a_cents.checked_sub(self.sum_b_cents)
    }

    pub fn signature(&self) -> MismatchSignature {
        MismatchSignature {
            join_key: self.join_key.clone(),
            count_a: self.count_a,
            count_b: self.count_b,
            sum_a_cents: self.sum_a_cents,
            sum_b_cents: self.sum_b_cents,
        }
    }
}

/// Comparable identity of a mismatch group; ignores sample fingerprints.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MismatchSignature {
    pub join_key: JoinKey,
    pub count_a: usize,
    pub count_b: usize,
    pub sum_a_cents: i64,
    pub sum_b_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconMeta {
    #[serde(rename = "rows_A")]
    pub rows_a: usize,
    #[serde(rename = "rows_B")]
    pub rows_b: usize,
    /// Total of the provided dataset. Context only, never an equivalence criterion.
    #[serde(rename = "totalA_cents")]
    pub total_a_cents: i64,
    #[serde(rename = "totalB_cents")]
    pub total_b_cents: i64,
    pub mismatch_count: usize,
    /// Signed sum of `sum_A - sum_B` over mismatches. Opposite breaks cancel.
    pub mismatch_delta_total_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub mismatches: Vec<MismatchGroup>,
}

impl ReconResult {
    /// Mismatch signatures in join-key order, independent of emission order.
    pub fn sorted_signatures(&self) -> Vec<MismatchSignature> {
        let mut sigs: Vec<MismatchSignature> =
            self.mismatches.iter().map(MismatchGroup::signature).collect();
        sigs.sort();
        sigs
    }
}
