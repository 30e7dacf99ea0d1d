//! Synthetic ledger pair with known, injected breaks.
//!
//! Base rows are matched one-for-one between A and B, then five kinds of
//! break are injected by index range. Same `(n, seed)` gives the same files.

use std::ops::Range;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rem_recon::RawRow;
use rem_recon_io::{write_json, write_rows, IoError};
use serde::Serialize;

pub const DEFAULT_ROWS: usize = 100_000;
pub const DEFAULT_SEED: u64 = 1337;

pub const COLUMNS: [&str; 8] = [
    "ledger",
    "trace_id",
    "timestamp_iso",
    "amount_cents",
    "currency",
    "direction",
    "merchant",
    "channel",
];

const DIRECTIONS: [&str; 2] = ["DEBIT", "CREDIT"];
const MERCHANTS: [&str; 5] = ["M1", "M2", "M3", "M4", "M5"];
const CHANNELS: [&str; 3] = ["POS", "ECOM", "MOTO"];

const MISSING_IN_B: Range<usize> = 100..150;
const MISSING_IN_A: Range<usize> = 200..240;
const AMOUNT_MISMATCH: Range<usize> = 400..460;
const TIMING_DRIFT: Range<usize> = 700..760;
const DUPLICATE_IN_B: Range<usize> = 900..930;

const AMOUNT_BUMP_CENTS: i64 = 37;
const DRIFT_SECONDS: i64 = 65;

/// Trace ids per injected break kind, in index order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InjectedBreaks {
    #[serde(rename = "missing_in_B")]
    pub missing_in_b: Vec<String>,
    #[serde(rename = "missing_in_A")]
    pub missing_in_a: Vec<String>,
    pub amount_mismatch: Vec<String>,
    pub timing_drift: Vec<String>,
    #[serde(rename = "duplicate_in_B")]
    pub duplicate_in_b: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SyntheticLedgers {
    pub ledger_a: Vec<RawRow>,
    pub ledger_b: Vec<RawRow>,
    pub breaks: InjectedBreaks,
}

/// Where [`write_synthetic`] put things.
#[derive(Debug, Clone)]
pub struct SyntheticPaths {
    pub ledger_a: PathBuf,
    pub ledger_b: PathBuf,
    pub breaks: PathBuf,
}

#[derive(Debug, Clone)]
struct SynthTx {
    trace_id: String,
    timestamp: NaiveDateTime,
    amount_cents: i64,
    direction: &'static str,
    merchant: &'static str,
    channel: &'static str,
}

impl SynthTx {
    fn row(&self, ledger: &str) -> RawRow {
        RawRow::from_pairs([
            ("ledger", ledger.to_string()),
            ("trace_id", self.trace_id.clone()),
            ("timestamp_iso", self.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()),
            ("amount_cents", self.amount_cents.to_string()),
            ("currency", "USD".to_string()),
            ("direction", self.direction.to_string()),
            ("merchant", self.merchant.to_string()),
            ("channel", self.channel.to_string()),
        ])
    }
}

fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap_or_default()
}

fn clip(range: Range<usize>, n: usize) -> Range<usize> {
    range.start.min(n)..range.end.min(n)
}

fn pick<T: Copy>(rng: &mut StdRng, items: &[T]) -> T {
    items[rng.gen_range(0..items.len())]
}

pub fn generate(n: usize, seed: u64) -> SyntheticLedgers {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = start_time();

    let base: Vec<SynthTx> = (0..n)
        .map(|i| SynthTx {
            trace_id: format!("T{i:09}"),
            // Repeats within one hour so minute buckets are shared.
            timestamp: start + Duration::seconds((i % 3600) as i64),
            amount_cents: rng.gen_range(100..=25_000),
            direction: pick(&mut rng, &DIRECTIONS),
            merchant: pick(&mut rng, &MERCHANTS),
            channel: pick(&mut rng, &CHANNELS),
        })
        .collect();

    let mut a: Vec<Option<SynthTx>> = base.iter().cloned().map(Some).collect();
    let mut b: Vec<Option<SynthTx>> = base.iter().cloned().map(Some).collect();
    let mut breaks = InjectedBreaks::default();

    for i in clip(MISSING_IN_B, n) {
        breaks.missing_in_b.push(base[i].trace_id.clone());
        b[i] = None;
    }
    for i in clip(MISSING_IN_A, n) {
        breaks.missing_in_a.push(base[i].trace_id.clone());
        a[i] = None;
    }
    for i in clip(AMOUNT_MISMATCH, n) {
        breaks.amount_mismatch.push(base[i].trace_id.clone());
        if let Some(tx) = b[i].as_mut() {
            tx.amount_cents += AMOUNT_BUMP_CENTS;
        }
    }
    for i in clip(TIMING_DRIFT, n) {
        breaks.timing_drift.push(base[i].trace_id.clone());
        if let Some(tx) = b[i].as_mut() {
            tx.timestamp += Duration::seconds(DRIFT_SECONDS);
        }
    }
    let mut duplicates = Vec::new();
    for i in clip(DUPLICATE_IN_B, n) {
        breaks.duplicate_in_b.push(base[i].trace_id.clone());
        if let Some(tx) = &b[i] {
            duplicates.push(tx.clone());
        }
    }

    let ledger_a = a.iter().flatten().map(|tx| tx.row("A")).collect();
    let ledger_b = b
        .iter()
        .flatten()
        .chain(duplicates.iter())
        .map(|tx| tx.row("B"))
        .collect();

    SyntheticLedgers { ledger_a, ledger_b, breaks }
}

/// Write `ledger_A.csv`, `ledger_B.csv` and `injected_breaks.json` into `out_dir`.
pub fn write_synthetic(out_dir: &Path, data: &SyntheticLedgers) -> Result<SyntheticPaths, IoError> {
    std::fs::create_dir_all(out_dir).map_err(|source| IoError::Write {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let headers: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
    let paths = SyntheticPaths {
        ledger_a: out_dir.join("ledger_A.csv"),
        ledger_b: out_dir.join("ledger_B.csv"),
        breaks: out_dir.join("injected_breaks.json"),
    };

    write_rows(&paths.ledger_a, &headers, &data.ledger_a)?;
    write_rows(&paths.ledger_b, &headers, &data.ledger_b)?;
    write_json(&paths.breaks, &data.breaks)?;
    Ok(paths)
}
