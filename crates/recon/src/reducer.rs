//! Candidate reduction.
//!
//! A reduction key whose count differs between ledgers is a mismatch
//! candidate. Every candidate pulls in all keys sharing its `trace_id`, so a
//! transaction whose timestamp drifted across a minute boundary keeps both its
//! original and drifted keys. Records outside the kept set are dropped.
//!
//! The neighbourhood is unbounded: a trace id reused across many records
//! keeps all of them.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::aggregate::count_by_reduction_key;
use crate::model::{ReductionKey, TxRecord};

#[derive(Debug, Clone)]
pub struct ReducedDataset {
    pub reduced_a: Vec<TxRecord>,
    pub reduced_b: Vec<TxRecord>,
    pub kept_keys: BTreeSet<ReductionKey>,
    /// Keys whose counts differed before neighbourhood expansion.
    pub candidate_keys: usize,
}

impl ReducedDataset {
    pub fn rows(&self) -> usize {
        self.reduced_a.len() + self.reduced_b.len()
    }

    pub fn kept_key_count(&self) -> usize {
        self.kept_keys.len()
    }

    pub fn stats(&self, full_rows_a: usize, full_rows_b: usize) -> ReductionStats {
        let full_rows = full_rows_a + full_rows_b;
        ReductionStats {
            full_rows_a,
            full_rows_b,
            reduced_rows_a: self.reduced_a.len(),
            reduced_rows_b: self.reduced_b.len(),
            candidate_keys: self.candidate_keys,
            kept_keys: self.kept_key_count(),
            reduction_ratio: if full_rows == 0 {
                0.0
            } else {
                1.0 - self.rows() as f64 / full_rows as f64
            },
        }
    }
}

/// Reporting view of a reduction. `reduction_ratio` is the share of rows dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReductionStats {
    pub full_rows_a: usize,
    pub full_rows_b: usize,
    pub reduced_rows_a: usize,
    pub reduced_rows_b: usize,
    pub candidate_keys: usize,
    pub kept_keys: usize,
    pub reduction_ratio: f64,
}

pub fn reduce(ledger_a: &[TxRecord], ledger_b: &[TxRecord]) -> ReducedDataset {
    let counts_a = count_by_reduction_key(ledger_a);
    let counts_b = count_by_reduction_key(ledger_b);

    let all_keys: BTreeSet<&ReductionKey> = counts_a.keys().chain(counts_b.keys()).collect();

    let candidates: Vec<&ReductionKey> = all_keys
        .iter()
        .copied()
        .filter(|k| counts_a.get(*k).unwrap_or(&0) != counts_b.get(*k).unwrap_or(&0))
        .collect();

    let mut by_trace: BTreeMap<&str, Vec<&ReductionKey>> = BTreeMap::new();
    for &key in &all_keys {
        by_trace.entry(key.trace_id.as_str()).or_default().push(key);
    }

    let kept_keys: BTreeSet<ReductionKey> = candidates
        .iter()
        .flat_map(|candidate| {
            std::iter::once(*candidate).chain(
                by_trace
                    .get(candidate.trace_id.as_str())
                    .into_iter()
                    .flatten()
                    .copied(),
            )
        })
        .cloned()
        .collect();

    let keep = |records: &[TxRecord]| -> Vec<TxRecord> {
        records
            .iter()
            .filter(|r| kept_keys.contains(&r.reduction_key()))
            .cloned()
            .collect()
    };
    let reduced_a = keep(ledger_a);
    let reduced_b = keep(ledger_b);

    tracing::debug!(
        candidates = candidates.len(),
        kept_keys = kept_keys.len(),
        reduced_a = reduced_a.len(),
        reduced_b = reduced_b.len(),
        "reduced"
    );

    ReducedDataset {
        reduced_a,
        reduced_b,
        candidate_keys: candidates.len(),
        kept_keys,
    }
}
