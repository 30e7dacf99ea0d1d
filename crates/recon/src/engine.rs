use std::collections::{BTreeMap, BTreeSet};

use crate::aggregate::{checked_total, group_by_join_key, Group};
use crate::error::ReconError;
use crate::ingest::parse_ledger;
use crate::model::{JoinKey, MismatchGroup, RawRow, ReconMeta, ReconResult, Side, TxRecord};
use crate::reducer::{reduce, ReducedDataset};
use crate::verify::{verify, Equivalence};

/// Reconcile two validated ledgers by join key.
///
/// Walks the sorted union of keys from both sides, so mismatch order never
/// depends on input order. Every sum is overflow-checked; leaving the `i64`
/// range is an error, never a wrapped total.
pub fn reconcile(ledger_a: &[TxRecord], ledger_b: &[TxRecord]) -> Result<ReconResult, ReconError> {
    let groups_a = group_by_join_key(ledger_a);
    let groups_b = group_by_join_key(ledger_b);

    let keys: BTreeSet<&JoinKey> = groups_a.keys().chain(groups_b.keys()).collect();
    let empty = Group::default();

    let mut mismatches = Vec::new();
    for key in keys {
        if let Some(m) = compare(key, side(&groups_a, key, &empty), side(&groups_b, key, &empty))? {
            mismatches.push(m);
        }
    }

    let meta = ReconMeta {
        rows_a: ledger_a.len(),
        rows_b: ledger_b.len(),
        total_a_cents: ledger_total(Side::A, ledger_a)?,
        total_b_cents: ledger_total(Side::B, ledger_b)?,
        mismatch_count: mismatches.len(),
        mismatch_delta_total_cents: delta_total(&mismatches)?,
    };

    tracing::debug!(
        rows_a = meta.rows_a,
        rows_b = meta.rows_b,
        mismatches = meta.mismatch_count,
        delta = meta.mismatch_delta_total_cents,
        "reconciled"
    );

    Ok(ReconResult { meta, mismatches })
}

fn side<'m, 'a>(
    groups: &'m BTreeMap<JoinKey, Group<'a>>,
    key: &JoinKey,
    empty: &'m Group<'a>,
) -> &'m Group<'a> {
    groups.get(key).unwrap_or(empty)
}

fn ledger_total(side: Side, records: &[TxRecord]) -> Result<i64, ReconError> {
    checked_total(records.iter().map(|r| r.amount_cents))
        .ok_or_else(|| ReconError::overflow(format!("ledger {side} total")))
}

fn delta_total(mismatches: &[MismatchGroup]) -> Result<i64, ReconError> {
    mismatches.iter().try_fold(0i64, |acc, m| {
        let delta = m
            .delta_cents()
            .ok_or_else(|| ReconError::overflow(format!("delta for {}", m.join_key)))?;
        acc.checked_add(delta)
            .ok_or_else(|| ReconError::overflow("mismatch delta total"))
    })
}

fn compare(key: &JoinKey, a: &Group<'_>, b: &Group<'_>) -> Result<Option<MismatchGroup>, ReconError> {
    let (count_a, count_b) = (a.count(), b.count());
    let sum_a = a
        .sum_cents()
        .ok_or_else(|| ReconError::overflow(format!("ledger A sum for {key}")))?;
    let sum_b = b
        .sum_cents()
        .ok_or_else(|| ReconError::overflow(format!("ledger B sum for {key}")))?;
    if count_a == count_b && sum_a == sum_b {
        return Ok(None);
    }
    Ok(Some(MismatchGroup {
        join_key: key.clone(),
        count_a,
        count_b,
        sum_a_cents: sum_a,
        sum_b_cents: sum_b,
        sample_tx_a: a.samples(),
        sample_tx_b: b.samples(),
    }))
}

/// Validate raw rows for both sides, then reconcile.
pub fn reconcile_rows(rows_a: Vec<RawRow>, rows_b: Vec<RawRow>) -> Result<ReconResult, ReconError> {
    let a = parse_ledger(Side::A, rows_a)?;
    let b = parse_ledger(Side::B, rows_b)?;
    reconcile(&a, &b)
}

/// Everything produced by one in-memory proof run.
#[derive(Debug, Clone)]
pub struct ProofRun {
    pub full: ReconResult,
    pub reduced_dataset: ReducedDataset,
    pub reduced: ReconResult,
    pub equivalence: Equivalence,
}

/// Full recon, reduction, reduced recon, verification.
pub fn prove(ledger_a: &[TxRecord], ledger_b: &[TxRecord]) -> Result<ProofRun, ReconError> {
    let full = reconcile(ledger_a, ledger_b)?;
    let reduced_dataset = reduce(ledger_a, ledger_b);
    let reduced = reconcile(&reduced_dataset.reduced_a, &reduced_dataset.reduced_b)?;
    let equivalence = verify(&full, &reduced);

    if equivalence.passed() {
        tracing::info!(
            full_rows = ledger_a.len() + ledger_b.len(),
            reduced_rows = reduced_dataset.rows(),
            "reduced reconciliation is equivalent"
        );
    } else {
        tracing::warn!(reason = %equivalence.message(), "equivalence failed");
    }

    Ok(ProofRun { full, reduced_dataset, reduced, equivalence })
}
