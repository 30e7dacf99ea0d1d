use std::collections::BTreeMap;

use crate::model::{JoinKey, ReductionKey, TxRecord, SAMPLE_LIMIT};

/// One side's records under a single join key, in ledger order.
#[derive(Debug, Default)]
pub struct Group<'a> {
    pub records: Vec<&'a TxRecord>,
}

impl<'a> Group<'a> {
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// `None` if the sum leaves the `i64` range.
    pub fn sum_cents(&self) -> Option<i64> {
        checked_total(self.records.iter().map(|r| r.amount_cents))
    }

    /// Fingerprints of the first [`SAMPLE_LIMIT`] records.
    pub fn samples(&self) -> Vec<String> {
        self.records
            .iter()
            .take(SAMPLE_LIMIT)
            .map(|r| r.fingerprint())
            .collect()
    }
}

/// Overflow-checked sum of minor-unit amounts.
pub fn checked_total<I: IntoIterator<Item = i64>>(amounts: I) -> Option<i64> {
    amounts.into_iter().try_fold(0i64, i64::checked_add)
}

/// Group records by join key. BTreeMap keeps key iteration sorted.
pub fn group_by_join_key(records: &[TxRecord]) -> BTreeMap<JoinKey, Group<'_>> {
    let mut groups: BTreeMap<JoinKey, Group<'_>> = BTreeMap::new();
    for record in records {
        groups.entry(record.join_key()).or_default().records.push(record);
    }
    groups
}

/// Record count per reduction key.
pub fn count_by_reduction_key(records: &[TxRecord]) -> BTreeMap<ReductionKey, usize> {
    let mut counts: BTreeMap<ReductionKey, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.reduction_key()).or_insert(0) += 1;
    }
    counts
}
