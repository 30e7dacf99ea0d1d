// Property-based tests for reconciliation, reduction, and verification.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use rem_recon::model::{RawRow, Side, TxRecord};
use rem_recon::{parse_ledger, reconcile, reduce, verify, EquivalenceFailure};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Small universe so keys collide often: few traces, few minutes.
#[derive(Debug, Clone)]
struct Entry {
    trace: u8,
    minute: u32,
    second: u32,
    amount: i64,
    debit: bool,
}

#[derive(Debug, Clone)]
enum Mutation {
    Keep,
    Drop,
    Amount(i64),
    ShiftSeconds(u32),
    Duplicate,
}

fn arb_entry() -> impl Strategy<Value = Entry> {
    (0u8..6, 0u32..4, 0u32..60, prop_oneof![Just(100i64), Just(250), Just(1037), -500i64..500], any::<bool>())
        .prop_map(|(trace, minute, second, amount, debit)| Entry { trace, minute, second, amount, debit })
}

fn arb_mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        6 => Just(Mutation::Keep),
        1 => Just(Mutation::Drop),
        1 => (-50i64..50).prop_map(Mutation::Amount),
        1 => (1u32..120).prop_map(Mutation::ShiftSeconds),
        1 => Just(Mutation::Duplicate),
    ]
}

fn arb_ledgers() -> impl Strategy<Value = (Vec<Entry>, Vec<Entry>)> {
    (
        prop::collection::vec((arb_entry(), arb_mutation()), 0..40),
        prop::collection::vec(arb_entry(), 0..5),
    )
        .prop_map(|(pairs, extra_b)| {
            let a: Vec<Entry> = pairs.iter().map(|(s, _)| s.clone()).collect();
            let mut b = Vec::new();
            for (entry, mutation) in pairs {
                match mutation {
                    Mutation::Keep => b.push(entry),
                    Mutation::Drop => {}
                    Mutation::Amount(d) => b.push(Entry { amount: entry.amount + d, ..entry }),
                    Mutation::ShiftSeconds(s) => {
                        let total = entry.minute * 60 + entry.second + s;
                        b.push(Entry { minute: total / 60, second: total % 60, ..entry });
                    }
                    Mutation::Duplicate => {
                        b.push(entry.clone());
                        b.push(entry);
                    }
                }
            }
            b.extend(extra_b);
            (a, b)
        })
}

fn build(side: Side, entries: &[Entry]) -> Vec<TxRecord> {
    let rows = entries
        .iter()
        .map(|s| {
            RawRow::from_pairs([
                ("ledger", side.to_string()),
                ("trace_id", format!("T{}", s.trace)),
                ("timestamp_iso", format!("2026-01-01T09:{:02}:{:02}", s.minute, s.second)),
                ("amount_cents", s.amount.to_string()),
                ("currency", "USD".to_string()),
                ("direction", if s.debit { "DEBIT" } else { "CREDIT" }.to_string()),
            ])
        })
        .collect();
    parse_ledger(side, rows).unwrap()
}

/// Reorder a ledger without changing relative order inside any join-key group.
fn regroup(records: &[TxRecord]) -> Vec<TxRecord> {
    let mut out = records.to_vec();
    out.sort_by(|x, y| y.join_key().cmp(&x.join_key()));
    out
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn reduced_run_reproduces_every_mismatch((a, b) in arb_ledgers()) {
        let a = build(Side::A, &a);
        let b = build(Side::B, &b);

        let full = reconcile(&a, &b).unwrap();
        let reduced = reduce(&a, &b);
        let again = reconcile(&reduced.reduced_a, &reduced.reduced_b).unwrap();

        prop_assert_eq!(&again.mismatches, &full.mismatches);
        prop_assert_eq!(again.meta.mismatch_delta_total_cents, full.meta.mismatch_delta_total_cents);
        prop_assert!(verify(&full, &again).passed());
        prop_assert!(reduced.rows() <= a.len() + b.len());
    }

    #[test]
    fn reconcile_is_deterministic_under_regrouping((a, b) in arb_ledgers()) {
        let a = build(Side::A, &a);
        let b = build(Side::B, &b);

        let first = serde_json::to_string(&reconcile(&a, &b).unwrap()).unwrap();
        let second = serde_json::to_string(&reconcile(&regroup(&a), &regroup(&b)).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn verify_is_reflexive((a, b) in arb_ledgers()) {
        let result = reconcile(&build(Side::A, &a), &build(Side::B, &b)).unwrap();
        prop_assert!(verify(&result, &result.clone()).passed());
    }

    #[test]
    fn mutated_sum_is_detected((a, b) in arb_ledgers(), pick in any::<prop::sample::Index>(), bump in 1i64..1000) {
        let full = reconcile(&build(Side::A, &a), &build(Side::B, &b)).unwrap();
        prop_assume!(!full.mismatches.is_empty());

        let mut tampered = full.clone();
        let i = pick.index(tampered.mismatches.len());
        tampered.mismatches[i].sum_a_cents += bump;

        let eq = verify(&full, &tampered);
        prop_assert!(
            matches!(eq.failure(), Some(EquivalenceFailure::Signatures { .. })),
            "expected signature failure, got {}", eq
        );
    }

    #[test]
    fn mismatch_invariant_holds((a, b) in arb_ledgers()) {
        let result = reconcile(&build(Side::A, &a), &build(Side::B, &b)).unwrap();
        prop_assert_eq!(result.meta.mismatch_count, result.mismatches.len());
        for m in &result.mismatches {
            prop_assert!(m.count_a != m.count_b || m.sum_a_cents != m.sum_b_cents);
            prop_assert!(m.sample_tx_a.len() <= 3 && m.sample_tx_b.len() <= 3);
        }
        let delta: i64 = result.mismatches.iter().map(|m| m.delta_cents().unwrap()).sum();
        prop_assert_eq!(delta, result.meta.mismatch_delta_total_cents);
    }
}
