//! Equivalence of a reduced reconciliation against the full one.
//!
//! Three checks, in order, stopping at the first failure:
//! 1. same `mismatch_count`
//! 2. same sorted mismatch signatures `(join_key, count_A, count_B, sum_A, sum_B)`
//! 3. same signed `mismatch_delta_total`
//!
//! Dataset totals (`totalA`, `totalB`) are never compared; the reduced run is
//! expected to carry less money.

use std::fmt;

use serde::Serialize;

use crate::model::ReconResult;

pub const PASS_MESSAGE: &str =
    "PASS: reduced reconciliation is equivalent to full reconciliation (mismatches + mismatch-delta totals).";

/// Which equivalence check broke. A normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum EquivalenceFailure {
    MismatchCount { full: usize, reduced: usize },
    Signatures {
        /// Index of the first differing signature in sorted order.
        first_divergence: usize,
    },
    DeltaTotal { full: i64, reduced: i64 },
}

impl fmt::Display for EquivalenceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MismatchCount { full, reduced } => write!(
                f,
                "FAIL: mismatch_count differs (full={full} reduced={reduced})."
            ),
            Self::Signatures { .. } => {
                write!(f, "FAIL: mismatch signatures differ (join_key/count/sums).")
            }
            Self::DeltaTotal { .. } => write!(
                f,
                "FAIL: mismatch delta total differs (sumA-sumB across mismatches)."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Equivalence {
    Pass,
    Fail(EquivalenceFailure),
}

impl Equivalence {
    pub fn passed(&self) -> bool {
        matches!(self, Self::Pass)
    }

    pub fn failure(&self) -> Option<&EquivalenceFailure> {
        match self {
            Self::Pass => None,
            Self::Fail(f) => Some(f),
        }
    }

    /// Single-line audit message.
    pub fn message(&self) -> String {
        match self {
            Self::Pass => PASS_MESSAGE.to_string(),
            Self::Fail(f) => f.to_string(),
        }
    }

    pub fn report(&self) -> EquivalenceReport {
        EquivalenceReport {
            passed: self.passed(),
            message: self.message(),
            failure: self.failure().cloned(),
        }
    }
}

impl fmt::Display for Equivalence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Serializable view of an [`Equivalence`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquivalenceReport {
    pub passed: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<EquivalenceFailure>,
}

pub fn verify(full: &ReconResult, reduced: &ReconResult) -> Equivalence {
    let (f, r) = (&full.meta, &reduced.meta);

    if f.mismatch_count != r.mismatch_count {
        return Equivalence::Fail(EquivalenceFailure::MismatchCount {
            full: f.mismatch_count,
            reduced: r.mismatch_count,
        });
    }

    let full_sigs = full.sorted_signatures();
    let reduced_sigs = reduced.sorted_signatures();
    if full_sigs != reduced_sigs {
        let first_divergence = full_sigs
            .iter()
            .zip(&reduced_sigs)
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| full_sigs.len().min(reduced_sigs.len()));
        return Equivalence::Fail(EquivalenceFailure::Signatures { first_divergence });
    }

    if f.mismatch_delta_total_cents != r.mismatch_delta_total_cents {
        return Equivalence::Fail(EquivalenceFailure::DeltaTotal {
            full: f.mismatch_delta_total_cents,
            reduced: r.mismatch_delta_total_cents,
        });
    }

    Equivalence::Pass
}
