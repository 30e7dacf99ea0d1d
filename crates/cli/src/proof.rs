//! File-level proof: reconcile, reduce, persist, then verify from disk.
//!
//! `run_proof` writes every artifact plus a SHA-256 manifest; `verify_proof`
//! only trusts what it reads back from the output directory.

use std::path::{Path, PathBuf};

use rem_recon::model::Side;
use rem_recon::{prove, verify, Equivalence, ProofConfig, ReconError, ReductionStats};
use rem_recon_io::{
    load_ledger, read_result, write_ledger, write_manifest, write_result, IoError,
};
use serde::Serialize;
use thiserror::Error;

/// A proof run fails on file handling or on reconciliation itself.
#[derive(Debug, Error)]
pub enum ProofError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Recon(#[from] ReconError),
}

/// What a proof run produced, for the human summary and `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct ProofSummary {
    pub full_mismatches: usize,
    pub reduced_mismatches: usize,
    pub mismatch_delta_total_cents: i64,
    #[serde(flatten)]
    pub reduction: ReductionStats,
    /// In-memory verdict. `verify_proof` re-checks from the written files.
    pub equivalent: bool,
    pub manifest: PathBuf,
}

impl ProofSummary {
    pub fn full_rows(&self) -> usize {
        self.reduction.full_rows_a + self.reduction.full_rows_b
    }

    pub fn reduced_rows(&self) -> usize {
        self.reduction.reduced_rows_a + self.reduction.reduced_rows_b
    }
}

#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub equivalence: Equivalence,
    pub report: PathBuf,
}

fn ensure_dir(dir: &Path) -> Result<(), IoError> {
    std::fs::create_dir_all(dir).map_err(|source| IoError::Write {
        path: dir.to_path_buf(),
        source,
    })
}

pub fn run_proof(
    config: &ProofConfig,
    data_dir: &Path,
    out_dir: &Path,
) -> Result<ProofSummary, ProofError> {
    ensure_dir(out_dir)?;

    let path_a = data_dir.join(&config.inputs.ledger_a);
    let path_b = data_dir.join(&config.inputs.ledger_b);
    let ledger_a = load_ledger(Side::A, &path_a)?;
    let ledger_b = load_ledger(Side::B, &path_b)?;

    let run = prove(&ledger_a.records, &ledger_b.records)?;

    let out = &config.outputs;
    let full_path = out_dir.join(&out.full_result);
    let reduced_a_path = out_dir.join(&out.reduced_a);
    let reduced_b_path = out_dir.join(&out.reduced_b);
    let reduced_path = out_dir.join(&out.reduced_result);
    let manifest_path = out_dir.join(&out.manifest);

    write_result(&full_path, &run.full)?;
    write_ledger(&reduced_a_path, &ledger_a.headers, &run.reduced_dataset.reduced_a)?;
    write_ledger(&reduced_b_path, &ledger_b.headers, &run.reduced_dataset.reduced_b)?;
    write_result(&reduced_path, &run.reduced)?;
    write_manifest(
        &manifest_path,
        &[path_a, path_b, full_path, reduced_a_path, reduced_b_path, reduced_path],
    )?;

    Ok(ProofSummary {
        full_mismatches: run.full.meta.mismatch_count,
        reduced_mismatches: run.reduced.meta.mismatch_count,
        mismatch_delta_total_cents: run.full.meta.mismatch_delta_total_cents,
        reduction: run
            .reduced_dataset
            .stats(ledger_a.records.len(), ledger_b.records.len()),
        equivalent: run.equivalence.passed(),
        manifest: manifest_path,
    })
}

/// Read both persisted results, compare them, write the one-line report.
pub fn verify_proof(config: &ProofConfig, out_dir: &Path) -> Result<VerifyOutcome, IoError> {
    let out = &config.outputs;
    let full = read_result(&out_dir.join(&out.full_result))?;
    let reduced = read_result(&out_dir.join(&out.reduced_result))?;

    let equivalence = verify(&full, &reduced);

    let report = out_dir.join(&out.report);
    std::fs::write(&report, format!("{}\n", equivalence.message())).map_err(|source| {
        IoError::Write {
            path: report.clone(),
            source,
        }
    })?;

    if equivalence.passed() {
        tracing::info!(report = %report.display(), "equivalence verified");
    } else {
        tracing::warn!(report = %report.display(), reason = %equivalence.message(), "equivalence failed");
    }

    Ok(VerifyOutcome { equivalence, report })
}
