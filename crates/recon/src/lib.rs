//! `rem-recon`: deterministic two-ledger reconciliation with a reduction proof.
//!
//! Pure engine crate: receives pre-loaded rows, returns structured results.
//! No CLI or IO dependencies.
//!
//! Pipeline: [`reconcile`] the full ledgers, [`reduce`] them to mismatch
//! candidates, reconcile the reduced ledgers, then [`verify`] that both
//! results are equivalent.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod model;
pub mod reducer;
pub mod verify;

pub use config::ProofConfig;
pub use engine::{prove, reconcile, reconcile_rows, ProofRun};
pub use error::{RecordProblem, ReconError};
pub use ingest::parse_ledger;
pub use model::{
    Direction, JoinKey, MismatchGroup, RawRow, ReconMeta, ReconResult, ReductionKey, Side, TxRecord,
};
pub use reducer::{reduce, ReducedDataset, ReductionStats};
pub use verify::{verify, Equivalence, EquivalenceFailure, EquivalenceReport};
