use std::path::PathBuf;

use rem_recon::ReconError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Csv {
        path: PathBuf,
        source: csv::Error,
    },
    #[error("{}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Row-level validation failure while loading a ledger.
    #[error("{}: {source}", path.display())]
    Record {
        path: PathBuf,
        source: ReconError,
    },
}
