// File I/O for ledgers and proof artifacts

pub mod error;
pub mod json;
pub mod ledger_csv;
pub mod manifest;

pub use error::IoError;
pub use json::{read_result, to_canonical_json, write_json, write_result};
pub use ledger_csv::{load_ledger, read_ledger, write_ledger, write_rows, LoadedLedger};
pub use manifest::{sha256_file, write_manifest};
