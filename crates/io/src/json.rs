// Canonical JSON for proof artifacts

use std::path::Path;

use rem_recon::ReconResult;
use serde::Serialize;

use crate::error::IoError;

/// Pretty JSON (2-space indent) with object keys sorted at every level, plus
/// a trailing newline. Same value in, same bytes out.
///
/// Struct fields serialize in declaration order; going through `Value` puts
/// every object into `serde_json`'s `BTreeMap`-backed `Map`, which sorts them.
/// Requires `serde_json` without `preserve_order`.
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    let mut out = serde_json::to_string_pretty(&value)?;
    out.push('\n');
    Ok(out)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), IoError> {
    let text = to_canonical_json(value).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, text).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "wrote json");
    Ok(())
}

pub fn write_result(path: &Path, result: &ReconResult) -> Result<(), IoError> {
    write_json(path, result)
}

pub fn read_result(path: &Path) -> Result<ReconResult, IoError> {
    let text = std::fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })
}
