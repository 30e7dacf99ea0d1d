// SHA-256 audit manifest

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::IoError;

const CHUNK: usize = 1 << 20;

/// Hex SHA-256 of a file, read in 1 MiB chunks.
pub fn sha256_file(path: &Path) -> Result<String, IoError> {
    let read_err = |source| IoError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(read_err)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK];
    loop {
        let n = file.read(&mut buf).map_err(read_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Write `"<hash>  <path>"` lines for `files`, sorted, each newline-terminated.
///
/// Paths are written as given. Returns the lines so callers can report them.
pub fn write_manifest(path: &Path, files: &[PathBuf]) -> Result<Vec<String>, IoError> {
    let mut lines = Vec::with_capacity(files.len());
    for file in files {
        lines.push(format!("{}  {}", sha256_file(file)?, file.display()));
    }
    lines.sort();

    let mut text = String::new();
    for line in &lines {
        text.push_str(line);
        text.push('\n');
    }
    std::fs::write(path, text).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), files = lines.len(), "wrote manifest");
    Ok(lines)
}
