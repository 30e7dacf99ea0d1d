// Ledger CSV import/export

use std::io::Read;
use std::path::{Path, PathBuf};

use rem_recon::model::{RawRow, Side, TxRecord};
use rem_recon::parse_ledger;

use crate::error::IoError;

/// A validated ledger plus the header row it was read with.
#[derive(Debug, Clone)]
pub struct LoadedLedger {
    pub headers: Vec<String>,
    pub records: Vec<TxRecord>,
}

/// Read header + rows from any reader. Ragged rows are an error.
pub fn read_rows<R: Read>(reader: R) -> Result<(Vec<String>, Vec<RawRow>), csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(RawRow::from_pairs(
            headers.iter().cloned().zip(record.iter().map(|v| v.to_string())),
        ));
    }

    Ok((headers, rows))
}

/// Read and validate one ledger from a reader. `path` is only used in errors.
pub fn read_ledger<R: Read>(side: Side, reader: R, path: &Path) -> Result<LoadedLedger, IoError> {
    let (headers, rows) = read_rows(reader).map_err(|source| IoError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_ledger(side, rows).map_err(|source| IoError::Record {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LoadedLedger { headers, records })
}

pub fn load_ledger(side: Side, path: &Path) -> Result<LoadedLedger, IoError> {
    let file = std::fs::File::open(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let ledger = read_ledger(side, std::io::BufReader::new(file), path)?;
    tracing::info!(%side, path = %path.display(), rows = ledger.records.len(), "loaded ledger");
    Ok(ledger)
}

/// Write records with the given column order. Missing columns are written empty.
pub fn write_ledger(path: &Path, headers: &[String], records: &[TxRecord]) -> Result<(), IoError> {
    write_rows(path, headers, records.iter().map(|r| &r.raw))
}

/// Write raw rows with the given column order.
pub fn write_rows<'a, I>(path: &Path, headers: &[String], rows: I) -> Result<(), IoError>
where
    I: IntoIterator<Item = &'a RawRow>,
{
    let csv_err = |source| IoError::Csv {
        path: PathBuf::from(path),
        source,
    };

    let mut writer = csv::WriterBuilder::new().from_path(path).map_err(csv_err)?;
    writer.write_record(headers).map_err(csv_err)?;
    let mut written = 0usize;
    for raw in rows {
        let row: Vec<&str> = headers.iter().map(|h| raw.get(h).unwrap_or("")).collect();
        writer.write_record(&row).map_err(csv_err)?;
        written += 1;
    }
    writer.flush().map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), rows = written, "wrote ledger");
    Ok(())
}
