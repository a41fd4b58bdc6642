//! CSV sink for a finished [`PriceTable`].

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::DownloadError;
use crate::table::{PriceRow, PriceTable};

/// Serializes `records` as CSV with a header row to `writer`.
pub fn write_records<W: Write, T: Serialize>(
    writer: W,
    records: &[T],
) -> Result<(), DownloadError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the whole table to `writer`.
pub fn write_csv<W: Write>(table: &PriceTable, writer: W) -> Result<(), DownloadError> {
    write_records(writer, table.rows())
}

/// Writes the whole table to one CSV file.
pub fn write_combined(table: &PriceTable, path: &Path) -> Result<(), DownloadError> {
    let file = std::fs::File::create(path).map_err(|e| {
        DownloadError::Output(format!("Failed to create {}: {}", path.display(), e))
    })?;
    write_csv(table, file)?;
    tracing::info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Writes one `{TICKER}.csv` per ticker into `dir`, creating it if needed.
///
/// Returns the paths written, in ticker order.
pub fn write_per_ticker(table: &PriceTable, dir: &Path) -> Result<Vec<PathBuf>, DownloadError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        DownloadError::Output(format!("Failed to create directory {}: {}", dir.display(), e))
    })?;

    let mut written = Vec::new();
    for (ticker, rows) in table.by_ticker() {
        let path = dir.join(format!("{}.csv", ticker));
        let file = std::fs::File::create(&path).map_err(|e| {
            DownloadError::Output(format!("Failed to create {}: {}", path.display(), e))
        })?;
        write_records::<_, PriceRow>(file, rows)?;
        written.push(path);
    }
    tracing::info!("Wrote {} per-ticker files to {}", written.len(), dir.display());
    Ok(written)
}
