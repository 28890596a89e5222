//! CSV ingestion of transaction rows.
//!
//! Every cell is coerced to a finite number: anything that fails to parse,
//! parses to NaN or infinity, or is missing from a short record becomes
//! 0.0. The scorer never sees malformed input.

use crate::types::row::Row;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while reading transaction data
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{0} is not a CSV file")]
    NotCsv(PathBuf),

    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV input has no header row")]
    MissingHeader,

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Parsed CSV contents
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    /// Cells that did not parse as finite numbers and were read as 0.0
    pub coerced_cells: usize,
}

/// Read a `.csv` file from disk
pub fn read_csv_file<P: AsRef<Path>>(path: P) -> Result<Dataset, IngestError> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if !is_csv {
        return Err(IngestError::NotCsv(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|source| IngestError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let dataset = read_csv(file)?;
    info!(
        path = %path.display(),
        rows = dataset.rows.len(),
        columns = dataset.headers.len(),
        coerced_cells = dataset.coerced_cells,
        "Loaded transaction data"
    );
    Ok(dataset)
}

/// Parse CSV text with a header row into numeric rows
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(IngestError::MissingHeader);
    }

    let mut rows = Vec::new();
    let mut coerced_cells = 0;

    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        let mut row = Row::new();

        for (i, header) in headers.iter().enumerate() {
            let value = match record.get(i) {
                Some(cell) => match cell.parse::<f64>() {
                    Ok(v) if v.is_finite() => v,
                    _ => {
                        coerced_cells += 1;
                        debug!(row = idx, column = %header, cell = %cell, "Cell read as 0");
                        0.0
                    }
                },
                None => 0.0,
            };
            row.insert(header, value);
        }

        rows.push(row);
    }

    if coerced_cells > 0 {
        warn!(coerced_cells, "Non-numeric cells were read as 0");
    }

    Ok(Dataset {
        headers,
        rows,
        coerced_cells,
    })
}
