use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::model::{Dataset, Listing, Price, ReviewDate, PRICE_COLUMN};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("opening {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("input has no header row")]
    Empty,

    #[error("CSV line {line}: {source}")]
    Csv {
        line: usize,
        #[source]
        source: csv::Error,
    },

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("line {line}: '{value}' in column '{column}' is not a number")]
    NotNumeric {
        line: usize,
        column: &'static str,
        value: String,
    },
}

impl DataError {
    /// Whether the file itself could not be read or tokenised, as opposed to
    /// the content failing a column requirement.
    pub fn is_read_failure(&self) -> bool {
        matches!(
            self,
            DataError::Open { .. } | DataError::Empty | DataError::Csv { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a listings dataset from a CSV file with a header row.
pub fn load_csv(path: &Path) -> Result<Dataset, DataError> {
    let reader = csv::Reader::from_path(path).map_err(|source| DataError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_dataset(reader)
}

/// Load a listings dataset from any reader, e.g. an in-memory buffer.
pub fn load_reader<R: Read>(rdr: R) -> Result<Dataset, DataError> {
    read_dataset(csv::Reader::from_reader(rdr))
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Header row → column names; `price` and `last_review` are required, all
/// other columns are kept verbatim. Errors carry 1-based file line numbers.
fn read_dataset<R: Read>(mut reader: csv::Reader<R>) -> Result<Dataset, DataError> {
    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| DataError::Csv { line: 1, source })?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.is_empty() {
        return Err(DataError::Empty);
    }

    let mut dataset = Dataset::with_headers(headers).map_err(DataError::MissingColumn)?;
    let price_idx = dataset.price_index();
    let review_idx = dataset.last_review_index();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        // Data rows start on line 2, after the header.
        let line = row_no + 2;
        let record = result.map_err(|source| DataError::Csv { line, source })?;

        let price_text = record.get(price_idx).unwrap_or("");
        let price = Price::parse(price_text).ok_or_else(|| DataError::NotNumeric {
            line,
            column: PRICE_COLUMN,
            value: price_text.to_string(),
        })?;
        let last_review = ReviewDate::Raw(record.get(review_idx).unwrap_or("").to_string());

        let passthrough = record
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != price_idx && *i != review_idx)
            .map(|(_, v)| v.to_string())
            .collect();

        rows.push(Listing {
            price,
            last_review,
            passthrough,
        });
    }

    dataset.rows = rows;
    Ok(dataset)
}
