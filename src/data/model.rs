use std::borrow::Cow;
use std::fmt;

use chrono::NaiveDate;

use super::dates;

/// Column holding the nightly price.
pub const PRICE_COLUMN: &str = "price";
/// Column holding the date of the most recent review.
pub const LAST_REVIEW_COLUMN: &str = "last_review";

// ---------------------------------------------------------------------------
// Price – the numeric filter column
// ---------------------------------------------------------------------------

/// A parsed price together with the exact text it was read from, so the
/// value is written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Price {
    pub value: f64,
    pub text: String,
}

impl Price {
    /// Parse a price cell. Empty cells become NaN (they never fall inside a
    /// range); anything else must be a number.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let value = if trimmed.is_empty() {
            f64::NAN
        } else {
            trimmed.parse::<f64>().ok()?
        };
        Some(Price {
            value,
            text: text.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// ReviewDate – the `last_review` cell before and after normalisation
// ---------------------------------------------------------------------------

/// State of a `last_review` cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDate {
    /// Text as loaded, not yet interpreted.
    Raw(String),
    /// Successfully parsed calendar date.
    Date(NaiveDate),
    /// Empty or unparseable input.
    Missing,
}

impl ReviewDate {
    /// Interpret a raw cell as a date. Already-normalised values are kept.
    pub fn normalize(&self) -> ReviewDate {
        match self {
            ReviewDate::Raw(text) => match dates::parse_date(text) {
                Some(date) => ReviewDate::Date(date),
                None => ReviewDate::Missing,
            },
            other => other.clone(),
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            ReviewDate::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Text written to the output file.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            ReviewDate::Raw(text) => Cow::Borrowed(text.as_str()),
            ReviewDate::Date(d) => Cow::Owned(dates::format_date(Some(*d))),
            ReviewDate::Missing => Cow::Owned(dates::format_date(None)),
        }
    }
}

impl fmt::Display for ReviewDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewDate::Missing => write!(f, "<missing>"),
            other => write!(f, "{}", other.render()),
        }
    }
}

// ---------------------------------------------------------------------------
// Listing – one row of the dataset
// ---------------------------------------------------------------------------

/// A single row with the two inspected columns typed and every other cell
/// kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub price: Price,
    pub last_review: ReviewDate,
    /// Remaining cells in header order (price and last_review excluded).
    pub passthrough: Vec<String>,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table. Header order is preserved for writing.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    price_idx: usize,
    last_review_idx: usize,
    /// All rows, in file order.
    pub rows: Vec<Listing>,
}

impl Dataset {
    /// Build an empty dataset from a header. Fails with the name of the
    /// first required column that is absent.
    pub fn with_headers(headers: Vec<String>) -> Result<Self, &'static str> {
        let price_idx = headers
            .iter()
            .position(|h| h == PRICE_COLUMN)
            .ok_or(PRICE_COLUMN)?;
        let last_review_idx = headers
            .iter()
            .position(|h| h == LAST_REVIEW_COLUMN)
            .ok_or(LAST_REVIEW_COLUMN)?;
        Ok(Dataset {
            headers,
            price_idx,
            last_review_idx,
            rows: Vec::new(),
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn price_index(&self) -> usize {
        self.price_idx
    }

    pub fn last_review_index(&self) -> usize {
        self.last_review_idx
    }

    /// Names of the columns carried through untouched, in header order.
    pub fn passthrough_columns(&self) -> impl Iterator<Item = &str> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.price_idx && *i != self.last_review_idx)
            .map(|(_, h)| h.as_str())
    }

    /// Reassemble a row into cells matching `headers()`.
    pub fn record<'a>(&self, row: &'a Listing) -> Vec<Cow<'a, str>> {
        let mut passthrough = row.passthrough.iter();
        (0..self.headers.len())
            .map(|i| {
                if i == self.price_idx {
                    Cow::Borrowed(row.price.text.as_str())
                } else if i == self.last_review_idx {
                    row.last_review.render()
                } else {
                    Cow::Borrowed(passthrough.next().map(String::as_str).unwrap_or(""))
                }
            })
            .collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
