use super::model::{Dataset, Listing};

// ---------------------------------------------------------------------------
// Filter predicate: inclusive price bounds
// ---------------------------------------------------------------------------

/// Inclusive `[min, max]` price range. Bounds are not validated: `min > max`
/// simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        PriceRange { min, max }
    }

    /// `min <= price <= max`. NaN never matches.
    pub fn contains(&self, price: f64) -> bool {
        self.min <= price && price <= self.max
    }

    fn accepts(&self, row: &Listing) -> bool {
        self.contains(row.price.value)
    }
}

/// Return indices of rows whose price lies inside `range`, in input order.
pub fn filtered_indices(dataset: &Dataset, range: PriceRange) -> Vec<usize> {
    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| range.accepts(row))
        .map(|(i, _)| i)
        .collect()
}

/// Drop every row outside `range`. Relative order of the kept rows is
/// unchanged.
pub fn retain_price_range(mut dataset: Dataset, range: PriceRange) -> Dataset {
    dataset.rows.retain(|row| range.accepts(row));
    dataset
}
