use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::error::FilterError;
use super::model::{CellValue, FilterColumn, Listing, ListingDataset};

// ---------------------------------------------------------------------------
// Filter selection: what the user picked in the sidebar
// ---------------------------------------------------------------------------

/// Inclusive listing-date window. Construction guarantees `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FilterError> {
        if start > end {
            return Err(FilterError::InvertedDateRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Per-column chosen values plus an optional date window.
///
/// An absent or empty value set means "no restriction on that column".
/// A missing date range means the full span of the dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    pub values: BTreeMap<FilterColumn, BTreeSet<CellValue>>,
    pub date_range: Option<DateRange>,
}

impl FilterSelection {
    /// Add one chosen value for a column.
    pub fn with_value(mut self, column: FilterColumn, value: impl Into<CellValue>) -> Self {
        self.values.entry(column).or_default().insert(value.into());
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Chosen values for a column (empty when unrestricted).
    pub fn chosen(&self, column: FilterColumn) -> impl Iterator<Item = &CellValue> {
        self.values.get(&column).into_iter().flatten()
    }

    pub fn toggle(&mut self, column: FilterColumn, value: &CellValue) {
        let selected = self.values.entry(column).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
    }

    pub fn clear(&mut self, column: FilterColumn) {
        self.values.remove(&column);
    }
}

// ---------------------------------------------------------------------------
// Predicate construction
// ---------------------------------------------------------------------------

/// One conjunct of the row filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<'a> {
    /// The column's value must be one of the chosen values.
    OneOf(FilterColumn, &'a BTreeSet<CellValue>),
    /// The listing date must fall inside the window, both ends inclusive.
    Within(DateRange),
}

impl Predicate<'_> {
    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            Predicate::OneOf(col, chosen) => chosen.contains(listing.filter_value(*col)),
            Predicate::Within(range) => range.contains(listing.listing_date),
        }
    }
}

/// Turn a selection into the list of predicates a row must all satisfy.
///
/// Empty value sets contribute no predicate at all, so "nothing chosen" can
/// never be confused with "chose something that matches nothing". A missing
/// date range falls back to the dataset's own bounds.
pub fn build_predicates<'a>(
    dataset: &ListingDataset,
    selection: &'a FilterSelection,
) -> Vec<Predicate<'a>> {
    let mut predicates: Vec<Predicate<'a>> = selection
        .values
        .iter()
        .filter(|(_, chosen)| !chosen.is_empty())
        .map(|(col, chosen)| Predicate::OneOf(*col, chosen))
        .collect();

    let range = selection.date_range.or_else(|| {
        dataset
            .date_bounds
            .map(|(start, end)| DateRange { start, end })
    });
    if let Some(range) = range {
        predicates.push(Predicate::Within(range));
    }
    predicates
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Read-only subset of a dataset: the dataset itself plus matching row indices.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a ListingDataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Positions of the matching rows in the dataset, ascending.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Matching listings paired with their dataset row index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a Listing)> + '_ {
        let listings = &self.dataset.listings;
        self.indices.iter().map(move |&i| (i, &listings[i]))
    }
}

/// Return the view of listings that pass every active filter.
///
/// Malformed selections cannot reach this point: an inverted date window is
/// refused when the [`DateRange`] is built.
pub fn apply<'a>(dataset: &'a ListingDataset, selection: &FilterSelection) -> FilteredView<'a> {
    let predicates = build_predicates(dataset, selection);
    let indices: Vec<usize> = dataset
        .listings
        .iter()
        .enumerate()
        .filter(|(_, listing)| predicates.iter().all(|p| p.matches(listing)))
        .map(|(i, _)| i)
        .collect();

    log::debug!(
        "filter kept {} of {} listings ({} predicates)",
        indices.len(),
        dataset.len(),
        predicates.len()
    );
    FilteredView { dataset, indices }
}
