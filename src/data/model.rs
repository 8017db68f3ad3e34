use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;

/// Header names of the columns the dashboard depends on.
pub mod columns {
    pub const REGION: &str = "Region";
    pub const SUBURB: &str = "Suburb";
    pub const BEDROOMS: &str = "Bedrooms";
    pub const BATHROOMS: &str = "Number of Bathrooms";
    pub const LISTING_DATE: &str = "Property Listing Date";
    pub const RENT: &str = "Rent";
    pub const DAYS_ON_MARKET: &str = "Days in the Market";

    /// Every column a source must provide, in sheet order.
    pub const REQUIRED: [&str; 7] = [
        REGION,
        SUBURB,
        BEDROOMS,
        BATHROOMS,
        LISTING_DATE,
        RENT,
        DAYS_ON_MARKET,
    ];
}

// ---------------------------------------------------------------------------
// CellValue – a single cell of the source sheet
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value, as read from the spreadsheet.
/// Used as a `BTreeMap` / `BTreeSet` key downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "(blank)"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl CellValue {
    /// Build a numeric cell, folding integral floats into `Integer`.
    ///
    /// Spreadsheets store every number as a float, so `3.0` bedrooms must
    /// compare equal to the `3` typed into a CSV.
    pub fn from_f64(v: f64) -> Self {
        if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            CellValue::Integer(v as i64)
        } else {
            CellValue::Float(v)
        }
    }

    /// Interpret the value as an `f64` for aggregation. NaN is not a number here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// FilterColumn – the categorical columns exposed in the sidebar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterColumn {
    Region,
    Suburb,
    Bedrooms,
    Bathrooms,
}

impl FilterColumn {
    pub const ALL: [FilterColumn; 4] = [
        FilterColumn::Region,
        FilterColumn::Suburb,
        FilterColumn::Bedrooms,
        FilterColumn::Bathrooms,
    ];

    /// Header name in the source sheet.
    pub fn header(self) -> &'static str {
        match self {
            FilterColumn::Region => columns::REGION,
            FilterColumn::Suburb => columns::SUBURB,
            FilterColumn::Bedrooms => columns::BEDROOMS,
            FilterColumn::Bathrooms => columns::BATHROOMS,
        }
    }

    /// Sidebar prompt.
    pub fn label(self) -> &'static str {
        match self {
            FilterColumn::Region => "Select the Region:",
            FilterColumn::Suburb => "Select the Suburb:",
            FilterColumn::Bedrooms => "Select Number of Bedrooms:",
            FilterColumn::Bathrooms => "Select Number of Bathrooms:",
        }
    }
}

// ---------------------------------------------------------------------------
// Listing – one row of the source sheet
// ---------------------------------------------------------------------------

/// A single rental listing. Row identity is its position in the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub region: CellValue,
    pub suburb: CellValue,
    pub bedrooms: CellValue,
    pub bathrooms: CellValue,
    /// Always a real date: the loader refuses rows it cannot parse.
    pub listing_date: NaiveDate,
    pub rent: CellValue,
    pub days_on_market: CellValue,
    /// Remaining columns of the sheet, carried through untouched.
    pub extra: BTreeMap<String, CellValue>,
}

impl Listing {
    /// Value of one of the sidebar-filterable columns.
    pub fn filter_value(&self, column: FilterColumn) -> &CellValue {
        match column {
            FilterColumn::Region => &self.region,
            FilterColumn::Suburb => &self.suburb,
            FilterColumn::Bedrooms => &self.bedrooms,
            FilterColumn::Bathrooms => &self.bathrooms,
        }
    }
}

// ---------------------------------------------------------------------------
// ListingDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
///
/// Built once per session and never mutated afterwards, which is what makes
/// the memoized `unique_values` and `date_bounds` safe to keep around.
#[derive(Debug, Clone, Default)]
pub struct ListingDataset {
    /// All listings (rows), in source order.
    pub listings: Vec<Listing>,
    /// Header names of the loaded column range, in source order.
    pub column_names: Vec<String>,
    /// For each filterable column the sorted set of distinct values.
    pub unique_values: BTreeMap<FilterColumn, BTreeSet<CellValue>>,
    /// Earliest and latest Property Listing Date, `None` when empty.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
}

impl ListingDataset {
    /// Build column indices from the loaded listings.
    pub fn from_listings(listings: Vec<Listing>, column_names: Vec<String>) -> Self {
        let mut unique_values: BTreeMap<FilterColumn, BTreeSet<CellValue>> = FilterColumn::ALL
            .iter()
            .map(|col| (*col, BTreeSet::new()))
            .collect();
        let mut date_bounds: Option<(NaiveDate, NaiveDate)> = None;

        for listing in &listings {
            for col in FilterColumn::ALL {
                unique_values
                    .entry(col)
                    .or_default()
                    .insert(listing.filter_value(col).clone());
            }
            let d = listing.listing_date;
            date_bounds = Some(match date_bounds {
                None => (d, d),
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
            });
        }

        ListingDataset {
            listings,
            column_names,
            unique_values,
            date_bounds,
        }
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Distinct values of a filterable column, sorted.
    pub fn distinct(&self, column: FilterColumn) -> impl Iterator<Item = &CellValue> {
        self.unique_values.get(&column).into_iter().flatten()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn listing(region: &str, rent: i64, days: i64, listed: NaiveDate) -> Listing {
        Listing {
            region: region.into(),
            suburb: CellValue::from("Central"),
            bedrooms: CellValue::Integer(2),
            bathrooms: CellValue::Integer(1),
            listing_date: listed,
            rent: CellValue::Integer(rent),
            days_on_market: CellValue::Integer(days),
            extra: BTreeMap::new(),
        }
    }

    /// The three-row dataset used throughout the aggregation scenarios.
    pub(crate) fn scenario_dataset() -> ListingDataset {
        ListingDataset::from_listings(
            vec![
                listing("Auckland", 500, 10, date(2023, 1, 1)),
                listing("Auckland", 600, 20, date(2023, 1, 2)),
                listing("Wellington", 400, 5, date(2023, 1, 1)),
            ],
            columns::REQUIRED.iter().map(|c| c.to_string()).collect(),
        )
    }

    #[test]
    fn integral_floats_fold_into_integers() {
        assert_eq!(CellValue::from_f64(3.0), CellValue::Integer(3));
        assert_eq!(CellValue::from_f64(1.5), CellValue::Float(1.5));
        assert!(matches!(CellValue::from_f64(f64::NAN), CellValue::Float(_)));
    }

    #[test]
    fn nan_and_text_are_not_numeric() {
        assert_eq!(CellValue::Float(f64::NAN).as_f64(), None);
        assert_eq!(CellValue::from("$500").as_f64(), None);
        assert_eq!(CellValue::Null.as_f64(), None);
        assert_eq!(CellValue::Integer(500).as_f64(), Some(500.0));
    }

    #[test]
    fn dataset_indexes_distinct_values_and_date_bounds() {
        let ds = scenario_dataset();
        let regions: Vec<String> = ds
            .distinct(FilterColumn::Region)
            .map(|v| v.to_string())
            .collect();
        assert_eq!(regions, vec!["Auckland", "Wellington"]);
        assert_eq!(ds.date_bounds, Some((date(2023, 1, 1), date(2023, 1, 2))));
    }

    #[test]
    fn empty_dataset_has_no_date_bounds() {
        let ds = ListingDataset::from_listings(Vec::new(), Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.date_bounds, None);
        assert_eq!(ds.distinct(FilterColumn::Suburb).count(), 0);
    }
}
