use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::error::AggregationError;
use super::filter::FilteredView;
use super::model::{columns, CellValue, Listing};

/// Mean of one numeric column for a single Region.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub key: CellValue,
    pub mean: f64,
    /// Number of listings in the group.
    pub count: usize,
}

/// Summary statistics and chart series for one filtered view.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    pub property_count: usize,
    /// Mean Rent; `None` when the view is empty and the mean is undefined.
    pub average_rent: Option<f64>,
    /// Ascending by mean Rent, ties by Region.
    pub rent_by_region: Vec<GroupMean>,
    /// Ascending by mean Days in the Market, ties by Region.
    pub days_on_market_by_region: Vec<GroupMean>,
    /// One entry per distinct listing date, ascending.
    pub listing_volume_by_date: Vec<(NaiveDate, usize)>,
}

/// Compute every dashboard aggregate over `view` in one pass.
///
/// Rent and Days in the Market must be numeric on every row of the view;
/// the first offending cell aborts the whole aggregation.
pub fn aggregate(view: &FilteredView<'_>) -> Result<AggregateResult, AggregationError> {
    let mut rent_total = 0.0f64;
    // Region → (sum, count)
    let mut rent_groups: BTreeMap<&CellValue, (f64, usize)> = BTreeMap::new();
    let mut days_groups: BTreeMap<&CellValue, (f64, usize)> = BTreeMap::new();
    let mut volume: BTreeMap<NaiveDate, usize> = BTreeMap::new();

    for (row, listing) in view.iter() {
        let rent = numeric(row, columns::RENT, &listing.rent)?;
        let days = numeric(row, columns::DAYS_ON_MARKET, &listing.days_on_market)?;

        rent_total += rent;
        accumulate(&mut rent_groups, listing, rent);
        accumulate(&mut days_groups, listing, days);
        *volume.entry(listing.listing_date).or_insert(0) += 1;
    }

    let property_count = view.len();
    let average_rent = if property_count == 0 {
        None
    } else {
        Some(rent_total / property_count as f64)
    };

    log::debug!(
        "aggregated {property_count} listings across {} regions and {} dates",
        rent_groups.len(),
        volume.len()
    );

    Ok(AggregateResult {
        property_count,
        average_rent,
        rent_by_region: sorted_means(rent_groups),
        days_on_market_by_region: sorted_means(days_groups),
        listing_volume_by_date: volume.into_iter().collect(),
    })
}

fn numeric(row: usize, column: &'static str, value: &CellValue) -> Result<f64, AggregationError> {
    value.as_f64().ok_or_else(|| AggregationError::NonNumeric {
        row,
        column,
        value: value.to_string(),
    })
}

fn accumulate<'a>(groups: &mut BTreeMap<&'a CellValue, (f64, usize)>, listing: &'a Listing, v: f64) {
    let entry = groups.entry(&listing.region).or_insert((0.0, 0));
    entry.0 += v;
    entry.1 += 1;
}

/// Turn per-group sums into means sorted ascending by mean.
///
/// The map iterates in Region order and the sort is stable, so equal means
/// stay in Region order.
fn sorted_means(groups: BTreeMap<&CellValue, (f64, usize)>) -> Vec<GroupMean> {
    let mut means: Vec<GroupMean> = groups
        .into_iter()
        .map(|(key, (sum, count))| GroupMean {
            key: key.clone(),
            mean: sum / count as f64,
            count,
        })
        .collect();
    means.sort_by(|a, b| a.mean.total_cmp(&b.mean));
    means
}
