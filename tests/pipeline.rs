use std::collections::BTreeSet;

use chrono::NaiveDate;
use tempfile::TempDir;

use trademe_dashboard::config::LoadOptions;
use trademe_dashboard::data::aggregate::aggregate;
use trademe_dashboard::data::charts::{dashboard_charts, Orientation};
use trademe_dashboard::data::filter::{apply, DateRange, FilterSelection};
use trademe_dashboard::data::loader::load_file;
use trademe_dashboard::data::model::{CellValue, FilterColumn, ListingDataset};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Sixty listings over five regions, three bedroom counts and two months.
fn load_fixture(dir: &TempDir) -> ListingDataset {
    let regions = ["Auckland", "Wellington", "Canterbury", "Waikato", "Otago"];
    let mut text = String::from(
        "Region,Suburb,Bedrooms,Number of Bathrooms,Property Listing Date,Rent,Days in the Market,Property Type,Furnished,Pets OK\n",
    );
    for i in 0..60 {
        let region = regions[i % regions.len()];
        let bedrooms = 1 + i % 3;
        let bathrooms = 1 + i % 2;
        let listed = date(2023, 1 + (i % 2) as u32, 1 + (i % 28) as u32);
        let rent = 350 + 25 * (i % 7) + 40 * bedrooms;
        let days = 3 + (i * 7) % 40;
        text.push_str(&format!(
            "{region},Suburb {},{bedrooms},{bathrooms},{listed},{rent},{days},House,No,Yes\n",
            i % 4
        ));
    }
    let path = dir.path().join("listings.csv");
    std::fs::write(&path, text).unwrap();
    load_file(&path, &LoadOptions::default()).unwrap()
}

fn selections() -> Vec<FilterSelection> {
    vec![
        FilterSelection::default(),
        FilterSelection::default().with_value(FilterColumn::Region, "Otago"),
        FilterSelection::default()
            .with_value(FilterColumn::Region, "Auckland")
            .with_value(FilterColumn::Region, "Waikato")
            .with_value(FilterColumn::Bedrooms, 2i64),
        FilterSelection::default()
            .with_value(FilterColumn::Suburb, "Suburb 1")
            .with_date_range(DateRange::new(date(2023, 1, 10), date(2023, 2, 5)).unwrap()),
        FilterSelection::default().with_value(FilterColumn::Bathrooms, 7i64),
    ]
}

#[test]
fn empty_selection_returns_whole_dataset() {
    let dir = TempDir::new().unwrap();
    let ds = load_fixture(&dir);
    let view = apply(&ds, &FilterSelection::default());
    assert_eq!(view.indices(), (0..ds.len()).collect::<Vec<_>>().as_slice());
}

#[test]
fn rows_honour_every_chosen_set() {
    let dir = TempDir::new().unwrap();
    let ds = load_fixture(&dir);
    for selection in selections() {
        let view = apply(&ds, &selection);
        for (_, listing) in view.iter() {
            for col in FilterColumn::ALL {
                let chosen: BTreeSet<&CellValue> = selection.chosen(col).collect();
                if !chosen.is_empty() {
                    assert!(chosen.contains(listing.filter_value(col)));
                }
            }
            if let Some(range) = selection.date_range {
                assert!(range.contains(listing.listing_date));
            }
        }
    }
}

#[test]
fn aggregate_invariants_hold() {
    let dir = TempDir::new().unwrap();
    let ds = load_fixture(&dir);
    for selection in selections() {
        let view = apply(&ds, &selection);
        let result = aggregate(&view).unwrap();

        assert_eq!(result.property_count, view.len());
        assert_eq!(result.average_rent.is_none(), view.is_empty());

        for groups in [&result.rent_by_region, &result.days_on_market_by_region] {
            assert!(groups.windows(2).all(|w| w[0].mean <= w[1].mean));
            assert_eq!(groups.iter().map(|g| g.count).sum::<usize>(), result.property_count);
        }

        let volume = &result.listing_volume_by_date;
        assert!(volume.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(volume.iter().map(|(_, n)| n).sum::<usize>(), result.property_count);

        let again = aggregate(&apply(&ds, &selection)).unwrap();
        assert_eq!(result, again);
    }
}

#[test]
fn no_match_gives_undefined_mean_and_empty_series() {
    let dir = TempDir::new().unwrap();
    let ds = load_fixture(&dir);
    let selection = FilterSelection::default().with_value(FilterColumn::Region, "Christchurch");
    let result = aggregate(&apply(&ds, &selection)).unwrap();

    assert_eq!(result.property_count, 0);
    assert_eq!(result.average_rent, None);
    let charts = dashboard_charts(&result);
    assert!(charts.rent_by_region.bars.is_empty());
    assert!(charts.days_on_market.bars.is_empty());
    assert!(charts.listing_volume.points.is_empty());
}

#[test]
fn average_rent_matches_a_direct_mean() {
    let dir = TempDir::new().unwrap();
    let ds = load_fixture(&dir);
    let selection = FilterSelection::default().with_value(FilterColumn::Region, "Wellington");
    let view = apply(&ds, &selection);
    let result = aggregate(&view).unwrap();

    let rents: Vec<f64> = view
        .iter()
        .map(|(_, l)| l.rent.as_f64().unwrap())
        .collect();
    let expected = rents.iter().sum::<f64>() / rents.len() as f64;
    assert_eq!(result.average_rent, Some(expected));
    assert_eq!(result.rent_by_region.len(), 1);
    assert_eq!(result.rent_by_region[0].mean, expected);

    let charts = dashboard_charts(&result);
    assert_eq!(charts.days_on_market.orientation, Orientation::Horizontal);
}
