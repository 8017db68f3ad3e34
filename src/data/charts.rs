use chrono::NaiveDate;

use super::aggregate::{AggregateResult, GroupMean};

pub const RENT_BY_REGION_TITLE: &str = "Average Rent by Region";
pub const DAYS_ON_MARKET_TITLE: &str = "Average Days on Market by Region";
pub const LISTING_VOLUME_TITLE: &str = "Listing Volume";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// One bar: category label, full-precision value and the text drawn on it.
#[derive(Debug, Clone, PartialEq)]
pub struct BarPoint {
    pub category: String,
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub title: &'static str,
    pub value_axis: &'static str,
    pub orientation: Orientation,
    /// Ascending by value.
    pub bars: Vec<BarPoint>,
}

impl BarSeries {
    /// Smallest and largest bar value, `None` without bars.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.bars.iter().fold(None, |acc, b| match acc {
            None => Some((b.value, b.value)),
            Some((lo, hi)) => Some((lo.min(b.value), hi.max(b.value))),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub title: &'static str,
    /// Ascending by date.
    pub points: Vec<(NaiveDate, usize)>,
}

/// The three series handed to the chart renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardCharts {
    pub rent_by_region: BarSeries,
    pub days_on_market: BarSeries,
    pub listing_volume: LineSeries,
}

pub fn dashboard_charts(result: &AggregateResult) -> DashboardCharts {
    DashboardCharts {
        rent_by_region: BarSeries {
            title: RENT_BY_REGION_TITLE,
            value_axis: "Rent",
            orientation: Orientation::Vertical,
            bars: bars(&result.rent_by_region, rent_label),
        },
        days_on_market: BarSeries {
            title: DAYS_ON_MARKET_TITLE,
            value_axis: "Days in the Market",
            orientation: Orientation::Horizontal,
            bars: bars(&result.days_on_market_by_region, days_label),
        },
        listing_volume: LineSeries {
            title: LISTING_VOLUME_TITLE,
            points: result.listing_volume_by_date.clone(),
        },
    }
}

/// Halves go to the even neighbour, so 512.5 reads "$512".
fn rent_label(mean: f64) -> String {
    format!("${}", mean.round_ties_even() as i64)
}

fn days_label(mean: f64) -> String {
    format!("{}", mean.round_ties_even() as i64)
}

fn bars(groups: &[GroupMean], label: impl Fn(f64) -> String) -> Vec<BarPoint> {
    groups
        .iter()
        .map(|g| BarPoint {
            category: g.key.to_string(),
            value: g.mean,
            label: label(g.mean),
        })
        .collect()
}

/// Format a mean rent for a KPI card; undefined means print "n/a".
pub fn format_currency(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${v:.2}"),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::aggregate;
    use crate::data::filter::{apply, FilterSelection};
    use crate::data::model::tests::scenario_dataset;

    #[test]
    fn series_keep_order_and_precision() {
        let ds = scenario_dataset();
        let result = aggregate(&apply(&ds, &FilterSelection::default())).unwrap();
        let charts = dashboard_charts(&result);

        let rent = &charts.rent_by_region;
        assert_eq!(rent.orientation, Orientation::Vertical);
        assert_eq!(rent.bars[0].category, "Wellington");
        assert_eq!(rent.bars[1].label, "$550");
        assert_eq!(rent.value_bounds(), Some((400.0, 550.0)));

        let days = &charts.days_on_market;
        assert_eq!(days.orientation, Orientation::Horizontal);
        assert_eq!(days.bars[0].value, 5.0);
        assert_eq!(days.bars[1].value, 15.0);

        assert_eq!(charts.listing_volume.points.len(), 2);
    }

    #[test]
    fn labels_round_but_values_do_not() {
        let groups = vec![GroupMean {
            key: "Otago".into(),
            mean: 512.6,
            count: 5,
        }];
        let b = bars(&groups, rent_label);
        assert_eq!(b[0].label, "$513");
        assert_eq!(b[0].value, 512.6);
    }

    #[test]
    fn half_way_labels_round_to_even() {
        assert_eq!(rent_label(512.5), "$512");
        assert_eq!(rent_label(513.5), "$514");
        assert_eq!(days_label(2.5), "2");
        assert_eq!(days_label(3.5), "4");
    }

    #[test]
    fn undefined_currency_is_not_zero() {
        assert_eq!(format_currency(None), "n/a");
        assert_eq!(format_currency(Some(550.0)), "$550.00");
    }
}
