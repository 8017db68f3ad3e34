use chrono::NaiveDate;

use trademe_dashboard::config::LoadOptions;
use trademe_dashboard::data::aggregate::{aggregate, AggregateResult};
use trademe_dashboard::data::charts::{dashboard_charts, DashboardCharts};
use trademe_dashboard::data::filter::{apply, DateRange, FilterSelection};
use trademe_dashboard::data::model::{CellValue, FilterColumn, ListingDataset};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a file loads).
    pub dataset: Option<ListingDataset>,

    /// Sidebar selections.
    pub selection: FilterSelection,

    /// Date picker values; turned into a `DateRange` on every refilter.
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,

    /// Indices of listings passing the current filters.
    pub visible_indices: Vec<usize>,

    /// Figures for the current selection; `None` after a failed cycle.
    pub result: Option<AggregateResult>,
    pub charts: Option<DashboardCharts>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Sheet, column range and row limit used by File → Open.
    pub load_options: LoadOptions,
}

impl AppState {
    /// Ingest a newly loaded dataset, reset filters and compute the figures.
    pub fn set_dataset(&mut self, dataset: ListingDataset) {
        self.selection = FilterSelection::default();
        if let Some((lo, hi)) = dataset.date_bounds {
            self.date_start = lo;
            self.date_end = hi;
        }
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the filtered view, aggregates and chart series.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };

        self.visible_indices.clear();
        self.result = None;
        self.charts = None;

        let range = match DateRange::new(self.date_start, self.date_end) {
            Ok(range) => range,
            Err(e) => {
                log::warn!("Rejected filter selection: {e}");
                self.status_message = Some(format!("Error: {e}"));
                return;
            }
        };
        self.selection.date_range = Some(range);

        let view = apply(ds, &self.selection);
        match aggregate(&view) {
            Ok(result) => {
                self.charts = Some(dashboard_charts(&result));
                self.result = Some(result);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Aggregation failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
        self.visible_indices = view.into_indices();
    }

    /// Move the date window, clamped to the dataset's first and last listing.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        let (start, end) = match self.dataset.as_ref().and_then(|ds| ds.date_bounds) {
            Some((lo, hi)) => (start.clamp(lo, hi), end.clamp(lo, hi)),
            None => (start, end),
        };
        self.date_start = start;
        self.date_end = end;
        self.refilter();
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: FilterColumn, value: &CellValue) {
        self.selection.toggle(column, value);
        self.refilter();
    }

    /// Drop every chosen value of a column (back to "all").
    pub fn clear_filter(&mut self, column: FilterColumn) {
        self.selection.clear(column);
        self.refilter();
    }
}
