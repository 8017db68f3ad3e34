use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoint, PlotPoints, Text};

use trademe_dashboard::data::charts::{BarPoint, BarSeries, LineSeries, Orientation};

use crate::color::{ColorScale, RENT_BAR};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Dashboard charts (central panel)
// ---------------------------------------------------------------------------

/// Render the three dashboard charts for the current selection.
pub fn dashboard_charts(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view listings  (File → Open…)");
        });
        return;
    }
    let Some(charts) = &state.charts else {
        return;
    };

    bar_chart(ui, &charts.rent_by_region, |_| RENT_BAR);

    let scale = charts
        .days_on_market
        .value_bounds()
        .map(|(lo, hi)| ColorScale::new(lo, hi));
    bar_chart(ui, &charts.days_on_market, |bar| {
        scale
            .map(|s| s.color_for(bar.value))
            .unwrap_or(Color32::LIGHT_BLUE)
    });

    line_chart(ui, &charts.listing_volume);
}

/// Category name for a grid mark sitting on a bar, blank between bars.
fn category_label(categories: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    categories.get(idx as usize).cloned().unwrap_or_default()
}

fn bar_chart(ui: &mut Ui, series: &BarSeries, color: impl Fn(&BarPoint) -> Color32) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new(series.title).strong());
    });

    let horizontal = series.orientation == Orientation::Horizontal;
    let bars: Vec<Bar> = series
        .bars
        .iter()
        .enumerate()
        .map(|(i, b)| {
            Bar::new(i as f64, b.value)
                .name(&b.category)
                .fill(color(b))
                .width(0.7)
        })
        .collect();
    let mut chart = BarChart::new(bars).name(series.value_axis);
    if horizontal {
        chart = chart.horizontal();
    }

    let categories: Vec<String> = series.bars.iter().map(|b| b.category.clone()).collect();
    let formatter = move |mark: GridMark, _range: &RangeInclusive<f64>| {
        category_label(&categories, mark.value)
    };

    let plot = Plot::new(series.title)
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .show_grid(false);
    let plot = if horizontal {
        plot.y_axis_formatter(formatter)
            .x_axis_label(series.value_axis)
    } else {
        plot.x_axis_formatter(formatter)
            .y_axis_label(series.value_axis)
    };

    plot.show(ui, |plot_ui| {
        plot_ui.bar_chart(chart);
        for (i, b) in series.bars.iter().enumerate() {
            let at = if horizontal {
                PlotPoint::new(b.value / 2.0, i as f64)
            } else {
                PlotPoint::new(i as f64, b.value / 2.0)
            };
            plot_ui.text(Text::new(at, RichText::new(&b.label).color(Color32::WHITE)));
        }
    });
}

fn line_chart(ui: &mut Ui, series: &LineSeries) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new(series.title).strong());
    });

    let points: PlotPoints = series
        .points
        .iter()
        .map(|(date, count)| [date.num_days_from_ce() as f64, *count as f64])
        .collect();

    Plot::new(series.title)
        .height(CHART_HEIGHT)
        .show_grid(false)
        .allow_scroll(false)
        .y_axis_label("Listings")
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
                .map(|d| d.to_string())
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).color(Color32::WHITE).width(1.5));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_only_on_bar_positions() {
        let cats = vec!["Otago".to_string(), "Auckland".to_string()];
        assert_eq!(category_label(&cats, 0.0), "Otago");
        assert_eq!(category_label(&cats, 1.0), "Auckland");
        assert_eq!(category_label(&cats, 0.5), "");
        assert_eq!(category_label(&cats, 2.0), "");
        assert_eq!(category_label(&cats, -1.0), "");
    }
}
