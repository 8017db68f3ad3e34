mod app;
mod color;
mod state;
mod ui;

use std::path::Path;

use anyhow::{Context, Result};
use app::DashboardApp;
use eframe::egui;
use state::AppState;
use trademe_dashboard::config::{DashboardConfig, LoadOptions, CONFIG_ENV};
use trademe_dashboard::data::loader::load_file;
use trademe_dashboard::data::model::ListingDataset;

/// Load a dataset, wrapping the failure with the file name for display.
pub fn load_dataset(path: &Path, options: &LoadOptions) -> Result<ListingDataset> {
    load_file(path, options).with_context(|| format!("loading {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();

    let arg = std::env::args().nth(1);
    let env = std::env::var(CONFIG_ENV).ok();
    let config = DashboardConfig::resolve(arg.as_deref(), env.as_deref())?;
    log::info!(
        "Reading {} (sheet '{}', columns {})",
        config.data_path.display(),
        config.source.sheet,
        config.source.columns
    );

    let mut state = AppState {
        load_options: config.source.clone(),
        ..Default::default()
    };
    match load_dataset(&config.data_path, &config.source) {
        Ok(dataset) => state.set_dataset(dataset),
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "TradeMe Dashboard",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(DashboardApp::new(state)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard: {e}"))
}
