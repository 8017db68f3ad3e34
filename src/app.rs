use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: title, KPI cards, charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    ui.vertical_centered(|ui: &mut Ui| {
                        ui.heading(RichText::new("TradeMe Dashboard").size(32.0).strong());
                    });
                    ui.add_space(8.0);
                    if self.state.dataset.is_some() {
                        panels::kpi_cards(ui, &self.state);
                        ui.add_space(12.0);
                    }
                    plot::dashboard_charts(ui, &self.state);
                });
        });
    }
}
