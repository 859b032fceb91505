use eframe::egui::{self, Align, Context, Layout};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("callgraph-lens");
                    ui.separator();
                    ui.label(format!("source: {source}"));
                    ui.label(format!("nodes: {}", self.engine.model().len()));
                    ui.label(format!("links: {}", self.engine.model().links().len()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload graph"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!("zoom {:.2}x", self.engine.transform().scale));
                        ui.label(self.simulation_status());
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading call graph...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });

        self.draw_detail_windows(ctx);
    }

    fn simulation_status(&self) -> String {
        let simulation = self.engine.simulation();
        if simulation.is_running() {
            format!("alpha {:.3}", simulation.alpha())
        } else {
            "settled".to_owned()
        }
    }
}
