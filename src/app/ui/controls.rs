use callgraph_lens::LayoutMode;
use callgraph_lens::color::ColorMapper;
use eframe::egui::{self, RichText, Sense, Ui, vec2};

use super::super::ViewModel;

const MATCH_LIST_ROWS: usize = 40;
const ZOOM_STEP: f32 = 1.25;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Search");
        let search_response = ui.text_edit_singleline(&mut self.search);
        if search_response.changed() {
            self.engine.search(&self.search);
        }
        search_response.on_hover_text("Highlights nodes whose name contains the text.");
        self.draw_match_list(ui);

        ui.separator();
        ui.heading("Layout");
        let mut layout = self.engine.layout_mode();
        egui::ComboBox::from_id_salt("layout_mode")
            .selected_text(layout.label())
            .show_ui(ui, |ui| {
                for mode in LayoutMode::ALL {
                    ui.selectable_value(&mut layout, mode, mode.label());
                }
            });
        if layout != self.engine.layout_mode() {
            self.dragging = None;
            self.engine.set_layout(layout);
        }

        ui.separator();
        ui.heading("Color");
        let mut metric = self.engine.color_metric().to_owned();
        egui::ComboBox::from_id_salt("color_metric")
            .selected_text(metric.as_str())
            .show_ui(ui, |ui| {
                for name in &self.metric_names {
                    ui.selectable_value(&mut metric, name.clone(), name.as_str());
                }
            });
        if metric != self.engine.color_metric() {
            self.engine.set_color_metric(&metric);
        }
        Self::draw_legend(ui);

        ui.separator();
        ui.heading("View");
        ui.horizontal(|ui| {
            let center = (self.engine.viewport_size() * 0.5).to_pos2();
            if ui.button("Zoom in").clicked() {
                self.engine.zoom_at(ZOOM_STEP, center);
            }
            if ui.button("Zoom out").clicked() {
                self.engine.zoom_at(1.0 / ZOOM_STEP, center);
            }
            if ui.button("Reset view").clicked() {
                self.engine.reset_view();
            }
        });
        ui.small("Scroll to zoom, drag empty space with the right or middle button to pan.");
    }

    fn draw_match_list(&mut self, ui: &mut Ui) {
        if !self.engine.search_index().is_active() {
            return;
        }

        let ranked = self.engine.search_index().ranked(MATCH_LIST_ROWS);
        ui.label(format!(
            "{} matching nodes",
            self.engine.search_index().matches().len()
        ));

        let mut focus = None;
        egui::ScrollArea::vertical()
            .id_salt("search_matches_scroll")
            .max_height(220.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for id in &ranked {
                    let is_selected = self.selected.as_deref() == Some(id.as_str());
                    let text = if is_selected {
                        RichText::new(id.as_str()).strong()
                    } else {
                        RichText::new(id.as_str())
                    };
                    if ui.link(text).clicked() {
                        focus = Some(id.clone());
                    }
                }
            });

        if let Some(id) = focus {
            self.engine.focus_node(&id);
            self.set_selected(Some(id));
        }
    }

    fn draw_legend(ui: &mut Ui) {
        const SWATCHES: usize = 11;

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            ui.label("0 ");
            for step in 0..SWATCHES {
                let (rect, _) = ui.allocate_exact_size(vec2(14.0, 12.0), Sense::hover());
                ui.painter()
                    .rect_filled(rect, 0.0, ColorMapper::color_for_value(step as f64));
            }
            ui.label(" 10+");
        });
    }
}
