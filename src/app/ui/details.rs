use callgraph_lens::graph::{Finding, NodeDetails};
use eframe::egui::{self, Context, RichText, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_detail_windows(&mut self, ctx: &Context) {
        for panel in &mut self.open_panels {
            let details = &panel.details;
            egui::Window::new(details.id.as_str())
                .id(egui::Id::new(("detail_panel", details.id.as_str())))
                .default_pos(panel.position)
                .default_width(420.0)
                .open(&mut panel.open)
                .show(ctx, |ui| {
                    if let Some(file) = &details.file {
                        ui.label(format!("File: {file}"));
                    }
                    if let Some(breadcrumbs) = &details.breadcrumbs {
                        ui.small(breadcrumbs.as_str());
                    }
                    draw_analysis(ui, details);
                    ui.separator();
                    match &details.code {
                        Some(code) => {
                            egui::ScrollArea::both()
                                .id_salt(("detail_code", details.id.as_str()))
                                .max_height(360.0)
                                .show(ui, |ui| {
                                    ui.label(RichText::new(code.as_str()).monospace());
                                });
                        }
                        None => {
                            ui.label("No source recorded for this node.");
                        }
                    }
                });
        }

        let before = self.open_panels.len();
        self.open_panels.retain(|panel| panel.open);
        if self.open_panels.len() != before && self.open_panels.is_empty() {
            self.selected = None;
        }
    }
}

fn draw_findings(ui: &mut Ui, id: &str, title: &str, findings: &[Finding]) {
    if findings.is_empty() {
        return;
    }
    egui::CollapsingHeader::new(format!("{title} ({})", findings.len()))
        .id_salt((title, id))
        .default_open(true)
        .show(ui, |ui| {
            for finding in findings {
                ui.label(finding.summary());
            }
        });
}

fn draw_analysis(ui: &mut Ui, details: &NodeDetails) {
    let id = details.id.as_str();
    draw_findings(ui, id, "Code smells", &details.code_smells);
    draw_findings(ui, id, "Security issues", &details.security_issues);

    let Some(documentation) = &details.documentation else {
        return;
    };
    egui::CollapsingHeader::new("Documentation")
        .id_salt(("Documentation", id))
        .show(ui, |ui| {
            match &documentation.docstring {
                Some(docstring) => {
                    ui.label(docstring.as_str());
                }
                None => {
                    ui.weak("No docstring.");
                }
            }
            if !documentation.parameters.is_empty() {
                ui.label(format!("Parameters: {}", documentation.parameters.join(", ")));
            }
            if let Some(return_type) = &documentation.return_type {
                ui.label(format!("Returns: {return_type}"));
            }
        });
}
