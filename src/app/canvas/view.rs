use callgraph_lens::render::NODE_RADIUS;
use callgraph_lens::viewport::Transform;
use eframe::egui::{self, Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Stroke, Ui, vec2};

use super::super::ViewModel;
use super::scene::EguiScene;

const MINIMAP_MARGIN: f32 = 12.0;
const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);

fn draw_background(painter: &Painter, rect: Rect, transform: Transform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * transform.scale.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.min + transform.translation();
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        self.engine.resize(rect.size());

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_node_drag(ui, rect, &response);
        self.handle_graph_pan(&response);
        self.handle_graph_click(rect, &response);

        let frame_delta_seconds = ui.ctx().input(|input| input.stable_dt);
        let running = self.engine.advance(frame_delta_seconds);
        if running || self.dragging.is_some() {
            ui.ctx().request_repaint();
        }

        let transform = self.engine.transform();
        draw_background(&painter, rect, transform);

        if self.engine.model().is_empty() {
            ui.label("The loaded payload has no nodes.");
            return;
        }

        let minimap = self.minimap_rect(rect);
        let mut scene = EguiScene::new(&painter, rect, minimap, transform);
        self.engine.render(&mut scene);

        if let Some(selected) = self.selected.as_deref()
            && let Some(node) = self.engine.model().node(selected)
        {
            let center = transform.apply(node.pos) + rect.min.to_vec2();
            painter.circle_stroke(
                center,
                NODE_RADIUS * transform.scale + 4.0,
                Stroke::new(2.0, SELECTED_COLOR),
            );
        }

        if let Some(index) = self.hovered_index(ui, rect) {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });

            let model = self.engine.model();
            let node = &model.nodes()[index];
            let metric = self.engine.color_metric();
            let panel_text = format!(
                "{}  |  {metric} {}  |  links {}",
                node.id,
                node.metric(metric),
                model.degree(index)
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }

    /// Minimap sized to the viewport at minimap scale, pinned to the
    /// bottom-right corner of the canvas.
    fn minimap_rect(&self, canvas: Rect) -> Rect {
        let size = self.engine.viewport_size() * self.engine.config().minimap.scale;
        let min = canvas.right_bottom() - size - vec2(MINIMAP_MARGIN, MINIMAP_MARGIN);
        Rect::from_min_size(min, size)
    }
}
