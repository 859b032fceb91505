use callgraph_lens::render::Scene;
use callgraph_lens::viewport::Transform;
use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, StrokeKind, Vec2};

const LINK_COLOR: Color32 = Color32::from_rgba_premultiplied(110, 118, 128, 170);
const HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(255, 99, 71);
const OUTLINE_COLOR: Color32 = Color32::from_rgba_premultiplied(15, 15, 15, 190);
const LABEL_MIN_SCALE: f32 = 0.45;

/// Paints engine output with egui. Engine coordinates are relative to the
/// canvas (or minimap) origin, so every call is shifted onto the screen here.
pub(super) struct EguiScene {
    painter: Painter,
    origin: Vec2,
    minimap_painter: Painter,
    minimap_origin: Vec2,
    scale: f32,
}

impl EguiScene {
    pub(super) fn new(painter: &Painter, canvas: Rect, minimap: Rect, transform: Transform) -> Self {
        minimap_frame(painter, minimap);
        Self {
            painter: painter.clone(),
            origin: canvas.min.to_vec2(),
            minimap_painter: painter.with_clip_rect(minimap),
            minimap_origin: minimap.min.to_vec2(),
            scale: transform.scale,
        }
    }
}

fn minimap_frame(painter: &Painter, minimap: Rect) {
    painter.rect_filled(minimap, 4.0, Color32::from_rgba_unmultiplied(12, 14, 18, 225));
    painter.rect_stroke(
        minimap,
        4.0,
        Stroke::new(1.0, Color32::from_gray(90)),
        StrokeKind::Outside,
    );
}

impl Scene for EguiScene {
    fn draw_link(&mut self, from: Pos2, to: Pos2) {
        let width = (1.2 * self.scale.sqrt()).clamp(0.6, 3.0);
        self.painter.line_segment(
            [from + self.origin, to + self.origin],
            Stroke::new(width, LINK_COLOR),
        );
    }

    fn draw_node(&mut self, center: Pos2, radius: f32, fill: Color32, highlighted: bool) {
        let center = center + self.origin;
        self.painter.circle_filled(center, radius, fill);
        let stroke = if highlighted {
            Stroke::new(2.5, HIGHLIGHT_COLOR)
        } else {
            Stroke::new(1.0, OUTLINE_COLOR)
        };
        self.painter.circle_stroke(center, radius, stroke);
    }

    fn draw_label(&mut self, anchor: Pos2, text: &str) {
        if self.scale < LABEL_MIN_SCALE {
            return;
        }
        self.painter.text(
            anchor + self.origin,
            Align2::LEFT_CENTER,
            text,
            FontId::proportional((12.0 * self.scale.sqrt()).clamp(9.0, 18.0)),
            Color32::from_gray(232),
        );
    }

    fn draw_minimap_marker(&mut self, center: Pos2, radius: f32) {
        self.minimap_painter.circle_filled(
            center + self.minimap_origin,
            radius,
            Color32::from_rgb(150, 180, 220),
        );
    }

    fn draw_minimap_viewport(&mut self, rect: Rect) {
        self.minimap_painter.rect_stroke(
            rect.translate(self.minimap_origin),
            0.0,
            Stroke::new(1.5, HIGHLIGHT_COLOR),
            StrokeKind::Inside,
        );
    }
}
