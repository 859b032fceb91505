use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};

use crate::config::MinimapConfig;
use crate::graph::GraphModel;
use crate::viewport::Transform;

/// Scaled overview of the whole graph, rebuilt from scratch every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct MinimapFrame {
    pub markers: Vec<Pos2>,
    pub marker_radius: f32,
    /// Visible region in minimap coordinates.
    pub viewport: Rect,
}

impl MinimapFrame {
    pub fn compute(
        model: &GraphModel,
        transform: Transform,
        viewport_size: Vec2,
        config: &MinimapConfig,
    ) -> Self {
        let k = config.scale;
        let markers = model
            .nodes()
            .iter()
            .map(|node| pos2(node.pos.x * k, node.pos.y * k))
            .collect();

        let min = pos2(-transform.translate_x * k, -transform.translate_y * k);
        let size = vec2(
            viewport_size.x * k / transform.scale,
            viewport_size.y * k / transform.scale,
        );

        Self {
            markers,
            marker_radius: config.marker_radius,
            viewport: Rect::from_min_size(min, size),
        }
    }
}
