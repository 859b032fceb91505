use eframe::egui::{Color32, Pos2, Rect, vec2};

use crate::color::ColorMapper;
use crate::graph::GraphModel;
use crate::minimap::MinimapFrame;
use crate::search::SearchIndex;
use crate::viewport::Transform;

/// World-space radius of a node marker.
pub const NODE_RADIUS: f32 = 8.0;
const LABEL_GAP: f32 = 4.0;

/// Drawing surface the renderer paints into. Coordinates are screen space
/// for the main scene and minimap space for the minimap calls.
pub trait Scene {
    fn draw_link(&mut self, from: Pos2, to: Pos2);
    fn draw_node(&mut self, center: Pos2, radius: f32, fill: Color32, highlighted: bool);
    fn draw_label(&mut self, anchor: Pos2, text: &str);
    fn draw_minimap_marker(&mut self, center: Pos2, radius: f32);
    fn draw_minimap_viewport(&mut self, rect: Rect);
}

/// Everything one frame reads. Built fresh per frame so the main scene and
/// the minimap see the same transform.
pub struct FrameView<'a> {
    pub model: &'a GraphModel,
    pub transform: Transform,
    pub colors: &'a ColorMapper,
    pub search: &'a SearchIndex,
    pub minimap: &'a MinimapFrame,
}

/// Paints links, then nodes, then labels, then the minimap. Pure function
/// of `view`: repeated calls with the same view issue the same calls.
pub fn paint(scene: &mut impl Scene, view: &FrameView<'_>) {
    let transform = view.transform;
    let nodes = view.model.nodes();

    for link in view.model.links() {
        scene.draw_link(
            transform.apply(nodes[link.source].pos),
            transform.apply(nodes[link.target].pos),
        );
    }

    let radius = NODE_RADIUS * transform.scale;
    for node in nodes {
        scene.draw_node(
            transform.apply(node.pos),
            radius,
            view.colors.color_for(node),
            view.search.is_match(&node.id),
        );
    }

    for node in nodes {
        let anchor = transform.apply(node.pos) + vec2(radius + LABEL_GAP, 0.0);
        scene.draw_label(anchor, &node.id);
    }

    for marker in &view.minimap.markers {
        scene.draw_minimap_marker(*marker, view.minimap.marker_radius);
    }
    scene.draw_minimap_viewport(view.minimap.viewport);
}

/// Topmost node whose marker contains `screen`, i.e. the last one painted.
pub fn node_at(model: &GraphModel, transform: Transform, screen: Pos2) -> Option<usize> {
    let world = transform.invert(screen);
    model
        .nodes()
        .iter()
        .enumerate()
        .rev()
        .find(|(_, node)| (node.pos - world).length_sq() <= NODE_RADIUS * NODE_RADIUS)
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::config::MinimapConfig;
    use crate::graph::{Graph, LinkSpec, NodeSpec};

    #[derive(Default, Debug, PartialEq)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Scene for Recorder {
        fn draw_link(&mut self, from: Pos2, to: Pos2) {
            self.calls.push(format!("link {from:?} {to:?}"));
        }
        fn draw_node(&mut self, center: Pos2, radius: f32, fill: Color32, highlighted: bool) {
            self.calls
                .push(format!("node {center:?} {radius} {fill:?} {highlighted}"));
        }
        fn draw_label(&mut self, anchor: Pos2, text: &str) {
            self.calls.push(format!("label {anchor:?} {text}"));
        }
        fn draw_minimap_marker(&mut self, center: Pos2, radius: f32) {
            self.calls.push(format!("marker {center:?} {radius}"));
        }
        fn draw_minimap_viewport(&mut self, rect: Rect) {
            self.calls.push(format!("viewport {rect:?}"));
        }
    }

    fn model() -> GraphModel {
        let mut model = GraphModel::from_graph(&Graph::new(
            vec![NodeSpec::new("alpha"), NodeSpec::new("beta").with_metric("complexity", 9.0)],
            vec![LinkSpec::new("alpha", "beta")],
        ));
        model.nodes_mut()[0].pos = vec2(0.0, 0.0);
        model.nodes_mut()[1].pos = vec2(100.0, 0.0);
        model
    }

    fn paint_once(model: &GraphModel, transform: Transform, search: &SearchIndex) -> Recorder {
        let colors = ColorMapper::default();
        let minimap =
            MinimapFrame::compute(model, transform, vec2(800.0, 600.0), &MinimapConfig::default());
        let mut recorder = Recorder::default();
        paint(
            &mut recorder,
            &FrameView {
                model,
                transform,
                colors: &colors,
                search,
                minimap: &minimap,
            },
        );
        recorder
    }

    #[test]
    fn test_paint_is_idempotent() {
        let model = model();
        let search = SearchIndex::default();
        let transform = Transform {
            translate_x: 10.0,
            translate_y: 5.0,
            scale: 2.0,
        };
        assert_eq!(
            paint_once(&model, transform, &search),
            paint_once(&model, transform, &search)
        );
    }

    #[test]
    fn test_geometry_follows_transform_and_highlight() {
        let model = model();
        let mut search = SearchIndex::default();
        search.search(&model, "BET");
        let transform = Transform {
            translate_x: 10.0,
            translate_y: 5.0,
            scale: 2.0,
        };
        let calls = paint_once(&model, transform, &search).calls;

        assert_eq!(calls.len(), 1 + 2 + 2 + 2 + 1);
        assert_eq!(
            calls[0],
            format!("link {:?} {:?}", pos2(10.0, 5.0), pos2(210.0, 5.0))
        );
        assert!(calls[1].ends_with("false"));
        assert!(calls[2].ends_with("true"));
        assert!(calls[2].contains(" 16 "));
    }

    #[test]
    fn test_node_at_prefers_topmost() {
        let mut model = model();
        model.nodes_mut()[1].pos = vec2(3.0, 0.0);
        let transform = Transform::IDENTITY;
        assert_eq!(node_at(&model, transform, pos2(2.0, 0.0)), Some(1));
        assert_eq!(node_at(&model, transform, pos2(-7.0, 0.0)), Some(0));
        assert_eq!(node_at(&model, transform, pos2(50.0, 50.0)), None);
    }
}
