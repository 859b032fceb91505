use eframe::egui::{Pos2, Vec2};

use crate::color::ColorMapper;
use crate::config::EngineConfig;
use crate::drag::DragController;
use crate::graph::{Graph, GraphModel, NodeDetails};
use crate::layout::{LayoutEngine, LayoutMode};
use crate::minimap::MinimapFrame;
use crate::physics::Simulation;
use crate::render::{self, FrameView, Scene};
use crate::search::SearchIndex;
use crate::viewport::{Transform, ViewportController};

/// Fixed simulation step; `advance` converts wall time into whole ticks.
pub const TICK_SECONDS: f32 = 1.0 / 60.0;

/// The visualization core. The host feeds it input events and calls
/// `advance` then `render` once per frame.
pub struct GraphEngine {
    config: EngineConfig,
    model: GraphModel,
    simulation: Simulation,
    layout: LayoutEngine,
    viewport: ViewportController,
    search: SearchIndex,
    colors: ColorMapper,
    drag: DragController,
    tick_accumulator: f32,
}

impl GraphEngine {
    pub fn new(config: EngineConfig) -> Self {
        let config = config.sanitized();
        Self {
            model: GraphModel::default(),
            simulation: Simulation::new(&config.simulation),
            layout: LayoutEngine::new(LayoutMode::Force, &config),
            viewport: ViewportController::new(&config.viewport),
            search: SearchIndex::default(),
            colors: ColorMapper::default(),
            drag: DragController::new(config.simulation.drag_alpha_target),
            tick_accumulator: 0.0,
            config,
        }
    }

    /// Replaces the whole graph. Positions, velocities, pins and the
    /// simulation temperature all start over; the viewport is kept.
    pub fn load_graph(&mut self, graph: &Graph) {
        self.drag.cancel_all(&mut self.model, &mut self.simulation);
        self.model = GraphModel::from_graph(graph);
        self.model.scatter_around(self.viewport.center());
        self.simulation = Simulation::new(&self.config.simulation);
        self.tick_accumulator = 0.0;
        self.search.refresh(&self.model);
        self.apply_layout(self.layout.mode());
    }

    pub fn set_layout(&mut self, mode: LayoutMode) {
        self.drag.cancel_all(&mut self.model, &mut self.simulation);
        self.apply_layout(mode);
    }

    fn apply_layout(&mut self, mode: LayoutMode) {
        let center = self.viewport.center();
        self.layout
            .apply(mode, &mut self.model, &mut self.simulation, center);
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.layout.mode()
    }

    /// Root used by the hierarchical and radial layouts. Takes effect on the
    /// next layout switch or load.
    pub fn set_root(&mut self, root: Option<String>) {
        self.layout.set_root(root);
    }

    pub fn search(&mut self, query: &str) {
        self.search.search(&self.model, query);
    }

    pub fn search_index(&self) -> &SearchIndex {
        &self.search
    }

    pub fn set_color_metric(&mut self, metric: &str) {
        self.colors.set_metric(metric);
    }

    pub fn color_metric(&self) -> &str {
        self.colors.metric()
    }

    pub fn transform(&self) -> Transform {
        self.viewport.transform()
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport.size()
    }

    /// New canvas size. The simulation keeps pulling toward the middle of
    /// the resized canvas.
    pub fn resize(&mut self, size: Vec2) {
        if self.viewport.size() != size {
            self.viewport.resize(size);
            self.simulation.retarget(self.viewport.center());
        }
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.viewport.pan_by(delta);
    }

    pub fn zoom_at(&mut self, factor: f32, anchor: Pos2) {
        self.viewport.zoom_at(factor, anchor);
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.viewport.set_transform(transform);
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    /// Centres the view on `id`. Returns false for unknown ids.
    pub fn focus_node(&mut self, id: &str) -> bool {
        let Some(node) = self.model.node(id) else {
            return false;
        };
        let pos = node.pos;
        self.viewport.focus(pos);
        true
    }

    /// Runs as many whole simulation ticks as `delta_seconds` covers, capped
    /// per frame. Returns whether the simulation is still running.
    pub fn advance(&mut self, delta_seconds: f32) -> bool {
        if !self.simulation.is_running() {
            self.tick_accumulator = 0.0;
            return false;
        }
        if !delta_seconds.is_finite() || delta_seconds <= 0.0 {
            return true;
        }

        let max_ticks = self.config.simulation.max_ticks_per_frame;
        self.tick_accumulator =
            (self.tick_accumulator + delta_seconds).min(TICK_SECONDS * max_ticks as f32);

        // Tolerance so a frame of exactly TICK_SECONDS is never skipped.
        let threshold = TICK_SECONDS * 0.999;
        let mut ticks = 0;
        while self.tick_accumulator >= threshold && ticks < max_ticks {
            self.tick_accumulator = (self.tick_accumulator - TICK_SECONDS).max(0.0);
            ticks += 1;
            if !self.simulation.tick(&mut self.model) {
                self.tick_accumulator = 0.0;
                return false;
            }
        }
        true
    }

    /// Ticks without wall-clock pacing until the simulation goes dormant or
    /// `max_ticks` is reached. Returns the ticks run.
    pub fn settle(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.simulation.tick(&mut self.model) {
            ticks += 1;
        }
        ticks
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn node_details(&self, id: &str) -> Option<&NodeDetails> {
        self.model.details(id)
    }

    pub fn node_at(&self, screen: Pos2) -> Option<usize> {
        render::node_at(&self.model, self.viewport.transform(), screen)
    }

    /// Grabs the node under `screen`, if any, and returns its index.
    pub fn begin_drag(&mut self, screen: Pos2) -> Option<usize> {
        let node = self.node_at(screen)?;
        let pointer = self.viewport.transform().invert(screen);
        let simulated = self.layout.mode().is_simulated();
        self.drag
            .begin(node, pointer, &mut self.model, &mut self.simulation, simulated)
            .then_some(node)
    }

    pub fn drag_to(&mut self, node: usize, screen: Pos2) {
        let pointer = self.viewport.transform().invert(screen);
        self.drag.move_to(node, pointer, &mut self.model);
    }

    pub fn end_drag(&mut self, node: usize) {
        self.drag.end(node, &mut self.model, &mut self.simulation);
    }

    pub fn minimap(&self) -> MinimapFrame {
        MinimapFrame::compute(
            &self.model,
            self.viewport.transform(),
            self.viewport.size(),
            &self.config.minimap,
        )
    }

    pub fn render(&self, scene: &mut impl Scene) {
        let transform = self.viewport.transform();
        let minimap = MinimapFrame::compute(
            &self.model,
            transform,
            self.viewport.size(),
            &self.config.minimap,
        );
        render::paint(
            scene,
            &FrameView {
                model: &self.model,
                transform,
                colors: &self.colors,
                search: &self.search,
                minimap: &minimap,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::graph::{LinkSpec, NodeSpec};

    fn triangle() -> Graph {
        Graph::new(
            vec![NodeSpec::new("a"), NodeSpec::new("b"), NodeSpec::new("c")],
            vec![LinkSpec::new("a", "b"), LinkSpec::new("b", "c")],
        )
    }

    #[test]
    fn test_advance_paces_ticks_by_wall_time() {
        let mut engine = GraphEngine::new(EngineConfig::default());
        engine.load_graph(&triangle());
        let start = engine.simulation().alpha();

        assert!(engine.advance(TICK_SECONDS * 0.5));
        assert_eq!(engine.simulation().alpha(), start);

        assert!(engine.advance(TICK_SECONDS * 0.5));
        assert!(engine.simulation().alpha() < start);
    }

    #[test]
    fn test_advance_caps_ticks_per_frame() {
        let mut engine = GraphEngine::new(EngineConfig::default());
        engine.load_graph(&triangle());
        engine.advance(10.0);
        let decay = EngineConfig::default().simulation.alpha_decay;
        let expected = (1.0 - decay).powi(4);
        assert!((engine.simulation().alpha() - expected).abs() < 1e-4);
    }

    #[test]
    fn test_advance_is_noop_when_dormant() {
        let mut engine = GraphEngine::new(EngineConfig::default());
        engine.load_graph(&triangle());
        engine.set_layout(LayoutMode::Hierarchical);
        let before = engine.model().nodes()[0].pos;
        assert!(!engine.advance(1.0));
        assert_eq!(engine.model().nodes()[0].pos, before);
    }

    #[test]
    fn test_focus_node() {
        let mut engine = GraphEngine::new(EngineConfig::default());
        engine.load_graph(&triangle());
        assert!(engine.focus_node("b"));
        assert!(!engine.focus_node("zzz"));
        let pos = engine.model().node("b").unwrap().pos;
        let screen = engine.transform().apply(pos);
        let middle = engine.viewport_size() * 0.5;
        assert!((screen - pos2(middle.x, middle.y)).length() < 1e-3);
    }

    #[test]
    fn test_begin_drag_misses_empty_space() {
        let mut engine = GraphEngine::new(EngineConfig::default());
        engine.load_graph(&triangle());
        engine.resize(vec2(800.0, 600.0));
        assert_eq!(engine.begin_drag(pos2(-5000.0, -5000.0)), None);
    }
}
