use callgraph_lens::color::ColorMapper;
use callgraph_lens::engine::TICK_SECONDS;
use callgraph_lens::graph::parse_payload;
use callgraph_lens::render::Scene;
use callgraph_lens::{EngineConfig, Graph, GraphEngine, LayoutMode, LinkSpec, NodeSpec};
use eframe::egui::{Color32, Pos2, Rect, Vec2, pos2, vec2};

#[derive(Default)]
struct RecordingScene {
    links: Vec<(Pos2, Pos2)>,
    nodes: Vec<(Pos2, f32, Color32, bool)>,
    labels: Vec<String>,
    markers: usize,
    minimap_viewport: Option<Rect>,
}

impl Scene for RecordingScene {
    fn draw_link(&mut self, from: Pos2, to: Pos2) {
        self.links.push((from, to));
    }

    fn draw_node(&mut self, center: Pos2, radius: f32, fill: Color32, highlighted: bool) {
        self.nodes.push((center, radius, fill, highlighted));
    }

    fn draw_label(&mut self, _anchor: Pos2, text: &str) {
        self.labels.push(text.to_owned());
    }

    fn draw_minimap_marker(&mut self, _center: Pos2, _radius: f32) {
        self.markers += 1;
    }

    fn draw_minimap_viewport(&mut self, rect: Rect) {
        self.minimap_viewport = Some(rect);
    }
}

fn engine_with(graph: &Graph) -> GraphEngine {
    let mut engine = GraphEngine::new(EngineConfig::default());
    engine.resize(vec2(800.0, 600.0));
    engine.load_graph(graph);
    engine
}

fn record(engine: &GraphEngine) -> RecordingScene {
    let mut scene = RecordingScene::default();
    engine.render(&mut scene);
    scene
}

fn positions(engine: &GraphEngine) -> Vec<Vec2> {
    engine.model().nodes().iter().map(|node| node.pos).collect()
}

fn chain(ids: &[&str]) -> Graph {
    Graph::new(
        ids.iter().copied().map(NodeSpec::new).collect(),
        ids.windows(2)
            .map(|pair| LinkSpec::new(pair[0], pair[1]))
            .collect(),
    )
}

#[test]
fn test_linked_pair_converges_to_link_distance() {
    let graph = parse_payload(
        r#"{"nodes":[{"id":"a"},{"id":"b"}],"links":[{"source":"a","target":"b"},{"source":"a","target":"ghost"}]}"#,
    )
    .unwrap();
    let mut engine = engine_with(&graph);

    let ticks = engine.settle(2000);
    assert!(ticks < 2000);
    assert!(!engine.simulation().is_running());
    assert!(engine.simulation().alpha() < engine.simulation().alpha_min());

    let model = engine.model();
    assert_eq!(model.links().len(), 1);
    let distance = (model.nodes()[0].pos - model.nodes()[1].pos).length();
    assert!(distance > 95.0 && distance < 125.0, "distance {distance}");
    assert_eq!(record(&engine).links.len(), 1);
}

#[test]
fn test_advance_drives_simulation_by_wall_time() {
    let mut engine = engine_with(&chain(&["a", "b", "c"]));
    let before = positions(&engine);
    let mut frames = 0;
    while engine.advance(TICK_SECONDS) {
        frames += 1;
        assert!(frames < 1000);
    }
    assert_ne!(positions(&engine), before);
    assert!(!engine.advance(TICK_SECONDS));
}

#[test]
fn test_loading_new_graph_discards_previous_nodes() {
    let mut engine = engine_with(&chain(&["old_a", "old_b"]));
    engine.settle(50);

    engine.load_graph(&chain(&["fresh"]));
    assert!(engine.model().node("old_a").is_none());
    assert!(engine.model().links().is_empty());
    assert_eq!(engine.simulation().alpha(), 1.0);
    assert!(engine.simulation().is_running());

    let scene = record(&engine);
    assert_eq!(scene.labels, vec!["fresh".to_owned()]);
    assert_eq!(scene.markers, 1);
    assert!(scene.links.is_empty());
}

#[test]
fn test_switching_to_hierarchical_recomputes_positions() {
    let mut engine = engine_with(&chain(&["a", "b", "c", "d"]));
    engine.settle(30);
    let before = positions(&engine);

    engine.set_layout(LayoutMode::Hierarchical);
    assert_eq!(engine.layout_mode(), LayoutMode::Hierarchical);
    assert!(!engine.simulation().is_running());
    assert_ne!(positions(&engine), before);

    engine.set_layout(LayoutMode::Radial);
    assert!(engine.simulation().is_running());
    assert_eq!(engine.simulation().alpha(), 1.0);
}

#[test]
fn test_configured_root_heads_the_tree() {
    let mut engine = engine_with(&chain(&["a", "b", "c"]));
    engine.set_root(Some("c".to_owned()));
    engine.set_layout(LayoutMode::Hierarchical);

    let model = engine.model();
    let y = |id: &str| model.node(id).unwrap().pos.y;
    assert!(y("c") < y("b"));
    assert!(y("b") < y("a"));
}

#[test]
fn test_drag_tracks_pointer_then_releases() {
    let mut engine = engine_with(&chain(&["a", "b"]));
    engine.settle(2000);
    assert!(!engine.simulation().is_running());

    let start = engine.transform().apply(engine.model().nodes()[0].pos);
    let node = engine.begin_drag(start).unwrap();
    assert_eq!(node, 0);
    assert!(engine.simulation().is_running());
    assert_eq!(engine.simulation().alpha_target(), 0.3);

    let pointer = start + vec2(30.0, 10.0);
    engine.drag_to(node, pointer);
    for _ in 0..5 {
        engine.advance(TICK_SECONDS);
        let held = engine.transform().apply(engine.model().nodes()[0].pos);
        assert_eq!(held, pointer);
    }

    engine.end_drag(node);
    assert_eq!(engine.simulation().alpha_target(), 0.0);
    assert!(engine.model().nodes()[0].pin.is_none());
    engine.advance(TICK_SECONDS);
    let released = engine.transform().apply(engine.model().nodes()[0].pos);
    assert_ne!(released, pointer);
}

#[test]
fn test_hierarchical_drag_leaves_node_where_dropped() {
    let mut engine = engine_with(&chain(&["a", "b"]));
    engine.set_layout(LayoutMode::Hierarchical);

    let start = engine.transform().apply(engine.model().nodes()[1].pos);
    let node = engine.begin_drag(start).unwrap();
    assert!(!engine.simulation().is_running());
    let drop = start + vec2(-40.0, 25.0);
    engine.drag_to(node, drop);
    engine.end_drag(node);
    engine.advance(1.0);

    assert_eq!(engine.transform().apply(engine.model().nodes()[1].pos), drop);
}

#[test]
fn test_zoom_is_clamped_and_minimap_tracks_transform() {
    let mut engine = engine_with(&chain(&["a", "b"]));
    engine.zoom_at(100.0, pos2(400.0, 300.0));
    assert_eq!(engine.transform().scale, 4.0);
    engine.zoom_at(1e-6, pos2(400.0, 300.0));
    assert_eq!(engine.transform().scale, 0.1);

    engine.pan_by(vec2(-50.0, 20.0));
    let transform = engine.transform();
    let rect = record(&engine).minimap_viewport.unwrap();
    assert!((rect.width() - 800.0 * 0.2 / transform.scale).abs() < 1e-3);
    assert!((rect.height() - 600.0 * 0.2 / transform.scale).abs() < 1e-3);
    assert!((rect.min.x + transform.translate_x * 0.2).abs() < 1e-3);
    assert_eq!(engine.minimap().viewport, rect);

    engine.reset_view();
    assert_eq!(engine.transform().scale, 1.0);
    assert_eq!(engine.transform().translation(), Vec2::ZERO);
}

#[test]
fn test_search_highlights_case_insensitively() {
    let mut engine = engine_with(&chain(&["Foo", "foobar", "baz"]));

    engine.search("FOO");
    let upper = engine.search_index().matches().clone();
    engine.search("foo");
    assert_eq!(engine.search_index().matches(), &upper);
    assert_eq!(upper.len(), 2);

    let highlighted = record(&engine)
        .nodes
        .iter()
        .filter(|node| node.3)
        .count();
    assert_eq!(highlighted, 2);

    engine.search("");
    assert!(engine.search_index().matches().is_empty());
    assert!(record(&engine).nodes.iter().all(|node| !node.3));
}

#[test]
fn test_call_graph_payload_colors_by_selected_metric() {
    let graph = parse_payload(
        r#"{
            "main": {
                "code": "fn main() { run(); }",
                "calls": ["run"],
                "complexity": {"cyclomatic_complexity": 2, "loc": 9},
                "file": "src/main.rs",
                "breadcrumbs": "crate > main",
                "security_issues": [
                    {"type": "hardcoded_secret", "severity": "high", "line": 3, "description": "Possible hardcoded secret"}
                ],
                "documentation": {"docstring": "Entry point.", "parameters": [], "return_type": null, "line": 1}
            },
            "run": {
                "code": "fn run() {}",
                "calls": [],
                "complexity": {"cyclomatic_complexity": 12, "loc": 1},
                "file": "src/run.rs",
                "breadcrumbs": "crate > run"
            }
        }"#,
    )
    .unwrap();
    let mut engine = engine_with(&graph);

    let details = engine.node_details("main").unwrap();
    assert_eq!(details.file.as_deref(), Some("src/main.rs"));
    assert_eq!(details.security_issues.len(), 1);
    assert_eq!(details.security_issues[0].severity.as_deref(), Some("high"));
    assert!(details.code_smells.is_empty());
    assert_eq!(
        details.documentation.as_ref().and_then(|doc| doc.docstring.as_deref()),
        Some("Entry point.")
    );
    assert!(engine.node_details("run").unwrap().documentation.is_none());
    assert_eq!(engine.model().links().len(), 1);

    let fills = |engine: &GraphEngine| {
        record(engine)
            .nodes
            .iter()
            .map(|node| node.2)
            .collect::<Vec<_>>()
    };
    let main = engine.model().index_of("main").unwrap();
    let run = engine.model().index_of("run").unwrap();

    let by_complexity = fills(&engine);
    assert_eq!(by_complexity[main], ColorMapper::color_for_value(2.0));
    assert_eq!(by_complexity[run], ColorMapper::color_for_value(10.0));

    engine.set_color_metric("loc");
    let by_loc = fills(&engine);
    assert_eq!(by_loc[main], ColorMapper::color_for_value(9.0));
    assert_eq!(by_loc[run], ColorMapper::color_for_value(1.0));
    assert_eq!(positions(&engine).len(), 2);
}

#[test]
fn test_render_is_idempotent() {
    let mut engine = engine_with(&chain(&["a", "b", "c"]));
    engine.settle(40);
    let first = record(&engine);
    let second = record(&engine);
    assert_eq!(first.links, second.links);
    assert_eq!(first.nodes, second.nodes);
    assert_eq!(first.labels, second.labels);
}

#[test]
fn test_radial_layout_survives_huge_supplied_depth() {
    let graph = parse_payload(r#"{"nodes":[{"id":"a","depth":5e9},{"id":"b"}]}"#).unwrap();
    let mut engine = engine_with(&graph);
    engine.set_layout(LayoutMode::Radial);
    assert!(engine.simulation().is_running());
    engine.settle(50);
    assert!(positions(&engine).iter().all(|pos| pos.is_finite()));
}

#[test]
fn test_zoomed_out_drag_only_hits_at_the_press_point() {
    let mut engine = engine_with(&chain(&["a"]));
    engine.settle(2000);
    engine.zoom_at(0.1, pos2(400.0, 300.0));
    assert_eq!(engine.transform().scale, 0.1);

    // At this scale a node covers less than a pixel, so a drag reported a
    // few pixels after the button went down would miss it.
    let press = engine.transform().apply(engine.model().nodes()[0].pos);
    assert_eq!(engine.node_at(press + vec2(3.0, 0.0)), None);
    assert_eq!(engine.begin_drag(press), Some(0));
}
