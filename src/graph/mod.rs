mod payload;

use std::collections::HashMap;
use std::f32::consts::PI;

use eframe::egui::{Vec2, vec2};

pub use payload::{
    Documentation, Finding, Graph, LinkSpec, MAX_SUPPLIED_DEPTH, NodeDetails, NodeSpec,
    load_payload, parse_payload,
};

pub struct Node {
    pub id: String,
    pub pos: Vec2,
    pub velocity: Vec2,
    /// Fixed position override; while set the simulation holds the node here.
    pub pin: Option<Vec2>,
    pub depth: Option<u32>,
    metrics: HashMap<String, f64>,
}

impl Node {
    fn new(spec: &NodeSpec) -> Self {
        Self {
            id: spec.id.clone(),
            pos: Vec2::ZERO,
            velocity: Vec2::ZERO,
            pin: None,
            depth: spec.depth(),
            metrics: spec.metrics(),
        }
    }

    /// Missing and non-finite values read as 0.
    pub fn metric(&self, name: &str) -> f64 {
        self.metrics
            .get(name)
            .copied()
            .filter(|value| value.is_finite())
            .unwrap_or(0.0)
    }

    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Link {
    pub source: usize,
    pub target: usize,
}

impl Link {
    pub fn is_self_loop(self) -> bool {
        self.source == self.target
    }
}

/// The loaded graph: nodes in payload order, links resolved to node indices.
#[derive(Default)]
pub struct GraphModel {
    nodes: Vec<Node>,
    links: Vec<Link>,
    index_by_id: HashMap<String, usize>,
    degrees: Vec<usize>,
    details: HashMap<String, NodeDetails>,
}

impl GraphModel {
    /// Builds a model, dropping duplicate ids and links that reference
    /// unknown nodes.
    pub fn from_graph(graph: &Graph) -> Self {
        let mut nodes = Vec::with_capacity(graph.nodes.len());
        let mut index_by_id = HashMap::with_capacity(graph.nodes.len());
        let mut details = HashMap::new();

        for spec in &graph.nodes {
            if index_by_id.contains_key(&spec.id) {
                log::warn!("dropping duplicate node id {:?}", spec.id);
                continue;
            }
            index_by_id.insert(spec.id.clone(), nodes.len());
            if let Some(entry) = spec.details() {
                details.insert(spec.id.clone(), entry);
            }
            nodes.push(Node::new(spec));
        }

        let mut links = Vec::with_capacity(graph.links.len());
        let mut dropped = 0usize;
        for spec in &graph.links {
            match (index_by_id.get(&spec.source), index_by_id.get(&spec.target)) {
                (Some(&source), Some(&target)) => links.push(Link { source, target }),
                _ => {
                    log::warn!(
                        "dropping link {:?} -> {:?}: endpoint not in node set",
                        spec.source,
                        spec.target
                    );
                    dropped += 1;
                }
            }
        }
        links.sort_unstable_by_key(|link| (link.source, link.target));
        links.dedup();

        let mut degrees = vec![0usize; nodes.len()];
        for link in links.iter().filter(|link| !link.is_self_loop()) {
            degrees[link.source] += 1;
            degrees[link.target] += 1;
        }

        log::info!(
            "loaded graph with {} nodes and {} links ({} dangling dropped)",
            nodes.len(),
            links.len(),
            dropped
        );

        Self {
            nodes,
            links,
            index_by_id,
            degrees,
            details,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// Split borrow for the simulator: nodes to write, links and degrees to read.
    pub fn parts_mut(&mut self) -> (&mut [Node], &[Link], &[usize]) {
        (&mut self.nodes, &self.links, &self.degrees)
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn degree(&self, index: usize) -> usize {
        self.degrees.get(index).copied().unwrap_or(0)
    }

    pub fn details(&self, id: &str) -> Option<&NodeDetails> {
        self.details.get(id)
    }

    /// Every metric name carried by at least one node, sorted.
    pub fn metric_names(&self) -> Vec<String> {
        let mut names = self
            .nodes
            .iter()
            .flat_map(Node::metric_names)
            .map(str::to_owned)
            .collect::<Vec<_>>();
        names.sort();
        names.dedup();
        names
    }

    /// Undirected adjacency lists, self-loops excluded.
    pub fn neighbours(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.nodes.len()];
        for link in self.links.iter().filter(|link| !link.is_self_loop()) {
            adjacency[link.source].push(link.target);
            adjacency[link.target].push(link.source);
        }
        adjacency
    }

    /// Seeds positions on a phyllotaxis spiral around `center` and zeroes
    /// velocities and pins.
    pub fn scatter_around(&mut self, center: Vec2) {
        let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
        for (index, node) in self.nodes.iter_mut().enumerate() {
            let radius = 10.0 * (0.5 + index as f32).sqrt();
            let angle = index as f32 * golden_angle;
            node.pos = center + vec2(angle.cos(), angle.sin()) * radius;
            node.velocity = Vec2::ZERO;
            node.pin = None;
        }
    }

    pub fn centroid(&self) -> Vec2 {
        if self.nodes.is_empty() {
            return Vec2::ZERO;
        }
        let sum = self.nodes.iter().fold(Vec2::ZERO, |acc, node| acc + node.pos);
        sum / self.nodes.len() as f32
    }
}
