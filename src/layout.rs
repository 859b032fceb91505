use std::collections::VecDeque;

use eframe::egui::{Vec2, vec2};
use serde::Deserialize;

use crate::config::{EngineConfig, LayoutConfig, SimulationConfig};
use crate::graph::GraphModel;
use crate::physics::{
    CenterForce, ChargeForce, CollisionForce, ForceSet, LinkForce, RadialForce, Simulation,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Force,
    Hierarchical,
    Radial,
}

impl LayoutMode {
    pub const ALL: [Self; 3] = [Self::Force, Self::Hierarchical, Self::Radial];

    pub fn label(self) -> &'static str {
        match self {
            Self::Force => "force",
            Self::Hierarchical => "hierarchical",
            Self::Radial => "radial",
        }
    }

    /// Whether the simulation keeps running in this mode.
    pub fn is_simulated(self) -> bool {
        !matches!(self, Self::Hierarchical)
    }
}

pub struct LayoutEngine {
    mode: LayoutMode,
    layout: LayoutConfig,
    simulation: SimulationConfig,
}

impl LayoutEngine {
    pub fn new(mode: LayoutMode, config: &EngineConfig) -> Self {
        Self {
            mode,
            layout: config.layout.clone(),
            simulation: config.simulation.clone(),
        }
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn set_root(&mut self, root: Option<String>) {
        self.layout.root = root;
    }

    /// Switches to `mode`, replacing the previous mode's forces and
    /// recomputing positions or reheating the simulation.
    pub fn apply(
        &mut self,
        mode: LayoutMode,
        model: &mut GraphModel,
        simulation: &mut Simulation,
        center: Vec2,
    ) {
        self.mode = mode;
        for node in model.nodes_mut() {
            node.velocity = Vec2::ZERO;
        }

        match mode {
            LayoutMode::Force => {
                simulation.set_forces(self.force_forces(center));
                simulation.restart(1.0);
            }
            LayoutMode::Hierarchical => {
                simulation.set_forces(ForceSet::default());
                simulation.stop();
                let root = resolve_root(model, self.layout.root.as_deref());
                let positions = tree_positions(
                    model,
                    root,
                    center,
                    self.layout.tree_breadth_spacing,
                    self.layout.tree_level_spacing,
                );
                for (node, position) in model.nodes_mut().iter_mut().zip(positions) {
                    node.pos = position;
                }
            }
            LayoutMode::Radial => {
                let root = resolve_root(model, self.layout.root.as_deref());
                let depths = resolve_depths(model, root);
                let radii = depths
                    .iter()
                    .map(|&depth| depth as f32 * self.layout.radial_ring_spacing)
                    .collect();
                simulation.set_forces(self.radial_forces(center, radii));
                simulation.restart(1.0);
            }
        }

        log::info!("layout switched to {}", mode.label());
    }

    fn force_forces(&self, center: Vec2) -> ForceSet {
        let sim = &self.simulation;
        ForceSet {
            link: Some(LinkForce {
                distance: sim.link_distance,
            }),
            charge: Some(self.charge()),
            center: Some(CenterForce {
                target: center,
                strength: sim.center_strength,
            }),
            collision: Some(self.collision()),
            radial: None,
        }
    }

    fn radial_forces(&self, center: Vec2, radii: Vec<f32>) -> ForceSet {
        ForceSet {
            link: Some(LinkForce {
                distance: self.layout.radial_link_distance,
            }),
            charge: Some(self.charge()),
            center: None,
            collision: Some(self.collision()),
            radial: Some(RadialForce {
                center,
                strength: self.layout.radial_strength,
                radii,
            }),
        }
    }

    fn charge(&self) -> ChargeForce {
        ChargeForce {
            strength: self.simulation.charge_strength,
            theta: self.simulation.theta,
        }
    }

    fn collision(&self) -> CollisionForce {
        CollisionForce {
            radius: self.simulation.collision_radius,
            strength: self.simulation.collision_strength,
            iterations: self.simulation.collision_iterations,
        }
    }
}

/// Configured root if present, else the first node with a supplied depth of
/// 0, else the node with the most outgoing links.
pub fn resolve_root(model: &GraphModel, configured: Option<&str>) -> Option<usize> {
    if let Some(id) = configured {
        match model.index_of(id) {
            Some(index) => return Some(index),
            None => log::warn!("configured root {id:?} is not in the graph"),
        }
    }

    if let Some(index) = model.nodes().iter().position(|node| node.depth == Some(0)) {
        return Some(index);
    }

    let mut out_degree = vec![0usize; model.len()];
    for link in model.links().iter().filter(|link| !link.is_self_loop()) {
        out_degree[link.source] += 1;
    }
    out_degree
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(index, _)| index)
}

/// Supplied depths win; the rest come from undirected BFS distance to the
/// root. Unreachable nodes sit one ring beyond the deepest reachable one.
pub fn resolve_depths(model: &GraphModel, root: Option<usize>) -> Vec<u32> {
    let mut depths = model
        .nodes()
        .iter()
        .map(|node| node.depth)
        .collect::<Vec<_>>();

    let mut bfs = vec![None; model.len()];
    if let Some(root) = root {
        let adjacency = model.neighbours();
        let mut queue = VecDeque::from([root]);
        bfs[root] = Some(0u32);
        while let Some(current) = queue.pop_front() {
            let next_depth = bfs[current].unwrap_or(0) + 1;
            for &next in &adjacency[current] {
                if bfs[next].is_none() {
                    bfs[next] = Some(next_depth);
                    queue.push_back(next);
                }
            }
        }
    }

    for (depth, computed) in depths.iter_mut().zip(&bfs) {
        if depth.is_none() {
            *depth = *computed;
        }
    }

    let overflow = depths
        .iter()
        .flatten()
        .copied()
        .max()
        .map_or(0, |max| max.saturating_add(1));
    depths
        .into_iter()
        .map(|depth| depth.unwrap_or(overflow))
        .collect()
}

/// Layered tree placement. Spanning trees come from BFS (root first, then
/// any unvisited node in load order); leaves take consecutive breadth slots
/// in depth-first order and parents sit centred over their children.
pub fn tree_positions(
    model: &GraphModel,
    root: Option<usize>,
    center: Vec2,
    breadth_spacing: f32,
    level_spacing: f32,
) -> Vec<Vec2> {
    let count = model.len();
    if count == 0 {
        return Vec::new();
    }

    let adjacency = model.neighbours();
    let mut children = vec![Vec::new(); count];
    let mut levels = vec![0u32; count];
    let mut visited = vec![false; count];
    let mut tree_roots = Vec::new();

    let starts = root.into_iter().chain(0..count);
    for start in starts {
        if visited[start] {
            continue;
        }
        tree_roots.push(start);
        visited[start] = true;
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for &next in &adjacency[current] {
                if !visited[next] {
                    visited[next] = true;
                    levels[next] = levels[current] + 1;
                    children[current].push(next);
                    queue.push_back(next);
                }
            }
        }
    }

    let mut preorder = Vec::with_capacity(count);
    let mut stack = tree_roots.iter().rev().copied().collect::<Vec<_>>();
    while let Some(current) = stack.pop() {
        preorder.push(current);
        stack.extend(children[current].iter().rev().copied());
    }

    let mut slots = vec![0.0_f32; count];
    let mut next_slot = 0.0_f32;
    for &index in &preorder {
        if children[index].is_empty() {
            slots[index] = next_slot;
            next_slot += 1.0;
        }
    }
    for &index in preorder.iter().rev() {
        if let (Some(&first), Some(&last)) = (children[index].first(), children[index].last()) {
            slots[index] = (slots[first] + slots[last]) * 0.5;
        }
    }

    let width = (next_slot - 1.0).max(0.0) * breadth_spacing;
    let height = levels.iter().copied().max().unwrap_or(0) as f32 * level_spacing;
    let origin = center - vec2(width, height) * 0.5;

    (0..count)
        .map(|index| {
            origin + vec2(slots[index] * breadth_spacing, levels[index] as f32 * level_spacing)
        })
        .collect()
}
