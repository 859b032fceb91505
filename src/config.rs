use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Tunables for every engine component. Every field has a default, so a
/// config file only needs to name what it overrides.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub simulation: SimulationConfig,
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
    pub minimap: MinimapConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub alpha_min: f32,
    pub alpha_decay: f32,
    /// Fraction of velocity kept after each tick.
    pub velocity_retention: f32,
    pub link_distance: f32,
    pub charge_strength: f32,
    pub theta: f32,
    pub collision_radius: f32,
    pub collision_strength: f32,
    pub collision_iterations: usize,
    pub center_strength: f32,
    /// Alpha target held while a drag is active.
    pub drag_alpha_target: f32,
    pub max_ticks_per_frame: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            alpha_min: 0.001,
            alpha_decay: 1.0 - 0.001_f32.powf(1.0 / 300.0),
            velocity_retention: 0.6,
            link_distance: 100.0,
            charge_strength: -300.0,
            theta: 0.9,
            collision_radius: 50.0,
            collision_strength: 1.0,
            collision_iterations: 1,
            center_strength: 1.0,
            drag_alpha_target: 0.3,
            max_ticks_per_frame: 4,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub root: Option<String>,
    pub tree_breadth_spacing: f32,
    pub tree_level_spacing: f32,
    pub radial_link_distance: f32,
    pub radial_ring_spacing: f32,
    pub radial_strength: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            root: None,
            tree_breadth_spacing: 120.0,
            tree_level_spacing: 150.0,
            radial_link_distance: 50.0,
            radial_ring_spacing: 100.0,
            radial_strength: 0.1,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 4.0,
            width: 960.0,
            height: 640.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MinimapConfig {
    pub scale: f32,
    pub marker_radius: f32,
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            scale: 0.2,
            marker_radius: 2.0,
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("invalid config JSON in {}", path.display()))?;
        Ok(config.sanitized())
    }

    /// Pulls values that would stall or explode the simulation back into a
    /// workable range.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        let sim = &mut self.simulation;
        sim.alpha_min = sim.alpha_min.clamp(1e-6, 0.5);
        sim.alpha_decay = sim.alpha_decay.clamp(1e-4, 1.0);
        sim.velocity_retention = sim.velocity_retention.clamp(0.0, 1.0);
        sim.link_distance = sim.link_distance.max(1.0);
        if !sim.theta.is_finite() || sim.theta <= 0.0 {
            log::warn!("theta {} is unusable, using {}", sim.theta, defaults.simulation.theta);
            sim.theta = defaults.simulation.theta;
        }
        sim.collision_radius = sim.collision_radius.max(0.0);
        sim.collision_strength = sim.collision_strength.clamp(0.0, 1.0);
        sim.collision_iterations = sim.collision_iterations.clamp(1, 8);
        sim.center_strength = sim.center_strength.clamp(0.0, 1.0);
        sim.drag_alpha_target = sim.drag_alpha_target.clamp(0.0, 1.0);
        sim.max_ticks_per_frame = sim.max_ticks_per_frame.max(1);

        let layout = &mut self.layout;
        layout.tree_breadth_spacing = layout.tree_breadth_spacing.max(1.0);
        layout.tree_level_spacing = layout.tree_level_spacing.max(1.0);
        layout.radial_link_distance = layout.radial_link_distance.max(1.0);
        layout.radial_ring_spacing = layout.radial_ring_spacing.max(1.0);
        layout.radial_strength = layout.radial_strength.clamp(0.0, 1.0);

        let viewport = &mut self.viewport;
        if !(viewport.min_scale > 0.0 && viewport.min_scale <= viewport.max_scale) {
            log::warn!(
                "scale bounds [{}, {}] are invalid, using defaults",
                viewport.min_scale,
                viewport.max_scale
            );
            viewport.min_scale = defaults.viewport.min_scale;
            viewport.max_scale = defaults.viewport.max_scale;
        }
        viewport.width = viewport.width.max(1.0);
        viewport.height = viewport.height.max(1.0);

        self.minimap.scale = self.minimap.scale.clamp(0.01, 1.0);
        self.minimap.marker_radius = self.minimap.marker_radius.max(0.5);

        self
    }
}
