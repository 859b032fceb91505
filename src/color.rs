use eframe::egui::Color32;

use crate::graph::Node;

pub const DEFAULT_METRIC: &str = "complexity";

const DOMAIN_MIN: f64 = 0.0;
const DOMAIN_MAX: f64 = 10.0;

/// Viridis sampled at ten evenly spaced stops.
const VIRIDIS: [[u8; 3]; 10] = [
    [0x44, 0x01, 0x54],
    [0x48, 0x28, 0x78],
    [0x3e, 0x49, 0x89],
    [0x31, 0x68, 0x8e],
    [0x26, 0x82, 0x8e],
    [0x1f, 0x9e, 0x89],
    [0x35, 0xb7, 0x79],
    [0x6e, 0xce, 0x58],
    [0xb5, 0xde, 0x2b],
    [0xfd, 0xe7, 0x25],
];

fn lerp_channel(from: u8, to: u8, t: f32) -> u8 {
    (from as f32 + (to as f32 - from as f32) * t).round() as u8
}

/// Maps `t` in `[0, 1]` onto the viridis ramp.
pub fn viridis(t: f32) -> Color32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f32;
    let lower = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let local = scaled - lower as f32;
    let (a, b) = (VIRIDIS[lower], VIRIDIS[lower + 1]);
    Color32::from_rgb(
        lerp_channel(a[0], b[0], local),
        lerp_channel(a[1], b[1], local),
        lerp_channel(a[2], b[2], local),
    )
}

/// Colors nodes by one named metric over the fixed domain `[0, 10]`.
pub struct ColorMapper {
    metric: String,
}

impl Default for ColorMapper {
    fn default() -> Self {
        Self::new(DEFAULT_METRIC)
    }
}

impl ColorMapper {
    pub fn new(metric: &str) -> Self {
        Self {
            metric: metric.to_owned(),
        }
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn set_metric(&mut self, metric: &str) {
        if self.metric != metric {
            log::info!("coloring nodes by {metric:?}");
            self.metric = metric.to_owned();
        }
    }

    pub fn color_for(&self, node: &Node) -> Color32 {
        Self::color_for_value(node.metric(&self.metric))
    }

    pub fn color_for_value(value: f64) -> Color32 {
        let value = if value.is_finite() { value } else { 0.0 };
        let t = (value.clamp(DOMAIN_MIN, DOMAIN_MAX) - DOMAIN_MIN) / (DOMAIN_MAX - DOMAIN_MIN);
        viridis(t as f32)
    }
}
