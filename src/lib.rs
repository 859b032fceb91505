//! Interactive call-graph visualization engine.
//!
//! [`engine::GraphEngine`] ties the pieces together: a force simulation with
//! three layout modes, a clamped pan/zoom viewport mirrored by a minimap,
//! substring search highlighting and metric-driven node colors. Painting goes
//! through the [`render::Scene`] trait so everything runs headlessly.

pub mod color;
pub mod config;
pub mod drag;
pub mod engine;
pub mod graph;
pub mod layout;
pub mod minimap;
pub mod panel;
pub mod physics;
pub mod render;
pub mod search;
pub mod viewport;

pub use config::EngineConfig;
pub use engine::GraphEngine;
pub use graph::{Graph, LinkSpec, NodeSpec};
pub use layout::LayoutMode;
