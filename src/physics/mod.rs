//! Force-directed simulation driven by a decaying temperature.
//!
//! Each tick moves `alpha` toward `alpha_target` by `alpha_decay`, lets every
//! configured force add alpha-scaled impulses to node velocities, then damps
//! and integrates. Once `alpha` falls below `alpha_min` the simulation goes
//! dormant until restarted.

mod forces;
mod quadtree;

use eframe::egui::Vec2;

use crate::config::SimulationConfig;
use crate::graph::GraphModel;
use forces::{
    ChargeParams, CollisionParams, accumulate_charge_for_node, accumulate_collision_pairs,
    apply_center, apply_link, apply_radial,
};
use quadtree::QuadNode;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkForce {
    pub distance: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChargeForce {
    pub strength: f32,
    pub theta: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CenterForce {
    pub target: Vec2,
    pub strength: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionForce {
    pub radius: f32,
    pub strength: f32,
    pub iterations: usize,
}

/// Pulls each node toward a circle of its own radius around `center`.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialForce {
    pub center: Vec2,
    pub strength: f32,
    pub radii: Vec<f32>,
}

/// The forces active for the current layout. Replaced wholesale on a
/// layout switch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ForceSet {
    pub link: Option<LinkForce>,
    pub charge: Option<ChargeForce>,
    pub center: Option<CenterForce>,
    pub collision: Option<CollisionForce>,
    pub radial: Option<RadialForce>,
}

#[derive(Default)]
struct PhysicsScratch {
    positions: Vec<Vec2>,
    radii: Vec<f32>,
    impulses: Vec<Vec2>,
}

pub struct Simulation {
    alpha: f32,
    alpha_target: f32,
    alpha_min: f32,
    alpha_decay: f32,
    velocity_retention: f32,
    running: bool,
    forces: ForceSet,
    scratch: PhysicsScratch,
}

impl Simulation {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            alpha: 1.0,
            alpha_target: 0.0,
            alpha_min: config.alpha_min,
            alpha_decay: config.alpha_decay,
            velocity_retention: config.velocity_retention,
            running: false,
            forces: ForceSet::default(),
            scratch: PhysicsScratch::default(),
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_min(&self) -> f32 {
        self.alpha_min
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn forces(&self) -> &ForceSet {
        &self.forces
    }

    pub fn set_forces(&mut self, forces: ForceSet) {
        self.forces = forces;
    }

    /// Moves the point the center and radial forces pull toward.
    pub fn retarget(&mut self, center: Vec2) {
        if let Some(force) = &mut self.forces.center {
            force.target = center;
        }
        if let Some(force) = &mut self.forces.radial {
            force.center = center;
        }
    }

    /// Reheats to `alpha` and resumes ticking.
    pub fn restart(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
        self.running = true;
        log::debug!("simulation restarted at alpha {:.3}", self.alpha);
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advances one tick. Returns whether the simulation is still running.
    pub fn tick(&mut self, model: &mut GraphModel) -> bool {
        if !self.running {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        self.apply_forces(model);
        self.integrate(model);

        if self.alpha < self.alpha_min {
            self.running = false;
            log::debug!("simulation settled");
        }
        self.running
    }

    fn apply_forces(&mut self, model: &mut GraphModel) {
        let alpha = self.alpha;
        let (nodes, links, degrees) = model.parts_mut();
        if nodes.is_empty() {
            return;
        }

        if let Some(link) = self.forces.link {
            apply_link(nodes, links, degrees, link.distance, alpha);
        }

        if let Some(charge) = self.forces.charge {
            let scratch = &mut self.scratch;
            scratch.positions.clear();
            scratch.positions.extend(nodes.iter().map(|node| node.pos));
            if let Some(tree) = QuadNode::build(&scratch.positions) {
                let params = ChargeParams {
                    strength: charge.strength * alpha,
                    theta: charge.theta,
                };
                for (index, node) in nodes.iter_mut().enumerate() {
                    accumulate_charge_for_node(
                        &tree,
                        index,
                        &scratch.positions,
                        params,
                        &mut node.velocity,
                    );
                }
            }
        }

        if let Some(collision) = self.forces.collision
            && collision.radius > 0.0
        {
            let scratch = &mut self.scratch;
            scratch.radii.clear();
            scratch.radii.resize(nodes.len(), collision.radius);
            let reach = collision.radius * 2.0;
            let params = CollisionParams {
                strength: collision.strength,
                max_collision_distance_sq: reach * reach,
            };

            for _ in 0..collision.iterations {
                scratch.positions.clear();
                scratch
                    .positions
                    .extend(nodes.iter().map(|node| node.pos + node.velocity));
                scratch.impulses.clear();
                scratch.impulses.resize(nodes.len(), Vec2::ZERO);

                let Some(tree) = QuadNode::build(&scratch.positions) else {
                    break;
                };
                accumulate_collision_pairs(
                    &tree,
                    &tree,
                    true,
                    &scratch.positions,
                    &scratch.radii,
                    params,
                    &mut scratch.impulses,
                );
                for (node, impulse) in nodes.iter_mut().zip(&scratch.impulses) {
                    node.velocity += *impulse;
                }
            }
        }

        if let Some(radial) = &self.forces.radial {
            apply_radial(nodes, radial.center, &radial.radii, radial.strength, alpha);
        }

        if let Some(center) = self.forces.center {
            apply_center(nodes, center.target, center.strength);
        }
    }

    fn integrate(&self, model: &mut GraphModel) {
        for node in model.nodes_mut() {
            if let Some(pin) = node.pin {
                node.pos = pin;
                node.velocity = Vec2::ZERO;
                continue;
            }

            node.velocity *= self.velocity_retention;
            if !node.velocity.is_finite() {
                node.velocity = Vec2::ZERO;
            }
            node.pos += node.velocity;
        }
    }
}
