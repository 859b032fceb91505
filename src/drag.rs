use eframe::egui::Vec2;

use crate::graph::GraphModel;
use crate::physics::Simulation;

#[derive(Clone, Copy, Debug, PartialEq)]
struct ActiveDrag {
    node: usize,
    /// Node position minus pointer at grab time.
    grab_offset: Vec2,
}

/// Turns pointer drags into pins. Each node is either idle or held by
/// exactly one drag.
pub struct DragController {
    active: Vec<ActiveDrag>,
    alpha_target: f32,
}

impl DragController {
    pub fn new(alpha_target: f32) -> Self {
        Self {
            active: Vec::new(),
            alpha_target,
        }
    }

    pub fn is_dragging(&self, node: usize) -> bool {
        self.active.iter().any(|drag| drag.node == node)
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// Starts dragging `node`. Returns false if it is already being dragged
    /// or does not exist.
    pub fn begin(
        &mut self,
        node: usize,
        pointer: Vec2,
        model: &mut GraphModel,
        simulation: &mut Simulation,
        simulated: bool,
    ) -> bool {
        if self.is_dragging(node) || node >= model.len() {
            return false;
        }

        if simulated {
            if !simulation.is_running() {
                simulation.restart(self.alpha_target);
            }
            simulation.set_alpha_target(self.alpha_target);
        }

        let target = &mut model.nodes_mut()[node];
        self.active.push(ActiveDrag {
            node,
            grab_offset: target.pos - pointer,
        });
        target.pin = Some(target.pos);
        target.velocity = Vec2::ZERO;
        true
    }

    pub fn move_to(&mut self, node: usize, pointer: Vec2, model: &mut GraphModel) {
        let Some(drag) = self.active.iter().find(|drag| drag.node == node) else {
            return;
        };
        let Some(target) = model.nodes_mut().get_mut(node) else {
            return;
        };
        let held = pointer + drag.grab_offset;
        target.pin = Some(held);
        target.pos = held;
    }

    pub fn end(&mut self, node: usize, model: &mut GraphModel, simulation: &mut Simulation) {
        let before = self.active.len();
        self.active.retain(|drag| drag.node != node);
        if self.active.len() == before {
            return;
        }

        if let Some(target) = model.nodes_mut().get_mut(node) {
            target.pin = None;
        }
        if self.active.is_empty() {
            simulation.set_alpha_target(0.0);
        }
    }

    /// Releases every drag, e.g. before the graph or layout is replaced.
    pub fn cancel_all(&mut self, model: &mut GraphModel, simulation: &mut Simulation) {
        for drag in self.active.drain(..) {
            if let Some(target) = model.nodes_mut().get_mut(drag.node) {
                target.pin = None;
            }
        }
        simulation.set_alpha_target(0.0);
    }
}
