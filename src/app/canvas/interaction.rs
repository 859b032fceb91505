use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.engine
            .zoom_at(zoom_factor, Self::canvas_local(rect, pointer));
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        let background_drag =
            self.dragging.is_none() && response.dragged_by(egui::PointerButton::Primary);
        if background_drag
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.engine.pan_by(response.drag_delta());
        }
    }

    /// Primary-button drags that start on a node pin it under the pointer
    /// until released. The hit test uses where the button went down, since
    /// egui only reports the drag once the pointer has left that spot.
    pub(in crate::app) fn handle_node_drag(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(pointer) = ui
                .input(|input| input.pointer.press_origin())
                .or_else(|| response.interact_pointer_pos())
        {
            self.dragging = self.engine.begin_drag(Self::canvas_local(rect, pointer));
        }

        let Some(node) = self.dragging else {
            return;
        };

        if response.drag_stopped() {
            self.engine.end_drag(node);
            self.dragging = None;
        } else if let Some(pointer) = response.interact_pointer_pos() {
            self.engine.drag_to(node, Self::canvas_local(rect, pointer));
        }
    }

    pub(in crate::app) fn handle_graph_click(&mut self, rect: Rect, response: &egui::Response) {
        if !response.clicked_by(egui::PointerButton::Primary) {
            return;
        }
        let Some(pointer) = response.interact_pointer_pos() else {
            return;
        };

        let selected = self
            .engine
            .node_at(Self::canvas_local(rect, pointer))
            .map(|index| self.engine.model().nodes()[index].id.clone());
        self.set_selected(selected);
    }

    pub(in crate::app) fn hovered_index(&self, ui: &Ui, rect: Rect) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }
        self.engine.node_at(Self::canvas_local(rect, pointer))
    }

    fn canvas_local(rect: Rect, pointer: Pos2) -> Pos2 {
        (pointer - rect.min).to_pos2()
    }
}
