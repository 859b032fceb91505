use eframe::egui::{Pos2, Vec2, vec2};

use crate::graph::NodeDetails;

const CASCADE_STEP: Vec2 = vec2(28.0, 28.0);
const CASCADE_WRAP: usize = 8;

/// Hands out staggered window positions so consecutive detail panels do not
/// stack exactly on top of each other. Owned by the host.
pub struct PanelManager {
    origin: Pos2,
    opened: usize,
}

impl PanelManager {
    pub fn new(origin: Pos2) -> Self {
        Self { origin, opened: 0 }
    }

    pub fn opened(&self) -> usize {
        self.opened
    }

    fn next_position(&mut self) -> Pos2 {
        let slot = self.opened % CASCADE_WRAP;
        self.opened += 1;
        self.origin + CASCADE_STEP * slot as f32
    }
}

/// One open detail window for a selected node.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailPanel {
    pub details: NodeDetails,
    pub position: Pos2,
    pub open: bool,
}

impl DetailPanel {
    pub fn new(details: NodeDetails, manager: &mut PanelManager) -> Self {
        Self {
            details,
            position: manager.next_position(),
            open: true,
        }
    }

    pub fn title(&self) -> &str {
        &self.details.id
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    fn details(id: &str) -> NodeDetails {
        NodeDetails {
            id: id.to_owned(),
            ..NodeDetails::default()
        }
    }

    #[test]
    fn test_panels_cascade_from_origin() {
        let mut manager = PanelManager::new(pos2(100.0, 50.0));
        let first = DetailPanel::new(details("a"), &mut manager);
        let second = DetailPanel::new(details("b"), &mut manager);
        assert_eq!(first.position, pos2(100.0, 50.0));
        assert_eq!(second.position, pos2(128.0, 78.0));
        assert_eq!(manager.opened(), 2);
        assert!(first.open);
        assert_eq!(second.title(), "b");
    }

    #[test]
    fn test_cascade_wraps() {
        let mut manager = PanelManager::new(Pos2::ZERO);
        let positions = (0..CASCADE_WRAP + 1)
            .map(|i| DetailPanel::new(details(&format!("n{i}")), &mut manager).position)
            .collect::<Vec<_>>();
        assert_eq!(positions[CASCADE_WRAP], positions[0]);
        assert_ne!(positions[CASCADE_WRAP - 1], positions[0]);
    }

    #[test]
    fn test_managers_are_independent() {
        let mut left = PanelManager::new(Pos2::ZERO);
        let mut right = PanelManager::new(Pos2::ZERO);
        DetailPanel::new(details("a"), &mut left);
        DetailPanel::new(details("b"), &mut left);
        let fresh = DetailPanel::new(details("c"), &mut right);
        assert_eq!(fresh.position, Pos2::ZERO);
    }
}
