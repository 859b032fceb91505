use eframe::egui::{Pos2, Vec2, pos2, vec2};

use crate::config::ViewportConfig;

/// Pan/zoom mapping from world to screen: `screen = world * scale + translate`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    pub fn translation(self) -> Vec2 {
        vec2(self.translate_x, self.translate_y)
    }

    pub fn apply(self, world: Vec2) -> Pos2 {
        pos2(
            world.x * self.scale + self.translate_x,
            world.y * self.scale + self.translate_y,
        )
    }

    pub fn invert(self, screen: Pos2) -> Vec2 {
        vec2(
            (screen.x - self.translate_x) / self.scale,
            (screen.y - self.translate_y) / self.scale,
        )
    }
}

/// Sole owner of the transform. Every mutation replaces the whole value, so
/// readers only ever see a complete transform.
pub struct ViewportController {
    transform: Transform,
    size: Vec2,
    min_scale: f32,
    max_scale: f32,
}

impl ViewportController {
    pub fn new(config: &ViewportConfig) -> Self {
        Self {
            transform: Transform::IDENTITY,
            size: vec2(config.width, config.height),
            min_scale: config.min_scale,
            max_scale: config.max_scale,
        }
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Viewport centre in world coordinates under the identity transform.
    pub fn center(&self) -> Vec2 {
        self.size * 0.5
    }

    pub fn resize(&mut self, size: Vec2) {
        self.size = size.max(vec2(1.0, 1.0));
    }

    pub fn clamp_scale(&self, scale: f32) -> f32 {
        if scale.is_nan() {
            return self.transform.scale;
        }
        scale.clamp(self.min_scale, self.max_scale)
    }

    pub fn set_transform(&mut self, transform: Transform) {
        let scale = self.clamp_scale(transform.scale);
        let translation = if transform.translation().is_finite() {
            transform.translation()
        } else {
            self.transform.translation()
        };
        self.transform = Transform {
            translate_x: translation.x,
            translate_y: translation.y,
            scale,
        };
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        let translation = self.transform.translation() + delta;
        self.set_transform(Transform {
            translate_x: translation.x,
            translate_y: translation.y,
            ..self.transform
        });
    }

    /// Multiplies the scale by `factor`, keeping the world point under
    /// `anchor` fixed on screen.
    pub fn zoom_at(&mut self, factor: f32, anchor: Pos2) {
        let world = self.transform.invert(anchor);
        let scale = self.clamp_scale(self.transform.scale * factor);
        self.set_transform(Transform {
            translate_x: anchor.x - world.x * scale,
            translate_y: anchor.y - world.y * scale,
            scale,
        });
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.zoom_at(scale / self.transform.scale, (self.size * 0.5).to_pos2());
    }

    /// Pans so `world` lands in the middle of the viewport.
    pub fn focus(&mut self, world: Vec2) {
        let middle = self.size * 0.5;
        self.set_transform(Transform {
            translate_x: middle.x - world.x * self.transform.scale,
            translate_y: middle.y - world.y * self.transform.scale,
            scale: self.transform.scale,
        });
    }

    pub fn reset(&mut self) {
        self.transform = Transform::IDENTITY;
    }
}
