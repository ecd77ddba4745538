use serde::{Deserialize, Serialize};

use super::vec2::Vec2;

/// Axis-aligned target rectangle. `(x, y)` is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetZone {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl TargetZone {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Inclusive on every edge. NaN points are never inside.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }
}

impl Default for TargetZone {
    fn default() -> Self {
        Self::new(300.0, 500.0, 200.0, 50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_inside() {
        let zone = TargetZone::default();
        assert!(zone.contains(Vec2::new(300.0, 500.0)));
        assert!(zone.contains(Vec2::new(500.0, 550.0)));
        assert!(zone.contains(Vec2::new(400.0, 525.0)));
        assert!(!zone.contains(Vec2::new(299.99, 525.0)));
        assert!(!zone.contains(Vec2::new(400.0, 550.01)));
        assert!(!zone.contains(Vec2::new(f32::NAN, 525.0)));
    }
}
