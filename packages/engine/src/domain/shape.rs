use serde::{Deserialize, Serialize};

use super::vec2::Vec2;

/// Geometry attached to a body, in the body's local frame.
///
/// Only used for drawing and for computing the endpoints that cut points are
/// tested against; there is no general collision response.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Point with a radius; both endpoints sit on the body position.
    Circle { radius: f32 },
    /// Two-endpoint segment with rounded caps.
    Capsule { a: Vec2, b: Vec2, radius: f32 },
}

impl Shape {
    pub fn circle(radius: f32) -> Self {
        Shape::Circle { radius }
    }

    /// Vertical capsule of `length` centred on the body.
    pub fn vertical_capsule(length: f32, radius: f32) -> Self {
        let half = length * 0.5;
        Shape::Capsule {
            a: Vec2::new(0.0, -half),
            b: Vec2::new(0.0, half),
            radius,
        }
    }

    pub fn radius(&self) -> f32 {
        match *self {
            Shape::Circle { radius } => radius,
            Shape::Capsule { radius, .. } => radius,
        }
    }

    /// World-space endpoints for a body at `position` rotated by `angle`.
    pub fn endpoints(&self, position: Vec2, angle: f32) -> (Vec2, Vec2) {
        match *self {
            Shape::Circle { .. } => (position, position),
            Shape::Capsule { a, b, .. } => (position + a.rotate(angle), position + b.rotate(angle)),
        }
    }

    /// Moment of inertia of this shape for a body of `mass`.
    pub fn moment_for_mass(&self, mass: f32) -> f32 {
        match *self {
            // Solid disc: I = m r^2 / 2
            Shape::Circle { radius } => 0.5 * mass * radius * radius,
            // Thin rod about its centre: I = m L^2 / 12
            Shape::Capsule { a, b, .. } => {
                let len2 = (b - a).length_squared();
                (mass * len2 / 12.0).max(f32::EPSILON)
            }
        }
    }
}
