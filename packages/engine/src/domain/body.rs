use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{SimError, SimResult};

use super::shape::Shape;
use super::vec2::Vec2;

/// Stable body handle. Never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a body participates in the step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Never moves (rope anchors).
    Static,
    /// Moved by the host through `Space::set_kinematic_position`, never by the solver.
    Kinematic,
    /// Integrated by the solver.
    Dynamic,
}

/// Rigid body state
#[derive(Clone, Debug)]
pub struct Body {
    kind: BodyKind,
    // === Physics State ===
    /// World position (center of mass)
    pub position: Vec2,
    /// Velocity (units per second)
    pub velocity: Vec2,
    /// Rotation angle (radians)
    pub angle: f32,
    /// Angular velocity (radians per second)
    pub angular_velocity: f32,

    mass: f32,
    moment_of_inertia: f32,
    inv_mass: f32,
    inv_inertia: f32,

    /// Attached geometry, if any
    pub shape: Option<Shape>,
}

impl Body {
    pub fn new_static(position: Vec2) -> Self {
        Self::immovable(BodyKind::Static, position)
    }

    pub fn new_kinematic(position: Vec2) -> Self {
        Self::immovable(BodyKind::Kinematic, position)
    }

    /// Dynamic body. Mass must be positive and finite; a non-positive moment
    /// locks rotation.
    pub fn new_dynamic(position: Vec2, mass: f32, moment_of_inertia: f32) -> SimResult<Self> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(SimError::InvalidBody(format!(
                "dynamic body needs a positive mass, got {mass}"
            )));
        }
        if !position.is_finite() {
            return Err(SimError::InvalidBody(format!(
                "non-finite spawn position ({}, {})",
                position.x, position.y
            )));
        }

        let inv_inertia = if moment_of_inertia.is_finite() && moment_of_inertia > 0.0 {
            1.0 / moment_of_inertia
        } else {
            0.0
        };

        Ok(Self {
            kind: BodyKind::Dynamic,
            position,
            velocity: Vec2::zero(),
            angle: 0.0,
            angular_velocity: 0.0,
            mass,
            moment_of_inertia,
            inv_mass: 1.0 / mass,
            inv_inertia,
            shape: None,
        })
    }

    /// Dynamic body whose moment of inertia comes from its shape.
    pub fn new_dynamic_with_shape(position: Vec2, mass: f32, shape: Shape) -> SimResult<Self> {
        let moment = shape.moment_for_mass(mass);
        Ok(Self::new_dynamic(position, mass, moment)?.with_shape(shape))
    }

    fn immovable(kind: BodyKind, position: Vec2) -> Self {
        Self {
            kind,
            position,
            velocity: Vec2::zero(),
            angle: 0.0,
            angular_velocity: 0.0,
            mass: f32::INFINITY,
            moment_of_inertia: f32::INFINITY,
            inv_mass: 0.0,
            inv_inertia: 0.0,
            shape: None,
        }
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn moment_of_inertia(&self) -> f32 {
        self.moment_of_inertia
    }

    /// Zero for static and kinematic bodies, so the solver never moves them.
    #[inline]
    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    #[inline]
    pub fn inv_inertia(&self) -> f32 {
        self.inv_inertia
    }

    /// Transform a local point to world coordinates
    #[inline]
    pub fn local_to_world(&self, local: Vec2) -> Vec2 {
        self.position + local.rotate(self.angle)
    }

    /// Shape endpoints in world space; the body position twice when shapeless.
    pub fn endpoints(&self) -> (Vec2, Vec2) {
        match self.shape {
            Some(shape) => shape.endpoints(self.position, self.angle),
            None => (self.position, self.position),
        }
    }

    /// Apply impulse at center of mass
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.velocity += impulse * self.inv_mass;
    }

    pub fn has_finite_state(&self) -> bool {
        self.position.is_finite() && self.angle.is_finite()
    }
}
