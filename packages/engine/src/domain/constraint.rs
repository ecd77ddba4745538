use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{SimError, SimResult};

use super::body::BodyId;
use super::vec2::Vec2;

/// Stable constraint handle. Never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConstraintId(pub u32);

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Closed set of joint kinds understood by the solver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Keep two anchor points `distance` apart. Zero pins the points together.
    Pin {
        anchor_a: Vec2,
        anchor_b: Vec2,
        distance: f32,
    },
    /// Keep `angle_b - angle_a` inside `[min, max]`.
    RotaryLimit { min: f32, max: f32 },
    /// Keep the anchor distance inside `[min, max]`.
    Slide {
        anchor_a: Vec2,
        anchor_b: Vec2,
        min: f32,
        max: f32,
    },
}

/// Pairwise relation between two bodies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Constraint {
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub kind: ConstraintKind,
}

impl Constraint {
    pub fn pin(body_a: BodyId, body_b: BodyId, anchor_a: Vec2, anchor_b: Vec2, distance: f32) -> Self {
        Self {
            body_a,
            body_b,
            kind: ConstraintKind::Pin {
                anchor_a,
                anchor_b,
                distance,
            },
        }
    }

    pub fn rotary_limit(body_a: BodyId, body_b: BodyId, min: f32, max: f32) -> Self {
        Self {
            body_a,
            body_b,
            kind: ConstraintKind::RotaryLimit { min, max },
        }
    }

    pub fn slide(body_a: BodyId, body_b: BodyId, anchor_a: Vec2, anchor_b: Vec2, min: f32, max: f32) -> Self {
        Self {
            body_a,
            body_b,
            kind: ConstraintKind::Slide {
                anchor_a,
                anchor_b,
                min,
                max,
            },
        }
    }

    #[inline]
    pub fn involves(&self, body: BodyId) -> bool {
        self.body_a == body || self.body_b == body
    }

    /// Parameter sanity; body existence is checked by the space.
    pub fn validate(&self) -> SimResult<()> {
        if self.body_a == self.body_b {
            return Err(SimError::InvalidConstraint(format!(
                "constraint joins body {} to itself",
                self.body_a
            )));
        }

        match self.kind {
            ConstraintKind::Pin {
                anchor_a,
                anchor_b,
                distance,
            } => {
                if !(anchor_a.is_finite() && anchor_b.is_finite()) {
                    return Err(SimError::InvalidConstraint("pin anchors must be finite".into()));
                }
                if !(distance.is_finite() && distance >= 0.0) {
                    return Err(SimError::InvalidConstraint(format!(
                        "pin distance must be finite and >= 0, got {distance}"
                    )));
                }
            }
            ConstraintKind::RotaryLimit { min, max } => check_range("rotary limit", min, max)?,
            ConstraintKind::Slide {
                anchor_a,
                anchor_b,
                min,
                max,
            } => {
                if !(anchor_a.is_finite() && anchor_b.is_finite()) {
                    return Err(SimError::InvalidConstraint("slide anchors must be finite".into()));
                }
                check_range("slide", min, max)?;
                if min < 0.0 {
                    return Err(SimError::InvalidConstraint(format!(
                        "slide min must be >= 0, got {min}"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn check_range(what: &str, min: f32, max: f32) -> SimResult<()> {
    if !(min.is_finite() && max.is_finite()) || min > max {
        return Err(SimError::InvalidConstraint(format!(
            "{what} range [{min}, {max}] is not a finite ordered range"
        )));
    }
    Ok(())
}
