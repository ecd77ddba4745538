//! Constraint solver
//!
//! Velocity-level sequential impulses with a Baumgarte position bias.
//! Every constraint kind reduces to one or two scalar rows along a direction;
//! each row drives the relative anchor velocity toward `-bias * C / dt`.
//! Static and kinematic bodies have zero inverse mass, so only their
//! partners are adjusted.

use crate::core::{Arena, SimError, SimResult};
use crate::domain::{Body, Constraint, ConstraintId, ConstraintKind, Vec2};

/// Below this a pin is treated as a point-to-point joint.
const ZERO_LENGTH: f32 = 1e-4;
/// Anchors closer than this have no usable direction.
const DEGENERATE: f32 = 1e-6;

/// Per-step solver settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverParams {
    pub gravity: Vec2,
    /// Fixed timestep (seconds)
    pub dt: f32,
    /// Relaxation passes over all constraints per step
    pub iterations: u32,
    /// Fraction of position error corrected per step
    pub bias_factor: f32,
    /// Fraction of velocity kept after one second (1.0 = undamped)
    pub damping: f32,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 900.0),
            dt: 1.0 / 60.0,
            iterations: 10,
            bias_factor: 0.2,
            damping: 0.5,
        }
    }
}

/// Which impulse signs a row may apply
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Clamp {
    Free,
    /// Only draw the anchors together.
    PullOnly,
    /// Only push the anchors apart.
    PushOnly,
}

impl Clamp {
    #[inline]
    fn admits(self, lambda: f32) -> bool {
        match self {
            Clamp::Free => true,
            Clamp::PullOnly => lambda < 0.0,
            Clamp::PushOnly => lambda > 0.0,
        }
    }
}

/// Apply one relaxation pass of `constraint` to its two bodies.
///
/// A missing endpoint means the graph is corrupt and is reported as a
/// dangling reference.
pub fn apply_constraint(
    id: ConstraintId,
    constraint: &Constraint,
    bodies: &mut Arena<Body>,
    params: &SolverParams,
) -> SimResult<()> {
    let Some((a, b)) = bodies.pair_mut(constraint.body_a.0, constraint.body_b.0) else {
        let missing = if bodies.contains(constraint.body_a.0) {
            constraint.body_b
        } else {
            constraint.body_a
        };
        return Err(SimError::DanglingConstraint {
            body: missing,
            constraints: vec![id],
        });
    };

    match constraint.kind {
        ConstraintKind::Pin {
            anchor_a,
            anchor_b,
            distance,
        } => {
            let (ra, rb, delta) = anchor_geometry(a, b, anchor_a, anchor_b);
            if distance <= ZERO_LENGTH {
                // Point joint: one row per axis.
                solve_row(a, b, ra, rb, Vec2::new(1.0, 0.0), delta.x, Clamp::Free, params);
                solve_row(a, b, ra, rb, Vec2::new(0.0, 1.0), delta.y, Clamp::Free, params);
                return Ok(());
            }

            let dist = delta.length();
            if dist < DEGENERATE {
                return Ok(());
            }
            let n = delta * (1.0 / dist);
            solve_row(a, b, ra, rb, n, dist - distance, Clamp::Free, params);
        }
        ConstraintKind::Slide {
            anchor_a,
            anchor_b,
            min,
            max,
        } => {
            let (ra, rb, delta) = anchor_geometry(a, b, anchor_a, anchor_b);
            let dist = delta.length();
            if dist < DEGENERATE {
                return Ok(());
            }
            let n = delta * (1.0 / dist);
            if dist > max {
                solve_row(a, b, ra, rb, n, dist - max, Clamp::PullOnly, params);
            } else if dist < min {
                solve_row(a, b, ra, rb, n, dist - min, Clamp::PushOnly, params);
            }
        }
        ConstraintKind::RotaryLimit { min, max } => {
            let relative = b.angle - a.angle;
            if relative > max {
                solve_angular_row(a, b, relative - max, Clamp::PullOnly, params);
            } else if relative < min {
                solve_angular_row(a, b, relative - min, Clamp::PushOnly, params);
            }
        }
    }
    Ok(())
}

/// World-space anchor offsets and the vector from anchor A to anchor B.
#[inline]
fn anchor_geometry(a: &Body, b: &Body, anchor_a: Vec2, anchor_b: Vec2) -> (Vec2, Vec2, Vec2) {
    let ra = anchor_a.rotate(a.angle);
    let rb = anchor_b.rotate(b.angle);
    let delta = (b.position + rb) - (a.position + ra);
    (ra, rb, delta)
}

#[allow(clippy::too_many_arguments)]
fn solve_row(
    a: &mut Body,
    b: &mut Body,
    ra: Vec2,
    rb: Vec2,
    n: Vec2,
    error: f32,
    clamp: Clamp,
    params: &SolverParams,
) {
    let rna = ra.cross(n);
    let rnb = rb.cross(n);
    let k = a.inv_mass() + b.inv_mass() + a.inv_inertia() * rna * rna + b.inv_inertia() * rnb * rnb;
    if k <= 0.0 {
        return;
    }

    let va = a.velocity + Vec2::cross_scalar(a.angular_velocity, ra);
    let vb = b.velocity + Vec2::cross_scalar(b.angular_velocity, rb);
    let relative = (vb - va).dot(n);
    let bias = -params.bias_factor * error / params.dt;

    let lambda = (bias - relative) / k;
    if !clamp.admits(lambda) {
        return;
    }

    let impulse = n * lambda;
    a.velocity -= impulse * a.inv_mass();
    a.angular_velocity -= a.inv_inertia() * ra.cross(impulse);
    b.velocity += impulse * b.inv_mass();
    b.angular_velocity += b.inv_inertia() * rb.cross(impulse);
}

fn solve_angular_row(a: &mut Body, b: &mut Body, error: f32, clamp: Clamp, params: &SolverParams) {
    let k = a.inv_inertia() + b.inv_inertia();
    if k <= 0.0 {
        return;
    }

    let relative = b.angular_velocity - a.angular_velocity;
    let bias = -params.bias_factor * error / params.dt;
    let lambda = (bias - relative) / k;
    if !clamp.admits(lambda) {
        return;
    }

    a.angular_velocity -= a.inv_inertia() * lambda;
    b.angular_velocity += b.inv_inertia() * lambda;
}
