//! Space - the authoritative body/constraint graph and its integrator
//!
//! Owns every body and constraint in two arenas and is the only place that
//! mutates the graph. Structural edits keep the graph closed: a constraint
//! can only be created between live bodies, and a body can only be removed
//! once nothing references it.
//!
//! Step order (fixed timestep):
//! 1. gravity + damping on dynamic velocities
//! 2. `iterations` passes over all constraints, ascending id
//! 3. semi-implicit Euler on dynamic positions/angles
//! 4. divergence check over every body, ascending id

use crate::core::{Arena, SimError, SimResult};
use crate::domain::{Body, BodyId, BodyKind, Constraint, ConstraintId, ConstraintKind, Vec2};

use super::solver::{self, SolverParams};

pub struct Space {
    bodies: Arena<Body>,
    constraints: Arena<Constraint>,
    params: SolverParams,
    /// Completed steps
    steps: u64,
}

impl Space {
    pub fn new(params: SolverParams) -> Self {
        Self {
            bodies: Arena::with_capacity(64),
            constraints: Arena::with_capacity(64),
            params,
            steps: 0,
        }
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.params.gravity = gravity;
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    // === BODIES ===

    pub fn add_body(&mut self, body: Body) -> BodyId {
        BodyId(self.bodies.insert(body))
    }

    /// Create a shapeless body. Dynamic bodies get unit mass and moment.
    pub fn create_body(&mut self, kind: BodyKind, position: Vec2) -> SimResult<BodyId> {
        let body = match kind {
            BodyKind::Static => Body::new_static(position),
            BodyKind::Kinematic => Body::new_kinematic(position),
            BodyKind::Dynamic => Body::new_dynamic(position, 1.0, 1.0)?,
        };
        Ok(self.add_body(body))
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.0)
    }

    pub fn contains_body(&self, id: BodyId) -> bool {
        self.bodies.contains(id.0)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies.iter().map(|(id, b)| (BodyId(id), b))
    }

    /// Remove a body nothing references any more.
    ///
    /// Fails with `DanglingConstraint` while any live constraint touches it;
    /// callers remove those first (see `remove_body_and_constraints`).
    pub fn remove_body(&mut self, id: BodyId) -> SimResult<Body> {
        if !self.bodies.contains(id.0) {
            return Err(SimError::UnknownBody(id));
        }
        let referencing = self.constraints_of(id);
        if !referencing.is_empty() {
            return Err(SimError::DanglingConstraint {
                body: id,
                constraints: referencing,
            });
        }
        self.bodies.remove(id.0).ok_or(SimError::UnknownBody(id))
    }

    /// Remove every constraint touching `id`, then the body itself.
    ///
    /// Returns the removed constraint ids in ascending order.
    pub fn remove_body_and_constraints(&mut self, id: BodyId) -> SimResult<Vec<ConstraintId>> {
        if !self.bodies.contains(id.0) {
            return Err(SimError::UnknownBody(id));
        }
        let referencing = self.constraints_of(id);
        for &cid in &referencing {
            self.remove_constraint(cid)?;
        }
        self.remove_body(id)?;
        Ok(referencing)
    }

    /// Drive a kinematic body. Its velocity becomes the displacement over one
    /// step so joined bodies feel the motion; it is cleared again after the step.
    pub fn set_kinematic_position(&mut self, id: BodyId, position: Vec2) -> SimResult<()> {
        let dt = self.params.dt;
        let body = self.bodies.get_mut(id.0).ok_or(SimError::UnknownBody(id))?;
        if body.kind() != BodyKind::Kinematic {
            return Err(SimError::NotKinematic(id));
        }
        if !position.is_finite() {
            return Err(SimError::InvalidBody(format!(
                "non-finite kinematic target ({}, {})",
                position.x, position.y
            )));
        }
        body.velocity = (position - body.position) * (1.0 / dt);
        body.position = position;
        Ok(())
    }

    // === CONSTRAINTS ===

    /// Add a constraint between two live bodies.
    pub fn add_constraint(&mut self, constraint: Constraint) -> SimResult<ConstraintId> {
        constraint.validate()?;
        for body in [constraint.body_a, constraint.body_b] {
            if !self.bodies.contains(body.0) {
                return Err(SimError::UnknownBody(body));
            }
        }
        Ok(ConstraintId(self.constraints.insert(constraint)))
    }

    pub fn create_constraint(&mut self, kind: ConstraintKind, body_a: BodyId, body_b: BodyId) -> SimResult<ConstraintId> {
        self.add_constraint(Constraint { body_a, body_b, kind })
    }

    /// Pin whose rest length is the anchors' current distance.
    pub fn create_pin_joint(&mut self, body_a: BodyId, body_b: BodyId, anchor_a: Vec2, anchor_b: Vec2) -> SimResult<ConstraintId> {
        let a = self.body(body_a).ok_or(SimError::UnknownBody(body_a))?;
        let b = self.body(body_b).ok_or(SimError::UnknownBody(body_b))?;
        let distance = a.local_to_world(anchor_a).distance(b.local_to_world(anchor_b));
        self.add_constraint(Constraint::pin(body_a, body_b, anchor_a, anchor_b, distance))
    }

    pub fn remove_constraint(&mut self, id: ConstraintId) -> SimResult<Constraint> {
        self.constraints.remove(id.0).ok_or(SimError::UnknownConstraint(id))
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.get(id.0)
    }

    pub fn contains_constraint(&self, id: ConstraintId) -> bool {
        self.constraints.contains(id.0)
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintId, &Constraint)> {
        self.constraints.iter().map(|(id, c)| (ConstraintId(id), c))
    }

    /// Live constraints touching `body`, ascending id.
    pub fn constraints_of(&self, body: BodyId) -> Vec<ConstraintId> {
        self.constraints
            .iter()
            .filter(|(_, c)| c.involves(body))
            .map(|(id, _)| ConstraintId(id))
            .collect()
    }

    /// Every constraint endpoint must be a live body.
    pub fn check_integrity(&self) -> SimResult<()> {
        for (id, c) in self.constraints.iter() {
            for body in [c.body_a, c.body_b] {
                if !self.bodies.contains(body.0) {
                    return Err(SimError::DanglingConstraint {
                        body,
                        constraints: vec![ConstraintId(id)],
                    });
                }
            }
        }
        Ok(())
    }

    // === STEP ===

    /// Advance one fixed timestep.
    ///
    /// A non-finite body state after integration is reported as
    /// `SimulationDiverged`; the caller must stop stepping.
    pub fn step(&mut self) -> SimResult<()> {
        let params = self.params;
        let dt = params.dt;
        let damping = params.damping.powf(dt);

        for (_, body) in self.bodies.iter_mut() {
            if !body.is_dynamic() {
                continue;
            }
            body.velocity = body.velocity * damping + params.gravity * dt;
            body.angular_velocity *= damping;
        }

        for _ in 0..params.iterations {
            for (id, constraint) in self.constraints.iter() {
                solver::apply_constraint(ConstraintId(id), constraint, &mut self.bodies, &params)?;
            }
        }

        for (_, body) in self.bodies.iter_mut() {
            match body.kind() {
                BodyKind::Dynamic => {
                    body.position += body.velocity * dt;
                    body.angle += body.angular_velocity * dt;
                }
                BodyKind::Kinematic => {
                    body.velocity = Vec2::zero();
                }
                BodyKind::Static => {}
            }
        }

        if let Some((id, _)) = self.bodies.iter().find(|(_, b)| !b.has_finite_state()) {
            return Err(SimError::SimulationDiverged {
                body: BodyId(id),
                tick: self.steps,
            });
        }

        self.steps += 1;
        Ok(())
    }
}

impl Default for Space {
    fn default() -> Self {
        Self::new(SolverParams::default())
    }
}
