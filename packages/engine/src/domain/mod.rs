//! Domain types: vectors, bodies, shapes, constraints, the target zone.

pub mod body;
pub mod constraint;
pub mod shape;
pub mod vec2;
pub mod zone;

pub use body::{Body, BodyId, BodyKind};
pub use constraint::{Constraint, ConstraintId, ConstraintKind};
pub use shape::Shape;
pub use vec2::Vec2;
pub use zone::TargetZone;
