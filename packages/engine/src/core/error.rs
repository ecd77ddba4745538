//! Error types for the rope engine.

use thiserror::Error;

use crate::domain::body::BodyId;
use crate::domain::constraint::ConstraintId;

#[derive(Debug, Error)]
pub enum SimError {
    /// A body was about to be removed (or solved against) while live
    /// constraints still point at it. Broken cut ordering; fatal.
    #[error("body {body} is still referenced by live constraints {constraints:?}")]
    DanglingConstraint {
        body: BodyId,
        constraints: Vec<ConstraintId>,
    },

    /// A tracked body ended a step with a NaN/Inf position; fatal.
    #[error("simulation diverged at tick {tick}: body {body} has a non-finite position")]
    SimulationDiverged { body: BodyId, tick: u64 },

    /// Cut target no longer present; the event is dropped.
    #[error("segment {index} is out of range for chain {chain} ({len} segments left)")]
    OutOfRangeSegment {
        chain: usize,
        index: usize,
        len: usize,
    },

    #[error("unknown body {0}")]
    UnknownBody(BodyId),

    #[error("unknown constraint {0}")]
    UnknownConstraint(ConstraintId),

    #[error("unknown chain {0}")]
    UnknownChain(usize),

    #[error("body {0} is not kinematic")]
    NotKinematic(BodyId),

    #[error("invalid body: {0}")]
    InvalidBody(String),

    #[error("invalid constraint: {0}")]
    InvalidConstraint(String),

    #[error("invalid session config: {0}")]
    InvalidConfig(String),

    #[error("invalid hand landmarks: {0}")]
    InvalidLandmarks(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    /// Structural failures that end the session.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SimError::DanglingConstraint { .. } | SimError::SimulationDiverged { .. }
        )
    }
}

pub type SimResult<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_structural_errors_are_fatal() {
        let dangling = SimError::DanglingConstraint {
            body: BodyId(3),
            constraints: vec![ConstraintId(1)],
        };
        let diverged = SimError::SimulationDiverged {
            body: BodyId(4),
            tick: 12,
        };
        let stale = SimError::OutOfRangeSegment {
            chain: 1,
            index: 9,
            len: 2,
        };

        assert!(dangling.is_fatal());
        assert!(diverged.is_fatal());
        assert!(!stale.is_fatal());
        assert!(!SimError::UnknownChain(7).is_fatal());
    }

    #[test]
    fn messages_name_the_offender() {
        let err = SimError::SimulationDiverged {
            body: BodyId(4),
            tick: 12,
        };
        let text = err.to_string();
        assert!(text.contains("tick 12"));
        assert!(text.contains("body #4"));
    }

    #[test]
    fn json_errors_convert() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: SimError = parse.unwrap_err().into();
        assert!(matches!(err, SimError::Json(_)));
    }
}
