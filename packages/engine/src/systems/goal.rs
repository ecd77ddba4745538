//! Goal evaluator - payload vs. target zone

use crate::domain::{TargetZone, Vec2};

/// Point-in-rectangle test, inclusive of the boundary.
#[inline]
pub fn evaluate(payload: Vec2, zone: &TargetZone) -> bool {
    zone.contains(payload)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GoalEvaluator {
    zone: TargetZone,
}

impl GoalEvaluator {
    pub fn new(zone: TargetZone) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> &TargetZone {
        &self.zone
    }

    pub fn evaluate(&self, payload: Vec2) -> bool {
        evaluate(payload, &self.zone)
    }
}

impl Default for GoalEvaluator {
    fn default() -> Self {
        Self::new(TargetZone::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_and_outside() {
        let goal = GoalEvaluator::default();
        assert!(goal.evaluate(Vec2::new(300.0, 500.0)));
        assert!(goal.evaluate(Vec2::new(500.0, 500.0)));
        assert!(goal.evaluate(Vec2::new(300.0, 550.0)));
        assert!(goal.evaluate(Vec2::new(500.0, 550.0)));
        assert!(!goal.evaluate(Vec2::new(400.0, 320.0)));
        assert!(!goal.evaluate(Vec2::new(501.0, 520.0)));
    }
}
