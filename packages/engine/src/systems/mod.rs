//! Systems: the solver, the world that runs it, ropes, cutting and the goal.

pub mod chain;
pub mod cut;
pub mod goal;
pub mod solver;
pub mod space;

pub use chain::{create_rope, AngleRange, Chain, ChainConfig, CutOutcome, SegmentEndpoints, SegmentStyle};
pub use cut::{CutEngine, CutEvent, CutQueue, CutReport, SegmentHit};
pub use goal::GoalEvaluator;
pub use solver::SolverParams;
pub use space::Space;
