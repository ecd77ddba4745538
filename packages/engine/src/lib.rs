//! Ropecut Engine - rope-and-candy constraint physics in WASM
//!
//! Architecture:
//! - core/       - slot arena, errors, logging
//! - domain/     - bodies, shapes, constraints, target zone
//! - systems/    - solver, space, chains, cut engine, goal
//! - input/      - hand landmarks to cut points
//! - simulation/ - session orchestration and the JS facade

pub mod core;
pub mod domain;
pub mod input;
pub mod simulation;
pub mod systems;

use wasm_bindgen::prelude::*;

// Thread pool for the parallel endpoint snapshot
#[cfg(feature = "parallel")]
pub use wasm_bindgen_rayon::init_thread_pool;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine: panic hook and console logger
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    if crate::core::logging::init_logging(log::LevelFilter::Info) {
        log::info!("ropecut engine {} initialized", version());
    }
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Re-export main types
pub use crate::core::{SimError, SimResult};
pub use domain::{Body, BodyId, BodyKind, Constraint, ConstraintId, ConstraintKind, Shape, TargetZone, Vec2};
pub use input::{GestureClassifier, GestureConfig, HandLandmarks, HandPose, Landmark};
pub use simulation::{
    CutRecord, PayloadConfig, PerfStats, RenderSnapshot, Session, SessionConfig, SessionCore, SessionStatus,
    SolverConfig,
};
pub use systems::{
    create_rope, Chain, ChainConfig, CutEngine, CutEvent, CutQueue, GoalEvaluator, SegmentStyle, SolverParams, Space,
};
