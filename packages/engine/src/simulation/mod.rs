//! Session - one level of rope cutting
//!
//! `SessionCore` owns the space, the chains, the payload and the cut queue,
//! and runs the fixed tick order: drain cuts, resolve and apply them, check
//! the graph, step physics, evaluate the goal, publish the snapshot. Only a
//! fully successful tick replaces the published snapshot.
//!
//! The `#[wasm_bindgen]` facade in `facade.rs` is a thin wrapper over it.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::core::SimResult;
use crate::domain::{BodyId, ConstraintId, TargetZone, Vec2};
use crate::input::{GestureClassifier, HandLandmarks};
use crate::systems::{Chain, CutEngine, CutQueue, GoalEvaluator, Space};

#[path = "perf/perf_timer.rs"]
mod perf_timer;
#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "step/step.rs"]
mod step;
#[path = "commands/commands.rs"]
mod commands;
#[path = "render/render_extract.rs"]
mod render_extract;
#[path = "init/init.rs"]
mod init;
#[path = "init/settings.rs"]
mod settings;
mod facade;

pub use facade::Session;
pub use perf_stats::PerfStats;
pub use render_extract::{ChainSnapshot, RenderSnapshot, SegmentSnapshot};
pub use settings::{PayloadConfig, SessionConfig, SolverConfig};

use perf_timer::PerfTimer;

/// Where a session is in its lifecycle. Every state but `Running` is terminal.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Running = 0,
    /// Payload reached the target; physics is frozen.
    Won = 1,
    /// A fatal error stopped the session; see `last_error`.
    Failed = 2,
    /// Stopped by the host.
    Stopped = 3,
}

/// A cut that was applied, for replay comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CutRecord {
    pub tick: u64,
    pub chain: usize,
    pub index: usize,
}

pub struct SessionCore {
    config: SessionConfig,
    space: Space,
    chains: Vec<Chain>,
    payload: BodyId,
    payload_links: Vec<ConstraintId>,

    goal: GoalEvaluator,
    cut_engine: CutEngine,
    cut_queue: CutQueue,
    gesture: GestureClassifier,

    // State
    status: SessionStatus,
    last_error: Option<String>,
    tick: u64,
    cut_history: Vec<CutRecord>,

    // Published after each successful tick
    snapshot: RenderSnapshot,
    segment_buffer: Vec<f32>,

    // Perf metrics
    perf_enabled: bool,
    perf_stats: PerfStats,
}

impl SessionCore {
    pub fn new(config: SessionConfig) -> SimResult<Self> {
        init::create_session_core(config)
    }

    pub fn from_config_json(json: &str) -> SimResult<Self> {
        Self::new(SessionConfig::from_json(json)?)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_won(&self) -> bool {
        self.status == SessionStatus::Won
    }

    /// True once the host loop should stop ticking.
    pub fn should_stop(&self) -> bool {
        self.status != SessionStatus::Running
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn space(&self) -> &Space {
        &self.space
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn payload(&self) -> BodyId {
        self.payload
    }

    /// Live constraints between the payload and chain tips.
    pub fn payload_links(&self) -> &[ConstraintId] {
        &self.payload_links
    }

    pub fn payload_position(&self) -> Vec2 {
        self.snapshot.payload
    }

    pub fn target(&self) -> &TargetZone {
        self.goal.zone()
    }

    pub fn cut_history(&self) -> &[CutRecord] {
        &self.cut_history
    }

    pub fn queued_cuts(&self) -> usize {
        self.cut_queue.len()
    }

    pub fn dropped_cuts(&self) -> u64 {
        self.cut_queue.dropped()
    }

    // === INPUT ===

    /// Queue a cut point for the next tick.
    pub fn queue_cut(&mut self, x: f32, y: f32) -> bool {
        commands::queue_cut(self, x, y)
    }

    /// Queue the index fingertip of a cutting hand. Idle hands queue nothing.
    pub fn queue_hand(&mut self, hand: &HandLandmarks) -> bool {
        commands::queue_hand(self, hand)
    }

    pub fn queue_hand_flat(&mut self, coords: &[f32]) -> SimResult<bool> {
        commands::queue_hand_flat(self, coords)
    }

    pub fn stop(&mut self) {
        commands::stop(self)
    }

    // === SETTINGS ===

    pub fn set_gravity(&mut self, x: f32, y: f32) {
        settings::set_gravity(self, x, y);
    }

    /// Enable or disable per-tick perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        settings::enable_perf_metrics(self, enabled);
    }

    /// Last tick's perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> PerfStats {
        settings::get_perf_stats(self)
    }

    // === TICK ===

    /// Run one tick. Fatal errors move the session to `Failed` and are
    /// returned; later ticks are no-ops.
    pub fn tick(&mut self) -> SimResult<SessionStatus> {
        step::tick(self)
    }

    // === OUTPUT ===

    /// Last published snapshot; never reflects a partial or failed tick.
    pub fn snapshot(&self) -> &RenderSnapshot {
        &self.snapshot
    }

    pub fn snapshot_json(&self) -> SimResult<String> {
        self.snapshot.to_json()
    }

    /// Segment endpoints as `[ax, ay, bx, by]` per segment, chains in order.
    pub fn segment_buffer(&self) -> &[f32] {
        &self.segment_buffer
    }

    pub fn segment_buffer_ptr(&self) -> *const f32 {
        self.segment_buffer.as_ptr()
    }

    pub fn chain_segment_counts(&self) -> Vec<u32> {
        self.snapshot.chains.iter().map(|c| c.segments.len() as u32).collect()
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
