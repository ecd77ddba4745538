use wasm_bindgen::prelude::*;

/// Per-tick timings and counters. All zero while perf metrics are off.
#[wasm_bindgen]
#[derive(Clone, Debug, Default)]
pub struct PerfStats {
    pub(super) tick_ms: f64,
    pub(super) cut_ms: f64,
    pub(super) physics_ms: f64,
    pub(super) goal_ms: f64,
    pub(super) snapshot_ms: f64,
    pub(super) body_count: u32,
    pub(super) constraint_count: u32,
    pub(super) cut_events: u32,
    pub(super) cuts_applied: u32,
    pub(super) stale_cuts: u32,
    pub(super) queue_dropped: u32,
}

impl PerfStats {
    pub(crate) fn reset(&mut self) {
        *self = PerfStats::default();
    }
}

#[wasm_bindgen]
impl PerfStats {
    #[wasm_bindgen(getter)]
    pub fn tick_ms(&self) -> f64 { self.tick_ms }
    #[wasm_bindgen(getter)]
    pub fn cut_ms(&self) -> f64 { self.cut_ms }
    #[wasm_bindgen(getter)]
    pub fn physics_ms(&self) -> f64 { self.physics_ms }
    #[wasm_bindgen(getter)]
    pub fn goal_ms(&self) -> f64 { self.goal_ms }
    #[wasm_bindgen(getter)]
    pub fn snapshot_ms(&self) -> f64 { self.snapshot_ms }
    #[wasm_bindgen(getter)]
    pub fn body_count(&self) -> u32 { self.body_count }
    #[wasm_bindgen(getter)]
    pub fn constraint_count(&self) -> u32 { self.constraint_count }
    #[wasm_bindgen(getter)]
    pub fn cut_events(&self) -> u32 { self.cut_events }
    #[wasm_bindgen(getter)]
    pub fn cuts_applied(&self) -> u32 { self.cuts_applied }
    #[wasm_bindgen(getter)]
    pub fn stale_cuts(&self) -> u32 { self.stale_cuts }
    /// Cut events dropped on queue overflow since the session started.
    #[wasm_bindgen(getter)]
    pub fn queue_dropped(&self) -> u32 { self.queue_dropped }
}
