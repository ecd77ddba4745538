use wasm_bindgen::prelude::*;

use crate::core::SimError;

use super::perf_stats::PerfStats;
use super::settings::SessionConfig;
use super::{SessionCore, SessionStatus};

fn to_js(err: SimError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct Session {
    core: SessionCore,
}

#[wasm_bindgen]
impl Session {
    /// Start the default three-rope level
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Session, JsValue> {
        let core = SessionCore::new(SessionConfig::default()).map_err(to_js)?;
        Ok(Self { core })
    }

    /// Start a level described by a JSON `SessionConfig`; missing fields use defaults
    #[wasm_bindgen(js_name = fromConfigJson)]
    pub fn from_config_json(json: String) -> Result<Session, JsValue> {
        let core = SessionCore::from_config_json(&json).map_err(to_js)?;
        Ok(Self { core })
    }

    pub fn config_json(&self) -> Result<String, JsValue> {
        self.core.config().to_json().map_err(to_js)
    }

    // === INPUT ===

    /// Queue a cut point (simulation coordinates) for the next tick
    pub fn push_cut(&mut self, x: f32, y: f32) -> bool {
        self.core.queue_cut(x, y)
    }

    /// Queue a hand as 21 landmarks packed `x, y[, z]` in normalised coordinates
    pub fn push_hand_landmarks(&mut self, coords: Vec<f32>) -> Result<bool, JsValue> {
        self.core.queue_hand_flat(&coords).map_err(to_js)
    }

    // === LOOP ===

    /// Advance one tick. Throws on a fatal error; the session is then `Failed`
    pub fn tick(&mut self) -> Result<SessionStatus, JsValue> {
        self.core.tick().map_err(to_js)
    }

    pub fn stop(&mut self) {
        self.core.stop();
    }

    #[wasm_bindgen(getter)]
    pub fn status(&self) -> SessionStatus { self.core.status() }

    #[wasm_bindgen(getter)]
    pub fn won(&self) -> bool { self.core.is_won() }

    #[wasm_bindgen(getter)]
    pub fn should_stop(&self) -> bool { self.core.should_stop() }

    #[wasm_bindgen(getter)]
    pub fn tick_count(&self) -> u64 { self.core.tick_count() }

    #[wasm_bindgen(getter)]
    pub fn last_error(&self) -> Option<String> {
        self.core.last_error().map(str::to_owned)
    }

    #[wasm_bindgen(getter)]
    pub fn dropped_cuts(&self) -> u64 { self.core.dropped_cuts() }

    // === OUTPUT ===

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.core.snapshot_json().map_err(to_js)
    }

    #[wasm_bindgen(getter)]
    pub fn payload_x(&self) -> f32 { self.core.payload_position().x }

    #[wasm_bindgen(getter)]
    pub fn payload_y(&self) -> f32 { self.core.payload_position().y }

    /// `[x, y, w, h]`
    pub fn target_zone(&self) -> Vec<f32> {
        let t = self.core.target();
        vec![t.x, t.y, t.w, t.h]
    }

    /// Pointer to the flat segment buffer (for JS rendering)
    pub fn segment_buffer_ptr(&self) -> *const f32 {
        self.core.segment_buffer_ptr()
    }

    /// Length of the segment buffer in floats (4 per segment)
    pub fn segment_buffer_len(&self) -> usize {
        self.core.segment_buffer().len()
    }

    /// Segments per chain, in chain order; slices the segment buffer
    pub fn chain_segment_counts(&self) -> Vec<u32> {
        self.core.chain_segment_counts()
    }

    // === SETTINGS ===

    pub fn set_gravity(&mut self, x: f32, y: f32) {
        self.core.set_gravity(x, y);
    }

    /// Enable or disable per-tick perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.core.enable_perf_metrics(enabled);
    }

    /// Get last tick perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> PerfStats {
        self.core.get_perf_stats()
    }
}

impl Session {
    /// Plain-Rust view of the session
    pub fn core(&self) -> &SessionCore {
        &self.core
    }
}
