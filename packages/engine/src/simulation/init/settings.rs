//! Session configuration and runtime settings
//!
//! `SessionConfig` is plain serde data; every field has a default so a JSON
//! document only needs to name what it overrides. The defaults are the
//! three-rope demo level.

use serde::{Deserialize, Serialize};

use crate::core::{SimError, SimResult};
use crate::domain::{TargetZone, Vec2};
use crate::input::GestureConfig;
use crate::systems::cut::{DEFAULT_CUT_THRESHOLD, DEFAULT_QUEUE_CAPACITY, MAX_QUEUE_CAPACITY};
use crate::systems::{ChainConfig, SolverParams};

use super::perf_stats::PerfStats;
use super::SessionCore;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub gravity: Vec2,
    pub dt: f32,
    pub iterations: u32,
    pub bias_factor: f32,
    /// Fraction of velocity kept after one second; 1.0 disables damping.
    pub damping: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        let params = SolverParams::default();
        Self {
            gravity: params.gravity,
            dt: params.dt,
            iterations: params.iterations,
            bias_factor: params.bias_factor,
            damping: params.damping,
        }
    }
}

impl From<&SolverConfig> for SolverParams {
    fn from(c: &SolverConfig) -> Self {
        SolverParams {
            gravity: c.gravity,
            dt: c.dt,
            iterations: c.iterations,
            bias_factor: c.bias_factor,
            damping: c.damping,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadConfig {
    pub mass: f32,
    pub radius: f32,
    /// Start position. When absent the payload hangs one segment length
    /// below the last segment of `pin_chain`.
    pub position: Option<Vec2>,
    /// Chain whose last segment holds the payload with a pin.
    pub pin_chain: Option<usize>,
    /// Chains whose last segments hold the payload with slide joints.
    pub slide_chains: Vec<usize>,
    pub slide_min: f32,
    pub slide_max: f32,
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            mass: 5.0,
            radius: 15.0,
            position: None,
            pin_chain: Some(1),
            slide_chains: vec![0, 2],
            slide_min: 20.0,
            slide_max: 40.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub width: f32,
    pub height: f32,
    pub solver: SolverConfig,
    pub chains: Vec<ChainConfig>,
    pub payload: PayloadConfig,
    pub target: TargetZone,
    pub cut_threshold: f32,
    pub queue_capacity: usize,
    pub gesture: GestureConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let rope = |x: f32, segment_length: f32| ChainConfig {
            anchor: Vec2::new(x, 100.0),
            segment_length,
            ..ChainConfig::default()
        };
        Self {
            width: 800.0,
            height: 600.0,
            solver: SolverConfig::default(),
            chains: vec![rope(250.0, 40.0), rope(400.0, 20.0), rope(550.0, 40.0)],
            payload: PayloadConfig::default(),
            target: TargetZone::default(),
            cut_threshold: DEFAULT_CUT_THRESHOLD,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            gesture: GestureConfig::default(),
        }
    }
}

fn invalid(msg: impl Into<String>) -> SimError {
    SimError::InvalidConfig(msg.into())
}

impl SessionConfig {
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn solver_params(&self) -> SolverParams {
        SolverParams::from(&self.solver)
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()) {
            return Err(invalid(format!("field size {}x{} must be positive", self.width, self.height)));
        }

        let s = &self.solver;
        if !s.gravity.is_finite() {
            return Err(invalid("gravity must be finite"));
        }
        if !(s.dt.is_finite() && s.dt > 0.0) {
            return Err(invalid(format!("dt must be positive, got {}", s.dt)));
        }
        if s.iterations == 0 {
            return Err(invalid("solver needs at least one iteration"));
        }
        if !(0.0..=1.0).contains(&s.bias_factor) {
            return Err(invalid(format!("bias factor must be in [0, 1], got {}", s.bias_factor)));
        }
        if !(s.damping > 0.0 && s.damping <= 1.0) {
            return Err(invalid(format!("damping must be in (0, 1], got {}", s.damping)));
        }

        for chain in &self.chains {
            chain.validate()?;
        }

        let p = &self.payload;
        if !(p.mass.is_finite() && p.mass > 0.0) {
            return Err(invalid(format!("payload mass must be positive, got {}", p.mass)));
        }
        if !(p.radius.is_finite() && p.radius >= 0.0) {
            return Err(invalid(format!("payload radius must be >= 0, got {}", p.radius)));
        }
        match (p.pin_chain, p.position) {
            (None, None) => return Err(invalid("payload needs a position or a pin chain")),
            (_, Some(pos)) if !pos.is_finite() => return Err(invalid("payload position must be finite")),
            _ => {}
        }
        for &chain in p.pin_chain.iter().chain(&p.slide_chains) {
            if chain >= self.chains.len() {
                return Err(invalid(format!(
                    "payload links chain {chain} but only {} chains exist",
                    self.chains.len()
                )));
            }
        }
        if !(p.slide_min.is_finite() && p.slide_max.is_finite()) || p.slide_min < 0.0 || p.slide_min > p.slide_max {
            return Err(invalid(format!(
                "slide range [{}, {}] is not an ordered non-negative range",
                p.slide_min, p.slide_max
            )));
        }

        let t = &self.target;
        if !(t.x.is_finite() && t.y.is_finite() && t.w.is_finite() && t.h.is_finite()) || t.w < 0.0 || t.h < 0.0 {
            return Err(invalid("target zone must be finite with non-negative size"));
        }
        if !(self.cut_threshold.is_finite() && self.cut_threshold >= 0.0) {
            return Err(invalid(format!("cut threshold must be >= 0, got {}", self.cut_threshold)));
        }
        if self.queue_capacity == 0 || self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(invalid(format!(
                "cut queue capacity must be in 1..={MAX_QUEUE_CAPACITY}, got {}",
                self.queue_capacity
            )));
        }
        if !(self.gesture.alignment_tolerance.is_finite() && self.gesture.alignment_tolerance >= 0.0) {
            return Err(invalid("gesture alignment tolerance must be >= 0"));
        }
        Ok(())
    }
}

pub(super) fn enable_perf_metrics(session: &mut SessionCore, enabled: bool) {
    session.perf_enabled = enabled;
    if !enabled {
        session.perf_stats.reset();
    }
}

pub(super) fn get_perf_stats(session: &SessionCore) -> PerfStats {
    session.perf_stats.clone()
}

pub(super) fn set_gravity(session: &mut SessionCore, x: f32, y: f32) {
    let gravity = Vec2::new(x, y);
    if gravity.is_finite() {
        session.space.set_gravity(gravity);
        session.config.solver.gravity = gravity;
    }
}
