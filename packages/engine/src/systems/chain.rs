//! Chain - an anchored rope of rigid segments
//!
//! A chain owns the ids of its static anchor, its segment bodies (top to
//! bottom) and the constraints that hold them together; the bodies and
//! constraints themselves live in the `Space`.
//!
//! Cut policy: cutting segment `i` removes segment `i` and everything below
//! it. The part still hanging from the anchor stays in `segments`; the
//! detached lower part is discarded from the space in the same call, together
//! with every constraint touching it (payload links included).

use serde::{Deserialize, Serialize};

use crate::core::{SimError, SimResult};
use crate::domain::{Body, BodyId, Constraint, ConstraintId, Shape, Vec2};

use super::space::Space;

pub const MAX_SEGMENTS: usize = 1024;

/// How segments are shaped and joined
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStyle {
    /// Circles joined centre-to-centre by pins of one segment length.
    #[default]
    Bead,
    /// Capsules spanning one segment length, joined end-to-end by zero-length pins.
    Capsule,
}

/// Closed angle range in radians
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AngleRange {
    pub min: f32,
    pub max: f32,
}

/// Construction parameters for one rope
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub anchor: Vec2,
    pub segment_count: usize,
    pub segment_length: f32,
    pub segment_mass: f32,
    pub segment_radius: f32,
    pub style: SegmentStyle,
    /// Optional bend limit between consecutive segments.
    pub rotary_limit: Option<AngleRange>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            anchor: Vec2::new(400.0, 100.0),
            segment_count: 10,
            segment_length: 20.0,
            segment_mass: 1.0,
            segment_radius: 5.0,
            style: SegmentStyle::Bead,
            rotary_limit: None,
        }
    }
}

impl ChainConfig {
    pub fn validate(&self) -> SimResult<()> {
        if !self.anchor.is_finite() {
            return Err(SimError::InvalidConfig("rope anchor must be finite".into()));
        }
        if self.segment_count == 0 || self.segment_count > MAX_SEGMENTS {
            return Err(SimError::InvalidConfig(format!(
                "rope needs 1..={MAX_SEGMENTS} segments, got {}",
                self.segment_count
            )));
        }
        if !(self.segment_length.is_finite() && self.segment_length > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "segment length must be positive, got {}",
                self.segment_length
            )));
        }
        if !(self.segment_mass.is_finite() && self.segment_mass > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "segment mass must be positive, got {}",
                self.segment_mass
            )));
        }
        if !(self.segment_radius.is_finite() && self.segment_radius >= 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "segment radius must be >= 0, got {}",
                self.segment_radius
            )));
        }
        if let Some(range) = self.rotary_limit {
            if !(range.min.is_finite() && range.max.is_finite()) || range.min > range.max {
                return Err(SimError::InvalidConfig(format!(
                    "rotary limit [{}, {}] is not an ordered range",
                    range.min, range.max
                )));
            }
        }
        Ok(())
    }

    /// Local attachment point at the bottom of a segment.
    pub fn tip_anchor(&self) -> Vec2 {
        match self.style {
            SegmentStyle::Bead => Vec2::zero(),
            SegmentStyle::Capsule => Vec2::new(0.0, self.segment_length * 0.5),
        }
    }

    fn head_anchor(&self) -> Vec2 {
        match self.style {
            SegmentStyle::Bead => Vec2::zero(),
            SegmentStyle::Capsule => Vec2::new(0.0, -self.segment_length * 0.5),
        }
    }

    fn segment_shape(&self) -> Shape {
        match self.style {
            SegmentStyle::Bead => Shape::circle(self.segment_radius),
            SegmentStyle::Capsule => Shape::vertical_capsule(self.segment_length, self.segment_radius),
        }
    }

    /// Rest position of segment `i` hanging straight down.
    fn segment_position(&self, i: usize) -> Vec2 {
        let along = match self.style {
            SegmentStyle::Bead => (i + 1) as f32,
            SegmentStyle::Capsule => i as f32 + 0.5,
        };
        self.anchor + Vec2::new(0.0, along * self.segment_length)
    }

    fn link_length(&self) -> f32 {
        match self.style {
            SegmentStyle::Bead => self.segment_length,
            SegmentStyle::Capsule => 0.0,
        }
    }
}

/// World-space endpoints of one segment at snapshot time
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentEndpoints {
    pub index: usize,
    pub body: BodyId,
    pub a: Vec2,
    pub b: Vec2,
    pub radius: f32,
}

/// What a single cut removed
#[derive(Clone, Debug, PartialEq)]
pub struct CutOutcome {
    pub chain: usize,
    pub index: usize,
    pub removed_bodies: Vec<BodyId>,
    pub removed_constraints: Vec<ConstraintId>,
}

#[derive(Clone, Debug)]
pub struct Chain {
    index: usize,
    config: ChainConfig,
    anchor: BodyId,
    segments: Vec<BodyId>,
    /// One pin per segment; `links[i]` holds segment `i` to the body above it.
    links: Vec<ConstraintId>,
    /// One bend limit per segment when the rope asks for them.
    limits: Vec<ConstraintId>,
}

/// Build a rope hanging straight down from `config.anchor`.
///
/// Produces `segment_count` segments and as many links, the first link tying
/// segment 0 to the static anchor.
pub fn create_rope(space: &mut Space, index: usize, config: &ChainConfig) -> SimResult<Chain> {
    config.validate()?;

    let anchor = space.add_body(Body::new_static(config.anchor));
    let mut segments = Vec::with_capacity(config.segment_count);
    let mut links = Vec::with_capacity(config.segment_count);
    let mut limits = Vec::new();

    let shape = config.segment_shape();
    let mut prev = anchor;
    let mut prev_tip = Vec2::zero();

    for i in 0..config.segment_count {
        let body = Body::new_dynamic_with_shape(config.segment_position(i), config.segment_mass, shape)?;
        let id = space.add_body(body);

        links.push(space.add_constraint(Constraint::pin(
            prev,
            id,
            prev_tip,
            config.head_anchor(),
            config.link_length(),
        ))?);

        if let Some(range) = config.rotary_limit {
            limits.push(space.add_constraint(Constraint::rotary_limit(prev, id, range.min, range.max))?);
        }

        segments.push(id);
        prev = id;
        prev_tip = config.tip_anchor();
    }

    Ok(Chain {
        index,
        config: config.clone(),
        anchor,
        segments,
        links,
        limits,
    })
}

impl Chain {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn anchor(&self) -> BodyId {
        self.anchor
    }

    pub fn segments(&self) -> &[BodyId] {
        &self.segments
    }

    pub fn links(&self) -> &[ConstraintId] {
        &self.links
    }

    pub fn limits(&self) -> &[ConstraintId] {
        &self.limits
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Lowest remaining segment.
    pub fn last_segment(&self) -> Option<BodyId> {
        self.segments.last().copied()
    }

    /// Current position of `body` in this chain.
    pub fn index_of(&self, body: BodyId) -> Option<usize> {
        self.segments.iter().position(|&s| s == body)
    }

    /// Remove segment `index` and discard everything hanging below it.
    ///
    /// Constraints touching any removed body are deleted before the body, so
    /// the space never holds a dangling reference. An index past the end is
    /// `OutOfRangeSegment` and leaves the chain untouched.
    pub fn cut_segment(&mut self, space: &mut Space, index: usize) -> SimResult<CutOutcome> {
        if index >= self.segments.len() {
            return Err(SimError::OutOfRangeSegment {
                chain: self.index,
                index,
                len: self.segments.len(),
            });
        }

        let detached = self.segments.split_off(index);
        let mut removed_constraints = Vec::new();
        for &body in &detached {
            removed_constraints.extend(space.remove_body_and_constraints(body)?);
        }
        removed_constraints.sort_unstable();

        self.links.retain(|&id| space.contains_constraint(id));
        self.limits.retain(|&id| space.contains_constraint(id));

        Ok(CutOutcome {
            chain: self.index,
            index,
            removed_bodies: detached,
            removed_constraints,
        })
    }

    /// Endpoints of every remaining segment, top to bottom.
    pub fn segment_endpoints(&self, space: &Space) -> Vec<SegmentEndpoints> {
        self.segments
            .iter()
            .enumerate()
            .filter_map(|(index, &id)| {
                let body = space.body(id)?;
                let (a, b) = body.endpoints();
                Some(SegmentEndpoints {
                    index,
                    body: id,
                    a,
                    b,
                    radius: body.shape.map(|s| s.radius()).unwrap_or(0.0),
                })
            })
            .collect()
    }
}
