//! Read-only snapshot handed to the renderer after each tick.

use serde::Serialize;

use crate::core::SimResult;
use crate::domain::{TargetZone, Vec2};

use super::{SessionCore, SessionStatus};

/// Floats per segment in the flat buffer: `ax, ay, bx, by`.
pub const SEGMENT_STRIDE: usize = 4;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SegmentSnapshot {
    pub a: Vec2,
    pub b: Vec2,
    pub radius: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChainSnapshot {
    pub id: usize,
    pub anchor: Vec2,
    /// Top to bottom.
    pub segments: Vec<SegmentSnapshot>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub tick: u64,
    pub status: SessionStatus,
    pub won: bool,
    pub chains: Vec<ChainSnapshot>,
    pub payload: Vec2,
    pub payload_radius: f32,
    pub target: TargetZone,
}

impl RenderSnapshot {
    pub fn segment_count(&self) -> usize {
        self.chains.iter().map(|c| c.segments.len()).sum()
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

pub(super) fn extract(session: &SessionCore) -> RenderSnapshot {
    let space = &session.space;

    let chains = session
        .chains
        .iter()
        .map(|chain| ChainSnapshot {
            id: chain.index(),
            anchor: space.body(chain.anchor()).map(|b| b.position).unwrap_or_default(),
            segments: chain
                .segment_endpoints(space)
                .into_iter()
                .map(|s| SegmentSnapshot {
                    a: s.a,
                    b: s.b,
                    radius: s.radius,
                })
                .collect(),
        })
        .collect();

    let (payload, payload_radius) = space
        .body(session.payload)
        .map(|b| (b.position, b.shape.map(|s| s.radius()).unwrap_or(0.0)))
        .unwrap_or_default();

    RenderSnapshot {
        tick: session.tick,
        status: session.status,
        won: session.status == SessionStatus::Won,
        chains,
        payload,
        payload_radius,
        target: *session.goal.zone(),
    }
}

fn write_segment_buffer(snapshot: &RenderSnapshot, out: &mut Vec<f32>) {
    out.clear();
    out.reserve(snapshot.segment_count() * SEGMENT_STRIDE);
    for segment in snapshot.chains.iter().flat_map(|c| &c.segments) {
        out.extend_from_slice(&[segment.a.x, segment.a.y, segment.b.x, segment.b.y]);
    }
}

/// Replace the published snapshot and its flat buffer.
pub(super) fn publish(session: &mut SessionCore) {
    let snapshot = extract(session);
    write_segment_buffer(&snapshot, &mut session.segment_buffer);
    session.snapshot = snapshot;
}
