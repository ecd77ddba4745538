//! Cut engine
//!
//! Cut events are queued by the input side and drained once per tick.
//! Resolution runs against a snapshot of every chain's segment endpoints
//! taken before any mutation, so a segment removed earlier in the tick is
//! never matched twice. Hits are applied in chain index order, then segment
//! index ascending.

use std::collections::VecDeque;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::{SimError, SimResult};
use crate::domain::{BodyId, Vec2};

use super::chain::{Chain, CutOutcome, SegmentEndpoints};
use super::space::Space;

pub const DEFAULT_CUT_THRESHOLD: f32 = 10.0;
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;
pub const MAX_QUEUE_CAPACITY: usize = 4096;

/// A cut point in simulation coordinates
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CutEvent {
    pub x: f32,
    pub y: f32,
}

impl CutEvent {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn point(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl From<Vec2> for CutEvent {
    fn from(p: Vec2) -> Self {
        Self::new(p.x, p.y)
    }
}

/// Bounded FIFO between the input producer and the tick.
///
/// When full, the newest event is dropped and counted.
#[derive(Clone, Debug)]
pub struct CutQueue {
    events: VecDeque<CutEvent>,
    capacity: usize,
    dropped: u64,
}

impl CutQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(MAX_QUEUE_CAPACITY)),
            capacity,
            dropped: 0,
        }
    }

    /// Returns false when the event was not queued.
    pub fn push(&mut self, event: CutEvent) -> bool {
        if !event.point().is_finite() {
            debug!("ignoring non-finite cut point ({}, {})", event.x, event.y);
            return false;
        }
        if self.events.len() >= self.capacity {
            self.dropped += 1;
            warn!(
                "cut queue full ({} events), dropping ({}, {}); {} dropped so far",
                self.capacity, event.x, event.y, self.dropped
            );
            return false;
        }
        self.events.push_back(event);
        true
    }

    pub fn drain(&mut self) -> Vec<CutEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total events dropped on overflow since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Default for CutQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

/// A segment matched by at least one cut point
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SegmentHit {
    pub chain: usize,
    pub index: usize,
    pub body: BodyId,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CutReport {
    pub events: usize,
    pub hits: usize,
    pub applied: Vec<CutOutcome>,
    /// Hits whose segment was already gone when their turn came.
    pub stale: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CutEngine {
    threshold: f32,
}

impl CutEngine {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Strictly below the threshold; a point exactly `threshold` away misses.
    #[inline]
    pub fn within_reach(&self, point: Vec2, endpoint: Vec2) -> bool {
        point.distance(endpoint) < self.threshold
    }

    pub fn matches(&self, point: Vec2, segment: &SegmentEndpoints) -> bool {
        self.within_reach(point, segment.a) || self.within_reach(point, segment.b)
    }

    /// Endpoints of every chain, in chain order.
    pub fn snapshot(chains: &[Chain], space: &Space) -> Vec<Vec<SegmentEndpoints>> {
        #[cfg(feature = "parallel")]
        {
            chains.par_iter().map(|chain| chain.segment_endpoints(space)).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            chains.iter().map(|chain| chain.segment_endpoints(space)).collect()
        }
    }

    /// Segments touched by any event, each listed once, sorted by
    /// `(chain, index)`.
    pub fn resolve(&self, events: &[CutEvent], snapshot: &[Vec<SegmentEndpoints>]) -> Vec<SegmentHit> {
        if events.is_empty() {
            return Vec::new();
        }
        let points: Vec<Vec2> = events.iter().map(CutEvent::point).collect();

        let mut hits = Vec::new();
        for (chain, segments) in snapshot.iter().enumerate() {
            for segment in segments {
                if points.iter().any(|&p| self.matches(p, segment)) {
                    hits.push(SegmentHit {
                        chain,
                        index: segment.index,
                        body: segment.body,
                    });
                }
            }
        }
        hits
    }

    /// Commit resolved hits against the live chains.
    ///
    /// A hit is located by body id, so an earlier cut in the same tick that
    /// already discarded it turns it into a dropped `OutOfRangeSegment`.
    /// Fatal errors abort immediately.
    pub fn apply(&self, hits: &[SegmentHit], chains: &mut [Chain], space: &mut Space) -> SimResult<CutReport> {
        let mut report = CutReport {
            hits: hits.len(),
            ..CutReport::default()
        };

        for hit in hits {
            let Some(chain) = chains.get_mut(hit.chain) else {
                debug!("dropping cut: {}", SimError::UnknownChain(hit.chain));
                report.stale += 1;
                continue;
            };

            let Some(index) = chain.index_of(hit.body) else {
                let stale = SimError::OutOfRangeSegment {
                    chain: hit.chain,
                    index: hit.index,
                    len: chain.len(),
                };
                debug!("dropping cut: {stale}");
                report.stale += 1;
                continue;
            };

            match chain.cut_segment(space, index) {
                Ok(outcome) => {
                    debug!(
                        "cut chain {} at segment {} ({} bodies, {} constraints removed)",
                        outcome.chain,
                        outcome.index,
                        outcome.removed_bodies.len(),
                        outcome.removed_constraints.len()
                    );
                    report.applied.push(outcome);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    debug!("dropping cut: {e}");
                    report.stale += 1;
                }
            }
        }

        Ok(report)
    }

    /// Snapshot, resolve and apply one tick's events.
    pub fn process(&self, events: &[CutEvent], chains: &mut [Chain], space: &mut Space) -> SimResult<CutReport> {
        if events.is_empty() {
            return Ok(CutReport::default());
        }
        let snapshot = Self::snapshot(chains, space);
        let hits = self.resolve(events, &snapshot);
        let mut report = self.apply(&hits, chains, space)?;
        report.events = events.len();
        Ok(report)
    }
}

impl Default for CutEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CUT_THRESHOLD)
    }
}
