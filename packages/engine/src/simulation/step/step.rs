use log::{error, info};

use crate::core::{SimError, SimResult};
use crate::systems::CutReport;

use super::render_extract;
use super::{CutRecord, PerfTimer, SessionCore, SessionStatus};

pub(super) fn tick(session: &mut SessionCore) -> SimResult<SessionStatus> {
    // Events are consumed exactly once per tick, running or not.
    let events = session.cut_queue.drain();
    if session.status != SessionStatus::Running {
        return Ok(session.status);
    }

    let perf_on = session.perf_enabled;
    if perf_on {
        session.perf_stats.reset();
        session.perf_stats.cut_events = events.len() as u32;
        session.perf_stats.queue_dropped = session.cut_queue.dropped() as u32;
    }
    let tick_start = if perf_on { Some(PerfTimer::start()) } else { None };
    let mut phase = tick_start;

    // === CUTS ===
    let report = match session
        .cut_engine
        .process(&events, &mut session.chains, &mut session.space)
    {
        Ok(report) => report,
        Err(e) => return Err(fail(session, e)),
    };
    record_cuts(session, &report);
    if let Err(e) = session.space.check_integrity() {
        return Err(fail(session, e));
    }
    if let Some(p) = phase.as_mut() {
        session.perf_stats.cut_ms = p.lap_ms();
        session.perf_stats.cuts_applied = report.applied.len() as u32;
        session.perf_stats.stale_cuts = report.stale as u32;
    }

    // === PHYSICS ===
    if let Err(e) = session.space.step() {
        return Err(fail(session, e));
    }
    if let Some(p) = phase.as_mut() {
        session.perf_stats.physics_ms = p.lap_ms();
    }

    // === GOAL ===
    let payload = match session.space.body(session.payload) {
        Some(body) => body.position,
        None => {
            let e = SimError::UnknownBody(session.payload);
            return Err(fail(session, e));
        }
    };
    if session.goal.evaluate(payload) {
        session.status = SessionStatus::Won;
        info!(
            "payload reached the target at ({:.1}, {:.1}) on tick {}",
            payload.x, payload.y, session.tick
        );
    }
    if let Some(p) = phase.as_mut() {
        session.perf_stats.goal_ms = p.lap_ms();
    }

    // === PUBLISH ===
    session.tick += 1;
    render_extract::publish(session);

    if let (Some(t), Some(p)) = (tick_start, phase.as_mut()) {
        session.perf_stats.snapshot_ms = p.lap_ms();
        session.perf_stats.tick_ms = t.elapsed_ms();
        session.perf_stats.body_count = session.space.body_count() as u32;
        session.perf_stats.constraint_count = session.space.constraint_count() as u32;
    }

    Ok(session.status)
}

fn record_cuts(session: &mut SessionCore, report: &CutReport) {
    if report.applied.is_empty() {
        return;
    }
    for outcome in &report.applied {
        session.cut_history.push(CutRecord {
            tick: session.tick,
            chain: outcome.chain,
            index: outcome.index,
        });
    }

    let before = session.payload_links.len();
    let space = &session.space;
    session.payload_links.retain(|&id| space.contains_constraint(id));
    let released = before - session.payload_links.len();
    if released > 0 {
        info!(
            "payload lost {released} link(s) on tick {}, {} left",
            session.tick,
            session.payload_links.len()
        );
    }
}

/// Record a fatal error and freeze the session.
fn fail(session: &mut SessionCore, err: SimError) -> SimError {
    error!("session failed on tick {}: {err}", session.tick);
    session.status = SessionStatus::Failed;
    session.last_error = Some(err.to_string());
    err
}
