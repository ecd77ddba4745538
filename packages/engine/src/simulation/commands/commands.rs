use log::info;

use crate::core::SimResult;
use crate::input::HandLandmarks;
use crate::systems::CutEvent;

use super::{SessionCore, SessionStatus};

pub(super) fn queue_cut(session: &mut SessionCore, x: f32, y: f32) -> bool {
    session.cut_queue.push(CutEvent::new(x, y))
}

pub(super) fn queue_hand(session: &mut SessionCore, hand: &HandLandmarks) -> bool {
    let (width, height) = (session.config.width, session.config.height);
    match session.gesture.cut_point(hand, width, height) {
        Some(point) => session.cut_queue.push(CutEvent::from(point)),
        None => false,
    }
}

pub(super) fn queue_hand_flat(session: &mut SessionCore, coords: &[f32]) -> SimResult<bool> {
    let hand = HandLandmarks::from_flat(coords)?;
    Ok(queue_hand(session, &hand))
}

/// Host stop signal. Terminal states are left as they are.
pub(super) fn stop(session: &mut SessionCore) {
    if session.status == SessionStatus::Running {
        session.status = SessionStatus::Stopped;
        info!("session stopped by host after {} ticks", session.tick);
    }
}
