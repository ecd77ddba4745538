use super::*;
use crate::core::SimError;
use crate::domain::ConstraintKind;
use crate::input::{Landmark, LANDMARK_COUNT};
use crate::systems::{create_rope, AngleRange, ChainConfig, SegmentStyle};

fn demo() -> SessionCore {
    SessionCore::new(SessionConfig::default()).expect("default level is valid")
}

fn cutting_hand(x: f32, y: f32) -> HandLandmarks {
    let mut points = [Landmark::new(x, 0.9, 0.0); LANDMARK_COUNT];
    points[7] = Landmark::new(x, y + 0.05, 0.0);
    points[8] = Landmark::new(x, y, 0.0);
    points[11] = Landmark::new(x + 0.02, y + 0.05, 0.0);
    points[12] = Landmark::new(x + 0.02, y + 0.005, 0.0);
    HandLandmarks::new(points)
}

#[test]
fn default_level_topology() {
    let session = demo();

    assert_eq!(session.status(), SessionStatus::Running);
    assert_eq!(session.chains().len(), 3);
    for chain in session.chains() {
        assert_eq!(chain.len(), 10);
        assert_eq!(chain.links().len(), 10);
    }
    // 3 anchors + 30 segments + payload
    assert_eq!(session.space().body_count(), 34);
    // 30 rope links + pin + 2 slides
    assert_eq!(session.space().constraint_count(), 33);
    assert_eq!(session.payload_links().len(), 3);

    assert_eq!(session.payload_position(), Vec2::new(400.0, 320.0));
    assert_eq!(session.snapshot().segment_count(), 30);
    assert_eq!(session.segment_buffer().len(), 120);
    assert_eq!(session.chain_segment_counts(), vec![10, 10, 10]);
}

#[test]
fn payload_links_pin_first_then_slides() {
    let session = demo();
    let links: Vec<ConstraintKind> = session
        .payload_links()
        .iter()
        .filter_map(|&id| session.space().constraint(id).map(|c| c.kind))
        .collect();

    match links[0] {
        ConstraintKind::Pin { distance, .. } => assert!((distance - 20.0).abs() < 1e-4),
        other => panic!("expected pin, got {other:?}"),
    }
    for kind in &links[1..] {
        assert!(matches!(kind, ConstraintKind::Slide { min, max, .. } if *min == 20.0 && *max == 40.0));
    }
}

#[test]
fn fresh_sessions_start_running() {
    assert_eq!(SessionStatus::default(), SessionStatus::Running);
    assert_eq!(RenderSnapshot::default().status, SessionStatus::Running);
    assert_eq!(demo().status(), SessionStatus::Running);
}

#[test]
fn stopped_session_discards_events() {
    let mut session = demo();
    session.stop();
    assert!(session.should_stop());

    assert!(session.queue_cut(400.0, 120.0));
    assert_eq!(session.tick().expect("no-op"), SessionStatus::Stopped);
    assert_eq!(session.queued_cuts(), 0);
    assert_eq!(session.chains()[1].len(), 10);
    assert_eq!(session.tick_count(), 0);
}

#[test]
fn winning_freezes_everything() {
    let config = SessionConfig {
        target: TargetZone::new(380.0, 300.0, 40.0, 40.0),
        ..SessionConfig::default()
    };
    let mut session = SessionCore::new(config).expect("valid");

    assert_eq!(session.tick().expect("tick"), SessionStatus::Won);
    assert!(session.snapshot().won);
    let frozen = session.snapshot().clone();
    let buffer = session.segment_buffer().to_vec();

    session.queue_cut(400.0, 120.0);
    for _ in 0..10 {
        assert_eq!(session.tick().expect("tick"), SessionStatus::Won);
    }
    assert_eq!(session.snapshot(), &frozen);
    assert_eq!(session.segment_buffer(), &buffer[..]);
    assert_eq!(session.tick_count(), 1);
    assert_eq!(session.chains()[1].len(), 10);

    // stop does not leave a terminal state
    session.stop();
    assert_eq!(session.status(), SessionStatus::Won);
}

#[test]
fn divergence_fails_and_keeps_last_snapshot() {
    let mut session = demo();
    session.tick().expect("first tick is fine");
    let last_good = session.snapshot().clone();

    let payload = session.payload;
    if let Some(body) = session.space.body_mut(payload) {
        body.velocity = Vec2::new(f32::NAN, 0.0);
    }

    let err = session.tick().expect_err("NaN must surface");
    assert!(matches!(err, SimError::SimulationDiverged { .. }));
    assert!(err.is_fatal());
    assert_eq!(session.status(), SessionStatus::Failed);
    assert!(session.last_error().is_some_and(|m| m.contains("diverged")));
    assert_eq!(session.snapshot(), &last_good);

    assert_eq!(session.tick().expect("frozen"), SessionStatus::Failed);
    assert_eq!(session.tick_count(), 1);
}

#[test]
fn cutting_the_payload_tip_drops_the_pin() {
    let mut session = demo();
    assert!(session.queue_cut(400.0, 300.0));
    session.tick().expect("tick");

    assert_eq!(session.chains()[1].len(), 9);
    assert_eq!(session.payload_links().len(), 2);
    assert_eq!(
        session.cut_history(),
        &[CutRecord {
            tick: 0,
            chain: 1,
            index: 9
        }]
    );
    session.space().check_integrity().expect("no dangling refs");
}

#[test]
fn cutting_hand_queues_its_index_tip() {
    let mut session = demo();
    // (0.5, 0.2) on an 800x600 field is (400, 120): chain 1, segment 0
    assert!(session.queue_hand(&cutting_hand(0.5, 0.2)));
    session.tick().expect("tick");
    assert!(session.chains()[1].is_empty());

    let mut points = *cutting_hand(0.5, 0.2).points();
    points[8] = Landmark::new(0.5, 0.4, 0.0);
    assert!(!session.queue_hand(&HandLandmarks::new(points)));

    assert!(matches!(session.queue_hand_flat(&[0.5; 5]), Err(SimError::InvalidLandmarks(_))));
}

#[test]
fn queue_overflow_is_counted() {
    let config = SessionConfig {
        queue_capacity: 2,
        ..SessionConfig::default()
    };
    let mut session = SessionCore::new(config).expect("valid");
    assert!(session.queue_cut(0.0, 0.0));
    assert!(session.queue_cut(1.0, 0.0));
    assert!(!session.queue_cut(2.0, 0.0));
    assert_eq!(session.dropped_cuts(), 1);
}

#[test]
fn perf_stats_follow_the_toggle() {
    let mut session = demo();
    session.enable_perf_metrics(true);
    session.queue_cut(250.0, 140.0);
    session.queue_cut(5.0, 5.0);
    session.tick().expect("tick");

    let stats = session.get_perf_stats();
    assert_eq!(stats.cut_events(), 2);
    assert_eq!(stats.cuts_applied(), 1);
    assert_eq!(stats.stale_cuts(), 0);
    assert_eq!(stats.body_count(), 24);
    assert!(stats.tick_ms() >= 0.0);

    session.enable_perf_metrics(false);
    assert_eq!(session.get_perf_stats().cut_events(), 0);
}

#[test]
fn snapshot_serialises_for_the_renderer() {
    let session = demo();
    let json = session.snapshot_json().expect("serialisable");
    let v: serde_json::Value = serde_json::from_str(&json).expect("valid json");

    assert_eq!(v["status"], "running");
    assert_eq!(v["won"], false);
    assert_eq!(v["chains"].as_array().map(Vec::len), Some(3));
    assert_eq!(v["chains"][1]["segments"][0]["a"]["y"], 120.0);
    assert_eq!(v["target"]["w"], 200.0);
    assert_eq!(v["payload_radius"], 15.0);
}

#[test]
fn config_rejects_links_to_missing_chains() {
    let mut config = SessionConfig::default();
    config.payload.slide_chains = vec![0, 5];
    assert!(matches!(SessionCore::new(config), Err(SimError::InvalidConfig(_))));

    let mut config = SessionConfig::default();
    config.payload.pin_chain = None;
    assert!(SessionCore::new(config).is_err());

    let mut config = SessionConfig::default();
    config.solver.damping = 0.0;
    assert!(SessionCore::new(config).is_err());
}

#[test]
fn gravity_can_be_changed_mid_session() {
    let mut session = demo();
    session.set_gravity(0.0, -900.0);
    assert_eq!(session.space().params().gravity, Vec2::new(0.0, -900.0));
    assert_eq!(session.config().solver.gravity, Vec2::new(0.0, -900.0));

    session.set_gravity(f32::INFINITY, 0.0);
    assert_eq!(session.space().params().gravity, Vec2::new(0.0, -900.0));
}

#[test]
fn capsule_rope_stays_joined_while_swinging() {
    let mut space = Space::default();
    let config = ChainConfig {
        style: SegmentStyle::Capsule,
        rotary_limit: Some(AngleRange { min: -0.5, max: 0.5 }),
        ..ChainConfig::default()
    };
    let chain = create_rope(&mut space, 0, &config).expect("valid rope");
    if let Some(tip) = chain.last_segment().and_then(|id| space.body_mut(id)) {
        tip.velocity = Vec2::new(300.0, 0.0);
    }

    for _ in 0..300 {
        space.step().expect("finite");
    }

    let ends = chain.segment_endpoints(&space);
    for pair in ends.windows(2) {
        let gap = pair[0].b.distance(pair[1].a);
        assert!(gap < 3.0, "segments {} and {} drifted {gap} apart", pair[0].index, pair[1].index);
    }
}
