use approx::{assert_abs_diff_eq, assert_relative_eq};

use ropecut_engine::{CutRecord, SessionConfig, SessionCore, SessionStatus, TargetZone, Vec2};

fn demo() -> SessionCore {
    SessionCore::new(SessionConfig::default()).expect("default level is valid")
}

fn run(session: &mut SessionCore, ticks: usize) {
    for _ in 0..ticks {
        session.tick().expect("no fatal error");
    }
}

fn tip_position(session: &SessionCore, chain: usize) -> Vec2 {
    session.chains()[chain]
        .last_segment()
        .and_then(|id| session.space().body(id))
        .map(|b| b.position)
        .expect("chain has a live tip")
}

/// Let the level settle, then cut the top segment of the payload's pin chain.
fn cut_pin_chain_and_wait(session: &mut SessionCore, max_ticks: usize) -> Option<u64> {
    run(session, 120);
    let top = session.snapshot().chains[1].segments[0].a;
    assert!(session.queue_cut(top.x, top.y));

    for _ in 0..max_ticks {
        if session.tick().expect("no fatal error") == SessionStatus::Won {
            return Some(session.tick_count());
        }
    }
    None
}

#[test]
fn scenario_a_payload_settles_under_the_pin_chain() {
    let mut session = demo();
    run(&mut session, 840);
    let before = session.payload_position();
    run(&mut session, 60);
    let payload = session.payload_position();

    assert_eq!(session.status(), SessionStatus::Running);
    // centred under the middle anchor, one pin length below its tip plus rope stretch
    assert_abs_diff_eq!(payload.x, 400.0, epsilon = 2.0);
    assert!(payload.y > 315.0 && payload.y < 346.0, "payload settled at {payload:?}");
    assert!(payload.distance(before) < 1.0, "still moving: {before:?} -> {payload:?}");

    for side in [0, 2] {
        let d = payload.distance(tip_position(&session, side));
        assert!((20.0..=42.0).contains(&d), "slide to chain {side} at {d}");
    }
    session.space().check_integrity().expect("no dangling refs");
}

#[test]
fn scenario_b_one_cut_drops_the_payload_into_the_target() {
    let mut session = demo();
    let won_at = cut_pin_chain_and_wait(&mut session, 600);

    assert!(won_at.is_some(), "never won; payload at {:?}", session.payload_position());
    assert!(session.is_won());
    assert!(session.should_stop());
    assert!(session.snapshot().won);
    assert!(session.target().contains(session.payload_position()));

    assert!(session.chains()[1].is_empty());
    assert_eq!(session.chains()[0].len(), 10);
    assert_eq!(session.chains()[2].len(), 10);
    // the two slides still hold it
    assert_eq!(session.payload_links().len(), 2);

    let frozen = session.payload_position();
    let buffer = session.segment_buffer().to_vec();
    let ticks = session.tick_count();
    for _ in 0..30 {
        assert_eq!(session.tick().expect("frozen"), SessionStatus::Won);
    }
    assert_eq!(session.payload_position(), frozen);
    assert_eq!(session.segment_buffer(), &buffer[..]);
    assert_eq!(session.tick_count(), ticks);
}

#[test]
fn scenario_c_all_chains_cut_means_free_fall() {
    let mut config = SessionConfig::default();
    config.solver.damping = 1.0;
    // off to the side so the fall is never cut short by a win
    config.target = TargetZone::new(0.0, 500.0, 100.0, 50.0);
    let g = config.solver.gravity.y;
    let dt = config.solver.dt;
    let mut session = SessionCore::new(config).expect("valid");

    // top segment of each chain
    for (x, y) in [(250.0, 140.0), (400.0, 120.0), (550.0, 140.0)] {
        assert!(session.queue_cut(x, y));
    }
    session.tick().expect("tick");
    assert!(session.chains().iter().all(|c| c.is_empty()));
    assert!(session.payload_links().is_empty());
    assert_eq!(session.space().constraint_count(), 0);

    for t in 1..=90u32 {
        if t > 1 {
            session.tick().expect("tick");
        }
        let v = session
            .space()
            .body(session.payload())
            .map(|b| b.velocity)
            .expect("payload is live");
        assert_eq!(session.status(), SessionStatus::Running);
        assert_eq!(v.x, 0.0);
        assert_relative_eq!(v.y, g * dt * t as f32, max_relative = 1e-3);
    }
}

#[test]
fn same_schedule_same_outcome() {
    // top of chain 0, then top of the pin chain
    let schedule: &[(u64, f32, f32)] = &[(30, 251.0, 140.0), (60, 400.0, 121.0)];

    let replay = || {
        let mut session = demo();
        while session.tick_count() < 700 && !session.should_stop() {
            let now = session.tick_count();
            for &(_, x, y) in schedule.iter().filter(|(t, _, _)| *t == now) {
                session.queue_cut(x, y);
            }
            session.tick().expect("no fatal error");
        }
        (
            session.cut_history().to_vec(),
            session.status(),
            session.payload_position(),
            session.chain_segment_counts(),
        )
    };

    let first = replay();
    let second = replay();
    assert_eq!(first, second);
    assert_eq!(
        first.0.iter().map(|c| (c.tick, c.chain, c.index)).collect::<Vec<_>>(),
        vec![(30, 0, 0), (60, 1, 0)]
    );
    assert_eq!(first.1, SessionStatus::Won);
}

#[test]
fn cut_threshold_is_exclusive() {
    // chain 1 segment 0 starts at (400, 120); (406, 128) is exactly 10 away
    let mut on_edge = demo();
    on_edge.queue_cut(406.0, 128.0);
    on_edge.tick().expect("tick");
    assert_eq!(on_edge.chains()[1].len(), 10);
    assert!(on_edge.cut_history().is_empty());

    let mut just_inside = demo();
    just_inside.queue_cut(406.0, 127.99);
    just_inside.tick().expect("tick");
    assert!(just_inside.chains()[1].is_empty());
    assert_eq!(
        just_inside.cut_history(),
        &[CutRecord {
            tick: 0,
            chain: 1,
            index: 0
        }]
    );
}

#[test]
fn every_tick_keeps_the_graph_closed() {
    let mut session = demo();
    let cuts = [(10, 250.0, 300.0), (20, 400.0, 200.0), (25, 550.0, 180.0), (40, 250.0, 140.0)];
    for tick in 0..80u64 {
        for &(_, x, y) in cuts.iter().filter(|(t, _, _)| *t == tick) {
            session.queue_cut(x, y);
        }
        session.tick().expect("no fatal error");
        session.space().check_integrity().expect("no dangling refs");
        for &id in session.payload_links() {
            assert!(session.space().constraint(id).is_some());
        }
    }
}
