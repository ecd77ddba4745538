#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use ropecut_engine::{Session, SessionStatus};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn facade_runs_a_level() {
    ropecut_engine::init();
    let mut session = Session::new().expect("default level");
    assert_eq!(session.target_zone(), vec![300.0, 500.0, 200.0, 50.0]);

    assert!(session.push_cut(400.0, 120.0));
    assert_eq!(session.tick().expect("tick"), SessionStatus::Running);
    assert_eq!(session.chain_segment_counts(), vec![10, 0, 10]);
    assert!(session.snapshot_json().expect("json").contains("\"status\":\"running\""));
}

#[wasm_bindgen_test]
fn facade_reports_errors_as_strings() {
    let err = Session::from_config_json("{ \"queue_capacity\": 0 }".to_string()).err();
    assert!(err.and_then(|e| e.as_string()).is_some_and(|m| m.contains("queue capacity")));

    let mut session = Session::new().expect("default level");
    assert!(session.push_hand_landmarks(vec![0.0; 7]).is_err());
    session.stop();
    assert!(session.should_stop());
    assert_eq!(session.last_error(), None);
}
