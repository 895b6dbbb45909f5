//! Integration tests for the `EngineController` driver.

use std::sync::mpsc;
use std::time::Duration;

use chess_engine::engine::{EngineController, SearchParams};

#[test]
fn engine_depth_search_returns_move() {
    let mut controller = EngineController::new(16);
    let (tx, rx) = mpsc::channel();

    let params = SearchParams {
        depth: Some(1),
        ..SearchParams::default()
    };
    controller.start_search(params, move |result| {
        let _ = tx.send(result);
    });

    let result = rx
        .recv_timeout(Duration::from_secs(10))
        .expect("depth-1 search should finish quickly");
    assert!(
        result.best_move.is_some(),
        "starting position always has a legal move at depth 1"
    );
    controller.stop_search();
}

#[test]
fn engine_time_limited_search_returns_move_within_time() {
    let mut controller = EngineController::new(16);
    let (tx, rx) = mpsc::channel();

    let params = SearchParams {
        soft_time_ms: 50,
        hard_time_ms: 200,
        ..SearchParams::default()
    };
    controller.start_search(params, move |result| {
        let _ = tx.send(result);
    });

    let result = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("time-limited search should stop within its hard deadline");
    assert!(result.best_move.is_some(), "a time-limited search should still report a move");
    controller.stop_search();
}

#[test]
fn engine_resize_hash_then_search_still_works() {
    let mut controller = EngineController::new(1);
    controller.resize_hash(4);

    let (tx, rx) = mpsc::channel();
    let params = SearchParams {
        depth: Some(1),
        ..SearchParams::default()
    };
    controller.start_search(params, move |result| {
        let _ = tx.send(result);
    });

    let result = rx
        .recv_timeout(Duration::from_secs(10))
        .expect("search after resize_hash should still complete");
    assert!(result.best_move.is_some());
    controller.stop_search();
}
