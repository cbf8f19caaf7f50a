//! Tests for synchronous emission.

use std::sync::{Arc, Mutex};

use less_events::{args, Arg, Emitter, Listener};

/// Helper: create a shared call-log that listeners append to.
fn make_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

/// Listener that logs `"{tag}:{args}"`.
fn logger(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Listener {
    let log = Arc::clone(log);
    Listener::new(move |args| {
        let rendered: Vec<String> = args.iter().map(|a| format!("{a:?}")).collect();
        log.lock().unwrap().push(format!("{tag}:{}", rendered.join(",")));
    })
}

fn unlimited() -> Emitter {
    Emitter::with_max_listeners(-1)
}

// ============================================================================
// Basic dispatch
// ============================================================================

#[test]
fn emit_calls_each_listener_once_in_registration_order() {
    let emitter = unlimited();
    let log = make_log();
    emitter
        .on("x", logger(&log, "a"))
        .on("x", logger(&log, "b"))
        .on("x", logger(&log, "c"));

    emitter.emit("x", &args![1, "two"]);

    assert_eq!(
        *log.lock().unwrap(),
        vec![r#"a:1,"two""#, r#"b:1,"two""#, r#"c:1,"two""#]
    );
}

#[test]
fn emit_only_reaches_listeners_of_that_name() {
    let emitter = unlimited();
    let log = make_log();
    emitter.on("x", logger(&log, "x")).on("y", logger(&log, "y"));

    emitter.emit("y", &args![]);

    assert_eq!(*log.lock().unwrap(), vec!["y:"]);
}

#[test]
fn emit_with_no_listeners_is_a_no_op() {
    let emitter = unlimited();
    // Should not panic, and should not create an entry.
    emitter.emit("nothing", &args![42]);
    assert!(emitter.event_names().is_empty());
}

#[test]
fn emit_args_accepts_any_convertible_sequence() {
    let emitter = unlimited();
    let log = make_log();
    emitter.on("x", logger(&log, "a"));

    emitter.emit_args("x", vec![1, 2, 3]).emit_args("x", ["p", "q"]);

    assert_eq!(*log.lock().unwrap(), vec!["a:1,2,3", r#"a:"p","q""#]);
}

#[test]
fn arity_does_not_change_delivery() {
    let emitter = unlimited();
    let received = Arc::new(Mutex::new(Vec::new()));
    let received_clone = Arc::clone(&received);
    emitter.subscribe("x", move |args| {
        received_clone.lock().unwrap().push(args.to_vec());
    });

    for n in 0..8i64 {
        let args: Vec<Arg> = (0..n).map(Arg::from).collect();
        emitter.emit("x", &args);
    }

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 8);
    for (n, args) in received.iter().enumerate() {
        let expected: Vec<Arg> = (0..n as i64).map(Arg::from).collect();
        assert_eq!(*args, expected);
    }
}

// ============================================================================
// Snapshot semantics during emit
// ============================================================================

#[test]
fn listener_added_during_emit_is_not_called_in_current_emission() {
    let emitter = unlimited();
    let log = make_log();

    let weak = emitter.downgrade();
    let log_clone = Arc::clone(&log);
    emitter.subscribe("x", move |_| {
        log_clone.lock().unwrap().push("first".to_string());
        if let Some(emitter) = weak.upgrade() {
            emitter.on("x", logger(&log_clone, "late"));
        }
    });

    emitter.emit("x", &args![]);

    assert_eq!(*log.lock().unwrap(), vec!["first"]);
    assert_eq!(emitter.listener_count("x"), 2);
}

#[test]
fn listener_removed_during_emit_is_still_called_snapshot_semantics() {
    let emitter = unlimited();
    let log = make_log();

    // The first listener removes the second one mid-emission.
    let second = logger(&log, "second");
    let weak = emitter.downgrade();
    let second_clone = second.clone();
    let log_clone = Arc::clone(&log);
    emitter.subscribe("x", move |_| {
        log_clone.lock().unwrap().push("first".to_string());
        if let Some(emitter) = weak.upgrade() {
            emitter.off("x", Some(&second_clone));
        }
    });
    emitter.on("x", second);

    emitter.emit("x", &args![]);
    assert_eq!(*log.lock().unwrap(), vec!["first", "second:"]);

    // Removed for the next round.
    log.lock().unwrap().clear();
    emitter.emit("x", &args![]);
    assert_eq!(*log.lock().unwrap(), vec!["first"]);
}

#[test]
fn listener_can_emit_reentrantly() {
    let emitter = unlimited();
    let log = make_log();

    let weak = emitter.downgrade();
    emitter.subscribe("outer", move |_| {
        if let Some(emitter) = weak.upgrade() {
            emitter.emit("inner", &args!["from outer"]);
        }
    });
    emitter.on("inner", logger(&log, "inner"));

    emitter.emit("outer", &args![]);

    assert_eq!(*log.lock().unwrap(), vec![r#"inner:"from outer""#]);
}

// ============================================================================
// Panics propagate (no error isolation)
// ============================================================================

#[test]
fn panicking_listener_propagates_and_prevents_subsequent_calls() {
    let emitter = unlimited();
    let log = make_log();

    emitter.subscribe("x", |_| panic!("first panics"));
    emitter.on("x", logger(&log, "second"));

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        emitter.emit("x", &args![]);
    }));

    assert!(result.is_err(), "emit should propagate panics from listeners");
    assert!(log.lock().unwrap().is_empty());

    // The registry lock was not held, so the emitter is still usable.
    emitter.off_all("x");
    assert_eq!(emitter.listener_count("x"), 0);
}
