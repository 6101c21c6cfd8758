mod common;

use common::*;
use std::time::{Duration, Instant};
use uinput_keyboard::recording::{Call, RecordingBackend, Trace};
use uinput_keyboard::session::Operation;
use uinput_keyboard::wait::CancelToken;
use uinput_keyboard::{
    DeviceDescriptor, Error, EventType, FailurePolicy, InputEvent, KeyCode, KeyState, RunOutcome,
    Session, SessionConfig, SessionState, SettlePolicy, DEMO_KEY,
};

#[test]
fn full_run_issues_calls_in_order() {
    let trace = Trace::new();
    let mut session = recording_session(&trace, FailurePolicy::Abort, |_| false);

    let outcome = session
        .run(&demo_keys(), &DeviceDescriptor::default(), DEMO_KEY)
        .unwrap();

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(session.state(), SessionState::Released);
    assert_eq!(trace.calls(), expected_demo_calls());
}

#[test]
fn listener_sees_press_sync_release_sync() {
    let trace = Trace::new();
    let mut session = recording_session(&trace, FailurePolicy::Abort, |_| false);
    session
        .run(&demo_keys(), &DeviceDescriptor::default(), DEMO_KEY)
        .unwrap();

    let triples: Vec<_> = trace.events().iter().map(InputEvent::triple).collect();
    assert_eq!(triples, vec![(1, 2, 1), (0, 0, 0), (1, 2, 0), (0, 0, 0)]);
    assert_sync_after_every_change(&trace.events());
}

#[test]
fn category_failure_stops_everything_but_close() {
    let trace = Trace::new();
    {
        let mut session = recording_session(&trace, FailurePolicy::LogAndContinue, |call| {
            matches!(call, Call::EnableEventType(_))
        });
        let err = session
            .run(&demo_keys(), &DeviceDescriptor::default(), DEMO_KEY)
            .unwrap_err();
        assert!(matches!(err, Error::Capability { .. }));
        assert!(err.to_string().starts_with("setting up fd"));
        assert_eq!(session.state(), SessionState::Opened);
    }

    assert_eq!(
        trace.calls(),
        vec![
            Call::Open("/dev/uinput".into()),
            Call::EnableEventType(EventType::KEY),
            Call::Release,
        ]
    );
}

#[test]
fn per_key_failure_is_fatal_too() {
    let trace = Trace::new();
    {
        let mut session = recording_session(&trace, FailurePolicy::LogAndContinue, |call| {
            *call == Call::EnableKey(KeyCode::KEY_1)
        });
        let err = session.declare_capabilities(&demo_keys()).unwrap_err();
        assert!(err.to_string().contains("KEY_1"));
    }

    let calls = trace.calls();
    assert!(!calls.contains(&Call::EnableKey(KeyCode::KEY_2)));
    assert!(!calls.contains(&Call::Create));
    assert_eq!(calls.last(), Some(&Call::Release));
}

#[test]
fn abort_policy_stops_at_first_write_failure_and_still_destroys() {
    let trace = Trace::new();
    {
        let mut session = recording_session(&trace, FailurePolicy::Abort, |call| {
            matches!(call, Call::Write(_))
        });
        let err = session
            .run(&demo_keys(), &DeviceDescriptor::default(), DEMO_KEY)
            .unwrap_err();
        assert!(matches!(err, Error::Write(_)));
        assert_eq!(session.state(), SessionState::Created);
    }

    let calls = trace.calls();
    assert_eq!(trace.events().len(), 1);
    assert_eq!(&calls[calls.len() - 2..], &[Call::Destroy, Call::Release]);
}

#[test]
fn continue_policy_keeps_emission_order() {
    let trace = Trace::new();
    let mut session = recording_session(&trace, FailurePolicy::LogAndContinue, |call| {
        matches!(call, Call::Setup { .. } | Call::Create | Call::Write(_))
    });

    let outcome = session
        .run(&demo_keys(), &DeviceDescriptor::default(), DEMO_KEY)
        .unwrap();

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(trace.calls(), expected_demo_calls());
}

#[test]
fn destroy_failure_still_releases_handle() {
    let trace = Trace::new();
    let mut session = recording_session(&trace, FailurePolicy::Abort, |call| {
        *call == Call::Destroy
    });

    let err = session
        .run(&demo_keys(), &DeviceDescriptor::default(), DEMO_KEY)
        .unwrap_err();

    assert!(matches!(err, Error::Destroy(_)));
    assert_eq!(session.state(), SessionState::Released);
    assert_eq!(trace.calls().last(), Some(&Call::Release));
    drop(session);
    assert_eq!(
        trace.calls().iter().filter(|c| **c == Call::Release).count(),
        1
    );
}

#[test]
fn second_run_is_rejected() {
    let trace = Trace::new();
    let mut session = recording_session(&trace, FailurePolicy::Abort, |_| false);
    session
        .run(&demo_keys(), &DeviceDescriptor::default(), DEMO_KEY)
        .unwrap();
    let calls_after_first = trace.calls().len();

    let err = session
        .run(&demo_keys(), &DeviceDescriptor::default(), DEMO_KEY)
        .unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidTransition {
            from: SessionState::Released,
            operation: Operation::DeclareCapabilities,
        }
    ));
    assert_eq!(trace.calls().len(), calls_after_first);
}

#[test]
fn cancelled_hold_destroys_early() {
    let trace = Trace::new();
    let token = CancelToken::new();
    let config = SessionConfig {
        settle: SettlePolicy::Fixed(Duration::ZERO),
        hold: Duration::from_secs(300),
        policy: FailurePolicy::Abort,
    };
    let mut session = Session::with_backend(RecordingBackend::open("/dev/uinput", &trace), config)
        .with_cancel_token(token.clone());

    session.declare_capabilities(&demo_keys()).unwrap();
    session
        .configure_identity(&DeviceDescriptor::default())
        .unwrap();
    session.create().unwrap();
    session.press(KeyCode::KEY_1).unwrap();
    session.release(KeyCode::KEY_1).unwrap();

    token.cancel();
    let start = Instant::now();
    assert_eq!(
        session.hold().unwrap(),
        uinput_keyboard::wait::WaitOutcome::Cancelled
    );
    assert!(start.elapsed() < Duration::from_secs(5));
    session.destroy().unwrap();

    assert_eq!(trace.calls(), expected_demo_calls());
}

#[test]
fn cancelled_settle_skips_emission() {
    let trace = Trace::new();
    let token = CancelToken::new();
    token.cancel();
    let config = SessionConfig {
        settle: SettlePolicy::Fixed(Duration::from_secs(60)),
        ..quick_config(FailurePolicy::Abort)
    };
    let mut session = Session::with_backend(RecordingBackend::open("/dev/uinput", &trace), config)
        .with_cancel_token(token);

    let outcome = session
        .run(&demo_keys(), &DeviceDescriptor::default(), DEMO_KEY)
        .unwrap();

    assert_eq!(outcome, RunOutcome::CancelledBeforeEmit);
    assert!(trace.events().is_empty());
    assert_eq!(
        &trace.calls()[trace.calls().len() - 2..],
        &[Call::Destroy, Call::Release]
    );
}

#[test]
fn repeated_transitions_each_get_a_sync() {
    let trace = Trace::new();
    let mut session = recording_session(&trace, FailurePolicy::Abort, |_| false);
    session.declare_capabilities(&demo_keys()).unwrap();
    session
        .configure_identity(&DeviceDescriptor::default())
        .unwrap();
    session.create().unwrap();

    for key in [KeyCode::KEY_1, KeyCode::KEY_2, KeyCode::KEY_1] {
        session.emit_key(key, KeyState::Pressed).unwrap();
        session.emit_key(key, KeyState::Released).unwrap();
    }
    session.destroy().unwrap();

    assert_eq!(trace.events().len(), 12);
    assert_sync_after_every_change(&trace.events());
}
