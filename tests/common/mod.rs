#![allow(dead_code)]

use std::time::Duration;
use uinput_keyboard::recording::{Call, RecordingBackend, Trace};
use uinput_keyboard::{
    DeviceDescriptor, EventType, FailurePolicy, InputEvent, KeyCode, KeySet, KeyState, Session,
    SessionConfig, SettlePolicy, DEMO_KEYS,
};

pub fn quick_config(policy: FailurePolicy) -> SessionConfig {
    SessionConfig {
        settle: SettlePolicy::Fixed(Duration::ZERO),
        hold: Duration::ZERO,
        policy,
    }
}

pub fn demo_keys() -> KeySet {
    DEMO_KEYS.iter().collect()
}

pub fn recording_session(
    trace: &Trace,
    policy: FailurePolicy,
    fail_when: impl Fn(&Call) -> bool + 'static,
) -> Session<RecordingBackend> {
    let backend = RecordingBackend::open("/dev/uinput", trace).fail_when(fail_when);
    Session::with_backend(backend, quick_config(policy))
}

pub fn key_event(key: KeyCode, state: KeyState) -> InputEvent {
    InputEvent::key(key, state)
}

/// What a full demonstration run should look like on the handle.
pub fn expected_demo_calls() -> Vec<Call> {
    let descriptor = DeviceDescriptor::default();
    vec![
        Call::Open("/dev/uinput".into()),
        Call::EnableEventType(EventType::KEY),
        Call::EnableKey(KeyCode::KEY_1),
        Call::EnableKey(KeyCode::KEY_2),
        Call::Setup {
            id: descriptor.id(),
            name: descriptor.name().to_owned(),
        },
        Call::Create,
        Call::Write(key_event(KeyCode::KEY_1, KeyState::Pressed)),
        Call::Write(InputEvent::sync_report()),
        Call::Write(key_event(KeyCode::KEY_1, KeyState::Released)),
        Call::Write(InputEvent::sync_report()),
        Call::Destroy,
        Call::Release,
    ]
}

/// Checks that every key event is directly followed by exactly one `SYN_REPORT`.
pub fn assert_sync_after_every_change(events: &[InputEvent]) {
    let mut iter = events.iter().peekable();
    while let Some(event) = iter.next() {
        if event.event_type() == EventType::KEY {
            let next = iter.next().expect("key event without a following sync");
            assert!(next.is_sync_report(), "{event:?} followed by {next:?}");
            if let Some(after) = iter.peek() {
                assert!(!after.is_sync_report(), "double sync after {event:?}");
            }
        }
    }
}
