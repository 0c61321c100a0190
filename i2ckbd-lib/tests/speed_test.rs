//! Tests for the bus speed test

mod common;

use common::*;

const ROUND_TRIPS: usize = 2 * 256 * 4;

#[test]
fn test_refuses_while_switch_is_on() {
    let mut session = session(FakeKeyboard::with_switch(true));

    let result = session.speed_test();
    assert!(matches!(result, Err(KbdError::SwitchEnabled)));
    // Verification frame plus the switch probe, nothing else
    assert_eq!(session.transport().frames.len(), 2);
}

#[test]
fn test_refuses_when_switch_state_unknown() {
    let mut session = session(FakeKeyboard::new());
    session.transport_mut().fail_reads = RETRY_LIMIT as usize;

    let result = session.speed_test();
    assert!(matches!(result, Err(KbdError::SwitchStateUnknown)));

    // keyboard_enabled reads the same failure as "off"
    session.transport_mut().fail_reads = RETRY_LIMIT as usize;
    assert_eq!(session.keyboard_enabled().unwrap(), false);
    let skip = session.transport().frames.len();
    session.transport_mut().fail_reads = RETRY_LIMIT as usize;
    assert!(matches!(session.speed_test(), Err(KbdError::SwitchStateUnknown)));

    // Only the unanswered switch probes reached the device
    let actions = session.transport().actions_since(skip);
    assert_eq!(actions.len(), RETRY_LIMIT as usize);
    assert!(actions.iter().all(|(_, action)| *action == ActionKind::Test));
}

#[test]
fn test_runs_every_frame() {
    let mut session = session(FakeKeyboard::new());
    let skip = session.transport().frames.len() + 1;

    let report = session.speed_test().unwrap();
    assert_eq!(report.attempted, ROUND_TRIPS);
    assert_eq!(report.completed, ROUND_TRIPS);
    assert!(report.ms_per_action().is_some());

    let keyboard = session.transport();
    assert_eq!(keyboard.frames.len(), skip + ROUND_TRIPS);

    let actions = keyboard.actions_since(skip);
    assert_eq!(actions[0], (KeyId(0), ActionKind::Test));
    assert_eq!(actions[3], (KeyId(0), ActionKind::ReleaseAll));
    assert_eq!(actions[4], (KeyId(1), ActionKind::Test));
    assert_eq!(actions[ROUND_TRIPS - 1], (KeyId(255), ActionKind::ReleaseAll));

    // First half with the LED on, second half off
    let (_, first_action) = keyboard.frames[skip];
    let (_, last_action) = keyboard.frames[skip + ROUND_TRIPS - 1];
    assert_eq!(first_action & LED_BIT, LED_BIT);
    assert_eq!(last_action & LED_BIT, 0);

    assert!(session.pressed_keys().is_empty());
}

#[test]
fn test_transient_errors_are_retried() {
    let mut session = session(FakeKeyboard::new());
    let skip = session.transport().frames.len() + 1;
    session.transport_mut().fail_every_nth_action_write = 7;

    let report = session.speed_test().unwrap();
    assert_eq!(report.attempted, ROUND_TRIPS);
    assert_eq!(report.completed, ROUND_TRIPS);
    assert_eq!(session.transport().frames.len(), skip + ROUND_TRIPS);
}

#[test]
fn test_report_formatting() {
    let report = i2ckbd_lib::SpeedTestReport {
        attempted: 2048,
        completed: 1000,
        elapsed: std::time::Duration::from_secs(2),
    };
    assert_eq!(report.ms_per_action(), Some(2.0));
    assert_eq!(report.actions_per_second(), Some(500.0));
    assert_eq!(
        report.to_string(),
        "1000/2048 key actions in 2000.00 ms (2.00 ms/keyaction, 500.00 keyactions/s)"
    );

    let empty = i2ckbd_lib::SpeedTestReport {
        attempted: 2048,
        completed: 0,
        elapsed: std::time::Duration::from_millis(5),
    };
    assert_eq!(empty.ms_per_action(), None);
    assert_eq!(empty.to_string(), "0/2048 key actions in 5.00 ms");
}
