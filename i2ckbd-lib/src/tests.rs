use crate::constants::*;
use crate::frame::*;

#[test]
fn test_action_codes_match_wire_table() {
    assert_eq!(ActionKind::Test.code(), 0b0000_0000);
    assert_eq!(ActionKind::Press.code(), 0b0001_0000);
    assert_eq!(ActionKind::Release.code(), 0b0010_0000);
    assert_eq!(ActionKind::ReleaseAll.code(), 0b0011_0000);

    for action in ActionKind::ALL {
        let frame = encode_frame(KeyId(0x2a), action, LedState::Off);
        assert_eq!(frame.action_byte & ACTION_MASK, action.code(), "{}", action);
    }
}

#[test]
fn test_led_bit() {
    for action in ActionKind::ALL {
        let on = encode_frame(KeyId(30), action, LedState::On);
        let off = encode_frame(KeyId(30), action, LedState::Off);
        assert_eq!(on.action_byte & LED_BIT, LED_BIT);
        assert_eq!(off.action_byte & LED_BIT, 0);
    }
}

#[test]
fn test_encode_test_frame_for_key_zero() {
    // popcount 0 is even -> parity set, checksum = 0 + 1
    let frame = encode_frame(KeyId::NONE, ActionKind::Test, LedState::Off);
    assert_eq!(frame.key, KeyId(0));
    assert_eq!(frame.action_byte, 0b1000_0001);
    assert_eq!(frame.action_byte & ACTION_MASK, 0);
    assert_eq!(frame.action_byte & LED_BIT, 0);
    assert_eq!(frame.bytes(), [0x00, 0x81]);
}

#[test]
fn test_encode_press_frames() {
    // KEY_A = 30 = 0b00011110 (4 bits), Press | LED = 2 bits -> even -> parity
    let frame = encode_frame(KeyId(30), ActionKind::Press, LedState::On);
    assert_eq!(frame.action_byte, 0b1101_0111);

    // key 1 (1 bit) + Press (1 bit) -> even -> parity, checksum 1 + 2 = 3
    let frame = encode_frame(KeyId(1), ActionKind::Press, LedState::Off);
    assert_eq!(frame.action_byte, 0b1001_0011);

    // key 3 (2 bits) + Press (1 bit) -> odd -> no parity, checksum 3
    let frame = encode_frame(KeyId(3), ActionKind::Press, LedState::Off);
    assert_eq!(frame.action_byte, 0b0001_0011);
}

#[test]
fn test_checksum_fits_nibble_for_all_frames() {
    for key in KeyId::all() {
        for action in ActionKind::ALL {
            for led in LedState::ALL {
                let frame = encode_frame(key, action, led);
                let payload = frame.action_byte & !CHECKSUM_MASK;
                let expected = key.0.count_ones() + payload.count_ones();
                assert_eq!((frame.action_byte & CHECKSUM_MASK) as u32, expected);
                assert!(frame_intact(key, frame.action_byte));
            }
        }
    }
}

#[test]
fn test_frame_intact_rejects_flipped_bits() {
    let frame = encode_frame(KeyId(30), ActionKind::Press, LedState::On);
    for bit in 0..8 {
        assert!(!frame_intact(frame.key, frame.action_byte ^ (1 << bit)), "action bit {}", bit);
        assert!(!frame_intact(KeyId(frame.key.0 ^ (1 << bit)), frame.action_byte), "key bit {}", bit);
    }
}

#[test]
fn test_validate_good_confirmation() {
    let frame = encode_frame(KeyId(30), ActionKind::Press, LedState::On);
    let sum = frame_bit_sum(frame.key, frame.action_byte);
    let status = DeviceStatus {
        switch_on: true,
        led_on: true,
    };
    let confirm = encode_confirmation(sum, status, false);
    assert_eq!(confirm.count_ones() % 2, 1);
    assert_eq!(validate_confirmation(frame.key, frame.action_byte, confirm), Ok(status));
}

#[test]
fn test_validate_reports_every_fault() {
    let frame = encode_frame(KeyId::NONE, ActionKind::Test, LedState::Off);
    // checksum should be 2; error bit set; even number of bits
    let confirm = 0b0100_0001;
    let err = validate_confirmation(frame.key, frame.action_byte, confirm).unwrap_err();
    assert_eq!(
        err.faults,
        vec![
            FrameFault::ChecksumMismatch,
            FrameFault::ParityMismatch,
            FrameFault::RemoteErrorFlag
        ]
    );
    assert_eq!(err.confirm, confirm);
    let message = err.to_string();
    assert!(message.contains("checksum"), "{}", message);
    assert!(message.contains("Error bit"), "{}", message);
}

#[test]
fn test_validate_remote_error_only() {
    let frame = encode_frame(KeyId(5), ActionKind::Release, LedState::On);
    let sum = frame_bit_sum(frame.key, frame.action_byte);
    let confirm = encode_confirmation(sum, DeviceStatus::default(), true);
    let err = validate_confirmation(frame.key, frame.action_byte, confirm).unwrap_err();
    assert_eq!(err.faults, vec![FrameFault::RemoteErrorFlag]);
    assert!(err.has(FrameFault::RemoteErrorFlag));
    assert!(!err.has(FrameFault::ParityMismatch));
}

#[test]
fn test_confirmation_flags_decode() {
    let frame = encode_frame(KeyId::NONE, ActionKind::Test, LedState::Off);
    let sum = frame_bit_sum(frame.key, frame.action_byte);
    for (switch_on, led_on) in [(false, false), (false, true), (true, false), (true, true)] {
        let status = DeviceStatus { switch_on, led_on };
        let confirm = encode_confirmation(sum, status, false);
        assert_eq!(confirm & CONFIRM_SWITCH_BIT != 0, switch_on);
        assert_eq!(confirm & CONFIRM_LED_BIT != 0, led_on);
        assert_eq!(confirm & CONFIRM_ERROR_BIT, 0);
        assert_eq!(validate_confirmation(frame.key, frame.action_byte, confirm), Ok(status));
    }
}

#[test]
fn test_action_kind_from_wire_code() {
    assert!(matches!(ActionKind::try_from(0b11u8), Ok(ActionKind::ReleaseAll)));
    assert!(ActionKind::try_from(4u8).is_err());
}

#[test]
fn test_frame_display_is_binary() {
    let frame = encode_frame(KeyId::NONE, ActionKind::Test, LedState::Off);
    assert_eq!(frame.to_string(), "0b00000000 0b10000001");
}
