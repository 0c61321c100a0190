//! # Frame codec for the I2C keyboard protocol
//!
//! Every key action is sent as two bytes, the key id followed by an action
//! byte, and answered by a single confirmation byte.
//!
//! ```text
//! action byte        P L A A C C C C    P parity, L LED, AA action, CCCC checksum
//! confirmation byte  P E S L C C C C    P parity, E error, S switch, L LED, CCCC checksum echo
//! ```
//!
//! The parity bit of the action byte is chosen so that the key id and the
//! action byte (before the checksum is filled in) carry an odd number of set
//! bits. The checksum is the bit count of the key id plus the bit count of the
//! parity-completed action byte. The device echoes the bit count of both bytes
//! as they arrived, so a corrupted frame shows up as a checksum mismatch.

use crate::constants::CHECKSUM_MASK;
use modular_bitfield::prelude::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;
use strum_macros::Display;
use thiserror::Error;

/// Linux input event code of a key. `KeyId::NONE` is used by control actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct KeyId(pub u8);

impl KeyId {
    pub const NONE: KeyId = KeyId(0);

    /// Every possible key id in numeric order.
    pub fn all() -> impl Iterator<Item = KeyId> {
        (0..=u8::MAX).map(KeyId)
    }

    fn bit_sum(self) -> u8 {
        bit_sum(self.0)
    }
}

impl From<u8> for KeyId {
    fn from(value: u8) -> Self {
        KeyId(value)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ActionKind {
    Test = 0b00,
    Press = 0b01,
    Release = 0b10,
    ReleaseAll = 0b11,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Test,
        ActionKind::Press,
        ActionKind::Release,
        ActionKind::ReleaseAll,
    ];

    /// The action code as it sits in the action byte (bits 4-5).
    pub fn code(self) -> u8 {
        u8::from(self) << 4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum LedState {
    On,
    Off,
}

impl LedState {
    pub const ALL: [LedState; 2] = [LedState::On, LedState::Off];

    pub fn is_on(self) -> bool {
        self == LedState::On
    }
}

#[bitfield(bytes = 1)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionByte {
    pub checksum: B4,
    pub action: B2,
    pub led: bool,
    pub parity: bool,
}

#[bitfield(bytes = 1)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfirmByte {
    pub checksum: B4,
    pub led: bool,
    pub switch: bool,
    pub error: bool,
    pub parity: bool,
}

/// The two bytes written to the bus for one key action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionFrame {
    pub key: KeyId,
    pub action_byte: u8,
}

impl ActionFrame {
    pub fn bytes(&self) -> [u8; 2] {
        [self.key.0, self.action_byte]
    }
}

impl fmt::Display for ActionFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010b} {:#010b}", self.key.0, self.action_byte)
    }
}

/// Device flags carried by an accepted confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceStatus {
    pub switch_on: bool,
    pub led_on: bool,
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let switch = if self.switch_on { "on" } else { "off" };
        let led = if self.led_on { "on" } else { "off" };
        write!(f, "Switch is {}! LED is {}!", switch, led)
    }
}

/// A single failed check on a confirmation byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FrameFault {
    #[strum(to_string = "Confirmed checksum fails!")]
    ChecksumMismatch,
    #[strum(to_string = "Uneven bit is set wrong in confirm!")]
    ParityMismatch,
    #[strum(to_string = "Error bit is set!")]
    RemoteErrorFlag,
}

/// Every check a confirmation byte failed, in check order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("confirmation {confirm:#010b} rejected: {}", describe(.faults))]
pub struct FrameError {
    pub confirm: u8,
    pub faults: Vec<FrameFault>,
}

impl FrameError {
    pub fn has(&self, fault: FrameFault) -> bool {
        self.faults.contains(&fault)
    }
}

fn describe(faults: &[FrameFault]) -> String {
    faults.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}

fn bit_sum(byte: u8) -> u8 {
    byte.count_ones() as u8
}

/// Build the frame for `action` on `key`.
pub fn encode_frame(key: KeyId, action: ActionKind, led: LedState) -> ActionFrame {
    let mut byte = ActionByte::new().with_action(action.into()).with_led(led.is_on());

    if (key.bit_sum() + bit_sum(byte.into_bytes()[0])) % 2 == 0 {
        byte.set_parity(true);
    }

    // The low nibble is still empty, so storing the sum is the same as adding it.
    let checksum = key.bit_sum() + bit_sum(byte.into_bytes()[0]);
    byte.set_checksum(checksum);

    ActionFrame {
        key,
        action_byte: byte.into_bytes()[0],
    }
}

/// Check the confirmation the device returned for the frame `(key, action_byte)`.
///
/// All three checks run even after one failed, so the error lists every
/// problem with the byte.
pub fn validate_confirmation(key: KeyId, action_byte: u8, confirm: u8) -> Result<DeviceStatus, FrameError> {
    let byte = ConfirmByte::from_bytes([confirm]);
    let mut faults = Vec::new();

    if key.bit_sum() + bit_sum(action_byte) != byte.checksum() {
        faults.push(FrameFault::ChecksumMismatch);
    }
    if bit_sum(confirm) % 2 == 0 {
        faults.push(FrameFault::ParityMismatch);
    }
    if byte.error() {
        faults.push(FrameFault::RemoteErrorFlag);
    }

    if !faults.is_empty() {
        return Err(FrameError { confirm, faults });
    }

    Ok(DeviceStatus {
        switch_on: byte.switch(),
        led_on: byte.led(),
    })
}

/// Receiver side check of an incoming frame: odd parity over the payload and
/// a checksum field matching it.
pub fn frame_intact(key: KeyId, action_byte: u8) -> bool {
    let payload = key.bit_sum() + bit_sum(action_byte & !CHECKSUM_MASK);
    payload % 2 == 1 && ActionByte::from_bytes([action_byte]).checksum() == payload
}

/// Receiver side construction of a confirmation byte. `checksum` is the bit
/// count of the received frame; the parity bit is filled in here.
pub fn encode_confirmation(checksum: u8, status: DeviceStatus, error: bool) -> u8 {
    let mut byte = ConfirmByte::new()
        .with_checksum(checksum & CHECKSUM_MASK)
        .with_led(status.led_on)
        .with_switch(status.switch_on)
        .with_error(error);

    if bit_sum(byte.into_bytes()[0]) % 2 == 0 {
        byte.set_parity(true);
    }
    byte.into_bytes()[0]
}

/// Bit count of a frame as the receiver echoes it.
pub fn frame_bit_sum(key: KeyId, action_byte: u8) -> u8 {
    key.bit_sum() + bit_sum(action_byte)
}
