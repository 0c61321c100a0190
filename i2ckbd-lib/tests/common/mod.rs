//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use i2ckbd_lib::constants::*;
#[allow(unused_imports)]
pub use i2ckbd_lib::error::{KbdError, Stage};
#[allow(unused_imports)]
pub use i2ckbd_lib::frame::{
    ActionKind, DeviceStatus, FrameFault, KeyId, LedState, encode_confirmation, encode_frame, frame_bit_sum,
    frame_intact,
};
#[allow(unused_imports)]
pub use i2ckbd_lib::keycodes::*;
#[allow(unused_imports)]
pub use i2ckbd_lib::keymap::{KeyMap, KeyStroke};
#[allow(unused_imports)]
pub use i2ckbd_lib::session::{Session, SessionConfig};
#[allow(unused_imports)]
pub use i2ckbd_lib::transport::Transport;

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("simulated bus error")]
pub struct SimulatedBusError;

/// Emulates the Arduino side of the protocol, with injectable bus faults.
///
/// Before the first successful write every read returns the identity byte.
/// After a complete frame the next read returns its confirmation.
#[derive(Debug)]
pub struct FakeKeyboard {
    pub address: u8,
    pub identity: u8,
    pub switch_on: bool,
    pub led_on: bool,
    /// Set the error bit in every confirmation
    pub report_error: bool,

    /// Upcoming key id writes that fail
    pub fail_key_writes: usize,
    /// Upcoming action byte writes that fail
    pub fail_action_writes: usize,
    /// Fail every n-th action byte write (0 disables)
    pub fail_every_nth_action_write: usize,
    /// Upcoming reads that fail
    pub fail_reads: usize,
    /// Upcoming confirmations with bit 0 flipped
    pub corrupt_confirms: usize,

    pub write_attempts: usize,
    pub read_attempts: usize,
    pub action_write_attempts: usize,
    /// Every complete frame received, in order
    pub frames: Vec<(KeyId, u8)>,

    written: bool,
    pending_key: Option<u8>,
    confirm: Option<u8>,
}

impl FakeKeyboard {
    pub fn new() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            identity: DEVICE_ID,
            switch_on: false,
            led_on: false,
            report_error: false,
            fail_key_writes: 0,
            fail_action_writes: 0,
            fail_every_nth_action_write: 0,
            fail_reads: 0,
            corrupt_confirms: 0,
            write_attempts: 0,
            read_attempts: 0,
            action_write_attempts: 0,
            frames: Vec::new(),
            written: false,
            pending_key: None,
            confirm: None,
        }
    }

    pub fn with_switch(switch_on: bool) -> Self {
        Self {
            switch_on,
            ..Self::new()
        }
    }

    /// Frames received after the first `skip`, decoded to (key, action).
    pub fn actions_since(&self, skip: usize) -> Vec<(KeyId, ActionKind)> {
        self.frames
            .iter()
            .skip(skip)
            .map(|(key, action_byte)| {
                let action = ActionKind::try_from((action_byte & ACTION_MASK) >> 4).expect("2-bit action code");
                (*key, action)
            })
            .collect()
    }

    fn receive_frame(&mut self, key: KeyId, action_byte: u8) {
        let intact = frame_intact(key, action_byte);
        if intact {
            self.led_on = action_byte & LED_BIT != 0;
        }
        let status = DeviceStatus {
            switch_on: self.switch_on,
            led_on: self.led_on,
        };
        let mut confirm = encode_confirmation(frame_bit_sum(key, action_byte), status, !intact || self.report_error);
        if self.corrupt_confirms > 0 {
            self.corrupt_confirms -= 1;
            confirm ^= 0b0000_0001;
        }
        self.frames.push((key, action_byte));
        self.confirm = Some(confirm);
    }
}

impl Transport for FakeKeyboard {
    type Error = SimulatedBusError;

    fn write_byte(&mut self, address: u8, byte: u8) -> Result<(), Self::Error> {
        self.write_attempts += 1;
        if address != self.address {
            return Err(SimulatedBusError);
        }
        match self.pending_key.take() {
            None => {
                if self.fail_key_writes > 0 {
                    self.fail_key_writes -= 1;
                    return Err(SimulatedBusError);
                }
                self.written = true;
                self.pending_key = Some(byte);
            }
            Some(key) => {
                // A failed second byte drops the half frame on the device as well.
                self.action_write_attempts += 1;
                if self.fail_action_writes > 0 {
                    self.fail_action_writes -= 1;
                    return Err(SimulatedBusError);
                }
                let n = self.fail_every_nth_action_write;
                if n > 0 && self.action_write_attempts % n == 0 {
                    return Err(SimulatedBusError);
                }
                self.receive_frame(KeyId(key), byte);
            }
        }
        Ok(())
    }

    fn read_byte(&mut self, address: u8) -> Result<u8, Self::Error> {
        self.read_attempts += 1;
        if address != self.address {
            return Err(SimulatedBusError);
        }
        if self.fail_reads > 0 {
            self.fail_reads -= 1;
            return Err(SimulatedBusError);
        }
        if !self.written {
            return Ok(self.identity);
        }
        // No frame to confirm: zero fails both the checksum and the parity check.
        Ok(self.confirm.take().unwrap_or(0))
    }
}

#[allow(dead_code)]
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Session over `keyboard` without any sleeping.
#[allow(dead_code)]
pub fn session(keyboard: FakeKeyboard) -> Session<FakeKeyboard> {
    init_logging();
    Session::with_config(keyboard, DEFAULT_ADDRESS, SessionConfig::default().without_delays())
}
