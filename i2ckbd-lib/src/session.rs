use crate::constants::{CHARACTER_DELAY, DEVICE_ID, KEYSTROKE_DELAY, RETRY_BACKOFF, RETRY_LIMIT};
use crate::error::{KbdError, Stage};
use crate::frame::{ActionKind, DeviceStatus, FrameError, KeyId, LedState, encode_frame, validate_confirmation};
use crate::keymap::{KeyMap, KeyStroke};
use crate::transport::Transport;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Retry and pacing settings of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Attempts for bounded retry loops
    pub retry_limit: u32,
    /// Sleep after a failed attempt
    pub retry_backoff: Duration,
    /// Pause between the key presses of one character
    pub keystroke_delay: Duration,
    /// Pause after each typed character
    pub character_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            retry_limit: RETRY_LIMIT,
            retry_backoff: RETRY_BACKOFF,
            keystroke_delay: KEYSTROKE_DELAY,
            character_delay: CHARACTER_DELAY,
        }
    }
}

impl SessionConfig {
    pub fn with_retry_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    pub fn with_retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    pub fn with_keystroke_delay(mut self, keystroke_delay: Duration) -> Self {
        self.keystroke_delay = keystroke_delay;
        self
    }

    pub fn with_character_delay(mut self, character_delay: Duration) -> Self {
        self.character_delay = character_delay;
        self
    }

    /// Same retry limit, no sleeping at all
    pub fn without_delays(self) -> Self {
        self.with_retry_backoff(Duration::ZERO)
            .with_keystroke_delay(Duration::ZERO)
            .with_character_delay(Duration::ZERO)
    }
}

/// A round trip that made it through the bus. `result` tells whether the
/// device confirmed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub confirm: u8,
    pub result: Result<DeviceStatus, FrameError>,
}

impl ActionOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedTestReport {
    pub attempted: usize,
    pub completed: usize,
    pub elapsed: Duration,
}

impl SpeedTestReport {
    pub fn ms_per_action(&self) -> Option<f64> {
        (self.completed > 0).then(|| self.elapsed.as_secs_f64() * 1000.0 / self.completed as f64)
    }

    pub fn actions_per_second(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        (self.completed > 0 && secs > 0.0).then(|| self.completed as f64 / secs)
    }
}

impl fmt::Display for SpeedTestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} key actions in {:.2} ms",
            self.completed,
            self.attempted,
            self.elapsed.as_secs_f64() * 1000.0
        )?;
        if let (Some(ms), Some(rate)) = (self.ms_per_action(), self.actions_per_second()) {
            write!(f, " ({:.2} ms/keyaction, {:.2} keyactions/s)", ms, rate)?;
        }
        Ok(())
    }
}

/// Connection to an i2ckeyboard on one bus address.
///
/// Every operation needs a verified device. Verification runs once in the
/// constructor and again whenever [`Session::verify`] is called. Fresh switch
/// and LED state comes from [`Session::keyboard_enabled`].
pub struct Session<T> {
    transport: T,
    address: u8,
    config: SessionConfig,
    verified: bool,
    // The device answers reads with its identity only until the first write.
    written: bool,
    switch_enabled: bool,
    led_on: bool,
    pressed_keys: Vec<KeyId>,
}

impl<T: Transport> Session<T> {
    /// Open a session with the default retry settings and verify the device.
    pub fn new(transport: T, address: u8) -> Self {
        Self::with_config(transport, address, SessionConfig::default())
    }

    pub fn with_config(transport: T, address: u8, config: SessionConfig) -> Self {
        let mut session = Self {
            transport,
            address,
            config,
            verified: false,
            written: false,
            switch_enabled: false,
            led_on: false,
            pressed_keys: Vec::new(),
        };
        session.verify();
        session
    }

    /// Check that the address answers with [`DEVICE_ID`], then that a test
    /// frame makes it through.
    ///
    /// The identity byte is only readable before the first frame. Once this
    /// session has written to the device, `verify` skips the identity read and
    /// only re-sends the test frame.
    pub fn verify(&mut self) -> bool {
        self.verified = false;

        if self.written {
            debug!(
                "verify: address {:#04x} already received frames, re-sending the test frame only",
                self.address
            );
        } else if !self.check_identity() {
            return false;
        }

        // Armed before the test frame, key_action refuses unverified sessions.
        self.verified = true;
        match self.round_trip_with_retry(KeyId::NONE, ActionKind::Test, LedState::Off) {
            Ok(Some(outcome)) => {
                if outcome.is_ok() {
                    info!("verify: successfully verified i2ckeyboard on address {:#04x}!", self.address);
                } else {
                    warn!(
                        "verify: i2ckeyboard on address {:#04x} rejected the test frame ({:#010b})",
                        self.address, outcome.confirm
                    );
                }
            }
            _ => {
                self.verified = false;
                error!("verify: failed to verify i2ckeyboard on address {:#04x}!", self.address);
            }
        }
        self.verified
    }

    /// Send one frame and check the confirmation.
    ///
    /// Returns `Ok` for every round trip that completed on the bus, whether
    /// or not the device confirmed it; pressed keys and device flags are only
    /// updated for confirmed frames.
    pub fn key_action(&mut self, key: KeyId, action: ActionKind, led: LedState) -> Result<ActionOutcome, KbdError> {
        self.ensure_verified()?;

        let frame = encode_frame(key, action, led);
        self.write_key_id(key);

        if let Err(e) = self.transport.write_byte(self.address, frame.action_byte) {
            error!(
                "keyAction: Error writing 'action' {:#010b} to address {:#04x}!",
                frame.action_byte, self.address
            );
            return Err(KbdError::aborted(Stage::WriteAction, e));
        }

        let confirm = match self.transport.read_byte(self.address) {
            Ok(confirm) => confirm,
            Err(e) => {
                error!("keyAction: Error reading 'confirm' from address {:#04x}!", self.address);
                return Err(KbdError::aborted(Stage::ReadConfirmation, e));
            }
        };

        let result = validate_confirmation(key, frame.action_byte, confirm);
        match &result {
            Ok(status) => {
                debug!(%action, %led, "{} --> {:#010b} : {}", frame, confirm, status);
                self.apply(key, action, *status);
            }
            Err(e) => {
                warn!(%action, %led, "{} --> {:#010b} : {}", frame, confirm, e);
            }
        }

        Ok(ActionOutcome { confirm, result })
    }

    pub fn press(&mut self, key: KeyId) -> Result<ActionOutcome, KbdError> {
        self.key_action(key, ActionKind::Press, LedState::On)
    }

    pub fn release(&mut self, key: KeyId) -> Result<ActionOutcome, KbdError> {
        self.key_action(key, ActionKind::Release, LedState::On)
    }

    /// Release every key. `Ok(false)` when no attempt got through the bus.
    pub fn release_all(&mut self) -> Result<bool, KbdError> {
        let outcome = self.round_trip_with_retry(KeyId::NONE, ActionKind::ReleaseAll, LedState::On)?;
        Ok(outcome.is_some())
    }

    /// State of the hardware switch that gates key events to the HID host.
    /// `Ok(false)` when no test frame got through the bus.
    pub fn keyboard_enabled(&mut self) -> Result<bool, KbdError> {
        Ok(self.probe_switch()?.unwrap_or(false))
    }

    /// Type `text` using the sequences of `keymap`. Characters without a
    /// sequence are skipped. Returns the number of characters typed.
    pub fn send_text(&mut self, text: &str, keymap: &KeyMap) -> Result<usize, KbdError> {
        if !self.verified {
            warn!("sendText: Run verify() first to verify that an Arduino Keyboard is connected!");
        }
        self.ensure_verified()?;

        let mut typed = 0;
        for c in text.chars() {
            let strokes = match keymap.get(c) {
                Some(strokes) if !strokes.is_empty() => strokes,
                _ => {
                    warn!("sendText: Could not find {:?} in key map!", c);
                    continue;
                }
            };

            self.type_strokes(c, strokes)?;
            thread::sleep(self.config.character_delay);
            typed += 1;
        }
        Ok(typed)
    }

    /// Press the `strokes` typing `c` in order, then release every key.
    ///
    /// A press that aborts on the bus is logged and the sequence continues.
    pub fn type_strokes(&mut self, c: char, strokes: &[KeyStroke]) -> Result<(), KbdError> {
        self.ensure_verified()?;

        for stroke in strokes {
            match *stroke {
                KeyStroke::Key(key) => {
                    if let Err(e) = self.press(key) {
                        warn!("sendText: pressing key {} for {:?} failed: {}", key, c, e);
                    }
                }
                KeyStroke::ReleaseAll => {
                    self.release_keys_for(c)?;
                }
            }
            thread::sleep(self.config.keystroke_delay);
        }
        self.release_keys_for(c)
    }

    /// Run every action for every key id with both LED states and measure
    /// the throughput.
    ///
    /// Refuses to run unless the hardware switch is known to be off, since
    /// the test would otherwise hit the HID host with every key id. That
    /// includes the case where no test frame gets through: `keyboard_enabled`
    /// reports `false` there, while `speed_test` fails with
    /// [`KbdError::SwitchStateUnknown`].
    pub fn speed_test(&mut self) -> Result<SpeedTestReport, KbdError> {
        if !self.verified {
            warn!("i2cSpeedtest: Run verify() first to verify that an Arduino Keyboard is connected!");
        }
        self.ensure_verified()?;

        match self.probe_switch()? {
            Some(false) => {}
            Some(true) => {
                warn!("i2cSpeedtest: Keyboard is set to sending keys! Disable hardware switch for testing!");
                return Err(KbdError::SwitchEnabled);
            }
            None => {
                warn!("i2cSpeedtest: Could not read the hardware switch state!");
                return Err(KbdError::SwitchStateUnknown);
            }
        }

        info!("i2cSpeedtest: Starting test!");
        let mut attempted = 0;
        let mut completed = 0;
        let start = Instant::now();
        for led in LedState::ALL {
            for key in KeyId::all() {
                for action in ActionKind::ALL {
                    attempted += 1;
                    if self.round_trip_with_retry(key, action, led)?.is_some() {
                        completed += 1;
                    }
                }
            }
        }
        let report = SpeedTestReport {
            attempted,
            completed,
            elapsed: start.elapsed(),
        };

        info!(
            "i2cSpeedtest: Test duration: {:.2} ms",
            report.elapsed.as_secs_f64() * 1000.0
        );
        info!("i2cSpeedtest: Performed {} successful transmissions", report.completed);
        if let Some(ms) = report.ms_per_action() {
            info!("i2cSpeedtest: {:.2} ms/keyaction", ms);
        }
        if let Some(rate) = report.actions_per_second() {
            info!("i2cSpeedtest: {:.2} keyactions/s", rate);
        }
        Ok(report)
    }

    /// Keys pressed through this session and not released yet, in press order.
    pub fn pressed_keys(&self) -> &[KeyId] {
        &self.pressed_keys
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Switch state from the last confirmed frame.
    pub fn switch_enabled(&self) -> bool {
        self.switch_enabled
    }

    /// LED state from the last confirmed frame.
    pub fn led_on(&self) -> bool {
        self.led_on
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    fn check_identity(&mut self) -> bool {
        let mut device_id = None;
        let mut read_errors = 0;
        for _ in 0..self.config.retry_limit {
            match self.transport.read_byte(self.address) {
                Ok(byte) => {
                    device_id = Some(byte);
                    break;
                }
                Err(e) => {
                    read_errors += 1;
                    debug!("verify: read failed: {}", e);
                    thread::sleep(self.config.retry_backoff);
                }
            }
        }

        if read_errors > 0 {
            warn!(
                "verify: {}x : Error reading 'DEVICE_ID' from address {:#04x}!",
                read_errors, self.address
            );
        }

        match device_id {
            Some(DEVICE_ID) => true,
            Some(other) => {
                error!(
                    "verify: address {:#04x} answered {:#010b} instead of {:#010b}, failed to verify i2ckeyboard!",
                    self.address, other, DEVICE_ID
                );
                false
            }
            None => {
                error!("verify: failed to verify i2ckeyboard on address {:#04x}!", self.address);
                false
            }
        }
    }

    fn ensure_verified(&self) -> Result<(), KbdError> {
        if self.verified {
            Ok(())
        } else {
            Err(KbdError::NotVerified { address: self.address })
        }
    }

    // A frame without its key id byte shifts the device's byte pairing for
    // every following frame, so this write is retried until it succeeds.
    fn write_key_id(&mut self, key: KeyId) {
        let mut failures: u64 = 0;
        while let Err(e) = self.transport.write_byte(self.address, key.0) {
            failures += 1;
            warn!(
                failures,
                "keyAction: Error writing 'keyid' {:#010b} to address {:#04x}: {}", key.0, self.address, e
            );
            thread::sleep(self.config.retry_backoff);
        }
        self.written = true;
    }

    /// Repeat a key action until one attempt completes on the bus.
    /// `Ok(None)` when every attempt aborted.
    fn round_trip_with_retry(
        &mut self,
        key: KeyId,
        action: ActionKind,
        led: LedState,
    ) -> Result<Option<ActionOutcome>, KbdError> {
        for attempt in 1..=self.config.retry_limit {
            match self.key_action(key, action, led) {
                Ok(outcome) => return Ok(Some(outcome)),
                Err(e @ KbdError::NotVerified { .. }) => return Err(e),
                Err(e) => {
                    debug!(attempt, %action, "key {} aborted: {}", key, e);
                    if attempt < self.config.retry_limit {
                        thread::sleep(self.config.retry_backoff);
                    }
                }
            }
        }
        warn!(
            "{} of key {} failed {} times on address {:#04x}",
            action, key, self.config.retry_limit, self.address
        );
        Ok(None)
    }

    fn probe_switch(&mut self) -> Result<Option<bool>, KbdError> {
        let outcome = self.round_trip_with_retry(KeyId::NONE, ActionKind::Test, LedState::Off)?;
        Ok(outcome.map(|_| self.switch_enabled))
    }

    fn release_keys_for(&mut self, c: char) -> Result<(), KbdError> {
        if !self.release_all()? {
            warn!("sendText: releasing keys after {:?} failed!", c);
        }
        Ok(())
    }

    fn apply(&mut self, key: KeyId, action: ActionKind, status: DeviceStatus) {
        match action {
            ActionKind::Press => self.pressed_keys.push(key),
            ActionKind::Release => {
                if let Some(pos) = self.pressed_keys.iter().position(|k| *k == key) {
                    self.pressed_keys.remove(pos);
                }
            }
            ActionKind::ReleaseAll => self.pressed_keys.clear(),
            ActionKind::Test => {}
        }
        self.switch_enabled = status.switch_on;
        self.led_on = status.led_on;
        debug!("Pressed keys: {:?}", self.pressed_keys);
    }
}
