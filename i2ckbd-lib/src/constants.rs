// Protocol constants for the I2C keyboard

use std::time::Duration;

/// Byte the device answers with when it is read before any frame was written
pub const DEVICE_ID: u8 = 0b1000_0010;

/// Default bus address of the keyboard
pub const DEFAULT_ADDRESS: u8 = 0x10;

/// Default I2C character device (bus 1 on current Raspberry Pi models)
pub const DEFAULT_BUS: &str = "/dev/i2c-1";

/// Action byte: low nibble carrying the checksum
pub const CHECKSUM_MASK: u8 = 0b0000_1111;

/// Action byte: bits 4-5 carrying the action code
pub const ACTION_MASK: u8 = 0b0011_0000;

/// Action byte: LED request bit
pub const LED_BIT: u8 = 0b0100_0000;

/// Action byte: odd parity bit
pub const PARITY_BIT: u8 = 0b1000_0000;

/// Confirmation byte: current LED state
pub const CONFIRM_LED_BIT: u8 = 0b0001_0000;

/// Confirmation byte: current state of the hardware enable switch
pub const CONFIRM_SWITCH_BIT: u8 = 0b0010_0000;

/// Confirmation byte: device reported an error
pub const CONFIRM_ERROR_BIT: u8 = 0b0100_0000;

/// Attempts for bounded retry loops (verification, release-all, probes, speed test)
pub const RETRY_LIMIT: u32 = 10;

/// Sleep between two attempts of a retry loop
pub const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Pause between the key presses of one character
pub const KEYSTROKE_DELAY: Duration = Duration::from_millis(1);

/// Pause after releasing the keys of one character
pub const CHARACTER_DELAY: Duration = Duration::from_millis(1);
