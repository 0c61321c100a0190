pub mod constants;
pub mod error;
pub mod frame;
pub mod keycodes;
pub mod keymap;
pub mod session;
pub mod transport;

#[cfg(test)]
mod tests;

// Re-export the types most callers need
pub use error::KbdError;
pub use frame::{ActionKind, DeviceStatus, FrameError, FrameFault, KeyId, LedState};
pub use keymap::{KeyMap, KeyStroke};
pub use session::{ActionOutcome, Session, SessionConfig, SpeedTestReport};
pub use transport::{BusError, I2cTransport, Transport};
