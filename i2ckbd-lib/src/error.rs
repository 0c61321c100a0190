use std::io;
use strum_macros::Display;
use thiserror::Error;

/// Step of a round trip at which the bus gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stage {
    #[strum(to_string = "writing action byte")]
    WriteAction,
    #[strum(to_string = "reading confirmation")]
    ReadConfirmation,
}

/// The primary error type for the `i2ckbd` library.
#[derive(Error, Debug)]
pub enum KbdError {
    #[error("No verified i2ckeyboard on address {address:#04x}. Is the Arduino connected?")]
    NotVerified { address: u8 },

    #[error("Transport aborted while {stage}: {message}")]
    TransportAborted { stage: Stage, message: String },

    #[error("Keyboard is set to sending keys. Disable the hardware switch first!")]
    SwitchEnabled,

    #[error("Could not read the state of the keyboard's hardware switch")]
    SwitchStateUnknown,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid key map: {0}")]
    KeyMap(#[from] serde_json::Error),

    #[error("Invalid key stroke: {0}")]
    InvalidKeyStroke(String),
}

impl KbdError {
    pub(crate) fn aborted(stage: Stage, source: impl std::error::Error) -> Self {
        KbdError::TransportAborted {
            stage,
            message: source.to_string(),
        }
    }
}
