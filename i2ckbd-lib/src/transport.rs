//! Byte oriented bus access used by the session.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use thiserror::Error;

/// Blocking single byte access to a device on a shared bus.
///
/// Implementations report any failed transfer as `Err`; the session decides
/// whether to retry.
pub trait Transport {
    /// Error type for bus operations
    type Error: std::error::Error;

    /// Write one byte to the device at `address`
    fn write_byte(&mut self, address: u8, byte: u8) -> Result<(), Self::Error>;

    /// Read one byte from the device at `address`
    fn read_byte(&mut self, address: u8) -> Result<u8, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn write_byte(&mut self, address: u8, byte: u8) -> Result<(), Self::Error> {
        (**self).write_byte(address, byte)
    }

    fn read_byte(&mut self, address: u8) -> Result<u8, Self::Error> {
        (**self).read_byte(address)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("I2C bus error: {kind}")]
pub struct BusError {
    pub kind: ErrorKind,
}

/// Adapts any `embedded-hal` I2C master to [`Transport`].
pub struct I2cTransport<I> {
    bus: I,
}

impl<I: I2c> I2cTransport<I> {
    pub fn new(bus: I) -> Self {
        Self { bus }
    }

    pub fn into_inner(self) -> I {
        self.bus
    }
}

impl<I: I2c> Transport for I2cTransport<I> {
    type Error = BusError;

    fn write_byte(&mut self, address: u8, byte: u8) -> Result<(), Self::Error> {
        self.bus
            .write(address, &[byte])
            .map_err(|e| BusError { kind: e.kind() })
    }

    fn read_byte(&mut self, address: u8) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.bus
            .read(address, &mut buf)
            .map_err(|e| BusError { kind: e.kind() })?;
        Ok(buf[0])
    }
}
