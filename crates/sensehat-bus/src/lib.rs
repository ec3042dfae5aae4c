//! Register-mapped bus access for the Sense HAT add-on board
//!
//! The board exposes its state as an 8-bit address space of 8-bit registers
//! behind an I2C peripheral. Everything above this crate talks in terms of
//! the [`RegisterBus`] trait; the real transport lives in [`i2c`] and a
//! hardware-free stand-in for development and testing lives in [`mock`].

pub mod i2c;
pub mod mock;

pub use i2c::I2cBus;
pub use mock::{MockBus, MockBusState};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("Failed to open bus device {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to bind peripheral address {address:#04x}: {source}")]
    Bind {
        address: u16,
        source: std::io::Error,
    },

    #[error("Peripheral did not acknowledge (address {address:#04x})")]
    Nack { address: u16 },

    #[error("Bus transaction timed out")]
    Timeout,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bus Result type
pub type Result<T> = std::result::Result<T, BusError>;

/// A byte-addressed register bus.
///
/// One operation: read the byte currently latched at a register. Failures
/// surface as [`BusError`]; no retry is performed at this layer, so a caller
/// that wants a retry policy owns it.
pub trait RegisterBus {
    fn read(&mut self, register: u8) -> Result<u8>;
}
