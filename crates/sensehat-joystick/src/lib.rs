//! Joystick state engine for the Sense HAT add-on board
//!
//! Turns "data ready" interrupts from the board into discrete press/release
//! events for the five-way joystick. On each interrupt the engine reads the
//! button bitfield register, diffs it against the last successfully read
//! snapshot, and reports exactly the buttons that changed.

mod board;
mod button;
mod engine;
mod irq;
mod sink;

pub use board::BoardConfig;
pub use button::{Button, KEYMAP, STATE_MASK};
pub use engine::{HandlerOutcome, JoystickEngine};
pub use irq::{Interrupt, IrqWatcher};
pub use sink::{ChannelSink, EventSink, JoystickEvent};

use std::path::PathBuf;
use thiserror::Error;

/// Input device identity, as registered by the board's stock kernel driver.
pub const DEVICE_NAME: &str = "Raspberry Pi Sense HAT Joystick";
pub const DEVICE_PHYS: &str = "sensehat-joystick/input0";

#[derive(Debug, Error)]
pub enum JoystickError {
    #[error("Bus error: {0}")]
    Bus(#[from] sensehat_bus::BusError),

    #[error("Invalid board configuration: {0}")]
    InvalidConfig(String),

    #[error("Interrupt line setup failed on GPIO {gpio}: {source}")]
    IrqSetup {
        gpio: u32,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse board configuration {0}")]
    ConfigParse(PathBuf, #[source] toml::de::Error),
}
