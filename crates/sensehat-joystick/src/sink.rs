//! Event sink contract and the channel-backed implementation

use crate::Button;
use std::sync::mpsc::Sender;

/// Consumer of joystick key events.
///
/// Mirrors a generic key-event device: per-key state reports followed by a
/// sync marking a coherent frame boundary. Sink calls are infallible; a
/// consumer that has gone away is the consumer's problem, not the engine's.
pub trait EventSink {
    fn report_key(&mut self, button: Button, pressed: bool);
    fn sync(&mut self);
}

/// Events emitted by the joystick engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoystickEvent {
    /// One button changed state
    Key { button: Button, pressed: bool },
    /// Frame boundary, emitted once per handled interrupt
    Sync,
}

/// Sink forwarding events over an mpsc channel
pub struct ChannelSink {
    tx: Sender<JoystickEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<JoystickEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn report_key(&mut self, button: Button, pressed: bool) {
        let _ = self.tx.send(JoystickEvent::Key { button, pressed });
    }

    fn sync(&mut self) {
        let _ = self.tx.send(JoystickEvent::Sync);
    }
}
