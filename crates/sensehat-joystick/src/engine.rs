//! Joystick state engine
//!
//! One snapshot of prior button state, one operation: on each "data ready"
//! interrupt, read the state register, XOR against the previous snapshot,
//! and report exactly the buttons whose state changed.

use crate::button::{BUTTON_COUNT, KEYMAP, STATE_MASK};
use crate::sink::EventSink;
use sensehat_bus::RegisterBus;

/// Result of one interrupt invocation, reported back to whoever armed the
/// interrupt line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    Handled,
    NotHandled,
}

/// State-change detector for the five-way joystick.
///
/// Invocations of [`handle_interrupt`](Self::handle_interrupt) must be
/// serialized per engine instance; the single watcher thread driving a
/// single consumer loop guarantees that here, so the snapshot needs no
/// further synchronization.
///
/// The initial snapshot is all-released, so the very first interrupt after
/// attach reports any button already held down as a fresh press. That is
/// accepted boundary behavior: the board has no way to tell us how long a
/// bit has been set.
pub struct JoystickEngine<B: RegisterBus, S: EventSink> {
    bus: B,
    sink: S,
    state_register: u8,
    prev_states: u8,
}

impl<B: RegisterBus, S: EventSink> JoystickEngine<B, S> {
    pub fn new(bus: B, state_register: u8, sink: S) -> Self {
        Self {
            bus,
            sink,
            state_register,
            prev_states: 0,
        }
    }

    /// Run one state-transition step.
    ///
    /// On a bus failure the previous snapshot is left untouched, so the
    /// next interrupt diffs against the last known-good state. Without
    /// that, a transient fault would reset the reference state and every
    /// held button would be re-reported as pressed on the next read.
    pub fn handle_interrupt(&mut self) -> HandlerOutcome {
        let keys = match self.bus.read(self.state_register) {
            Ok(keys) => keys,
            Err(err) => {
                tracing::error!("Failed to read joystick state: {err}");
                return HandlerOutcome::NotHandled;
            }
        };

        let curr_states = keys & STATE_MASK;
        let changes = curr_states ^ self.prev_states;

        for (i, button) in KEYMAP.iter().enumerate() {
            if changes & (1 << i) != 0 {
                let pressed = curr_states & (1 << i) != 0;
                tracing::debug!("Button {} -> {}", button.name(), pressed);
                self.sink.report_key(*button, pressed);
            }
        }
        self.sink.sync();

        self.prev_states = curr_states;
        HandlerOutcome::Handled
    }

    /// Last successfully read snapshot, masked to the button bits.
    pub fn prev_states(&self) -> u8 {
        self.prev_states
    }

    /// Register holding the live button bitfield.
    pub fn state_register(&self) -> u8 {
        self.state_register
    }
}

// Width sanity: the mask and the keymap must agree.
const _: () = assert!(STATE_MASK.count_ones() as usize == BUTTON_COUNT);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::Button;
    use crate::sink::JoystickEvent;
    use sensehat_bus::MockBus;
    use std::cell::RefCell;
    use std::rc::Rc;

    const REG: u8 = 0xF2;

    /// Sink recording every call in order, inspectable while the engine
    /// still owns its half
    #[derive(Default, Clone)]
    struct RecordingSink {
        events: Rc<RefCell<Vec<JoystickEvent>>>,
    }

    impl RecordingSink {
        fn events(&self) -> Vec<JoystickEvent> {
            self.events.borrow().clone()
        }

        fn clear(&self) {
            self.events.borrow_mut().clear();
        }
    }

    impl EventSink for RecordingSink {
        fn report_key(&mut self, button: Button, pressed: bool) {
            self.events
                .borrow_mut()
                .push(JoystickEvent::Key { button, pressed });
        }

        fn sync(&mut self) {
            self.events.borrow_mut().push(JoystickEvent::Sync);
        }
    }

    fn key(button: Button, pressed: bool) -> JoystickEvent {
        JoystickEvent::Key { button, pressed }
    }

    #[test]
    fn test_noop_interrupt_syncs_only() {
        let bus = MockBus::new();
        bus.set_register(REG, 0b00000);
        let sink = RecordingSink::default();

        let mut engine = JoystickEngine::new(bus, REG, sink.clone());
        assert_eq!(engine.handle_interrupt(), HandlerOutcome::Handled);
        assert_eq!(engine.handle_interrupt(), HandlerOutcome::Handled);

        // Two identical reads: zero key events, one sync per invocation
        assert_eq!(sink.events(), vec![JoystickEvent::Sync, JoystickEvent::Sync]);
    }

    #[test]
    fn test_single_bit_press() {
        let bus = MockBus::new();
        bus.set_register(REG, 0b00010);
        let sink = RecordingSink::default();

        let mut engine = JoystickEngine::new(bus, REG, sink.clone());
        assert_eq!(engine.handle_interrupt(), HandlerOutcome::Handled);

        assert_eq!(
            sink.events(),
            vec![key(Button::Right, true), JoystickEvent::Sync]
        );
    }

    #[test]
    fn test_multi_bit_change_ascending_order() {
        let bus = MockBus::new();
        bus.set_register(REG, 0b00001);
        let sink = RecordingSink::default();

        let mut engine = JoystickEngine::new(bus, REG, sink.clone());
        engine.handle_interrupt();
        sink.clear();

        // Down released, Right and Up pressed in the same frame
        engine.bus.set_register(REG, 0b00110);
        assert_eq!(engine.handle_interrupt(), HandlerOutcome::Handled);

        assert_eq!(
            sink.events(),
            vec![
                key(Button::Down, false),
                key(Button::Right, true),
                key(Button::Up, true),
                JoystickEvent::Sync,
            ]
        );
    }

    #[test]
    fn test_failure_preserves_snapshot() {
        let bus = MockBus::new();
        bus.set_register(REG, 0b00001);
        let sink = RecordingSink::default();

        let mut engine = JoystickEngine::new(bus, REG, sink.clone());
        engine.handle_interrupt();
        sink.clear();

        engine.bus.fail_next_reads(1);
        assert_eq!(engine.handle_interrupt(), HandlerOutcome::NotHandled);
        assert!(sink.events().is_empty());
        assert_eq!(engine.prev_states(), 0b00001);

        // The next successful read diffs against the last known-good state
        engine.bus.set_register(REG, 0b00011);
        assert_eq!(engine.handle_interrupt(), HandlerOutcome::Handled);
        assert_eq!(
            sink.events(),
            vec![key(Button::Right, true), JoystickEvent::Sync]
        );
    }

    #[test]
    fn test_garbage_high_bits_masked() {
        let bus = MockBus::new();
        bus.set_register(REG, 0b1110_0001);
        let sink = RecordingSink::default();

        let mut engine = JoystickEngine::new(bus, REG, sink.clone());
        assert_eq!(engine.handle_interrupt(), HandlerOutcome::Handled);

        assert_eq!(
            sink.events(),
            vec![key(Button::Down, true), JoystickEvent::Sync]
        );
        assert_eq!(engine.prev_states(), 0b00001);

        // Same low bits, different garbage: no change reported
        sink.clear();
        engine.bus.set_register(REG, 0b1010_0001);
        engine.handle_interrupt();
        assert_eq!(sink.events(), vec![JoystickEvent::Sync]);
    }

    #[test]
    fn test_initial_snapshot_is_all_released() {
        let bus = MockBus::new();
        bus.set_register(REG, 0b00001);
        let sink = RecordingSink::default();

        // Button held before attach: exactly one press event, nothing else
        let mut engine = JoystickEngine::new(bus, REG, sink.clone());
        assert_eq!(engine.prev_states(), 0);
        engine.handle_interrupt();

        assert_eq!(
            sink.events(),
            vec![key(Button::Down, true), JoystickEvent::Sync]
        );
    }

    #[test]
    fn test_release_all_buttons() {
        let bus = MockBus::new();
        bus.set_register(REG, STATE_MASK);
        let sink = RecordingSink::default();

        let mut engine = JoystickEngine::new(bus, REG, sink.clone());
        engine.handle_interrupt();
        sink.clear();

        engine.bus.set_register(REG, 0);
        engine.handle_interrupt();

        assert_eq!(
            sink.events(),
            vec![
                key(Button::Down, false),
                key(Button::Right, false),
                key(Button::Up, false),
                key(Button::Select, false),
                key(Button::Left, false),
                JoystickEvent::Sync,
            ]
        );
    }
}
