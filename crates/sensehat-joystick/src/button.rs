//! Joystick buttons and the bit-index keymap
//!
//! The board latches the joystick as a five-bit field, one bit per physical
//! direction of the stick plus the center press.

/// Number of buttons in the state register
pub const BUTTON_COUNT: usize = 5;

/// Mask selecting the meaningful low bits of the state register; anything
/// above is undefined and must be ignored.
pub const STATE_MASK: u8 = (1 << BUTTON_COUNT) - 1;

/// Bit index -> logical button, fixed by the board's register layout.
pub const KEYMAP: [Button; BUTTON_COUNT] = [
    Button::Down,
    Button::Right,
    Button::Up,
    Button::Select,
    Button::Left,
];

/// Joystick buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Down,
    Right,
    Up,
    Select,
    Left,
}

impl Button {
    /// Get all joystick buttons in register bit order
    pub fn all() -> &'static [Button] {
        &KEYMAP
    }

    /// Get button name
    pub fn name(&self) -> &'static str {
        match self {
            Button::Down => "down",
            Button::Right => "right",
            Button::Up => "up",
            Button::Select => "select",
            Button::Left => "left",
        }
    }

    /// Button for a state-register bit index
    pub fn from_bit(index: usize) -> Option<Button> {
        KEYMAP.get(index).copied()
    }

    /// Bit index of this button in the state register
    pub fn bit(&self) -> usize {
        match self {
            Button::Down => 0,
            Button::Right => 1,
            Button::Up => 2,
            Button::Select => 3,
            Button::Left => 4,
        }
    }
}
