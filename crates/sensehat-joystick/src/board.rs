//! Board attach configuration
//!
//! The stock kernel driver gets its wiring from the device tree overlay;
//! here the same parameters come from a TOML board profile, with compiled-in
//! defaults matching the real Sense HAT.

use crate::JoystickError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default board profile locations
pub const CONFIG_PATH: &str = "/etc/sensehat/joystick.toml";

/// Wiring of the joystick on the add-on board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// i2c-dev character device the board hangs off
    #[serde(default = "default_i2c_bus")]
    pub i2c_bus: PathBuf,

    /// Peripheral address of the board controller
    #[serde(default = "default_i2c_address")]
    pub i2c_address: u16,

    /// Register holding the live button bitfield
    #[serde(default = "default_joystick_register")]
    pub joystick_register: u8,

    /// GPIO line the board asserts when joystick data is ready
    #[serde(default = "default_irq_gpio")]
    pub irq_gpio: u32,
}

fn default_i2c_bus() -> PathBuf {
    PathBuf::from("/dev/i2c-1")
}

fn default_i2c_address() -> u16 {
    0x46
}

fn default_joystick_register() -> u8 {
    0xF2
}

fn default_irq_gpio() -> u32 {
    23
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            i2c_bus: default_i2c_bus(),
            i2c_address: default_i2c_address(),
            joystick_register: default_joystick_register(),
            irq_gpio: default_irq_gpio(),
        }
    }
}

impl BoardConfig {
    /// Load a board profile from a file.
    ///
    /// A file that exists but does not parse is fatal; a board wired
    /// differently than its profile claims must never reach the interrupt
    /// path.
    pub fn load(path: &Path) -> Result<Self, JoystickError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| JoystickError::ConfigParse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the standard location, falling back to the compiled-in
    /// Sense HAT defaults when no profile is present.
    pub fn load_default() -> Result<Self, JoystickError> {
        let path = Path::new(CONFIG_PATH);
        if path.exists() {
            return Self::load(path);
        }

        tracing::warn!("No board profile at {CONFIG_PATH}, using Sense HAT defaults");
        Ok(Self::default())
    }

    fn validate(&self) -> Result<(), JoystickError> {
        // 7-bit addressing; anything above cannot be bound via I2C_SLAVE
        if self.i2c_address > 0x7F {
            return Err(JoystickError::InvalidConfig(format!(
                "i2c_address {:#06x} out of 7-bit range",
                self.i2c_address
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_sense_hat_wiring() {
        let config = BoardConfig::default();
        assert_eq!(config.i2c_bus, PathBuf::from("/dev/i2c-1"));
        assert_eq!(config.i2c_address, 0x46);
        assert_eq!(config.joystick_register, 0xF2);
        assert_eq!(config.irq_gpio, 23);
    }

    #[test]
    fn test_partial_profile_fills_defaults() {
        let config: BoardConfig = toml::from_str("irq_gpio = 17").unwrap();
        assert_eq!(config.irq_gpio, 17);
        assert_eq!(config.joystick_register, 0xF2);
    }

    #[test]
    fn test_round_trip() {
        let config = BoardConfig::default();
        let toml_str = toml::to_string(&config).expect("Failed to serialize");
        let parsed: BoardConfig = toml::from_str(&toml_str).expect("Failed to deserialize");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_address_out_of_range_rejected() {
        let config = BoardConfig {
            i2c_address: 0x1FF,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(JoystickError::InvalidConfig(_))
        ));
    }
}
