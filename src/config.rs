//! Application configuration parameters
//!
//! All tunable parameters for the feeder.  Every struct uses
//! `#[serde(default)]`, so a config file only needs the fields it changes;
//! the rest fall back to the values in [`crate::pins`].

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::pins;

/// Logical role of an H-bridge control pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinRole {
    In1,
    In2,
    Enable,
}

impl PinRole {
    pub const ALL: [PinRole; 3] = [PinRole::In1, PinRole::In2, PinRole::Enable];
}

/// Mapping from pin role to BCM pin number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinRoles {
    pub in_1: u8,
    pub in_2: u8,
    pub enable: u8,
}

impl Default for PinRoles {
    fn default() -> Self {
        Self {
            in_1: pins::MOTOR_IN_1_GPIO,
            in_2: pins::MOTOR_IN_2_GPIO,
            enable: pins::MOTOR_ENABLE_GPIO,
        }
    }
}

impl PinRoles {
    pub fn pin(&self, role: PinRole) -> u8 {
        match role {
            PinRole::In1 => self.in_1,
            PinRole::In2 => self.in_2,
            PinRole::Enable => self.enable,
        }
    }

    /// Return a copy with one role re-assigned.
    pub fn with(mut self, role: PinRole, pin: u8) -> Self {
        match role {
            PinRole::In1 => self.in_1 = pin,
            PinRole::In2 => self.in_2 = pin,
            PinRole::Enable => self.enable = pin,
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if PinRole::ALL.iter().any(|&r| self.pin(r) > pins::MAX_BCM_GPIO) {
            return Err(ConfigError::ValidationFailed("pins must be BCM 0-27"));
        }
        if self.in_1 == self.in_2 || self.in_1 == self.enable || self.in_2 == self.enable {
            return Err(ConfigError::ValidationFailed(
                "in_1, in_2 and enable must be distinct pins",
            ));
        }
        Ok(())
    }
}

/// Motor controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorConfig {
    pub pins: PinRoles,
    /// Drive the enable pin with PWM instead of holding it HIGH.
    pub use_pwm: bool,
    /// Initial PWM duty cycle (0-100%).
    pub speed_percent: f64,
    /// Initial PWM frequency in Hz.
    pub frequency_hz: f64,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            pins: PinRoles::default(),
            use_pwm: false,
            speed_percent: pins::DEFAULT_SPEED_PERCENT,
            frequency_hz: pins::DEFAULT_PWM_FREQ_HZ,
        }
    }
}

impl MotorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pins.validate()?;
        validate_speed(self.speed_percent, "motor.speed_percent must be 0-100")?;
        validate_frequency(self.frequency_hz, "motor.frequency_hz must be > 0")
    }
}

/// Timed-dispense preset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispenserConfig {
    /// PWM frequency applied to the dispenser motor (Hz).
    pub frequency_hz: f64,
    /// PWM duty cycle applied to the dispenser motor (0-100%).
    pub speed_percent: f64,
    /// Default feed duration when none is given on the command line.
    pub feed_secs: u32,
}

impl Default for DispenserConfig {
    fn default() -> Self {
        Self {
            frequency_hz: pins::DISPENSER_PWM_FREQ_HZ,
            speed_percent: pins::DISPENSER_SPEED_PERCENT,
            feed_secs: pins::DISPENSER_FEED_SECS,
        }
    }
}

impl DispenserConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_speed(self.speed_percent, "dispenser.speed_percent must be 0-100")?;
        validate_frequency(self.frequency_hz, "dispenser.frequency_hz must be > 0")
    }
}

/// Root of the config file.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub motor: MotorConfig,
    pub dispenser: DispenserConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.motor.validate()?;
        self.dispenser.validate()
    }
}

fn validate_speed(value: f64, msg: &'static str) -> Result<(), ConfigError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ValidationFailed(msg))
    }
}

fn validate_frequency(value: f64, msg: &'static str) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::ValidationFailed(msg))
    }
}
