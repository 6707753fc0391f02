//! Port traits: the hexagonal boundary between the motor logic and the board.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MotorController / Dispenser (domain)
//! ```
//!
//! Driven adapters (GPIO backends, config stores) implement these traits.
//! The [`MotorController`](crate::drivers::motor::MotorController) consumes
//! them via generics, so the domain core never touches hardware directly.
//!
//! ## Ownership notes
//!
//! - A [`GpioPort`] is a *handle*: cloning it yields another handle onto the
//!   same board.  The process owns the board through a
//!   [`GpioSession`](crate::drivers::session::GpioSession); controllers hold
//!   clones.
//! - A [`PwmChannel`] is owned by exactly one controller.  Dropping it
//!   releases the pin's PWM slot.
//! - All port errors are typed; callers must handle every variant explicitly.

use crate::config::AppConfig;

// ───────────────────────────────────────────────────────────────
// GPIO port (driven adapter: domain → pins)
// ───────────────────────────────────────────────────────────────

/// Digital-output and PWM primitives of a GPIO subsystem.
pub trait GpioPort {
    /// PWM channel type produced by [`create_pwm`](Self::create_pwm).
    type Pwm: PwmChannel;

    /// Configure `pin` as a push-pull digital output.
    fn configure_output(&mut self, pin: u8) -> Result<(), GpioError>;

    /// Drive a configured output HIGH.
    fn set_high(&mut self, pin: u8) -> Result<(), GpioError>;

    /// Drive a configured output LOW.
    fn set_low(&mut self, pin: u8) -> Result<(), GpioError>;

    /// Bind a PWM channel to a configured output.  The channel is idle
    /// until [`PwmChannel::start`] is called.
    fn create_pwm(&mut self, pin: u8, frequency_hz: f64) -> Result<Self::Pwm, GpioError>;

    /// Stop every PWM channel and release every pin configured through
    /// this board.  Invoked once by the session owner, never by drivers.
    fn cleanup(&mut self);
}

/// One PWM output bound to a pin.
///
/// Duty cycles are percentages in `0.0..=100.0`; frequencies are in Hz.
pub trait PwmChannel {
    /// Begin generating pulses at `duty_percent`.
    fn start(&mut self, duty_percent: f64) -> Result<(), GpioError>;

    /// Stop generating pulses; the pin rests LOW.  Safe on an idle channel.
    fn stop(&mut self) -> Result<(), GpioError>;

    /// Change the duty cycle, effective immediately if running.
    fn change_duty_cycle(&mut self, duty_percent: f64) -> Result<(), GpioError>;

    /// Change the pulse frequency, effective immediately if running.
    fn change_frequency(&mut self, frequency_hz: f64) -> Result<(), GpioError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists application configuration.
///
/// Implementations MUST validate before persisting.  Invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    /// Load configuration.  Returns [`ConfigError::NotFound`] when nothing
    /// is stored yet; the caller decides whether defaults are acceptable.
    fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Hardware / driver faults reported by a [`GpioPort`] or [`PwmChannel`].
///
/// None of these are retried.  They propagate to the process boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// The pin number does not exist on this board.
    PinUnavailable(u8),
    /// The pin was driven before being configured as an output, or after
    /// the board was cleaned up.
    NotConfigured(u8),
    /// The pin is already claimed (another process, or a live PWM channel).
    PinBusy(u8),
    /// The GPIO device could not be opened (permissions, missing driver).
    AccessDenied,
    /// A PWM channel operation failed on the given pin.
    PwmFailed(u8),
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first run).
    NotFound,
    /// Stored config failed to deserialize.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for GpioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PinUnavailable(pin) => write!(f, "GPIO {} not available", pin),
            Self::NotConfigured(pin) => write!(f, "GPIO {} not configured as output", pin),
            Self::PinBusy(pin) => write!(f, "GPIO {} already in use", pin),
            Self::AccessDenied => write!(f, "GPIO access denied"),
            Self::PwmFailed(pin) => write!(f, "PWM on GPIO {} failed", pin),
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for GpioError {}
impl std::error::Error for ConfigError {}
