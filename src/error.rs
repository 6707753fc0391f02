//! Unified error type for the feeder crate.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! entry point's error boundary uniform.  All variants are `Copy`.
//!
//! Note what is *not* here: asking for a speed or frequency change while
//! PWM is disabled is a warning, reported through
//! [`ParamUpdate`](crate::drivers::motor::ParamUpdate), never an error.

use core::fmt;

use crate::app::ports::{ConfigError, GpioError};

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The GPIO subsystem reported a hardware or driver fault.
    Gpio(GpioError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// The operator interrupted the control sequence.
    Interrupted,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpio(e) => write!(f, "gpio: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpio(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Interrupted => None,
        }
    }
}

impl From<GpioError> for Error {
    fn from(e: GpioError) -> Self {
        Self::Gpio(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
