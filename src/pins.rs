//! GPIO pin assignments for the feeder motor board.
//!
//! Single source of truth for default pin numbers and PWM presets.  Every
//! default in [`crate::config`] references this module rather than
//! hard-coding numbers.  Pin numbers use the Broadcom (BCM) scheme, not
//! physical header positions.

// ---------------------------------------------------------------------------
// H-bridge motor driver (L293D / L298N style, one channel)
// ---------------------------------------------------------------------------

/// Direction input 1: HIGH with IN2 LOW = forward.
pub const MOTOR_IN_1_GPIO: u8 = 17;
/// Direction input 2: HIGH with IN1 LOW = backward.
pub const MOTOR_IN_2_GPIO: u8 = 4;
/// Bridge enable: gates drive current, either held HIGH or driven by PWM.
pub const MOTOR_ENABLE_GPIO: u8 = 18;

/// Highest BCM pin routed to the 40-pin header.
pub const MAX_BCM_GPIO: u8 = 27;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// Duty cycle applied when no speed was ever set (full power).
pub const DEFAULT_SPEED_PERCENT: f64 = 100.0;
/// Software PWM frequency for the enable line.
pub const DEFAULT_PWM_FREQ_HZ: f64 = 300.0;

// ---------------------------------------------------------------------------
// Dispenser preset
// ---------------------------------------------------------------------------

/// The auger is pulsed rather than spun: one PWM period per second.
pub const DISPENSER_PWM_FREQ_HZ: f64 = 1.0;
/// High share of each dispenser pulse.
pub const DISPENSER_SPEED_PERCENT: f64 = 85.0;
/// Default run time for a single feed.
pub const DISPENSER_FEED_SECS: u32 = 4;
