//! Command sequences run by the entry point.
//!
//! Each sequence owns its motor for the duration of the run and leaves it
//! stopped on every exit, including an operator abort.  The `aborted`
//! probe is polled after each wait; the delay is expected to return early
//! once an abort is requested.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::app::dispenser::Dispenser;
use crate::app::ports::GpioPort;
use crate::config::{DispenserConfig, MotorConfig, PinRoles};
use crate::drivers::motor::MotorController;
use crate::error::{Error, Result};

/// Wait between demo steps.
pub const DEMO_STEP_MS: u32 = 2000;

/// Non-PWM run: start, wait, toggle direction, wait, stop.
pub fn demo<G: GpioPort>(
    gpio: G,
    pins: PinRoles,
    delay: &mut impl DelayNs,
    aborted: impl Fn() -> bool,
) -> Result<()> {
    let mut motor = MotorController::new(
        gpio,
        &MotorConfig {
            pins,
            use_pwm: false,
            ..MotorConfig::default()
        },
    )?;

    motor.start(None)?;
    delay.delay_ms(DEMO_STEP_MS);
    if aborted() {
        return interrupt(|| motor.stop());
    }
    motor.toggle()?;
    delay.delay_ms(DEMO_STEP_MS);
    if aborted() {
        return interrupt(|| motor.stop());
    }
    motor.stop()?;
    info!("Demo finished");
    Ok(())
}

/// One timed dispenser feed.  `secs` and `speed` fall back to the preset.
pub fn feed<G: GpioPort>(
    gpio: G,
    pins: PinRoles,
    config: &DispenserConfig,
    secs: Option<u32>,
    speed: Option<f64>,
    delay: &mut impl DelayNs,
    aborted: impl Fn() -> bool,
) -> Result<()> {
    let mut dispenser = Dispenser::new(gpio, pins, config)?;
    let secs = secs.unwrap_or(config.feed_secs);
    dispenser.feed(Some(Duration::from_secs(u64::from(secs))), speed, delay)?;
    if aborted() {
        return Err(Error::Interrupted);
    }
    info!("Feed finished");
    Ok(())
}

fn interrupt(stop: impl FnOnce() -> Result<()>) -> Result<()> {
    warn!("Interrupted, stopping motor");
    stop()?;
    Err(Error::Interrupted)
}
