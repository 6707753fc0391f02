//! Dispenser service: timed runs of a PWM-driven motor.
//!
//! Owns one [`MotorController`] with the dispenser preset applied (low PWM
//! frequency, high duty cycle: the auger is pulsed rather than spun).
//! A feed is `start`, block for the duration, `stop`.  Timing goes through
//! [`DelayNs`] so the blocking wait is injectable.
//!
//! ```text
//!  GpioPort ──▶ ┌──────────────────────┐
//!               │ Dispenser            │ ◀── DelayNs
//!               │  └─ MotorController  │
//!               └──────────────────────┘
//! ```

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use log::info;

use crate::app::ports::GpioPort;
use crate::config::{DispenserConfig, MotorConfig, PinRoles};
use crate::drivers::motor::MotorController;
use crate::error::Result;

pub struct Dispenser<G: GpioPort> {
    motor: MotorController<G>,
}

impl<G: GpioPort> Dispenser<G> {
    /// Build a PWM motor on `pins` and apply the preset frequency and speed.
    pub fn new(gpio: G, pins: PinRoles, config: &DispenserConfig) -> Result<Self> {
        config.validate()?;
        let mut motor = MotorController::new(
            gpio,
            &MotorConfig {
                pins,
                use_pwm: true,
                ..MotorConfig::default()
            },
        )?;
        motor.set_frequency(config.frequency_hz)?;
        motor.set_speed(config.speed_percent)?;
        info!(
            "Dispenser ready [frequency={} speed={}]",
            config.frequency_hz, config.speed_percent
        );
        Ok(Self { motor })
    }

    /// Run the motor, optionally at `speed`.
    ///
    /// With a non-zero `duration` this blocks for it and then stops the
    /// motor.  Without one the motor is left running; call [`stop`].
    ///
    /// [`stop`]: Self::stop
    pub fn feed(
        &mut self,
        duration: Option<Duration>,
        speed: Option<f64>,
        delay: &mut impl DelayNs,
    ) -> Result<()> {
        self.motor.start(speed)?;
        match duration.filter(|d| !d.is_zero()) {
            Some(d) => {
                info!("Feeding for {:?}", d);
                let mut remaining = d.as_millis();
                while remaining > 0 {
                    let chunk = u32::try_from(remaining).unwrap_or(u32::MAX);
                    delay.delay_ms(chunk);
                    remaining -= u128::from(chunk);
                }
                self.motor.stop()
            }
            None => {
                info!("Feeding until stopped");
                Ok(())
            }
        }
    }

    pub fn stop(&mut self) -> Result<()> {
        self.motor.stop()
    }

    pub fn motor(&self) -> &MotorController<G> {
        &self.motor
    }
}
