//! DC motor driver for a three-pin H-bridge (IN1, IN2, EN).
//!
//! | IN1 | IN2 | Motor                         |
//! |-----|-----|-------------------------------|
//! | 1   | 0   | Forward                       |
//! | 0   | 1   | Backward                      |
//! | 0   | 0   | Off (coast)                   |
//! | 1   | 1   | never driven                  |
//!
//! EN gates drive current.  It is either held HIGH (full power) or driven
//! by a PWM channel whose duty cycle sets the speed.
//!
//! ## Transition ordering
//!
//! Whenever the direction changes, the input going LOW is written before
//! the input going HIGH, so IN1 and IN2 are never high at the same time,
//! not even between two register writes.
//!
//! ## Mode-dependent parameters
//!
//! Speed and frequency only mean something with PWM.  Setting them while
//! PWM is disabled stores the value, logs a warning and reports
//! [`ParamUpdate::Deferred`].  Stored values are honoured later: the
//! channel is created at the stored frequency and started at the stored
//! speed.

use embedded_hal::digital::PinState;
use log::{debug, info, warn};

use crate::app::ports::{GpioPort, PwmChannel};
use crate::config::{MotorConfig, PinRoles};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Off,
    Forward,
    Backward,
}

impl Direction {
    /// Opposite spin.  `Off` has no opposite.
    pub const fn reversed(self) -> Self {
        match self {
            Self::Off => Self::Off,
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// `(IN1, IN2)` levels encoding this direction.
    pub const fn bridge_levels(self) -> (PinState, PinState) {
        match self {
            Self::Off => (PinState::Low, PinState::Low),
            Self::Forward => (PinState::High, PinState::Low),
            Self::Backward => (PinState::Low, PinState::High),
        }
    }
}

/// Argument to [`MotorController::set_direction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionCommand {
    Off,
    Forward,
    Backward,
    /// Flip Forward ↔ Backward.  A no-op while the direction is `Off`.
    Toggle,
}

/// Outcome of a speed or frequency change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamUpdate {
    /// Stored and pushed to the live PWM channel.
    Applied,
    /// Stored only; PWM is disabled so there is no channel to apply it to.
    Deferred,
    /// Not a usable value; nothing stored.
    Rejected,
}

/// Point-in-time view of the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorStatus {
    pub direction: Direction,
    pub running: bool,
    pub pwm_enabled: bool,
    pub speed_percent: f64,
    pub frequency_hz: f64,
}

pub struct MotorController<G: GpioPort> {
    gpio: G,
    pins: PinRoles,
    /// Present iff PWM control is enabled.
    pwm: Option<G::Pwm>,
    direction: Direction,
    speed: f64,
    frequency: f64,
    running: bool,
}

impl<G: GpioPort> MotorController<G> {
    /// Validate `config`, configure all three pins as outputs and drive the
    /// direction inputs LOW.  EN is left untouched until [`start`].
    ///
    /// With `use_pwm` the channel is created here (idle), so channel
    /// existence and the PWM flag agree from the first moment.
    ///
    /// [`start`]: Self::start
    pub fn new(gpio: G, config: &MotorConfig) -> Result<Self> {
        config.validate()?;

        let mut motor = Self {
            gpio,
            pins: config.pins,
            pwm: None,
            direction: Direction::Off,
            speed: config.speed_percent,
            frequency: config.frequency_hz,
            running: false,
        };

        for pin in [motor.pins.in_1, motor.pins.in_2, motor.pins.enable] {
            motor.gpio.configure_output(pin)?;
        }
        motor.gpio.set_low(motor.pins.in_1)?;
        motor.gpio.set_low(motor.pins.in_2)?;

        if config.use_pwm {
            motor.set_use_pwm(true)?;
        }

        debug!(
            "Motor ready [in_1={} in_2={} enable={} pwm={}]",
            motor.pins.in_1,
            motor.pins.in_2,
            motor.pins.enable,
            motor.pwm.is_some()
        );
        Ok(motor)
    }

    // ── Direction ─────────────────────────────────────────────

    /// Set spin direction and re-render IN1/IN2.  Returns the resulting
    /// direction.
    pub fn set_direction(&mut self, command: DirectionCommand) -> Result<Direction> {
        let target = match command {
            DirectionCommand::Off => Direction::Off,
            DirectionCommand::Forward => Direction::Forward,
            DirectionCommand::Backward => Direction::Backward,
            DirectionCommand::Toggle if self.direction == Direction::Off => {
                warn!("Toggle ignored: motor direction is off");
                return Ok(Direction::Off);
            }
            DirectionCommand::Toggle => self.direction.reversed(),
        };

        match (command, target) {
            (DirectionCommand::Toggle, _) => debug!("Toggle motor direction"),
            (_, Direction::Off) => debug!("Set motor direction off"),
            (_, Direction::Forward) => debug!("Set motor direction to forward"),
            (_, Direction::Backward) => debug!("Set motor direction to backward"),
        }

        self.direction = target;
        self.render_direction()?;
        Ok(target)
    }

    pub fn forward(&mut self) -> Result<Direction> {
        self.set_direction(DirectionCommand::Forward)
    }

    pub fn backward(&mut self) -> Result<Direction> {
        self.set_direction(DirectionCommand::Backward)
    }

    pub fn toggle(&mut self) -> Result<Direction> {
        self.set_direction(DirectionCommand::Toggle)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    fn render_direction(&mut self) -> Result<()> {
        let (in_1, in_2) = self.direction.bridge_levels();
        let writes = if in_1 == PinState::High {
            [(self.pins.in_2, in_2), (self.pins.in_1, in_1)]
        } else {
            [(self.pins.in_1, in_1), (self.pins.in_2, in_2)]
        };
        for (pin, level) in writes {
            self.write(pin, level)?;
        }
        Ok(())
    }

    fn write(&mut self, pin: u8, level: PinState) -> Result<()> {
        match level {
            PinState::High => self.gpio.set_high(pin)?,
            PinState::Low => self.gpio.set_low(pin)?,
        }
        Ok(())
    }

    // ── PWM mode ──────────────────────────────────────────────

    /// Enable or disable PWM control of EN.
    ///
    /// Enabling creates an idle channel at the stored frequency; disabling
    /// stops and releases it.  If the motor is running it is stopped in the
    /// old mode and EN is re-energised in the new one; IN1/IN2 are never
    /// written here.
    pub fn set_use_pwm(&mut self, enable: bool) -> Result<()> {
        if enable == self.pwm.is_some() {
            let state = if enable { "enabled" } else { "disabled" };
            debug!("PWM already {}", state);
            return Ok(());
        }

        let was_running = self.running;
        if was_running {
            self.stop()?;
        }

        if enable {
            debug!("Enable PWM [frequency={}]", self.frequency);
            self.pwm = Some(self.gpio.create_pwm(self.pins.enable, self.frequency)?);
        } else if let Some(mut pwm) = self.pwm.take() {
            debug!("Disable PWM");
            pwm.stop()?;
        }

        if was_running {
            self.energise()?;
        }
        Ok(())
    }

    pub fn use_pwm(&self) -> bool {
        self.pwm.is_some()
    }

    // ── Speed / frequency ─────────────────────────────────────

    /// Set PWM duty cycle (0-100 %).  Out-of-range values are clamped.
    pub fn set_speed(&mut self, speed: f64) -> Result<ParamUpdate> {
        let Some(speed) = clamp_duty(speed) else {
            warn!("Rejected motor speed {}", speed);
            return Ok(ParamUpdate::Rejected);
        };
        self.speed = speed;

        match self.pwm.as_mut() {
            Some(pwm) => {
                debug!("Set motor speed to {}", speed);
                pwm.change_duty_cycle(speed)?;
                Ok(ParamUpdate::Applied)
            }
            None => {
                warn!("Can not change motor speed to {} without using PWM!", speed);
                Ok(ParamUpdate::Deferred)
            }
        }
    }

    /// Set PWM frequency (Hz, > 0).
    pub fn set_frequency(&mut self, frequency: f64) -> Result<ParamUpdate> {
        if !(frequency.is_finite() && frequency > 0.0) {
            warn!("Rejected motor PWM frequency {}", frequency);
            return Ok(ParamUpdate::Rejected);
        }
        self.frequency = frequency;

        match self.pwm.as_mut() {
            Some(pwm) => {
                debug!("Set motor PWM frequency to {}", frequency);
                pwm.change_frequency(frequency)?;
                Ok(ParamUpdate::Applied)
            }
            None => {
                warn!(
                    "Can not change motor frequency to {} without using PWM!",
                    frequency
                );
                Ok(ParamUpdate::Deferred)
            }
        }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    // ── Run control ───────────────────────────────────────────

    /// Energise the bridge.
    ///
    /// With PWM, an optional `speed` replaces the stored duty cycle before
    /// the channel starts.  Without PWM, EN is driven HIGH and `speed` is
    /// ignored.  A motor with no direction is set to forward.  Calling
    /// this while running re-applies the same state.
    pub fn start(&mut self, speed: Option<f64>) -> Result<()> {
        if let Some(requested) = speed {
            if self.pwm.is_none() {
                warn!(
                    "Can not start motor at speed {} without using PWM!",
                    requested
                );
            } else {
                match clamp_duty(requested) {
                    Some(duty) => self.speed = duty,
                    None => warn!("Ignoring start speed {}", requested),
                }
            }
        }
        self.energise()?;

        if self.direction == Direction::Off {
            self.set_direction(DirectionCommand::Forward)?;
        }
        Ok(())
    }

    /// Drive EN: start the channel at the stored speed, or hold EN HIGH.
    /// IN1/IN2 are left alone.
    fn energise(&mut self) -> Result<()> {
        match self.pwm.as_mut() {
            Some(pwm) => {
                info!("Start motor [speed={}]", self.speed);
                pwm.start(self.speed)?;
            }
            None => {
                info!("Start motor");
                self.gpio.set_high(self.pins.enable)?;
            }
        }
        self.running = true;
        Ok(())
    }

    /// Cut drive current.  Direction is kept; a PWM channel is stopped,
    /// not released.  Safe before any [`start`](Self::start).
    pub fn stop(&mut self) -> Result<()> {
        info!("Stop motor");
        match self.pwm.as_mut() {
            Some(pwm) => pwm.stop()?,
            None => self.gpio.set_low(self.pins.enable)?,
        }
        self.running = false;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn status(&self) -> MotorStatus {
        MotorStatus {
            direction: self.direction,
            running: self.running,
            pwm_enabled: self.pwm.is_some(),
            speed_percent: self.speed,
            frequency_hz: self.frequency,
        }
    }
}

/// Clamp a duty cycle into 0-100 %.  `None` for NaN / infinities.
fn clamp_duty(value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let clamped = value.clamp(0.0, 100.0);
    if (clamped - value).abs() > f64::EPSILON {
        warn!("Motor speed {} clamped to {}", value, clamped);
    }
    Some(clamped)
}
