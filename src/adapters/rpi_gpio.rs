//! Raspberry Pi GPIO adapter (`rpi` feature).
//!
//! Implements [`GpioPort`] over `rppal`.  PWM is software PWM on the
//! output pin itself, so any BCM pin can act as the enable line.
//!
//! [`RpiGpio`] is a handle; clones share one set of claimed pins.  Pins
//! are claimed on first `configure_output` and released in `cleanup`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, info, warn};
use rppal::gpio::{Gpio, OutputPin};

use crate::app::ports::{GpioError, GpioPort, PwmChannel};

fn map_err(pin: u8, e: rppal::gpio::Error) -> GpioError {
    match e {
        rppal::gpio::Error::PinUsed(p) => GpioError::PinBusy(p),
        rppal::gpio::Error::PinNotAvailable(p) => GpioError::PinUnavailable(p),
        rppal::gpio::Error::PermissionDenied(_) => GpioError::AccessDenied,
        other => {
            warn!("rppal GPIO {}: {}", pin, other);
            GpioError::PwmFailed(pin)
        }
    }
}

struct Board {
    gpio: Gpio,
    outputs: HashMap<u8, OutputPin>,
    pwm_pins: Vec<u8>,
}

impl Board {
    fn output(&mut self, pin: u8) -> Result<&mut OutputPin, GpioError> {
        self.outputs.get_mut(&pin).ok_or(GpioError::NotConfigured(pin))
    }
}

#[derive(Clone)]
pub struct RpiGpio {
    board: Rc<RefCell<Board>>,
}

impl RpiGpio {
    /// Open the GPIO peripheral.  Fails without `/dev/gpiomem` access.
    pub fn new() -> Result<Self, GpioError> {
        let gpio = Gpio::new().map_err(|e| map_err(0, e))?;
        info!("RpiGpio: peripheral opened");
        Ok(Self {
            board: Rc::new(RefCell::new(Board {
                gpio,
                outputs: HashMap::new(),
                pwm_pins: Vec::new(),
            })),
        })
    }
}

impl GpioPort for RpiGpio {
    type Pwm = RpiPwm;

    fn configure_output(&mut self, pin: u8) -> Result<(), GpioError> {
        let mut b = self.board.borrow_mut();
        if b.outputs.contains_key(&pin) {
            return Ok(());
        }
        let out = b
            .gpio
            .get(pin)
            .map_err(|e| map_err(pin, e))?
            .into_output_low();
        b.outputs.insert(pin, out);
        debug!("RpiGpio: GPIO {} is output", pin);
        Ok(())
    }

    fn set_high(&mut self, pin: u8) -> Result<(), GpioError> {
        self.board.borrow_mut().output(pin)?.set_high();
        Ok(())
    }

    fn set_low(&mut self, pin: u8) -> Result<(), GpioError> {
        self.board.borrow_mut().output(pin)?.set_low();
        Ok(())
    }

    fn create_pwm(&mut self, pin: u8, frequency_hz: f64) -> Result<RpiPwm, GpioError> {
        let mut b = self.board.borrow_mut();
        b.output(pin)?;
        if b.pwm_pins.contains(&pin) {
            return Err(GpioError::PinBusy(pin));
        }
        b.pwm_pins.push(pin);
        Ok(RpiPwm {
            board: Rc::clone(&self.board),
            pin,
            frequency_hz,
            duty_percent: 0.0,
            running: false,
        })
    }

    fn cleanup(&mut self) {
        let mut b = self.board.borrow_mut();
        for (pin, out) in &mut b.outputs {
            if let Err(e) = out.clear_pwm() {
                warn!("RpiGpio: clear PWM on GPIO {} failed: {}", pin, e);
            }
            out.set_low();
        }
        b.pwm_pins.clear();
        let released = b.outputs.len();
        b.outputs.clear();
        info!("RpiGpio: released {} pins", released);
    }
}

/// Software PWM on one claimed output.
pub struct RpiPwm {
    board: Rc<RefCell<Board>>,
    pin: u8,
    frequency_hz: f64,
    duty_percent: f64,
    running: bool,
}

impl RpiPwm {
    fn apply(&self) -> Result<(), GpioError> {
        let mut b = self.board.borrow_mut();
        let pin = self.pin;
        b.output(pin)?
            .set_pwm_frequency(self.frequency_hz, self.duty_percent / 100.0)
            .map_err(|e| map_err(pin, e))
    }
}

impl PwmChannel for RpiPwm {
    fn start(&mut self, duty_percent: f64) -> Result<(), GpioError> {
        self.duty_percent = duty_percent;
        self.apply()?;
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), GpioError> {
        let mut b = self.board.borrow_mut();
        let pin = self.pin;
        let out = b.output(pin)?;
        out.clear_pwm().map_err(|e| map_err(pin, e))?;
        out.set_low();
        self.running = false;
        Ok(())
    }

    fn change_duty_cycle(&mut self, duty_percent: f64) -> Result<(), GpioError> {
        self.duty_percent = duty_percent;
        if self.running { self.apply() } else { Ok(()) }
    }

    fn change_frequency(&mut self, frequency_hz: f64) -> Result<(), GpioError> {
        self.frequency_hz = frequency_hz;
        if self.running { self.apply() } else { Ok(()) }
    }
}

impl Drop for RpiPwm {
    fn drop(&mut self) {
        let mut b = self.board.borrow_mut();
        let pin = self.pin;
        b.pwm_pins.retain(|p| *p != pin);
        if let Some(out) = b.outputs.get_mut(&pin) {
            if let Err(e) = out.clear_pwm() {
                warn!("RpiGpio: clear PWM on GPIO {} failed: {}", pin, e);
            }
            out.set_low();
        }
    }
}
