//! Mock GPIO adapter for integration tests.
//!
//! Records every port call in order and can be told to fail a specific
//! operation, so tests can check both the command history and how faults
//! reach the caller.

use std::cell::RefCell;
use std::rc::Rc;

use feeder::app::ports::{ConfigError, ConfigPort, GpioError, GpioPort, PwmChannel};
use feeder::config::AppConfig;

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Configure(u8),
    High(u8),
    Low(u8),
    CreatePwm(u8, f64),
    PwmStart(u8, f64),
    PwmStop(u8),
    PwmDuty(u8, f64),
    PwmFreq(u8, f64),
    PwmDrop(u8),
    Cleanup,
}

/// Operation to fail on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fault {
    Configure(u8),
    Write(u8),
    CreatePwm,
    PwmStart,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    fault: Option<Fault>,
}

// ── MockGpio ──────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockGpio {
    state: Rc<RefCell<State>>,
}

#[allow(dead_code)]
impl MockGpio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(fault: Fault) -> Self {
        let gpio = Self::new();
        gpio.state.borrow_mut().fault = Some(fault);
        gpio
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn cleanups(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Cleanup).count()
    }

    /// Last level driven on `pin`: `Some(true)` for HIGH.
    pub fn level(&self, pin: u8) -> Option<bool> {
        self.calls().iter().rev().find_map(|c| match *c {
            Call::High(p) if p == pin => Some(true),
            Call::Low(p) if p == pin => Some(false),
            _ => None,
        })
    }

    /// Replay the log and report whether both pins were ever HIGH together.
    pub fn both_high_at_any_point(&self, a: u8, b: u8) -> bool {
        let (mut high_a, mut high_b) = (false, false);
        for call in self.calls() {
            match call {
                Call::High(p) if p == a => high_a = true,
                Call::Low(p) if p == a => high_a = false,
                Call::High(p) if p == b => high_b = true,
                Call::Low(p) if p == b => high_b = false,
                _ => continue,
            }
            if high_a && high_b {
                return true;
            }
        }
        false
    }

    fn record(&self, call: Call, fails: bool) -> Result<(), GpioError> {
        self.state.borrow_mut().calls.push(call);
        if fails {
            Err(GpioError::AccessDenied)
        } else {
            Ok(())
        }
    }

    fn fault(&self) -> Option<Fault> {
        self.state.borrow().fault
    }
}

impl GpioPort for MockGpio {
    type Pwm = MockPwm;

    fn configure_output(&mut self, pin: u8) -> Result<(), GpioError> {
        let fails = self.fault() == Some(Fault::Configure(pin));
        self.record(Call::Configure(pin), fails)
    }

    fn set_high(&mut self, pin: u8) -> Result<(), GpioError> {
        self.record(Call::High(pin), self.fault() == Some(Fault::Write(pin)))
    }

    fn set_low(&mut self, pin: u8) -> Result<(), GpioError> {
        self.record(Call::Low(pin), self.fault() == Some(Fault::Write(pin)))
    }

    fn create_pwm(&mut self, pin: u8, frequency_hz: f64) -> Result<MockPwm, GpioError> {
        if self.fault() == Some(Fault::CreatePwm) {
            return Err(GpioError::PwmFailed(pin));
        }
        self.record(Call::CreatePwm(pin, frequency_hz), false)?;
        Ok(MockPwm {
            gpio: self.clone(),
            pin,
        })
    }

    fn cleanup(&mut self) {
        self.state.borrow_mut().calls.push(Call::Cleanup);
    }
}

pub struct MockPwm {
    gpio: MockGpio,
    pin: u8,
}

impl PwmChannel for MockPwm {
    fn start(&mut self, duty_percent: f64) -> Result<(), GpioError> {
        let fails = self.gpio.fault() == Some(Fault::PwmStart);
        self.gpio.record(Call::PwmStart(self.pin, duty_percent), fails)
    }

    fn stop(&mut self) -> Result<(), GpioError> {
        self.gpio.record(Call::PwmStop(self.pin), false)
    }

    fn change_duty_cycle(&mut self, duty_percent: f64) -> Result<(), GpioError> {
        self.gpio.record(Call::PwmDuty(self.pin, duty_percent), false)
    }

    fn change_frequency(&mut self, frequency_hz: f64) -> Result<(), GpioError> {
        self.gpio.record(Call::PwmFreq(self.pin, frequency_hz), false)
    }
}

impl Drop for MockPwm {
    fn drop(&mut self) {
        self.gpio.state.borrow_mut().calls.push(Call::PwmDrop(self.pin));
    }
}

// ── MockConfig ────────────────────────────────────────────────

#[derive(Default)]
pub struct MockConfig {
    pub stored: RefCell<Option<AppConfig>>,
}

impl ConfigPort for MockConfig {
    fn load(&self) -> Result<AppConfig, ConfigError> {
        self.stored.borrow().ok_or(ConfigError::NotFound)
    }

    fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.stored.borrow_mut() = Some(*config);
        Ok(())
    }
}
