//! In-memory GPIO board.
//!
//! Implements [`GpioPort`] without touching hardware.  Used by the binary
//! when built without the `rpi` feature, and by every test in the crate.
//!
//! The board records every call in order, so tests can assert on the full
//! command history, not just the final levels.  It enforces the same
//! rules a real GPIO library does: pins must exist, must be configured
//! before being driven, and may carry at most one live PWM channel.
//!
//! [`SimGpio`] is a handle; clones share one board.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use embedded_hal::digital::PinState;
use log::debug;

use crate::app::ports::{GpioError, GpioPort, PwmChannel};
use crate::pins;

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum GpioCall {
    ConfigureOutput(u8),
    Write { pin: u8, level: PinState },
    CreatePwm { pin: u8, frequency_hz: f64 },
    PwmStart { pin: u8, duty: f64 },
    PwmStop { pin: u8 },
    PwmDuty { pin: u8, duty: f64 },
    PwmFrequency { pin: u8, frequency_hz: f64 },
    PwmRelease { pin: u8 },
    Cleanup,
}

/// Snapshot of one PWM channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PwmState {
    pub pin: u8,
    pub frequency_hz: f64,
    pub duty_percent: f64,
    pub running: bool,
    pub released: bool,
}

#[derive(Default)]
struct Board {
    outputs: BTreeSet<u8>,
    levels: BTreeMap<u8, PinState>,
    channels: Vec<PwmState>,
    calls: Vec<GpioCall>,
    cleanups: u32,
}

impl Board {
    fn check_output(&self, pin: u8) -> Result<(), GpioError> {
        if pin > pins::MAX_BCM_GPIO {
            return Err(GpioError::PinUnavailable(pin));
        }
        if !self.outputs.contains(&pin) {
            return Err(GpioError::NotConfigured(pin));
        }
        Ok(())
    }

    fn live_channel(&mut self, id: usize) -> Result<&mut PwmState, GpioError> {
        let ch = &mut self.channels[id];
        if ch.released {
            Err(GpioError::NotConfigured(ch.pin))
        } else {
            Ok(ch)
        }
    }
}

// ── SimGpio ───────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct SimGpio {
    board: Rc<RefCell<Board>>,
}

impl SimGpio {
    pub fn new() -> Self {
        debug!("SimGpio: simulation backend");
        Self::default()
    }

    /// Last level written to `pin`, `None` if never written.
    pub fn level(&self, pin: u8) -> Option<PinState> {
        self.board.borrow().levels.get(&pin).copied()
    }

    pub fn is_output(&self, pin: u8) -> bool {
        self.board.borrow().outputs.contains(&pin)
    }

    /// The live (not released) PWM channel on `pin`.
    pub fn pwm(&self, pin: u8) -> Option<PwmState> {
        self.board
            .borrow()
            .channels
            .iter()
            .find(|c| c.pin == pin && !c.released)
            .copied()
    }

    pub fn active_pwm_count(&self) -> usize {
        self.board.borrow().channels.iter().filter(|c| !c.released).count()
    }

    pub fn calls(&self) -> Vec<GpioCall> {
        self.board.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.board.borrow_mut().calls.clear();
    }

    pub fn cleanup_count(&self) -> u32 {
        self.board.borrow().cleanups
    }

    /// Cleanup through a shared reference (tests only need `&self`).
    pub fn cleanup_now(&self) {
        self.clone().cleanup();
    }

    /// Replay the call log and report whether `a` and `b` were ever HIGH
    /// at the same time.
    pub fn bridge_shorted_at_any_point(&self, a: u8, b: u8) -> bool {
        let mut level_a = PinState::Low;
        let mut level_b = PinState::Low;
        for call in &self.board.borrow().calls {
            if let GpioCall::Write { pin, level } = *call {
                if pin == a {
                    level_a = level;
                } else if pin == b {
                    level_b = level;
                }
                if level_a == PinState::High && level_b == PinState::High {
                    return true;
                }
            }
        }
        false
    }

    fn write(&mut self, pin: u8, level: PinState) -> Result<(), GpioError> {
        let mut b = self.board.borrow_mut();
        b.check_output(pin)?;
        b.levels.insert(pin, level);
        b.calls.push(GpioCall::Write { pin, level });
        Ok(())
    }
}

impl GpioPort for SimGpio {
    type Pwm = SimPwm;

    fn configure_output(&mut self, pin: u8) -> Result<(), GpioError> {
        if pin > pins::MAX_BCM_GPIO {
            return Err(GpioError::PinUnavailable(pin));
        }
        let mut b = self.board.borrow_mut();
        b.outputs.insert(pin);
        b.calls.push(GpioCall::ConfigureOutput(pin));
        Ok(())
    }

    fn set_high(&mut self, pin: u8) -> Result<(), GpioError> {
        self.write(pin, PinState::High)
    }

    fn set_low(&mut self, pin: u8) -> Result<(), GpioError> {
        self.write(pin, PinState::Low)
    }

    fn create_pwm(&mut self, pin: u8, frequency_hz: f64) -> Result<SimPwm, GpioError> {
        let mut b = self.board.borrow_mut();
        b.check_output(pin)?;
        if b.channels.iter().any(|c| c.pin == pin && !c.released) {
            return Err(GpioError::PinBusy(pin));
        }
        b.channels.push(PwmState {
            pin,
            frequency_hz,
            duty_percent: 0.0,
            running: false,
            released: false,
        });
        b.calls.push(GpioCall::CreatePwm { pin, frequency_hz });
        Ok(SimPwm {
            board: Rc::clone(&self.board),
            id: b.channels.len() - 1,
            pin,
        })
    }

    fn cleanup(&mut self) {
        let mut b = self.board.borrow_mut();
        for ch in &mut b.channels {
            ch.running = false;
            ch.released = true;
        }
        b.outputs.clear();
        b.levels.clear();
        b.cleanups += 1;
        b.calls.push(GpioCall::Cleanup);
        debug!("SimGpio: cleanup #{}", b.cleanups);
    }
}

// ── SimPwm ────────────────────────────────────────────────────

pub struct SimPwm {
    board: Rc<RefCell<Board>>,
    id: usize,
    pin: u8,
}

impl SimPwm {
    fn update(
        &mut self,
        call: GpioCall,
        f: impl FnOnce(&mut PwmState),
    ) -> Result<(), GpioError> {
        let mut b = self.board.borrow_mut();
        f(b.live_channel(self.id)?);
        b.calls.push(call);
        Ok(())
    }
}

impl PwmChannel for SimPwm {
    fn start(&mut self, duty_percent: f64) -> Result<(), GpioError> {
        let (pin, duty) = (self.pin, duty_percent);
        self.update(GpioCall::PwmStart { pin, duty }, |ch| {
            ch.duty_percent = duty;
            ch.running = true;
        })
    }

    fn stop(&mut self) -> Result<(), GpioError> {
        let pin = self.pin;
        self.update(GpioCall::PwmStop { pin }, |ch| ch.running = false)
    }

    fn change_duty_cycle(&mut self, duty_percent: f64) -> Result<(), GpioError> {
        let (pin, duty) = (self.pin, duty_percent);
        self.update(GpioCall::PwmDuty { pin, duty }, |ch| {
            ch.duty_percent = duty;
        })
    }

    fn change_frequency(&mut self, frequency_hz: f64) -> Result<(), GpioError> {
        let pin = self.pin;
        self.update(GpioCall::PwmFrequency { pin, frequency_hz }, |ch| {
            ch.frequency_hz = frequency_hz;
        })
    }
}

impl Drop for SimPwm {
    fn drop(&mut self) {
        let mut b = self.board.borrow_mut();
        let ch = &mut b.channels[self.id];
        if !ch.released {
            ch.running = false;
            ch.released = true;
            b.calls.push(GpioCall::PwmRelease { pin: self.pin });
        }
    }
}
