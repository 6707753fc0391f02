//! GPIO session lifetime: cleanup exactly once on every exit path.

use std::cell::Cell;

use embedded_hal::delay::DelayNs;
use feeder::app::sequences;
use feeder::config::PinRoles;
use feeder::drivers::session::GpioSession;
use feeder::error::Error;

use crate::mock_gpio::{Call, Fault, MockGpio};

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

#[test]
fn demo_success_cleans_up_once_after_stop() {
    let gpio = MockGpio::new();
    {
        let session = GpioSession::new(gpio.clone());
        let pins = PinRoles::default();
        sequences::demo(session.handle(), pins, &mut NoDelay, || false).unwrap();
    }
    let calls = gpio.calls();
    assert_eq!(gpio.cleanups(), 1);
    assert_eq!(calls.last(), Some(&Call::Cleanup));
    assert_eq!(calls[calls.len() - 2], Call::Low(18));
}

#[test]
fn hardware_fault_still_cleans_up() {
    let gpio = MockGpio::failing(Fault::Write(18));
    let run = || -> Result<(), Error> {
        let session = GpioSession::new(gpio.clone());
        let pins = PinRoles::default();
        sequences::demo(session.handle(), pins, &mut NoDelay, || false)?;
        Ok(())
    };
    assert!(run().is_err());
    assert_eq!(gpio.cleanups(), 1);
}

#[test]
fn interrupt_stops_motor_then_cleans_up() {
    let gpio = MockGpio::new();
    let aborted = Cell::new(true);
    let r = {
        let session = GpioSession::new(gpio.clone());
        let pins = PinRoles::default();
        sequences::demo(session.handle(), pins, &mut NoDelay, || aborted.get())
    };
    assert_eq!(r, Err(Error::Interrupted));

    let calls = gpio.calls();
    assert_eq!(gpio.cleanups(), 1);
    let stop = calls.iter().rposition(|c| *c == Call::Low(18));
    let cleanup = calls.iter().position(|c| *c == Call::Cleanup);
    assert!(stop.is_some() && stop < cleanup);
}

#[test]
fn explicit_close_is_not_repeated_on_drop() {
    let gpio = MockGpio::new();
    let session = GpioSession::new(gpio.clone());
    session.close();
    assert_eq!(gpio.cleanups(), 1);
}
