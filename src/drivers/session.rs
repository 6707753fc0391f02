//! Scoped ownership of the GPIO subsystem.
//!
//! The process acquires the board once, hands handle clones to drivers, and
//! lets the session release every pin when it goes out of scope.  Cleanup
//! runs exactly once whether the scope ends normally, through `?`, or while
//! unwinding.

use log::info;

use crate::app::ports::GpioPort;

pub struct GpioSession<G: GpioPort> {
    gpio: G,
    released: bool,
}

impl<G: GpioPort + Clone> GpioSession<G> {
    pub fn new(gpio: G) -> Self {
        info!("GPIO session opened");
        Self {
            gpio,
            released: false,
        }
    }

    /// A handle onto the session's board for a driver to own.
    pub fn handle(&self) -> G {
        self.gpio.clone()
    }
}

impl<G: GpioPort> GpioSession<G> {
    /// Release the board now instead of at end of scope.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.gpio.cleanup();
            info!("GPIO session closed");
        }
    }
}

impl<G: GpioPort> Drop for GpioSession<G> {
    fn drop(&mut self) {
        self.release();
    }
}
