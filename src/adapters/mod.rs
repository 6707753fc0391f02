//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements | Connects to                     |
//! |---------------|------------|---------------------------------|
//! | `config_file` | ConfigPort | JSON file on disk               |
//! | `rpi_gpio`    | GpioPort   | Raspberry Pi GPIO via `rppal`   |
//! | `sim_gpio`    | GpioPort   | In-memory board (host, tests)   |
//! | `time`        | DelayNs    | Host thread sleep               |

pub mod config_file;
#[cfg(feature = "rpi")]
pub mod rpi_gpio;
pub mod sim_gpio;
pub mod time;
