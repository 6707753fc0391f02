//! Feeder: Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  main: logging · args · config · Ctrl-C flag             │
//! │                                                          │
//! │  GpioSession (owns the board, cleans up exactly once)    │
//! │    └─ sequences::demo / sequences::feed                  │
//! │         └─ MotorController / Dispenser                   │
//! │                                                          │
//! │  ─────────────── GpioPort boundary ─────────────────     │
//! │  RpiGpio (`rpi` feature)  |  SimGpio (host)              │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use env_logger::Env;
use log::{error, info};

use feeder::adapters::config_file::JsonConfigStore;
use feeder::adapters::time::HostDelay;
use feeder::app::commands::AppCommand;
use feeder::app::ports::ConfigPort;
use feeder::app::sequences;
use feeder::config::AppConfig;
use feeder::drivers::session::GpioSession;

#[cfg(feature = "rpi")]
type Board = feeder::adapters::rpi_gpio::RpiGpio;
#[cfg(not(feature = "rpi"))]
type Board = feeder::adapters::sim_gpio::SimGpio;

#[cfg(feature = "rpi")]
fn open_board() -> Result<Board> {
    info!("Opening Raspberry Pi GPIO");
    Board::new().context("opening GPIO")
}

#[cfg(not(feature = "rpi"))]
fn open_board() -> Result<Board> {
    info!("Built without `rpi`; driving the simulated board");
    Ok(Board::new())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("debug"))
        .format_timestamp_millis()
        .init();

    let result = AppCommand::parse(std::env::args().skip(1))
        .context("parsing arguments")
        .and_then(run);
    report(result)
}

/// The single place a failure is reported; the exit status carries the rest.
fn report(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Abort: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: AppCommand) -> Result<()> {
    let store = JsonConfigStore::from_env();

    if let AppCommand::InitConfig(path) = command {
        let store = path.map_or(store, JsonConfigStore::new);
        return store
            .save(&AppConfig::default())
            .with_context(|| format!("writing {}", store.path().display()));
    }

    let config = store
        .load_or_default()
        .with_context(|| format!("loading {}", store.path().display()))?;

    let abort = Arc::new(AtomicBool::new(false));
    {
        let abort = Arc::clone(&abort);
        ctrlc::set_handler(move || abort.store(true, Ordering::SeqCst))
            .context("installing Ctrl-C handler")?;
    }
    let mut delay = HostDelay::with_abort(Arc::clone(&abort));
    let aborted = || abort.load(Ordering::SeqCst);

    // Dropped after the sequence, on every path out of this scope.
    let session = GpioSession::new(open_board()?);

    match command {
        AppCommand::Demo => {
            sequences::demo(session.handle(), config.motor.pins, &mut delay, aborted)
        }
        AppCommand::Feed { secs, speed } => sequences::feed(
            session.handle(),
            config.motor.pins,
            &config.dispenser,
            secs,
            speed,
            &mut delay,
            aborted,
        ),
        AppCommand::InitConfig(_) => Ok(()),
    }
    .context("running command")
}
