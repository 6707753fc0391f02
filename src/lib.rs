//! Feeder library: an L293/L298-style H-bridge DC motor driver over GPIO,
//! and a timed dispenser built on it.
//!
//! Hardware access goes through [`app::ports::GpioPort`].  The simulated
//! board is always available; the Raspberry Pi backend is behind the
//! `rpi` feature.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
