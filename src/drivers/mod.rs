//! Actuator drivers and GPIO lifetime management.

pub mod motor;
pub mod session;
