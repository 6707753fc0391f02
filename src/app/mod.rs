pub mod commands;
pub mod dispenser;
pub mod ports;
pub mod sequences;
