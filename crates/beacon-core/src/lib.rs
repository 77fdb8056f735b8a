//! Core types for beacon: configuration, logging and the status registry.

pub mod config;
pub mod logging;
pub mod status;
