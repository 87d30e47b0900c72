//! # Dawnlight Library
//!
//! Internal library for the dawnlight binary application
//!
//! This library exists to enable testing of the scheduler internals and provide clean
//! separation between CLI dispatch (main.rs) and application logic.
//!
//! ## Architecture
//!
//! - **Entry Point**: `Dawnlight` struct provides the main application API with resource management
//! - **Core Logic**: `core` module contains the scheduler loop
//! - **Scheduling**: `schedule` module with the event catalog, schedule builder and fired-event registry
//! - **Devices**: `device` module with the light abstraction and the Nanoleaf client
//! - **Configuration**: `config` module for TOML-based settings with reload support
//! - **Commands**: `commands` module for CLI subcommands (schedule, fire, simulate, help)
//! - **Geographic**: `geo` module for sunrise calculation and timezone detection
//! - **Infrastructure**: signal handling, lock file, time sources, logging, and utilities

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod common;

// Public API modules
pub mod args;
pub mod commands;
pub mod config;
pub mod core;
pub mod device;
pub mod geo;
pub mod io;
pub mod schedule;
pub mod time;

mod dawnlight;

// Re-export for binary
pub use dawnlight::Dawnlight;
