//! # Sunriser Library
//!
//! Internal library for the Sunriser binary application
//!
//! This library exists to enable testing of the choreography internals and to
//! provide clean separation between CLI dispatch (main.rs) and application logic.
//!
//! ## Architecture
//!
//! - **Entry Point**: `Sunriser` struct runs a full choreography with resource management
//! - **Core Logic**: `sequencer` drives one lamp's timed sequence; `core` fans sequencers out
//! - **Backends**: `backend` module with the Yeelight LAN protocol and discovery
//! - **Configuration**: `config` module for TOML-based settings with validation
//! - **Commands**: `commands` module for one-shot CLI commands (set, help)
//! - **Data Model**: `flow` for transitions and flows, `schedule` for the lamp table
//! - **Infrastructure**: Signal handling, time source abstraction, logging

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

// Public API modules
pub mod args;
pub mod backend;
pub mod commands;
pub mod config;
pub mod constants;
pub mod flow;
pub mod schedule;
pub mod sequencer;
pub mod signals;
pub mod time_source;

// Orchestrator
mod core;

// Re-export for binary
pub use crate::core::Sunriser;
