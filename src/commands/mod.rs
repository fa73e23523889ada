//! Command-line command handlers for sunriser.
//!
//! One-shot commands that run outside the normal choreography flow. Each
//! command lives in its own submodule to keep the code organized.

pub mod help;
pub mod set;
