//! Backend abstraction layer for lamp discovery and control.
//!
//! The choreography core talks to lamps exclusively through the two traits in
//! this module: [`LampFinder`] resolves a configured name to a live handle,
//! and [`LampBackend`] issues the three commands a sequence needs (a single
//! transition, a multi-step flow, and power control). The Yeelight LAN
//! implementation lives in [`yeelight`]; tests substitute mocks.

use anyhow::Result;
use std::time::Duration;

use crate::flow::{Flow, Transition};

pub mod yeelight;

/// Basic lamp state, as reported by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LampProps {
    pub powered_on: bool,
    /// Current brightness percentage (1-100).
    pub brightness: u8,
    /// Current color temperature in Kelvin.
    pub temperature: u16,
}

/// A live handle to one lamp.
///
/// Commands are fire-and-forget from the caller's perspective: the lamp
/// animates each transition over its own duration while the call returns as
/// soon as the device acknowledges it.
#[cfg_attr(test, mockall::automock)]
pub trait LampBackend: Send {
    /// Apply a single transition to the target state over its duration.
    fn apply_transition(&mut self, transition: &Transition) -> Result<()>;

    /// Run an ordered transition flow with a repeat count and finish policy.
    fn apply_flow(&mut self, flow: &Flow) -> Result<()>;

    /// Power the lamp on or off, ramping smoothly over `duration`.
    ///
    /// Some lamps power on implicitly when the first flow command arrives;
    /// issuing this explicitly is still correct and keeps the ramp smooth.
    fn set_power(&mut self, on: bool, duration: Duration) -> Result<()>;

    /// Read the lamp's current state.
    fn properties(&mut self) -> Result<LampProps>;
}

/// Resolves configured lamp names against whatever was discovered on the
/// network. One resolution per sequencer start; there is no re-discovery
/// during a run.
#[cfg_attr(test, mockall::automock)]
pub trait LampFinder: Sync {
    /// Resolve a name to a handle, or `None` when the lamp is not present.
    ///
    /// Absence is an expected per-lamp condition, not an error: the caller
    /// logs it and carries on with the remaining lamps.
    fn resolve(&self, name: &str) -> Result<Option<Box<dyn LampBackend>>>;
}
