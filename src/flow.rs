//! Transition and flow value types shared by the choreography and the backends.
//!
//! A [`Transition`] is one step of a choreography: a target visual state and
//! the time the lamp takes to reach it. A [`Flow`] is an ordered list of
//! transitions executed strictly in order, optionally repeated, with a finish
//! policy applied by the lamp once the flow completes. Both are immutable
//! value objects; a run constructs them once and shares them read-only across
//! sequencer threads.

use std::time::Duration;

/// Target visual state of a single transition.
///
/// Exactly one color model applies per transition by construction: lamps are
/// addressed either on the HSV wheel or by color temperature, never both.
/// `Sleep` is the rest step used between alarm pulses; it changes nothing and
/// only consumes time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionTarget {
    Hsv {
        hue: u16,
        saturation: u8,
        brightness: u8,
    },
    Temperature {
        kelvin: u16,
        brightness: u8,
    },
    Sleep,
}

/// One ordered step of a choreography: a target state and a duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub target: TransitionTarget,
    pub duration: Duration,
}

impl Transition {
    pub fn hsv(hue: u16, saturation: u8, brightness: u8, duration: Duration) -> Self {
        Self {
            target: TransitionTarget::Hsv {
                hue,
                saturation,
                brightness,
            },
            duration,
        }
    }

    pub fn temperature(kelvin: u16, brightness: u8, duration: Duration) -> Self {
        Self {
            target: TransitionTarget::Temperature { kelvin, brightness },
            duration,
        }
    }

    pub fn sleep(duration: Duration) -> Self {
        Self {
            target: TransitionTarget::Sleep,
            duration,
        }
    }

    /// Brightness this transition targets, if it targets one at all.
    pub fn brightness(&self) -> Option<u8> {
        match self.target {
            TransitionTarget::Hsv { brightness, .. }
            | TransitionTarget::Temperature { brightness, .. } => Some(brightness),
            TransitionTarget::Sleep => None,
        }
    }
}

/// What the lamp does after the final transition of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowFinish {
    /// Restore the state the lamp had before the flow started.
    Recover,
    /// Stay at the final transition's state.
    Stay,
    /// Turn the lamp off.
    Off,
}

/// An ordered transition sequence with a repeat count and a finish policy.
///
/// Transitions run strictly in order and are never skipped partway; the lamp
/// animates each one over its own duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flow {
    /// Number of passes through `transitions`. Zero means repeat forever.
    pub count: u32,
    pub finish: FlowFinish,
    pub transitions: Vec<Transition>,
}

impl Flow {
    /// Single pass that leaves the lamp at the final state.
    pub fn once(transitions: Vec<Transition>) -> Self {
        Self {
            count: 1,
            finish: FlowFinish::Stay,
            transitions,
        }
    }

    /// Duration of one pass through the transition list.
    pub fn pass_duration(&self) -> Duration {
        self.transitions.iter().map(|t| t.duration).sum()
    }

    /// Total duration of the flow across all passes.
    ///
    /// An infinite flow (`count == 0`) reports the duration of one pass.
    pub fn duration(&self) -> Duration {
        self.pass_duration() * self.count.max(1)
    }
}
