//! Choreography Messages
//!
//! Messages sent from the Conductor to whoever is watching the sequence: a
//! renderer, a logger, or a test.
//!
//! # Design Philosophy
//!
//! The Conductor owns the ordering. Observers never drive it; they receive a
//! linear narration of what happened, tagged with the run it belongs to, and
//! can reconstruct the whole-system state from it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::phase::Phase;

/// Identifies one run of the sequence
///
/// Incremented on every reset. Completions scheduled under an older token are
/// stale and get dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunToken(pub u64);

impl RunToken {
    /// The token that follows this one
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for RunToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// Messages from Conductor to observers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChoreographyMessage {
    // ============================================
    // Sequence Lifecycle
    // ============================================
    /// A tap from Idle started a new run
    SequenceStarted {
        /// Run the sequence belongs to
        run: RunToken,
    },

    /// The final phase finished
    SequenceCompleted {
        /// Run that completed
        run: RunToken,
    },

    /// Everything was returned to the Idle snapshot
    ResetApplied {
        /// Run token in effect after the reset
        run: RunToken,
    },

    /// A tap arrived while a run was animating and was dropped
    TapIgnored,

    // ============================================
    // Phase Progress
    // ============================================
    /// A button phase was scheduled
    PhaseStarted {
        /// Phase that started
        phase: Phase,
    },

    /// A button phase settled
    PhaseCompleted {
        /// Phase that completed
        phase: Phase,
    },

    /// Step 5 began: labels fade, the floating checkmark fades, the panel enters
    RevealStarted,

    /// The success panel settled; phase 6 follows
    RevealSettled,
}

impl ChoreographyMessage {
    /// The phase this message reports as completed, if any
    #[must_use]
    pub fn completed_phase(&self) -> Option<Phase> {
        match self {
            Self::PhaseCompleted { phase } => Some(*phase),
            _ => None,
        }
    }
}
