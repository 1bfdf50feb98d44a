//! Phases and the Transition Table
//!
//! The checkout flow is one fixed, linear sequence. The button actor owns six
//! of the seven steps; step 5 (the success reveal) belongs to the Conductor
//! because it touches several components at once.
//!
//! ```text
//!  tap
//!   │
//!   ▼
//! [1 TextSwap] → [2 ButtonToWhite] → [3 TextMaskDisappear] → [4 CheckmarkMovesUp]
//!                                                                   │
//!                                             ┌─────────────────────┘
//!                                             ▼
//!                                   (5 RevealSuccess: labels fade,
//!                                    checkmark fades, panel enters)
//!                                             │ panel settled
//!                                             ▼
//!                          [6 ButtonToBlack] → [7 TextChevronSpread] → done
//! ```
//!
//! [`next_cue`] is the single source of truth for ordering.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A button phase, in sequence order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    /// "Place Order" exits right, "Order placed ✓" slides in, surface goes gray
    TextSwap,
    /// Surface goes white and gains a border
    ButtonToWhite,
    /// A mask wipes the confirmation text while the checkmark tracks its edge
    TextMaskDisappear,
    /// The checkmark lifts off and drifts upward
    CheckmarkMovesUp,
    /// Surface returns to black, "Continue Shopping" springs in
    ButtonToBlack,
    /// Label and chevron spread to opposite edges
    TextChevronSpread,
}

impl Phase {
    /// All button phases in the order the actor runs them
    pub const ALL: [Phase; 6] = [
        Phase::TextSwap,
        Phase::ButtonToWhite,
        Phase::TextMaskDisappear,
        Phase::CheckmarkMovesUp,
        Phase::ButtonToBlack,
        Phase::TextChevronSpread,
    ];

    /// The phase a fresh run starts with
    #[must_use]
    pub const fn first() -> Self {
        Phase::TextSwap
    }

    /// The phase the actor runs after this one, ignoring the Conductor's reveal step
    #[must_use]
    pub const fn next_for_actor(self) -> Option<Self> {
        match self {
            Self::TextSwap => Some(Self::ButtonToWhite),
            Self::ButtonToWhite => Some(Self::TextMaskDisappear),
            Self::TextMaskDisappear => Some(Self::CheckmarkMovesUp),
            Self::CheckmarkMovesUp => Some(Self::ButtonToBlack),
            Self::ButtonToBlack => Some(Self::TextChevronSpread),
            Self::TextChevronSpread => None,
        }
    }

    /// Position in the seven-step flow (step 5 is the reveal)
    #[must_use]
    pub const fn step(self) -> u8 {
        match self {
            Self::TextSwap => 1,
            Self::ButtonToWhite => 2,
            Self::TextMaskDisappear => 3,
            Self::CheckmarkMovesUp => 4,
            Self::ButtonToBlack => 6,
            Self::TextChevronSpread => 7,
        }
    }

    /// Short name used in logs and animation request names
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TextSwap => "text_swap",
            Self::ButtonToWhite => "button_to_white",
            Self::TextMaskDisappear => "text_mask_disappear",
            Self::CheckmarkMovesUp => "checkmark_moves_up",
            Self::ButtonToBlack => "button_to_black",
            Self::TextChevronSpread => "text_chevron_spread",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the Conductor does after a phase completes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    /// Trigger the given button phase
    Actor(Phase),
    /// Run the cross-component success reveal (step 5)
    RevealSuccess,
    /// The sequence is over
    Terminal,
}

/// The transition table, keyed by completed phase
pub const TRANSITIONS: [(Phase, Cue); 6] = [
    (Phase::TextSwap, Cue::Actor(Phase::ButtonToWhite)),
    (Phase::ButtonToWhite, Cue::Actor(Phase::TextMaskDisappear)),
    (Phase::TextMaskDisappear, Cue::Actor(Phase::CheckmarkMovesUp)),
    (Phase::CheckmarkMovesUp, Cue::RevealSuccess),
    (Phase::ButtonToBlack, Cue::Actor(Phase::TextChevronSpread)),
    (Phase::TextChevronSpread, Cue::Terminal),
];

/// Look up the cue for a completed phase
///
/// The match is exhaustive so a new phase cannot be added without a row here.
#[must_use]
pub const fn next_cue(completed: Phase) -> Cue {
    match completed {
        Phase::TextSwap => Cue::Actor(Phase::ButtonToWhite),
        Phase::ButtonToWhite => Cue::Actor(Phase::TextMaskDisappear),
        Phase::TextMaskDisappear => Cue::Actor(Phase::CheckmarkMovesUp),
        Phase::CheckmarkMovesUp => Cue::RevealSuccess,
        Phase::ButtonToBlack => Cue::Actor(Phase::TextChevronSpread),
        Phase::TextChevronSpread => Cue::Terminal,
    }
}

/// Tap-driven state of the button actor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorState {
    /// Waiting for the first tap
    #[default]
    Idle,
    /// A sequence is playing; taps are dropped
    Animating,
    /// The final phase finished; the next tap resets
    Completed,
}

/// Whole-system view of the sequence
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceState {
    /// Nothing running
    #[default]
    Idle,
    /// A button phase is in flight
    Running(Phase),
    /// Step 5: waiting for the success panel to settle
    Revealing,
    /// All seven steps finished
    Completed,
}

impl SequenceState {
    /// Current step number (1..=7) while a sequence is in flight
    #[must_use]
    pub const fn step(self) -> Option<u8> {
        match self {
            Self::Running(phase) => Some(phase.step()),
            Self::Revealing => Some(5),
            Self::Idle | Self::Completed => None,
        }
    }

    /// Whether a sequence is in flight
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running(_) | Self::Revealing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_lookup() {
        for (completed, cue) in TRANSITIONS {
            assert_eq!(next_cue(completed), cue, "row for {completed}");
        }
        assert_eq!(TRANSITIONS.len(), Phase::ALL.len());
    }

    #[test]
    fn test_table_has_single_terminal() {
        let terminals = TRANSITIONS
            .iter()
            .filter(|(_, cue)| *cue == Cue::Terminal)
            .count();
        assert_eq!(terminals, 1);
        assert_eq!(next_cue(Phase::TextChevronSpread), Cue::Terminal);
    }

    #[test]
    fn test_table_is_acyclic_and_visits_every_phase() {
        // Walk from the first phase, resolving the reveal to ButtonToBlack
        let mut visited = Vec::new();
        let mut current = Some(Phase::first());
        while let Some(phase) = current {
            assert!(!visited.contains(&phase), "cycle at {phase}");
            visited.push(phase);
            current = match next_cue(phase) {
                Cue::Actor(next) => Some(next),
                Cue::RevealSuccess => Some(Phase::ButtonToBlack),
                Cue::Terminal => None,
            };
        }
        assert_eq!(visited, Phase::ALL.to_vec());
    }

    #[test]
    fn test_reveal_follows_checkmark() {
        assert_eq!(next_cue(Phase::CheckmarkMovesUp), Cue::RevealSuccess);
        assert_eq!(next_cue(Phase::TextSwap), Cue::Actor(Phase::ButtonToWhite));
    }

    #[test]
    fn test_actor_order_agrees_with_all() {
        for pair in Phase::ALL.windows(2) {
            assert_eq!(pair[0].next_for_actor(), Some(pair[1]));
        }
        assert_eq!(Phase::TextChevronSpread.next_for_actor(), None);
    }

    #[test]
    fn test_steps() {
        let steps: Vec<u8> = Phase::ALL.iter().map(|p| p.step()).collect();
        assert_eq!(steps, vec![1, 2, 3, 4, 6, 7]);
        assert_eq!(SequenceState::Revealing.step(), Some(5));
        assert_eq!(SequenceState::Idle.step(), None);
        assert!(SequenceState::Running(Phase::TextSwap).is_running());
        assert!(!SequenceState::Completed.is_running());
    }

    #[test]
    fn test_default_states() {
        assert_eq!(ActorState::default(), ActorState::Idle);
        assert_eq!(SequenceState::default(), SequenceState::Idle);
    }
}
