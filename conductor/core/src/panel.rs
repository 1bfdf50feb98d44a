//! Success Panel
//!
//! The "order placed" message that rises from below the button during step 5.
//! It has exactly two resting states: parked offscreen at a configured depth,
//! or on screen at zero offset.

use serde::{Deserialize, Serialize};

use crate::animation::{
    AnimationEngine, AnimationRequest, Completion, Element, Offset, SpringMotion, Transition,
};

/// Name of the panel's entry transition
pub const SUCCESS_PANEL_ENTER: &str = "success_panel_enter";

/// Visual state of the success panel
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuccessPanel {
    start_offset: f32,
    offset_y: f32,
}

impl SuccessPanel {
    /// Create a panel parked `start_offset` points below its final position
    #[must_use]
    pub fn new(start_offset: f32) -> Self {
        let mut panel = Self {
            start_offset,
            offset_y: 0.0,
        };
        panel.prepare_offscreen();
        panel
    }

    /// Park the panel offscreen, behind the button's footer
    pub fn prepare_offscreen(&mut self) {
        self.offset_y = self.start_offset;
    }

    /// Spring the panel into place
    ///
    /// Only the position moves; the panel stays opaque and is hidden while
    /// parked by sitting behind the footer. The completion fires when the
    /// spring settles.
    pub fn enter<E: AnimationEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        motion: &SpringMotion,
        on_complete: Completion,
    ) {
        let from_y = std::mem::replace(&mut self.offset_y, 0.0);
        tracing::debug!(from_y, "Success panel entering");

        let request = AnimationRequest::spring(SUCCESS_PANEL_ENTER, motion).change(
            Element::SuccessPanel,
            Transition::Translate {
                from: Offset::new(0.0, from_y),
                to: Offset::ZERO,
            },
        );
        engine.animate(request, Some(on_complete));
    }

    /// Return to the offscreen state
    pub fn reset(&mut self) {
        self.prepare_offscreen();
    }

    /// Whether the panel is at its on-screen resting place
    #[must_use]
    pub fn is_on_screen(&self) -> bool {
        self.offset_y.abs() < f32::EPSILON
    }

    /// Current vertical offset
    #[must_use]
    pub fn offset_y(&self) -> f32 {
        self.offset_y
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::animation::ManualEngine;

    fn motion() -> SpringMotion {
        SpringMotion {
            duration: Duration::from_millis(600),
            delay: Duration::from_millis(100),
            damping: 0.8,
            initial_velocity: 0.5,
        }
    }

    #[test]
    fn test_starts_offscreen() {
        let panel = SuccessPanel::new(300.0);
        assert!(!panel.is_on_screen());
        assert!((panel.offset_y() - 300.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_enter_springs_to_zero() {
        let mut engine = ManualEngine::new();
        let mut panel = SuccessPanel::new(300.0);
        panel.enter(&mut engine, &motion(), Box::new(|| {}));

        assert!(panel.is_on_screen());
        let request = &engine.history()[0];
        assert_eq!(request.name, SUCCESS_PANEL_ENTER);
        assert_eq!(request.total(), Duration::from_millis(700));
        assert_eq!(request.curve, motion().curve());
        assert_eq!(
            request.changes,
            vec![(
                Element::SuccessPanel,
                Transition::Translate {
                    from: Offset::new(0.0, 300.0),
                    to: Offset::ZERO,
                }
            )]
        );
    }

    #[test]
    fn test_reset_parks_again() {
        let mut engine = ManualEngine::new();
        let mut panel = SuccessPanel::new(300.0);
        panel.enter(&mut engine, &motion(), Box::new(|| {}));
        panel.reset();
        assert_eq!(panel, SuccessPanel::new(300.0));
    }
}
