//! Animation Engine Seam
//!
//! The core never renders. Every phase describes its visual change as an
//! [`AnimationRequest`] (what moves, from where, to where, over how long) and
//! hands it to an [`AnimationEngine`] together with an optional completion.
//! The engine returns immediately; progress happens on its own scheduler and
//! control comes back only through the completion.
//!
//! # Architecture
//!
//! ```text
//! ActionActor / SuccessPanel / Conductor
//!     │  AnimationRequest + Completion
//!     ▼
//! AnimationEngine
//!     ├─→ ManualEngine  (virtual clock, deterministic, headless)
//!     ├─→ TimerEngine   (tokio timers, real time)
//!     └─→ your renderer (UIKit, wgpu, terminal, ...)
//! ```

mod clock;
mod manual;
mod timing;

pub use clock::{TimerEngine, MAX_TIME_SCALE};
pub use manual::{ManualEngine, PendingAnimation};
pub use timing::{Curve, EasingFunction, SpringMotion};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Callback fired exactly once when a transition settles
pub type Completion = Box<dyn FnOnce() + Send + 'static>;

/// Executes timed visual transitions
///
/// Implementations must return from [`animate`](Self::animate) without
/// blocking and must invoke `on_complete` (when present) exactly once.
pub trait AnimationEngine {
    /// Schedule a transition
    fn animate(&mut self, request: AnimationRequest, on_complete: Option<Completion>);
}

impl<E: AnimationEngine + ?Sized> AnimationEngine for Box<E> {
    fn animate(&mut self, request: AnimationRequest, on_complete: Option<Completion>) {
        (**self).animate(request, on_complete);
    }
}

/// Visual elements the sequence touches
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    /// The button's background surface
    Surface,
    /// "Place Order"
    PlaceOrderLabel,
    /// Container holding "Order placed" and its checkmark
    OrderPlacedContainer,
    /// "Order placed"
    OrderPlacedLabel,
    /// Small checkmark trailing "Order placed"
    ButtonCheckmark,
    /// Clipping mask over "Order placed"
    TextMask,
    /// Free-floating checkmark used from phase 4 on
    FloatingCheckmark,
    /// "Continue Shopping"
    ContinueLabel,
    /// Trailing chevron glyph
    Chevron,
    /// The success message panel
    SuccessPanel,
    /// "Subtotal" label above the button
    SubtotalLabel,
    /// Price label above the button
    PriceLabel,
}

/// 2D translation in points
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    /// Horizontal translation (positive = right)
    pub x: f32,
    /// Vertical translation (positive = down)
    pub y: f32,
}

impl Offset {
    /// Identity translation
    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    /// Create an offset
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal-only offset
    #[must_use]
    pub const fn horizontal(x: f32) -> Self {
        Self { x, y: 0.0 }
    }
}

/// Button surface colour
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fill {
    /// Initial and final colour
    #[default]
    Black,
    /// Transitional colour during the text swap
    Gray,
    /// Light variant shown while the confirmation plays
    White,
}

/// A single property change with its start and end values
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Transition {
    /// Translation change
    Translate {
        /// Start offset
        from: Offset,
        /// End offset
        to: Offset,
    },
    /// Opacity change
    Opacity {
        /// Start opacity
        from: f32,
        /// End opacity
        to: f32,
    },
    /// Surface colour change
    Fill {
        /// Start colour
        from: Fill,
        /// End colour
        to: Fill,
    },
    /// Border width change
    Border {
        /// Start width
        from: f32,
        /// End width
        to: f32,
    },
    /// Mask width change
    MaskWidth {
        /// Start width
        from: f32,
        /// End width
        to: f32,
    },
    /// Mask horizontal position change
    MaskPosition {
        /// Start x
        from: f32,
        /// End x
        to: f32,
    },
}

/// Description of one timed transition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationRequest {
    /// Name for logs and tests (e.g., "text_swap")
    pub name: String,
    /// Transition duration
    pub duration: Duration,
    /// Wait before the transition starts
    pub delay: Duration,
    /// Shape of the transition
    pub curve: Curve,
    /// Everything that changes, per element
    pub changes: Vec<(Element, Transition)>,
}

impl AnimationRequest {
    /// Create an eased transition with no delay
    pub fn eased(name: impl Into<String>, duration: Duration, easing: EasingFunction) -> Self {
        Self {
            name: name.into(),
            duration,
            delay: Duration::ZERO,
            curve: Curve::Eased(easing),
            changes: Vec::new(),
        }
    }

    /// Create a spring transition with the motion's own duration and delay
    pub fn spring(name: impl Into<String>, motion: &SpringMotion) -> Self {
        Self {
            name: name.into(),
            duration: motion.duration,
            delay: motion.delay,
            curve: motion.curve(),
            changes: Vec::new(),
        }
    }

    /// Set the start delay
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Add a property change
    #[must_use]
    pub fn change(mut self, element: Element, transition: Transition) -> Self {
        self.changes.push((element, transition));
        self
    }

    /// Delay plus duration
    #[must_use]
    pub fn total(&self) -> Duration {
        self.delay + self.duration
    }

    /// Progress of the transition `elapsed` after it was scheduled
    ///
    /// Zero until the delay has passed, then follows the curve to exactly 1.0
    /// at the end. A zero-length transition jumps straight to 1.0.
    #[must_use]
    pub fn progress_at(&self, elapsed: Duration) -> f32 {
        let Some(running) = elapsed.checked_sub(self.delay) else {
            return 0.0;
        };
        if running >= self.duration {
            return 1.0;
        }
        self.curve
            .progress(running.as_secs_f32() / self.duration.as_secs_f32())
    }

    /// Whether this request touches the given element
    #[must_use]
    pub fn touches(&self, element: Element) -> bool {
        self.changes.iter().any(|(e, _)| *e == element)
    }
}
