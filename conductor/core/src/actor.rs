//! Action Actor - The Checkout Button
//!
//! Owns the button's visual elements, its tap-driven state, and six of the
//! seven phases. Each phase assigns the end-state values to the actor's own
//! model immediately and asks the engine to animate from the old values to
//! the new ones. Re-assigning end states is idempotent, which is what makes
//! [`ActionActor::reset`] safe at any moment.
//!
//! The actor never calls the Conductor. Taps return a [`TapEvent`]
//! directly; phase completions arrive through the [`Completion`] the
//! Conductor passes into [`ActionActor::run_phase`], and the Conductor then
//! reports them back via [`ActionActor::finish_phase`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::{
    AnimationEngine, AnimationRequest, Completion, EasingFunction, Element, Fill, Offset,
    SpringMotion, Transition,
};
use crate::config::ChoreographyConfig;
use crate::geometry::{CheckmarkOffset, GeometryProvider};
use crate::phase::{ActorState, Phase};

/// Name of the phase 3 container shift that runs beside the mask wipe
pub const CHECKMARK_TRACK: &str = "checkmark_track";

/// Name of the floating checkmark fade during the reveal
pub const AUXILIARY_FADE: &str = "auxiliary_fade";

/// Precondition violations in the phase protocol
///
/// None of these can be caused by user input; they indicate a sequencing bug
/// in whoever drives the actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ChoreographyError {
    /// A phase was requested while no sequence is running
    #[error("phase {requested} requested while the actor is {state:?}")]
    NotAnimating {
        /// Requested phase
        requested: Phase,
        /// Actor state at the time
        state: ActorState,
    },

    /// A phase was requested before the previous one completed
    #[error("phase {requested} requested while {in_flight} is still running")]
    PhaseInFlight {
        /// Requested phase
        requested: Phase,
        /// Phase still running
        in_flight: Phase,
    },

    /// A phase was requested out of sequence
    #[error("phase {requested} requested out of order (expected {expected:?})")]
    OutOfOrder {
        /// Requested phase
        requested: Phase,
        /// Phase the actor expected next (None after the last phase)
        expected: Option<Phase>,
    },

    /// A completion arrived for a phase that is not in flight
    #[error("completion for {phase} arrived while {in_flight:?} is in flight")]
    UnexpectedCompletion {
        /// Phase the completion names
        phase: Phase,
        /// Phase actually in flight
        in_flight: Option<Phase>,
    },
}

/// What a tap asks the Conductor to do
///
/// A tap while Animating raises nothing, so it has no variant here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TapEvent {
    /// First tap from Idle
    SequenceStartRequested,
    /// Tap while Completed
    ResetRequested,
}

/// Translation and opacity of one element
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementVisual {
    /// Current translation
    pub offset: Offset,
    /// Current opacity
    pub opacity: f32,
}

impl ElementVisual {
    /// Create a visual state
    #[must_use]
    pub const fn new(offset: Offset, opacity: f32) -> Self {
        Self { offset, opacity }
    }

    /// Assign a new offset and describe the change
    pub fn translate_to(&mut self, to: Offset) -> Transition {
        let from = std::mem::replace(&mut self.offset, to);
        Transition::Translate { from, to }
    }

    /// Assign a new opacity and describe the change
    pub fn fade_to(&mut self, to: f32) -> Transition {
        let from = std::mem::replace(&mut self.opacity, to);
        Transition::Opacity { from, to }
    }
}

/// The clipping mask over "Order placed"
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskVisual {
    /// Visible width
    pub width: f32,
    /// Horizontal centre within the label
    pub position_x: f32,
}

/// Snapshot of every element the button owns
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ButtonVisuals {
    /// Surface colour
    pub fill: Fill,
    /// Surface border width
    pub border_width: f32,
    /// "Place Order"
    pub place_order: ElementVisual,
    /// Container of "Order placed" + checkmark
    pub order_placed: ElementVisual,
    /// "Order placed" text
    pub order_placed_label: ElementVisual,
    /// Checkmark inside the container
    pub button_checkmark: ElementVisual,
    /// Free-floating checkmark
    pub floating_checkmark: ElementVisual,
    /// "Continue Shopping"
    pub continue_label: ElementVisual,
    /// Trailing chevron
    pub chevron: ElementVisual,
    /// Mask over "Order placed" (absent until phase 3)
    pub text_mask: Option<MaskVisual>,
}

impl ButtonVisuals {
    /// The documented Idle snapshot
    #[must_use]
    pub fn initial(config: &ChoreographyConfig) -> Self {
        let d = &config.distances;
        Self {
            fill: Fill::Black,
            border_width: 0.0,
            place_order: ElementVisual::new(Offset::ZERO, 1.0),
            order_placed: ElementVisual::new(Offset::horizontal(d.order_placed_entry_offset), 0.0),
            order_placed_label: ElementVisual::new(Offset::ZERO, 1.0),
            button_checkmark: ElementVisual::new(Offset::ZERO, 1.0),
            floating_checkmark: ElementVisual::new(Offset::ZERO, 0.0),
            continue_label: ElementVisual::new(
                Offset::new(0.0, d.continue_label_slide_offset),
                0.0,
            ),
            chevron: ElementVisual::new(d.chevron_parked, 0.0),
            text_mask: None,
        }
    }

    fn fill_to(&mut self, to: Fill) -> Transition {
        let from = std::mem::replace(&mut self.fill, to);
        Transition::Fill { from, to }
    }

    fn border_to(&mut self, to: f32) -> Transition {
        let from = std::mem::replace(&mut self.border_width, to);
        Transition::Border { from, to }
    }
}

/// The checkout button
#[derive(Clone, Debug)]
pub struct ActionActor {
    config: ChoreographyConfig,
    reveal: SpringMotion,
    state: ActorState,
    visuals: ButtonVisuals,
    last_completed: Option<Phase>,
    in_flight: Option<Phase>,
}

impl ActionActor {
    /// Create an actor in the Idle snapshot
    ///
    /// `reveal` is the spring timing phase 6 shares with the success panel.
    #[must_use]
    pub fn new(config: ChoreographyConfig, reveal: SpringMotion) -> Self {
        let visuals = ButtonVisuals::initial(&config);
        Self {
            config,
            reveal,
            state: ActorState::Idle,
            visuals,
            last_completed: None,
            in_flight: None,
        }
    }

    /// Current tap state
    #[must_use]
    pub fn state(&self) -> ActorState {
        self.state
    }

    /// Current visual snapshot
    #[must_use]
    pub fn visuals(&self) -> &ButtonVisuals {
        &self.visuals
    }

    /// Phase currently animating, if any
    #[must_use]
    pub fn in_flight(&self) -> Option<Phase> {
        self.in_flight
    }

    /// Phase the actor will accept next
    #[must_use]
    pub fn expected_phase(&self) -> Option<Phase> {
        match self.last_completed {
            None => Some(Phase::first()),
            Some(phase) => phase.next_for_actor(),
        }
    }

    /// Handle a tap on the button
    ///
    /// Idle starts a sequence, Completed asks for a reset, and a tap while
    /// Animating is dropped without side effects.
    pub fn on_primary_tap(&mut self) -> Option<TapEvent> {
        match self.state {
            ActorState::Idle => {
                self.state = ActorState::Animating;
                Some(TapEvent::SequenceStartRequested)
            }
            ActorState::Animating => {
                tracing::debug!(in_flight = ?self.in_flight, "Tap ignored while animating");
                None
            }
            ActorState::Completed => Some(TapEvent::ResetRequested),
        }
    }

    /// Start a phase
    ///
    /// # Errors
    ///
    /// Rejects the call when no sequence is running, a phase is still in
    /// flight, or `phase` is not the next one in order. Nothing is scheduled
    /// when an error is returned.
    pub fn run_phase<E, G>(
        &mut self,
        phase: Phase,
        engine: &mut E,
        geometry: &mut G,
        on_complete: Completion,
    ) -> Result<(), ChoreographyError>
    where
        E: AnimationEngine + ?Sized,
        G: GeometryProvider + ?Sized,
    {
        self.check_can_run(phase)?;
        tracing::debug!(phase = %phase, step = phase.step(), "Running phase");

        match phase {
            Phase::TextSwap => self.text_swap(engine, on_complete),
            Phase::ButtonToWhite => self.button_to_white(engine, on_complete),
            Phase::TextMaskDisappear => self.text_mask_disappear(engine, geometry, on_complete),
            Phase::CheckmarkMovesUp => self.checkmark_moves_up(engine, geometry, on_complete),
            Phase::ButtonToBlack => self.button_to_black(engine, on_complete),
            Phase::TextChevronSpread => self.text_chevron_spread(engine, geometry, on_complete),
        }

        self.in_flight = Some(phase);
        Ok(())
    }

    /// Record that a phase's transition settled
    ///
    /// The sequence reaches Completed only here, at the end of the last phase.
    ///
    /// # Errors
    ///
    /// Returns [`ChoreographyError::UnexpectedCompletion`] if `phase` is not
    /// the phase in flight.
    pub fn finish_phase(&mut self, phase: Phase) -> Result<(), ChoreographyError> {
        if self.in_flight != Some(phase) {
            return Err(ChoreographyError::UnexpectedCompletion {
                phase,
                in_flight: self.in_flight,
            });
        }
        self.in_flight = None;
        self.last_completed = Some(phase);
        if phase.next_for_actor().is_none() {
            self.state = ActorState::Completed;
        }
        Ok(())
    }

    /// Fade the floating checkmark out (fire-and-forget)
    pub fn fade_auxiliary_icon<E: AnimationEngine + ?Sized>(&mut self, engine: &mut E) {
        let request = AnimationRequest::eased(
            AUXILIARY_FADE,
            self.config.timing.labels_fade,
            EasingFunction::EaseInOut,
        )
        .change(
            Element::FloatingCheckmark,
            self.visuals.floating_checkmark.fade_to(0.0),
        );
        engine.animate(request, None);
    }

    /// Restore the Idle snapshot
    ///
    /// In-flight transitions are not cancelled; their completions must be
    /// filtered by whoever issued them.
    pub fn reset(&mut self) {
        self.state = ActorState::Idle;
        self.visuals = ButtonVisuals::initial(&self.config);
        self.last_completed = None;
        self.in_flight = None;
    }

    fn check_can_run(&self, requested: Phase) -> Result<(), ChoreographyError> {
        if self.state != ActorState::Animating {
            return Err(ChoreographyError::NotAnimating {
                requested,
                state: self.state,
            });
        }
        if let Some(in_flight) = self.in_flight {
            return Err(ChoreographyError::PhaseInFlight {
                requested,
                in_flight,
            });
        }
        let expected = self.expected_phase();
        if expected != Some(requested) {
            return Err(ChoreographyError::OutOfOrder {
                requested,
                expected,
            });
        }
        Ok(())
    }

    // Phase 1: swap "Place Order" for "Order placed ✓"
    fn text_swap<E: AnimationEngine + ?Sized>(&mut self, engine: &mut E, on_complete: Completion) {
        let v = &mut self.visuals;
        v.order_placed.opacity = 1.0;

        let exit = Offset::horizontal(self.config.distances.place_order_exit);
        let request = AnimationRequest::eased(
            Phase::TextSwap.name(),
            self.config.timing.text_swap,
            EasingFunction::EaseInOut,
        )
        .change(Element::PlaceOrderLabel, v.place_order.translate_to(exit))
        .change(Element::PlaceOrderLabel, v.place_order.fade_to(0.0))
        .change(
            Element::OrderPlacedContainer,
            v.order_placed.translate_to(Offset::ZERO),
        )
        .change(Element::Surface, v.fill_to(Fill::Gray));

        engine.animate(request, Some(on_complete));
    }

    // Phase 2: surface goes white with a border
    fn button_to_white<E: AnimationEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        on_complete: Completion,
    ) {
        let timing = &self.config.timing;
        let v = &mut self.visuals;
        let request = AnimationRequest::eased(
            Phase::ButtonToWhite.name(),
            timing.button_to_white,
            EasingFunction::EaseInOut,
        )
        .with_delay(timing.button_to_white_delay)
        .change(Element::Surface, v.fill_to(Fill::White))
        .change(Element::Surface, v.border_to(self.config.layout.border_width));

        engine.animate(request, Some(on_complete));
    }

    // Phase 3: mask wipes the text, container shifts so the checkmark tracks it
    fn text_mask_disappear<E, G>(&mut self, engine: &mut E, geometry: &mut G, on_complete: Completion)
    where
        E: AnimationEngine + ?Sized,
        G: GeometryProvider + ?Sized,
    {
        geometry.layout_if_needed();
        let text_width = geometry.bounds_width(Element::OrderPlacedLabel);
        if text_width <= 0.0 {
            tracing::warn!("Measured zero text width; mask will be degenerate");
        }

        self.visuals.text_mask = Some(MaskVisual {
            width: 0.0,
            position_x: text_width,
        });
        let duration = self.config.timing.text_mask;
        let wipe = AnimationRequest::eased(
            Phase::TextMaskDisappear.name(),
            duration,
            EasingFunction::EaseOut,
        )
        .change(
            Element::TextMask,
            Transition::MaskWidth {
                from: text_width,
                to: 0.0,
            },
        )
        .change(
            Element::TextMask,
            Transition::MaskPosition {
                from: text_width / 2.0,
                to: text_width,
            },
        );

        let shift = -(text_width / 2.0) - self.config.layout.checkmark_spacing / 2.0;
        let track = AnimationRequest::eased(CHECKMARK_TRACK, duration, EasingFunction::EaseOut)
            .change(
                Element::OrderPlacedContainer,
                self.visuals.order_placed.translate_to(Offset::horizontal(shift)),
            );

        engine.animate(wipe, Some(on_complete));
        engine.animate(track, None);
    }

    // Phase 4: swap in the floating checkmark and lift it
    fn checkmark_moves_up<E, G>(&mut self, engine: &mut E, geometry: &mut G, on_complete: Completion)
    where
        E: AnimationEngine + ?Sized,
        G: GeometryProvider + ?Sized,
    {
        let snapshot = CheckmarkOffset::measure(geometry, self.visuals.order_placed.offset.x);
        tracing::debug!(offset_x = snapshot.x, "Checkmark geometry snapshot");

        let d = &self.config.distances;
        let timing = &self.config.timing;
        let v = &mut self.visuals;
        v.order_placed_label.opacity = 0.0;
        v.button_checkmark.opacity = 0.0;
        v.floating_checkmark = ElementVisual::new(Offset::horizontal(snapshot.x), 1.0);

        let request = AnimationRequest::eased(
            Phase::CheckmarkMovesUp.name(),
            timing.checkmark_up,
            EasingFunction::EaseInOut,
        )
        .with_delay(timing.checkmark_up_delay)
        .change(
            Element::FloatingCheckmark,
            v.floating_checkmark
                .translate_to(Offset::new(snapshot.x, -d.checkmark_upward)),
        )
        .change(
            Element::FloatingCheckmark,
            v.floating_checkmark.fade_to(d.checkmark_lift_opacity),
        );

        engine.animate(request, Some(on_complete));
    }

    // Phase 6: back to black, "Continue Shopping ›" springs in with the panel
    fn button_to_black<E: AnimationEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        on_complete: Completion,
    ) {
        let v = &mut self.visuals;
        v.order_placed.opacity = 0.0;
        v.continue_label.opacity = 1.0;
        v.chevron.opacity = 1.0;

        let request = AnimationRequest::spring(Phase::ButtonToBlack.name(), &self.reveal)
            .change(Element::Surface, v.fill_to(Fill::Black))
            .change(Element::Surface, v.border_to(0.0))
            .change(
                Element::ContinueLabel,
                v.continue_label.translate_to(Offset::ZERO),
            )
            .change(Element::Chevron, v.chevron.translate_to(Offset::ZERO));

        engine.animate(request, Some(on_complete));
    }

    // Phase 7: label to the leading edge, chevron to the trailing edge
    fn text_chevron_spread<E, G>(&mut self, engine: &mut E, geometry: &mut G, on_complete: Completion)
    where
        E: AnimationEngine + ?Sized,
        G: GeometryProvider + ?Sized,
    {
        let button_width = geometry.button_width();
        let text_width = geometry.intrinsic_width(Element::ContinueLabel);
        let chevron_width = geometry.intrinsic_width(Element::Chevron);
        let padding = self.config.layout.horizontal_padding;

        let text_x = -(button_width / 2.0) + padding + text_width / 2.0;
        // The chevron's resting place already hangs off the label's trailing edge
        let chevron_x = button_width / 2.0 - padding - text_width / 2.0 - chevron_width;

        let timing = &self.config.timing;
        let v = &mut self.visuals;
        let request = AnimationRequest::eased(
            Phase::TextChevronSpread.name(),
            timing.spread,
            EasingFunction::EaseOut,
        )
        .with_delay(timing.spread_delay)
        .change(
            Element::ContinueLabel,
            v.continue_label.translate_to(Offset::horizontal(text_x)),
        )
        .change(
            Element::Chevron,
            v.chevron.translate_to(Offset::horizontal(chevron_x)),
        );

        engine.animate(request, Some(on_complete));
    }
}
