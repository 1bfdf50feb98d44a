//! Conductor - The Sequencing Core
//!
//! The Conductor owns the order of the checkout confirmation. It:
//! - Starts the first phase when the button asks for a sequence
//! - Routes every phase completion through the transition table
//! - Runs step 5 itself, because it touches the labels, the button and the panel
//! - Resets everything when the button asks for it
//!
//! # Design Philosophy
//!
//! The Conductor is renderer-agnostic. Visual work goes out through an
//! [`AnimationEngine`]; layout questions go through a [`GeometryProvider`].
//! Completions never call back into the Conductor. Each one is a closure that
//! posts a `Signal` carrying the [`RunToken`] it was scheduled under, and the
//! Conductor drains those signals from its own queue. A reset bumps the
//! token, so anything still in flight from the old run is recognised and
//! dropped when it lands.
//!
//! ```text
//!  SurfaceEvent::PrimaryTap
//!          │
//!          ▼
//!  ┌───────────────┐  run_phase   ┌─────────────┐  animate  ┌─────────────────┐
//!  │   Conductor   │─────────────▶│ ActionActor │──────────▶│ AnimationEngine │
//!  │               │              └─────────────┘           └────────┬────────┘
//!  │  next_cue()   │                                                 │
//!  │  RunToken     │◀──────── Signal { run, phase } ─────────────────┘
//!  └───────┬───────┘
//!          │ ChoreographyMessage
//!          ▼
//!      observers
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::actor::{ActionActor, ButtonVisuals, ChoreographyError, TapEvent};
use crate::animation::{
    AnimationEngine, AnimationRequest, Completion, EasingFunction, Element, ManualEngine,
    SpringMotion, Transition,
};
use crate::config::ChoreographyConfig;
use crate::events::SurfaceEvent;
use crate::geometry::{GeometryProvider, TextLayout};
use crate::messages::{ChoreographyMessage, RunToken};
use crate::panel::SuccessPanel;
use crate::phase::{next_cue, Cue, Phase, SequenceState};

/// Name of the summary label fade during step 5
pub const LABELS_FADE: &str = "labels_fade";

/// Internal completion signals
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Signal {
    /// A button phase's transition settled
    PhaseSettled { run: RunToken, phase: Phase },
    /// The success panel's entry settled
    PanelSettled { run: RunToken },
}

impl Signal {
    fn run(self) -> RunToken {
        match self {
            Self::PhaseSettled { run, .. } | Self::PanelSettled { run } => run,
        }
    }
}

/// Opacity of the "Subtotal" and price labels above the button
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryLabels {
    /// "Subtotal" opacity
    pub subtotal: f32,
    /// Price opacity
    pub price: f32,
}

impl Default for SummaryLabels {
    fn default() -> Self {
        Self {
            subtotal: 1.0,
            price: 1.0,
        }
    }
}

impl SummaryLabels {
    /// Fade both labels out (fire-and-forget)
    pub fn fade_out<E: AnimationEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        duration: std::time::Duration,
    ) {
        let subtotal = std::mem::replace(&mut self.subtotal, 0.0);
        let price = std::mem::replace(&mut self.price, 0.0);
        let request = AnimationRequest::eased(LABELS_FADE, duration, EasingFunction::EaseInOut)
            .change(
                Element::SubtotalLabel,
                Transition::Opacity {
                    from: subtotal,
                    to: 0.0,
                },
            )
            .change(
                Element::PriceLabel,
                Transition::Opacity {
                    from: price,
                    to: 0.0,
                },
            );
        engine.animate(request, None);
    }

    /// Back to full opacity
    pub fn restore(&mut self) {
        *self = Self::default();
    }
}

/// Counters kept across runs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConductorStats {
    /// Sequences started by a tap from Idle
    pub runs_started: u64,
    /// Sequences that reached the final phase
    pub runs_completed: u64,
    /// Resets applied (tap while Completed or explicit)
    pub resets: u64,
    /// Taps dropped while animating
    pub taps_ignored: u64,
    /// Completions that arrived after a reset and were dropped
    pub stale_completions_dropped: u64,
}

/// Everything observable about the scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Button visuals
    pub button: ButtonVisuals,
    /// Success panel vertical offset
    pub panel_offset_y: f32,
    /// Summary label opacities
    pub labels: SummaryLabels,
}

/// The Conductor - headless sequencing core
pub struct Conductor<E: AnimationEngine, G: GeometryProvider> {
    /// Configuration
    config: ChoreographyConfig,
    /// The checkout button
    actor: ActionActor,
    /// The success message panel
    panel: SuccessPanel,
    /// Labels faded during step 5
    labels: SummaryLabels,
    /// Spring timing shared by the panel entry and phase 6
    reveal: SpringMotion,
    /// Animation engine
    engine: E,
    /// Layout access
    geometry: G,
    /// Current run
    run: RunToken,
    /// Whole-system state
    state: SequenceState,
    /// Counters
    stats: ConductorStats,
    /// Channel to observers
    tx: mpsc::UnboundedSender<ChoreographyMessage>,
    /// Completion closures post here
    signal_tx: mpsc::UnboundedSender<Signal>,
    signal_rx: mpsc::UnboundedReceiver<Signal>,
}

impl Conductor<ManualEngine, TextLayout> {
    /// Create a Conductor on a virtual clock with text-metrics layout
    #[must_use]
    pub fn headless(
        config: ChoreographyConfig,
        tx: mpsc::UnboundedSender<ChoreographyMessage>,
    ) -> Self {
        let layout = TextLayout::new(config.layout.clone(), config.copy.clone());
        Self::new(ManualEngine::new(), layout, config, tx)
    }
}

impl<E: AnimationEngine, G: GeometryProvider> Conductor<E, G> {
    /// Create a new Conductor
    pub fn new(
        engine: E,
        geometry: G,
        config: ChoreographyConfig,
        tx: mpsc::UnboundedSender<ChoreographyMessage>,
    ) -> Self {
        let reveal = config.reveal_motion();
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();

        Self {
            actor: ActionActor::new(config.clone(), reveal),
            panel: SuccessPanel::new(config.distances.panel_start_offset),
            labels: SummaryLabels::default(),
            reveal,
            engine,
            geometry,
            run: RunToken::default(),
            state: SequenceState::Idle,
            stats: ConductorStats::default(),
            tx,
            signal_tx,
            signal_rx,
            config,
        }
    }

    /// Get current state
    #[must_use]
    pub fn state(&self) -> SequenceState {
        self.state
    }

    /// Get the current run token
    #[must_use]
    pub fn run_token(&self) -> RunToken {
        self.run
    }

    /// Get counters
    #[must_use]
    pub fn stats(&self) -> ConductorStats {
        self.stats
    }

    /// Get configuration
    #[must_use]
    pub fn config(&self) -> &ChoreographyConfig {
        &self.config
    }

    /// Get the button actor
    #[must_use]
    pub fn actor(&self) -> &ActionActor {
        &self.actor
    }

    /// Get the success panel
    #[must_use]
    pub fn panel(&self) -> &SuccessPanel {
        &self.panel
    }

    /// Get the summary labels
    #[must_use]
    pub fn labels(&self) -> SummaryLabels {
        self.labels
    }

    /// Get the animation engine
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Get the animation engine mutably (to advance a virtual clock)
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Get the geometry provider mutably (to change layout between runs)
    pub fn geometry_mut(&mut self) -> &mut G {
        &mut self.geometry
    }

    /// Capture everything observable
    #[must_use]
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            button: self.actor.visuals().clone(),
            panel_offset_y: self.panel.offset_y(),
            labels: self.labels,
        }
    }

    /// Handle an event from the UI surface
    ///
    /// # Errors
    ///
    /// Propagates a [`ChoreographyError`] if the button rejects the first
    /// phase, which means the actor and the Conductor disagree on state.
    pub fn handle_event(&mut self, event: SurfaceEvent) -> Result<(), ChoreographyError> {
        match event {
            SurfaceEvent::PrimaryTap => match self.actor.on_primary_tap() {
                Some(TapEvent::SequenceStartRequested) => self.start_sequence(),
                Some(TapEvent::ResetRequested) => {
                    self.reset();
                    Ok(())
                }
                None => {
                    self.stats.taps_ignored += 1;
                    self.send(ChoreographyMessage::TapIgnored);
                    Ok(())
                }
            },
        }
    }

    /// Process every completion that has settled so far
    ///
    /// Returns the number of signals handled, stale ones included.
    ///
    /// # Errors
    ///
    /// Returns the first [`ChoreographyError`] raised while advancing.
    /// Signals after it stay queued.
    pub fn pump(&mut self) -> Result<usize, ChoreographyError> {
        let mut handled = 0;
        while let Ok(signal) = self.signal_rx.try_recv() {
            self.dispatch(signal)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Return every component to its Idle snapshot
    ///
    /// Safe at any time. Transitions already handed to the engine keep
    /// running, but their completions belong to the old run and are dropped.
    pub fn reset(&mut self) {
        self.run = self.run.next();
        self.actor.reset();
        self.panel.reset();
        self.labels.restore();
        self.state = SequenceState::Idle;
        self.stats.resets += 1;

        tracing::info!(run = self.run.0, "Reset applied");
        self.send(ChoreographyMessage::ResetApplied { run: self.run });
    }

    /// Run the event loop until the surface hangs up and the sequence is at rest
    ///
    /// Returns the Conductor so the caller can inspect its final state.
    ///
    /// # Errors
    ///
    /// Stops at the first [`ChoreographyError`].
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<SurfaceEvent>,
    ) -> Result<Self, ChoreographyError> {
        let mut events_open = true;

        loop {
            if !events_open && !self.state.is_running() {
                break;
            }

            tokio::select! {
                event = events.recv(), if events_open => match event {
                    Some(event) => self.handle_event(event)?,
                    None => {
                        tracing::debug!("Surface closed; finishing current run");
                        events_open = false;
                    }
                },
                Some(signal) = self.signal_rx.recv() => self.dispatch(signal)?,
            }
        }

        Ok(self)
    }

    fn start_sequence(&mut self) -> Result<(), ChoreographyError> {
        self.stats.runs_started += 1;
        tracing::info!(run = self.run.0, "Sequence started");
        self.send(ChoreographyMessage::SequenceStarted { run: self.run });
        self.start_phase(Phase::first())
    }

    fn start_phase(&mut self, phase: Phase) -> Result<(), ChoreographyError> {
        let on_complete = self.phase_completion(phase);
        self.actor
            .run_phase(phase, &mut self.engine, &mut self.geometry, on_complete)
            .inspect_err(|e| tracing::warn!(error = %e, "Phase rejected"))?;

        self.state = SequenceState::Running(phase);
        self.send(ChoreographyMessage::PhaseStarted { phase });
        Ok(())
    }

    fn dispatch(&mut self, signal: Signal) -> Result<(), ChoreographyError> {
        if signal.run() != self.run {
            self.stats.stale_completions_dropped += 1;
            tracing::debug!(
                signal = ?signal,
                current = self.run.0,
                "Dropping completion from an earlier run"
            );
            return Ok(());
        }

        match signal {
            Signal::PhaseSettled { phase, .. } => self.on_phase_completed(phase),
            Signal::PanelSettled { .. } => {
                tracing::debug!(run = self.run.0, "Success panel settled");
                self.send(ChoreographyMessage::RevealSettled);
                self.start_phase(Phase::ButtonToBlack)
            }
        }
    }

    fn on_phase_completed(&mut self, phase: Phase) -> Result<(), ChoreographyError> {
        self.actor.finish_phase(phase)?;
        tracing::debug!(phase = ?phase, run = self.run.0, "Phase completed");
        self.send(ChoreographyMessage::PhaseCompleted { phase });

        match next_cue(phase) {
            Cue::Actor(next) => self.start_phase(next),
            Cue::RevealSuccess => {
                self.reveal_success();
                Ok(())
            }
            Cue::Terminal => {
                self.state = SequenceState::Completed;
                self.stats.runs_completed += 1;
                tracing::info!(run = self.run.0, "Sequence completed");
                self.send(ChoreographyMessage::SequenceCompleted { run: self.run });
                Ok(())
            }
        }
    }

    // Step 5: both fades are fire-and-forget; only the panel gates phase 6
    fn reveal_success(&mut self) {
        self.state = SequenceState::Revealing;
        self.send(ChoreographyMessage::RevealStarted);

        self.labels
            .fade_out(&mut self.engine, self.config.timing.labels_fade);
        self.actor.fade_auxiliary_icon(&mut self.engine);

        let on_complete = self.panel_completion();
        self.panel.enter(&mut self.engine, &self.reveal, on_complete);
    }

    fn phase_completion(&self, phase: Phase) -> Completion {
        let signal_tx = self.signal_tx.clone();
        let run = self.run;
        Box::new(move || {
            // The receiver lives as long as the Conductor
            let _ = signal_tx.send(Signal::PhaseSettled { run, phase });
        })
    }

    fn panel_completion(&self) -> Completion {
        let signal_tx = self.signal_tx.clone();
        let run = self.run;
        Box::new(move || {
            let _ = signal_tx.send(Signal::PanelSettled { run });
        })
    }

    fn send(&self, msg: ChoreographyMessage) {
        if self.tx.send(msg).is_err() {
            tracing::trace!(message = ?msg, "No observer listening");
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn conductor() -> (
        Conductor<ManualEngine, TextLayout>,
        mpsc::UnboundedReceiver<ChoreographyMessage>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Conductor::headless(ChoreographyConfig::new(), tx), rx)
    }

    fn settle(conductor: &mut Conductor<ManualEngine, TextLayout>) {
        loop {
            let fired = conductor.engine_mut().settle_all();
            conductor.pump().unwrap();
            if fired == 0 {
                break;
            }
        }
    }

    #[test]
    fn test_tap_starts_first_phase() {
        let (mut conductor, mut rx) = conductor();
        conductor.handle_event(SurfaceEvent::PrimaryTap).unwrap();

        assert_eq!(conductor.state(), SequenceState::Running(Phase::TextSwap));
        assert_eq!(
            rx.try_recv().unwrap(),
            ChoreographyMessage::SequenceStarted { run: RunToken(0) }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ChoreographyMessage::PhaseStarted {
                phase: Phase::TextSwap
            }
        );
    }

    #[test]
    fn test_full_sequence_completes() {
        let (mut conductor, _rx) = conductor();
        conductor.handle_event(SurfaceEvent::PrimaryTap).unwrap();
        settle(&mut conductor);

        assert_eq!(conductor.state(), SequenceState::Completed);
        assert!(conductor.panel().is_on_screen());
        assert!(conductor.labels().price.abs() < f32::EPSILON);
        assert_eq!(conductor.stats().runs_completed, 1);
    }

    #[test]
    fn test_stale_signal_dropped() {
        let (mut conductor, _rx) = conductor();
        conductor.handle_event(SurfaceEvent::PrimaryTap).unwrap();
        let late = conductor
            .engine_mut()
            .detach_named(Phase::TextSwap.name())
            .unwrap();

        conductor.reset();
        late.complete();
        assert_eq!(conductor.pump().unwrap(), 1);

        assert_eq!(conductor.state(), SequenceState::Idle);
        assert_eq!(conductor.stats().stale_completions_dropped, 1);
        assert_eq!(conductor.engine().history().len(), 1);
    }

    #[test]
    fn test_labels_restore_on_reset() {
        let (mut conductor, _rx) = conductor();
        conductor.handle_event(SurfaceEvent::PrimaryTap).unwrap();
        settle(&mut conductor);
        conductor.handle_event(SurfaceEvent::PrimaryTap).unwrap();

        assert_eq!(conductor.labels(), SummaryLabels::default());
        assert_eq!(conductor.stats().resets, 1);
        assert_eq!(conductor.run_token(), RunToken(1));
    }

    #[test]
    fn test_each_tap_outcome_has_its_own_counter() {
        let (mut conductor, mut rx) = conductor();
        conductor.handle_event(SurfaceEvent::PrimaryTap).unwrap();
        conductor.handle_event(SurfaceEvent::PrimaryTap).unwrap();
        settle(&mut conductor);
        conductor.handle_event(SurfaceEvent::PrimaryTap).unwrap();
        conductor.handle_event(SurfaceEvent::PrimaryTap).unwrap();

        let mut ignored = 0;
        while let Ok(msg) = rx.try_recv() {
            if msg == ChoreographyMessage::TapIgnored {
                ignored += 1;
            }
        }
        assert_eq!(ignored, 1);
        assert_eq!(
            conductor.stats(),
            ConductorStats {
                runs_started: 2,
                runs_completed: 1,
                resets: 1,
                taps_ignored: 1,
                stale_completions_dropped: 0,
            }
        );
        assert_eq!(conductor.state(), SequenceState::Running(Phase::TextSwap));
    }
}
