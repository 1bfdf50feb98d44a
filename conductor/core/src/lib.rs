//! Checkout Conductor - Headless Sequencing for a Checkout Confirmation
//!
//! This crate sequences the seven-step "Place Order" confirmation: a button
//! swaps its text, turns white, wipes the text away, lifts a checkmark, lets a
//! success panel rise, turns black again, and finally spreads "Continue
//! Shopping ›" to its edges. It never draws anything. Every visual change is
//! handed to an animation engine, and the sequence advances only when the
//! engine reports that a change has settled.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          UI Surface                               │
//! │        SurfaceEvent (up)          ChoreographyMessage (down)      │
//! └──────────────┬──────────────────────────────▲────────────────────┘
//!                │                              │
//! ┌──────────────▼──────────────────────────────┴────────────────────┐
//! │                        CONDUCTOR CORE                             │
//! │  ┌─────────────────────────────────────────────────────────────┐  │
//! │  │                       Conductor                              │  │
//! │  │  ┌─────────────┐  ┌──────────────┐  ┌────────────────────┐  │  │
//! │  │  │ ActionActor │  │ SuccessPanel │  │   SummaryLabels    │  │  │
//! │  │  │ phases 1-4, │  │   step 5     │  │   step 5 fade      │  │  │
//! │  │  │ 6, 7        │  │              │  │                    │  │  │
//! │  │  └─────────────┘  └──────────────┘  └────────────────────┘  │  │
//! │  └──────────────┬───────────────────────────────┬──────────────┘  │
//! │          AnimationEngine                GeometryProvider          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Conductor`]: Owns the actors and the transition from one phase to the next
//! - [`ActionActor`]: The button and its tap state machine
//! - [`SuccessPanel`]: The message that rises during step 5
//! - [`Phase`] and [`next_cue`]: The fixed order of the sequence
//! - [`AnimationEngine`]: Where visual changes go ([`ManualEngine`], [`TimerEngine`])
//! - [`ChoreographyConfig`]: Every duration, delay and distance
//!
//! # Quick Start
//!
//! ```
//! use checkout_conductor::{ChoreographyConfig, Conductor, SequenceState, SurfaceEvent};
//! use tokio::sync::mpsc;
//!
//! let (tx, _rx) = mpsc::unbounded_channel();
//! let mut conductor = Conductor::headless(ChoreographyConfig::new(), tx);
//!
//! conductor.handle_event(SurfaceEvent::PrimaryTap).unwrap();
//! while conductor.engine_mut().settle_all() > 0 {
//!     conductor.pump().unwrap();
//! }
//! assert_eq!(conductor.state(), SequenceState::Completed);
//! ```
//!
//! # Module Overview
//!
//! - [`phase`]: Phase enum, transition table, actor and sequence states
//! - [`animation`]: Animation requests, curves, and the engine seam
//! - [`geometry`]: Layout queries taken fresh at phase start
//! - [`actor`]: The checkout button
//! - [`panel`]: The success panel
//! - [`conductor`]: Main Conductor struct
//! - [`events`]: Events from the UI surface to the Conductor
//! - [`messages`]: Messages from the Conductor to observers
//! - [`config`]: Configuration loading (TOML, environment, overrides)

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod actor;
pub mod animation;
pub mod conductor;
pub mod config;
pub mod events;
pub mod geometry;
pub mod messages;
pub mod panel;
pub mod phase;

// Re-exports for convenience
pub use actor::{ActionActor, ButtonVisuals, ChoreographyError, ElementVisual, TapEvent};
pub use animation::{
    AnimationEngine, AnimationRequest, Completion, Curve, EasingFunction, Element, Fill,
    ManualEngine, Offset, PendingAnimation, SpringMotion, TimerEngine, Transition,
};
pub use conductor::{Conductor, ConductorStats, SceneSnapshot, SummaryLabels};
pub use events::SurfaceEvent;
pub use geometry::{CheckmarkOffset, GeometryProvider, TextLayout};
pub use messages::{ChoreographyMessage, RunToken};
pub use panel::SuccessPanel;
pub use phase::{next_cue, ActorState, Cue, Phase, SequenceState, TRANSITIONS};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, load_config_with_env,
    ChoreographyConfig, ConfigError, ConfigOverrides, ConfigSource,
};
