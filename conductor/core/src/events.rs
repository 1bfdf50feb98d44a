//! Surface Events
//!
//! Events sent from a UI surface to the Conductor.
//!
//! # Design Philosophy
//!
//! The surface only reports what the user did. Whether a tap starts the
//! sequence, is ignored, or resets everything is decided by the button actor
//! and the Conductor, never by the surface.

use serde::{Deserialize, Serialize};

/// Events from UI Surface to Conductor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    /// The user tapped the checkout button
    PrimaryTap,
}
