//! Timing Curves
//!
//! Easing and spring curves describing how a transition moves from its start
//! value to its end value. The core never interpolates frames itself; these
//! exist so an engine (or a test) can ask "how far along is this transition".

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Easing functions for timed transitions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EasingFunction {
    /// No easing (constant speed)
    #[default]
    Linear,

    /// Slow start, fast end
    EaseIn,

    /// Fast start, slow end
    EaseOut,

    /// Slow start and end
    EaseInOut,
}

impl EasingFunction {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t).powi(2),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Spring-driven motion with explicit timing
///
/// The success panel entry and the button's return to black share one of these
/// so both land at the same moment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpringMotion {
    /// How long the spring runs
    pub duration: Duration,
    /// Wait before the spring starts
    pub delay: Duration,
    /// Damping ratio (0.0 exclusive to 1.0; 1.0 = no overshoot)
    pub damping: f32,
    /// Initial velocity, in total distances per duration
    pub initial_velocity: f32,
}

impl SpringMotion {
    /// The curve this motion follows
    #[must_use]
    pub fn curve(&self) -> Curve {
        Curve::Spring {
            damping: self.damping,
            initial_velocity: self.initial_velocity,
        }
    }
}

/// Shape of a transition over its duration
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Curve {
    /// A classic easing curve
    Eased(EasingFunction),
    /// Damped spring that settles exactly at the end of the duration
    Spring {
        /// Damping ratio
        damping: f32,
        /// Initial velocity
        initial_velocity: f32,
    },
}

impl Default for Curve {
    fn default() -> Self {
        Self::Eased(EasingFunction::Linear)
    }
}

/// Natural frequency chosen so the envelope decays to ~0.1% by t = 1
const SPRING_SETTLE_LN: f32 = 6.907_755;

impl Curve {
    /// Map linear time (0.0 to 1.0) to transition progress
    ///
    /// Spring curves may overshoot 1.0 mid-flight but always return exactly
    /// 1.0 at the end.
    #[must_use]
    pub fn progress(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Eased(easing) => easing.apply(t),
            Self::Spring {
                damping,
                initial_velocity,
            } => {
                if t >= 1.0 {
                    return 1.0;
                }
                let zeta = damping.clamp(0.05, 1.0);
                let omega = SPRING_SETTLE_LN / zeta;
                if zeta >= 1.0 {
                    // Critically damped
                    let envelope = (-omega * t).exp();
                    1.0 - envelope * (1.0 + (omega - initial_velocity) * t)
                } else {
                    let omega_d = omega * (1.0 - zeta * zeta).sqrt();
                    let envelope = (-zeta * omega * t).exp();
                    let sine_term = (zeta * omega - initial_velocity) / omega_d;
                    1.0 - envelope * ((omega_d * t).cos() + sine_term * (omega_d * t).sin())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [
            EasingFunction::Linear,
            EasingFunction::EaseIn,
            EasingFunction::EaseOut,
            EasingFunction::EaseInOut,
        ] {
            assert!(easing.apply(0.0).abs() < 0.001, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 0.001, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_easing_clamps_input() {
        assert!((EasingFunction::EaseOut.apply(2.0) - 1.0).abs() < f32::EPSILON);
        assert!(EasingFunction::EaseIn.apply(-1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ease_out_leads_ease_in() {
        assert!(EasingFunction::EaseOut.apply(0.3) > EasingFunction::EaseIn.apply(0.3));
        assert!((EasingFunction::EaseInOut.apply(0.5) - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_spring_settles_at_end() {
        let curve = Curve::Spring {
            damping: 0.8,
            initial_velocity: 0.5,
        };
        assert!(curve.progress(0.0).abs() < 0.001);
        assert!((curve.progress(1.0) - 1.0).abs() < f32::EPSILON);
        assert!((curve.progress(0.95) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_critically_damped_spring_does_not_overshoot() {
        let curve = Curve::Spring {
            damping: 1.0,
            initial_velocity: 0.0,
        };
        for i in 0..=20 {
            let p = curve.progress(i as f32 / 20.0);
            assert!(p <= 1.0 + 0.0001, "overshoot at step {i}: {p}");
        }
    }

    #[test]
    fn test_spring_motion_curve() {
        let motion = SpringMotion {
            duration: Duration::from_millis(600),
            delay: Duration::from_millis(100),
            damping: 0.8,
            initial_velocity: 0.5,
        };
        assert_eq!(
            motion.curve(),
            Curve::Spring {
                damping: 0.8,
                initial_velocity: 0.5
            }
        );
    }
}
