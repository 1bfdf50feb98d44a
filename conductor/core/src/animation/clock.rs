//! Timer Engine
//!
//! Real-time engine backed by tokio timers. Each request gets its own task
//! that waits out the transition and then fires the completion. Useful for
//! headless playback and for surfaces that render on their own but still want
//! the core to advance on wall-clock time.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use super::{AnimationEngine, AnimationRequest, Completion};

/// Largest accepted time scale (100x slower than designed)
pub const MAX_TIME_SCALE: f32 = 100.0;

/// Tokio-backed animation engine
#[derive(Clone, Debug)]
pub struct TimerEngine {
    handle: Handle,
    time_scale: f32,
    in_flight: Arc<AtomicUsize>,
}

impl TimerEngine {
    /// Create an engine that spawns onto the given runtime
    ///
    /// `time_scale` multiplies every wait (0.0 = settle immediately,
    /// 2.0 = half speed). Negative and NaN values are treated as 0.0, and
    /// anything above [`MAX_TIME_SCALE`] is capped.
    #[must_use]
    pub fn new(handle: Handle, time_scale: f32) -> Self {
        let time_scale = if time_scale.is_nan() {
            0.0
        } else {
            time_scale.clamp(0.0, MAX_TIME_SCALE)
        };
        Self {
            handle,
            time_scale,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of transitions that have not settled yet
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Current time scale
    #[must_use]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }
}

impl AnimationEngine for TimerEngine {
    fn animate(&mut self, request: AnimationRequest, on_complete: Option<Completion>) {
        let wait = scaled_wait(request.total(), self.time_scale);
        let in_flight = Arc::clone(&self.in_flight);
        in_flight.fetch_add(1, Ordering::SeqCst);

        tracing::trace!(name = %request.name, wait_ms = wait.as_millis(), "Starting animation timer");

        self.handle.spawn(async move {
            // Animation timer: the transition's own delay + duration
            tokio::time::sleep(wait).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            tracing::trace!(name = %request.name, "Animation timer elapsed");
            if let Some(done) = on_complete {
                done();
            }
        });
    }
}

/// Scale a wait without panicking on overflow
fn scaled_wait(total: Duration, time_scale: f32) -> Duration {
    Duration::try_from_secs_f64(total.as_secs_f64() * f64::from(time_scale)).unwrap_or_else(|err| {
        tracing::warn!(?total, time_scale, %err, "Animation wait out of range, capping");
        Duration::MAX
    })
}
