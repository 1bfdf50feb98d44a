//! Manual Engine
//!
//! A deterministic engine driven by a virtual clock. Nothing happens until the
//! caller advances time or settles requests, which makes every ordering
//! question in the sequence testable without real timers.

use std::fmt;
use std::time::Duration;

use super::{AnimationEngine, AnimationRequest, Completion};

struct Scheduled {
    /// Also the request's index in `history`
    seq: u64,
    started: Duration,
    due: Duration,
    name: String,
    on_complete: Option<Completion>,
}

/// A transition removed from the engine before it settled
///
/// Holding one of these lets a test deliver a completion late, after the
/// sequence has moved on or been reset.
pub struct PendingAnimation {
    name: String,
    due: Duration,
    on_complete: Option<Completion>,
}

impl PendingAnimation {
    /// Request name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Virtual time at which the transition would have settled
    #[must_use]
    pub fn due(&self) -> Duration {
        self.due
    }

    /// Fire the completion now
    pub fn complete(self) {
        if let Some(done) = self.on_complete {
            done();
        }
    }
}

impl fmt::Debug for PendingAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAnimation")
            .field("name", &self.name)
            .field("due", &self.due)
            .field("has_completion", &self.on_complete.is_some())
            .finish()
    }
}

/// Virtual-clock animation engine
#[derive(Default)]
pub struct ManualEngine {
    now: Duration,
    next_seq: u64,
    pending: Vec<Scheduled>,
    history: Vec<AnimationRequest>,
}

impl ManualEngine {
    /// Create an engine at virtual time zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Every request ever scheduled, in scheduling order
    #[must_use]
    pub fn history(&self) -> &[AnimationRequest] {
        &self.history
    }

    /// Number of transitions that have not settled
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Names of unsettled transitions, earliest first
    #[must_use]
    pub fn pending_names(&self) -> Vec<&str> {
        let mut order: Vec<&Scheduled> = self.pending.iter().collect();
        order.sort_by_key(|s| (s.due, s.seq));
        order.into_iter().map(|s| s.name.as_str()).collect()
    }

    /// Progress (0.0 to 1.0) of the earliest pending transition with this
    /// name at the current virtual time
    ///
    /// Spring transitions may report overshoot above 1.0 mid-flight. Returns
    /// `None` once the transition has settled.
    #[must_use]
    pub fn progress(&self, name: &str) -> Option<f32> {
        let scheduled = self
            .pending
            .iter()
            .filter(|s| s.name == name)
            .min_by_key(|s| (s.due, s.seq))?;
        let request = self.history.get(usize::try_from(scheduled.seq).ok()?)?;
        Some(request.progress_at(self.now.saturating_sub(scheduled.started)))
    }

    /// Move the clock forward, settling everything that becomes due
    ///
    /// Returns the number of transitions settled.
    pub fn advance(&mut self, dt: Duration) -> usize {
        self.now += dt;
        let mut settled = 0;
        while let Some(index) = self.earliest() {
            if self.pending[index].due > self.now {
                break;
            }
            let scheduled = self.pending.remove(index);
            Self::fire(scheduled.on_complete);
            settled += 1;
        }
        settled
    }

    /// Settle the earliest pending transition, jumping the clock to it
    ///
    /// Returns `false` when nothing is pending.
    pub fn settle_next(&mut self) -> bool {
        let Some(index) = self.earliest() else {
            return false;
        };
        let scheduled = self.pending.remove(index);
        self.now = self.now.max(scheduled.due);
        Self::fire(scheduled.on_complete);
        true
    }

    /// Settle every pending transition in due order
    pub fn settle_all(&mut self) -> usize {
        let mut settled = 0;
        while self.settle_next() {
            settled += 1;
        }
        settled
    }

    /// Settle the first pending transition with this name immediately,
    /// without moving the clock
    pub fn settle_named(&mut self, name: &str) -> bool {
        match self.detach_named(name) {
            Some(pending) => {
                pending.complete();
                true
            }
            None => false,
        }
    }

    /// Remove the first pending transition with this name without firing it
    pub fn detach_named(&mut self, name: &str) -> Option<PendingAnimation> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.name == name)
            .min_by_key(|(_, s)| (s.due, s.seq))
            .map(|(i, _)| i)?;
        let scheduled = self.pending.remove(index);
        Some(PendingAnimation {
            name: scheduled.name,
            due: scheduled.due,
            on_complete: scheduled.on_complete,
        })
    }

    fn earliest(&self) -> Option<usize> {
        self.pending
            .iter()
            .enumerate()
            .min_by_key(|(_, s)| (s.due, s.seq))
            .map(|(i, _)| i)
    }

    fn fire(on_complete: Option<Completion>) {
        if let Some(done) = on_complete {
            done();
        }
    }
}

impl AnimationEngine for ManualEngine {
    fn animate(&mut self, request: AnimationRequest, on_complete: Option<Completion>) {
        let due = self.now + request.total();
        tracing::trace!(name = %request.name, due_ms = due.as_millis(), "Scheduled transition");
        self.pending.push(Scheduled {
            seq: self.next_seq,
            started: self.now,
            due,
            name: request.name.clone(),
            on_complete,
        });
        self.next_seq += 1;
        self.history.push(request);
    }
}

impl fmt::Debug for ManualEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualEngine")
            .field("now", &self.now)
            .field("pending", &self.pending_names())
            .field("history_len", &self.history.len())
            .finish()
    }
}
