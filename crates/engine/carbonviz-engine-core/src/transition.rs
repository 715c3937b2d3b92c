//! TransitionScheduler: owns every in-flight transition handle, one per element key.
//!
//! Time is driven by the host through [`TransitionScheduler::update`]; the scheduler never
//! blocks or spawns. Rules:
//! - A new transition on a key with an active handle cancels that handle and starts from
//!   its interpolated value at the current clock, not from the caller's `from`.
//! - Values hold `from` until the delay elapses, move linearly, and land exactly on `to`.
//! - Finished handles are dropped after emitting `Completed`; exits also emit `Detached`.
//! - Cancelled handles are dropped silently apart from a `Cancelled` event and never
//!   produce `Completed` or `Detached`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::attrs::{Attrs, Collapse};
use crate::config::Config;
use crate::error::EngineError;
use crate::ids::{IdAllocator, TransitionId};
use crate::interp::functions::progress;
use crate::outputs::{Change, Outputs, TransitionEvent};
use crate::reconcile::{AttrChange, ChangeKind, Reconciliation};

/// Duration and start delay of a transition, in milliseconds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub duration_ms: f64,
    pub delay_ms: f64,
}

impl Timing {
    pub const fn new(duration_ms: f64, delay_ms: f64) -> Self {
        Self {
            duration_ms,
            delay_ms,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let ok = |v: f64| v.is_finite() && v >= 0.0;
        if ok(self.duration_ms) && ok(self.delay_ms) {
            Ok(())
        } else {
            Err(EngineError::InvalidTiming {
                duration_ms: self.duration_ms,
                delay_ms: self.delay_ms,
            })
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::new(500.0, 0.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionStatus {
    /// Waiting for its delay to elapse.
    Pending,
    Running,
    Cancelled,
    Completed,
}

impl TransitionStatus {
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }
}

/// Snapshot of one transition. The scheduler owns the live handle; callers only ever
/// see copies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionHandle {
    pub id: TransitionId,
    pub key: String,
    pub kind: ChangeKind,
    pub start_value: Attrs,
    pub target_value: Attrs,
    /// Scheduler clock (ms) at creation.
    pub start_time: f64,
    pub duration: f64,
    pub delay: f64,
    pub status: TransitionStatus,
}

impl TransitionHandle {
    #[inline]
    pub fn end_time(&self) -> f64 {
        self.start_time + self.delay + self.duration
    }

    /// Interpolated attributes at clock `now`.
    pub fn value_at(&self, now: f64) -> Attrs {
        let t = progress(self.start_time, self.delay, self.duration, now);
        self.start_value.lerp(&self.target_value, t)
    }

    fn status_at(&self, now: f64) -> TransitionStatus {
        if now >= self.end_time() {
            TransitionStatus::Completed
        } else if now < self.start_time + self.delay {
            TransitionStatus::Pending
        } else {
            TransitionStatus::Running
        }
    }
}

#[derive(Debug)]
pub struct TransitionScheduler {
    cfg: Config,
    ids: IdAllocator,
    clock: f64,
    active: IndexMap<String, TransitionHandle>,
    // Events raised between updates (starts, cancels); flushed into the next Outputs.
    pending_events: Vec<TransitionEvent>,
    outputs: Outputs,
}

impl Default for TransitionScheduler {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl TransitionScheduler {
    pub fn new(cfg: Config) -> Self {
        Self {
            ids: IdAllocator::new(),
            clock: 0.0,
            active: IndexMap::with_capacity(cfg.expected_elements),
            pending_events: Vec::new(),
            outputs: Outputs::default(),
            cfg,
        }
    }

    /// Current scheduler clock in ms.
    pub fn now(&self) -> f64 {
        self.clock
    }

    pub fn default_timing(&self) -> Timing {
        self.cfg.default_timing
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn handle(&self, key: &str) -> Option<&TransitionHandle> {
        self.active.get(key)
    }

    /// Interpolated value of the key's active transition at the current clock.
    pub fn current_value(&self, key: &str) -> Option<Attrs> {
        self.active.get(key).map(|h| h.value_at(self.clock))
    }

    /// Start an update transition.
    pub fn animate(
        &mut self,
        key: &str,
        from: Attrs,
        to: Attrs,
        timing: Timing,
    ) -> Result<TransitionHandle, EngineError> {
        self.start(ChangeKind::Update, key, from, to, timing)
    }

    /// Start an enter transition from the collapsed form of `to`.
    pub fn enter(
        &mut self,
        key: &str,
        to: Attrs,
        collapse: Collapse,
        timing: Timing,
    ) -> Result<TransitionHandle, EngineError> {
        self.start(ChangeKind::Enter, key, to.collapsed(collapse), to, timing)
    }

    /// Start an exit transition toward the collapsed form of `from`; the element is
    /// detached when it completes.
    pub fn exit(
        &mut self,
        key: &str,
        from: Attrs,
        collapse: Collapse,
        timing: Timing,
    ) -> Result<TransitionHandle, EngineError> {
        self.start(ChangeKind::Exit, key, from, from.collapsed(collapse), timing)
    }

    /// Start one transition of any kind. Supersedes an active handle on the same key.
    pub fn start(
        &mut self,
        kind: ChangeKind,
        key: &str,
        from: Attrs,
        to: Attrs,
        timing: Timing,
    ) -> Result<TransitionHandle, EngineError> {
        timing.validate()?;

        let from = match self.active.shift_remove(key) {
            Some(prior) => {
                let at = prior.value_at(self.clock);
                self.pending_events.push(TransitionEvent::Cancelled {
                    id: prior.id,
                    key: prior.key,
                });
                at
            }
            None => from,
        };

        let handle = TransitionHandle {
            id: self.ids.alloc_transition(),
            key: key.to_string(),
            kind,
            start_value: from,
            target_value: to,
            start_time: self.clock,
            duration: timing.duration_ms,
            delay: timing.delay_ms,
            status: if timing.delay_ms > 0.0 {
                TransitionStatus::Pending
            } else {
                TransitionStatus::Running
            },
        };
        self.pending_events.push(TransitionEvent::Started {
            id: handle.id,
            key: handle.key.clone(),
            kind,
        });
        self.active.insert(handle.key.clone(), handle.clone());
        Ok(handle)
    }

    /// Apply a reconciliation, choosing each change's timing with `timing_for`.
    pub fn apply_with<F>(&mut self, rec: &Reconciliation, mut timing_for: F) -> Result<(), EngineError>
    where
        F: FnMut(&AttrChange) -> Timing,
    {
        for change in &rec.changes {
            let timing = timing_for(change);
            self.start(change.kind, &change.key, change.from, change.to, timing)?;
        }
        Ok(())
    }

    /// Apply a reconciliation with one timing for every change.
    pub fn apply(&mut self, rec: &Reconciliation, timing: Timing) -> Result<(), EngineError> {
        self.apply_with(rec, |_| timing)
    }

    /// Cancel the key's active transition. Returns the snapshot of the cancelled handle;
    /// cancelling a key with nothing in flight is a no-op returning None.
    pub fn cancel(&mut self, key: &str) -> Option<TransitionHandle> {
        let mut prior = self.active.shift_remove(key)?;
        prior.status = TransitionStatus::Cancelled;
        self.pending_events.push(TransitionEvent::Cancelled {
            id: prior.id,
            key: prior.key.clone(),
        });
        Some(prior)
    }

    /// Cancel everything in flight, e.g. on unmount. Returns the number cancelled.
    /// Pending events are discarded so nothing from before the call is reported later.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.active.len();
        self.active.clear();
        self.pending_events.clear();
        self.outputs.clear();
        n
    }

    /// Advance the clock by `dt` ms and report interpolated values and lifecycle events.
    pub fn update(&mut self, dt: f64) -> &Outputs {
        self.outputs.clear();
        if dt.is_finite() && dt > 0.0 {
            self.clock += dt;
        }
        let now = self.clock;

        for event in self.pending_events.drain(..) {
            self.outputs.events.push(event);
        }

        let mut finished = Vec::new();
        for handle in self.active.values_mut() {
            handle.status = handle.status_at(now);
            self.outputs.changes.push(Change {
                key: handle.key.clone(),
                attrs: handle.value_at(now),
            });
            if handle.status == TransitionStatus::Completed {
                finished.push(handle.key.clone());
            }
        }

        for key in finished {
            if let Some(handle) = self.active.shift_remove(&key) {
                self.outputs.events.push(TransitionEvent::Completed {
                    id: handle.id,
                    key: handle.key.clone(),
                    kind: handle.kind,
                });
                if handle.kind == ChangeKind::Exit {
                    self.outputs
                        .events
                        .push(TransitionEvent::Detached { key: handle.key });
                }
            }
        }

        // Only start notices are trimmed; lifecycle events always reach the stage.
        let cap = self.cfg.max_events_per_tick;
        let total = self.outputs.events.len();
        if total > cap {
            let mut excess = total - cap;
            self.outputs.events.retain(|e| {
                if excess > 0 && matches!(e, TransitionEvent::Started { .. }) {
                    excess -= 1;
                    false
                } else {
                    true
                }
            });
            let dropped = total - self.outputs.events.len();
            log::warn!("transition events over budget; dropped {dropped} oldest start notices");
        }

        &self.outputs
    }
}
