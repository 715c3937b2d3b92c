//! Output contracts from the transition scheduler.
//!
//! Outputs carry only the attribute changes for this update, keyed by element key,
//! and a separate list of lifecycle events. Renderers apply changes to their
//! element store and act on `Detached` events.

use serde::{Deserialize, Serialize};

use crate::attrs::Attrs;
use crate::ids::TransitionId;
use crate::reconcile::ChangeKind;

/// One element's interpolated attributes this update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub key: String,
    pub attrs: Attrs,
}

/// Discrete lifecycle signals emitted by the scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TransitionEvent {
    Started {
        id: TransitionId,
        key: String,
        kind: ChangeKind,
    },
    /// Reached its target. Never emitted for a cancelled handle.
    Completed {
        id: TransitionId,
        key: String,
        kind: ChangeKind,
    },
    Cancelled {
        id: TransitionId,
        key: String,
    },
    /// An exit finished; the element must be removed.
    Detached {
        key: String,
    },
}

/// Outputs returned by TransitionScheduler::update().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<TransitionEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[inline]
    pub fn push_event(&mut self, event: TransitionEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    /// Keys detached during this update, in emission order.
    pub fn detached(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|e| match e {
            TransitionEvent::Detached { key } => Some(key.as_str()),
            _ => None,
        })
    }
}
