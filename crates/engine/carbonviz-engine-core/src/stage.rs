//! Stage: the rendered element store a backend draws from.
//!
//! Elements are attached when they enter, follow the scheduler's interpolated values, and
//! are removed only when the scheduler reports their exit finished. Each element carries
//! the datum it is currently bound to (what a tooltip reads).

use indexmap::IndexMap;

use crate::attrs::Attrs;
use crate::outputs::{Outputs, TransitionEvent};
use crate::reconcile::{ChangeKind, Reconciliation};

#[derive(Clone, Debug, PartialEq)]
pub struct Element<D> {
    pub key: String,
    pub attrs: Attrs,
    pub datum: D,
    /// Set while the element is animating out.
    pub exiting: bool,
}

#[derive(Clone, Debug)]
pub struct Stage<D> {
    elements: IndexMap<String, Element<D>>,
}

impl<D> Default for Stage<D> {
    fn default() -> Self {
        Self {
            elements: IndexMap::new(),
        }
    }
}

impl<D: Clone> Stage<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Element<D>> {
        self.elements.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element<D>> {
        self.elements.values()
    }

    /// Attach an element, or rebind it if it is still on stage (e.g. re-entering while
    /// its exit is in flight). Existing attributes are left to the scheduler.
    pub fn attach(&mut self, key: &str, attrs: Attrs, datum: D) {
        match self.elements.get_mut(key) {
            Some(el) => {
                el.datum = datum;
                el.exiting = false;
            }
            None => {
                self.elements.insert(
                    key.to_string(),
                    Element {
                        key: key.to_string(),
                        attrs,
                        datum,
                        exiting: false,
                    },
                );
            }
        }
    }

    pub fn detach(&mut self, key: &str) -> Option<Element<D>> {
        self.elements.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Attach entering elements at their start attributes, rebind updating ones and flag
    /// exiting ones. `data` holds the datum for every key of the new state.
    pub fn apply_reconciliation(&mut self, rec: &Reconciliation, data: &IndexMap<String, D>) {
        for change in &rec.changes {
            match change.kind {
                ChangeKind::Enter | ChangeKind::Update => {
                    if let Some(datum) = data.get(&change.key) {
                        self.attach(&change.key, change.from, datum.clone());
                    }
                }
                ChangeKind::Exit => {
                    if let Some(el) = self.elements.get_mut(&change.key) {
                        el.exiting = true;
                    }
                }
            }
        }
    }

    /// Follow one scheduler update: move elements to their interpolated values and drop
    /// the ones whose exit finished.
    pub fn apply_outputs(&mut self, outputs: &Outputs) {
        for change in &outputs.changes {
            if let Some(el) = self.elements.get_mut(&change.key) {
                el.attrs = change.attrs;
            }
        }
        for event in &outputs.events {
            if let TransitionEvent::Detached { key } = event {
                self.elements.shift_remove(key);
            }
        }
    }
}
