//! Keyed reconciliation: which elements enter, update or exit between two visual states.
//!
//! [`diff`] works on key sets alone; [`reconcile`] additionally pairs each key with the
//! attributes it should transition between. Both are pure: calling them twice with the
//! same inputs yields the same result.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::attrs::{Attrs, Presence};

/// Ordered set of element keys.
pub type KeySet = IndexSet<String>;

/// Target attributes per key, in render order.
pub type KeyedAttrs = IndexMap<String, Attrs>;

/// Partition of `prev ∪ next`.
///
/// `entering` and `updating` follow `next` order; `exiting` follows `prev` order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub entering: KeySet,
    pub updating: KeySet,
    pub exiting: KeySet,
}

impl DiffResult {
    pub fn is_stable(&self) -> bool {
        self.entering.is_empty() && self.exiting.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entering.len() + self.updating.len() + self.exiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// entering = next − prev, updating = prev ∩ next, exiting = prev − next.
pub fn diff<'a, P, N>(prev: P, next: N) -> DiffResult
where
    P: IntoIterator<Item = &'a String>,
    N: IntoIterator<Item = &'a String>,
{
    let prev: IndexSet<&String> = prev.into_iter().collect();
    let next: IndexSet<&String> = next.into_iter().collect();

    let mut out = DiffResult::default();
    for key in &next {
        if prev.contains(key) {
            out.updating.insert((*key).clone());
        } else {
            out.entering.insert((*key).clone());
        }
    }
    for key in &prev {
        if !next.contains(key) {
            out.exiting.insert((*key).clone());
        }
    }
    out
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    Enter,
    Update,
    Exit,
}

/// One element's planned transition.
///
/// Entering elements start from their collapsed target; exiting elements end at their
/// collapsed last state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttrChange {
    pub key: String,
    pub kind: ChangeKind,
    pub from: Attrs,
    pub to: Attrs,
}

/// Diff plus the attribute pairs to interpolate. Contains no side effects; applying it is
/// the scheduler's and the stage's job.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub diff: DiffResult,
    pub changes: Vec<AttrChange>,
}

impl Reconciliation {
    pub fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &AttrChange> {
        self.changes.iter().filter(move |c| c.kind == kind)
    }
}

/// Plan the transitions from `prev` to `next`.
///
/// Changes are ordered enter, update (both in `next` order), then exit (in `prev` order).
pub fn reconcile(prev: &KeyedAttrs, next: &KeyedAttrs, presence: Presence) -> Reconciliation {
    let diff = diff(prev.keys(), next.keys());
    let mut changes = Vec::with_capacity(diff.len());

    for key in &diff.entering {
        let to = next[key.as_str()];
        changes.push(AttrChange {
            key: key.clone(),
            kind: ChangeKind::Enter,
            from: to.collapsed(presence.enter),
            to,
        });
    }
    for key in &diff.updating {
        changes.push(AttrChange {
            key: key.clone(),
            kind: ChangeKind::Update,
            from: prev[key.as_str()],
            to: next[key.as_str()],
        });
    }
    for key in &diff.exiting {
        let last = prev[key.as_str()];
        changes.push(AttrChange {
            key: key.clone(),
            kind: ChangeKind::Exit,
            from: last,
            to: last.collapsed(presence.exit),
        });
    }

    Reconciliation { diff, changes }
}

/// Holds the previous target state so successive renders reconcile against it.
/// Only the latest state is retained.
#[derive(Clone, Debug, Default)]
pub struct KeyedReconciler {
    prev: KeyedAttrs,
    presence: Presence,
}

impl KeyedReconciler {
    pub fn new(presence: Presence) -> Self {
        Self {
            prev: KeyedAttrs::new(),
            presence,
        }
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    pub fn prev(&self) -> &KeyedAttrs {
        &self.prev
    }

    /// Pure diff of two key sets; does not touch the retained state.
    pub fn diff(&self, prev: &KeySet, next: &KeySet) -> DiffResult {
        diff(prev, next)
    }

    /// Reconcile `next` against the retained state without retaining it.
    pub fn plan(&self, next: &KeyedAttrs) -> Reconciliation {
        reconcile(&self.prev, next, self.presence)
    }

    /// Retain `next` as the state the following render reconciles against.
    pub fn commit(&mut self, next: KeyedAttrs) {
        self.prev = next;
    }

    /// Reconcile `next` against the retained state, then retain `next`.
    pub fn advance(&mut self, next: KeyedAttrs) -> Reconciliation {
        let out = self.plan(&next);
        log::trace!(
            "reconcile: {} entering, {} updating, {} exiting",
            out.diff.entering.len(),
            out.diff.updating.len(),
            out.diff.exiting.len()
        );
        self.commit(next);
        out
    }

    /// Forget the retained state; the next render enters everything.
    pub fn reset(&mut self) {
        self.prev.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::Collapse;

    fn keys(ks: &[&str]) -> KeySet {
        ks.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn diff_orders_follow_inputs() {
        let d = diff(&keys(&["a", "b", "c"]), &keys(&["d", "c", "b"]));
        assert_eq!(d.entering, keys(&["d"]));
        assert_eq!(d.updating.iter().collect::<Vec<_>>(), vec!["c", "b"]);
        assert_eq!(d.exiting, keys(&["a"]));
    }

    #[test]
    fn reconcile_pairs_attributes() {
        let mut prev = KeyedAttrs::new();
        prev.insert("A".into(), Attrs::rect(0.0, 0.0, 100.0, 10.0));
        prev.insert("B".into(), Attrs::rect(0.0, 20.0, 50.0, 10.0));
        let mut next = KeyedAttrs::new();
        next.insert("B".into(), Attrs::rect(0.0, 0.0, 70.0, 10.0));
        next.insert("C".into(), Attrs::rect(0.0, 20.0, 30.0, 10.0));

        let rec = reconcile(&prev, &next, Presence::uniform(Collapse::Width));
        let kinds: Vec<_> = rec.changes.iter().map(|c| (c.key.as_str(), c.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("C", ChangeKind::Enter),
                ("B", ChangeKind::Update),
                ("A", ChangeKind::Exit)
            ]
        );
        let enter = &rec.changes[0];
        assert_eq!(enter.from.width, 0.0);
        assert_eq!(enter.from.y, 20.0);
        let update = &rec.changes[1];
        assert_eq!(update.from.width, 50.0);
        assert_eq!(update.to.width, 70.0);
        let exit = &rec.changes[2];
        assert_eq!(exit.to.width, 0.0);
    }

    #[test]
    fn reconciler_retains_only_latest_state() {
        let mut r = KeyedReconciler::new(Presence::default());
        let mut s = KeyedAttrs::new();
        s.insert("A".into(), Attrs::default());
        let first = r.advance(s.clone());
        assert_eq!(first.diff.entering, keys(&["A"]));
        let second = r.advance(s);
        assert!(second.diff.is_stable());
        assert_eq!(second.diff.updating, keys(&["A"]));
    }
}
