//! Identifiers and simple allocators for engine entities.

use serde::{Deserialize, Serialize};

/// Identity of one transition handle. Never reused within an allocator's lifetime.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransitionId(pub u32);

/// Identity of a mounted chart; used to attribute ownership of shared resources.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ChartId(pub u32);

/// Monotonic allocator for TransitionId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_transition: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_transition(&mut self) -> TransitionId {
        let id = TransitionId(self.next_transition);
        self.next_transition = self.next_transition.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_transition(), TransitionId(0));
        assert_eq!(alloc.alloc_transition(), TransitionId(1));
    }
}
