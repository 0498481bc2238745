//! Segment state store
//!
//! Per-segment current state, staged target, and refresh flag, indexed by
//! segment position.

use heapless::Vec;

/// Maximum segments per display (one bit each in [`SegmentMask`])
pub const MAX_SEGMENTS: usize = 32;

/// Electrical state of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SegmentState {
    /// Never driven since construction
    #[default]
    Undefined,
    /// Transparent
    Bleached,
    /// Colored
    Colored,
}

impl SegmentState {
    /// Work electrode level asserted to reach this state
    ///
    /// Bleaching pulls the work electrode low, coloring drives it high.
    pub fn drive_level(&self) -> Option<bool> {
        match self {
            SegmentState::Undefined => None,
            SegmentState::Bleached => Some(false),
            SegmentState::Colored => Some(true),
        }
    }
}

/// Set of segment indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SegmentMask(u32);

impl SegmentMask {
    /// No segments
    pub const EMPTY: Self = Self(0);

    /// Build from raw bits (bit `i` = segment `i`)
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Add a segment
    pub fn insert(&mut self, index: usize) {
        if index < MAX_SEGMENTS {
            self.0 |= 1 << index;
        }
    }

    /// Check membership
    pub fn contains(&self, index: usize) -> bool {
        index < MAX_SEGMENTS && self.0 & (1 << index) != 0
    }

    /// Check if no segment is set
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of segments set
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate set indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        let bits = self.0;
        (0..MAX_SEGMENTS).filter(move |&i| bits & (1 << i) != 0)
    }
}

/// One segment's bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    /// State last fully applied
    pub current: SegmentState,
    /// Staged target
    pub next: SegmentState,
    /// Failed its last threshold check
    pub needs_refresh: bool,
}

/// Per-segment state for one display
#[derive(Debug, Clone)]
pub struct SegmentStore {
    segments: Vec<Segment, MAX_SEGMENTS>,
}

impl SegmentStore {
    /// Create `count` undefined segments
    ///
    /// Returns `None` if `count` exceeds [`MAX_SEGMENTS`].
    pub fn new(count: usize) -> Option<Self> {
        if count > MAX_SEGMENTS {
            return None;
        }
        let mut segments = Vec::new();
        segments.resize(count, Segment::default()).ok()?;
        Some(Self { segments })
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if the store has no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get a segment
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Stage a target state; returns false if `index` is out of range
    pub fn stage(&mut self, index: usize, target: SegmentState) -> bool {
        match self.segments.get_mut(index) {
            Some(seg) => {
                seg.next = target;
                true
            }
            None => false,
        }
    }

    /// Stage the same target on every segment
    pub fn stage_all(&mut self, target: SegmentState) {
        for seg in self.segments.iter_mut() {
            seg.next = target;
        }
    }

    /// Check if a segment's staged target is `target` and differs from its current state
    pub fn is_pending(&self, index: usize, target: SegmentState) -> bool {
        self.segments
            .get(index)
            .is_some_and(|seg| seg.next == target && seg.next != seg.current)
    }

    /// Record that every segment in `mask` has been fully driven to `state`
    pub fn commit(&mut self, mask: SegmentMask, state: SegmentState) {
        for index in mask.iter() {
            if let Some(seg) = self.segments.get_mut(index) {
                seg.current = state;
            }
        }
    }

    /// Set or clear a segment's refresh flag
    pub fn set_needs_refresh(&mut self, index: usize, flag: bool) {
        if let Some(seg) = self.segments.get_mut(index) {
            seg.needs_refresh = flag;
        }
    }

    /// Segments currently in `state` with the refresh flag set
    pub fn flagged(&self, state: SegmentState) -> SegmentMask {
        let mut mask = SegmentMask::EMPTY;
        for (index, seg) in self.segments.iter().enumerate() {
            if seg.current == state && seg.needs_refresh {
                mask.insert(index);
            }
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_store_is_undefined() {
        let store = SegmentStore::new(4).unwrap();
        assert_eq!(store.len(), 4);
        for i in 0..4 {
            let seg = store.get(i).unwrap();
            assert_eq!(seg.current, SegmentState::Undefined);
            assert_eq!(seg.next, SegmentState::Undefined);
            assert!(!seg.needs_refresh);
        }
        assert!(SegmentStore::new(MAX_SEGMENTS + 1).is_none());
        assert!(SegmentStore::new(0).unwrap().is_empty());
    }

    #[test]
    fn test_pending_requires_change() {
        let mut store = SegmentStore::new(2).unwrap();
        assert!(store.stage(0, SegmentState::Colored));
        assert!(store.is_pending(0, SegmentState::Colored));
        assert!(!store.is_pending(0, SegmentState::Bleached));
        assert!(!store.is_pending(1, SegmentState::Colored));

        let mut mask = SegmentMask::EMPTY;
        mask.insert(0);
        store.commit(mask, SegmentState::Colored);
        assert!(!store.is_pending(0, SegmentState::Colored));
    }

    #[test]
    fn test_stage_out_of_range() {
        let mut store = SegmentStore::new(2).unwrap();
        assert!(!store.stage(2, SegmentState::Colored));
        assert!(!store.is_pending(5, SegmentState::Colored));
    }

    #[test]
    fn test_flagged_filters_by_state() {
        let mut store = SegmentStore::new(3).unwrap();
        store.stage_all(SegmentState::Colored);
        store.commit(SegmentMask::from_bits(0b011), SegmentState::Colored);
        store.commit(SegmentMask::from_bits(0b100), SegmentState::Bleached);
        store.set_needs_refresh(1, true);
        store.set_needs_refresh(2, true);

        assert_eq!(store.flagged(SegmentState::Colored).bits(), 0b010);
        assert_eq!(store.flagged(SegmentState::Bleached).bits(), 0b100);
    }

    #[test]
    fn test_drive_levels() {
        assert_eq!(SegmentState::Bleached.drive_level(), Some(false));
        assert_eq!(SegmentState::Colored.drive_level(), Some(true));
        assert_eq!(SegmentState::Undefined.drive_level(), None);
    }

    proptest! {
        #[test]
        fn mask_iter_matches_bits(bits in any::<u32>()) {
            let mask = SegmentMask::from_bits(bits);
            let mut rebuilt = SegmentMask::EMPTY;
            for index in mask.iter() {
                prop_assert!(mask.contains(index));
                rebuilt.insert(index);
            }
            prop_assert_eq!(rebuilt, mask);
            prop_assert_eq!(mask.len(), mask.iter().count());
        }
    }
}
