//! Per-image mirror bookkeeping
//!
//! The registry is a sparse map from `(position, side)` to [`MirrorMode`].
//! It knows nothing about images; the pair collection keeps it aligned with
//! the images by calling [`TransformRegistry::reindex`] after every structural
//! edit and [`TransformRegistry::swap`] after every exchange.

use std::collections::BTreeMap;

use crate::types::{MirrorMode, Side};

/// Composite key of a transform entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransformKey {
    pub position: usize,
    pub side: Side,
}

impl TransformKey {
    pub fn new(position: usize, side: Side) -> Self {
        Self { position, side }
    }
}

/// How positions move during a structural edit of the pair sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionMap {
    /// The pair at this position was removed; later pairs move down by one
    Delete(usize),
    /// The pair at `from` was popped and re-inserted at `to`
    Move { from: usize, to: usize },
}

impl PositionMap {
    /// New position of whatever sat at `old`, or `None` if it was removed
    pub fn apply(&self, old: usize) -> Option<usize> {
        match *self {
            PositionMap::Delete(deleted) => {
                if old == deleted {
                    None
                } else if old > deleted {
                    Some(old - 1)
                } else {
                    Some(old)
                }
            }
            PositionMap::Move { from, to } => {
                if old == from {
                    Some(to)
                } else if from < to && old > from && old <= to {
                    Some(old - 1)
                } else if to < from && old >= to && old < from {
                    Some(old + 1)
                } else {
                    Some(old)
                }
            }
        }
    }
}

/// Sparse `(position, side) → MirrorMode` store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformRegistry {
    entries: BTreeMap<TransformKey, MirrorMode>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror mode for a slot, `None` when no entry exists
    pub fn get(&self, position: usize, side: Side) -> MirrorMode {
        self.entry(position, side).unwrap_or_default()
    }

    /// The explicit entry for a slot, if any (pinned `None` included)
    pub fn entry(&self, position: usize, side: Side) -> Option<MirrorMode> {
        self.entries
            .get(&TransformKey::new(position, side))
            .copied()
    }

    /// Assign a mode; assigning `None` removes the entry
    pub fn set(&mut self, position: usize, side: Side, mode: MirrorMode) {
        let key = TransformKey::new(position, side);
        if mode.is_none() {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, mode);
        }
    }

    /// Assign a mode and keep the entry even when it is `None`.
    ///
    /// A pinned `None` on a back side suppresses the automatic back mirror.
    pub fn pin(&mut self, position: usize, side: Side, mode: MirrorMode) {
        self.entries.insert(TransformKey::new(position, side), mode);
    }

    pub fn remove(&mut self, position: usize, side: Side) -> Option<MirrorMode> {
        self.entries.remove(&TransformKey::new(position, side))
    }

    /// Exchange the entries of two keys; a missing entry travels as absence
    pub fn swap(&mut self, a: TransformKey, b: TransformKey) {
        if a == b {
            return;
        }
        let entry_a = self.entries.remove(&a);
        let entry_b = self.entries.remove(&b);
        if let Some(mode) = entry_a {
            self.entries.insert(b, mode);
        }
        if let Some(mode) = entry_b {
            self.entries.insert(a, mode);
        }
    }

    /// Re-key every entry through `mapping`; entries mapped to `None` are dropped
    pub fn reindex(&mut self, mapping: impl Fn(usize) -> Option<usize>) {
        let entries = std::mem::take(&mut self.entries);
        self.entries = entries
            .into_iter()
            .filter_map(|(key, mode)| {
                mapping(key.position).map(|position| (TransformKey::new(position, key.side), mode))
            })
            .collect();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in `(position, side)` order
    pub fn iter(&self) -> impl Iterator<Item = (TransformKey, MirrorMode)> + '_ {
        self.entries.iter().map(|(key, mode)| (*key, *mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_defaults_to_none() {
        let registry = TransformRegistry::new();
        assert_eq!(registry.get(3, Side::Back), MirrorMode::None);
        assert_eq!(registry.entry(3, Side::Back), None);
    }

    #[test]
    fn test_set_none_keeps_store_sparse() {
        let mut registry = TransformRegistry::new();
        registry.set(0, Side::Front, MirrorMode::Vertical);
        assert_eq!(registry.len(), 1);
        registry.set(0, Side::Front, MirrorMode::None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_pin_keeps_explicit_none() {
        let mut registry = TransformRegistry::new();
        registry.pin(1, Side::Back, MirrorMode::None);
        assert_eq!(registry.entry(1, Side::Back), Some(MirrorMode::None));
        assert_eq!(registry.get(1, Side::Back), MirrorMode::None);

        // Resetting through `set` un-pins
        registry.set(1, Side::Back, MirrorMode::None);
        assert_eq!(registry.entry(1, Side::Back), None);
    }

    #[test]
    fn test_swap_moves_absence() {
        let mut registry = TransformRegistry::new();
        let a = TransformKey::new(0, Side::Front);
        let b = TransformKey::new(2, Side::Back);
        registry.set(0, Side::Front, MirrorMode::Both);

        registry.swap(a, b);
        assert_eq!(registry.entry(0, Side::Front), None);
        assert_eq!(registry.get(2, Side::Back), MirrorMode::Both);
    }

    #[test]
    fn test_delete_map() {
        let map = PositionMap::Delete(1);
        assert_eq!(map.apply(0), Some(0));
        assert_eq!(map.apply(1), None);
        assert_eq!(map.apply(2), Some(1));
        assert_eq!(map.apply(5), Some(4));
    }

    #[test]
    fn test_move_map_forward() {
        // [a, b, c, d] move 0 -> 2 gives [b, c, a, d]
        let map = PositionMap::Move { from: 0, to: 2 };
        assert_eq!(map.apply(0), Some(2));
        assert_eq!(map.apply(1), Some(0));
        assert_eq!(map.apply(2), Some(1));
        assert_eq!(map.apply(3), Some(3));
    }

    #[test]
    fn test_move_map_backward() {
        // [a, b, c, d] move 3 -> 1 gives [a, d, b, c]
        let map = PositionMap::Move { from: 3, to: 1 };
        assert_eq!(map.apply(0), Some(0));
        assert_eq!(map.apply(1), Some(2));
        assert_eq!(map.apply(2), Some(3));
        assert_eq!(map.apply(3), Some(1));
    }

    #[test]
    fn test_reindex_drops_and_shifts() {
        let mut registry = TransformRegistry::new();
        registry.set(0, Side::Front, MirrorMode::Horizontal);
        registry.set(1, Side::Front, MirrorMode::Vertical);
        registry.set(2, Side::Front, MirrorMode::Both);
        registry.set(2, Side::Back, MirrorMode::Vertical);

        let map = PositionMap::Delete(1);
        registry.reindex(|p| map.apply(p));

        assert_eq!(registry.get(0, Side::Front), MirrorMode::Horizontal);
        assert_eq!(registry.get(1, Side::Front), MirrorMode::Both);
        assert_eq!(registry.get(1, Side::Back), MirrorMode::Vertical);
        assert_eq!(registry.get(2, Side::Front), MirrorMode::None);
        assert_eq!(registry.len(), 3);
    }
}
