//! Ordered front/back pairs plus the mirror entries attached to their images
//!
//! Every structural edit re-keys the [`TransformRegistry`] through the same
//! [`PositionMap`] it applies to the pair vector, so a mirror entry always
//! stays with the image it was assigned to.

use crate::transform::{PositionMap, TransformKey, TransformRegistry};
use crate::types::*;
use crate::IndexError;

/// The ordered pair sequence and its transform registry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairCollection {
    pairs: Vec<SheetPair>,
    transforms: TransformRegistry,
}

impl PairCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from references grouped two at a time
    pub fn from_refs(refs: impl IntoIterator<Item = ImageRef>) -> Self {
        let mut collection = Self::new();
        collection.append_pairs(refs);
        collection
    }

    /// Group `refs` two at a time and append them; an odd count leaves the
    /// last back side empty.
    ///
    /// Returns the number of pairs appended.
    pub fn append_pairs(&mut self, refs: impl IntoIterator<Item = ImageRef>) -> usize {
        let before = self.pairs.len();
        let mut refs = refs.into_iter();
        while let Some(front) = refs.next() {
            let back = refs.next();
            self.pairs.push(SheetPair::new(Some(front), back));
        }
        let added = self.pairs.len() - before;
        if added > 0 {
            log::debug!("Appended {} pair(s), {} total", added, self.pairs.len());
        }
        added
    }

    /// Append a single, possibly half-empty, pair
    pub fn push(&mut self, pair: SheetPair) -> usize {
        self.pairs.push(pair);
        self.pairs.len() - 1
    }

    /// Remove the pair at `position` along with its mirror entries
    pub fn delete(&mut self, position: usize) -> Result<PositionMap, IndexError> {
        self.check(position)?;
        self.pairs.remove(position);
        let map = PositionMap::Delete(position);
        self.transforms.reindex(|old| map.apply(old));
        log::debug!("Pair {}: deleted, {} remaining", position + 1, self.pairs.len());
        Ok(map)
    }

    /// Move the pair at `from` so it ends up at `to` (pop then insert)
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<PositionMap, IndexError> {
        self.check(from)?;
        self.check(to)?;
        let map = PositionMap::Move { from, to };
        if from == to {
            return Ok(map);
        }

        let pair = self.pairs.remove(from);
        self.pairs.insert(to, pair);
        self.transforms.reindex(|old| map.apply(old));
        log::debug!("Pair {}: moved to position {}", from + 1, to + 1);
        Ok(map)
    }

    /// Exchange the front and back of one pair, mirror entries included
    pub fn swap_sides(&mut self, position: usize) -> Result<(), IndexError> {
        self.check(position)?;
        let pair = &mut self.pairs[position];
        std::mem::swap(&mut pair.front, &mut pair.back);
        self.transforms.swap(
            TransformKey::new(position, Side::Front),
            TransformKey::new(position, Side::Back),
        );
        log::debug!("Pair {}: front/back swapped", position + 1);
        Ok(())
    }

    /// Exchange the images at two addresses, mirror entries included.
    ///
    /// Either address may be empty; emptiness is exchanged like any image.
    pub fn swap_across(
        &mut self,
        pos_a: usize,
        side_a: Side,
        pos_b: usize,
        side_b: Side,
    ) -> Result<(), IndexError> {
        self.check(pos_a)?;
        self.check(pos_b)?;
        if pos_a == pos_b && side_a == side_b {
            return Ok(());
        }

        let image_a = self.pairs[pos_a].side_mut(side_a).take();
        let image_b = std::mem::replace(self.pairs[pos_b].side_mut(side_b), image_a);
        *self.pairs[pos_a].side_mut(side_a) = image_b;

        self.transforms.swap(
            TransformKey::new(pos_a, side_a),
            TransformKey::new(pos_b, side_b),
        );
        log::debug!(
            "Swapped pair {} {} with pair {} {}",
            pos_a + 1,
            side_a,
            pos_b + 1,
            side_b
        );
        Ok(())
    }

    /// Drop every pair and every mirror entry
    pub fn clear(&mut self) {
        self.pairs.clear();
        self.transforms.clear();
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&SheetPair> {
        self.pairs.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SheetPair> {
        self.pairs.iter()
    }

    pub fn pairs(&self) -> &[SheetPair] {
        &self.pairs
    }

    /// Explicit mirror for an address (`None` when unset)
    pub fn mirror(&self, position: usize, side: Side) -> MirrorMode {
        self.transforms.get(position, side)
    }

    /// Assign a mirror; `MirrorMode::None` clears the entry
    pub fn set_mirror(
        &mut self,
        position: usize,
        side: Side,
        mode: MirrorMode,
    ) -> Result<(), IndexError> {
        self.check(position)?;
        self.transforms.set(position, side, mode);
        log::debug!("Pair {}: {} mirror set to {}", position + 1, side, mode);
        Ok(())
    }

    /// Assign a mirror that is kept even when it is `MirrorMode::None`
    pub fn pin_mirror(
        &mut self,
        position: usize,
        side: Side,
        mode: MirrorMode,
    ) -> Result<(), IndexError> {
        self.check(position)?;
        self.transforms.pin(position, side, mode);
        log::debug!("Pair {}: {} mirror pinned to {}", position + 1, side, mode);
        Ok(())
    }

    pub fn transforms(&self) -> &TransformRegistry {
        &self.transforms
    }

    fn check(&self, position: usize) -> Result<(), IndexError> {
        if position < self.pairs.len() {
            Ok(())
        } else {
            Err(IndexError {
                position,
                len: self.pairs.len(),
            })
        }
    }
}

impl<'a> IntoIterator for &'a PairCollection {
    type Item = &'a SheetPair;
    type IntoIter = std::slice::Iter<'a, SheetPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(names: &[&str]) -> Vec<ImageRef> {
        names.iter().map(|n| ImageRef::from(*n)).collect()
    }

    #[test]
    fn test_append_groups_two_at_a_time() {
        let mut pairs = PairCollection::new();
        assert_eq!(pairs.append_pairs(refs(&["a", "b", "c", "d", "e"])), 3);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs.get(2).unwrap().front, Some(ImageRef::from("e")));
        assert_eq!(pairs.get(2).unwrap().back, None);
    }

    #[test]
    fn test_append_empty_is_noop() {
        let mut pairs = PairCollection::new();
        assert_eq!(pairs.append_pairs(Vec::new()), 0);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_out_of_range_reports_length() {
        let mut pairs = PairCollection::from_refs(refs(&["a", "b"]));
        let err = pairs.delete(4).unwrap_err();
        assert_eq!(err, IndexError { position: 4, len: 1 });
        assert!(pairs.reorder(0, 1).is_err());
        assert!(pairs.swap_sides(1).is_err());
        assert!(pairs.set_mirror(1, Side::Front, MirrorMode::Both).is_err());
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_reorder_same_position_is_noop() {
        let mut pairs = PairCollection::from_refs(refs(&["a", "b", "c", "d"]));
        pairs.set_mirror(1, Side::Back, MirrorMode::Vertical).unwrap();
        let before = pairs.clone();
        pairs.reorder(1, 1).unwrap();
        assert_eq!(pairs, before);
    }

    #[test]
    fn test_swap_sides_moves_entries() {
        let mut pairs = PairCollection::from_refs(refs(&["a", "b"]));
        pairs.set_mirror(0, Side::Front, MirrorMode::Horizontal).unwrap();
        pairs.swap_sides(0).unwrap();

        assert_eq!(pairs.get(0).unwrap().front, Some(ImageRef::from("b")));
        assert_eq!(pairs.mirror(0, Side::Back), MirrorMode::Horizontal);
        assert_eq!(pairs.mirror(0, Side::Front), MirrorMode::None);
    }

    #[test]
    fn test_clear_empties_registry() {
        let mut pairs = PairCollection::from_refs(refs(&["a", "b"]));
        pairs.set_mirror(0, Side::Front, MirrorMode::Both).unwrap();
        pairs.clear();
        assert!(pairs.is_empty());
        assert!(pairs.transforms().is_empty());
    }
}
