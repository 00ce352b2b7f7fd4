//! Interactive editing state over a pair collection
//!
//! A [`Session`] owns the collection, the layout settings and the current
//! selection. Front ends drive it with [`SessionCommand`]s; structural edits
//! move the selection through the same position mapping the collection used.


use duplex_core::{
    ImageRef, IndexError, LayoutSettings, MirrorMode, PairCollection, PositionMap, SheetPair, Side,
};

/// Commands sent from a front end to the session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    AddImages {
        images: Vec<ImageRef>,
    },
    DeletePair {
        position: usize,
    },
    ReorderPairs {
        from: usize,
        to: usize,
    },
    SwapSides {
        position: usize,
    },
    SwapImages {
        pos_a: usize,
        side_a: Side,
        pos_b: usize,
        side_b: Side,
    },
    SetMirror {
        position: usize,
        side: Side,
        mode: MirrorMode,
    },
    /// Explicit mirror kept even when `MirrorMode::None`
    PinMirror {
        position: usize,
        side: Side,
        mode: MirrorMode,
    },
    Select {
        position: usize,
    },
    Next,
    Prev,
    Clear,
    UpdateSettings {
        settings: LayoutSettings,
    },
}

/// Owned copy of everything an export pass needs
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub pairs: PairCollection,
    pub settings: LayoutSettings,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pairs: PairCollection,
    settings: LayoutSettings,
    selection: usize,
}

impl Session {
    pub fn new(settings: LayoutSettings) -> Self {
        Self {
            pairs: PairCollection::new(),
            settings,
            selection: 0,
        }
    }

    pub fn with_pairs(pairs: PairCollection, settings: LayoutSettings) -> Self {
        Self {
            pairs,
            settings,
            selection: 0,
        }
    }

    pub fn pairs(&self) -> &PairCollection {
        &self.pairs
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: LayoutSettings) {
        self.settings = settings;
    }

    /// Index of the selected pair (0 when the collection is empty)
    pub fn selection(&self) -> usize {
        self.selection
    }

    /// The selected pair, if any
    pub fn current(&self) -> Option<&SheetPair> {
        self.pairs.get(self.selection)
    }

    /// Navigation label, e.g. "Pair 2 of 5"
    pub fn label(&self) -> String {
        if self.pairs.is_empty() {
            "Pair 0 of 0".to_string()
        } else {
            format!("Pair {} of {}", self.selection + 1, self.pairs.len())
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            pairs: self.pairs.clone(),
            settings: self.settings.clone(),
        }
    }

    pub fn add_images(&mut self, images: impl IntoIterator<Item = ImageRef>) -> usize {
        let added = self.pairs.append_pairs(images);
        log::debug!("Total pairs: {}", self.pairs.len());
        added
    }

    pub fn delete_pair(&mut self, position: usize) -> Result<(), IndexError> {
        let map = self.pairs.delete(position)?;
        self.follow(map);
        Ok(())
    }

    pub fn reorder_pairs(&mut self, from: usize, to: usize) -> Result<(), IndexError> {
        let map = self.pairs.reorder(from, to)?;
        self.follow(map);
        Ok(())
    }

    pub fn swap_sides(&mut self, position: usize) -> Result<(), IndexError> {
        self.pairs.swap_sides(position)
    }

    pub fn swap_images(
        &mut self,
        pos_a: usize,
        side_a: Side,
        pos_b: usize,
        side_b: Side,
    ) -> Result<(), IndexError> {
        self.pairs.swap_across(pos_a, side_a, pos_b, side_b)
    }

    pub fn set_mirror(
        &mut self,
        position: usize,
        side: Side,
        mode: MirrorMode,
    ) -> Result<(), IndexError> {
        self.pairs.set_mirror(position, side, mode)
    }

    pub fn pin_mirror(
        &mut self,
        position: usize,
        side: Side,
        mode: MirrorMode,
    ) -> Result<(), IndexError> {
        self.pairs.pin_mirror(position, side, mode)
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
        self.selection = 0;
        log::debug!("All images cleared");
    }

    pub fn select(&mut self, position: usize) -> Result<(), IndexError> {
        if position >= self.pairs.len() {
            return Err(IndexError {
                position,
                len: self.pairs.len(),
            });
        }
        self.selection = position;
        log::debug!("Pair {} selected", position + 1);
        Ok(())
    }

    /// Move the selection forward; returns false at the last pair
    pub fn next(&mut self) -> bool {
        if self.selection + 1 < self.pairs.len() {
            self.selection += 1;
            true
        } else {
            false
        }
    }

    /// Move the selection back; returns false at the first pair
    pub fn prev(&mut self) -> bool {
        if self.selection > 0 && !self.pairs.is_empty() {
            self.selection -= 1;
            true
        } else {
            false
        }
    }

    /// Execute a command
    pub fn apply(&mut self, command: SessionCommand) -> Result<(), IndexError> {
        match command {
            SessionCommand::AddImages { images } => {
                self.add_images(images);
                Ok(())
            }
            SessionCommand::DeletePair { position } => self.delete_pair(position),
            SessionCommand::ReorderPairs { from, to } => self.reorder_pairs(from, to),
            SessionCommand::SwapSides { position } => self.swap_sides(position),
            SessionCommand::SwapImages {
                pos_a,
                side_a,
                pos_b,
                side_b,
            } => self.swap_images(pos_a, side_a, pos_b, side_b),
            SessionCommand::SetMirror {
                position,
                side,
                mode,
            } => self.set_mirror(position, side, mode),
            SessionCommand::PinMirror {
                position,
                side,
                mode,
            } => self.pin_mirror(position, side, mode),
            SessionCommand::Select { position } => self.select(position),
            SessionCommand::Next => {
                self.next();
                Ok(())
            }
            SessionCommand::Prev => {
                self.prev();
                Ok(())
            }
            SessionCommand::Clear => {
                self.clear();
                Ok(())
            }
            SessionCommand::UpdateSettings { settings } => {
                self.set_settings(settings);
                Ok(())
            }
        }
    }

    /// Execute a command coming from user input, where a stale position is
    /// not an error worth surfacing. Returns whether the command took effect.
    pub fn apply_or_ignore(&mut self, command: SessionCommand) -> bool {
        let description = format!("{:?}", command);
        match self.apply(command) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Ignoring {}: {}", description, e);
                false
            }
        }
    }

    fn follow(&mut self, map: PositionMap) {
        let len = self.pairs.len();
        self.selection = match map.apply(self.selection) {
            Some(position) => position,
            None => self.selection.min(len.saturating_sub(1)),
        };
        if len == 0 {
            self.selection = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(count: usize) -> Session {
        let mut session = Session::default();
        session.add_images((0..count).map(|i| ImageRef::path(format!("{i}.png"))));
        session
    }

    #[test]
    fn test_label() {
        assert_eq!(Session::default().label(), "Pair 0 of 0");
        let mut session = session(6);
        session.next();
        assert_eq!(session.label(), "Pair 2 of 3");
    }

    #[test]
    fn test_navigation_stops_at_ends() {
        let mut session = session(4);
        assert!(!session.prev());
        assert!(session.next());
        assert!(!session.next());
        assert_eq!(session.selection(), 1);
    }

    #[test]
    fn test_select_out_of_range() {
        let mut session = session(4);
        assert_eq!(
            session.select(2),
            Err(IndexError {
                position: 2,
                len: 2
            })
        );
        assert_eq!(session.selection(), 0);
    }

    #[test]
    fn test_delete_before_selection_shifts_it() {
        let mut session = session(8);
        session.select(2).unwrap();
        session.delete_pair(0).unwrap();
        assert_eq!(session.selection(), 1);
        assert_eq!(session.current().unwrap().front, Some(ImageRef::from("4.png")));
    }

    #[test]
    fn test_delete_selected_keeps_slot_or_clamps() {
        let mut session = session(6);
        session.select(1).unwrap();
        session.delete_pair(1).unwrap();
        assert_eq!(session.selection(), 1);

        session.delete_pair(1).unwrap();
        assert_eq!(session.selection(), 0);

        session.delete_pair(0).unwrap();
        assert_eq!(session.selection(), 0);
        assert!(session.current().is_none());
    }

    #[test]
    fn test_reorder_moves_selection() {
        let mut session = session(8);
        session.select(0).unwrap();
        session.reorder_pairs(0, 3).unwrap();
        assert_eq!(session.selection(), 3);

        session.select(2).unwrap();
        session.reorder_pairs(3, 0).unwrap();
        assert_eq!(session.selection(), 3);
    }

    #[test]
    fn test_apply_or_ignore_swallows_index_errors() {
        let mut session = session(2);
        let before = session.snapshot();
        assert!(!session.apply_or_ignore(SessionCommand::DeletePair { position: 5 }));
        assert!(!session.apply_or_ignore(SessionCommand::SwapImages {
            pos_a: 0,
            side_a: Side::Front,
            pos_b: 1,
            side_b: Side::Back,
        }));
        assert_eq!(session.snapshot(), before);
        assert!(session.apply_or_ignore(SessionCommand::SwapSides { position: 0 }));
    }

    #[test]
    fn test_clear_resets_selection() {
        let mut session = session(6);
        session.select(2).unwrap();
        session.apply(SessionCommand::Clear).unwrap();
        assert_eq!(session.selection(), 0);
        assert!(session.pairs().is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut session = session(4);
        let snapshot = session.snapshot();
        session.delete_pair(0).unwrap();
        assert_eq!(snapshot.pairs.len(), 2);
        assert_eq!(session.pairs().len(), 1);
    }
}
