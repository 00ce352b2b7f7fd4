use crate::options::LayoutSettings;
use crate::pairs::PairCollection;
use crate::types::*;

/// Which rule decided the mirror of a page image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorSource {
    /// A registry entry for this address (a pinned `None` included)
    Explicit,
    /// The global mirror-backs fallback
    AutoBack,
    /// No rule applied
    None,
}

/// What a page shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContent {
    Blank,
    Image {
        reference: ImageRef,
        mirror: MirrorMode,
        mirror_source: MirrorSource,
    },
}

/// One output page, in print order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub pair: usize,
    pub side: Side,
    pub content: PageContent,
}

impl PageEntry {
    pub fn is_blank(&self) -> bool {
        matches!(self.content, PageContent::Blank)
    }

    pub fn reference(&self) -> Option<&ImageRef> {
        match &self.content {
            PageContent::Image { reference, .. } => Some(reference),
            PageContent::Blank => None,
        }
    }
}

/// Effective mirror for an address, and the rule that produced it
pub fn effective_mirror(
    collection: &PairCollection,
    settings: &LayoutSettings,
    position: usize,
    side: Side,
) -> (MirrorMode, MirrorSource) {
    if let Some(mode) = collection.transforms().entry(position, side) {
        return (mode, MirrorSource::Explicit);
    }
    match side {
        Side::Back if settings.mirror_backs => (MirrorMode::Horizontal, MirrorSource::AutoBack),
        _ => (MirrorMode::None, MirrorSource::None),
    }
}

/// Two pages per pair, front then back, in pair order
pub fn sequence(collection: &PairCollection, settings: &LayoutSettings) -> Vec<PageEntry> {
    let mut pages = Vec::with_capacity(collection.len() * 2);

    for (position, pair) in collection.iter().enumerate() {
        for side in [Side::Front, Side::Back] {
            let content = match pair.side(side) {
                Some(reference) => {
                    let (mirror, mirror_source) =
                        effective_mirror(collection, settings, position, side);
                    PageContent::Image {
                        reference: reference.clone(),
                        mirror,
                        mirror_source,
                    }
                }
                None => PageContent::Blank,
            };
            pages.push(PageEntry {
                pair: position,
                side,
                content,
            });
        }
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(names: &[&str]) -> PairCollection {
        PairCollection::from_refs(names.iter().map(|n| ImageRef::from(*n)))
    }

    fn mirror_of(page: &PageEntry) -> (MirrorMode, MirrorSource) {
        match page.content {
            PageContent::Image {
                mirror,
                mirror_source,
                ..
            } => (mirror, mirror_source),
            PageContent::Blank => panic!("expected an image page"),
        }
    }

    #[test]
    fn test_front_back_alternation_with_blank_back() {
        let pages = sequence(&collection(&["a", "b", "c"]), &LayoutSettings::default());
        assert_eq!(pages.len(), 4);
        let sides: Vec<Side> = pages.iter().map(|p| p.side).collect();
        assert_eq!(sides, [Side::Front, Side::Back, Side::Front, Side::Back]);
        assert!(pages[3].is_blank());
        assert_eq!(pages[2].reference(), Some(&ImageRef::from("c")));
    }

    #[test]
    fn test_back_auto_mirror() {
        let pages = sequence(&collection(&["a", "b"]), &LayoutSettings::default());
        assert_eq!(mirror_of(&pages[0]), (MirrorMode::None, MirrorSource::None));
        assert_eq!(
            mirror_of(&pages[1]),
            (MirrorMode::Horizontal, MirrorSource::AutoBack)
        );
    }

    #[test]
    fn test_back_explicit_entry_wins_over_fallback() {
        let mut pairs = collection(&["a", "b", "c", "d"]);
        pairs.set_mirror(0, Side::Back, MirrorMode::Vertical).unwrap();
        pairs.pin_mirror(1, Side::Back, MirrorMode::None).unwrap();

        let pages = sequence(&pairs, &LayoutSettings::default());
        assert_eq!(
            mirror_of(&pages[1]),
            (MirrorMode::Vertical, MirrorSource::Explicit)
        );
        assert_eq!(mirror_of(&pages[3]), (MirrorMode::None, MirrorSource::Explicit));
    }

    #[test]
    fn test_no_fallback_when_disabled() {
        let settings = LayoutSettings {
            mirror_backs: false,
            ..Default::default()
        };
        let pages = sequence(&collection(&["a", "b"]), &settings);
        assert_eq!(mirror_of(&pages[1]), (MirrorMode::None, MirrorSource::None));
    }

    #[test]
    fn test_empty_collection_has_no_pages() {
        assert!(sequence(&PairCollection::new(), &LayoutSettings::default()).is_empty());
    }
}
