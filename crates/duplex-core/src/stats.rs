use crate::constants::PAGES_PER_PAIR;
use crate::options::LayoutSettings;
use crate::pairs::PairCollection;
use crate::sequence::{MirrorSource, PageContent, sequence};
use crate::types::*;

/// Summary of what an export of the collection would produce
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairStatistics {
    /// Number of pairs
    pub pairs: usize,
    /// Output page count (always twice the pairs)
    pub pages: usize,
    /// Pairs without a front image
    pub blank_fronts: usize,
    /// Pairs without a back image
    pub blank_backs: usize,
    /// Registry entries, pinned `None` included
    pub explicit_mirrors: usize,
    /// Back images mirrored by the global fallback
    pub auto_mirrored_backs: usize,
}

/// Calculate statistics for the collection under the given settings
pub fn calculate_statistics(
    collection: &PairCollection,
    settings: &LayoutSettings,
) -> PairStatistics {
    let mut stats = PairStatistics {
        pairs: collection.len(),
        pages: collection.len() * PAGES_PER_PAIR,
        explicit_mirrors: collection.transforms().len(),
        ..Default::default()
    };

    for page in sequence(collection, settings) {
        match (page.side, &page.content) {
            (Side::Front, PageContent::Blank) => stats.blank_fronts += 1,
            (Side::Back, PageContent::Blank) => stats.blank_backs += 1,
            (
                Side::Back,
                PageContent::Image {
                    mirror_source: MirrorSource::AutoBack,
                    ..
                },
            ) => stats.auto_mirrored_backs += 1,
            _ => {}
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_count_blanks_and_mirrors() {
        let mut pairs = PairCollection::from_refs(
            ["a", "b", "c", "d", "e"].into_iter().map(ImageRef::from),
        );
        pairs.pin_mirror(1, Side::Back, MirrorMode::None).unwrap();
        pairs.set_mirror(0, Side::Front, MirrorMode::Vertical).unwrap();

        let stats = calculate_statistics(&pairs, &LayoutSettings::default());
        assert_eq!(
            stats,
            PairStatistics {
                pairs: 3,
                pages: 6,
                blank_fronts: 0,
                blank_backs: 1,
                explicit_mirrors: 2,
                auto_mirrored_backs: 1,
            }
        );
    }
}
