//! Per-page decode and layout
//!
//! Each page's CPU-bound work runs on Tokio's blocking pool, at most one
//! page per available core at a time. Results are put back into print order
//! before any encoder sees them, so decode order never shows in the output.
//! Only the compressed bitmap of a page outlives its task.

use duplex_core::loader::{self, DecodedImage};
use duplex_core::{
    ImageRef, LayoutSettings, PageContent, PageEntry, Placement, Side, place,
};
use tokio::task::JoinSet;

use crate::bitmap::FlateBitmap;
use crate::{Result, SkippedImage};

/// What an encoder draws on one page
#[derive(Debug, Clone)]
pub enum PreparedContent {
    Blank,
    Image {
        reference: ImageRef,
        /// Mirrored, trimmed and (in fit mode) resampled pixels
        bitmap: FlateBitmap,
        placement: Placement,
    },
}

/// One page ready for encoding
#[derive(Debug, Clone)]
pub struct PreparedPage {
    pub pair: usize,
    pub side: Side,
    pub content: PreparedContent,
}

impl PreparedPage {
    pub fn placement(&self) -> Option<&Placement> {
        match &self.content {
            PreparedContent::Image { placement, .. } => Some(placement),
            PreparedContent::Blank => None,
        }
    }
}

/// All pages of one export pass, in print order
#[derive(Debug, Clone, Default)]
pub struct PreparedPages {
    pub pages: Vec<PreparedPage>,
    pub skipped: Vec<SkippedImage>,
}

impl PreparedPages {
    pub fn placed_images(&self) -> usize {
        self.pages.iter().filter(|p| p.placement().is_some()).count()
    }
}

/// Load, place, resample and compress the image of one page.
///
/// A load failure turns the page blank and is reported as a skipped image.
pub fn prepare_page(
    entry: &PageEntry,
    settings: &LayoutSettings,
) -> Result<(PreparedPage, Option<SkippedImage>)> {
    let blank = PreparedPage {
        pair: entry.pair,
        side: entry.side,
        content: PreparedContent::Blank,
    };

    let PageContent::Image {
        reference, mirror, ..
    } = &entry.content
    else {
        return Ok((blank, None));
    };

    let decoded = match loader::load(reference, *mirror, settings.auto_trim) {
        Ok(decoded) => decoded,
        Err(e) => {
            log::warn!(
                "Pair {} {}: skipping {}: {}",
                entry.pair + 1,
                entry.side,
                e.reference,
                e.reason
            );
            let skipped = SkippedImage {
                pair: entry.pair,
                side: entry.side,
                reference: e.reference,
                reason: e.reason,
            };
            return Ok((blank, Some(skipped)));
        }
    };

    let DecodedImage {
        reference,
        image,
        ppi,
    } = decoded;
    let placement = place(settings, (image.width(), image.height()), ppi);
    let bitmap = match placement.resample {
        Some((width, height)) => FlateBitmap::from_image(&loader::resample(&image, width, height))?,
        None => FlateBitmap::from_image(&image)?,
    };

    log::debug!(
        "Pair {} {}: {:.2} x {:.2} cm at ({:.2}, {:.2}), {} bytes compressed",
        entry.pair + 1,
        entry.side,
        placement.width,
        placement.height,
        placement.x,
        placement.y,
        bitmap.compressed().len()
    );

    Ok((
        PreparedPage {
            pair: entry.pair,
            side: entry.side,
            content: PreparedContent::Image {
                reference,
                bitmap,
                placement,
            },
        },
        None,
    ))
}

/// Prepare every page and return them in print order
pub async fn prepare_pages(
    entries: Vec<PageEntry>,
    settings: &LayoutSettings,
) -> Result<PreparedPages> {
    let settings = settings.clone();
    let results = run_ordered(entries, worker_limit(), move |entry| {
        prepare_page(&entry, &settings)
    })
    .await?;

    let mut prepared = PreparedPages::default();
    for result in results {
        let (page, skipped) = result?;
        prepared.pages.push(page);
        prepared.skipped.extend(skipped);
    }
    Ok(prepared)
}

fn worker_limit() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Run `work` over `items` on the blocking pool with at most `limit` tasks in
/// flight, returning the outputs in input order
async fn run_ordered<T, R, F>(items: Vec<T>, limit: usize, work: F) -> Result<Vec<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Clone + Send + 'static,
{
    let limit = limit.max(1);
    let mut slots: Vec<Option<R>> = (0..items.len()).map(|_| None).collect();
    let mut tasks = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        if tasks.len() >= limit {
            if let Some(joined) = tasks.join_next().await {
                let (done, output) = joined?;
                slots[done] = Some(output);
            }
        }
        let work = work.clone();
        tasks.spawn_blocking(move || (index, work(item)));
    }

    while let Some(joined) = tasks.join_next().await {
        let (done, output) = joined?;
        slots[done] = Some(output);
    }

    Ok(slots.into_iter().flatten().collect())
}
