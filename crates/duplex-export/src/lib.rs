mod bitmap;
mod docx;
mod io;
mod pdf;
mod prepare;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use duplex_core::{DuplexError, ImageRef, LayoutSettings, PairCollection, Side, sequence};
use thiserror::Error;

pub use bitmap::FlateBitmap;
pub use docx::DocxEncoder;
pub use io::{StagedFile, stage, write_atomic};
pub use pdf::{PdfEncoder, image_operators};
pub use prepare::{PreparedContent, PreparedPage, PreparedPages, prepare_page, prepare_pages};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("DOCX package error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Core(#[from] DuplexError),
    #[error("No pairs to export")]
    NoPairs,
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Output document encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Page-drawing document
    Pdf,
    /// Flow document (WordprocessingML)
    Docx,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Pdf, ExportFormat::Docx];

    /// Infer the format from a file extension (case-insensitive)
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(ExportFormat::Pdf),
            "docx" => Some(ExportFormat::Docx),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    pub fn encoder(self) -> Box<dyn DocumentEncoder> {
        match self {
            ExportFormat::Pdf => Box::new(PdfEncoder),
            ExportFormat::Docx => Box::new(DocxEncoder),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Pdf => f.write_str("PDF"),
            ExportFormat::Docx => f.write_str("DOCX"),
        }
    }
}

/// Turns prepared pages into the bytes of one document
pub trait DocumentEncoder: Send + Sync {
    fn format(&self) -> ExportFormat;

    fn encode(&self, pages: &[PreparedPage], settings: &LayoutSettings) -> Result<Vec<u8>>;
}

/// An image that could not be loaded and was left out of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedImage {
    pub pair: usize,
    pub side: Side,
    pub reference: ImageRef,
    pub reason: String,
}

/// Outcome of one export
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub pages: usize,
    pub placed_images: usize,
    pub skipped: Vec<SkippedImage>,
}

impl ExportReport {
    /// 1-based pair numbers affected by skipped images, deduplicated
    pub fn affected_pairs(&self) -> Vec<usize> {
        let mut pairs: Vec<usize> = self.skipped.iter().map(|s| s.pair + 1).collect();
        pairs.dedup();
        pairs
    }
}

/// Export a snapshot of the collection to one document
pub async fn export(
    collection: PairCollection,
    settings: LayoutSettings,
    path: impl AsRef<Path>,
    format: ExportFormat,
) -> Result<ExportReport> {
    let prepared = Arc::new(prepare(&collection, &settings).await?);
    write_document(prepared, &settings, path.as_ref(), format).await
}

/// Export a snapshot of the collection to several documents, decoding once.
///
/// Every document is encoded and staged next to its target before any target
/// is replaced, so an encode or write failure leaves all targets untouched.
pub async fn export_all(
    collection: PairCollection,
    settings: LayoutSettings,
    targets: &[(PathBuf, ExportFormat)],
) -> Result<Vec<ExportReport>> {
    let prepared = Arc::new(prepare(&collection, &settings).await?);

    let mut staged = Vec::with_capacity(targets.len());
    for (path, format) in targets {
        let bytes = encode_document(prepared.clone(), &settings, *format).await?;
        staged.push((stage(path, bytes).await?, *format));
    }

    let mut reports = Vec::with_capacity(staged.len());
    for (file, format) in staged {
        let path = file.path().to_path_buf();
        file.persist().await?;
        reports.push(report(&prepared, path, format));
    }
    Ok(reports)
}

/// Sequence and prepare every page of the collection
pub async fn prepare(collection: &PairCollection, settings: &LayoutSettings) -> Result<PreparedPages> {
    settings.validate()?;
    if collection.is_empty() {
        return Err(ExportError::NoPairs);
    }

    let entries = sequence(collection, settings);
    log::info!(
        "Preparing {} pages for {} pairs",
        entries.len(),
        collection.len()
    );
    prepare_pages(entries, settings).await
}

/// Encode prepared pages on the blocking pool
pub async fn encode_document(
    prepared: Arc<PreparedPages>,
    settings: &LayoutSettings,
    format: ExportFormat,
) -> Result<Vec<u8>> {
    let encoder = format.encoder();
    let settings = settings.clone();
    tokio::task::spawn_blocking(move || encoder.encode(&prepared.pages, &settings)).await?
}

/// Encode prepared pages and write them atomically to `path`
pub async fn write_document(
    prepared: Arc<PreparedPages>,
    settings: &LayoutSettings,
    path: &Path,
    format: ExportFormat,
) -> Result<ExportReport> {
    let bytes = encode_document(prepared.clone(), settings, format).await?;
    write_atomic(path, bytes).await?;
    Ok(report(&prepared, path.to_path_buf(), format))
}

fn report(prepared: &PreparedPages, path: PathBuf, format: ExportFormat) -> ExportReport {
    let report = ExportReport {
        path,
        format,
        pages: prepared.pages.len(),
        placed_images: prepared.placed_images(),
        skipped: prepared.skipped.clone(),
    };
    log::info!(
        "Exported {} pages ({} images) to {} as {}",
        report.pages,
        report.placed_images,
        report.path.display(),
        report.format
    );
    if !report.skipped.is_empty() {
        log::warn!(
            "{} image(s) could not be loaded; affected pairs: {:?}",
            report.skipped.len(),
            report.affected_pairs()
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path("out.PDF"), Some(ExportFormat::Pdf));
        assert_eq!(ExportFormat::from_path("/tmp/a.docx"), Some(ExportFormat::Docx));
        assert_eq!(ExportFormat::from_path("notes.txt"), None);
        assert_eq!(ExportFormat::from_path("no_extension"), None);
    }

    #[test]
    fn test_encoder_matches_format() {
        for format in ExportFormat::ALL {
            assert_eq!(format.encoder().format(), format);
        }
    }

    #[tokio::test]
    async fn test_empty_collection_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        let result = export(
            PairCollection::new(),
            LayoutSettings::default(),
            &path,
            ExportFormat::Pdf,
        )
        .await;
        assert!(matches!(result, Err(ExportError::NoPairs)));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_export_all_writes_nothing_when_a_target_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(image::RgbImage::new(8, 8))
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let collection = PairCollection::from_refs([ImageRef::memory("a.png", bytes)]);

        let good = dir.path().join("out.pdf");
        let unreachable = dir.path().join("missing").join("out.docx");
        let result = export_all(
            collection,
            LayoutSettings::default(),
            &[
                (good.clone(), ExportFormat::Pdf),
                (unreachable.clone(), ExportFormat::Docx),
            ],
        )
        .await;

        assert!(matches!(result, Err(ExportError::Write { ref path, .. }) if *path == unreachable));
        assert!(!good.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
