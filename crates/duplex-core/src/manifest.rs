//! CSV pair manifests
//!
//! A manifest lists one pair per row under the header
//! `front,back[,front_mirror,back_mirror]`. Empty image cells leave that side
//! empty. An empty mirror cell means no entry; a written `none` pins an
//! explicit no-mirror entry so the automatic back mirror does not apply.
//! Relative paths are resolved against the manifest's directory.

use std::path::{Path, PathBuf};

use crate::pairs::PairCollection;
use crate::types::*;
use crate::{DuplexError, Result};

struct Columns {
    front: usize,
    back: usize,
    front_mirror: Option<usize>,
    back_mirror: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let required = |name: &str| {
            find(name).ok_or_else(|| DuplexError::Manifest {
                line: 1,
                message: format!("missing '{}' column", name),
            })
        };

        Ok(Self {
            front: required("front")?,
            back: required("back")?,
            front_mirror: find("front_mirror"),
            back_mirror: find("back_mirror"),
        })
    }
}

/// Load a manifest file into a pair collection
pub async fn load_manifest(path: impl AsRef<Path>) -> Result<PairCollection> {
    let path = path.as_ref().to_owned();
    let contents = tokio::fs::read_to_string(&path).await?;
    let base_dir = path.parent().map(Path::to_path_buf);

    let collection = tokio::task::spawn_blocking(move || {
        parse_manifest(&contents, base_dir.as_deref())
    })
    .await??;

    log::info!(
        "Loaded {} pair(s) from manifest {}",
        collection.len(),
        path.display()
    );
    Ok(collection)
}

/// Parse manifest text; relative paths are joined onto `base_dir` when given
pub fn parse_manifest(contents: &str, base_dir: Option<&Path>) -> Result<PairCollection> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let columns = Columns::from_headers(reader.headers()?)?;
    let mut collection = PairCollection::new();

    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let cell = |index: usize| record.get(index).unwrap_or("").trim();

        let front = image_cell(cell(columns.front), base_dir);
        let back = image_cell(cell(columns.back), base_dir);
        if front.is_none() && back.is_none() {
            log::warn!("Manifest line {}: no images, row skipped", line);
            continue;
        }

        let position = collection.push(SheetPair::new(front, back));

        for (side, column) in [
            (Side::Front, columns.front_mirror),
            (Side::Back, columns.back_mirror),
        ] {
            let Some(text) = column.map(cell).filter(|text| !text.is_empty()) else {
                continue;
            };
            let mode: MirrorMode = text
                .parse()
                .map_err(|message| DuplexError::Manifest { line, message })?;
            collection.pin_mirror(position, side, mode)?;
        }
    }

    Ok(collection)
}

fn image_cell(text: &str, base_dir: Option<&Path>) -> Option<ImageRef> {
    if text.is_empty() {
        return None;
    }
    let path = PathBuf::from(text);
    let path = match base_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path,
    };
    Some(ImageRef::Path(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_column_manifest() {
        let pairs = parse_manifest("front,back\na.png,b.png\nc.png,\n", None).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs.get(1).unwrap().back, None);
        assert!(pairs.transforms().is_empty());
    }

    #[test]
    fn test_mirror_columns_and_pinned_none() {
        let text = "front,back,front_mirror,back_mirror\n\
                    a.png,b.png,h,\n\
                    c.png,d.png,,none\n";
        let pairs = parse_manifest(text, None).unwrap();
        assert_eq!(pairs.mirror(0, Side::Front), MirrorMode::Horizontal);
        assert_eq!(pairs.transforms().entry(0, Side::Back), None);
        assert_eq!(
            pairs.transforms().entry(1, Side::Back),
            Some(MirrorMode::None)
        );
    }

    #[test]
    fn test_relative_paths_join_base_dir() {
        let pairs = parse_manifest("front,back\nscans/a.png,/abs/b.png\n", Some(Path::new("/data")))
            .unwrap();
        let pair = pairs.get(0).unwrap();
        assert_eq!(pair.front, Some(ImageRef::path("/data/scans/a.png")));
        assert_eq!(pair.back, Some(ImageRef::path("/abs/b.png")));
    }

    #[test]
    fn test_bad_mirror_reports_line() {
        let text = "front,back,front_mirror\na.png,b.png,h\nc.png,d.png,diagonal\n";
        match parse_manifest(text, None) {
            Err(DuplexError::Manifest { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("diagonal"));
            }
            other => panic!("Expected Manifest error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            parse_manifest("image\na.png\n", None),
            Err(DuplexError::Manifest { line: 1, .. })
        ));
    }
}
