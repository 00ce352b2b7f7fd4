use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which physical side of a printed sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Side {
    /// Printed first in duplex
    Front,
    /// Printed second in duplex
    Back,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Back => "back",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" | "f" => Ok(Side::Front),
            "back" | "b" => Ok(Side::Back),
            other => Err(format!("unknown side '{other}' (expected front or back)")),
        }
    }
}

/// Geometric flip applied to an image before layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MirrorMode {
    #[default]
    None,
    /// Left-right flip
    Horizontal,
    /// Top-bottom flip
    Vertical,
    /// Both flips (equivalent to a 180° rotation)
    Both,
}

impl MirrorMode {
    pub fn flips_horizontally(self) -> bool {
        matches!(self, MirrorMode::Horizontal | MirrorMode::Both)
    }

    pub fn flips_vertically(self) -> bool {
        matches!(self, MirrorMode::Vertical | MirrorMode::Both)
    }

    pub fn is_none(self) -> bool {
        self == MirrorMode::None
    }

    pub fn name(self) -> &'static str {
        match self {
            MirrorMode::None => "none",
            MirrorMode::Horizontal => "horizontal",
            MirrorMode::Vertical => "vertical",
            MirrorMode::Both => "both",
        }
    }
}

impl fmt::Display for MirrorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for MirrorMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(MirrorMode::None),
            "h" | "horizontal" => Ok(MirrorMode::Horizontal),
            "v" | "vertical" => Ok(MirrorMode::Vertical),
            "both" | "hv" => Ok(MirrorMode::Both),
            other => Err(format!(
                "unknown mirror mode '{other}' (expected none, h, v or both)"
            )),
        }
    }
}

/// Opaque handle to a source image.
///
/// Two references are the same logical image when they compare equal; the
/// transform bookkeeping in [`crate::PairCollection`] relies on nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageRef {
    /// Image file on disk
    Path(PathBuf),
    /// Image already loaded into memory, with a display name
    Memory { name: String, bytes: Arc<[u8]> },
}

impl ImageRef {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        ImageRef::Path(path.into())
    }

    pub fn memory(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        ImageRef::Memory {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ImageRef::Path(path) => Some(path),
            ImageRef::Memory { .. } => None,
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::Path(path) => write!(f, "{}", path.display()),
            ImageRef::Memory { name, .. } => f.write_str(name),
        }
    }
}

impl From<PathBuf> for ImageRef {
    fn from(path: PathBuf) -> Self {
        ImageRef::Path(path)
    }
}

impl From<&Path> for ImageRef {
    fn from(path: &Path) -> Self {
        ImageRef::Path(path.to_owned())
    }
}

impl From<&str> for ImageRef {
    fn from(path: &str) -> Self {
        ImageRef::Path(PathBuf::from(path))
    }
}

/// One front/back entry of the pair collection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SheetPair {
    pub front: Option<ImageRef>,
    pub back: Option<ImageRef>,
}

impl SheetPair {
    pub fn new(front: Option<ImageRef>, back: Option<ImageRef>) -> Self {
        Self { front, back }
    }

    pub fn side(&self, side: Side) -> Option<&ImageRef> {
        match side {
            Side::Front => self.front.as_ref(),
            Side::Back => self.back.as_ref(),
        }
    }

    pub(crate) fn side_mut(&mut self, side: Side) -> &mut Option<ImageRef> {
        match side {
            Side::Front => &mut self.front,
            Side::Back => &mut self.back,
        }
    }
}

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Orientation {
    /// Portrait: height > width (default for most paper sizes)
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PaperSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_cm: f32, height_cm: f32 },
}

impl PaperSize {
    /// Get base dimensions (always portrait: width < height for standard sizes)
    pub fn dimensions_cm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (29.7, 42.0),
            PaperSize::A4 => (21.0, 29.7),
            PaperSize::A5 => (14.8, 21.0),
            PaperSize::Letter => (21.59, 27.94),
            PaperSize::Legal => (21.59, 35.56),
            PaperSize::Tabloid => (27.94, 43.18),
            PaperSize::Custom {
                width_cm,
                height_cm,
            } => (width_cm, height_cm),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_cm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Lowercase extensions accepted when filtering dropped or selected files
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

/// Check whether a path looks like an image the loader is expected to handle
pub fn is_supported_image(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
