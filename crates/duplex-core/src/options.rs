use crate::constants::{DEFAULT_MARGIN_CM, MAX_PAPER_CM};
use crate::types::*;
use crate::{DuplexError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Export configuration, fixed for the duration of one export pass
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutSettings {
    /// Margin on every page edge
    pub margin_cm: f32,

    /// Mirror back images horizontally unless they carry their own entry
    pub mirror_backs: bool,

    /// Fit images into the printable area; otherwise place at native size
    pub scale_to_page_width: bool,

    /// Crop uniform white or transparent borders before layout
    pub auto_trim: bool,

    // Page geometry
    pub orientation: Orientation,
    pub paper_size: PaperSize,

    /// Open the exported document with the system viewer afterwards
    pub auto_open: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            margin_cm: DEFAULT_MARGIN_CM,
            mirror_backs: true,
            scale_to_page_width: true,
            auto_trim: true,
            orientation: Orientation::Portrait,
            paper_size: PaperSize::A4,
            auto_open: true,
        }
    }
}

impl LayoutSettings {
    /// Page width and height in centimetres, orientation applied
    pub fn page_dimensions_cm(&self) -> (f32, f32) {
        self.paper_size.dimensions_with_orientation(self.orientation)
    }

    /// Printable box inside the margins
    pub fn available_area_cm(&self) -> (f32, f32) {
        let (width, height) = self.page_dimensions_cm();
        (
            width - 2.0 * self.margin_cm,
            height - 2.0 * self.margin_cm,
        )
    }

    /// Load settings from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let settings: Self = serde_json::from_slice(&bytes)
            .map_err(|e| DuplexError::Config(format!("Failed to parse config: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if !self.margin_cm.is_finite() || self.margin_cm < 0.0 {
            return Err(DuplexError::Config(format!(
                "Margin must be a non-negative length, got {} cm",
                self.margin_cm
            )));
        }

        let (page_width, page_height) = self.page_dimensions_cm();
        if !(page_width > 0.0 && page_height > 0.0) {
            return Err(DuplexError::Config(format!(
                "Paper size must be positive, got {} x {} cm",
                page_width, page_height
            )));
        }
        if page_width > MAX_PAPER_CM || page_height > MAX_PAPER_CM {
            return Err(DuplexError::Config(format!(
                "Paper size {} x {} cm exceeds the {} cm limit per edge",
                page_width, page_height, MAX_PAPER_CM
            )));
        }

        let (available_width, available_height) = self.available_area_cm();
        if available_width <= 0.0 || available_height <= 0.0 {
            return Err(DuplexError::Config(format!(
                "A margin of {} cm leaves no printable area on a {} x {} cm page",
                self.margin_cm, page_width, page_height
            )));
        }

        Ok(())
    }
}
