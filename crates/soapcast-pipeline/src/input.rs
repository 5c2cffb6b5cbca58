//! Accepted input images and scale settings.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::ImageFormat;

use crate::error::{PipelineError, Result};

/// Image types the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Vector outline, used as-is.
    Svg,
    /// Raster, traced with potrace.
    Png,
    /// Raster, traced with potrace.
    Jpg,
    /// Raster, traced with potrace.
    Jpeg,
}

impl ImageKind {
    /// All accepted kinds.
    pub const ALL: [ImageKind; 4] = [Self::Svg, Self::Png, Self::Jpg, Self::Jpeg];

    /// File extension used when staging the input.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
        }
    }

    /// Whether the input is already a vector outline.
    pub fn is_vector(self) -> bool {
        self == Self::Svg
    }

    /// Infer the kind from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                PipelineError::UnsupportedInput(format!("{} has no file extension", path.display()))
            })?;
        ext.parse()
    }

    /// Check that `bytes` actually hold this kind of image.
    pub fn verify_content(self, bytes: &[u8]) -> Result<()> {
        let matches = match self {
            Self::Svg => {
                let text = String::from_utf8_lossy(bytes);
                text.contains("<svg")
            }
            Self::Png => image::guess_format(bytes).ok() == Some(ImageFormat::Png),
            Self::Jpg | Self::Jpeg => image::guess_format(bytes).ok() == Some(ImageFormat::Jpeg),
        };

        if matches {
            Ok(())
        } else {
            Err(PipelineError::UnsupportedInput(format!(
                "content is not a valid {} image",
                self.extension()
            )))
        }
    }
}

impl FromStr for ImageKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.extension() == lower)
            .ok_or_else(|| {
                PipelineError::UnsupportedInput(format!(
                    "file type '{s}' is not one of svg, png, jpg, jpeg"
                ))
            })
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Rescaling of the outline along x and y, in percent of the template default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    /// X scale in percent.
    pub x_percent: f64,
    /// Y scale in percent.
    pub y_percent: f64,
}

impl Default for Scale {
    fn default() -> Self {
        Self {
            x_percent: 100.0,
            y_percent: 100.0,
        }
    }
}

impl Scale {
    /// Create a scale from percentages.
    pub fn new(x_percent: f64, y_percent: f64) -> Result<Self> {
        let scale = Self {
            x_percent,
            y_percent,
        };
        scale.validate()?;
        Ok(scale)
    }

    /// Validate percentages.
    pub fn validate(&self) -> Result<()> {
        for (axis, value) in [("x", self.x_percent), ("y", self.y_percent)] {
            if !value.is_finite() || value < 0.0 {
                return Err(PipelineError::InvalidScale(format!(
                    "{axis} scale must be a non-negative percentage, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Absolute template factors `(x, y)` for a template default factor.
    pub fn factors(&self, default_scale: f64) -> (f64, f64) {
        (
            default_scale * self.x_percent / 100.0,
            default_scale * self.y_percent / 100.0,
        )
    }
}
