//! Output format handling for plots
//!
//! Rendering itself lives in the individual plot modules (manhattan, analysis).

use anyhow::{bail, Result};
use std::path::Path;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Scalable Vector Graphics (default)
    #[default]
    Svg,
    /// Portable Network Graphics (requires `png` feature)
    Png,
}

impl OutputFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Detect format from an output path; no extension means SVG.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext,
            None => return Ok(Self::Svg),
        };
        match Self::from_extension(ext) {
            Some(Self::Png) if !cfg!(feature = "png") => {
                bail!("PNG output requires the `png` feature")
            }
            Some(format) => Ok(format),
            None => bail!("Unsupported output format: {}", ext),
        }
    }

    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}
