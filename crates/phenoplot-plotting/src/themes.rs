//! Color themes for phenoplot charts

use anyhow::{anyhow, Result};
use plotters::style::RGBColor;

/// Color theme for plots
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub background: RGBColor,
    /// Text color
    pub text: RGBColor,
    /// Axis color
    pub axis: RGBColor,
    /// Significance threshold line color
    pub threshold_line: RGBColor,
    /// Outline drawn around points at or above the threshold
    pub significant_outline: RGBColor,
    /// Alternating chromosome (or category band) colors
    pub series_colors: Vec<RGBColor>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    /// Parse a theme name
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "classic" => Ok(Self::classic()),
            "nature" => Ok(Self::nature()),
            "dark" => Ok(Self::dark()),
            "high-contrast" => Ok(Self::high_contrast()),
            other => Err(anyhow!(
                "Unknown theme: {}. Use: classic, nature, dark, or high-contrast",
                other
            )),
        }
    }

    /// Blue/orange alternating chromosomes
    pub fn classic() -> Self {
        Self {
            background: RGBColor(255, 255, 255),
            text: RGBColor(0, 0, 0),
            axis: RGBColor(100, 100, 100),
            threshold_line: RGBColor(255, 0, 0),
            significant_outline: RGBColor(0, 0, 0),
            series_colors: vec![
                RGBColor(31, 119, 180),   // Blue
                RGBColor(255, 127, 14),   // Orange
            ],
        }
    }

    /// Muted greys
    pub fn nature() -> Self {
        Self {
            background: RGBColor(255, 255, 255),
            text: RGBColor(50, 50, 50),
            axis: RGBColor(80, 80, 80),
            threshold_line: RGBColor(178, 34, 34),  // Firebrick
            significant_outline: RGBColor(178, 34, 34),
            series_colors: vec![
                RGBColor(77, 77, 77),
                RGBColor(153, 153, 153),
            ],
        }
    }

    /// Dark background for presentations
    pub fn dark() -> Self {
        Self {
            background: RGBColor(30, 30, 30),
            text: RGBColor(220, 220, 220),
            axis: RGBColor(150, 150, 150),
            threshold_line: RGBColor(255, 100, 100),
            significant_outline: RGBColor(255, 255, 255),
            series_colors: vec![
                RGBColor(102, 194, 165),  // Teal
                RGBColor(252, 141, 98),   // Coral
            ],
        }
    }

    pub fn high_contrast() -> Self {
        Self {
            background: RGBColor(255, 255, 255),
            text: RGBColor(0, 0, 0),
            axis: RGBColor(0, 0, 0),
            threshold_line: RGBColor(0, 0, 0),
            significant_outline: RGBColor(0, 0, 0),
            series_colors: vec![
                RGBColor(0, 0, 0),
                RGBColor(150, 150, 150),
            ],
        }
    }

    /// Color for the `idx`-th chromosome or band.
    pub fn series_color(&self, idx: usize) -> &RGBColor {
        &self.series_colors[idx % self.series_colors.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_str() {
        assert!(Theme::from_str("classic").is_ok());
        assert!(Theme::from_str("High_Contrast").is_ok());
        assert!(Theme::from_str("neon").is_err());
    }

    #[test]
    fn test_series_color_wraps() {
        let theme = Theme::classic();
        let rgb = |c: &RGBColor| (c.0, c.1, c.2);
        assert_eq!(rgb(theme.series_color(0)), rgb(theme.series_color(2)));
        assert_ne!(rgb(theme.series_color(0)), rgb(theme.series_color(1)));
    }
}
