//! phenoplot-plotting: charts for phenoplot layouts
//!
//! Renders the plot-ready structures built by `phenoplot-core`:
//! - Manhattan plots of a [`ManhattanLayout`]
//! - graphical-analysis plots of a [`CategoryView`]
//!
//! SVG output is always available; PNG requires the `png` feature.
//!
//! ## Example
//! ```ignore
//! use phenoplot_plotting::{manhattan_plot, PlotConfig};
//!
//! let layout = phenoplot_core::build_manhattan(&records, &Default::default())?;
//! manhattan_plot(&layout, "manhattan.svg", &PlotConfig::default())?;
//! ```

pub mod analysis;
pub mod manhattan;
pub mod output;
pub mod themes;

pub use analysis::{analysis_plot, analysis_svg};
pub use manhattan::{manhattan_plot, manhattan_svg};
pub use output::OutputFormat;
pub use themes::Theme;

/// Configuration for plot appearance
#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// Plot width in pixels
    pub width: u32,
    /// Plot height in pixels
    pub height: u32,
    /// Plot title
    pub title: Option<String>,
    /// Color theme
    pub theme: Theme,
    /// Point size
    pub point_size: u32,
    /// Show chromosome / category labels under the x-axis
    pub show_labels: bool,
    /// Outline points at or above the significance threshold
    pub highlight_significant: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            title: None,
            theme: Theme::default(),
            point_size: 3,
            show_labels: true,
            highlight_significant: true,
        }
    }
}

#[doc(no_inline)]
pub use phenoplot_core::{CategoryView, ManhattanLayout};
