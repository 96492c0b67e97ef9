//! Graphical-analysis plot: ranked results grouped by body system or procedure

use crate::output::OutputFormat;
use crate::PlotConfig;
use anyhow::{bail, Context, Result};
use phenoplot_core::CategoryView;
use plotters::prelude::*;
use std::path::Path;

/// Generate a graphical-analysis plot
///
/// # Arguments
/// * `view` - Ranked records from `phenoplot_core::build_analysis`
/// * `threshold` - Significance line on the `-log10(p)` scale
/// * `output_path` - Path for output file (SVG or PNG based on extension)
/// * `config` - Plot configuration
pub fn analysis_plot<P: AsRef<Path>>(
    view: &CategoryView,
    threshold: f64,
    output_path: P,
    config: &PlotConfig,
) -> Result<()> {
    let output_path = output_path.as_ref();

    if view.is_empty() {
        bail!("No ranked records to plot");
    }
    let y_max = y_axis_max(view, threshold);

    match OutputFormat::from_path(output_path)? {
        OutputFormat::Svg => {
            let root = SVGBackend::new(output_path, (config.width, config.height))
                .into_drawing_area();
            draw_analysis_impl(&root, view, threshold, config, y_max)
                .context("Failed to draw analysis plot")?;
            root.present().context("Failed to write SVG")?;
        }
        #[cfg(feature = "png")]
        OutputFormat::Png => {
            let root = BitMapBackend::new(output_path, (config.width, config.height))
                .into_drawing_area();
            draw_analysis_impl(&root, view, threshold, config, y_max)
                .context("Failed to draw analysis plot")?;
            root.present().context("Failed to write PNG")?;
        }
        #[cfg(not(feature = "png"))]
        OutputFormat::Png => bail!("PNG output requires the `png` feature"),
    }
    Ok(())
}

/// Render a graphical-analysis plot to an SVG document in memory.
pub fn analysis_svg(view: &CategoryView, threshold: f64, config: &PlotConfig) -> Result<String> {
    if view.is_empty() {
        bail!("No ranked records to plot");
    }
    let y_max = y_axis_max(view, threshold);

    let mut buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut buffer, (config.width, config.height))
            .into_drawing_area();
        draw_analysis_impl(&root, view, threshold, config, y_max)
            .context("Failed to draw analysis plot")?;
        root.present().context("Failed to render SVG")?;
    }
    Ok(buffer)
}

fn y_axis_max(view: &CategoryView, threshold: f64) -> f64 {
    let max_value = view
        .records
        .iter()
        .map(|r| r.plot_value)
        .fold(0.0_f64, f64::max);
    (max_value * 1.1).max(threshold + 1.0)
}

/// Body-system names all end in " phenotype"; drop it on the axis.
fn short_label(label: &str) -> &str {
    label.strip_suffix(" phenotype").unwrap_or(label)
}

fn draw_analysis_impl<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    view: &CategoryView,
    threshold: f64,
    config: &PlotConfig,
    y_max: f64,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&config.theme.background)?;

    let default_title = format!("Graphical analysis ({})", view.mode.as_str());
    let title = config.title.as_deref().unwrap_or(&default_title);
    let x_max = view.records.len() as f64 - 0.5;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24).into_font().color(&config.theme.text))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc("-log₁₀(p)")
        .y_label_style(("sans-serif", 14).into_font().color(&config.theme.text))
        .axis_desc_style(("sans-serif", 18).into_font().color(&config.theme.text))
        .axis_style(&config.theme.axis)
        .draw()?;

    chart.draw_series(LineSeries::new(
        vec![(-0.5, threshold), (x_max, threshold)],
        config.theme.threshold_line.stroke_width(2),
    ))?;

    // ALL mode has no bands; colour everything as one series
    let band_of = |rank: usize| {
        view.bands()
            .iter()
            .position(|b| rank >= b.first_rank && rank <= b.last_rank)
            .unwrap_or(0)
    };
    let point_size = config.point_size;
    chart.draw_series(view.records.iter().map(|r| {
        let color = config.theme.series_color(band_of(r.rank));
        Circle::new((r.rank as f64, r.plot_value), point_size, color.filled())
    }))?;

    if config.highlight_significant {
        chart.draw_series(view.records.iter().filter(|r| r.significant).map(|r| {
            Circle::new(
                (r.rank as f64, r.plot_value),
                point_size + 1,
                config.theme.significant_outline.stroke_width(1),
            )
        }))?;
    }

    if config.show_labels {
        for band in view.bands() {
            chart.draw_series(std::iter::once(Text::new(
                short_label(&band.label).to_string(),
                (band.midpoint(), -y_max * 0.05),
                ("sans-serif", 11).into_font().color(&config.theme.text),
            )))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use phenoplot_core::{build_analysis, AggregationMode, PipelineConfig, StatisticalRecord};

    fn view(mode: AggregationMode) -> CategoryView {
        let mut records = Vec::new();
        for (i, (system, p)) in [
            ("cardiovascular system phenotype", 1e-6),
            ("skeleton phenotype", 0.4),
            ("skeleton phenotype", 0.01),
        ]
        .iter()
        .enumerate()
        {
            let mut r = StatisticalRecord::new(format!("MGI:{}", i), "4", 10).with_p_value(Some(*p));
            r.top_level_phenotypes = vec![system.to_string()];
            r.parameter_name = Some(format!("param {}", i));
            records.push(r);
        }
        build_analysis(&records, mode, false, &PipelineConfig::default())
    }

    #[test]
    fn test_short_label() {
        assert_eq!(short_label("skeleton phenotype"), "skeleton");
        assert_eq!(short_label("mortality/aging"), "mortality/aging");
    }

    #[test]
    fn test_analysis_svg_has_band_labels() {
        let svg = analysis_svg(&view(AggregationMode::BodySystems), 4.0, &PlotConfig::default()).unwrap();
        assert!(svg.contains("skeleton"));
        assert!(svg.contains("BODY_SYSTEMS"));
    }

    #[test]
    fn test_analysis_svg_all_mode() {
        let svg = analysis_svg(&view(AggregationMode::All), 4.0, &PlotConfig::default()).unwrap();
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn test_empty_view_rejected() {
        let empty = build_analysis(&[], AggregationMode::All, false, &PipelineConfig::default());
        assert!(analysis_svg(&empty, 4.0, &PlotConfig::default()).is_err());
    }
}
