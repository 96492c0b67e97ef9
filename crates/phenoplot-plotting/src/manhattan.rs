//! Manhattan plot generation for positioned phenotyping results

use crate::output::OutputFormat;
use crate::PlotConfig;
use anyhow::{bail, Context, Result};
use phenoplot_core::ManhattanLayout;
use plotters::prelude::*;
use std::path::Path;

/// Generate a Manhattan plot from a layout
///
/// # Arguments
/// * `layout` - Layout produced by `phenoplot_core::build_manhattan`
/// * `output_path` - Path for output file (SVG or PNG based on extension)
/// * `config` - Plot configuration
pub fn manhattan_plot<P: AsRef<Path>>(
    layout: &ManhattanLayout,
    output_path: P,
    config: &PlotConfig,
) -> Result<()> {
    let output_path = output_path.as_ref();

    if layout.is_empty() {
        bail!("No positioned records to plot");
    }
    let y_max = y_axis_max(layout);

    match OutputFormat::from_path(output_path)? {
        OutputFormat::Svg => {
            let root = SVGBackend::new(output_path, (config.width, config.height))
                .into_drawing_area();
            draw_manhattan_impl(&root, layout, config, y_max)
                .context("Failed to draw Manhattan plot")?;
            root.present().context("Failed to write SVG")?;
        }
        #[cfg(feature = "png")]
        OutputFormat::Png => {
            let root = BitMapBackend::new(output_path, (config.width, config.height))
                .into_drawing_area();
            draw_manhattan_impl(&root, layout, config, y_max)
                .context("Failed to draw Manhattan plot")?;
            root.present().context("Failed to write PNG")?;
        }
        #[cfg(not(feature = "png"))]
        OutputFormat::Png => bail!("PNG output requires the `png` feature"),
    }
    Ok(())
}

/// Render a Manhattan plot to an SVG document in memory.
pub fn manhattan_svg(layout: &ManhattanLayout, config: &PlotConfig) -> Result<String> {
    if layout.is_empty() {
        bail!("No positioned records to plot");
    }
    let y_max = y_axis_max(layout);

    let mut buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut buffer, (config.width, config.height))
            .into_drawing_area();
        draw_manhattan_impl(&root, layout, config, y_max)
            .context("Failed to draw Manhattan plot")?;
        root.present().context("Failed to render SVG")?;
    }
    Ok(buffer)
}

fn y_axis_max(layout: &ManhattanLayout) -> f64 {
    (layout.max_plot_value() * 1.1).max(layout.threshold + 1.0)
}

fn draw_manhattan_impl<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    layout: &ManhattanLayout,
    config: &PlotConfig,
    y_max: f64,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&config.theme.background)?;

    let title = config.title.as_deref().unwrap_or("Manhattan Plot");
    let x_max = layout.axis_max.max(1) as f64;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24).into_font().color(&config.theme.text))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;

    // Chromosome labels replace the numeric x-axis
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
        vec![(0.0, 0.0), (x_max, 0.0)],
        config.theme.axis.stroke_width(1),
    ))?;

    chart.draw_series(LineSeries::new(
        layout
            .threshold_points
            .iter()
            .map(|t| (t.axis_position as f64, t.value)),
        config.theme.threshold_line.stroke_width(2),
    ))?;

    let point_size = config.point_size;
    for (chrom_idx, span) in layout.spans.iter().enumerate() {
        let color = config.theme.series_color(chrom_idx);
        let records = layout.chromosome_records(span);

        chart.draw_series(records.iter().map(|p| {
            Circle::new((p.axis_position as f64, p.plot_value), point_size, color.filled())
        }))?;

        if config.highlight_significant {
            chart.draw_series(
                records
                    .iter()
                    .filter(|p| p.plot_value >= layout.threshold)
                    .map(|p| {
                        Circle::new(
                            (p.axis_position as f64, p.plot_value),
                            point_size + 1,
                            config.theme.significant_outline.stroke_width(1),
                        )
                    }),
            )?;
        }
    }

    if config.show_labels {
        for tick in &layout.ticks {
            chart.draw_series(std::iter::once(Text::new(
                tick.label.clone(),
                (tick.axis_midpoint, -y_max * 0.05),
                ("sans-serif", 14).into_font().color(&config.theme.text),
            )))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use phenoplot_core::{build_manhattan, PipelineConfig, StatisticalRecord};

    fn layout() -> ManhattanLayout {
        let records = vec![
            StatisticalRecord::new("MGI:1", "1", 3_000_000).with_p_value(Some(1e-7)),
            StatisticalRecord::new("MGI:2", "1", 9_000_000).with_p_value(Some(0.3)),
            StatisticalRecord::new("MGI:3", "11", 4_000_000).with_p_value(Some(0.02)),
        ];
        build_manhattan(&records, &PipelineConfig::default()).unwrap()
    }

    #[test]
    fn test_manhattan_svg_contains_labels() {
        let config = PlotConfig {
            title: Some("Pax6 associations".into()),
            ..PlotConfig::default()
        };
        let svg = manhattan_svg(&layout(), &config).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Pax6 associations"));
        assert!(svg.contains(">11<"));
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn test_empty_layout_rejected() {
        let empty = build_manhattan(&[], &PipelineConfig::default()).unwrap();
        assert!(manhattan_svg(&empty, &PlotConfig::default()).is_err());
    }

    #[test]
    fn test_manhattan_plot_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manhattan.svg");
        manhattan_plot(&layout(), &path, &PlotConfig::default()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Manhattan Plot"));
    }
}
