use anyhow::Result;
use clap::{Parser, Subcommand};
use phenoplot_core::{build_analysis, build_manhattan, AggregationMode, PipelineConfig};
use phenoplot_plotting::{PlotConfig, Theme};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// phenoplot: aggregate phenotyping association results into plot-ready layouts
#[derive(Parser)]
#[command(
    name = "phenoplot",
    version,
    about = "phenoplot: Manhattan and graphical-analysis layouts for phenotyping statistical results"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deduplicate per gene and lay results out along the genome axis
    Manhattan {
        /// Statistical results (.json, .csv or .tsv)
        #[arg(long)]
        input: String,

        /// Optional pipeline config JSON
        #[arg(long)]
        config: Option<String>,

        /// Write the layout as JSON
        #[arg(long)]
        out: Option<String>,

        /// Write positioned records as TSV
        #[arg(long)]
        tsv: Option<String>,

        /// Render the plot (svg, or png with the `png` feature)
        #[arg(long)]
        plot: Option<String>,

        /// Plot title
        #[arg(long)]
        title: Option<String>,

        /// Color theme (classic, nature, dark, high-contrast)
        #[arg(long, default_value = "classic")]
        theme: String,
    },

    /// Rank results by body system or procedure
    Analysis {
        /// Statistical results (.json, .csv or .tsv)
        #[arg(long)]
        input: String,

        /// Optional pipeline config JSON
        #[arg(long)]
        config: Option<String>,

        /// Grouping mode (body-systems, procedures, all)
        #[arg(long, default_value = "all")]
        mode: String,

        /// Keep only categories with at least one significant result
        #[arg(long, default_value_t = false)]
        significant_only: bool,

        /// Write the ranked view as JSON
        #[arg(long)]
        out: Option<String>,

        /// Render the plot (svg, or png with the `png` feature)
        #[arg(long)]
        plot: Option<String>,

        /// Plot title
        #[arg(long)]
        title: Option<String>,

        /// Color theme (classic, nature, dark, high-contrast)
        #[arg(long, default_value = "classic")]
        theme: String,
    },

    /// Print per-chromosome counts and the top hit
    Summary {
        /// Statistical results (.json, .csv or .tsv)
        #[arg(long)]
        input: String,

        /// Optional pipeline config JSON
        #[arg(long)]
        config: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Manhattan { input, config, out, tsv, plot, title, theme } => {
            let config = load_config(config.as_deref())?;
            let records = phenoplot_io::load_records(&input)?;
            let layout = build_manhattan(&records, &config)?;
            info!(
                records = records.len(),
                genes = layout.positioned.len(),
                chromosomes = layout.ticks.len(),
                "built Manhattan layout"
            );

            if let Some(path) = out {
                phenoplot_io::write_json(&path, &layout)?;
                info!(path = %path, "wrote layout");
            }
            if let Some(path) = tsv {
                phenoplot_io::write_positioned_tsv(&path, &layout)?;
                info!(path = %path, "wrote positioned records");
            }
            if let Some(path) = plot {
                let plot_config = plot_config(title, &theme)?;
                phenoplot_plotting::manhattan_plot(&layout, &path, &plot_config)?;
                info!(path = %path, "wrote Manhattan plot");
            }
        }
        Commands::Analysis { input, config, mode, significant_only, out, plot, title, theme } => {
            let config = load_config(config.as_deref())?;
            let mode = AggregationMode::from_str(&mode)?;
            let records = phenoplot_io::load_records(&input)?;
            let view = build_analysis(&records, mode, significant_only, &config);
            info!(
                mode = mode.as_str(),
                records = records.len(),
                kept = view.records.len(),
                significant = view.significant_count(),
                "built graphical analysis"
            );

            if let Some(path) = out {
                phenoplot_io::write_json(&path, &view)?;
                info!(path = %path, "wrote ranked view");
            }
            if let Some(path) = plot {
                let plot_config = plot_config(title, &theme)?;
                phenoplot_plotting::analysis_plot(
                    &view,
                    config.default_significance_threshold,
                    &path,
                    &plot_config,
                )?;
                info!(path = %path, "wrote analysis plot");
            }
        }
        Commands::Summary { input, config } => {
            let config = load_config(config.as_deref())?;
            let records = phenoplot_io::load_records(&input)?;
            let summary = build_manhattan(&records, &config)?.summary();

            println!("records\t{}", summary.input_records);
            println!("positioned_genes\t{}", summary.positioned_genes);
            println!("dropped_by_whitelist\t{}", summary.dropped_by_whitelist);
            println!("dropped_missing_start\t{}", summary.dropped_missing_start);
            println!("merged_duplicates\t{}", summary.merged_duplicates);
            if summary.dropped_overflow > 0 {
                println!("dropped_overflow\t{}", summary.dropped_overflow);
            }
            println!("significant_genes\t{}", summary.significant_genes);
            for (chrom, genes) in &summary.genes_per_chromosome {
                println!("chr{}\t{}", chrom, genes);
            }
            match summary.top_hit {
                Some(hit) => println!(
                    "top_hit\t{}\t{}\tchr{}\t{:.3}",
                    hit.gene_id, hit.gene_symbol, hit.chromosome, hit.plot_value
                ),
                None => println!("top_hit\tNA"),
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&str>) -> Result<PipelineConfig> {
    match path {
        Some(path) => phenoplot_io::load_pipeline_config(path),
        None => Ok(PipelineConfig::default()),
    }
}

fn plot_config(title: Option<String>, theme: &str) -> Result<PlotConfig> {
    Ok(PlotConfig {
        title,
        theme: Theme::from_str(theme)?,
        ..PlotConfig::default()
    })
}
