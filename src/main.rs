use anyhow::{Context, Result};
use chartbind::config::DashboardConfig;
use chartbind::{runtime, OutputFormat, MAX_DIMENSION};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chartbind")]
#[command(about = "Render bar, pie and line charts from a JSON data endpoint", long_about = None)]
struct Args {
    /// Data endpoint returning a JSON array of flat objects
    #[arg(long)]
    url: Option<String>,

    /// Read the dataset from a local .json or .csv file instead of the endpoint
    #[arg(long, conflicts_with = "url")]
    input: Option<PathBuf>,

    /// JSON config file; flags given here override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for chart1..3, charts.json and dashboard.html
    #[arg(long)]
    out_dir: Option<PathBuf>,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_DIMENSION as i64))]
    width: Option<u32>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_DIMENSION as i64))]
    height: Option<u32>,

    /// Category axis of the bar and line charts (default: first text field)
    #[arg(long)]
    primary_category: Option<String>,

    /// Grouping field of the pie chart (default: second text field)
    #[arg(long)]
    secondary_category: Option<String>,

    /// Value field of the bar and line charts (default: first numeric field)
    #[arg(long)]
    primary_numeric: Option<String>,

    /// Only write the ECharts page and options
    #[arg(long)]
    html_only: bool,
}

impl Args {
    fn into_config(self) -> Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::load(path)?,
            None => DashboardConfig::default(),
        };

        if let Some(url) = self.url {
            config.url = url;
            config.input = None;
        }
        if let Some(input) = self.input {
            config.input = Some(input);
        }
        if let Some(out_dir) = self.out_dir {
            config.out_dir = out_dir;
        }
        if let Some(format) = self.format {
            config.render.format = format;
        }
        if let Some(width) = self.width {
            config.render.width = width;
        }
        if let Some(height) = self.height {
            config.render.height = height;
        }
        if self.primary_category.is_some() {
            config.binding.primary_category = self.primary_category;
        }
        if self.secondary_category.is_some() {
            config.binding.secondary_category = self.secondary_category;
        }
        if self.primary_numeric.is_some() {
            config.binding.primary_numeric = self.primary_numeric;
        }
        config.html_only |= self.html_only;

        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = args.into_config().context("Failed to load configuration")?;
    let written = runtime::run_dashboard(&config).context("Failed to build dashboard")?;

    for path in written {
        println!("{}", path.display());
    }

    Ok(())
}
