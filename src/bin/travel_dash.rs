use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use travel_dash::{Dashboard, DashboardConfig, FilterSpec};

/// Travel survey dashboard - renders the analytics page from the survey CSV
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML config file; relative paths in it resolve against its directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the CSV and prediction feeds when no config is given
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// Survey CSV (overrides the config)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Year selector: a survey year or "both"
    #[arg(long, default_value = "both")]
    year: String,

    /// Companion selector: a companion label or "All"
    #[arg(long, default_value = "All")]
    companion: String,

    /// Country selector for the trend chart (empty = top destinations)
    #[arg(long, default_value = "")]
    country: String,

    /// Output HTML file
    #[arg(short, long, default_value = "dashboard.html")]
    output: PathBuf,

    /// Print the rendered chart data as JSON instead of writing HTML
    #[arg(long)]
    json: bool,
}

fn load_config(args: &Args) -> Result<DashboardConfig> {
    let mut config = match &args.config {
        Some(path) => DashboardConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => DashboardConfig::default().resolved_against(&args.base_dir),
    };
    if let Some(data) = &args.data {
        config.data_path = data.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let spec = FilterSpec::from_selectors(&args.year, &args.companion, &args.country)?;
    let config = load_config(&args)?;
    info!("Survey data: {}", config.data_path.display());

    let mut dashboard = Dashboard::new(config);
    match dashboard.load() {
        Ok(n) => {
            info!("Loaded {} records", n);
            dashboard.set_filter(spec)?;
        }
        // The page still renders prediction tables without the survey data
        Err(e) => error!("Failed to load survey data: {}", e),
    }

    if args.json {
        let frame = dashboard.current_frame()?;
        println!("{}", serde_json::to_string_pretty(frame)?);
        return Ok(());
    }

    let html = dashboard.to_html();
    std::fs::write(&args.output, html)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!("Wrote dashboard to {}", args.output.display());
    Ok(())
}
