//! Wind overlay snapshot tool.
//!
//! Renders one settled viewport for a date and a set of wind levels and
//! writes the result as GeoJSON:
//! - arrow glyph polylines per level
//! - point feature labels with their open state
//! - the country border outline
//! - status messages, scale readout and imagery TIME value

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use overlay_common::{DateKey, LevelKey, ViewportWindow};
use overlay_viewer::{load_features, GeoJsonSurface, SessionController, StatusLog, ViewerConfig};
use storage::{DatasetFetcher, FsDatasetFetcher, HttpDatasetFetcher};

#[derive(Parser, Debug)]
#[command(name = "overlay-viewer")]
#[command(about = "Render a wind vector overlay snapshot as GeoJSON")]
struct Args {
    /// Configuration file (YAML)
    #[arg(long, env = "OVERLAY_CONFIG", default_value = "config/viewer.yaml")]
    config: PathBuf,

    /// Date to render (YYYY-MM-DD, UTC). Defaults to today.
    #[arg(long)]
    date: Option<String>,

    /// Viewport centre latitude
    #[arg(long, allow_hyphen_values = true)]
    center_lat: Option<f64>,

    /// Viewport centre longitude
    #[arg(long, allow_hyphen_values = true)]
    center_lon: Option<f64>,

    /// Zoom level
    #[arg(long)]
    zoom: Option<u8>,

    /// Viewport width in pixels
    #[arg(long, default_value = "1024")]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value = "768")]
    height: u32,

    /// Wind level to activate (repeatable): 10m, 900hPa, 400hPa, 150hPa
    #[arg(long = "level")]
    levels: Vec<String>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format: text or json
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    log_format: String,
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if args.log_format.eq_ignore_ascii_case("json") {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args)?;

    let mut config = ViewerConfig::load(&args.config)?;
    config.apply_env()?;

    let date = match args.date.as_deref() {
        Some(s) => s.parse::<DateKey>().context("Invalid --date")?,
        None => DateKey::today_utc(),
    };

    let mut levels = config.wind.levels.clone();
    for raw in &args.levels {
        let level: LevelKey = raw.parse().with_context(|| format!("Invalid --level {}", raw))?;
        if !levels.contains(&level) {
            levels.push(level);
        }
    }

    let zoom = args.zoom.unwrap_or(config.map.zoom).min(config.map.max_zoom);
    let viewport = ViewportWindow::from_center(
        args.center_lat.unwrap_or(config.map.center_lat),
        args.center_lon.unwrap_or(config.map.center_lon),
        zoom,
        args.width,
        args.height,
    );

    let fetcher: Arc<dyn DatasetFetcher> = match config.data.base_url.as_deref() {
        Some(url) => Arc::new(HttpDatasetFetcher::new(url)?),
        None => Arc::new(FsDatasetFetcher::new(config.data.base_dir.clone())),
    };

    info!(
        date = %date,
        zoom,
        levels = ?levels,
        source = %fetcher.describe(),
        "Starting wind overlay snapshot"
    );

    let loaded = load_features(&config, fetcher.clone()).await;

    let mut controller = SessionController::new(
        &config,
        fetcher,
        GeoJsonSurface::new(),
        StatusLog::new(),
        date,
        viewport,
    )?;
    controller.show_imagery();
    controller.bind_features(&loaded.points);
    for level in levels {
        controller.on_level_activated(level).await;
    }

    // A single tick; the loop settles outstanding fetches once it closes.
    let (ticks, rx) = mpsc::channel(1);
    ticks
        .send(viewport)
        .await
        .context("Viewport channel closed")?;
    drop(ticks);
    let handled = controller.run_viewport_ticks(rx).await;

    let readout = handled
        .iter()
        .rev()
        .find_map(|effects| effects.scale_readout.clone())
        .unwrap_or_else(|| controller.scale_readout());
    let time = config.imagery.time_format.time_param(&date);
    let (surface, status) = controller.into_parts();

    let mut snapshot = surface
        .to_feature_collection()
        .with_property("date", date.to_string())
        .with_property("zoom", zoom)
        .with_property("scale", readout)
        .with_property("imagery_time", time)
        .with_property("imagery_attribution", config.imagery.attribution.clone())
        .with_property("status", status.messages().to_vec())
        .with_property("failures", loaded.failures.clone());
    if let Some(border) = loaded.border {
        for feature in border.features {
            snapshot.features.push(feature.with_property("layer", "border"));
        }
    }

    let body = serde_json::to_string_pretty(&snapshot)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, body).with_context(|| format!("Failed to write {:?}", path))?;
            info!(path = %path.display(), features = snapshot.len(), "Snapshot written");
        }
        None => println!("{}", body),
    }

    Ok(())
}
