//! Landclass CLI - land-cover classification from imagery files

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use landclass_algorithms::classification::classify_spectral;
use landclass_algorithms::imagery::append_spectral_indices;
use landclass_algorithms::pipeline::{classify_local_image, submit_export};
use landclass_algorithms::remote::{
    ExportAck, ExportRequest, ExportSink, DEFAULT_EXPORT_CRS, DEFAULT_EXPORT_FOLDER,
};
use landclass_algorithms::statistics::{
    class_statistics, stats_from_histogram, ClassStats, LocalZonalReducer, ZonalReducer,
};
use landclass_core::io::{read_band, read_image, write_band, write_image, write_labels};
use landclass_core::{Band, Bounds, EngineConfig, MultiBandRaster, Outcome, Sensor};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "landclass")]
#[command(author, version, about = "Rule-based land-cover classification", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Engine configuration (JSON); missing fields keep their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a photograph (8-bit TIFF, PNG or JPEG)
    Image {
        /// Input image
        input: PathBuf,
        /// Write the label raster here
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the color overlay here (.png, .jpg or TIFF)
        #[arg(long)]
        overlay: Option<PathBuf>,
        /// Overlay blend weight of the label colors, in [0, 1]
        #[arg(short, long)]
        alpha: Option<f64>,
        /// Ground area of one pixel in km²
        #[arg(long)]
        pixel_area: Option<f64>,
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify a multispectral composite given as one TIFF per band
    Spectral {
        /// Band file as NAME=PATH; NAME is RED, GREEN, BLUE, NIR, SWIR1, SWIR2
        /// or a native band id of --sensor (e.g. B8, SR_B5)
        #[arg(short, long = "band", required = true)]
        bands: Vec<String>,
        /// Sensor whose native band ids --band may use
        #[arg(long)]
        sensor: Option<String>,
        /// Extent of the rasters as west,south,east,north (degrees)
        #[arg(long)]
        bounds: Option<String>,
        /// Restrict statistics to this region (west,south,east,north)
        #[arg(long)]
        region: Option<String>,
        /// Restrict statistics to a square around lon,lat (needs --radius-km)
        #[arg(long)]
        center: Option<String>,
        /// Half side of the --center square, km
        #[arg(long, default_value = "10")]
        radius_km: f64,
        /// Write the label raster here
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write every derived index as a Float32 TIFF into this directory
        #[arg(long)]
        indices_dir: Option<PathBuf>,
        /// Export the label raster into this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,
        /// Export task name, also the exported file stem
        #[arg(long, default_value = "land_classification")]
        description: String,
        /// Folder under --export-dir receiving the export
        #[arg(long, default_value = DEFAULT_EXPORT_FOLDER)]
        export_folder: String,
        /// Coordinate system recorded with the export
        #[arg(long, default_value = DEFAULT_EXPORT_CRS)]
        crs: String,
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the label registry
    Labels {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as JSON
    Config,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn parse_bounds(s: &str) -> Result<Bounds> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid bounds: {}", s))?;
    if parts.len() != 4 {
        anyhow::bail!("Bounds must be 'west,south,east,north', got: {}", s);
    }
    Ok(Bounds::new(parts[0], parts[1], parts[2], parts[3])?)
}

fn parse_point(s: &str) -> Result<(f64, f64)> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        anyhow::bail!("Point must be 'lon,lat', got: {}", s);
    }
    let lon: f64 = parts[0].trim().parse().context("Invalid longitude")?;
    let lat: f64 = parts[1].trim().parse().context("Invalid latitude")?;
    Ok((lon, lat))
}

fn parse_sensor(s: &str) -> Result<Sensor> {
    match s.to_lowercase().as_str() {
        "sentinel2" | "s2" => Ok(Sensor::Sentinel2),
        "landsat8" | "l8" => Ok(Sensor::Landsat8),
        "landsat9" | "l9" => Ok(Sensor::Landsat9),
        _ => anyhow::bail!("Unknown sensor: {}. Use sentinel2, landsat8 or landsat9.", s),
    }
}

fn parse_band_arg(arg: &str, sensor: Option<Sensor>) -> Result<(Band, PathBuf)> {
    let (name, path) = arg
        .split_once('=')
        .with_context(|| format!("Band must be NAME=PATH, got: {}", arg))?;
    let band = match name.parse::<Band>() {
        Ok(band) => band,
        Err(_) => sensor
            .and_then(|s| s.band_for_id(name))
            .with_context(|| format!("Unknown band name: {}", name))?,
    };
    Ok((band, PathBuf::from(path)))
}

fn read_composite(args: &[String], sensor: Option<Sensor>) -> Result<MultiBandRaster> {
    let pb = spinner("Reading bands...");
    let mut composite = MultiBandRaster::new();
    for arg in args {
        let (band, path) = parse_band_arg(arg, sensor)?;
        let raster = read_band(&path, None)
            .with_context(|| format!("Failed to read {} from {}", band, path.display()))?;
        composite
            .insert(band, raster)
            .with_context(|| format!("Band {} does not match the others", band))?;
    }
    pb.finish_and_clear();
    if let Some((rows, cols)) = composite.shape() {
        info!("Input: {} x {}, {} bands", cols, rows, composite.band_count());
    }
    Ok(composite)
}

fn write_output<F>(what: &str, path: &Path, write: F) -> Result<()>
where
    F: FnOnce() -> landclass_core::Result<()>,
{
    let pb = spinner("Writing output...");
    write().with_context(|| format!("Failed to write {} to {}", what, path.display()))?;
    pb.finish_and_clear();
    println!("{} saved to: {}", what, path.display());
    Ok(())
}

fn report_degraded<T>(stage: &str, outcome: &Outcome<T>) {
    if let Some(reason) = outcome.reason() {
        warn!("{} fell back to its default output: {}", stage, reason);
    }
}

fn print_stats(stats: &ClassStats, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }
    println!(
        "{:<14} {:<14} {:>10} {:>8} {:>12}",
        "class", "name", "pixels", "%", "area (km²)"
    );
    for class in stats.iter() {
        println!(
            "{:<14} {:<14} {:>10} {:>8.2} {:>12.4}",
            class.key, class.name, class.pixels, class.percentage, class.area_km2
        );
    }
    println!("{:<14} {:<14} {:>10}", "total", "", stats.total_pixels);
    Ok(())
}

fn done(elapsed: std::time::Duration) {
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Local export ───────────────────────────────────────────────────────

/// Writes exports to `<root>/<folder>/<description>.tif` plus a JSON sidecar.
struct DirectoryExport {
    root: PathBuf,
}

#[derive(Serialize)]
struct ExportSidecar<'a> {
    description: &'a str,
    bounds: [f64; 4],
    scale_m: f64,
    crs: &'a str,
    format: String,
    rows: usize,
    cols: usize,
}

impl ExportSink for DirectoryExport {
    fn submit(&self, request: &ExportRequest<'_>) -> landclass_core::Result<ExportAck> {
        let dir = self.root.join(&request.folder);
        fs::create_dir_all(&dir)?;

        let tif = dir.join(format!("{}.tif", request.description));
        write_labels(request.classification, &tif)?;

        let (rows, cols) = request.classification.shape();
        let sidecar = ExportSidecar {
            description: &request.description,
            bounds: request.bounds.to_array(),
            scale_m: request.scale_m,
            crs: &request.crs,
            format: request.format.to_string(),
            rows,
            cols,
        };
        let json = serde_json::to_string_pretty(&sidecar)?;
        fs::write(dir.join(format!("{}.json", request.description)), json)?;

        Ok(ExportAck {
            task_id: tif.display().to_string(),
            message: format!("Export task started: {}", request.description),
        })
    }
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        // ── Image ────────────────────────────────────────────────────
        Commands::Image {
            input,
            output,
            overlay,
            alpha,
            pixel_area,
            json,
        } => {
            if !config.imaging.is_supported(&input) {
                warn!("{} does not have a supported extension", input.display());
            }
            if let Some(alpha) = alpha {
                config.imaging.overlay_alpha = alpha;
            }
            if let Some(area) = pixel_area {
                config = config.with_pixel_area(area);
            }
            config.validate().context("Invalid configuration")?;

            let pb = spinner("Reading image...");
            let image = read_image(&input).context("Failed to read image")?;
            pb.finish_and_clear();
            info!("Input: {} x {}, {} bands", image.cols(), image.rows(), image.band_count());

            let start = Instant::now();
            let report = classify_local_image(&image, &config);
            let elapsed = start.elapsed();
            report_degraded("Classification", &report.classification);
            report_degraded("Statistics", &report.stats);
            report_degraded("Overlay", &report.overlay);

            print_stats(report.stats.value(), json)?;
            if let Some(path) = output {
                write_output("Classification", &path, || {
                    write_labels(report.classification.value(), &path)
                })?;
            }
            if let Some(path) = overlay {
                write_output("Overlay", &path, || write_image(report.overlay.value(), &path))?;
            }
            done(elapsed);
        }

        // ── Spectral ─────────────────────────────────────────────────
        Commands::Spectral {
            bands,
            sensor,
            bounds,
            region,
            center,
            radius_km,
            output,
            indices_dir,
            export_dir,
            description,
            export_folder,
            crs,
            json,
        } => {
            config.validate().context("Invalid configuration")?;
            let sensor = sensor.as_deref().map(parse_sensor).transpose()?;
            let mut composite = read_composite(&bands, sensor)?;
            if let Some(b) = bounds.as_deref() {
                composite = composite.with_bounds(parse_bounds(b)?);
            }

            let region = match (region.as_deref(), center.as_deref()) {
                (Some(r), _) => Some(parse_bounds(r)?),
                (None, Some(c)) => {
                    let (lon, lat) = parse_point(c)?;
                    Some(Bounds::around(lon, lat, radius_km)?)
                }
                (None, None) => None,
            };

            let start = Instant::now();
            let appended = append_spectral_indices(&composite);
            report_degraded("Index calculation", &appended);
            let composite = appended.into_value();
            let classification = classify_spectral(&composite, &config);
            report_degraded("Classification", &classification);
            let labels = classification.value();

            let stats = match region {
                Some(region) => {
                    if composite.bounds().is_none() {
                        anyhow::bail!("--region and --center need --bounds");
                    }
                    let histogram = LocalZonalReducer
                        .frequency_histogram(labels, composite.bounds(), &region, &config.ground)
                        .context("Zonal reduction failed")?;
                    stats_from_histogram(&histogram, &config.labels, config.ground.pixel_area_km2)
                }
                None => {
                    let stats = class_statistics(labels, &config.labels, config.ground.pixel_area_km2);
                    report_degraded("Statistics", &stats);
                    stats.into_value()
                }
            };
            let elapsed = start.elapsed();

            print_stats(&stats, json)?;
            if let Some(path) = output {
                write_output("Classification", &path, || write_labels(labels, &path))?;
            }
            if let Some(dir) = indices_dir {
                fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
                let indices = composite.index_set().context("Failed to gather index bands")?;
                for (kind, raster) in indices.iter() {
                    let path = dir.join(format!("{}.tif", kind.band_name().to_lowercase()));
                    write_output(kind.band_name(), &path, || write_band(raster, &path))?;
                }
            }
            if let Some(root) = export_dir {
                let extent = composite
                    .bounds()
                    .copied()
                    .context("--export-dir needs --bounds")?;
                let sink = DirectoryExport { root };
                let request = ExportRequest::new(labels, extent, &description, &config.ground)
                    .with_folder(&export_folder)
                    .with_crs(&crs);
                let ack = submit_export(&sink, &request).context("Export failed")?;
                println!("{} ({})", ack.message, ack.task_id);
            }
            done(elapsed);
        }

        // ── Labels ───────────────────────────────────────────────────
        Commands::Labels { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&config.labels)?);
            } else {
                println!("{:<4} {:<14} {:<14} color", "id", "key", "name");
                for entry in config.labels.entries() {
                    println!("{:<4} {:<14} {:<14} {}", entry.id, entry.key, entry.name, entry.color);
                }
            }
        }

        // ── Config ───────────────────────────────────────────────────
        Commands::Config => {
            println!("{}", config.to_json_pretty()?);
        }
    }

    Ok(())
}
