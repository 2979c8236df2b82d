use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::{App, Arg};
use log::{info, warn};
use ngx_upscaler::upscaler_core::{Extent, GpuDetector, QualityTier, RecommendedSettings};
use ngx_upscaler::UpscalerSettings;

fn parse_extent(value: &str) -> Result<Extent> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow!("Invalid display size '{}'. Use WIDTHxHEIGHT", value))?;
    let width = w.trim().parse().with_context(|| format!("Invalid width in '{}'", value))?;
    let height = h.trim().parse().with_context(|| format!("Invalid height in '{}'", value))?;
    Ok(Extent::new(width, height))
}

fn main() -> Result<()> {
    let matches = App::new("ngx-probe")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reports GPUs and settings relevant to NGX super sampling")
        .arg(
            Arg::with_name("verbose")
                .short('v')
                .long("verbose")
                .takes_value(false)
                .help("Enable debug logging"),
        )
        .arg(
            Arg::with_name("log-dir")
                .long("log-dir")
                .takes_value(true)
                .help("Directory to write the log file to instead of stderr"),
        )
        .arg(
            Arg::with_name("settings")
                .long("settings")
                .takes_value(true)
                .help("Upscaler settings JSON file"),
        )
        .arg(
            Arg::with_name("display")
                .long("display")
                .takes_value(true)
                .help("Display size as WIDTHxHEIGHT, e.g. 3840x2160"),
        )
        .arg(
            Arg::with_name("quality")
                .long("quality")
                .takes_value(true)
                .help("Quality tier: ultra-performance, performance, balanced, quality, ultra-quality"),
        )
        .get_matches();

    let log_dir = matches.value_of("log-dir").map(Path::new);
    if let Err(e) = ngx_upscaler::logger::init_logger(log_dir, matches.is_present("verbose")) {
        eprintln!("Warning: Failed to initialize logger: {:#}", e);
    }

    let settings = match matches.value_of("settings") {
        Some(path) => UpscalerSettings::load(Path::new(path))?,
        None => UpscalerSettings::default(),
    };
    println!("Settings: {}", serde_json::to_string_pretty(&settings)?);

    let mut detector = GpuDetector::new();
    match detector.detect_gpus() {
        Ok(()) => {
            for gpu in detector.all_gpus() {
                let candidate = if gpu.is_ngx_candidate() { "NGX candidate" } else { "not eligible" };
                println!("{} [{:?}] - {}", gpu.description(), gpu.renderer(), candidate);
            }
            if let Some(primary) = detector.primary_gpu() {
                info!("Primary GPU: {}", primary.description());
            }
        }
        Err(e) => warn!("GPU detection failed: {}", e),
    }

    if let Some(display) = matches.value_of("display") {
        let display = parse_extent(display)?;
        let quality = match matches.value_of("quality") {
            Some(name) => QualityTier::from_name(name).ok_or_else(|| anyhow!("Unknown quality tier '{}'", name))?,
            None => settings.quality,
        };
        // Without an initialized SDK the recommendation is the display size itself.
        let recommended = RecommendedSettings::identity(display);
        println!(
            "{:?} at {}: render {} ({:.0}%), sharpness {}",
            quality,
            display,
            recommended.optimal_resolution,
            recommended.rendering_percentage(display) * 100.0,
            recommended.sharpness
        );
    }

    Ok(())
}
