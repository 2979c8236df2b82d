use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::Once;

use anyhow::{Context, Result};
use log::{info, LevelFilter};

static INIT: Once = Once::new();

/// Installs the global logger once. With `log_dir` records go to a
/// timestamped file in that directory instead of stderr. Later calls do
/// nothing, not even create a file.
pub fn init_logger(log_dir: Option<&Path>, verbose: bool) -> Result<()> {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let mut result = Ok(());
    INIT.call_once(|| result = install(log_dir, level));
    result
}

fn install(log_dir: Option<&Path>, level: LevelFilter) -> Result<()> {
    let target = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir).with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let path = dir.join(log_file_name());
            let file = File::create(&path).with_context(|| format!("Failed to create log file {}", path.display()))?;
            env_logger::Target::Pipe(Box::new(file))
        }
        None => env_logger::Target::Stderr,
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).target(target).format(|buf, record| {
        writeln!(
            buf,
            "[{} {} {}:{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.file().unwrap_or("unknown"),
            record.line().unwrap_or(0),
            record.args()
        )
    });
    if builder.try_init().is_ok() {
        info!("ngx_upscaler logger initialized at level {:?}", level);
        log_build_info();
    }
    Ok(())
}

fn log_file_name() -> String {
    format!("ngx_upscaler_{}.log", chrono::Local::now().format("%Y%m%d_%H%M%S"))
}

fn log_build_info() {
    info!("ngx_upscaler v{}", env!("CARGO_PKG_VERSION"));
    #[cfg(target_os = "windows")]
    info!("Operating System: Windows");
    #[cfg(target_os = "linux")]
    info!("Operating System: Linux");
    #[cfg(feature = "ngx")]
    info!("Feature: NGX SDK linked");
    #[cfg(not(feature = "ngx"))]
    info!("Feature: NGX SDK not linked, upscaling unavailable");
}
