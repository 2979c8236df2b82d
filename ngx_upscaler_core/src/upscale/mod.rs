use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application id NGX falls back to when the host does not provide one.
pub const DEFAULT_APP_ID: u64 = 231_313_132;

/// Result of the capability probe. Set once per initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupportStatus {
    Supported,
    #[default]
    NotSupported,
    IncompatibleHardware,
    DriverOutOfDate,
    OperatingSystemOutOfDate,
}

impl SupportStatus {
    pub fn is_supported(self) -> bool {
        self == SupportStatus::Supported
    }
}

impl fmt::Display for SupportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SupportStatus::Supported => "supported",
            SupportStatus::NotSupported => "not supported",
            SupportStatus::IncompatibleHardware => "incompatible hardware",
            SupportStatus::DriverOutOfDate => "driver out of date",
            SupportStatus::OperatingSystemOutOfDate => "operating system out of date",
        };
        f.write_str(s)
    }
}

/// Upscaling quality tiers, ordered from fastest to best looking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum QualityTier {
    UltraPerformance,
    Performance,
    #[default]
    Balanced,
    Quality,
    UltraQuality,
}

impl QualityTier {
    pub const ALL: [QualityTier; 5] = [
        QualityTier::UltraPerformance,
        QualityTier::Performance,
        QualityTier::Balanced,
        QualityTier::Quality,
        QualityTier::UltraQuality,
    ];

    /// NGX `PerfQualityValue` for this tier.
    pub fn perf_quality(self) -> ngx_sys::NgxPerfQuality {
        use ngx_sys::NgxPerfQuality;
        match self {
            QualityTier::UltraPerformance => NgxPerfQuality::UltraPerformance,
            QualityTier::Performance => NgxPerfQuality::MaxPerf,
            QualityTier::Balanced => NgxPerfQuality::Balanced,
            QualityTier::Quality => NgxPerfQuality::MaxQuality,
            QualityTier::UltraQuality => NgxPerfQuality::UltraQuality,
        }
    }

    /// Accepts the names used in settings files and on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "ultraperformance" => Some(QualityTier::UltraPerformance),
            "performance" | "maxperf" => Some(QualityTier::Performance),
            "balanced" => Some(QualityTier::Balanced),
            "quality" | "maxquality" => Some(QualityTier::Quality),
            "ultraquality" => Some(QualityTier::UltraQuality),
            _ => None,
        }
    }
}

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<(u32, u32)> for Extent {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Key of the cached feature: any change forces a recreate. Exact equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameParameters {
    pub source_size: Extent,
    pub destination_size: Extent,
    pub quality: QualityTier,
    pub use_sharpening: bool,
}

/// Render resolutions and sharpness suggested by the SDK for a display size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendedSettings {
    pub optimal_resolution: Extent,
    pub min_resolution: Extent,
    pub max_resolution: Extent,
    pub sharpness: f32,
}

impl RecommendedSettings {
    /// Returned whenever the SDK cannot answer: render at display size, no sharpening.
    pub fn identity(display: Extent) -> Self {
        Self {
            optimal_resolution: display,
            min_resolution: display,
            max_resolution: display,
            sharpness: 0.0,
        }
    }

    /// Fraction of the display resolution to render at so that both axes fit
    /// within the optimal resolution.
    pub fn rendering_percentage(&self, display: Extent) -> f32 {
        if display.is_empty() {
            return 1.0;
        }
        let x = self.optimal_resolution.width as f32 / display.width as f32;
        let y = self.optimal_resolution.height as f32 / display.height as f32;
        x.min(y)
    }
}

/// How the application identifies itself to NGX.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    /// NVIDIA-issued application id; 0 means unset.
    pub app_id: u64,
    /// Project id for project-scoped init; empty means unset.
    pub project_id: String,
    pub engine_version: String,
    /// Directory NGX writes its logs and caches to.
    pub data_path: PathBuf,
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self {
            app_id: 0,
            project_id: String::new(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            data_path: std::env::temp_dir().join("ngx_upscaler"),
        }
    }
}

impl AppIdentity {
    /// App id passed to plain init; 0 becomes [`DEFAULT_APP_ID`].
    pub fn effective_app_id(&self) -> u64 {
        if self.app_id == 0 {
            DEFAULT_APP_ID
        } else {
            self.app_id
        }
    }

    pub fn uses_project_id(&self) -> bool {
        !self.project_id.is_empty()
    }
}
