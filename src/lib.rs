//! Engine-facing plugin for NVIDIA's NGX super sampling.
//!
//! The heavy lifting lives in [`ngx_upscaler_core`]; this crate adds settings,
//! the plugin lifecycle, the post-process effect and logging setup.

pub mod logger;
pub mod plugin;
pub mod postfx;
pub mod settings;

#[cfg(test)]
mod testing;

pub use ngx_upscaler_core as upscaler_core;
pub use plugin::UpscalerPlugin;
pub use postfx::{PostFxContext, RenderSetup, RenderTask, UpscalePostFx};
pub use settings::UpscalerSettings;
