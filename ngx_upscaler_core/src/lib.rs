//! NGX upscaler core: capability probing, feature caching and per-frame
//! evaluation of NVIDIA's super sampling feature on D3D11, D3D12 and Vulkan.
//!
//! The SDK itself is only linked with the `ngx` feature. Without it every
//! probe reports [`SupportStatus::NotSupported`] and recommended settings
//! fall back to the display resolution.

pub mod error;
pub mod gpu;
pub mod ngx;
pub mod platform;
pub mod prober;
pub mod upscale;
pub mod upscaler;

#[cfg(test)]
mod mock;

pub use error::{NgxStatus, UpscalerError};
pub use gpu::detector::{GpuDetector, GpuInfo, GpuVendor};
pub use gpu::{
    CommandContext, FrameResources, GpuError, GpuTexture, GraphicsDevice, NativeDevice, RenderTargetPool,
    RendererKind, ResourceState, TextureDescription, TextureFlags, VulkanImageView,
};
pub use platform::OsCheck;
pub use upscale::{AppIdentity, Extent, FrameParameters, QualityTier, RecommendedSettings, SupportStatus};
pub use upscaler::{UpscaleRequest, Upscaler, UpscalerPhase};
