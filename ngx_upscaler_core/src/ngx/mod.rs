//! Backend seam between the upscaler state machine and the NGX SDK.
//!
//! Each graphics API gets one [`NgxBackend`] implementation. The adapters
//! that actually call into the SDK are only compiled with the `ngx` feature;
//! everything they share (parameter encoding, resource marshaling) lives in
//! [`params`] and [`resources`] and is always available.

pub mod params;
pub mod resources;

#[cfg(feature = "ngx")]
mod d3d11;
#[cfg(feature = "ngx")]
mod d3d12;
#[cfg(feature = "ngx")]
mod vulkan;

use bitflags::bitflags;
use ngx_sys::{NgxHandle, NgxParameter, NgxPerfQuality};

use crate::error::NgxStatus;
use crate::gpu::{CommandContext, GpuTexture, NativeDevice, RendererKind};
use crate::upscale::{AppIdentity, Extent, FrameParameters, QualityTier, RecommendedSettings};

/// NGX parameter object, either the capability set or an allocated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParameterHandle(*mut NgxParameter);

impl ParameterHandle {
    /// `None` for null, which NGX hands back on some failure paths.
    pub fn from_raw(ptr: *mut NgxParameter) -> Option<Self> {
        (!ptr.is_null()).then_some(Self(ptr))
    }

    pub fn as_ptr(self) -> *mut NgxParameter {
        self.0
    }
}

/// Live upscaling feature instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureHandle(*mut NgxHandle);

impl FeatureHandle {
    pub fn from_raw(ptr: *mut NgxHandle) -> Option<Self> {
        (!ptr.is_null()).then_some(Self(ptr))
    }

    pub fn as_ptr(self) -> *mut NgxHandle {
        self.0
    }
}

bitflags! {
    /// `NVSDK_NGX_DLSS_Feature_Flags`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DlssFeatureFlags: i32 {
        const IS_HDR = ngx_sys::DLSS_FEATURE_FLAGS_IS_HDR;
        const MV_LOW_RES = ngx_sys::DLSS_FEATURE_FLAGS_MV_LOW_RES;
        const MV_JITTERED = ngx_sys::DLSS_FEATURE_FLAGS_MV_JITTERED;
        const DEPTH_INVERTED = ngx_sys::DLSS_FEATURE_FLAGS_DEPTH_INVERTED;
        const DO_SHARPENING = ngx_sys::DLSS_FEATURE_FLAGS_DO_SHARPENING;
        const AUTO_EXPOSURE = ngx_sys::DLSS_FEATURE_FLAGS_AUTO_EXPOSURE;
    }
}

/// Everything the create-feature call encodes into the parameter object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureCreateParams {
    pub render_size: Extent,
    pub output_size: Extent,
    pub perf_quality: NgxPerfQuality,
    pub flags: DlssFeatureFlags,
    /// Multi-GPU node masks; ignored by the D3D11 path.
    pub creation_node_mask: u32,
    pub visibility_node_mask: u32,
    pub enable_output_subrects: bool,
}

impl From<&FrameParameters> for FeatureCreateParams {
    fn from(params: &FrameParameters) -> Self {
        let mut flags = DlssFeatureFlags::IS_HDR | DlssFeatureFlags::AUTO_EXPOSURE;
        if params.use_sharpening {
            flags |= DlssFeatureFlags::DO_SHARPENING;
        }
        Self {
            render_size: params.source_size,
            output_size: params.destination_size,
            perf_quality: params.quality.perf_quality(),
            flags,
            creation_node_mask: 1,
            visibility_node_mask: 1,
            enable_output_subrects: false,
        }
    }
}

/// Per-frame inputs to one evaluate call. Textures are borrowed for the call only.
pub struct EvalInputs<'a> {
    pub color: &'a dyn GpuTexture,
    pub depth: &'a dyn GpuTexture,
    pub motion_vectors: Option<&'a dyn GpuTexture>,
    pub output: &'a dyn GpuTexture,
    pub render_subrect: Extent,
    /// Pixel-space jitter of the current frame.
    pub jitter_offset: [f32; 2],
    pub sharpness: f32,
    /// Converts normalized motion vectors into pixels; equals the render subrect.
    pub motion_vector_scale: [f32; 2],
    pub reset_history: bool,
    pub frame_delta_ms: f32,
}

/// What the capability parameters say about super sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SuperSamplingCaps {
    pub available: bool,
    pub needs_updated_driver: bool,
}

/// One graphics API's view of the NGX SDK.
///
/// Adapters hold their own native device handle after `init`. Every method
/// returns the raw SDK status on failure; mapping to [`crate::UpscalerError`]
/// happens in the caller.
pub trait NgxBackend {
    fn kind(&self) -> RendererKind;

    /// Per-API SDK init. Project-scoped when `identity` carries a project id.
    fn init(&mut self, identity: &AppIdentity, device: &NativeDevice) -> Result<(), NgxStatus>;

    fn capability_parameters(&mut self) -> Result<ParameterHandle, NgxStatus>;

    fn supersampling_caps(&self, caps: ParameterHandle) -> SuperSamplingCaps;

    fn allocate_parameters(&mut self) -> Result<ParameterHandle, NgxStatus>;

    fn destroy_parameters(&mut self, params: ParameterHandle) -> Result<(), NgxStatus>;

    fn create_feature(
        &mut self,
        cmd: &mut dyn CommandContext,
        params: ParameterHandle,
        create: &FeatureCreateParams,
    ) -> Result<FeatureHandle, NgxStatus>;

    fn release_feature(&mut self, feature: FeatureHandle) -> Result<(), NgxStatus>;

    /// Resource transitions recorded before the host flushes its state.
    fn prepare_resources(&mut self, _cmd: &mut dyn CommandContext, _inputs: &EvalInputs<'_>) {}

    fn evaluate(
        &mut self,
        cmd: &mut dyn CommandContext,
        feature: FeatureHandle,
        params: ParameterHandle,
        inputs: &EvalInputs<'_>,
    ) -> Result<(), NgxStatus>;

    fn optimal_settings(
        &mut self,
        caps: ParameterHandle,
        display: Extent,
        quality: QualityTier,
    ) -> Result<RecommendedSettings, NgxStatus>;

    /// `Shutdown1` on the device passed to `init`.
    fn shutdown(&mut self) -> Result<(), NgxStatus>;
}

/// Picks the adapter for a renderer.
pub type BackendFactory = Box<dyn Fn(RendererKind) -> Option<Box<dyn NgxBackend>>>;

/// SDK-backed adapters. Without the `ngx` feature there are none.
pub fn sdk_backend(kind: RendererKind) -> Option<Box<dyn NgxBackend>> {
    #[cfg(feature = "ngx")]
    {
        match kind {
            RendererKind::D3D11 => Some(Box::new(d3d11::D3D11Backend::default())),
            RendererKind::D3D12 => Some(Box::new(d3d12::D3D12Backend::default())),
            RendererKind::Vulkan => Some(Box::new(vulkan::VulkanBackend::default())),
            _ => None,
        }
    }
    #[cfg(not(feature = "ngx"))]
    {
        log::debug!("[NGX] built without the `ngx` feature; no adapter for {:?}", kind);
        None
    }
}

pub fn sdk_backend_factory() -> BackendFactory {
    Box::new(sdk_backend)
}
