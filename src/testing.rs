//! In-memory host and SDK doubles for the plugin shell tests.

use std::cell::RefCell;
use std::ffi::c_void;
use std::rc::Rc;

use ngx_upscaler_core::ngx::{
    BackendFactory, EvalInputs, FeatureCreateParams, FeatureHandle, NgxBackend, ParameterHandle, SuperSamplingCaps,
};
use ngx_upscaler_core::{
    AppIdentity, CommandContext, Extent, FrameResources, GpuError, GpuTexture, GraphicsDevice, NativeDevice,
    NgxStatus, OsCheck, QualityTier, RecommendedSettings, RenderTargetPool, RendererKind, ResourceState,
    TextureDescription, TextureFlags, Upscaler,
};

use crate::postfx::{AntiAliasingMode, RenderSetup, RenderTask, UpscaleLocation};

pub struct FakeTexture {
    pub id: usize,
    pub desc: TextureDescription,
}

impl FakeTexture {
    pub fn new(id: usize, width: u32, height: u32, flags: TextureFlags) -> Self {
        Self { id, desc: TextureDescription { size: Extent::new(width, height), format: 10, mip_levels: 1, flags } }
    }
}

impl GpuTexture for FakeTexture {
    fn description(&self) -> TextureDescription {
        self.desc
    }

    fn native_ptr(&self) -> *mut c_void {
        self.id as *mut c_void
    }
}

#[derive(Default)]
pub struct FakeContext {
    pub copies: usize,
}

impl CommandContext for FakeContext {
    fn native_ptr(&self) -> *mut c_void {
        0xC0 as *mut c_void
    }

    fn set_resource_state(&mut self, _texture: &dyn GpuTexture, _state: ResourceState) {}

    fn flush_state(&mut self) {}

    fn force_rebind_descriptors(&mut self) {}

    fn copy_texture(&mut self, _dst: &dyn GpuTexture, _src: &dyn GpuTexture) {
        self.copies += 1;
    }

    fn clear_state(&mut self) {}
}

#[derive(Default)]
pub struct FakePool {
    pub outstanding: usize,
}

impl RenderTargetPool for FakePool {
    fn acquire(&mut self, desc: &TextureDescription) -> Result<Box<dyn GpuTexture>, GpuError> {
        self.outstanding += 1;
        Ok(Box::new(FakeTexture { id: 100, desc: *desc }))
    }

    fn release(&mut self, _texture: Box<dyn GpuTexture>) {
        self.outstanding -= 1;
    }
}

pub struct FakeFrame {
    pub depth: FakeTexture,
    pub jitter: [f32; 2],
    pub screen: Extent,
}

impl FakeFrame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            depth: FakeTexture::new(3, width, height, TextureFlags::DEPTH_STENCIL),
            jitter: [0.0, 0.0],
            screen: Extent::new(width, height),
        }
    }
}

impl FrameResources for FakeFrame {
    fn depth_buffer(&self) -> &dyn GpuTexture {
        &self.depth
    }

    fn motion_vectors(&self) -> Option<&dyn GpuTexture> {
        None
    }

    fn temporal_jitter(&self) -> [f32; 2] {
        self.jitter
    }

    fn screen_size(&self) -> Extent {
        self.screen
    }

    fn is_camera_cut(&self) -> bool {
        false
    }

    fn unscaled_delta_seconds(&self) -> f32 {
        0.016
    }
}

pub struct FakeDevice {
    pub vendor_id: u32,
}

impl FakeDevice {
    pub fn nvidia() -> Self {
        Self { vendor_id: 0x10DE }
    }
}

impl GraphicsDevice for FakeDevice {
    fn renderer(&self) -> RendererKind {
        RendererKind::D3D11
    }

    fn vendor_id(&self) -> u32 {
        self.vendor_id
    }

    fn has_compute(&self) -> bool {
        true
    }

    fn native_device(&self) -> Result<NativeDevice, GpuError> {
        Ok(NativeDevice::D3D11 { device: 0xD0 as *mut c_void })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalSnapshot {
    pub jitter_offset: [f32; 2],
    pub sharpness: f32,
}

/// What the fake SDK saw, plus its scripted optimal settings.
#[derive(Default)]
pub struct FakeState {
    pub inits: usize,
    pub shutdowns: usize,
    pub created: Vec<FeatureCreateParams>,
    pub evaluations: Vec<EvalSnapshot>,
    pub optimal: Option<RecommendedSettings>,
    pub queried: Vec<(Extent, QualityTier)>,
}

pub type Shared = Rc<RefCell<FakeState>>;

struct FakeBackend {
    shared: Shared,
}

fn handle(id: usize) -> Result<ParameterHandle, NgxStatus> {
    ParameterHandle::from_raw(id as *mut _).ok_or(NgxStatus::FAIL)
}

impl NgxBackend for FakeBackend {
    fn kind(&self) -> RendererKind {
        RendererKind::D3D11
    }

    fn init(&mut self, _identity: &AppIdentity, _device: &NativeDevice) -> Result<(), NgxStatus> {
        self.shared.borrow_mut().inits += 1;
        Ok(())
    }

    fn capability_parameters(&mut self) -> Result<ParameterHandle, NgxStatus> {
        handle(0xCA95)
    }

    fn supersampling_caps(&self, _caps: ParameterHandle) -> SuperSamplingCaps {
        SuperSamplingCaps { available: true, needs_updated_driver: false }
    }

    fn allocate_parameters(&mut self) -> Result<ParameterHandle, NgxStatus> {
        handle(0xE7A1)
    }

    fn destroy_parameters(&mut self, _params: ParameterHandle) -> Result<(), NgxStatus> {
        Ok(())
    }

    fn create_feature(
        &mut self,
        _cmd: &mut dyn CommandContext,
        _params: ParameterHandle,
        create: &FeatureCreateParams,
    ) -> Result<FeatureHandle, NgxStatus> {
        let mut shared = self.shared.borrow_mut();
        shared.created.push(*create);
        FeatureHandle::from_raw((0xF000 + shared.created.len()) as *mut _).ok_or(NgxStatus::FAIL)
    }

    fn release_feature(&mut self, _feature: FeatureHandle) -> Result<(), NgxStatus> {
        Ok(())
    }

    fn evaluate(
        &mut self,
        _cmd: &mut dyn CommandContext,
        _feature: FeatureHandle,
        _params: ParameterHandle,
        inputs: &EvalInputs<'_>,
    ) -> Result<(), NgxStatus> {
        self.shared
            .borrow_mut()
            .evaluations
            .push(EvalSnapshot { jitter_offset: inputs.jitter_offset, sharpness: inputs.sharpness });
        Ok(())
    }

    fn optimal_settings(
        &mut self,
        _caps: ParameterHandle,
        display: Extent,
        quality: QualityTier,
    ) -> Result<RecommendedSettings, NgxStatus> {
        let mut shared = self.shared.borrow_mut();
        shared.queried.push((display, quality));
        shared.optimal.ok_or(NgxStatus::OUT_OF_DATE)
    }

    fn shutdown(&mut self) -> Result<(), NgxStatus> {
        self.shared.borrow_mut().shutdowns += 1;
        Ok(())
    }
}

pub fn fake_factory(shared: &Shared) -> BackendFactory {
    let shared = shared.clone();
    Box::new(move |_kind| Some(Box::new(FakeBackend { shared: shared.clone() }) as Box<dyn NgxBackend>))
}

/// Upscaler whose SDK always reports support.
pub fn fake_upscaler(shared: &Shared) -> Upscaler {
    Upscaler::new(fake_factory(shared)).with_os_check(OsCheck::Assume(true))
}

pub struct FakeTask {
    pub viewport: Extent,
    pub percentage: f32,
}

impl RenderTask for FakeTask {
    fn output_viewport_size(&self) -> Extent {
        self.viewport
    }

    fn rendering_percentage(&self) -> f32 {
        self.percentage
    }

    fn set_rendering_percentage(&mut self, percentage: f32) {
        self.percentage = percentage;
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct FakeSetup {
    pub upscale_location: Option<UpscaleLocation>,
    pub temporal_jitter: Option<bool>,
    pub anti_aliasing: Option<AntiAliasingMode>,
}

impl RenderSetup for FakeSetup {
    fn set_upscale_location(&mut self, location: UpscaleLocation) {
        self.upscale_location = Some(location);
    }

    fn set_temporal_jitter(&mut self, enabled: bool) {
        self.temporal_jitter = Some(enabled);
    }

    fn set_anti_aliasing(&mut self, mode: AntiAliasingMode) {
        self.anti_aliasing = Some(mode);
    }
}
