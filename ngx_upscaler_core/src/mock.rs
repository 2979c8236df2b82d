//! Recording test doubles for the host collaborators and the NGX backend.

use std::cell::RefCell;
use std::ffi::c_void;
use std::rc::Rc;

use crate::error::NgxStatus;
use crate::gpu::{
    CommandContext, FrameResources, GpuError, GpuTexture, GraphicsDevice, NativeDevice, RenderTargetPool,
    RendererKind, ResourceState, TextureDescription, TextureFlags, VulkanImageView,
};
use crate::ngx::params::tests::{MapParameters, Value};
use crate::ngx::params::{self, ParamName, ParameterMap};
use crate::ngx::{resources, EvalInputs, FeatureCreateParams, FeatureHandle, NgxBackend, ParameterHandle, SuperSamplingCaps};
use crate::upscale::{AppIdentity, Extent, QualityTier, RecommendedSettings};

pub struct MockTexture {
    pub id: usize,
    pub desc: TextureDescription,
    pub vulkan: Option<VulkanImageView>,
}

impl MockTexture {
    pub fn new(id: usize, width: u32, height: u32, flags: TextureFlags) -> Self {
        Self {
            id,
            desc: TextureDescription { size: Extent::new(width, height), format: 10, mip_levels: 1, flags },
            vulkan: None,
        }
    }
}

impl GpuTexture for MockTexture {
    fn description(&self) -> TextureDescription {
        self.desc
    }

    fn native_ptr(&self) -> *mut c_void {
        self.id as *mut c_void
    }

    fn vulkan_view(&self) -> Option<VulkanImageView> {
        self.vulkan
    }
}

fn texture_id(texture: &dyn GpuTexture) -> usize {
    texture.native_ptr() as usize
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetState(usize, u32),
    Flush,
    Rebind,
    Copy { dst: usize, src: usize },
    ClearState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Init { app_id: u64, project_id: String },
    CapabilityParameters,
    AllocateParameters,
    DestroyParameters(usize),
    CreateFeature(FeatureCreateParams),
    ReleaseFeature(usize),
    PrepareResources,
    Evaluate(EvalRecord),
    OptimalSettings(Extent, QualityTier),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvalRecord {
    pub feature: usize,
    pub params: usize,
    pub color: usize,
    pub output: usize,
    pub depth: usize,
    pub motion_vectors: Option<usize>,
    pub render_subrect: Extent,
    pub jitter_offset: [f32; 2],
    pub sharpness: f32,
    pub motion_vector_scale: [f32; 2],
    pub reset_history: bool,
    pub frame_delta_ms: f32,
}

/// Interleaved command-context and backend activity.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Cmd(Command),
    Backend(Call),
}

pub type Journal = Rc<RefCell<Vec<Event>>>;

#[derive(Default)]
pub struct RecordingContext {
    pub commands: Vec<Command>,
    pub journal: Option<Journal>,
}

impl RecordingContext {
    pub fn with_journal(journal: &Journal) -> Self {
        Self { commands: Vec::new(), journal: Some(journal.clone()) }
    }

    fn push(&mut self, command: Command) {
        if let Some(journal) = &self.journal {
            journal.borrow_mut().push(Event::Cmd(command.clone()));
        }
        self.commands.push(command);
    }
}

impl CommandContext for RecordingContext {
    fn native_ptr(&self) -> *mut c_void {
        0xC0 as *mut c_void
    }

    fn set_resource_state(&mut self, texture: &dyn GpuTexture, state: ResourceState) {
        self.push(Command::SetState(texture_id(texture), state.bits()));
    }

    fn flush_state(&mut self) {
        self.push(Command::Flush);
    }

    fn force_rebind_descriptors(&mut self) {
        self.push(Command::Rebind);
    }

    fn copy_texture(&mut self, dst: &dyn GpuTexture, src: &dyn GpuTexture) {
        self.push(Command::Copy { dst: texture_id(dst), src: texture_id(src) });
    }

    fn clear_state(&mut self) {
        self.push(Command::ClearState);
    }
}

/// Hands out textures with ids from 100 upwards.
#[derive(Default)]
pub struct MockPool {
    pub next_id: usize,
    pub acquired: Vec<(usize, TextureDescription)>,
    pub released: Vec<usize>,
    pub fail: bool,
}

impl RenderTargetPool for MockPool {
    fn acquire(&mut self, desc: &TextureDescription) -> Result<Box<dyn GpuTexture>, GpuError> {
        if self.fail {
            return Err(GpuError::RenderTargetUnavailable(desc.size));
        }
        let id = 100 + self.next_id;
        self.next_id += 1;
        self.acquired.push((id, *desc));
        Ok(Box::new(MockTexture { id, desc: *desc, vulkan: None }))
    }

    fn release(&mut self, texture: Box<dyn GpuTexture>) {
        self.released.push(texture_id(texture.as_ref()));
    }
}

pub struct MockFrame {
    pub depth: MockTexture,
    pub motion_vectors: Option<MockTexture>,
    pub jitter: [f32; 2],
    pub screen: Extent,
    pub camera_cut: bool,
    pub delta_seconds: f32,
}

impl MockFrame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            depth: MockTexture::new(2, width, height, TextureFlags::DEPTH_STENCIL),
            motion_vectors: Some(MockTexture::new(3, width, height, TextureFlags::SHADER_RESOURCE)),
            jitter: [0.0, 0.0],
            screen: Extent::new(width, height),
            camera_cut: false,
            delta_seconds: 0.016,
        }
    }
}

impl FrameResources for MockFrame {
    fn depth_buffer(&self) -> &dyn GpuTexture {
        &self.depth
    }

    fn motion_vectors(&self) -> Option<&dyn GpuTexture> {
        self.motion_vectors.as_ref().map(|t| t as &dyn GpuTexture)
    }

    fn temporal_jitter(&self) -> [f32; 2] {
        self.jitter
    }

    fn screen_size(&self) -> Extent {
        self.screen
    }

    fn is_camera_cut(&self) -> bool {
        self.camera_cut
    }

    fn unscaled_delta_seconds(&self) -> f32 {
        self.delta_seconds
    }
}

pub struct MockDevice {
    pub renderer: RendererKind,
    pub vendor_id: u32,
    pub compute: bool,
}

impl MockDevice {
    pub fn nvidia(renderer: RendererKind) -> Self {
        Self { renderer, vendor_id: 0x10DE, compute: true }
    }
}

impl GraphicsDevice for MockDevice {
    fn renderer(&self) -> RendererKind {
        self.renderer
    }

    fn vendor_id(&self) -> u32 {
        self.vendor_id
    }

    fn has_compute(&self) -> bool {
        self.compute
    }

    fn native_device(&self) -> Result<NativeDevice, GpuError> {
        let device = 0xD0 as *mut c_void;
        match self.renderer {
            RendererKind::D3D11 => Ok(NativeDevice::D3D11 { device }),
            RendererKind::D3D12 => Ok(NativeDevice::D3D12 { device }),
            RendererKind::Vulkan => Ok(NativeDevice::Vulkan {
                instance: ash::vk::Handle::from_raw(1),
                physical_device: ash::vk::Handle::from_raw(2),
                device: ash::vk::Handle::from_raw(3),
            }),
            other => Err(GpuError::UnsupportedBackend(other)),
        }
    }

    fn adapter_name(&self) -> String {
        "Mock RTX".to_string()
    }
}

/// Scripted answers for the recording backend.
pub struct Script {
    pub init: Result<(), NgxStatus>,
    pub capability_parameters: Result<usize, NgxStatus>,
    pub caps: SuperSamplingCaps,
    pub allocate: Result<usize, NgxStatus>,
    pub create: Result<(), NgxStatus>,
    pub evaluate: Result<(), NgxStatus>,
    pub optimal: Result<RecommendedSettings, NgxStatus>,
    pub shutdown: Result<(), NgxStatus>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            init: Ok(()),
            capability_parameters: Ok(0xCA95),
            caps: SuperSamplingCaps { available: true, needs_updated_driver: false },
            allocate: Ok(0xE7A1),
            create: Ok(()),
            evaluate: Ok(()),
            optimal: Err(NgxStatus::NOT_IMPLEMENTED),
            shutdown: Ok(()),
        }
    }
}

/// Backend that records every call into a journal shared with the test.
/// Textures are bound through the adapters' encoding, and with `kind == D3D12`
/// the adapter's transition and rebind helpers run around the evaluate.
pub struct RecordingBackend {
    pub kind: RendererKind,
    pub journal: Journal,
    pub script: Rc<RefCell<Script>>,
    next_feature: usize,
}

impl RecordingBackend {
    pub fn new(kind: RendererKind, journal: &Journal, script: &Rc<RefCell<Script>>) -> Self {
        Self { kind, journal: journal.clone(), script: script.clone(), next_feature: 0 }
    }

    fn record(&self, call: Call) {
        self.journal.borrow_mut().push(Event::Backend(call));
    }
}

fn param_handle(id: usize) -> ParameterHandle {
    ParameterHandle::from_raw(id as *mut ngx_sys::NgxParameter).expect("test handle ids are non-zero")
}

impl NgxBackend for RecordingBackend {
    fn kind(&self) -> RendererKind {
        self.kind
    }

    fn init(&mut self, identity: &AppIdentity, _device: &NativeDevice) -> Result<(), NgxStatus> {
        self.record(Call::Init { app_id: identity.effective_app_id(), project_id: identity.project_id.clone() });
        self.script.borrow().init
    }

    fn capability_parameters(&mut self) -> Result<ParameterHandle, NgxStatus> {
        self.record(Call::CapabilityParameters);
        self.script.borrow().capability_parameters.map(param_handle)
    }

    fn supersampling_caps(&self, _caps: ParameterHandle) -> SuperSamplingCaps {
        self.script.borrow().caps
    }

    fn allocate_parameters(&mut self) -> Result<ParameterHandle, NgxStatus> {
        self.record(Call::AllocateParameters);
        self.script.borrow().allocate.map(param_handle)
    }

    fn destroy_parameters(&mut self, params: ParameterHandle) -> Result<(), NgxStatus> {
        self.record(Call::DestroyParameters(params.as_ptr() as usize));
        Ok(())
    }

    fn create_feature(
        &mut self,
        _cmd: &mut dyn CommandContext,
        _params: ParameterHandle,
        create: &FeatureCreateParams,
    ) -> Result<FeatureHandle, NgxStatus> {
        self.record(Call::CreateFeature(*create));
        self.script.borrow().create?;
        self.next_feature += 1;
        let id = 0xF000 + self.next_feature;
        Ok(FeatureHandle::from_raw(id as *mut ngx_sys::NgxHandle).expect("non-zero"))
    }

    fn release_feature(&mut self, feature: FeatureHandle) -> Result<(), NgxStatus> {
        self.record(Call::ReleaseFeature(feature.as_ptr() as usize));
        Ok(())
    }

    fn prepare_resources(&mut self, cmd: &mut dyn CommandContext, inputs: &EvalInputs<'_>) {
        self.record(Call::PrepareResources);
        if self.kind == RendererKind::D3D12 {
            resources::transition_for_evaluate(cmd, inputs);
        }
    }

    fn evaluate(
        &mut self,
        cmd: &mut dyn CommandContext,
        feature: FeatureHandle,
        params: ParameterHandle,
        inputs: &EvalInputs<'_>,
    ) -> Result<(), NgxStatus> {
        let mut map = MapParameters::default();
        params::encode_evaluate(&mut map, inputs, |map, name, ptr| map.set_ptr(name, ptr));
        let bound = |name: ParamName| match map.get(name) {
            Some(Value::Ptr(id)) if id != 0 => Some(id),
            _ => None,
        };
        self.record(Call::Evaluate(EvalRecord {
            feature: feature.as_ptr() as usize,
            params: params.as_ptr() as usize,
            color: bound(ngx_sys::PARAM_COLOR).unwrap_or(0),
            output: bound(ngx_sys::PARAM_OUTPUT).unwrap_or(0),
            depth: bound(ngx_sys::PARAM_DEPTH).unwrap_or(0),
            motion_vectors: bound(ngx_sys::PARAM_MOTION_VECTORS),
            render_subrect: inputs.render_subrect,
            jitter_offset: inputs.jitter_offset,
            sharpness: inputs.sharpness,
            motion_vector_scale: inputs.motion_vector_scale,
            reset_history: inputs.reset_history,
            frame_delta_ms: inputs.frame_delta_ms,
        }));
        let status = self.script.borrow().evaluate.err().unwrap_or(NgxStatus::SUCCESS);
        if self.kind == RendererKind::D3D12 {
            resources::evaluate_then_rebind(cmd, |_| status)
        } else {
            status.check()
        }
    }

    fn optimal_settings(
        &mut self,
        _caps: ParameterHandle,
        display: Extent,
        quality: QualityTier,
    ) -> Result<RecommendedSettings, NgxStatus> {
        self.record(Call::OptimalSettings(display, quality));
        self.script.borrow().optimal
    }

    fn shutdown(&mut self) -> Result<(), NgxStatus> {
        self.record(Call::Shutdown);
        self.script.borrow().shutdown
    }
}

/// Backend calls only, in order.
pub fn backend_calls(journal: &Journal) -> Vec<Call> {
    journal
        .borrow()
        .iter()
        .filter_map(|event| match event {
            Event::Backend(call) => Some(call.clone()),
            Event::Cmd(_) => None,
        })
        .collect()
}
