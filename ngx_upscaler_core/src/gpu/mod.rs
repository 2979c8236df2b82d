//! Host-side GPU collaborators. The upscaler never owns any of these; the
//! engine hands them in for the duration of a single call.

pub mod detector;

use std::ffi::c_void;

use ash::vk;
use bitflags::bitflags;

use crate::upscale::Extent;

/// Graphics API the host renderer runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererKind {
    D3D11,
    D3D12,
    Vulkan,
    OpenGl,
    Metal,
    Other,
}

#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("Unsupported renderer {0:?} for native handle retrieval")]
    UnsupportedBackend(RendererKind),
    #[error("Failed to get native device handle")]
    FailedToGetNativeDeviceHandle,
    #[error("Texture has no Vulkan image view")]
    MissingVulkanView,
    #[error("Render target pool could not allocate a {0} texture")]
    RenderTargetUnavailable(Extent),
}

/// Native device handles NGX needs for its per-API init and shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeDevice {
    /// `ID3D11Device*`
    D3D11 { device: *mut c_void },
    /// `ID3D12Device*`
    D3D12 { device: *mut c_void },
    Vulkan {
        instance: vk::Instance,
        physical_device: vk::PhysicalDevice,
        device: vk::Device,
    },
}

impl NativeDevice {
    pub fn renderer(&self) -> RendererKind {
        match self {
            NativeDevice::D3D11 { .. } => RendererKind::D3D11,
            NativeDevice::D3D12 { .. } => RendererKind::D3D12,
            NativeDevice::Vulkan { .. } => RendererKind::Vulkan,
        }
    }
}

/// The rendering device the upscaler is attached to.
pub trait GraphicsDevice {
    fn renderer(&self) -> RendererKind;
    /// PCI vendor id of the adapter.
    fn vendor_id(&self) -> u32;
    fn has_compute(&self) -> bool;
    fn native_device(&self) -> Result<NativeDevice, GpuError>;
    fn adapter_name(&self) -> String {
        String::new()
    }
}

bitflags! {
    /// Usage flags of a host texture.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextureFlags: u32 {
        const SHADER_RESOURCE = 1 << 0;
        const RENDER_TARGET = 1 << 1;
        const UNORDERED_ACCESS = 1 << 2;
        const DEPTH_STENCIL = 1 << 3;
        const BACK_BUFFER = 1 << 4;
    }
}

/// Creation description of a host texture. `format` is the host's own format id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDescription {
    pub size: Extent,
    pub format: u32,
    pub mip_levels: u32,
    pub flags: TextureFlags,
}

impl TextureDescription {
    /// Same texture, writable from compute, and never a swap-chain image.
    pub fn with_unordered_access(&self) -> Self {
        let mut desc = *self;
        desc.flags.insert(TextureFlags::UNORDERED_ACCESS);
        desc.flags.remove(TextureFlags::BACK_BUFFER);
        desc
    }
}

/// Everything NGX needs to describe a Vulkan image.
#[derive(Debug, Clone, Copy)]
pub struct VulkanImageView {
    pub image: vk::Image,
    pub view: vk::ImageView,
    pub format: vk::Format,
    pub subresource_range: vk::ImageSubresourceRange,
    pub width: u32,
    pub height: u32,
}

pub trait GpuTexture {
    fn description(&self) -> TextureDescription;

    fn size(&self) -> Extent {
        self.description().size
    }

    fn width(&self) -> u32 {
        self.size().width
    }

    fn height(&self) -> u32 {
        self.size().height
    }

    fn is_unordered_access(&self) -> bool {
        self.description().flags.contains(TextureFlags::UNORDERED_ACCESS)
    }

    /// `ID3D11Resource*` / `ID3D12Resource*` / `VkImage` depending on the renderer.
    fn native_ptr(&self) -> *mut c_void;

    /// Image and view handles on Vulkan; `None` elsewhere.
    fn vulkan_view(&self) -> Option<VulkanImageView> {
        None
    }
}

bitflags! {
    /// Resource states passed through to the host's transition call.
    /// Values match `D3D12_RESOURCE_STATES`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResourceState: u32 {
        const UNORDERED_ACCESS = 0x8;
        const NON_PIXEL_SHADER_RESOURCE = 0x40;
        const PIXEL_SHADER_RESOURCE = 0x80;
    }
}

impl ResourceState {
    pub const SHADER_READ: ResourceState = ResourceState::NON_PIXEL_SHADER_RESOURCE
        .union(ResourceState::PIXEL_SHADER_RESOURCE);
}

/// Recording context for the current frame.
pub trait CommandContext {
    /// `ID3D11DeviceContext*` / `ID3D12GraphicsCommandList*` / `VkCommandBuffer`.
    fn native_ptr(&self) -> *mut c_void;
    fn set_resource_state(&mut self, texture: &dyn GpuTexture, state: ResourceState);
    /// Push any state the host has cached but not yet recorded.
    fn flush_state(&mut self);
    fn force_rebind_descriptors(&mut self);
    fn copy_texture(&mut self, dst: &dyn GpuTexture, src: &dyn GpuTexture);
    fn clear_state(&mut self);
}

/// Transient render target allocator.
pub trait RenderTargetPool {
    fn acquire(&mut self, desc: &TextureDescription) -> Result<Box<dyn GpuTexture>, GpuError>;
    fn release(&mut self, texture: Box<dyn GpuTexture>);
}

/// Per-frame inputs owned by the render task.
pub trait FrameResources {
    fn depth_buffer(&self) -> &dyn GpuTexture;
    fn motion_vectors(&self) -> Option<&dyn GpuTexture>;
    /// Projection jitter in NDC units.
    fn temporal_jitter(&self) -> [f32; 2];
    fn screen_size(&self) -> Extent;
    fn is_camera_cut(&self) -> bool;
    fn unscaled_delta_seconds(&self) -> f32;
}
