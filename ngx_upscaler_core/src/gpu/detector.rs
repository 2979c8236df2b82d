use anyhow::Result;
use log::{debug, info};
use wgpu::{Adapter, AdapterInfo, Backends, DeviceType, Instance};

use super::RendererKind;

/// PCI vendor id of NVIDIA adapters; NGX runs on nothing else.
pub const NVIDIA_VENDOR_ID: u32 = 0x10DE;

/// GPU vendor identification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuVendor {
    Nvidia,
    Amd,
    Intel,
    Other,
    Unknown,
}

impl GpuVendor {
    pub fn from_vendor_id(id: u32) -> Self {
        match id {
            NVIDIA_VENDOR_ID => GpuVendor::Nvidia,
            0x1002 => GpuVendor::Amd,
            0x8086 => GpuVendor::Intel,
            0 => GpuVendor::Unknown,
            _ => GpuVendor::Other,
        }
    }
}

/// Renderer kind a wgpu backend corresponds to. wgpu has no D3D11 path.
pub fn renderer_for_backend(backend: wgpu::Backend) -> RendererKind {
    match backend {
        wgpu::Backend::Dx12 => RendererKind::D3D12,
        wgpu::Backend::Vulkan => RendererKind::Vulkan,
        wgpu::Backend::Gl => RendererKind::OpenGl,
        wgpu::Backend::Metal => RendererKind::Metal,
        _ => RendererKind::Other,
    }
}

/// GPU information
#[derive(Debug, Clone)]
pub struct GpuInfo {
    pub name: String,
    pub vendor: GpuVendor,
    pub device_type: DeviceType,
    pub backend: wgpu::Backend,
    pub vendor_id: u32,
    pub device_id: u32,
    pub driver_info: String,
    pub is_discrete: bool,
}

impl From<AdapterInfo> for GpuInfo {
    fn from(info: AdapterInfo) -> Self {
        let is_discrete = matches!(info.device_type, DeviceType::DiscreteGpu);
        Self {
            vendor: GpuVendor::from_vendor_id(info.vendor),
            name: info.name,
            device_type: info.device_type,
            backend: info.backend,
            vendor_id: info.vendor,
            device_id: info.device,
            driver_info: info.driver_info,
            is_discrete,
        }
    }
}

impl GpuInfo {
    pub fn renderer(&self) -> RendererKind {
        renderer_for_backend(self.backend)
    }

    /// Vendor and API pass the prober's static checks. Driver and SDK
    /// availability are only known after NGX init.
    pub fn is_ngx_candidate(&self) -> bool {
        self.vendor == GpuVendor::Nvidia
            && matches!(self.renderer(), RendererKind::D3D12 | RendererKind::Vulkan)
            && self.device_type != DeviceType::Cpu
    }

    pub fn description(&self) -> String {
        let gpu_type = match self.device_type {
            DeviceType::DiscreteGpu => "Discrete",
            DeviceType::IntegratedGpu => "Integrated",
            DeviceType::Cpu => "CPU",
            DeviceType::VirtualGpu => "Virtual",
            DeviceType::Other => "Other",
        };
        let vendor = match self.vendor {
            GpuVendor::Nvidia => "NVIDIA",
            GpuVendor::Amd => "AMD",
            GpuVendor::Intel => "Intel",
            GpuVendor::Other => "Other",
            GpuVendor::Unknown => "Unknown",
        };
        format!("{} {} GPU: {} ({:?})", gpu_type, vendor, self.name, self.backend)
    }
}

/// Enumerates adapters through wgpu to find NGX-capable hardware.
pub struct GpuDetector {
    instance: Instance,
    primary_gpu: Option<GpuInfo>,
    all_gpus: Vec<GpuInfo>,
}

impl Default for GpuDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl GpuDetector {
    pub fn new() -> Self {
        let instance = Instance::new(wgpu::InstanceDescriptor {
            backends: Backends::PRIMARY,
            ..Default::default()
        });

        Self {
            instance,
            primary_gpu: None,
            all_gpus: Vec::new(),
        }
    }

    /// Detect all available GPUs in the system
    pub fn detect_gpus(&mut self) -> Result<()> {
        let adapters = pollster::block_on(self.enumerate_adapters())?;

        self.all_gpus = adapters.iter().map(|adapter| GpuInfo::from(adapter.get_info())).collect();
        for gpu in &self.all_gpus {
            debug!("[GpuDetector] found {}", gpu.description());
        }

        self.primary_gpu = determine_primary_gpu(&self.all_gpus);
        if let Some(gpu) = &self.primary_gpu {
            info!("[GpuDetector] primary adapter: {}", gpu.description());
        }

        Ok(())
    }

    async fn enumerate_adapters(&self) -> Result<Vec<Adapter>> {
        Ok(self.instance.enumerate_adapters(Backends::PRIMARY))
    }

    pub fn primary_gpu(&self) -> Option<&GpuInfo> {
        self.primary_gpu.as_ref()
    }

    pub fn all_gpus(&self) -> &[GpuInfo] {
        &self.all_gpus
    }

    pub fn ngx_candidates(&self) -> impl Iterator<Item = &GpuInfo> {
        self.all_gpus.iter().filter(|gpu| gpu.is_ngx_candidate())
    }
}

/// Prefers discrete GPUs, NVIDIA first, then anything.
fn determine_primary_gpu(gpus: &[GpuInfo]) -> Option<GpuInfo> {
    let discrete: Vec<_> = gpus.iter().filter(|gpu| gpu.is_discrete).collect();

    for vendor in [GpuVendor::Nvidia, GpuVendor::Amd, GpuVendor::Intel] {
        if let Some(gpu) = discrete.iter().find(|g| g.vendor == vendor) {
            return Some((*gpu).clone());
        }
    }

    discrete.first().map(|gpu| (*gpu).clone()).or_else(|| gpus.first().cloned())
}
