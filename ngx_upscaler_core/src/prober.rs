//! Capability probe: decides once whether the upscaler can run on this
//! device and, if so, leaves an initialized backend behind.

use log::{debug, error, info, warn};

use crate::error::{NgxStatus, UpscalerError};
use crate::gpu::detector::NVIDIA_VENDOR_ID;
use crate::gpu::{CommandContext, GpuError, GraphicsDevice, RendererKind};
use crate::ngx::{BackendFactory, FeatureCreateParams, FeatureHandle, NgxBackend, ParameterHandle};
use crate::platform::OsCheck;
use crate::upscale::{AppIdentity, FrameParameters, SupportStatus};

/// An initialized SDK backend plus the parameter objects it owns.
pub struct BackendContext {
    backend: Box<dyn NgxBackend>,
    capabilities: ParameterHandle,
    /// Allocated on first feature creation, reused afterwards.
    eval_params: Option<ParameterHandle>,
}

impl BackendContext {
    pub fn kind(&self) -> RendererKind {
        self.backend.kind()
    }

    pub(crate) fn backend_mut(&mut self) -> &mut dyn NgxBackend {
        self.backend.as_mut()
    }

    pub(crate) fn capabilities(&self) -> ParameterHandle {
        self.capabilities
    }

    pub(crate) fn eval_params(&self) -> Option<ParameterHandle> {
        self.eval_params
    }

    pub(crate) fn create_feature(
        &mut self,
        cmd: &mut dyn CommandContext,
        params: &FrameParameters,
    ) -> Result<FeatureHandle, UpscalerError> {
        let eval_params = match self.eval_params {
            Some(handle) => handle,
            None => {
                let handle = self.backend.allocate_parameters().map_err(UpscalerError::FeatureCreateFailed)?;
                self.eval_params = Some(handle);
                handle
            }
        };
        let create = FeatureCreateParams::from(params);
        debug!(
            "[NGX] creating feature {} -> {} ({:?}, flags {:?})",
            params.source_size, params.destination_size, params.quality, create.flags
        );
        self.backend
            .create_feature(cmd, eval_params, &create)
            .map_err(UpscalerError::FeatureCreateFailed)
    }

    pub(crate) fn release_feature(&mut self, feature: FeatureHandle) {
        if let Err(status) = self.backend.release_feature(feature) {
            error!("[NGX] failed to release feature: {}", status);
        }
    }

    /// Releases the feature, both parameter objects and finally the SDK itself.
    pub(crate) fn teardown(mut self, feature: Option<FeatureHandle>) {
        if let Some(feature) = feature {
            self.release_feature(feature);
        }
        if let Some(params) = self.eval_params.take() {
            if let Err(status) = self.backend.destroy_parameters(params) {
                error!("[NGX] failed to destroy evaluation parameters: {}", status);
            }
        }
        release_backend(self.backend.as_mut(), Some(self.capabilities));
    }
}

/// Everything the probe learned.
pub struct ProbeOutcome {
    pub status: SupportStatus,
    pub context: Option<BackendContext>,
    pub error: Option<UpscalerError>,
}

impl ProbeOutcome {
    fn unsupported(status: SupportStatus, error: UpscalerError) -> Self {
        Self { status, context: None, error: Some(error) }
    }
}

fn release_backend(backend: &mut dyn NgxBackend, capabilities: Option<ParameterHandle>) {
    if let Some(caps) = capabilities {
        if let Err(status) = backend.destroy_parameters(caps) {
            error!("[NGX] failed to destroy capability parameters: {}", status);
        }
    }
    if let Err(status) = backend.shutdown() {
        error!("[NGX] shutdown failed: {}", status);
    }
}

/// Runs the full capability check against `device`.
pub fn probe(
    device: &dyn GraphicsDevice,
    identity: &AppIdentity,
    os_check: OsCheck,
    factory: &BackendFactory,
) -> ProbeOutcome {
    if !device.has_compute() || device.vendor_id() != NVIDIA_VENDOR_ID {
        info!(
            "[NGX] adapter '{}' (vendor {:#06x}) cannot run DLSS",
            device.adapter_name(),
            device.vendor_id()
        );
        return ProbeOutcome::unsupported(SupportStatus::IncompatibleHardware, UpscalerError::HardwareIncompatible);
    }

    if !os_check.is_supported() {
        warn!("[NGX] DLSS requires Windows 10 or newer");
        return ProbeOutcome::unsupported(SupportStatus::OperatingSystemOutOfDate, UpscalerError::OsOutOfDate);
    }

    let kind = device.renderer();
    if !matches!(kind, RendererKind::D3D11 | RendererKind::D3D12 | RendererKind::Vulkan) {
        warn!("[NGX] renderer {:?} is not supported", kind);
        let error = UpscalerError::Gpu(GpuError::UnsupportedBackend(kind));
        return ProbeOutcome::unsupported(SupportStatus::NotSupported, error);
    }

    let native = match device.native_device() {
        Ok(native) => native,
        Err(e) => {
            error!("[NGX] no native device handle for {:?}: {}", kind, e);
            return ProbeOutcome::unsupported(SupportStatus::NotSupported, e.into());
        }
    };

    let Some(mut backend) = factory(kind) else {
        warn!("[NGX] no SDK adapter available for {:?}", kind);
        return ProbeOutcome::unsupported(
            SupportStatus::NotSupported,
            UpscalerError::BackendInitFailed(NgxStatus::NOT_IMPLEMENTED),
        );
    };

    if identity.uses_project_id() {
        debug!("[NGX] init with project id '{}' ({:?})", identity.project_id, kind);
    } else {
        debug!("[NGX] init with app id {} ({:?})", identity.effective_app_id(), kind);
    }
    if let Err(status) = backend.init(identity, &native) {
        return match status {
            NgxStatus::OUT_OF_DATE => {
                warn!("[NGX] driver is out of date: {}", status);
                ProbeOutcome::unsupported(SupportStatus::DriverOutOfDate, UpscalerError::DriverOutOfDate)
            }
            NgxStatus::FEATURE_NOT_SUPPORTED | NgxStatus::PLATFORM_ERROR => {
                warn!("[NGX] hardware or platform not supported: {}", status);
                ProbeOutcome::unsupported(SupportStatus::IncompatibleHardware, UpscalerError::HardwareIncompatible)
            }
            _ => {
                error!("[NGX] failed to initialize: {}", status);
                ProbeOutcome::unsupported(SupportStatus::NotSupported, UpscalerError::BackendInitFailed(status))
            }
        };
    }

    let capabilities = match backend.capability_parameters() {
        Ok(caps) => caps,
        Err(status) => {
            error!("[NGX] failed to get capability parameters: {}", status);
            release_backend(backend.as_mut(), None);
            return ProbeOutcome::unsupported(SupportStatus::NotSupported, UpscalerError::CapabilityQueryFailed(status));
        }
    };

    let caps = backend.supersampling_caps(capabilities);
    if !caps.available {
        release_backend(backend.as_mut(), Some(capabilities));
        return if caps.needs_updated_driver {
            warn!("[NGX] DLSS needs an updated driver");
            ProbeOutcome::unsupported(SupportStatus::DriverOutOfDate, UpscalerError::DriverOutOfDate)
        } else {
            warn!("[NGX] DLSS is not available on this system");
            ProbeOutcome::unsupported(
                SupportStatus::NotSupported,
                UpscalerError::CapabilityQueryFailed(NgxStatus::FEATURE_NOT_SUPPORTED),
            )
        };
    }

    info!("[NGX] DLSS is supported on '{}' via {:?}", device.adapter_name(), kind);
    ProbeOutcome {
        status: SupportStatus::Supported,
        context: Some(BackendContext { backend, capabilities, eval_params: None }),
        error: None,
    }
}
