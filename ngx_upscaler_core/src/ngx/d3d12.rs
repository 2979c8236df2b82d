use std::ffi::c_void;

use log::{debug, info};
use ngx_sys as sys;

use super::params::{self, RawParameters};
use super::resources::{self, to_wide};
use super::{EvalInputs, FeatureCreateParams, FeatureHandle, NgxBackend, ParameterHandle, SuperSamplingCaps};
use crate::error::NgxStatus;
use crate::gpu::{CommandContext, NativeDevice, RendererKind};
use crate::upscale::{AppIdentity, Extent, QualityTier, RecommendedSettings};

/// NGX on an `ID3D12Device`, recording into the host's graphics command list.
pub struct D3D12Backend {
    device: *mut c_void,
}

impl Default for D3D12Backend {
    fn default() -> Self {
        Self { device: std::ptr::null_mut() }
    }
}

impl NgxBackend for D3D12Backend {
    fn kind(&self) -> RendererKind {
        RendererKind::D3D12
    }

    fn init(&mut self, identity: &AppIdentity, device: &NativeDevice) -> Result<(), NgxStatus> {
        let device = match device {
            NativeDevice::D3D12 { device } => *device,
            _ => return Err(NgxStatus::INVALID_PARAMETER),
        };
        let data_path = to_wide(&identity.data_path);

        let status = if identity.uses_project_id() {
            let (project, version) = params::project_strings(identity)?;
            info!("[NGX] D3D12 init with project id {}", identity.project_id);
            // SAFETY: all strings are NUL terminated and live across the call.
            unsafe {
                sys::NVSDK_NGX_D3D12_Init_with_ProjectID(
                    project.as_ptr(),
                    sys::NGX_ENGINE_TYPE_CUSTOM,
                    version.as_ptr(),
                    data_path.as_ptr(),
                    device,
                    std::ptr::null(),
                    sys::NGX_VERSION_API,
                )
            }
        } else {
            info!("[NGX] D3D12 init with app id {}", identity.effective_app_id());
            unsafe {
                sys::NVSDK_NGX_D3D12_Init(
                    identity.effective_app_id(),
                    data_path.as_ptr(),
                    device,
                    std::ptr::null(),
                    sys::NGX_VERSION_API,
                )
            }
        };
        NgxStatus(status).check()?;
        self.device = device;
        Ok(())
    }

    fn capability_parameters(&mut self) -> Result<ParameterHandle, NgxStatus> {
        params::fetch_parameters(sys::NVSDK_NGX_D3D12_GetCapabilityParameters)
    }

    fn supersampling_caps(&self, caps: ParameterHandle) -> SuperSamplingCaps {
        params::read_supersampling_caps(&RawParameters(caps))
    }

    fn allocate_parameters(&mut self) -> Result<ParameterHandle, NgxStatus> {
        params::fetch_parameters(sys::NVSDK_NGX_D3D12_AllocateParameters)
    }

    fn destroy_parameters(&mut self, params: ParameterHandle) -> Result<(), NgxStatus> {
        NgxStatus(unsafe { sys::NVSDK_NGX_D3D12_DestroyParameters(params.as_ptr()) }).check()
    }

    fn create_feature(
        &mut self,
        cmd: &mut dyn CommandContext,
        params: ParameterHandle,
        create: &FeatureCreateParams,
    ) -> Result<FeatureHandle, NgxStatus> {
        let mut map = RawParameters(params);
        params::write_create_params(&mut map, create, true);

        let mut handle = std::ptr::null_mut();
        // SAFETY: the context pointer is an open graphics command list.
        let status = unsafe {
            sys::NVSDK_NGX_D3D12_CreateFeature(cmd.native_ptr(), sys::NGX_FEATURE_SUPER_SAMPLING, params.as_ptr(), &mut handle)
        };
        NgxStatus(status).check()?;
        FeatureHandle::from_raw(handle).ok_or(NgxStatus::FAIL)
    }

    fn release_feature(&mut self, feature: FeatureHandle) -> Result<(), NgxStatus> {
        NgxStatus(unsafe { sys::NVSDK_NGX_D3D12_ReleaseFeature(feature.as_ptr()) }).check()
    }

    fn prepare_resources(&mut self, cmd: &mut dyn CommandContext, inputs: &EvalInputs<'_>) {
        resources::transition_for_evaluate(cmd, inputs);
    }

    fn evaluate(
        &mut self,
        cmd: &mut dyn CommandContext,
        feature: FeatureHandle,
        params: ParameterHandle,
        inputs: &EvalInputs<'_>,
    ) -> Result<(), NgxStatus> {
        params::encode_evaluate(&mut RawParameters(params), inputs, RawParameters::set_d3d12_resource);
        resources::evaluate_then_rebind(cmd, |cmd| {
            // SAFETY: the context pointer is an open graphics command list.
            NgxStatus(unsafe {
                sys::NVSDK_NGX_D3D12_EvaluateFeature_C(cmd.native_ptr(), feature.as_ptr(), params.as_ptr(), None)
            })
        })
    }

    fn optimal_settings(
        &mut self,
        caps: ParameterHandle,
        display: Extent,
        quality: QualityTier,
    ) -> Result<RecommendedSettings, NgxStatus> {
        params::query_optimal_settings(&mut RawParameters(caps), display, quality)
    }

    fn shutdown(&mut self) -> Result<(), NgxStatus> {
        if self.device.is_null() {
            return Err(NgxStatus::NOT_INITIALIZED);
        }
        debug!("[NGX] D3D12 shutdown");
        let status = unsafe { sys::NVSDK_NGX_D3D12_Shutdown1(self.device) };
        self.device = std::ptr::null_mut();
        NgxStatus(status).check()
    }
}
