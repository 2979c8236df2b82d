use std::ffi::c_void;

use ash::vk::{self, Handle};
use log::{debug, error, info};
use ngx_sys as sys;

use super::params::{self, RawParameters};
use super::resources::{to_wide, VulkanEvalResources};
use super::{EvalInputs, FeatureCreateParams, FeatureHandle, NgxBackend, ParameterHandle, SuperSamplingCaps};
use crate::error::NgxStatus;
use crate::gpu::{CommandContext, NativeDevice, RendererKind};
use crate::upscale::{AppIdentity, Extent, QualityTier, RecommendedSettings};

fn raw<H: Handle>(handle: H) -> *mut c_void {
    handle.as_raw() as usize as *mut c_void
}

/// NGX on a Vulkan device. The command context is a recording `VkCommandBuffer`.
#[derive(Default)]
pub struct VulkanBackend {
    device: Option<vk::Device>,
}

impl NgxBackend for VulkanBackend {
    fn kind(&self) -> RendererKind {
        RendererKind::Vulkan
    }

    fn init(&mut self, identity: &AppIdentity, device: &NativeDevice) -> Result<(), NgxStatus> {
        let (instance, physical_device, device) = match device {
            NativeDevice::Vulkan { instance, physical_device, device } => (*instance, *physical_device, *device),
            _ => return Err(NgxStatus::INVALID_PARAMETER),
        };
        let data_path = to_wide(&identity.data_path);

        let status = if identity.uses_project_id() {
            let (project, version) = params::project_strings(identity)?;
            info!("[NGX] Vulkan init with project id {}", identity.project_id);
            // SAFETY: all strings are NUL terminated and live across the call.
            unsafe {
                sys::NVSDK_NGX_VULKAN_Init_with_ProjectID(
                    project.as_ptr(),
                    sys::NGX_ENGINE_TYPE_CUSTOM,
                    version.as_ptr(),
                    data_path.as_ptr(),
                    raw(instance),
                    raw(physical_device),
                    raw(device),
                    std::ptr::null(),
                    sys::NGX_VERSION_API,
                )
            }
        } else {
            info!("[NGX] Vulkan init with app id {}", identity.effective_app_id());
            unsafe {
                sys::NVSDK_NGX_VULKAN_Init(
                    identity.effective_app_id(),
                    data_path.as_ptr(),
                    raw(instance),
                    raw(physical_device),
                    raw(device),
                    std::ptr::null(),
                    sys::NGX_VERSION_API,
                )
            }
        };
        NgxStatus(status).check()?;
        self.device = Some(device);
        Ok(())
    }

    fn capability_parameters(&mut self) -> Result<ParameterHandle, NgxStatus> {
        params::fetch_parameters(sys::NVSDK_NGX_VULKAN_GetCapabilityParameters)
    }

    fn supersampling_caps(&self, caps: ParameterHandle) -> SuperSamplingCaps {
        params::read_supersampling_caps(&RawParameters(caps))
    }

    fn allocate_parameters(&mut self) -> Result<ParameterHandle, NgxStatus> {
        params::fetch_parameters(sys::NVSDK_NGX_VULKAN_AllocateParameters)
    }

    fn destroy_parameters(&mut self, params: ParameterHandle) -> Result<(), NgxStatus> {
        NgxStatus(unsafe { sys::NVSDK_NGX_VULKAN_DestroyParameters(params.as_ptr()) }).check()
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
        // SAFETY: the context pointer is a command buffer in the recording state.
        let status = unsafe {
            sys::NVSDK_NGX_VULKAN_CreateFeature(cmd.native_ptr(), sys::NGX_FEATURE_SUPER_SAMPLING, params.as_ptr(), &mut handle)
        };
        NgxStatus(status).check()?;
        FeatureHandle::from_raw(handle).ok_or(NgxStatus::FAIL)
    }

    fn release_feature(&mut self, feature: FeatureHandle) -> Result<(), NgxStatus> {
        NgxStatus(unsafe { sys::NVSDK_NGX_VULKAN_ReleaseFeature(feature.as_ptr()) }).check()
    }

    fn evaluate(
        &mut self,
        cmd: &mut dyn CommandContext,
        feature: FeatureHandle,
        params: ParameterHandle,
        inputs: &EvalInputs<'_>,
    ) -> Result<(), NgxStatus> {
        let mut resources = VulkanEvalResources::marshal(inputs).map_err(|e| {
            error!("[NGX] cannot describe Vulkan inputs: {}", e);
            NgxStatus::INVALID_PARAMETER
        })?;

        // `resources` must outlive the evaluate call.
        let mut map = RawParameters(params);
        resources.bind(&mut map);
        params::write_eval_scalars(&mut map, inputs);

        let status = unsafe {
            sys::NVSDK_NGX_VULKAN_EvaluateFeature_C(cmd.native_ptr(), feature.as_ptr(), params.as_ptr(), None)
        };
        NgxStatus(status).check()
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
        let Some(device) = self.device.take() else {
            return Err(NgxStatus::NOT_INITIALIZED);
        };
        debug!("[NGX] Vulkan shutdown");
        NgxStatus(unsafe { sys::NVSDK_NGX_VULKAN_Shutdown1(raw(device)) }).check()
    }
}
