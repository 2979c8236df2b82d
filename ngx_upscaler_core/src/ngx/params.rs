//! Encoding of create/evaluate/optimal-settings requests into an NGX
//! parameter object. Mirrors the SDK's inline `NGX_*_DLSS_EXT` helpers so
//! the three adapters share one implementation.

use std::ffi::c_void;

use ngx_sys as sys;

use super::{EvalInputs, FeatureCreateParams, SuperSamplingCaps};
use crate::error::NgxStatus;
use crate::upscale::{Extent, QualityTier, RecommendedSettings};

/// Name of an NGX parameter, NUL terminated.
pub type ParamName = &'static [u8];

/// Typed access to an NGX parameter object.
pub trait ParameterMap {
    fn set_u32(&mut self, name: ParamName, value: u32);
    fn set_i32(&mut self, name: ParamName, value: i32);
    fn set_f32(&mut self, name: ParamName, value: f32);
    fn set_ptr(&mut self, name: ParamName, value: *mut c_void);
    fn get_u32(&self, name: ParamName) -> Result<u32, NgxStatus>;
    fn get_i32(&self, name: ParamName) -> Result<i32, NgxStatus>;
    fn get_f32(&self, name: ParamName) -> Result<f32, NgxStatus>;
    fn get_ptr(&self, name: ParamName) -> Result<*mut c_void, NgxStatus>;
    /// Calls an optimal-settings callback previously read from this map.
    fn call_optimal_settings(&mut self, callback: *mut c_void) -> NgxStatus;
}

/// `SuperSampling.Available` and `SuperSampling.NeedsUpdatedDriver`; absent reads as false.
pub fn read_supersampling_caps(map: &impl ParameterMap) -> SuperSamplingCaps {
    SuperSamplingCaps {
        available: map.get_i32(sys::PARAM_SUPER_SAMPLING_AVAILABLE).map(|v| v != 0).unwrap_or(false),
        needs_updated_driver: map
            .get_i32(sys::PARAM_SUPER_SAMPLING_NEEDS_UPDATED_DRIVER)
            .map(|v| v != 0)
            .unwrap_or(false),
    }
}

/// Creation parameters. Node masks only exist on D3D12 and Vulkan.
pub fn write_create_params(map: &mut impl ParameterMap, create: &FeatureCreateParams, node_masks: bool) {
    if node_masks {
        map.set_u32(sys::PARAM_CREATION_NODE_MASK, create.creation_node_mask);
        map.set_u32(sys::PARAM_VISIBILITY_NODE_MASK, create.visibility_node_mask);
    }
    map.set_u32(sys::PARAM_WIDTH, create.render_size.width);
    map.set_u32(sys::PARAM_HEIGHT, create.render_size.height);
    map.set_u32(sys::PARAM_OUT_WIDTH, create.output_size.width);
    map.set_u32(sys::PARAM_OUT_HEIGHT, create.output_size.height);
    map.set_i32(sys::PARAM_PERF_QUALITY_VALUE, create.perf_quality as i32);
    map.set_i32(sys::PARAM_DLSS_FEATURE_CREATE_FLAGS, create.flags.bits());
    map.set_i32(sys::PARAM_DLSS_ENABLE_OUTPUT_SUBRECTS, create.enable_output_subrects as i32);
}

/// Scalar evaluation inputs. Texture bindings are API specific and set by the adapter.
pub fn write_eval_scalars(map: &mut impl ParameterMap, inputs: &EvalInputs<'_>) {
    map.set_f32(sys::PARAM_JITTER_OFFSET_X, inputs.jitter_offset[0]);
    map.set_f32(sys::PARAM_JITTER_OFFSET_Y, inputs.jitter_offset[1]);
    map.set_f32(sys::PARAM_SHARPNESS, inputs.sharpness);
    map.set_i32(sys::PARAM_RESET, inputs.reset_history as i32);
    map.set_f32(sys::PARAM_MV_SCALE_X, inputs.motion_vector_scale[0]);
    map.set_f32(sys::PARAM_MV_SCALE_Y, inputs.motion_vector_scale[1]);
    map.set_u32(sys::PARAM_DLSS_RENDER_SUBRECT_WIDTH, inputs.render_subrect.width);
    map.set_u32(sys::PARAM_DLSS_RENDER_SUBRECT_HEIGHT, inputs.render_subrect.height);
    map.set_f32(sys::PARAM_DLSS_PRE_EXPOSURE, 0.0);
    map.set_f32(sys::PARAM_FRAME_TIME_DELTA_MS, inputs.frame_delta_ms);
}

/// Evaluate request for the D3D paths: binds Color, Output, Depth and
/// MotionVectors through `bind`, then writes the scalars. Absent motion vectors
/// bind as null.
pub fn encode_evaluate<M: ParameterMap>(
    map: &mut M,
    inputs: &EvalInputs<'_>,
    mut bind: impl FnMut(&mut M, ParamName, *mut c_void),
) {
    bind(map, sys::PARAM_COLOR, inputs.color.native_ptr());
    bind(map, sys::PARAM_OUTPUT, inputs.output.native_ptr());
    bind(map, sys::PARAM_DEPTH, inputs.depth.native_ptr());
    bind(map, sys::PARAM_MOTION_VECTORS, inputs.motion_vectors.map_or(std::ptr::null_mut(), |t| t.native_ptr()));
    write_eval_scalars(map, inputs);
}

/// Runs the optimal-settings callback stored in the capability parameters.
///
/// A missing callback means the installed DLSS runtime predates the query.
/// Min/max fall back to the optimal size when the runtime does not report them.
pub fn query_optimal_settings(
    map: &mut impl ParameterMap,
    display: Extent,
    quality: QualityTier,
) -> Result<RecommendedSettings, NgxStatus> {
    let callback = map.get_ptr(sys::PARAM_DLSS_OPTIMAL_SETTINGS_CALLBACK).unwrap_or(std::ptr::null_mut());
    if callback.is_null() {
        return Err(NgxStatus::OUT_OF_DATE);
    }

    map.set_u32(sys::PARAM_WIDTH, display.width);
    map.set_u32(sys::PARAM_HEIGHT, display.height);
    map.set_i32(sys::PARAM_PERF_QUALITY_VALUE, quality.perf_quality() as i32);
    // Older runtimes still read this.
    map.set_i32(sys::PARAM_RTX_VALUE, 0);

    map.call_optimal_settings(callback).check()?;

    let optimal = Extent::new(map.get_u32(sys::PARAM_OUT_WIDTH)?, map.get_u32(sys::PARAM_OUT_HEIGHT)?);
    let max = Extent::new(
        map.get_u32(sys::PARAM_DLSS_MAX_RENDER_WIDTH).unwrap_or(optimal.width),
        map.get_u32(sys::PARAM_DLSS_MAX_RENDER_HEIGHT).unwrap_or(optimal.height),
    );
    let min = Extent::new(
        map.get_u32(sys::PARAM_DLSS_MIN_RENDER_WIDTH).unwrap_or(optimal.width),
        map.get_u32(sys::PARAM_DLSS_MIN_RENDER_HEIGHT).unwrap_or(optimal.height),
    );
    let sharpness = map.get_f32(sys::PARAM_SHARPNESS).unwrap_or(0.0);

    Ok(RecommendedSettings {
        optimal_resolution: optimal,
        min_resolution: min,
        max_resolution: max,
        sharpness,
    })
}

/// SDK-owned parameter object.
#[cfg(feature = "ngx")]
pub struct RawParameters(pub super::ParameterHandle);

#[cfg(feature = "ngx")]
impl RawParameters {
    fn raw(&self) -> *mut sys::NgxParameter {
        self.0.as_ptr()
    }

    pub fn set_d3d11_resource(&mut self, name: ParamName, resource: *mut c_void) {
        // SAFETY: the handle came from NGX and outlives this call; name is NUL terminated.
        unsafe { sys::NVSDK_NGX_Parameter_SetD3d11Resource(self.raw(), sys::param_name(name), resource) }
    }

    pub fn set_d3d12_resource(&mut self, name: ParamName, resource: *mut c_void) {
        // SAFETY: as above.
        unsafe { sys::NVSDK_NGX_Parameter_SetD3d12Resource(self.raw(), sys::param_name(name), resource) }
    }
}

/// Signature shared by `GetCapabilityParameters` and `AllocateParameters`.
#[cfg(feature = "ngx")]
pub(super) type ParameterSource = unsafe extern "C" fn(*mut *mut sys::NgxParameter) -> sys::NgxResult;

/// Calls a parameter-producing entry point. A null object on success is reported as `FAIL`.
#[cfg(feature = "ngx")]
pub(super) fn fetch_parameters(source: ParameterSource) -> Result<super::ParameterHandle, NgxStatus> {
    let mut raw = std::ptr::null_mut();
    // SAFETY: the out pointer is valid for the duration of the call.
    NgxStatus(unsafe { source(&mut raw) }).check()?;
    super::ParameterHandle::from_raw(raw).ok_or(NgxStatus::FAIL)
}

/// Project id and engine version as C strings.
#[cfg(feature = "ngx")]
pub(super) fn project_strings(
    identity: &crate::upscale::AppIdentity,
) -> Result<(std::ffi::CString, std::ffi::CString), NgxStatus> {
    let project = std::ffi::CString::new(identity.project_id.as_str()).map_err(|_| NgxStatus::INVALID_PARAMETER)?;
    let version =
        std::ffi::CString::new(identity.engine_version.as_str()).map_err(|_| NgxStatus::INVALID_PARAMETER)?;
    Ok((project, version))
}

#[cfg(feature = "ngx")]
impl ParameterMap for RawParameters {
    fn set_u32(&mut self, name: ParamName, value: u32) {
        unsafe { sys::NVSDK_NGX_Parameter_SetUI(self.raw(), sys::param_name(name), value) }
    }

    fn set_i32(&mut self, name: ParamName, value: i32) {
        unsafe { sys::NVSDK_NGX_Parameter_SetI(self.raw(), sys::param_name(name), value) }
    }

    fn set_f32(&mut self, name: ParamName, value: f32) {
        unsafe { sys::NVSDK_NGX_Parameter_SetF(self.raw(), sys::param_name(name), value) }
    }

    fn set_ptr(&mut self, name: ParamName, value: *mut c_void) {
        unsafe { sys::NVSDK_NGX_Parameter_SetVoidPointer(self.raw(), sys::param_name(name), value) }
    }

    fn get_u32(&self, name: ParamName) -> Result<u32, NgxStatus> {
        let mut value = 0;
        let status = unsafe { sys::NVSDK_NGX_Parameter_GetUI(self.raw(), sys::param_name(name), &mut value) };
        NgxStatus(status).check().map(|_| value)
    }

    fn get_i32(&self, name: ParamName) -> Result<i32, NgxStatus> {
        let mut value = 0;
        let status = unsafe { sys::NVSDK_NGX_Parameter_GetI(self.raw(), sys::param_name(name), &mut value) };
        NgxStatus(status).check().map(|_| value)
    }

    fn get_f32(&self, name: ParamName) -> Result<f32, NgxStatus> {
        let mut value = 0.0;
        let status = unsafe { sys::NVSDK_NGX_Parameter_GetF(self.raw(), sys::param_name(name), &mut value) };
        NgxStatus(status).check().map(|_| value)
    }

    fn get_ptr(&self, name: ParamName) -> Result<*mut c_void, NgxStatus> {
        let mut value = std::ptr::null_mut();
        let status = unsafe { sys::NVSDK_NGX_Parameter_GetVoidPointer(self.raw(), sys::param_name(name), &mut value) };
        NgxStatus(status).check().map(|_| value)
    }

    fn call_optimal_settings(&mut self, callback: *mut c_void) -> NgxStatus {
        // SAFETY: non-null pointer read from DLSSOptimalSettingsCallback, which
        // the runtime stores with exactly this signature.
        let callback: sys::NgxOptimalSettingsCallback = unsafe { std::mem::transmute(callback) };
        NgxStatus(unsafe { callback(self.raw()) })
    }
}
