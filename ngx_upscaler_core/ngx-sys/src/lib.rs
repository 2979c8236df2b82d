//! Minimal NGX FFI layer for the DLSS super sampling feature (SDK 2.4).
//! Links against nvsdk_ngx_d.lib / libnvsdk_ngx.a when the `link` feature is on.
//!
//! Only the subset driven by `ngx_upscaler_core` is declared: per-API init,
//! capability and parameter objects, feature create/evaluate/release and the
//! `NVSDK_NGX_Parameter_*` accessors used to build the helper-macro
//! equivalents (`NGX_*_CREATE_DLSS_EXT`, `NGX_*_EVALUATE_DLSS_EXT`,
//! `NGX_DLSS_GET_OPTIMAL_SETTINGS`).

#![allow(non_snake_case)]
#![allow(non_camel_case_types)]

use std::os::raw::{c_char, c_int, c_uint, c_ulonglong, c_void};

// --- From nvsdk_ngx_defs.h ---

/// Result code returned by every NGX entry point.
pub type NgxResult = c_uint;

pub const NGX_RESULT_SUCCESS: NgxResult = 0x1;
pub const NGX_RESULT_FAIL: NgxResult = 0xBAD0_0000;
pub const NGX_RESULT_FAIL_FEATURE_NOT_SUPPORTED: NgxResult = NGX_RESULT_FAIL | 1;
pub const NGX_RESULT_FAIL_PLATFORM_ERROR: NgxResult = NGX_RESULT_FAIL | 2;
pub const NGX_RESULT_FAIL_FEATURE_ALREADY_EXISTS: NgxResult = NGX_RESULT_FAIL | 3;
pub const NGX_RESULT_FAIL_FEATURE_NOT_FOUND: NgxResult = NGX_RESULT_FAIL | 4;
pub const NGX_RESULT_FAIL_INVALID_PARAMETER: NgxResult = NGX_RESULT_FAIL | 5;
pub const NGX_RESULT_FAIL_SCRATCH_BUFFER_TOO_SMALL: NgxResult = NGX_RESULT_FAIL | 6;
pub const NGX_RESULT_FAIL_NOT_INITIALIZED: NgxResult = NGX_RESULT_FAIL | 7;
pub const NGX_RESULT_FAIL_UNSUPPORTED_INPUT_FORMAT: NgxResult = NGX_RESULT_FAIL | 8;
pub const NGX_RESULT_FAIL_RW_FLAG_MISSING: NgxResult = NGX_RESULT_FAIL | 9;
pub const NGX_RESULT_FAIL_MISSING_INPUT: NgxResult = NGX_RESULT_FAIL | 10;
pub const NGX_RESULT_FAIL_UNABLE_TO_INITIALIZE_FEATURE: NgxResult = NGX_RESULT_FAIL | 11;
pub const NGX_RESULT_FAIL_OUT_OF_DATE: NgxResult = NGX_RESULT_FAIL | 12;
pub const NGX_RESULT_FAIL_OUT_OF_GPU_MEMORY: NgxResult = NGX_RESULT_FAIL | 13;
pub const NGX_RESULT_FAIL_UNSUPPORTED_FORMAT: NgxResult = NGX_RESULT_FAIL | 14;
pub const NGX_RESULT_FAIL_UNABLE_TO_WRITE_TO_APP_DATA_PATH: NgxResult = NGX_RESULT_FAIL | 15;
pub const NGX_RESULT_FAIL_UNSUPPORTED_PARAMETER: NgxResult = NGX_RESULT_FAIL | 16;
pub const NGX_RESULT_FAIL_DENIED: NgxResult = NGX_RESULT_FAIL | 17;
pub const NGX_RESULT_FAIL_NOT_IMPLEMENTED: NgxResult = NGX_RESULT_FAIL | 18;

/// Equivalent of the `NVSDK_NGX_FAILED` macro.
pub const fn ngx_failed(result: NgxResult) -> bool {
    (result & 0xFFF0_0000) == NGX_RESULT_FAIL
}

/// Equivalent of the `NVSDK_NGX_SUCCEED` macro.
pub const fn ngx_succeeded(result: NgxResult) -> bool {
    !ngx_failed(result)
}

/// Name of a result code, as printed by `GetNGXResultAsString` in the SDK samples.
pub fn ngx_result_name(result: NgxResult) -> &'static str {
    match result {
        NGX_RESULT_SUCCESS => "Success",
        NGX_RESULT_FAIL => "Fail",
        NGX_RESULT_FAIL_FEATURE_NOT_SUPPORTED => "FeatureNotSupported",
        NGX_RESULT_FAIL_PLATFORM_ERROR => "PlatformError",
        NGX_RESULT_FAIL_FEATURE_ALREADY_EXISTS => "FeatureAlreadyExists",
        NGX_RESULT_FAIL_FEATURE_NOT_FOUND => "FeatureNotFound",
        NGX_RESULT_FAIL_INVALID_PARAMETER => "InvalidParameter",
        NGX_RESULT_FAIL_SCRATCH_BUFFER_TOO_SMALL => "ScratchBufferTooSmall",
        NGX_RESULT_FAIL_NOT_INITIALIZED => "NotInitialized",
        NGX_RESULT_FAIL_UNSUPPORTED_INPUT_FORMAT => "UnsupportedInputFormat",
        NGX_RESULT_FAIL_RW_FLAG_MISSING => "RWFlagMissing",
        NGX_RESULT_FAIL_MISSING_INPUT => "MissingInput",
        NGX_RESULT_FAIL_UNABLE_TO_INITIALIZE_FEATURE => "UnableToInitializeFeature",
        NGX_RESULT_FAIL_OUT_OF_DATE => "OutOfDate",
        NGX_RESULT_FAIL_OUT_OF_GPU_MEMORY => "OutOfGPUMemory",
        NGX_RESULT_FAIL_UNSUPPORTED_FORMAT => "UnsupportedFormat",
        NGX_RESULT_FAIL_UNABLE_TO_WRITE_TO_APP_DATA_PATH => "UnableToWriteToAppDataPath",
        NGX_RESULT_FAIL_UNSUPPORTED_PARAMETER => "UnsupportedParameter",
        NGX_RESULT_FAIL_DENIED => "Denied",
        NGX_RESULT_FAIL_NOT_IMPLEMENTED => "NotImplemented",
        _ => "Unknown",
    }
}

/// `NVSDK_NGX_Version_API` for the 2.x SDK headers.
pub const NGX_VERSION_API: c_uint = 0x0000_0014;

/// `NVSDK_NGX_ENGINE_TYPE_CUSTOM`.
pub const NGX_ENGINE_TYPE_CUSTOM: c_int = 0;

/// `NVSDK_NGX_Feature_SuperSampling`.
pub const NGX_FEATURE_SUPER_SAMPLING: c_int = 1;

/// `NVSDK_NGX_PerfQuality_Value`.
#[repr(i32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NgxPerfQuality {
    MaxPerf = 0,
    Balanced = 1,
    MaxQuality = 2,
    UltraPerformance = 3,
    UltraQuality = 4,
    Dlaa = 5,
}

/// `NVSDK_NGX_DLSS_Feature_Flags`.
pub const DLSS_FEATURE_FLAGS_NONE: c_int = 0;
pub const DLSS_FEATURE_FLAGS_IS_HDR: c_int = 1 << 0;
pub const DLSS_FEATURE_FLAGS_MV_LOW_RES: c_int = 1 << 1;
pub const DLSS_FEATURE_FLAGS_MV_JITTERED: c_int = 1 << 2;
pub const DLSS_FEATURE_FLAGS_DEPTH_INVERTED: c_int = 1 << 3;
pub const DLSS_FEATURE_FLAGS_DO_SHARPENING: c_int = 1 << 5;
pub const DLSS_FEATURE_FLAGS_AUTO_EXPOSURE: c_int = 1 << 6;

/// Opaque parameter map (`NVSDK_NGX_Parameter`).
#[repr(C)]
pub struct NgxParameter {
    _private: [u8; 0],
}

/// Opaque feature handle (`NVSDK_NGX_Handle`).
#[repr(C)]
pub struct NgxHandle {
    _private: [u8; 0],
}

/// Opaque `NVSDK_NGX_FeatureCommonInfo`; this crate always passes null.
#[repr(C)]
pub struct NgxFeatureCommonInfo {
    _private: [u8; 0],
}

/// `wchar_t` as the SDK sees it.
#[cfg(windows)]
pub type WChar = u16;
#[cfg(not(windows))]
pub type WChar = i32;

/// Progress callback taken by `*_EvaluateFeature_C`; unused here.
pub type NgxProgressCallback = Option<unsafe extern "C" fn(progress: f32, should_cancel: *mut bool)>;

/// Signature of the `DLSSOptimalSettingsCallback` stored in capability parameters.
pub type NgxOptimalSettingsCallback = unsafe extern "C" fn(params: *mut NgxParameter) -> NgxResult;

// --- Parameter names (nvsdk_ngx_defs.h), NUL terminated ---

pub const PARAM_SUPER_SAMPLING_AVAILABLE: &[u8] = b"SuperSampling.Available\0";
pub const PARAM_SUPER_SAMPLING_NEEDS_UPDATED_DRIVER: &[u8] = b"SuperSampling.NeedsUpdatedDriver\0";
pub const PARAM_CREATION_NODE_MASK: &[u8] = b"CreationNodeMask\0";
pub const PARAM_VISIBILITY_NODE_MASK: &[u8] = b"VisibilityNodeMask\0";
pub const PARAM_WIDTH: &[u8] = b"Width\0";
pub const PARAM_HEIGHT: &[u8] = b"Height\0";
pub const PARAM_OUT_WIDTH: &[u8] = b"OutWidth\0";
pub const PARAM_OUT_HEIGHT: &[u8] = b"OutHeight\0";
pub const PARAM_PERF_QUALITY_VALUE: &[u8] = b"PerfQualityValue\0";
pub const PARAM_RTX_VALUE: &[u8] = b"RTXValue\0";
pub const PARAM_SHARPNESS: &[u8] = b"Sharpness\0";
pub const PARAM_DLSS_FEATURE_CREATE_FLAGS: &[u8] = b"DLSS.Feature.Create.Flags\0";
pub const PARAM_DLSS_ENABLE_OUTPUT_SUBRECTS: &[u8] = b"DLSS.Enable.Output.Subrects\0";
pub const PARAM_COLOR: &[u8] = b"Color\0";
pub const PARAM_OUTPUT: &[u8] = b"Output\0";
pub const PARAM_DEPTH: &[u8] = b"Depth\0";
pub const PARAM_MOTION_VECTORS: &[u8] = b"MotionVectors\0";
pub const PARAM_EXPOSURE_TEXTURE: &[u8] = b"ExposureTexture\0";
pub const PARAM_JITTER_OFFSET_X: &[u8] = b"Jitter.Offset.X\0";
pub const PARAM_JITTER_OFFSET_Y: &[u8] = b"Jitter.Offset.Y\0";
pub const PARAM_RESET: &[u8] = b"Reset\0";
pub const PARAM_MV_SCALE_X: &[u8] = b"MV.Scale.X\0";
pub const PARAM_MV_SCALE_Y: &[u8] = b"MV.Scale.Y\0";
pub const PARAM_DLSS_RENDER_SUBRECT_WIDTH: &[u8] = b"DLSS.Render.Subrect.Dimensions.Width\0";
pub const PARAM_DLSS_RENDER_SUBRECT_HEIGHT: &[u8] = b"DLSS.Render.Subrect.Dimensions.Height\0";
pub const PARAM_DLSS_PRE_EXPOSURE: &[u8] = b"DLSS.Pre.Exposure\0";
pub const PARAM_FRAME_TIME_DELTA_MS: &[u8] = b"FrameTimeDeltaInMsec\0";
pub const PARAM_DLSS_OPTIMAL_SETTINGS_CALLBACK: &[u8] = b"DLSSOptimalSettingsCallback\0";
pub const PARAM_DLSS_MAX_RENDER_WIDTH: &[u8] = b"DLSS.Get.Dynamic.Max.Render.Width\0";
pub const PARAM_DLSS_MAX_RENDER_HEIGHT: &[u8] = b"DLSS.Get.Dynamic.Max.Render.Height\0";
pub const PARAM_DLSS_MIN_RENDER_WIDTH: &[u8] = b"DLSS.Get.Dynamic.Min.Render.Width\0";
pub const PARAM_DLSS_MIN_RENDER_HEIGHT: &[u8] = b"DLSS.Get.Dynamic.Min.Render.Height\0";

/// Pointer form of a NUL terminated parameter name.
pub fn param_name(name: &'static [u8]) -> *const c_char {
    debug_assert_eq!(name.last(), Some(&0));
    name.as_ptr() as *const c_char
}

// --- From nvsdk_ngx_vk.h ---

pub type VkInstance = *mut c_void;
pub type VkPhysicalDevice = *mut c_void;
pub type VkDevice = *mut c_void;
pub type VkCommandBuffer = *mut c_void;
/// Non-dispatchable handles are 64-bit on every target.
pub type VkImage = u64;
pub type VkImageView = u64;
pub type VkBuffer = u64;
pub type VkFormat = i32;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct VkImageSubresourceRange {
    pub aspect_mask: u32,
    pub base_mip_level: u32,
    pub level_count: u32,
    pub base_array_layer: u32,
    pub layer_count: u32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct NgxImageViewInfoVk {
    pub image_view: VkImageView,
    pub image: VkImage,
    pub subresource_range: VkImageSubresourceRange,
    pub format: VkFormat,
    pub width: c_uint,
    pub height: c_uint,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct NgxBufferInfoVk {
    pub buffer: VkBuffer,
    pub size_in_bytes: c_uint,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub union NgxResourceVkPayload {
    pub image_view_info: NgxImageViewInfoVk,
    pub buffer_info: NgxBufferInfoVk,
}

#[repr(i32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NgxResourceVkType {
    ImageView = 0,
    Buffer = 1,
}

/// `NVSDK_NGX_Resource_VK`, passed by pointer through `NVSDK_NGX_Parameter_SetVoidPointer`.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct NgxResourceVk {
    pub resource: NgxResourceVkPayload,
    pub resource_type: NgxResourceVkType,
    pub read_write: bool,
}

impl NgxResourceVk {
    pub fn image_view(info: NgxImageViewInfoVk, read_write: bool) -> Self {
        Self {
            resource: NgxResourceVkPayload { image_view_info: info },
            resource_type: NgxResourceVkType::ImageView,
            read_write,
        }
    }

    /// Image view payload, if this descriptor describes an image view.
    pub fn image_view_info(&self) -> Option<NgxImageViewInfoVk> {
        match self.resource_type {
            // SAFETY: the tag says the image-view arm is the initialised one.
            NgxResourceVkType::ImageView => Some(unsafe { self.resource.image_view_info }),
            NgxResourceVkType::Buffer => None,
        }
    }
}

// --- D3D types are only ever passed through as pointers ---

pub type ID3D11Device = c_void;
pub type ID3D11DeviceContext = c_void;
pub type ID3D11Resource = c_void;
pub type ID3D12Device = c_void;
pub type ID3D12GraphicsCommandList = c_void;
pub type ID3D12Resource = c_void;

extern "C" {
    // Parameter accessors (nvsdk_ngx.h, C interface).
    pub fn NVSDK_NGX_Parameter_SetI(params: *mut NgxParameter, name: *const c_char, value: c_int);
    pub fn NVSDK_NGX_Parameter_SetUI(params: *mut NgxParameter, name: *const c_char, value: c_uint);
    pub fn NVSDK_NGX_Parameter_SetF(params: *mut NgxParameter, name: *const c_char, value: f32);
    pub fn NVSDK_NGX_Parameter_SetVoidPointer(params: *mut NgxParameter, name: *const c_char, value: *mut c_void);
    pub fn NVSDK_NGX_Parameter_SetD3d11Resource(params: *mut NgxParameter, name: *const c_char, value: *mut ID3D11Resource);
    pub fn NVSDK_NGX_Parameter_SetD3d12Resource(params: *mut NgxParameter, name: *const c_char, value: *mut ID3D12Resource);
    pub fn NVSDK_NGX_Parameter_GetI(params: *mut NgxParameter, name: *const c_char, value: *mut c_int) -> NgxResult;
    pub fn NVSDK_NGX_Parameter_GetUI(params: *mut NgxParameter, name: *const c_char, value: *mut c_uint) -> NgxResult;
    pub fn NVSDK_NGX_Parameter_GetF(params: *mut NgxParameter, name: *const c_char, value: *mut f32) -> NgxResult;
    pub fn NVSDK_NGX_Parameter_GetVoidPointer(params: *mut NgxParameter, name: *const c_char, value: *mut *mut c_void) -> NgxResult;

    // D3D11 (nvsdk_ngx.h)
    pub fn NVSDK_NGX_D3D11_Init(
        application_id: c_ulonglong,
        application_data_path: *const WChar,
        device: *mut ID3D11Device,
        feature_info: *const NgxFeatureCommonInfo,
        sdk_version: c_uint,
    ) -> NgxResult;
    pub fn NVSDK_NGX_D3D11_Init_with_ProjectID(
        project_id: *const c_char,
        engine_type: c_int,
        engine_version: *const c_char,
        application_data_path: *const WChar,
        device: *mut ID3D11Device,
        feature_info: *const NgxFeatureCommonInfo,
        sdk_version: c_uint,
    ) -> NgxResult;
    pub fn NVSDK_NGX_D3D11_Shutdown1(device: *mut ID3D11Device) -> NgxResult;
    pub fn NVSDK_NGX_D3D11_GetCapabilityParameters(out_params: *mut *mut NgxParameter) -> NgxResult;
    pub fn NVSDK_NGX_D3D11_AllocateParameters(out_params: *mut *mut NgxParameter) -> NgxResult;
    pub fn NVSDK_NGX_D3D11_DestroyParameters(params: *mut NgxParameter) -> NgxResult;
    pub fn NVSDK_NGX_D3D11_CreateFeature(
        device_context: *mut ID3D11DeviceContext,
        feature: c_int,
        params: *mut NgxParameter,
        out_handle: *mut *mut NgxHandle,
    ) -> NgxResult;
    pub fn NVSDK_NGX_D3D11_ReleaseFeature(handle: *mut NgxHandle) -> NgxResult;
    pub fn NVSDK_NGX_D3D11_EvaluateFeature_C(
        device_context: *mut ID3D11DeviceContext,
        handle: *const NgxHandle,
        params: *const NgxParameter,
        callback: NgxProgressCallback,
    ) -> NgxResult;

    // D3D12 (nvsdk_ngx.h)
    pub fn NVSDK_NGX_D3D12_Init(
        application_id: c_ulonglong,
        application_data_path: *const WChar,
        device: *mut ID3D12Device,
        feature_info: *const NgxFeatureCommonInfo,
        sdk_version: c_uint,
    ) -> NgxResult;
    pub fn NVSDK_NGX_D3D12_Init_with_ProjectID(
        project_id: *const c_char,
        engine_type: c_int,
        engine_version: *const c_char,
        application_data_path: *const WChar,
        device: *mut ID3D12Device,
        feature_info: *const NgxFeatureCommonInfo,
        sdk_version: c_uint,
    ) -> NgxResult;
    pub fn NVSDK_NGX_D3D12_Shutdown1(device: *mut ID3D12Device) -> NgxResult;
    pub fn NVSDK_NGX_D3D12_GetCapabilityParameters(out_params: *mut *mut NgxParameter) -> NgxResult;
    pub fn NVSDK_NGX_D3D12_AllocateParameters(out_params: *mut *mut NgxParameter) -> NgxResult;
    pub fn NVSDK_NGX_D3D12_DestroyParameters(params: *mut NgxParameter) -> NgxResult;
    pub fn NVSDK_NGX_D3D12_CreateFeature(
        command_list: *mut ID3D12GraphicsCommandList,
        feature: c_int,
        params: *mut NgxParameter,
        out_handle: *mut *mut NgxHandle,
    ) -> NgxResult;
    pub fn NVSDK_NGX_D3D12_ReleaseFeature(handle: *mut NgxHandle) -> NgxResult;
    pub fn NVSDK_NGX_D3D12_EvaluateFeature_C(
        command_list: *mut ID3D12GraphicsCommandList,
        handle: *const NgxHandle,
        params: *const NgxParameter,
        callback: NgxProgressCallback,
    ) -> NgxResult;

    // Vulkan (nvsdk_ngx_vk.h)
    pub fn NVSDK_NGX_VULKAN_Init(
        application_id: c_ulonglong,
        application_data_path: *const WChar,
        instance: VkInstance,
        physical_device: VkPhysicalDevice,
        device: VkDevice,
        feature_info: *const NgxFeatureCommonInfo,
        sdk_version: c_uint,
    ) -> NgxResult;
    pub fn NVSDK_NGX_VULKAN_Init_with_ProjectID(
        project_id: *const c_char,
        engine_type: c_int,
        engine_version: *const c_char,
        application_data_path: *const WChar,
        instance: VkInstance,
        physical_device: VkPhysicalDevice,
        device: VkDevice,
        feature_info: *const NgxFeatureCommonInfo,
        sdk_version: c_uint,
    ) -> NgxResult;
    pub fn NVSDK_NGX_VULKAN_Shutdown1(device: VkDevice) -> NgxResult;
    pub fn NVSDK_NGX_VULKAN_GetCapabilityParameters(out_params: *mut *mut NgxParameter) -> NgxResult;
    pub fn NVSDK_NGX_VULKAN_AllocateParameters(out_params: *mut *mut NgxParameter) -> NgxResult;
    pub fn NVSDK_NGX_VULKAN_DestroyParameters(params: *mut NgxParameter) -> NgxResult;
    pub fn NVSDK_NGX_VULKAN_CreateFeature(
        command_buffer: VkCommandBuffer,
        feature: c_int,
        params: *mut NgxParameter,
        out_handle: *mut *mut NgxHandle,
    ) -> NgxResult;
    pub fn NVSDK_NGX_VULKAN_ReleaseFeature(handle: *mut NgxHandle) -> NgxResult;
    pub fn NVSDK_NGX_VULKAN_EvaluateFeature_C(
        command_buffer: VkCommandBuffer,
        handle: *const NgxHandle,
        params: *const NgxParameter,
        callback: NgxProgressCallback,
    ) -> NgxResult;
}
