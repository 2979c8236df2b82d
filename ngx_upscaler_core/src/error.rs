use std::fmt;

use crate::gpu::GpuError;

/// Raw NGX result code, printed as `0xBAD0000C (OutOfDate)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NgxStatus(pub u32);

impl NgxStatus {
    pub const SUCCESS: NgxStatus = NgxStatus(ngx_sys::NGX_RESULT_SUCCESS);
    pub const FAIL: NgxStatus = NgxStatus(ngx_sys::NGX_RESULT_FAIL);
    pub const FEATURE_NOT_SUPPORTED: NgxStatus = NgxStatus(ngx_sys::NGX_RESULT_FAIL_FEATURE_NOT_SUPPORTED);
    pub const PLATFORM_ERROR: NgxStatus = NgxStatus(ngx_sys::NGX_RESULT_FAIL_PLATFORM_ERROR);
    pub const INVALID_PARAMETER: NgxStatus = NgxStatus(ngx_sys::NGX_RESULT_FAIL_INVALID_PARAMETER);
    pub const NOT_INITIALIZED: NgxStatus = NgxStatus(ngx_sys::NGX_RESULT_FAIL_NOT_INITIALIZED);
    pub const UNABLE_TO_INITIALIZE_FEATURE: NgxStatus =
        NgxStatus(ngx_sys::NGX_RESULT_FAIL_UNABLE_TO_INITIALIZE_FEATURE);
    pub const OUT_OF_DATE: NgxStatus = NgxStatus(ngx_sys::NGX_RESULT_FAIL_OUT_OF_DATE);
    pub const OUT_OF_GPU_MEMORY: NgxStatus = NgxStatus(ngx_sys::NGX_RESULT_FAIL_OUT_OF_GPU_MEMORY);
    pub const NOT_IMPLEMENTED: NgxStatus = NgxStatus(ngx_sys::NGX_RESULT_FAIL_NOT_IMPLEMENTED);

    pub fn is_ok(self) -> bool {
        ngx_sys::ngx_succeeded(self.0)
    }

    pub fn is_err(self) -> bool {
        ngx_sys::ngx_failed(self.0)
    }

    pub fn name(self) -> &'static str {
        ngx_sys::ngx_result_name(self.0)
    }

    /// `Ok(())` for any non-failing code, the status itself otherwise.
    pub fn check(self) -> Result<(), NgxStatus> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for NgxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010X} ({})", self.0, self.name())
    }
}

/// Failures surfaced by the upscaler. The first four end initialization;
/// feature creation and evaluation failures only cost the current frame.
#[derive(Debug, thiserror::Error)]
pub enum UpscalerError {
    #[error("GPU is not capable of running the upscaler")]
    HardwareIncompatible,
    #[error("graphics driver is out of date")]
    DriverOutOfDate,
    #[error("operating system is out of date (Windows 10 or newer required)")]
    OsOutOfDate,
    #[error("NGX backend initialization failed: {0}")]
    BackendInitFailed(NgxStatus),
    #[error("NGX capability query failed: {0}")]
    CapabilityQueryFailed(NgxStatus),
    #[error("upscaling feature creation failed: {0}")]
    FeatureCreateFailed(NgxStatus),
    #[error("upscaling evaluation failed: {0}")]
    EvaluateFailed(NgxStatus),
    #[error("upscaler is not initialized")]
    NotInitialized,
    #[error(transparent)]
    Gpu(#[from] GpuError),
}

impl UpscalerError {
    /// Terminal errors leave the upscaler unusable until re-initialized.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UpscalerError::HardwareIncompatible
                | UpscalerError::DriverOutOfDate
                | UpscalerError::OsOutOfDate
                | UpscalerError::BackendInitFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(NgxStatus::OUT_OF_DATE.to_string(), "0xBAD0000C (OutOfDate)");
        assert_eq!(NgxStatus::SUCCESS.to_string(), "0x00000001 (Success)");
    }

    #[test]
    fn test_status_check() {
        assert!(NgxStatus::SUCCESS.check().is_ok());
        assert_eq!(NgxStatus::PLATFORM_ERROR.check(), Err(NgxStatus::PLATFORM_ERROR));
        assert!(NgxStatus(0xBAD0_0042).is_err());
    }

    #[test]
    fn test_error_messages_carry_status() {
        let e = UpscalerError::FeatureCreateFailed(NgxStatus::OUT_OF_GPU_MEMORY);
        assert!(e.to_string().contains("OutOfGPUMemory"));
        assert!(!e.is_terminal());
        assert!(UpscalerError::DriverOutOfDate.is_terminal());
    }
}
