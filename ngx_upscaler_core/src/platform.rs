//! Operating-system gate for the capability probe.

/// Where the prober gets its "is the OS new enough" answer from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OsCheck {
    /// Ask the running system.
    #[default]
    Host,
    /// Fixed answer, for tests and hosts that already checked.
    Assume(bool),
}

impl OsCheck {
    pub fn is_supported(self) -> bool {
        match self {
            OsCheck::Host => host_meets_minimum(),
            OsCheck::Assume(supported) => supported,
        }
    }
}

/// NGX needs Windows 10 or newer. Other platforms carry no OS gate.
#[cfg(windows)]
fn host_meets_minimum() -> bool {
    match windows_version() {
        Some((major, minor, build)) => {
            log::debug!("[Platform] Windows {}.{} build {}", major, minor, build);
            major >= 10
        }
        None => {
            log::warn!("[Platform] could not query the Windows version; assuming Windows 10+");
            true
        }
    }
}

#[cfg(not(windows))]
fn host_meets_minimum() -> bool {
    true
}

/// Real version numbers; `RtlGetVersion` is not subject to the manifest
/// compatibility shim that caps `GetVersionEx` at 6.2.
#[cfg(windows)]
fn windows_version() -> Option<(u32, u32, u32)> {
    use windows_sys::Wdk::System::SystemServices::RtlGetVersion;
    use windows_sys::Win32::System::SystemInformation::OSVERSIONINFOW;

    // SAFETY: OSVERSIONINFOW is plain data; the size field is set before the call.
    let mut info: OSVERSIONINFOW = unsafe { std::mem::zeroed() };
    info.dwOSVersionInfoSize = std::mem::size_of::<OSVERSIONINFOW>() as u32;
    let status = unsafe { RtlGetVersion(&mut info) };
    if status < 0 {
        return None;
    }
    Some((info.dwMajorVersion, info.dwMinorVersion, info.dwBuildNumber))
}
