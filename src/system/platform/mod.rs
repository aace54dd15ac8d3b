//! Host facts that `sysinfo` does not expose.

pub trait PlatformExtensions {
    /// CPU cache size in KB.
    fn cpu_cache_size_kb() -> Option<i64>;
    /// Broad platform family, e.g. `debian` or `rhel` on Linux.
    fn platform_family() -> Option<String>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod other;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
use other as platform_impl;

pub fn cpu_cache_size_kb() -> Option<i64> {
    platform_impl::Platform::cpu_cache_size_kb()
}

pub fn platform_family() -> Option<String> {
    platform_impl::Platform::platform_family()
}
