use std::ffi::CStr;

use super::PlatformExtensions;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn cpu_cache_size_kb() -> Option<i64> {
        let bytes = sysctl_u64(c"hw.l2cachesize")?;
        Some((bytes / 1024) as i64)
    }

    fn platform_family() -> Option<String> {
        Some("darwin".to_string())
    }
}

fn sysctl_u64(name: &CStr) -> Option<u64> {
    let mut value: u64 = 0;
    let mut size = std::mem::size_of::<u64>();
    // SAFETY: value and size describe a valid, writable u64 buffer.
    let rc = unsafe {
        libc::sysctlbyname(
            name.as_ptr(),
            (&mut value as *mut u64).cast(),
            &mut size,
            std::ptr::null_mut(),
            0,
        )
    };
    if rc == 0 && value > 0 { Some(value) } else { None }
}
