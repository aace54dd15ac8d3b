use super::PlatformExtensions;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn cpu_cache_size_kb() -> Option<i64> {
        None
    }

    fn platform_family() -> Option<String> {
        Some(std::env::consts::FAMILY.to_string())
    }
}
