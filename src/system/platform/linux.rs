use super::PlatformExtensions;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn cpu_cache_size_kb() -> Option<i64> {
        let contents = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        parse_cache_size(&contents)
    }

    fn platform_family() -> Option<String> {
        let contents = std::fs::read_to_string("/etc/os-release")
            .or_else(|_| std::fs::read_to_string("/usr/lib/os-release"))
            .ok()?;
        parse_os_family(&contents)
    }
}

/// First `cache size` entry of /proc/cpuinfo, e.g. "cache size\t: 512 KB".
fn parse_cache_size(cpuinfo: &str) -> Option<i64> {
    for line in cpuinfo.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if key.trim() != "cache size" {
            continue;
        }
        let mut parts = value.split_whitespace();
        let amount: i64 = parts.next()?.parse().ok()?;
        return match parts.next().map(str::to_ascii_uppercase).as_deref() {
            Some("MB") => Some(amount * 1024),
            _ => Some(amount),
        };
    }
    None
}

/// `ID_LIKE` names the family; distributions without it are their own family.
fn parse_os_family(os_release: &str) -> Option<String> {
    let mut id = None;
    let mut id_like = None;
    for line in os_release.lines() {
        if let Some(val) = line.strip_prefix("ID_LIKE=") {
            id_like = val.trim_matches('"').split_whitespace().next().map(str::to_string);
        } else if let Some(val) = line.strip_prefix("ID=") {
            id = Some(val.trim_matches('"').to_string());
        }
    }
    id_like.or(id).filter(|s| !s.is_empty())
}
