//! Process resource counters attached to system events

use crate::types::ResourceUsage;

/// Sample the current and peak resident memory of this process
///
/// Returns `None` where the counters are not available.
#[cfg(target_os = "linux")]
pub fn sample_resource_usage() -> Option<ResourceUsage> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    parse_proc_status(&status)
}

#[cfg(not(target_os = "linux"))]
pub fn sample_resource_usage() -> Option<ResourceUsage> {
    None
}

/// Parse `VmRSS` / `VmHWM` (reported in kB) out of `/proc/<pid>/status`
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_proc_status(status: &str) -> Option<ResourceUsage> {
    let field = |name: &str| -> Option<u64> {
        let line = status.lines().find(|l| l.starts_with(name))?;
        let kb = line[name.len()..].split_whitespace().next()?.parse::<u64>().ok()?;
        Some(kb * 1024)
    };

    let memory_bytes = field("VmRSS:")?;
    let peak_memory_bytes = field("VmHWM:").unwrap_or(memory_bytes);
    Some(ResourceUsage {
        memory_bytes,
        peak_memory_bytes,
    })
}
