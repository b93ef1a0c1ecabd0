use std::{path::Path, process::Command};

use serde::Serialize;

use crate::distro;

const UNKNOWN: &str = "Unknown";
const UNKNOWN_CPU: &str = "Unknown CPU";
const GPU_FALLBACK: &str = "N/A (Driver not active)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct SystemSpecs {
    pub(crate) cpu: String,
    pub(crate) gpu: String,
    pub(crate) ram: String,
    pub(crate) storage: String,
    pub(crate) distro: String,
    pub(crate) version: String,
    pub(crate) distro_id: String,
}

/// 1024-based size with one decimal, e.g. `15.5 GB`.
pub(crate) fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{value:.1} {unit}");
        }
        value /= 1024.0;
    }
    format!("{:.1} PB", value * 1024.0)
}

pub(crate) fn parse_cpu_model(cpuinfo: &str) -> Option<String> {
    cpuinfo
        .lines()
        .filter(|line| line.starts_with("model name"))
        .find_map(|line| line.split_once(':'))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Total memory in bytes from `/proc/meminfo` (`MemTotal` is reported in kB).
pub(crate) fn parse_mem_total(meminfo: &str) -> Option<u64> {
    let line = meminfo.lines().find(|line| line.starts_with("MemTotal:"))?;
    let kib = line.split_whitespace().nth(1)?.parse::<u64>().ok()?;
    Some(kib * 1024)
}

/// First VGA/3D controller from `lspci` output, preferring the bracketed
/// marketing name when present.
pub(crate) fn parse_gpu_model(lspci: &str) -> Option<String> {
    let line = lspci.lines().find(|line| {
        let lowered = line.to_ascii_lowercase();
        lowered.contains("vga") || lowered.contains("3d controller")
    })?;
    let description = line.splitn(3, ':').nth(2)?.trim();
    if description.is_empty() {
        return None;
    }

    match (description.rfind('['), description.rfind(']')) {
        (Some(open), Some(close)) if open < close => {
            Some(description[open + 1..close].trim().to_string())
        }
        _ => Some(description.to_string()),
    }
}

fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn cpu_model() -> String {
    let detected = if cfg!(target_os = "linux") {
        std::fs::read_to_string("/proc/cpuinfo")
            .ok()
            .and_then(|raw| parse_cpu_model(&raw))
    } else if cfg!(target_os = "macos") {
        command_stdout("sysctl", &["-n", "machdep.cpu.brand_string"])
    } else {
        None
    };
    detected.unwrap_or_else(|| UNKNOWN_CPU.to_string())
}

fn gpu_model() -> String {
    let detected = if cfg!(target_os = "linux") && which::which("lspci").is_ok() {
        command_stdout("lspci", &[]).and_then(|raw| parse_gpu_model(&raw))
    } else if cfg!(target_os = "macos") {
        command_stdout("system_profiler", &["SPDisplaysDataType"]).and_then(|raw| {
            raw.lines()
                .find_map(|line| line.trim().strip_prefix("Chipset Model:"))
                .map(|value| value.trim().to_string())
        })
    } else {
        None
    };
    detected.unwrap_or_else(|| GPU_FALLBACK.to_string())
}

fn total_memory() -> Option<u64> {
    if cfg!(target_os = "linux") {
        return std::fs::read_to_string("/proc/meminfo")
            .ok()
            .and_then(|raw| parse_mem_total(&raw));
    }
    if cfg!(target_os = "macos") {
        return command_stdout("sysctl", &["-n", "hw.memsize"])?.parse().ok();
    }
    None
}

pub(crate) fn collect_system_specs(os_release_path: &Path) -> SystemSpecs {
    let profile = distro::identify(os_release_path);
    let storage = match fs2::total_space("/") {
        Ok(bytes) => format_size(bytes),
        Err(error) => {
            crate::append_desktop_log(&format!("failed to read root filesystem size: {error}"));
            UNKNOWN.to_string()
        }
    };

    SystemSpecs {
        cpu: cpu_model(),
        gpu: gpu_model(),
        ram: total_memory()
            .map(format_size)
            .unwrap_or_else(|| UNKNOWN.to_string()),
        storage,
        distro: profile.name,
        version: profile.version,
        distro_id: profile.id,
    }
}
