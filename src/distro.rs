use std::{collections::HashMap, fs, path::Path};

const DEBIAN_FAMILY: &[&str] = &["ubuntu", "debian", "linuxmint", "pop", "kali", "neon"];
const FEDORA_FAMILY: &[&str] = &["fedora", "rhel", "centos", "almalinux"];
const ARCH_FAMILY: &[&str] = &["arch", "manjaro", "endeavouros"];

const APT_UPDATE_COMMAND: &str =
    "apt-get update && env DEBIAN_FRONTEND=noninteractive apt-get upgrade -y";
const DNF_UPDATE_COMMAND: &str = "dnf update -y";
const PACMAN_UPDATE_COMMAND: &str = "pacman -Syu --noconfirm";
const ZYPPER_UPDATE_COMMAND: &str = "zypper up -y";

const FALLBACK_DISTRO_ID: &str = "linux";
const FALLBACK_DISTRO_NAME: &str = "Linux";
const FALLBACK_DISTRO_VERSION: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PackageFamily {
    Debian,
    Fedora,
    Arch,
    Suse,
}

impl PackageFamily {
    pub(crate) fn update_command(self) -> &'static str {
        match self {
            Self::Debian => APT_UPDATE_COMMAND,
            Self::Fedora => DNF_UPDATE_COMMAND,
            Self::Arch => PACMAN_UPDATE_COMMAND,
            Self::Suse => ZYPPER_UPDATE_COMMAND,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DistroProfile {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) family: Option<PackageFamily>,
}

impl DistroProfile {
    pub(crate) fn update_command(&self) -> Option<&'static str> {
        self.family.map(PackageFamily::update_command)
    }

    fn fallback() -> Self {
        Self {
            id: FALLBACK_DISTRO_ID.to_string(),
            name: FALLBACK_DISTRO_NAME.to_string(),
            version: FALLBACK_DISTRO_VERSION.to_string(),
            family: None,
        }
    }
}

pub(crate) fn family_for_id(id: &str) -> Option<PackageFamily> {
    let id = id.trim().to_ascii_lowercase();
    if DEBIAN_FAMILY.contains(&id.as_str()) {
        return Some(PackageFamily::Debian);
    }
    if FEDORA_FAMILY.contains(&id.as_str()) {
        return Some(PackageFamily::Fedora);
    }
    if ARCH_FAMILY.contains(&id.as_str()) {
        return Some(PackageFamily::Arch);
    }
    if id.contains("suse") {
        return Some(PackageFamily::Suse);
    }
    None
}

/// Parses `KEY=value` lines of an os-release file. Quotes around values are
/// stripped; comments and malformed lines are skipped.
pub(crate) fn parse_os_release(raw: &str) -> HashMap<String, String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

pub(crate) fn profile_from_os_release(raw: &str) -> DistroProfile {
    let fields = parse_os_release(raw);
    let fallback = DistroProfile::fallback();

    let id = fields
        .get("ID")
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty())
        .unwrap_or(fallback.id);
    let family = family_for_id(&id).or_else(|| {
        fields
            .get("ID_LIKE")
            .and_then(|like| like.split_whitespace().find_map(family_for_id))
    });

    DistroProfile {
        family,
        name: fields
            .get("NAME")
            .cloned()
            .filter(|value| !value.is_empty())
            .unwrap_or(fallback.name),
        version: fields
            .get("VERSION_ID")
            .cloned()
            .filter(|value| !value.is_empty())
            .unwrap_or(fallback.version),
        id,
    }
}

pub(crate) fn identify_from_path(path: &Path) -> DistroProfile {
    match fs::read_to_string(path) {
        Ok(raw) => profile_from_os_release(&raw),
        Err(error) => {
            crate::append_desktop_log(&format!(
                "failed to read distro descriptor {}: {error}",
                path.display()
            ));
            DistroProfile::fallback()
        }
    }
}

/// Distro identity for the running host. Non-Linux hosts get a synthetic
/// profile with no package family.
pub(crate) fn identify(os_release_path: &Path) -> DistroProfile {
    if cfg!(target_os = "macos") {
        return DistroProfile {
            id: "macos".to_string(),
            name: "macOS".to_string(),
            version: macos_product_version()
                .unwrap_or_else(|| FALLBACK_DISTRO_VERSION.to_string()),
            family: None,
        };
    }

    identify_from_path(os_release_path)
}

fn macos_product_version() -> Option<String> {
    let output = std::process::Command::new("sw_vers")
        .arg("-productVersion")
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!version.is_empty()).then_some(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_for(id: &str) -> DistroProfile {
        profile_from_os_release(&format!("ID={id}\n"))
    }

    #[test]
    fn identify_maps_each_family_to_its_update_command() {
        let cases = [
            ("ubuntu", Some(APT_UPDATE_COMMAND)),
            ("debian", Some(APT_UPDATE_COMMAND)),
            ("linuxmint", Some(APT_UPDATE_COMMAND)),
            ("fedora", Some("dnf update -y")),
            ("almalinux", Some("dnf update -y")),
            ("arch", Some("pacman -Syu --noconfirm")),
            ("endeavouros", Some("pacman -Syu --noconfirm")),
            ("opensuse-tumbleweed", Some("zypper up -y")),
            ("gentoo", None),
        ];

        for (id, expected) in cases {
            assert_eq!(profile_for(id).update_command(), expected, "distro id {id}");
        }
    }

    #[test]
    fn apt_command_runs_upgrade_noninteractively() {
        assert_eq!(
            profile_for("ubuntu").update_command(),
            Some("apt-get update && env DEBIAN_FRONTEND=noninteractive apt-get upgrade -y")
        );
    }

    #[test]
    fn profile_from_os_release_reads_quoted_fields() {
        let raw = r#"
# comment
NAME="Fedora Linux"
VERSION_ID=40
ID=fedora
PRETTY_NAME="Fedora Linux 40 (Workstation Edition)"
"#;
        let profile = profile_from_os_release(raw);
        assert_eq!(profile.id, "fedora");
        assert_eq!(profile.name, "Fedora Linux");
        assert_eq!(profile.version, "40");
        assert_eq!(profile.family, Some(PackageFamily::Fedora));
    }

    #[test]
    fn profile_from_os_release_lowercases_id() {
        assert_eq!(profile_for("\"Ubuntu\"").id, "ubuntu");
        assert_eq!(profile_for("Arch").family, Some(PackageFamily::Arch));
    }

    #[test]
    fn profile_from_os_release_falls_back_to_id_like() {
        let profile = profile_from_os_release("ID=zorin\nID_LIKE=\"ubuntu debian\"\n");
        assert_eq!(profile.id, "zorin");
        assert_eq!(profile.family, Some(PackageFamily::Debian));
    }

    #[test]
    fn unknown_distro_without_id_like_is_unsupported() {
        let profile = profile_from_os_release("ID=gentoo\nNAME=Gentoo\n");
        assert_eq!(profile.family, None);
        assert_eq!(profile.update_command(), None);
    }

    #[test]
    fn identify_from_path_returns_fallback_for_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let profile = identify_from_path(&temp.path().join("os-release"));
        assert_eq!(profile, DistroProfile::fallback());
        assert_eq!(profile.id, "linux");
    }

    #[test]
    fn identify_from_path_handles_unparseable_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("os-release");
        fs::write(&path, "garbage without separators\n").unwrap();

        let profile = identify_from_path(&path);
        assert_eq!(profile.id, "linux");
        assert_eq!(profile.update_command(), None);
    }
}
