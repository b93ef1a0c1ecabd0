use std::{env, path::PathBuf};

use crate::{
    APP_DIR_NAME, DEFAULT_ELEVATE_CMD, DEFAULT_OS_RELEASE_PATH, DEFAULT_SHELL, ELEVATE_CMD_ENV,
    OS_RELEASE_ENV, ROOT_ENV, SHELL_ENV, SIMULATE_UPDATE_ENV,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DesktopConfig {
    pub(crate) os_release_path: PathBuf,
    pub(crate) elevation: Vec<String>,
    pub(crate) shell: String,
    pub(crate) simulate_update: bool,
}

impl DesktopConfig {
    pub(crate) fn from_env() -> Result<Self, String> {
        Ok(Self {
            os_release_path: env::var(OS_RELEASE_ENV)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OS_RELEASE_PATH)),
            elevation: parse_elevation_command(env::var(ELEVATE_CMD_ENV).ok().as_deref())?,
            shell: env::var(SHELL_ENV)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_SHELL.to_string()),
            simulate_update: resolve_simulate_update(
                env::var(SIMULATE_UPDATE_ENV).ok().as_deref(),
                cfg!(target_os = "linux"),
            ),
        })
    }
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            os_release_path: PathBuf::from(DEFAULT_OS_RELEASE_PATH),
            elevation: vec![DEFAULT_ELEVATE_CMD.to_string()],
            shell: DEFAULT_SHELL.to_string(),
            simulate_update: !cfg!(target_os = "linux"),
        }
    }
}

/// `None` falls back to `pkexec`; an explicitly empty value disables elevation.
pub(crate) fn parse_elevation_command(raw: Option<&str>) -> Result<Vec<String>, String> {
    let Some(raw) = raw else {
        return Ok(vec![DEFAULT_ELEVATE_CMD.to_string()]);
    };
    shlex::split(raw.trim()).ok_or_else(|| format!("Invalid {ELEVATE_CMD_ENV}: {raw}"))
}

pub(crate) fn resolve_simulate_update(raw: Option<&str>, linux_host: bool) -> bool {
    match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
        Some("1" | "true" | "yes") => true,
        Some("0" | "false" | "no") => false,
        _ => !linux_host,
    }
}

pub(crate) fn default_state_root_dir() -> Option<PathBuf> {
    if let Ok(root) = env::var(ROOT_ENV) {
        let path = PathBuf::from(root.trim());
        if !path.as_os_str().is_empty() {
            return Some(path);
        }
    }

    dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_elevation_command_defaults_to_pkexec() {
        assert_eq!(parse_elevation_command(None).unwrap(), vec!["pkexec"]);
    }

    #[test]
    fn parse_elevation_command_splits_quoted_arguments() {
        assert_eq!(
            parse_elevation_command(Some("sudo -A --prompt 'Ro Start'")).unwrap(),
            vec!["sudo", "-A", "--prompt", "Ro Start"]
        );
    }

    #[test]
    fn parse_elevation_command_allows_disabling_elevation() {
        assert!(parse_elevation_command(Some("  ")).unwrap().is_empty());
    }

    #[test]
    fn parse_elevation_command_rejects_unbalanced_quotes() {
        assert!(parse_elevation_command(Some("sudo 'oops")).is_err());
    }

    #[test]
    fn resolve_simulate_update_follows_host_unless_overridden() {
        assert!(!resolve_simulate_update(None, true));
        assert!(resolve_simulate_update(None, false));
        assert!(resolve_simulate_update(Some("TRUE"), true));
        assert!(!resolve_simulate_update(Some("0"), false));
        assert!(!resolve_simulate_update(Some("maybe"), true));
    }
}
