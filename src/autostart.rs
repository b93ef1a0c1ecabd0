use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::AUTOSTART_FILE_NAME;

pub(crate) fn autostart_entry_path(config_dir: &Path) -> PathBuf {
    config_dir.join("autostart").join(AUTOSTART_FILE_NAME)
}

pub(crate) fn default_autostart_entry_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| autostart_entry_path(&dir))
}

pub(crate) fn render_desktop_entry(exec_path: &Path) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name=Ro-Start\n\
         Comment=Welcome Screen\n\
         Exec=\"{}\"\n\
         Icon=utilities-terminal\n\
         Terminal=false\n\
         Categories=Utility;\n\
         X-GNOME-Autostart-enabled=true\n",
        exec_path.display()
    )
}

pub(crate) fn is_autostart_enabled(entry_path: &Path) -> bool {
    entry_path.is_file()
}

pub(crate) fn set_autostart(
    entry_path: &Path,
    enabled: bool,
    exec_path: &Path,
) -> Result<(), String> {
    if !enabled {
        return match fs::remove_file(entry_path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(format!(
                "Failed to remove autostart entry {}: {}",
                entry_path.display(),
                error
            )),
        };
    }

    if let Some(parent_dir) = entry_path.parent() {
        fs::create_dir_all(parent_dir).map_err(|error| {
            format!(
                "Failed to create autostart directory {}: {}",
                parent_dir.display(),
                error
            )
        })?;
    }

    fs::write(entry_path, render_desktop_entry(exec_path)).map_err(|error| {
        format!(
            "Failed to write autostart entry {}: {}",
            entry_path.display(),
            error
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(entry_path, fs::Permissions::from_mode(0o755)).map_err(|error| {
            format!(
                "Failed to mark autostart entry {} executable: {}",
                entry_path.display(),
                error
            )
        })?;
    }

    Ok(())
}

/// Applies the requested autostart state for the current executable and
/// returns the state actually on disk afterwards.
pub(crate) fn apply_autostart(enabled: bool) -> Result<bool, String> {
    let entry_path = default_autostart_entry_path()
        .ok_or_else(|| "User config directory is unavailable.".to_string())?;
    let exec_path = std::env::current_exe()
        .map_err(|error| format!("Failed to resolve current executable: {error}"))?;

    set_autostart(&entry_path, enabled, &exec_path)?;
    Ok(is_autostart_enabled(&entry_path))
}

pub(crate) fn current_autostart_enabled() -> bool {
    default_autostart_entry_path()
        .map(|path| is_autostart_enabled(&path))
        .unwrap_or(false)
}
