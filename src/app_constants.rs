pub(crate) const MAIN_WINDOW_LABEL: &str = "main";
pub(crate) const MAIN_WINDOW_MIN_WIDTH: f64 = 960.0;
pub(crate) const MAIN_WINDOW_MIN_HEIGHT: f64 = 640.0;

pub(crate) const BRIDGE_SCHEME: &str = "app";
pub(crate) const DEFAULT_SHELL_LOCALE: &str = "en";

pub(crate) const DESKTOP_LOG_FILE: &str = "desktop.log";
pub(crate) const DESKTOP_LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub(crate) const DESKTOP_LOG_BACKUPS: usize = 3;
pub(crate) const DESKTOP_STATE_FILE: &str = "desktop_state.json";
pub(crate) const APP_DIR_NAME: &str = "ro-start";

pub(crate) const ROOT_ENV: &str = "RO_START_ROOT";
pub(crate) const OS_RELEASE_ENV: &str = "RO_START_OS_RELEASE";
pub(crate) const ELEVATE_CMD_ENV: &str = "RO_START_ELEVATE_CMD";
pub(crate) const SHELL_ENV: &str = "RO_START_SHELL";
pub(crate) const SIMULATE_UPDATE_ENV: &str = "RO_START_SIMULATE_UPDATE";
pub(crate) const LOCALE_ENV: &str = "RO_START_LOCALE";

pub(crate) const DEFAULT_OS_RELEASE_PATH: &str = "/etc/os-release";
pub(crate) const DEFAULT_ELEVATE_CMD: &str = "pkexec";
pub(crate) const DEFAULT_SHELL: &str = "/bin/sh";

pub(crate) const DRIVER_MANAGER_BIN: &str = "ro-control";
pub(crate) const DRIVER_MANAGER_URL: &str =
    "https://github.com/Acik-Kaynak-Gelistirme-Toplulugu/ro-control";

pub(crate) const AUTOSTART_FILE_NAME: &str = "ro-start.desktop";

pub(crate) const SYSTEM_UPDATE_LOG_EVENT: &str = "system-update-log";
pub(crate) const SYSTEM_UPDATE_STATUS_EVENT: &str = "system-update-status";
pub(crate) const SYSTEM_SPECS_EVENT: &str = "system-specs-update";
pub(crate) const AUTOSTART_STATUS_EVENT: &str = "autostart-status-update";
pub(crate) const THEME_STATUS_EVENT: &str = "theme-status-update";
pub(crate) const LANGUAGE_STATUS_EVENT: &str = "language-status-update";
