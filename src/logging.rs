use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::Local;

// Update workers, output readers and bridge tasks all log concurrently.
static LOG_WRITE_LOCK: Mutex<()> = Mutex::new(());

pub(crate) fn resolve_desktop_log_path(root_dir: Option<PathBuf>, file_name: &str) -> PathBuf {
    match root_dir {
        Some(root) => root.join("logs").join(file_name),
        None => std::env::temp_dir().join(crate::APP_DIR_NAME).join(file_name),
    }
}

pub(crate) fn format_log_line(scope: &str, message: &str) -> String {
    format!(
        "[{}] [{}] {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        scope,
        message
    )
}

fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(format!(".{index}"));
    PathBuf::from(raw)
}

/// Shifts `desktop.log` to `desktop.log.1` (and older backups up by one) once
/// the live file has grown past `max_bytes`. The oldest backup is dropped.
pub(crate) fn rotate_if_needed(
    path: &Path,
    max_bytes: u64,
    backups: usize,
) -> std::io::Result<()> {
    let size = match fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(error) => return Err(error),
    };
    if size <= max_bytes {
        return Ok(());
    }

    if backups == 0 {
        return fs::remove_file(path);
    }

    let oldest = backup_path(path, backups);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for index in (1..backups).rev() {
        let from = backup_path(path, index);
        if from.exists() {
            fs::rename(&from, backup_path(path, index + 1))?;
        }
    }
    fs::rename(path, backup_path(path, 1))
}

pub(crate) fn append_log_line(path: &Path, line: &str) -> std::io::Result<()> {
    append_log_line_with_limits(
        path,
        line,
        crate::DESKTOP_LOG_MAX_BYTES,
        crate::DESKTOP_LOG_BACKUPS,
    )
}

/// Rotation and the append run under one process-wide lock so concurrent
/// writers never rotate the same file twice.
fn append_log_line_with_limits(
    path: &Path,
    line: &str,
    max_bytes: u64,
    backups: usize,
) -> std::io::Result<()> {
    let _guard = LOG_WRITE_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    rotate_if_needed(path, max_bytes, backups)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}

fn append_scoped_log(scope: &str, message: &str) {
    let line = format_log_line(scope, message);
    eprint!("{line}");

    let path = resolve_desktop_log_path(
        crate::app_config::default_state_root_dir(),
        crate::DESKTOP_LOG_FILE,
    );
    if let Err(error) = append_log_line(&path, &line) {
        eprintln!("failed to write desktop log {}: {error}", path.display());
    }
}

pub(crate) fn append_desktop_log(message: &str) {
    append_scoped_log("desktop", message);
}

pub(crate) fn append_startup_log(message: &str) {
    append_scoped_log("startup", message);
}

pub(crate) fn append_update_log(message: &str) {
    append_scoped_log("update", message);
}

pub(crate) fn append_bridge_log(message: &str) {
    append_scoped_log("bridge", message);
}
