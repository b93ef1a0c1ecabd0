use std::{path::PathBuf, thread};

use tauri::{AppHandle, Manager, Theme};

use crate::{
    app_config, append_startup_log, autostart, shell_locale,
    system_specs::{self, SystemSpecs},
    ui_events, AutostartStatusPayload, LanguageStatusPayload, StartupDataState,
    ThemeStatusPayload, AUTOSTART_STATUS_EVENT, DEFAULT_SHELL_LOCALE, LANGUAGE_STATUS_EVENT,
    MAIN_WINDOW_LABEL, SYSTEM_SPECS_EVENT, THEME_STATUS_EVENT,
};

pub(crate) fn spawn_specs_loader(app_handle: AppHandle, os_release_path: PathBuf) {
    let spawn_result = thread::Builder::new()
        .name("system-specs".to_string())
        .spawn(move || {
            let specs = system_specs::collect_system_specs(&os_release_path);
            append_startup_log(&format!(
                "system specs loaded: distro={} version={} cpu={}",
                specs.distro_id, specs.version, specs.cpu
            ));
            let state = app_handle.state::<StartupDataState>();
            if let Some(specs) = state.record_specs(specs) {
                inject_startup_data(&app_handle, specs);
            }
        });

    if let Err(error) = spawn_result {
        append_startup_log(&format!("failed to spawn system specs loader: {error}"));
    }
}

pub(crate) fn handle_page_loaded(app_handle: &AppHandle) {
    let state = app_handle.state::<StartupDataState>();
    if let Some(specs) = state.record_page_loaded() {
        inject_startup_data(app_handle, specs);
    }
}

fn current_theme_is_dark(app_handle: &AppHandle) -> bool {
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        return false;
    };
    match window.theme() {
        Ok(theme) => theme == Theme::Dark,
        Err(error) => {
            append_startup_log(&format!("failed to read window theme: {error}"));
            false
        }
    }
}

/// Pushes specs, autostart, theme, and language to the page. Filesystem and
/// window queries happen on a blocking worker.
pub(crate) fn inject_startup_data(app_handle: &AppHandle, specs: SystemSpecs) {
    let app_handle = app_handle.clone();
    tauri::async_runtime::spawn_blocking(move || {
        append_startup_log("injecting startup data into main window");
        ui_events::dispatch_window_event(&app_handle, SYSTEM_SPECS_EVENT, &specs);
        ui_events::dispatch_window_event(
            &app_handle,
            AUTOSTART_STATUS_EVENT,
            &AutostartStatusPayload {
                enabled: autostart::current_autostart_enabled(),
            },
        );
        ui_events::dispatch_window_event(
            &app_handle,
            THEME_STATUS_EVENT,
            &ThemeStatusPayload {
                is_dark: current_theme_is_dark(&app_handle),
            },
        );
        let language = shell_locale::resolve_shell_locale(
            DEFAULT_SHELL_LOCALE,
            app_config::default_state_root_dir(),
        );
        ui_events::dispatch_window_event(
            &app_handle,
            LANGUAGE_STATUS_EVENT,
            &LanguageStatusPayload {
                language: language.to_string(),
            },
        );
    });
}
