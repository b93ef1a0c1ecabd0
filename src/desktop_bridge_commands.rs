use std::sync::Arc;

use tauri::{AppHandle, Manager};

use crate::{
    app_config, append_bridge_log, append_desktop_log,
    desktop_bridge::{self, BridgeAction},
    external_url, shell_locale, ui_events,
    update_orchestrator::UpdateOrchestrator,
    update_session::UpdateSession,
    BridgeResult, LanguageStatusPayload, DEFAULT_SHELL_LOCALE, LANGUAGE_STATUS_EVENT,
};

/// Runs OS-touching bridge work on a blocking worker; sync commands would
/// otherwise execute on the main thread.
async fn run_off_main_thread<F>(task: F) -> BridgeResult
where
    F: FnOnce() -> BridgeResult + Send + 'static,
{
    match tauri::async_runtime::spawn_blocking(task).await {
        Ok(result) => result,
        Err(error) => {
            let reason = format!("Bridge action task failed: {error}");
            append_bridge_log(&reason);
            BridgeResult::failed(reason)
        }
    }
}

async fn dispatch_off_main_thread(app_handle: AppHandle, action: BridgeAction) -> BridgeResult {
    run_off_main_thread(move || desktop_bridge::dispatch_bridge_action(&app_handle, action)).await
}

#[tauri::command]
pub(crate) fn desktop_bridge_is_desktop_runtime() -> bool {
    true
}

#[tauri::command]
pub(crate) fn desktop_bridge_start_system_update(app_handle: AppHandle) -> BridgeResult {
    desktop_bridge::start_system_update(&app_handle)
}

#[tauri::command]
pub(crate) fn desktop_bridge_get_update_state(app_handle: AppHandle) -> UpdateSession {
    app_handle
        .try_state::<Arc<UpdateOrchestrator>>()
        .map(|orchestrator| orchestrator.snapshot())
        .unwrap_or_default()
}

#[tauri::command]
pub(crate) async fn desktop_bridge_set_autostart(
    app_handle: AppHandle,
    enabled: bool,
) -> BridgeResult {
    dispatch_off_main_thread(app_handle, BridgeAction::SetAutostart(enabled)).await
}

#[tauri::command]
pub(crate) async fn desktop_bridge_launch_driver_manager(app_handle: AppHandle) -> BridgeResult {
    dispatch_off_main_thread(app_handle, BridgeAction::LaunchDriverManager).await
}

#[tauri::command]
pub(crate) fn desktop_bridge_close_welcome(app_handle: AppHandle) -> BridgeResult {
    desktop_bridge::dispatch_bridge_action(&app_handle, BridgeAction::CloseWelcome)
}

#[tauri::command]
pub(crate) fn desktop_bridge_install_apps(
    app_handle: AppHandle,
    apps: Vec<String>,
) -> BridgeResult {
    desktop_bridge::dispatch_bridge_action(&app_handle, BridgeAction::InstallApps(apps))
}

#[tauri::command]
pub(crate) async fn desktop_bridge_open_external_url(url: String) -> BridgeResult {
    run_off_main_thread(move || match external_url::open_external_url(&url) {
        Ok(()) => BridgeResult::ok(),
        Err(error) => {
            append_bridge_log(&format!("failed to open external url: {error}"));
            BridgeResult::failed(error)
        }
    })
    .await
}

fn persist_shell_locale(app_handle: &AppHandle, locale: Option<&str>) -> BridgeResult {
    let state_root_dir = app_config::default_state_root_dir();
    match shell_locale::write_cached_shell_locale(locale, state_root_dir.as_deref()) {
        Ok(()) => {
            let language = locale
                .and_then(shell_locale::normalize_shell_locale)
                .unwrap_or(DEFAULT_SHELL_LOCALE);
            ui_events::dispatch_window_event(
                app_handle,
                LANGUAGE_STATUS_EVENT,
                &LanguageStatusPayload {
                    language: language.to_string(),
                },
            );
            BridgeResult::ok()
        }
        Err(error) => {
            append_desktop_log(&format!("failed to persist shell locale: {error}"));
            BridgeResult::failed(error)
        }
    }
}

#[tauri::command]
pub(crate) async fn desktop_bridge_set_shell_locale(
    app_handle: AppHandle,
    locale: Option<String>,
) -> BridgeResult {
    run_off_main_thread(move || persist_shell_locale(&app_handle, locale.as_deref())).await
}
