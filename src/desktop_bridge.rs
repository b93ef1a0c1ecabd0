use std::sync::Arc;

use tauri::{AppHandle, Manager};
use url::Url;

use crate::{
    append_bridge_log, append_desktop_log, autostart, driver_manager, main_window, ui_events,
    update_orchestrator::UpdateOrchestrator, AutostartStatusPayload, BridgeResult,
    AUTOSTART_STATUS_EVENT, BRIDGE_SCHEME,
};

pub const ACTION_LAUNCH_DRIVER_MANAGER: &str = "launch-driver-manager";
pub const ACTION_CLOSE_WELCOME: &str = "close-welcome";
pub const ACTION_INSTALL_APPS: &str = "install-apps";
pub const ACTION_SET_AUTOSTART: &str = "set-autostart";
pub const ACTION_START_SYSTEM_UPDATE: &str = "start-system-update";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeAction {
    LaunchDriverManager,
    CloseWelcome,
    InstallApps(Vec<String>),
    SetAutostart(bool),
    StartSystemUpdate,
}

fn query_value(query: Option<&str>, key: &str) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}

pub fn action_from_name(name: &str, query: Option<&str>) -> Option<BridgeAction> {
    match name {
        ACTION_LAUNCH_DRIVER_MANAGER => Some(BridgeAction::LaunchDriverManager),
        ACTION_CLOSE_WELCOME => Some(BridgeAction::CloseWelcome),
        ACTION_INSTALL_APPS => Some(BridgeAction::InstallApps(
            query_value(query, "apps")
                .map(|apps| {
                    apps.split(',')
                        .map(str::trim)
                        .filter(|app| !app.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        )),
        ACTION_SET_AUTOSTART => Some(BridgeAction::SetAutostart(
            query_value(query, "enabled")
                .map(|value| value.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        )),
        ACTION_START_SYSTEM_UPDATE => Some(BridgeAction::StartSystemUpdate),
        _ => None,
    }
}

pub fn is_bridge_url(url: &Url) -> bool {
    url.scheme() == BRIDGE_SCHEME
}

pub fn action_from_url(url: &Url) -> Option<BridgeAction> {
    if !is_bridge_url(url) {
        return None;
    }
    action_from_name(url.host_str()?, url.query())
}

/// Navigation hook for the main webview. Bridge URLs are consumed (the
/// navigation is cancelled) and their action runs on a blocking worker.
pub(crate) fn handle_navigation(app_handle: &AppHandle, url: &Url) -> bool {
    if !is_bridge_url(url) {
        return true;
    }

    append_bridge_log(&format!(
        "intercepted bridge request: {} query={}",
        url.host_str().unwrap_or_default(),
        url.query().unwrap_or_default()
    ));
    let Some(action) = action_from_url(url) else {
        append_bridge_log(&format!("ignoring unknown bridge request: {url}"));
        return false;
    };

    let app_handle = app_handle.clone();
    tauri::async_runtime::spawn_blocking(move || {
        let result = dispatch_bridge_action(&app_handle, action);
        if let Some(reason) = result.reason {
            append_bridge_log(&format!(
                "bridge action finished: ok={} reason={reason}",
                result.ok
            ));
        }
    });
    false
}

/// Runs one bridge action. May block on OS calls; never call it from the
/// main thread.
pub(crate) fn dispatch_bridge_action(
    app_handle: &AppHandle,
    action: BridgeAction,
) -> BridgeResult {
    match action {
        BridgeAction::LaunchDriverManager => match driver_manager::launch_driver_manager() {
            Ok(launch) => {
                append_bridge_log(&format!("driver manager opened via {launch:?}"));
                BridgeResult::ok()
            }
            Err(error) => {
                append_bridge_log(&format!("failed to open driver manager: {error}"));
                BridgeResult::failed(error)
            }
        },
        BridgeAction::CloseWelcome => {
            append_bridge_log("closing welcome window");
            main_window::close_main_window(app_handle, append_desktop_log);
            BridgeResult::ok()
        }
        BridgeAction::InstallApps(apps) => {
            append_bridge_log(&format!("install apps requested: {}", apps.join(", ")));
            BridgeResult::failed("Installing applications is not supported.")
        }
        BridgeAction::SetAutostart(enabled) => {
            append_bridge_log(&format!("setting autostart to: {enabled}"));
            let result = autostart::apply_autostart(enabled);
            let effective = match &result {
                Ok(effective) => *effective,
                Err(error) => {
                    append_bridge_log(&format!("failed to update autostart: {error}"));
                    autostart::current_autostart_enabled()
                }
            };
            ui_events::dispatch_window_event(
                app_handle,
                AUTOSTART_STATUS_EVENT,
                &AutostartStatusPayload { enabled: effective },
            );
            BridgeResult::from(result.map(|_| ()))
        }
        BridgeAction::StartSystemUpdate => start_system_update(app_handle),
    }
}

pub(crate) fn start_system_update(app_handle: &AppHandle) -> BridgeResult {
    let Some(orchestrator) = app_handle.try_state::<Arc<UpdateOrchestrator>>() else {
        return BridgeResult::failed("Update orchestrator is not initialized.");
    };
    let orchestrator = orchestrator.inner();

    let sink = Arc::new(ui_events::WebviewUpdateSink::new(app_handle.clone()));
    if orchestrator.start(sink).is_some() {
        return BridgeResult::ok();
    }
    if orchestrator.is_updating() {
        BridgeResult::failed("System update already in progress.")
    } else {
        BridgeResult::failed("System update could not be started.")
    }
}
