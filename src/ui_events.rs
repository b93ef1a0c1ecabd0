use serde::Serialize;
use tauri::{AppHandle, Manager};

use crate::{
    append_desktop_log, main_window, ui_dispatch,
    update_session::{UpdateEvent, UpdateEventSink},
    ShutdownState, MAIN_WINDOW_LABEL, SYSTEM_UPDATE_LOG_EVENT, SYSTEM_UPDATE_STATUS_EVENT,
};

pub(crate) fn build_window_event_script<T: Serialize>(
    event_name: &str,
    detail: &T,
) -> Result<String, String> {
    let name = serde_json::to_string(event_name)
        .map_err(|error| format!("Failed to serialize event name {event_name}: {error}"))?;
    let detail = serde_json::to_string(detail)
        .map_err(|error| format!("Failed to serialize {event_name} payload: {error}"))?;
    Ok(format!(
        "window.dispatchEvent(new CustomEvent({name}, {{ detail: {detail} }}));"
    ))
}

/// Fires a DOM `CustomEvent` on the main webview. Safe to call from any
/// thread; evaluation happens on the main thread.
pub(crate) fn dispatch_window_event<T: Serialize>(
    app_handle: &AppHandle,
    event_name: &'static str,
    detail: &T,
) {
    let script = match build_window_event_script(event_name, detail) {
        Ok(script) => script,
        Err(error) => {
            append_desktop_log(&error);
            return;
        }
    };

    if let Err(error) =
        ui_dispatch::run_on_main_thread_dispatch(app_handle, event_name, move |main_app| {
            let Some(window) = main_app.get_webview_window(MAIN_WINDOW_LABEL) else {
                append_desktop_log(&format!("{event_name} dropped: main window not found"));
                return;
            };
            if let Err(error) = window.eval(&script) {
                append_desktop_log(&format!("failed to deliver {event_name}: {error}"));
            }
        })
    {
        append_desktop_log(&error);
    }
}

pub(crate) struct WebviewUpdateSink {
    app_handle: AppHandle,
}

impl WebviewUpdateSink {
    pub(crate) fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

impl UpdateEventSink for WebviewUpdateSink {
    fn emit(&self, event: UpdateEvent) {
        match event {
            UpdateEvent::Log(payload) => {
                dispatch_window_event(&self.app_handle, SYSTEM_UPDATE_LOG_EVENT, &payload)
            }
            UpdateEvent::Status(payload) => {
                dispatch_window_event(&self.app_handle, SYSTEM_UPDATE_STATUS_EVENT, &payload);
                if payload.status.is_terminal() {
                    exit_if_close_deferred(&self.app_handle);
                }
            }
        }
    }
}

pub(crate) fn exit_if_close_deferred(app_handle: &AppHandle) {
    if let Some(shutdown) = app_handle.try_state::<ShutdownState>() {
        main_window::complete_deferred_close(&shutdown, app_handle);
    }
}
