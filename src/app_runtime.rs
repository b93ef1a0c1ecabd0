use std::sync::Arc;

use tauri::{webview::PageLoadEvent, Manager, RunEvent, WindowEvent};

use crate::{
    app_config::{self, DesktopConfig},
    append_desktop_log, append_startup_log, main_window, shell_locale, startup_data, ui_events,
    update_orchestrator::UpdateOrchestrator,
    update_session::UpdateLogPayload,
    ShutdownState, StartupDataState, DEFAULT_SHELL_LOCALE, DESKTOP_LOG_FILE, MAIN_WINDOW_LABEL,
    SYSTEM_UPDATE_LOG_EVENT,
};

fn load_config() -> DesktopConfig {
    match DesktopConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            append_startup_log(&format!("invalid desktop configuration, using defaults: {error}"));
            DesktopConfig::default()
        }
    }
}

pub(crate) fn run() {
    let state_root_dir = app_config::default_state_root_dir();
    append_startup_log("desktop process starting");
    append_startup_log(&format!(
        "desktop log path: {}",
        crate::logging::resolve_desktop_log_path(state_root_dir.clone(), DESKTOP_LOG_FILE)
            .display()
    ));

    let config = load_config();
    append_startup_log(&format!(
        "update config: os_release={} elevation={:?} shell={} simulate={}",
        config.os_release_path.display(),
        config.elevation,
        config.shell,
        config.simulate_update
    ));

    let window_title =
        shell_locale::current_shell_texts(DEFAULT_SHELL_LOCALE, state_root_dir).window_title;
    let os_release_path = config.os_release_path.clone();

    tauri::Builder::default()
        .manage(Arc::new(UpdateOrchestrator::new(&config)))
        .manage(StartupDataState::default())
        .manage(ShutdownState::default())
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::desktop_bridge_is_desktop_runtime,
            crate::desktop_bridge_commands::desktop_bridge_start_system_update,
            crate::desktop_bridge_commands::desktop_bridge_get_update_state,
            crate::desktop_bridge_commands::desktop_bridge_set_autostart,
            crate::desktop_bridge_commands::desktop_bridge_launch_driver_manager,
            crate::desktop_bridge_commands::desktop_bridge_close_welcome,
            crate::desktop_bridge_commands::desktop_bridge_install_apps,
            crate::desktop_bridge_commands::desktop_bridge_open_external_url,
            crate::desktop_bridge_commands::desktop_bridge_set_shell_locale,
        ])
        .on_window_event(|window, event| {
            if window.label() != MAIN_WINDOW_LABEL {
                return;
            }

            if let WindowEvent::CloseRequested { api, .. } = event {
                let app_handle = window.app_handle();
                let orchestrator = app_handle.state::<Arc<UpdateOrchestrator>>();
                let shutdown = app_handle.state::<ShutdownState>();
                let decision = main_window::request_close(
                    &shutdown,
                    || orchestrator.is_updating(),
                    || {
                        let texts = shell_locale::current_shell_texts(
                            DEFAULT_SHELL_LOCALE,
                            app_config::default_state_root_dir(),
                        );
                        append_desktop_log(texts.close_deferred);
                        ui_events::dispatch_window_event(
                            app_handle,
                            SYSTEM_UPDATE_LOG_EVENT,
                            &UpdateLogPayload {
                                message: texts.close_deferred.to_string(),
                            },
                        );
                    },
                    app_handle,
                );
                match decision {
                    main_window::CloseDecision::Allow => {
                        append_desktop_log("main window closing");
                    }
                    main_window::CloseDecision::DeferUntilUpdateFinishes => api.prevent_close(),
                }
            }
        })
        .on_page_load(|webview, payload| {
            if let PageLoadEvent::Finished = payload.event() {
                append_desktop_log(&format!("page-load finished: {}", payload.url()));
                if webview.label() == MAIN_WINDOW_LABEL {
                    startup_data::handle_page_loaded(webview.app_handle());
                }
            }
        })
        .setup(move |app| {
            let app_handle = app.handle().clone();
            main_window::create_main_window(&app_handle, window_title)?;
            startup_data::spawn_specs_loader(app_handle, os_release_path);
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| {
            if let RunEvent::Exit = event {
                let session = app_handle.state::<Arc<UpdateOrchestrator>>().snapshot();
                append_desktop_log(&format!(
                    "desktop process exiting: update_status={:?} progress={}",
                    session.status, session.progress
                ));
            }
        });
}
