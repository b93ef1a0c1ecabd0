#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_config;
mod app_constants;
mod app_runtime;
mod app_types;
mod autostart;
mod desktop_bridge;
mod desktop_bridge_commands;
mod distro;
mod driver_manager;
mod external_url;
mod logging;
mod main_window;
mod privileged_runner;
mod shell_locale;
mod simulated_update;
mod startup_data;
mod system_specs;
mod ui_dispatch;
mod ui_events;
mod update_error;
mod update_orchestrator;
mod update_session;

pub(crate) use app_constants::*;
pub(crate) use app_types::{
    AutostartStatusPayload, BridgeResult, LanguageStatusPayload, ShutdownState, StartupDataState,
    ThemeStatusPayload,
};
pub(crate) use logging::{
    append_bridge_log, append_desktop_log, append_startup_log, append_update_log,
};

fn main() {
    app_runtime::run();
}
