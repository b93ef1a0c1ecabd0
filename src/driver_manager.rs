use std::process::{Command, Stdio};

use crate::{external_url, DRIVER_MANAGER_BIN, DRIVER_MANAGER_URL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DriverManagerLaunch {
    Binary,
    ProjectPage,
}

pub(crate) fn decide_driver_manager_launch(
    linux_host: bool,
    binary_available: bool,
) -> DriverManagerLaunch {
    if linux_host && binary_available {
        DriverManagerLaunch::Binary
    } else {
        DriverManagerLaunch::ProjectPage
    }
}

/// Starts the driver manager when installed, otherwise sends the user to its
/// project page.
pub(crate) fn launch_driver_manager() -> Result<DriverManagerLaunch, String> {
    let binary = which::which(DRIVER_MANAGER_BIN).ok();
    match decide_driver_manager_launch(cfg!(target_os = "linux"), binary.is_some()) {
        DriverManagerLaunch::Binary => {
            let binary =
                binary.ok_or_else(|| format!("{DRIVER_MANAGER_BIN} disappeared from PATH"))?;
            Command::new(&binary)
                .stdin(Stdio::null())
                .spawn()
                .map_err(|error| format!("Failed to run '{}': {error}", binary.display()))?;
            Ok(DriverManagerLaunch::Binary)
        }
        DriverManagerLaunch::ProjectPage => {
            external_url::open_external_url(DRIVER_MANAGER_URL)?;
            Ok(DriverManagerLaunch::ProjectPage)
        }
    }
}
