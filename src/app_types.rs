use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use serde::Serialize;

use crate::system_specs::SystemSpecs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct BridgeResult {
    pub(crate) ok: bool,
    pub(crate) reason: Option<String>,
}

impl BridgeResult {
    pub(crate) fn ok() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub(crate) fn failed(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
        }
    }
}

impl From<Result<(), String>> for BridgeResult {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(reason) => Self::failed(reason),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AutostartStatusPayload {
    pub(crate) enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ThemeStatusPayload {
    pub(crate) is_dark: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LanguageStatusPayload {
    pub(crate) language: String,
}

#[derive(Debug, Default)]
struct StartupData {
    specs: Option<SystemSpecs>,
    page_loaded: bool,
    injected: bool,
}

/// Joins the background specs lookup with page loads: startup data is pushed
/// once both are available, and again after every later page load.
#[derive(Debug, Default)]
pub(crate) struct StartupDataState {
    inner: Mutex<StartupData>,
}

impl StartupDataState {
    fn take_ready(data: &mut StartupData) -> Option<SystemSpecs> {
        if !data.page_loaded || data.injected {
            return None;
        }
        let specs = data.specs.clone()?;
        data.injected = true;
        Some(specs)
    }

    pub(crate) fn record_specs(&self, specs: SystemSpecs) -> Option<SystemSpecs> {
        let mut data = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        data.specs = Some(specs);
        Self::take_ready(&mut data)
    }

    pub(crate) fn record_page_loaded(&self) -> Option<SystemSpecs> {
        let mut data = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        data.page_loaded = true;
        data.injected = false;
        Self::take_ready(&mut data)
    }
}

#[derive(Debug, Default)]
pub(crate) struct ShutdownState {
    close_deferred: AtomicBool,
}

impl ShutdownState {
    /// Returns true only for the request that first deferred the close.
    pub(crate) fn defer_close(&self) -> bool {
        !self.close_deferred.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn take_deferred_close(&self) -> bool {
        self.close_deferred.swap(false, Ordering::AcqRel)
    }
}
