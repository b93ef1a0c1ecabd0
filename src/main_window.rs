use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};

use crate::{
    append_desktop_log, desktop_bridge, ui_dispatch, ShutdownState, MAIN_WINDOW_LABEL,
    MAIN_WINDOW_MIN_HEIGHT, MAIN_WINDOW_MIN_WIDTH,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CloseDecision {
    Allow,
    DeferUntilUpdateFinishes,
}

pub(crate) fn decide_close(update_in_progress: bool) -> CloseDecision {
    if update_in_progress {
        CloseDecision::DeferUntilUpdateFinishes
    } else {
        CloseDecision::Allow
    }
}

pub(crate) trait AppExit {
    fn exit_app(&self);
}

impl AppExit for AppHandle {
    fn exit_app(&self) {
        if let Err(error) =
            ui_dispatch::run_on_main_thread_dispatch(self, "deferred exit", |main_app| {
                main_app.exit(0)
            })
        {
            append_desktop_log(&error);
        }
    }
}

/// Handles a close request on the main window. While an update runs the close
/// is deferred, `notify_deferred` runs once, and the app exits as soon as the
/// session is over, including when it ended during the deferral itself.
pub(crate) fn request_close<U, N>(
    shutdown: &ShutdownState,
    update_in_progress: U,
    notify_deferred: N,
    app: &dyn AppExit,
) -> CloseDecision
where
    U: Fn() -> bool,
    N: FnOnce(),
{
    let decision = decide_close(update_in_progress());
    if decision == CloseDecision::DeferUntilUpdateFinishes {
        if shutdown.defer_close() {
            notify_deferred();
        }
        if !update_in_progress() {
            complete_deferred_close(shutdown, app);
        }
    }
    decision
}

/// Exits the app if a close was deferred. Called once a session reaches a
/// terminal status.
pub(crate) fn complete_deferred_close(shutdown: &ShutdownState, app: &dyn AppExit) -> bool {
    if !shutdown.take_deferred_close() {
        return false;
    }
    append_desktop_log("system update finished; completing deferred window close");
    app.exit_app();
    true
}

pub(crate) fn create_main_window(
    app_handle: &AppHandle,
    title: &str,
) -> tauri::Result<WebviewWindow> {
    let navigation_handle = app_handle.clone();
    WebviewWindowBuilder::new(
        app_handle,
        MAIN_WINDOW_LABEL,
        WebviewUrl::App("index.html".into()),
    )
    .title(title)
    .inner_size(MAIN_WINDOW_MIN_WIDTH, MAIN_WINDOW_MIN_HEIGHT)
    .min_inner_size(MAIN_WINDOW_MIN_WIDTH, MAIN_WINDOW_MIN_HEIGHT)
    .center()
    .on_navigation(move |url| desktop_bridge::handle_navigation(&navigation_handle, url))
    .build()
}

pub(crate) fn close_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str) + Send + 'static,
{
    let task_app = app_handle.clone();
    if let Err(error) = app_handle.run_on_main_thread(move || {
        let Some(window) = task_app.get_webview_window(MAIN_WINDOW_LABEL) else {
            log("close_main_window skipped: main window not found");
            return;
        };
        if let Err(error) = window.close() {
            log(&format!("failed to close main window: {error}"));
        }
    }) {
        append_desktop_log(&format!("failed to schedule main window close: {error}"));
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::Cell,
        fs,
        path::PathBuf,
        sync::{
            atomic::{AtomicUsize, Ordering},
            mpsc::{self, Receiver, Sender},
            Arc, Mutex,
        },
        thread,
        time::Duration,
    };

    use super::*;
    use crate::{
        privileged_runner::{CommandRunner, RunnerMessage},
        update_error::UpdateError,
        update_orchestrator::UpdateOrchestrator,
        update_session::{UpdateEvent, UpdateEventSink, UpdateStatus},
    };

    #[derive(Default)]
    struct RecordingExit {
        exits: AtomicUsize,
    }

    impl RecordingExit {
        fn count(&self) -> usize {
            self.exits.load(Ordering::SeqCst)
        }
    }

    impl AppExit for RecordingExit {
        fn exit_app(&self) {
            self.exits.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Mirrors the webview sink: a terminal status completes a deferred close.
    struct ExitOnTerminalSink {
        shutdown: Arc<ShutdownState>,
        app: Arc<RecordingExit>,
    }

    impl UpdateEventSink for ExitOnTerminalSink {
        fn emit(&self, event: UpdateEvent) {
            if let UpdateEvent::Status(payload) = event {
                if payload.status.is_terminal() {
                    complete_deferred_close(&self.shutdown, self.app.as_ref());
                }
            }
        }
    }

    #[derive(Default)]
    struct HeldRunner {
        sender: Mutex<Option<Sender<RunnerMessage>>>,
    }

    impl CommandRunner for HeldRunner {
        fn run(&self, _command: &str) -> Result<Receiver<RunnerMessage>, UpdateError> {
            let (tx, rx) = mpsc::channel();
            *self.sender.lock().unwrap() = Some(tx);
            Ok(rx)
        }
    }

    fn no_sleep(_: Duration) {}

    fn debian_os_release(temp: &tempfile::TempDir) -> PathBuf {
        let path = temp.path().join("os-release");
        fs::write(&path, "ID=debian\nVERSION_ID=12\n").unwrap();
        path
    }

    #[test]
    fn decide_close_defers_while_update_in_progress() {
        assert_eq!(decide_close(true), CloseDecision::DeferUntilUpdateFinishes);
    }

    #[test]
    fn decide_close_allows_when_idle() {
        assert_eq!(decide_close(false), CloseDecision::Allow);
    }

    #[test]
    fn request_close_when_idle_neither_defers_nor_exits() {
        let shutdown = ShutdownState::default();
        let app = RecordingExit::default();
        let notified = Cell::new(false);

        let decision = request_close(&shutdown, || false, || notified.set(true), &app);

        assert_eq!(decision, CloseDecision::Allow);
        assert!(!notified.get());
        assert_eq!(app.count(), 0);
        assert!(!complete_deferred_close(&shutdown, &app));
    }

    #[test]
    fn request_close_during_update_waits_for_terminal_status() {
        let shutdown = ShutdownState::default();
        let app = RecordingExit::default();
        let notices = Cell::new(0);

        let notify = || notices.set(notices.get() + 1);
        let decision = request_close(&shutdown, || true, notify, &app);
        assert_eq!(decision, CloseDecision::DeferUntilUpdateFinishes);
        request_close(&shutdown, || true, notify, &app);

        assert_eq!(notices.get(), 1);
        assert_eq!(app.count(), 0);

        assert!(complete_deferred_close(&shutdown, &app));
        assert!(!complete_deferred_close(&shutdown, &app));
        assert_eq!(app.count(), 1);
    }

    #[test]
    fn request_close_exits_when_session_ends_during_deferral() {
        let shutdown = ShutdownState::default();
        let app = RecordingExit::default();
        let checks = Cell::new(0);
        let updating = || {
            checks.set(checks.get() + 1);
            checks.get() == 1
        };

        let decision = request_close(&shutdown, updating, || {}, &app);

        assert_eq!(decision, CloseDecision::DeferUntilUpdateFinishes);
        assert_eq!(app.count(), 1);
        assert!(!complete_deferred_close(&shutdown, &app));
    }

    #[test]
    fn deferred_close_exits_once_when_running_session_completes() {
        let temp = tempfile::TempDir::new().unwrap();
        let runner = Arc::new(HeldRunner::default());
        let orchestrator = Arc::new(UpdateOrchestrator::with_runner(
            debian_os_release(&temp),
            false,
            runner.clone(),
            no_sleep,
        ));
        let shutdown = Arc::new(ShutdownState::default());
        let app = Arc::new(RecordingExit::default());
        let sink = Arc::new(ExitOnTerminalSink {
            shutdown: shutdown.clone(),
            app: app.clone(),
        });

        let worker = orchestrator.start(sink).expect("session should start");
        while runner.sender.lock().unwrap().is_none() {
            thread::sleep(Duration::from_millis(5));
        }

        let decision = request_close(
            &shutdown,
            || orchestrator.is_updating(),
            || {},
            app.as_ref(),
        );
        assert_eq!(decision, CloseDecision::DeferUntilUpdateFinishes);
        assert_eq!(app.count(), 0);

        let sender = runner.sender.lock().unwrap().take().unwrap();
        sender
            .send(RunnerMessage::Line("Reading package lists... Done".to_string()))
            .unwrap();
        sender.send(RunnerMessage::Exited(Some(0))).unwrap();
        worker.join().unwrap();

        assert_eq!(orchestrator.snapshot().status, UpdateStatus::Completed);
        assert_eq!(app.count(), 1);
    }
}
