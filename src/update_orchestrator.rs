use std::{
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard},
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::{
    app_config::DesktopConfig,
    distro,
    privileged_runner::{CommandRunner, PrivilegedRunner, RunnerMessage},
    simulated_update::{
        simulated_line_delay, simulated_progress, PRIVILEGE_PROMPT_DELAY, SIMULATED_UPDATE_LINES,
    },
    update_error::UpdateError,
    update_session::{UpdateEvent, UpdateEventSink, UpdateSession, UpdateStatus},
};

pub(crate) const STARTING_MESSAGE: &str = "Starting system update...";
pub(crate) const REQUESTING_PRIVILEGES_MESSAGE: &str = "Requesting privileges...";
pub(crate) const COMPLETED_MESSAGE: &str = "System update completed successfully!";
pub(crate) const DUPLICATE_REQUEST_MESSAGE: &str =
    "System update already in progress; ignoring duplicate request.";

const COMMAND_STARTED_PERCENT: u8 = 10;
// Package managers do not report comparable progress, so every live output
// line reports the same midpoint.
const LIVE_LINE_PERCENT: u8 = 50;

pub(crate) struct UpdateOrchestrator {
    session: Mutex<UpdateSession>,
    os_release_path: PathBuf,
    simulate: bool,
    runner: Arc<dyn CommandRunner>,
    sleep: fn(Duration),
}

impl UpdateOrchestrator {
    pub(crate) fn new(config: &DesktopConfig) -> Self {
        Self::with_runner(
            config.os_release_path.clone(),
            config.simulate_update,
            Arc::new(PrivilegedRunner::new(
                config.elevation.clone(),
                config.shell.clone(),
            )),
            thread::sleep,
        )
    }

    pub(crate) fn with_runner(
        os_release_path: PathBuf,
        simulate: bool,
        runner: Arc<dyn CommandRunner>,
        sleep: fn(Duration),
    ) -> Self {
        Self {
            session: Mutex::new(UpdateSession::default()),
            os_release_path,
            simulate,
            runner,
            sleep,
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, UpdateSession> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn snapshot(&self) -> UpdateSession {
        self.lock_session().clone()
    }

    pub(crate) fn is_updating(&self) -> bool {
        self.lock_session().status == UpdateStatus::Updating
    }

    /// Starts a new session on a background thread. Returns `None` when a
    /// session is already running; the request is logged into that session.
    pub(crate) fn start(
        self: &Arc<Self>,
        sink: Arc<dyn UpdateEventSink>,
    ) -> Option<JoinHandle<()>> {
        {
            let mut session = self.lock_session();
            if session.status == UpdateStatus::Updating {
                session.push_log(DUPLICATE_REQUEST_MESSAGE);
                drop(session);
                crate::append_update_log(DUPLICATE_REQUEST_MESSAGE);
                sink.emit(UpdateEvent::log(DUPLICATE_REQUEST_MESSAGE));
                return None;
            }
            *session = UpdateSession::started();
        }

        let orchestrator = Arc::clone(self);
        let worker_sink = Arc::clone(&sink);
        match thread::Builder::new()
            .name("system-update".to_string())
            .spawn(move || orchestrator.run_session(worker_sink.as_ref()))
        {
            Ok(handle) => Some(handle),
            Err(error) => {
                self.finish(
                    sink.as_ref(),
                    Err(UpdateError::Spawn(format!(
                        "failed to start update worker: {error}"
                    ))),
                );
                None
            }
        }
    }

    fn run_session(&self, sink: &dyn UpdateEventSink) {
        self.emit_status(sink, UpdateStatus::Updating, 0);
        self.emit_log(sink, STARTING_MESSAGE);

        let result = if self.simulate {
            self.run_simulated(sink)
        } else {
            self.run_live(sink)
        };
        self.finish(sink, result);
    }

    fn run_simulated(&self, sink: &dyn UpdateEventSink) -> Result<(), UpdateError> {
        self.emit_log(sink, REQUESTING_PRIVILEGES_MESSAGE);
        (self.sleep)(PRIVILEGE_PROMPT_DELAY);

        let total = SIMULATED_UPDATE_LINES.len();
        for (index, line) in SIMULATED_UPDATE_LINES.iter().enumerate() {
            self.emit_log(sink, line);
            (self.sleep)(simulated_line_delay(line));
            self.emit_status(sink, UpdateStatus::Updating, simulated_progress(index, total));
        }
        Ok(())
    }

    fn run_live(&self, sink: &dyn UpdateEventSink) -> Result<(), UpdateError> {
        let profile = distro::identify(&self.os_release_path);
        let command = profile
            .update_command()
            .ok_or_else(|| UpdateError::UnsupportedDistro(profile.id.clone()))?;

        self.emit_log(sink, &format!("Detected Distro: {}", profile.id));
        self.emit_log(sink, &format!("Executing: {command}"));
        self.emit_status(sink, UpdateStatus::Updating, COMMAND_STARTED_PERCENT);

        let output = self.runner.run(command)?;
        for message in output {
            match message {
                RunnerMessage::Line(line) => {
                    self.emit_log(sink, &line);
                    self.emit_status(sink, UpdateStatus::Updating, LIVE_LINE_PERCENT);
                }
                RunnerMessage::Exited(Some(0)) => return Ok(()),
                RunnerMessage::Exited(code) => return Err(UpdateError::ProcessFailure(code)),
                RunnerMessage::ElevationDenied(code) => {
                    return Err(UpdateError::Spawn(format!(
                        "authorization was cancelled or denied (exit code {code})"
                    )))
                }
                RunnerMessage::WaitFailed(error) => return Err(UpdateError::Spawn(error)),
            }
        }

        Err(UpdateError::Spawn(
            "command output closed before an exit status was reported".to_string(),
        ))
    }

    fn finish(&self, sink: &dyn UpdateEventSink, result: Result<(), UpdateError>) {
        match result {
            Ok(()) => {
                self.emit_log(sink, COMPLETED_MESSAGE);
                self.emit_status(sink, UpdateStatus::Completed, 100);
            }
            Err(error) => {
                self.emit_log(sink, &error.to_string());
                self.emit_status(sink, UpdateStatus::Error, 0);
            }
        }
    }

    fn emit_log(&self, sink: &dyn UpdateEventSink, message: &str) {
        self.lock_session().push_log(message);
        crate::append_update_log(message);
        sink.emit(UpdateEvent::log(message));
    }

    fn emit_status(&self, sink: &dyn UpdateEventSink, status: UpdateStatus, percentage: u8) {
        let event = self.lock_session().apply_status(status, percentage);
        if let Some(event) = event {
            sink.emit(event);
        }
    }
}
