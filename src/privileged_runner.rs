use std::{
    io::{BufRead, BufReader, Read},
    path::Path,
    process::{Command, Stdio},
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use crate::update_error::UpdateError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RunnerMessage {
    Line(String),
    Exited(Option<i32>),
    /// The elevation wrapper exited with its own "not authorized" code.
    ElevationDenied(i32),
    WaitFailed(String),
}

const PKEXEC_DISMISSED_CODE: i32 = 126;
const PKEXEC_NOT_AUTHORIZED_CODE: i32 = 127;

/// Maps an exit code to a denial when the wrapper is pkexec, which reserves
/// 126 for a dismissed prompt and 127 for failed authorization.
pub(crate) fn elevation_denial_code(elevation: &[String], code: Option<i32>) -> Option<i32> {
    let program = elevation.first()?;
    let is_pkexec = Path::new(program)
        .file_name()
        .is_some_and(|name| name == "pkexec");
    match code {
        Some(code @ (PKEXEC_DISMISSED_CODE | PKEXEC_NOT_AUTHORIZED_CODE)) if is_pkexec => {
            Some(code)
        }
        _ => None,
    }
}

/// Starts a shell command and hands back its output as a channel. The last
/// message on the channel is always `Exited` or `WaitFailed`.
pub(crate) trait CommandRunner: Send + Sync {
    fn run(&self, command: &str) -> Result<Receiver<RunnerMessage>, UpdateError>;
}

#[derive(Debug, Clone)]
pub(crate) struct PrivilegedRunner {
    elevation: Vec<String>,
    shell: String,
}

impl PrivilegedRunner {
    pub(crate) fn new(elevation: Vec<String>, shell: String) -> Self {
        Self { elevation, shell }
    }

    /// `<elevation...> <shell> -c 'exec 2>&1; <command>'`. The child's stderr
    /// is folded into stdout inside the shell so both keep their relative order.
    pub(crate) fn build_invocation(&self, command: &str) -> (String, Vec<String>) {
        let mut parts = self.elevation.clone();
        parts.push(self.shell.clone());
        parts.push("-c".to_string());
        parts.push(format!("exec 2>&1; {command}"));
        let program = parts.remove(0);
        (program, parts)
    }
}

impl CommandRunner for PrivilegedRunner {
    fn run(&self, command: &str) -> Result<Receiver<RunnerMessage>, UpdateError> {
        let (program, args) = self.build_invocation(command);
        let mut child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|error| UpdateError::Spawn(format!("failed to run '{program}': {error}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| UpdateError::Spawn("child stdout is unavailable".to_string()))?;
        // Only the elevation wrapper itself writes here (auth errors, usage).
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| UpdateError::Spawn("child stderr is unavailable".to_string()))?;

        let (tx, rx) = mpsc::channel();
        let stderr_tx = tx.clone();
        let stderr_reader = thread::Builder::new()
            .name("update-runner-stderr".to_string())
            .spawn(move || forward_lines(stderr, &stderr_tx))
            .map_err(|error| {
                UpdateError::Spawn(format!("failed to start output reader: {error}"))
            })?;

        let elevation = self.elevation.clone();

        thread::Builder::new()
            .name("update-runner".to_string())
            .spawn(move || {
                forward_lines(stdout, &tx);
                if stderr_reader.join().is_err() {
                    crate::append_update_log("stderr reader thread panicked");
                }
                let outcome = match child.wait() {
                    Ok(status) => match elevation_denial_code(&elevation, status.code()) {
                        Some(code) => RunnerMessage::ElevationDenied(code),
                        None => RunnerMessage::Exited(status.code()),
                    },
                    Err(error) => RunnerMessage::WaitFailed(error.to_string()),
                };
                let _ = tx.send(outcome);
            })
            .map_err(|error| {
                UpdateError::Spawn(format!("failed to start output reader: {error}"))
            })?;

        Ok(rx)
    }
}

fn forward_lines<R: Read>(reader: R, tx: &Sender<RunnerMessage>) {
    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        match reader.read_until(b'\n', &mut buffer) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buffer).trim_end().to_string();
                if tx.send(RunnerMessage::Line(line)).is_err() {
                    break;
                }
            }
            Err(error) => {
                crate::append_update_log(&format!("failed to read command output: {error}"));
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn unelevated() -> PrivilegedRunner {
        PrivilegedRunner::new(Vec::new(), "/bin/sh".to_string())
    }

    fn drain(rx: Receiver<RunnerMessage>) -> (Vec<String>, RunnerMessage) {
        let mut lines = Vec::new();
        for message in rx {
            match message {
                RunnerMessage::Line(line) => lines.push(line),
                terminal => return (lines, terminal),
            }
        }
        panic!("runner channel closed without a terminal message");
    }

    #[test]
    fn build_invocation_wraps_command_in_elevated_shell() {
        let runner = PrivilegedRunner::new(vec!["pkexec".to_string()], "/bin/sh".to_string());
        let (program, args) = runner.build_invocation("dnf update -y");
        assert_eq!(program, "pkexec");
        assert_eq!(args, vec!["/bin/sh", "-c", "exec 2>&1; dnf update -y"]);
    }

    #[test]
    fn build_invocation_without_elevation_runs_shell_directly() {
        let (program, args) = unelevated().build_invocation("true");
        assert_eq!(program, "/bin/sh");
        assert_eq!(args, vec!["-c", "exec 2>&1; true"]);
    }

    #[test]
    fn run_interleaves_stdout_and_stderr_in_order() {
        let rx = unelevated()
            .run("echo one; echo two >&2; echo three")
            .expect("shell should spawn");
        let (lines, outcome) = drain(rx);
        assert_eq!(lines, vec!["one", "two", "three"]);
        assert_eq!(outcome, RunnerMessage::Exited(Some(0)));
    }

    #[test]
    fn run_delivers_lines_while_command_is_still_running() {
        let rx = unelevated()
            .run("echo first; sleep 2; echo second")
            .expect("shell should spawn");

        assert_eq!(
            rx.recv_timeout(Duration::from_millis(1000)),
            Ok(RunnerMessage::Line("first".to_string()))
        );
        let (lines, outcome) = drain(rx);
        assert_eq!(lines, vec!["second"]);
        assert_eq!(outcome, RunnerMessage::Exited(Some(0)));
    }

    #[test]
    fn run_surfaces_non_zero_exit_code() {
        let rx = unelevated().run("echo failing; exit 3").unwrap();
        let (lines, outcome) = drain(rx);
        assert_eq!(lines, vec!["failing"]);
        assert_eq!(outcome, RunnerMessage::Exited(Some(3)));
    }

    #[test]
    fn run_goes_through_the_elevation_wrapper() {
        let runner = PrivilegedRunner::new(vec!["env".to_string()], "/bin/sh".to_string());
        let (lines, outcome) = drain(runner.run("echo wrapped").unwrap());
        assert_eq!(lines, vec!["wrapped"]);
        assert_eq!(outcome, RunnerMessage::Exited(Some(0)));
    }

    #[test]
    fn elevation_denial_code_only_applies_to_pkexec() {
        let pkexec = vec!["/usr/bin/pkexec".to_string()];
        assert_eq!(elevation_denial_code(&pkexec, Some(126)), Some(126));
        assert_eq!(elevation_denial_code(&pkexec, Some(127)), Some(127));
        assert_eq!(elevation_denial_code(&pkexec, Some(100)), None);
        assert_eq!(elevation_denial_code(&pkexec, None), None);

        let sudo = vec!["sudo".to_string(), "-A".to_string()];
        assert_eq!(elevation_denial_code(&sudo, Some(126)), None);
        assert_eq!(elevation_denial_code(&[], Some(127)), None);
    }

    #[test]
    fn run_without_elevation_keeps_shell_exit_code_127() {
        let (_, outcome) = drain(unelevated().run("exit 127").unwrap());
        assert_eq!(outcome, RunnerMessage::Exited(Some(127)));
    }

    #[test]
    fn run_reports_spawn_error_for_missing_wrapper() {
        let runner = PrivilegedRunner::new(
            vec!["/nonexistent/ro-start-elevate".to_string()],
            "/bin/sh".to_string(),
        );
        match runner.run("true") {
            Err(UpdateError::Spawn(message)) => {
                assert!(message.contains("/nonexistent/ro-start-elevate"))
            }
            other => panic!("expected spawn error, got {other:?}"),
        }
    }
}
