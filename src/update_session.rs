use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum UpdateStatus {
    #[default]
    Idle,
    Updating,
    Completed,
    Error,
}

impl UpdateStatus {
    pub(crate) fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct UpdateLogPayload {
    pub(crate) message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct UpdateStatusPayload {
    pub(crate) status: UpdateStatus,
    pub(crate) percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UpdateEvent {
    Log(UpdateLogPayload),
    Status(UpdateStatusPayload),
}

impl UpdateEvent {
    pub(crate) fn log(message: impl Into<String>) -> Self {
        Self::Log(UpdateLogPayload {
            message: message.into(),
        })
    }

    pub(crate) fn status(status: UpdateStatus, percentage: u8) -> Self {
        Self::Status(UpdateStatusPayload { status, percentage })
    }
}

/// Receives session events. Implementations must not block for long: events
/// are produced on the update worker thread.
pub(crate) trait UpdateEventSink: Send + Sync {
    fn emit(&self, event: UpdateEvent);
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub(crate) struct UpdateSession {
    pub(crate) status: UpdateStatus,
    pub(crate) progress: u8,
    pub(crate) log: Vec<String>,
}

impl UpdateSession {
    pub(crate) fn started() -> Self {
        Self {
            status: UpdateStatus::Updating,
            progress: 0,
            log: Vec::new(),
        }
    }

    pub(crate) fn push_log(&mut self, message: &str) {
        self.log.push(message.to_string());
    }

    /// Applies a status update and returns the event to publish, or `None`
    /// when the transition is not allowed from the current state.
    pub(crate) fn apply_status(
        &mut self,
        status: UpdateStatus,
        percentage: u8,
    ) -> Option<UpdateEvent> {
        if self.status != UpdateStatus::Updating {
            return None;
        }

        let percentage = percentage.min(100);
        match status {
            UpdateStatus::Idle => return None,
            UpdateStatus::Updating => {
                self.progress = self.progress.max(percentage);
            }
            UpdateStatus::Completed => {
                self.progress = 100;
            }
            UpdateStatus::Error => {
                self.progress = 0;
            }
        }
        self.status = status;
        Some(UpdateEvent::status(status, self.progress))
    }
}
