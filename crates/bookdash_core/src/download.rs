use crate::log_pane::LogPane;
use crate::snapshot::{ControlStatus, DownloadSnapshot, RemoteStatus};

/// Status lines longer than this are collapsed to a generic label in the
/// one-line status display (the full text still lands in the log).
const STATUS_LINE_LIMIT: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadPhase {
    #[default]
    Idle,
    Starting,
    Running,
    Paused,
    Done,
    Errored,
}

/// Remote-reported progress counters, mirrored verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub current: u32,
    pub total: u32,
    pub success: u32,
    pub fail: u32,
    pub percent: u32,
}

/// Authoritative local view of the download job.
///
/// Transitions are driven only by snapshots and control acknowledgements,
/// never by local guesses. `Done` and `Errored` are terminal: snapshots that
/// arrive afterwards (late in-flight polls) are discarded by `update`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DownloadJob {
    task_id: Option<String>,
    phase: DownloadPhase,
    progress: Progress,
    status_line: String,
    status_is_error: bool,
    has_failed_items: bool,
    artifact: Option<String>,
    contact_lost: bool,
    /// Latched by a control acknowledgement; a snapshot's control field is
    /// honored again only once it agrees with the acknowledged state. This
    /// keeps a provably older in-flight poll from reverting the visible
    /// pause/resume transition.
    pending_control: Option<ControlStatus>,
    log: LogPane,
}

impl DownloadJob {
    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn phase(&self) -> DownloadPhase {
        self.phase
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    pub fn status_is_error(&self) -> bool {
        self.status_is_error
    }

    pub fn has_failed_items(&self) -> bool {
        self.has_failed_items
    }

    pub fn artifact(&self) -> Option<&str> {
        self.artifact.as_deref()
    }

    pub fn contact_lost(&self) -> bool {
        self.contact_lost
    }

    pub fn log(&self) -> &LogPane {
        &self.log
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, DownloadPhase::Done | DownloadPhase::Errored)
    }

    /// Poll events can only belong to a job that is in flight. In `Idle` or
    /// `Starting` no identifier is set yet, so any snapshot arriving then is
    /// a late event from a superseded loop and must be discarded; merging it
    /// would flip the phase past `Starting` and make the pending start
    /// acknowledgement look stale.
    pub fn accepts_poll_events(&self) -> bool {
        matches!(self.phase, DownloadPhase::Running | DownloadPhase::Paused)
    }

    /// A fresh start action resets the whole job; this is the only way a
    /// previous job's view is destroyed.
    pub(crate) fn begin_start(&mut self) {
        *self = Self {
            phase: DownloadPhase::Starting,
            status_line: "Starting...".to_string(),
            ..Self::default()
        };
    }

    pub(crate) fn start_succeeded(&mut self, task_id: String) {
        self.task_id = Some(task_id);
        self.phase = DownloadPhase::Running;
        self.status_line = "Task started".to_string();
    }

    pub(crate) fn start_failed(&mut self, error: &str) {
        self.phase = DownloadPhase::Idle;
        self.status_line = error.to_string();
        self.status_is_error = true;
    }

    /// Merges one snapshot. Returns true when the poll loop must stop
    /// (terminal status reached).
    pub(crate) fn apply_snapshot(&mut self, snapshot: &DownloadSnapshot) -> bool {
        if snapshot.status == RemoteStatus::Error {
            // Job-reported failure: terminal, progress left untouched.
            self.phase = DownloadPhase::Errored;
            self.status_line = "Error".to_string();
            self.status_is_error = true;
            return true;
        }

        if let Some(line) = &snapshot.log {
            if self.log.push(line) {
                self.status_line = if line.chars().count() > STATUS_LINE_LIMIT {
                    "Downloading...".to_string()
                } else {
                    line.clone()
                };
                self.status_is_error = false;
            }
        }

        // Counters are trusted verbatim; the remote side is authoritative.
        self.progress = Progress {
            current: snapshot.current,
            total: snapshot.total,
            success: snapshot.success,
            fail: snapshot.fail,
            percent: snapshot.percent,
        };
        self.has_failed_items = snapshot.has_failed;

        if let Some(filename) = &snapshot.filename {
            self.artifact = Some(filename.clone());
        }

        self.reconcile_control(snapshot.paused);

        if snapshot.status == RemoteStatus::Done {
            self.phase = DownloadPhase::Done;
            self.status_line = "Task Completed!".to_string();
            self.log.push("Task Completed!");
            return true;
        }
        false
    }

    fn reconcile_control(&mut self, remote_paused: bool) {
        match self.pending_control {
            Some(ControlStatus::Paused) if remote_paused => self.pending_control = None,
            Some(ControlStatus::Resumed) if !remote_paused => self.pending_control = None,
            _ => {}
        }
        let effective_paused = match self.pending_control {
            Some(ControlStatus::Paused) => true,
            Some(ControlStatus::Resumed) => false,
            None => remote_paused,
        };
        self.phase = if effective_paused {
            DownloadPhase::Paused
        } else {
            DownloadPhase::Running
        };
    }

    /// Contact lost: the loop stops, the last known view stays for
    /// inspection, and the controls return to a startable state.
    pub(crate) fn poll_failed(&mut self) {
        self.contact_lost = true;
    }

    /// Applies a pause/resume acknowledgement immediately, ahead of the next
    /// poll tick.
    pub(crate) fn apply_control_ack(&mut self, status: ControlStatus) {
        if self.is_terminal() {
            return;
        }
        self.pending_control = Some(status);
        self.phase = match status {
            ControlStatus::Paused => DownloadPhase::Paused,
            ControlStatus::Resumed => DownloadPhase::Running,
        };
    }

    /// Save outcomes surface on the status line; they never change phase.
    pub(crate) fn artifact_saved(&mut self, path: &str) {
        self.status_line = format!("Saved to {path}");
        self.status_is_error = false;
    }

    pub(crate) fn artifact_save_failed(&mut self, error: &str) {
        self.status_line = format!("Save failed: {error}");
        self.status_is_error = true;
    }

    pub(crate) fn can_retry(&self) -> bool {
        self.has_failed_items && self.task_id.is_some()
    }

    /// Re-enters the running phase for a retry of failed items. Does not
    /// clear `has_failed_items`; only a subsequent snapshot does.
    pub(crate) fn begin_retry(&mut self) {
        self.phase = DownloadPhase::Running;
        self.contact_lost = false;
        self.status_is_error = false;
        self.status_line = "Retrying failed items...".to_string();
    }
}
