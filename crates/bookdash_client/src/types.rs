use std::fmt;

use thiserror::Error;

/// Remote job status carried by a download report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportStatus {
    /// Implicit default when the wire field is absent.
    #[default]
    Running,
    Done,
    Error,
}

/// Parsed download progress report, one per successful poll round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DownloadReport {
    pub status: ReportStatus,
    pub paused: bool,
    pub percent: u32,
    pub current: u32,
    pub total: u32,
    pub success: u32,
    pub fail: u32,
    pub log: Option<String>,
    pub filename: Option<String>,
    pub has_failed: bool,
}

impl DownloadReport {
    /// Whether this report ends the poll loop.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, ReportStatus::Done | ReportStatus::Error)
    }
}

/// Parsed search progress report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchReport {
    pub logs: Vec<String>,
    pub results: Vec<SearchRecord>,
    pub done: bool,
}

/// One search result record as the wire presents it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchRecord {
    pub title: String,
    pub author: Option<String>,
    pub source: Option<String>,
    pub is_completed: bool,
    pub latest: Option<String>,
    pub url: String,
    pub is_captcha: bool,
    pub snippet: Option<String>,
}

/// Acknowledged outcome of a pause/resume control call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    Paused,
    Resumed,
}

/// Pause/resume request selector; maps to the control endpoint path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Pause,
    Resume,
}

impl ControlAction {
    pub fn as_path_segment(self) -> &'static str {
        match self {
            ControlAction::Pause => "pause",
            ControlAction::Resume => "resume",
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path_segment())
    }
}

/// A start call failed; surfaced to the user, never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("remote rejected start: {0}")]
    Rejected(String),
    #[error("transport error: {0}")]
    Network(String),
    #[error("malformed start response: {0}")]
    Malformed(String),
}

/// A poll round-trip failed. Carries no partial data: the caller must not
/// touch progress state, only connectivity state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    /// The remote side no longer knows the identifier (service restart).
    #[error("task unknown to remote: {0}")]
    TaskGone(String),
    #[error("transport error: {0}")]
    Network(String),
    #[error("malformed poll response: {0}")]
    Malformed(String),
}

/// A control or retry call failed; logged only, job phase is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("remote rejected control: {0}")]
    Rejected(String),
    #[error("transport error: {0}")]
    Network(String),
    #[error("malformed control response: {0}")]
    Malformed(String),
}

/// Artifact retrieval failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtifactError {
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("transport error: {0}")]
    Network(String),
}

/// Everything the channel reports back to the application, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    DownloadStartFinished {
        result: Result<String, StartError>,
    },
    DownloadPolled {
        result: Result<DownloadReport, PollError>,
    },
    ControlFinished {
        result: Result<ControlOutcome, ControlError>,
    },
    RetryFinished {
        result: Result<(), ControlError>,
    },
    SearchStartFinished {
        result: Result<String, StartError>,
    },
    SearchPolled {
        result: Result<SearchReport, PollError>,
    },
    ArtifactFetched {
        filename: String,
        result: Result<Vec<u8>, ArtifactError>,
    },
}
