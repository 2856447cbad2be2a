/// Which of the two tracked jobs an effect targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Download,
    Search,
}

/// User-initiated control request distinct from passive polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Pause,
    Resume,
}

/// Side effects the platform layer executes against the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartDownload { url: String },
    StartSearch { keyword: String },
    /// Begin the fixed-cadence poll loop for `kind`. The scheduler must
    /// cancel any previous loop for the same kind before starting this one.
    BeginPolling { kind: JobKind, task_id: String },
    /// Stop the poll loop for `kind`. Idempotent.
    StopPolling { kind: JobKind },
    SendControl { task_id: String, action: ControlAction },
    SendRetry { task_id: String },
    /// Fetch the artifact bytes and persist them locally.
    SaveArtifact { filename: String },
}
