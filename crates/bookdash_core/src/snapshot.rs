//! Value types for polled job state reports.
//!
//! These mirror what the remote service returns but carry no serde; the
//! client crate owns the wire representation and maps into these.

/// Remote job status as reported by a snapshot. `Running` is the implicit
/// default when the wire `status` field is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoteStatus {
    #[default]
    Running,
    Done,
    Error,
}

/// Acknowledgement status of a pause/resume control call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlStatus {
    Paused,
    Resumed,
}

/// One polled state report for the download job.
///
/// Progress counters are authoritative and applied verbatim; the core never
/// recomputes `percent` from `current`/`total`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DownloadSnapshot {
    pub status: RemoteStatus,
    /// True when the remote side reports the job as paused.
    pub paused: bool,
    pub percent: u32,
    pub current: u32,
    pub total: u32,
    pub success: u32,
    pub fail: u32,
    /// Latest textual status line, if any. Subject to dedup on merge.
    pub log: Option<String>,
    /// Artifact reference; replaces any previously known value.
    pub filename: Option<String>,
    pub has_failed: bool,
}

/// One polled state report for the search job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchSnapshot {
    /// Full log history; the remote side is authoritative for ordering.
    pub logs: Vec<String>,
    /// Full result set so far; replaces the local list when non-empty.
    pub results: Vec<SearchHit>,
    pub done: bool,
}

/// A single search result record. Compared by content, never by identity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchHit {
    pub title: String,
    pub author: Option<String>,
    pub source: Option<String>,
    pub is_completed: bool,
    /// Latest-chapter label, when the source exposes one.
    pub latest: Option<String>,
    pub url: String,
    /// Set when the source answered with a human-verification page instead
    /// of a result; rendered as a verification link, not a download.
    pub needs_verification: bool,
    pub snippet: Option<String>,
}
