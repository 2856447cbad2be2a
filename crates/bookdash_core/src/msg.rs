use crate::{ControlStatus, DownloadSnapshot, SearchSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted the input box: a URL starts a download, anything else
    /// starts a search. Empty input is ignored without a network call.
    Submitted(String),
    /// The start call for a download returned an identifier.
    DownloadStarted { task_id: String },
    /// The start call for a download was rejected or failed in transit.
    DownloadStartFailed { error: String },
    /// A download poll tick produced a snapshot.
    DownloadSnapshot(DownloadSnapshot),
    /// A download poll tick failed: contact lost, not a job failure.
    DownloadPollFailed,
    /// User clicked Pause.
    PauseClicked,
    /// User clicked Resume.
    ResumeClicked,
    /// A pause/resume call was acknowledged by the remote side.
    ControlAcknowledged(ControlStatus),
    /// A pause/resume call failed; state is left for the next poll to settle.
    ControlFailed,
    /// User clicked Retry for failed items.
    RetryClicked,
    /// The retry call was acknowledged. Progress arrives via polling.
    RetryAcknowledged,
    /// User clicked the artifact save link.
    SaveClicked,
    /// The fetched artifact was written to disk at `path`.
    ArtifactSaved { path: String },
    /// Fetching or writing the artifact failed.
    ArtifactSaveFailed { error: String },
    /// The start call for a search returned an identifier.
    SearchStarted { task_id: String },
    /// The start call for a search was rejected or failed in transit.
    SearchStartFailed { error: String },
    /// A search poll tick produced a snapshot.
    SearchSnapshot(SearchSnapshot),
    /// A search poll tick failed; results stay frozen until a new search.
    SearchPollFailed,
    /// User picked a normal search result: hand its URL to the downloader.
    ResultPicked { url: String },
    /// Fallback for placeholder wiring.
    NoOp,
}
