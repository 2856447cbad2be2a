//! Bookdash core: pure state machines and view-model helpers.
//!
//! Everything here is synchronous and side-effect free. The `update` function
//! consumes a [`Msg`], mutates the state, and returns the [`Effect`]s the
//! platform layer must execute against the remote service.
mod download;
mod effect;
mod log_pane;
mod msg;
mod search;
mod snapshot;
mod state;
mod update;
mod view_model;

pub use download::{DownloadJob, DownloadPhase, Progress};
pub use effect::{ControlAction, Effect, JobKind};
pub use log_pane::{LogPane, SCANNING_MARKER};
pub use msg::Msg;
pub use search::{SearchJob, SearchPhase};
pub use snapshot::{ControlStatus, DownloadSnapshot, RemoteStatus, SearchHit, SearchSnapshot};
pub use state::AppState;
pub use update::update;
pub use view_model::{
    AppViewModel, ArtifactLink, DownloadView, ResultRow, ResultRowKind, SearchView,
};
