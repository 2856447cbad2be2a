//! Bookdash client: snapshot channel round-trips and the poll-loop scheduler.
mod api;
mod poller;
mod types;
mod wire;

pub use api::{ChannelSettings, HttpApi, SnapshotApi};
pub use poller::{ClientHandle, ClientSettings, PollKind};
pub use types::{
    ArtifactError, ChannelEvent, ControlAction, ControlError, ControlOutcome, DownloadReport,
    PollError, ReportStatus, SearchRecord, SearchReport, StartError,
};
