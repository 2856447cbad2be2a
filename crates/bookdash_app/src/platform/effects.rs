use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use bookdash_client::{ChannelEvent, ClientHandle, ClientSettings, PollKind};
use bookdash_core::{
    ControlAction, ControlStatus, DownloadSnapshot, Effect, JobKind, Msg, RemoteStatus, SearchHit,
    SearchSnapshot,
};
use dash_logging::{dash_error, dash_info, dash_warn};

use super::artifacts;

/// Executes core effects against the channel worker and feeds channel events
/// back into the message loop as core messages.
pub struct EffectRunner {
    client: ClientHandle,
}

impl EffectRunner {
    pub fn new(settings: ClientSettings, msg_tx: mpsc::Sender<Msg>) -> anyhow::Result<Self> {
        let (client, event_rx) = ClientHandle::spawn(settings)?;
        spawn_event_loop(event_rx, msg_tx);
        Ok(Self { client })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartDownload { url } => {
                    dash_info!("StartDownload url={url}");
                    self.client.start_download(url);
                }
                Effect::StartSearch { keyword } => {
                    dash_info!("StartSearch keyword={keyword}");
                    self.client.start_search(keyword);
                }
                Effect::BeginPolling { kind, task_id } => {
                    self.client.begin_polling(map_kind(kind), task_id);
                }
                Effect::StopPolling { kind } => {
                    self.client.stop_polling(map_kind(kind));
                }
                Effect::SendControl { task_id, action } => {
                    self.client.control(task_id, map_action(action));
                }
                Effect::SendRetry { task_id } => {
                    self.client.retry_failed(task_id);
                }
                Effect::SaveArtifact { filename } => {
                    self.client.fetch_artifact(filename);
                }
            }
        }
    }
}

fn spawn_event_loop(event_rx: mpsc::Receiver<ChannelEvent>, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        while let Ok(event) = event_rx.recv() {
            let msg = match event {
                ChannelEvent::DownloadStartFinished { result } => match result {
                    Ok(task_id) => Msg::DownloadStarted { task_id },
                    Err(err) => Msg::DownloadStartFailed {
                        error: err.to_string(),
                    },
                },
                ChannelEvent::DownloadPolled { result } => match result {
                    Ok(report) => Msg::DownloadSnapshot(map_download_report(report)),
                    Err(err) => {
                        dash_warn!("download poll failed: {err}");
                        Msg::DownloadPollFailed
                    }
                },
                ChannelEvent::ControlFinished { result } => match result {
                    Ok(outcome) => Msg::ControlAcknowledged(map_outcome(outcome)),
                    Err(err) => {
                        dash_warn!("control call failed: {err}");
                        Msg::ControlFailed
                    }
                },
                ChannelEvent::RetryFinished { result } => match result {
                    Ok(()) => Msg::RetryAcknowledged,
                    Err(err) => {
                        dash_warn!("retry call failed: {err}");
                        Msg::ControlFailed
                    }
                },
                ChannelEvent::SearchStartFinished { result } => match result {
                    Ok(task_id) => Msg::SearchStarted { task_id },
                    Err(err) => Msg::SearchStartFailed {
                        error: err.to_string(),
                    },
                },
                ChannelEvent::SearchPolled { result } => match result {
                    Ok(report) => Msg::SearchSnapshot(map_search_report(report)),
                    Err(err) => {
                        dash_warn!("search poll failed: {err}");
                        Msg::SearchPollFailed
                    }
                },
                ChannelEvent::ArtifactFetched { filename, result } => {
                    handle_artifact(&filename, result)
                }
            };
            if msg_tx.send(msg).is_err() {
                break;
            }
        }
    });
}

/// Saves fetched artifact bytes and reports the outcome back to the core so
/// it lands on the status line, not just in the log file.
fn handle_artifact(filename: &str, result: Result<Vec<u8>, bookdash_client::ArtifactError>) -> Msg {
    match result {
        Ok(bytes) => {
            let dir = PathBuf::from(artifacts::DOWNLOAD_DIR);
            match artifacts::save_artifact(&dir, filename, &bytes) {
                Ok(path) => {
                    dash_info!("saved artifact to {}", path.display());
                    Msg::ArtifactSaved {
                        path: path.display().to_string(),
                    }
                }
                Err(err) => {
                    dash_error!("could not save artifact {filename}: {err}");
                    Msg::ArtifactSaveFailed {
                        error: err.to_string(),
                    }
                }
            }
        }
        Err(err) => {
            dash_error!("artifact fetch {filename} failed: {err}");
            Msg::ArtifactSaveFailed {
                error: err.to_string(),
            }
        }
    }
}

fn map_kind(kind: JobKind) -> PollKind {
    match kind {
        JobKind::Download => PollKind::Download,
        JobKind::Search => PollKind::Search,
    }
}

fn map_action(action: ControlAction) -> bookdash_client::ControlAction {
    match action {
        ControlAction::Pause => bookdash_client::ControlAction::Pause,
        ControlAction::Resume => bookdash_client::ControlAction::Resume,
    }
}

fn map_outcome(outcome: bookdash_client::ControlOutcome) -> ControlStatus {
    match outcome {
        bookdash_client::ControlOutcome::Paused => ControlStatus::Paused,
        bookdash_client::ControlOutcome::Resumed => ControlStatus::Resumed,
    }
}

fn map_download_report(report: bookdash_client::DownloadReport) -> DownloadSnapshot {
    DownloadSnapshot {
        status: match report.status {
            bookdash_client::ReportStatus::Running => RemoteStatus::Running,
            bookdash_client::ReportStatus::Done => RemoteStatus::Done,
            bookdash_client::ReportStatus::Error => RemoteStatus::Error,
        },
        paused: report.paused,
        percent: report.percent,
        current: report.current,
        total: report.total,
        success: report.success,
        fail: report.fail,
        log: report.log,
        filename: report.filename,
        has_failed: report.has_failed,
    }
}

fn map_search_report(report: bookdash_client::SearchReport) -> SearchSnapshot {
    SearchSnapshot {
        logs: report.logs,
        results: report.results.into_iter().map(map_record).collect(),
        done: report.done,
    }
}

fn map_record(record: bookdash_client::SearchRecord) -> SearchHit {
    SearchHit {
        title: record.title,
        author: record.author,
        source: record.source,
        is_completed: record.is_completed,
        latest: record.latest,
        url: record.url,
        needs_verification: record.is_captcha,
        snippet: record.snippet,
    }
}
