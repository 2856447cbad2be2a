use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use dash_logging::{dash_debug, dash_warn};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::{ChannelSettings, HttpApi, SnapshotApi};
use crate::types::{ChannelEvent, ControlAction};

/// Which poll loop a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollKind {
    Download,
    Search,
}

/// Poll cadence and channel settings for [`ClientHandle::spawn`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub channel: ChannelSettings,
    pub download_poll_interval: Duration,
    pub search_poll_interval: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            channel: ChannelSettings::default(),
            download_poll_interval: Duration::from_millis(1000),
            search_poll_interval: Duration::from_millis(500),
        }
    }
}

enum ClientCommand {
    StartDownload { url: String },
    StartSearch { keyword: String },
    BeginPolling { kind: PollKind, task_id: String },
    StopPolling { kind: PollKind },
    Control { task_id: String, action: ControlAction },
    RetryFailed { task_id: String },
    FetchArtifact { filename: String },
}

/// Handle to the channel worker thread.
///
/// Commands are fire-and-forget; every outcome comes back as a
/// [`ChannelEvent`] on the receiver returned by [`ClientHandle::spawn`].
/// The worker guarantees at most one live poll task per job kind: beginning
/// a loop aborts the previous one first, and stop is an idempotent no-op
/// when nothing is running.
pub struct ClientHandle {
    cmd_tx: mpsc::Sender<ClientCommand>,
}

impl ClientHandle {
    /// Spawns the worker against the real HTTP channel.
    pub fn spawn(
        settings: ClientSettings,
    ) -> Result<(Self, mpsc::Receiver<ChannelEvent>), reqwest::Error> {
        let api = Arc::new(HttpApi::new(settings.channel.clone())?);
        Ok(Self::spawn_with_api(api, settings))
    }

    /// Spawns the worker against an arbitrary channel implementation.
    /// Used by tests to substitute a scripted channel.
    pub fn spawn_with_api(
        api: Arc<dyn SnapshotApi>,
        settings: ClientSettings,
    ) -> (Self, mpsc::Receiver<ChannelEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let mut download_poll: Option<JoinHandle<()>> = None;
            let mut search_poll: Option<JoinHandle<()>> = None;

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    ClientCommand::StartDownload { url } => {
                        let api = api.clone();
                        let tx = event_tx.clone();
                        runtime.spawn(async move {
                            let result = api.start_download(&url).await;
                            let _ = tx.send(ChannelEvent::DownloadStartFinished { result });
                        });
                    }
                    ClientCommand::StartSearch { keyword } => {
                        let api = api.clone();
                        let tx = event_tx.clone();
                        runtime.spawn(async move {
                            let result = api.start_search(&keyword).await;
                            let _ = tx.send(ChannelEvent::SearchStartFinished { result });
                        });
                    }
                    ClientCommand::BeginPolling { kind, task_id } => {
                        let slot = match kind {
                            PollKind::Download => &mut download_poll,
                            PollKind::Search => &mut search_poll,
                        };
                        // Correctness requirement: never two live timers for
                        // the same kind, or a stale identifier keeps getting
                        // polled next to the new one.
                        if let Some(handle) = slot.take() {
                            handle.abort();
                        }
                        dash_debug!("begin polling {kind:?} task_id={task_id}");
                        let period = match kind {
                            PollKind::Download => settings.download_poll_interval,
                            PollKind::Search => settings.search_poll_interval,
                        };
                        *slot = Some(runtime.spawn(poll_loop(
                            api.clone(),
                            event_tx.clone(),
                            kind,
                            task_id,
                            period,
                        )));
                    }
                    ClientCommand::StopPolling { kind } => {
                        let slot = match kind {
                            PollKind::Download => &mut download_poll,
                            PollKind::Search => &mut search_poll,
                        };
                        if let Some(handle) = slot.take() {
                            dash_debug!("stop polling {kind:?}");
                            handle.abort();
                        }
                    }
                    ClientCommand::Control { task_id, action } => {
                        let api = api.clone();
                        let tx = event_tx.clone();
                        runtime.spawn(async move {
                            let result = api.control(&task_id, action).await;
                            if let Err(err) = &result {
                                dash_warn!("control {action} failed: {err}");
                            }
                            let _ = tx.send(ChannelEvent::ControlFinished { result });
                        });
                    }
                    ClientCommand::RetryFailed { task_id } => {
                        let api = api.clone();
                        let tx = event_tx.clone();
                        runtime.spawn(async move {
                            let result = api.retry_failed(&task_id).await;
                            if let Err(err) = &result {
                                dash_warn!("retry failed: {err}");
                            }
                            let _ = tx.send(ChannelEvent::RetryFinished { result });
                        });
                    }
                    ClientCommand::FetchArtifact { filename } => {
                        let api = api.clone();
                        let tx = event_tx.clone();
                        runtime.spawn(async move {
                            let result = api.fetch_artifact(&filename).await;
                            let _ = tx.send(ChannelEvent::ArtifactFetched { filename, result });
                        });
                    }
                }
            }
        });

        (Self { cmd_tx }, event_rx)
    }

    pub fn start_download(&self, url: impl Into<String>) {
        let _ = self.cmd_tx.send(ClientCommand::StartDownload { url: url.into() });
    }

    pub fn start_search(&self, keyword: impl Into<String>) {
        let _ = self.cmd_tx.send(ClientCommand::StartSearch {
            keyword: keyword.into(),
        });
    }

    pub fn begin_polling(&self, kind: PollKind, task_id: impl Into<String>) {
        let _ = self.cmd_tx.send(ClientCommand::BeginPolling {
            kind,
            task_id: task_id.into(),
        });
    }

    pub fn stop_polling(&self, kind: PollKind) {
        let _ = self.cmd_tx.send(ClientCommand::StopPolling { kind });
    }

    pub fn control(&self, task_id: impl Into<String>, action: ControlAction) {
        let _ = self.cmd_tx.send(ClientCommand::Control {
            task_id: task_id.into(),
            action,
        });
    }

    pub fn retry_failed(&self, task_id: impl Into<String>) {
        let _ = self.cmd_tx.send(ClientCommand::RetryFailed {
            task_id: task_id.into(),
        });
    }

    pub fn fetch_artifact(&self, filename: impl Into<String>) {
        let _ = self.cmd_tx.send(ClientCommand::FetchArtifact {
            filename: filename.into(),
        });
    }
}

/// Fixed-cadence poll task for one job.
///
/// Ends itself after emitting a terminal report or a poll failure, so the
/// loop stops exactly once no matter how commands interleave. In-flight
/// results that arrive after the core reached a terminal phase are discarded
/// by the core's own guard.
async fn poll_loop(
    api: Arc<dyn SnapshotApi>,
    event_tx: mpsc::Sender<ChannelEvent>,
    kind: PollKind,
    task_id: String,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let finished = match kind {
            PollKind::Download => {
                let result = api.poll_download(&task_id).await;
                let finished = match &result {
                    Ok(report) => report.is_terminal(),
                    Err(_) => true,
                };
                let _ = event_tx.send(ChannelEvent::DownloadPolled { result });
                finished
            }
            PollKind::Search => {
                let result = api.poll_search(&task_id).await;
                let finished = match &result {
                    Ok(report) => report.done,
                    Err(_) => true,
                };
                let _ = event_tx.send(ChannelEvent::SearchPolled { result });
                finished
            }
        };
        if finished {
            dash_debug!("poll loop for {kind:?} task_id={task_id} finished");
            break;
        }
    }
}
