use url::Url;

use crate::download::DownloadPhase;
use crate::{AppState, ControlAction, Effect, JobKind, Msg};

/// Pure update function: applies a message to state and returns any effects.
///
/// Terminal phases are guarded here: a late in-flight snapshot arriving after
/// `Done`/`Errored` is discarded so the terminal view can never regress.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Submitted(raw) => {
            let input = raw.trim();
            if input.is_empty() {
                // Fail fast, no network call.
                return (state, Vec::new());
            }
            if let Some(url) = as_http_url(input) {
                state.download.begin_start();
                state.mark_dirty();
                vec![
                    Effect::StopPolling {
                        kind: JobKind::Download,
                    },
                    Effect::StartDownload { url },
                ]
            } else {
                state.search.begin();
                state.mark_dirty();
                vec![
                    Effect::StopPolling {
                        kind: JobKind::Search,
                    },
                    Effect::StartSearch {
                        keyword: input.to_string(),
                    },
                ]
            }
        }
        Msg::DownloadStarted { task_id } => {
            if state.download.phase() != DownloadPhase::Starting {
                // Stale start completion for a job already superseded.
                return (state, Vec::new());
            }
            state.download.start_succeeded(task_id.clone());
            state.mark_dirty();
            vec![Effect::BeginPolling {
                kind: JobKind::Download,
                task_id,
            }]
        }
        Msg::DownloadStartFailed { error } => {
            state.download.start_failed(&error);
            state.mark_dirty();
            Vec::new()
        }
        Msg::DownloadSnapshot(snapshot) => {
            // Discards both late polls after a terminal phase and late polls
            // from a superseded loop while a fresh job is still starting.
            if !state.download.accepts_poll_events() {
                return (state, Vec::new());
            }
            let stop = state.download.apply_snapshot(&snapshot);
            state.mark_dirty();
            if stop {
                vec![Effect::StopPolling {
                    kind: JobKind::Download,
                }]
            } else {
                Vec::new()
            }
        }
        Msg::DownloadPollFailed => {
            if !state.download.accepts_poll_events() {
                return (state, Vec::new());
            }
            state.download.poll_failed();
            state.mark_dirty();
            vec![Effect::StopPolling {
                kind: JobKind::Download,
            }]
        }
        Msg::PauseClicked => send_control(&mut state, ControlAction::Pause),
        Msg::ResumeClicked => send_control(&mut state, ControlAction::Resume),
        Msg::ControlAcknowledged(status) => {
            state.download.apply_control_ack(status);
            state.mark_dirty();
            Vec::new()
        }
        // A failed control attempt changes nothing; the next successful poll
        // reconciles whatever the remote side actually did.
        Msg::ControlFailed => Vec::new(),
        Msg::RetryClicked => {
            if !state.download.can_retry() {
                return (state, Vec::new());
            }
            let task_id = state
                .download
                .task_id()
                .map(str::to_string)
                .unwrap_or_default();
            state.download.begin_retry();
            state.mark_dirty();
            vec![
                Effect::SendRetry {
                    task_id: task_id.clone(),
                },
                Effect::BeginPolling {
                    kind: JobKind::Download,
                    task_id,
                },
            ]
        }
        Msg::RetryAcknowledged => Vec::new(),
        Msg::SaveClicked => match state.view().download.save_link {
            Some(_) => {
                let filename = state
                    .download
                    .artifact()
                    .map(str::to_string)
                    .unwrap_or_default();
                vec![Effect::SaveArtifact { filename }]
            }
            None => Vec::new(),
        },
        Msg::ArtifactSaved { path } => {
            state.download.artifact_saved(&path);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ArtifactSaveFailed { error } => {
            state.download.artifact_save_failed(&error);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SearchStarted { task_id } => {
            if !state.search.awaiting_start() {
                // Stale start completion for a search already superseded.
                return (state, Vec::new());
            }
            state.search.started(task_id.clone());
            state.mark_dirty();
            vec![Effect::BeginPolling {
                kind: JobKind::Search,
                task_id,
            }]
        }
        Msg::SearchStartFailed { error } => {
            state.search.start_failed(&error);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SearchSnapshot(snapshot) => {
            // Only a running search owns its poll loop; anything else means
            // the snapshot is late, either post-terminal or from a
            // superseded search.
            if state.search.phase() != crate::SearchPhase::Running {
                return (state, Vec::new());
            }
            let stop = state.search.apply_snapshot(&snapshot);
            state.mark_dirty();
            if stop {
                vec![Effect::StopPolling {
                    kind: JobKind::Search,
                }]
            } else {
                Vec::new()
            }
        }
        Msg::SearchPollFailed => {
            if state.search.phase() != crate::SearchPhase::Running {
                return (state, Vec::new());
            }
            state.search.poll_failed();
            state.mark_dirty();
            vec![Effect::StopPolling {
                kind: JobKind::Search,
            }]
        }
        Msg::ResultPicked { url } => {
            state.search.hide();
            state.download.begin_start();
            state.mark_dirty();
            vec![
                Effect::StopPolling {
                    kind: JobKind::Download,
                },
                Effect::StartDownload { url },
            ]
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn send_control(state: &mut AppState, action: ControlAction) -> Vec<Effect> {
    let wanted = match action {
        ControlAction::Pause => DownloadPhase::Running,
        ControlAction::Resume => DownloadPhase::Paused,
    };
    if state.download.phase() != wanted {
        return Vec::new();
    }
    match state.download.task_id() {
        Some(task_id) => vec![Effect::SendControl {
            task_id: task_id.to_string(),
            action,
        }],
        None => Vec::new(),
    }
}

/// Detection rule for the single input box: anything that parses as an
/// http(s) URL is a download target, everything else is a search keyword.
fn as_http_url(input: &str) -> Option<String> {
    let parsed = Url::parse(input).ok()?;
    matches!(parsed.scheme(), "http" | "https").then(|| parsed.to_string())
}
