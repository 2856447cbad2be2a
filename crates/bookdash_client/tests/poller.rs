use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bookdash_client::{
    ArtifactError, ChannelEvent, ChannelSettings, ClientHandle, ClientSettings, ControlAction,
    ControlError, ControlOutcome, DownloadReport, PollError, PollKind, ReportStatus, SearchReport,
    SnapshotApi, StartError,
};

const EVENT_WAIT: Duration = Duration::from_secs(2);
const QUIET_WAIT: Duration = Duration::from_millis(300);

/// Channel stub that replays a scripted poll sequence per task identifier.
/// Once a script runs dry the last element keeps repeating.
#[derive(Default)]
struct ScriptedApi {
    download_scripts: Mutex<VecDeque<Result<DownloadReport, PollError>>>,
    search_scripts: Mutex<VecDeque<Result<SearchReport, PollError>>>,
}

impl ScriptedApi {
    fn with_download_script(
        script: impl IntoIterator<Item = Result<DownloadReport, PollError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            download_scripts: Mutex::new(script.into_iter().collect()),
            ..Self::default()
        })
    }

    fn with_search_script(
        script: impl IntoIterator<Item = Result<SearchReport, PollError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            search_scripts: Mutex::new(script.into_iter().collect()),
            ..Self::default()
        })
    }
}

fn running_report(percent: u32) -> DownloadReport {
    DownloadReport {
        percent,
        ..DownloadReport::default()
    }
}

fn done_report() -> DownloadReport {
    DownloadReport {
        status: ReportStatus::Done,
        percent: 100,
        filename: Some("book.txt".to_string()),
        ..DownloadReport::default()
    }
}

#[async_trait::async_trait]
impl SnapshotApi for ScriptedApi {
    async fn start_download(&self, _url: &str) -> Result<String, StartError> {
        Ok("T1".to_string())
    }

    async fn poll_download(&self, task_id: &str) -> Result<DownloadReport, PollError> {
        let mut scripts = self.download_scripts.lock().unwrap();
        let next = if scripts.len() > 1 {
            scripts.pop_front()
        } else {
            scripts.front().cloned()
        };
        // Tag the report with the identifier so tests can tell loops apart.
        next.map(|result| {
            result.map(|mut report| {
                report.log = Some(task_id.to_string());
                report
            })
        })
        .unwrap_or_else(|| Ok(running_report(0)))
    }

    async fn control(
        &self,
        _task_id: &str,
        action: ControlAction,
    ) -> Result<ControlOutcome, ControlError> {
        Ok(match action {
            ControlAction::Pause => ControlOutcome::Paused,
            ControlAction::Resume => ControlOutcome::Resumed,
        })
    }

    async fn retry_failed(&self, _task_id: &str) -> Result<(), ControlError> {
        Ok(())
    }

    async fn start_search(&self, _keyword: &str) -> Result<String, StartError> {
        Ok("S1".to_string())
    }

    async fn poll_search(&self, _task_id: &str) -> Result<SearchReport, PollError> {
        let mut scripts = self.search_scripts.lock().unwrap();
        let next = if scripts.len() > 1 {
            scripts.pop_front()
        } else {
            scripts.front().cloned()
        };
        next.unwrap_or_else(|| Ok(SearchReport::default()))
    }

    async fn fetch_artifact(&self, _filename: &str) -> Result<Vec<u8>, ArtifactError> {
        Ok(b"bytes".to_vec())
    }
}

fn fast_settings() -> ClientSettings {
    ClientSettings {
        channel: ChannelSettings::default(),
        download_poll_interval: Duration::from_millis(10),
        search_poll_interval: Duration::from_millis(10),
    }
}

#[test]
fn poll_loop_emits_reports_and_ends_on_done() {
    let api = ScriptedApi::with_download_script([
        Ok(running_report(30)),
        Ok(running_report(60)),
        Ok(done_report()),
    ]);
    let (handle, events) = ClientHandle::spawn_with_api(api, fast_settings());

    handle.begin_polling(PollKind::Download, "T1");

    let mut seen = Vec::new();
    loop {
        match events.recv_timeout(EVENT_WAIT).expect("poll event") {
            ChannelEvent::DownloadPolled { result } => {
                let report = result.expect("scripted ok");
                let terminal = report.is_terminal();
                seen.push(report.percent);
                if terminal {
                    break;
                }
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(seen, vec![30, 60, 100]);

    // The loop ended itself after the terminal report: silence follows.
    assert!(events.recv_timeout(QUIET_WAIT).is_err());
}

#[test]
fn poll_failure_ends_the_loop() {
    let api = ScriptedApi::with_download_script([Err(PollError::TaskGone(
        "Task not found".to_string(),
    ))]);
    let (handle, events) = ClientHandle::spawn_with_api(api, fast_settings());

    handle.begin_polling(PollKind::Download, "T1");

    match events.recv_timeout(EVENT_WAIT).expect("poll event") {
        ChannelEvent::DownloadPolled { result } => {
            assert!(matches!(result, Err(PollError::TaskGone(_))));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(events.recv_timeout(QUIET_WAIT).is_err());
}

#[test]
fn beginning_a_new_loop_supersedes_the_old_one() {
    let api = ScriptedApi::with_download_script([Ok(running_report(10))]);
    let (handle, events) = ClientHandle::spawn_with_api(api, fast_settings());

    handle.begin_polling(PollKind::Download, "OLD");

    // Wait until the old loop demonstrably runs.
    loop {
        match events.recv_timeout(EVENT_WAIT).expect("old loop event") {
            ChannelEvent::DownloadPolled { result } => {
                let report = result.expect("scripted ok");
                if report.log.as_deref() == Some("OLD") {
                    break;
                }
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    handle.begin_polling(PollKind::Download, "NEW");

    // After the handover at most one in-flight OLD report may still arrive;
    // once NEW reports show up, OLD must never appear again.
    let mut saw_new = false;
    let mut old_after_new = 0;
    for _ in 0..20 {
        match events.recv_timeout(EVENT_WAIT).expect("poll event") {
            ChannelEvent::DownloadPolled { result } => {
                let report = result.expect("scripted ok");
                match report.log.as_deref() {
                    Some("NEW") => saw_new = true,
                    Some("OLD") if saw_new => old_after_new += 1,
                    _ => {}
                }
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert!(saw_new);
    assert_eq!(old_after_new, 0);
}

#[test]
fn stop_polling_is_idempotent() {
    let api = ScriptedApi::with_download_script([Ok(running_report(10))]);
    let (handle, events) = ClientHandle::spawn_with_api(api.clone(), fast_settings());

    // Stopping without a live loop is a no-op, not an error.
    handle.stop_polling(PollKind::Download);
    handle.stop_polling(PollKind::Download);

    handle.begin_polling(PollKind::Download, "T1");
    events.recv_timeout(EVENT_WAIT).expect("loop is live");

    handle.stop_polling(PollKind::Download);
    handle.stop_polling(PollKind::Download);

    // Drain whatever was already queued; then nothing more arrives.
    while events.try_recv().is_ok() {}
    assert!(events.recv_timeout(QUIET_WAIT).is_err());
}

#[test]
fn search_loop_ends_on_done_report() {
    let api = ScriptedApi::with_search_script([
        Ok(SearchReport {
            logs: vec!["Probing source A".to_string()],
            ..SearchReport::default()
        }),
        Ok(SearchReport {
            done: true,
            ..SearchReport::default()
        }),
    ]);
    let (handle, events) = ClientHandle::spawn_with_api(api, fast_settings());

    handle.begin_polling(PollKind::Search, "S1");

    let mut done = false;
    for _ in 0..10 {
        match events.recv_timeout(EVENT_WAIT).expect("search event") {
            ChannelEvent::SearchPolled { result } => {
                if result.expect("scripted ok").done {
                    done = true;
                    break;
                }
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert!(done);
    assert!(events.recv_timeout(QUIET_WAIT).is_err());
}

#[test]
fn start_and_control_commands_report_back() {
    let api: Arc<ScriptedApi> = Arc::new(ScriptedApi::default());
    let (handle, events) = ClientHandle::spawn_with_api(api, fast_settings());

    handle.start_download("http://example.com/book");
    match events.recv_timeout(EVENT_WAIT).expect("start event") {
        ChannelEvent::DownloadStartFinished { result } => {
            assert_eq!(result.expect("scripted ok"), "T1");
        }
        other => panic!("unexpected event {other:?}"),
    }

    handle.control("T1", ControlAction::Pause);
    match events.recv_timeout(EVENT_WAIT).expect("control event") {
        ChannelEvent::ControlFinished { result } => {
            assert_eq!(result.expect("scripted ok"), ControlOutcome::Paused);
        }
        other => panic!("unexpected event {other:?}"),
    }

    handle.retry_failed("T1");
    match events.recv_timeout(EVENT_WAIT).expect("retry event") {
        ChannelEvent::RetryFinished { result } => {
            assert!(result.is_ok());
        }
        other => panic!("unexpected event {other:?}"),
    }
}
