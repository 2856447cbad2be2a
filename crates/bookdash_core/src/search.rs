use crate::log_pane::LogPane;
use crate::snapshot::{SearchHit, SearchSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Running,
    Done,
}

/// Authoritative local view of the search job.
///
/// Results grow monotonically until a terminal snapshot replaces them with
/// the final authoritative set. Record-level merging never happens locally;
/// only the log goes through the dedup filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchJob {
    task_id: Option<String>,
    phase: SearchPhase,
    log: LogPane,
    results: Vec<SearchHit>,
    contact_lost: bool,
    visible: bool,
}

impl SearchJob {
    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn log(&self) -> &LogPane {
        &self.log
    }

    pub fn results(&self) -> &[SearchHit] {
        &self.results
    }

    pub fn contact_lost(&self) -> bool {
        self.contact_lost
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// A new search wipes any previous one and seeds the log while the
    /// remote side has nothing to report yet.
    pub(crate) fn begin(&mut self) {
        *self = Self {
            visible: true,
            ..Self::default()
        };
        self.log.push("Initializing search engines...");
    }

    /// True only between `begin` and the start acknowledgement. A start ack
    /// arriving outside this window is a late reply for a superseded search
    /// and must not overwrite the identifier.
    pub(crate) fn awaiting_start(&self) -> bool {
        self.visible && self.phase == SearchPhase::Idle && self.task_id.is_none()
    }

    pub(crate) fn started(&mut self, task_id: String) {
        self.task_id = Some(task_id);
        self.phase = SearchPhase::Running;
    }

    pub(crate) fn start_failed(&mut self, error: &str) {
        self.log.push(&format!("Search start failed: {error}"));
    }

    /// Merges one snapshot. Returns true when the poll loop must stop.
    pub(crate) fn apply_snapshot(&mut self, snapshot: &SearchSnapshot) -> bool {
        // The remote side owns the full log sequence; rebuild through the
        // dedup filter so a repeated snapshot is a no-op.
        self.log.rebuild(snapshot.logs.iter().map(String::as_str));

        if snapshot.done {
            // Terminal: the final set replaces the list wholesale.
            self.results = snapshot.results.clone();
            self.phase = SearchPhase::Done;
            return true;
        }
        if !snapshot.results.is_empty() {
            self.results = snapshot.results.clone();
        }
        false
    }

    /// Contact lost: freeze the view and tell the user to search again.
    pub(crate) fn poll_failed(&mut self) {
        self.contact_lost = true;
        self.log
            .push("Connection lost (task expired). Please search again.");
    }

    pub(crate) fn hide(&mut self) {
        self.visible = false;
    }
}
