//! Pure mapping from job state to render instructions.
//!
//! No business logic lives here: every field is derived from the state
//! machines and the front-end only has to display it.

use crate::download::{DownloadJob, DownloadPhase};
use crate::search::{SearchJob, SearchPhase};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub download: DownloadView,
    pub search: SearchView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DownloadView {
    /// Progress bar position, clamped to 0..=100.
    pub bar_percent: u32,
    pub percent_text: String,
    /// Counter line, present once the remote side reports a total.
    pub stats_text: Option<String>,
    pub status_text: String,
    pub status_is_error: bool,
    pub start_enabled: bool,
    pub start_label: &'static str,
    /// Pause/resume button row; hidden outside an active job.
    pub controls_visible: bool,
    pub pause_visible: bool,
    pub resume_visible: bool,
    pub retry_visible: bool,
    pub save_link: Option<ArtifactLink>,
    pub log_lines: Vec<String>,
}

/// Link target for a downloadable artifact, partial or final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLink {
    pub label: &'static str,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchView {
    pub visible: bool,
    pub log_lines: Vec<String>,
    pub rows: Vec<ResultRow>,
    pub contact_lost: bool,
    pub searching: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultRowKind {
    /// A normal record whose action starts a download.
    Download,
    /// A record that needs manual verification; action opens its link.
    Verify,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub kind: ResultRowKind,
    pub title: String,
    pub meta: String,
    pub url: String,
}

pub(crate) fn build(state: &AppState) -> AppViewModel {
    AppViewModel {
        download: download_view(&state.download),
        search: search_view(&state.search),
        dirty: state.is_dirty(),
    }
}

fn download_view(job: &DownloadJob) -> DownloadView {
    let progress = job.progress();
    let phase = job.phase();

    let stats_text = (progress.total > 0).then(|| {
        format!(
            "{} / {}  ok {}  failed {}",
            progress.current, progress.total, progress.success, progress.fail
        )
    });

    let (start_enabled, start_label) = match phase {
        DownloadPhase::Starting => (false, "Starting..."),
        DownloadPhase::Done => (true, "Done"),
        DownloadPhase::Idle | DownloadPhase::Errored => (true, "Download"),
        DownloadPhase::Running | DownloadPhase::Paused => (job.contact_lost(), "Download"),
    };

    let controls_visible =
        matches!(phase, DownloadPhase::Running | DownloadPhase::Paused) && !job.contact_lost();

    let save_link = job.artifact().and_then(|filename| {
        let label = match phase {
            DownloadPhase::Paused => "Save current progress",
            DownloadPhase::Done => "Save result",
            _ => return None,
        };
        Some(ArtifactLink {
            label,
            href: format!("/api/download/{filename}"),
        })
    });

    DownloadView {
        bar_percent: progress.percent.min(100),
        percent_text: format!("{}%", progress.percent),
        stats_text,
        status_text: job.status_line().to_string(),
        status_is_error: job.status_is_error(),
        start_enabled,
        start_label,
        controls_visible,
        pause_visible: controls_visible && phase == DownloadPhase::Running,
        resume_visible: controls_visible && phase == DownloadPhase::Paused,
        retry_visible: job.has_failed_items(),
        save_link,
        log_lines: job.log().entries().to_vec(),
    }
}

fn search_view(job: &SearchJob) -> SearchView {
    let rows = job
        .results()
        .iter()
        .map(|hit| {
            if hit.needs_verification {
                ResultRow {
                    kind: ResultRowKind::Verify,
                    title: if hit.title.is_empty() {
                        "Verification required".to_string()
                    } else {
                        hit.title.clone()
                    },
                    meta: hit
                        .snippet
                        .clone()
                        .unwrap_or_else(|| "Manual verification needed".to_string()),
                    url: hit.url.clone(),
                }
            } else {
                ResultRow {
                    kind: ResultRowKind::Download,
                    title: if hit.title.is_empty() {
                        "Untitled".to_string()
                    } else {
                        hit.title.clone()
                    },
                    meta: hit_meta(hit),
                    url: hit.url.clone(),
                }
            }
        })
        .collect();

    SearchView {
        visible: job.is_visible(),
        log_lines: job.log().entries().to_vec(),
        rows,
        contact_lost: job.contact_lost(),
        searching: job.phase() == SearchPhase::Running && !job.contact_lost(),
    }
}

fn hit_meta(hit: &crate::SearchHit) -> String {
    let mut parts = Vec::new();
    if let Some(author) = &hit.author {
        parts.push(author.clone());
    }
    parts.push(
        hit.source
            .clone()
            .unwrap_or_else(|| "unknown source".to_string()),
    );
    if hit.is_completed {
        parts.push("completed".to_string());
    }
    if let Some(latest) = &hit.latest {
        if !latest.is_empty() {
            parts.push(latest.clone());
        }
    }
    parts.join(" | ")
}
