//! Raw wire shapes and their conversion into the parsed report types.
//!
//! The service answers JSON objects with mostly optional fields; everything
//! here normalizes absent fields into the defaults the core relies on.

use serde::Deserialize;

use crate::types::{DownloadReport, ReportStatus, SearchRecord, SearchReport};

#[derive(Debug, Deserialize)]
pub(crate) struct RawStartAck {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawControlAck {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawProgress {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub control: Option<String>,
    #[serde(default)]
    pub percent: Option<u32>,
    #[serde(default)]
    pub current: Option<u32>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub success: Option<u32>,
    #[serde(default)]
    pub fail: Option<u32>,
    #[serde(default)]
    pub log: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub has_failed: Option<bool>,
    /// Present when the remote side no longer knows the task.
    #[serde(default)]
    pub error: Option<String>,
}

impl RawProgress {
    pub(crate) fn into_report(self) -> DownloadReport {
        DownloadReport {
            status: parse_status(self.status.as_deref()),
            paused: self.control.as_deref() == Some("paused"),
            percent: self.percent.unwrap_or(0),
            current: self.current.unwrap_or(0),
            total: self.total.unwrap_or(0),
            success: self.success.unwrap_or(0),
            fail: self.fail.unwrap_or(0),
            log: self.log,
            filename: self.filename,
            has_failed: self.has_failed.unwrap_or(false),
        }
    }
}

fn parse_status(status: Option<&str>) -> ReportStatus {
    match status {
        Some("done") => ReportStatus::Done,
        Some("error") => ReportStatus::Error,
        _ => ReportStatus::Running,
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSearchProgress {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub results: Vec<RawSearchHit>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub latest: Option<String>,
    pub url: String,
    #[serde(default)]
    pub is_captcha: bool,
    #[serde(default)]
    pub snippet: Option<String>,
}

impl RawSearchProgress {
    pub(crate) fn into_report(self) -> SearchReport {
        SearchReport {
            done: self.status.as_deref() == Some("done"),
            logs: self.logs,
            results: self.results.into_iter().map(RawSearchHit::into_record).collect(),
        }
    }
}

impl RawSearchHit {
    fn into_record(self) -> SearchRecord {
        SearchRecord {
            title: self.title,
            author: self.author,
            source: self.source,
            is_completed: self.is_completed,
            latest: self.latest,
            url: self.url,
            is_captcha: self.is_captcha,
            snippet: self.snippet,
        }
    }
}
