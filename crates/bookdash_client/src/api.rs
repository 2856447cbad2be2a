use std::time::Duration;

use crate::types::{
    ArtifactError, ControlAction, ControlError, ControlOutcome, DownloadReport, PollError,
    SearchReport, StartError,
};
use crate::wire::{RawControlAck, RawProgress, RawSearchProgress, RawStartAck};

/// Connection settings for the snapshot channel.
#[derive(Debug, Clone)]
pub struct ChannelSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// One request/response round-trip per call, no implicit retries. The caller
/// owns all retry policy.
#[async_trait::async_trait]
pub trait SnapshotApi: Send + Sync {
    async fn start_download(&self, url: &str) -> Result<String, StartError>;
    async fn poll_download(&self, task_id: &str) -> Result<DownloadReport, PollError>;
    async fn control(
        &self,
        task_id: &str,
        action: ControlAction,
    ) -> Result<ControlOutcome, ControlError>;
    async fn retry_failed(&self, task_id: &str) -> Result<(), ControlError>;
    async fn start_search(&self, keyword: &str) -> Result<String, StartError>;
    async fn poll_search(&self, task_id: &str) -> Result<SearchReport, PollError>;
    async fn fetch_artifact(&self, filename: &str) -> Result<Vec<u8>, ArtifactError>;
}

/// Reqwest-backed channel implementation.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base: String,
}

impl HttpApi {
    pub fn new(settings: ChannelSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

#[async_trait::async_trait]
impl SnapshotApi for HttpApi {
    async fn start_download(&self, url: &str) -> Result<String, StartError> {
        let response = self
            .client
            .post(self.url("/api/start"))
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await
            .map_err(|err| StartError::Network(err.to_string()))?;
        // Rejections come back with a non-success status and an error body;
        // parse the body first so the message survives.
        let ack: RawStartAck = response
            .json()
            .await
            .map_err(|err| StartError::Malformed(err.to_string()))?;
        if let Some(error) = ack.error {
            return Err(StartError::Rejected(error));
        }
        ack.task_id
            .ok_or_else(|| StartError::Malformed("missing task_id".to_string()))
    }

    async fn poll_download(&self, task_id: &str) -> Result<DownloadReport, PollError> {
        let response = self
            .client
            .get(self.url(&format!("/api/progress/{task_id}")))
            .send()
            .await
            .map_err(|err| PollError::Network(err.to_string()))?;
        let status = response.status();
        let raw: RawProgress = response.json().await.map_err(|err| {
            if status == reqwest::StatusCode::NOT_FOUND {
                PollError::TaskGone(status.to_string())
            } else {
                PollError::Malformed(err.to_string())
            }
        })?;
        if let Some(error) = raw.error {
            return Err(PollError::TaskGone(error));
        }
        if !status.is_success() {
            return Err(PollError::Network(status.to_string()));
        }
        Ok(raw.into_report())
    }

    async fn control(
        &self,
        task_id: &str,
        action: ControlAction,
    ) -> Result<ControlOutcome, ControlError> {
        let response = self
            .client
            .post(self.url(&format!("/api/control/{}", action.as_path_segment())))
            .json(&serde_json::json!({ "task_id": task_id }))
            .send()
            .await
            .map_err(|err| ControlError::Network(err.to_string()))?;
        let ack: RawControlAck = response
            .json()
            .await
            .map_err(|err| ControlError::Malformed(err.to_string()))?;
        if let Some(error) = ack.error {
            return Err(ControlError::Rejected(error));
        }
        match ack.status.as_deref() {
            Some("paused") => Ok(ControlOutcome::Paused),
            Some("resumed") => Ok(ControlOutcome::Resumed),
            other => Err(ControlError::Malformed(format!(
                "unexpected control status {other:?}"
            ))),
        }
    }

    async fn retry_failed(&self, task_id: &str) -> Result<(), ControlError> {
        let response = self
            .client
            .post(self.url(&format!("/api/retry_failed/{task_id}")))
            .send()
            .await
            .map_err(|err| ControlError::Network(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        match response.json::<RawControlAck>().await {
            Ok(RawControlAck {
                error: Some(error), ..
            }) => Err(ControlError::Rejected(error)),
            _ => Err(ControlError::Rejected(status.to_string())),
        }
    }

    async fn start_search(&self, keyword: &str) -> Result<String, StartError> {
        let response = self
            .client
            .post(self.url("/api/search/start"))
            .json(&serde_json::json!({ "keyword": keyword }))
            .send()
            .await
            .map_err(|err| StartError::Network(err.to_string()))?;
        let ack: RawStartAck = response
            .json()
            .await
            .map_err(|err| StartError::Malformed(err.to_string()))?;
        if let Some(error) = ack.error {
            return Err(StartError::Rejected(error));
        }
        ack.task_id
            .ok_or_else(|| StartError::Malformed("missing task_id".to_string()))
    }

    async fn poll_search(&self, task_id: &str) -> Result<SearchReport, PollError> {
        let response = self
            .client
            .get(self.url(&format!("/api/search/progress/{task_id}")))
            .send()
            .await
            .map_err(|err| PollError::Network(err.to_string()))?;
        let status = response.status();
        let raw: RawSearchProgress = response.json().await.map_err(|err| {
            if status == reqwest::StatusCode::NOT_FOUND {
                PollError::TaskGone(status.to_string())
            } else {
                PollError::Malformed(err.to_string())
            }
        })?;
        if let Some(error) = raw.error {
            return Err(PollError::TaskGone(error));
        }
        if !status.is_success() {
            return Err(PollError::Network(status.to_string()));
        }
        Ok(raw.into_report())
    }

    async fn fetch_artifact(&self, filename: &str) -> Result<Vec<u8>, ArtifactError> {
        let response = self
            .client
            .get(self.url(&format!("/api/download/{filename}")))
            .send()
            .await
            .map_err(|err| ArtifactError::Network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ArtifactError::HttpStatus(status.as_u16()));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ArtifactError::Network(err.to_string()))?;
        Ok(bytes.to_vec())
    }
}
