//! Attendance and event log clients
//!
//! `LogClient` talks to the remote logging API:
//! - `POST <base>/logs` with a `LogEvent` JSON body
//! - `GET <base>/logs` returning a JSON array of events
//! - `GET <base>/attendance` returning `{ "count": n }`
//!
//! Failures are reported to the caller once; nothing is retried or queued.
//! `MemoryEventLog` keeps events in process for runs without a remote API.

use std::collections::HashSet;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::interface::{AttendanceSummary, EventAction, EventLog, LogEvent};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const LOGS_PATH: &str = "logs";
const ATTENDANCE_PATH: &str = "attendance";

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Log API returned {status}: {body}")]
    Status { status: u16, body: String },
}

pub type LogResult<T> = Result<T, LogError>;

/// HTTP client for the remote log API
#[derive(Debug, Clone)]
pub struct LogClient {
    client: reqwest::Client,
    base_url: Url,
}

impl LogClient {
    pub fn new(base_url: &str) -> LogResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> LogResult<Self> {
        // Without a trailing slash `Url::join` would replace the last segment
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("voucher/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> LogResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn check(response: reqwest::Response) -> LogResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Log API request failed");
        Err(LogError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait::async_trait]
impl EventLog for LogClient {
    async fn post_event(&self, event: &LogEvent) -> LogResult<()> {
        let url = self.endpoint(LOGS_PATH)?;
        debug!(url = url.as_str(), action = event.action.as_str(), student = event.student_id.as_str(), "Posting event");
        let response = self.client.post(url).json(event).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn fetch_logs(&self) -> LogResult<Vec<LogEvent>> {
        let url = self.endpoint(LOGS_PATH)?;
        let response = self.client.get(url).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn fetch_attendance(&self) -> LogResult<AttendanceSummary> {
        let url = self.endpoint(ATTENDANCE_PATH)?;
        let response = self.client.get(url).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

/// In-process event log. Attendance counts distinct students marked present.
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().clone()
    }
}

#[async_trait::async_trait]
impl EventLog for MemoryEventLog {
    async fn post_event(&self, event: &LogEvent) -> LogResult<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }

    async fn fetch_logs(&self) -> LogResult<Vec<LogEvent>> {
        Ok(self.events())
    }

    async fn fetch_attendance(&self) -> LogResult<AttendanceSummary> {
        let events = self.events.lock();
        let present: HashSet<&str> = events
            .iter()
            .filter(|e| e.action == EventAction::Attendance)
            .map(|e| e.student_id.as_str())
            .collect();
        Ok(AttendanceSummary {
            count: present.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudentRecord;

    #[test]
    fn test_endpoints_keep_base_path() {
        let client = LogClient::new("http://localhost:8080/api/v1").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/api/v1/");
        assert_eq!(
            client.endpoint(LOGS_PATH).unwrap().as_str(),
            "http://localhost:8080/api/v1/logs"
        );
        assert_eq!(
            client.endpoint(ATTENDANCE_PATH).unwrap().as_str(),
            "http://localhost:8080/api/v1/attendance"
        );

        let slashed = LogClient::new("http://localhost:8080/").unwrap();
        assert_eq!(slashed.endpoint(LOGS_PATH).unwrap().as_str(), "http://localhost:8080/logs");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(matches!(LogClient::new("not a url"), Err(LogError::InvalidUrl(_))));
    }

    #[test]
    fn test_event_wire_format() {
        let record = StudentRecord::new(1001, "Ayesha Khan", 1);
        let event = LogEvent::for_record(EventAction::Print, &record);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "print");
        assert_eq!(json["student_id"], "1001");
        assert_eq!(json["student_name"], "Ayesha Khan");
        assert_eq!(json["serial"], "1");
        assert!(json["timestamp"].is_string());

        let parsed: LogEvent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, event);
    }

    #[tokio::test]
    async fn test_memory_log_counts_distinct_attendance() {
        let log = MemoryEventLog::new();
        let ayesha = StudentRecord::new(1001, "Ayesha Khan", 1);
        let bilal = StudentRecord::new(1002, "Bilal Ahmed", 2);

        log.post_event(&LogEvent::for_record(EventAction::Attendance, &ayesha)).await.unwrap();
        log.post_event(&LogEvent::for_record(EventAction::Attendance, &ayesha)).await.unwrap();
        log.post_event(&LogEvent::for_record(EventAction::Print, &bilal)).await.unwrap();

        assert_eq!(log.fetch_logs().await.unwrap().len(), 3);
        assert_eq!(log.fetch_attendance().await.unwrap(), AttendanceSummary { count: 1 });
    }
}
