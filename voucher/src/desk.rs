//! VoucherDesk - binds the search engine to the voucher and log collaborators
//!
//! Action buttons read the selection snapshot at the moment they are invoked.
//! The local effect (render, write) happens first; the log call follows and
//! its outcome is handed back in the receipt, so a log outage never loses a
//! voucher and never touches search state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::attendance::{LogClient, LogError, MemoryEventLog};
use crate::config::Config;
use crate::demo_data::demo_roster;
use crate::engine::SearchEngine;
use crate::interface::{
    AttendanceSummary, EventAction, EventLog, LogEvent, VoucherError, VoucherResult,
};
use crate::models::StudentRecord;
use crate::render::{VoucherDocument, VoucherRenderer};
use crate::roster::Roster;

/// Outcome of an action button
#[derive(Debug)]
pub struct ActionReceipt<T> {
    pub record: StudentRecord,
    pub output: T,
    /// Whether the event reached the log
    pub logged: Result<(), LogError>,
}

pub struct VoucherDesk {
    engine: SearchEngine,
    renderer: VoucherRenderer,
    log: Arc<dyn EventLog>,
}

impl VoucherDesk {
    pub fn new(engine: SearchEngine, renderer: VoucherRenderer, log: Arc<dyn EventLog>) -> Self {
        Self { engine, renderer, log }
    }

    /// Wire up a desk from configuration.
    ///
    /// A roster that fails to load is reported and replaced by an empty one so
    /// the desk still starts; an invalid log API URL is an error.
    pub fn from_config(config: &Config) -> VoucherResult<Self> {
        let roster = match &config.roster_path {
            Some(path) => Roster::load(path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Roster failed to load, starting empty");
                Roster::empty()
            }),
            None => {
                info!("No roster configured, using demo roster");
                demo_roster()
            }
        };

        let log: Arc<dyn EventLog> = match &config.log_api_url {
            Some(url) => Arc::new(LogClient::with_timeout(url, config.http_timeout)?),
            None => {
                info!("No log API configured, keeping events in memory");
                Arc::new(MemoryEventLog::new())
            }
        };

        Ok(Self::new(
            SearchEngine::with_debounce(roster, config.debounce),
            VoucherRenderer::new(config.event_title.clone()),
            log,
        ))
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub fn renderer(&self) -> &VoucherRenderer {
        &self.renderer
    }

    pub fn event_log(&self) -> &Arc<dyn EventLog> {
        &self.log
    }

    /// Load a roster export and hand it to the engine. Returns the record count.
    pub fn reload_roster(&self, path: &Path) -> VoucherResult<usize> {
        let roster = Roster::load(path)?;
        let count = roster.len();
        self.engine.set_roster(roster);
        Ok(count)
    }

    fn selected(&self) -> VoucherResult<StudentRecord> {
        self.engine.selection().ok_or(VoucherError::NoSelection)
    }

    async fn record_event(&self, action: EventAction, record: &StudentRecord) -> Result<(), LogError> {
        let event = LogEvent::for_record(action, record);
        let result = self.log.post_event(&event).await;
        if let Err(e) = &result {
            warn!(action = action.as_str(), error = %e, "Failed to log event");
        }
        result
    }

    /// Render the voucher for the current selection without logging
    pub fn preview(&self) -> VoucherResult<VoucherDocument> {
        Ok(self.renderer.render(&self.selected()?))
    }

    /// Render thermal text for the current selection and log a print
    pub async fn print_voucher(&self) -> VoucherResult<ActionReceipt<String>> {
        let record = self.selected()?;
        let text = self.renderer.render(&record).to_thermal_text();
        let logged = self.record_event(EventAction::Print, &record).await;
        Ok(ActionReceipt { record, output: text, logged })
    }

    /// Write the voucher PDF into `dir` and log a download. Returns the written path.
    pub async fn download_voucher(&self, dir: &Path) -> VoucherResult<ActionReceipt<PathBuf>> {
        let record = self.selected()?;
        let document = self.renderer.render(&record);
        let pdf = document.to_pdf()?;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(document.file_name());
        tokio::fs::write(&path, pdf).await?;
        info!(path = %path.display(), "Voucher written");

        let logged = self.record_event(EventAction::Download, &record).await;
        Ok(ActionReceipt { record, output: path, logged })
    }

    /// Mark the selected student present
    pub async fn mark_attendance(&self) -> VoucherResult<ActionReceipt<()>> {
        let record = self.selected()?;
        let logged = self.record_event(EventAction::Attendance, &record).await;
        Ok(ActionReceipt { record, output: (), logged })
    }

    pub async fn fetch_logs(&self) -> VoucherResult<Vec<LogEvent>> {
        Ok(self.log.fetch_logs().await?)
    }

    pub async fn fetch_attendance(&self) -> VoucherResult<AttendanceSummary> {
        Ok(self.log.fetch_attendance().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Log that rejects every write
    struct DownLog;

    #[async_trait::async_trait]
    impl EventLog for DownLog {
        async fn post_event(&self, _event: &LogEvent) -> Result<(), LogError> {
            Err(LogError::Status { status: 503, body: "maintenance".into() })
        }

        async fn fetch_logs(&self) -> Result<Vec<LogEvent>, LogError> {
            Err(LogError::Status { status: 503, body: "maintenance".into() })
        }

        async fn fetch_attendance(&self) -> Result<AttendanceSummary, LogError> {
            Err(LogError::Status { status: 503, body: "maintenance".into() })
        }
    }

    fn desk_with(log: Arc<dyn EventLog>) -> VoucherDesk {
        VoucherDesk::new(
            SearchEngine::with_debounce(demo_roster(), Duration::from_millis(300)),
            VoucherRenderer::default(),
            log,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_actions_require_selection() {
        let desk = desk_with(Arc::new(MemoryEventLog::new()));
        assert!(matches!(desk.print_voucher().await, Err(VoucherError::NoSelection)));
        assert!(matches!(desk.mark_attendance().await, Err(VoucherError::NoSelection)));
        assert!(matches!(desk.preview(), Err(VoucherError::NoSelection)));

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            desk.download_voucher(dir.path()).await,
            Err(VoucherError::NoSelection)
        ));
        assert!(desk.fetch_logs().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_print_and_mark_are_logged() {
        let log = Arc::new(MemoryEventLog::new());
        let desk = desk_with(log.clone());
        desk.engine().set_query("1001");
        desk.engine().settled().await;

        let printed = desk.print_voucher().await.unwrap();
        assert!(printed.logged.is_ok());
        assert!(printed.output.contains("Name: Ayesha Khan"));

        desk.mark_attendance().await.unwrap().logged.unwrap();

        let actions: Vec<EventAction> = log.events().iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![EventAction::Print, EventAction::Attendance]);
        assert_eq!(desk.fetch_attendance().await.unwrap().count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_writes_file_even_when_log_is_down() {
        let desk = desk_with(Arc::new(DownLog));
        desk.engine().set_query("khan");
        desk.engine().settled().await;
        assert!(desk.engine().selection().is_none());

        let hira = desk.engine().suggestions()[1].clone();
        desk.engine().select_explicit(hira.clone());

        let dir = tempfile::tempdir().unwrap();
        let receipt = desk.download_voucher(dir.path()).await.unwrap();
        assert_eq!(receipt.record, hira);
        assert!(matches!(receipt.logged, Err(LogError::Status { status: 503, .. })));
        assert_eq!(receipt.output, dir.path().join("voucher_2001.pdf"));

        let written = std::fs::read(&receipt.output).unwrap();
        assert!(written.starts_with(b"%PDF-"));

        // Log failures leave search state alone
        assert_eq!(desk.engine().selection(), Some(hira));
    }

    #[test]
    fn test_from_config_survives_missing_roster() {
        let config = Config {
            roster_path: Some(PathBuf::from("/nonexistent/students.csv")),
            ..Config::default()
        };
        let desk = VoucherDesk::from_config(&config).unwrap();
        assert!(desk.engine().roster().is_empty());
    }

    #[test]
    fn test_from_config_rejects_bad_log_url() {
        let config = Config {
            log_api_url: Some("::not a url::".into()),
            ..Config::default()
        };
        assert!(matches!(
            VoucherDesk::from_config(&config),
            Err(VoucherError::Log(LogError::InvalidUrl(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_roster_feeds_engine() {
        let desk = desk_with(Arc::new(MemoryEventLog::new()));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.csv");
        std::fs::write(&path, "StudentId,Student Name,SNo\n9001,New Student,1\n").unwrap();

        assert_eq!(desk.reload_roster(&path).unwrap(), 1);
        desk.engine().set_query("9001");
        let state = desk.engine().settled().await;
        assert_eq!(state.selection.map(|r| r.id_string()), Some("9001".to_string()));
    }
}
