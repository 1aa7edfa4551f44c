//! Report Session
//!
//! In-memory state shared by the front end: the monitoring configuration,
//! the archive of generated reports (most recent first) and the current
//! selection. Guards against overlapping generations and lets a caller
//! abandon the outstanding one without its late result landing in state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Notify, RwLock};
use tracing::{info, warn};

use crate::config::MonitoringConfiguration;
use crate::error::GenerationError;
use crate::generator::StructuredReportGenerator;
use crate::report::IntelligenceReport;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a report is already being generated")]
    Busy,
    #[error("report generation was cancelled")]
    Cancelled,
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Clears the in-flight flag however the generation ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct ReportSession {
    generator: Arc<StructuredReportGenerator>,
    config: RwLock<MonitoringConfiguration>,
    reports: RwLock<Vec<IntelligenceReport>>,
    selected: RwLock<Option<String>>,
    in_flight: AtomicBool,
    /// Bumped on every cancel; a generation only commits under its own epoch.
    epoch: AtomicU64,
    cancelled: Notify,
}

impl ReportSession {
    pub fn new(generator: Arc<StructuredReportGenerator>, config: MonitoringConfiguration) -> Self {
        Self {
            generator,
            config: RwLock::new(config),
            reports: RwLock::new(Vec::new()),
            selected: RwLock::new(None),
            in_flight: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            cancelled: Notify::new(),
        }
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Generate a report from a snapshot of the current configuration.
    ///
    /// On success the report is archived at the front and selected. On any
    /// error the archive and selection are left exactly as they were.
    pub async fn generate(&self) -> Result<IntelligenceReport, SessionError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            warn!("Generation requested while another is in flight; ignoring");
            return Err(SessionError::Busy);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let ticket = self.epoch.load(Ordering::SeqCst);
        let cancelled = self.cancelled.notified();
        tokio::pin!(cancelled);
        cancelled.as_mut().enable();
        if self.epoch.load(Ordering::SeqCst) != ticket {
            return Err(SessionError::Cancelled);
        }

        let config = self.config.read().await.clone();

        let result = tokio::select! {
            res = self.generator.generate(&config) => res,
            _ = &mut cancelled => {
                info!("Report generation cancelled");
                return Err(SessionError::Cancelled);
            }
        };
        let report = result?;

        // A cancel that raced with completion still wins.
        if self.epoch.load(Ordering::SeqCst) != ticket {
            info!(id = %report.id, "Discarding stale report");
            return Err(SessionError::Cancelled);
        }

        self.reports.write().await.insert(0, report.clone());
        *self.selected.write().await = Some(report.id.clone());
        Ok(report)
    }

    /// Abandon the outstanding generation, if any. Returns whether one was
    /// in flight.
    pub fn cancel(&self) -> bool {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.cancelled.notify_waiters();
        self.is_generating()
    }

    // ── configuration ────────────────────────────────────────────────────────

    pub async fn configuration(&self) -> MonitoringConfiguration {
        self.config.read().await.clone()
    }

    pub async fn add_keyword(&self, keyword: &str) -> bool {
        self.config.write().await.add_keyword(keyword)
    }

    pub async fn remove_keyword(&self, keyword: &str) -> bool {
        self.config.write().await.remove_keyword(keyword)
    }

    // ── archive ──────────────────────────────────────────────────────────────

    /// All reports, most recent first.
    pub async fn reports(&self) -> Vec<IntelligenceReport> {
        self.reports.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.reports.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reports.read().await.is_empty()
    }

    pub async fn latest(&self) -> Option<IntelligenceReport> {
        self.reports.read().await.first().cloned()
    }

    pub async fn get(&self, id: &str) -> Option<IntelligenceReport> {
        self.reports.read().await.iter().find(|r| r.id == id).cloned()
    }

    /// Look up by id prefix, case-insensitive (short ids are shown uppercased).
    pub async fn find(&self, prefix: &str) -> Option<IntelligenceReport> {
        let prefix = prefix.to_lowercase();
        if prefix.is_empty() {
            return None;
        }
        self.reports
            .read()
            .await
            .iter()
            .find(|r| r.id.to_lowercase().starts_with(&prefix))
            .cloned()
    }

    /// Select an archived report. Returns false for unknown ids.
    pub async fn select(&self, id: &str) -> bool {
        let known = self.reports.read().await.iter().any(|r| r.id == id);
        if known {
            *self.selected.write().await = Some(id.to_string());
        }
        known
    }

    /// The selected report, falling back to the most recent one.
    pub async fn selected(&self) -> Option<IntelligenceReport> {
        let selected = self.selected.read().await.clone();
        let reports = self.reports.read().await;
        selected
            .and_then(|id| reports.iter().find(|r| r.id == id).cloned())
            .or_else(|| reports.first().cloned())
    }
}
