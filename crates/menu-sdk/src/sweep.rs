use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::task::JoinHandle;

use menu_snapshot::{IntegrityVerifier, SnapshotReader, VerificationReport};
use menu_types::{Clock, Timestamp};

use crate::error::MenuResult;

/// A snapshot that failed re-verification during a sweep.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityAlert {
    pub report: VerificationReport,
    pub detected_at: Timestamp,
}

/// Receives integrity alerts, e.g. to page an operator.
#[async_trait]
pub trait IntegrityAlertSink: Send + Sync {
    async fn alert(&self, alert: IntegrityAlert);
}

/// Sink that only logs.
#[derive(Debug, Default)]
pub struct LogAlertSink;

#[async_trait]
impl IntegrityAlertSink for LogAlertSink {
    async fn alert(&self, alert: IntegrityAlert) {
        tracing::error!(
            target: "integrity",
            snapshot = %alert.report.snapshot_id,
            organization = %alert.report.organization_id,
            version = alert.report.version,
            "integrity sweep found a tampered snapshot"
        );
    }
}

/// Counts from one sweep run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    pub checked: usize,
    pub failed: usize,
}

/// Periodically re-verifies the most recent snapshots.
pub struct Sweeper {
    snapshots: Arc<dyn SnapshotReader>,
    sink: Arc<dyn IntegrityAlertSink>,
    clock: Arc<dyn Clock>,
    batch_size: usize,
}

impl Sweeper {
    pub fn new(
        snapshots: Arc<dyn SnapshotReader>,
        sink: Arc<dyn IntegrityAlertSink>,
        clock: Arc<dyn Clock>,
        batch_size: usize,
    ) -> Self {
        Self {
            snapshots,
            sink,
            clock,
            batch_size,
        }
    }

    /// Verify the `batch_size` most recent snapshots once.
    pub async fn run_once(&self) -> MenuResult<SweepSummary> {
        let recent = self.snapshots.recent(self.batch_size)?;
        let mut summary = SweepSummary {
            checked: recent.len(),
            failed: 0,
        };
        for snapshot in &recent {
            let report = IntegrityVerifier::verify_snapshot(snapshot);
            if report.is_valid {
                continue;
            }
            summary.failed += 1;
            self.sink
                .alert(IntegrityAlert {
                    report,
                    detected_at: self.clock.now(),
                })
                .await;
        }
        tracing::debug!(checked = summary.checked, failed = summary.failed, "integrity sweep finished");
        Ok(summary)
    }
}

/// Run `sweeper` every `every` until the task is aborted.
pub fn spawn_sweep(sweeper: Arc<Sweeper>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = sweeper.run_once().await {
                tracing::warn!(error = %e, "integrity sweep failed");
            }
        }
    })
}
