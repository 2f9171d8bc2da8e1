//! Best-effort background mirroring of metrics to the remote ledger.
//!
//! Local state is always committed before [`RemoteMirror::dispatch`] is
//! called. The spawned task's result never flows back into the session: it is
//! logged and, if the caller asked for it, sent on a completion channel.
//! At most one attempt per dispatch, no retries.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::LedgerError;
use crate::ledger::LedgerClient;
use crate::metrics::MetricsRecord;

/// What happened to one mirror attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MirrorOutcome {
    Submitted { tx_hash: String },
    Failed { reason: String },
    /// No active ledger session; nothing was sent.
    Skipped,
}

/// Spawns ledger submissions onto the tokio runtime.
#[derive(Clone)]
pub struct RemoteMirror {
    client: Arc<dyn LedgerClient>,
    timeout: Option<Duration>,
}

impl RemoteMirror {
    pub fn new(client: Arc<dyn LedgerClient>) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Bound each submission. `Duration::ZERO` means no bound.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    pub fn is_session_active(&self) -> bool {
        self.client.is_session_active()
    }

    /// Submit `record` in the background.
    ///
    /// Returns `None` without spawning when no session is active (a
    /// `Skipped` outcome is still sent on `completion`). Must be called from
    /// within a tokio runtime.
    pub fn dispatch(
        &self,
        record: &MetricsRecord,
        completion: Option<UnboundedSender<MirrorOutcome>>,
    ) -> Option<JoinHandle<MirrorOutcome>> {
        if !self.client.is_session_active() {
            if let Some(tx) = completion {
                let _ = tx.send(MirrorOutcome::Skipped);
            }
            return None;
        }

        let client = Arc::clone(&self.client);
        let timeout = self.timeout;
        let (steps, water, sleep) = (record.steps, record.water_intake, record.sleep_hours);
        let date = record.date;

        Some(tokio::spawn(async move {
            let submit = client.submit_metrics(steps, water, sleep);
            let result = match timeout {
                Some(limit) => tokio::time::timeout(limit, submit)
                    .await
                    .unwrap_or(Err(LedgerError::Timeout {
                        timeout_secs: limit.as_secs(),
                    })),
                None => submit.await,
            };

            let outcome = match result {
                Ok(tx_hash) => {
                    info!(%date, tx_hash = %tx_hash, "mirrored health data to ledger");
                    MirrorOutcome::Submitted { tx_hash }
                }
                Err(e) => {
                    warn!(%date, error = %e, "ledger mirror failed; local state kept");
                    MirrorOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            if let Some(tx) = completion {
                let _ = tx.send(outcome.clone());
            }
            outcome
        }))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeLedger;
    use super::*;

    fn record() -> MetricsRecord {
        MetricsRecord {
            steps: 9_000,
            water_intake: 7,
            sleep_hours: 8,
            calories: 2_000,
            date: chrono::NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(),
        }
    }

    #[tokio::test]
    async fn submits_raw_metrics() {
        let ledger = Arc::new(FakeLedger::active());
        let mirror = RemoteMirror::new(ledger.clone());
        let outcome = mirror.dispatch(&record(), None).unwrap().await.unwrap();
        assert_eq!(
            outcome,
            MirrorOutcome::Submitted {
                tx_hash: "0xabc123".into()
            }
        );
        assert_eq!(*ledger.calls.lock().unwrap(), vec![(9_000, 7, 8)]);
    }

    #[tokio::test]
    async fn failure_is_reported_on_channel() {
        let mirror = RemoteMirror::new(Arc::new(FakeLedger::failing()));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        mirror.dispatch(&record(), Some(tx));
        match rx.recv().await.unwrap() {
            MirrorOutcome::Failed { reason } => assert!(reason.contains("execution reverted")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn inactive_session_skips_without_spawning() {
        let ledger = Arc::new(FakeLedger::inactive());
        let mirror = RemoteMirror::new(ledger.clone());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        assert!(mirror.dispatch(&record(), Some(tx)).is_none());
        assert_eq!(rx.recv().await, Some(MirrorOutcome::Skipped));
        assert!(ledger.calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_turns_into_failure() {
        let ledger = FakeLedger {
            delay: Some(Duration::from_secs(60)),
            ..FakeLedger::active()
        };
        let mirror = RemoteMirror::new(Arc::new(ledger)).with_timeout(Duration::from_secs(5));
        let outcome = mirror.dispatch(&record(), None).unwrap().await.unwrap();
        assert_eq!(
            outcome,
            MirrorOutcome::Failed {
                reason: "Ledger call timed out after 5 seconds".into()
            }
        );
    }
}
