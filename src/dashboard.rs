//! Server metrics dashboard: one frame is the current snapshot plus recent
//! history, fetched together and refreshed on a fixed interval.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::PanelClient;
use crate::errors::PanelError;
use panel_common::{CurrentMetrics, MetricsHistory};

/// Where dashboard frames come from.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn current(&self) -> Result<CurrentMetrics, PanelError>;
    async fn history(&self, minutes: u32) -> Result<MetricsHistory, PanelError>;
}

#[async_trait]
impl MetricsSource for PanelClient {
    async fn current(&self) -> Result<CurrentMetrics, PanelError> {
        self.current_metrics().await
    }

    async fn history(&self, minutes: u32) -> Result<MetricsHistory, PanelError> {
        self.metrics_history(minutes).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardFrame {
    pub current: CurrentMetrics,
    pub history: MetricsHistory,
    pub fetched_at: DateTime<Utc>,
}

/// Fetch the snapshot and `history_minutes` of history concurrently.
pub async fn fetch_frame<S: MetricsSource + ?Sized>(
    source: &S,
    history_minutes: u32,
) -> Result<DashboardFrame, PanelError> {
    let (current, history) =
        futures::try_join!(source.current(), source.history(history_minutes))?;
    Ok(DashboardFrame {
        current,
        history,
        fetched_at: Utc::now(),
    })
}

/// Refresh every `every` until `cancel` fires, handing each outcome to
/// `on_frame`. Failed refreshes are reported and skipped; an expired session
/// ends the loop. Returns the number of frames delivered.
pub async fn watch<S, F>(
    source: &S,
    history_minutes: u32,
    every: Duration,
    cancel: CancellationToken,
    mut on_frame: F,
) -> Result<usize, PanelError>
where
    S: MetricsSource + ?Sized,
    F: FnMut(Result<&DashboardFrame, &PanelError>),
{
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut delivered = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(delivered, "Metrics watch cancelled");
                return Ok(delivered);
            }
            _ = ticker.tick() => {}
        }

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(delivered),
            outcome = fetch_frame(source, history_minutes) => outcome,
        };
        match outcome {
            Ok(frame) => {
                delivered += 1;
                on_frame(Ok(&frame));
            }
            Err(e) if e.is_unauthorized() => return Err(e),
            Err(e) => {
                warn!(error = %e, "Metrics refresh failed");
                on_frame(Err(&e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeSource {
        current_calls: AtomicUsize,
        fail_every_other: bool,
        unauthorized: bool,
    }

    #[async_trait]
    impl MetricsSource for FakeSource {
        async fn current(&self) -> Result<CurrentMetrics, PanelError> {
            let n = self.current_calls.fetch_add(1, Ordering::SeqCst);
            if self.unauthorized {
                return Err(PanelError::Unauthorized);
            }
            if self.fail_every_other && n % 2 == 1 {
                return Err(PanelError::Remote {
                    status: 500,
                    message: None,
                });
            }
            Ok(CurrentMetrics::default())
        }

        async fn history(&self, minutes: u32) -> Result<MetricsHistory, PanelError> {
            Ok(MetricsHistory {
                metrics: Vec::new(),
                count: minutes as usize,
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_frame_joins_both() {
        let source = FakeSource::default();
        let frame = fetch_frame(&source, 60).await.unwrap();
        assert_eq!(frame.history.count, 60);
        assert_eq!(source.current_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_frame_fails_if_either_fails() {
        let source = FakeSource {
            unauthorized: true,
            ..Default::default()
        };
        assert!(fetch_frame(&source, 60).await.unwrap_err().is_unauthorized());
    }

    #[tokio::test]
    async fn test_watch_stops_on_cancel_and_skips_failures() {
        let source = FakeSource {
            fail_every_other: true,
            ..Default::default()
        };
        let cancel = CancellationToken::new();
        let mut ok = 0;
        let mut failed = 0;
        let stopper = cancel.clone();

        let delivered = watch(&source, 60, Duration::from_millis(5), cancel, |outcome| {
            match outcome {
                Ok(_) => ok += 1,
                Err(_) => failed += 1,
            }
            if ok + failed >= 4 {
                stopper.cancel();
            }
        })
        .await
        .unwrap();

        assert_eq!(delivered, 2);
        assert_eq!(ok, 2);
        assert_eq!(failed, 2);
    }

    #[tokio::test]
    async fn test_watch_ends_on_unauthorized() {
        let source = FakeSource {
            unauthorized: true,
            ..Default::default()
        };
        let err = watch(
            &source,
            60,
            Duration::from_millis(5),
            CancellationToken::new(),
            |_| {},
        )
        .await
        .unwrap_err();
        assert!(err.is_unauthorized());
    }
}
