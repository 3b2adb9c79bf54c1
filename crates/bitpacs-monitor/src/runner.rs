//! Change monitor loop — polls one facility's changes feed on a fixed
//! interval until cancelled.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use bitpacs_core::config::monitor::MonitorConfig;

use crate::reconciler::{ChangesSource, Reconciler, TickOutcome};

/// Owns a [`Reconciler`] and drives it on a timer for one facility.
///
/// Tick failures are logged and retried on the next scheduled tick; no
/// error escapes the loop. An in-flight fetch racing the cancel signal is
/// dropped, so its result is never applied to state after shutdown.
pub struct ChangeMonitor {
    facility_key: String,
    source: Arc<dyn ChangesSource>,
    poll_interval: Duration,
    reconciler: Reconciler,
}

impl std::fmt::Debug for ChangeMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeMonitor")
            .field("facility_key", &self.facility_key)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl ChangeMonitor {
    /// Create a monitor for one facility.
    pub fn new(
        facility_key: impl Into<String>,
        source: Arc<dyn ChangesSource>,
        config: &MonitorConfig,
    ) -> Self {
        Self {
            facility_key: facility_key.into(),
            source,
            poll_interval: Duration::from_secs(config.poll_interval_seconds),
            reconciler: Reconciler::new(config.page_limit),
        }
    }

    /// Run until the cancel signal flips to `true`.
    ///
    /// `on_reload` fires exactly once per tick that observed a relevant
    /// change (new study or new series).
    pub async fn run<F, Fut>(mut self, mut cancel: watch::Receiver<bool>, on_reload: F)
    where
        F: Fn() -> Fut + Send,
        Fut: Future<Output = ()> + Send,
    {
        tracing::info!(
            facility = %self.facility_key,
            interval_seconds = self.poll_interval.as_secs(),
            "Change monitor started"
        );

        // A closed channel means the server side is gone; stop rather
        // than spin with nothing left to cancel us.
        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                }
                _ = time::sleep(self.poll_interval) => {}
            }

            let source = Arc::clone(&self.source);
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        // drop the in-flight tick; its result is discarded
                        break;
                    }
                }
                result = self.reconciler.tick(source.as_ref()) => {
                    match result {
                        Ok(TickOutcome::Baselined { last_sequence }) => {
                            tracing::info!(
                                facility = %self.facility_key,
                                last_sequence,
                                "Change monitor baselined"
                            );
                        }
                        Ok(TickOutcome::Reload { from, to }) => {
                            tracing::info!(
                                facility = %self.facility_key,
                                from,
                                to,
                                "New exams detected; triggering reload"
                            );
                            on_reload().await;
                        }
                        Ok(TickOutcome::NoReload) => {}
                        Err(e) => {
                            // best-effort background process: wait for the
                            // next tick, cursor untouched
                            tracing::warn!(
                                facility = %self.facility_key,
                                error = %e,
                                "Change poll tick failed; retrying next tick"
                            );
                        }
                    }
                }
            }
        }

        tracing::info!(facility = %self.facility_key, "Change monitor stopped");
    }
}
