//! Change-poll reconciler state machine.

use async_trait::async_trait;

use bitpacs_core::AppResult;
use bitpacs_pacs::types::ChangesFeed;

/// Source of the Orthanc changes feed for one facility.
///
/// `since = None` asks for the newest change only (descending, limit 1),
/// which is how a baseline is established without reading the feed body.
#[async_trait]
pub trait ChangesSource: Send + Sync {
    /// Fetch a changes window.
    async fn fetch(&self, since: Option<u64>, limit: u32) -> AppResult<ChangesFeed>;
}

/// Where the reconciler is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// No baseline yet; the first tick only records the current sequence.
    Uninitialized,
    /// Baseline recorded; no change window fetched yet.
    Baselined,
    /// Steady state: fetching windows since the cursor on every tick.
    Polling,
}

/// What one tick decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// First tick: baseline recorded, nothing reloaded.
    Baselined {
        /// The sequence the baseline was set to.
        last_sequence: u64,
    },
    /// New relevant changes: the caller should reload listings once.
    Reload {
        /// Cursor before this tick.
        from: u64,
        /// Cursor after this tick.
        to: u64,
    },
    /// Nothing new, or only changes that do not affect listings.
    NoReload,
}

/// Tracks the last-seen change sequence for one facility session and
/// classifies change batches.
///
/// The cursor is monotonic within a session: it only ever moves forward,
/// and crossing facilities requires a [`reset`](Self::reset) so sequences
/// from different servers are never compared.
#[derive(Debug)]
pub struct Reconciler {
    state: PollState,
    last_sequence: u64,
    page_limit: u32,
}

impl Reconciler {
    /// Create an uninitialized reconciler.
    pub fn new(page_limit: u32) -> Self {
        Self {
            state: PollState::Uninitialized,
            last_sequence: 0,
            page_limit,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PollState {
        self.state
    }

    /// Current cursor value.
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    /// Forget everything; the next tick re-baselines.
    ///
    /// Must be called whenever the active facility changes.
    pub fn reset(&mut self) {
        self.state = PollState::Uninitialized;
        self.last_sequence = 0;
    }

    /// Run one poll tick against `source`.
    ///
    /// On error nothing is mutated: the cursor does not advance and the
    /// state is unchanged, so the next tick retries the same window.
    pub async fn tick<S: ChangesSource + ?Sized>(&mut self, source: &S) -> AppResult<TickOutcome> {
        match self.state {
            PollState::Uninitialized => {
                let feed = source.fetch(None, 1).await?;
                self.last_sequence = feed.last;
                self.state = PollState::Baselined;
                Ok(TickOutcome::Baselined {
                    last_sequence: feed.last,
                })
            }
            PollState::Baselined | PollState::Polling => {
                let feed = source.fetch(Some(self.last_sequence), self.page_limit).await?;
                self.state = PollState::Polling;

                if feed.last <= self.last_sequence {
                    return Ok(TickOutcome::NoReload);
                }

                // Advance first: a failure in the reload that follows must
                // not make the next tick reprocess the same window.
                let from = self.last_sequence;
                self.last_sequence = feed.last;

                if feed.has_relevant_change() {
                    Ok(TickOutcome::Reload {
                        from,
                        to: feed.last,
                    })
                } else {
                    Ok(TickOutcome::NoReload)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitpacs_core::AppError;
    use bitpacs_pacs::types::ChangeRecord;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted source replaying canned responses in order.
    struct Scripted {
        responses: Mutex<VecDeque<AppResult<ChangesFeed>>>,
    }

    impl Scripted {
        fn new(responses: Vec<AppResult<ChangesFeed>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }
    }

    #[async_trait]
    impl ChangesSource for Scripted {
        async fn fetch(&self, _since: Option<u64>, _limit: u32) -> AppResult<ChangesFeed> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted")
        }
    }

    fn change(kind: &str, seq: u64) -> ChangeRecord {
        ChangeRecord {
            change_type: kind.to_string(),
            seq,
            id: None,
            path: None,
            resource_type: None,
            date: None,
        }
    }

    fn feed(last: u64, changes: Vec<ChangeRecord>) -> ChangesFeed {
        ChangesFeed {
            last,
            done: true,
            changes,
        }
    }

    #[tokio::test]
    async fn test_first_tick_only_baselines() {
        // no reload on the first tick no matter how many changes exist
        let source = Scripted::new(vec![Ok(feed(41, vec![change("NewStudy", 41)]))]);
        let mut reconciler = Reconciler::new(100);

        let outcome = reconciler.tick(&source).await.unwrap();
        assert_eq!(outcome, TickOutcome::Baselined { last_sequence: 41 });
        assert_eq!(reconciler.state(), PollState::Baselined);
        assert_eq!(reconciler.last_sequence(), 41);
    }

    #[tokio::test]
    async fn test_baseline_then_new_series_reloads_once() {
        // Last: 0 baseline, then Last: 7 with one NewSeries
        let source = Scripted::new(vec![
            Ok(feed(0, vec![])),
            Ok(feed(7, vec![change("NewSeries", 7)])),
        ]);
        let mut reconciler = Reconciler::new(100);

        let first = reconciler.tick(&source).await.unwrap();
        assert_eq!(first, TickOutcome::Baselined { last_sequence: 0 });

        let second = reconciler.tick(&source).await.unwrap();
        assert_eq!(second, TickOutcome::Reload { from: 0, to: 7 });
        assert_eq!(reconciler.last_sequence(), 7);
        assert_eq!(reconciler.state(), PollState::Polling);
    }

    #[tokio::test]
    async fn test_irrelevant_changes_advance_cursor_without_reload() {
        // batch with only unrelated change types
        let source = Scripted::new(vec![
            Ok(feed(10, vec![])),
            Ok(feed(13, vec![change("StablePatient", 12), change("NewInstance", 13)])),
        ]);
        let mut reconciler = Reconciler::new(100);

        reconciler.tick(&source).await.unwrap();
        let outcome = reconciler.tick(&source).await.unwrap();
        assert_eq!(outcome, TickOutcome::NoReload);
        // cursor still advances so the same window is not re-fetched forever
        assert_eq!(reconciler.last_sequence(), 13);
    }

    #[tokio::test]
    async fn test_cursor_never_decreases() {
        // a window whose Last is not beyond the cursor changes nothing
        let source = Scripted::new(vec![
            Ok(feed(20, vec![])),
            Ok(feed(20, vec![])),
            Ok(feed(5, vec![change("NewStudy", 5)])),
        ]);
        let mut reconciler = Reconciler::new(100);

        reconciler.tick(&source).await.unwrap();
        assert_eq!(reconciler.tick(&source).await.unwrap(), TickOutcome::NoReload);
        assert_eq!(reconciler.tick(&source).await.unwrap(), TickOutcome::NoReload);
        assert_eq!(reconciler.last_sequence(), 20);
    }

    #[tokio::test]
    async fn test_reset_on_facility_switch() {
        // switching facility re-baselines instead of comparing
        // sequences across servers
        let source = Scripted::new(vec![Ok(feed(50, vec![])), Ok(feed(3, vec![]))]);
        let mut reconciler = Reconciler::new(100);

        reconciler.tick(&source).await.unwrap();
        assert_eq!(reconciler.last_sequence(), 50);

        reconciler.reset();
        assert_eq!(reconciler.state(), PollState::Uninitialized);
        assert_eq!(reconciler.last_sequence(), 0);

        let outcome = reconciler.tick(&source).await.unwrap();
        assert_eq!(outcome, TickOutcome::Baselined { last_sequence: 3 });
    }

    #[tokio::test]
    async fn test_failed_tick_mutates_nothing() {
        let source = Scripted::new(vec![
            Ok(feed(8, vec![])),
            Err(AppError::upstream("flaky network")),
            Ok(feed(9, vec![change("NewStudy", 9)])),
        ]);
        let mut reconciler = Reconciler::new(100);

        reconciler.tick(&source).await.unwrap();
        let before = reconciler.last_sequence();

        assert!(reconciler.tick(&source).await.is_err());
        assert_eq!(reconciler.last_sequence(), before);
        assert_eq!(reconciler.state(), PollState::Baselined);

        // next tick recovers and sees the window the failed tick missed
        let outcome = reconciler.tick(&source).await.unwrap();
        assert_eq!(outcome, TickOutcome::Reload { from: 8, to: 9 });
    }
}
