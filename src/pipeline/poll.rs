// src/pipeline/poll.rs

//! Polling loop.
//!
//! Each cycle fetches the leaderboard, compares it with the last adopted
//! snapshot and notifies every channel when something reportable changed.
//! Failures leave the previous snapshot untouched and double the delay
//! before the next cycle; a successful cycle resets it.

use std::fmt;
use std::time::Duration;

use crate::error::Result;
use crate::models::{Config, Leaderboard};
use crate::services::{LeaderboardSource, Notifier, notify_all};
use crate::storage::SnapshotStore;

use super::diff::{compute_diff, snapshots_score_equal};
use super::report::{ReportOptions, render_board, render_diff};

/// What a successful cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No previous snapshot; the full board was sent
    Initial { members: usize },
    /// Scores are identical; nothing was sent
    Unchanged,
    /// A diff report was sent
    Changed { members: usize, solutions: usize },
    /// The new board was empty; nothing was sent
    EmptyDiff,
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial { members } => write!(f, "sent full board ({members} members)"),
            Self::Unchanged => write!(f, "leaderboard is not changed"),
            Self::Changed { members, solutions } => write!(
                f,
                "sent changes ({members} members, {solutions} new solutions)"
            ),
            Self::EmptyDiff => write!(f, "leaderboard is empty, nothing to report"),
        }
    }
}

/// Delay between cycles, doubled on failure and reset on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            current: base,
        }
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    pub fn on_success(&mut self) {
        self.current = self.base;
    }

    /// Double the delay. There is no ceiling besides `Duration::MAX`.
    pub fn on_failure(&mut self) {
        self.current = self.current.checked_mul(2).unwrap_or(Duration::MAX);
    }
}

/// Owner of the last-seen snapshot and driver of the fetch/notify cycle.
pub struct Poller<S, N> {
    source: S,
    notifier: N,
    channels: Vec<String>,
    options: ReportOptions,
    store: Option<SnapshotStore>,
    previous: Option<Leaderboard>,
    backoff: Backoff,
}

impl<S, N> Poller<S, N>
where
    S: LeaderboardSource,
    N: Notifier,
{
    pub fn new(config: &Config, source: S, notifier: N) -> Self {
        Self {
            source,
            notifier,
            channels: config.telegram.chats.clone(),
            options: ReportOptions::from_config(&config.report),
            store: config.polling.state_file.clone().map(SnapshotStore::new),
            previous: None,
            backoff: Backoff::new(Duration::from_secs(config.polling.interval_secs)),
        }
    }

    /// Replace the snapshot store.
    pub fn with_store(mut self, store: Option<SnapshotStore>) -> Self {
        self.store = store;
        self
    }

    pub fn previous(&self) -> Option<&Leaderboard> {
        self.previous.as_ref()
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Seed the previous snapshot from the store. Returns whether one was found.
    pub async fn restore(&mut self) -> Result<bool> {
        let Some(store) = &self.store else {
            return Ok(false);
        };
        match store.load().await? {
            Some(board) => {
                log::info!(
                    "Restored previous leaderboard ({} members) from {}",
                    board.len(),
                    store.path().display()
                );
                self.previous = Some(board);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Run a single fetch → compare → notify cycle.
    pub async fn run_once(&mut self) -> Result<CycleOutcome> {
        let raw = self.source.fetch().await?;
        log::info!("Data successfully fetched from leaderboard API");

        let board = Leaderboard::from_value(raw)?;
        log::info!("JSON was parsed to leaderboard ({} members)", board.len());

        let outcome = match &self.previous {
            None => {
                log::info!("No previous leaderboard; sending current board without comparison");
                let text = render_board(&board, &self.options);
                notify_all(&self.notifier, &self.channels, &text).await;
                CycleOutcome::Initial {
                    members: board.len(),
                }
            }
            Some(previous) if snapshots_score_equal(&board, previous) => CycleOutcome::Unchanged,
            Some(previous) => {
                let diff = compute_diff(&board, previous);
                if diff.is_empty() {
                    log::warn!("Fetched leaderboard has no members; skipping report");
                    CycleOutcome::EmptyDiff
                } else {
                    log::info!("Diff was calculated");
                    let outcome = CycleOutcome::Changed {
                        members: diff.members.len(),
                        solutions: diff.solution_count(),
                    };
                    let text = render_diff(&diff, &self.options);
                    notify_all(&self.notifier, &self.channels, &text).await;
                    outcome
                }
            }
        };

        self.adopt(board).await;
        Ok(outcome)
    }

    /// Run one cycle, update the backoff and return the delay before the next.
    pub async fn tick(&mut self) -> Duration {
        match self.run_once().await {
            Ok(outcome) => {
                log::info!("Cycle finished: {}", outcome);
                self.backoff.on_success();
            }
            Err(e) if e.is_fetch_failure() => {
                log::warn!("Unable to fetch data from leaderboard API: {}", e);
                self.backoff.on_failure();
            }
            Err(e) if e.is_validation_failure() => {
                log::warn!("Unable to validate response JSON: {}", e);
                self.backoff.on_failure();
            }
            Err(e) => {
                log::error!("Unhandled error during cycle: {:?}", e);
                self.backoff.on_failure();
            }
        }

        let delay = self.backoff.current();
        log::info!("Sleep for {}s", delay.as_secs());
        delay
    }

    /// Poll until the process is stopped.
    pub async fn run_forever(&mut self) {
        loop {
            let delay = self.tick().await;
            tokio::time::sleep(delay).await;
        }
    }

    async fn adopt(&mut self, board: Leaderboard) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&board).await {
                log::warn!("Unable to persist leaderboard snapshot: {}", e);
            }
        }
        self.previous = Some(board);
    }
}
