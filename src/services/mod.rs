//! Service layer for the notifier.
//!
//! This module contains the collaborators at the edge of the system:
//! - Leaderboard fetching (`LeaderboardClient`)
//! - Message delivery (`TelegramNotifier`)
//!
//! Both sit behind traits so the polling loop can be driven by doubles.

mod leaderboard;
mod telegram;

use async_trait::async_trait;
use futures::future::join_all;

use crate::error::Result;

pub use leaderboard::LeaderboardClient;
pub use telegram::TelegramNotifier;

/// Source of raw leaderboard JSON.
#[async_trait]
pub trait LeaderboardSource: Send + Sync {
    /// Fetch the current leaderboard body.
    ///
    /// A non-2xx response is reported as `AppError::BadStatus`.
    async fn fetch(&self) -> Result<serde_json::Value>;
}

/// Sink for text reports.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `text` to a single channel.
    async fn send(&self, channel: &str, text: &str) -> Result<()>;
}

/// Outcome of delivering one report to every channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: Vec<String>,
    pub failed: Vec<String>,
}

impl DeliveryReport {
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Send `text` to every channel. A failing channel is logged and skipped.
pub async fn notify_all<N>(notifier: &N, channels: &[String], text: &str) -> DeliveryReport
where
    N: Notifier + ?Sized,
{
    let attempts = channels.iter().map(|channel| async move {
        let result = notifier.send(channel, text).await;
        (channel, result)
    });

    let mut report = DeliveryReport::default();
    for (channel, result) in join_all(attempts).await {
        match result {
            Ok(()) => {
                log::info!("Report delivered to {}", channel);
                report.delivered.push(channel.clone());
            }
            Err(e) => {
                log::error!("Unable to deliver report to {}: {}", channel, e);
                report.failed.push(channel.clone());
            }
        }
    }
    report
}
