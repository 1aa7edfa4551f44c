//! Simulated Live Feed
//!
//! Local stand-in for the monitoring ticker: random events on a timer.
//! Nothing here touches the network.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Entries kept in the visible buffer.
pub const FEED_CAPACITY: usize = 20;
pub const DEFAULT_TICK: Duration = Duration::from_secs(5);

const PLATFORMS: [&str; 4] = ["Twitter/X", "Facebook", "Instagram", "TikTok"];

const EVENTS: [&str; 5] = [
    "Detected new keyword trigger in viral post comment section.",
    "High amplification of trend #CyberCrimeUpdate.",
    "Analyzing cross-platform narrative shift on police reform.",
    "Engagement threshold met for report candidate generation.",
    "Negative sentiment surge detected in southwestern cluster.",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
    pub timestamp: DateTime<Utc>,
    pub platform: String,
    pub event: String,
}

impl FeedEntry {
    fn new(timestamp: DateTime<Utc>, platform: &str, event: &str) -> Self {
        Self { timestamp, platform: platform.to_string(), event: event.to_string() }
    }
}

pub struct SimulatedFeed {
    entries: VecDeque<FeedEntry>,
    rng: StdRng,
}

impl SimulatedFeed {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic feed for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let now = Utc::now();
        let entries = VecDeque::from(vec![
            FeedEntry::new(now, "Twitter/X", "High volume surge: \"NPF-NCCC\" mentioned in viral cybercrime thread."),
            FeedEntry::new(now - ChronoDuration::seconds(60), "Facebook", "New post by Major News Outlet regarding IGP directives."),
            FeedEntry::new(now - ChronoDuration::seconds(120), "TikTok", "Trend detection: Humor-based critique of police checkpoints gaining 50k views."),
            FeedEntry::new(now - ChronoDuration::seconds(180), "Instagram", "Sentiment shift detected: Negative comments increasing on NPF official handle."),
        ]);
        Self { entries, rng }
    }

    /// Newest first.
    pub fn entries(&self) -> impl Iterator<Item = &FeedEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Produce one event and push it to the front of the buffer.
    pub fn tick(&mut self) -> FeedEntry {
        let platform = PLATFORMS.choose(&mut self.rng).copied().unwrap_or(PLATFORMS[0]);
        let event = EVENTS.choose(&mut self.rng).copied().unwrap_or(EVENTS[0]);
        let entry = FeedEntry::new(Utc::now(), platform, event);

        self.entries.push_front(entry.clone());
        self.entries.truncate(FEED_CAPACITY);
        entry
    }

    /// Tick every `period` and forward each entry until the receiver is
    /// dropped.
    pub fn spawn(mut self, period: Duration) -> (mpsc::Receiver<FeedEntry>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // first tick fires immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let entry = self.tick();
                if tx.send(entry).await.is_err() {
                    debug!("Feed receiver dropped; stopping simulated feed");
                    break;
                }
            }
        });
        (rx, handle)
    }
}

impl Default for SimulatedFeed {
    fn default() -> Self {
        Self::new()
    }
}
