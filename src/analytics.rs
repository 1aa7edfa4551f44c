//! Trend Analytics
//!
//! Aggregates over the report archive for the analytics view.

use serde::Serialize;
use std::collections::HashMap;

use crate::report::{IntelligenceReport, SentimentBreakdown};

const LABEL_CHARS: usize = 15;

/// Engagement of the two developments of one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumePoint {
    pub time: String,
    pub trend1: u64,
    pub trend2: u64,
    pub label1: String,
    pub label2: String,
}

/// Oldest-first volume series, given an archive ordered most recent first.
pub fn volume_history(reports: &[IntelligenceReport]) -> Vec<VolumePoint> {
    reports
        .iter()
        .rev()
        .map(|r| {
            let dev = |idx: usize| r.new_developments.get(idx);
            VolumePoint {
                time: r.time.clone(),
                trend1: dev(0).map(|d| d.engagement.volume).unwrap_or(0),
                trend2: dev(1).map(|d| d.engagement.volume).unwrap_or(0),
                label1: dev(0).map(|d| short_label(&d.title)).unwrap_or_default(),
                label2: dev(1).map(|d| short_label(&d.title)).unwrap_or_default(),
            }
        })
        .collect()
}

fn short_label(title: &str) -> String {
    let head: String = title.chars().take(LABEL_CHARS).collect();
    format!("{}...", head)
}

/// Mean sentiment across every development in the archive.
pub fn aggregate_sentiment(reports: &[IntelligenceReport]) -> Option<SentimentBreakdown> {
    let all: Vec<&SentimentBreakdown> = reports
        .iter()
        .flat_map(|r| r.new_developments.iter().map(|d| &d.sentiment))
        .collect();
    if all.is_empty() {
        return None;
    }
    let n = all.len() as f64;
    Some(SentimentBreakdown::new(
        all.iter().map(|s| s.positive).sum::<f64>() / n,
        all.iter().map(|s| s.neutral).sum::<f64>() / n,
        all.iter().map(|s| s.negative).sum::<f64>() / n,
    ))
}

pub fn total_engagement(reports: &[IntelligenceReport]) -> u64 {
    reports
        .iter()
        .flat_map(|r| r.new_developments.iter())
        .map(|d| d.engagement.volume)
        .fold(0u64, u64::saturating_add)
}

/// How many developments cite each platform, busiest first.
pub fn platform_mentions(reports: &[IntelligenceReport]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for dev in reports.iter().flat_map(|r| r.new_developments.iter()) {
        for platform in &dev.platforms {
            *counts.entry(platform.as_str()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().map(|(p, c)| (p.to_string(), c)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}
