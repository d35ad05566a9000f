//! Per-publisher percentage of the next contribution.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::{contribute, LedgerState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublisherShare {
    pub key: String,
    pub score: f64,
    /// Whole percent; all shares add up to exactly 100.
    pub percentage: u32,
}

/// Splits 100% across contributing publishers in proportion to their score.
///
/// Rounding uses the largest-remainder method so the integer percentages
/// always sum to 100. Results are ordered by score, highest first.
pub fn contribution_shares(state: &LedgerState) -> Vec<PublisherShare> {
    let scorekeeper = state.synopsis.options.scorekeeper;
    let mut entries: Vec<(String, f64)> = state
        .publisher_keys()
        .into_iter()
        .filter(|key| contribute(state, key))
        .filter_map(|key| {
            let score = state.publisher(key)?.score(scorekeeper);
            (score > 0.0).then(|| (key.to_string(), score))
        })
        .collect();

    let total: f64 = entries.iter().map(|(_, score)| score).sum();
    if entries.is_empty() || total <= 0.0 {
        return Vec::new();
    }

    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)));

    let raw: Vec<f64> = entries.iter().map(|(_, s)| s / total * 100.0).collect();
    let mut percents: Vec<u32> = raw.iter().map(|r| r.floor() as u32).collect();
    let assigned: u32 = percents.iter().sum();

    let mut by_remainder: Vec<usize> = (0..raw.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let ra = raw[a] - raw[a].floor();
        let rb = raw[b] - raw[b].floor();
        rb.partial_cmp(&ra).unwrap_or(Ordering::Equal).then(a.cmp(&b))
    });
    for &idx in by_remainder.iter().take(100u32.saturating_sub(assigned) as usize) {
        percents[idx] += 1;
    }

    entries
        .into_iter()
        .zip(percents)
        .map(|((key, score), percentage)| PublisherShare {
            key,
            score,
            percentage,
        })
        .collect()
}
