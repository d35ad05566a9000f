//! Ledger-side view of visited publishers.
//!
//! The ledger owns these records; this crate only reads them. The single
//! write path is [`LedgerState::apply`], used by callers to commit the lazy
//! option cache returned from [`visible`].

mod eligibility;
mod shares;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use eligibility::{blocked, contribute, eligible, sticky, visible};
pub use shares::{contribution_shares, PublisherShare};

/// Attention-score algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scorekeeper {
    #[default]
    Concave,
    Visits,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherOptions {
    #[serde(default)]
    pub exclude: Option<bool>,
    #[serde(default)]
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublisherRecord {
    pub key: String,
    #[serde(default)]
    pub visits: u32,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub scores: HashMap<Scorekeeper, f64>,
    #[serde(default)]
    pub options: PublisherOptions,
}

impl PublisherRecord {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    pub fn score(&self, scorekeeper: Scorekeeper) -> f64 {
        self.scores.get(&scorekeeper).copied().unwrap_or(0.0)
    }
}

/// Global eligibility thresholds and display toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynopsisOptions {
    #[serde(default)]
    pub scorekeeper: Scorekeeper,
    #[serde(default = "default_min_duration_ms")]
    pub min_duration_ms: u64,
    #[serde(default = "default_min_visits")]
    pub min_visits: u32,
    /// Lazily cached from the general settings on first read.
    #[serde(default)]
    pub show_only_verified: Option<bool>,
}

fn default_min_duration_ms() -> u64 {
    8_000
}
fn default_min_visits() -> u32 {
    1
}

impl Default for SynopsisOptions {
    fn default() -> Self {
        Self {
            scorekeeper: Scorekeeper::default(),
            min_duration_ms: default_min_duration_ms(),
            min_visits: default_min_visits(),
            show_only_verified: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Synopsis {
    #[serde(default)]
    pub options: SynopsisOptions,
    #[serde(default)]
    pub publishers: HashMap<String, PublisherRecord>,
}

/// Per-site user overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSetting {
    /// Explicit opt-in/opt-out for automatic contribution.
    #[serde(default)]
    pub ledger_payments: Option<bool>,
    /// `Some(false)` hides the site from the publisher list.
    #[serde(default)]
    pub ledger_payments_shown: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    #[serde(default)]
    pub synopsis: Synopsis,
    /// Keyed by publisher key.
    #[serde(default)]
    pub site_settings: HashMap<String, SiteSetting>,
}

/// Deferred write produced by an otherwise read-only predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynopsisUpdate {
    ShowOnlyVerified(bool),
}

impl LedgerState {
    pub fn publisher(&self, key: &str) -> Option<&PublisherRecord> {
        self.synopsis.publishers.get(key)
    }

    pub fn site_setting(&self, key: &str) -> Option<&SiteSetting> {
        self.site_settings.get(key)
    }

    pub fn insert_publisher(&mut self, record: PublisherRecord) {
        self.synopsis.publishers.insert(record.key.clone(), record);
    }

    pub fn apply(&mut self, update: SynopsisUpdate) {
        match update {
            SynopsisUpdate::ShowOnlyVerified(only) => {
                self.synopsis.options.show_only_verified = Some(only);
            }
        }
    }

    /// Publisher keys in a stable (sorted) order.
    pub fn publisher_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.synopsis.publishers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
