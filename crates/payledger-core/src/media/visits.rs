use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

use super::{
    get_media_data, get_media_duration, get_media_id, get_media_key, get_media_provider,
    MediaProvider,
};

/// Accumulated attention for one embedded video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEntry {
    pub provider: MediaProvider,
    pub id: String,
    pub duration_ms: u64,
    /// Number of beacons merged into this entry.
    pub events: u32,
}

/// Merges repeated telemetry for the same video under its media key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaVisits {
    entries: HashMap<String, MediaEntry>,
}

impl MediaVisits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one telemetry URL. Returns the merged entry, or `None` when the
    /// URL is not a recognised beacon or carries no media id.
    pub fn record(&mut self, url: &str) -> Option<&MediaEntry> {
        let provider = get_media_provider(Some(url))?;
        let data = get_media_data(url, provider)?;
        let id = get_media_id(&data, provider)?;
        let key = get_media_key(Some(&id), Some(provider))?;
        let duration_ms = get_media_duration(Some(&data), provider);
        trace!(%key, duration_ms, "media beacon");

        let entry = self.entries.entry(key).or_insert_with(|| MediaEntry {
            provider,
            id,
            duration_ms: 0,
            events: 0,
        });
        entry.duration_ms += duration_ms;
        entry.events += 1;
        Some(entry)
    }

    pub fn get(&self, key: &str) -> Option<&MediaEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.entries.values().map(|e| e.duration_ms).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MediaEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
