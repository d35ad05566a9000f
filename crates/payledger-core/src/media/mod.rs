//! Attention time from embedded-media telemetry.
//!
//! Video players report watch segments to their provider through
//! query-string beacons. Matching those beacon URLs lets the ledger credit
//! time spent on embedded videos, which a plain tab-focus timer misses.
//!
//! Everything here is fail-soft: unknown URLs give no provider, malformed
//! payloads give zero duration.

mod visits;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use url::Url;

pub use visits::{MediaEntry, MediaVisits};

pub const YOUTUBE_WATCHTIME_PREFIX: &str = "https://www.youtube.com/api/stats/watchtime?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MediaProvider {
    #[serde(rename = "YOUTUBE")]
    YouTube,
}

impl MediaProvider {
    pub const ALL: [MediaProvider; 1] = [MediaProvider::YouTube];

    pub fn tag(&self) -> &'static str {
        match self {
            MediaProvider::YouTube => "YOUTUBE",
        }
    }

    /// Telemetry endpoint the provider's player reports to.
    pub fn endpoint_prefix(&self) -> &'static str {
        match self {
            MediaProvider::YouTube => YOUTUBE_WATCHTIME_PREFIX,
        }
    }

    /// Query parameter holding the media id.
    fn id_param(&self) -> &'static str {
        match self {
            MediaProvider::YouTube => "docid",
        }
    }
}

impl fmt::Display for MediaProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Decoded query parameters of a telemetry beacon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaData(HashMap<String, String>);

impl MediaData {
    /// Collect decoded pairs. The first occurrence of a repeated key wins.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut params = HashMap::new();
        for (key, value) in pairs {
            params.entry(key.into()).or_insert_with(|| value.into());
        }
        Self(params)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Provider whose telemetry endpoint `url` points at.
pub fn get_media_provider(url: Option<&str>) -> Option<MediaProvider> {
    let url = url?;
    MediaProvider::ALL
        .into_iter()
        .find(|provider| url.starts_with(provider.endpoint_prefix()))
}

/// Query parameters of a telemetry URL.
pub fn get_media_data(url: &str, provider: MediaProvider) -> Option<MediaData> {
    match provider {
        MediaProvider::YouTube => {
            let parsed = Url::parse(url).ok()?;
            Some(MediaData::from_pairs(parsed.query_pairs()))
        }
    }
}

pub fn get_media_id(data: &MediaData, provider: MediaProvider) -> Option<String> {
    data.get(provider.id_param())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Map key merging repeated telemetry for one video: `youtube:<id>`.
pub fn get_media_key(id: Option<&str>, provider: Option<MediaProvider>) -> Option<String> {
    let (id, provider) = (id?, provider?);
    Some(format!("{}:{id}", provider.tag().to_lowercase()))
}

/// Attention duration in milliseconds for a payload from `provider`.
pub fn get_media_duration(data: Option<&MediaData>, provider: MediaProvider) -> u64 {
    match provider {
        MediaProvider::YouTube => get_youtube_duration(data),
    }
}

/// Sum of watched segments, from the comma-separated `st` (start) and `et`
/// (end) second lists. Mismatched or unparsable lists count as zero.
pub fn get_youtube_duration(data: Option<&MediaData>) -> u64 {
    let Some(data) = data else {
        return 0;
    };
    let (Some(st), Some(et)) = (data.get("st"), data.get("et")) else {
        return 0;
    };
    let (Some(starts), Some(ends)) = (parse_seconds(st), parse_seconds(et)) else {
        return 0;
    };
    if starts.len() != ends.len() {
        return 0;
    }

    let mut seconds = 0.0;
    for (start, end) in starts.iter().zip(&ends) {
        seconds += end - start;
    }
    // Float-to-int `as` truncates and saturates negatives and NaN to 0.
    (seconds * 1000.0) as u64
}

fn parse_seconds(list: &str) -> Option<Vec<f64>> {
    list.split(',').map(|s| s.trim().parse::<f64>().ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yt(st: &str, et: &str) -> MediaData {
        MediaData::from_pairs([("st", st), ("et", et)])
    }

    #[test]
    fn multi_segment_duration() {
        let data = yt("11.338,21.339,25.000", "21.339,25.000,26.100");
        assert_eq!(get_youtube_duration(Some(&data)), 14762);
    }

    #[test]
    fn single_segment_duration() {
        assert_eq!(get_youtube_duration(Some(&yt("11.338", "21.339"))), 10001);
    }

    #[test]
    fn malformed_payloads_are_zero() {
        assert_eq!(get_youtube_duration(Some(&yt("11.338,21.339", "21.339"))), 0);
        assert_eq!(get_youtube_duration(None), 0);
        assert_eq!(get_youtube_duration(Some(&MediaData::default())), 0);
        assert_eq!(get_youtube_duration(Some(&yt("abc", "1.0"))), 0);
    }

    #[test]
    fn provider_detection() {
        assert_eq!(
            get_media_provider(Some(
                "https://www.youtube.com/api/stats/watchtime?docid=kLiLOkzLetE&st=11.338&et=21.339"
            )),
            Some(MediaProvider::YouTube)
        );
        assert_eq!(get_media_provider(Some("https://www.youtube.com/watch?v=x")), None);
        assert_eq!(get_media_provider(Some("https://brave.com")), None);
        assert_eq!(get_media_provider(None), None);
    }

    #[test]
    fn media_data_is_percent_decoded() {
        let data = get_media_data(
            "https://www.youtube.com/api/stats/watchtime?docid=abc&st=11.338%2C21.339&et=21.339%2C25.000",
            MediaProvider::YouTube,
        )
        .unwrap();
        assert_eq!(data.get("st"), Some("11.338,21.339"));
        assert_eq!(get_media_id(&data, MediaProvider::YouTube).as_deref(), Some("abc"));
        assert_eq!(get_media_duration(Some(&data), MediaProvider::YouTube), 13662);
    }

    #[test]
    fn repeated_query_keys_keep_first_value() {
        let data = get_media_data(
            "https://www.youtube.com/api/stats/watchtime?docid=first&st=0&et=4&docid=second&et=9",
            MediaProvider::YouTube,
        )
        .unwrap();
        assert_eq!(data.get("docid"), Some("first"));
        assert_eq!(get_media_duration(Some(&data), MediaProvider::YouTube), 4_000);

        let pairs = MediaData::from_pairs([("st", "1"), ("st", "2")]);
        assert_eq!(pairs.get("st"), Some("1"));
    }

    #[test]
    fn media_key_format() {
        assert_eq!(
            get_media_key(Some("kLiLOkzLetE"), Some(MediaProvider::YouTube)).as_deref(),
            Some("youtube:kLiLOkzLetE")
        );
        assert_eq!(get_media_key(None, Some(MediaProvider::YouTube)), None);
        assert_eq!(get_media_key(Some("x"), None), None);
    }

    #[test]
    fn provider_serializes_as_tag() {
        assert_eq!(
            serde_json::to_string(&MediaProvider::YouTube).unwrap(),
            "\"YOUTUBE\""
        );
    }
}
