use clap::Subcommand;
use payledger_core::media::{
    get_media_data, get_media_duration, get_media_id, get_media_key, get_media_provider,
    MediaEntry, MediaProvider, MediaVisits,
};
use serde::Serialize;

#[derive(Subcommand)]
pub enum MediaAction {
    /// Decode media telemetry URLs and merge them per video
    Inspect {
        /// Telemetry URLs (e.g. YouTube watch-time beacons)
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[derive(Serialize)]
struct Beacon {
    provider: MediaProvider,
    id: Option<String>,
    key: Option<String>,
    duration_ms: u64,
}

#[derive(Serialize)]
struct Merged<'a> {
    key: &'a str,
    #[serde(flatten)]
    entry: &'a MediaEntry,
}

fn inspect(url: &str) -> Result<Beacon, Box<dyn std::error::Error>> {
    let Some(provider) = get_media_provider(Some(url)) else {
        return Err(format!("not a recognised media beacon: {url}").into());
    };
    let data = get_media_data(url, provider);
    let id = data.as_ref().and_then(|d| get_media_id(d, provider));
    Ok(Beacon {
        provider,
        key: get_media_key(id.as_deref(), Some(provider)),
        id,
        duration_ms: get_media_duration(data.as_ref(), provider),
    })
}

pub fn run(action: MediaAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        MediaAction::Inspect { urls } => {
            let mut visits = MediaVisits::new();
            let mut beacons = Vec::with_capacity(urls.len());
            for url in &urls {
                beacons.push(inspect(url)?);
                visits.record(url);
            }

            let mut media: Vec<Merged<'_>> = visits
                .iter()
                .map(|(key, entry)| Merged { key, entry })
                .collect();
            media.sort_by(|a, b| a.key.cmp(b.key));

            let report = serde_json::json!({
                "beacons": beacons,
                "media": media,
                "total_duration_ms": visits.total_duration_ms(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
