pub mod config;
pub mod media;
pub mod notify;
pub mod publisher;
pub mod wallet;

use serde::de::DeserializeOwned;
use std::path::Path;

/// Read and parse a JSON document (wallet snapshot, ledger state).
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let value = serde_json::from_str(&content)
        .map_err(|e| format!("cannot parse {}: {e}", path.display()))?;
    Ok(value)
}
