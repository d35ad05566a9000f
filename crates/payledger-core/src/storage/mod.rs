mod config;
pub mod database;

pub use config::{Config, NotificationsConfig, PaymentsConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::Result;

/// Returns the payledger data directory, creating it if needed.
///
/// `PAYLEDGER_DATA_DIR` overrides the location outright. Otherwise
/// `~/.config/payledger[-dev]/`, where `PAYLEDGER_ENV=dev` selects the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("PAYLEDGER_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("PAYLEDGER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("payledger-dev")
            } else {
                base_dir.join("payledger")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
