//! TOML-based application configuration.
//!
//! Stores the general settings the scheduler and evaluator read:
//! - Payments on/off and publisher thresholds
//! - Verified-only display preference
//! - Notification cadence, upsell grace delay and panel deep links
//!
//! Configuration is stored at `~/.config/payledger/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::notifications::{PanelUrls, PaymentSettings, BACKUP_PANEL_URL, PAYMENTS_PANEL_URL};
use crate::publisher::SynopsisOptions;
use crate::time::days;

/// Payments configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsConfig {
    #[serde(default)]
    pub enabled: bool,
    /// List unverified publishers too. Seeds `show_only_verified` lazily.
    #[serde(default = "default_true")]
    pub allow_non_verified: bool,
    #[serde(default = "default_minimum_visit_time_ms")]
    pub minimum_visit_time_ms: u64,
    #[serde(default = "default_minimum_visits")]
    pub minimum_visits: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_try_payments_delay_days")]
    pub try_payments_delay_days: i64,
    #[serde(default = "default_payments_panel_url")]
    pub payments_panel_url: String,
    #[serde(default = "default_backup_panel_url")]
    pub backup_panel_url: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/payledger/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub payments: PaymentsConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_minimum_visit_time_ms() -> u64 {
    8_000
}
fn default_minimum_visits() -> u32 {
    1
}
fn default_poll_interval_secs() -> u64 {
    15 * 60
}
fn default_try_payments_delay_days() -> i64 {
    10
}
fn default_payments_panel_url() -> String {
    PAYMENTS_PANEL_URL.into()
}
fn default_backup_panel_url() -> String {
    BACKUP_PANEL_URL.into()
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allow_non_verified: true,
            minimum_visit_time_ms: default_minimum_visit_time_ms(),
            minimum_visits: default_minimum_visits(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            try_payments_delay_days: default_try_payments_delay_days(),
            payments_panel_url: default_payments_panel_url(),
            backup_panel_url: default_backup_panel_url(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as integer")));
                        }
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::LoadFailed {
                    path,
                    message: e.to_string(),
                }
                .into()
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.update(key, value)?;
        self.save()
    }

    /// Set a config value by key without touching the disk. The result
    /// must pass [`Config::validate`]; on failure `self` is unchanged.
    pub fn update(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check the ledger settings the scheduler and poller depend on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let notifications = &self.notifications;
        if notifications.poll_interval_secs == 0 {
            return Err(invalid(
                "notifications.poll_interval_secs",
                "must be at least 1 second".into(),
            ));
        }
        if notifications.try_payments_delay_days < 0 {
            return Err(invalid(
                "notifications.try_payments_delay_days",
                "must not be negative".into(),
            ));
        }
        for (key, url) in [
            ("notifications.payments_panel_url", &notifications.payments_panel_url),
            ("notifications.backup_panel_url", &notifications.backup_panel_url),
        ] {
            Url::parse(url).map_err(|e| invalid(key, format!("'{url}': {e}")))?;
        }
        Ok(())
    }

    /// Render one `[section]` as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] for anything but `payments` or
    /// `notifications`.
    pub fn section_toml(&self, section: &str) -> Result<String, ConfigError> {
        let rendered = match section {
            "payments" => toml::to_string_pretty(&self.payments),
            "notifications" => toml::to_string_pretty(&self.notifications),
            _ => return Err(ConfigError::UnknownKey(section.to_string())),
        };
        rendered.map_err(|e| ConfigError::InvalidValue {
            key: section.to_string(),
            message: e.to_string(),
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.notifications.poll_interval_secs.max(1))
    }

    pub fn panels(&self) -> PanelUrls {
        PanelUrls {
            payments: self.notifications.payments_panel_url.clone(),
            backup: self.notifications.backup_panel_url.clone(),
        }
    }

    /// Settings snapshot for one scheduler tick.
    pub fn payment_settings(&self, first_run_ms: i64) -> PaymentSettings {
        PaymentSettings {
            payments_enabled: self.payments.enabled,
            first_run_ms,
            try_payments_delay_ms: days(self.notifications.try_payments_delay_days),
        }
    }

    /// Push the configured thresholds into the ledger's synopsis options.
    pub fn apply_thresholds(&self, options: &mut SynopsisOptions) {
        options.min_duration_ms = self.payments.minimum_visit_time_ms;
        options.min_visits = self.payments.minimum_visits;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert!(!parsed.payments.enabled);
        assert_eq!(parsed.notifications.poll_interval_secs, 900);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let parsed: Config = toml::from_str("[payments]\nenabled = true\n").unwrap();
        assert!(parsed.payments.enabled);
        assert!(parsed.payments.allow_non_verified);
        assert_eq!(parsed.notifications.try_payments_delay_days, 10);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("payments.enabled").as_deref(), Some("false"));
        assert_eq!(cfg.get("payments.minimum_visits").as_deref(), Some("1"));
        assert_eq!(
            cfg.get("notifications.payments_panel_url").as_deref(),
            Some(PAYMENTS_PANEL_URL)
        );
        assert!(cfg.get("payments.missing_key").is_none());
    }

    #[test]
    fn update_changes_typed_values() {
        let mut cfg = Config::default();
        cfg.update("payments.enabled", "true").unwrap();
        cfg.update("notifications.try_payments_delay_days", "3").unwrap();
        assert!(cfg.payments.enabled);
        assert_eq!(cfg.payment_settings(0).try_payments_delay_ms, days(3));
    }

    #[test]
    fn update_rejects_unknown_key_and_bad_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            Config::set_json_value_by_path(
                &mut serde_json::to_value(&cfg).unwrap(),
                "payments.nope",
                "1"
            ),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(cfg.update("payments.enabled", "maybe").is_err());
        assert!(cfg.update("payments.minimum_visits", "-1").is_err());
        assert!(cfg.update("", "x").is_err());
    }

    #[test]
    fn update_validates_ledger_settings() {
        let mut cfg = Config::default();
        let err = cfg
            .update("notifications.poll_interval_secs", "0")
            .unwrap_err();
        assert!(err.to_string().contains("poll_interval_secs"));
        assert_eq!(cfg.notifications.poll_interval_secs, 900);

        assert!(cfg
            .update("notifications.try_payments_delay_days", "-1")
            .is_err());
        assert!(cfg
            .update("notifications.backup_panel_url", "not a url")
            .is_err());
        assert_eq!(cfg.notifications.backup_panel_url, BACKUP_PANEL_URL);

        cfg.update("notifications.payments_panel_url", "https://example.com/pay")
            .unwrap();
        cfg.update("notifications.poll_interval_secs", "1").unwrap();
        assert_eq!(cfg.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn defaults_validate() {
        assert!(Config::default().validate().is_ok());
        let mut cfg = Config::default();
        cfg.notifications.try_payments_delay_days = -3;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "notifications.try_payments_delay_days"
        ));
    }

    #[test]
    fn sections_render_as_toml() {
        let cfg = Config::default();
        let payments = cfg.section_toml("payments").unwrap();
        assert!(payments.contains("enabled = false"));
        assert!(payments.contains("minimum_visits = 1"));
        let notifications = cfg.section_toml("notifications").unwrap();
        assert!(notifications.contains("poll_interval_secs = 900"));
        assert!(matches!(
            cfg.section_toml("ui"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn huge_delay_and_interval_do_not_overflow() {
        let mut cfg = Config::default();
        cfg.notifications.try_payments_delay_days = i64::MAX;
        cfg.notifications.poll_interval_secs = u64::MAX;
        assert_eq!(cfg.payment_settings(0).try_payments_delay_ms, i64::MAX);
        assert_eq!(cfg.poll_interval(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn thresholds_flow_into_synopsis_options() {
        let mut cfg = Config::default();
        cfg.payments.minimum_visit_time_ms = 30_000;
        cfg.payments.minimum_visits = 5;
        let mut options = SynopsisOptions::default();
        cfg.apply_thresholds(&mut options);
        assert_eq!(options.min_duration_ms, 30_000);
        assert_eq!(options.min_visits, 5);
    }
}
