use serde::{Deserialize, Serialize};

/// Persisted snooze/dedup state, one per profile.
///
/// A next-eligible timestamp of `None` means "eligible now"; otherwise the
/// notification is held back until that instant has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDedupState {
    #[serde(default)]
    pub reconcile_soon_next_eligible: Option<i64>,
    #[serde(default)]
    pub add_funds_next_eligible: Option<i64>,
    #[serde(default)]
    pub try_payments_dismissed: bool,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for NotificationDedupState {
    fn default() -> Self {
        Self {
            reconcile_soon_next_eligible: None,
            add_funds_next_eligible: None,
            try_payments_dismissed: false,
            notifications_enabled: true,
        }
    }
}

impl NotificationDedupState {
    pub fn review_eligible(&self, now: i64) -> bool {
        eligible_at(self.reconcile_soon_next_eligible, now)
    }

    pub fn add_funds_eligible(&self, now: i64) -> bool {
        eligible_at(self.add_funds_next_eligible, now)
    }
}

fn eligible_at(next: Option<i64>, now: i64) -> bool {
    next.map_or(true, |t| t < now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_timestamp_is_eligible() {
        let state = NotificationDedupState::default();
        assert!(state.review_eligible(0));
        assert!(state.add_funds_eligible(0));
        assert!(state.notifications_enabled);
    }

    #[test]
    fn timestamp_holds_until_passed() {
        let state = NotificationDedupState {
            add_funds_next_eligible: Some(100),
            ..Default::default()
        };
        assert!(!state.add_funds_eligible(50));
        assert!(!state.add_funds_eligible(100));
        assert!(state.add_funds_eligible(101));
    }

    #[test]
    fn old_json_without_enabled_flag_defaults_on() {
        let state: NotificationDedupState =
            serde_json::from_str(r#"{"try_payments_dismissed": true}"#).unwrap();
        assert!(state.notifications_enabled);
        assert!(state.try_payments_dismissed);
    }
}
