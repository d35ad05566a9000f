//! Notification scheduler.
//!
//! A tick-driven state machine over the single notification slot. It does not
//! own a timer: the caller (usually [`NotificationPoller`](super::NotificationPoller))
//! invokes [`NotificationScheduler::tick`] periodically and routes the returned
//! [`Effect`]s to a [`NotificationSink`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> (tick)          -> TryPayments | AddFunds | ReviewPublishers
//! Idle -> (launch)        -> WalletUpgraded          (once per profile)
//! *    -> (transaction)   -> PaymentDone
//! *    -> (response)      -> Idle
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::message::{NotificationKind, NotificationRequest};
use super::rules::{self, Decision, PaymentSettings};
use super::state::NotificationDedupState;
use crate::time::display_ms;
use crate::wallet::{Contribution, MigrationFlags, WalletSnapshot};

pub const PAYMENTS_PANEL_URL: &str = "about:preferences#payments";
pub const BACKUP_PANEL_URL: &str = "about:preferences#payments?ledgerBackupOverlayVisible";

/// Deep links the scheduler may ask the browser to open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelUrls {
    pub payments: String,
    pub backup: String,
}

impl Default for PanelUrls {
    fn default() -> Self {
        Self {
            payments: PAYMENTS_PANEL_URL.to_string(),
            backup: BACKUP_PANEL_URL.to_string(),
        }
    }
}

/// Side effect requested by the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    Show { request: NotificationRequest },
    Hide { kind: NotificationKind },
    OpenPanel { url: String, window_id: Option<u32> },
    /// The one-time wallet-upgrade announcement went out.
    WalletUpgradeNotified,
}

impl Effect {
    pub fn dispatch(&self, sink: &mut dyn NotificationSink) {
        match self {
            Effect::Show { request } => sink.show(request),
            Effect::Hide { kind } => sink.hide(*kind),
            Effect::OpenPanel { url, window_id } => sink.open_panel(url, *window_id),
            Effect::WalletUpgradeNotified => sink.wallet_upgrade_notified(),
        }
    }
}

/// Renders notifications and performs navigation on behalf of the scheduler.
pub trait NotificationSink {
    /// Show `request`, replacing any visible notification of the same kind.
    fn show(&mut self, request: &NotificationRequest);
    fn hide(&mut self, kind: NotificationKind);
    fn open_panel(&mut self, url: &str, window_id: Option<u32>);
    fn wallet_upgrade_notified(&mut self) {}
}

/// Routes every effect to `sink`, in order.
pub fn dispatch_all(effects: &[Effect], sink: &mut dyn NotificationSink) {
    for effect in effects {
        effect.dispatch(sink);
    }
}

#[derive(Debug, Clone)]
pub struct NotificationScheduler {
    state: NotificationDedupState,
    flags: MigrationFlags,
    /// Kind currently on screen; the sink has a single slot.
    outstanding: Option<NotificationKind>,
    panels: PanelUrls,
}

impl NotificationScheduler {
    pub fn new(state: NotificationDedupState, flags: MigrationFlags) -> Self {
        Self {
            state,
            flags,
            outstanding: None,
            panels: PanelUrls::default(),
        }
    }

    pub fn with_panels(mut self, panels: PanelUrls) -> Self {
        self.panels = panels;
        self
    }

    /// Resume with a notification already on screen, e.g. after a restart.
    pub fn with_outstanding(mut self, outstanding: Option<NotificationKind>) -> Self {
        self.outstanding = outstanding;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &NotificationDedupState {
        &self.state
    }

    pub fn flags(&self) -> &MigrationFlags {
        &self.flags
    }

    pub fn outstanding(&self) -> Option<NotificationKind> {
        self.outstanding
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Explicit settings change from outside the scheduler.
    pub fn set_notifications_enabled(&mut self, enabled: bool) {
        self.state.notifications_enabled = enabled;
    }

    /// Periodic evaluation. Missing wallet data simply yields no effects.
    pub fn tick(
        &mut self,
        now: i64,
        wallet: &WalletSnapshot,
        settings: &PaymentSettings,
    ) -> Vec<Effect> {
        match rules::evaluate(now, wallet, settings, &self.state) {
            Decision::Nothing => {
                debug!(at = %display_ms(now), "notification tick: nothing to show");
                Vec::new()
            }
            Decision::TryPayments => {
                if self.outstanding == Some(NotificationKind::TryPayments) {
                    return Vec::new();
                }
                self.present(NotificationRequest::try_payments())
            }
            Decision::AddFunds { next_eligible } => {
                self.state.add_funds_next_eligible = Some(next_eligible);
                info!(next_eligible = %display_ms(next_eligible), "showing add-funds notification");
                self.present(NotificationRequest::add_funds())
            }
            Decision::ReviewPublishers { next_eligible } => {
                self.state.reconcile_soon_next_eligible = Some(next_eligible);
                info!(next_eligible = %display_ms(next_eligible), "showing review-publishers notification");
                self.present(NotificationRequest::review_publishers())
            }
        }
    }

    /// Launch-time check for the wallet-upgrade announcement.
    pub fn on_launch(&mut self, wallet: &WalletSnapshot, settings: &PaymentSettings) -> Vec<Effect> {
        if !rules::wallet_upgrade_due(wallet, settings, &self.flags) {
            return Vec::new();
        }
        self.flags.has_been_notified = true;
        info!("showing wallet-upgraded notification");
        let mut effects = self.present(NotificationRequest::wallet_upgraded());
        effects.push(Effect::WalletUpgradeNotified);
        effects
    }

    /// A reconciliation just paid out.
    pub fn on_new_transaction(&mut self, contribution: &Contribution) -> Vec<Effect> {
        if !self.state.notifications_enabled {
            if self.outstanding == Some(NotificationKind::AddFunds) {
                self.outstanding = None;
                return vec![Effect::Hide {
                    kind: NotificationKind::AddFunds,
                }];
            }
            return Vec::new();
        }
        info!(
            amount = contribution.amount,
            currency = %contribution.currency,
            "showing payment-done notification"
        );
        self.present(NotificationRequest::payment_done(contribution))
    }

    /// The user pressed button `index` on a notification of `kind`.
    pub fn on_response(
        &mut self,
        kind: NotificationKind,
        index: usize,
        active_window: Option<u32>,
    ) -> Vec<Effect> {
        use NotificationKind::*;

        let mut effects = Vec::new();
        match (kind, index) {
            (AddFunds, 0) | (ReviewPublishers, 0) | (PaymentDone, 0) => {
                self.state.notifications_enabled = false;
            }
            // Snooze: the add-funds cool-down was set when the message fired.
            (AddFunds, 1) => {}
            (AddFunds, 2) | (ReviewPublishers, 2) | (TryPayments, 1) => {
                effects.push(Effect::OpenPanel {
                    url: self.panels.payments.clone(),
                    window_id: active_window,
                });
            }
            (WalletUpgraded, 0) => {
                effects.push(Effect::OpenPanel {
                    url: self.panels.backup.clone(),
                    window_id: active_window,
                });
            }
            _ => {}
        }
        if kind == TryPayments {
            self.state.try_payments_dismissed = true;
        }
        debug!(%kind, index, "notification response handled");

        if self.outstanding == Some(kind) {
            self.outstanding = None;
        }
        effects.push(Effect::Hide { kind });
        effects
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn present(&mut self, request: NotificationRequest) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(2);
        if let Some(previous) = self.outstanding {
            if previous != request.kind {
                effects.push(Effect::Hide { kind: previous });
            }
        }
        self.outstanding = Some(request.kind);
        effects.push(Effect::Show { request });
        effects
    }
}

impl Default for NotificationScheduler {
    fn default() -> Self {
        Self::new(NotificationDedupState::default(), MigrationFlags::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{days, DAY_MS, HOUR_MS};

    const NOW: i64 = 1_700_000_000_000;

    fn enabled() -> PaymentSettings {
        PaymentSettings {
            payments_enabled: true,
            ..Default::default()
        }
    }

    fn low_funds() -> WalletSnapshot {
        WalletSnapshot {
            balance: 1.0,
            contribution_target: Some(10.0),
            reconcile_timestamp: Some(NOW + HOUR_MS),
            ..Default::default()
        }
    }

    fn shown(effects: &[Effect]) -> Vec<NotificationKind> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Show { request } => Some(request.kind),
                _ => None,
            })
            .collect()
    }

    #[derive(Default)]
    struct Recorder {
        shown: Vec<NotificationKind>,
        hidden: Vec<NotificationKind>,
        opened: Vec<String>,
        upgraded: bool,
    }

    impl NotificationSink for Recorder {
        fn show(&mut self, request: &NotificationRequest) {
            self.shown.push(request.kind);
        }
        fn hide(&mut self, kind: NotificationKind) {
            self.hidden.push(kind);
        }
        fn open_panel(&mut self, url: &str, _window_id: Option<u32>) {
            self.opened.push(url.to_string());
        }
        fn wallet_upgrade_notified(&mut self) {
            self.upgraded = true;
        }
    }

    #[test]
    fn add_funds_sets_cooldown_and_outstanding() {
        let mut scheduler = NotificationScheduler::default();
        let effects = scheduler.tick(NOW, &low_funds(), &enabled());
        assert_eq!(shown(&effects), vec![NotificationKind::AddFunds]);
        assert_eq!(scheduler.state().add_funds_next_eligible, Some(NOW + days(3)));
        assert_eq!(scheduler.outstanding(), Some(NotificationKind::AddFunds));

        // Second tick inside the cool-down stays quiet.
        assert!(scheduler.tick(NOW + DAY_MS / 4, &low_funds(), &enabled()).is_empty());
    }

    #[test]
    fn disable_button_turns_notifications_off() {
        let mut scheduler = NotificationScheduler::default();
        scheduler.tick(NOW, &low_funds(), &enabled());
        let effects = scheduler.on_response(NotificationKind::AddFunds, 0, None);
        assert_eq!(
            effects,
            vec![Effect::Hide {
                kind: NotificationKind::AddFunds
            }]
        );
        assert!(!scheduler.state().notifications_enabled);
        assert_eq!(scheduler.outstanding(), None);
    }

    #[test]
    fn add_funds_button_opens_payments_panel() {
        let mut scheduler = NotificationScheduler::default();
        let effects = scheduler.on_response(NotificationKind::AddFunds, 2, Some(7));
        assert_eq!(
            effects[0],
            Effect::OpenPanel {
                url: PAYMENTS_PANEL_URL.into(),
                window_id: Some(7)
            }
        );
        assert!(scheduler.state().notifications_enabled);
    }

    #[test]
    fn try_payments_dismissal_is_recorded_for_any_button() {
        for index in [0, 1, 5] {
            let mut scheduler = NotificationScheduler::default();
            scheduler.on_response(NotificationKind::TryPayments, index, None);
            assert!(scheduler.state().try_payments_dismissed);
        }
        let mut scheduler = NotificationScheduler::default();
        let effects = scheduler.on_response(NotificationKind::TryPayments, 1, None);
        assert!(matches!(effects[0], Effect::OpenPanel { .. }));
    }

    #[test]
    fn try_payments_not_repeated_while_on_screen() {
        let mut scheduler = NotificationScheduler::default();
        let settings = PaymentSettings {
            payments_enabled: false,
            first_run_ms: NOW - days(11),
            try_payments_delay_ms: days(10),
        };
        let wallet = WalletSnapshot::default();
        assert_eq!(
            shown(&scheduler.tick(NOW, &wallet, &settings)),
            vec![NotificationKind::TryPayments]
        );
        assert!(scheduler.tick(NOW + 1, &wallet, &settings).is_empty());
    }

    #[test]
    fn payment_done_supersedes_add_funds() {
        let mut scheduler = NotificationScheduler::default();
        scheduler.tick(NOW, &low_funds(), &enabled());
        let effects = scheduler.on_new_transaction(&Contribution {
            amount: 5.0,
            currency: "USD".into(),
        });
        assert_eq!(
            effects[0],
            Effect::Hide {
                kind: NotificationKind::AddFunds
            }
        );
        assert_eq!(shown(&effects), vec![NotificationKind::PaymentDone]);
        assert_eq!(scheduler.outstanding(), Some(NotificationKind::PaymentDone));
    }

    fn hide(kind: NotificationKind) -> Vec<Effect> {
        vec![Effect::Hide { kind }]
    }

    #[test]
    fn review_publishers_buttons() {
        let mut scheduler = NotificationScheduler::default();
        assert_eq!(
            scheduler.on_response(NotificationKind::ReviewPublishers, 1, None),
            hide(NotificationKind::ReviewPublishers)
        );
        assert!(scheduler.state().notifications_enabled);

        assert_eq!(
            scheduler.on_response(NotificationKind::ReviewPublishers, 0, None),
            hide(NotificationKind::ReviewPublishers)
        );
        assert!(!scheduler.state().notifications_enabled);
    }

    #[test]
    fn payment_done_buttons() {
        let mut scheduler = NotificationScheduler::default();
        scheduler.on_new_transaction(&Contribution {
            amount: 5.0,
            currency: "USD".into(),
        });
        assert_eq!(
            scheduler.on_response(NotificationKind::PaymentDone, 1, None),
            hide(NotificationKind::PaymentDone)
        );
        assert!(scheduler.state().notifications_enabled);
        assert_eq!(scheduler.outstanding(), None);

        assert_eq!(
            scheduler.on_response(NotificationKind::PaymentDone, 0, None),
            hide(NotificationKind::PaymentDone)
        );
        assert!(!scheduler.state().notifications_enabled);
    }

    #[test]
    fn wallet_upgraded_dismiss_opens_nothing() {
        let mut scheduler = NotificationScheduler::default();
        let mut sink = Recorder::default();
        dispatch_all(
            &scheduler.on_response(NotificationKind::WalletUpgraded, 1, Some(2)),
            &mut sink,
        );
        assert!(sink.opened.is_empty());
        assert_eq!(sink.hidden, vec![NotificationKind::WalletUpgraded]);
        assert!(scheduler.state().notifications_enabled);
    }

    #[test]
    fn new_transaction_while_disabled_only_hides_add_funds() {
        let mut scheduler = NotificationScheduler::default();
        scheduler.tick(NOW, &low_funds(), &enabled());
        scheduler.set_notifications_enabled(false);
        let contribution = Contribution {
            amount: 5.0,
            currency: "USD".into(),
        };

        let effects = scheduler.on_new_transaction(&contribution);
        assert_eq!(effects, hide(NotificationKind::AddFunds));
        assert!(shown(&effects).is_empty());
        assert_eq!(scheduler.outstanding(), None);

        // Nothing left to hide.
        assert!(scheduler.on_new_transaction(&contribution).is_empty());
    }

    #[test]
    fn resumed_outstanding_is_superseded() {
        let mut scheduler = NotificationScheduler::default()
            .with_outstanding(Some(NotificationKind::ReviewPublishers));
        let effects = scheduler.tick(NOW, &low_funds(), &enabled());
        assert_eq!(
            effects[0],
            Effect::Hide {
                kind: NotificationKind::ReviewPublishers
            }
        );
        assert_eq!(shown(&effects), vec![NotificationKind::AddFunds]);
    }

    #[test]
    fn wallet_upgrade_fires_once() {
        let flags = MigrationFlags {
            is_new_install: false,
            has_upgraded_wallet: true,
            has_been_notified: false,
        };
        let mut scheduler = NotificationScheduler::new(NotificationDedupState::default(), flags);
        let wallet = WalletSnapshot {
            balance: 2.0,
            ..Default::default()
        };

        let mut sink = Recorder::default();
        dispatch_all(&scheduler.on_launch(&wallet, &enabled()), &mut sink);
        assert_eq!(sink.shown, vec![NotificationKind::WalletUpgraded]);
        assert!(sink.upgraded);
        assert!(scheduler.flags().has_been_notified);

        assert!(scheduler.on_launch(&wallet, &enabled()).is_empty());

        dispatch_all(
            &scheduler.on_response(NotificationKind::WalletUpgraded, 0, None),
            &mut sink,
        );
        assert_eq!(sink.opened, vec![BACKUP_PANEL_URL.to_string()]);
        assert_eq!(sink.hidden, vec![NotificationKind::WalletUpgraded]);
    }

    #[test]
    fn effects_serialize_with_type_tag() {
        let json = serde_json::to_value(Effect::Hide {
            kind: NotificationKind::PaymentDone,
        })
        .unwrap();
        assert_eq!(json["type"], "hide");
        assert_eq!(json["kind"], "payment_done");
    }
}
