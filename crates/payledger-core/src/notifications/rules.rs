//! Pure decision rules evaluated on every scheduler tick.
//!
//! ```text
//! remaining = reconcile_timestamp - now
//!
//!   remaining < 1d      sufficient -> ReviewPublishers (until reconcile + (freq-2)d)
//!                       otherwise  -> AddFunds         (until now + 3d)
//!   1d <= remaining < 2d sufficient -> ReviewPublishers (until now + 1d)
//!   else                nothing
//! ```

use serde::{Deserialize, Serialize};

use super::state::NotificationDedupState;
use crate::time::{checked_days, days, DAY_MS};
use crate::wallet::{MigrationFlags, WalletSnapshot};

/// Cool-down applied when the add-funds message is shown.
pub const ADD_FUNDS_SNOOZE_DAYS: i64 = 3;
/// Reconciliation-soon reminders stop this many days before the next cycle.
pub const REVIEW_LEAD_DAYS: i64 = 2;

/// Settings snapshot taken alongside the wallet for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSettings {
    pub payments_enabled: bool,
    /// First launch of the profile (epoch ms).
    pub first_run_ms: i64,
    /// Grace period after first launch before the try-payments upsell.
    pub try_payments_delay_ms: i64,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            payments_enabled: false,
            first_run_ms: 0,
            try_payments_delay_ms: days(10),
        }
    }
}

/// Outcome of evaluating the tick rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Nothing,
    TryPayments,
    AddFunds { next_eligible: i64 },
    ReviewPublishers { next_eligible: i64 },
}

/// Entry point for a tick: payments-off upsell or the reconciliation window.
pub fn evaluate(
    now: i64,
    wallet: &WalletSnapshot,
    settings: &PaymentSettings,
    state: &NotificationDedupState,
) -> Decision {
    if settings.payments_enabled {
        if !state.notifications_enabled {
            return Decision::Nothing;
        }
        reconcile_window(now, wallet, state)
    } else {
        try_payments(now, settings, state)
    }
}

/// Escalating 48h/24h reminders ahead of a reconciliation.
pub fn reconcile_window(
    now: i64,
    wallet: &WalletSnapshot,
    state: &NotificationDedupState,
) -> Decision {
    let Some(reconcile_at) = wallet.reconcile_timestamp else {
        return Decision::Nothing;
    };
    let Some(sufficient) = wallet.has_sufficient_funds() else {
        return Decision::Nothing;
    };
    // Timestamps come straight from the wallet; overflow means no rule applies.
    let Some(remaining) = reconcile_at.checked_sub(now) else {
        return Decision::Nothing;
    };

    if remaining < DAY_MS {
        if sufficient {
            if state.review_eligible(now) {
                let next_eligible = wallet
                    .reconcile_frequency_days
                    .checked_sub(REVIEW_LEAD_DAYS)
                    .and_then(checked_days)
                    .and_then(|lead| reconcile_at.checked_add(lead));
                if let Some(next_eligible) = next_eligible {
                    return Decision::ReviewPublishers { next_eligible };
                }
            }
        } else if state.add_funds_eligible(now) {
            if let Some(next_eligible) = now.checked_add(days(ADD_FUNDS_SNOOZE_DAYS)) {
                return Decision::AddFunds { next_eligible };
            }
        }
    } else if remaining < 2 * DAY_MS && sufficient && state.review_eligible(now) {
        if let Some(next_eligible) = now.checked_add(DAY_MS) {
            return Decision::ReviewPublishers { next_eligible };
        }
    }
    Decision::Nothing
}

/// One-time upsell while payments are switched off.
pub fn try_payments(
    now: i64,
    settings: &PaymentSettings,
    state: &NotificationDedupState,
) -> Decision {
    if settings.payments_enabled || state.try_payments_dismissed {
        return Decision::Nothing;
    }
    match now.checked_sub(settings.first_run_ms) {
        Some(age) if age > settings.try_payments_delay_ms => Decision::TryPayments,
        _ => Decision::Nothing,
    }
}

/// Launch-time check for the one-off wallet-upgrade announcement.
pub fn wallet_upgrade_due(
    wallet: &WalletSnapshot,
    settings: &PaymentSettings,
    flags: &MigrationFlags,
) -> bool {
    settings.payments_enabled
        && wallet.has_funds()
        && !flags.is_new_install
        && flags.has_upgraded_wallet
        && !flags.has_been_notified
}
