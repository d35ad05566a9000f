//! Read-only wallet view handed to the notification scheduler.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fraction of the contribution target that counts as "enough funds".
/// In-flight unconfirmed amounts make the balance drift a little.
pub const SUFFICIENT_FUNDS_RATIO: f64 = 0.9;

/// Snapshot of the contribution wallet, taken once per scheduler tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub unconfirmed_balance: f64,
    /// Amount the next reconciliation will spend.
    #[serde(default)]
    pub contribution_target: Option<f64>,
    /// When the next reconciliation happens (epoch ms).
    #[serde(default)]
    pub reconcile_timestamp: Option<i64>,
    #[serde(default = "default_reconcile_frequency_days")]
    pub reconcile_frequency_days: i64,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

fn default_reconcile_frequency_days() -> i64 {
    30
}

impl WalletSnapshot {
    /// Whether confirmed plus unconfirmed funds cover 90% of the target.
    ///
    /// `None` when there is no target to compare against.
    pub fn has_sufficient_funds(&self) -> Option<bool> {
        let target = self.contribution_target?;
        Some(self.balance + self.unconfirmed_balance >= SUFFICIENT_FUNDS_RATIO * target)
    }

    pub fn has_funds(&self) -> bool {
        self.balance > 0.0
    }
}

/// A settled contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub viewing_id: String,
    #[serde(default)]
    pub submission_stamp: i64,
    pub contribution: Contribution,
}

/// Fiat value of a contribution, as reported by the reconciliation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub amount: f64,
    pub currency: String,
}

/// Install and migration facts read at launch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationFlags {
    #[serde(default)]
    pub is_new_install: bool,
    #[serde(default)]
    pub has_upgraded_wallet: bool,
    /// Set once the wallet-upgrade notification has been shown.
    #[serde(default)]
    pub has_been_notified: bool,
}

/// Transactions in `current` whose viewing id does not appear in `previous`,
/// in `current`'s order.
pub fn new_transactions<'a>(
    previous: &WalletSnapshot,
    current: &'a WalletSnapshot,
) -> Vec<&'a Transaction> {
    let seen: HashSet<&str> = previous
        .transactions
        .iter()
        .map(|t| t.viewing_id.as_str())
        .collect();
    current
        .transactions
        .iter()
        .filter(|t| !seen.contains(t.viewing_id.as_str()))
        .collect()
}
