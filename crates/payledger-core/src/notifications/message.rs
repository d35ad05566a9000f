//! Notification payloads handed to the presentation sink.
//!
//! Each kind has a fixed button layout; responses come back as a positional
//! index into that layout.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::wallet::Contribution;

const GREETING: &str = "Hi!";

/// Stable identity of a notification. At most one instance of each kind is
/// ever outstanding; showing a kind again replaces the previous instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TryPayments,
    AddFunds,
    ReviewPublishers,
    PaymentDone,
    WalletUpgraded,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 5] = [
        NotificationKind::TryPayments,
        NotificationKind::AddFunds,
        NotificationKind::ReviewPublishers,
        NotificationKind::PaymentDone,
        NotificationKind::WalletUpgraded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::TryPayments => "try_payments",
            NotificationKind::AddFunds => "add_funds",
            NotificationKind::ReviewPublishers => "review_publishers",
            NotificationKind::PaymentDone => "payment_done",
            NotificationKind::WalletUpgraded => "wallet_upgraded",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown notification kind: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub is_primary: bool,
}

impl Button {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            is_primary: false,
        }
    }

    fn primary(label: &str) -> Self {
        Self {
            label: label.to_string(),
            is_primary: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOptions {
    /// Stays on screen until the user answers.
    pub persistent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub kind: NotificationKind,
    pub greeting: String,
    pub message: String,
    pub buttons: Vec<Button>,
    pub options: NotificationOptions,
}

impl NotificationRequest {
    fn new(kind: NotificationKind, message: String, buttons: Vec<Button>) -> Self {
        Self {
            kind,
            greeting: GREETING.to_string(),
            message,
            buttons,
            options: NotificationOptions { persistent: false },
        }
    }

    fn persistent(mut self) -> Self {
        self.options.persistent = true;
        self
    }

    pub fn try_payments() -> Self {
        Self::new(
            NotificationKind::TryPayments,
            "Are you ready to support the sites you use most?".into(),
            vec![Button::new("No thanks"), Button::primary("Yes")],
        )
        .persistent()
    }

    pub fn add_funds() -> Self {
        Self::new(
            NotificationKind::AddFunds,
            "Your payments wallet is waiting for a deposit.".into(),
            vec![
                Button::new("Turn off notifications"),
                Button::new("Later"),
                Button::primary("Add funds"),
            ],
        )
        .persistent()
    }

    pub fn review_publishers() -> Self {
        Self::new(
            NotificationKind::ReviewPublishers,
            "Good news! Your favorite publisher sites will be paid in less than 24 hours.".into(),
            vec![
                Button::new("Turn off notifications"),
                Button::new("Dismiss"),
                Button::primary("Review sites"),
            ],
        )
        .persistent()
    }

    pub fn payment_done(contribution: &Contribution) -> Self {
        Self::new(
            NotificationKind::PaymentDone,
            format!(
                "Your contribution of {:.2} {} has been sent to your favorite sites.",
                contribution.amount, contribution.currency
            ),
            vec![Button::new("Turn off notifications"), Button::primary("OK")],
        )
    }

    pub fn wallet_upgraded() -> Self {
        Self::new(
            NotificationKind::WalletUpgraded,
            "Your wallet has been upgraded to BAT. Back it up to keep your funds safe.".into(),
            vec![Button::primary("Back up wallet"), Button::new("Dismiss")],
        )
        .persistent()
    }
}
