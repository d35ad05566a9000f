//! # payledger Core Library
//!
//! Business logic for the browser ledger's user-facing side: deciding when to
//! nudge the user about their contribution wallet, and deciding which visited
//! publishers take part in automatic contributions.
//!
//! ## Architecture
//!
//! - **Notification Scheduler**: a tick-driven state machine. The caller (or
//!   [`NotificationPoller`]) invokes `tick()` on a fixed cadence and routes the
//!   returned [`Effect`]s to a [`NotificationSink`]
//! - **Eligibility Evaluator**: pure predicates over a [`LedgerState`] snapshot
//! - **Media Extractor**: turns embedded-video telemetry into attention time
//! - **Storage**: TOML configuration and a SQLite key-value store for the
//!   persisted notification state
//!
//! ## Key Components
//!
//! - [`NotificationScheduler`]: notification decision rules and response handling
//! - [`publisher`]: `eligible`, `sticky`, `blocked`, `contribute`, `visible`
//! - [`media`]: provider detection and watch-time extraction
//! - [`Config`] / [`Database`]: settings and persisted state

pub mod error;
pub mod format;
pub mod media;
pub mod notifications;
pub mod publisher;
pub mod storage;
pub mod time;
pub mod wallet;

pub use error::{ConfigError, CoreError};
pub use format::{bat_to_currency_string, format_current_balance, RateInfo};
pub use media::{MediaData, MediaProvider, MediaVisits};
pub use notifications::{
    Effect, NotificationDedupState, NotificationKind, NotificationPoller, NotificationRequest,
    NotificationScheduler, NotificationSink, PaymentSettings,
};
pub use publisher::{LedgerState, PublisherRecord, SynopsisOptions, SynopsisUpdate};
pub use storage::{Config, Database};
pub use time::{Clock, SystemClock};
pub use wallet::{Contribution, MigrationFlags, Transaction, WalletSnapshot};
