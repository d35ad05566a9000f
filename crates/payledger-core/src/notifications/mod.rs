mod message;
mod poller;
pub mod rules;
mod scheduler;
mod state;

pub use message::{Button, NotificationKind, NotificationOptions, NotificationRequest};
pub use poller::{NotificationPoller, MAX_POLL_INTERVAL, MIN_POLL_INTERVAL, POLL_INTERVAL};
pub use rules::{Decision, PaymentSettings};
pub use scheduler::{
    dispatch_all, Effect, NotificationScheduler, NotificationSink, PanelUrls, BACKUP_PANEL_URL,
    PAYMENTS_PANEL_URL,
};
pub use state::NotificationDedupState;
