//! Terminal rendering of scheduler effects.

use payledger_core::{Effect, NotificationKind, NotificationRequest, NotificationSink};
use tracing::warn;

/// Prints each effect as one JSON line on stdout and opens panel links in the
/// system browser when asked to.
pub struct ConsoleSink {
    open_links: bool,
}

impl ConsoleSink {
    pub fn new(open_links: bool) -> Self {
        Self { open_links }
    }

    fn emit(&self, effect: &Effect) {
        match serde_json::to_string(effect) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!(error = %e, "cannot encode effect"),
        }
    }
}

impl NotificationSink for ConsoleSink {
    fn show(&mut self, request: &NotificationRequest) {
        self.emit(&Effect::Show {
            request: request.clone(),
        });
    }

    fn hide(&mut self, kind: NotificationKind) {
        self.emit(&Effect::Hide { kind });
    }

    fn open_panel(&mut self, url: &str, window_id: Option<u32>) {
        self.emit(&Effect::OpenPanel {
            url: url.to_string(),
            window_id,
        });
        if self.open_links {
            // about: links only resolve inside the browser itself.
            if let Err(e) = open::that(url) {
                warn!(%url, error = %e, "failed to open panel");
            }
        }
    }

    fn wallet_upgrade_notified(&mut self) {
        self.emit(&Effect::WalletUpgradeNotified);
    }
}
