use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::Subcommand;
use payledger_core::notifications::dispatch_all;
use payledger_core::time::{display_ms, FixedClock};
use payledger_core::wallet::new_transactions;
use payledger_core::{
    Clock, Config, Contribution, Database, Effect, NotificationKind, NotificationPoller,
    NotificationScheduler, PaymentSettings, SystemClock, WalletSnapshot,
};
use tracing::{info, warn};

use super::read_json;
use crate::sink::ConsoleSink;

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Run one poll cycle against a wallet snapshot
    Tick {
        /// Wallet snapshot (JSON)
        #[arg(long)]
        wallet: PathBuf,
        /// Evaluate at this instant (epoch ms) instead of the wall clock
        #[arg(long)]
        now: Option<i64>,
    },
    /// Launch-time checks (wallet-upgrade announcement)
    Launch {
        /// Wallet snapshot (JSON)
        #[arg(long)]
        wallet: PathBuf,
        /// Mark this profile as migrated to the upgraded wallet
        #[arg(long)]
        migrated: bool,
    },
    /// Report a button press on a notification
    Respond {
        /// Notification kind (e.g. "add_funds")
        kind: NotificationKind,
        /// Button index, left to right
        index: usize,
        /// Window the payments panel should open in
        #[arg(long)]
        window: Option<u32>,
        /// Open requested panels in the system browser
        #[arg(long)]
        open: bool,
    },
    /// Announce a completed contribution
    Paid {
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = "USD")]
        currency: String,
    },
    /// Poll the wallet snapshot until interrupted
    Watch {
        /// Wallet snapshot (JSON), re-read on every tick
        #[arg(long)]
        wallet: PathBuf,
    },
    /// Print persisted notification state as JSON
    Status,
    /// Turn notifications on
    Enable,
    /// Turn notifications off
    Disable,
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Storage and settings the scheduler is loaded from and saved to.
///
/// The scheduler itself is never cached between calls: every command loads it,
/// acts and saves inside one database write lock, so a `watch` loop and a
/// one-shot `respond` never overwrite each other's changes.
struct Session {
    db: Database,
    config: Config,
    settings: PaymentSettings,
}

impl Session {
    fn open(now: i64) -> CliResult<Self> {
        let config = Config::load()?;
        let db = Database::open()?;
        let settings = config.payment_settings(db.first_run_ms(now)?);
        Ok(Self {
            db,
            config,
            settings,
        })
    }

    fn load_scheduler(&self, db: &Database) -> CliResult<NotificationScheduler> {
        Ok(
            NotificationScheduler::new(db.notification_state()?, db.migration_flags()?)
                .with_panels(self.config.panels())
                .with_outstanding(db.outstanding_notification()?),
        )
    }

    /// Load the scheduler, run `f`, and persist the result atomically.
    fn update<T>(
        &self,
        f: impl FnOnce(&mut NotificationScheduler, &Database) -> CliResult<T>,
    ) -> CliResult<T> {
        self.db.with_write_lock(|db| {
            let mut scheduler = self.load_scheduler(db)?;
            let out = f(&mut scheduler, db)?;
            db.save_notification_state(scheduler.state())?;
            db.save_migration_flags(scheduler.flags())?;
            db.save_outstanding_notification(scheduler.outstanding())?;
            Ok(out)
        })
    }

    /// Pick up settings changed by `config set` since the session opened.
    fn reload_config(&mut self) -> CliResult<()> {
        self.config = Config::load()?;
        self.settings = self.config.payment_settings(self.settings.first_run_ms);
        Ok(())
    }

    /// One poll: announce new transactions, then run the tick rules.
    fn poll(&mut self, wallet_path: &Path, now: i64) -> CliResult<Vec<Effect>> {
        let wallet: WalletSnapshot = read_json(wallet_path)?;
        let settings = self.settings;
        self.update(|scheduler, db| {
            let mut effects = Vec::new();
            if let Some(previous) = db.last_wallet()? {
                for tx in new_transactions(&previous, &wallet) {
                    info!(viewing_id = %tx.viewing_id, "new contribution observed");
                    effects.extend(scheduler.on_new_transaction(&tx.contribution));
                }
            }
            effects.extend(scheduler.tick(now, &wallet, &settings));
            db.save_last_wallet(&wallet)?;
            Ok(effects)
        })
    }
}

fn clock(now: Option<i64>) -> Box<dyn Clock> {
    match now {
        Some(ms) => Box::new(FixedClock(ms)),
        None => Box::new(SystemClock),
    }
}

pub fn run(action: NotifyAction) -> CliResult<()> {
    match action {
        NotifyAction::Tick { wallet, now } => {
            let now = clock(now).now_ms();
            let mut session = Session::open(now)?;
            let effects = session.poll(&wallet, now)?;
            dispatch_all(&effects, &mut ConsoleSink::new(false));
        }
        NotifyAction::Launch { wallet, migrated } => {
            let snapshot: WalletSnapshot = read_json(&wallet)?;
            let session = Session::open(SystemClock.now_ms())?;
            let settings = session.settings;
            let effects = session.update(|scheduler, db| {
                if migrated {
                    let mut flags = db.migration_flags()?;
                    flags.is_new_install = false;
                    flags.has_upgraded_wallet = true;
                    *scheduler = NotificationScheduler::new(scheduler.state().clone(), flags)
                        .with_panels(session.config.panels())
                        .with_outstanding(scheduler.outstanding());
                }
                Ok(scheduler.on_launch(&snapshot, &settings))
            })?;
            dispatch_all(&effects, &mut ConsoleSink::new(false));
        }
        NotifyAction::Respond {
            kind,
            index,
            window,
            open,
        } => {
            let session = Session::open(SystemClock.now_ms())?;
            let effects =
                session.update(|scheduler, _| Ok(scheduler.on_response(kind, index, window)))?;
            dispatch_all(&effects, &mut ConsoleSink::new(open));
        }
        NotifyAction::Paid { amount, currency } => {
            let session = Session::open(SystemClock.now_ms())?;
            let contribution = Contribution { amount, currency };
            let effects =
                session.update(|scheduler, _| Ok(scheduler.on_new_transaction(&contribution)))?;
            dispatch_all(&effects, &mut ConsoleSink::new(false));
        }
        NotifyAction::Watch { wallet } => watch(wallet)?,
        NotifyAction::Status => {
            let session = Session::open(SystemClock.now_ms())?;
            let scheduler = session.load_scheduler(&session.db)?;
            let status = serde_json::json!({
                "state": scheduler.state(),
                "flags": scheduler.flags(),
                "outstanding": scheduler.outstanding(),
                "payments_enabled": session.settings.payments_enabled,
                "first_run": display_ms(session.settings.first_run_ms),
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        NotifyAction::Enable => set_enabled(true)?,
        NotifyAction::Disable => set_enabled(false)?,
    }
    Ok(())
}

fn set_enabled(enabled: bool) -> CliResult<()> {
    let session = Session::open(SystemClock.now_ms())?;
    session.update(|scheduler, _| {
        scheduler.set_notifications_enabled(enabled);
        Ok(())
    })?;
    println!("notifications {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}

fn watch(wallet: PathBuf) -> CliResult<()> {
    let interval = Config::load()?.poll_interval();
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async move {
        let mut session = Session::open(SystemClock.now_ms())?;
        let effects = session.poll(&wallet, SystemClock.now_ms())?;
        dispatch_all(&effects, &mut ConsoleSink::new(false));

        let shared = Arc::new(Mutex::new(session));
        let mut poller = NotificationPoller::with_interval(interval);
        let worker = Arc::clone(&shared);
        poller.init(move || {
            let mut session = match worker.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let polled = session
                .reload_config()
                .and_then(|()| session.poll(&wallet, SystemClock.now_ms()));
            match polled {
                Ok(effects) => dispatch_all(&effects, &mut ConsoleSink::new(false)),
                Err(e) => warn!(error = %e, "poll failed"),
            }
        });
        info!(interval_secs = interval.as_secs(), "watching wallet; Ctrl-C to stop");

        tokio::signal::ctrl_c().await?;
        poller.shutdown();
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
