use std::path::{Path, PathBuf};

use clap::Subcommand;
use payledger_core::publisher::{blocked, contribute, contribution_shares, eligible, sticky, visible};
use payledger_core::{Config, LedgerState};
use serde::Serialize;
use tracing::debug;

use super::read_json;

#[derive(Subcommand)]
pub enum PublisherAction {
    /// Evaluate one publisher
    Eval {
        /// Ledger state (JSON)
        #[arg(long)]
        state: PathBuf,
        /// Publisher key (e.g. "example.com")
        key: String,
    },
    /// Evaluate every known publisher
    List {
        /// Ledger state (JSON)
        #[arg(long)]
        state: PathBuf,
    },
    /// Percentage of the next contribution per publisher
    Shares {
        /// Ledger state (JSON)
        #[arg(long)]
        state: PathBuf,
    },
}

#[derive(Serialize)]
struct Verdict {
    key: String,
    eligible: bool,
    sticky: bool,
    blocked: bool,
    contribute: bool,
    visible: bool,
}

/// Stored state plus the copy evaluated under the configured thresholds.
struct Ledger {
    stored: LedgerState,
    evaluated: LedgerState,
}

impl Ledger {
    fn load(path: &Path, config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let stored: LedgerState = read_json(path)?;
        let mut evaluated = stored.clone();
        config.apply_thresholds(&mut evaluated.synopsis.options);
        Ok(Self { stored, evaluated })
    }

    /// Evaluate `key`, caching the verified-only option when it gets derived.
    fn evaluate(&mut self, config: &Config, key: &str) -> Verdict {
        let state = &mut self.evaluated;
        let (shown, update) = visible(state, config.payments.allow_non_verified, key);
        if let Some(update) = update {
            debug!(?update, "caching derived synopsis option");
            state.apply(update);
            self.stored.apply(update);
        }
        Verdict {
            key: key.to_string(),
            eligible: eligible(state, key),
            sticky: sticky(state, key),
            blocked: blocked(state, key),
            contribute: contribute(state, key),
            visible: shown,
        }
    }

    /// Write back the stored state when a derived option was cached. The
    /// file's own thresholds are left as they were.
    fn persist(&self, path: &Path, original: &LedgerState) -> Result<(), Box<dyn std::error::Error>> {
        if self.stored != *original {
            std::fs::write(path, serde_json::to_string_pretty(&self.stored)?)?;
        }
        Ok(())
    }
}

pub fn run(action: PublisherAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    match action {
        PublisherAction::Eval { state: path, key } => {
            let mut ledger = Ledger::load(&path, &config)?;
            let original = ledger.stored.clone();
            let verdict = ledger.evaluate(&config, &key);
            ledger.persist(&path, &original)?;
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        PublisherAction::List { state: path } => {
            let mut ledger = Ledger::load(&path, &config)?;
            let original = ledger.stored.clone();
            let keys: Vec<String> = original
                .publisher_keys()
                .into_iter()
                .map(str::to_string)
                .collect();
            let verdicts: Vec<Verdict> = keys
                .iter()
                .map(|key| ledger.evaluate(&config, key))
                .collect();
            ledger.persist(&path, &original)?;
            println!("{}", serde_json::to_string_pretty(&verdicts)?);
        }
        PublisherAction::Shares { state: path } => {
            let ledger = Ledger::load(&path, &config)?;
            let shares = contribution_shares(&ledger.evaluated);
            println!("{}", serde_json::to_string_pretty(&shares)?);
        }
    }
    Ok(())
}
