use std::path::PathBuf;

use clap::Subcommand;
use payledger_core::{bat_to_currency_string, format_current_balance, RateInfo, WalletSnapshot};

use super::read_json;

#[derive(Subcommand)]
pub enum WalletAction {
    /// Print the wallet balance, converted to USD when a rate is given
    Balance {
        /// Wallet snapshot (JSON)
        #[arg(long)]
        wallet: PathBuf,
        /// BAT to USD rate
        #[arg(long)]
        rate: Option<String>,
    },
}

pub fn run(action: WalletAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        WalletAction::Balance { wallet, rate } => {
            let snapshot: WalletSnapshot = read_json(&wallet)?;
            let rates = rate.as_deref().map(RateInfo::with_rate);
            let parsed_rate = rate.as_deref().and_then(|r| r.trim().parse::<f64>().ok());
            let converted = snapshot.balance * parsed_rate.unwrap_or(0.0);
            println!(
                "{}",
                format_current_balance(snapshot.balance, converted, parsed_rate.is_some())
            );
            if let Some(target) = snapshot.contribution_target {
                let fiat = bat_to_currency_string(target, rates.as_ref());
                if fiat.is_empty() {
                    println!("contribution: {target:.2} BAT");
                } else {
                    println!("contribution: {target:.2} BAT ({fiat})");
                }
            }
        }
    }
    Ok(())
}
