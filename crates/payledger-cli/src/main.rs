use clap::{Parser, Subcommand};

mod commands;
mod sink;

#[derive(Parser)]
#[command(name = "payledger", version, about = "Browser ledger notification and publisher tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wallet notifications: ticks, responses, polling
    Notify {
        #[command(subcommand)]
        action: commands::notify::NotifyAction,
    },
    /// Publisher eligibility and contribution shares
    Publisher {
        #[command(subcommand)]
        action: commands::publisher::PublisherAction,
    },
    /// Embedded media telemetry
    Media {
        #[command(subcommand)]
        action: commands::media::MediaAction,
    },
    /// Wallet display helpers
    Wallet {
        #[command(subcommand)]
        action: commands::wallet::WalletAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Notify { action } => commands::notify::run(action),
        Commands::Publisher { action } => commands::publisher::run(action),
        Commands::Media { action } => commands::media::run(action),
        Commands::Wallet { action } => commands::wallet::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
