use clap::Subcommand;
use payledger_core::Config;

const SECTIONS: [&str; 2] = ["payments", "notifications"];

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "payments.enabled", "notifications.poll_interval_secs")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// Show the configuration, one TOML section at a time
    List {
        /// Only this section ("payments" or "notifications")
        section: Option<String>,
        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigAction::List { section, json } => {
            let config = Config::load()?;
            if json {
                let mut value = serde_json::to_value(&config)?;
                if let Some(section) = &section {
                    value = value
                        .get(section.as_str())
                        .cloned()
                        .ok_or_else(|| format!("unknown section: {section}"))?;
                }
                println!("{}", serde_json::to_string_pretty(&value)?);
                return Ok(());
            }
            let sections = match &section {
                Some(section) => vec![section.as_str()],
                None => SECTIONS.to_vec(),
            };
            for (i, name) in sections.into_iter().enumerate() {
                if i > 0 {
                    println!();
                }
                println!("[{name}]");
                print!("{}", config.section_toml(name)?);
            }
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
