use clap::Subcommand;
use std::path::{Path, PathBuf};
use zmanim_core::{Config, Settings};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "timezone", "sabbath.lead_minutes", "offsets.sunset")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// Show the whole config as JSON
    Show,
    /// Print the config file location
    Path,
    /// Reset config to defaults
    Reset,
    /// Validate the config without starting the scheduler
    Check,
}

fn config_path(path: Option<&Path>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(Config::default_path()?),
    }
}

pub fn run(path: Option<&Path>, action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path(path)?;
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load_from(&path)?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_from(&path)?;
            config.set(&key, &value)?;
            config.save_to(&path)?;
            println!("ok");
        }
        ConfigAction::Show => {
            let config = Config::load_from(&path)?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Reset => {
            Config::default().save_to(&path)?;
            println!("config reset to defaults");
        }
        ConfigAction::Check => {
            let config = Config::load_from(&path)?;
            let settings = Settings::from_config(&config)?;
            println!(
                "ok: {} refresh at {}, fallback {}",
                settings.timezone,
                settings.refresh_time.format("%H:%M"),
                settings.fallback_label
            );
        }
    }
    Ok(())
}
