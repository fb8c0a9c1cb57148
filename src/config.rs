use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the completion backend.
    pub backend_url: String,

    /// Seconds before an outstanding request is abandoned.
    pub timeout_secs: u64,

    /// Directory holding the config file and the log file.
    #[serde(skip)]
    pub home: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));

        Config {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_secs: 60,
            home: home.join(".palaver"),
        }
    }
}

impl Config {
    /// Load configuration from `~/.palaver/config.toml`.
    ///
    /// The directory and a default config file are created on first run.
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir()
            .context("Could not find home directory")?
            .join(".palaver");

        fs::create_dir_all(&home).context("Failed to create .palaver directory")?;

        let config_path = home.join("config.toml");
        let mut config = if config_path.exists() {
            let content =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            Config::default()
        };

        config.home = home;
        if !config_path.exists() {
            config.save()?;
        }

        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        let config_path = self.home.join("config.toml");
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Path of the diagnostic log file.
    pub fn log_path(&self) -> PathBuf {
        self.home.join("palaver.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_config_file() {
        let config: Config =
            toml::from_str("backend_url = \"http://chat.example:9000\"\ntimeout_secs = 10\n")
                .unwrap();
        assert_eq!(config.backend_url, "http://chat.example:9000");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn default_points_at_the_local_backend() {
        let config = Config::default();
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config {
            backend_url: "http://elsewhere:1234".to_string(),
            timeout_secs: 5,
            ..Config::default()
        };
        let serialized = toml::to_string_pretty(&config).unwrap();
        let restored: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(restored.backend_url, config.backend_url);
        assert_eq!(restored.timeout_secs, config.timeout_secs);
    }
}
