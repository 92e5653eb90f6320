//! Hub configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/cloudhub/hub.toml`
//! - Windows: `%APPDATA%/cloudhub/hub.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use cloudhub_hub_transfers::{EngineConfig, Language};
use cloudhub_transfer::SimulationConfig;
use serde::{Deserialize, Serialize};

/// Hub configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubConfig {
    /// Language for failure messages.
    #[serde(default)]
    pub language: Language,

    /// Pacing of the simulated transport.
    #[serde(default)]
    pub simulation: SimulationSettings,

    /// Capacity of the transfer event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

/// Simulated transport settings, in milliseconds where timed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    pub steps: u32,
    pub failure_rate: f64,
}

fn default_event_buffer() -> usize {
    EngineConfig::default().event_buffer
}

impl Default for SimulationSettings {
    fn default() -> Self {
        let sim = SimulationConfig::default();
        Self {
            min_duration_ms: sim.min_duration.as_millis() as u64,
            max_duration_ms: sim.max_duration.as_millis() as u64,
            steps: sim.steps,
            failure_rate: sim.failure_rate,
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            simulation: SimulationSettings::default(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl HubConfig {
    /// Loads configuration from `path` (or the platform default), creating
    /// the file with defaults if it does not exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_path()?,
        };

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: HubConfig = toml::from_str(&content)?;
            tracing::debug!(path = %path.display(), "configuration loaded");
            Ok(config)
        } else {
            let config = HubConfig::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    /// Writes the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            min_duration: Duration::from_millis(self.simulation.min_duration_ms),
            max_duration: Duration::from_millis(self.simulation.max_duration_ms),
            steps: self.simulation.steps,
            failure_rate: self.simulation.failure_rate,
        }
    }

    pub fn engine_config(&self, language: Language) -> EngineConfig {
        EngineConfig {
            language,
            event_buffer: self.event_buffer,
        }
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cloudhub")
            .join("hub.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("cloudhub").join("hub.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/cloudhub/hub.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_simulation_defaults() {
        let config = HubConfig::default();
        assert_eq!(config.language, Language::En);
        assert_eq!(config.simulation.min_duration_ms, 2000);
        assert_eq!(config.simulation.max_duration_ms, 5000);
        assert_eq!(config.simulation.steps, 10);
        assert_eq!(config.event_buffer, 256);
        assert_eq!(config.simulation_config(), SimulationConfig::default());
    }

    #[test]
    fn config_partial_toml() {
        let toml_str = r#"
language = "zh"

[simulation]
failure_rate = 0.0
"#;
        let config: HubConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.language, Language::Zh);
        assert_eq!(config.simulation.failure_rate, 0.0);
        assert_eq!(config.simulation.steps, 10);
        assert_eq!(config.event_buffer, 256);
    }

    #[test]
    fn config_path_not_empty() {
        let path = config_path().unwrap();
        assert!(path.to_string_lossy().contains("cloudhub"));
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("hub.toml");

        let config = HubConfig::load(Some(&path)).unwrap();
        assert_eq!(config, HubConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn config_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("hub.toml");

        let config = HubConfig {
            language: Language::Zh,
            simulation: SimulationSettings {
                min_duration_ms: 100,
                max_duration_ms: 200,
                steps: 4,
                failure_rate: 0.5,
            },
            event_buffer: 16,
        };
        config.save_to(&path).unwrap();

        let loaded = HubConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(
            loaded.simulation_config().min_duration,
            Duration::from_millis(100)
        );
        assert_eq!(loaded.engine_config(Language::En).event_buffer, 16);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("hub.toml");
        std::fs::write(&path, "event_buffer = \"lots\"").unwrap();
        assert!(HubConfig::load(Some(&path)).is_err());
    }
}
