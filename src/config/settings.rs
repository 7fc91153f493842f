//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Every section is `#[serde(default)]`, so a hand-edited file only needs the
//! keys it wants to override.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// GatewayConfig
// ---------------------------------------------------------------------------

/// Connection settings for the vehicle registry backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the registry API, without a trailing `/cars`.
    pub base_url: String,
    /// Maximum seconds to wait for a lookup before it counts as a transport
    /// failure.
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            timeout_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// VoiceConfig
// ---------------------------------------------------------------------------

/// Settings for the recognition source and the voice-triggered search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// BCP-47 locale passed to the recognition source (e.g. `"en-IN"`).
    pub language: String,
    /// Grace period between hearing a transcript and firing the search, so
    /// the "Heard: …" acknowledgment is visible first.
    pub search_delay_ms: u64,
    /// Keep recognising after the first final transcript.
    pub continuous: bool,
    /// Deliver partial transcripts while the user is still speaking.
    pub interim_results: bool,
}

impl VoiceConfig {
    /// [`search_delay_ms`](Self::search_delay_ms) as a [`Duration`].
    pub fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_delay_ms)
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: "en-IN".into(),
            search_delay_ms: 800,
            continuous: false,
            interim_results: false,
        }
    }
}

// ---------------------------------------------------------------------------
// AnnouncerConfig
// ---------------------------------------------------------------------------

/// Settings for the spoken summary of a found vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnouncerConfig {
    /// Whether found vehicles are read out at all.
    pub enabled: bool,
    /// Text-to-speech program; the summary is appended as its last argument.
    pub program: String,
    /// Extra arguments placed before the summary text.
    pub args: Vec<String>,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "espeak-ng".into(),
            args: vec!["-s".into(), "150".into()],
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use vehicle_voice_search::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Registry backend connection.
    pub gateway: GatewayConfig,
    /// Recognition and voice-search timing.
    pub voice: VoiceConfig,
    /// Spoken result summaries.
    pub announcer: AnnouncerConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.gateway.base_url, "http://localhost:8000");
        assert_eq!(cfg.gateway.timeout_secs, 10);
        assert_eq!(cfg.voice.language, "en-IN");
        assert_eq!(cfg.voice.search_delay(), Duration::from_millis(800));
        assert!(!cfg.voice.continuous);
        assert!(!cfg.voice.interim_results);
        assert!(cfg.announcer.enabled);
        assert_eq!(cfg.announcer.program, "espeak-ng");
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn save_then_load_keeps_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("settings.toml");

        let mut cfg = AppConfig::default();
        cfg.gateway.base_url = "https://registry.example.com".into();
        cfg.voice.search_delay_ms = 250;
        cfg.voice.language = "hi-IN".into();
        cfg.announcer.enabled = false;
        cfg.announcer.args = vec![];

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded, cfg);
    }

    /// A file that only overrides one key keeps defaults everywhere else.
    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[voice]\nsearch_delay_ms = 1200\n").expect("write");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.voice.search_delay_ms, 1200);
        assert_eq!(loaded.voice.language, "en-IN");
        assert_eq!(loaded.gateway, GatewayConfig::default());
        assert_eq!(loaded.announcer, AnnouncerConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[voice\nlanguage = ").expect("write");

        assert!(AppConfig::load_from(&path).is_err());
    }
}
