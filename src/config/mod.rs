//! Configuration module for the vehicle voice search console.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the registry
//! gateway, the voice interaction and the announcer, `AppPaths` for the
//! platform config directory, and TOML persistence via `AppConfig::load` /
//! `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AnnouncerConfig, AppConfig, GatewayConfig, VoiceConfig};
