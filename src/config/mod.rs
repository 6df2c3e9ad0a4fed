//! Configuration for SchemeLand.
//!
//! Config lives in `config.toml` inside the profile's data directory. All
//! keys are optional; a missing file means defaults. The data directory
//! itself resolves from `SL_DATA_DIR` (used by tests for isolation) or the
//! platform data dir, namespaced by profile.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Default heartbeat interval in seconds.
pub const DEFAULT_HEARTBEAT_SECS: u64 = 30;

/// Default dev server port.
pub const DEFAULT_SERVER_PORT: u16 = 8787;

/// Parsed configuration with defaults applied.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the scripted-oracle JSON document
    pub oracle_script: Option<PathBuf>,
    /// Base URL of a remote storage/session server; unset means local files
    pub remote_url: Option<String>,
    /// Owner heartbeat interval
    pub heartbeat_secs: u64,
    /// Port for `sland serve`
    pub server_port: u16,
    /// Whether CLI invocations are appended to the action log
    pub action_log_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            oracle_script: None,
            remote_url: None,
            heartbeat_secs: DEFAULT_HEARTBEAT_SECS,
            server_port: DEFAULT_SERVER_PORT,
            action_log_enabled: true,
        }
    }
}

/// Raw TOML shape; every key optional.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    oracle_script: Option<PathBuf>,
    remote_url: Option<String>,
    heartbeat_secs: Option<u64>,
    server_port: Option<u16>,
    action_log_enabled: Option<bool>,
}

impl Config {
    /// Load config from the data directory, applying defaults for missing
    /// keys or a missing file.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join("config.toml");
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return Ok(Self::default()),
        };
        let file: ConfigFile = toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let defaults = Self::default();
        Ok(Self {
            oracle_script: file.oracle_script,
            remote_url: file.remote_url,
            heartbeat_secs: file.heartbeat_secs.unwrap_or(defaults.heartbeat_secs),
            server_port: file.server_port.unwrap_or(defaults.server_port),
            action_log_enabled: file
                .action_log_enabled
                .unwrap_or(defaults.action_log_enabled),
        })
    }

    /// Write a commented default config if none exists yet.
    pub fn write_default(data_dir: &Path) -> Result<()> {
        let path = data_dir.join("config.toml");
        if path.exists() {
            return Ok(());
        }
        std::fs::create_dir_all(data_dir)?;
        std::fs::write(
            &path,
            "\
# SchemeLand configuration
#
# oracle_script = \"/path/to/oracle.json\"
# remote_url = \"http://localhost:8787\"
# heartbeat_secs = 30
# server_port = 8787
# action_log_enabled = true
",
        )?;
        Ok(())
    }
}

/// Resolve the data directory for a profile.
///
/// Priority: `SL_DATA_DIR` env var (tests, scripting) > platform data dir.
pub fn data_dir(profile: &str) -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SL_DATA_DIR") {
        return Ok(PathBuf::from(dir).join(profile));
    }
    let base = dirs::data_dir()
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?;
    Ok(base.join("schemeland").join(profile))
}
