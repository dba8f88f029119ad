//! Optional `config.toml` with the non-secret settings.
//!
//! Everything in the file can be overridden by the matching environment
//! variable. Credentials are never read from the file.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// The whole `config.toml` file. Every section and key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// `[discord]` section
    pub discord: DiscordSection,
    /// `[cloudflare]` section
    pub cloudflare: CloudflareSection,
}

/// Discord settings that are safe to keep in a file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscordSection {
    pub guild_id: Option<String>,
    pub log_channel_id: Option<String>,
}

/// Cloudflare settings that are safe to keep in a file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CloudflareSection {
    pub database_name: Option<String>,
    pub bucket_name: Option<String>,
    pub api_base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Parses configuration from TOML text.
///
/// Errors carry the parser message and position only, never the offending
/// source line, which may hold a misplaced secret.
pub fn parse_config(contents: &str) -> Result<FileConfig> {
    toml::from_str(contents).map_err(|e| {
        let position = e
            .span()
            .and_then(|span| contents.get(..span.start))
            .map(|before| {
                let line = before.matches('\n').count() + 1;
                let column = before.len() - before.rfind('\n').map_or(0, |i| i + 1) + 1;
                format!(" at line {line}, column {column}")
            })
            .unwrap_or_default();
        Error::Config {
            message: format!("Failed to parse config file{position}: {}", e.message()),
        }
    })
}

/// Loads the config file at `path`, or an empty configuration if it does not exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!("No config file at {:?}, using environment only", path);
        return Ok(FileConfig::default());
    }
    tracing::debug!("Loading configuration from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path:?}: {e}"),
    })?;
    parse_config(&contents)
}
