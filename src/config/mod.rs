//! Application configuration.
//!
//! [`AppConfig`] is built once at startup from the environment (after
//! `dotenvy` has loaded `.env`) layered over an optional `config.toml`, then
//! shared read-only by every component. Environment values win over the file.

/// `config.toml` loading
pub mod file;

use crate::errors::{Error, Result};
use file::FileConfig;
use poise::serenity_prelude::{ChannelId, GuildId};
use std::fmt;
use std::num::NonZeroU64;
use std::time::Duration;
use tracing::info;

/// Default Cloudflare API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";
/// Client-side timeout applied to every Cloudflare call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
/// Config file read when `CONFIG_PATH` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Complete, validated configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub discord: DiscordConfig,
    pub cloudflare: CloudflareConfig,
}

/// Discord connection settings.
#[derive(Clone)]
pub struct DiscordConfig {
    pub token: String,
    /// Register commands in this guild only; global registration when `None`
    pub guild_id: Option<GuildId>,
    /// Channel that receives a copy of every pinned message
    pub log_channel_id: ChannelId,
}

/// Cloudflare account, credentials and resource names.
#[derive(Clone)]
pub struct CloudflareConfig {
    pub account_id: String,
    pub email: String,
    pub api_key: String,
    pub database_name: String,
    /// R2 bucket to provision at startup, if any
    pub bucket_name: Option<String>,
    pub api_base_url: String,
    pub timeout: Duration,
}

impl fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"<redacted>")
            .field("guild_id", &self.guild_id)
            .field("log_channel_id", &self.log_channel_id)
            .finish()
    }
}

impl fmt::Debug for CloudflareConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudflareConfig")
            .field("account_id", &"<redacted>")
            .field("email", &"<redacted>")
            .field("api_key", &"<redacted>")
            .field("database_name", &self.database_name)
            .field("bucket_name", &self.bucket_name)
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AppConfig {
    /// Resolves the configuration from a parsed file and an environment lookup.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map. Blank
    /// values are treated as unset.
    pub fn resolve<F>(file: FileConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str, fallback: Option<String>| {
            get(key)
                .or_else(|| fallback.filter(|v| !v.trim().is_empty()))
                .ok_or_else(|| Error::Config {
                    message: format!("{key} is not set"),
                })
        };

        let token = required("DISCORD_TOKEN", None)?;
        let guild_id = get("DISCORD_GUILD_ID")
            .or(file.discord.guild_id)
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_id("DISCORD_GUILD_ID", &v).map(GuildId::from))
            .transpose()?;
        let log_channel_id = required("DISCORD_LOG_CHANNEL_ID", file.discord.log_channel_id)
            .and_then(|v| parse_id("DISCORD_LOG_CHANNEL_ID", &v))
            .map(ChannelId::from)?;

        let account_id = required("CLOUDFLARE_ACCOUNT_ID", None)?;
        let email = required("CLOUDFLARE_ACCOUNT_EMAIL", None)?;
        let api_key = required("CLOUDFLARE_API_KEY", None)?;
        let database_name =
            required("CLOUDFLARE_D1_DATABASE_NAME", file.cloudflare.database_name)?;
        let bucket_name = get("CLOUDFLARE_R2_BUCKET_NAME")
            .or(file.cloudflare.bucket_name)
            .filter(|v| !v.trim().is_empty());
        let api_base_url = get("CLOUDFLARE_API_BASE_URL")
            .or(file.cloudflare.api_base_url)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let timeout = match get("CLOUDFLARE_TIMEOUT_SECS") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| Error::Config {
                message: format!("CLOUDFLARE_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}"),
            })?),
            None => file.cloudflare.timeout_secs,
        }
        .map_or(DEFAULT_TIMEOUT, Duration::from_secs);

        if timeout.is_zero() {
            return Err(Error::Config {
                message: "CLOUDFLARE_TIMEOUT_SECS must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            discord: DiscordConfig {
                token,
                guild_id,
                log_channel_id,
            },
            cloudflare: CloudflareConfig {
                account_id,
                email,
                api_key,
                database_name,
                bucket_name,
                api_base_url,
                timeout,
            },
        })
    }
}

fn parse_id(key: &str, raw: &str) -> Result<NonZeroU64> {
    raw.trim().parse::<NonZeroU64>().map_err(|_| Error::Config {
        message: format!("{key} must be a non-zero Discord id, got {raw:?}"),
    })
}

/// Loads the application configuration from `CONFIG_PATH` (or `config.toml`)
/// and the process environment.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let file = file::load_config(&path)?;
    let config = AppConfig::resolve(file, |key| std::env::var(key).ok())?;
    info!(
        database = %config.cloudflare.database_name,
        bucket = ?config.cloudflare.bucket_name,
        guild = ?config.discord.guild_id,
        "Configuration loaded"
    );
    Ok(config)
}
