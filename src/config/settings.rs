//! Application settings.
//!
//! Settings are resolved in three layers: built-in defaults for the active environment
//! (`APP_ENV`), an optional TOML file that replaces them, and individual environment
//! variable overrides. The Discord token is deliberately not part of this struct; it is
//! read from `DISCORD_BOT_TOKEN` right before the client starts.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Deployment environment selected by `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development, commands registered in a single guild
    #[default]
    Development,
    /// Automated and manual testing
    Test,
    /// Live deployment, commands registered globally
    Production,
}

impl Environment {
    /// Parses an `APP_ENV` value, case-insensitively.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" | "prod" => Ok(Self::Production),
            other => Err(Error::Config {
                message: format!("Unknown APP_ENV '{other}'"),
            }),
        }
    }

    /// Lowercase name used for file lookup and logging.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

/// Persistence store connection settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection URL (`sqlite://...` or `mysql://...`)
    pub url: String,
    /// Maximum pooled connections
    pub connection_limit: u32,
    /// Maximum queued checkout requests, `0` for unbounded
    pub queue_limit: u32,
    /// Seconds to wait for a pooled connection before failing
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/sock_bot_dev.sqlite?mode=rwc".to_string(),
            connection_limit: 10,
            queue_limit: 0,
            acquire_timeout_secs: 8,
        }
    }
}

/// Discord registration settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Register slash commands for every guild instead of one development guild
    pub register_commands_globally: bool,
    /// Guild that receives commands when not registering globally
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_guild_id: Option<u64>,
}

/// Access control settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Only the owner may run commands (staged rollout)
    pub restrict_to_owner: bool,
    /// Discord user id of the owner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// Role names allowed to manage the weekly form, matched case-insensitively
    pub form_admin_roles: Vec<String>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            restrict_to_owner: false,
            owner_id: None,
            form_admin_roles: vec![
                "leadership".to_string(),
                "admin".to_string(),
                "R4+".to_string(),
            ],
        }
    }
}

/// Fully resolved application configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Active environment
    pub environment: Environment,
    /// Store settings
    pub database: DatabaseConfig,
    /// Registration settings
    pub discord: DiscordConfig,
    /// Access policy settings
    pub access: AccessConfig,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::Development)
    }
}

impl AppConfig {
    /// Built-in defaults for an environment.
    #[must_use]
    pub fn for_environment(environment: Environment) -> Self {
        let (url, connection_limit, register_commands_globally, log_level) = match environment {
            Environment::Development => (
                "sqlite://data/sock_bot_dev.sqlite?mode=rwc",
                10,
                false,
                "debug",
            ),
            Environment::Test => ("sqlite::memory:", 10, false, "info"),
            Environment::Production => ("sqlite://data/sock_bot.sqlite?mode=rwc", 20, true, "warn"),
        };

        Self {
            environment,
            database: DatabaseConfig {
                url: url.to_string(),
                connection_limit,
                ..DatabaseConfig::default()
            },
            discord: DiscordConfig {
                register_commands_globally,
                dev_guild_id: None,
            },
            access: AccessConfig::default(),
            log_level: log_level.to_string(),
        }
    }

    /// Parses a TOML document layered over the built-in defaults of `environment`.
    ///
    /// Keys absent from the document keep the profile's values, table by table.
    pub fn from_toml_str(environment: Environment, contents: &str) -> Result<Self> {
        let overlay: toml::Value = toml::from_str(contents).map_err(|e| Error::Config {
            message: format!("Failed to parse configuration TOML: {e}"),
        })?;
        let mut merged =
            toml::Value::try_from(Self::for_environment(environment)).map_err(|e| Error::Config {
                message: format!("Failed to encode {} defaults: {e}", environment.name()),
            })?;
        merge_toml(&mut merged, overlay);

        let mut config: Self = merged.try_into().map_err(|e| Error::Config {
            message: format!("Invalid configuration: {e}"),
        })?;
        config.environment = environment;
        Ok(config)
    }

    /// Applies environment variable overrides through `lookup`.
    ///
    /// Recognised keys: `DATABASE_URL`, `RESTRICT_TO_OWNER`, `OWNER_ID`, `DEV_GUILD_ID`,
    /// `FORM_ADMIN_ROLES` and `LOG_LEVEL`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(flag) = lookup("RESTRICT_TO_OWNER") {
            self.access.restrict_to_owner = flag.trim() == "true";
        }
        if let Some(owner) = lookup("OWNER_ID").filter(|v| !v.trim().is_empty()) {
            self.access.owner_id = Some(owner.trim().to_string());
        }
        if let Some(guild) = lookup("DEV_GUILD_ID").filter(|v| !v.trim().is_empty()) {
            let id = guild.trim().parse::<u64>().map_err(|e| Error::Config {
                message: format!("DEV_GUILD_ID must be a numeric guild id: {e}"),
            })?;
            self.discord.dev_guild_id = Some(id);
        }
        if let Some(roles) = lookup("FORM_ADMIN_ROLES") {
            self.access.form_admin_roles = roles
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(())
    }

    /// Checks cross-field consistency.
    pub fn validate(&self) -> Result<()> {
        if self.access.restrict_to_owner && self.access.owner_id.is_none() {
            return Err(Error::Config {
                message: "RESTRICT_TO_OWNER is enabled but OWNER_ID is not set".to_string(),
            });
        }
        if !self.discord.register_commands_globally && self.discord.dev_guild_id.is_none() {
            return Err(Error::Config {
                message: "Guild-scoped command registration requires DEV_GUILD_ID".to_string(),
            });
        }
        if self.discord.dev_guild_id == Some(0) {
            return Err(Error::Config {
                message: "DEV_GUILD_ID must be a non-zero guild id".to_string(),
            });
        }
        if self.database.connection_limit == 0 {
            return Err(Error::Config {
                message: "database.connection_limit must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Replaces values in `base` with those in `overlay`, recursing into tables.
fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Loads configuration from a TOML file over the defaults of `environment`.
pub fn load_config<P: AsRef<Path>>(path: P, environment: Environment) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    AppConfig::from_toml_str(environment, &contents)
}

fn config_file_for(environment: Environment) -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("CONFIG_PATH") {
        return Some(PathBuf::from(explicit));
    }
    let candidate = PathBuf::from(format!("config/{}.toml", environment.name()));
    candidate.exists().then_some(candidate)
}

/// Resolves the full application configuration from `APP_ENV`, the optional config file
/// and the process environment.
pub fn load_app_configuration() -> Result<AppConfig> {
    let environment = match std::env::var("APP_ENV") {
        Ok(value) => Environment::parse(&value)?,
        Err(_) => Environment::default(),
    };

    let mut config = match config_file_for(environment) {
        Some(path) => {
            let loaded = load_config(&path, environment)?;
            info!("Loaded {} configuration from {}", environment.name(), path.display());
            loaded
        }
        None => {
            info!("Using built-in {} configuration", environment.name());
            AppConfig::for_environment(environment)
        }
    };

    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;

    if config.database.queue_limit != 0 {
        warn!(
            queue_limit = config.database.queue_limit,
            "database.queue_limit is advisory; the pool queues waiters without a cap"
        );
    }

    Ok(config)
}
